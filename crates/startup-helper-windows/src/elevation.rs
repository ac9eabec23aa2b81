//! 提权状态检测。
//!
//! 作者：StartupHelper 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use windows::Win32::UI::Shell::IsUserAnAdmin;

/// 判断当前进程是否以管理员权限运行。
///
/// 返回值：
/// - `true`：当前进程令牌属于 Administrators 组且已提升
/// - `false`：其他情况（包括 UAC 过滤后的受限令牌）
///
/// 说明：
/// - 该 Win32 API 不返回错误码，开销很小，可在每次注册/查询时重复调用。
pub fn is_current_session_elevated() -> bool {
    unsafe { IsUserAnAdmin().as_bool() }
}
