//! 操作系统版本查询。
//!
//! 作者：StartupHelper 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use anyhow::{Context, Result};
use startup_helper_core::capability::OsVersion;
use windows::Wdk::System::SystemServices::RtlGetVersion;
use windows::Win32::System::SystemInformation::OSVERSIONINFOW;

/// 读取真实的操作系统主/次版本号。
///
/// 说明：
/// - 使用 `RtlGetVersion` 而非 `GetVersionEx`，不受应用程序清单兼容性声明影响。
pub fn os_version() -> Result<OsVersion> {
    let mut info = OSVERSIONINFOW {
        dwOSVersionInfoSize: std::mem::size_of::<OSVERSIONINFOW>() as u32,
        ..Default::default()
    };
    unsafe { RtlGetVersion(&mut info) }
        .ok()
        .context("RtlGetVersion 调用失败")?;
    Ok(OsVersion::new(info.dwMajorVersion, info.dwMinorVersion))
}
