//! 账户与安全标识（SID）查询。
//!
//! 主要用途：
//! - 读取当前进程令牌中的用户 SID 与 `DOMAIN\user` 形式的账户名
//! - 比较任意账户名与当前用户是否为同一 SID（账户名大小写、域前缀写法不同也能正确判断）
//! - 将内置组（Administrators/Users）解析为本机上可能已本地化的账户名
//!
//! 作者：StartupHelper 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::ffi::c_void;

use anyhow::{bail, Context, Result};
use startup_helper_core::WellKnownGroup;
use windows::core::{PCWSTR, PWSTR};
use windows::Win32::Foundation::{CloseHandle, HANDLE, PSID};
use windows::Win32::Security::{
    GetLengthSid, GetTokenInformation, LookupAccountNameW, LookupAccountSidW, TokenUser,
    SID_NAME_USE, TOKEN_QUERY, TOKEN_USER,
};
use windows::Win32::System::Threading::{GetCurrentProcess, OpenProcessToken};

use crate::com::to_wide;

/// 进程令牌句柄守卫。
struct TokenHandle(HANDLE);

impl Drop for TokenHandle {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

/// SID 缓冲区（按 4 字节对齐存放）。
struct SidBuffer(Vec<u32>);

impl SidBuffer {
    fn with_len(bytes: u32) -> Self {
        Self(vec![0u32; (bytes as usize).div_ceil(4).max(1)])
    }

    fn psid(&mut self) -> PSID {
        PSID(self.0.as_mut_ptr() as *mut c_void)
    }
}

/// 复制 SID 的原始字节，用于比较。
///
/// 安全注意：
/// - `sid` 必须指向有效的 SID 结构。
unsafe fn sid_bytes(sid: PSID) -> Vec<u8> {
    let len = GetLengthSid(sid) as usize;
    std::slice::from_raw_parts(sid.0 as *const u8, len).to_vec()
}

/// 当前进程令牌中的用户 SID。
pub fn current_user_sid() -> Result<Vec<u8>> {
    unsafe {
        let mut token = HANDLE::default();
        OpenProcessToken(GetCurrentProcess(), TOKEN_QUERY, &mut token).context("打开进程令牌失败")?;
        let token = TokenHandle(token);

        let mut len = 0u32;
        let _ = GetTokenInformation(token.0, TokenUser, None, 0, &mut len);
        if len == 0 {
            bail!("查询令牌用户信息长度失败");
        }
        let mut buf = vec![0u64; (len as usize).div_ceil(8)];
        GetTokenInformation(
            token.0,
            TokenUser,
            Some(buf.as_mut_ptr() as *mut c_void),
            len,
            &mut len,
        )
        .context("读取令牌用户信息失败")?;
        let user = &*(buf.as_ptr() as *const TOKEN_USER);
        Ok(sid_bytes(user.User.Sid))
    }
}

/// 将 SID 解析为 `DOMAIN\name` 形式的账户名（域部分为空时只返回名称）。
///
/// 参数：
/// - `sid`：SID 原始字节
///
/// 异常处理：
/// - SID 在本机和域中都无法映射时返回错误。
pub fn account_name_for_sid(sid: &[u8]) -> Result<String> {
    let mut copy = SidBuffer::with_len(sid.len() as u32);
    // SAFETY: 缓冲区至少与 sid 等长。
    unsafe {
        std::ptr::copy_nonoverlapping(sid.as_ptr(), copy.0.as_mut_ptr() as *mut u8, sid.len());
    }
    let psid = copy.psid();

    unsafe {
        let mut name_len = 0u32;
        let mut domain_len = 0u32;
        let mut sid_use = SID_NAME_USE::default();
        let _ = LookupAccountSidW(
            PCWSTR::null(),
            psid,
            PWSTR::null(),
            &mut name_len,
            PWSTR::null(),
            &mut domain_len,
            &mut sid_use,
        );
        if name_len == 0 {
            bail!("查询账户名长度失败");
        }
        let mut name = vec![0u16; name_len as usize];
        let mut domain = vec![0u16; domain_len.max(1) as usize];
        LookupAccountSidW(
            PCWSTR::null(),
            psid,
            PWSTR(name.as_mut_ptr()),
            &mut name_len,
            PWSTR(domain.as_mut_ptr()),
            &mut domain_len,
            &mut sid_use,
        )
        .context("将 SID 解析为账户名失败")?;

        // 成功后长度不含结尾 NUL。
        let name = String::from_utf16_lossy(&name[..name_len as usize]);
        let domain = String::from_utf16_lossy(&domain[..domain_len as usize]);
        Ok(if domain.is_empty() {
            name
        } else {
            format!("{domain}\\{name}")
        })
    }
}

/// 将账户名解析为 SID 原始字节。
///
/// 异常处理：
/// - 账户不存在或无法解析时返回错误。
pub fn sid_for_account(account: &str) -> Result<Vec<u8>> {
    let wide = to_wide(account);
    unsafe {
        let mut sid_len = 0u32;
        let mut domain_len = 0u32;
        let mut sid_use = SID_NAME_USE::default();
        let _ = LookupAccountNameW(
            PCWSTR::null(),
            PCWSTR(wide.as_ptr()),
            PSID::default(),
            &mut sid_len,
            PWSTR::null(),
            &mut domain_len,
            &mut sid_use,
        );
        if sid_len == 0 {
            bail!("无法解析账户: {account}");
        }
        let mut sid = SidBuffer::with_len(sid_len);
        let mut domain = vec![0u16; domain_len.max(1) as usize];
        LookupAccountNameW(
            PCWSTR::null(),
            PCWSTR(wide.as_ptr()),
            sid.psid(),
            &mut sid_len,
            PWSTR(domain.as_mut_ptr()),
            &mut domain_len,
            &mut sid_use,
        )
        .with_context(|| format!("解析账户 SID 失败: {account}"))?;
        Ok(sid_bytes(sid.psid()))
    }
}

/// 当前用户账户名（`DOMAIN\user`）。
pub fn current_user_name() -> Result<String> {
    account_name_for_sid(&current_user_sid()?)
}

/// 判断账户名是否与当前用户为同一 SID；任一侧解析失败时返回 `false`。
pub fn is_current_user(account: &str) -> bool {
    let Ok(current) = current_user_sid() else {
        return false;
    };
    match sid_for_account(account.trim()) {
        Ok(sid) => sid == current,
        Err(_) => false,
    }
}

/// 内置组的 SID 原始字节（`S-1-5-32-<rid>`）。
fn builtin_group_sid(group: WellKnownGroup) -> Vec<u8> {
    let mut sid = vec![1u8, 2, 0, 0, 0, 0, 0, 5];
    sid.extend_from_slice(&32u32.to_le_bytes());
    sid.extend_from_slice(&group.relative_id().to_le_bytes());
    sid
}

/// 内置组在本机上的账户名（如 `BUILTIN\Administrators`，非英文系统上为本地化名称）。
pub fn group_account_name(group: WellKnownGroup) -> Result<String> {
    account_name_for_sid(&builtin_group_sid(group))
        .with_context(|| format!("解析内置组名称失败: {}", group.sid_string()))
}
