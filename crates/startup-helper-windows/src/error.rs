//! 内部错误到 `StoreError` 的转换。
//!
//! 作者：StartupHelper 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use startup_helper_core::StoreError;
use windows::Win32::Foundation::E_ACCESSDENIED;

/// 将适配层错误归类：错误链中出现“拒绝访问”即视为权限不足。
pub(crate) fn classify(err: anyhow::Error) -> StoreError {
    let denied = err.chain().any(|cause| {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            return io.kind() == std::io::ErrorKind::PermissionDenied;
        }
        if let Some(win) = cause.downcast_ref::<windows::core::Error>() {
            return win.code() == E_ACCESSDENIED;
        }
        false
    });
    if denied {
        StoreError::AccessDenied(format!("{err:#}"))
    } else {
        StoreError::Other(err)
    }
}
