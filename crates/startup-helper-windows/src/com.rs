//! COM 初始化守卫与宽字符串工具。
//!
//! 作者：StartupHelper 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::ffi::OsStr;
use std::os::windows::ffi::OsStrExt;

use anyhow::{Context, Result};
use windows::Win32::Foundation::RPC_E_CHANGED_MODE;
use windows::Win32::System::Com::{CoInitializeEx, CoUninitialize, COINIT_APARTMENTTHREADED};

/// COM 单元守卫：进入时初始化，离开作用域时与之配对调用 `CoUninitialize`。
///
/// 说明：
/// - 当前线程已按其他并发模型初始化（`RPC_E_CHANGED_MODE`）时直接复用，且不负责反初始化
/// - 守卫必须先于所有 COM 接口对象创建，保证接口先于 `CoUninitialize` 释放
pub(crate) struct ComApartment {
    owned: bool,
}

impl ComApartment {
    pub(crate) fn enter() -> Result<Self> {
        let hr = unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED) };
        if hr == RPC_E_CHANGED_MODE {
            return Ok(Self { owned: false });
        }
        hr.ok().context("COM 初始化失败")?;
        Ok(Self { owned: true })
    }
}

impl Drop for ComApartment {
    fn drop(&mut self) {
        if self.owned {
            unsafe { CoUninitialize() }
        }
    }
}

/// 编码为 UTF-16 并追加 NUL 结尾。
pub(crate) fn to_wide(s: impl AsRef<OsStr>) -> Vec<u16> {
    s.as_ref().encode_wide().chain(std::iter::once(0)).collect()
}
