//! Windows 平台实现（Run 注册表键、任务计划程序、账户与提权查询）。
//!
//! 目标：
//! - 将 Win32/COM 细节集中封装，核心库只通过 `startup_helper_core::platform` 中的接口访问
//! - 内部统一使用 `anyhow::Result`，在接口边界转换为 `StoreError`（区分权限不足）
//!
//! 权限要求：
//! - 读写 HKCU 与注册本地作用域任务通常不需要管理员
//! - 写入 HKLM、注册全局作用域或提权运行的任务需要管理员权限
//!
//! 作者：StartupHelper 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

#![cfg(windows)]

pub mod account;
mod com;
pub mod elevation;
mod error;
pub mod platform;
pub mod registry;
pub mod scheduler;
pub mod version;

pub use platform::WindowsPlatform;
