//! 开机自启动注册核心库（平台无关）。
//!
//! 功能：
//! - 定义自启动配置（可执行文件、规则名、作用域、提供者、提权需求、哨兵参数）及其校验
//! - 提供者选择策略（计划任务 / 登录 Run 键）与能力描述
//! - 注册/注销/查询协议：委托给 [`platform`] 中定义的提供者接口，由具体平台实现
//! - 自启动会话识别与命令行参数过滤
//! - 文件系统大小写敏感性探测与工作目录校正
//!
//! 约定：
//! - 本 crate 不直接访问任何系统配置存储；Windows 实现位于 `startup-helper-windows`
//!
//! 作者：StartupHelper 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

pub mod args;
pub mod capability;
pub mod config;
pub mod error;
pub mod model;
pub mod platform;
pub mod registrar;
pub mod settings;
pub mod task;
pub mod workdir;

pub use config::{StartupConfiguration, StartupConfigurationBuilder};
pub use error::{ConfigError, StoreError, StoreResult};
pub use model::{ProviderKind, RegistrationScope, RunKeyHive, WellKnownGroup};
pub use registrar::StartupRegistrar;
