//! 提供者接口（由具体平台实现）。
//!
//! 接口划分：
//! - [`TaskScheduler`]：任务计划程序（查找/删除/注册任务，查询最高架构版本）
//! - [`RunKeyStore`]：登录 Run 键（按存储实例读/写/删值）
//! - [`SessionInfo`]：当前进程会话信息（提权状态、用户身份、系统版本）
//!
//! 资源约定：
//! - 每次调用内部自行打开并在返回前释放服务句柄/注册表句柄，调用之间不持有任何外部资源
//! - 实现应将“权限不足”映射为 [`StoreError::AccessDenied`](crate::error::StoreError::AccessDenied)
//!
//! 作者：StartupHelper 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use crate::capability::{OsVersion, SchedulerVersion};
use crate::error::StoreResult;
use crate::model::{RunKeyHive, WellKnownGroup};
use crate::task::{RegisteredTask, TaskDefinition};

/// 任务计划程序。
pub trait TaskScheduler {
    /// 按名称查找根目录下的任务；不存在时返回 `Ok(None)`。
    fn find_task(&self, name: &str) -> StoreResult<Option<RegisteredTask>>;

    /// 删除任务；任务不存在视为成功。
    fn delete_task(&self, name: &str) -> StoreResult<()>;

    /// 以“创建或更新”方式注册任务定义。
    fn register_task(&self, name: &str, definition: &TaskDefinition) -> StoreResult<()>;

    /// 支持的最高任务架构版本。
    fn highest_supported_version(&self) -> StoreResult<SchedulerVersion>;
}

/// 登录 Run 键存储。
pub trait RunKeyStore {
    /// 读取字符串值；键或值不存在时返回 `Ok(None)`。
    fn get_value(&self, hive: RunKeyHive, name: &str) -> StoreResult<Option<String>>;

    /// 写入字符串值（键不存在时创建）。
    fn set_value(&self, hive: RunKeyHive, name: &str, value: &str) -> StoreResult<()>;

    /// 删除值；键或值不存在视为成功。
    fn delete_value(&self, hive: RunKeyHive, name: &str) -> StoreResult<()>;
}

/// 当前进程会话信息。
pub trait SessionInfo {
    /// 当前进程是否持有管理员权限（开销很小，可重复调用）。
    fn is_elevated(&self) -> bool;

    /// 当前用户账户名（`DOMAIN\user`）。
    fn current_user(&self) -> StoreResult<String>;

    /// 给定账户名是否与当前用户为同一安全标识；无法解析时返回 `false`。
    fn is_current_user(&self, account: &str) -> bool;

    /// 内置组在本机上的账户名（可能已本地化）。
    fn group_account_name(&self, group: WellKnownGroup) -> StoreResult<String>;

    /// 操作系统版本。
    fn os_version(&self) -> OsVersion;
}

/// 完整平台：同时提供三类接口。
pub trait Platform: TaskScheduler + RunKeyStore + SessionInfo {}

impl<T> Platform for T where T: TaskScheduler + RunKeyStore + SessionInfo {}
