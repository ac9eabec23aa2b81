//! [`WindowsPlatform`]：将 Win32 实现接入核心库的提供者接口。
//!
//! 作者：StartupHelper 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use startup_helper_core::capability::{OsVersion, SchedulerVersion};
use startup_helper_core::platform::{RunKeyStore, SessionInfo, TaskScheduler};
use startup_helper_core::task::{RegisteredTask, TaskDefinition};
use startup_helper_core::{
    ConfigError, RegistrationScope, RunKeyHive, StartupConfiguration, StartupRegistrar,
    StoreResult, WellKnownGroup,
};
use tracing::warn;

use crate::error::classify;
use crate::{account, elevation, registry, scheduler, version};

/// 无法读取系统版本时采用的保守值（仅支持 Run 键）。
const FALLBACK_OS_VERSION: OsVersion = OsVersion::new(5, 1);

/// 本机 Windows 平台（无状态，可随意复制）。
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsPlatform;

impl WindowsPlatform {
    /// 以当前进程为目标，按会话状态补齐默认值后构造注册器。
    ///
    /// 参数：
    /// - `name`：自启动名称（任务名/注册表值名）
    /// - `scope`：注册作用域
    ///
    /// 异常处理：
    /// - 无法确定当前可执行文件路径或名称为空时返回 [`ConfigError`]。
    pub fn registrar_for_current_process(
        name: &str,
        scope: RegistrationScope,
    ) -> Result<StartupRegistrar<Self>, ConfigError> {
        let config = StartupConfiguration::builder(name, scope).build(&Self)?;
        Ok(StartupRegistrar::new(config, Self))
    }

    /// 为给定配置构造注册器。
    pub fn registrar(config: StartupConfiguration) -> StartupRegistrar<Self> {
        StartupRegistrar::new(config, Self)
    }
}

impl TaskScheduler for WindowsPlatform {
    fn find_task(&self, name: &str) -> StoreResult<Option<RegisteredTask>> {
        scheduler::find_task(name).map_err(classify)
    }

    fn delete_task(&self, name: &str) -> StoreResult<()> {
        scheduler::delete_task(name).map_err(classify)
    }

    fn register_task(&self, name: &str, definition: &TaskDefinition) -> StoreResult<()> {
        scheduler::register_task(name, definition).map_err(classify)
    }

    fn highest_supported_version(&self) -> StoreResult<SchedulerVersion> {
        scheduler::highest_version().map_err(classify)
    }
}

impl RunKeyStore for WindowsPlatform {
    fn get_value(&self, hive: RunKeyHive, name: &str) -> StoreResult<Option<String>> {
        registry::get_run_value(hive, name).map_err(classify)
    }

    fn set_value(&self, hive: RunKeyHive, name: &str, value: &str) -> StoreResult<()> {
        registry::set_run_value(hive, name, value).map_err(classify)
    }

    fn delete_value(&self, hive: RunKeyHive, name: &str) -> StoreResult<()> {
        registry::delete_run_value(hive, name).map_err(classify)
    }
}

impl SessionInfo for WindowsPlatform {
    fn is_elevated(&self) -> bool {
        elevation::is_current_session_elevated()
    }

    fn current_user(&self) -> StoreResult<String> {
        account::current_user_name().map_err(classify)
    }

    fn is_current_user(&self, account: &str) -> bool {
        account::is_current_user(account)
    }

    fn group_account_name(&self, group: WellKnownGroup) -> StoreResult<String> {
        account::group_account_name(group).map_err(classify)
    }

    fn os_version(&self) -> OsVersion {
        version::os_version().unwrap_or_else(|e| {
            warn!("读取系统版本失败，按旧版系统处理: {e:#}");
            FALLBACK_OS_VERSION
        })
    }
}
