//! 注册协议：查询 / 注册 / 注销自启动规则。
//!
//! 协议要点：
//! - 注册前总是先注销（替换而非追加，同时清除此前使用其他提供者留下的状态）
//! - 查询时顺带清理其他提供者残留的 Run 键值（HKLM 仅在已提权时清理）
//! - 注册/注销的返回值是校验后的结果（再次查询），而不是“调用未报错”
//!
//! 错误处理：
//! - 读取/写入 HKLM 时权限不足：按“未找到/无操作”处理，不向上报错
//! - 清理残留失败：忽略，不重试
//! - 其他存储错误原样向上传递
//!
//! 作者：StartupHelper 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use tracing::{debug, info, warn};

use crate::args;
use crate::config::StartupConfiguration;
use crate::error::{StoreError, StoreResult};
use crate::model::{ProviderKind, RegistrationScope, RunKeyHive, WellKnownGroup};
use crate::platform::Platform;
use crate::task::{PrincipalBinding, TaskDefinition};

/// 自启动规则注册器：持有配置与平台实现。
#[derive(Debug)]
pub struct StartupRegistrar<P> {
    config: StartupConfiguration,
    platform: P,
}

impl<P: Platform> StartupRegistrar<P> {
    pub fn new(config: StartupConfiguration, platform: P) -> Self {
        Self { config, platform }
    }

    pub fn config(&self) -> &StartupConfiguration {
        &self.config
    }

    /// 可变配置（仅工作目录允许在构造后修改）。
    pub fn config_mut(&mut self) -> &mut StartupConfiguration {
        &mut self.config
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// 查询是否存在与规则名匹配的有效规则。
    ///
    /// 检查顺序：
    /// 1) 计划任务提供者：查找同名任务；未指定运行用户，或本地作用域且运行用户为当前用户时计为已注册
    /// 2) HKCU Run 值：计划任务提供者下视为残留并删除；Run 键提供者下计为已注册
    /// 3) HKLM Run 值：计划任务提供者下视为残留，仅在已提权时删除；Run 键提供者下计为已注册
    ///
    /// 异常处理：
    /// - HKLM 权限不足视为未找到
    /// - 其余存储错误返回 `Err`
    pub fn is_registered(&self) -> StoreResult<bool> {
        let name = self.config.name();
        let provider = self.config.provider();
        let mut registered = false;

        if provider == ProviderKind::SchedulerTask {
            if let Some(task) = self.platform.find_task(name)? {
                registered = match task.run_as_user() {
                    None => true,
                    Some(user) => {
                        self.config.scope() == RegistrationScope::Local
                            && self.platform.is_current_user(user)
                    }
                };
                if !registered {
                    debug!("任务 {name} 属于其他用户，忽略");
                }
            }
        }

        if self.platform.get_value(RunKeyHive::CurrentUser, name)?.is_some() {
            if provider == ProviderKind::SchedulerTask {
                self.remove_stale_value(RunKeyHive::CurrentUser);
            } else {
                registered = true;
            }
        }

        match self.platform.get_value(RunKeyHive::LocalMachine, name) {
            Ok(Some(_)) => {
                if provider == ProviderKind::SchedulerTask {
                    if self.platform.is_elevated() {
                        self.remove_stale_value(RunKeyHive::LocalMachine);
                    } else {
                        debug!("HKLM 中存在残留值 {name}，但当前未提权，跳过清理");
                    }
                } else {
                    registered = true;
                }
            }
            Ok(None) => {}
            Err(StoreError::AccessDenied(reason)) => {
                debug!("读取 HKLM Run 键权限不足，视为未找到: {reason}");
            }
            Err(e) => return Err(e),
        }

        Ok(registered)
    }

    /// 创建或替换规则。
    ///
    /// 参数：
    /// - `extra`：附加给程序的额外参数（位于哨兵之后）
    ///
    /// 返回值：
    /// - 注册后再次查询的结果（`true` 表示规则确实生效）
    ///
    /// 异常处理：
    /// - 全局作用域写 HKLM 权限不足时不报错，返回值为 `false`
    /// - 任务计划程序错误、HKCU 写入错误返回 `Err`
    pub fn register(&self, extra: Option<&str>) -> StoreResult<bool> {
        self.unregister()?;

        let name = self.config.name();
        match self.config.provider() {
            ProviderKind::SchedulerTask => {
                let definition = self.task_definition(extra)?;
                self.platform.register_task(name, &definition)?;
                info!("已注册计划任务: {name}");
            }
            ProviderKind::LoginRunKey => {
                let hive = RunKeyHive::for_scope(self.config.scope());
                let command =
                    args::run_key_command(self.config.executable(), self.config.sentinel(), extra);
                match self.platform.set_value(hive, name, &command) {
                    Ok(()) => info!("已写入 {} Run 值: {name}", hive.name()),
                    Err(StoreError::AccessDenied(reason)) => {
                        warn!("写入 {} Run 值权限不足: {reason}", hive.name());
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        self.is_registered()
    }

    /// 删除规则（若存在）。
    ///
    /// 返回值：
    /// - 注销后再次查询的结果取反（`true` 表示已不存在任何有效规则；原本就不存在也返回 `true`）
    ///
    /// 异常处理：
    /// - HKLM 删除权限不足时忽略
    pub fn unregister(&self) -> StoreResult<bool> {
        let name = self.config.name();

        if self.config.provider() == ProviderKind::SchedulerTask
            && self.platform.find_task(name)?.is_some()
        {
            self.platform.delete_task(name)?;
            debug!("已删除计划任务: {name}");
        }

        if self.config.scope() == RegistrationScope::Local {
            self.platform.delete_value(RunKeyHive::CurrentUser, name)?;
        }

        if self.platform.is_elevated() {
            match self.platform.delete_value(RunKeyHive::LocalMachine, name) {
                Ok(()) => {}
                Err(StoreError::AccessDenied(reason)) => {
                    debug!("删除 HKLM Run 值权限不足，忽略: {reason}");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(!self.is_registered()?)
    }

    /// 按当前配置与任务计划程序能力构造任务定义。
    fn task_definition(&self, extra: Option<&str>) -> StoreResult<TaskDefinition> {
        let caps = self.platform.highest_supported_version()?.capabilities();
        let binding = if caps.run_levels_supported {
            Some(match self.config.scope() {
                RegistrationScope::Local => PrincipalBinding::User(self.platform.current_user()?),
                RegistrationScope::Global => {
                    let group = if self.config.requires_elevation() {
                        WellKnownGroup::Administrators
                    } else {
                        WellKnownGroup::Users
                    };
                    PrincipalBinding::Group(self.platform.group_account_name(group)?)
                }
            })
        } else {
            None
        };
        Ok(TaskDefinition::for_logon(&self.config, extra, caps, binding))
    }

    /// 尽力删除其他提供者残留的 Run 键值；失败只记录日志。
    fn remove_stale_value(&self, hive: RunKeyHive) {
        let name = self.config.name();
        match self.platform.delete_value(hive, name) {
            Ok(()) => info!("已清理 {} 中残留的 Run 值: {name}", hive.name()),
            Err(e) => debug!("清理 {} 残留 Run 值失败，忽略: {e}", hive.name()),
        }
    }
}
