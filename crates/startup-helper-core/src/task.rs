//! 计划任务模型：查询结果与待注册的任务定义。
//!
//! 说明：
//! - 任务定义在这里以纯数据形式构造，平台适配层只负责把它逐项写入任务计划程序
//! - 构造逻辑只依赖能力标志与主体绑定，可在任意平台上单元测试
//!
//! 作者：StartupHelper 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::path::PathBuf;
use std::time::Duration;

use crate::args;
use crate::capability::SchedulerCapabilities;
use crate::config::StartupConfiguration;

/// 按名称查到的已注册任务。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredTask {
    pub name: String,
    /// 任务主体的运行用户（`DOMAIN\user`），可能为空。
    pub user_id: Option<String>,
}

impl RegisteredTask {
    /// 显式指定的运行用户；空白视为未指定。
    pub fn run_as_user(&self) -> Option<&str> {
        self.user_id
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }
}

/// 任务运行级别。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunLevel {
    /// 以最高可用权限运行。
    Highest,
    /// 以受限（LUA）权限运行。
    LeastPrivilege,
}

/// 任务主体绑定。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrincipalBinding {
    /// 绑定到具体用户，使用交互式令牌登录。
    User(String),
    /// 绑定到用户组（组内任一用户登录时触发）。
    Group(String),
}

/// 任务主体设置。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPrincipal {
    /// 旧版任务计划程序不支持运行级别，此时为 `None`。
    pub run_level: Option<RunLevel>,
    pub binding: Option<PrincipalBinding>,
}

/// 任务注册时使用的登录方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogonType {
    /// 使用已登录用户的交互式令牌（仅在用户登录时运行）。
    InteractiveToken,
    /// 绑定到用户组。
    Group,
    /// 不指定登录方式，由任务计划程序按主体决定。
    Unspecified,
}

/// 任务设置。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSettings {
    pub disallow_start_if_on_batteries: bool,
    /// `None` 表示不限制执行时长。
    pub execution_time_limit: Option<Duration>,
    pub compatibility_v2: bool,
    pub allow_demand_start: bool,
    pub allow_hard_terminate: bool,
    pub start_when_available: bool,
    pub run_only_if_logged_on: bool,
}

/// 启动程序动作。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecAction {
    pub path: PathBuf,
    pub arguments: String,
    pub working_directory: PathBuf,
}

/// 登录触发器；`user_id` 为空时任意用户登录均触发。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogonTrigger {
    pub user_id: Option<String>,
}

/// 完整的任务定义。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDefinition {
    pub action: ExecAction,
    pub trigger: LogonTrigger,
    pub settings: TaskSettings,
    pub principal: TaskPrincipal,
}

impl TaskDefinition {
    /// 按主体绑定与设置推导登录方式。
    ///
    /// 规则：
    /// - 绑定到组：[`LogonType::Group`]
    /// - 绑定到用户，或未绑定但要求仅在登录时运行：[`LogonType::InteractiveToken`]
    /// - 其他情况：[`LogonType::Unspecified`]
    pub fn logon_type(&self) -> LogonType {
        match &self.principal.binding {
            Some(PrincipalBinding::Group(_)) => LogonType::Group,
            Some(PrincipalBinding::User(_)) => LogonType::InteractiveToken,
            None if self.settings.run_only_if_logged_on => LogonType::InteractiveToken,
            None => LogonType::Unspecified,
        }
    }

    /// 为自启动配置构造登录触发任务。
    ///
    /// 参数：
    /// - `config`：自启动配置
    /// - `extra`：附加给程序的额外参数（拼接在哨兵之后）
    /// - `caps`：任务计划程序能力
    /// - `binding`：主体绑定（本地作用域为当前用户，全局作用域为内置组）
    ///
    /// 行为：
    /// - 支持运行级别时：按提权需求设置 Highest/LUA，关闭按需启动与强制终止，兼容 V2，错过时尽快启动；
    ///   绑定到用户时触发器也限定为该用户
    /// - 不支持运行级别时：仅在用户登录时运行，不做主体绑定
    pub fn for_logon(
        config: &StartupConfiguration,
        extra: Option<&str>,
        caps: SchedulerCapabilities,
        binding: Option<PrincipalBinding>,
    ) -> Self {
        let action = ExecAction {
            path: config.executable().to_path_buf(),
            arguments: args::startup_arguments(config.sentinel(), extra),
            working_directory: config.working_directory().to_path_buf(),
        };
        let mut settings = TaskSettings {
            disallow_start_if_on_batteries: false,
            execution_time_limit: None,
            compatibility_v2: false,
            allow_demand_start: true,
            allow_hard_terminate: true,
            start_when_available: false,
            run_only_if_logged_on: false,
        };

        if !caps.run_levels_supported {
            settings.run_only_if_logged_on = true;
            return Self {
                action,
                trigger: LogonTrigger { user_id: None },
                settings,
                principal: TaskPrincipal {
                    run_level: None,
                    binding: None,
                },
            };
        }

        settings.allow_demand_start = false;
        settings.allow_hard_terminate = false;
        settings.compatibility_v2 = true;
        settings.start_when_available = true;

        let trigger_user = match &binding {
            Some(PrincipalBinding::User(user)) => Some(user.clone()),
            _ => None,
        };
        let run_level = if config.requires_elevation() {
            RunLevel::Highest
        } else {
            RunLevel::LeastPrivilege
        };

        Self {
            action,
            trigger: LogonTrigger {
                user_id: trigger_user,
            },
            settings,
            principal: TaskPrincipal {
                run_level: Some(run_level),
                binding,
            },
        }
    }
}
