//! 基础枚举模型（作用域、提供者、Run 键位置、内置组）。
//!
//! 作者：StartupHelper 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::fmt;

use serde::{Deserialize, Serialize};

/// 自启动规则的作用域。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationScope {
    /// 仅当前用户。
    Local,
    /// 本机所有用户。
    Global,
}

/// 实现自启动的系统机制。
///
/// 两者互斥：某一提供者注册的规则，对另一提供者的查询逻辑不可见（残留清理除外）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// 任务计划程序中的登录触发任务。
    SchedulerTask,
    /// `...\CurrentVersion\Run` 下的字符串值。
    LoginRunKey,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::SchedulerTask => f.write_str("scheduler-task"),
            ProviderKind::LoginRunKey => f.write_str("login-run-key"),
        }
    }
}

/// Run 键所在的存储实例。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunKeyHive {
    /// `HKEY_CURRENT_USER`。
    CurrentUser,
    /// `HKEY_LOCAL_MACHINE`。
    LocalMachine,
}

impl RunKeyHive {
    /// 可读名称（用于日志与错误信息）。
    pub fn name(self) -> &'static str {
        match self {
            RunKeyHive::CurrentUser => "HKCU",
            RunKeyHive::LocalMachine => "HKLM",
        }
    }

    /// 作用域对应的 Run 键位置。
    pub fn for_scope(scope: RegistrationScope) -> Self {
        match scope {
            RegistrationScope::Local => RunKeyHive::CurrentUser,
            RegistrationScope::Global => RunKeyHive::LocalMachine,
        }
    }
}

/// 全局作用域任务绑定的内置组。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnownGroup {
    /// `BUILTIN\Administrators`（S-1-5-32-544）。
    Administrators,
    /// `BUILTIN\Users`（S-1-5-32-545）。
    Users,
}

impl WellKnownGroup {
    /// 组的 RID（位于 BUILTIN 域 S-1-5-32 之下）。
    pub fn relative_id(self) -> u32 {
        match self {
            WellKnownGroup::Administrators => 544,
            WellKnownGroup::Users => 545,
        }
    }

    /// 字符串形式的 SID。
    pub fn sid_string(self) -> String {
        format!("S-1-5-32-{}", self.relative_id())
    }
}
