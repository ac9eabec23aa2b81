//! 示例程序命令行参数定义（仅 Windows 构建使用）。
//!
//! 作者：StartupHelper 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use startup_helper_core::{ProviderKind, RegistrationScope};

/// 未指定名称时使用的自启动名称。
pub(crate) const DEFAULT_NAME: &str = "StartupHelperSample";

/// 注册时附加给程序的额外参数。
const DEFAULT_EXTRA: &str = "--nice /argument";

/// 命令行参数。
///
/// 说明：
/// - 自启动拉起时命令行为 `"<exe>" <哨兵> <额外参数>`，其余参数统一收集到 `args`
#[derive(Debug, Parser)]
#[command(name = "startup-helper-sample", version)]
pub(crate) struct Cli {
    /// JSON 设置文件路径。
    #[arg(long, env = "STARTUP_HELPER_CONFIG")]
    pub(crate) config: Option<PathBuf>,

    /// 自启动名称（任务名/注册表值名）。
    #[arg(long)]
    pub(crate) name: Option<String>,

    #[arg(long, value_enum)]
    pub(crate) scope: Option<ScopeArg>,

    #[arg(long, value_enum)]
    pub(crate) provider: Option<ProviderArg>,

    /// 注册时附加的额外参数。
    #[arg(long, default_value = DEFAULT_EXTRA)]
    pub(crate) extra: String,

    /// 程序参数（包括自启动哨兵）。
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub(crate) args: Vec<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum ScopeArg {
    Local,
    Global,
}

impl From<ScopeArg> for RegistrationScope {
    fn from(value: ScopeArg) -> Self {
        match value {
            ScopeArg::Local => RegistrationScope::Local,
            ScopeArg::Global => RegistrationScope::Global,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum ProviderArg {
    SchedulerTask,
    LoginRunKey,
}

impl From<ProviderArg> for ProviderKind {
    fn from(value: ProviderArg) -> Self {
        match value {
            ProviderArg::SchedulerTask => ProviderKind::SchedulerTask,
            ProviderArg::LoginRunKey => ProviderKind::LoginRunKey,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 自启动拉起时哨兵与额外参数都落入位置参数。
    #[test]
    fn startup_command_line_is_collected_into_args() {
        let cli = Cli::try_parse_from(["sample.exe", "--startup", "--nice", "/argument"]).expect("parse");
        assert_eq!(cli.args, vec!["--startup", "--nice", "/argument"]);
        assert_eq!(cli.extra, DEFAULT_EXTRA);
        assert!(cli.name.is_none());
    }

    #[test]
    fn scope_and_provider_map_to_core_types() {
        let cli = Cli::try_parse_from([
            "sample.exe",
            "--name",
            "Demo",
            "--scope",
            "global",
            "--provider",
            "login-run-key",
        ])
        .expect("parse");
        assert_eq!(cli.name.as_deref(), Some("Demo"));
        assert_eq!(cli.scope.map(RegistrationScope::from), Some(RegistrationScope::Global));
        assert_eq!(cli.provider.map(ProviderKind::from), Some(ProviderKind::LoginRunKey));
        assert!(cli.args.is_empty());
    }
}
