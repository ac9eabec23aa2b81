//! 自启动注册示例程序。
//!
//! 流程：
//! - 输出当前提权状态与过滤掉哨兵参数后的程序参数
//! - 若本次由自启动拉起：等待回车后退出
//! - 否则：未注册时注册自启动（附加参数 `--nice /argument`），
//!   随后等待输入；直接回车退出，输入任意内容后回车则取消注册
//!
//! 配置来源（优先级从高到低）：
//! - 命令行参数 `--name` / `--scope` / `--provider`
//! - `--config` 或环境变量 `STARTUP_HELPER_CONFIG` 指向的 JSON 设置文件
//! - 按当前会话推导的默认值
//!
//! 作者：StartupHelper 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

#[cfg(windows)]
mod cli;

#[cfg(windows)]
fn main() -> anyhow::Result<()> {
    use clap::Parser;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("info".parse().unwrap()),
        )
        .with_target(false)
        .init();

    demo::run(cli::Cli::parse())
}

#[cfg(not(windows))]
fn main() {
    eprintln!("startup-helper-sample 仅支持 Windows");
    std::process::exit(1);
}

#[cfg(windows)]
mod demo {
    use std::io::BufRead;

    use anyhow::{Context, Result};
    use startup_helper_core::platform::SessionInfo;
    use startup_helper_core::settings::StartupSettings;
    use startup_helper_core::workdir::normalize_working_directory;
    use startup_helper_core::{RegistrationScope, StartupConfiguration, StartupConfigurationBuilder};
    use startup_helper_windows::WindowsPlatform;
    use tracing::{debug, info};

    use crate::cli::{Cli, DEFAULT_NAME};

    /// 按配置文件与命令行参数组装配置构造器。
    ///
    /// 异常处理：
    /// - 设置文件读取或解析失败返回错误。
    fn builder_from_cli(cli: &Cli) -> Result<StartupConfigurationBuilder> {
        let mut builder = match &cli.config {
            Some(path) => {
                info!("读取设置文件: {}", path.display());
                StartupSettings::load(path)?.into_builder()
            }
            None => StartupConfiguration::builder(DEFAULT_NAME, RegistrationScope::Local),
        };
        if let Some(name) = &cli.name {
            builder = builder.name(name.as_str());
        }
        if let Some(scope) = cli.scope {
            builder = builder.scope(scope.into());
        }
        if let Some(provider) = cli.provider {
            builder = builder.provider(provider.into());
        }
        Ok(builder)
    }

    fn read_line() -> Result<String> {
        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .context("读取控制台输入失败")?;
        Ok(line)
    }

    /// 注册阶段的提示文本。
    fn registration_outcome(already_registered: bool, registered: bool) -> &'static str {
        match (already_registered, registered) {
            (true, _) => "程序已注册自启动",
            (false, true) => "注册完成",
            (false, false) => "注册失败",
        }
    }

    /// 执行示例流程。
    ///
    /// 异常处理：
    /// - 配置无效、设置文件错误以及注册/查询过程中的非权限类失败都会返回错误。
    pub(super) fn run(cli: Cli) -> Result<()> {
        let platform = WindowsPlatform;
        let config = builder_from_cli(&cli)?
            .build(&platform)
            .context("构造自启动配置失败")?;
        normalize_working_directory(&config)?;
        debug!("命令行位置参数: {:?}", cli.args);

        println!("管理员权限: {}", platform.is_elevated());
        println!("程序参数: {:?}", config.application_arguments());
        info!(
            "自启动配置: 名称={} 作用域={:?} 提供者={} 提权={}",
            config.name(),
            config.scope(),
            config.provider(),
            config.requires_elevation()
        );

        if config.is_started_via_auto_start() {
            println!("本次由自启动拉起，按回车退出。");
            read_line()?;
            return Ok(());
        }

        let registrar = WindowsPlatform::registrar(config);
        let already_registered = registrar.is_registered()?;
        let registered = if already_registered {
            true
        } else {
            let extra = cli.extra.trim();
            registrar.register((!extra.is_empty()).then_some(extra))?
        };
        println!("{}", registration_outcome(already_registered, registered));

        println!("直接回车退出；输入任意内容后回车将取消自启动注册。");
        if !read_line()?.trim().is_empty() {
            let removed = registrar.unregister()?;
            println!("{}", if removed { "已取消注册" } else { "取消注册失败" });
        }
        Ok(())
    }

}
