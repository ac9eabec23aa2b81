//! 自启动配置（不可变描述对象）与构建器。
//!
//! 说明：
//! - [`StartupConfiguration::new`] 是唯一的规范构造入口，负责全部校验
//! - [`StartupConfigurationBuilder`] 在调用规范构造前补齐默认值：
//!   可执行文件（当前进程）、提权需求（当前会话是否提权）、提供者（按系统能力选择）、
//!   哨兵参数（`--startup`）、工作目录（可执行文件所在目录）
//! - 配置本身不持有任何外部资源，只被注册协议读取
//!
//! 作者：StartupHelper 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::args;
use crate::capability::select_provider;
use crate::error::ConfigError;
use crate::model::{ProviderKind, RegistrationScope};
use crate::platform::SessionInfo;

/// 默认哨兵参数。
pub const DEFAULT_SENTINEL: &str = "--startup";

/// 自启动配置。
///
/// 字段说明：
/// - `executable`：可执行文件绝对路径（构造时必须存在）
/// - `name`：规则唯一名称（任务名 / Run 键值名），已去除首尾空白
/// - `working_directory`：启动时的工作目录，构造后仍可修改
/// - `scope` / `provider` / `requires_elevation`：构造后固定
/// - `sentinel`：识别自启动会话的命令行参数，已去除首尾空白
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupConfiguration {
    executable: PathBuf,
    name: String,
    working_directory: PathBuf,
    scope: RegistrationScope,
    provider: ProviderKind,
    requires_elevation: bool,
    sentinel: String,
}

impl StartupConfiguration {
    /// 创建并校验配置。
    ///
    /// 参数：
    /// - `executable`：可执行文件路径（相对路径按当前目录解析为绝对路径）
    /// - `name`：规则名称
    /// - `scope`：作用域
    /// - `provider`：提供者
    /// - `requires_elevation`：程序是否需要以管理员权限运行
    /// - `sentinel`：哨兵参数
    ///
    /// 异常处理：
    /// - 可执行文件不存在：[`ConfigError::ExecutableNotFound`]
    /// - 名称为空或全为空白：[`ConfigError::EmptyName`]
    /// - 哨兵为空或包含空白字符：[`ConfigError::InvalidSentinel`]
    pub fn new(
        executable: impl Into<PathBuf>,
        name: &str,
        scope: RegistrationScope,
        provider: ProviderKind,
        requires_elevation: bool,
        sentinel: &str,
    ) -> Result<Self, ConfigError> {
        let executable: PathBuf = executable.into();
        if executable.as_os_str().is_empty() {
            return Err(ConfigError::ExecutableNotFound(executable));
        }
        let executable = std::path::absolute(&executable).unwrap_or(executable);
        if !executable.is_file() {
            return Err(ConfigError::ExecutableNotFound(executable));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if !args::is_valid_sentinel(sentinel) {
            return Err(ConfigError::InvalidSentinel(sentinel.to_string()));
        }

        let working_directory = executable
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Ok(Self {
            executable,
            name: name.to_string(),
            working_directory,
            scope,
            provider,
            requires_elevation,
            sentinel: sentinel.trim().to_string(),
        })
    }

    /// 以规则名称与作用域开始构建配置，其余字段使用默认值。
    pub fn builder(name: impl Into<String>, scope: RegistrationScope) -> StartupConfigurationBuilder {
        StartupConfigurationBuilder::new(name, scope)
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    /// 修改启动时使用的工作目录。
    pub fn set_working_directory(&mut self, dir: impl Into<PathBuf>) {
        self.working_directory = dir.into();
    }

    pub fn scope(&self) -> RegistrationScope {
        self.scope
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    pub fn requires_elevation(&self) -> bool {
        self.requires_elevation
    }

    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }

    /// 当前进程是否由自启动规则拉起（检查进程参数的第 0、1 项）。
    pub fn is_started_via_auto_start(&self) -> bool {
        self.is_started_via_auto_start_from(&args::process_arguments())
    }

    /// 同 [`Self::is_started_via_auto_start`]，但针对给定的参数向量。
    pub fn is_started_via_auto_start_from<S: AsRef<str>>(&self, argv: &[S]) -> bool {
        args::is_started_via_auto_start(argv, &self.sentinel)
    }

    /// 当前进程的应用参数（已去除可执行文件路径与哨兵）。
    pub fn application_arguments(&self) -> Vec<String> {
        self.application_arguments_from(&args::process_arguments())
    }

    /// 同 [`Self::application_arguments`]，但针对给定的参数向量。
    pub fn application_arguments_from<S: AsRef<str>>(&self, argv: &[S]) -> Vec<String> {
        args::application_arguments(argv, &self.sentinel)
    }
}

/// 配置构建器：未显式设置的字段在 [`build`](Self::build) 时补齐默认值。
#[derive(Debug, Clone)]
pub struct StartupConfigurationBuilder {
    name: String,
    scope: RegistrationScope,
    executable: Option<PathBuf>,
    working_directory: Option<PathBuf>,
    provider: Option<ProviderKind>,
    requires_elevation: Option<bool>,
    sentinel: Option<String>,
}

impl StartupConfigurationBuilder {
    pub fn new(name: impl Into<String>, scope: RegistrationScope) -> Self {
        Self {
            name: name.into(),
            scope,
            executable: None,
            working_directory: None,
            provider: None,
            requires_elevation: None,
            sentinel: None,
        }
    }

    /// 覆盖自启动名称。
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// 覆盖注册作用域。
    pub fn scope(mut self, scope: RegistrationScope) -> Self {
        self.scope = scope;
        self
    }

    /// 指定可执行文件（默认为当前进程）。
    pub fn executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    /// 指定工作目录（默认为可执行文件所在目录）。
    pub fn working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    /// 固定提供者，跳过自动选择。
    pub fn provider(mut self, provider: ProviderKind) -> Self {
        self.provider = Some(provider);
        self
    }

    /// 指定是否需要管理员权限（默认与当前会话一致）。
    pub fn requires_elevation(mut self, value: bool) -> Self {
        self.requires_elevation = Some(value);
        self
    }

    /// 指定哨兵参数（默认 `--startup`）。
    pub fn sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = Some(sentinel.into());
        self
    }

    /// 补齐默认值并执行规范构造。
    ///
    /// 参数：
    /// - `session`：用于查询提权状态与系统版本
    ///
    /// 异常处理：
    /// - 无法获取当前进程路径：[`ConfigError::CurrentExe`]
    /// - 其余校验错误见 [`StartupConfiguration::new`]
    pub fn build<S: SessionInfo + ?Sized>(self, session: &S) -> Result<StartupConfiguration, ConfigError> {
        let executable = match self.executable {
            Some(p) => p,
            None => std::env::current_exe().map_err(ConfigError::CurrentExe)?,
        };
        let requires_elevation = self
            .requires_elevation
            .unwrap_or_else(|| session.is_elevated());
        let provider = self.provider.unwrap_or_else(|| {
            let os = session.os_version();
            let provider = select_provider(&os.capabilities(), requires_elevation);
            debug!(
                "自动选择提供者: {provider} (系统版本 {}.{}, 需要提权 = {requires_elevation})",
                os.major, os.minor
            );
            provider
        });
        let sentinel = self.sentinel.as_deref().unwrap_or(DEFAULT_SENTINEL);

        let mut config = StartupConfiguration::new(
            executable,
            &self.name,
            self.scope,
            provider,
            requires_elevation,
            sentinel,
        )?;
        if let Some(dir) = self.working_directory {
            config.set_working_directory(dir);
        }
        Ok(config)
    }
}
