//! 自启动配置文件（JSON）。
//!
//! 说明：
//! - 除 `name` 外全部字段可省略，省略的字段在构建时按默认规则补齐（见 [`StartupConfigurationBuilder`]）
//! - 该模块只负责读取与映射，不执行任何系统修改
//!
//! 示例：
//! ```json
//! { "name": "Demo", "scope": "local", "provider": "login_run_key", "sentinel": "--startup" }
//! ```
//!
//! 作者：StartupHelper 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::StartupConfigurationBuilder;
use crate::model::{ProviderKind, RegistrationScope};

fn default_scope() -> RegistrationScope {
    RegistrationScope::Local
}

/// 配置文件内容。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartupSettings {
    /// 规则名称。
    pub name: String,
    /// 作用域，默认 `local`。
    #[serde(default = "default_scope")]
    pub scope: RegistrationScope,
    /// 固定提供者；省略时按系统能力自动选择。
    #[serde(default)]
    pub provider: Option<ProviderKind>,
    /// 可执行文件路径；省略时为当前进程。
    #[serde(default)]
    pub executable: Option<PathBuf>,
    #[serde(default)]
    pub working_directory: Option<PathBuf>,
    /// 是否需要管理员权限；省略时与当前会话一致。
    #[serde(default)]
    pub requires_elevation: Option<bool>,
    #[serde(default)]
    pub sentinel: Option<String>,
}

impl StartupSettings {
    /// 读取并解析配置文件。
    ///
    /// 异常处理：
    /// - 文件读取失败（不存在/权限/IO）或 JSON 解析失败时返回错误
    pub fn load(path: &Path) -> Result<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        let settings: StartupSettings = serde_json::from_slice(&bytes)
            .with_context(|| format!("解析配置文件 JSON 失败: {}", path.display()))?;
        Ok(settings)
    }

    /// 映射为配置构建器。
    pub fn into_builder(self) -> StartupConfigurationBuilder {
        let mut builder = StartupConfigurationBuilder::new(self.name, self.scope);
        if let Some(p) = self.provider {
            builder = builder.provider(p);
        }
        if let Some(exe) = self.executable {
            builder = builder.executable(exe);
        }
        if let Some(dir) = self.working_directory {
            builder = builder.working_directory(dir);
        }
        if let Some(v) = self.requires_elevation {
            builder = builder.requires_elevation(v);
        }
        if let Some(s) = self.sentinel {
            builder = builder.sentinel(s);
        }
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 仅提供名称时其余字段取默认值。
    #[test]
    fn minimal_settings_use_defaults() {
        let s: StartupSettings = serde_json::from_str(r#"{ "name": "Demo" }"#).unwrap();
        assert_eq!(s.name, "Demo");
        assert_eq!(s.scope, RegistrationScope::Local);
        assert!(s.provider.is_none());
        assert!(s.sentinel.is_none());
    }

    #[test]
    fn full_settings_deserialize() {
        let json = r#"{
            "name": "Demo",
            "scope": "global",
            "provider": "scheduler_task",
            "executable": "C:\\Apps\\demo.exe",
            "requires_elevation": true,
            "sentinel": "/autorun"
        }"#;
        let s: StartupSettings = serde_json::from_str(json).unwrap();
        assert_eq!(s.scope, RegistrationScope::Global);
        assert_eq!(s.provider, Some(ProviderKind::SchedulerTask));
        assert_eq!(s.executable.as_deref(), Some(Path::new(r"C:\Apps\demo.exe")));
        assert_eq!(s.requires_elevation, Some(true));
        assert_eq!(s.sentinel.as_deref(), Some("/autorun"));
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let r = serde_json::from_str::<StartupSettings>(r#"{ "name": "x", "provider": "cron" }"#);
        assert!(r.is_err());
    }
}
