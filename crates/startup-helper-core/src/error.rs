//! 错误类型定义。
//!
//! 分类：
//! - [`ConfigError`]：构造配置时的校验失败（快速失败，调用方需修正输入后重新构造）
//! - [`StoreError`]：访问计划任务服务/Run 键存储时的失败；其中权限不足单独区分，
//!   以便注册协议将其按“未找到/无操作”处理
//!
//! 作者：StartupHelper 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::path::PathBuf;

use thiserror::Error;

/// 配置校验错误。
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("可执行文件不存在: {0}")]
    ExecutableNotFound(PathBuf),
    #[error("规则名称不能为空")]
    EmptyName,
    #[error("自启动哨兵参数无效（不能为空且不能包含空白字符）: {0:?}")]
    InvalidSentinel(String),
    #[error("无法确定当前进程的可执行文件路径")]
    CurrentExe(#[source] std::io::Error),
}

/// 提供者存储访问错误。
#[derive(Debug, Error)]
pub enum StoreError {
    /// 权限不足（例如非管理员读写 HKLM）。
    #[error("权限不足: {0}")]
    AccessDenied(String),
    /// 其他未分类的存储失败，原样向上传递。
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoreError {
    /// 是否为权限不足错误。
    pub fn is_access_denied(&self) -> bool {
        matches!(self, StoreError::AccessDenied(_))
    }
}

/// 提供者接口统一返回类型。
pub type StoreResult<T> = Result<T, StoreError>;
