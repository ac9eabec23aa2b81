//! 文件系统大小写敏感性探测与工作目录校正。
//!
//! 说明：
//! - 大小写敏感性在进程生命周期内不会变化，探测一次后缓存；并发下重复探测结果相同，无需加锁
//! - 工作目录校正建议在程序启动时调用一次，使相对路径的解析不受启动方式影响
//!
//! 作者：StartupHelper 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::StartupConfiguration;

static CASE_SENSITIVE: OnceCell<bool> = OnceCell::new();

/// 当前文件系统（临时目录所在卷）是否区分大小写。
///
/// 探测方式：
/// - 在临时目录创建一个文件名含大小写字母的文件，再分别以全小写、全大写路径检查其是否存在
/// - 任一变体不存在即视为区分大小写
///
/// 异常处理：
/// - 无法创建探测文件时按“区分大小写”处理（更保守的比较方式），且不缓存该结果
pub fn is_file_system_case_sensitive() -> bool {
    if let Some(v) = CASE_SENSITIVE.get() {
        return *v;
    }
    match probe_case_sensitivity() {
        Ok(v) => *CASE_SENSITIVE.get_or_init(|| v),
        Err(e) => {
            warn!("大小写敏感性探测失败，按区分大小写处理: {e:#}");
            true
        }
    }
}

fn probe_case_sensitivity() -> Result<bool> {
    let probe = std::env::temp_dir().join(format!("StartupHelper-Probe-{}.tmp", Uuid::new_v4()));
    std::fs::write(&probe, b"")
        .with_context(|| format!("创建探测文件失败: {}", probe.display()))?;
    let _cleanup = RemoveOnDrop(probe.clone());

    let raw = probe.to_string_lossy();
    let lower = PathBuf::from(raw.to_lowercase());
    let upper = PathBuf::from(raw.to_uppercase());
    let sensitive = !lower.exists() || !upper.exists();
    debug!("文件系统大小写敏感: {sensitive}");
    Ok(sensitive)
}

/// 按文件系统大小写规则比较两个路径（先规范化为绝对路径）。
pub fn same_directory(a: &Path, b: &Path) -> bool {
    let a = full_path(a);
    let b = full_path(b);
    if is_file_system_case_sensitive() {
        a == b
    } else {
        a.to_string_lossy().to_lowercase() == b.to_string_lossy().to_lowercase()
    }
}

/// 若当前工作目录与配置中的不同，则切换到配置的工作目录。
///
/// 返回值：
/// - `Ok(true)`：发生了切换
/// - `Ok(false)`：已一致，未切换
///
/// 异常处理：
/// - 读取或设置当前目录失败时返回错误
pub fn normalize_working_directory(config: &StartupConfiguration) -> Result<bool> {
    let current = std::env::current_dir().context("读取当前工作目录失败")?;
    let target = config.working_directory();
    if same_directory(&current, target) {
        return Ok(false);
    }
    std::env::set_current_dir(target)
        .with_context(|| format!("切换工作目录失败: {}", target.display()))?;
    info!("工作目录已切换: {} -> {}", current.display(), target.display());
    Ok(true)
}

fn full_path(p: &Path) -> PathBuf {
    std::path::absolute(p).unwrap_or_else(|_| p.to_path_buf())
}

/// 离开作用域时删除探测文件。
struct RemoveOnDrop(PathBuf);

impl Drop for RemoveOnDrop {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}
