//! 系统能力描述与提供者选择策略。
//!
//! 说明：
//! - 先把原始版本号转换为能力标志（[`OsCapabilities`] / [`SchedulerCapabilities`]），
//!   上层逻辑只根据标志分支，便于在没有真实系统的情况下测试
//! - [`select_provider`] 是纯函数：相同输入永远得到相同结果
//!
//! 作者：StartupHelper 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use crate::model::ProviderKind;

/// 操作系统版本（NT 主/次版本号）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct OsVersion {
    pub major: u32,
    pub minor: u32,
}

impl OsVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// 转换为能力描述。
    pub fn capabilities(self) -> OsCapabilities {
        OsCapabilities {
            scheduler_available: self.major >= 6,
            unelevated_tasks_supported: self >= OsVersion::new(6, 2),
        }
    }
}

/// 操作系统能力。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OsCapabilities {
    /// 是否提供 2.0 任务计划程序（Vista / NT 6.0 起）。
    pub scheduler_available: bool,
    /// 非提权的登录任务是否可靠（NT 6.2 起）。
    pub unelevated_tasks_supported: bool,
}

/// 根据系统能力与提权需求选择提供者。
///
/// 规则：
/// - 计划任务可用，且（需要管理员权限 或 系统支持非提权登录任务）时选择 [`ProviderKind::SchedulerTask`]
/// - 否则回退为 [`ProviderKind::LoginRunKey`]
pub fn select_provider(caps: &OsCapabilities, requires_elevation: bool) -> ProviderKind {
    if caps.scheduler_available && (requires_elevation || caps.unelevated_tasks_supported) {
        ProviderKind::SchedulerTask
    } else {
        ProviderKind::LoginRunKey
    }
}

/// 任务计划程序支持的最高架构版本（`ITaskService::HighestVersion`）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchedulerVersion {
    pub major: u32,
    pub minor: u32,
}

impl SchedulerVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// 从 `HighestVersion` 返回的打包值解析（高 16 位为主版本，低 16 位为次版本）。
    pub fn from_packed(value: u32) -> Self {
        Self::new(value >> 16, value & 0xFFFF)
    }

    pub fn capabilities(self) -> SchedulerCapabilities {
        SchedulerCapabilities {
            run_levels_supported: self >= SchedulerVersion::new(1, 2),
        }
    }
}

/// 任务计划程序能力。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerCapabilities {
    /// 支持运行级别、主体绑定与 V2 兼容设置（架构 1.2 起）。
    pub run_levels_supported: bool,
}
