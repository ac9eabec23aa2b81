//! 任务计划程序（Task Scheduler 2.0 COM 接口）。
//!
//! 主要用途：
//! - 在根目录（`\`）下按名称查找、删除、创建或更新登录触发任务
//! - 查询服务支持的最高任务架构版本（决定是否可设置运行级别与主体绑定）
//!
//! 资源约定：
//! - 每次调用都独立完成 COM 初始化、连接服务与释放，调用之间不持有服务对象
//!
//! 作者：StartupHelper 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::time::Duration;

use anyhow::{Context, Result};
use startup_helper_core::capability::SchedulerVersion;
use startup_helper_core::task::{
    LogonType, PrincipalBinding, RegisteredTask, RunLevel, TaskDefinition, TaskSettings,
};
use tracing::debug;
use windows::core::{Interface, BSTR, VARIANT};
use windows::Win32::Foundation::{VARIANT_BOOL, VARIANT_FALSE, VARIANT_TRUE};
use windows::Win32::System::Com::{CoCreateInstance, CLSCTX_INPROC_SERVER};
use windows::Win32::System::TaskScheduler::{
    IExecAction, ILogonTrigger, ITaskDefinition, ITaskFolder, ITaskService,
    TaskScheduler as TASKSERVICE_CLSID, TASK_ACTION_EXEC, TASK_COMPATIBILITY_V2,
    TASK_CREATE_OR_UPDATE, TASK_LOGONTYPE, TASK_LOGON_GROUP, TASK_LOGON_INTERACTIVE_TOKEN,
    TASK_LOGON_NONE, TASK_RUNLEVEL_HIGHEST, TASK_RUNLEVEL_LUA, TASK_TRIGGER_LOGON,
};

use crate::com::ComApartment;

/// 连接本机任务计划服务并打开根目录后执行 `f`。
///
/// 异常处理：
/// - COM 初始化、创建服务实例、连接或打开根目录失败都会返回错误。
fn with_task_service<T>(f: impl FnOnce(&ITaskService, &ITaskFolder) -> Result<T>) -> Result<T> {
    let _apartment = ComApartment::enter()?;
    unsafe {
        let service: ITaskService = CoCreateInstance(&TASKSERVICE_CLSID, None, CLSCTX_INPROC_SERVER)
            .context("创建 TaskScheduler 实例失败")?;
        service
            .Connect(
                &VARIANT::default(),
                &VARIANT::default(),
                &VARIANT::default(),
                &VARIANT::default(),
            )
            .context("连接任务计划服务失败")?;
        let folder = service
            .GetFolder(&BSTR::from("\\"))
            .context("打开任务计划根目录失败")?;
        f(&service, &folder)
    }
}

/// 任务或路径不存在（`ERROR_FILE_NOT_FOUND` / `ERROR_PATH_NOT_FOUND`）。
fn is_not_found(err: &windows::core::Error) -> bool {
    matches!(err.code().0 as u32, 0x8007_0002 | 0x8007_0003)
}

fn variant_bool(value: bool) -> VARIANT_BOOL {
    if value {
        VARIANT_TRUE
    } else {
        VARIANT_FALSE
    }
}

/// 将时长格式化为 ISO 8601 持续时间（`PT0S` 表示不限时）。
fn iso8601_duration(limit: Option<Duration>) -> String {
    format!("PT{}S", limit.map(|d| d.as_secs()).unwrap_or(0))
}

/// 按名称查找根目录下的任务。
///
/// 返回值：
/// - `Ok(Some(task))`：任务存在，`user_id` 取自任务主体（可能为空）
/// - `Ok(None)`：任务不存在
pub fn find_task(name: &str) -> Result<Option<RegisteredTask>> {
    with_task_service(|_, folder| unsafe {
        let task = match folder.GetTask(&BSTR::from(name)) {
            Ok(task) => task,
            Err(e) if is_not_found(&e) => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("查找计划任务失败: {name}")),
        };
        let definition = task
            .Definition()
            .with_context(|| format!("读取计划任务定义失败: {name}"))?;
        let user_id = definition
            .Principal()
            .and_then(|principal| principal.UserId())
            .map(|user| user.to_string())
            .ok();
        Ok(Some(RegisteredTask {
            name: name.to_string(),
            user_id,
        }))
    })
}

/// 删除任务；任务不存在视为成功。
pub fn delete_task(name: &str) -> Result<()> {
    with_task_service(|_, folder| unsafe {
        match folder.DeleteTask(&BSTR::from(name), 0) {
            Ok(()) => {
                debug!("已删除计划任务: {name}");
                Ok(())
            }
            Err(e) if is_not_found(&e) => Ok(()),
            Err(e) => Err(e).with_context(|| format!("删除计划任务失败: {name}")),
        }
    })
}

/// 查询支持的最高任务架构版本。
pub fn highest_version() -> Result<SchedulerVersion> {
    with_task_service(|service, _| unsafe {
        let packed = service.HighestVersion().context("查询任务计划程序版本失败")?;
        Ok(SchedulerVersion::from_packed(packed))
    })
}

/// 以“创建或更新”方式注册任务。
///
/// 参数：
/// - `name`：任务名（位于根目录）
/// - `definition`：平台无关的任务定义
///
/// 异常处理：
/// - 任一 COM 调用失败都会返回错误；权限不足时错误码为 `E_ACCESSDENIED`。
pub fn register_task(name: &str, definition: &TaskDefinition) -> Result<()> {
    with_task_service(|service, folder| unsafe {
        let task = service.NewTask(0).context("创建任务定义失败")?;
        apply_settings(&task, &definition.settings)?;
        let logon_type = apply_principal(&task, definition)?;

        let triggers = task.Triggers().context("读取触发器集合失败")?;
        let trigger: ILogonTrigger = triggers
            .Create(TASK_TRIGGER_LOGON)
            .context("创建登录触发器失败")?
            .cast()
            .context("转换为登录触发器失败")?;
        if let Some(user) = &definition.trigger.user_id {
            trigger
                .SetUserId(&BSTR::from(user.as_str()))
                .context("设置触发用户失败")?;
        }

        let actions = task.Actions().context("读取操作集合失败")?;
        let exec: IExecAction = actions
            .Create(TASK_ACTION_EXEC)
            .context("创建启动程序操作失败")?
            .cast()
            .context("转换为启动程序操作失败")?;
        let action = &definition.action;
        exec.SetPath(&BSTR::from(&*action.path.to_string_lossy()))
            .context("设置程序路径失败")?;
        exec.SetArguments(&BSTR::from(action.arguments.as_str()))
            .context("设置启动参数失败")?;
        exec.SetWorkingDirectory(&BSTR::from(&*action.working_directory.to_string_lossy()))
            .context("设置工作目录失败")?;

        let user = match &definition.principal.binding {
            Some(PrincipalBinding::User(account)) | Some(PrincipalBinding::Group(account)) => {
                VARIANT::from(BSTR::from(account.as_str()))
            }
            None => VARIANT::default(),
        };
        folder
            .RegisterTaskDefinition(
                &BSTR::from(name),
                &task,
                TASK_CREATE_OR_UPDATE.0,
                &user,
                &VARIANT::default(),
                logon_type,
                &VARIANT::default(),
            )
            .with_context(|| format!("注册计划任务失败: {name}"))?;
        debug!("计划任务定义已提交: {name}");
        Ok(())
    })
}

unsafe fn apply_settings(task: &ITaskDefinition, settings: &TaskSettings) -> Result<()> {
    let target = task.Settings().context("读取任务设置失败")?;
    target
        .SetDisallowStartIfOnBatteries(variant_bool(settings.disallow_start_if_on_batteries))
        .context("设置电池策略失败")?;
    target
        .SetExecutionTimeLimit(&BSTR::from(iso8601_duration(settings.execution_time_limit).as_str()))
        .context("设置执行时限失败")?;
    if settings.compatibility_v2 {
        target
            .SetCompatibility(TASK_COMPATIBILITY_V2)
            .context("设置任务兼容性失败")?;
        target
            .SetAllowDemandStart(variant_bool(settings.allow_demand_start))
            .context("设置按需启动失败")?;
        target
            .SetAllowHardTerminate(variant_bool(settings.allow_hard_terminate))
            .context("设置强制终止失败")?;
        target
            .SetStartWhenAvailable(variant_bool(settings.start_when_available))
            .context("设置错过后尽快启动失败")?;
    }
    Ok(())
}

/// 写入任务主体，返回注册时使用的登录类型。
unsafe fn apply_principal(task: &ITaskDefinition, definition: &TaskDefinition) -> Result<TASK_LOGONTYPE> {
    let target = task.Principal().context("读取任务主体失败")?;
    let principal = &definition.principal;
    if let Some(level) = principal.run_level {
        let level = match level {
            RunLevel::Highest => TASK_RUNLEVEL_HIGHEST,
            RunLevel::LeastPrivilege => TASK_RUNLEVEL_LUA,
        };
        target.SetRunLevel(level).context("设置运行级别失败")?;
    }
    match &principal.binding {
        Some(PrincipalBinding::User(user)) => {
            target
                .SetUserId(&BSTR::from(user.as_str()))
                .context("设置任务用户失败")?;
        }
        Some(PrincipalBinding::Group(group)) => {
            target
                .SetGroupId(&BSTR::from(group.as_str()))
                .context("设置任务用户组失败")?;
        }
        None => {}
    }
    let logon_type = task_logon_type(definition.logon_type());
    target.SetLogonType(logon_type).context("设置登录类型失败")?;
    Ok(logon_type)
}

fn task_logon_type(logon: LogonType) -> TASK_LOGONTYPE {
    match logon {
        LogonType::InteractiveToken => TASK_LOGON_INTERACTIVE_TOKEN,
        LogonType::Group => TASK_LOGON_GROUP,
        LogonType::Unspecified => TASK_LOGON_NONE,
    }
}
