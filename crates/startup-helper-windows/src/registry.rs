//! 登录 Run 键读写。
//!
//! 主要用途：
//! - 读取/写入/删除 `SOFTWARE\Microsoft\Windows\CurrentVersion\Run` 下的字符串值
//! - HKCU 对应本地作用域，HKLM 对应全局作用域
//!
//! 权限要求：
//! - 读写 HKCU Run 不需要管理员
//! - 写入/删除 HKLM Run 需要管理员；部分机器策略下读取 HKLM 也可能被拒绝
//!
//! 作者：StartupHelper 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::io::ErrorKind;

use anyhow::{Context, Result};
use startup_helper_core::RunKeyHive;
use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, KEY_READ, KEY_SET_VALUE};
use winreg::types::FromRegValue;
use winreg::RegKey;

/// Run 键相对路径。
pub const RUN_KEY: &str = "SOFTWARE\\Microsoft\\Windows\\CurrentVersion\\Run";

fn root(hive: RunKeyHive) -> RegKey {
    match hive {
        RunKeyHive::CurrentUser => RegKey::predef(HKEY_CURRENT_USER),
        RunKeyHive::LocalMachine => RegKey::predef(HKEY_LOCAL_MACHINE),
    }
}

/// 读取 Run 键中的值。
///
/// 参数：
/// - `hive`：根键
/// - `name`：值名
///
/// 返回值：
/// - `Ok(Some(command))`：值存在（非字符串类型的值也视为存在，内容为空串）
/// - `Ok(None)`：Run 键或值不存在
///
/// 异常处理：
/// - 权限不足等其他 I/O 错误原样向上返回（附带上下文）。
pub fn get_run_value(hive: RunKeyHive, name: &str) -> Result<Option<String>> {
    let key = match root(hive).open_subkey_with_flags(RUN_KEY, KEY_READ) {
        Ok(key) => key,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("打开 {} Run 键失败", hive.name()));
        }
    };
    match key.get_raw_value(name) {
        Ok(raw) => Ok(Some(String::from_reg_value(&raw).unwrap_or_default())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("读取 {} Run 值失败: {name}", hive.name())),
    }
}

/// 写入 Run 键中的值（键不存在时创建）。
///
/// 异常处理：
/// - 打开/创建键或写入值失败会返回错误（常见原因：HKLM 权限不足）。
pub fn set_run_value(hive: RunKeyHive, name: &str, command: &str) -> Result<()> {
    let (key, _disp) = root(hive)
        .create_subkey(RUN_KEY)
        .with_context(|| format!("打开/创建 {} Run 键失败", hive.name()))?;
    key.set_value(name, &command)
        .with_context(|| format!("写入 {} Run 值失败: {name}", hive.name()))?;
    Ok(())
}

/// 删除 Run 键中的值。
///
/// 异常处理：
/// - 键或值不存在视为已删除
/// - 权限不足等其他错误会返回错误，由调用方决定是否忽略
pub fn delete_run_value(hive: RunKeyHive, name: &str) -> Result<()> {
    let key = match root(hive).open_subkey_with_flags(RUN_KEY, KEY_SET_VALUE) {
        Ok(key) => key,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(e).with_context(|| format!("打开 {} Run 键失败", hive.name()));
        }
    };
    match key.delete_value(name) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("删除 {} Run 值失败: {name}", hive.name())),
    }
}
