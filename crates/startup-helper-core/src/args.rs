//! 命令行参数处理：哨兵参数识别、应用参数过滤、启动命令拼接。
//!
//! 约定：
//! - 参数向量与 `std::env::args_os()` 一致（有损转换为字符串）：第 0 项通常是可执行文件路径
//! - 哨兵比较忽略首尾空白与大小写
//!
//! 作者：StartupHelper 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::ffi::OsString;
use std::path::Path;

/// 将原始参数转换为字符串；无法按 Unicode 解码的部分替换为 `U+FFFD`。
pub fn lossy_arguments<I>(argv: I) -> Vec<String>
where
    I: IntoIterator<Item = OsString>,
{
    argv.into_iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

/// 当前进程的参数向量（不会因非 Unicode 参数而 panic）。
pub fn process_arguments() -> Vec<String> {
    lossy_arguments(std::env::args_os())
}

/// 判断单个参数是否等于哨兵。
pub fn matches_sentinel(token: &str, sentinel: &str) -> bool {
    token.trim().to_lowercase() == sentinel.trim().to_lowercase()
}

/// 判断哨兵字符串是否合法（去除首尾空白后非空，且内部不含空白字符）。
pub fn is_valid_sentinel(sentinel: &str) -> bool {
    let trimmed = sentinel.trim();
    !trimmed.is_empty() && !trimmed.chars().any(char::is_whitespace)
}

/// 判断参数向量是否表示一次自启动会话。
///
/// 第 0 或第 1 个参数等于哨兵时返回 `true`（第 0 项可能是可执行文件路径，也可能不是，取决于启动方式）。
pub fn is_started_via_auto_start<S: AsRef<str>>(args: &[S], sentinel: &str) -> bool {
    args.iter()
        .take(2)
        .any(|a| matches_sentinel(a.as_ref(), sentinel))
}

/// 从参数向量中去掉可执行文件路径与哨兵，返回应用真正需要处理的参数。
///
/// 行为：
/// - 第 1 项是哨兵时跳过前两项（路径 + 哨兵），否则跳过第 0 项
/// - 其余位置出现的哨兵同样被剔除，保证结果中永远不含哨兵
/// - 剩余参数保持原有顺序
pub fn application_arguments<S: AsRef<str>>(args: &[S], sentinel: &str) -> Vec<String> {
    let skip = match args {
        [] => return Vec::new(),
        [_, second, ..] if matches_sentinel(second.as_ref(), sentinel) => 2,
        _ => 1,
    };
    args[skip..]
        .iter()
        .map(|a| a.as_ref())
        .filter(|a| !matches_sentinel(a, sentinel))
        .map(str::to_string)
        .collect()
}

/// 拼接传给自启动程序的参数：`<哨兵> <额外参数>`。
///
/// 额外参数为空时不追加多余空格。
pub fn startup_arguments(sentinel: &str, extra: Option<&str>) -> String {
    match extra.map(str::trim).filter(|e| !e.is_empty()) {
        Some(extra) => format!("{sentinel} {extra}"),
        None => sentinel.to_string(),
    }
}

/// 拼接写入 Run 键的完整命令：`"<可执行文件>" <哨兵> <额外参数>`。
pub fn run_key_command(executable: &Path, sentinel: &str, extra: Option<&str>) -> String {
    format!(
        "\"{}\" {}",
        executable.display(),
        startup_arguments(sentinel, extra)
    )
}
