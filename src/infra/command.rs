//! # Command Execution Module / 命令执行模块
//!
//! Spawning child processes with combined output capture, and extracting the
//! compiler errors from cargo's JSON message stream.
//!
//! 启动子进程并合并捕获其输出，以及从 cargo 的 JSON 消息流中提取编译器错误。

use colored::*;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::core::models::CargoMessage;
use crate::infra::t;

/// Collects the error diagnostics from `cargo` JSON output, preferring the
/// colorful "rendered" text when present.
///
/// 从 `cargo` 的 JSON 输出中收集错误诊断，优先使用带颜色的 "rendered" 文本。
pub fn compiler_errors(raw_output: &str) -> Vec<String> {
    raw_output
        .lines()
        .filter_map(|line| serde_json::from_str::<CargoMessage>(line).ok())
        .filter(|msg| msg.reason == "compiler-message")
        .filter_map(|msg| msg.message)
        .filter(|diag| diag.level == "error")
        .map(|diag| diag.rendered.unwrap_or(diag.message))
        .collect()
}

/// Extracts and formats compiler errors from `cargo` JSON output.
///
/// # Returns
/// A formatted string containing only the error messages, or a snippet of the
/// raw output if no specific errors can be parsed.
///
/// 从 `cargo` 的 JSON 输出中提取并格式化编译器错误。
pub fn format_build_error_output(raw_output: &str) -> String {
    let error_messages = compiler_errors(raw_output);

    if error_messages.is_empty() {
        // Cargo may fail without a JSON diagnostic (e.g. manifest errors).
        // 如果找不到特定的错误，则返回原始输出的摘要。
        let snippet = raw_output.lines().take(50).collect::<Vec<_>>().join("\n");
        format!("{}\n\n{}", t!("command.error_parse_failed").yellow(), snippet)
    } else {
        error_messages.join("\n")
    }
}

/// Output worth showing for a failed step: the compiler errors when the step
/// failed to build, otherwise everything it printed.
pub fn failure_output(raw_output: &str) -> String {
    let errors = compiler_errors(raw_output);
    if errors.is_empty() {
        raw_output.trim_end().to_string()
    } else {
        errors.join("\n")
    }
}

/// Spawns a command, captures its stdout and stderr.
/// The output streams are read concurrently and combined into a single string.
///
/// # Returns
/// A tuple containing:
/// - The `ExitStatus` of the process wrapped in an `io::Result`.
/// - The combined stdout and stderr as a `String`.
///
/// 派生一个命令，捕获其 stdout 和 stderr。
/// 输出流被并发读取并合并到一个字符串中。
pub async fn spawn_and_capture(
    mut cmd: tokio::process::Command,
) -> (std::io::Result<std::process::ExitStatus>, String) {
    let mut child = match cmd
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => return (Err(e), String::new()),
    };

    let Some(stdout) = child.stdout.take() else {
        return (
            Err(std::io::Error::other(t!("command.capture_stdout_failed").to_string())),
            String::new(),
        );
    };
    let Some(stderr) = child.stderr.take() else {
        return (
            Err(std::io::Error::other(t!("command.capture_stderr_failed").to_string())),
            String::new(),
        );
    };

    // Use an Arc<Mutex<String>> to allow concurrent writes from stdout and stderr tasks.
    // 使用 Arc<Mutex<String>> 来允许多个任务（stdout 和 stderr）并发写入。
    let output = Arc::new(tokio::sync::Mutex::new(String::new()));

    let stdout_output = Arc::clone(&output);
    let stdout_handle = tokio::spawn(async move {
        let mut lines = BufReader::new(stdout).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let mut output = stdout_output.lock().await;
            output.push_str(&line);
            output.push('\n');
        }
    });

    let stderr_output = Arc::clone(&output);
    let stderr_handle = tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let mut output = stderr_output.lock().await;
            output.push_str(&line);
            output.push('\n');
        }
    });

    let status = child.wait().await;

    // Wait for the readers so no trailing output is lost.
    // 等待 stdout 和 stderr 读取任务完成，以确保所有输出都被捕获。
    if let Err(e) = stdout_handle.await {
        tracing::warn!("failed to join stdout reader: {e}");
    }
    if let Err(e) = stderr_handle.await {
        tracing::warn!("failed to join stderr reader: {e}");
    }

    let captured = output.lock().await.clone();
    (status, captured)
}

/// Shell-quoted rendering of a program and its arguments, suitable for
/// pasting into a terminal to reproduce a step by hand.
pub fn render_command_line<I, S>(program: &str, args: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
    let words = std::iter::once(program).chain(args.iter().map(String::as_str));
    shlex::try_join(words).unwrap_or_else(|_| {
        // Only fails on interior NUL bytes; fall back to plain joining.
        std::iter::once(program.to_string())
            .chain(args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    })
}
