//! # HTML Reporting Module / HTML 报告模块
//!
//! This module renders a standalone HTML page with the matrix statistics, one
//! row per configuration and collapsible failure output.
//!
//! 此模块生成一个独立的 HTML 页面，包含矩阵统计、每个配置一行以及可折叠的失败输出。

use anyhow::{Context, Result};
use maud::{html, Markup, PreEscaped, DOCTYPE};
use std::fs;
use std::path::Path;

use crate::core::models::{ConfigVerdict, MatrixReport, VerdictFailure, VerdictStatus};
use crate::infra::t;

const HTML_STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif; margin: 2em; color: #24292f; }
h1 { font-size: 1.6em; }
.summary-container { display: flex; gap: 1.5em; margin-bottom: 1.5em; }
.summary-item { display: flex; flex-direction: column; align-items: center; padding: 0.6em 1.2em; border: 1px solid #d0d7de; border-radius: 6px; }
.summary-item .count { font-size: 1.6em; font-weight: bold; }
.passed-text { color: #1a7f37; }
.failed-text { color: #cf222e; }
.cancelled-text { color: #6e7781; }
table { border-collapse: collapse; width: 100%; }
th, td { border-bottom: 1px solid #d0d7de; padding: 0.4em 0.8em; text-align: left; vertical-align: top; }
.status-cell { display: inline-block; padding: 0.1em 0.6em; border-radius: 4px; color: #fff; }
.status-passed { background: #1a7f37; }
.status-failed, .status-errored { background: #cf222e; }
.status-cancelled { background: #6e7781; }
.verdict-banner { font-weight: bold; margin-bottom: 1em; }
details pre { background: #f6f8fa; padding: 0.8em; overflow-x: auto; white-space: pre-wrap; }
"#;

fn status_class(status: VerdictStatus) -> &'static str {
    match status {
        VerdictStatus::Passed => "status-passed",
        VerdictStatus::Failed => "status-failed",
        VerdictStatus::Errored => "status-errored",
        VerdictStatus::Cancelled => "status-cancelled",
    }
}

fn status_text(status: VerdictStatus) -> String {
    match status {
        VerdictStatus::Passed => t!("status.passed"),
        VerdictStatus::Failed => t!("status.failed"),
        VerdictStatus::Errored => t!("status.errored"),
        VerdictStatus::Cancelled => t!("status.cancelled"),
    }
    .to_string()
}

/// Removes ANSI color sequences, which cargo's rendered diagnostics contain.
fn strip_ansi(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' && chars.peek() == Some(&'[') {
            chars.next();
            for c in chars.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn failure_details(verdict: &ConfigVerdict) -> Markup {
    html! {
        @if let Some(error) = &verdict.error {
            details {
                summary { (error.message) }
                @if let Some(command) = &error.command {
                    p { code { (command) } }
                }
                @if !error.output.is_empty() {
                    pre { (strip_ansi(&error.output)) }
                }
            }
        }
        @for failure in &verdict.failures {
            details {
                @match failure {
                    VerdictFailure::ApplicableTestFailed { test, command, output } => {
                        summary { (t!("details.test_failed", test = test)) }
                        p { code { (command) } }
                        pre { (strip_ansi(output)) }
                    }
                    VerdictFailure::ProbeUnexpectedlyBuilt { test, command } => {
                        summary { (t!("details.probe_built", test = test)) }
                        p { code { (command) } }
                    }
                }
            }
        }
    }
}

/// Renders the HTML page for `report`.
pub fn render_html_report(report: &MatrixReport) -> Markup {
    let total = report.verdicts.len();
    let passed = report.count(VerdictStatus::Passed);
    let failed = report.count(VerdictStatus::Failed) + report.count(VerdictStatus::Errored);
    let cancelled = report.count(VerdictStatus::Cancelled);

    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (t!("html_report.title")) }
                style { (PreEscaped(HTML_STYLE)) }
            }
            body {
                h1 { (t!("html_report.main_header")) }
                @if report.passed() {
                    div class="verdict-banner passed-text" { (t!("summary.all_passed")) }
                } @else {
                    div class="verdict-banner failed-text" { (t!("summary.some_failed")) }
                }
                @if let Some(abort) = &report.abort {
                    p class="failed-text" { (t!("summary.aborted", error = abort)) }
                }
                div class="summary-container" {
                    div class="summary-item" {
                        span class="count" { (total) }
                        span class="label" { (t!("html_report.summary.total")) }
                    }
                    div class="summary-item" {
                        span class="count passed-text" { (passed) }
                        span class="label" { (t!("html_report.summary.passed")) }
                    }
                    div class="summary-item" {
                        span class="count failed-text" { (failed) }
                        span class="label" { (t!("html_report.summary.failed")) }
                    }
                    div class="summary-item" {
                        span class="count cancelled-text" { (cancelled) }
                        span class="label" { (t!("html_report.summary.cancelled")) }
                    }
                }
                table {
                    thead {
                        tr {
                            th { (t!("summary.header.configuration")) }
                            th { (t!("summary.header.status")) }
                            th { (t!("html_report.applicable")) }
                            th { (t!("html_report.expected_failures")) }
                            th { (t!("summary.header.duration")) }
                        }
                    }
                    tbody {
                        @for verdict in &report.verdicts {
                            tr {
                                td { code { (verdict.config_name()) } }
                                td {
                                    div class={ "status-cell " (status_class(verdict.status)) } {
                                        (status_text(verdict.status))
                                    }
                                    (failure_details(verdict))
                                }
                                td { (verdict.applicable.to_string()) }
                                td { (verdict.expected_failures.to_string()) }
                                td { (format!("{:.2}s", verdict.duration.as_secs_f64())) }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Generates the HTML report and writes it to `output_path`.
///
/// 生成 HTML 报告并写入 `output_path`。
///
/// # Errors / 错误
/// Returns an error if the file cannot be written.
/// 如果无法写入文件则返回错误。
pub fn generate_html_report(report: &MatrixReport, output_path: &Path) -> Result<()> {
    let page = render_html_report(report);
    fs::write(output_path, page.into_string())
        .with_context(|| format!("Failed to write HTML report to {}", output_path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{Configuration, LtoMode, OptLevel, TestId};
    use crate::core::resolver::resolve;
    use std::time::Duration;

    #[test]
    fn ansi_sequences_are_stripped() {
        assert_eq!(strip_ansi("\u{1b}[1m\u{1b}[31merror\u{1b}[0m: x"), "error: x");
    }

    #[test]
    fn page_lists_configurations_and_escapes_output() {
        let config = Configuration::new(false, OptLevel::O1, LtoMode::None);
        let applicability = resolve(&config);
        let report = MatrixReport {
            verdicts: vec![ConfigVerdict {
                config,
                status: VerdictStatus::Failed,
                applicable: applicability.applicable,
                expected_failures: applicability.expected_failures,
                failures: vec![VerdictFailure::ApplicableTestFailed {
                    test: TestId::Opt1,
                    command: "cargo test --test opt-1".to_string(),
                    output: "<script>".to_string(),
                }],
                error: None,
                duration: Duration::from_secs(2),
                preserved_workspace: None,
            }],
            abort: None,
        };

        let page = render_html_report(&report).into_string();
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("o1-none"));
        assert!(page.contains("status-failed"));
        assert!(page.contains("&lt;script&gt;"));
        assert!(!page.contains("<script>"));
    }
}
