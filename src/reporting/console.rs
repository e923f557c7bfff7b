//! # Console Reporting Module / 控制台报告模块
//!
//! This module prints the end-of-run summary table and the details of every
//! configuration that did not pass, including the commands that reproduce
//! each failure by hand.
//!
//! 此模块打印运行结束时的摘要表格，以及每个未通过配置的详细信息，
//! 包括可手动复现每个失败的命令。

use colored::*;

use crate::core::models::{ConfigVerdict, MatrixReport, TestSet, VerdictFailure, VerdictStatus};
use crate::infra::command::failure_output;
use crate::infra::t;

fn status_label(status: VerdictStatus) -> ColoredString {
    match status {
        VerdictStatus::Passed => t!("status.passed").green(),
        VerdictStatus::Failed => t!("status.failed").red(),
        VerdictStatus::Errored => t!("status.errored").red().bold(),
        VerdictStatus::Cancelled => t!("status.cancelled").dimmed(),
    }
}

/// Prints a formatted summary of all verdicts and the aggregate verdict.
///
/// 在控制台打印所有结论的格式化摘要以及总体结论。
///
/// # Output Format / 输出格式
/// ```text
/// --- Matrix Summary ---
///   - Passed     | o0-none          | -                    | -                    |    1.23s
///   - Failed     | o2-fat           | lto                  | fail                 |    4.56s
/// ```
pub fn print_summary(report: &MatrixReport) {
    println!("\n{}", t!("summary.banner").bold());
    println!(
        "  - {:<10} | {:<16} | {:<20} | {:<20} | {:>8}",
        t!("summary.header.status"),
        t!("summary.header.configuration"),
        t!("summary.header.failed_tests"),
        t!("summary.header.built_probes"),
        t!("summary.header.duration"),
    );

    for verdict in &report.verdicts {
        let duration = if verdict.status == VerdictStatus::Cancelled {
            "N/A".to_string()
        } else {
            format!("{:.2}s", verdict.duration.as_secs_f64())
        };
        let failed: TestSet = verdict.failed_tests().into_iter().collect();
        let built: TestSet = verdict.unexpectedly_built_probes().into_iter().collect();
        println!(
            "  - {:<10} | {:<16} | {:<20} | {:<20} | {:>8}",
            status_label(verdict.status),
            verdict.config_name(),
            failed.to_string(),
            built.to_string(),
            duration
        );
    }

    println!();
    println!(
        "{}",
        t!(
            "summary.counts",
            total = report.verdicts.len(),
            passed = report.count(VerdictStatus::Passed),
            failed = report.count(VerdictStatus::Failed),
            errored = report.count(VerdictStatus::Errored),
            cancelled = report.count(VerdictStatus::Cancelled)
        )
    );

    if let Some(abort) = &report.abort {
        println!("{}", t!("summary.aborted", error = abort).red().bold());
    }

    if report.passed() {
        println!("{}", t!("summary.all_passed").green().bold());
    } else {
        println!("{}", t!("summary.some_failed").red().bold());
    }
}

fn print_verdict_details(verdict: &ConfigVerdict, index: usize, total: usize) {
    println!(
        "[{}/{}] {} '{}' ({})",
        index,
        total,
        t!("details.configuration").red(),
        verdict.config_name().cyan(),
        status_label(verdict.status)
    );

    if let Some(error) = &verdict.error {
        println!("  {}", error.message.red());
        if let Some(command) = &error.command {
            println!("  {} {}", t!("details.reproduce").yellow(), command);
        }
        if !error.output.is_empty() {
            println!("\n--- {} ---\n", t!("details.toolchain_log").yellow());
            println!("{}", failure_output(&error.output));
        }
    }

    for failure in &verdict.failures {
        match failure {
            VerdictFailure::ApplicableTestFailed {
                test,
                command,
                output,
            } => {
                println!("  {}", t!("details.test_failed", test = test).red());
                println!("  {} {}", t!("details.reproduce").yellow(), command);
                println!("\n--- {} ---\n", t!("details.test_log").yellow());
                println!("{}", failure_output(output));
            }
            VerdictFailure::ProbeUnexpectedlyBuilt { test, command } => {
                println!("  {}", t!("details.probe_built", test = test).red());
                println!("  {} {}", t!("details.reproduce").yellow(), command);
            }
        }
    }

    if let Some(path) = &verdict.preserved_workspace {
        println!(
            "  {}",
            t!("details.workspace", path = path.display()).yellow()
        );
    }
    println!("\n{}", "-".repeat(80));
}

/// Prints detailed information about every failed or errored configuration.
/// Cancelled configurations carry no details and are skipped.
///
/// 打印每个失败或出错配置的详细信息。已取消的配置没有详细信息，会被跳过。
pub fn print_failure_details(report: &MatrixReport) {
    let problems: Vec<&ConfigVerdict> = report
        .verdicts
        .iter()
        .filter(|v| matches!(v.status, VerdictStatus::Failed | VerdictStatus::Errored))
        .collect();
    if problems.is_empty() {
        return;
    }

    println!("\n{}", t!("details.banner").red().bold());
    println!("{}", "-".repeat(80));
    for (i, verdict) in problems.iter().enumerate() {
        print_verdict_details(verdict, i + 1, problems.len());
    }
}
