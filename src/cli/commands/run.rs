//! # Run Command Module / 运行命令模块
//!
//! This module implements the `run` command, which drives the project under
//! test through its share of the configuration matrix and reports a verdict
//! per configuration plus the aggregate verdict.
//!
//! 此模块实现了 `run` 命令，它驱动被测项目运行其负责的配置矩阵部分，
//! 并报告每个配置的结论以及总体结论。

use anyhow::Result;
use colored::*;
use std::path::{Path, PathBuf};
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::cli::commands::load_project;
use crate::core::execution::{run_matrix, DriverContext};
use crate::core::generator::generate_matrix;
use crate::core::models::MatrixReport;
use crate::core::planner::plan_execution;
use crate::infra::fs::read_crate_name;
use crate::infra::t;
use crate::infra::toolchain::CargoToolchain;
use crate::reporting::{
    generate_html_report, print_failure_details, print_summary, write_json_report,
};

/// Arguments of the `run` command.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config: Option<PathBuf>,
    pub project_dir: PathBuf,
    pub jobs: usize,
    pub only: Vec<String>,
    pub total_runners: Option<usize>,
    pub runner_index: Option<usize>,
    pub json: Option<PathBuf>,
    pub html: Option<PathBuf>,
    pub keep_workspaces: bool,
    pub lang_is_explicit: bool,
}

/// Executes the run command.
///
/// # Returns
/// `Ok` only when every configuration of this runner passed and every
/// requested report was written.
pub async fn execute(options: RunOptions) -> Result<()> {
    let (project_root, loaded) = load_project(
        &options.project_dir,
        options.config.as_deref(),
        options.lang_is_explicit,
    )?;
    let settings = loaded.settings;

    println!(
        "{}",
        t!("run.project_root_detected", path = project_root.display())
    );
    if let Some(name) = read_crate_name(&project_root)? {
        println!("{}", t!("run.testing_crate", name = name.yellow()));
    }
    match &loaded.source {
        Some(path) => println!("{}", t!("run.loading_settings", path = path.display())),
        None => println!("{}", t!("run.default_settings")),
    }

    let plan = plan_execution(
        generate_matrix(),
        &options.only,
        options.total_runners,
        options.runner_index,
    )?;

    if plan.filtered_count > 0 {
        println!(
            "{}",
            t!(
                "run.filtered_configurations",
                filtered = plan.filtered_count,
                count = plan.configurations.len()
            )
            .cyan()
        );
    }
    if let (true, Some(total), Some(index)) =
        (plan.is_distributed, options.total_runners, options.runner_index)
    {
        println!(
            "{}",
            t!(
                "run.running_as_split_runner",
                index = index + 1,
                total = total,
                count = plan.configurations.len()
            )
            .bold()
        );
    } else {
        println!(
            "{}",
            t!("run.running_as_single_runner", count = plan.configurations.len()).bold()
        );
    }

    if plan.configurations.is_empty() {
        println!("{}", t!("run.no_configurations").green());
        return Ok(());
    }

    let jobs = options.jobs.clamp(1, num_cpus::get().max(1));
    let toolchain = CargoToolchain::default();
    tracing::debug!(program = toolchain.program(), jobs, "starting matrix run");

    let stop_token = setup_signal_handler();
    let ctx = DriverContext {
        toolchain: &toolchain,
        project_root: &project_root,
        settings: &settings,
        keep_workspaces: options.keep_workspaces,
    };
    let mut report = run_matrix(&ctx, plan.configurations, jobs, stop_token).await;

    print_summary(&report);
    print_failure_details(&report);

    let reports = write_reports(&report, options.json.as_deref(), options.html.as_deref());

    if let Some(abort) = report.abort.take() {
        return Err(anyhow::Error::new(abort).context(t!("run.aborted").to_string()));
    }
    if !report.passed() {
        anyhow::bail!(t!("run.matrix_failed").to_string());
    }
    reports
}

/// Writes the requested JSON and HTML reports. Both are attempted; the first
/// failure is returned.
fn write_reports(report: &MatrixReport, json: Option<&Path>, html: Option<&Path>) -> Result<()> {
    let mut first_error = None;

    if let Some(path) = json {
        println!("\n{}", t!("run.writing_json", path = path.display()));
        if let Err(e) = write_json_report(report, path) {
            eprintln!("{} {:#}", t!("run.report_failed").red(), e);
            first_error.get_or_insert(e);
        }
    }
    if let Some(path) = html {
        println!("\n{}", t!("run.writing_html", path = path.display()));
        if let Err(e) = generate_html_report(report, path) {
            eprintln!("{} {:#}", t!("run.report_failed").red(), e);
            first_error.get_or_insert(e);
        }
    }

    first_error.map_or(Ok(()), Err)
}

/// Cancels the returned token on Ctrl-C.
fn setup_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                println!("\n{}", t!("run.shutdown_signal").yellow());
                token_clone.cancel();
            }
            Err(e) => tracing::warn!("failed to listen for Ctrl-C: {e}"),
        }
    });

    token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwritable_report_fails_a_passing_run() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        let report = MatrixReport::default();
        assert!(report.passed());

        let json = blocker.join("report.json");
        let html = dir.path().join("report.html");
        assert!(write_reports(&report, Some(&json), Some(&html)).is_err());
        // The other report is still written.
        assert!(html.is_file());
    }

    #[test]
    fn no_requested_reports_is_ok() {
        assert!(write_reports(&MatrixReport::default(), None, None).is_ok());
    }
}
