//! # Plan Command Module / 计划命令模块
//!
//! Prints the configuration matrix with the tests each configuration must
//! pass and the probes it must fail to build. Never invokes the toolchain.
//!
//! 打印配置矩阵，以及每个配置必须通过的测试和必须构建失败的探针。从不调用工具链。

use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::commands::load_project;
use crate::core::config::MatrixSettings;
use crate::core::generator::generate_matrix;
use crate::core::models::{Configuration, TestSet};
use crate::core::planner::plan_execution;
use crate::core::profile::profile_name;
use crate::core::resolver::resolve;
use crate::infra::t;

/// Arguments of the `plan` command.
#[derive(Debug, Clone)]
pub struct PlanOptions {
    pub config: Option<PathBuf>,
    pub project_dir: PathBuf,
    pub only: Vec<String>,
    pub json: bool,
    pub lang_is_explicit: bool,
}

/// One row of the plan.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedConfiguration {
    pub config_name: String,
    pub profile: String,
    pub debug_assertions: bool,
    /// `opt-level` value: `0`..`3`, `s` or `z`.
    pub opt_level: &'static str,
    pub lto: &'static str,
    pub applicable: TestSet,
    pub expected_failures: TestSet,
}

impl PlannedConfiguration {
    pub fn new(config: &Configuration, settings: &MatrixSettings) -> Self {
        let applicability = resolve(config);
        Self {
            config_name: config.name(),
            profile: profile_name(&settings.profile_prefix, config),
            debug_assertions: config.debug_assertions,
            opt_level: config.opt_level.short_name(),
            lto: config.lto.short_name(),
            applicable: applicability.applicable,
            expected_failures: applicability.expected_failures,
        }
    }
}

/// Executes the plan command.
pub fn execute(options: PlanOptions) -> Result<()> {
    let (_, loaded) = load_project(
        &options.project_dir,
        options.config.as_deref(),
        options.lang_is_explicit,
    )?;
    let plan = plan_execution(generate_matrix(), &options.only, None, None)?;
    let rows: Vec<PlannedConfiguration> = plan
        .configurations
        .iter()
        .map(|config| PlannedConfiguration::new(config, &loaded.settings))
        .collect();

    if options.json {
        let json = serde_json::to_string_pretty(&rows).context("Failed to serialize plan")?;
        println!("{json}");
        return Ok(());
    }

    println!("{}", t!("plan.banner", count = rows.len()).bold());
    println!(
        "  {:<16} | {:<22} | {:<24} | {}",
        t!("summary.header.configuration"),
        t!("plan.header.profile"),
        t!("html_report.applicable"),
        t!("html_report.expected_failures"),
    );
    for row in &rows {
        println!(
            "  {:<16} | {:<22} | {:<24} | {}",
            row.config_name.cyan(),
            row.profile,
            row.applicable.to_string().green(),
            row.expected_failures.to_string().red()
        );
    }
    Ok(())
}
