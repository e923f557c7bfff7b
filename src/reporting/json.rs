//! # JSON Reporting Module / JSON 报告模块
//!
//! Machine-readable verdict records for CI: one record per configuration plus
//! the aggregate verdict of the run.
//!
//! 供 CI 使用的机器可读结论记录：每个配置一条记录，以及本次运行的总体结论。

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::core::models::{ConfigError, MatrixReport, TestId, VerdictStatus};

/// One configuration's verdict as written to the JSON report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerdictRecord<'a> {
    pub config_name: String,
    pub passed: bool,
    pub failed_tests: Vec<TestId>,
    pub unexpectedly_built_probes: Vec<TestId>,
    pub status: VerdictStatus,
    pub duration_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a ConfigError>,
}

/// The whole JSON document.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aborted: Option<String>,
    pub verdicts: Vec<VerdictRecord<'a>>,
}

impl<'a> JsonReport<'a> {
    pub fn from_report(report: &'a MatrixReport, generated_at: DateTime<Utc>) -> Self {
        let verdicts = report
            .verdicts
            .iter()
            .map(|v| VerdictRecord {
                config_name: v.config_name(),
                passed: v.passed(),
                failed_tests: v.failed_tests(),
                unexpectedly_built_probes: v.unexpectedly_built_probes(),
                status: v.status,
                duration_secs: v.duration.as_secs_f64(),
                error: v.error.as_ref(),
            })
            .collect();

        Self {
            generated_at,
            passed: report.passed(),
            aborted: report.abort.as_ref().map(ToString::to_string),
            verdicts,
        }
    }
}

/// Writes the JSON report for `report` to `output_path`.
///
/// 将 `report` 的 JSON 报告写入 `output_path`。
pub fn write_json_report(report: &MatrixReport, output_path: &Path) -> Result<()> {
    let document = JsonReport::from_report(report, Utc::now());
    let json = serde_json::to_string_pretty(&document).context("Failed to serialize JSON report")?;
    fs::write(output_path, json)
        .with_context(|| format!("Failed to write JSON report to {}", output_path.display()))?;
    Ok(())
}
