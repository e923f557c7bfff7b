//! # Matrix Driver / 矩阵驱动器
//!
//! Runs one configuration end to end and the whole matrix on top of it.
//!
//! For a configuration the pipeline is: materialize the build profile into a
//! staged workspace, refresh the dependency lock, run the doc/inline tests as
//! a smoke test, run every applicable test expecting success, then build every
//! expected-failure probe expecting the build to fail.
//!
//! 端到端地运行单个配置，并在此基础上运行整个矩阵。
//! 单个配置的流程为：在暂存工作区中生成构建 profile，刷新依赖锁，运行文档/内联测试
//! 作为冒烟测试，运行每个适用测试并期望成功，然后构建每个预期失败的探针并期望构建失败。

use colored::*;
use futures::{stream, StreamExt};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::core::config::MatrixSettings;
use crate::core::error::{MatrixError, Step};
use crate::core::models::{
    ConfigError, ConfigVerdict, Configuration, MatrixReport, VerdictFailure, VerdictStatus,
};
use crate::core::profile::{append_profile, ProfileBlock};
use crate::core::resolver::{resolve, Applicability};
use crate::infra::command::format_build_error_output;
use crate::infra::fs::{preserve_workspace, stage_workspace, Workspace};
use crate::infra::t;
use crate::infra::toolchain::{Invocation, StepOutput, Toolchain};

/// Shared, read-only inputs of a matrix run.
pub struct DriverContext<'a, T: Toolchain> {
    pub toolchain: &'a T,
    /// Root of the project under test. Never modified.
    pub project_root: &'a Path,
    pub settings: &'a MatrixSettings,
    /// Keep staged workspaces of configurations that did not pass.
    pub keep_workspaces: bool,
}

impl From<MatrixError> for ConfigError {
    fn from(err: MatrixError) -> Self {
        let message = err.to_string();
        match err {
            MatrixError::ToolchainInfrastructure {
                command, output, ..
            } => ConfigError {
                message,
                command: Some(command),
                output,
            },
            _ => ConfigError {
                message,
                command: None,
                output: String::new(),
            },
        }
    }
}

/// Materializes `config` into a fresh workspace and describes how to invoke
/// the toolchain there.
fn materialize(
    ctx_root: &Path,
    settings: &MatrixSettings,
    config: &Configuration,
) -> Result<(Workspace, Invocation), MatrixError> {
    let block = ProfileBlock::for_configuration(config, settings)?;
    let workspace = stage_workspace(ctx_root, &config.name())?;
    append_profile(&workspace.manifest_path, &block)?;

    let invocation = Invocation {
        config_name: config.name(),
        workspace: workspace.root.clone(),
        target_dir: workspace.target_dir.clone(),
        profile: block.name,
        features: settings.features_arg(),
    };
    Ok((workspace, invocation))
}

/// Turns an unsuccessful infrastructure step into an error.
fn ensure_step(inv: &Invocation, step: Step, out: StepOutput) -> Result<(), MatrixError> {
    if out.success {
        Ok(())
    } else {
        Err(MatrixError::ToolchainInfrastructure {
            config: inv.config_name.clone(),
            step,
            command: out.command,
            output: out.output,
        })
    }
}

/// Toolchain part of the pipeline. Verdict failures are pushed to
/// `failures`; any `Err` is fatal for the configuration.
async fn drive<T: Toolchain>(
    ctx: &DriverContext<'_, T>,
    inv: &Invocation,
    applicability: &Applicability,
    failures: &mut Vec<VerdictFailure>,
) -> Result<(), MatrixError> {
    let lock = ctx.toolchain.lock_dependencies(inv).await?;
    ensure_step(inv, Step::LockDependencies, lock)?;

    let inline = ctx.toolchain.run_inline_tests(inv).await?;
    ensure_step(inv, Step::InlineTests, inline)?;

    for test in applicability.applicable.iter() {
        let target = ctx.settings.targets.target_for(test);
        let out = ctx.toolchain.run_test_suite(inv, target).await?;
        if out.success {
            println!("  {}", t!("run.test_passed", test = test).green());
        } else {
            println!("  {}", t!("run.test_failed", test = test).red());
            failures.push(VerdictFailure::ApplicableTestFailed {
                test,
                command: out.command,
                output: out.output,
            });
        }
    }

    for test in applicability.expected_failures.iter() {
        let target = ctx.settings.targets.target_for(test);
        let out = ctx.toolchain.build_test_target(inv, target).await?;
        if out.success {
            println!("  {}", t!("run.probe_built", test = test).red());
            failures.push(VerdictFailure::ProbeUnexpectedlyBuilt {
                test,
                command: out.command,
            });
        } else {
            println!("  {}", t!("run.probe_rejected", test = test).green());
            tracing::debug!(
                config = %inv.config_name,
                %test,
                errors = %format_build_error_output(&out.output),
                "probe rejected by the toolchain"
            );
        }
    }

    Ok(())
}

/// Runs a single configuration.
///
/// Returns `Err` only for systemic errors that should abort the whole run.
/// Every other problem ends up in the returned verdict.
///
/// 运行单个配置。仅在应中止整个运行的系统性错误时返回 `Err`，其他问题都记录在返回的结论中。
pub async fn run_configuration<T: Toolchain>(
    ctx: &DriverContext<'_, T>,
    config: Configuration,
) -> Result<ConfigVerdict, MatrixError> {
    let started = Instant::now();
    let name = config.name();
    let applicability = resolve(&config);

    println!(
        "{}",
        t!(
            "run.config_start",
            name = name,
            applicable = applicability.applicable,
            expected = applicability.expected_failures
        )
        .blue()
        .bold()
    );

    let mut failures = Vec::new();
    let (workspace, result) = match materialize(ctx.project_root, ctx.settings, &config) {
        Ok((workspace, inv)) => {
            let result = drive(ctx, &inv, &applicability, &mut failures).await;
            (Some(workspace), result)
        }
        Err(err) => (None, Err(err)),
    };

    let (status, error) = match result {
        Err(err) if err.is_systemic() => return Err(err),
        Err(err) => {
            tracing::debug!(config = %name, error = %err, "configuration errored");
            (VerdictStatus::Errored, Some(ConfigError::from(err)))
        }
        Ok(()) if failures.is_empty() => (VerdictStatus::Passed, None),
        Ok(()) => (VerdictStatus::Failed, None),
    };

    let mut preserved_workspace = None;
    if status != VerdictStatus::Passed && ctx.keep_workspaces {
        if let Some(workspace) = &workspace {
            match preserve_workspace(workspace, ctx.project_root, &name) {
                Ok(path) => {
                    println!(
                        "  {}",
                        t!("run.workspace_preserved", path = path.display()).yellow()
                    );
                    preserved_workspace = Some(path);
                }
                Err(err) => tracing::warn!(config = %name, error = %err, "could not preserve workspace"),
            }
        }
    }

    let duration = started.elapsed();
    let secs = format!("{:.2}", duration.as_secs_f64());
    match status {
        VerdictStatus::Passed => {
            println!("{}", t!("run.config_passed", name = name, duration = secs).green())
        }
        VerdictStatus::Failed => {
            println!("{}", t!("run.config_failed", name = name, duration = secs).red())
        }
        _ => println!(
            "{}",
            t!(
                "run.config_errored",
                name = name,
                error = error.as_ref().map(|e| e.message.as_str()).unwrap_or_default()
            )
            .red()
        ),
    }

    Ok(ConfigVerdict {
        config,
        status,
        applicable: applicability.applicable,
        expected_failures: applicability.expected_failures,
        failures,
        error,
        duration,
        preserved_workspace,
    })
}

fn cancelled_verdict(config: Configuration) -> ConfigVerdict {
    let applicability = resolve(&config);
    ConfigVerdict {
        config,
        status: VerdictStatus::Cancelled,
        applicable: applicability.applicable,
        expected_failures: applicability.expected_failures,
        failures: vec![],
        error: None,
        duration: Duration::ZERO,
        preserved_workspace: None,
    }
}

/// Runs every configuration and collects all verdicts in input order.
///
/// Verdict failures never stop the run. A systemic error, or cancellation of
/// `stop_token`, stops scheduling further configurations; those are reported
/// as cancelled. At most `jobs` configurations run at once.
///
/// 运行所有配置并按输入顺序收集全部结论。结论失败不会停止运行。
/// 系统性错误或 `stop_token` 被取消时，停止调度后续配置，这些配置被报告为已取消。
pub async fn run_matrix<T: Toolchain>(
    ctx: &DriverContext<'_, T>,
    configurations: Vec<Configuration>,
    jobs: usize,
    stop_token: CancellationToken,
) -> MatrixReport {
    // A child token lets a systemic failure stop this run without
    // cancelling the caller's token.
    let run_token = stop_token.child_token();

    let outcomes: Vec<(Configuration, Option<Result<ConfigVerdict, MatrixError>>)> =
        stream::iter(configurations.into_iter().map(|config| {
            let run_token = run_token.clone();
            async move {
                if run_token.is_cancelled() {
                    return (config, None);
                }
                let result = tokio::select! {
                    biased;
                    _ = run_token.cancelled() => None,
                    result = run_configuration(ctx, config) => Some(result),
                };
                if let Some(Err(err)) = &result {
                    if err.is_systemic() {
                        run_token.cancel();
                    }
                }
                (config, result)
            }
        }))
        .buffered(jobs.max(1))
        .collect()
        .await;

    let mut report = MatrixReport::default();
    for (config, outcome) in outcomes {
        let verdict = match outcome {
            Some(Ok(verdict)) => verdict,
            Some(Err(err)) => {
                let mut verdict = cancelled_verdict(config);
                verdict.status = VerdictStatus::Errored;
                verdict.error = Some(ConfigError {
                    message: err.to_string(),
                    command: None,
                    output: String::new(),
                });
                if report.abort.is_none() {
                    report.abort = Some(err);
                }
                verdict
            }
            None => {
                println!("{}", t!("run.config_cancelled", name = config.name()).yellow());
                cancelled_verdict(config)
            }
        };
        report.verdicts.push(verdict);
    }
    report
}
