//! # Toolchain Module / 工具链模块
//!
//! The four operations the matrix driver needs from the external toolchain,
//! behind the [`Toolchain`] trait, and their cargo implementation.
//!
//! 矩阵驱动器需要外部工具链提供的四个操作（通过 `Toolchain` trait 抽象），
//! 以及它们基于 cargo 的实现。

use std::future::Future;
use std::path::PathBuf;
use std::time::Instant;

use crate::core::error::MatrixError;
use crate::infra::command::{render_command_line, spawn_and_capture};

/// Everything a toolchain call needs to build under one configuration.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Name of the configuration, for logging.
    pub config_name: String,
    /// Directory holding the staged manifest.
    pub workspace: PathBuf,
    /// Target directory private to this configuration.
    pub target_dir: PathBuf,
    /// Cargo profile materialized for this configuration.
    pub profile: String,
    /// Comma separated features, always including the feature gate.
    pub features: String,
}

/// Outcome of one toolchain call that could be started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutput {
    pub success: bool,
    /// Reproducible, shell-quoted command line.
    pub command: String,
    /// Combined stdout and stderr.
    pub output: String,
}

/// External build/test surface used by the matrix driver.
///
/// Implementations return `Err` only when the toolchain cannot be started;
/// a step that ran and failed is an `Ok` [`StepOutput`] with
/// `success == false`.
///
/// 矩阵驱动器使用的外部构建/测试接口。
/// 只有在工具链无法启动时才返回 `Err`；已运行但失败的步骤返回 `success == false` 的 `Ok`。
pub trait Toolchain: Sync {
    /// Refreshes the dependency lock of the workspace. Must be idempotent.
    fn lock_dependencies(
        &self,
        inv: &Invocation,
    ) -> impl Future<Output = Result<StepOutput, MatrixError>> + Send;

    /// Runs the inline unit tests of the library, then its doc tests.
    fn run_inline_tests(
        &self,
        inv: &Invocation,
    ) -> impl Future<Output = Result<StepOutput, MatrixError>> + Send;

    /// Builds and runs one named test target.
    fn run_test_suite(
        &self,
        inv: &Invocation,
        target: &str,
    ) -> impl Future<Output = Result<StepOutput, MatrixError>> + Send;

    /// Builds one named test target without running it.
    fn build_test_target(
        &self,
        inv: &Invocation,
        target: &str,
    ) -> impl Future<Output = Result<StepOutput, MatrixError>> + Send;
}

/// [`Toolchain`] backed by the `cargo` binary.
#[derive(Debug, Clone)]
pub struct CargoToolchain {
    program: String,
}

impl Default for CargoToolchain {
    /// Uses `$CARGO` when set (as it is under `cargo run`/`cargo test`),
    /// otherwise `cargo` from `PATH`.
    fn default() -> Self {
        let program = std::env::var("CARGO").unwrap_or_else(|_| "cargo".to_string());
        Self { program }
    }
}

impl CargoToolchain {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments shared by every build/test call of a configuration.
    fn profile_args(inv: &Invocation) -> Vec<String> {
        vec![
            "--profile".to_string(),
            inv.profile.clone(),
            "--features".to_string(),
            inv.features.clone(),
            "--target-dir".to_string(),
            inv.target_dir.display().to_string(),
        ]
    }

    /// `cargo test --lib` and `cargo test --doc`, in that order. Cargo
    /// refuses `--lib` and `--doc` in a single invocation.
    fn inline_test_args(inv: &Invocation) -> [Vec<String>; 2] {
        [["--lib"], ["--doc"]].map(|layer| {
            let mut args = vec!["test".to_string()];
            args.extend(layer.iter().map(|a| a.to_string()));
            args.extend(Self::profile_args(inv));
            args
        })
    }

    async fn execute(
        &self,
        inv: &Invocation,
        step: &'static str,
        args: Vec<String>,
    ) -> Result<StepOutput, MatrixError> {
        let command = render_command_line(&self.program, &args);
        tracing::debug!(config = %inv.config_name, step, %command, "invoking toolchain");

        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&args).current_dir(&inv.workspace).kill_on_drop(true);

        let started = Instant::now();
        let (status, output) = spawn_and_capture(cmd).await;
        let status = status.map_err(|source| MatrixError::ToolchainUnavailable {
            program: self.program.clone(),
            source,
        })?;

        tracing::debug!(
            config = %inv.config_name,
            step,
            success = status.success(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "toolchain step finished"
        );

        Ok(StepOutput {
            success: status.success(),
            command,
            output,
        })
    }
}

impl Toolchain for CargoToolchain {
    async fn lock_dependencies(&self, inv: &Invocation) -> Result<StepOutput, MatrixError> {
        self.execute(inv, "lock", vec!["fetch".to_string()]).await
    }

    async fn run_inline_tests(&self, inv: &Invocation) -> Result<StepOutput, MatrixError> {
        let [lib_args, doc_args] = Self::inline_test_args(inv);
        let lib = self.execute(inv, "lib", lib_args).await?;
        if !lib.success {
            return Ok(lib);
        }
        self.execute(inv, "doc", doc_args).await
    }

    async fn run_test_suite(
        &self,
        inv: &Invocation,
        target: &str,
    ) -> Result<StepOutput, MatrixError> {
        let mut args = vec![
            "test".to_string(),
            "--message-format=json-diagnostic-rendered-ansi".to_string(),
        ];
        args.extend(Self::profile_args(inv));
        args.extend(["--test".to_string(), target.to_string()]);
        self.execute(inv, "suite", args).await
    }

    async fn build_test_target(
        &self,
        inv: &Invocation,
        target: &str,
    ) -> Result<StepOutput, MatrixError> {
        let mut args = vec![
            "test".to_string(),
            "--no-run".to_string(),
            "--message-format=json-diagnostic-rendered-ansi".to_string(),
        ];
        args.extend(Self::profile_args(inv));
        args.extend(["--test".to_string(), target.to_string()]);
        self.execute(inv, "probe", args).await
    }
}
