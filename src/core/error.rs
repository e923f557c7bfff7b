//! # Error Kinds / 错误类型
//!
//! Errors that stop a configuration or the whole run. Mismatches between
//! expected and observed test outcomes are not errors; they are recorded as
//! [`VerdictFailure`](crate::core::models::VerdictFailure)s.
//!
//! 会中止某个配置或整个运行的错误。预期与实际测试结果之间的不匹配不是错误，
//! 而是作为 `VerdictFailure` 记录下来。

use std::path::PathBuf;

/// Build step of the per-configuration pipeline that reported an
/// infrastructure problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    LockDependencies,
    InlineTests,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Step::LockDependencies => "lock dependencies",
            Step::InlineTests => "doc/inline tests",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MatrixError {
    /// A configuration field or setting lies outside its closed domain.
    /// Fatal for the configuration it belongs to, not for the run.
    #[error("invalid {field} value `{value}`: {reason}")]
    ConfigSerialization {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// A toolchain step failed for reasons unrelated to the matrix logic.
    #[error("{step} failed for configuration {config}: `{command}` exited unsuccessfully")]
    ToolchainInfrastructure {
        config: String,
        step: Step,
        command: String,
        output: String,
    },

    /// The toolchain cannot be started at all. Aborts the run.
    #[error("toolchain `{program}` is unavailable: {source}")]
    ToolchainUnavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Staging or preserving an isolated workspace failed.
    #[error("workspace error at {path}: {source}")]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MatrixError {
    /// `true` for errors that make every remaining configuration pointless.
    pub fn is_systemic(&self) -> bool {
        matches!(self, MatrixError::ToolchainUnavailable { .. })
    }

    pub(crate) fn workspace(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MatrixError::Workspace {
            path: path.into(),
            source,
        }
    }
}
