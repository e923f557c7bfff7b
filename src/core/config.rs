//! # Matrix Settings / 矩阵设置
//!
//! Optional `ReachMatrix.toml` file describing how the matrix maps onto the
//! project under test: the feature gate every invocation enables, the base
//! profile generated profiles inherit from, and the cargo test target that
//! backs each [`TestId`]. Every field has a default, so the file may be
//! absent.
//!
//! 可选的 `ReachMatrix.toml` 文件，描述矩阵如何映射到被测项目：
//! 每次调用启用的 feature 开关、生成的 profile 所继承的基础 profile，
//! 以及每个 `TestId` 对应的 cargo 测试目标。所有字段都有默认值，因此该文件可以不存在。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::MatrixError;
use crate::core::models::TestId;
use crate::core::profile::validate_profile_name;

/// Default file name looked up in the working directory.
pub const DEFAULT_SETTINGS_FILE: &str = "ReachMatrix.toml";

/// Cargo test target names, one per [`TestId`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TestTargets {
    pub opt1: String,
    pub opt2: String,
    pub lto: String,
    pub fail: String,
    pub fail_black_box: String,
}

impl Default for TestTargets {
    fn default() -> Self {
        Self {
            opt1: "opt-1".to_string(),
            opt2: "opt-2".to_string(),
            lto: "lto".to_string(),
            fail: "fail".to_string(),
            fail_black_box: "fail-black-box".to_string(),
        }
    }
}

impl TestTargets {
    pub fn target_for(&self, test: TestId) -> &str {
        match test {
            TestId::Opt1 => &self.opt1,
            TestId::Opt2 => &self.opt2,
            TestId::Lto => &self.lto,
            TestId::Fail => &self.fail,
            TestId::FailBlackBox => &self.fail_black_box,
        }
    }
}

/// Settings for a matrix run, loaded from TOML.
///
/// 矩阵运行的设置，从 TOML 加载。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MatrixSettings {
    /// The language for the runner's output messages (e.g., "en", "zh-CN").
    /// 运行器输出消息的语言（例如 "en", "zh-CN"）。
    pub language: String,
    /// Feature gate enabled for every toolchain invocation.
    /// 每次工具链调用都会启用的 feature 开关。
    pub feature: String,
    /// Additional features, e.g. `unstable` on a nightly toolchain.
    pub extra_features: Vec<String>,
    /// Profile the generated profiles inherit from.
    pub inherits: String,
    /// Prefix of generated profile names.
    pub profile_prefix: String,
    pub targets: TestTargets,
}

impl Default for MatrixSettings {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            feature: "unstable-internal-test".to_string(),
            extra_features: vec![],
            inherits: "dev".to_string(),
            profile_prefix: "reach".to_string(),
            targets: TestTargets::default(),
        }
    }
}

impl MatrixSettings {
    /// Comma separated `--features` argument: the gate followed by any extras.
    pub fn features_arg(&self) -> String {
        std::iter::once(self.feature.as_str())
            .chain(self.extra_features.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Rejects settings the toolchain could not consume.
    pub fn validate(&self) -> Result<(), MatrixError> {
        if self.feature.trim().is_empty() {
            return Err(MatrixError::ConfigSerialization {
                field: "feature",
                value: self.feature.clone(),
                reason: "the feature gate must not be empty".to_string(),
            });
        }
        if let Some(bad) = self
            .extra_features
            .iter()
            .find(|f| f.trim().is_empty() || f.contains(','))
        {
            return Err(MatrixError::ConfigSerialization {
                field: "extra_features",
                value: bad.clone(),
                reason: "feature names must be non-empty and must not contain `,`".to_string(),
            });
        }
        validate_profile_name("profile_prefix", &self.profile_prefix, false)?;
        validate_profile_name("inherits", &self.inherits, true)?;
        for test in TestId::ALL {
            let target = self.targets.target_for(test);
            if target.trim().is_empty() {
                return Err(MatrixError::ConfigSerialization {
                    field: "targets",
                    value: test.to_string(),
                    reason: "test target name must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Loads and validates the settings file at `path`.
pub fn load_settings(path: &Path) -> Result<MatrixSettings> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read matrix settings: {}", path.display()))?;
    let settings: MatrixSettings = toml::from_str(&content)
        .with_context(|| format!("Failed to parse matrix settings: {}", path.display()))?;
    settings.validate()?;
    Ok(settings)
}

/// Settings together with the file they were read from, if any.
#[derive(Debug, Clone)]
pub struct LoadedSettings {
    pub settings: MatrixSettings,
    pub source: Option<PathBuf>,
}

/// Loads `path` when given; otherwise loads `ReachMatrix.toml` from `dir` if
/// present and falls back to built-in defaults.
///
/// An explicitly given file must exist.
pub fn load_or_default(path: Option<&Path>, dir: &Path) -> Result<LoadedSettings> {
    let source = match path {
        Some(path) => Some(path.to_path_buf()),
        None => Some(dir.join(DEFAULT_SETTINGS_FILE)).filter(|p| p.is_file()),
    };
    let settings = match &source {
        Some(path) => load_settings(path)?,
        None => MatrixSettings::default(),
    };
    Ok(LoadedSettings { settings, source })
}
