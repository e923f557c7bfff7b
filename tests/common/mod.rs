// Shared test helpers for integration tests
#![allow(dead_code)]

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use reach_matrix::MatrixError;
use reach_matrix::core::config::MatrixSettings;
use reach_matrix::infra::toolchain::{Invocation, StepOutput, Toolchain};

/// Path of the fixture crate with reachability test targets.
pub fn sample_project() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/sample_project")
}

/// Settings whose test targets match the fixture crate.
pub fn sample_settings() -> MatrixSettings {
    MatrixSettings::default()
}

/// A scripted [`Toolchain`]. By default every step succeeds, except that
/// probe builds fail, which is the behaviour of a correct project.
#[derive(Default)]
pub struct FakeToolchain {
    /// `(config name, target)` pairs whose test suite fails.
    pub failing_suites: HashSet<(String, String)>,
    /// `(config name, target)` pairs whose probe builds successfully.
    pub building_probes: HashSet<(String, String)>,
    /// Configurations whose dependency lock fails.
    pub failing_locks: HashSet<String>,
    /// Configurations whose inline or doc tests fail.
    pub failing_inline_tests: HashSet<String>,
    /// Configurations for which the toolchain cannot be started.
    pub unavailable_for: HashSet<String>,
    /// Every call, as `config:step[:target]`.
    pub calls: Mutex<Vec<String>>,
    /// Profiles missing from the staged manifest when a step ran.
    pub missing_profiles: Mutex<Vec<String>>,
}

impl FakeToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_suite(mut self, config: &str, target: &str) -> Self {
        self.failing_suites
            .insert((config.to_string(), target.to_string()));
        self
    }

    pub fn build_probe(mut self, config: &str, target: &str) -> Self {
        self.building_probes
            .insert((config.to_string(), target.to_string()));
        self
    }

    pub fn fail_lock(mut self, config: &str) -> Self {
        self.failing_locks.insert(config.to_string());
        self
    }

    pub fn fail_inline_tests(mut self, config: &str) -> Self {
        self.failing_inline_tests.insert(config.to_string());
        self
    }

    pub fn unavailable(mut self, config: &str) -> Self {
        self.unavailable_for.insert(config.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, config: &str) -> Vec<String> {
        let prefix = format!("{config}:");
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(&prefix))
            .collect()
    }

    fn record(
        &self,
        inv: &Invocation,
        step: &str,
        target: Option<&str>,
        success: bool,
    ) -> Result<StepOutput, MatrixError> {
        let call = match target {
            Some(target) => format!("{}:{}:{}", inv.config_name, step, target),
            None => format!("{}:{}", inv.config_name, step),
        };
        self.calls.lock().unwrap().push(call.clone());

        let manifest = fs::read_to_string(inv.workspace.join("Cargo.toml")).unwrap_or_default();
        if !manifest.contains(&format!("[profile.{}]", inv.profile)) {
            self.missing_profiles.lock().unwrap().push(call.clone());
        }

        if self.unavailable_for.contains(&inv.config_name) {
            return Err(MatrixError::ToolchainUnavailable {
                program: "fake-cargo".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not installed"),
            });
        }
        Ok(StepOutput {
            success,
            command: format!("fake-cargo {call}"),
            output: format!("output of {call}\n"),
        })
    }
}

fn key(inv: &Invocation, target: &str) -> (String, String) {
    (inv.config_name.clone(), target.to_string())
}

impl Toolchain for FakeToolchain {
    async fn lock_dependencies(&self, inv: &Invocation) -> Result<StepOutput, MatrixError> {
        let success = !self.failing_locks.contains(&inv.config_name);
        self.record(inv, "lock", None, success)
    }

    async fn run_inline_tests(&self, inv: &Invocation) -> Result<StepOutput, MatrixError> {
        let success = !self.failing_inline_tests.contains(&inv.config_name);
        self.record(inv, "inline", None, success)
    }

    async fn run_test_suite(
        &self,
        inv: &Invocation,
        target: &str,
    ) -> Result<StepOutput, MatrixError> {
        let success = !self.failing_suites.contains(&key(inv, target));
        self.record(inv, "suite", Some(target), success)
    }

    async fn build_test_target(
        &self,
        inv: &Invocation,
        target: &str,
    ) -> Result<StepOutput, MatrixError> {
        let success = self.building_probes.contains(&key(inv, target));
        self.record(inv, "probe", Some(target), success)
    }
}
