//! # Data Models Module / 数据模型模块
//!
//! This module defines the closed domains the matrix is built from
//! (optimization levels, LTO modes, test identifiers), the configuration
//! tuple, the set type used for applicability, and the verdict records the
//! driver produces.
//!
//! 此模块定义了构建矩阵所用的封闭域（优化级别、LTO 模式、测试标识符）、
//! 配置元组、用于适用性的集合类型以及驱动器产生的结论记录。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::core::error::MatrixError;

/// Optimization level as understood by the toolchain's `opt-level` setting.
///
/// `Size` and `SizeAggressive` are symbolic tiers: for threshold purposes they
/// rank above every numeric tier but are not ranked against each other.
///
/// 工具链 `opt-level` 设置所理解的优化级别。
/// `Size` 和 `SizeAggressive` 是符号层级：在阈值比较中它们高于所有数值层级，
/// 但彼此之间不分高低。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptLevel {
    O0,
    O1,
    O2,
    O3,
    /// `opt-level = "s"`
    Size,
    /// `opt-level = "z"`
    SizeAggressive,
}

/// How an [`OptLevel`] takes part in threshold comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptTier {
    Numeric(u8),
    Symbolic,
}

impl OptLevel {
    pub const COUNT: usize = 6;

    /// Every level in generator order.
    pub const ALL: [OptLevel; OptLevel::COUNT] = [
        OptLevel::O0,
        OptLevel::O1,
        OptLevel::O2,
        OptLevel::O3,
        OptLevel::Size,
        OptLevel::SizeAggressive,
    ];

    pub const fn tier(self) -> OptTier {
        match self {
            OptLevel::O0 => OptTier::Numeric(0),
            OptLevel::O1 => OptTier::Numeric(1),
            OptLevel::O2 => OptTier::Numeric(2),
            OptLevel::O3 => OptTier::Numeric(3),
            OptLevel::Size | OptLevel::SizeAggressive => OptTier::Symbolic,
        }
    }

    /// `true` when this level is strictly above the numeric `threshold`.
    /// Symbolic tiers exceed every threshold.
    pub const fn exceeds(self, threshold: u8) -> bool {
        match self.tier() {
            OptTier::Numeric(level) => level > threshold,
            OptTier::Symbolic => true,
        }
    }

    /// Rank of optimization intent: numeric levels rank as themselves, both
    /// symbolic tiers share the rank just above `O3`.
    pub const fn intent_rank(self) -> u8 {
        match self.tier() {
            OptTier::Numeric(level) => level,
            OptTier::Symbolic => 4,
        }
    }

    /// Short form used in configuration names: `0`..`3`, `s`, `z`.
    pub const fn short_name(self) -> &'static str {
        match self {
            OptLevel::O0 => "0",
            OptLevel::O1 => "1",
            OptLevel::O2 => "2",
            OptLevel::O3 => "3",
            OptLevel::Size => "s",
            OptLevel::SizeAggressive => "z",
        }
    }

    fn from_short_name(s: &str) -> Option<Self> {
        OptLevel::ALL.into_iter().find(|level| level.short_name() == s)
    }
}

impl fmt::Display for OptLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Link-time optimization mode, ordered `None < Thin < Fat`.
/// 链接时优化模式，顺序为 `None < Thin < Fat`。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum LtoMode {
    None,
    Thin,
    Fat,
}

impl LtoMode {
    pub const COUNT: usize = 3;

    pub const ALL: [LtoMode; LtoMode::COUNT] = [LtoMode::None, LtoMode::Thin, LtoMode::Fat];

    pub const fn is_enabled(self) -> bool {
        !matches!(self, LtoMode::None)
    }

    pub const fn short_name(self) -> &'static str {
        match self {
            LtoMode::None => "none",
            LtoMode::Thin => "thin",
            LtoMode::Fat => "fat",
        }
    }

    fn from_short_name(s: &str) -> Option<Self> {
        LtoMode::ALL.into_iter().find(|mode| mode.short_name() == s)
    }
}

impl fmt::Display for LtoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// One point of the build matrix. Identity is structural.
///
/// The canonical name is `o{level}-{lto}` with a `-debug` suffix when debug
/// assertions are on, e.g. `o2-thin` or `o0-none-debug`. Names round-trip
/// through [`FromStr`].
///
/// 构建矩阵中的一个点。其身份由字段结构决定。
/// 规范名称为 `o{level}-{lto}`，启用 debug 断言时带 `-debug` 后缀。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Configuration {
    pub debug_assertions: bool,
    pub opt_level: OptLevel,
    pub lto: LtoMode,
}

impl Configuration {
    pub const fn new(debug_assertions: bool, opt_level: OptLevel, lto: LtoMode) -> Self {
        Self {
            debug_assertions,
            opt_level,
            lto,
        }
    }

    pub fn name(&self) -> String {
        let mut name = format!("o{}-{}", self.opt_level.short_name(), self.lto.short_name());
        if self.debug_assertions {
            name.push_str("-debug");
        }
        name
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for Configuration {
    type Err = MatrixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |field: &'static str, value: &str, reason: &str| {
            MatrixError::ConfigSerialization {
                field,
                value: value.to_string(),
                reason: reason.to_string(),
            }
        };

        let mut parts = s.split('-');
        let opt_part = parts.next().unwrap_or_default();
        let lto_part = parts
            .next()
            .ok_or_else(|| invalid("name", s, "expected `o<level>-<lto>[-debug]`"))?;
        let debug_assertions = match parts.next() {
            None => false,
            Some("debug") => true,
            Some(other) => return Err(invalid("name", other, "only `debug` may follow the LTO mode")),
        };
        if parts.next().is_some() {
            return Err(invalid("name", s, "too many `-` separated parts"));
        }

        let opt_level = opt_part
            .strip_prefix('o')
            .and_then(OptLevel::from_short_name)
            .ok_or_else(|| invalid("opt-level", opt_part, "expected one of o0, o1, o2, o3, os, oz"))?;
        let lto = LtoMode::from_short_name(lto_part)
            .ok_or_else(|| invalid("lto", lto_part, "expected one of none, thin, fat"))?;

        Ok(Configuration::new(debug_assertions, opt_level, lto))
    }
}

/// The closed set of test targets the matrix knows about.
/// 矩阵已知的封闭测试目标集合。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TestId {
    Opt1,
    Opt2,
    Lto,
    Fail,
    FailBlackBox,
}

impl TestId {
    pub const COUNT: usize = 5;

    pub const ALL: [TestId; TestId::COUNT] = [
        TestId::Opt1,
        TestId::Opt2,
        TestId::Lto,
        TestId::Fail,
        TestId::FailBlackBox,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            TestId::Opt1 => "opt1",
            TestId::Opt2 => "opt2",
            TestId::Lto => "lto",
            TestId::Fail => "fail",
            TestId::FailBlackBox => "fail_black_box",
        }
    }

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A subset of [`TestId`], stored as a bit set.
///
/// Iteration always follows [`TestId::ALL`] order. Serializes as a list.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "Vec<TestId>", from = "Vec<TestId>")]
pub struct TestSet(u8);

impl TestSet {
    const FULL_MASK: u8 = (1 << TestId::COUNT) - 1;

    pub const fn empty() -> Self {
        TestSet(0)
    }

    pub const fn all() -> Self {
        TestSet(Self::FULL_MASK)
    }

    pub fn insert(&mut self, test: TestId) {
        self.0 |= test.bit();
    }

    pub const fn contains(self, test: TestId) -> bool {
        self.0 & test.bit() != 0
    }

    /// Complement within the full [`TestId`] set.
    pub const fn complement(self) -> Self {
        TestSet(!self.0 & Self::FULL_MASK)
    }

    pub const fn union(self, other: TestSet) -> Self {
        TestSet(self.0 | other.0)
    }

    pub const fn intersection(self, other: TestSet) -> Self {
        TestSet(self.0 & other.0)
    }

    pub const fn is_disjoint(self, other: TestSet) -> bool {
        self.0 & other.0 == 0
    }

    pub const fn is_subset(self, other: TestSet) -> bool {
        self.0 & !other.0 == 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = TestId> {
        TestId::ALL.into_iter().filter(move |test| self.contains(*test))
    }
}

impl FromIterator<TestId> for TestSet {
    fn from_iter<I: IntoIterator<Item = TestId>>(iter: I) -> Self {
        let mut set = TestSet::empty();
        for test in iter {
            set.insert(test);
        }
        set
    }
}

impl From<Vec<TestId>> for TestSet {
    fn from(tests: Vec<TestId>) -> Self {
        tests.into_iter().collect()
    }
}

impl From<TestSet> for Vec<TestId> {
    fn from(set: TestSet) -> Self {
        set.iter().collect()
    }
}

impl fmt::Debug for TestSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for TestSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        let names: Vec<&str> = self.iter().map(TestId::as_str).collect();
        f.write_str(&names.join(", "))
    }
}

/// A recorded, non-fatal mismatch between expectation and toolchain outcome.
///
/// 期望与工具链结果之间已记录的、非致命的不匹配。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VerdictFailure {
    /// An applicable test did not pass.
    /// 一个适用的测试未通过。
    ApplicableTestFailed {
        test: TestId,
        command: String,
        output: String,
    },
    /// A test expected to fail to build built successfully.
    /// 一个预期构建失败的测试却构建成功了。
    ProbeUnexpectedlyBuilt { test: TestId, command: String },
}

impl VerdictFailure {
    pub fn test(&self) -> TestId {
        match self {
            VerdictFailure::ApplicableTestFailed { test, .. } => *test,
            VerdictFailure::ProbeUnexpectedlyBuilt { test, .. } => *test,
        }
    }

    pub fn command(&self) -> &str {
        match self {
            VerdictFailure::ApplicableTestFailed { command, .. } => command,
            VerdictFailure::ProbeUnexpectedlyBuilt { command, .. } => command,
        }
    }
}

/// Final state of one configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    /// Smoke tests, applicable tests and probes all behaved as expected.
    Passed,
    /// At least one [`VerdictFailure`] was recorded.
    Failed,
    /// An infrastructure error stopped this configuration.
    Errored,
    /// The run was interrupted before or while this configuration ran.
    Cancelled,
}

/// Infrastructure error recorded against a single configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigError {
    pub message: String,
    /// Toolchain command that failed, when there was one.
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub output: String,
}

/// The verdict for one configuration of the matrix.
///
/// 矩阵中单个配置的结论。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigVerdict {
    pub config: Configuration,
    pub status: VerdictStatus,
    /// Tests expected to pass for this configuration.
    pub applicable: TestSet,
    /// Tests expected to fail to build for this configuration.
    pub expected_failures: TestSet,
    pub failures: Vec<VerdictFailure>,
    pub error: Option<ConfigError>,
    pub duration: Duration,
    /// Staged workspace kept on disk for manual reproduction.
    #[serde(default)]
    pub preserved_workspace: Option<PathBuf>,
}

impl ConfigVerdict {
    pub fn config_name(&self) -> String {
        self.config.name()
    }

    pub fn passed(&self) -> bool {
        self.status == VerdictStatus::Passed
    }

    pub fn failed_tests(&self) -> Vec<TestId> {
        self.failures
            .iter()
            .filter(|failure| matches!(failure, VerdictFailure::ApplicableTestFailed { .. }))
            .map(VerdictFailure::test)
            .collect()
    }

    pub fn unexpectedly_built_probes(&self) -> Vec<TestId> {
        self.failures
            .iter()
            .filter(|failure| matches!(failure, VerdictFailure::ProbeUnexpectedlyBuilt { .. }))
            .map(VerdictFailure::test)
            .collect()
    }
}

/// All verdicts of one run plus the reason the run was aborted, if it was.
#[derive(Debug, Default)]
pub struct MatrixReport {
    /// Verdicts in generator order.
    pub verdicts: Vec<ConfigVerdict>,
    /// Systemic error that stopped scheduling further configurations.
    pub abort: Option<MatrixError>,
}

impl MatrixReport {
    /// Aggregate verdict: every configuration passed and nothing aborted the run.
    pub fn passed(&self) -> bool {
        self.abort.is_none() && self.verdicts.iter().all(ConfigVerdict::passed)
    }

    pub fn count(&self, status: VerdictStatus) -> usize {
        self.verdicts.iter().filter(|v| v.status == status).count()
    }
}

/// Diagnostic information for cargo compiler messages.
/// 诊断信息，用于cargo编译器消息。
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CargoDiagnostic {
    /// The severity level of the diagnostic (e.g., "error", "warning").
    /// 诊断的严重级别（例如 "error", "warning"）。
    pub level: String,
    pub message: String,
    /// The ANSI color-coded, formatted message, if available.
    /// 带有 ANSI 颜色代码的格式化消息（如果可用）。
    pub rendered: Option<String>,
}

/// A message from `cargo --message-format=json`. Only compiler messages are
/// of interest here.
#[derive(Debug, Clone, Deserialize)]
pub struct CargoMessage {
    /// The reason for the message (e.g., "compiler-artifact", "compiler-message").
    /// 消息的原因（例如 "compiler-artifact", "compiler-message"）。
    pub reason: String,
    pub message: Option<CargoDiagnostic>,
}

/// Package information from Cargo.toml
/// 来自Cargo.toml的包信息
#[derive(Debug, Clone, Deserialize)]
pub struct Package {
    pub name: String,
}

/// The parts of a Cargo.toml manifest the runner looks at.
/// A virtual workspace manifest has no `[package]`.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub package: Option<Package>,
}
