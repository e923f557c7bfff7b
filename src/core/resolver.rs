//! # Applicability Resolver / 适用性解析器
//!
//! Decides, for one configuration, which tests must pass. Everything else is
//! expected to fail to build. The decision is a small declarative rule table:
//! each rule names an optimization gate and an LTO gate, and a debug
//! configuration satisfies every rule.
//!
//! 为单个配置判定哪些测试必须通过，其余测试预期构建失败。
//! 判定由一张小型声明式规则表完成：每条规则包含一个优化门槛和一个 LTO 门槛，
//! debug 配置满足所有规则。

use crate::core::models::{Configuration, LtoMode, TestId, TestSet};

/// Optimization requirement of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptGate {
    /// Only debug configurations admit the test.
    DebugOnly,
    /// The optimization level must be strictly above this numeric level.
    Above(u8),
    /// The optimization level must be strictly above
    /// [`effective_lto_threshold`] for the configuration's LTO mode.
    AboveLtoThreshold,
}

/// LTO requirement of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LtoGate {
    Any,
    /// LTO must be `Thin` or `Fat`.
    Enabled,
}

/// One row of the applicability table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub test: TestId,
    pub opt: OptGate,
    pub lto: LtoGate,
}

/// Applicability rules, one per [`TestId`], in [`TestId::ALL`] order.
///
/// Fat LTO is assumed to eliminate dead code that thin LTO cannot at low
/// optimization levels, which is why the `Lto` row depends on the mode.
pub const RULES: [Rule; TestId::COUNT] = [
    Rule {
        test: TestId::Opt1,
        opt: OptGate::Above(0),
        lto: LtoGate::Any,
    },
    Rule {
        test: TestId::Opt2,
        opt: OptGate::Above(1),
        lto: LtoGate::Any,
    },
    Rule {
        test: TestId::Lto,
        opt: OptGate::AboveLtoThreshold,
        lto: LtoGate::Enabled,
    },
    Rule {
        test: TestId::Fail,
        opt: OptGate::DebugOnly,
        lto: LtoGate::Any,
    },
    Rule {
        test: TestId::FailBlackBox,
        opt: OptGate::DebugOnly,
        lto: LtoGate::Any,
    },
];

/// Optimization level the `Lto` test must exceed: `1` under fat LTO, `0`
/// otherwise.
pub const fn effective_lto_threshold(lto: LtoMode) -> u8 {
    match lto {
        LtoMode::Fat => 1,
        LtoMode::None | LtoMode::Thin => 0,
    }
}

impl Rule {
    /// Whether `config` makes this rule's test applicable.
    pub fn admits(&self, config: &Configuration) -> bool {
        if config.debug_assertions {
            return true;
        }
        let opt_ok = match self.opt {
            OptGate::DebugOnly => false,
            OptGate::Above(threshold) => config.opt_level.exceeds(threshold),
            OptGate::AboveLtoThreshold => {
                config.opt_level.exceeds(effective_lto_threshold(config.lto))
            }
        };
        let lto_ok = match self.lto {
            LtoGate::Any => true,
            LtoGate::Enabled => config.lto.is_enabled(),
        };
        opt_ok && lto_ok
    }
}

/// Looks up the rule for a single test.
pub fn rule_for(test: TestId) -> &'static Rule {
    // RULES is indexed in TestId::ALL order.
    &RULES[test as usize]
}

/// Tests expected to pass under `config`.
pub fn applicable_tests(config: &Configuration) -> TestSet {
    RULES
        .iter()
        .filter(|rule| rule.admits(config))
        .map(|rule| rule.test)
        .collect()
}

/// Tests expected to fail to build under `config`; the complement of
/// [`applicable_tests`].
pub fn expected_failures(config: &Configuration) -> TestSet {
    applicable_tests(config).complement()
}

/// Both halves of the partition for one configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applicability {
    pub applicable: TestSet,
    pub expected_failures: TestSet,
}

pub fn resolve(config: &Configuration) -> Applicability {
    let applicable = applicable_tests(config);
    Applicability {
        applicable,
        expected_failures: applicable.complement(),
    }
}
