//! # Models Module Unit Tests / Models 模块单元测试
//!
//! Tests of the closed domains, configuration names, the test set type and
//! the verdict records.
//!
//! 对封闭域、配置名称、测试集合类型以及结论记录的测试。

use reach_matrix::core::models::{
    ConfigVerdict, MatrixReport, OptTier, VerdictFailure, VerdictStatus,
};
use reach_matrix::{Configuration, LtoMode, MatrixError, OptLevel, TestId, TestSet, generate_matrix};
use std::collections::HashSet;
use std::time::Duration;

#[cfg(test)]
mod opt_level_tests {
    use super::*;

    #[test]
    fn numeric_levels_compare_by_value() {
        assert!(OptLevel::O2.exceeds(1));
        assert!(!OptLevel::O1.exceeds(1));
        assert!(!OptLevel::O0.exceeds(0));
        assert_eq!(OptLevel::O3.tier(), OptTier::Numeric(3));
    }

    #[test]
    fn symbolic_levels_exceed_every_numeric_threshold() {
        for threshold in 0..=3 {
            assert!(OptLevel::Size.exceeds(threshold));
            assert!(OptLevel::SizeAggressive.exceeds(threshold));
        }
        assert_eq!(OptLevel::Size.tier(), OptTier::Symbolic);
        assert_eq!(
            OptLevel::Size.intent_rank(),
            OptLevel::SizeAggressive.intent_rank()
        );
    }

    #[test]
    fn lto_modes_are_ordered() {
        assert!(LtoMode::None < LtoMode::Thin);
        assert!(LtoMode::Thin < LtoMode::Fat);
        assert!(!LtoMode::None.is_enabled());
        assert!(LtoMode::Thin.is_enabled());
    }
}

#[cfg(test)]
mod configuration_name_tests {
    use super::*;

    #[test]
    fn names_follow_the_canonical_format() {
        let names: Vec<String> = generate_matrix().iter().map(Configuration::name).collect();
        assert_eq!(names[0], "o0-none");
        assert_eq!(names[5], "o1-fat");
        assert_eq!(names[12], "os-none");
        assert_eq!(names[17], "oz-fat");
        assert_eq!(names[18], "o0-none-debug");
    }

    #[test]
    fn every_generated_name_parses_back() {
        let matrix = generate_matrix();
        let names: HashSet<String> = matrix.iter().map(Configuration::name).collect();
        assert_eq!(names.len(), matrix.len());
        for config in matrix {
            let parsed: Configuration = config.name().parse().unwrap();
            assert_eq!(parsed, config);
        }
    }

    #[test]
    fn out_of_domain_names_are_rejected() {
        for bad in ["o4-none", "o1-full", "o1", "o1-thin-release", "o1-thin-debug-x", "", "x1-fat"] {
            let err = bad.parse::<Configuration>().unwrap_err();
            assert!(
                matches!(err, MatrixError::ConfigSerialization { .. }),
                "{bad} gave {err:?}"
            );
        }
    }
}

#[cfg(test)]
mod test_set_tests {
    use super::*;

    #[test]
    fn complement_partitions_the_universe() {
        let set: TestSet = [TestId::Opt1, TestId::Lto].into_iter().collect();
        let rest = set.complement();
        assert!(set.is_disjoint(rest));
        assert_eq!(set.union(rest), TestSet::all());
        assert_eq!(rest.len(), 3);
        assert!(rest.contains(TestId::FailBlackBox));
    }

    #[test]
    fn iteration_follows_declaration_order() {
        let set: TestSet = [TestId::Fail, TestId::Opt2, TestId::Opt1].into_iter().collect();
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![TestId::Opt1, TestId::Opt2, TestId::Fail]
        );
        assert_eq!(set.to_string(), "opt1, opt2, fail");
        assert_eq!(TestSet::empty().to_string(), "-");
    }

    #[test]
    fn serializes_as_a_list_of_names() {
        let set: TestSet = [TestId::FailBlackBox, TestId::Opt1].into_iter().collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["opt1","fail_black_box"]"#);
        let back: TestSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn subset_and_intersection() {
        let small: TestSet = [TestId::Opt1].into_iter().collect();
        let big: TestSet = [TestId::Opt1, TestId::Opt2].into_iter().collect();
        assert!(small.is_subset(big));
        assert!(!big.is_subset(small));
        assert_eq!(small.intersection(big), small);
    }
}

#[cfg(test)]
mod verdict_tests {
    use super::*;

    fn verdict(status: VerdictStatus, failures: Vec<VerdictFailure>) -> ConfigVerdict {
        ConfigVerdict {
            config: Configuration::new(false, OptLevel::O2, LtoMode::Thin),
            status,
            applicable: TestSet::empty(),
            expected_failures: TestSet::all(),
            failures,
            error: None,
            duration: Duration::from_secs(1),
            preserved_workspace: None,
        }
    }

    #[test]
    fn failures_are_split_by_kind() {
        let v = verdict(
            VerdictStatus::Failed,
            vec![
                VerdictFailure::ApplicableTestFailed {
                    test: TestId::Opt2,
                    command: "cargo test --test opt-2".to_string(),
                    output: String::new(),
                },
                VerdictFailure::ProbeUnexpectedlyBuilt {
                    test: TestId::Fail,
                    command: "cargo test --no-run --test fail".to_string(),
                },
            ],
        );
        assert_eq!(v.config_name(), "o2-thin");
        assert!(!v.passed());
        assert_eq!(v.failed_tests(), vec![TestId::Opt2]);
        assert_eq!(v.unexpectedly_built_probes(), vec![TestId::Fail]);
    }

    #[test]
    fn aggregate_needs_every_configuration_to_pass() {
        let mut report = MatrixReport {
            verdicts: vec![verdict(VerdictStatus::Passed, vec![])],
            abort: None,
        };
        assert!(report.passed());

        report.verdicts.push(verdict(VerdictStatus::Cancelled, vec![]));
        assert!(!report.passed());
        assert_eq!(report.count(VerdictStatus::Cancelled), 1);
    }

    #[test]
    fn empty_report_passes() {
        assert!(MatrixReport::default().passed());
    }
}
