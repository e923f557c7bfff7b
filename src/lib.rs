//! # Reach Matrix Library / Reach Matrix 库
//!
//! This library drives a crate's compile-time reachability assertions through
//! every combination of optimization level, LTO mode and debug-assertion mode,
//! and decides for each combination which tests must pass and which must fail
//! to build.
//!
//! 此库在优化级别、LTO 模式与 debug 断言模式的每种组合下驱动 crate 的
//! 编译期可达性断言，并为每种组合判定哪些测试必须通过、哪些必须构建失败。
//!
//! ## Modules / 模块
//!
//! - `core` - Matrix generation, applicability rules and the matrix driver
//! - `infra` - Toolchain invocation, workspaces and logging
//! - `reporting` - Console, JSON and HTML verdict reports
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 矩阵生成、适用性规则和矩阵驱动器
//! - `infra` - 工具链调用、工作区和日志
//! - `reporting` - 控制台、JSON 和 HTML 结论报告
//! - `cli` - 命令行接口和命令

pub mod cli;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use core::error::MatrixError;
pub use core::generator::generate_matrix;
pub use core::models::{Configuration, LtoMode, OptLevel, TestId, TestSet};
pub use core::resolver::{applicable_tests, expected_failures};

/// Picks the user interface language.
///
/// An explicitly requested locale wins, then the system locale. Both the full
/// locale (e.g. "zh-CN") and its language part (e.g. "en" from "en-US") are
/// tried before falling back to "en".
pub fn resolve_locale(requested: Option<&str>) -> String {
    let locale = requested
        .map(str::to_string)
        .or_else(sys_locale::get_locale)
        .unwrap_or_else(|| "en".to_string());
    let available_locales = rust_i18n::available_locales!();

    if available_locales.contains(&locale.as_str()) {
        return locale;
    }
    locale
        .split('-')
        .next()
        .filter(|lang_code| available_locales.contains(lang_code))
        .unwrap_or("en")
        .to_string()
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
