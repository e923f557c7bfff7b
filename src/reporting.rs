//! # Reporting Module / 报告模块
//!
//! Turns the per-configuration verdicts into a console summary, a JSON
//! document for CI consumption and a standalone HTML page.
//!
//! 将每个配置的结论转换为控制台摘要、供 CI 使用的 JSON 文档以及独立的 HTML 页面。

pub mod console;
pub mod html;
pub mod json;

// Re-export common reporting functions
pub use console::{print_failure_details, print_summary};
pub use html::generate_html_report;
pub use json::write_json_report;
