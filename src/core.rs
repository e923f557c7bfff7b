//! # Core Module / 核心模块
//!
//! Matrix generation, the applicability resolver and the matrix driver.
//! Data flows one way: generator, then resolver, then driver.
//!
//! 矩阵生成、适用性解析器和矩阵驱动器。
//! 数据单向流动：生成器，然后解析器，然后驱动器。

pub mod config;
pub mod error;
pub mod execution;
pub mod generator;
pub mod models;
pub mod planner;
pub mod profile;
pub mod resolver;

// Re-exports
pub use config::MatrixSettings;
pub use execution::{run_configuration, run_matrix};
pub use models::ConfigVerdict;
