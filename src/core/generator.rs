//! # Configuration Generator / 配置生成器
//!
//! Enumerates the configurations of one run: the cross product of every
//! optimization level with every LTO mode (debug assertions off), followed by
//! a single debug build.
//!
//! 枚举一次运行的所有配置：每个优化级别与每个 LTO 模式的笛卡尔积
//! （关闭 debug 断言），随后追加一个 debug 构建。

use crate::core::models::{Configuration, LtoMode, OptLevel};

/// Number of configurations produced by [`generate_matrix`].
pub const MATRIX_SIZE: usize = OptLevel::COUNT * LtoMode::COUNT + 1;

/// The extra configuration that exercises the debug-build code path.
pub const DEBUG_CONFIGURATION: Configuration =
    Configuration::new(true, OptLevel::O0, LtoMode::None);

/// Builds the ordered matrix. Optimization level varies slowest; the debug
/// configuration comes last.
pub fn generate_matrix() -> Vec<Configuration> {
    let mut matrix = Vec::with_capacity(MATRIX_SIZE);
    for opt_level in OptLevel::ALL {
        for lto in LtoMode::ALL {
            matrix.push(Configuration::new(false, opt_level, lto));
        }
    }
    matrix.push(DEBUG_CONFIGURATION);
    matrix
}
