//! # Execution Planner Module / 执行计划模块
//!
//! Narrows the generated matrix down to the configurations this runner is
//! responsible for: an optional `--only` selection, then a round-robin split
//! across CI runners.
//!
//! 将生成的矩阵缩小到当前运行器负责的配置：先应用可选的 `--only` 选择，
//! 再在多个 CI 运行器之间轮询分配。

use anyhow::{bail, Result};

use crate::core::error::MatrixError;
use crate::core::models::Configuration;

/// Represents the configurations one runner will execute.
/// 表示一个运行器将执行的配置。
#[derive(Debug)]
pub struct ExecutionPlan {
    /// Configurations to run, in generator order.
    /// 要运行的配置，按生成顺序排列。
    pub configurations: Vec<Configuration>,
    /// Configurations dropped by the `--only` selection.
    pub filtered_count: usize,
    /// Whether the matrix is split across several runners.
    /// 矩阵是否在多个运行器之间拆分。
    pub is_distributed: bool,
}

/// Resolves `--only` names against the matrix.
///
/// Every name must parse as a configuration and must be part of `matrix`.
fn select(matrix: Vec<Configuration>, only: &[String]) -> Result<(Vec<Configuration>, usize)> {
    if only.is_empty() {
        return Ok((matrix, 0));
    }

    let mut wanted = Vec::with_capacity(only.len());
    for name in only {
        let config: Configuration = name.parse()?;
        if !matrix.contains(&config) {
            return Err(MatrixError::ConfigSerialization {
                field: "configuration",
                value: name.clone(),
                reason: "not part of the generated matrix".to_string(),
            }
            .into());
        }
        wanted.push(config);
    }

    let total = matrix.len();
    let selected: Vec<_> = matrix.into_iter().filter(|c| wanted.contains(c)).collect();
    let filtered = total - selected.len();
    Ok((selected, filtered))
}

/// Creates an execution plan for the given matrix.
///
/// # Arguments
/// * `matrix` - The full generated matrix
/// * `only` - Configuration names to restrict the run to (empty means all)
/// * `total_runners` - Optional total number of runners for distributed execution
/// * `runner_index` - Optional index of this runner (0-based)
pub fn plan_execution(
    matrix: Vec<Configuration>,
    only: &[String],
    total_runners: Option<usize>,
    runner_index: Option<usize>,
) -> Result<ExecutionPlan> {
    let (selected, filtered_count) = select(matrix, only)?;

    let (configurations, is_distributed) = match (total_runners, runner_index) {
        (Some(total), Some(index)) => {
            if total == 0 {
                bail!("Total runners must be at least 1.");
            }
            if index >= total {
                bail!("Runner index must be less than total runners.");
            }
            let distributed: Vec<_> = selected
                .into_iter()
                .enumerate()
                .filter(|(i, _)| i % total == index)
                .map(|(_, config)| config)
                .collect();
            (distributed, true)
        }
        (None, None) => (selected, false),
        _ => bail!("Both --total-runners and --runner-index must be provided."),
    };

    Ok(ExecutionPlan {
        configurations,
        filtered_count,
        is_distributed,
    })
}
