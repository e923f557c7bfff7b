//! # Infrastructure Module / 基础设施模块
//!
//! Everything that touches the outside world: spawning the toolchain,
//! staging isolated workspaces and logging.
//!
//! 所有与外部世界交互的部分：启动工具链、准备隔离的工作区以及日志。

pub mod command;
pub mod fs;
pub mod logging;
pub mod toolchain;

// Re-export i18n functions for easier access
pub use rust_i18n::t;
