//! # Logging / 日志
//!
//! Diagnostic logging through `tracing`. User-facing progress is printed
//! separately; this layer carries the per-step toolchain details that matter
//! when a run has to be debugged.
//!
//! 通过 `tracing` 输出诊断日志。面向用户的进度信息另行打印；
//! 这一层记录调试运行时所需的每个工具链步骤的细节。

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` takes precedence; otherwise
/// `--verbose` selects `debug` and the default is `warn`.
///
/// Safe to call more than once: later calls are ignored.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init();
}
