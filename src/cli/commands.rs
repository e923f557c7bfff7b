//! Implementations of the `run`, `plan` and `init` commands.
//! `run`、`plan` 和 `init` 命令的实现。

pub mod init;
pub mod plan;
pub mod run;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::core::config::{load_or_default, LoadedSettings};
use crate::infra::fs::absolute_path;
use crate::infra::t;
use crate::resolve_locale;

/// Resolves the project directory and loads the matrix settings for it.
///
/// The settings file's `language` is applied unless `--lang` was given.
pub(crate) fn load_project(
    project_dir: &Path,
    config: Option<&Path>,
    lang_is_explicit: bool,
) -> Result<(PathBuf, LoadedSettings)> {
    let project_root = absolute_path(project_dir).with_context(|| {
        t!("run.project_dir_not_found", path = project_dir.display()).to_string()
    })?;

    let config = config
        .map(|path| {
            absolute_path(path)
                .with_context(|| t!("run.config_not_found", path = path.display()).to_string())
        })
        .transpose()?;

    let loaded = load_or_default(config.as_deref(), &project_root)
        .with_context(|| t!("run.config_parse_failed").to_string())?;

    if !lang_is_explicit && loaded.source.is_some() {
        rust_i18n::set_locale(&resolve_locale(Some(&loaded.settings.language)));
    }
    Ok((project_root, loaded))
}
