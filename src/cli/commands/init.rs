//! # Init Command Module / 初始化命令模块
//!
//! This module implements the `init` command, which writes a
//! `ReachMatrix.toml` settings file, either with defaults or through a short
//! interactive wizard.
//!
//! 此模块实现了 `init` 命令，它使用默认值或通过简短的交互式向导写入
//! `ReachMatrix.toml` 设置文件。

use anyhow::{Context, Result};
use colored::*;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use std::fs;
use std::path::Path;

use crate::core::config::{MatrixSettings, DEFAULT_SETTINGS_FILE};
use crate::infra::fs::read_crate_name;
use crate::infra::t;

const HEADER: &str = "# Reachability matrix settings / 可达性矩阵设置\n\n";

/// Executes the init command in the current directory.
///
/// # Arguments
/// * `non_interactive` - Write the defaults without prompting
/// * `force` - Overwrite an existing settings file
pub fn execute(non_interactive: bool, force: bool) -> Result<()> {
    let path = Path::new(DEFAULT_SETTINGS_FILE);
    let theme = ColorfulTheme::default();

    if path.exists() && !force {
        if non_interactive {
            println!("{}", t!("init.file_exists", path = path.display()).red());
            println!("{}", t!("init.use_force").yellow());
            return Ok(());
        }
        let confirmation = Confirm::with_theme(&theme)
            .with_prompt(t!("init.overwrite_prompt", path = path.display()))
            .default(false)
            .interact()
            .context(t!("init.user_confirmation_failed").to_string())?;
        if !confirmation {
            println!("{}", t!("init.aborted"));
            return Ok(());
        }
    }

    let settings = if non_interactive {
        MatrixSettings::default()
    } else {
        run_wizard(&theme)?
    };
    settings.validate()?;
    write_settings(path, &settings)
}

fn run_wizard(theme: &ColorfulTheme) -> Result<MatrixSettings> {
    println!("\n{}", t!("init.wizard_welcome").cyan().bold());
    println!("{}", t!("init.wizard_description"));

    if let Ok(Some(name)) = read_crate_name(Path::new(".")) {
        println!("{}", t!("init.detected_crate_name", name = name.green()));
    }

    let defaults = MatrixSettings::default();

    let languages = ["en", "zh-CN"];
    let language = Select::with_theme(theme)
        .with_prompt(t!("init.language_prompt"))
        .items(&languages)
        .default(0)
        .interact()
        .context(t!("init.user_confirmation_failed").to_string())?;

    let feature: String = Input::with_theme(theme)
        .with_prompt(t!("init.feature_prompt"))
        .default(defaults.feature.clone())
        .interact_text()
        .context(t!("init.user_confirmation_failed").to_string())?;

    let extra: String = Input::with_theme(theme)
        .with_prompt(t!("init.extra_features_prompt"))
        .allow_empty(true)
        .interact_text()
        .context(t!("init.user_confirmation_failed").to_string())?;

    let inherits: String = Input::with_theme(theme)
        .with_prompt(t!("init.inherits_prompt"))
        .default(defaults.inherits.clone())
        .interact_text()
        .context(t!("init.user_confirmation_failed").to_string())?;

    Ok(MatrixSettings {
        language: languages[language].to_string(),
        feature,
        extra_features: split_features(&extra),
        inherits,
        ..defaults
    })
}

/// Splits a user-typed feature list on commas and whitespace.
fn split_features(input: &str) -> Vec<String> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect()
}

fn write_settings(path: &Path, settings: &MatrixSettings) -> Result<()> {
    let body = toml::to_string_pretty(settings).context(t!("init.serialize_failed").to_string())?;
    fs::write(path, format!("{HEADER}{body}"))
        .with_context(|| t!("init.write_failed", path = path.display()).to_string())?;

    println!(
        "\n{} {}",
        "✔".green(),
        t!("init.success_created", path = path.display()).bold()
    );
    println!("{}", t!("init.usage_hint"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_feature_lists_are_split() {
        assert_eq!(split_features("unstable, extra  more"), vec!["unstable", "extra", "more"]);
        assert!(split_features("  ").is_empty());
    }

    #[test]
    fn written_settings_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_SETTINGS_FILE);
        write_settings(&path, &MatrixSettings::default()).unwrap();

        let loaded = crate::core::config::load_settings(&path).unwrap();
        assert_eq!(loaded, MatrixSettings::default());
        assert!(fs::read_to_string(&path).unwrap().starts_with("# Reachability"));
    }
}
