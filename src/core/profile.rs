//! # Build Profile Materialization / 构建 Profile 生成
//!
//! Translates a [`Configuration`] into a cargo profile block and appends it to
//! a manifest. Values are written in TOML literal syntax: strings quoted,
//! integers bare, booleans as `true`/`false`. Existing profile blocks are
//! never edited or removed.
//!
//! 将 `Configuration` 转换为 cargo profile 块并追加到清单文件中。
//! 值以 TOML 字面量语法写出：字符串加引号，整数不加引号，布尔值为 `true`/`false`。
//! 已有的 profile 块永远不会被修改或删除。

use std::fmt::{self, Write as _};
use std::fs;
use std::path::Path;

use crate::core::config::MatrixSettings;
use crate::core::error::MatrixError;
use crate::core::models::{Configuration, LtoMode, OptLevel};

/// Names cargo refuses as custom profile names.
const RESERVED_PROFILE_NAMES: &[&str] = &[
    "build", "check", "clean", "config", "debug", "doc", "fetch", "fix", "install", "metadata",
    "package", "publish", "report", "root", "run", "rust", "rustc", "rustdoc", "target", "tmp",
    "uninstall",
];

/// Built-in profiles that may be inherited from.
const BUILTIN_PROFILES: &[&str] = &["dev", "release", "test", "bench"];

/// A scalar value of a profile entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileValue {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl fmt::Display for ProfileValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileValue::Str(s) => write!(f, "\"{s}\""),
            ProfileValue::Int(i) => write!(f, "{i}"),
            ProfileValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<OptLevel> for ProfileValue {
    fn from(level: OptLevel) -> Self {
        match level {
            OptLevel::O0 => ProfileValue::Int(0),
            OptLevel::O1 => ProfileValue::Int(1),
            OptLevel::O2 => ProfileValue::Int(2),
            OptLevel::O3 => ProfileValue::Int(3),
            OptLevel::Size => ProfileValue::Str("s".to_string()),
            OptLevel::SizeAggressive => ProfileValue::Str("z".to_string()),
        }
    }
}

impl From<LtoMode> for ProfileValue {
    fn from(mode: LtoMode) -> Self {
        let value = match mode {
            LtoMode::None => "off",
            LtoMode::Thin => "thin",
            LtoMode::Fat => "fat",
        };
        ProfileValue::Str(value.to_string())
    }
}

/// A `[profile.<name>]` block ready to be appended to a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileBlock {
    pub name: String,
    pub inherits: String,
    pub entries: Vec<(&'static str, ProfileValue)>,
}

/// Profile name for `config`: `<prefix>-<config name>`.
pub fn profile_name(prefix: &str, config: &Configuration) -> String {
    format!("{prefix}-{}", config.name())
}

/// Checks a profile name against cargo's rules. `allow_builtin` admits the
/// built-in profile names, which are valid as an `inherits` target only.
pub fn validate_profile_name(
    field: &'static str,
    name: &str,
    allow_builtin: bool,
) -> Result<(), MatrixError> {
    let invalid = |reason: &str| MatrixError::ConfigSerialization {
        field,
        value: name.to_string(),
        reason: reason.to_string(),
    };

    if allow_builtin && BUILTIN_PROFILES.contains(&name) {
        return Ok(());
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return Err(invalid("profile names must start with an ASCII letter")),
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(invalid(
            "profile names may only contain ASCII letters, digits, `-` and `_`",
        ));
    }
    if RESERVED_PROFILE_NAMES.contains(&name) {
        return Err(invalid("this profile name is reserved by cargo"));
    }
    if !allow_builtin && BUILTIN_PROFILES.contains(&name) {
        return Err(invalid("built-in profiles cannot be redefined"));
    }
    Ok(())
}

/// Checks an entry value against the closed domain of its key.
fn validate_entry(key: &'static str, value: &ProfileValue) -> Result<(), MatrixError> {
    let valid = match (key, value) {
        ("opt-level", ProfileValue::Int(level)) => (0..=3).contains(level),
        ("opt-level", ProfileValue::Str(level)) => level == "s" || level == "z",
        ("lto", ProfileValue::Str(mode)) => matches!(mode.as_str(), "off" | "thin" | "fat"),
        ("debug-assertions", ProfileValue::Bool(_)) => true,
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(MatrixError::ConfigSerialization {
            field: key,
            value: value.to_string(),
            reason: "value outside the closed domain of this profile setting".to_string(),
        })
    }
}

impl ProfileBlock {
    /// Builds the block for `config` under the naming and inheritance rules of
    /// `settings`.
    pub fn for_configuration(
        config: &Configuration,
        settings: &MatrixSettings,
    ) -> Result<Self, MatrixError> {
        let name = profile_name(&settings.profile_prefix, config);
        validate_profile_name("profile name", &name, false)?;
        validate_profile_name("inherits", &settings.inherits, true)?;
        Ok(ProfileBlock {
            name,
            inherits: settings.inherits.clone(),
            entries: vec![
                ("opt-level", config.opt_level.into()),
                ("lto", config.lto.into()),
                ("debug-assertions", ProfileValue::Bool(config.debug_assertions)),
            ],
        })
    }

    /// Renders the block as TOML, failing fast on any out-of-domain value.
    pub fn render(&self) -> Result<String, MatrixError> {
        validate_profile_name("profile name", &self.name, false)?;
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(out, "[profile.{}]", self.name);
        let _ = writeln!(out, "inherits = {}", ProfileValue::Str(self.inherits.clone()));
        for (key, value) in &self.entries {
            validate_entry(*key, value)?;
            let _ = writeln!(out, "{key} = {value}");
        }
        Ok(out)
    }
}

/// Appends `block` to the manifest at `manifest_path`.
///
/// The manifest must not already define a profile with the same name; the
/// new block is added after all existing content.
pub fn append_profile(manifest_path: &Path, block: &ProfileBlock) -> Result<(), MatrixError> {
    let rendered = block.render()?;
    let mut content = fs::read_to_string(manifest_path)
        .map_err(|e| MatrixError::workspace(manifest_path, e))?;

    let manifest: toml::Table = toml::from_str(&content).map_err(|e| {
        MatrixError::workspace(manifest_path, std::io::Error::other(e.to_string()))
    })?;
    let already_defined = manifest
        .get("profile")
        .and_then(|profiles| profiles.get(&block.name))
        .is_some();
    if already_defined {
        return Err(MatrixError::ConfigSerialization {
            field: "profile name",
            value: block.name.clone(),
            reason: "the manifest already defines this profile".to_string(),
        });
    }

    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content.push('\n');
    content.push_str(&rendered);
    fs::write(manifest_path, content).map_err(|e| MatrixError::workspace(manifest_path, e))
}
