//! # File System Operations Module / 文件系统操作模块
//!
//! Staging of isolated per-configuration workspaces. Each configuration gets
//! its own copy of the project (without build output or VCS metadata) and its
//! own target directory, so no two configurations share mutable build state.
//!
//! 为每个配置准备隔离的工作区。每个配置都有自己的项目副本（不含构建产物和版本控制元数据）
//! 以及自己的 target 目录，因此任何两个配置都不会共享可变的构建状态。

use fs_extra::dir::{copy, CopyOptions};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::core::error::MatrixError;
use crate::core::models::Manifest;

/// Top-level entries never copied into a staged workspace.
const EXCLUDED_ENTRIES: &[&str] = &["target", ".git"];

/// A staged copy of the project. The directory is removed when this value is
/// dropped unless it has been preserved first.
///
/// 项目的暂存副本。除非事先被保留，否则在此值被 drop 时目录会被删除。
pub struct Workspace {
    _temp_root: TempDir,
    /// Root of the copied project.
    pub root: PathBuf,
    pub manifest_path: PathBuf,
    pub target_dir: PathBuf,
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("root", &self.root)
            .field("target_dir", &self.target_dir)
            .finish_non_exhaustive()
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

fn fs_extra_to_io(e: fs_extra::error::Error) -> io::Error {
    io::Error::other(e.to_string())
}

/// Copies `project_root` into a fresh temporary directory for `config_name`.
///
/// # Arguments
/// * `project_root` - Root of the project under test (must contain `Cargo.toml`)
/// * `config_name` - Configuration name, used in the temporary directory prefix
pub fn stage_workspace(project_root: &Path, config_name: &str) -> Result<Workspace, MatrixError> {
    let source_manifest = project_root.join("Cargo.toml");
    if !source_manifest.is_file() {
        return Err(MatrixError::workspace(
            &source_manifest,
            io::Error::new(io::ErrorKind::NotFound, "project has no Cargo.toml"),
        ));
    }

    let temp_root = tempfile::Builder::new()
        .prefix(&format!("reach_matrix_{}_", sanitize(config_name)))
        .tempdir()
        .map_err(|e| MatrixError::workspace(std::env::temp_dir(), e))?;
    let root = temp_root.path().join("project");
    fs::create_dir_all(&root).map_err(|e| MatrixError::workspace(&root, e))?;

    let entries = fs::read_dir(project_root).map_err(|e| MatrixError::workspace(project_root, e))?;
    let mut items = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| MatrixError::workspace(project_root, e))?;
        let name = entry.file_name();
        if EXCLUDED_ENTRIES.iter().any(|excluded| name == *excluded) {
            continue;
        }
        items.push(entry.path());
    }

    let mut options = CopyOptions::new();
    options.overwrite = true;
    fs_extra::copy_items(&items, &root, &options)
        .map_err(|e| MatrixError::workspace(&root, fs_extra_to_io(e)))?;

    let manifest_path = root.join("Cargo.toml");
    let target_dir = root.join("target");
    Ok(Workspace {
        _temp_root: temp_root,
        root,
        manifest_path,
        target_dir,
    })
}

/// Copies the entire content of a source directory to a destination
/// directory, replacing whatever was there.
pub fn copy_dir_all(from: &Path, to: &Path) -> Result<(), MatrixError> {
    if to.exists() {
        fs::remove_dir_all(to).map_err(|e| MatrixError::workspace(to, e))?;
    }
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|e| MatrixError::workspace(parent, e))?;
    }
    let mut options = CopyOptions::new();
    options.overwrite = true;
    options.copy_inside = true;
    copy(from, to, &options).map_err(|e| MatrixError::workspace(to, fs_extra_to_io(e)))?;
    Ok(())
}

/// Keeps a staged workspace for manual reproduction under
/// `<project_root>/target/reach-matrix/<config_name>`.
pub fn preserve_workspace(
    workspace: &Workspace,
    project_root: &Path,
    config_name: &str,
) -> Result<PathBuf, MatrixError> {
    let destination = project_root
        .join("target")
        .join("reach-matrix")
        .join(sanitize(config_name));
    copy_dir_all(&workspace.root, &destination)?;
    Ok(destination)
}

/// Gets the absolute path from a potentially relative path, expanding `~`
/// and environment variables first.
pub fn absolute_path(path: &Path) -> anyhow::Result<PathBuf> {
    use anyhow::Context;

    let raw = path.to_string_lossy();
    let expanded = shellexpand::full(&raw)
        .with_context(|| format!("Failed to expand path: {raw}"))?;
    fs::canonicalize(expanded.as_ref())
        .with_context(|| format!("Failed to resolve path: {}", path.display()))
}

/// Reads the package name from `<project_root>/Cargo.toml`.
/// A virtual workspace manifest has no package and yields `None`.
pub fn read_crate_name(project_root: &Path) -> anyhow::Result<Option<String>> {
    use anyhow::Context;

    let manifest_path = project_root.join("Cargo.toml");
    let content = fs::read_to_string(&manifest_path)
        .with_context(|| format!("Failed to read manifest: {}", manifest_path.display()))?;
    let manifest: Manifest = toml::from_str(&content)
        .with_context(|| format!("Failed to parse manifest: {}", manifest_path.display()))?;
    Ok(manifest.package.map(|p| p.name))
}
