//! Test utilities shared by the integration suites.
//!
//! Provides throwaway project directories, fake executables and a resolver
//! with a fixed lookup table so tests never depend on the host `PATH`.

pub mod check_ninja;
pub mod project;
pub mod resolver;

pub use project::TempProject;
pub use resolver::StaticResolver;

use std::fs;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

/// Write a shell script named `name` into `dir` and mark it executable.
///
/// # Errors
///
/// Returns an error when the script cannot be written or its permissions
/// cannot be changed.
pub fn fake_executable(dir: &Utf8Path, name: &str) -> Result<Utf8PathBuf> {
    let path = dir.join(name);
    fs::write(&path, "#!/bin/sh\nexit 0\n")
        .with_context(|| format!("fake_executable: write {path}"))?;
    make_executable(&path)?;
    Ok(path)
}

/// Create a temporary directory holding one fake executable per name.
///
/// # Errors
///
/// Returns an error when the directory or any script cannot be created.
pub fn tool_dir(names: &[&str]) -> Result<(TempDir, Utf8PathBuf)> {
    let dir = TempDir::new().context("tool_dir: create temp dir")?;
    let root = utf8_path(dir.path())?;
    for name in names {
        fake_executable(&root, name)?;
    }
    Ok((dir, root))
}

/// Convert a temporary path into a UTF-8 path.
///
/// # Errors
///
/// Returns an error for non UTF-8 paths.
pub fn utf8_path(path: &std::path::Path) -> Result<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path.to_path_buf())
        .map_err(|p| anyhow::anyhow!("path is not valid UTF-8: {}", p.display()))
}

#[cfg(unix)]
fn make_executable(path: &Utf8Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)
        .with_context(|| format!("make_executable: read metadata {path}"))?
        .permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms)
        .with_context(|| format!("make_executable: set permissions {path}"))
}

#[cfg(not(unix))]
fn make_executable(_path: &Utf8Path) -> Result<()> {
    Ok(())
}
