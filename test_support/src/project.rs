//! Temporary project directories for end-to-end generation tests.

use std::fs;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use ninju::SessionConfig;
use tempfile::TempDir;

use crate::utf8_path;

/// A temporary project root with a `configure` script path inside it.
///
/// The directory is removed when the value is dropped.
#[derive(Debug)]
pub struct TempProject {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl TempProject {
    /// Create an empty project directory.
    ///
    /// # Errors
    ///
    /// Returns an error when the temporary directory cannot be created.
    pub fn new() -> Result<Self> {
        let dir = TempDir::new().context("TempProject: create temp dir")?;
        let root = utf8_path(dir.path())?;
        Ok(Self { _dir: dir, root })
    }

    /// Absolute project root.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Path of the configuration program inside the project.
    pub fn script(&self) -> Utf8PathBuf {
        self.root.join("configure")
    }

    /// Session configuration rooted at this project.
    ///
    /// The working directory guard is disabled because tests run from the
    /// crate directory.
    pub fn config(&self) -> SessionConfig {
        SessionConfig {
            root_dir: Some(self.root.clone()),
            skip_cwd_check: true,
            ..SessionConfig::for_script(self.script())
        }
    }

    /// Create `relative` with `content`, making parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be written.
    pub fn write(&self, relative: &str, content: &str) -> Result<Utf8PathBuf> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {parent}"))?;
        }
        fs::write(&path, content).with_context(|| format!("write {path}"))?;
        Ok(path)
    }

    /// Read `relative` as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read.
    pub fn read(&self, relative: &str) -> Result<String> {
        let path = self.root.join(relative);
        fs::read_to_string(&path).with_context(|| format!("read {path}"))
    }
}
