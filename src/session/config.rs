//! Session configuration.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

use crate::error::{NinjuError, Result};

/// Settings fixed for the lifetime of a [`super::Session`].
///
/// Deserialisable so clients can keep it in a JSON file; every field is
/// optional there.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// The configuration program; runs as the `configure` generator rule.
    pub script: Utf8PathBuf,
    /// Root directory; the script's directory when unset.
    ///
    /// When set, it also replaces the script's directory in the working
    /// directory guard: the session must be created from this directory.
    pub root_dir: Option<Utf8PathBuf>,
    /// Build file path, relative to the root directory.
    pub build_file: Utf8PathBuf,
    /// Directory for generated intermediates, relative to `${root}`.
    pub build_dir: String,
    /// Skip the check that the working directory is the root directory.
    pub skip_cwd_check: bool,
    /// Write a blank line after every statement.
    pub blank_lines: bool,
    /// Additional files whose changes regenerate the build file.
    pub extra_implicit: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            script: Utf8PathBuf::new(),
            root_dir: None,
            build_file: Utf8PathBuf::from("build.ninja"),
            build_dir: ".builddir".to_owned(),
            skip_cwd_check: false,
            blank_lines: true,
            extra_implicit: Vec::new(),
        }
    }
}

impl SessionConfig {
    /// Configuration for the program at `script`.
    #[must_use]
    pub fn for_script(script: impl Into<Utf8PathBuf>) -> Self {
        Self {
            script: script.into(),
            ..Self::default()
        }
    }

    /// Configuration for the running executable.
    ///
    /// # Errors
    ///
    /// Returns [`NinjuError::Locate`] when the executable path is unavailable
    /// or not valid UTF-8.
    pub fn from_current_exe() -> Result<Self> {
        let exe = std::env::current_exe().map_err(|source| NinjuError::Locate {
            what: "current executable",
            source,
        })?;
        let script = Utf8PathBuf::from_path_buf(exe).map_err(|path| NinjuError::Locate {
            what: "current executable",
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("path is not valid UTF-8: {}", path.display()),
            ),
        })?;
        Ok(Self::for_script(script))
    }

    /// Absolute root directory, resolved against `cwd`.
    pub(crate) fn resolve_root(&self, cwd: &Utf8Path) -> Utf8PathBuf {
        let root = self.root_dir.clone().unwrap_or_else(|| {
            self.script
                .parent()
                .map(Utf8Path::to_path_buf)
                .unwrap_or_default()
        });
        if root.is_absolute() {
            root
        } else if root.as_str().is_empty() {
            cwd.to_path_buf()
        } else {
            cwd.join(root)
        }
    }
}
