//! Writing the statement log to the build file.

use std::io::{self, BufWriter};

use camino::Utf8Path;
use cap_std::{ambient_authority, fs as cap_fs};
use tracing::{debug, info};

use super::Session;
use crate::error::{NinjuError, Result};
use crate::ninja_gen::{NinjaWriter, StatementEmitter};

/// Crate version stamped into the header comment.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Project URL stamped into the header comment.
pub const PROJECT_URL: &str = env!("CARGO_PKG_REPOSITORY");

impl Session {
    /// Write the build file to `<root>/<build_file>`.
    ///
    /// Returns the path written.
    ///
    /// # Errors
    ///
    /// Returns [`NinjuError::Io`] when the file cannot be created or written.
    pub fn generate(&self) -> Result<camino::Utf8PathBuf> {
        let path = self.build_file_path();
        let io_err = |source| NinjuError::Io {
            path: path.clone(),
            source,
        };
        let dir = cap_fs::Dir::open_ambient_dir(self.root_dir(), ambient_authority())
            .map_err(io_err)?;
        let relative = self.config.build_file.as_path();
        create_parent(&dir, relative).map_err(io_err)?;
        let file = dir.create(relative.as_str()).map_err(io_err)?;
        let mut writer = NinjaWriter::new(BufWriter::new(file));
        self.write_to(&mut writer).map_err(io_err)?;
        writer.flush().map_err(io_err)?;
        info!(path = %path, statements = self.log.len(), "generated ninja file");
        Ok(path)
    }

    /// Render the build file to a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut writer = NinjaWriter::new(Vec::new());
        if let Err(err) = self.write_to(&mut writer) {
            debug!(error = %err, "rendering to memory failed");
        }
        String::from_utf8_lossy(&writer.into_inner()).into_owned()
    }

    /// Write the header followed by every statement to `emitter`.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by `emitter`.
    pub fn write_to<E: StatementEmitter + ?Sized>(&self, emitter: &mut E) -> io::Result<()> {
        if tracing::enabled!(tracing::Level::DEBUG) {
            match serde_json::to_string_pretty(&self.log) {
                Ok(json) => debug!("statements:\n{json}"),
                Err(err) => debug!(error = %err, "could not serialise statements"),
            }
        }
        emitter.comment(&format!(
            "This file is generated by Ninju v{VERSION} ({PROJECT_URL})"
        ))?;
        emitter.newline()?;
        self.log.serialize(emitter, self.config.blank_lines)
    }
}

fn create_parent(dir: &cap_fs::Dir, path: &Utf8Path) -> io::Result<()> {
    match path.parent().filter(|p| !p.as_str().is_empty()) {
        Some(parent) => dir.create_dir_all(parent.as_str()),
        None => Ok(()),
    }
}
