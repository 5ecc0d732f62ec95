//! Executable resolution against the host `PATH`.
//!
//! Rules name the tool they run; resolving it up front lets the generated
//! build file reference an absolute path and list the tool as an implicit
//! input of every edge using the rule.

use std::ffi::OsString;
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};

/// Resolve executable names to filesystem paths.
#[cfg_attr(test, mockall::automock)]
pub trait ExecutableResolver {
    /// Return the resolved path of `executable`, or `None` when it cannot be
    /// found.
    fn resolve(&self, executable: &str) -> Option<Utf8PathBuf>;
}

impl<F> ExecutableResolver for F
where
    F: Fn(&str) -> Option<Utf8PathBuf>,
{
    fn resolve(&self, executable: &str) -> Option<Utf8PathBuf> {
        self(executable)
    }
}

/// Resolver searching a snapshot of the `PATH` environment variable.
#[derive(Clone, Debug)]
pub struct PathLookup {
    cwd: Utf8PathBuf,
    dirs: Vec<Utf8PathBuf>,
}

impl PathLookup {
    /// Capture `PATH` and the current directory from the process environment.
    ///
    /// Entries that are not valid UTF-8 are skipped.
    #[must_use]
    pub fn from_env() -> Self {
        let cwd = std::env::current_dir()
            .ok()
            .and_then(|dir| Utf8PathBuf::from_path_buf(dir).ok())
            .unwrap_or_default();
        Self::new(cwd, std::env::var_os("PATH"))
    }

    /// Build a lookup over an explicit `PATH` value.
    ///
    /// Relative and empty entries are anchored at `cwd`.
    #[must_use]
    pub fn new(cwd: Utf8PathBuf, raw_path: Option<OsString>) -> Self {
        let dirs = raw_path
            .map(|raw| parse_path_entries(&raw, &cwd))
            .unwrap_or_default();
        Self { cwd, dirs }
    }

    /// Directories searched, in order.
    #[must_use]
    pub fn dirs(&self) -> &[Utf8PathBuf] {
        &self.dirs
    }
}

impl ExecutableResolver for PathLookup {
    fn resolve(&self, executable: &str) -> Option<Utf8PathBuf> {
        if is_direct_path(executable) {
            let raw = Utf8Path::new(executable);
            let resolved = if raw.is_absolute() {
                raw.to_path_buf()
            } else {
                self.cwd.join(raw)
            };
            return is_executable(&resolved).then_some(resolved);
        }
        let found = self
            .dirs
            .iter()
            .map(|dir| dir.join(executable))
            .find(|candidate| is_executable(candidate));
        if found.is_none() {
            tracing::debug!(%executable, searched = self.dirs.len(), "executable not on PATH");
        }
        found
    }
}

fn parse_path_entries(raw: &OsString, cwd: &Utf8Path) -> Vec<Utf8PathBuf> {
    std::env::split_paths(raw)
        .filter_map(|component| {
            if component.as_os_str().is_empty() {
                return Some(cwd.to_path_buf());
            }
            let utf8 = Utf8PathBuf::from_path_buf(component).ok()?;
            Some(if utf8.is_absolute() {
                utf8
            } else {
                cwd.join(utf8)
            })
        })
        .collect()
}

fn is_direct_path(command: &str) -> bool {
    #[cfg(windows)]
    {
        command.contains(['\\', '/', ':'])
    }
    #[cfg(not(windows))]
    {
        command.contains('/')
    }
}

fn is_executable(path: &Utf8Path) -> bool {
    fs::metadata(path.as_std_path())
        .is_ok_and(|metadata| metadata.is_file() && has_execute_permission(&metadata))
}

#[cfg(unix)]
fn has_execute_permission(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
const fn has_execute_permission(_: &fs::Metadata) -> bool {
    true
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    #[fixture]
    fn bin_dir() -> (TempDir, Utf8PathBuf) {
        let dir = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp dir");
        let tool = root.join("tool");
        fs::write(&tool, "#!/bin/sh\nexit 0\n").expect("write tool");
        fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).expect("chmod tool");
        fs::write(root.join("data"), "").expect("write data");
        (dir, root)
    }

    #[rstest]
    fn finds_executable_on_path(bin_dir: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = bin_dir;
        let lookup = PathLookup::new("/".into(), Some(root.as_os_str().to_owned()));
        assert_eq!(lookup.resolve("tool"), Some(root.join("tool")));
    }

    #[rstest]
    fn skips_non_executable_files(bin_dir: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = bin_dir;
        let lookup = PathLookup::new("/".into(), Some(root.as_os_str().to_owned()));
        assert_eq!(lookup.resolve("data"), None);
        assert_eq!(lookup.resolve("missing"), None);
    }

    #[rstest]
    fn resolves_direct_paths_against_cwd(bin_dir: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = bin_dir;
        let lookup = PathLookup::new(root.clone(), None);
        assert_eq!(lookup.resolve("./tool"), Some(root.join("./tool")));
        assert!(lookup.dirs().is_empty());
    }
}
