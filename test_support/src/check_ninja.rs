//! Helpers for running generated build files through a real `ninja`.

use std::process::Command;

use anyhow::{Context, Result, bail};
use camino::Utf8Path;

/// Whether a working `ninja` is on `PATH`.
pub fn ninja_available() -> bool {
    Command::new("ninja")
        .arg("--version")
        .output()
        .is_ok_and(|out| out.status.success())
}

/// Run `ninja` in `dir` with `args`, returning its standard output.
///
/// # Errors
///
/// Returns an error when `ninja` cannot be spawned or exits unsuccessfully.
pub fn run_ninja(dir: &Utf8Path, args: &[&str]) -> Result<String> {
    let out = Command::new("ninja")
        .args(args)
        .current_dir(dir)
        .output()
        .with_context(|| format!("run_ninja: spawn ninja in {dir}"))?;
    if !out.status.success() {
        bail!(
            "ninja {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&out.stderr)
        );
    }
    String::from_utf8(out.stdout).context("run_ninja: stdout is not UTF-8")
}
