//! Error types raised while assembling a build file.
//!
//! Every failure in the configuration phase is a programmer or configuration
//! mistake, so errors surface at the offending call and propagate to the
//! caller unchanged. Missing executables are not errors; see
//! [`crate::diagnostics`].

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros.
// FIXME(rust-lang/rust#130021): remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use camino::Utf8PathBuf;
use miette::Diagnostic;
use std::fmt;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = NinjuError> = std::result::Result<T, E>;

/// Broad classification of a [`NinjuError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid pool request, exec target cardinality, duplicate rule.
    Configuration,
    /// A statement cannot be emitted as valid ninja syntax.
    Generator,
    /// Reserved for failures while running build steps.
    Execution,
    /// A chained call named a command that was never registered.
    AttributeNotFound,
    /// The session was created from the wrong working directory.
    Environment,
    /// Writing the build file failed.
    Io,
}

/// Which capability table a command lookup searched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandKind {
    /// Commands producing files, invoked on a [`crate::refs::FileRef`].
    Build,
    /// Side-effecting commands, invoked on a [`crate::refs::TargetRef`].
    Exec,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Build => f.write_str("build"),
            Self::Exec => f.write_str("exec"),
        }
    }
}

/// Errors produced by the build graph assembler.
#[derive(Debug, Error, Diagnostic)]
pub enum NinjuError {
    /// A pool request was neither a positive depth nor `console`.
    #[error("invalid pool '{request}': pool must be an integer greater than 0 or 'console'")]
    #[diagnostic(code(ninju::config::invalid_pool))]
    InvalidPool {
        /// Rendering of the rejected request.
        request: String,
    },

    /// An exec command was given anything other than exactly one target.
    #[error("exec command '{command}' can only have one target, got {count}: [{targets}]")]
    #[diagnostic(
        code(ninju::config::exec_target),
        help("pass a single target name to exec commands")
    )]
    ExecTargetCardinality {
        /// Command that was invoked.
        command: String,
        /// Number of flattened target tokens.
        count: usize,
        /// The flattened target tokens.
        targets: String,
    },

    /// A rule name was declared twice.
    #[error("rule '{name}' is already registered")]
    #[diagnostic(code(ninju::config::duplicate_rule))]
    DuplicateRule {
        /// The conflicting rule name.
        name: String,
    },

    /// A build edge would be emitted without outputs.
    #[error("build edge for rule '{rule}' has no output")]
    #[diagnostic(
        code(ninju::generator::no_output),
        help("omit `outputs` to generate an intermediate name")
    )]
    NoOutputs {
        /// Rule the edge references.
        rule: String,
    },

    /// Reserved for run-time failures of build steps.
    #[error("execution failed: {message}")]
    #[diagnostic(code(ninju::execution::failed))]
    Execution {
        /// Description of the failure.
        message: String,
    },

    /// A command name was looked up on a reference but never registered.
    #[error("no {kind} command named '{name}' is registered")]
    #[diagnostic(code(ninju::attribute::not_found))]
    CommandNotFound {
        /// Requested command name.
        name: String,
        /// Table that was searched.
        kind: CommandKind,
    },

    /// The configuration program was not run from its own directory.
    #[error("cannot run from outside directory \"{root}\" (current directory is \"{cwd}\")")]
    #[diagnostic(
        code(ninju::environment::wrong_directory),
        help("change into the configuration script's directory or set `skip_cwd_check`")
    )]
    WrongDirectory {
        /// Directory containing the configuration script.
        root: Utf8PathBuf,
        /// Working directory at session creation.
        cwd: Utf8PathBuf,
    },

    /// A process location (working directory, executable) is unavailable.
    #[error("failed to determine the {what}")]
    #[diagnostic(code(ninju::environment::locate))]
    Locate {
        /// What was being located.
        what: &'static str,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The build file could not be written.
    #[error("failed to write build file {path}")]
    #[diagnostic(code(ninju::io::write))]
    Io {
        /// Destination of the build file.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

impl NinjuError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidPool { .. }
            | Self::ExecTargetCardinality { .. }
            | Self::DuplicateRule { .. } => ErrorKind::Configuration,
            Self::NoOutputs { .. } => ErrorKind::Generator,
            Self::Execution { .. } => ErrorKind::Execution,
            Self::CommandNotFound { .. } => ErrorKind::AttributeNotFound,
            Self::WrongDirectory { .. } | Self::Locate { .. } => ErrorKind::Environment,
            Self::Io { .. } => ErrorKind::Io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(NinjuError::InvalidPool { request: "0".into() }, ErrorKind::Configuration)]
    #[case(NinjuError::NoOutputs { rule: "cc".into() }, ErrorKind::Generator)]
    #[case(
        NinjuError::CommandNotFound { name: "link".into(), kind: CommandKind::Build },
        ErrorKind::AttributeNotFound
    )]
    fn classifies_errors(#[case] err: NinjuError, #[case] expected: ErrorKind) {
        assert_eq!(err.kind(), expected);
    }

    #[rstest]
    fn command_not_found_names_the_table() {
        let err = NinjuError::CommandNotFound {
            name: "run".into(),
            kind: CommandKind::Exec,
        };
        assert_eq!(err.to_string(), "no exec command named 'run' is registered");
    }
}
