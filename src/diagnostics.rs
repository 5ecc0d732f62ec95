//! Non-fatal diagnostics collected during configuration.
//!
//! Conditions that should not abort generation, such as an executable missing
//! from `PATH`, are recorded here so callers can inspect or report them after
//! the build file has been produced. Each warning is also logged through
//! `tracing` when it is recorded.

use std::fmt;

use serde::Serialize;

/// A non-fatal condition observed while declaring rules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// An executable could not be resolved; the raw name is used instead.
    ExecutableNotFound {
        /// Rule that references the executable.
        rule: String,
        /// The executable as requested.
        executable: String,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExecutableNotFound { rule, executable } => {
                write!(f, "executable not found: {executable} (rule '{rule}')")
            }
        }
    }
}

/// Ordered list of warnings recorded during one session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record `warning` and log it.
    pub fn push(&mut self, warning: Warning) {
        tracing::warn!(%warning, "configuration warning");
        self.warnings.push(warning);
    }

    /// Warnings in the order they were recorded.
    #[must_use]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Return `true` when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Names of executables that could not be resolved.
    pub fn missing_executables(&self) -> impl Iterator<Item = &str> {
        self.warnings.iter().map(|warning| match warning {
            Warning::ExecutableNotFound { executable, .. } => executable.as_str(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn records_in_order() {
        let mut diags = Diagnostics::default();
        diags.push(Warning::ExecutableNotFound {
            rule: "cc".into(),
            executable: "gcc".into(),
        });
        diags.push(Warning::ExecutableNotFound {
            rule: "ld".into(),
            executable: "lld".into(),
        });
        assert_eq!(diags.missing_executables().collect::<Vec<_>>(), ["gcc", "lld"]);
        assert!(!diags.is_empty());
    }
}
