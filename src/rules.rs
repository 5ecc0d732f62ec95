//! Rule declarations and the commands bound to them.
//!
//! Registering a rule yields a typed handle. [`BuildCommand`] appends a build
//! edge producing files and returns a [`FileRef`] over its outputs;
//! [`ExecCommand`] appends an edge for a single side-effecting target and
//! returns a [`TargetRef`]. The [`RuleRegistry`] maps names to these handles
//! so references can look commands up by name.

use indexmap::IndexMap;

use crate::diagnostics::{Diagnostics, Warning};
use crate::error::{CommandKind, NinjuError, Result};
use crate::ir::{BuildEdge, Executable, Statement, Variables};
use crate::names::DEFAULT_EXTENSION;
use crate::pool::PoolRequest;
use crate::refs::{FileRef, Outputs, RefArg, TargetRef};
use crate::session::Session;
use crate::which::ExecutableResolver;

/// Optional settings of a build rule.
#[derive(Clone, Debug, Default)]
pub struct BuildRuleOptions {
    /// Arguments appended to the executable path, e.g. `-c $in -o $out`.
    pub args: Option<String>,
    /// Progress description.
    pub description: Option<String>,
    /// Dependency file written by the tool.
    pub depfile: Option<String>,
    /// Allow the edge to rewrite the build file being processed.
    pub generator: bool,
    /// Concurrency pool.
    pub pool: PoolRequest,
    /// Re-stat outputs after running.
    pub restat: bool,
    /// Response file path.
    pub rspfile: Option<String>,
    /// Response file content.
    pub rspfile_content: Option<String>,
    /// Dependency style (`gcc` or `msvc`).
    pub deps: Option<String>,
    /// Extension of generated output names; `tmp` when unset.
    pub output_extension: Option<String>,
}

impl BuildRuleOptions {
    /// Options with only `args` set.
    #[must_use]
    pub fn args(args: impl Into<String>) -> Self {
        Self {
            args: Some(args.into()),
            ..Self::default()
        }
    }
}

/// Optional settings of an exec rule.
#[derive(Clone, Debug, Default)]
pub struct ExecRuleOptions {
    /// Arguments appended to the executable path.
    pub args: Option<String>,
    /// Progress description.
    pub description: Option<String>,
    /// Response file path.
    pub rspfile: Option<String>,
    /// Response file content.
    pub rspfile_content: Option<String>,
}

/// Per-invocation arguments of a [`BuildCommand`].
#[derive(Clone, Debug, Default)]
pub struct BuildArgs {
    /// Requested outputs; one generated name by default.
    pub outputs: Outputs,
    /// Extra dependencies not passed on the command line.
    pub implicit: FileRef,
    /// Ordering-only dependencies.
    pub order_only: FileRef,
    /// Per-edge variable overrides.
    pub variables: Variables,
    /// Outputs not passed as `$out`.
    pub implicit_outputs: FileRef,
}

impl BuildArgs {
    /// Arguments requesting `outputs`.
    #[must_use]
    pub fn to(outputs: impl Into<Outputs>) -> Self {
        Self {
            outputs: outputs.into(),
            ..Self::default()
        }
    }

    /// Add implicit dependencies.
    #[must_use]
    pub fn with_implicit(mut self, implicit: impl Into<RefArg>) -> Self {
        self.implicit = FileRef::from_args([RefArg::from(self.implicit), implicit.into()]);
        self
    }

    /// Add order-only dependencies.
    #[must_use]
    pub fn with_order_only(mut self, order_only: impl Into<RefArg>) -> Self {
        self.order_only = FileRef::from_args([RefArg::from(self.order_only), order_only.into()]);
        self
    }

    /// Set a per-edge variable, replacing any earlier value for `key`.
    #[must_use]
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    /// Add implicit outputs.
    #[must_use]
    pub fn with_implicit_outputs(mut self, outputs: impl Into<RefArg>) -> Self {
        self.implicit_outputs =
            FileRef::from_args([RefArg::from(self.implicit_outputs), outputs.into()]);
        self
    }
}

/// Per-invocation arguments of an [`ExecCommand`].
#[derive(Clone, Debug, Default)]
pub struct ExecArgs {
    /// Inputs of the edge.
    pub inputs: FileRef,
    /// Per-edge variable overrides.
    pub variables: Variables,
}

impl ExecArgs {
    /// Arguments with `inputs`.
    #[must_use]
    pub fn inputs(inputs: impl Into<RefArg>) -> Self {
        Self {
            inputs: FileRef::of(inputs),
            ..Self::default()
        }
    }

    /// Set a per-edge variable, replacing any earlier value for `key`.
    #[must_use]
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }
}

/// Handle to a registered build rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildCommand {
    rule: String,
    executable_path: String,
    extension: String,
}

impl BuildCommand {
    pub(crate) const fn new(rule: String, executable_path: String, extension: String) -> Self {
        Self {
            rule,
            executable_path,
            extension,
        }
    }

    /// Name of the bound rule.
    #[must_use]
    pub fn rule(&self) -> &str {
        &self.rule
    }

    /// Path listed as an implicit input of every edge.
    #[must_use]
    pub fn executable_path(&self) -> &str {
        &self.executable_path
    }

    /// Append a build edge running this rule over `inputs`.
    ///
    /// The executable path is prepended to the implicit inputs so that
    /// changing the tool invalidates the edge.
    ///
    /// # Errors
    ///
    /// Returns [`NinjuError::CommandNotFound`] when `session` never declared
    /// this rule, and [`NinjuError::NoOutputs`] when `args.outputs` resolves
    /// to no paths.
    pub fn call(
        &self,
        session: &mut Session,
        inputs: impl Into<RefArg>,
        args: BuildArgs,
    ) -> Result<FileRef> {
        session.build_command(&self.rule)?;
        let BuildArgs {
            outputs,
            implicit,
            order_only,
            variables,
            implicit_outputs,
        } = args;
        let outputs = outputs.normalize(session.names_mut(), &self.extension);
        let implicit = FileRef::from_args([
            RefArg::Token(self.executable_path.clone()),
            implicit.into(),
        ]);
        session.append(Statement::Build(BuildEdge {
            outputs: outputs.clone(),
            rule: self.rule.clone(),
            inputs: FileRef::of(inputs).into_tokens(),
            implicit: implicit.into_tokens(),
            order_only: order_only.into_tokens(),
            variables,
            implicit_outputs: implicit_outputs.into_tokens(),
        }))?;
        Ok(FileRef::from_tokens(outputs))
    }
}

/// Handle to a registered exec rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecCommand {
    rule: String,
}

impl ExecCommand {
    pub(crate) const fn new(rule: String) -> Self {
        Self { rule }
    }

    /// Name of the bound rule.
    #[must_use]
    pub fn rule(&self) -> &str {
        &self.rule
    }

    /// Append an edge producing exactly one `target`.
    ///
    /// # Errors
    ///
    /// Returns [`NinjuError::CommandNotFound`] when `session` never declared
    /// this rule, and [`NinjuError::ExecTargetCardinality`] unless `target`
    /// flattens to exactly one token.
    pub fn call(
        &self,
        session: &mut Session,
        target: impl Into<RefArg>,
        args: ExecArgs,
    ) -> Result<TargetRef> {
        session.exec_command(&self.rule)?;
        let tokens = FileRef::of(target).into_tokens();
        let [name] = <[String; 1]>::try_from(tokens).map_err(|tokens| {
            NinjuError::ExecTargetCardinality {
                command: self.rule.clone(),
                count: tokens.len(),
                targets: tokens.join(", "),
            }
        })?;
        session.append(Statement::Build(BuildEdge {
            outputs: vec![name.clone()],
            rule: self.rule.clone(),
            inputs: args.inputs.into_tokens(),
            variables: args.variables,
            ..BuildEdge::default()
        }))?;
        Ok(TargetRef::new(name))
    }
}

/// Capability tables of registered commands.
#[derive(Debug, Default)]
pub struct RuleRegistry {
    build: IndexMap<String, BuildCommand>,
    exec: IndexMap<String, ExecCommand>,
}

impl RuleRegistry {
    /// Return `true` when either table holds `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.build.contains_key(name) || self.exec.contains_key(name)
    }

    /// Fail when `name` is already taken.
    ///
    /// # Errors
    ///
    /// Returns [`NinjuError::DuplicateRule`].
    pub fn ensure_unique(&self, name: &str) -> Result<()> {
        if self.contains(name) {
            return Err(NinjuError::DuplicateRule {
                name: name.to_owned(),
            });
        }
        Ok(())
    }

    pub(crate) fn insert_build(&mut self, command: BuildCommand) {
        self.build.insert(command.rule.clone(), command);
    }

    pub(crate) fn insert_exec(&mut self, command: ExecCommand) {
        self.exec.insert(command.rule.clone(), command);
    }

    /// Look up a build command.
    ///
    /// # Errors
    ///
    /// Returns [`NinjuError::CommandNotFound`] for unknown names.
    pub fn build(&self, name: &str) -> Result<&BuildCommand> {
        self.build.get(name).ok_or_else(|| NinjuError::CommandNotFound {
            name: name.to_owned(),
            kind: CommandKind::Build,
        })
    }

    /// Look up an exec command.
    ///
    /// # Errors
    ///
    /// Returns [`NinjuError::CommandNotFound`] for unknown names.
    pub fn exec(&self, name: &str) -> Result<&ExecCommand> {
        self.exec.get(name).ok_or_else(|| NinjuError::CommandNotFound {
            name: name.to_owned(),
            kind: CommandKind::Exec,
        })
    }
}

/// Resolve `executable`, degrading to the raw name plus a warning on a miss.
pub(crate) fn resolve_executable(
    resolver: &dyn ExecutableResolver,
    diagnostics: &mut Diagnostics,
    rule: &str,
    executable: &str,
) -> Executable {
    match resolver.resolve(executable) {
        Some(path) => Executable {
            requested: executable.to_owned(),
            path: path.into_string(),
            found: true,
        },
        None => {
            diagnostics.push(Warning::ExecutableNotFound {
                rule: rule.to_owned(),
                executable: executable.to_owned(),
            });
            Executable {
                requested: executable.to_owned(),
                path: executable.to_owned(),
                found: false,
            }
        }
    }
}

pub(crate) fn output_extension(options: &BuildRuleOptions) -> String {
    options
        .output_extension
        .clone()
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::which::MockExecutableResolver;
    use camino::Utf8PathBuf;
    use mockall::predicate::eq;
    use rstest::rstest;

    #[rstest]
    fn resolved_executable_uses_found_path() {
        let mut resolver = MockExecutableResolver::new();
        resolver
            .expect_resolve()
            .with(eq("cc"))
            .times(1)
            .return_const(Some(Utf8PathBuf::from("/usr/bin/cc")));
        let mut diags = Diagnostics::default();
        let exe = resolve_executable(&resolver, &mut diags, "compile", "cc");
        assert_eq!(exe.path, "/usr/bin/cc");
        assert!(exe.found);
        assert!(diags.is_empty());
    }

    #[rstest]
    fn missing_executable_degrades_to_raw_name() {
        let mut resolver = MockExecutableResolver::new();
        resolver.expect_resolve().return_const(None);
        let mut diags = Diagnostics::default();
        let exe = resolve_executable(&resolver, &mut diags, "compile", "not-a-tool");
        assert_eq!(exe.path, "not-a-tool");
        assert!(!exe.found);
        assert_eq!(
            diags.warnings(),
            [Warning::ExecutableNotFound {
                rule: "compile".into(),
                executable: "not-a-tool".into(),
            }]
        );
    }

    #[rstest]
    fn registry_reports_unknown_commands() {
        let mut rules = RuleRegistry::default();
        rules.insert_build(BuildCommand::new("cc".into(), "/usr/bin/cc".into(), "o".into()));
        rules.insert_exec(ExecCommand::new("run".into()));
        assert_eq!(rules.build("cc").map(BuildCommand::rule).ok(), Some("cc"));
        assert!(rules.build("run").is_err());
        assert!(rules.exec("cc").is_err());
        assert!(rules.ensure_unique("run").is_err());
        assert!(rules.ensure_unique("link").is_ok());
    }

    #[rstest]
    fn build_args_accumulate() {
        let args = BuildArgs::to(["a.o"])
            .with_implicit("gen.h")
            .with_implicit(["x.h", "y.h"])
            .with_variable("cflags", "-O2")
            .with_variable("cflags", "-O3");
        assert_eq!(args.outputs, Outputs::Paths(vec!["a.o".into()]));
        assert_eq!(args.implicit.tokens(), ["gen.h", "x.h", "y.h"]);
        assert_eq!(args.variables.get("cflags").map(String::as_str), Some("-O3"));
        assert_eq!(args.variables.len(), 1);
    }
}
