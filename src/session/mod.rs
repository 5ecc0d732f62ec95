//! The configuration session.
//!
//! A [`Session`] owns the statement log, rule and pool registries and the
//! name generator for one configure-then-generate run. Creating it seeds the
//! log with the preamble variables and a `configure` generator rule whose
//! edge rebuilds the build file whenever the configuration program or this
//! engine changes.

mod config;
mod generate;

pub use config::SessionConfig;
pub use generate::{PROJECT_URL, VERSION};

use camino::{Utf8Path, Utf8PathBuf};

use crate::diagnostics::Diagnostics;
use crate::error::{NinjuError, Result};
use crate::ir::{
    BuildRule, DefaultDecl, ExecRule, PhonyEdge, Statement, StatementLog, VariableDef,
};
use crate::names::NameGenerator;
use crate::pool::{PoolRegistry, PoolRequest};
use crate::refs::{DirRef, FileRef, RefArg, join_path};
use crate::rules::{
    self, BuildArgs, BuildCommand, BuildRuleOptions, ExecCommand, ExecRuleOptions, RuleRegistry,
};
use crate::which::{ExecutableResolver, PathLookup};

/// Minimum ninja version the generated file requires.
pub const NINJA_REQUIRED_VERSION: &str = "1.7";

/// Source of the session module, an implicit input of the regeneration edge.
pub const ENGINE_SOURCE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/src/session/mod.rs");

/// Source of the ninja writer, an implicit input of the regeneration edge.
pub const EMITTER_SOURCE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/src/ninja_gen.rs");

/// Name of the built-in regeneration rule.
pub const CONFIGURE_RULE: &str = "configure";

/// State of one build configuration run.
pub struct Session {
    config: SessionConfig,
    root_dir: Utf8PathBuf,
    log: StatementLog,
    names: NameGenerator,
    pools: PoolRegistry,
    rules: RuleRegistry,
    diagnostics: Diagnostics,
    resolver: Box<dyn ExecutableResolver>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("root_dir", &self.root_dir)
            .field("statements", &self.log.len())
            .field("diagnostics", &self.diagnostics)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Start a session resolving executables against the process `PATH`.
    ///
    /// # Errors
    ///
    /// See [`Session::with_resolver`].
    pub fn new(config: SessionConfig) -> Result<Self> {
        Self::with_resolver(config, PathLookup::from_env())
    }

    /// Start a session, exiting the process when the directory guard fails.
    ///
    /// Any other bootstrap error is returned.
    ///
    /// # Errors
    ///
    /// See [`Session::with_resolver`].
    pub fn new_or_exit(config: SessionConfig) -> Result<Self> {
        match Self::new(config) {
            Err(err @ NinjuError::WrongDirectory { .. }) => {
                tracing::error!(error = %err, "refusing to generate build file");
                std::process::exit(1);
            }
            other => other,
        }
    }

    /// Start a session using `resolver` for executable lookups.
    ///
    /// # Errors
    ///
    /// Returns [`NinjuError::WrongDirectory`] unless the working directory is
    /// the root directory or `skip_cwd_check` is set, and
    /// [`NinjuError::Locate`] when the working directory is unavailable.
    pub fn with_resolver(
        config: SessionConfig,
        resolver: impl ExecutableResolver + 'static,
    ) -> Result<Self> {
        let cwd = current_dir()?;
        let root_dir = config.resolve_root(&cwd);
        if !config.skip_cwd_check && !same_dir(&root_dir, &cwd) {
            return Err(NinjuError::WrongDirectory {
                root: root_dir,
                cwd,
            });
        }
        let mut session = Self {
            config,
            root_dir,
            log: StatementLog::default(),
            names: NameGenerator::default(),
            pools: PoolRegistry::default(),
            rules: RuleRegistry::default(),
            diagnostics: Diagnostics::default(),
            resolver: Box::new(resolver),
        };
        session.bootstrap()?;
        Ok(session)
    }

    fn bootstrap(&mut self) -> Result<()> {
        self.var("ninja_required_version", NINJA_REQUIRED_VERSION)?;
        self.var("root", ".")?;
        let builddir = join_path("${root}", &[self.config.build_dir.as_str()]);
        self.var("builddir", builddir)?;

        let script = self.config.script.clone();
        let configure = self.build_rule(
            CONFIGURE_RULE,
            script.as_str(),
            BuildRuleOptions {
                description: Some("Regenerate ninja build file".to_owned()),
                generator: true,
                ..BuildRuleOptions::default()
            },
        )?;
        let build_file = self.root(&[self.config.build_file.as_str()]);
        let implicit = FileRef::from_args([
            RefArg::from([ENGINE_SOURCE, EMITTER_SOURCE]),
            RefArg::from(self.config.extra_implicit.clone()),
        ]);
        configure.call(
            self,
            RefArg::Skip,
            BuildArgs::to(build_file).with_implicit(implicit),
        )?;
        Ok(())
    }

    pub(crate) fn append(&mut self, statement: Statement) -> Result<()> {
        self.log.append(statement)
    }

    pub(crate) const fn names_mut(&mut self) -> &mut NameGenerator {
        &mut self.names
    }

    /// Declare a top-level variable and return its `${name}` reference.
    ///
    /// # Errors
    ///
    /// Propagates failures from the statement log.
    pub fn var(&mut self, name: &str, value: impl Into<String>) -> Result<String> {
        self.append(Statement::Variable(VariableDef {
            name: name.to_owned(),
            value: value.into(),
        }))?;
        Ok(format!("${{{name}}}"))
    }

    /// A one-token reference to `parts` joined under `${root}`.
    #[must_use]
    pub fn root(&self, parts: &[&str]) -> FileRef {
        FileRef::from_tokens(vec![join_path("${root}", parts)])
    }

    /// A one-token reference to `parts` joined under `${builddir}`.
    #[must_use]
    pub fn builddir(&self, parts: &[&str]) -> FileRef {
        FileRef::from_tokens(vec![join_path("${builddir}", parts)])
    }

    /// A directory anchor at `${root}/parts…`.
    ///
    /// With `var`, the path is declared as that variable and the anchor
    /// becomes `${var}`.
    ///
    /// # Errors
    ///
    /// Propagates failures from the statement log.
    pub fn dir(&mut self, parts: &[&str], var: Option<&str>) -> Result<DirRef> {
        let path = join_path("${root}", parts);
        let base = match var {
            Some(name) => self.var(name, path)?,
            None => path,
        };
        Ok(DirRef::new(base))
    }

    /// Declare `targets` as the default build targets.
    ///
    /// # Errors
    ///
    /// Propagates failures from the statement log.
    pub fn default(&mut self, targets: impl Into<RefArg>) -> Result<()> {
        self.append(Statement::Default(DefaultDecl {
            targets: FileRef::of(targets).into_tokens(),
        }))
    }

    pub(crate) fn phony(&mut self, name: &str, inputs: FileRef) -> Result<()> {
        self.append(Statement::Phony(PhonyEdge {
            name: name.to_owned(),
            inputs: inputs.into_tokens(),
        }))
    }

    /// Register a build rule running `executable` and return its command.
    ///
    /// An unresolvable executable is recorded in [`Session::diagnostics`] and
    /// used by name.
    ///
    /// # Errors
    ///
    /// Returns [`NinjuError::DuplicateRule`] for a reused name and
    /// [`NinjuError::InvalidPool`] for an invalid pool request.
    pub fn build_rule(
        &mut self,
        name: &str,
        executable: &str,
        options: BuildRuleOptions,
    ) -> Result<BuildCommand> {
        self.rules.ensure_unique(name)?;
        let pool = self.pools.resolve(&options.pool, &mut self.log)?;
        let executable =
            rules::resolve_executable(&*self.resolver, &mut self.diagnostics, name, executable);
        let command = BuildCommand::new(
            name.to_owned(),
            executable.path.clone(),
            rules::output_extension(&options),
        );
        let BuildRuleOptions {
            args,
            description,
            depfile,
            generator,
            restat,
            rspfile,
            rspfile_content,
            deps,
            ..
        } = options;
        self.append(Statement::BuildRule(BuildRule {
            name: name.to_owned(),
            executable,
            args,
            description,
            depfile,
            generator,
            pool,
            restat,
            rspfile,
            rspfile_content,
            deps,
        }))?;
        self.rules.insert_build(command.clone());
        Ok(command)
    }

    /// Register an exec rule running `executable` in the console pool.
    ///
    /// # Errors
    ///
    /// Returns [`NinjuError::DuplicateRule`] for a reused name.
    pub fn exec_rule(
        &mut self,
        name: &str,
        executable: &str,
        options: ExecRuleOptions,
    ) -> Result<ExecCommand> {
        self.rules.ensure_unique(name)?;
        let executable =
            rules::resolve_executable(&*self.resolver, &mut self.diagnostics, name, executable);
        let ExecRuleOptions {
            args,
            description,
            rspfile,
            rspfile_content,
        } = options;
        self.append(Statement::ExecRule(ExecRule {
            name: name.to_owned(),
            executable,
            args,
            description,
            rspfile,
            rspfile_content,
        }))?;
        let command = ExecCommand::new(name.to_owned());
        self.rules.insert_exec(command.clone());
        Ok(command)
    }

    /// Resolve a pool request, declaring the pool on first use.
    ///
    /// # Errors
    ///
    /// Returns [`NinjuError::InvalidPool`] for invalid requests.
    pub fn pool(&mut self, request: impl Into<PoolRequest>) -> Result<Option<String>> {
        self.pools.resolve(&request.into(), &mut self.log)
    }

    /// Look up a registered build command by name.
    ///
    /// # Errors
    ///
    /// Returns [`NinjuError::CommandNotFound`] for unknown names.
    pub fn build_command(&self, name: &str) -> Result<BuildCommand> {
        self.rules.build(name).cloned()
    }

    /// Look up a registered exec command by name.
    ///
    /// # Errors
    ///
    /// Returns [`NinjuError::CommandNotFound`] for unknown names.
    pub fn exec_command(&self, name: &str) -> Result<ExecCommand> {
        self.rules.exec(name).cloned()
    }

    /// Statements appended so far.
    #[must_use]
    pub const fn statements(&self) -> &StatementLog {
        &self.log
    }

    /// Non-fatal warnings recorded so far.
    #[must_use]
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// The session's configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Absolute root directory.
    #[must_use]
    pub fn root_dir(&self) -> &Utf8Path {
        &self.root_dir
    }

    /// Absolute path of the build file.
    #[must_use]
    pub fn build_file_path(&self) -> Utf8PathBuf {
        self.root_dir.join(&self.config.build_file)
    }
}

fn current_dir() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir().map_err(|source| NinjuError::Locate {
        what: "current directory",
        source,
    })?;
    Utf8PathBuf::from_path_buf(cwd).map_err(|path| NinjuError::Locate {
        what: "current directory",
        source: std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("path is not valid UTF-8: {}", path.display()),
        ),
    })
}

fn same_dir(a: &Utf8Path, b: &Utf8Path) -> bool {
    match (a.canonicalize_utf8(), b.canonicalize_utf8()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
