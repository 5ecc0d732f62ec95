//! Statement model of the generated build file.
//!
//! Each call made while configuring a session appends exactly one
//! [`Statement`] to the [`StatementLog`]. Statements are immutable once
//! appended and are emitted in append order, because ninja resolves rule
//! references and variable scope by position in the file.
//!
//! # Examples
//!
//! ```
//! use ninju::ir::{Statement, StatementLog, VariableDef};
//!
//! let mut log = StatementLog::default();
//! log.append(Statement::Variable(VariableDef {
//!     name: "root".into(),
//!     value: ".".into(),
//! }))
//! .expect("variables are always valid");
//! assert_eq!(log.len(), 1);
//! ```

mod log;

pub use log::StatementLog;

use indexmap::IndexMap;
use serde::Serialize;

use crate::ninja_gen::{EdgeDecl, RuleDecl, StatementEmitter};

/// Name of ninja's built-in interactive pool.
pub const CONSOLE_POOL: &str = "console";

/// Per-edge variable overrides; keys are unique and keep insertion order.
pub type Variables = IndexMap<String, String>;

/// A single entry of the build file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "statement", rename_all = "snake_case")]
pub enum Statement {
    /// Top-level `name = value` assignment.
    Variable(VariableDef),
    /// Concurrency pool declaration.
    Pool(PoolDef),
    /// Rule producing files.
    BuildRule(BuildRule),
    /// Rule running a side-effecting action in the console pool.
    ExecRule(ExecRule),
    /// Build edge referencing a previously declared rule.
    Build(BuildEdge),
    /// Alias edge using ninja's `phony` rule.
    Phony(PhonyEdge),
    /// `default` target declaration.
    Default(DefaultDecl),
}

impl Statement {
    /// Hand this statement to `emitter`.
    ///
    /// # Errors
    ///
    /// Propagates any error reported by the emitter.
    pub fn write<E: StatementEmitter + ?Sized>(&self, emitter: &mut E) -> std::io::Result<()> {
        match self {
            Self::Variable(var) => emitter.variable(&var.name, &var.value, 0),
            Self::Pool(pool) => emitter.pool(&pool.name, pool.depth),
            Self::BuildRule(rule) => emitter.rule(&rule.decl()),
            Self::ExecRule(rule) => emitter.rule(&rule.decl()),
            Self::Build(edge) => emitter.build(&edge.decl()),
            Self::Phony(phony) => emitter.build(&phony.decl()),
            Self::Default(default) => emitter.default(&default.targets),
        }
    }

    /// Short label used in logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Variable(_) => "variable",
            Self::Pool(_) => "pool",
            Self::BuildRule(_) => "build rule",
            Self::ExecRule(_) => "exec rule",
            Self::Build(_) => "build",
            Self::Phony(_) => "phony",
            Self::Default(_) => "default",
        }
    }
}

/// A top-level variable assignment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VariableDef {
    /// Variable name.
    pub name: String,
    /// Unescaped value.
    pub value: String,
}

/// A pool limiting concurrent jobs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PoolDef {
    /// Generated pool name, `pool_<depth>`.
    pub name: String,
    /// Maximum concurrent jobs.
    pub depth: u32,
}

/// How a rule's executable was located.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Executable {
    /// Name as requested by the caller.
    pub requested: String,
    /// Resolved path, or the requested name when resolution failed.
    pub path: String,
    /// Whether resolution succeeded.
    pub found: bool,
}

impl Executable {
    fn command(&self, args: Option<&str>) -> String {
        match args {
            Some(args) => format!("{} {args}", self.path),
            None => self.path.clone(),
        }
    }
}

/// A rule producing files.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BuildRule {
    /// Unique rule name.
    pub name: String,
    /// Tool run by the rule.
    pub executable: Executable,
    /// Arguments appended to the executable path.
    pub args: Option<String>,
    /// Human readable progress description.
    pub description: Option<String>,
    /// Dependency file written by the tool.
    pub depfile: Option<String>,
    /// Edge may rewrite the build file currently being processed.
    pub generator: bool,
    /// Pool the rule runs in.
    pub pool: Option<String>,
    /// Re-stat outputs after the command runs.
    pub restat: bool,
    /// Response file path.
    pub rspfile: Option<String>,
    /// Response file content.
    pub rspfile_content: Option<String>,
    /// Dependency style, e.g. `gcc` or `msvc`.
    pub deps: Option<String>,
}

impl BuildRule {
    /// Full command line written to the rule.
    #[must_use]
    pub fn command(&self) -> String {
        self.executable.command(self.args.as_deref())
    }

    fn decl(&self) -> RuleDecl<'_> {
        RuleDecl {
            name: &self.name,
            command: self.command(),
            description: self.description.as_deref(),
            depfile: self.depfile.as_deref(),
            generator: self.generator,
            pool: self.pool.as_deref(),
            restat: self.restat,
            rspfile: self.rspfile.as_deref(),
            rspfile_content: self.rspfile_content.as_deref(),
            deps: self.deps.as_deref(),
        }
    }
}

/// A rule running one side-effecting action; always uses the console pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExecRule {
    /// Unique rule name.
    pub name: String,
    /// Tool run by the rule.
    pub executable: Executable,
    /// Arguments appended to the executable path.
    pub args: Option<String>,
    /// Human readable progress description.
    pub description: Option<String>,
    /// Response file path.
    pub rspfile: Option<String>,
    /// Response file content.
    pub rspfile_content: Option<String>,
}

impl ExecRule {
    /// Full command line written to the rule.
    #[must_use]
    pub fn command(&self) -> String {
        self.executable.command(self.args.as_deref())
    }

    fn decl(&self) -> RuleDecl<'_> {
        RuleDecl {
            name: &self.name,
            command: self.command(),
            description: self.description.as_deref(),
            pool: Some(CONSOLE_POOL),
            rspfile: self.rspfile.as_deref(),
            rspfile_content: self.rspfile_content.as_deref(),
            ..RuleDecl::default()
        }
    }
}

/// A build edge mapping inputs to outputs through a rule.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BuildEdge {
    /// Explicit outputs; must not be empty.
    pub outputs: Vec<String>,
    /// Referenced rule name.
    pub rule: String,
    /// Inputs passed as `$in`.
    pub inputs: Vec<String>,
    /// Extra dependencies not on the command line.
    pub implicit: Vec<String>,
    /// Ordering-only dependencies.
    pub order_only: Vec<String>,
    /// Per-edge variable overrides.
    pub variables: Variables,
    /// Outputs not passed as `$out`.
    pub implicit_outputs: Vec<String>,
}

impl BuildEdge {
    fn decl(&self) -> EdgeDecl<'_> {
        EdgeDecl {
            outputs: &self.outputs,
            rule: &self.rule,
            inputs: &self.inputs,
            implicit: &self.implicit,
            order_only: &self.order_only,
            variables: Some(&self.variables),
            implicit_outputs: &self.implicit_outputs,
        }
    }
}

/// An alias from `name` to its inputs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PhonyEdge {
    /// Alias name.
    pub name: String,
    /// Aliased paths.
    pub inputs: Vec<String>,
}

impl PhonyEdge {
    fn decl(&self) -> EdgeDecl<'_> {
        EdgeDecl {
            outputs: std::slice::from_ref(&self.name),
            rule: "phony",
            inputs: &self.inputs,
            ..EdgeDecl::default()
        }
    }
}

/// Targets built when ninja is run without arguments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DefaultDecl {
    /// Default targets.
    pub targets: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ninja_gen::NinjaWriter;
    use rstest::rstest;

    fn render(statement: &Statement) -> String {
        let mut writer = NinjaWriter::new(Vec::new());
        statement.write(&mut writer).expect("write statement");
        String::from_utf8(writer.into_inner()).expect("utf8 output")
    }

    fn executable(path: &str) -> Executable {
        Executable {
            requested: "cc".into(),
            path: path.into(),
            found: true,
        }
    }

    #[rstest]
    fn exec_rule_is_pinned_to_console() {
        let rule = Statement::ExecRule(ExecRule {
            name: "serve".into(),
            executable: executable("/usr/bin/python3"),
            args: Some("-m http.server".into()),
            description: None,
            rspfile: None,
            rspfile_content: None,
        });
        assert_eq!(
            render(&rule),
            "rule serve\n  command = /usr/bin/python3 -m http.server\n  pool = console\n"
        );
    }

    #[rstest]
    fn build_rule_writes_flags() {
        let rule = Statement::BuildRule(BuildRule {
            name: "cc".into(),
            executable: executable("/usr/bin/cc"),
            args: Some("-MD -MF $out.d -c $in -o $out".into()),
            description: Some("CC $out".into()),
            depfile: Some("$out.d".into()),
            generator: false,
            pool: Some("pool_2".into()),
            restat: true,
            rspfile: None,
            rspfile_content: None,
            deps: Some("gcc".into()),
        });
        let expected = concat!(
            "rule cc\n",
            "  command = /usr/bin/cc -MD -MF $out.d -c $in -o $out\n",
            "  description = CC $out\n",
            "  depfile = $out.d\n",
            "  pool = pool_2\n",
            "  restat = 1\n",
            "  deps = gcc\n",
        );
        assert_eq!(render(&rule), expected);
    }

    #[rstest]
    fn phony_edge_uses_phony_rule() {
        let phony = Statement::Phony(PhonyEdge {
            name: "all".into(),
            inputs: vec!["a.o".into(), "b.o".into()],
        });
        assert_eq!(render(&phony), "build all: phony a.o b.o\n");
    }
}
