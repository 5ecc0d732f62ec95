//! Ninja file writer.
//!
//! [`StatementEmitter`] is the seam between the statement log and the
//! concrete file syntax. [`NinjaWriter`] implements it for any
//! [`io::Write`], escaping paths the way ninja expects. Values of variables
//! and rule fields are written verbatim so `$in`, `$out` and `${var}`
//! references keep working.

use std::io::{self, Write};

use indexmap::IndexMap;
use itertools::Itertools;

macro_rules! write_kv {
    ($w:expr, $key:expr, $opt:expr) => {
        if let Some(val) = $opt {
            writeln!($w, "  {} = {}", $key, val)?;
        }
    };
}

macro_rules! write_flag {
    ($w:expr, $key:expr, $cond:expr) => {
        if $cond {
            writeln!($w, "  {} = 1", $key)?;
        }
    };
}

/// Borrowed view of a rule declaration.
#[derive(Debug, Default)]
pub struct RuleDecl<'a> {
    /// Rule name.
    pub name: &'a str,
    /// Full command line.
    pub command: String,
    /// Progress description.
    pub description: Option<&'a str>,
    /// Dependency file.
    pub depfile: Option<&'a str>,
    /// Marks a generator rule.
    pub generator: bool,
    /// Pool name.
    pub pool: Option<&'a str>,
    /// Re-stat outputs.
    pub restat: bool,
    /// Response file path.
    pub rspfile: Option<&'a str>,
    /// Response file content.
    pub rspfile_content: Option<&'a str>,
    /// Dependency style.
    pub deps: Option<&'a str>,
}

/// Borrowed view of a build edge.
#[derive(Debug, Default)]
pub struct EdgeDecl<'a> {
    /// Explicit outputs.
    pub outputs: &'a [String],
    /// Rule name, `phony` for aliases.
    pub rule: &'a str,
    /// Explicit inputs.
    pub inputs: &'a [String],
    /// Implicit inputs, written after `|`.
    pub implicit: &'a [String],
    /// Order-only inputs, written after `||`.
    pub order_only: &'a [String],
    /// Indented variable overrides.
    pub variables: Option<&'a IndexMap<String, String>>,
    /// Implicit outputs, written after `|` in the output list.
    pub implicit_outputs: &'a [String],
}

/// Sink receiving statements in file order.
pub trait StatementEmitter {
    /// Write a `#` comment line.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying sink.
    fn comment(&mut self, text: &str) -> io::Result<()>;

    /// Write `name = value`, indented by `indent` levels.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying sink.
    fn variable(&mut self, name: &str, value: &str, indent: usize) -> io::Result<()>;

    /// Write a pool declaration.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying sink.
    fn pool(&mut self, name: &str, depth: u32) -> io::Result<()>;

    /// Write a rule declaration.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying sink.
    fn rule(&mut self, rule: &RuleDecl<'_>) -> io::Result<()>;

    /// Write a build edge.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying sink.
    fn build(&mut self, edge: &EdgeDecl<'_>) -> io::Result<()>;

    /// Write a `default` declaration.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying sink.
    fn default(&mut self, targets: &[String]) -> io::Result<()>;

    /// Write an empty line.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying sink.
    fn newline(&mut self) -> io::Result<()>;
}

/// Escape a path for use in build and default lines.
///
/// Spaces and colons are significant in ninja paths; a `$` already followed
/// by a space is doubled first so it is not mistaken for an escape.
#[must_use]
pub fn escape_path(word: &str) -> String {
    word.replace("$ ", "$$ ")
        .replace(' ', "$ ")
        .replace(':', "$:")
}

fn join_escaped(paths: &[String]) -> String {
    paths.iter().map(|p| escape_path(p)).join(" ")
}

/// Writes ninja syntax to an [`io::Write`] sink.
#[derive(Debug)]
pub struct NinjaWriter<W: Write> {
    out: W,
}

impl<W: Write> NinjaWriter<W> {
    /// Wrap `out`.
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    /// Return the wrapped sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Flush the wrapped sink.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying sink.
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

impl<W: Write> StatementEmitter for NinjaWriter<W> {
    fn comment(&mut self, text: &str) -> io::Result<()> {
        for line in text.lines() {
            writeln!(self.out, "# {line}")?;
        }
        Ok(())
    }

    fn variable(&mut self, name: &str, value: &str, indent: usize) -> io::Result<()> {
        writeln!(self.out, "{}{name} = {value}", "  ".repeat(indent))
    }

    fn pool(&mut self, name: &str, depth: u32) -> io::Result<()> {
        writeln!(self.out, "pool {name}")?;
        writeln!(self.out, "  depth = {depth}")
    }

    fn rule(&mut self, rule: &RuleDecl<'_>) -> io::Result<()> {
        writeln!(self.out, "rule {}", rule.name)?;
        writeln!(self.out, "  command = {}", rule.command)?;
        write_kv!(self.out, "description", rule.description);
        write_kv!(self.out, "depfile", rule.depfile);
        write_flag!(self.out, "generator", rule.generator);
        write_kv!(self.out, "pool", rule.pool);
        write_flag!(self.out, "restat", rule.restat);
        write_kv!(self.out, "rspfile", rule.rspfile);
        write_kv!(self.out, "rspfile_content", rule.rspfile_content);
        write_kv!(self.out, "deps", rule.deps);
        Ok(())
    }

    fn build(&mut self, edge: &EdgeDecl<'_>) -> io::Result<()> {
        write!(self.out, "build {}", join_escaped(edge.outputs))?;
        if !edge.implicit_outputs.is_empty() {
            write!(self.out, " | {}", join_escaped(edge.implicit_outputs))?;
        }
        write!(self.out, ": {}", edge.rule)?;
        if !edge.inputs.is_empty() {
            write!(self.out, " {}", join_escaped(edge.inputs))?;
        }
        if !edge.implicit.is_empty() {
            write!(self.out, " | {}", join_escaped(edge.implicit))?;
        }
        if !edge.order_only.is_empty() {
            write!(self.out, " || {}", join_escaped(edge.order_only))?;
        }
        writeln!(self.out)?;
        for (key, value) in edge.variables.into_iter().flatten() {
            self.variable(key, value, 1)?;
        }
        Ok(())
    }

    fn default(&mut self, targets: &[String]) -> io::Result<()> {
        writeln!(self.out, "default {}", join_escaped(targets))
    }

    fn newline(&mut self) -> io::Result<()> {
        writeln!(self.out)
    }
}
