//! Chainable references over paths and targets.
//!
//! A [`FileRef`] is an ordered list of path tokens; it owns no filesystem
//! state. A [`TargetRef`] names one logical target such as a phony alias or
//! the output of an exec command. Both resolve command names against the
//! session's capability tables, which is what lets configuration code pipe
//! the outputs of one step into the next:
//!
//! ```no_run
//! use ninju::{BuildArgs, BuildRuleOptions, Session, SessionConfig, files};
//!
//! # fn main() -> ninju::Result<()> {
//! let mut session = Session::new(SessionConfig::from_current_exe()?)?;
//! session.build_rule("cc", "cc", BuildRuleOptions::default())?;
//! session.build_rule("ld", "cc", BuildRuleOptions::default())?;
//! let objects = files!["main.c"].then(&mut session, "cc", BuildArgs::default())?;
//! objects.then(&mut session, "ld", BuildArgs::to("app"))?;
//! # Ok(())
//! # }
//! ```

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use itertools::Itertools;
use serde::Serialize;

use crate::error::Result;
use crate::names::NameGenerator;
use crate::rules::{BuildArgs, ExecArgs};
use crate::session::Session;

/// One argument accepted when flattening into a [`FileRef`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefArg {
    /// Dropped during flattening.
    Skip,
    /// A single path token.
    Token(String),
    /// Several tokens spliced in order.
    Tokens(Vec<String>),
    /// Another reference, spliced in.
    Files(FileRef),
    /// A target's name, spliced in as one token.
    Target(TargetRef),
}

impl RefArg {
    fn splice_into(self, tokens: &mut Vec<String>) {
        match self {
            Self::Skip => {}
            Self::Token(token) => tokens.push(token),
            Self::Tokens(more) => tokens.extend(more),
            Self::Files(files) => tokens.extend(files.tokens),
            Self::Target(target) => tokens.push(target.name),
        }
    }
}

impl From<&str> for RefArg {
    fn from(token: &str) -> Self {
        Self::Token(token.to_owned())
    }
}

impl From<String> for RefArg {
    fn from(token: String) -> Self {
        Self::Token(token)
    }
}

impl From<&Utf8Path> for RefArg {
    fn from(path: &Utf8Path) -> Self {
        Self::Token(path.as_str().to_owned())
    }
}

impl From<Utf8PathBuf> for RefArg {
    fn from(path: Utf8PathBuf) -> Self {
        Self::Token(path.into_string())
    }
}

impl From<Vec<String>> for RefArg {
    fn from(tokens: Vec<String>) -> Self {
        Self::Tokens(tokens)
    }
}

impl From<Vec<&str>> for RefArg {
    fn from(tokens: Vec<&str>) -> Self {
        Self::Tokens(tokens.into_iter().map(str::to_owned).collect())
    }
}

impl<const N: usize> From<[&str; N]> for RefArg {
    fn from(tokens: [&str; N]) -> Self {
        Self::Tokens(tokens.into_iter().map(str::to_owned).collect())
    }
}

impl From<FileRef> for RefArg {
    fn from(files: FileRef) -> Self {
        Self::Files(files)
    }
}

impl From<&FileRef> for RefArg {
    fn from(files: &FileRef) -> Self {
        Self::Files(files.clone())
    }
}

impl From<TargetRef> for RefArg {
    fn from(target: TargetRef) -> Self {
        Self::Target(target)
    }
}

impl From<&TargetRef> for RefArg {
    fn from(target: &TargetRef) -> Self {
        Self::Target(target.clone())
    }
}

impl<T: Into<Self>> From<Option<T>> for RefArg {
    fn from(arg: Option<T>) -> Self {
        arg.map_or(Self::Skip, Into::into)
    }
}

/// Build a [`FileRef`] from a heterogeneous argument list.
///
/// Each argument is converted with [`RefArg::from`], so strings, slices,
/// `Option`s and other references can be mixed freely.
///
/// ```
/// use ninju::files;
/// use ninju::refs::TargetRef;
///
/// let none: Option<&str> = None;
/// let refs = files![none, ["a", "b"], files!["c"], TargetRef::new("d")];
/// assert_eq!(refs.tokens(), ["a", "b", "c", "d"]);
/// ```
#[macro_export]
macro_rules! files {
    () => {
        $crate::refs::FileRef::default()
    };
    ($($arg:expr),+ $(,)?) => {
        $crate::refs::FileRef::from_args([$($crate::refs::RefArg::from($arg)),+])
    };
}

/// An ordered collection of path tokens.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct FileRef {
    tokens: Vec<String>,
}

impl FileRef {
    /// Flatten `args` one level, dropping [`RefArg::Skip`] and keeping
    /// duplicates.
    #[must_use]
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = RefArg>,
    {
        let mut tokens = Vec::new();
        for arg in args {
            arg.splice_into(&mut tokens);
        }
        Self { tokens }
    }

    /// Flatten a single argument.
    #[must_use]
    pub fn of(arg: impl Into<RefArg>) -> Self {
        Self::from_args([arg.into()])
    }

    /// Wrap already flattened tokens.
    #[must_use]
    pub const fn from_tokens(tokens: Vec<String>) -> Self {
        Self { tokens }
    }

    /// Tokens in order.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Consume the reference, returning its tokens.
    #[must_use]
    pub fn into_tokens(self) -> Vec<String> {
        self.tokens
    }

    /// Iterate over the tokens.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.tokens.iter()
    }

    /// Number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Return `true` when the reference holds no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Invoke the build command registered as `command` with this reference
    /// as its inputs.
    ///
    /// # Errors
    ///
    /// Returns [`crate::NinjuError::CommandNotFound`] when no build command
    /// has that name, or any error raised while appending the edge.
    pub fn then(&self, session: &mut Session, command: &str, args: BuildArgs) -> Result<Self> {
        session.build_command(command)?.call(session, self, args)
    }
}

impl fmt::Display for FileRef {
    /// Tokens joined by single spaces.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens.iter().join(" "))
    }
}

impl IntoIterator for FileRef {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}

impl<'a> IntoIterator for &'a FileRef {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

/// A single logical target name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TargetRef {
    name: String,
}

impl TargetRef {
    /// Reference the target `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The target name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare this target as a phony alias for the flattened `inputs`.
    ///
    /// # Errors
    ///
    /// Propagates failures from the statement log.
    pub fn phony(&self, session: &mut Session, inputs: impl Into<RefArg>) -> Result<()> {
        session.phony(&self.name, FileRef::of(inputs))
    }

    /// Invoke the exec command registered as `command` with this target.
    ///
    /// # Errors
    ///
    /// Returns [`crate::NinjuError::CommandNotFound`] when no exec command
    /// has that name, or any error raised while appending the edge.
    pub fn exec(&self, session: &mut Session, command: &str, args: ExecArgs) -> Result<Self> {
        session.exec_command(command)?.call(session, self, args)
    }
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Requested outputs of a build command.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Outputs {
    /// One generated intermediate name.
    #[default]
    Generated,
    /// This many generated intermediate names.
    Count(usize),
    /// Explicit paths, used verbatim.
    Paths(Vec<String>),
}

impl Outputs {
    /// Resolve the request to concrete output paths.
    pub fn normalize(self, names: &mut NameGenerator, ext: &str) -> Vec<String> {
        match self {
            Self::Generated => vec![names.next_name(ext)],
            Self::Count(count) => names.take(count, ext),
            Self::Paths(paths) => paths,
        }
    }
}

impl From<usize> for Outputs {
    fn from(count: usize) -> Self {
        Self::Count(count)
    }
}

impl From<FileRef> for Outputs {
    fn from(files: FileRef) -> Self {
        Self::Paths(files.tokens)
    }
}

impl From<&FileRef> for Outputs {
    fn from(files: &FileRef) -> Self {
        Self::Paths(files.tokens.clone())
    }
}

impl From<Vec<String>> for Outputs {
    fn from(paths: Vec<String>) -> Self {
        Self::Paths(paths)
    }
}

impl<const N: usize> From<[&str; N]> for Outputs {
    fn from(paths: [&str; N]) -> Self {
        Self::Paths(paths.into_iter().map(str::to_owned).collect())
    }
}

impl From<&str> for Outputs {
    fn from(path: &str) -> Self {
        Self::Paths(vec![path.to_owned()])
    }
}

impl<T: Into<Self>> From<Option<T>> for Outputs {
    fn from(outputs: Option<T>) -> Self {
        outputs.map_or(Self::Generated, Into::into)
    }
}

/// A directory anchor producing paths beneath it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirRef {
    base: String,
}

impl DirRef {
    pub(crate) const fn new(base: String) -> Self {
        Self { base }
    }

    /// The anchor itself, e.g. `${root}/src` or `${src}`.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// A one-token reference to `parts` joined under the anchor.
    #[must_use]
    pub fn file(&self, parts: &[&str]) -> FileRef {
        FileRef::from_tokens(vec![join_path(&self.base, parts)])
    }
}

/// Join `parts` onto `base` with the platform separator.
pub(crate) fn join_path(base: &str, parts: &[&str]) -> String {
    parts
        .iter()
        .fold(Utf8PathBuf::from(base), |path, part| path.join(part))
        .into_string()
}
