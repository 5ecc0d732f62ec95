//! Ninju core library.
//!
//! Configuration programs declare rules, build edges and aliases through a
//! [`Session`]; the session records them as an ordered statement log and
//! writes a Ninja build file from it. References returned by each step can be
//! piped into the next, so intermediate paths never need to be tracked by
//! hand.

pub mod diagnostics;
pub mod error;
pub mod ir;
pub mod names;
pub mod ninja_gen;
pub mod pool;
pub mod refs;
pub mod rules;
pub mod session;
pub mod which;

pub use diagnostics::{Diagnostics, Warning};
pub use error::{ErrorKind, NinjuError, Result};
pub use pool::PoolRequest;
pub use refs::{DirRef, FileRef, Outputs, RefArg, TargetRef};
pub use rules::{
    BuildArgs, BuildCommand, BuildRuleOptions, ExecArgs, ExecCommand, ExecRuleOptions,
};
pub use session::{Session, SessionConfig};
pub use which::{ExecutableResolver, PathLookup};
