//! Concurrency pools.
//!
//! Integer depths map to generated `pool_<depth>` names and are declared once
//! per distinct depth. The built-in `console` pool needs no declaration.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{NinjuError, Result};
use crate::ir::{CONSOLE_POOL, PoolDef, Statement, StatementLog};

/// A caller's pool request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PoolRequest {
    /// No pool constraint.
    #[default]
    None,
    /// Limit concurrent jobs to this depth; must be positive.
    Depth(i64),
    /// A named pool; only `console` is accepted.
    Named(String),
}

impl fmt::Display for PoolRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Depth(depth) => write!(f, "{depth}"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

impl From<i64> for PoolRequest {
    fn from(depth: i64) -> Self {
        Self::Depth(depth)
    }
}

impl From<i32> for PoolRequest {
    fn from(depth: i32) -> Self {
        Self::Depth(i64::from(depth))
    }
}

impl From<u32> for PoolRequest {
    fn from(depth: u32) -> Self {
        Self::Depth(i64::from(depth))
    }
}

impl From<&str> for PoolRequest {
    fn from(name: &str) -> Self {
        Self::Named(name.to_owned())
    }
}

impl<T: Into<Self>> From<Option<T>> for PoolRequest {
    fn from(request: Option<T>) -> Self {
        request.map_or(Self::None, Into::into)
    }
}

/// Depth-keyed cache of declared pools.
#[derive(Debug, Default)]
pub struct PoolRegistry {
    declared: BTreeMap<u32, String>,
}

impl PoolRegistry {
    /// Resolve `request` to a pool name, declaring it in `log` on first use.
    ///
    /// # Errors
    ///
    /// Returns [`NinjuError::InvalidPool`] for non-positive depths and for
    /// names other than `console`.
    pub fn resolve(
        &mut self,
        request: &PoolRequest,
        log: &mut StatementLog,
    ) -> Result<Option<String>> {
        match request {
            PoolRequest::None => Ok(None),
            PoolRequest::Named(name) if name == CONSOLE_POOL => Ok(Some(name.clone())),
            PoolRequest::Depth(raw) => {
                let depth = u32::try_from(*raw)
                    .ok()
                    .filter(|depth| *depth > 0)
                    .ok_or_else(|| invalid(request))?;
                if let Some(name) = self.declared.get(&depth) {
                    return Ok(Some(name.clone()));
                }
                let name = format!("pool_{depth}");
                log.append(Statement::Pool(PoolDef {
                    name: name.clone(),
                    depth,
                }))?;
                self.declared.insert(depth, name.clone());
                Ok(Some(name))
            }
            PoolRequest::Named(_) => Err(invalid(request)),
        }
    }

    /// Number of distinct pools declared.
    #[must_use]
    pub fn len(&self) -> usize {
        self.declared.len()
    }

    /// Return `true` when no pool has been declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declared.is_empty()
    }
}

fn invalid(request: &PoolRequest) -> NinjuError {
    NinjuError::InvalidPool {
        request: request.to_string(),
    }
}
