//! Identifier newtypes for the two commit-graph spaces.
//!
//! Both spaces hold git object hashes, but ids from the source graph and ids
//! created by the split must never be conflated: a split-space id fed back
//! into a metadata lookup on the source graph (or vice versa) silently
//! corrupts the rewrite. The wrappers keep the two apart at the type level.

use std::fmt;

/// A commit id in the source graph being split from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OriginalId(String);

/// A commit id in the newly synthesized, subdirectory-only graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SplitId(String);

impl OriginalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl SplitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OriginalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for SplitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
