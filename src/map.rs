//! The original-id to split-id mapping table.
//!
//! Entries are append-only for the duration of a run. The table can be
//! pre-seeded by scanning an existing split history for provenance markers,
//! which lets a re-run skip commits synthesized by a previous invocation.
//! Preload is purely an optimization: synthesis is deterministic, so a run
//! without it produces the same ids, just more slowly.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::git::{self, Git};
use crate::ids::{OriginalId, SplitId};

/// The provenance marker prefix, a stable wire format. Synthesized commit
/// messages carry an `original-commit: <id>` line that preload parses back.
pub(crate) const MARKER_PREFIX: &str = "original-commit: ";

#[derive(Debug, Default)]
pub struct MappingTable {
    entries: HashMap<OriginalId, SplitId>,
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, original: &OriginalId) -> Option<&SplitId> {
        self.entries.get(original)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a newly synthesized commit. Inserting an id that is already
    /// mapped means the driver processed a commit twice; the table is
    /// append-only, so that is fatal.
    pub fn insert(&mut self, original: OriginalId, split: SplitId) -> Result<(), Error> {
        if self.entries.contains_key(&original) {
            return Err(Error::Duplicate { original });
        }
        self.entries.insert(original, split);
        Ok(())
    }

    /// Seed the table from an existing split history.
    ///
    /// Walks every commit reachable from `root`, scans its message for a
    /// provenance marker, and records the (original, split) pair. Commits
    /// without a marker, or with a malformed one, are skipped. Returns the
    /// number of entries added.
    pub fn preload(&mut self, git: &Git, root: &str) -> Result<usize, Error> {
        let root = git.rev_parse_commit(root)?;
        let mut added = 0;

        for split in git.rev_list(&root)? {
            let meta = git.commit_metadata(&split)?;
            let Some(original) = meta.message.lines().find_map(marker_original) else {
                debug!("no provenance marker in {split}");
                continue;
            };

            let original = OriginalId::new(original);
            let split = SplitId::new(split);
            if let Some(existing) = self.entries.get(&original) {
                if *existing != split {
                    warn!(
                        "conflicting provenance for {original}: keeping {existing}, ignoring {split}"
                    );
                }
            } else {
                self.entries.insert(original, split);
                added += 1;
            }
        }

        Ok(added)
    }
}

/// Extract the original-space id from a provenance marker line, if the line
/// is one. Trailing whitespace is tolerated; anything else malformed is not
/// a marker.
fn marker_original(line: &str) -> Option<&str> {
    let id = line.strip_prefix(MARKER_PREFIX)?.trim_end();
    if !id.is_empty() && id.bytes().all(|b| b.is_ascii_hexdigit()) {
        Some(id)
    } else {
        None
    }
}

/// Errors from mapping-table operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("commit {original} is already mapped; the table is append-only")]
    Duplicate { original: OriginalId },

    #[error(transparent)]
    Git(#[from] git::Error),
}
