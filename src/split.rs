//! The driver loop: enumerate, translate parents, synthesize.
//!
//! Commits are processed strictly in the enumerator's ancestors-first order,
//! one at a time. By the time a commit is synthesized, every parent it lists
//! has already been mapped, either earlier in this run or by preload; a
//! parent missing from the table means the ordering guarantee was broken and
//! the run aborts.

use tracing::debug;

use crate::git::{self, Git};
use crate::ids::{OriginalId, SplitId};
use crate::map::{self, MappingTable};
use crate::revwalk;
use crate::synth;

/// What to split and from where.
#[derive(Debug, Clone)]
pub struct SplitConfig {
    /// Subdirectory whose history to extract, relative to the repo root.
    pub prefix: String,

    /// Revision to split from.
    pub start: String,

    /// Existing split history to scan for provenance markers before
    /// synthesizing anything.
    pub reference: Option<String>,
}

/// Per-commit progress callback, invoked after each commit is either
/// skipped (already mapped) or synthesized. Keeps the engine testable
/// without a terminal attached.
pub trait Progress {
    fn commit_processed(&mut self, done: usize, total: usize, skipped: bool);
}

/// A progress observer that reports nothing.
pub struct NoProgress;

impl Progress for NoProgress {
    fn commit_processed(&mut self, _done: usize, _total: usize, _skipped: bool) {}
}

/// Rewrite the history of `config.prefix` into a standalone graph.
///
/// Returns the split-space id corresponding to the start revision, or
/// `None` when no ancestor of the start revision ever touched the prefix.
pub fn split(
    git: &Git,
    config: &SplitConfig,
    progress: &mut dyn Progress,
) -> Result<Option<SplitId>, Error> {
    let entries = revwalk::enumerate(git, &config.start, &config.prefix)?;
    let Some(last) = entries.last().cloned() else {
        return Ok(None);
    };

    let mut table = MappingTable::new();
    if let Some(reference) = &config.reference {
        let seeded = table.preload(git, reference)?;
        debug!("preloaded {seeded} mappings from {reference}");
    }

    let total = entries.len();
    for (idx, entry) in entries.iter().enumerate() {
        if table.lookup(&entry.id).is_some() {
            progress.commit_processed(idx + 1, total, true);
            continue;
        }

        let mut parents = Vec::with_capacity(entry.parents.len());
        for parent in &entry.parents {
            let split = table.lookup(parent).ok_or_else(|| Error::UnmappedParent {
                commit: entry.id.clone(),
                parent: parent.clone(),
            })?;
            parents.push(split.clone());
        }

        let split = synth::synthesize(git, &entry.id, &parents, &config.prefix)?;
        debug!("{} -> {split}", entry.id);
        table.insert(entry.id.clone(), split)?;
        progress.commit_processed(idx + 1, total, false);
    }

    let result = table
        .lookup(&last.id)
        .cloned()
        .ok_or(Error::UnmappedResult { commit: last.id })?;
    Ok(Some(result))
}

/// Errors from a split run. Every variant is fatal; there are no retries.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Git(#[from] git::Error),

    #[error(transparent)]
    Map(#[from] map::Error),

    #[error(transparent)]
    Synth(#[from] synth::Error),

    #[error("commit {commit} lists parent {parent}, which was never mapped")]
    UnmappedParent {
        commit: OriginalId,
        parent: OriginalId,
    },

    #[error("final commit {commit} was never mapped")]
    UnmappedResult { commit: OriginalId },
}
