//! Commit synthesis: one original commit becomes one split commit.
//!
//! The synthesized commit reuses the original's author, committer, and
//! message, points at the subdirectory's tree instead of the full tree, and
//! lists the already-translated parents. A provenance line ties it back to
//! its original so a later run can rediscover the mapping.
//!
//! `commit-tree` hashes its inputs byte for byte, so everything assembled
//! here (identity fields, raw dates, message layout) must be reproduced
//! exactly for the same original to yield the same split id on every run.

use tracing::warn;

use crate::git::{self, Git, Signature};
use crate::ids::{OriginalId, SplitId};

/// Synthesize the split-space counterpart of `original`.
///
/// `parents` are the translated parent ids, in the original's parent order.
/// The caller records the returned id in the mapping table.
pub fn synthesize(
    git: &Git,
    original: &OriginalId,
    parents: &[SplitId],
    prefix: &str,
) -> Result<SplitId, Error> {
    let meta = git
        .commit_metadata(original.as_str())
        .map_err(|source| Error::Lookup {
            id: original.clone(),
            source,
        })?;

    let (author, committer) = repair_identities(original, meta.author, meta.committer);
    let message = message_with_provenance(&meta.message, original);

    // The enumerator only hands us commits that touch the prefix, so a
    // missing tree here means the two disagree about history.
    let tree = git
        .subtree(original.as_str(), prefix)
        .map_err(|source| Error::Lookup {
            id: original.clone(),
            source,
        })?
        .ok_or_else(|| Error::MissingTree {
            id: original.clone(),
            prefix: prefix.to_string(),
        })?;

    let parent_strs: Vec<&str> = parents.iter().map(|p| p.as_str()).collect();
    let new_id = git
        .commit_tree(&tree, &parent_strs, &author, &committer, &message)
        .map_err(|source| Error::Create {
            id: original.clone(),
            source,
        })?;

    Ok(SplitId::new(new_id))
}

/// Fill in missing author/committer names.
///
/// Very old repositories contain commits with empty identity fields that
/// `commit-tree` rejects. If both names are empty, both become `"unknown"`;
/// if only one is, the other's name is copied across. Emails and dates pass
/// through untouched.
fn repair_identities(
    original: &OriginalId,
    mut author: Signature,
    mut committer: Signature,
) -> (Signature, Signature) {
    match (author.name.is_empty(), committer.name.is_empty()) {
        (true, true) => {
            warn!("commit {original} has no author or committer name; using \"unknown\"");
            author.name = "unknown".to_string();
            committer.name = "unknown".to_string();
        }
        (true, false) => {
            warn!("commit {original} has no author name; copying committer name");
            author.name = committer.name.clone();
        }
        (false, true) => {
            warn!("commit {original} has no committer name; copying author name");
            committer.name = author.name.clone();
        }
        (false, false) => {}
    }
    (author, committer)
}

/// Append the provenance marker to a message body.
///
/// Exactly one newline separates the body from the marker line, regardless
/// of how many trailing newlines the body carried.
fn message_with_provenance(body: &str, original: &OriginalId) -> String {
    format!(
        "{}\n{}{original}\n",
        body.trim_end_matches('\n'),
        crate::map::MARKER_PREFIX
    )
}

/// Errors from commit synthesis.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read commit {id}")]
    Lookup {
        id: OriginalId,
        #[source]
        source: git::Error,
    },

    #[error("commit {id} has no tree for '{prefix}'")]
    MissingTree { id: OriginalId, prefix: String },

    #[error("failed to create split commit for {id}")]
    Create {
        id: OriginalId,
        #[source]
        source: git::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(name: &str) -> Signature {
        Signature {
            name: name.to_string(),
            email: format!("{name}@example.com"),
            date: "1234567890 +0000".to_string(),
        }
    }

    fn oid() -> OriginalId {
        OriginalId::new("abc123")
    }

    #[test]
    fn both_names_empty_become_unknown() {
        let (author, committer) = repair_identities(&oid(), sig(""), sig(""));
        assert_eq!(author.name, "unknown");
        assert_eq!(committer.name, "unknown");
    }

    #[test]
    fn empty_author_copies_committer() {
        let (author, committer) = repair_identities(&oid(), sig(""), sig("Carol"));
        assert_eq!(author.name, "Carol");
        assert_eq!(committer.name, "Carol");
        // Emails are untouched even when the name was empty.
        assert_eq!(author.email, "@example.com");
    }

    #[test]
    fn empty_committer_copies_author() {
        let (author, committer) = repair_identities(&oid(), sig("Alice"), sig(""));
        assert_eq!(author.name, "Alice");
        assert_eq!(committer.name, "Alice");
    }

    #[test]
    fn complete_identities_pass_through() {
        let (author, committer) = repair_identities(&oid(), sig("Alice"), sig("Carol"));
        assert_eq!(author, sig("Alice"));
        assert_eq!(committer, sig("Carol"));
    }

    #[test]
    fn provenance_follows_body_with_one_newline() {
        let msg = message_with_provenance("subject\n\ndetails\n", &oid());
        assert_eq!(msg, "subject\n\ndetails\noriginal-commit: abc123\n");
    }

    #[test]
    fn provenance_collapses_extra_trailing_newlines() {
        let msg = message_with_provenance("subject\n\n\n", &oid());
        assert_eq!(msg, "subject\noriginal-commit: abc123\n");
    }
}
