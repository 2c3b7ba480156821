//! Subsplit: extract a subdirectory's commit history into a standalone graph.
//!
//! Given a subdirectory of a git repository, subsplit synthesizes a new,
//! disjoint commit history containing only that subdirectory's contents,
//! preserving topology, authorship, and chronological order. Synthesized ids
//! are deterministic: the same inputs produce the same commits on every run.
//!
//! # Architecture
//!
//! - **Revwalk**: enumerate the commits touching the subdirectory,
//!   ancestors first, with simplified parent lists
//! - **Map**: the append-only original-id to split-id table, optionally
//!   preloaded from provenance markers in an existing split history
//! - **Synth**: turn one original commit into its split counterpart
//! - **Split**: the driver loop threading parents through the table

pub mod git;
pub mod ids;
pub mod map;
pub mod revwalk;
pub mod split;
pub mod synth;

pub use git::{Git, Signature};
pub use ids::{OriginalId, SplitId};
pub use split::{split, Error, NoProgress, Progress, SplitConfig};
