//! Revision enumeration: which commits touched the subdirectory, in
//! ancestors-first order.

use crate::git::{self, Git};
use crate::ids::OriginalId;

/// One enumerated commit with its simplified parent list.
///
/// Parents are restricted to commits that are themselves in the enumerated
/// set; git's history simplification rewrites parent links to the nearest
/// ancestor that touched the prefix, and we take that answer verbatim.
#[derive(Debug, Clone)]
pub struct RevEntry {
    pub id: OriginalId,
    pub parents: Vec<OriginalId>,
}

/// Enumerate the commits reachable from `start` that touch `prefix`,
/// ancestors first.
///
/// A start revision that does not resolve is fatal; a subdirectory no
/// commit ever touched yields an empty vector.
pub fn enumerate(git: &Git, start: &str, prefix: &str) -> Result<Vec<RevEntry>, git::Error> {
    let start = git.rev_parse_commit(start)?;
    let raw = git.rev_list_touching(&start, prefix)?;
    Ok(parse_rev_list(&raw))
}

fn parse_rev_list(raw: &str) -> Vec<RevEntry> {
    raw.lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let id = OriginalId::new(parts.next()?);
            let parents = parts.map(OriginalId::new).collect();
            Some(RevEntry { id, parents })
        })
        .collect()
}
