//! Git repository operations.
//!
//! Every interaction with the object store goes through a child `git`
//! process; nothing here touches process-wide environment. Identity fields
//! for `commit-tree` are passed as per-child environment on the spawned
//! process only.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Author or committer identity as git hands it to us.
///
/// `date` is kept in git's raw internal format (`<unix> <offset>`) so it
/// round-trips through `GIT_AUTHOR_DATE` / `GIT_COMMITTER_DATE` byte for
/// byte. Reformatting the date would change the synthesized commit hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub date: String,
}

/// The fields of one commit needed to synthesize its split counterpart.
#[derive(Debug, Clone)]
pub struct CommitMeta {
    pub author: Signature,
    pub committer: Signature,
    pub message: String,
}

/// A git repository handle that provides common operations.
pub struct Git {
    root: PathBuf,
}

impl Git {
    /// Find the git repository root starting from the given directory.
    pub fn discover(start_dir: &Path) -> Result<Self, Error> {
        let output = Command::new("git")
            .args(["rev-parse", "--show-toplevel"])
            .current_dir(start_dir)
            .output()
            .map_err(|e| Error::Exec(format!("git rev-parse: {e}")))?;

        if !output.status.success() {
            return Err(Error::NotARepo(start_dir.display().to_string()));
        }

        let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(Self {
            root: PathBuf::from(root),
        })
    }

    /// Get the repository root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a revision expression to a full commit hash.
    pub fn rev_parse_commit(&self, rev: &str) -> Result<String, Error> {
        let spec = format!("{rev}^{{commit}}");
        match self.try_output(&["rev-parse", "--verify", "--quiet", &spec])? {
            Some(out) => Ok(out.trim().to_string()),
            None => Err(Error::RevNotFound(rev.to_string())),
        }
    }

    /// List the commits reachable from `start` that touch `prefix`,
    /// ancestors first, each with its simplified parent list.
    ///
    /// Output is the raw `rev-list --parents` text: one commit per line,
    /// hash followed by the rewritten parent hashes. History simplification
    /// and parent rewriting are git's; we report them verbatim.
    pub fn rev_list_touching(&self, start: &str, prefix: &str) -> Result<String, Error> {
        self.run_output(&[
            "rev-list",
            "--topo-order",
            "--reverse",
            "--parents",
            start,
            "--",
            prefix,
        ])
    }

    /// List all commit hashes reachable from `root`.
    pub fn rev_list(&self, root: &str) -> Result<Vec<String>, Error> {
        let out = self.run_output(&["rev-list", root])?;
        Ok(out.lines().map(|l| l.trim().to_string()).collect())
    }

    /// Fetch the author, committer, and full message of one commit.
    pub fn commit_metadata(&self, id: &str) -> Result<CommitMeta, Error> {
        // Unit separators keep multi-line messages unambiguous.
        let out = self.run_output(&[
            "show",
            "--no-patch",
            "--date=raw",
            "--format=%an%x1f%ae%x1f%ad%x1f%cn%x1f%ce%x1f%cd%x1f%B",
            id,
        ])?;

        let fields: Vec<&str> = out.splitn(7, '\x1f').collect();
        let [an, ae, ad, cn, ce, cd, message] = fields[..] else {
            return Err(Error::Metadata(id.to_string()));
        };

        Ok(CommitMeta {
            author: Signature {
                name: an.to_string(),
                email: ae.to_string(),
                date: ad.to_string(),
            },
            committer: Signature {
                name: cn.to_string(),
                email: ce.to_string(),
                date: cd.to_string(),
            },
            message: message.to_string(),
        })
    }

    /// Resolve the tree of `prefix` as it existed at `commit`.
    ///
    /// Returns `None` when the path does not exist at that commit, or names
    /// something other than a directory.
    pub fn subtree(&self, commit: &str, prefix: &str) -> Result<Option<String>, Error> {
        let spec = format!("{commit}:{prefix}");
        let Some(obj) = self.try_output(&["rev-parse", "--verify", "--quiet", &spec])? else {
            return Ok(None);
        };

        // Peel to a tree; fails if the path names a blob.
        let peel = format!("{}^{{tree}}", obj.trim());
        match self.try_output(&["rev-parse", "--verify", "--quiet", &peel])? {
            Some(tree) => Ok(Some(tree.trim().to_string())),
            None => Ok(None),
        }
    }

    /// Create a commit object from a tree, parents, identity, and message,
    /// returning the new commit hash.
    ///
    /// `git commit-tree` hashes these exact inputs, so the same arguments
    /// always yield the same id.
    pub fn commit_tree(
        &self,
        tree: &str,
        parents: &[&str],
        author: &Signature,
        committer: &Signature,
        message: &str,
    ) -> Result<String, Error> {
        let mut args: Vec<&str> = vec!["commit-tree", tree];
        for parent in parents {
            args.push("-p");
            args.push(parent);
        }

        let mut child = Command::new("git")
            .args(&args)
            .current_dir(&self.root)
            .env("GIT_AUTHOR_NAME", &author.name)
            .env("GIT_AUTHOR_EMAIL", &author.email)
            .env("GIT_AUTHOR_DATE", &author.date)
            .env("GIT_COMMITTER_NAME", &committer.name)
            .env("GIT_COMMITTER_EMAIL", &committer.email)
            .env("GIT_COMMITTER_DATE", &committer.date)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Exec(format!("git commit-tree: {e}")))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Exec("git commit-tree: stdin unavailable".to_string()))?;
        stdin
            .write_all(message.as_bytes())
            .map_err(|e| Error::Exec(format!("git commit-tree: {e}")))?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .map_err(|e| Error::Exec(format!("git commit-tree: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Failed(format!("git commit-tree: {}", stderr.trim())));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    // -------------------------------------------------------------------------
    // Internal helpers
    // -------------------------------------------------------------------------

    /// Run a git command and capture its stdout.
    fn run_output(&self, args: &[&str]) -> Result<String, Error> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .map_err(|e| Error::Exec(format!("git {}: {e}", args.first().unwrap_or(&""))))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(Error::Failed(format!(
                "git {}: {}",
                args.join(" "),
                stderr.trim()
            )))
        }
    }

    /// Run a git command, capturing stdout; a nonzero exit is `None` rather
    /// than an error.
    fn try_output(&self, args: &[&str]) -> Result<Option<String>, Error> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .map_err(|e| Error::Exec(format!("git {}: {e}", args.first().unwrap_or(&""))))?;

        if output.status.success() {
            Ok(Some(String::from_utf8_lossy(&output.stdout).to_string()))
        } else {
            Ok(None)
        }
    }
}

/// Errors from git operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to execute: {0}")]
    Exec(String),

    #[error("not a git repository (searched from '{0}')")]
    NotARepo(String),

    #[error("unknown revision '{0}'")]
    RevNotFound(String),

    #[error("unparseable commit metadata for {0}")]
    Metadata(String),

    #[error("{0}")]
    Failed(String),
}
