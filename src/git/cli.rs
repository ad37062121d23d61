//! [`RepoInspector`] backed by the system `git` binary.
//!
//! Every operation shells out with `std::process::Command`, inheriting the
//! user's git config, SSH agent, and credential store.

use std::path::{Path, PathBuf};
use std::process::Command;

use git2::Repository;
use tracing::debug;

use crate::error::GitError;
use crate::git::inspector::{RepoInspector, UnpushedCommit};

/// Hash of git's empty tree, used to diff a branch that has no upstream.
pub const EMPTY_TREE: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

/// Preferred remote name when several are configured.
const DEFAULT_REMOTE: &str = "origin";

/// Git operations for one working tree.
#[derive(Debug, Clone)]
pub struct GitCli {
    workdir: PathBuf,
}

impl GitCli {
    /// Use `workdir` as-is; it must be inside a working tree.
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    /// Locate the working tree containing `start`.
    ///
    /// Checks that `git` is installed, then uses git2 discovery so that
    /// running from a subdirectory works.
    pub fn discover(start: &Path) -> Result<Self, GitError> {
        if which::which("git").is_err() {
            return Err(GitError::NotInstalled);
        }

        let repo = Repository::discover(start)
            .map_err(|_| GitError::NotARepository(start.to_path_buf()))?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| GitError::NotARepository(start.to_path_buf()))?;

        Ok(Self::new(workdir))
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Run a read-only git command and return trimmed stdout.
    fn query(&self, args: &[&str]) -> Result<String, GitError> {
        self.run(args)
            .map_err(|(command, cause)| GitError::Query { command, cause })
    }

    /// Run a state-changing git command.
    fn mutate(&self, args: &[&str]) -> Result<(), GitError> {
        self.run(args)
            .map(|_| ())
            .map_err(|(command, cause)| GitError::Mutation { command, cause })
    }

    /// Run git and split failures into `(command line, stderr)`.
    ///
    /// Spawn failures are reported with the io error text as the cause.
    fn run(&self, args: &[&str]) -> Result<String, (String, String)> {
        let command = format!("git {}", args.join(" "));
        debug!(command = %command, "Running git");

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|e| (command.clone(), format!("failed to start git: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err((command, stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Upstream of the current branch, e.g. `origin/feature/x`.
    fn upstream(&self) -> Result<Option<String>, GitError> {
        let branch = self.current_branch()?;
        let spec = format!("{}@{{upstream}}", branch);
        match self.query(&["rev-parse", "--abbrev-ref", &spec]) {
            Ok(upstream) if !upstream.is_empty() => Ok(Some(upstream)),
            Ok(_) => Ok(None),
            Err(GitError::Query { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// The remote to push to: `origin` when present, otherwise the first listed.
    pub fn default_remote(&self) -> Result<String, GitError> {
        let output = self.query(&["remote"])?;
        pick_remote(&output).ok_or(GitError::NoRemote)
    }
}

/// Choose a remote from `git remote` output.
fn pick_remote(output: &str) -> Option<String> {
    let remotes: Vec<&str> = output
        .lines()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .collect();

    remotes
        .iter()
        .find(|r| **r == DEFAULT_REMOTE)
        .or_else(|| remotes.first())
        .map(|r| r.to_string())
}

fn split_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(String::from)
        .collect()
}

impl RepoInspector for GitCli {
    fn staged_diff(&self) -> Result<String, GitError> {
        self.query(&["diff", "--cached"])
    }

    fn unstaged_diff(&self) -> Result<String, GitError> {
        self.query(&["diff"])
    }

    fn all_diff(&self) -> Result<String, GitError> {
        self.query(&["diff", "HEAD"])
    }

    fn has_staged_changes(&self) -> Result<bool, GitError> {
        Ok(!self.query(&["diff", "--cached", "--name-only"])?.is_empty())
    }

    fn has_unstaged_changes(&self) -> Result<bool, GitError> {
        Ok(!self.query(&["diff", "--name-only"])?.is_empty())
    }

    fn unpushed_commits(&self) -> Result<Vec<UnpushedCommit>, GitError> {
        let Some(upstream) = self.upstream()? else {
            return Ok(Vec::new());
        };

        let range = format!("{}..HEAD", upstream);
        let output = self.query(&["log", &range, "--format=%h - %s"])?;

        Ok(output
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(UnpushedCommit::parse)
            .collect())
    }

    fn unpushed_diff(&self) -> Result<String, GitError> {
        let base = self.upstream()?.unwrap_or_else(|| EMPTY_TREE.to_string());
        let range = format!("{}..HEAD", base);
        self.query(&["diff", &range])
    }

    fn changed_files(&self) -> Result<Vec<String>, GitError> {
        let output = match self.query(&["diff", "--name-only", "HEAD"]) {
            Ok(output) => output,
            // No HEAD yet: initial commit.
            Err(GitError::Query { .. }) => self.query(&["diff", "--cached", "--name-only"])?,
            Err(e) => return Err(e),
        };

        Ok(split_lines(&output))
    }

    fn current_branch(&self) -> Result<String, GitError> {
        match self.query(&["rev-parse", "--abbrev-ref", "HEAD"]) {
            Ok(branch) => Ok(branch),
            // rev-parse fails on an unborn branch; symbolic-ref still knows its name.
            Err(err) => self
                .query(&["symbolic-ref", "--short", "HEAD"])
                .map_err(|_| err),
        }
    }

    fn has_upstream(&self) -> Result<bool, GitError> {
        Ok(self.upstream()?.is_some())
    }

    fn stage_all(&self) -> Result<(), GitError> {
        self.mutate(&["add", "-A"])
    }

    fn commit(&self, message: &str) -> Result<(), GitError> {
        self.run(&["commit", "-m", message])
            .map(|_| ())
            .map_err(|(_, cause)| GitError::Commit { cause })
    }

    fn push(&self) -> Result<(), GitError> {
        let remote = self.default_remote()?;
        let branch = self.current_branch()?;
        self.mutate(&["push", &remote, &branch])
    }

    fn push_set_upstream(&self) -> Result<(), GitError> {
        let remote = self.default_remote()?;
        let branch = self.current_branch()?;
        self.mutate(&["push", "-u", &remote, &branch])
    }
}
