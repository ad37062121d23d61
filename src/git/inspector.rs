//! The repository query/mutation surface consumed by the push workflow.

use std::fmt;

use crate::error::GitError;

/// Branch names that never get a tracking ticket.
pub const MAIN_BRANCHES: [&str; 2] = ["main", "master"];

/// A local commit that is not yet on the upstream branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpushedCommit {
    pub short_hash: String,
    pub subject: String,
}

impl UnpushedCommit {
    /// Parse one line of `git log --format="%h - %s"` output.
    ///
    /// Lines without the `" - "` separator are kept whole as the subject.
    pub fn parse(line: &str) -> Self {
        match line.split_once(" - ") {
            Some((hash, subject)) => Self {
                short_hash: hash.trim().to_string(),
                subject: subject.to_string(),
            },
            None => Self {
                short_hash: String::new(),
                subject: line.to_string(),
            },
        }
    }
}

impl fmt::Display for UnpushedCommit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.short_hash.is_empty() {
            f.write_str(&self.subject)
        } else {
            write!(f, "{} - {}", self.short_hash, self.subject)
        }
    }
}

/// Snapshot of the current branch, taken before pushing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchContext {
    pub name: String,
    /// `false` is the only signal for "first push to this branch".
    pub has_upstream: bool,
    pub is_main_branch: bool,
}

impl BranchContext {
    pub fn new(name: impl Into<String>, has_upstream: bool) -> Self {
        let name = name.into();
        let is_main_branch = is_main_branch(&name);
        Self {
            name,
            has_upstream,
            is_main_branch,
        }
    }

    /// Read the branch name and upstream presence from the repository.
    pub fn capture(repo: &dyn RepoInspector) -> Result<Self, GitError> {
        let name = repo.current_branch()?;
        let has_upstream = repo.has_upstream()?;
        Ok(Self::new(name, has_upstream))
    }

    /// First push of a branch other than main/master.
    pub fn wants_ticket(&self) -> bool {
        !self.has_upstream && !self.is_main_branch
    }
}

/// Whether the branch name is one of [`MAIN_BRANCHES`].
pub fn is_main_branch(name: &str) -> bool {
    MAIN_BRANCHES.contains(&name)
}

/// What the workflow observed about the working tree during one run.
///
/// Fields are filled only as far as the diff-selection rule needs them;
/// nothing here is persisted between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingTreeState {
    pub has_staged_changes: bool,
    pub has_unstaged_changes: bool,
    pub staged_diff: String,
    pub unpushed_commits: Vec<UnpushedCommit>,
    pub unpushed_diff: String,
    pub changed_files: Vec<String>,
}

/// Read and write access to the local repository.
///
/// Query methods never modify repository state. "No upstream" is a valid
/// answer, not an error.
#[cfg_attr(test, mockall::automock)]
pub trait RepoInspector {
    /// Diff of staged changes.
    fn staged_diff(&self) -> Result<String, GitError>;

    /// Diff of unstaged changes.
    fn unstaged_diff(&self) -> Result<String, GitError>;

    /// Diff of the working tree against HEAD.
    fn all_diff(&self) -> Result<String, GitError>;

    fn has_staged_changes(&self) -> Result<bool, GitError>;

    fn has_unstaged_changes(&self) -> Result<bool, GitError>;

    /// Commits on HEAD that the upstream lacks, newest first. Empty without an upstream.
    fn unpushed_commits(&self) -> Result<Vec<UnpushedCommit>, GitError>;

    /// Diff against the upstream, or against the empty tree when there is none.
    fn unpushed_diff(&self) -> Result<String, GitError>;

    /// Paths changed against HEAD (staged paths on an initial commit).
    fn changed_files(&self) -> Result<Vec<String>, GitError>;

    fn current_branch(&self) -> Result<String, GitError>;

    fn has_upstream(&self) -> Result<bool, GitError>;

    fn stage_all(&self) -> Result<(), GitError>;

    fn commit(&self, message: &str) -> Result<(), GitError>;

    /// Push the current branch to the default remote.
    fn push(&self) -> Result<(), GitError>;

    /// Push the current branch and record the remote branch as its upstream.
    fn push_set_upstream(&self) -> Result<(), GitError>;
}
