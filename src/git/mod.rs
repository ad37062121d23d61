//! Repository inspection and mutation through the system `git` binary.

pub mod cli;
pub mod inspector;

pub use cli::GitCli;
pub use inspector::{
    BranchContext, MAIN_BRANCHES, RepoInspector, UnpushedCommit, WorkingTreeState, is_main_branch,
};
