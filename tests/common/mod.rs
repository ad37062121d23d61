//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

use git2::{Oid, Repository, Signature};

/// A throwaway working tree, optionally with bare remotes.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
    remotes: Vec<tempfile::TempDir>,
}

impl TestRepo {
    /// Create an empty repository whose unborn branch is `branch`.
    pub fn new(branch: &str) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");

        {
            let mut config = repo.config().expect("Failed to open repo config");
            config
                .set_str("user.name", "Test User")
                .expect("Failed to set user.name");
            config
                .set_str("user.email", "test@example.com")
                .expect("Failed to set user.email");
            config
                .set_bool("commit.gpgsign", false)
                .expect("Failed to disable signing");
        }

        repo.set_head(&format!("refs/heads/{}", branch))
            .expect("Failed to set HEAD");

        Self {
            dir,
            repo,
            remotes: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `name` without staging it.
    pub fn write(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Add `name` to the index.
    pub fn stage(&self, name: &str) {
        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(name)).expect("Failed to add file");
        index.write().expect("Failed to write index");
    }

    /// Write, stage, and commit `name`. Returns the commit OID.
    pub fn commit_file(&self, name: &str, content: &str, message: &str) -> Oid {
        self.write(name, content);
        self.stage(name);

        let sig = Signature::now("Test User", "test@example.com")
            .expect("Failed to create signature");
        let mut index = self.repo.index().expect("Failed to get index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Create a bare repository and register it as remote `name`.
    pub fn add_bare_remote(&mut self, name: &str) -> PathBuf {
        let remote_dir = tempfile::tempdir().expect("Failed to create remote dir");
        Repository::init_bare(remote_dir.path()).expect("Failed to init bare repo");

        let url = remote_dir.path().to_string_lossy().to_string();
        self.repo
            .remote(name, &url)
            .expect("Failed to add remote");

        let path = remote_dir.path().to_path_buf();
        self.remotes.push(remote_dir);
        path
    }

    /// Run the git CLI in the work tree, panicking on failure.
    pub fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.dir.path())
            .output()
            .expect("Failed to run git");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Message of the commit at HEAD, without the trailing newline.
    pub fn head_message(&self) -> String {
        let commit = self
            .repo
            .head()
            .expect("No HEAD")
            .peel_to_commit()
            .expect("HEAD is not a commit");
        commit.message().unwrap_or_default().trim_end().to_string()
    }

    /// Number of commits reachable from HEAD; zero on an unborn branch.
    pub fn commit_count(&self) -> usize {
        let Ok(head) = self.repo.head() else {
            return 0;
        };
        let mut walk = self.repo.revwalk().expect("Failed to create revwalk");
        walk.push(head.target().expect("HEAD has no target"))
            .expect("Failed to push HEAD");
        walk.count()
    }
}

/// Whether `branch` exists in the bare repository at `remote`.
pub fn remote_has_branch(remote: &Path, branch: &str) -> bool {
    Repository::open_bare(remote)
        .expect("Failed to open bare remote")
        .find_branch(branch, git2::BranchType::Local)
        .is_ok()
}
