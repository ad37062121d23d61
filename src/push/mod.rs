//! Push pipeline: commit staged work with a generated message and push it.
//!
//! Decides what to summarize (staged changes or already-committed work),
//! drives confirmation, commits, pushes with an upstream-setting fallback,
//! and opens a Jira ticket on the first push of a feature branch.

pub mod confirm;

use tracing::{debug, warn};

use crate::error::{GitError, PushError};
use crate::git::{BranchContext, RepoInspector, UnpushedCommit, WorkingTreeState};
use crate::jira::{TicketService, parse_ticket_key};
use crate::llm::MessageGenerator;

pub use self::confirm::{Confirmer, Decision, TerminalConfirmer};

const RULE: &str = "--------------------------------------------------";

/// Options for one run, taken from CLI flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushRequest {
    /// Stage the whole working tree before inspecting it.
    pub stage_all: bool,
    /// Skip both the message and the push confirmation.
    pub auto_confirm: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalSource {
    Generated,
    Edited,
}

/// The message that will be committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitProposal {
    pub text: String,
    pub source: ProposalSource,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushOutcome {
    pub pushed: bool,
    pub used_set_upstream: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketRecord {
    pub key: String,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    Rejected,
    InvalidInput(String),
}

/// Everything a completed run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushSummary {
    /// `None` when only existing commits were pushed.
    pub commit: Option<CommitProposal>,
    pub outcome: PushOutcome,
    /// Branch state observed before the push.
    pub branch: BranchContext,
    pub ticket: Option<TicketRecord>,
    /// Ticket failure; the run still succeeded.
    pub ticket_warning: Option<String>,
}

/// How a run ended without an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushReport {
    /// The user declined; nothing was committed or pushed.
    Aborted(AbortReason),
    Completed(PushSummary),
}

/// What the run will push.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Selection {
    /// Staged changes to summarize and commit.
    Staged { diff: String, files: Vec<String> },
    /// Nothing staged; push commits that already exist.
    UnpushedOnly,
}

/// Run the commit-and-push pipeline.
pub async fn run_push(
    request: PushRequest,
    repo: &dyn RepoInspector,
    generator: &dyn MessageGenerator,
    tickets: &dyn TicketService,
    confirmer: &dyn Confirmer,
) -> Result<PushReport, PushError> {
    println!("Analyzing your changes...");

    if request.stage_all {
        println!("Staging all changes...");
        repo.stage_all()?;
    }

    let (state, selection) = inspect(repo)?;
    debug!(
        staged = matches!(selection, Selection::Staged { .. }),
        unpushed = state.unpushed_commits.len(),
        "Inspected working tree"
    );

    if !state.unpushed_commits.is_empty() {
        print_unpushed(&state.unpushed_commits);
    }

    // Staged: the confirmed message. UnpushedOnly: the newest commit subject.
    let (commit, ticket_basis) = match selection {
        Selection::Staged { diff, files } => {
            println!("Found staged changes to commit");
            println!("Generating commit message...");
            let generated = generator.generate(&diff, &files).await?;

            let proposal = match confirm_message(generated, request.auto_confirm, confirmer) {
                Ok(proposal) => proposal,
                Err(reason) => return Ok(aborted(reason)),
            };

            println!("Creating commit...");
            repo.commit(&proposal.text)?;
            println!("  [DONE] Committed: {}", proposal.text);

            let basis = proposal.text.clone();
            (Some(proposal), basis)
        }
        Selection::UnpushedOnly => {
            println!("{}", RULE);
            println!("No new changes to commit. Ready to push existing commits.");
            println!("{}", RULE);

            if !request.auto_confirm && !confirmer.confirm_push(state.unpushed_commits.len()) {
                return Ok(aborted(AbortReason::Rejected));
            }

            let basis = state
                .unpushed_commits
                .first()
                .map(|c| c.subject.clone())
                .unwrap_or_default();
            (None, basis)
        }
    };

    // Must be read before pushing: `push -u` creates the upstream.
    let branch = BranchContext::capture(repo)?;
    debug!(
        branch = %branch.name,
        has_upstream = branch.has_upstream,
        "Captured branch state"
    );

    println!("Pushing to remote...");
    let outcome = push_with_fallback(repo)?;
    println!("  [DONE] Pushed {}", branch.name);

    let (ticket, ticket_warning) = if branch.wants_ticket() && tickets.is_configured() {
        open_ticket(tickets, &ticket_basis).await
    } else {
        (None, None)
    };

    Ok(PushReport::Completed(PushSummary {
        commit,
        outcome,
        branch,
        ticket,
        ticket_warning,
    }))
}

/// Observe the working tree and pick what to push.
fn inspect(repo: &dyn RepoInspector) -> Result<(WorkingTreeState, Selection), PushError> {
    let mut state = WorkingTreeState {
        has_staged_changes: repo.has_staged_changes()?,
        unpushed_commits: repo.unpushed_commits()?,
        ..Default::default()
    };

    if state.has_staged_changes {
        state.staged_diff = repo.staged_diff()?;
        if state.staged_diff.trim().is_empty() {
            return Err(PushError::EmptyDiff);
        }
        state.changed_files = repo.changed_files()?;

        let selection = Selection::Staged {
            diff: state.staged_diff.clone(),
            files: state.changed_files.clone(),
        };
        return Ok((state, selection));
    }

    if state.unpushed_commits.is_empty() {
        state.has_unstaged_changes = repo.has_unstaged_changes()?;
        return Err(if state.has_unstaged_changes {
            PushError::NoStagedChanges
        } else {
            PushError::NoChanges
        });
    }

    state.unpushed_diff = match repo.unpushed_diff() {
        Ok(diff) => diff,
        Err(e @ GitError::Query { .. }) => {
            debug!("Unpushed diff unavailable ({}), falling back to full diff", e);
            repo.all_diff()?
        }
        Err(e) => return Err(e.into()),
    };
    if state.unpushed_diff.trim().is_empty() {
        return Err(PushError::EmptyDiff);
    }

    Ok((state, Selection::UnpushedOnly))
}

/// Show the proposal and resolve it against the user's decision.
fn confirm_message(
    generated: String,
    auto_confirm: bool,
    confirmer: &dyn Confirmer,
) -> Result<CommitProposal, AbortReason> {
    println!();
    println!("{}", RULE);
    println!("Generated commit message:");
    println!();
    println!("   {}", generated);
    println!();
    println!("{}", RULE);
    println!();

    let proposal = CommitProposal {
        text: generated,
        source: ProposalSource::Generated,
    };

    if auto_confirm {
        return Ok(proposal);
    }

    match confirmer.confirm_message(&proposal.text) {
        Decision::Accept => Ok(proposal),
        Decision::Reject => Err(AbortReason::Rejected),
        Decision::Invalid(input) => Err(AbortReason::InvalidInput(input)),
        Decision::Edit(lines) if lines.is_empty() => Ok(proposal),
        Decision::Edit(lines) => Ok(CommitProposal {
            text: lines.join("\n"),
            source: ProposalSource::Edited,
        }),
    }
}

/// Plain push, then exactly one upstream-setting retry.
fn push_with_fallback(repo: &dyn RepoInspector) -> Result<PushOutcome, PushError> {
    let plain = match repo.push() {
        Ok(()) => {
            return Ok(PushOutcome {
                pushed: true,
                used_set_upstream: false,
            });
        }
        Err(e) => e,
    };

    warn!("Plain push failed, retrying with --set-upstream: {}", plain);

    match repo.push_set_upstream() {
        Ok(()) => Ok(PushOutcome {
            pushed: true,
            used_set_upstream: true,
        }),
        Err(upstream) => Err(PushError::PushFailed { plain, upstream }),
    }
}

/// Create the ticket. Failures come back as a warning, never an error.
async fn open_ticket(
    tickets: &dyn TicketService,
    message: &str,
) -> (Option<TicketRecord>, Option<String>) {
    println!();
    println!("Creating Jira ticket...");

    match tickets.create_with_title(message).await {
        Ok(title) => {
            let key = parse_ticket_key(&title).to_string();
            let url = tickets.issue_url(&key);
            println!("  [DONE] Jira ticket created: {}", title);
            println!("  {}", url);
            (Some(TicketRecord { key, title, url }), None)
        }
        Err(e) => {
            warn!("Failed to create Jira ticket: {}", e);
            eprintln!("Warning: Failed to create Jira ticket: {}", e);
            (None, Some(e.to_string()))
        }
    }
}

fn print_unpushed(commits: &[UnpushedCommit]) {
    println!("Found {} existing unpushed commit(s):", commits.len());
    for commit in commits {
        println!("  - {}", commit);
    }
    println!();
}

fn aborted(reason: AbortReason) -> PushReport {
    match &reason {
        AbortReason::Rejected => println!("Aborted"),
        AbortReason::InvalidInput(input) => println!("Invalid input '{}', aborted", input),
    }
    PushReport::Aborted(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GenerationError, TicketError};
    use crate::git::inspector::MockRepoInspector;
    use crate::jira::MockTicketService;
    use crate::llm::MockMessageGenerator;
    use crate::push::confirm::MockConfirmer;
    use mockall::Sequence;

    const MESSAGE: &str = "feat(api): add login";

    fn auto() -> PushRequest {
        PushRequest {
            stage_all: false,
            auto_confirm: true,
        }
    }

    fn interactive() -> PushRequest {
        PushRequest::default()
    }

    fn mutation(command: &str) -> GitError {
        GitError::Mutation {
            command: command.into(),
            cause: "rejected".into(),
        }
    }

    fn commits(n: usize) -> Vec<UnpushedCommit> {
        (0..n)
            .map(|i| UnpushedCommit {
                short_hash: format!("abc{}", i),
                subject: format!("fix: change {}", i),
            })
            .collect()
    }

    /// Staged changes with no prior unpushed commits.
    fn staged_repo() -> MockRepoInspector {
        let mut repo = MockRepoInspector::new();
        repo.expect_has_staged_changes().returning(|| Ok(true));
        repo.expect_unpushed_commits().returning(|| Ok(Vec::new()));
        repo.expect_staged_diff()
            .returning(|| Ok("+fn login() {}".to_string()));
        repo.expect_changed_files()
            .returning(|| Ok(vec!["src/api.rs".to_string()]));
        repo
    }

    fn branch(repo: &mut MockRepoInspector, name: &'static str, has_upstream: bool) {
        repo.expect_current_branch()
            .returning(move || Ok(name.to_string()));
        repo.expect_has_upstream().returning(move || Ok(has_upstream));
    }

    fn generator_ok() -> MockMessageGenerator {
        let mut generator = MockMessageGenerator::new();
        generator
            .expect_generate()
            .returning(|_, _| Ok(MESSAGE.to_string()));
        generator
    }

    fn no_tickets() -> MockTicketService {
        let mut tickets = MockTicketService::new();
        tickets.expect_is_configured().never();
        tickets.expect_create_with_title().never();
        tickets
    }

    fn configured_tickets() -> MockTicketService {
        let mut tickets = MockTicketService::new();
        tickets.expect_is_configured().returning(|| true);
        tickets
            .expect_create_with_title()
            .times(1)
            .returning(|message| Ok(format!("PROJ-7 - {}", message)));
        tickets
            .expect_issue_url()
            .returning(|key| format!("https://acme.atlassian.net/browse/{}", key));
        tickets
    }

    fn completed(report: PushReport) -> PushSummary {
        match report {
            PushReport::Completed(summary) => summary,
            other => panic!("expected completed run, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_first_push_of_feature_branch_creates_ticket() {
        let mut repo = staged_repo();
        let mut seq = Sequence::new();
        repo.expect_commit()
            .withf(|message| message == MESSAGE)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        repo.expect_current_branch()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok("feature/x".to_string()));
        repo.expect_has_upstream()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(false));
        repo.expect_push()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Err(mutation("git push origin feature/x")));
        repo.expect_push_set_upstream()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));

        let mut generator = MockMessageGenerator::new();
        generator
            .expect_generate()
            .withf(|diff, files| diff.contains("login") && files.len() == 1)
            .times(1)
            .returning(|_, _| Ok(MESSAGE.to_string()));

        let confirmer = MockConfirmer::new();
        let tickets = configured_tickets();

        let summary = completed(
            run_push(auto(), &repo, &generator, &tickets, &confirmer)
                .await
                .unwrap(),
        );

        assert_eq!(
            summary.commit,
            Some(CommitProposal {
                text: MESSAGE.to_string(),
                source: ProposalSource::Generated,
            })
        );
        assert_eq!(
            summary.outcome,
            PushOutcome {
                pushed: true,
                used_set_upstream: true,
            }
        );
        assert!(!summary.branch.has_upstream);
        let ticket = summary.ticket.unwrap();
        assert_eq!(ticket.key, "PROJ-7");
        assert_eq!(ticket.title, "PROJ-7 - feat(api): add login");
        assert_eq!(ticket.url, "https://acme.atlassian.net/browse/PROJ-7");
        assert!(summary.ticket_warning.is_none());
    }

    #[tokio::test]
    async fn test_reject_leaves_tree_untouched() {
        let mut repo = staged_repo();
        repo.expect_commit().never();
        repo.expect_push().never();
        repo.expect_push_set_upstream().never();

        let mut confirmer = MockConfirmer::new();
        confirmer
            .expect_confirm_message()
            .times(1)
            .returning(|_| Decision::Reject);

        let report = run_push(
            interactive(),
            &repo,
            &generator_ok(),
            &no_tickets(),
            &confirmer,
        )
        .await
        .unwrap();

        assert_eq!(report, PushReport::Aborted(AbortReason::Rejected));
    }

    #[tokio::test]
    async fn test_invalid_choice_aborts_without_error() {
        let mut repo = staged_repo();
        repo.expect_commit().never();
        repo.expect_push().never();

        let mut confirmer = MockConfirmer::new();
        confirmer
            .expect_confirm_message()
            .returning(|_| Decision::Invalid("maybe".into()));

        let report = run_push(
            interactive(),
            &repo,
            &generator_ok(),
            &no_tickets(),
            &confirmer,
        )
        .await
        .unwrap();

        assert_eq!(
            report,
            PushReport::Aborted(AbortReason::InvalidInput("maybe".into()))
        );
    }

    #[tokio::test]
    async fn test_edit_replaces_message_with_joined_lines() {
        let mut repo = staged_repo();
        branch(&mut repo, "feature/x", true);
        repo.expect_commit()
            .withf(|message| message == "fix: tidy login\n\nKeeps sessions alive")
            .times(1)
            .returning(|_| Ok(()));
        repo.expect_push().times(1).returning(|| Ok(()));
        repo.expect_push_set_upstream().never();

        let mut confirmer = MockConfirmer::new();
        confirmer.expect_confirm_message().returning(|_| {
            Decision::Edit(vec![
                "fix: tidy login".into(),
                String::new(),
                "Keeps sessions alive".into(),
            ])
        });

        let summary = completed(
            run_push(
                interactive(),
                &repo,
                &generator_ok(),
                &no_tickets(),
                &confirmer,
            )
            .await
            .unwrap(),
        );

        let commit = summary.commit.unwrap();
        assert_eq!(commit.source, ProposalSource::Edited);
        assert_eq!(commit.text, "fix: tidy login\n\nKeeps sessions alive");
        assert!(!summary.outcome.used_set_upstream);
    }

    #[tokio::test]
    async fn test_empty_edit_keeps_generated_message() {
        let mut repo = staged_repo();
        branch(&mut repo, "feature/x", true);
        repo.expect_commit()
            .withf(|message| message == MESSAGE)
            .times(1)
            .returning(|_| Ok(()));
        repo.expect_push().returning(|| Ok(()));

        let mut confirmer = MockConfirmer::new();
        confirmer
            .expect_confirm_message()
            .returning(|_| Decision::Edit(Vec::new()));

        let summary = completed(
            run_push(
                interactive(),
                &repo,
                &generator_ok(),
                &no_tickets(),
                &confirmer,
            )
            .await
            .unwrap(),
        );

        assert_eq!(summary.commit.unwrap().source, ProposalSource::Generated);
    }

    #[tokio::test]
    async fn test_generation_failure_commits_nothing() {
        let mut repo = staged_repo();
        repo.expect_commit().never();
        repo.expect_push().never();

        let mut generator = MockMessageGenerator::new();
        generator.expect_generate().returning(|_, _| {
            Err(GenerationError::Http {
                provider: "OpenAI",
                status: 401,
                message: "bad key".into(),
            })
        });

        let result = run_push(
            auto(),
            &repo,
            &generator,
            &no_tickets(),
            &MockConfirmer::new(),
        )
        .await;

        assert!(matches!(result, Err(PushError::Generation(_))));
    }

    #[tokio::test]
    async fn test_stage_all_runs_before_inspection() {
        let mut repo = MockRepoInspector::new();
        let mut seq = Sequence::new();
        repo.expect_stage_all()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));
        repo.expect_has_staged_changes()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(false));
        repo.expect_unpushed_commits().returning(|| Ok(Vec::new()));
        repo.expect_has_unstaged_changes().returning(|| Ok(false));

        let request = PushRequest {
            stage_all: true,
            auto_confirm: true,
        };
        let result = run_push(
            request,
            &repo,
            &MockMessageGenerator::new(),
            &no_tickets(),
            &MockConfirmer::new(),
        )
        .await;

        assert!(matches!(result, Err(PushError::NoChanges)));
    }

    #[tokio::test]
    async fn test_unpushed_only_pushes_without_commit() {
        let mut repo = MockRepoInspector::new();
        repo.expect_has_staged_changes().returning(|| Ok(false));
        repo.expect_unpushed_commits().returning(|| Ok(commits(2)));
        repo.expect_unpushed_diff()
            .returning(|| Ok("+two commits".to_string()));
        repo.expect_commit().never();
        branch(&mut repo, "feature/y", true);
        repo.expect_push().times(1).returning(|| Ok(()));

        let mut generator = MockMessageGenerator::new();
        generator.expect_generate().never();

        let summary = completed(
            run_push(
                auto(),
                &repo,
                &generator,
                &no_tickets(),
                &MockConfirmer::new(),
            )
            .await
            .unwrap(),
        );

        assert!(summary.commit.is_none());
        assert!(summary.outcome.pushed);
        assert!(summary.ticket.is_none());
    }

    #[tokio::test]
    async fn test_unpushed_only_ticket_uses_newest_subject() {
        let mut repo = MockRepoInspector::new();
        repo.expect_has_staged_changes().returning(|| Ok(false));
        repo.expect_unpushed_commits().returning(|| Ok(commits(2)));
        repo.expect_unpushed_diff().returning(|| {
            Err(GitError::Query {
                command: "git diff".into(),
                cause: "unknown revision".into(),
            })
        });
        repo.expect_all_diff().returning(|| Ok("+x".to_string()));
        branch(&mut repo, "feature/y", false);
        repo.expect_push().returning(|| Ok(()));

        let mut tickets = MockTicketService::new();
        tickets.expect_is_configured().returning(|| true);
        tickets
            .expect_create_with_title()
            .withf(|message| message == "fix: change 0")
            .times(1)
            .returning(|message| Ok(format!("PROJ-9 - {}", message)));
        tickets
            .expect_issue_url()
            .returning(|key| format!("https://jira/browse/{}", key));

        let mut confirmer = MockConfirmer::new();
        confirmer
            .expect_confirm_push()
            .withf(|count| *count == 2)
            .times(1)
            .returning(|_| true);

        let summary = completed(
            run_push(
                interactive(),
                &repo,
                &MockMessageGenerator::new(),
                &tickets,
                &confirmer,
            )
            .await
            .unwrap(),
        );

        assert_eq!(summary.ticket.unwrap().key, "PROJ-9");
    }

    #[tokio::test]
    async fn test_declined_push_aborts() {
        let mut repo = MockRepoInspector::new();
        repo.expect_has_staged_changes().returning(|| Ok(false));
        repo.expect_unpushed_commits().returning(|| Ok(commits(1)));
        repo.expect_unpushed_diff().returning(|| Ok("+x".to_string()));
        repo.expect_push().never();

        let mut confirmer = MockConfirmer::new();
        confirmer.expect_confirm_push().returning(|_| false);

        let report = run_push(
            interactive(),
            &repo,
            &MockMessageGenerator::new(),
            &no_tickets(),
            &confirmer,
        )
        .await
        .unwrap();

        assert_eq!(report, PushReport::Aborted(AbortReason::Rejected));
    }

    #[tokio::test]
    async fn test_nothing_to_do_is_no_changes() {
        let mut repo = MockRepoInspector::new();
        repo.expect_has_staged_changes().returning(|| Ok(false));
        repo.expect_unpushed_commits().returning(|| Ok(Vec::new()));
        repo.expect_has_unstaged_changes().returning(|| Ok(false));
        repo.expect_stage_all().never();
        repo.expect_commit().never();
        repo.expect_push().never();

        let result = run_push(
            auto(),
            &repo,
            &MockMessageGenerator::new(),
            &no_tickets(),
            &MockConfirmer::new(),
        )
        .await;

        assert!(matches!(result, Err(PushError::NoChanges)));
    }

    #[tokio::test]
    async fn test_unstaged_only_is_no_staged_changes() {
        let mut repo = MockRepoInspector::new();
        repo.expect_has_staged_changes().returning(|| Ok(false));
        repo.expect_unpushed_commits().returning(|| Ok(Vec::new()));
        repo.expect_has_unstaged_changes().returning(|| Ok(true));

        let result = run_push(
            auto(),
            &repo,
            &MockMessageGenerator::new(),
            &no_tickets(),
            &MockConfirmer::new(),
        )
        .await;

        assert!(matches!(result, Err(PushError::NoStagedChanges)));
    }

    #[tokio::test]
    async fn test_empty_staged_diff_is_empty_diff() {
        let mut repo = MockRepoInspector::new();
        repo.expect_has_staged_changes().returning(|| Ok(true));
        repo.expect_unpushed_commits().returning(|| Ok(Vec::new()));
        repo.expect_staged_diff().returning(|| Ok(String::new()));

        let mut generator = MockMessageGenerator::new();
        generator.expect_generate().never();

        let result = run_push(
            auto(),
            &repo,
            &generator,
            &no_tickets(),
            &MockConfirmer::new(),
        )
        .await;

        assert!(matches!(result, Err(PushError::EmptyDiff)));
    }

    #[tokio::test]
    async fn test_existing_upstream_never_creates_ticket() {
        let mut repo = staged_repo();
        branch(&mut repo, "feature/x", true);
        repo.expect_commit().returning(|_| Ok(()));
        repo.expect_push().returning(|| Ok(()));

        let summary = completed(
            run_push(
                auto(),
                &repo,
                &generator_ok(),
                &no_tickets(),
                &MockConfirmer::new(),
            )
            .await
            .unwrap(),
        );

        assert!(summary.ticket.is_none());
    }

    #[tokio::test]
    async fn test_main_branch_never_creates_ticket() {
        for name in ["main", "master"] {
            let mut repo = staged_repo();
            branch(&mut repo, name, false);
            repo.expect_commit().returning(|_| Ok(()));
            repo.expect_push().returning(|| Ok(()));

            let summary = completed(
                run_push(
                    auto(),
                    &repo,
                    &generator_ok(),
                    &no_tickets(),
                    &MockConfirmer::new(),
                )
                .await
                .unwrap(),
            );

            assert!(summary.branch.is_main_branch);
            assert!(summary.ticket.is_none());
        }
    }

    #[tokio::test]
    async fn test_unconfigured_tracker_skips_ticket() {
        let mut repo = staged_repo();
        branch(&mut repo, "feature/x", false);
        repo.expect_commit().returning(|_| Ok(()));
        repo.expect_push().returning(|| Ok(()));

        let mut tickets = MockTicketService::new();
        tickets.expect_is_configured().returning(|| false);
        tickets.expect_create_with_title().never();

        let summary = completed(
            run_push(auto(), &repo, &generator_ok(), &tickets, &MockConfirmer::new())
                .await
                .unwrap(),
        );

        assert!(summary.ticket.is_none());
        assert!(summary.ticket_warning.is_none());
    }

    #[tokio::test]
    async fn test_ticket_failure_is_a_warning() {
        let mut repo = staged_repo();
        branch(&mut repo, "feature/x", false);
        repo.expect_commit().returning(|_| Ok(()));
        repo.expect_push().returning(|| Ok(()));

        let mut tickets = MockTicketService::new();
        tickets.expect_is_configured().returning(|| true);
        tickets.expect_create_with_title().returning(|_| {
            Err(TicketError::Api {
                status: 400,
                body: "project not found".into(),
            })
        });

        let summary = completed(
            run_push(auto(), &repo, &generator_ok(), &tickets, &MockConfirmer::new())
                .await
                .unwrap(),
        );

        assert!(summary.outcome.pushed);
        assert!(summary.ticket.is_none());
        assert!(summary.ticket_warning.unwrap().contains("project not found"));
    }

    #[tokio::test]
    async fn test_ticket_title_without_separator_is_key() {
        let mut repo = staged_repo();
        branch(&mut repo, "feature/x", false);
        repo.expect_commit().returning(|_| Ok(()));
        repo.expect_push().returning(|| Ok(()));

        let mut tickets = MockTicketService::new();
        tickets.expect_is_configured().returning(|| true);
        tickets
            .expect_create_with_title()
            .returning(|_| Ok("PROJ-3".to_string()));
        tickets
            .expect_issue_url()
            .returning(|key| format!("https://jira/browse/{}", key));

        let summary = completed(
            run_push(auto(), &repo, &generator_ok(), &tickets, &MockConfirmer::new())
                .await
                .unwrap(),
        );

        let ticket = summary.ticket.unwrap();
        assert_eq!(ticket.key, "PROJ-3");
        assert_eq!(ticket.url, "https://jira/browse/PROJ-3");
    }

    #[tokio::test]
    async fn test_both_push_attempts_failing_skips_ticket() {
        let mut repo = staged_repo();
        branch(&mut repo, "feature/x", false);
        repo.expect_commit().returning(|_| Ok(()));
        repo.expect_push()
            .times(1)
            .returning(|| Err(mutation("git push origin feature/x")));
        repo.expect_push_set_upstream()
            .times(1)
            .returning(|| Err(mutation("git push -u origin feature/x")));

        let result = run_push(
            auto(),
            &repo,
            &generator_ok(),
            &no_tickets(),
            &MockConfirmer::new(),
        )
        .await;

        match result {
            Err(PushError::PushFailed { plain, upstream }) => {
                assert!(plain.to_string().contains("git push origin"));
                assert!(upstream.to_string().contains("git push -u origin"));
            }
            other => panic!("expected PushFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unpushed_query_failure_is_fatal() {
        let mut repo = MockRepoInspector::new();
        repo.expect_has_staged_changes().returning(|| Ok(true));
        repo.expect_unpushed_commits().returning(|| {
            Err(GitError::Query {
                command: "git log".into(),
                cause: "bad object".into(),
            })
        });
        repo.expect_commit().never();

        let result = run_push(
            auto(),
            &repo,
            &MockMessageGenerator::new(),
            &no_tickets(),
            &MockConfirmer::new(),
        )
        .await;

        assert!(matches!(result, Err(PushError::Git(GitError::Query { .. }))));
    }
}
