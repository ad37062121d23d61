//! Interactive confirmation of the proposed commit message and of the push.

use std::io::{self, BufRead};

use dialoguer::Input;
use tracing::debug;

/// What the user decided about a proposed commit message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject,
    /// Replacement lines; empty keeps the original proposal.
    Edit(Vec<String>),
    /// Unrecognized answer, kept verbatim for the notice.
    Invalid(String),
}

/// Source of confirmation decisions.
#[cfg_attr(test, mockall::automock)]
pub trait Confirmer {
    /// Accept, reject, or edit `proposal`.
    fn confirm_message(&self, proposal: &str) -> Decision;

    /// Whether to push `count` existing commits.
    fn confirm_push(&self, count: usize) -> bool;
}

/// Map an answer to the message prompt onto a decision.
///
/// Empty input accepts. Matching is case-insensitive.
pub fn parse_choice(input: &str) -> Decision {
    match input.trim().to_lowercase().as_str() {
        "" | "y" | "yes" => Decision::Accept,
        "n" | "no" => Decision::Reject,
        "e" | "edit" => Decision::Edit(Vec::new()),
        _ => Decision::Invalid(input.trim().to_string()),
    }
}

/// Only an explicit no declines the push.
pub fn parse_push_answer(input: &str) -> bool {
    !matches!(input.trim().to_lowercase().as_str(), "n" | "no")
}

/// Take lines up to the first empty line or end of input.
pub fn collect_edit_lines<I>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    lines
        .into_iter()
        .map(|line| line.trim_end_matches(['\r', '\n']).to_string())
        .take_while(|line| !line.is_empty())
        .collect()
}

/// Prompts on the terminal.
///
/// A terminal that cannot be read counts as a rejection, so nothing is
/// committed or pushed without an answer.
#[derive(Debug, Default)]
pub struct TerminalConfirmer;

impl TerminalConfirmer {
    fn ask(prompt: &str) -> Option<String> {
        match Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
        {
            Ok(answer) => Some(answer),
            Err(e) => {
                debug!("Could not read confirmation: {}", e);
                None
            }
        }
    }
}

impl Confirmer for TerminalConfirmer {
    fn confirm_message(&self, _proposal: &str) -> Decision {
        let Some(answer) = Self::ask("Use this message? [Y/n/e(dit)]") else {
            return Decision::Reject;
        };

        match parse_choice(&answer) {
            Decision::Edit(_) => {
                println!("Enter new commit message (end with an empty line):");
                let stdin = io::stdin();
                let lines = stdin.lock().lines().map_while(Result::ok);
                Decision::Edit(collect_edit_lines(lines))
            }
            other => other,
        }
    }

    fn confirm_push(&self, count: usize) -> bool {
        let prompt = format!(
            "Push {} commit{}? [Y/n]",
            count,
            if count == 1 { "" } else { "s" }
        );
        Self::ask(&prompt).is_some_and(|answer| parse_push_answer(&answer))
    }
}
