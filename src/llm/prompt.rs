//! Prompt construction for AI-generated commit messages.

/// Maximum diff size sent to the model, in bytes.
pub const MAX_DIFF_LENGTH: usize = 12_000;

/// Appended to a diff that was cut at [`MAX_DIFF_LENGTH`].
pub const TRUNCATION_MARKER: &str = "\n... [diff truncated]";

/// Cut `diff` to [`MAX_DIFF_LENGTH`] bytes and append [`TRUNCATION_MARKER`].
///
/// The cut backs up to the nearest char boundary, so the same input always
/// yields the same output.
pub fn truncate_diff(diff: &str) -> String {
    if diff.len() <= MAX_DIFF_LENGTH {
        return diff.to_string();
    }

    let mut end = MAX_DIFF_LENGTH;
    while end > 0 && !diff.is_char_boundary(end) {
        end -= 1;
    }

    let mut truncated = String::with_capacity(end + TRUNCATION_MARKER.len());
    truncated.push_str(&diff[..end]);
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}

/// Build the prompt asking for one conventional commit message.
pub fn build_commit_prompt(diff: &str, changed_files: &[String]) -> String {
    let files_section = if changed_files.is_empty() {
        String::new()
    } else {
        format!("\nChanged files:\n- {}\n", changed_files.join("\n- "))
    };

    let diff = truncate_diff(diff);

    format!(
        r#"You are an expert at writing clear, concise git commit messages following conventional commits format.

Analyze the following git diff and generate a meaningful commit message.
{files_section}
Git Diff:
{diff}

Rules for the commit message:
1. Use conventional commits format: type(scope): description
2. Types: feat, fix, docs, style, refactor, perf, test, build, ci, chore
3. Keep the first line under 72 characters
4. Be specific about what changed and why
5. If there are multiple unrelated changes, focus on the main one
6. Do NOT include any explanation, just the commit message
7. Do NOT wrap in quotes or code blocks

Respond with ONLY the commit message, nothing else."#
    )
}

/// Strip wrapping the model added despite instructions.
///
/// Removes a surrounding code fence (with optional language tag) and one
/// layer of matching quotes or backticks, then trims.
pub fn clean_message(raw: &str) -> String {
    let mut text = raw.trim();

    if let Some(inner) = text.strip_prefix("```").and_then(|t| t.strip_suffix("```")) {
        // Drop the language tag line, if any.
        text = match inner.split_once('\n') {
            Some((first, rest)) if !first.trim().contains(' ') => rest,
            _ => inner,
        };
        text = text.trim();
    }

    for quote in ['"', '\'', '`'] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            text = text[1..text.len() - 1].trim();
            break;
        }
    }

    text.to_string()
}
