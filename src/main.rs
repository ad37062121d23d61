//! gh-assistant - CLI entry point.

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use gh_assistant::config::{self, ConfigUpdate, Settings, mask_secret};
use gh_assistant::git::GitCli;
use gh_assistant::jira::JiraClient;
use gh_assistant::llm::http::build_client;
use gh_assistant::push::{PushReport, PushRequest, TerminalConfirmer, run_push};

/// AI-assisted commit and push, with Jira tickets for new branches.
#[derive(Parser, Debug)]
#[command(name = "gh-assistant")]
#[command(about = "AI-assisted git commit and push, with Jira tickets for new branches")]
#[command(version)]
struct Cli {
    /// Show debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate an AI commit message, commit, and push
    ///
    /// Examples:
    ///   gh-assistant push       Commit staged changes with an AI message and push
    ///   gh-assistant push -a    Stage all changes first
    ///   gh-assistant push -y    Skip confirmation prompts
    Push(PushArgs),

    /// Configure the AI provider and Jira integration
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
struct PushArgs {
    /// Stage all changes before committing
    #[arg(short = 'a', long)]
    all: bool,

    /// Auto-confirm the generated commit message and the push
    #[arg(short = 'y', long)]
    yes: bool,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// API key for the AI provider
    #[arg(long)]
    api_key: Option<String>,

    /// AI provider (openai or anthropic)
    #[arg(long)]
    provider: Option<String>,

    /// Model override (e.g. gpt-4o, claude-3-5-sonnet-20241022)
    #[arg(long)]
    model: Option<String>,

    /// Jira base URL (e.g. https://yourcompany.atlassian.net)
    #[arg(long)]
    jira_url: Option<String>,

    /// Jira account email
    #[arg(long)]
    jira_email: Option<String>,

    /// Jira API token
    #[arg(long)]
    jira_token: Option<String>,

    /// Jira project key (e.g. PROJ)
    #[arg(long)]
    jira_project: Option<String>,

    /// Show the current configuration
    #[arg(long)]
    show: bool,
}

impl ConfigArgs {
    fn update(&self) -> ConfigUpdate {
        ConfigUpdate {
            api_key: self.api_key.clone(),
            provider: self.provider.clone(),
            model: self.model.clone(),
            jira_url: self.jira_url.clone(),
            jira_email: self.jira_email.clone(),
            jira_token: self.jira_token.clone(),
            jira_project: self.jira_project.clone(),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Push(args) => push(args).await,
        Command::Config(args) => configure(args),
    }
}

/// `RUST_LOG` wins; otherwise `warn`, or `debug` with `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn push(args: PushArgs) -> Result<()> {
    let settings = Settings::load().context("Failed to load configuration")?;
    let api_key = settings.resolve_api_key()?;
    let provider = settings.resolve_provider()?;
    let timeout = config::request_timeout();

    let repo = GitCli::discover(Path::new("."))?;
    debug!(workdir = %repo.workdir().display(), %provider, "Starting push");

    let generator = provider.generator(&api_key, settings.model_override(), timeout)?;
    let tickets = JiraClient::new(build_client(timeout)?, settings.jira());

    let request = PushRequest {
        stage_all: args.all,
        auto_confirm: args.yes,
    };

    let report = run_push(
        request,
        &repo,
        generator.as_ref(),
        &tickets,
        &TerminalConfirmer,
    )
    .await?;

    if let PushReport::Completed(summary) = report {
        println!();
        println!("Successfully pushed!");
        debug!(
            used_set_upstream = summary.outcome.used_set_upstream,
            ticket = summary.ticket.as_ref().map(|t| t.key.as_str()),
            "Push finished"
        );
    }

    Ok(())
}

fn configure(args: ConfigArgs) -> Result<()> {
    let path = config::config_path()?;

    if args.show {
        return show_config(&path);
    }

    let update = args.update();
    if update.is_empty() {
        let mut cmd = Cli::command();
        if let Some(sub) = cmd.find_subcommand_mut("config") {
            sub.print_help()?;
        }
        return Ok(());
    }

    let written = config::apply_update(&path, &update)
        .with_context(|| format!("Failed to update {}", path.display()))?;
    for key in written {
        println!("  [DONE] Saved {}", key);
    }
    println!("Configuration saved to {}", path.display());

    Ok(())
}

fn show_config(path: &Path) -> Result<()> {
    let settings = Settings::load_from(path)?;

    println!("Configuration ({})", path.display());
    println!();

    let provider = settings.resolve_provider()?;
    println!("  Provider:     {}", provider);
    println!(
        "  Model:        {}",
        settings
            .model_override()
            .unwrap_or(provider.default_model())
    );
    println!(
        "  API Key:      {}",
        settings
            .resolve_api_key()
            .map(|key| mask_secret(&key))
            .unwrap_or_else(|_| "(not set)".to_string())
    );

    let jira = settings.jira();
    println!();
    println!("  Jira URL:     {}", or_unset(&jira.base_url));
    println!("  Jira Email:   {}", or_unset(&jira.email));
    println!(
        "  Jira Token:   {}",
        if jira.api_token.is_empty() {
            "(not set)".to_string()
        } else {
            mask_secret(&jira.api_token)
        }
    );
    println!("  Jira Project: {}", or_unset(&jira.project));
    println!(
        "  Jira:         {}",
        if jira.is_complete() {
            "configured"
        } else {
            "not configured"
        }
    );

    Ok(())
}

fn or_unset(value: &str) -> &str {
    if value.is_empty() { "(not set)" } else { value }
}
