//! Main entry point for CLIHelper.
//!
//! Parses the command line, runs the one-shot pipeline and maps failures to
//! the documented exit codes.

use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::style::Stylize;
use tracing::{error, info};

use clihelper::app::{self, App};
use clihelper::config::{CredentialStore, Settings};
use clihelper::context::{self, RawInput};
use clihelper::error::exit_code;
use clihelper::ui::{self, Presenter, PresenterOptions, presenter, setup};
use clihelper::{CliError, PromptMode, utils};

#[derive(Parser, Debug)]
#[command(name = "clihelper", version, about = "Instant command-line help")]
#[command(
    after_help = "Pipe a failing command into it:\n  command_that_fails 2>&1 | clihelper 'what I was trying to do'"
)]
struct Cli {
    /// Question or context for the piped error; words are joined with spaces
    #[arg(trailing_var_arg = true)]
    hint: Vec<String>,

    /// Model to ask
    #[arg(long)]
    model: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long)]
    api_base: Option<String>,

    /// Leave shell history out of the prompt
    #[arg(long)]
    no_history: bool,

    /// Do not read piped stdin
    #[arg(long)]
    no_stdin: bool,

    /// Print the request body that would be sent and exit
    #[arg(long)]
    dry_run: bool,

    /// Ask for the API key again and store it
    #[arg(long)]
    setup: bool,

    /// Print the redacted prompt to stderr
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Held until exit so buffered log lines reach the file
    let _log_guard = utils::logger::init_logging();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    }
}

fn report(e: &anyhow::Error) -> ExitCode {
    match e.downcast_ref::<CliError>() {
        Some(cli_error) => {
            error!("{cli_error}");
            eprintln!("clihelper: {}", cli_error.one_line());
            if matches!(cli_error, CliError::NoInput) {
                eprintln!("\n{}", ui::usage());
            }
            ExitCode::from(cli_error.exit_code())
        }
        None => {
            error!("{e:#}");
            eprintln!("clihelper: {e:#}");
            ExitCode::from(exit_code::OTHER)
        }
    }
}

fn apply_overrides(settings: &mut Settings, cli: &Cli) {
    if let Some(model) = cli.model.as_deref().filter(|m| !m.trim().is_empty()) {
        settings.model = model.trim().to_string();
    }
    if let Some(base) = cli.api_base.as_deref().filter(|b| !b.trim().is_empty()) {
        settings.api_base = base.trim().to_string();
    }
}

async fn run(cli: Cli) -> Result<()> {
    let (mut settings, config_dir) = Settings::resolve()?;
    apply_overrides(&mut settings, &cli);
    info!(model = %settings.model, api_base = %settings.api_base, "starting");

    let store = CredentialStore::new(&config_dir);

    if cli.setup {
        setup::run_interactive(&store)?;
        if cli.hint.is_empty() && (cli.no_stdin || io::stdin().is_terminal()) {
            return Ok(());
        }
    }

    let mut app = App::new(settings)?;
    if cli.no_history {
        app = app.without_history();
    }

    let piped = if cli.no_stdin {
        String::new()
    } else {
        context::read_piped_stdin().context("reading piped input")?
    };
    let snapshot = app.snapshot(RawInput::new(piped, &cli.hint));
    let prompt = app.prepare(&snapshot)?;

    if cli.debug {
        eprintln!("{}", "=== DEBUG: Prompt ===".yellow().bold());
        eprintln!("{}", prompt);
        eprintln!("{}", "=====================".yellow().bold());
    }

    if cli.dry_run {
        let body = serde_json::to_string_pretty(&app.request(&prompt)?)
            .context("serializing the request body")?;
        println!("{body}");
        return Ok(());
    }

    let (credential, source) = app::resolve_credential(&store)?;
    info!(?source, "credential loaded");

    let status = match prompt.mode() {
        PromptMode::DirectQuery => "Analyzing your query with recent command context...",
        PromptMode::ExplainError | PromptMode::ExplainWithHint => {
            "Analyzing the error with recent command context..."
        }
    };
    presenter::status(&mut io::stderr(), status).context("writing the status line")?;

    let response = app.ask(&prompt, &credential).await?;
    info!(model = %response.model, chars = response.text.len(), "answer received");

    let stdout = io::stdout();
    let mut presenter = Presenter::new(stdout.lock(), PresenterOptions::for_stdout());
    presenter.present(&response).context("writing the answer")?;
    presenter.into_inner().flush().context("writing the answer")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_words_collected() {
        let cli = Cli::parse_from(["clihelper", "--no-history", "debug", "connection"]);
        assert_eq!(cli.hint, vec!["debug", "connection"]);
        assert!(cli.no_history);
    }

    #[test]
    fn test_overrides_ignore_blank_values() {
        let cli = Cli::parse_from(["clihelper", "--model", " ", "--api-base", "http://localhost:1/v1"]);
        let mut settings = Settings::default();
        apply_overrides(&mut settings, &cli);
        assert_eq!(settings.model, Settings::default().model);
        assert_eq!(settings.api_base, "http://localhost:1/v1");
    }
}
