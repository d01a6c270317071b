// ABOUTME: Entry point for the `anywhere` CLI.
// ABOUTME: Dispatches to ask, agents, use, init and version subcommands.

use anyhow::{Context, Result};
use anywhere_cli::{build_request, format_availability, VERSION};
use anywhere_core::{AgentRegistry, Config, SessionOutcome, StreamEvent, StreamSession};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

/// Exit status after Ctrl+C, as a shell would report SIGINT.
const EXIT_CANCELLED: u8 = 130;

#[derive(Parser)]
#[command(name = "anywhere")]
#[command(about = "Ask an installed AI CLI from anywhere and stream the answer")]
#[command(version)]
struct Cli {
    /// Write logs to ~/.config/prompt-anywhere/anywhere/anywhere.log instead of stderr
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a prompt and print the answer as it streams
    Ask {
        /// Backend to use (defaults to the configured one)
        #[arg(short, long, env = "ANYWHERE_AGENT")]
        agent: Option<String>,

        /// Image or file to pass along with the prompt
        #[arg(long)]
        attach: Option<PathBuf>,

        /// Stream canned text instead of calling the backend
        #[arg(long)]
        mock: bool,

        /// Prompt text
        #[arg(required = true, trailing_var_arg = true)]
        prompt: Vec<String>,
    },

    /// List known backends and where they were found
    Agents,

    /// Set the default backend
    Use {
        /// Backend name (claude, codex, gemini)
        name: String,
    },

    /// Write the default configuration file
    Init,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.log_file {
        anywhere_log::init_file("anywhere");
    } else {
        anywhere_log::init();
    }

    match cli.command {
        Commands::Ask {
            agent,
            attach,
            mock,
            prompt,
        } => run_ask(agent, attach, mock, prompt).await,
        Commands::Agents => run_agents().map(|_| ExitCode::SUCCESS),
        Commands::Use { name } => run_use(&name).map(|_| ExitCode::SUCCESS),
        Commands::Init => run_init().map(|_| ExitCode::SUCCESS),
        Commands::Version => {
            print_version();
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_ask(
    agent: Option<String>,
    attach: Option<PathBuf>,
    mock: bool,
    prompt: Vec<String>,
) -> Result<ExitCode> {
    let config = Config::load()?;
    let agent = agent.unwrap_or_else(|| config.default_agent.clone());
    let request = build_request(&prompt, attach.as_deref())?;

    let session = StreamSession::from_config(&config, AgentRegistry::builtin())
        .with_mock_responses(config.mock_responses || mock);
    let mut handle = session.submit(&agent, request);

    let cancel = handle.cancellation_token();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => cancel.cancel(),
            Err(e) => tracing::warn!(error = %e, "Failed to install Ctrl+C handler"),
        }
    });

    let mut stdout = std::io::stdout();
    while let Some(event) = handle.next().await {
        match event {
            StreamEvent::Token(line) => {
                writeln!(stdout, "{line}").context("Failed to write output")?;
                stdout.flush().context("Failed to write output")?;
            }
            StreamEvent::Final => {}
            StreamEvent::Error(err) => eprintln!("Error: {err}"),
        }
    }

    let code = match handle.wait().await {
        SessionOutcome::Finished => ExitCode::SUCCESS,
        SessionOutcome::Cancelled => {
            eprintln!("Cancelled.");
            ExitCode::from(EXIT_CANCELLED)
        }
        SessionOutcome::Failed(_) | SessionOutcome::Aborted => ExitCode::FAILURE,
    };
    Ok(code)
}

fn run_agents() -> Result<()> {
    let config = Config::load()?;
    let registry = AgentRegistry::builtin();
    print!(
        "{}",
        format_availability(&registry.availability(), &config.default_agent)
    );
    Ok(())
}

fn run_use(name: &str) -> Result<()> {
    let path = Config::config_path();
    let mut config = Config::load()?;
    config.set_default_agent(name, &AgentRegistry::builtin())?;
    config.save_to(&path)?;
    println!("Default backend set to {name} ({})", path.display());
    Ok(())
}

fn run_init() -> Result<()> {
    let path = Config::init()?;
    println!("Config: {}", path.display());
    Ok(())
}

fn print_version() {
    println!("anywhere {VERSION}");
    println!();
    println!("Backends:");
    for name in AgentRegistry::builtin().names() {
        println!("  {name}");
    }
}
