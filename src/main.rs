//! PomoLock CLI - a break-enforcing work timer for macOS
//!
//! The timer alternates between two modes:
//! - Work: a countdown ticking in the menu bar
//! - Break: full-screen overlays on every display, sleep inhibited
//!
//! Most subcommands talk to the daemon over a Unix socket; `daemon`
//! runs the daemon itself.

use anyhow::Result;
use clap::{CommandFactory, Parser};

use pomolock::cli::{Cli, Commands, IpcClient, Output};
use pomolock::daemon::{default_socket_path, run_daemon};
use pomolock::types::TimerConfig;

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging
    init_tracing();

    // Parse command line arguments
    let cli = Cli::parse();

    // Execute command
    if let Err(e) = execute(cli).await {
        Output::show_error(&e.to_string());
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    match cli.command {
        Some(Commands::Start) => {
            let client = IpcClient::new();
            let response = client.start().await?;
            Output::show_start_success(&response);
        }
        Some(Commands::Pause) => {
            let client = IpcClient::new();
            let response = client.pause().await?;
            Output::show_pause_success(&response);
        }
        Some(Commands::Stop) => {
            let client = IpcClient::new();
            let response = client.stop().await?;
            Output::show_stop_success(&response);
        }
        Some(Commands::Reset) => {
            let client = IpcClient::new();
            let response = client.reset().await?;
            Output::show_reset_success(&response);
        }
        Some(Commands::Break) => {
            let client = IpcClient::new();
            let response = client.take_break().await?;
            Output::show_break_success(&response);
        }
        Some(Commands::Dismiss(args)) => {
            let client = IpcClient::new();
            let response = client.dismiss(&args).await?;
            Output::show_dismiss_success(&response);
        }
        Some(Commands::Set(args)) => {
            if args.is_empty() {
                anyhow::bail!("変更する設定項目を指定してください (--work, --break, --auto-end-break, --show-indicator)");
            }
            let client = IpcClient::new();
            let response = client.set(&args).await?;
            Output::show_set_success(&response);
        }
        Some(Commands::Status) => {
            let client = IpcClient::new();
            let response = client.status().await?;
            Output::show_status(&response);
        }
        Some(Commands::Daemon) => {
            run_daemon(TimerConfig::default(), &default_socket_path()).await?;
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
        }
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
