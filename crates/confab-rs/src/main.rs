//! Interactive terminal chat client over the confab-rs pipeline.
//!
//! Reads API credentials from `--api-key` flags or the `CONFAB_API_KEYS`
//! environment variable (comma-separated, in fallback order).
//!
//! # Examples
//!
//! ```sh
//! # Default chat mode
//! confab
//!
//! # Start in reasoning mode with explicit credentials
//! confab --mode reasoning --api-key key-one --api-key key-two
//!
//! # Point at a different endpoint, verbose transport logging
//! confab --api-base https://example.test/v1/chat/completions -v
//! ```
//!
//! Inside the session, `/help` lists the slash commands; end input (Ctrl-D)
//! exits.

use clap::Parser;
use confab_rs::prelude::*;
use std::io::Write;
use std::process;
use tokio::io::AsyncBufReadExt;

/// Interactive terminal chat client.
///
/// Credentials come from --api-key flags or CONFAB_API_KEYS.
#[derive(Parser)]
#[command(name = "confab")]
struct Cli {
    // ── Conversation ───────────────────────────────────────────
    /// Persona mode to start in (chat | reasoning | fast | math | korean |
    /// general | coding | arabic)
    #[arg(long, default_value = "chat")]
    mode: String,

    // ── Credentials and endpoints ──────────────────────────────
    /// API credential, tried in order on failure (repeatable)
    #[arg(long = "api-key")]
    api_keys: Vec<String>,

    /// Chat completions endpoint URL
    #[arg(long)]
    api_base: Option<String>,

    /// Image generation endpoint URL
    #[arg(long)]
    images_base: Option<String>,

    // ── Output ─────────────────────────────────────────────────
    /// Directory for /export files
    #[arg(long, default_value = ".")]
    export_dir: String,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let mode = cli.mode.parse::<Mode>()?;

    let mut config = ClientConfig::from_env();
    if !cli.api_keys.is_empty() {
        config.api_keys = cli.api_keys.clone();
    }
    if let Some(base) = cli.api_base {
        config.api_base = base;
    }
    if let Some(base) = cli.images_base {
        config.images_base = base;
    }

    let transport = ApiClient::new(&config)?;
    let images = ImageClient::new(&config)?;
    let sink = TerminalSink;

    let mut orchestrator = ChatOrchestrator::new(&transport, &images, &sink)
        .with_mode(mode)
        .with_export_dir(&cli.export_dir);

    println!("confab — {mode} mode. Type /help for commands; Ctrl-D exits.\n");

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    loop {
        prompt()?;
        match lines.next_line().await {
            Ok(Some(line)) => orchestrator.handle_input(&line).await,
            Ok(None) => break,
            Err(e) => return Err(format!("failed to read input: {e}")),
        }
    }

    println!("\nbye");
    Ok(())
}

fn prompt() -> Result<(), String> {
    print!("> ");
    std::io::stdout()
        .flush()
        .map_err(|e| format!("failed to flush stdout: {e}"))
}
