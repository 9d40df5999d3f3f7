//! helix CLI binary
//!
//! With no subcommand, launches the interactive TUI. Subcommands talk to the
//! backend directly and print to stdout.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use helix_api::BackendClient;
use helix_core::config::{DEFAULT_API_URL, DEFAULT_ORG_ID, DEFAULT_USER_ID};
use helix_core::{Config, ImageAttachment, Message, Session, TurnOutcome};
use helix_tui::ChatApp;
use std::fs::OpenOptions;
use std::sync::Mutex;

/// helix - recruiting outreach assistant
#[derive(Parser)]
#[command(name = "helix", version, about)]
struct Cli {
    /// Backend base URL
    #[arg(long, default_value = DEFAULT_API_URL, env = "HELIX_API_URL")]
    api_url: String,

    /// User id sent with every request
    #[arg(long, default_value = DEFAULT_USER_ID, env = "HELIX_USER_ID")]
    user: String,

    /// Organization id sent with every request
    #[arg(long, default_value = DEFAULT_ORG_ID, env = "HELIX_ORG_ID")]
    org: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List saved sequences
    Sequences {
        /// List the organization's sequences instead of the user's
        #[arg(long)]
        org: bool,
    },
    /// Print one saved sequence
    Show {
        /// Sequence id
        id: String,
    },
    /// Send a single chat message and print the reply
    Chat {
        /// Message text
        text: String,
        /// Image to attach
        #[arg(long)]
        image: Option<String>,
        /// Search mode to enable (repeatable: roles, skills, custom, open)
        #[arg(long = "mode")]
        modes: Vec<String>,
    },
    /// Check backend health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env();
    config.api_url = cli.api_url;
    config.user_id = cli.user;
    config.org_id = cli.org;

    let client = BackendClient::from_config(&config)
        .with_context(|| format!("Invalid backend URL: {}", config.api_url))?;

    match cli.command {
        // No subcommand → launch interactive TUI
        None => {
            init_file_tracing(&config)?;
            run_tui(&config, client).await?;
        }
        Some(command) => {
            init_tracing()?;
            match command {
                Commands::Sequences { org } => list_sequences(&client, &config, org).await?,
                Commands::Show { id } => show_sequence(&client, &id).await?,
                Commands::Chat { text, image, modes } => {
                    chat_once(&client, &config, &text, image.as_deref(), &modes).await?
                }
                Commands::Health => check_health(&client).await?,
            }
        }
    }

    Ok(())
}

fn env_filter() -> Result<tracing_subscriber::EnvFilter> {
    Ok(tracing_subscriber::EnvFilter::from_default_env().add_directive("helix=info".parse()?))
}

/// Log to stderr for one-shot commands
fn init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter()?)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// Log to a file while the TUI owns the terminal
fn init_file_tracing(config: &Config) -> Result<()> {
    config.ensure_dirs().context("Failed to create data directory")?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
        .with_context(|| format!("Failed to open log file {}", config.log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter()?)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Run the TUI chat interface
async fn run_tui(config: &Config, client: BackendClient) -> Result<()> {
    tracing::info!("Starting helix against {}", config.api_url);

    // Setup terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Run event loop
    let mut app = ChatApp::new(config, client);
    let result = app.run(&mut terminal).await;

    // Restore terminal
    ratatui::restore();

    result
}

/// List saved sequences for the user or organization
async fn list_sequences(client: &BackendClient, config: &Config, org: bool) -> Result<()> {
    let sequences = if org {
        client.list_org_sequences(&config.org_id).await
    } else {
        client.list_user_sequences(&config.user_id).await
    }
    .context("Failed to fetch sequences")?;

    if sequences.is_empty() {
        println!("No saved sequences.");
        return Ok(());
    }

    println!("{:<38} {:<28} {:<14} {:<14}", "ID", "NAME", "CREATED", "UPDATED");
    for seq in sequences {
        println!(
            "{:<38} {:<28} {:<14} {:<14}",
            seq.id,
            seq.name,
            format_date(seq.created_at),
            format_date(seq.updated_at)
        );
    }
    Ok(())
}

fn format_date(date: Option<NaiveDateTime>) -> String {
    date.map(|d| d.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Print a sequence and its stored conversation
async fn show_sequence(client: &BackendClient, id: &str) -> Result<()> {
    let seq = match client.get_sequence(id).await {
        Ok(seq) => seq,
        Err(e) if e.is_not_found() => anyhow::bail!("Sequence not found: {}", id),
        Err(e) => return Err(e).context("Failed to fetch sequence"),
    };

    println!("{} ({})", seq.name, seq.id);
    println!(
        "Created: {}  Updated: {}",
        format_date(seq.created_at),
        format_date(seq.updated_at)
    );
    println!();
    println!("{}", seq.content);

    if !seq.messages.is_empty() {
        println!();
        println!("Conversation:");
        for entry in &seq.messages {
            println!("  [{}] {}", entry.sender.as_str(), entry.text);
        }
    }
    Ok(())
}

/// Send one chat turn and print the reply
async fn chat_once(
    client: &BackendClient,
    config: &Config,
    text: &str,
    image: Option<&str>,
    modes: &[String],
) -> Result<()> {
    let mut session = Session::from_config(config);
    for mode in modes {
        if helix_core::search_mode::label(mode).is_none() {
            anyhow::bail!("Unknown search mode: {}", mode);
        }
        session.toggle_search_mode(mode);
    }

    let image = image
        .map(|path| ImageAttachment::load(ImageAttachment::resolve_path(path)))
        .transpose()?;

    let Some(request) = session.send(text, image) else {
        anyhow::bail!("Nothing to send: provide text or --image");
    };

    let ticket = request.ticket;
    let result = client.chat(&request).await.map_err(|e| e.to_string());
    if let Err(e) = &result {
        tracing::warn!("Chat request failed: {}", e);
    }

    match session.complete(ticket, result) {
        TurnOutcome::Appended { workspace_updated } => {
            if let Some(reply) = session.messages().last() {
                print_reply(reply);
            }
            if workspace_updated {
                println!();
                println!("── {} ──", session.workspace().active_name());
                println!("{}", session.workspace().active_content());
            }
            Ok(())
        }
        TurnOutcome::Failed { .. } => {
            let text = session
                .messages()
                .last()
                .map(|m| m.text.clone())
                .unwrap_or_default();
            anyhow::bail!("{}", text)
        }
        outcome => anyhow::bail!("Unexpected chat outcome: {:?}", outcome),
    }
}

fn print_reply(reply: &Message) {
    println!("{}", reply.text);

    if let Some(reasoning) = &reply.reasoning {
        println!();
        println!("Reasoning: {}", reasoning);
    }

    if !reply.citations.is_empty() {
        println!();
        println!("Sources:");
        for (i, citation) in reply.citations.iter().enumerate() {
            println!("  [{}] {} - {}", i + 1, citation.title, citation.url);
        }
    }
}

/// Check backend health
async fn check_health(client: &BackendClient) -> Result<()> {
    match client.health().await {
        Ok(health) => {
            println!("{}: {}", client.base_url(), health.status);
            Ok(())
        }
        Err(e) => anyhow::bail!("Backend unreachable at {}: {}", client.base_url(), e),
    }
}
