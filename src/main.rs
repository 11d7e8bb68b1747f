//! Gmail Cleaner
//!
//! Runs the AI proxy, or drives a preview / analysis / bulk action / draft run
//! from the terminal with a caller-supplied access token.

use std::sync::Arc;

use clap::{Parser, Subcommand};

use gmail_cleaner::ai::{AzureChatClient, CommandInterpreter};
use gmail_cleaner::cleanup::{Command, Orchestrator, Outcome, ProxyClient, Session};
use gmail_cleaner::config::Config;
use gmail_cleaner::error::Result;
use gmail_cleaner::gmail::client::GmailClient;
use gmail_cleaner::gmail::types::BatchResult;
use gmail_cleaner::server::{self, AppState};

/// Gmail Cleaner
#[derive(Parser)]
#[command(name = "gmail-cleaner")]
#[command(author, version, about = "Gmail Cleaner - bulk cleanup driven by natural-language commands")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the AI proxy server
    Serve {
        /// Listen port (overrides PORT)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Show which messages a command matches
    Preview {
        /// Natural-language cleanup command
        command: String,

        /// Skip the AI parser and use this action on recent mail
        #[arg(long)]
        action: Option<String>,

        /// Label name for the label action
        #[arg(long)]
        label: Option<String>,

        #[arg(long, env = "GMAIL_ACCESS_TOKEN", hide_env_values = true)]
        token: String,
    },
    /// Apply an action to messages
    Execute {
        /// delete, archive, mark_read, mark_unread or label
        action: String,

        /// Message ids
        #[arg(required = true)]
        ids: Vec<String>,

        #[arg(long)]
        label: Option<String>,

        #[arg(long, env = "GMAIL_ACCESS_TOKEN", hide_env_values = true)]
        token: String,
    },
    /// Create reply drafts with the same text
    Drafts {
        /// Reply body
        #[arg(long)]
        text: String,

        /// Message ids
        #[arg(required = true)]
        ids: Vec<String>,

        #[arg(long, env = "GMAIL_ACCESS_TOKEN", hide_env_values = true)]
        token: String,
    },
    /// Ask which recent messages a command refers to
    Analyze {
        /// Natural-language cleanup command
        command: String,

        #[arg(long, env = "GMAIL_ACCESS_TOKEN", hide_env_values = true)]
        token: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env()?;

    match cli.command {
        Commands::Serve { port } => run_server(&config, port.unwrap_or(config.port)).await,
        Commands::Preview {
            command,
            action,
            label,
            token,
        } => {
            let command = Command::Preview {
                command,
                action_override: action,
                label_name: label,
            };
            run_command(&config, &token, command).await
        }
        Commands::Execute {
            action,
            ids,
            label,
            token,
        } => {
            let command = Command::Execute {
                message_ids: ids,
                action,
                label_name: label,
            };
            run_command(&config, &token, command).await
        }
        Commands::Drafts { text, ids, token } => {
            let command = Command::CreateDrafts {
                message_ids: ids,
                suggestion_text: text,
            };
            run_command(&config, &token, command).await
        }
        Commands::Analyze { command, token } => {
            run_command(&config, &token, Command::Analyze { command }).await
        }
    }
}

async fn run_server(config: &Config, port: u16) -> Result<()> {
    // A missing LLM credential stops startup rather than failing each request
    let ai_config = config.ai.require()?;

    let chat = AzureChatClient::new(reqwest::Client::new(), ai_config);
    let state = AppState {
        interpreter: Arc::new(CommandInterpreter::new(Arc::new(chat))),
    };

    server::serve(state, port).await
}

async fn run_command(config: &Config, token: &str, command: Command) -> Result<()> {
    let session = Session::new(token)?;

    let gmail = GmailClient::new(config.http_client()?).with_api_base(&config.gmail_api_base);
    let proxy = ProxyClient::new(reqwest::Client::new(), &config.proxy_url);
    let orchestrator = Orchestrator::new(gmail, Arc::new(proxy));

    match orchestrator.dispatch(&session, command).await? {
        Outcome::Previewed(preview) => {
            println!("{}", serde_json::to_string_pretty(&preview)?);
        }
        Outcome::Analyzed(analysis) => {
            println!("{}", serde_json::to_string_pretty(&analysis)?);
        }
        Outcome::Executed(result) | Outcome::Drafted(result) => print_batch(&result),
    }

    Ok(())
}

fn print_batch(result: &BatchResult) {
    println!(
        "{} of {} succeeded, {} failed",
        result.success_count(),
        result.total(),
        result.failure_count()
    );
    for failure in &result.failed {
        println!("  {}: {}", failure.id, failure.error_message);
    }
}
