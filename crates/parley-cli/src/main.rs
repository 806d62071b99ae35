//! parley - terminal chat client

mod config;
mod ui;

use clap::Parser;
use std::sync::Arc;
use std::time::Duration;

use parley_chat::{EndpointTransport, Session, SessionConfig, SubmitOutcome};
use parley_client::ChatClient;

/// Endpoint used when neither the flag nor the config names one
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000";

/// parley - chat with a remote assistant from the terminal
#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Chat endpoint base URL (default: http://localhost:8000)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Override the greeting shown when the conversation starts
    #[arg(long)]
    greeting: Option<String>,

    /// Send a single message, print the reply, and exit
    #[arg(short = 'c', long)]
    message: Option<String>,

    /// Probe the endpoint health route and exit
    #[arg(long)]
    check: bool,

    /// Disable TUI mode (use simple stdin/stdout)
    #[arg(long)]
    no_tui: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup tracing
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("parley=debug")
            .init();
    }

    // Initialize config and exit
    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    // Load config file and merge with CLI args (CLI takes precedence)
    let cfg = config::Config::load();

    let endpoint = args
        .endpoint
        .or(cfg.endpoint.clone())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

    let greeting = args
        .greeting
        .or(cfg.greeting.clone())
        .unwrap_or_else(|| parley_chat::DEFAULT_GREETING.to_string());

    let use_tui = !args.no_tui && cfg.tui.unwrap_or(true);
    tracing::debug!(%endpoint, tui = use_tui, "starting parley");

    let client = match cfg.timeout_secs {
        Some(secs) => ChatClient::with_timeout(&endpoint, Duration::from_secs(secs))?,
        None => ChatClient::new(&endpoint),
    };

    if args.check {
        return run_check(&client).await;
    }

    let transport = Arc::new(EndpointTransport::new(client));
    let session = Session::new(SessionConfig { greeting }, transport);

    // One-shot mode
    if let Some(message) = args.message {
        return run_command(&session, &message).await;
    }

    // TUI mode
    if use_tui {
        return ui::run_tui(&session, &endpoint).await;
    }

    // Interactive mode (simple stdin/stdout)
    run_interactive(&session, &endpoint).await
}

/// Probe the health route and report the endpoint's status
async fn run_check(client: &ChatClient) -> anyhow::Result<()> {
    match client.health().await {
        Ok(health) => {
            println!("{}: {}", client.base_url(), health.status);
            Ok(())
        }
        Err(e) => {
            eprintln!("{}: unreachable ({})", client.base_url(), e);
            std::process::exit(1);
        }
    }
}

/// Send one message and print the reply
async fn run_command(session: &Session, message: &str) -> anyhow::Result<()> {
    match session.submit_text(message).await {
        SubmitOutcome::Completed => {
            if let Some(reply) = session.messages().last() {
                println!("{}", reply.content);
            }
            Ok(())
        }
        SubmitOutcome::Rejected(_) => {
            anyhow::bail!("nothing to send");
        }
    }
}

async fn run_interactive(session: &Session, endpoint: &str) -> anyhow::Result<()> {
    use std::io::{self, IsTerminal, Write};

    // Show minimal startup info (only if TTY)
    if io::stderr().is_terminal() {
        eprintln!("parley ({})", endpoint);
        eprintln!();
    }

    // Print the seeded greeting
    if let Some(greeting) = session.messages().first() {
        println!("{}", greeting.content);
        println!();
    }

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            // EOF
            break;
        }
        let input = input.trim_end_matches(['\n', '\r']);

        if session.submit_text(input).await == SubmitOutcome::Completed {
            if let Some(reply) = session.messages().last() {
                println!("\n{}\n", reply.content);
            }
        }
    }

    Ok(())
}
