use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use parley::config::{Credentials, ParleyConfig};
use parley::{Assistant, SessionId, repl, server};
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "parley=info,pchat=info,pprovider=info,pservices=info,ptooling=info";

#[derive(Debug, Parser)]
#[command(name = "parley", version, about = "Conversational assistant over a hosted LLM")]
struct Cli {
    /// TOML settings file; `PARLEY_CONFIG` is used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve `GET /` and `POST /chat`.
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
    /// Chat in the terminal; `exit` or `quit` ends the session.
    Repl {
        #[arg(long, default_value = "default")]
        session: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config =
        ParleyConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    let credentials = Credentials::from_env(&config).context("missing credentials")?;

    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            let assistant = Arc::new(Assistant::from_config(&config, credentials)?);
            server::serve(assistant, &config.bind_address())
                .await
                .with_context(|| format!("server on {} stopped", config.bind_address()))?;
        }
        Command::Repl { session } => {
            let assistant = Assistant::from_config(&config, credentials)?;
            println!("Parley ({} mode). Type 'exit' to quit.", assistant.mode());
            let stdin = BufReader::new(tokio::io::stdin());
            repl::run(&assistant, SessionId::new(session), stdin, tokio::io::stdout()).await?;
        }
    }

    Ok(())
}
