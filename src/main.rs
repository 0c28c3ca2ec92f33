//! Main entry point for the Honyaku Assist CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use honyaku_assist::cli::commands::{self, Commands};
use honyaku_assist::cli::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let directive = args.log_directive(std::env::var("RUST_LOG").ok().as_deref());
    let filter = tracing_subscriber::EnvFilter::try_new(&directive)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("honyaku_assist=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Override config with CLI args if provided
    if let Some(key) = args.deepl_auth_key {
        std::env::set_var("DEEPL_AUTH_KEY", key);
    }

    if let Some(db) = args.db {
        std::env::set_var("USAGE_DB_PATH", db);
    }

    // Execute command
    match args.command {
        Some(Commands::Server { host, port, .. }) => {
            commands::handle_server(host, port).await?;
        }
        Some(Commands::Translate {
            direction,
            text,
            file,
        }) => {
            commands::handle_translate(direction, text, file).await?;
        }
        Some(Commands::Usage) => {
            commands::handle_usage().await?;
        }
        None => {
            println!("Please specify a command. Use --help for more information.");
        }
    }

    Ok(())
}
