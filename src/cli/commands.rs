//! CLI command definitions and handlers

use clap::Subcommand;
use std::path::PathBuf;
use std::sync::Arc;

/// Commands for Honyaku Assist
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the web front end
    Server {
        /// Bind address (default: 127.0.0.1)
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Listen port (default: 8000)
        #[arg(short, long, default_value_t = 8000)]
        port: u16,

        /// Log at debug level (same as --verbose)
        #[arg(long)]
        debug: bool,
    },

    /// Translate text with both engines and print the results
    Translate {
        /// Direction label: "Ja>En" or "En>Ja"
        #[arg(short, long, default_value = "Ja>En")]
        direction: String,

        /// Source text (read from --file when omitted)
        text: Option<String>,

        /// Read the source text from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Show the locally tracked usage for each engine
    Usage,
}

/// Handle server command
pub async fn handle_server(host: String, port: u16) -> anyhow::Result<()> {
    use crate::server::api::run_server;
    use tracing::info;

    info!("Starting HTTP server on {}:{}", host, port);
    println!("🚀 Honyaku Assist running on http://{}:{}", host, port);

    run_server(host, port).await?;

    Ok(())
}

/// Handle translate command
pub async fn handle_translate(
    direction: String,
    text: Option<String>,
    file: Option<PathBuf>,
) -> anyhow::Result<()> {
    use crate::core::assistant::HonyakuAssistant;
    use crate::core::config::AssistConfig;
    use crate::core::models::{Direction, TranslationRequest};
    use crate::core::usage_tracker::{SqliteUsageStore, UsageTracker};
    use tracing::info;

    let text = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => tokio::fs::read_to_string(&path).await?,
        (None, None) => anyhow::bail!("Provide the source text or --file"),
    };

    if text.trim().is_empty() {
        anyhow::bail!("Source text is empty");
    }

    let config = AssistConfig::from_env()?;
    let store = SqliteUsageStore::new(config.usage_db_path.clone());
    store.init().await?;

    let assistant = HonyakuAssistant::new(config, UsageTracker::new(Arc::new(store)))?;
    let request = TranslationRequest::new(Direction::from_label(&direction), text);

    info!("Translating {} characters ({})", request.char_count(), request.direction);
    let comparison = assistant.compare(&request).await;

    println!(
        "Source ({} -> {}, {} characters)",
        comparison.source_lang, comparison.target_lang, comparison.source_text_length
    );
    for outcome in [&comparison.deepl, &comparison.google] {
        println!("\n=== {} ({} characters) ===", outcome.engine, outcome.length);
        println!("{}", outcome.text);
        println!("Usage this month: {}", outcome.usage);
    }

    Ok(())
}

/// Handle usage command
pub async fn handle_usage() -> anyhow::Result<()> {
    use crate::core::config::AssistConfig;
    use crate::core::usage_tracker::{SqliteUsageStore, UsageTracker};

    let config = AssistConfig::from_env()?;
    let tracker = UsageTracker::new(Arc::new(SqliteUsageStore::new(config.usage_db_path)));
    let records = tracker.get_stats().await?;

    if records.is_empty() {
        println!("No usage recorded yet.");
        return Ok(());
    }

    for record in records {
        println!(
            "{}: {} characters since {:02}/{}",
            record.name, record.current_usage, record.last_reset.month, record.last_reset.year
        );
    }

    Ok(())
}
