//! Honyaku Assist - side-by-side DeepL and Google machine translation
//!
//! This library serves a small web page that sends Japanese or English text
//! to both engines and tracks the Google engine's monthly character usage.

#![forbid(unsafe_code)]

pub mod cli;
pub mod core;
pub mod engines;
pub mod server;

// Re-export key types for convenience
pub use crate::core::{
    assistant::HonyakuAssistant,
    config::AssistConfig,
    errors::TranslationError,
    models::{Comparison, Direction, EngineOutcome, EngineUsage, TranslationRequest, UsageDisplay},
    usage_tracker::{MemoryUsageStore, SqliteUsageStore, UsageStore, UsageTracker},
};

pub use crate::engines::{deepl::DeepLClient, google::GoogleClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
