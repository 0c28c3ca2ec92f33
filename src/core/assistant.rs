//! Side-by-side comparison of the DeepL and Google engines

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::core::config::AssistConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{
    Comparison, EngineOutcome, TranslationRequest, UsageDisplay, DEEPL_ENGINE, GOOGLE_ENGINE,
};
use crate::core::usage_tracker::UsageTracker;
use crate::engines::deepl::DeepLClient;
use crate::engines::google::GoogleClient;

const MISSING_GOOGLE_TRANSLATION: &str =
    "(Error: Translation not included in response from Google)";

/// Runs a request through both engines and turns every failure into text
#[derive(Clone)]
pub struct HonyakuAssistant {
    http: reqwest::Client,
    config: Arc<AssistConfig>,
    tracker: UsageTracker,
}

impl HonyakuAssistant {
    /// Create a new assistant
    pub fn new(config: AssistConfig, tracker: UsageTracker) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .build()?;

        Ok(Self {
            http,
            config: Arc::new(config),
            tracker,
        })
    }

    pub fn tracker(&self) -> &UsageTracker {
        &self.tracker
    }

    /// Translate with both engines, one after the other
    pub async fn compare(&self, request: &TranslationRequest) -> Comparison {
        info!(
            "Comparing {} -> {} for {} chars",
            request.source_lang,
            request.target_lang,
            request.char_count()
        );

        let deepl = self.call_deepl(request).await;
        let google = self.call_google(request).await;

        Comparison {
            source_text: request.text.clone(),
            source_text_length: request.char_count(),
            source_lang: request.source_lang.clone(),
            target_lang: request.target_lang.clone(),
            deepl,
            google,
        }
    }

    /// DeepL translation plus DeepL's own monthly usage figure
    pub async fn call_deepl(&self, request: &TranslationRequest) -> EngineOutcome {
        let client = match DeepLClient::new(
            self.http.clone(),
            self.config.deepl_auth_key.as_deref(),
            self.config.deepl_server_url.as_deref(),
        ) {
            Ok(client) => client,
            Err(e) => {
                warn!("DeepL authentication failed: {}", e);
                return EngineOutcome::new(
                    DEEPL_ENGINE,
                    format!("(DeepL authentication error: {})", e),
                    unknown_usage(),
                );
            }
        };

        let text = match client
            .translate_text(&request.text, &request.source_lang, &request.target_lang)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!("DeepL translation failed: {}", e);
                return EngineOutcome::new(
                    DEEPL_ENGINE,
                    format!("(DeepL translation error: {})", e),
                    unknown_usage(),
                );
            }
        };

        let usage = match client.get_usage().await {
            Ok(count) => UsageDisplay::Count(count),
            Err(e) => {
                warn!("DeepL usage query failed: {}", e);
                UsageDisplay::Unavailable(format!("(DeepL usage error: {})", e))
            }
        };

        EngineOutcome::new(DEEPL_ENGINE, text, usage)
    }

    /// Google translation plus the locally tracked monthly usage.
    ///
    /// Only a successful translation is counted.
    pub async fn call_google(&self, request: &TranslationRequest) -> EngineOutcome {
        match self.google_translate(request).await {
            Ok(text) if !text.is_empty() => {
                let usage = match self.tracker.record(GOOGLE_ENGINE, request.char_count()).await {
                    Ok(total) => UsageDisplay::Count(total),
                    Err(e) => usage_error(e),
                };
                EngineOutcome::new(GOOGLE_ENGINE, text, usage)
            }
            Ok(_) => {
                warn!("Google returned no translation");
                EngineOutcome::new(GOOGLE_ENGINE, MISSING_GOOGLE_TRANSLATION, self.google_usage().await)
            }
            Err(e) => {
                warn!("Google translation failed: {}", e);
                EngineOutcome::new(
                    GOOGLE_ENGINE,
                    format!("(Error: {})", e),
                    self.google_usage().await,
                )
            }
        }
    }

    async fn google_translate(&self, request: &TranslationRequest) -> Result<String> {
        let client = GoogleClient::new(
            self.http.clone(),
            self.config.google_credentials_path.as_deref(),
            self.config.google_project_id.as_deref(),
            self.config.google_translate_url.as_deref(),
        )?;
        client
            .translate_text(&request.text, &request.source_lang, &request.target_lang)
            .await
    }

    async fn google_usage(&self) -> UsageDisplay {
        match self.tracker.current(GOOGLE_ENGINE).await {
            Ok(total) => UsageDisplay::Count(total),
            Err(e) => usage_error(e),
        }
    }
}

fn unknown_usage() -> UsageDisplay {
    UsageDisplay::Unavailable("(Unknown)".to_string())
}

fn usage_error(e: TranslationError) -> UsageDisplay {
    warn!("Usage tracking failed: {}", e);
    UsageDisplay::Unavailable(format!("(Usage error: {})", e))
}
