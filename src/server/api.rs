//! HTTP front end: one page that shows the form or the results

use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

use crate::core::assistant::HonyakuAssistant;
use crate::core::config::AssistConfig;
use crate::core::errors::Result;
use crate::core::models::{Direction, TranslationRequest};
use crate::core::usage_tracker::{SqliteUsageStore, UsageTracker};
use crate::server::templates::Pages;

/// Application state
pub struct AppState {
    assistant: HonyakuAssistant,
    pages: Pages,
}

impl AppState {
    pub fn new(assistant: HonyakuAssistant) -> Result<Self> {
        Ok(Self {
            assistant,
            pages: Pages::new()?,
        })
    }
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    service: String,
    version: String,
}

/// Submitted input form. Missing fields arrive as empty strings so they can
/// be reported next to the form instead of rejected outright.
#[derive(Debug, Default, Deserialize)]
pub struct InputForm {
    #[serde(default)]
    pub direction: String,
    #[serde(default)]
    pub source_text: String,
}

impl InputForm {
    /// Check both fields, returning per-field messages on failure
    pub fn validate(&self) -> std::result::Result<TranslationRequest, BTreeMap<&'static str, Vec<String>>> {
        let mut errors = BTreeMap::new();

        if self.direction.is_empty() {
            errors.insert("direction", vec!["This field is required.".to_string()]);
        } else if !Direction::ALL.iter().any(|d| d.label() == self.direction) {
            errors.insert(
                "direction",
                vec![format!(
                    "Select a valid choice. {} is not one of the available choices.",
                    self.direction
                )],
            );
        }

        if self.source_text.trim().is_empty() {
            errors.insert("source_text", vec!["This field is required.".to_string()]);
        }

        if errors.is_empty() {
            Ok(TranslationRequest::new(
                Direction::from_label(&self.direction),
                self.source_text.clone(),
            ))
        } else {
            Err(errors)
        }
    }
}

/// Health check handler
async fn health_check() -> axum::Json<HealthResponse> {
    axum::Json(HealthResponse {
        status: "ok".to_string(),
        service: "honyaku-assist".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Empty input form
async fn input_page(State(state): State<Arc<AppState>>) -> Response {
    page(state.pages.input(None, "", &BTreeMap::new()))
}

/// Validate the form, then translate with both engines
async fn submit(State(state): State<Arc<AppState>>, Form(form): Form<InputForm>) -> Response {
    match form.validate() {
        Ok(request) => {
            let comparison = state.assistant.compare(&request).await;
            page(state.pages.output(&comparison))
        }
        Err(errors) => {
            info!("Rejected input form: {:?}", errors.keys().collect::<Vec<_>>());
            page(state.pages.input(
                Some(form.direction.as_str()),
                &form.source_text,
                &errors,
            ))
        }
    }
}

fn page(rendered: Result<String>) -> Response {
    match rendered {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Failed to render page: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Failed to render page: {}", e)).into_response()
        }
    }
}

/// Build the router over the given state
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(input_page).post(submit))
        .route("/health", get(health_check))
        .with_state(Arc::new(state))
}

/// Run the HTTP server
pub async fn run_server(host: String, port: u16) -> anyhow::Result<()> {
    let config = AssistConfig::from_env()?;

    let store = SqliteUsageStore::new(config.usage_db_path.clone());
    store.init().await?;
    info!("Usage database: {}", store.path().display());

    let assistant = HonyakuAssistant::new(config, UsageTracker::new(Arc::new(store)))?;
    let app = router(AppState::new(assistant)?);

    // Bind address
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(direction: &str, source_text: &str) -> InputForm {
        InputForm {
            direction: direction.to_string(),
            source_text: source_text.to_string(),
        }
    }

    #[test]
    fn test_valid_form() {
        let request = form("Ja>En", "こんにちは").validate().unwrap();
        assert_eq!(request.direction, Direction::JaToEn);
        assert_eq!(request.source_lang, "ja");
        assert_eq!(request.target_lang, "en-us");
    }

    #[test]
    fn test_blank_text_rejected() {
        let errors = form("En>Ja", "   \n").validate().unwrap_err();
        assert!(errors.contains_key("source_text"));
        assert!(!errors.contains_key("direction"));
    }

    #[test]
    fn test_unknown_direction_rejected() {
        let errors = form("Fr>En", "bonjour").validate().unwrap_err();
        assert!(errors["direction"][0].contains("Fr>En"));
    }

    #[test]
    fn test_empty_form_reports_both_fields() {
        let errors = InputForm::default().validate().unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
