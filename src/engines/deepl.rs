//! DeepL API client

use serde::Deserialize;
use tracing::debug;

use crate::core::errors::{Result, TranslationError};

/// Server used for free-plan keys (those ending in `:fx`)
pub const DEEPL_FREE_SERVER_URL: &str = "https://api-free.deepl.com";

/// Server used for Pro keys
pub const DEEPL_PRO_SERVER_URL: &str = "https://api.deepl.com";

#[derive(Deserialize)]
struct TranslateResponse {
    translations: Vec<TextResult>,
}

#[derive(Deserialize)]
struct TextResult {
    text: String,
}

#[derive(Deserialize)]
struct UsageResponse {
    character_count: u64,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Thin client over the DeepL v2 REST API
#[derive(Clone)]
pub struct DeepLClient {
    http: reqwest::Client,
    auth_key: String,
    server_url: String,
}

impl std::fmt::Debug for DeepLClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepLClient")
            .field("auth_key", &"<redacted>")
            .field("server_url", &self.server_url)
            .finish()
    }
}

impl DeepLClient {
    /// Create a client. Fails with an authentication error when no key is given.
    pub fn new(
        http: reqwest::Client,
        auth_key: Option<&str>,
        server_url: Option<&str>,
    ) -> Result<Self> {
        let auth_key = auth_key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| TranslationError::AuthError {
                message: "auth_key must not be empty".to_string(),
            })?;

        let server_url = server_url
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| default_server_url(auth_key).to_string());

        Ok(Self {
            http,
            auth_key: auth_key.to_string(),
            server_url,
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Translate `text` and return the first translation
    pub async fn translate_text(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String> {
        let source_lang = source_lang.to_uppercase();
        let target_lang = target_lang.to_uppercase();
        debug!("DeepL translate {} -> {}, {} bytes", source_lang, target_lang, text.len());

        let response = self
            .http
            .post(format!("{}/v2/translate", self.server_url))
            .header("Authorization", self.authorization())
            .form(&[
                ("text", text),
                ("source_lang", source_lang.as_str()),
                ("target_lang", target_lang.as_str()),
            ])
            .send()
            .await
            .map_err(|e| TranslationError::NetworkError {
                message: e.to_string(),
            })?;

        let response = check_status(response).await?;
        let body: TranslateResponse =
            response
                .json()
                .await
                .map_err(|e| TranslationError::InvalidResponseError {
                    message: e.to_string(),
                })?;

        body.translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .ok_or_else(|| TranslationError::InvalidResponseError {
                message: "No translation in response".to_string(),
            })
    }

    /// Characters translated so far in the current billing period
    pub async fn get_usage(&self) -> Result<u64> {
        let response = self
            .http
            .get(format!("{}/v2/usage", self.server_url))
            .header("Authorization", self.authorization())
            .send()
            .await
            .map_err(|e| TranslationError::NetworkError {
                message: e.to_string(),
            })?;

        let response = check_status(response).await?;
        let body: UsageResponse =
            response
                .json()
                .await
                .map_err(|e| TranslationError::InvalidResponseError {
                    message: e.to_string(),
                })?;

        Ok(body.character_count)
    }

    fn authorization(&self) -> String {
        format!("DeepL-Auth-Key {}", self.auth_key)
    }
}

/// Free-plan keys carry a `:fx` suffix
pub fn default_server_url(auth_key: &str) -> &'static str {
    if auth_key.ends_with(":fx") {
        DEEPL_FREE_SERVER_URL
    } else {
        DEEPL_PRO_SERVER_URL
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let status_code = status.as_u16();
    let error_text = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorBody>(&error_text)
        .ok()
        .and_then(|body| body.message)
        .unwrap_or(error_text);

    match status_code {
        403 => Err(TranslationError::AuthError {
            message: format!("Authorization failure, check auth_key: {}", detail),
        }),
        456 => Err(TranslationError::QuotaExceededError {
            message: "DeepL character limit reached".to_string(),
        }),
        _ => Err(TranslationError::ApiError {
            status: status_code,
            message: detail,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::{GET, POST};
    use httpmock::MockServer;
    use serde_json::json;

    fn client(server: &MockServer) -> DeepLClient {
        DeepLClient::new(reqwest::Client::new(), Some("test-key"), Some(server.base_url().as_str())).unwrap()
    }

    #[test]
    fn test_missing_key_is_auth_error() {
        let err = DeepLClient::new(reqwest::Client::new(), None, None).unwrap_err();
        assert!(matches!(err, TranslationError::AuthError { .. }));

        let err = DeepLClient::new(reqwest::Client::new(), Some("  "), None).unwrap_err();
        assert!(matches!(err, TranslationError::AuthError { .. }));
    }

    #[test]
    fn test_server_url_from_key() {
        let free = DeepLClient::new(reqwest::Client::new(), Some("abc:fx"), None).unwrap();
        assert_eq!(free.server_url(), DEEPL_FREE_SERVER_URL);

        let pro = DeepLClient::new(reqwest::Client::new(), Some("abc"), None).unwrap();
        assert_eq!(pro.server_url(), DEEPL_PRO_SERVER_URL);
    }

    #[tokio::test]
    async fn test_translate_text_posts_form() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v2/translate")
                    .header("authorization", "DeepL-Auth-Key test-key")
                    .body_includes("source_lang=JA")
                    .body_includes("target_lang=EN-US");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(
                        json!({
                            "translations": [
                                { "detected_source_language": "JA", "text": "Good morning" }
                            ]
                        })
                        .to_string(),
                    );
            })
            .await;

        let text = client(&server)
            .translate_text("おはよう", "ja", "en-us")
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(text, "Good morning");
    }

    #[tokio::test]
    async fn test_translate_forbidden_is_auth_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v2/translate");
                then.status(403)
                    .header("content-type", "application/json")
                    .body(json!({ "message": "Wrong endpoint" }).to_string());
            })
            .await;

        let err = client(&server)
            .translate_text("hello", "en", "ja")
            .await
            .unwrap_err();
        assert!(matches!(err, TranslationError::AuthError { .. }));
        assert!(err.to_string().contains("Wrong endpoint"));
    }

    #[tokio::test]
    async fn test_quota_exceeded() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v2/translate");
                then.status(456);
            })
            .await;

        let err = client(&server)
            .translate_text("hello", "en", "ja")
            .await
            .unwrap_err();
        assert!(matches!(err, TranslationError::QuotaExceededError { .. }));
    }

    #[tokio::test]
    async fn test_get_usage() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v2/usage")
                    .header("authorization", "DeepL-Auth-Key test-key");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(json!({ "character_count": 1234, "character_limit": 500000 }).to_string());
            })
            .await;

        let usage = client(&server).get_usage().await.unwrap();
        mock.assert_async().await;
        assert_eq!(usage, 1234);
    }
}
