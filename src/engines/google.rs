//! Google Cloud Translation (v3) client authenticated with a service account

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::errors::{Result, TranslationError};

/// Default Cloud Translation endpoint
pub const GOOGLE_TRANSLATE_URL: &str = "https://translation.googleapis.com";

const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const TRANSLATION_SCOPE: &str = "https://www.googleapis.com/auth/cloud-translation";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const LOCATION: &str = "global";

/// The fields of a service account key file this client needs
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("project_id", &self.project_id)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccountKey {
    /// Read a key file from disk
    pub async fn from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| TranslationError::CredentialsError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        serde_json::from_str(&content).map_err(|e| TranslationError::CredentialsError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    pub fn token_uri(&self) -> &str {
        self.token_uri.as_deref().unwrap_or(GOOGLE_TOKEN_URI)
    }

    /// Build the signed JWT assertion exchanged for an access token
    pub fn signed_assertion(&self, issued_at: i64) -> Result<String> {
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: TRANSLATION_SCOPE,
            aud: self.token_uri(),
            iat: issued_at,
            exp: issued_at + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.private_key_id.clone();

        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())?;
        Ok(jsonwebtoken::encode(&header, &claims, &key)?)
    }
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TranslateTextRequest<'a> {
    contents: [&'a str; 1],
    mime_type: &'a str,
    source_language_code: &'a str,
    target_language_code: &'a str,
}

#[derive(Deserialize)]
struct TranslateTextResponse {
    #[serde(default)]
    translations: Vec<Translation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    #[serde(default)]
    translated_text: String,
}

#[derive(Deserialize)]
struct GoogleErrorBody {
    error: GoogleErrorDetail,
}

#[derive(Deserialize)]
struct GoogleErrorDetail {
    message: String,
}

/// Client for the Cloud Translation Advanced API
#[derive(Debug, Clone)]
pub struct GoogleClient {
    http: reqwest::Client,
    credentials_path: PathBuf,
    project_id: Option<String>,
    base_url: String,
}

impl GoogleClient {
    /// Create a client. The key file is only read when translating.
    pub fn new(
        http: reqwest::Client,
        credentials_path: Option<&Path>,
        project_id: Option<&str>,
        base_url: Option<&str>,
    ) -> Result<Self> {
        let credentials_path = credentials_path.ok_or_else(|| TranslationError::ConfigError {
            message: "GOOGLE_PROJECT_CREDENTIALS is not set".to_string(),
        })?;

        Ok(Self {
            http,
            credentials_path: credentials_path.to_path_buf(),
            project_id: project_id.map(str::to_string),
            base_url: base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| GOOGLE_TRANSLATE_URL.to_string()),
        })
    }

    /// Translate `text` as plain text.
    ///
    /// Returns an empty string when Google answers without a translation.
    pub async fn translate_text(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String> {
        let key = ServiceAccountKey::from_file(&self.credentials_path).await?;
        let project_id = self
            .project_id
            .clone()
            .or_else(|| key.project_id.clone())
            .ok_or_else(|| TranslationError::ConfigError {
                message: "GOOGLE_PROJECT_ID is not set".to_string(),
            })?;

        let access_token = self.fetch_access_token(&key).await?;

        let url = format!(
            "{}/v3/projects/{}/locations/{}:translateText",
            self.base_url, project_id, LOCATION
        );
        debug!("Google translate {} -> {} via {}", source_lang, target_lang, url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(&TranslateTextRequest {
                contents: [text],
                mime_type: "text/plain",
                source_language_code: source_lang,
                target_language_code: target_lang,
            })
            .send()
            .await
            .map_err(|e| TranslationError::NetworkError {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GoogleErrorBody>(&error_text)
                .map(|body| body.error.message)
                .unwrap_or(error_text);
            return Err(TranslationError::ApiError {
                status: status_code,
                message,
            });
        }

        let body: TranslateTextResponse =
            response
                .json()
                .await
                .map_err(|e| TranslationError::InvalidResponseError {
                    message: e.to_string(),
                })?;

        Ok(body
            .translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .unwrap_or_default())
    }

    async fn fetch_access_token(&self, key: &ServiceAccountKey) -> Result<String> {
        let assertion = key.signed_assertion(chrono::Utc::now().timestamp())?;

        let response = self
            .http
            .post(key.token_uri())
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| TranslationError::NetworkError {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TranslationError::AuthError {
                message: format!("token exchange failed ({}): {}", status.as_u16(), error_text),
            });
        }

        let token: TokenResponse =
            response
                .json()
                .await
                .map_err(|e| TranslationError::InvalidResponseError {
                    message: e.to_string(),
                })?;
        Ok(token.access_token)
    }
}
