//! Configuration management

use std::path::{Path, PathBuf};
use tracing::warn;

/// Default location of the usage database
pub const DEFAULT_USAGE_DB_PATH: &str = "honyaku_assist.sqlite3";

/// Configuration for the assistant and both engines
#[derive(Clone)]
pub struct AssistConfig {
    pub deepl_auth_key: Option<String>,
    pub deepl_server_url: Option<String>,
    pub google_credentials_path: Option<PathBuf>,
    pub google_project_id: Option<String>,
    pub google_translate_url: Option<String>,
    pub usage_db_path: PathBuf,
    pub timeout_ms: u64,
}

impl std::fmt::Debug for AssistConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistConfig")
            .field("deepl_auth_key", &self.deepl_auth_key.as_ref().map(|_| "<redacted>"))
            .field("deepl_server_url", &self.deepl_server_url)
            .field("google_credentials_path", &self.google_credentials_path)
            .field("google_project_id", &self.google_project_id)
            .field("google_translate_url", &self.google_translate_url)
            .field("usage_db_path", &self.usage_db_path)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            deepl_auth_key: None,
            deepl_server_url: None,
            google_credentials_path: None,
            google_project_id: None,
            google_translate_url: None,
            usage_db_path: PathBuf::from(DEFAULT_USAGE_DB_PATH),
            timeout_ms: 30000,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Join a relative `path` onto `base`. Absolute paths, or any path when no
/// base is configured, are returned unchanged.
pub fn resolve_path(base: Option<&Path>, path: impl Into<PathBuf>) -> PathBuf {
    let path = path.into();
    match base {
        Some(base) if path.is_relative() => base.join(path),
        _ => path,
    }
}

impl AssistConfig {
    /// Load configuration from environment variables.
    ///
    /// Provider credentials are optional here; a missing one shows up as a
    /// placeholder on the results page instead of stopping the server.
    /// Relative file paths are resolved against `HONYAKU_BASE_DIR` when set,
    /// otherwise against the working directory.
    pub fn from_env() -> anyhow::Result<Self> {
        let base_dir = non_empty_var("HONYAKU_BASE_DIR").map(PathBuf::from);

        let timeout_ms = std::env::var("REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".to_string())
            .parse::<u64>()?;

        let usage_db_path = non_empty_var("USAGE_DB_PATH")
            .unwrap_or_else(|| DEFAULT_USAGE_DB_PATH.to_string());

        Ok(Self {
            deepl_auth_key: non_empty_var("DEEPL_AUTH_KEY"),
            deepl_server_url: non_empty_var("DEEPL_SERVER_URL"),
            google_credentials_path: non_empty_var("GOOGLE_PROJECT_CREDENTIALS")
                .map(|path| resolve_path(base_dir.as_deref(), path)),
            google_project_id: non_empty_var("GOOGLE_PROJECT_ID"),
            google_translate_url: non_empty_var("GOOGLE_TRANSLATE_URL"),
            usage_db_path: resolve_path(base_dir.as_deref(), usage_db_path),
            timeout_ms,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.timeout_ms == 0 {
            return Err(anyhow::anyhow!("timeout_ms must be greater than 0"));
        }

        if self.usage_db_path.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("usage database path is required"));
        }

        if self.deepl_auth_key.is_none() {
            warn!("DEEPL_AUTH_KEY is not set, DeepL results will be unavailable");
        }

        if self.google_credentials_path.is_none() || self.google_project_id.is_none() {
            warn!("GOOGLE_PROJECT_CREDENTIALS or GOOGLE_PROJECT_ID is not set, Google results will be unavailable");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        let config = AssistConfig {
            deepl_auth_key: Some("key:fx".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let config = AssistConfig {
            timeout_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_credentials_still_valid() {
        assert!(AssistConfig::default().validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = AssistConfig {
            deepl_auth_key: Some("secret-key".to_string()),
            ..Default::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_relative_path_joined_to_base() {
        let base = Path::new("/srv/honyaku");
        assert_eq!(
            resolve_path(Some(base), "keys/service_account.json"),
            PathBuf::from("/srv/honyaku/keys/service_account.json")
        );
    }

    #[test]
    fn test_absolute_path_ignores_base() {
        let base = Path::new("/srv/honyaku");
        assert_eq!(
            resolve_path(Some(base), "/etc/keys/service_account.json"),
            PathBuf::from("/etc/keys/service_account.json")
        );
    }

    #[test]
    fn test_no_base_keeps_relative_path() {
        assert_eq!(
            resolve_path(None, "service_account.json"),
            PathBuf::from("service_account.json")
        );
    }
}
