use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const DEFAULT_PORT: u16 = 8081;
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_DETECTION_LATENCY_MS: u64 = 1500;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a valid {expected}, got {value:?}")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("{key} is not a valid URL: {reason}")]
    InvalidUrl { key: &'static str, reason: String },
}

#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: Url,
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_host: String,
    pub port: u16,
    /// `None` when no API key is set; narrative routes then fail with `GenerationFailed`.
    pub gemini: Option<GeminiConfig>,
    pub detection_latency: Duration,
    pub bilingual: bool,
    pub prompts_path: Option<PathBuf>,
    pub frontend_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                expected: "port number",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        let detection_latency = match get("DETECTION_LATENCY_MS") {
            Some(raw) => Duration::from_millis(raw.parse::<u64>().map_err(|_| ConfigError::Invalid {
                key: "DETECTION_LATENCY_MS",
                expected: "number of milliseconds",
                value: raw,
            })?),
            None => Duration::from_millis(DEFAULT_DETECTION_LATENCY_MS),
        };

        let bilingual = match get("NARRATIVE_BILINGUAL") {
            Some(raw) => parse_bool("NARRATIVE_BILINGUAL", raw)?,
            None => true,
        };

        let gemini = match get("GEMINI_API_KEY") {
            Some(api_key) => {
                let raw_url = get("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string());
                let base_url = Url::parse(&raw_url).map_err(|e| ConfigError::InvalidUrl {
                    key: "GEMINI_BASE_URL",
                    reason: e.to_string(),
                })?;
                Some(GeminiConfig {
                    api_key,
                    model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
                    base_url,
                })
            }
            None => None,
        };

        let frontend_dir = match get("FRONTEND_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => match get("CARGO_MANIFEST_DIR") {
                Some(manifest_dir) => PathBuf::from(format!("{}/../frontend/dist", manifest_dir)),
                None => PathBuf::from("/usr/src/app/frontend/dist"),
            },
        };

        Ok(Self {
            bind_host: get("BIND_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            gemini,
            detection_latency,
            bilingual,
            prompts_path: get("PROMPTS_PATH").map(PathBuf::from),
            frontend_dir,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

fn parse_bool(key: &'static str, raw: String) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            expected: "boolean",
            value: raw,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.bind_address(), "0.0.0.0:8081");
        assert_eq!(config.detection_latency, Duration::from_millis(1500));
        assert!(config.bilingual);
        assert!(config.gemini.is_none());
        assert_eq!(config.frontend_dir, PathBuf::from("/usr/src/app/frontend/dist"));
    }

    #[test]
    fn gemini_settings_follow_api_key() {
        let config = config_from(&[
            ("GEMINI_API_KEY", "secret"),
            ("GEMINI_MODEL", "gemini-pro"),
            ("NARRATIVE_BILINGUAL", "off"),
        ])
        .unwrap();

        let gemini = config.gemini.unwrap();
        assert_eq!(gemini.model, "gemini-pro");
        assert_eq!(gemini.base_url.as_str(), "https://generativelanguage.googleapis.com/");
        assert!(!config.bilingual);
        assert!(!format!("{:?}", gemini).contains("secret"));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = config_from(&[("GEMINI_API_KEY", "  "), ("PORT", "")]).unwrap();
        assert!(config.gemini.is_none());
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn invalid_values_are_reported() {
        assert!(matches!(
            config_from(&[("PORT", "eighty")]),
            Err(ConfigError::Invalid { key: "PORT", .. })
        ));
        assert!(matches!(
            config_from(&[("DETECTION_LATENCY_MS", "-5")]),
            Err(ConfigError::Invalid {
                key: "DETECTION_LATENCY_MS",
                ..
            })
        ));
        assert!(matches!(
            config_from(&[("GEMINI_API_KEY", "k"), ("GEMINI_BASE_URL", "not a url")]),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }
}
