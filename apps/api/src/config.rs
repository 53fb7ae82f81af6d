use anyhow::{Context, Result};

const DEFAULT_DATABASE_URL: &str = "sqlite://payments.db";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_INTASEND_BASE_URL: &str = "https://api.intasend.com/api/v1";
const DEFAULT_WHATSAPP_NUMBER: &str = "254722285538";
const DEFAULT_PREMIUM_AMOUNT_KES: i64 = 1000;

/// Application configuration loaded from environment variables.
///
/// Nothing here is strictly required: a missing LLM key disables generation,
/// missing IntaSend keys disable STK push, and a missing admin password
/// disables the admin endpoints. Malformed numeric values abort startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub gemini: GeminiConfig,
    pub intasend: IntaSendConfig,
    pub admin_password: Option<String>,
    pub whatsapp_number: String,
    pub premium_amount_kes: i64,
    pub port: u16,
    pub rust_log: String,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
}

#[derive(Debug, Clone)]
pub struct IntaSendConfig {
    /// Secret key. Used as the bearer token and as the webhook HMAC key.
    pub api_key: Option<String>,
    pub publishable_key: Option<String>,
    pub base_url: String,
    /// Where IntaSend is told to deliver callbacks. Informative only.
    pub webhook_url: Option<String>,
}

impl IntaSendConfig {
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.publishable_key.is_some()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let premium_amount_kes = match var("PREMIUM_AMOUNT_KES") {
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|amount| *amount > 0)
                .with_context(|| format!("PREMIUM_AMOUNT_KES must be a positive integer, got '{raw}'"))?,
            None => DEFAULT_PREMIUM_AMOUNT_KES,
        };

        Ok(Config {
            database_url: var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            gemini: GeminiConfig {
                api_key: var("GEMINI_API_KEY"),
                model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
                endpoint: var("GEMINI_ENDPOINT")
                    .unwrap_or_else(|| DEFAULT_GEMINI_ENDPOINT.to_string())
                    .trim_end_matches('/')
                    .to_string(),
            },
            intasend: IntaSendConfig {
                api_key: var("INTASEND_API_KEY"),
                publishable_key: var("INTASEND_PUBLISHABLE_KEY"),
                base_url: var("INTASEND_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_INTASEND_BASE_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                webhook_url: var("INTASEND_WEBHOOK_URL"),
            },
            admin_password: var("ADMIN_PASSWORD"),
            whatsapp_number: var("WHATSAPP_NUMBER")
                .unwrap_or_else(|| DEFAULT_WHATSAPP_NUMBER.to_string()),
            premium_amount_kes,
            port: var("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

#[cfg(test)]
impl Config {
    /// A fully-populated config for router tests. No network endpoints are reachable.
    pub fn for_tests() -> Self {
        Self::from_vars(|key| match key {
            "DATABASE_URL" => Some("sqlite::memory:".to_string()),
            "INTASEND_API_KEY" => Some("ISSecretKey_test_123".to_string()),
            "INTASEND_PUBLISHABLE_KEY" => Some("ISPubKey_test_123".to_string()),
            "ADMIN_PASSWORD" => Some("letmein".to_string()),
            _ => None,
        })
        .expect("test config is valid")
    }
}
