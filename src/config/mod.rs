use crate::core::{Error, Result};
use serde::Deserialize;
use std::env;

pub const SANDBOX_URL: &str = "https://secure.snd.payu.com";
pub const PRODUCTION_URL: &str = "https://secure.payu.com";

/// Gateway environment selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Sandbox,
    Production,
}

impl Environment {
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Sandbox => SANDBOX_URL,
            Environment::Production => PRODUCTION_URL,
        }
    }
}

/// PayU adapter configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PayuConfig {
    pub environment: Environment,

    /// Merchant point-of-sale id
    pub pos_id: u64,

    /// Shared secret signing inbound notifications
    pub second_key: String,

    pub oauth_client_id: String,
    pub oauth_client_secret: String,

    /// Overrides the environment's default base URL when set
    pub base_url: Option<String>,

    /// Notification URL template; `{payment_id}` is substituted per payment
    pub notify_url: Option<String>,

    /// Post-payment redirect URL template; `{payment_id}` is substituted
    pub continue_url: Option<String>,

    /// Accept legacy MD5-signed callbacks. Off unless explicitly enabled.
    pub allow_md5_callbacks: bool,
}

impl PayuConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let environment = match env::var("PAYU_ENVIRONMENT")
            .unwrap_or_else(|_| "sandbox".to_string())
            .to_lowercase()
            .as_str()
        {
            "sandbox" => Environment::Sandbox,
            "production" => Environment::Production,
            other => {
                return Err(Error::configuration(format!(
                    "Invalid PAYU_ENVIRONMENT: {}",
                    other
                )))
            }
        };

        let config = PayuConfig {
            environment,
            pos_id: env::var("PAYU_POS_ID")
                .map_err(|_| Error::configuration("PAYU_POS_ID not set"))?
                .parse()
                .map_err(|_| Error::configuration("Invalid PAYU_POS_ID"))?,
            second_key: env::var("PAYU_SECOND_KEY")
                .map_err(|_| Error::configuration("PAYU_SECOND_KEY not set"))?,
            oauth_client_id: env::var("PAYU_OAUTH_CLIENT_ID")
                .map_err(|_| Error::configuration("PAYU_OAUTH_CLIENT_ID not set"))?,
            oauth_client_secret: env::var("PAYU_OAUTH_CLIENT_SECRET")
                .map_err(|_| Error::configuration("PAYU_OAUTH_CLIENT_SECRET not set"))?,
            base_url: env::var("PAYU_BASE_URL").ok(),
            notify_url: env::var("PAYU_NOTIFY_URL").ok(),
            continue_url: env::var("PAYU_CONTINUE_URL").ok(),
            allow_md5_callbacks: env::var("PAYU_ALLOW_MD5_CALLBACKS")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        };

        config.validate()?;
        Ok(config)
    }

    /// Effective gateway base URL, without a trailing slash
    pub fn effective_base_url(&self) -> String {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.base_url())
            .trim_end_matches('/')
            .to_string()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.second_key.is_empty() {
            return Err(Error::configuration("second_key must not be empty"));
        }

        if self.oauth_client_id.is_empty() || self.oauth_client_secret.is_empty() {
            return Err(Error::configuration("OAuth credentials must not be empty"));
        }

        if let Some(url) = self.base_url.as_deref() {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(Error::configuration(format!("Invalid base_url: {}", url)));
            }
        }

        Ok(())
    }
}
