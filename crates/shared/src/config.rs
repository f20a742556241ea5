//! Application configuration management.

use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Longest accepted access-token lifetime: one year.
pub const MAX_ACCESS_TOKEN_EXPIRY_SECS: u64 = 365 * 24 * 60 * 60;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Currency normalization configuration.
    #[serde(default)]
    pub currency: CurrencyConfig,
    /// Approval flow configuration.
    #[serde(default)]
    pub approval: ApprovalConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4000
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT settings as read from configuration sources.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    604_800 // 7 days
}

/// Currency normalization settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrencyConfig {
    /// Company base currency all stored amounts are normalized into.
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    /// Exchange-rate endpoint; the base currency code is appended as a path segment.
    #[serde(default = "default_rates_api_url")]
    pub rates_api_url: String,
    /// Upper bound for a single rate fetch.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    /// Degrade to an identity rate (flagged on the expense) when no rate can be found.
    #[serde(default = "default_fallback_to_identity")]
    pub fallback_to_identity: bool,
    /// Background refresh interval for the base table. Zero disables it.
    #[serde(default)]
    pub refresh_interval_secs: u64,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            base_currency: default_base_currency(),
            rates_api_url: default_rates_api_url(),
            fetch_timeout_secs: default_fetch_timeout(),
            fallback_to_identity: default_fallback_to_identity(),
            refresh_interval_secs: 0,
        }
    }
}

fn default_base_currency() -> String {
    "USD".to_string()
}

fn default_rates_api_url() -> String {
    "https://api.exchangerate-api.com/v4/latest".to_string()
}

fn default_fetch_timeout() -> u64 {
    10
}

fn default_fallback_to_identity() -> bool {
    true
}

/// Approval flow settings.
///
/// The flow is copied onto each expense when it is submitted; editing it
/// only affects expenses submitted afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct ApprovalConfig {
    /// Ordered role names that must approve in sequence.
    #[serde(default = "default_flow")]
    pub flow: Vec<String>,
}

impl Default for ApprovalConfig {
    fn default() -> Self {
        Self {
            flow: default_flow(),
        }
    }
}

fn default_flow() -> Vec<String> {
    vec![
        "manager".to_string(),
        "finance".to_string(),
        "director".to_string(),
    ]
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`,
    /// then `SPENDFLOW__SECTION__KEY` environment variables. List values
    /// such as `SPENDFLOW__APPROVAL__FLOW` are comma separated.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if configuration cannot be loaded or
    /// fails [`validated`](Self::validated).
    pub fn load() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("SPENDFLOW")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("approval.flow")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize::<Self>()?.validated()
    }

    /// Normalizes list values and checks limits the type system cannot.
    ///
    /// Blank approval-flow entries are dropped, so an empty
    /// `SPENDFLOW__APPROVAL__FLOW` yields an empty flow.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the token lifetime is zero or longer
    /// than [`MAX_ACCESS_TOKEN_EXPIRY_SECS`].
    pub fn validated(mut self) -> AppResult<Self> {
        self.approval.flow = self
            .approval
            .flow
            .iter()
            .map(|role| role.trim())
            .filter(|role| !role.is_empty())
            .map(str::to_string)
            .collect();

        let expiry = self.jwt.access_token_expiry_secs;
        if expiry == 0 || expiry > MAX_ACCESS_TOKEN_EXPIRY_SECS {
            return Err(AppError::Config(format!(
                "jwt.access_token_expiry_secs must be between 1 and {MAX_ACCESS_TOKEN_EXPIRY_SECS}, got {expiry}"
            )));
        }
        Ok(self)
    }
}
