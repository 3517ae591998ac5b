use serde::Deserialize;

/// Application configuration
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Database URL (SQLite path)
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Maximum pooled connections for file-backed databases
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Payment processor configuration
    #[serde(default)]
    pub payment: PaymentConfig,

    /// User registry configuration
    #[serde(default)]
    pub users: UsersConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PaymentConfig {
    /// Processor secret key; empty or "mock" enables mock mode
    #[serde(default)]
    pub secret_key: String,

    /// Processor API base URL
    #[serde(default = "default_payment_api_base")]
    pub api_base: String,

    /// ISO currency code for payment intents
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            api_base: default_payment_api_base(),
            currency: default_currency(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct UsersConfig {
    /// How `POST /users` treats an email that is already registered
    #[serde(default)]
    pub registration_policy: RegistrationPolicy,
}

/// Registration decision table.
///
/// `Corrected` inserts only unknown emails. `Inverted` reproduces the legacy
/// handler, which answered "user already exist" for unknown emails and
/// inserted a duplicate row for known ones.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationPolicy {
    #[default]
    Corrected,
    Inverted,
}

// Default value functions
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_database_url() -> String {
    "sqlite:data/globalspeak.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_payment_api_base() -> String {
    "https://api.stripe.com".to_string()
}

fn default_currency() -> String {
    "usd".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_url: default_database_url(),
            max_connections: default_max_connections(),
            payment: PaymentConfig::default(),
            users: UsersConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            // Start with defaults
            .set_default("host", default_host())?
            .set_default("port", default_port())?
            .set_default("database_url", default_database_url())?
            .set_default("max_connections", default_max_connections())?
            // Load from config file if exists
            .add_source(config::File::with_name("config").required(false))
            // Override with environment variables (GLOBALSPEAK_ prefix)
            .add_source(
                config::Environment::with_prefix("GLOBALSPEAK")
                    .separator("__")
                    .try_parsing(true),
            )
            // Legacy deployment variables win when present
            .set_override_option("port", std::env::var("PORT").ok())?
            .set_override_option("payment.secret_key", std::env::var("PAYMENT_SK").ok())?
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.database_url.is_empty() {
            anyhow::bail!("database_url is required");
        }
        if self.payment.currency.len() != 3 {
            anyhow::bail!(
                "payment.currency must be a three-letter ISO code, got {:?}",
                self.payment.currency
            );
        }
        if self.max_connections == 0 {
            anyhow::bail!("max_connections must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_select_mock_payments_and_corrected_registration() {
        let config = Config::default();
        assert_eq!(config.port, 3000);
        assert!(config.payment.secret_key.is_empty());
        assert_eq!(config.payment.currency, "usd");
        assert_eq!(config.users.registration_policy, RegistrationPolicy::Corrected);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn registration_policy_parses_lowercase() {
        let users: UsersConfig =
            serde_json::from_str(r#"{"registration_policy":"inverted"}"#).unwrap();
        assert_eq!(users.registration_policy, RegistrationPolicy::Inverted);
    }

    #[test]
    fn rejects_malformed_currency() {
        let mut config = Config::default();
        config.payment.currency = "dollars".to_string();
        assert!(config.validate().is_err());
    }
}
