use std::sync::Arc;
use tokio::sync::RwLock;

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Deserialize;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Payment-intent client for the card processor's REST API.
///
/// Real mode posts to `{api_base}/v1/payment_intents` with the secret key as a
/// bearer token. Mock mode (empty or `"mock"` key) fabricates intents locally
/// and remembers every request for inspection.
pub struct PaymentService {
    /// HTTP client, absent in mock mode
    client: Option<reqwest::Client>,
    /// Processor secret key
    secret_key: String,
    /// Processor API base URL
    api_base: String,
    /// ISO currency code sent with every intent
    currency: String,
    /// Mock mode for offline testing
    mock_mode: bool,
    /// Intents created in mock mode
    mock_intents: Arc<RwLock<Vec<PaymentIntent>>>,
}

/// A created payment intent
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
    pub amount: i64,
    pub currency: String,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorBody {
    error: GatewayErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorDetail {
    message: Option<String>,
}

impl PaymentService {
    /// Initialize the payment service from configuration
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let secret_key = config.payment.secret_key.clone();
        let mock_mode = secret_key.is_empty() || secret_key == "mock";

        if mock_mode {
            tracing::warn!("Payment service running in MOCK MODE - no real charges");
            return Ok(Self::mock(&config.payment.currency));
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("globalspeak/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client: Some(client),
            secret_key,
            api_base: config.payment.api_base.trim_end_matches('/').to_string(),
            currency: config.payment.currency.to_lowercase(),
            mock_mode: false,
            mock_intents: Arc::new(RwLock::new(Vec::new())),
        })
    }

    /// Offline service that never contacts the processor
    pub fn mock(currency: &str) -> Self {
        Self {
            client: None,
            secret_key: String::new(),
            api_base: "mock".to_string(),
            currency: currency.to_lowercase(),
            mock_mode: true,
            mock_intents: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn is_mock_mode(&self) -> bool {
        self.mock_mode
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Create a payment intent for `amount` minor units with automatic payment methods
    pub async fn create_intent(&self, amount: i64) -> AppResult<PaymentIntent> {
        if amount <= 0 {
            return Err(AppError::InvalidPrice);
        }

        if self.mock_mode {
            return self.mock_create_intent(amount).await;
        }

        let client = self
            .client
            .as_ref()
            .ok_or_else(|| AppError::Internal("Payment client not initialized".to_string()))?;

        let amount_param = amount.to_string();
        let params = [
            ("amount", amount_param.as_str()),
            ("currency", self.currency.as_str()),
            ("automatic_payment_methods[enabled]", "true"),
        ];

        let response = client
            .post(format!("{}/v1/payment_intents", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::PaymentGateway(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<GatewayErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error.message)
                .unwrap_or_else(|| "no error message".to_string());
            return Err(AppError::PaymentGateway(format!("{}: {}", status, message)));
        }

        let intent: PaymentIntent = response
            .json()
            .await
            .map_err(|e| AppError::PaymentGateway(format!("Malformed intent: {}", e)))?;

        tracing::info!(
            "Created payment intent {} for {} {}",
            intent.id,
            intent.amount,
            intent.currency
        );

        Ok(intent)
    }

    /// Intents created so far in mock mode
    pub async fn mock_intents(&self) -> Vec<PaymentIntent> {
        self.mock_intents.read().await.clone()
    }

    // Mock implementations

    async fn mock_create_intent(&self, amount: i64) -> AppResult<PaymentIntent> {
        let id = format!("pi_mock_{}", random_token(24));
        let intent = PaymentIntent {
            client_secret: format!("{}_secret_{}", id, random_token(24)),
            id,
            amount,
            currency: self.currency.clone(),
        };

        self.mock_intents.write().await.push(intent.clone());

        tracing::debug!("Mock payment intent {} for {}", intent.id, amount);
        Ok(intent)
    }
}

fn random_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_selects_mock_mode() {
        let service = PaymentService::new(&Config::default()).unwrap();
        assert!(service.is_mock_mode());
        assert_eq!(service.currency(), "usd");
    }

    #[test]
    fn configured_key_selects_real_mode() {
        let mut config = Config::default();
        config.payment.secret_key = "sk_test_123".to_string();
        config.payment.api_base = "https://api.example.com/".to_string();
        let service = PaymentService::new(&config).unwrap();
        assert!(!service.is_mock_mode());
        assert_eq!(service.api_base, "https://api.example.com");
    }

    #[test]
    fn mock_intent_records_amount_and_currency() {
        let service = PaymentService::mock("USD");
        let intent = tokio_test::block_on(service.create_intent(2500)).unwrap();

        assert_eq!(intent.amount, 2500);
        assert_eq!(intent.currency, "usd");
        assert!(intent.client_secret.starts_with(&format!("{}_secret_", intent.id)));
        assert_eq!(tokio_test::block_on(service.mock_intents()), vec![intent]);
    }

    #[test]
    fn non_positive_amounts_never_reach_the_gateway() {
        let service = PaymentService::mock("usd");
        assert!(matches!(
            tokio_test::block_on(service.create_intent(0)),
            Err(AppError::InvalidPrice)
        ));
        assert!(tokio_test::block_on(service.mock_intents()).is_empty());
    }
}
