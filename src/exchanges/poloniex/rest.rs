use crate::core::errors::ExchangeError;
use crate::core::kernel::RestClient;
use crate::core::types::{ApiResponse, CommandPayload};
use tracing::instrument;

pub const PUBLIC_ENDPOINT: &str = "/public";
pub const TRADING_ENDPOINT: &str = "/tradingApi";

/// Thin wrapper around `RestClient` for the two Poloniex endpoints
#[derive(Debug, Clone)]
pub struct PoloniexRest<R: RestClient> {
    client: R,
}

impl<R: RestClient> PoloniexRest<R> {
    pub fn new(client: R) -> Self {
        Self { client }
    }

    pub fn inner(&self) -> &R {
        &self.client
    }

    /// GET `/public` with the payload as query parameters
    #[instrument(skip(self, payload), fields(exchange = "poloniex", command = ?payload.command()))]
    pub async fn public_request(
        &self,
        payload: &CommandPayload,
    ) -> Result<ApiResponse, ExchangeError> {
        if !payload.contains_key("command") {
            return Err(ExchangeError::InvalidParameters(
                "Public payload is missing 'command'".to_string(),
            ));
        }

        self.client
            .get(PUBLIC_ENDPOINT, &payload.to_pairs(), false)
            .await
    }

    /// Signed POST to `/tradingApi`; the form body is signed exactly as sent
    #[instrument(skip(self, payload), fields(exchange = "poloniex", command = ?payload.command()))]
    pub async fn private_request(
        &self,
        payload: &CommandPayload,
    ) -> Result<ApiResponse, ExchangeError> {
        for required in ["command", "nonce"] {
            if !payload.contains_key(required) {
                return Err(ExchangeError::InvalidParameters(format!(
                    "Private payload is missing '{}'",
                    required
                )));
            }
        }

        self.client
            .post_form(TRADING_ENDPOINT, &payload.encode(), true)
            .await
    }
}
