use crate::core::config::ExchangeConfig;
use crate::core::errors::ExchangeError;
use crate::core::kernel::{ReqwestRest, RestClientBuilder, RestClientConfig, TungsteniteWs, WsConfig};
use crate::exchanges::poloniex::{
    codec::PoloniexCodec,
    connector::PoloniexConnector,
    signer::{Credentials, PoloniexSigner},
};
use std::sync::Arc;
use tracing::debug;

/// Connector wired to reqwest and tokio-tungstenite
pub type LivePoloniexConnector = PoloniexConnector<ReqwestRest, TungsteniteWs<PoloniexCodec>>;

/// Fluent builder for Poloniex connectors
pub struct PoloniexBuilder {
    config: ExchangeConfig,
    ws_config: WsConfig,
    user_agent: Option<String>,
}

impl Default for PoloniexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PoloniexBuilder {
    /// Read-only configuration against production URLs
    pub fn new() -> Self {
        Self {
            config: ExchangeConfig::read_only(),
            ws_config: WsConfig::default(),
            user_agent: None,
        }
    }

    pub fn with_config(mut self, config: ExchangeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_credentials(mut self, api_key: String, secret_key: String) -> Self {
        let previous = std::mem::replace(&mut self.config, ExchangeConfig::new(api_key, secret_key));
        self.config = self.config.timeout(previous.timeout_seconds);
        if let Some(base_url) = previous.base_url {
            self.config = self.config.base_url(base_url);
        }
        if let Some(ws_url) = previous.ws_url {
            self.config = self.config.ws_url(ws_url);
        }
        self
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.config = self.config.base_url(base_url);
        self
    }

    pub fn with_ws_url(mut self, ws_url: String) -> Self {
        self.config = self.config.ws_url(ws_url);
        self
    }

    /// REST request timeout in seconds
    pub fn with_rest_timeout(mut self, timeout_seconds: u64) -> Self {
        self.config = self.config.timeout(timeout_seconds);
        self
    }

    pub fn with_ws_connect_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.ws_config.connect_timeout_ms = timeout_ms;
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = Some(user_agent);
        self
    }

    pub fn build(self) -> Result<LivePoloniexConnector, ExchangeError> {
        let signer = Arc::new(PoloniexSigner::new(Credentials::from(&self.config)));

        let mut rest_config = RestClientConfig::new(self.config.rest_url(), "poloniex".to_string())
            .with_timeout(self.config.timeout_seconds);
        if let Some(user_agent) = self.user_agent {
            rest_config = rest_config.with_user_agent(user_agent);
        }

        // Always attached; it refuses to sign until credentials are present
        let rest = RestClientBuilder::new(rest_config)
            .with_signer(signer.clone())
            .build()?;

        let ws_url = self.config.websocket_url();
        let ws_config = self.ws_config;
        debug!(
            rest_url = %self.config.rest_url(),
            ws_url = %ws_url,
            authenticated = self.config.has_credentials(),
            "Building Poloniex connector"
        );

        let factory = move || {
            TungsteniteWs::new(ws_url.clone(), "poloniex".to_string(), PoloniexCodec::new())
                .with_config(ws_config.clone())
        };

        Ok(PoloniexConnector::new(rest, factory, signer))
    }
}

/// Build a connector from a configuration
pub fn build_connector(config: ExchangeConfig) -> Result<LivePoloniexConnector, ExchangeError> {
    PoloniexBuilder::new().with_config(config).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_connector_without_credentials() {
        let connector = build_connector(ExchangeConfig::read_only()).unwrap();
        assert!(!connector.has_credentials());
        assert_eq!(connector.public_key(), "");
    }

    #[test]
    fn test_build_connector_with_credentials() {
        let connector = PoloniexBuilder::new()
            .with_base_url("http://localhost:9999".to_string())
            .with_credentials("test_key".to_string(), "test_secret".to_string())
            .with_rest_timeout(5)
            .build()
            .unwrap();

        assert!(connector.has_credentials());
        assert_eq!(connector.public_key(), "test_key");
    }

    #[test]
    fn test_with_credentials_keeps_urls() {
        let builder = PoloniexBuilder::new()
            .with_ws_url("ws://127.0.0.1:1".to_string())
            .with_rest_timeout(7)
            .with_credentials("k".to_string(), "s".to_string());

        assert_eq!(builder.config.websocket_url(), "ws://127.0.0.1:1");
        assert_eq!(builder.config.timeout_seconds, 7);
    }

    #[test]
    fn test_reset_credentials() {
        let connector = build_connector(ExchangeConfig::new(
            "test_key".to_string(),
            "test_secret".to_string(),
        ))
        .unwrap();

        connector.reset_credentials();
        assert!(!connector.has_credentials());
    }
}
