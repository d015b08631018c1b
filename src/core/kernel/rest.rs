use crate::core::errors::ExchangeError;
use crate::core::kernel::signer::Signer;
use crate::core::types::ApiResponse;
use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use std::sync::Arc;
use tracing::{instrument, trace, warn};

/// REST client trait for making HTTP requests
///
/// Responses come back as [`ApiResponse`] whatever their status code; only
/// transport failures become errors.
#[async_trait]
pub trait RestClient: Send + Sync {
    /// Make a GET request
    ///
    /// # Arguments
    /// * `endpoint` - The API endpoint path
    /// * `query_params` - Query parameters as key-value pairs
    /// * `authenticated` - Whether to sign the request
    async fn get(
        &self,
        endpoint: &str,
        query_params: &[(String, String)],
        authenticated: bool,
    ) -> Result<ApiResponse, ExchangeError>;

    /// Make a POST request with a form-encoded body
    ///
    /// # Arguments
    /// * `endpoint` - The API endpoint path
    /// * `body` - Already URL-encoded body; signed byte-for-byte when authenticated
    /// * `authenticated` - Whether to sign the request
    async fn post_form(
        &self,
        endpoint: &str,
        body: &str,
        authenticated: bool,
    ) -> Result<ApiResponse, ExchangeError>;
}

/// Configuration for the REST client
#[derive(Clone, Debug)]
pub struct RestClientConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Exchange name for logging and tracing
    pub exchange_name: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string to include in requests
    pub user_agent: String,
}

impl RestClientConfig {
    /// Create a new configuration
    ///
    /// # Arguments
    /// * `base_url` - Base URL for the API
    /// * `exchange_name` - Name of the exchange
    pub fn new(base_url: String, exchange_name: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            exchange_name,
            timeout_seconds: 30,
            user_agent: concat!("poloniex-connector/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Set the user agent string
    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }
}

/// Builder for creating REST client instances
pub struct RestClientBuilder {
    config: RestClientConfig,
    signer: Option<Arc<dyn Signer>>,
}

impl RestClientBuilder {
    /// Create a new builder with the given configuration
    pub fn new(config: RestClientConfig) -> Self {
        Self {
            config,
            signer: None,
        }
    }

    /// Set the signer for authenticated requests
    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Build the REST client
    pub fn build(self) -> Result<ReqwestRest, ExchangeError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(self.config.timeout_seconds))
            .user_agent(&self.config.user_agent)
            .build()
            .map_err(|e| {
                ExchangeError::ConfigurationError(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(ReqwestRest {
            client,
            config: self.config,
            signer: self.signer,
        })
    }
}

/// Implementation of `RestClient` using reqwest
#[derive(Clone)]
pub struct ReqwestRest {
    client: Client,
    config: RestClientConfig,
    signer: Option<Arc<dyn Signer>>,
}

impl std::fmt::Debug for ReqwestRest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestRest")
            .field("config", &self.config)
            .field("has_signer", &self.signer.is_some())
            .finish_non_exhaustive()
    }
}

impl ReqwestRest {
    pub fn config(&self) -> &RestClientConfig {
        &self.config
    }

    /// Build the full URL for an endpoint
    fn build_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.base_url, endpoint)
    }

    fn map_send_error(e: reqwest::Error) -> ExchangeError {
        if e.is_timeout() {
            ExchangeError::ConnectionTimeout(format!("Request timed out: {}", e))
        } else {
            ExchangeError::NetworkError(format!("Request failed: {}", e))
        }
    }

    /// Read the body without judging the status
    #[instrument(skip(self, response), fields(exchange = %self.config.exchange_name, status = %response.status()))]
    async fn handle_response(&self, response: Response) -> Result<ApiResponse, ExchangeError> {
        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ExchangeError::NetworkError(format!("Failed to read response body: {}", e))
        })?;

        trace!("Response body: {}", body);

        if !status.is_success() {
            warn!("Non-success status {} returned to caller", status);
        }

        Ok(ApiResponse::new(status.as_u16(), body))
    }

    #[instrument(skip(self, query_params, body), fields(exchange = %self.config.exchange_name, method = %method, endpoint = %endpoint))]
    async fn make_request(
        &self,
        method: Method,
        endpoint: &str,
        query_params: &[(String, String)],
        body: Option<&str>,
        authenticated: bool,
    ) -> Result<ApiResponse, ExchangeError> {
        let url = self.build_url(endpoint);
        let mut request = self.client.request(method.clone(), &url);

        if !query_params.is_empty() {
            request = request.query(query_params);
        }

        if authenticated {
            let signer = self.signer.as_ref().ok_or_else(|| {
                ExchangeError::AuthError(
                    "Authentication required but no signer provided".to_string(),
                )
            })?;

            let query_string = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(query_params)
                .finish();
            let headers = signer.sign_request(
                method.as_str(),
                endpoint,
                &query_string,
                body.unwrap_or_default().as_bytes(),
            )?;

            for (key, value) in headers {
                request = request.header(key, value);
            }
        }

        if let Some(body) = body {
            request = request
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(body.to_string());
        }

        let response = request.send().await.map_err(Self::map_send_error)?;

        self.handle_response(response).await
    }
}

#[async_trait]
impl RestClient for ReqwestRest {
    #[instrument(skip(self, query_params), fields(exchange = %self.config.exchange_name, endpoint = %endpoint, param_count = query_params.len()))]
    async fn get(
        &self,
        endpoint: &str,
        query_params: &[(String, String)],
        authenticated: bool,
    ) -> Result<ApiResponse, ExchangeError> {
        self.make_request(Method::GET, endpoint, query_params, None, authenticated)
            .await
    }

    #[instrument(skip(self, body), fields(exchange = %self.config.exchange_name, endpoint = %endpoint))]
    async fn post_form(
        &self,
        endpoint: &str,
        body: &str,
        authenticated: bool,
    ) -> Result<ApiResponse, ExchangeError> {
        self.make_request(Method::POST, endpoint, &[], Some(body), authenticated)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_trims_trailing_slash() {
        let config = RestClientConfig::new("https://poloniex.com/".to_string(), "poloniex".to_string());
        assert_eq!(config.base_url, "https://poloniex.com");
        assert!(config.user_agent.starts_with("poloniex-connector/"));
    }

    #[tokio::test]
    async fn test_authenticated_without_signer_fails() {
        let rest = RestClientBuilder::new(RestClientConfig::new(
            "http://127.0.0.1:9".to_string(),
            "poloniex".to_string(),
        ))
        .build()
        .unwrap();

        let result = rest.post_form("/tradingApi", "command=returnBalances", true).await;
        assert!(matches!(result, Err(ExchangeError::AuthError(_))));
    }
}
