use crate::core::config::ExchangeConfig;
use crate::core::errors::ExchangeError;
use crate::core::kernel::{sign, NonceGenerator, SignatureResult, Signer};
use secrecy::{ExposeSecret, Secret};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

pub const KEY_HEADER: &str = "Key";
pub const SIGN_HEADER: &str = "Sign";

/// API key pair. Immutable; replaced wholesale on reset.
#[derive(Debug, Clone)]
pub struct Credentials {
    public_key: Secret<String>,
    private_key: Secret<String>,
}

impl Credentials {
    pub fn new(public_key: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            public_key: Secret::new(public_key.into()),
            private_key: Secret::new(private_key.into()),
        }
    }

    pub fn empty() -> Self {
        Self::new(String::new(), String::new())
    }

    /// Both keys present
    pub fn is_complete(&self) -> bool {
        !self.public_key.expose_secret().is_empty() && !self.private_key.expose_secret().is_empty()
    }

    pub fn public_key(&self) -> &str {
        self.public_key.expose_secret()
    }

    /// Exposes the secret; keep the borrow short
    pub fn private_key(&self) -> &str {
        self.private_key.expose_secret()
    }
}

impl From<&ExchangeConfig> for Credentials {
    fn from(config: &ExchangeConfig) -> Self {
        Self::new(config.api_key(), config.secret_key())
    }
}

/// Fields that authenticate a private channel subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelAuth {
    pub key: String,
    pub payload: String,
    pub sign: String,
}

/// Credential slot plus nonce source for one client instance.
///
/// Each request signs against a snapshot of the credentials, so a concurrent
/// `reset` never mixes keys within one request.
#[derive(Debug)]
pub struct PoloniexSigner {
    credentials: RwLock<Arc<Credentials>>,
    nonces: NonceGenerator,
}

impl PoloniexSigner {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials: RwLock::new(Arc::new(credentials)),
            nonces: NonceGenerator::new(),
        }
    }

    pub fn credentials(&self) -> Arc<Credentials> {
        Arc::clone(
            &self
                .credentials
                .read()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    pub fn set_credentials(&self, credentials: Credentials) {
        *self
            .credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(credentials);
    }

    /// Swap in empty credentials
    pub fn reset(&self) {
        self.set_credentials(Credentials::empty());
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials().is_complete()
    }

    pub fn next_nonce(&self) -> u64 {
        self.nonces.next()
    }

    fn complete_credentials(&self) -> Result<Arc<Credentials>, ExchangeError> {
        let credentials = self.credentials();
        if credentials.is_complete() {
            Ok(credentials)
        } else {
            Err(ExchangeError::AuthenticationRequired)
        }
    }

    /// Build the `key`/`payload`/`sign` triple for a private channel subscribe.
    ///
    /// The signature covers the `payload` string `nonce=<n>`.
    pub fn channel_auth(&self) -> Result<ChannelAuth, ExchangeError> {
        let credentials = self.complete_credentials()?;
        let payload = format!("nonce={}", self.next_nonce());
        let sign = sign(credentials.private_key(), &payload)?;

        Ok(ChannelAuth {
            key: credentials.public_key().to_string(),
            payload,
            sign,
        })
    }
}

impl Signer for PoloniexSigner {
    fn sign_request(
        &self,
        _method: &str,
        _endpoint: &str,
        _query_string: &str,
        body: &[u8],
    ) -> SignatureResult {
        let credentials = self.complete_credentials()?;
        let body = std::str::from_utf8(body).map_err(|e| {
            ExchangeError::InvalidParameters(format!("Request body is not UTF-8: {}", e))
        })?;

        let mut headers = HashMap::new();
        headers.insert(KEY_HEADER.to_string(), credentials.public_key().to_string());
        headers.insert(
            SIGN_HEADER.to_string(),
            sign(credentials.private_key(), body)?,
        );

        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_request_headers() {
        let signer = PoloniexSigner::new(Credentials::new("my-key", "secret"));
        let body = "command=returnBalances&nonce=1609459200000";
        let headers = signer.sign_request("POST", "/tradingApi", "", body.as_bytes()).unwrap();

        assert_eq!(headers.get(KEY_HEADER).map(String::as_str), Some("my-key"));
        assert_eq!(
            headers.get(SIGN_HEADER).map(String::as_str),
            Some("283f0af07805bea1db7e8fa4227bbbf5c3943d26df9419d91c1b625b5fd454ed7453140cc34bbc96bf5d95d20fcaf7f669bfeafac4e83df27968879c729b9e30")
        );
    }

    #[test]
    fn test_empty_credentials_fail_fast() {
        let signer = PoloniexSigner::new(Credentials::new("my-key", ""));
        let result = signer.sign_request("POST", "/tradingApi", "", b"command=returnBalances");
        assert!(matches!(result, Err(ExchangeError::AuthenticationRequired)));
        assert!(matches!(
            signer.channel_auth(),
            Err(ExchangeError::AuthenticationRequired)
        ));
    }

    #[test]
    fn test_reset_swaps_credentials() {
        let signer = PoloniexSigner::new(Credentials::new("my-key", "secret"));
        let before = signer.credentials();
        signer.reset();

        assert!(!signer.has_credentials());
        assert_eq!(signer.credentials().public_key(), "");
        // A snapshot taken before the reset is unaffected
        assert_eq!(before.public_key(), "my-key");
        assert_eq!(before.private_key(), "secret");
    }

    #[test]
    fn test_channel_auth_signs_payload() {
        let signer = PoloniexSigner::new(Credentials::new("my-key", "secret"));
        let auth = signer.channel_auth().unwrap();

        assert_eq!(auth.key, "my-key");
        let nonce: u64 = auth.payload.strip_prefix("nonce=").unwrap().parse().unwrap();
        assert_eq!(nonce, signer.nonces.last());
        assert_eq!(auth.sign, sign("secret", &auth.payload).unwrap());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let credentials = Credentials::new("my-key", "hunter2-private");
        let printed = format!("{:?}", credentials);
        assert!(printed.contains("[REDACTED"));
        assert!(!printed.contains("hunter2"));
        assert!(!printed.contains("my-key"));
    }
}
