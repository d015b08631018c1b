use crate::core::errors::ExchangeError;
use hmac::{Hmac, Mac};
use sha2::Sha512;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha512 = Hmac<Sha512>;

/// Result type for signing operations: headers to attach to the request
pub type SignatureResult = Result<HashMap<String, String>, ExchangeError>;

/// Signer trait for request authentication
///
/// Implementations receive the exact bytes that will go on the wire and return
/// the headers that authenticate them.
pub trait Signer: Send + Sync {
    /// Sign a request and return headers
    ///
    /// # Arguments
    /// * `method` - HTTP method (GET, POST, etc.)
    /// * `endpoint` - API endpoint path
    /// * `query_string` - Query string (without leading '?')
    /// * `body` - Raw request body bytes
    fn sign_request(
        &self,
        method: &str,
        endpoint: &str,
        query_string: &str,
        body: &[u8],
    ) -> SignatureResult;
}

/// Hex-encoded HMAC-SHA512 of `body` keyed by `secret`
pub fn sign(secret: &str, body: &str) -> Result<String, ExchangeError> {
    sign_bytes(secret, body.as_bytes())
}

pub fn sign_bytes(secret: &str, body: &[u8]) -> Result<String, ExchangeError> {
    let mut mac = HmacSha512::new_from_slice(secret.as_bytes())
        .map_err(|e| ExchangeError::AuthError(format!("Invalid secret key: {}", e)))?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Milliseconds since the Unix epoch; a clock set before the epoch reads as 0
#[allow(clippy::cast_possible_truncation)]
pub fn nonce() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Clock-based nonce source that never repeats or goes backwards.
///
/// When two calls land in the same millisecond, or the wall clock steps back,
/// the next value is `last + 1`.
#[derive(Debug, Default)]
pub struct NonceGenerator {
    last: AtomicU64,
}

impl NonceGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> u64 {
        let now = nonce();
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(prev + 1);
            match self
                .last
                .compare_exchange_weak(prev, candidate, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return candidate,
                Err(actual) => prev = actual,
            }
        }
    }

    /// Last value handed out, 0 if none yet
    pub fn last(&self) -> u64 {
        self.last.load(Ordering::Acquire)
    }
}
