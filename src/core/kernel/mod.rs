//! Transport kernel: exchange-agnostic REST and WebSocket plumbing
//!
//! The kernel holds transport logic and generic interfaces only. Exchange
//! modules plug in their own [`Signer`] and [`WsCodec`] implementations.
//!
//! # Components
//!
//! - `RestClient` / `ReqwestRest`: HTTP requests returning raw [`ApiResponse`]s
//! - `Signer`: turns the exact request bytes into authentication headers
//! - `WsSession` / `TungsteniteWs`: one WebSocket connection
//! - `WsCodec`: exchange-specific frame encoding/decoding
//!
//! ## Basic REST-Only Client
//! ```rust,no_run
//! use poloniex_connector::core::kernel::*;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let rest_config = RestClientConfig::new("https://poloniex.com".to_string(), "poloniex".to_string());
//! let rest = RestClientBuilder::new(rest_config).build()?;
//!
//! let query = vec![("command".to_string(), "returnTicker".to_string())];
//! let response = rest.get("/public", &query, false).await?;
//! println!("{} {}", response.status, response.body);
//! # Ok(())
//! # }
//! ```
//!
//! [`ApiResponse`]: crate::core::types::ApiResponse
pub mod codec;
pub mod rest;
pub mod signer;
pub mod ws;

// Re-export key types for convenience
pub use codec::WsCodec;
pub use rest::{ReqwestRest, RestClient, RestClientBuilder, RestClientConfig};
pub use signer::{nonce, sign, NonceGenerator, SignatureResult, Signer};
pub use ws::{TungsteniteWs, WsConfig, WsSession};
