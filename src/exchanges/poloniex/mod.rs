pub mod channels;
pub mod codec;
pub mod signer;
pub mod types;

pub mod builder;
pub mod connector;
pub mod rest;

// Re-export main components
pub use builder::{build_connector, LivePoloniexConnector, PoloniexBuilder};
pub use channels::{ChannelHandle, ChannelRegistry, ChannelState};
pub use codec::{channels as channel_ids, ChannelCommand, PoloniexCodec, PoloniexMessage};
pub use connector::{
    Account, MarketData, PoloniexConnector, Streaming, Trading, DEFAULT_ORDER_BOOK_DEPTH,
};
pub use rest::PoloniexRest;
pub use signer::{ChannelAuth, Credentials, PoloniexSigner};
pub use types::{CurrencyInfo, CurrencyTable, FeeInfo};
