pub mod core;
pub mod exchanges;

pub use core::{
    config::ExchangeConfig,
    errors::ExchangeError,
    traits::{AccountInfo, ChannelSubscriber, ExchangeConnector, MarketDataSource, OrderPlacer},
    types::*,
};
pub use exchanges::poloniex::{build_connector, PoloniexBuilder, PoloniexConnector};
