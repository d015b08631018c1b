use crate::core::{
    errors::ExchangeError,
    types::{ApiResponse, BuyOptions, ChartPeriod},
};
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Public market data, no authentication
#[async_trait]
pub trait MarketDataSource {
    async fn return_ticker(&self) -> Result<ApiResponse, ExchangeError>;

    async fn return_24h_volume(&self) -> Result<ApiResponse, ExchangeError>;

    async fn return_order_book(&self, pair: &str, depth: u32)
        -> Result<ApiResponse, ExchangeError>;

    /// Bounds are unix seconds; `None` or 0 leaves the bound out
    async fn return_public_trade_history(
        &self,
        pair: &str,
        start: Option<u64>,
        end: Option<u64>,
    ) -> Result<ApiResponse, ExchangeError>;

    async fn return_chart_data(
        &self,
        pair: &str,
        start: u64,
        end: u64,
        period: ChartPeriod,
    ) -> Result<ApiResponse, ExchangeError>;

    async fn return_loan_orders(&self, currency: &str) -> Result<ApiResponse, ExchangeError>;

    async fn return_currencies(&self) -> Result<ApiResponse, ExchangeError>;

    /// Lowest ask of the book, zero when the book is empty or unreadable
    async fn first_sell_price(&self, pair: &str) -> Result<Decimal, ExchangeError>;
}

/// Signed account queries
#[async_trait]
pub trait AccountInfo {
    async fn return_balances(&self) -> Result<ApiResponse, ExchangeError>;
    async fn return_complete_balances(&self) -> Result<ApiResponse, ExchangeError>;
    async fn return_deposit_addresses(&self) -> Result<ApiResponse, ExchangeError>;
    async fn return_open_orders(&self, pair: &str) -> Result<ApiResponse, ExchangeError>;
    async fn return_trade_history(&self, pair: &str) -> Result<ApiResponse, ExchangeError>;
    async fn return_order_trades(&self, order_number: &str) -> Result<ApiResponse, ExchangeError>;
    async fn return_order_status(&self, order_number: &str) -> Result<ApiResponse, ExchangeError>;
    async fn return_fee_info(&self) -> Result<ApiResponse, ExchangeError>;
    async fn return_available_account_balances(&self) -> Result<ApiResponse, ExchangeError>;
    async fn return_tradable_balances(&self) -> Result<ApiResponse, ExchangeError>;

    /// Maker fee plus taker fee
    async fn common_commission(&self) -> Result<Decimal, ExchangeError>;
}

/// Signed order mutations
#[async_trait]
pub trait OrderPlacer {
    async fn buy(
        &self,
        pair: &str,
        rate: Decimal,
        amount: Decimal,
        options: BuyOptions,
    ) -> Result<ApiResponse, ExchangeError>;

    async fn sell(
        &self,
        pair: &str,
        rate: Decimal,
        amount: Decimal,
    ) -> Result<ApiResponse, ExchangeError>;

    async fn cancel_order(&self, order_number: &str) -> Result<ApiResponse, ExchangeError>;

    async fn move_order(
        &self,
        order_number: &str,
        rate: Decimal,
    ) -> Result<ApiResponse, ExchangeError>;
}

/// One streaming connection per channel id
#[async_trait]
pub trait ChannelSubscriber {
    /// Shared handle to a registered connection
    type Handle: Send;

    async fn connect_channel(&self, channel_id: u64) -> Result<Self::Handle, ExchangeError>;

    async fn subscribe_public(&self, channel_id: u64) -> Result<Self::Handle, ExchangeError>;

    /// Requires credentials; the subscribe frame carries key, payload and sign
    async fn subscribe_private(&self, channel_id: u64) -> Result<Self::Handle, ExchangeError>;

    async fn unsubscribe(&self, channel_id: u64) -> Result<(), ExchangeError>;

    async fn close_channel(&self, channel_id: u64) -> Result<(), ExchangeError>;

    async fn close_all(&self) -> Result<(), ExchangeError>;
}

// Composite trait for callers that need the whole REST surface
#[async_trait]
pub trait ExchangeConnector: MarketDataSource + AccountInfo + OrderPlacer {}
