use crate::core::errors::ExchangeError;
use crate::core::traits::{
    AccountInfo, ChannelSubscriber, ExchangeConnector, MarketDataSource, OrderPlacer,
};
use crate::core::types::{ApiResponse, BuyOptions, ChartPeriod};
use crate::core::{kernel::RestClient, kernel::WsSession};
use crate::exchanges::poloniex::{
    channels::ChannelHandle,
    codec::PoloniexCodec,
    signer::{Credentials, PoloniexSigner},
    types::{CurrencyInfo, CurrencyTable},
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;

pub mod account;
pub mod market_data;
pub mod streaming;
pub mod trading;

pub use account::Account;
pub use market_data::{MarketData, DEFAULT_ORDER_BOOK_DEPTH};
pub use streaming::Streaming;
pub use trading::{buy_payload, Trading};

/// Poloniex connector that composes all sub-trait implementations.
///
/// The REST parts and the streaming part share one signer, so a credential
/// reset applies to both.
pub struct PoloniexConnector<R: RestClient, W> {
    pub market: MarketData<R>,
    pub account: Account<R>,
    pub trading: Trading<R>,
    pub streaming: Streaming<W>,
    signer: Arc<PoloniexSigner>,
}

impl<R, W> PoloniexConnector<R, W>
where
    R: RestClient + Clone,
    W: WsSession<PoloniexCodec>,
{
    /// `signer` must be the one the REST client signs with
    pub fn new(
        rest: R,
        ws_factory: impl Fn() -> W + Send + Sync + 'static,
        signer: Arc<PoloniexSigner>,
    ) -> Self {
        Self {
            market: MarketData::new(&rest),
            account: Account::new(&rest, Arc::clone(&signer)),
            trading: Trading::new(&rest, Arc::clone(&signer)),
            streaming: Streaming::new(ws_factory, Arc::clone(&signer)),
            signer,
        }
    }
}

impl<R: RestClient, W: WsSession<PoloniexCodec>> PoloniexConnector<R, W> {
    pub async fn init_currencies(&self) -> Result<usize, ExchangeError> {
        self.market.init_currencies().await
    }

    pub fn currencies(&self) -> CurrencyTable {
        self.market.currencies()
    }

    pub fn currency(&self, id: u64) -> Option<CurrencyInfo> {
        self.market.currency(id)
    }

    /// `returnOrderBook` at the default depth
    pub async fn order_book(&self, pair: &str) -> Result<ApiResponse, ExchangeError> {
        self.market
            .return_order_book(pair, DEFAULT_ORDER_BOOK_DEPTH)
            .await
    }

    pub async fn get_connection(&self, channel_id: u64) -> Option<ChannelHandle<W>> {
        self.streaming.get_connection(channel_id).await
    }

    pub async fn channel_ids(&self) -> Vec<u64> {
        self.streaming.channel_ids().await
    }

    pub fn public_key(&self) -> String {
        self.signer.credentials().public_key().to_string()
    }

    pub fn has_credentials(&self) -> bool {
        self.signer.has_credentials()
    }

    pub fn set_credentials(&self, credentials: Credentials) {
        self.signer.set_credentials(credentials);
    }

    /// Drop to read-only; later private calls fail with `AuthenticationRequired`
    pub fn reset_credentials(&self) {
        self.signer.reset();
    }

    pub fn signer(&self) -> &Arc<PoloniexSigner> {
        &self.signer
    }
}

#[async_trait]
impl<R: RestClient, W: WsSession<PoloniexCodec>> MarketDataSource for PoloniexConnector<R, W> {
    async fn return_ticker(&self) -> Result<ApiResponse, ExchangeError> {
        self.market.return_ticker().await
    }

    async fn return_24h_volume(&self) -> Result<ApiResponse, ExchangeError> {
        self.market.return_24h_volume().await
    }

    async fn return_order_book(
        &self,
        pair: &str,
        depth: u32,
    ) -> Result<ApiResponse, ExchangeError> {
        self.market.return_order_book(pair, depth).await
    }

    async fn return_public_trade_history(
        &self,
        pair: &str,
        start: Option<u64>,
        end: Option<u64>,
    ) -> Result<ApiResponse, ExchangeError> {
        self.market
            .return_public_trade_history(pair, start, end)
            .await
    }

    async fn return_chart_data(
        &self,
        pair: &str,
        start: u64,
        end: u64,
        period: ChartPeriod,
    ) -> Result<ApiResponse, ExchangeError> {
        self.market
            .return_chart_data(pair, start, end, period)
            .await
    }

    async fn return_loan_orders(&self, currency: &str) -> Result<ApiResponse, ExchangeError> {
        self.market.return_loan_orders(currency).await
    }

    async fn return_currencies(&self) -> Result<ApiResponse, ExchangeError> {
        self.market.return_currencies().await
    }

    async fn first_sell_price(&self, pair: &str) -> Result<Decimal, ExchangeError> {
        self.market.first_sell_price(pair).await
    }
}

#[async_trait]
impl<R: RestClient, W: WsSession<PoloniexCodec>> AccountInfo for PoloniexConnector<R, W> {
    async fn return_balances(&self) -> Result<ApiResponse, ExchangeError> {
        self.account.return_balances().await
    }

    async fn return_complete_balances(&self) -> Result<ApiResponse, ExchangeError> {
        self.account.return_complete_balances().await
    }

    async fn return_deposit_addresses(&self) -> Result<ApiResponse, ExchangeError> {
        self.account.return_deposit_addresses().await
    }

    async fn return_open_orders(&self, pair: &str) -> Result<ApiResponse, ExchangeError> {
        self.account.return_open_orders(pair).await
    }

    async fn return_trade_history(&self, pair: &str) -> Result<ApiResponse, ExchangeError> {
        self.account.return_trade_history(pair).await
    }

    async fn return_order_trades(&self, order_number: &str) -> Result<ApiResponse, ExchangeError> {
        self.account.return_order_trades(order_number).await
    }

    async fn return_order_status(&self, order_number: &str) -> Result<ApiResponse, ExchangeError> {
        self.account.return_order_status(order_number).await
    }

    async fn return_fee_info(&self) -> Result<ApiResponse, ExchangeError> {
        self.account.return_fee_info().await
    }

    async fn return_available_account_balances(&self) -> Result<ApiResponse, ExchangeError> {
        self.account.return_available_account_balances().await
    }

    async fn return_tradable_balances(&self) -> Result<ApiResponse, ExchangeError> {
        self.account.return_tradable_balances().await
    }

    async fn common_commission(&self) -> Result<Decimal, ExchangeError> {
        self.account.common_commission().await
    }
}

#[async_trait]
impl<R: RestClient, W: WsSession<PoloniexCodec>> OrderPlacer for PoloniexConnector<R, W> {
    async fn buy(
        &self,
        pair: &str,
        rate: Decimal,
        amount: Decimal,
        options: BuyOptions,
    ) -> Result<ApiResponse, ExchangeError> {
        self.trading.buy(pair, rate, amount, options).await
    }

    async fn sell(
        &self,
        pair: &str,
        rate: Decimal,
        amount: Decimal,
    ) -> Result<ApiResponse, ExchangeError> {
        self.trading.sell(pair, rate, amount).await
    }

    async fn cancel_order(&self, order_number: &str) -> Result<ApiResponse, ExchangeError> {
        self.trading.cancel_order(order_number).await
    }

    async fn move_order(
        &self,
        order_number: &str,
        rate: Decimal,
    ) -> Result<ApiResponse, ExchangeError> {
        self.trading.move_order(order_number, rate).await
    }
}

#[async_trait]
impl<R: RestClient, W: WsSession<PoloniexCodec>> ChannelSubscriber for PoloniexConnector<R, W> {
    type Handle = ChannelHandle<W>;

    async fn connect_channel(&self, channel_id: u64) -> Result<ChannelHandle<W>, ExchangeError> {
        self.streaming.connect_channel(channel_id).await
    }

    async fn subscribe_public(&self, channel_id: u64) -> Result<ChannelHandle<W>, ExchangeError> {
        self.streaming.subscribe_public(channel_id).await
    }

    async fn subscribe_private(&self, channel_id: u64) -> Result<ChannelHandle<W>, ExchangeError> {
        self.streaming.subscribe_private(channel_id).await
    }

    async fn unsubscribe(&self, channel_id: u64) -> Result<(), ExchangeError> {
        self.streaming.unsubscribe(channel_id).await
    }

    async fn close_channel(&self, channel_id: u64) -> Result<(), ExchangeError> {
        self.streaming.close_channel(channel_id).await
    }

    async fn close_all(&self) -> Result<(), ExchangeError> {
        self.streaming.close_all().await
    }
}

impl<R: RestClient, W: WsSession<PoloniexCodec>> ExchangeConnector for PoloniexConnector<R, W> {}
