use crate::core::{
    errors::ExchangeError,
    kernel::RestClient,
    traits::AccountInfo,
    types::{ApiResponse, CommandPayload},
};
use crate::exchanges::poloniex::{rest::PoloniexRest, signer::PoloniexSigner, types::FeeInfo};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::instrument;

/// Signed account queries
pub struct Account<R: RestClient> {
    rest: PoloniexRest<R>,
    signer: Arc<PoloniexSigner>,
}

impl<R: RestClient + Clone> Account<R> {
    pub fn new(rest: &R, signer: Arc<PoloniexSigner>) -> Self {
        Self {
            rest: PoloniexRest::new(rest.clone()),
            signer,
        }
    }
}

impl<R: RestClient> Account<R> {
    async fn private(&self, command: &str) -> Result<ApiResponse, ExchangeError> {
        self.private_with(CommandPayload::new(command)).await
    }

    /// Appends the nonce last, after the command-specific fields
    async fn private_with(&self, payload: CommandPayload) -> Result<ApiResponse, ExchangeError> {
        let payload = payload.with("nonce", self.signer.next_nonce());
        self.rest.private_request(&payload).await
    }
}

#[async_trait]
impl<R: RestClient> AccountInfo for Account<R> {
    #[instrument(skip(self), fields(exchange = "poloniex"))]
    async fn return_balances(&self) -> Result<ApiResponse, ExchangeError> {
        self.private("returnBalances").await
    }

    #[instrument(skip(self), fields(exchange = "poloniex"))]
    async fn return_complete_balances(&self) -> Result<ApiResponse, ExchangeError> {
        self.private("returnCompleteBalances").await
    }

    #[instrument(skip(self), fields(exchange = "poloniex"))]
    async fn return_deposit_addresses(&self) -> Result<ApiResponse, ExchangeError> {
        self.private("returnDepositAddresses").await
    }

    #[instrument(skip(self), fields(exchange = "poloniex"))]
    async fn return_open_orders(&self, pair: &str) -> Result<ApiResponse, ExchangeError> {
        self.private_with(CommandPayload::new("returnOpenOrders").with("currencyPair", pair))
            .await
    }

    #[instrument(skip(self), fields(exchange = "poloniex"))]
    async fn return_trade_history(&self, pair: &str) -> Result<ApiResponse, ExchangeError> {
        self.private_with(CommandPayload::new("returnTradeHistory").with("currencyPair", pair))
            .await
    }

    #[instrument(skip(self), fields(exchange = "poloniex"))]
    async fn return_order_trades(&self, order_number: &str) -> Result<ApiResponse, ExchangeError> {
        self.private_with(CommandPayload::new("returnOrderTrades").with("orderNumber", order_number))
            .await
    }

    #[instrument(skip(self), fields(exchange = "poloniex"))]
    async fn return_order_status(&self, order_number: &str) -> Result<ApiResponse, ExchangeError> {
        self.private_with(CommandPayload::new("returnOrderStatus").with("orderNumber", order_number))
            .await
    }

    #[instrument(skip(self), fields(exchange = "poloniex"))]
    async fn return_fee_info(&self) -> Result<ApiResponse, ExchangeError> {
        self.private("returnFeeInfo").await
    }

    #[instrument(skip(self), fields(exchange = "poloniex"))]
    async fn return_available_account_balances(&self) -> Result<ApiResponse, ExchangeError> {
        self.private("returnAvailableAccountBalances").await
    }

    #[instrument(skip(self), fields(exchange = "poloniex"))]
    async fn return_tradable_balances(&self) -> Result<ApiResponse, ExchangeError> {
        self.private("returnTradableBalances").await
    }

    #[instrument(skip(self), fields(exchange = "poloniex"))]
    async fn common_commission(&self) -> Result<Decimal, ExchangeError> {
        let response = self.return_fee_info().await?;
        Ok(FeeInfo::from_value(&response.value()?)?.common_commission())
    }
}
