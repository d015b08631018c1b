use crate::core::{
    errors::ExchangeError,
    kernel::RestClient,
    traits::MarketDataSource,
    types::{ApiResponse, ChartPeriod, CommandPayload},
};
use crate::exchanges::poloniex::{
    rest::PoloniexRest,
    types::{lowest_ask, parse_currency_table, CurrencyInfo, CurrencyTable},
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::{PoisonError, RwLock};
use tracing::{debug, instrument};

pub const DEFAULT_ORDER_BOOK_DEPTH: u32 = 10;

/// Public market data plus the cached currency table
pub struct MarketData<R: RestClient> {
    rest: PoloniexRest<R>,
    currencies: RwLock<CurrencyTable>,
}

impl<R: RestClient + Clone> MarketData<R> {
    pub fn new(rest: &R) -> Self {
        Self {
            rest: PoloniexRest::new(rest.clone()),
            currencies: RwLock::new(CurrencyTable::new()),
        }
    }
}

impl<R: RestClient> MarketData<R> {
    async fn public(&self, payload: CommandPayload) -> Result<ApiResponse, ExchangeError> {
        self.rest.public_request(&payload).await
    }

    /// Fetch `returnCurrencies` and replace the cached table
    #[instrument(skip(self), fields(exchange = "poloniex"))]
    pub async fn init_currencies(&self) -> Result<usize, ExchangeError> {
        let response = self.return_currencies().await?;
        let table = parse_currency_table(&response.value()?)?;
        let count = table.len();

        *self
            .currencies
            .write()
            .unwrap_or_else(PoisonError::into_inner) = table;

        debug!("Cached {} currencies", count);
        Ok(count)
    }

    /// Snapshot of the cached table; empty until `init_currencies` succeeds
    pub fn currencies(&self) -> CurrencyTable {
        self.currencies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn currency(&self, id: u64) -> Option<CurrencyInfo> {
        self.currencies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }
}

#[async_trait]
impl<R: RestClient> MarketDataSource for MarketData<R> {
    #[instrument(skip(self), fields(exchange = "poloniex"))]
    async fn return_ticker(&self) -> Result<ApiResponse, ExchangeError> {
        self.public(CommandPayload::new("returnTicker")).await
    }

    #[instrument(skip(self), fields(exchange = "poloniex"))]
    async fn return_24h_volume(&self) -> Result<ApiResponse, ExchangeError> {
        self.public(CommandPayload::new("return24hVolume")).await
    }

    #[instrument(skip(self), fields(exchange = "poloniex"))]
    async fn return_order_book(
        &self,
        pair: &str,
        depth: u32,
    ) -> Result<ApiResponse, ExchangeError> {
        self.public(
            CommandPayload::new("returnOrderBook")
                .with("currencyPair", pair)
                .with("depth", depth),
        )
        .await
    }

    #[instrument(skip(self), fields(exchange = "poloniex"))]
    async fn return_public_trade_history(
        &self,
        pair: &str,
        start: Option<u64>,
        end: Option<u64>,
    ) -> Result<ApiResponse, ExchangeError> {
        let mut payload = CommandPayload::new("returnTradeHistory").with("currencyPair", pair);

        if let Some(start) = start.filter(|t| *t > 0) {
            payload.insert("start", start);
        }
        if let Some(end) = end.filter(|t| *t > 0) {
            payload.insert("end", end);
        }

        self.public(payload).await
    }

    #[instrument(skip(self), fields(exchange = "poloniex"))]
    async fn return_chart_data(
        &self,
        pair: &str,
        start: u64,
        end: u64,
        period: ChartPeriod,
    ) -> Result<ApiResponse, ExchangeError> {
        self.public(
            CommandPayload::new("returnChartData")
                .with("currencyPair", pair)
                .with("start", start)
                .with("end", end)
                .with("period", period.as_seconds()),
        )
        .await
    }

    #[instrument(skip(self), fields(exchange = "poloniex"))]
    async fn return_loan_orders(&self, currency: &str) -> Result<ApiResponse, ExchangeError> {
        self.public(CommandPayload::new("returnLoanOrders").with("currency", currency))
            .await
    }

    #[instrument(skip(self), fields(exchange = "poloniex"))]
    async fn return_currencies(&self) -> Result<ApiResponse, ExchangeError> {
        self.public(CommandPayload::new("returnCurrencies")).await
    }

    #[instrument(skip(self), fields(exchange = "poloniex"))]
    async fn first_sell_price(&self, pair: &str) -> Result<Decimal, ExchangeError> {
        let response = self.return_order_book(pair, 1).await?;
        // An unparseable body counts as an empty book
        Ok(response
            .value()
            .map(|book| lowest_ask(&book))
            .unwrap_or(Decimal::ZERO))
    }
}
