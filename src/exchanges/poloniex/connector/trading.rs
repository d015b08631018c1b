use crate::core::{
    errors::ExchangeError,
    kernel::RestClient,
    traits::OrderPlacer,
    types::{ApiResponse, BuyOptions, CommandPayload},
};
use crate::exchanges::poloniex::{rest::PoloniexRest, signer::PoloniexSigner};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::instrument;

/// Order placement and maintenance
pub struct Trading<R: RestClient> {
    rest: PoloniexRest<R>,
    signer: Arc<PoloniexSigner>,
}

impl<R: RestClient + Clone> Trading<R> {
    pub fn new(rest: &R, signer: Arc<PoloniexSigner>) -> Self {
        Self {
            rest: PoloniexRest::new(rest.clone()),
            signer,
        }
    }
}

/// `{command, currencyPair, rate, amount, nonce}` plus each set flag as `1`
pub fn buy_payload(
    pair: &str,
    rate: Decimal,
    amount: Decimal,
    options: BuyOptions,
    nonce: u64,
) -> CommandPayload {
    let mut payload = CommandPayload::new("buy")
        .with("currencyPair", pair)
        .with("rate", rate)
        .with("amount", amount)
        .with("nonce", nonce);

    if options.fill_or_kill {
        payload.insert("fillOrKill", 1_u64);
    }
    if options.immediate_or_cancel {
        payload.insert("immediateOrCancel", 1_u64);
    }
    if options.post_only {
        payload.insert("postOnly", 1_u64);
    }

    payload
}

#[async_trait]
impl<R: RestClient> OrderPlacer for Trading<R> {
    #[instrument(skip(self), fields(exchange = "poloniex"))]
    async fn buy(
        &self,
        pair: &str,
        rate: Decimal,
        amount: Decimal,
        options: BuyOptions,
    ) -> Result<ApiResponse, ExchangeError> {
        let payload = buy_payload(pair, rate, amount, options, self.signer.next_nonce());
        self.rest.private_request(&payload).await
    }

    #[instrument(skip(self), fields(exchange = "poloniex"))]
    async fn sell(
        &self,
        pair: &str,
        rate: Decimal,
        amount: Decimal,
    ) -> Result<ApiResponse, ExchangeError> {
        let payload = CommandPayload::new("sell")
            .with("currencyPair", pair)
            .with("rate", rate)
            .with("amount", amount)
            .with("nonce", self.signer.next_nonce());
        self.rest.private_request(&payload).await
    }

    #[instrument(skip(self), fields(exchange = "poloniex"))]
    async fn cancel_order(&self, order_number: &str) -> Result<ApiResponse, ExchangeError> {
        let payload = CommandPayload::new("cancelOrder")
            .with("orderNumber", order_number)
            .with("nonce", self.signer.next_nonce());
        self.rest.private_request(&payload).await
    }

    #[instrument(skip(self), fields(exchange = "poloniex"))]
    async fn move_order(
        &self,
        order_number: &str,
        rate: Decimal,
    ) -> Result<ApiResponse, ExchangeError> {
        let payload = CommandPayload::new("moveOrder")
            .with("orderNumber", order_number)
            .with("rate", rate)
            .with("nonce", self.signer.next_nonce());
        self.rest.private_request(&payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_buy_payload_without_flags() {
        let payload = buy_payload("BTC_ETH", dec("0.025"), dec("1.5"), BuyOptions::default(), 42);
        let keys: Vec<&str> = payload.keys().collect();
        assert_eq!(keys, vec!["command", "currencyPair", "rate", "amount", "nonce"]);
        assert_eq!(
            payload.encode(),
            "command=buy&currencyPair=BTC_ETH&rate=0.025&amount=1.5&nonce=42"
        );
    }

    #[test]
    fn test_buy_payload_flags() {
        let payload = buy_payload(
            "BTC_ETH",
            dec("0.025"),
            dec("1.5"),
            BuyOptions::default().post_only(),
            42,
        );
        assert_eq!(payload.get("postOnly").map(ToString::to_string).as_deref(), Some("1"));
        assert!(!payload.contains_key("fillOrKill"));
        assert!(!payload.contains_key("immediateOrCancel"));

        let all = buy_payload(
            "BTC_ETH",
            dec("0.025"),
            dec("1.5"),
            BuyOptions::default()
                .fill_or_kill()
                .immediate_or_cancel()
                .post_only(),
            42,
        );
        assert_eq!(all.len(), 8);
        assert!(all
            .encode()
            .ends_with("nonce=42&fillOrKill=1&immediateOrCancel=1&postOnly=1"));
    }
}
