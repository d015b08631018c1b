use crate::core::errors::ExchangeError;
use crate::core::types::conversion::value_to_decimal;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// One row of the `returnCurrencies` table, keyed by ticker on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyInfo {
    pub id: u64,
    pub ticker: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Remaining exchange metadata, untouched
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

/// Currency id -> currency record
pub type CurrencyTable = HashMap<u64, CurrencyInfo>;

/// Build the id-keyed table from a `returnCurrencies` body.
///
/// Entries without a numeric `id` are skipped.
pub fn parse_currency_table(value: &Value) -> Result<CurrencyTable, ExchangeError> {
    let entries = value.as_object().ok_or_else(|| {
        ExchangeError::DeserializationError("Currency list is not a JSON object".to_string())
    })?;

    let mut table = CurrencyTable::with_capacity(entries.len());
    for (ticker, record) in entries {
        let Some(fields) = record.as_object() else {
            continue;
        };
        let Some(id) = fields.get("id").and_then(Value::as_u64) else {
            continue;
        };

        let mut metadata = fields.clone();
        metadata.remove("id");
        metadata.remove("ticker");
        let name = match metadata.remove("name") {
            Some(Value::String(name)) => Some(name),
            _ => None,
        };

        table.insert(
            id,
            CurrencyInfo {
                id,
                ticker: ticker.clone(),
                name,
                metadata,
            },
        );
    }

    Ok(table)
}

/// Lowest ask price of an order book body, zero when absent or unreadable
pub fn lowest_ask(book: &Value) -> Decimal {
    book.get("asks")
        .and_then(Value::as_array)
        .and_then(|asks| asks.first())
        .and_then(Value::as_array)
        .and_then(|level| level.first())
        .and_then(value_to_decimal)
        .unwrap_or(Decimal::ZERO)
}

/// Fee schedule from `returnFeeInfo`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeInfo {
    pub maker_fee: Decimal,
    pub taker_fee: Decimal,
}

impl FeeInfo {
    pub fn from_value(value: &Value) -> Result<Self, ExchangeError> {
        let field = |name: &str| {
            value
                .get(name)
                .and_then(value_to_decimal)
                .ok_or_else(|| {
                    ExchangeError::DeserializationError(format!(
                        "Fee info is missing a decimal '{}' field",
                        name
                    ))
                })
        };

        Ok(Self {
            maker_fee: field("makerFee")?,
            taker_fee: field("takerFee")?,
        })
    }

    pub fn common_commission(&self) -> Decimal {
        self.maker_fee + self.taker_fee
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_lowest_ask() {
        assert_eq!(
            lowest_ask(&json!({"asks": [["100.5", "2.0"], ["101", "1"]]})),
            Decimal::from_str("100.5").unwrap()
        );
        assert_eq!(lowest_ask(&json!({"asks": []})), Decimal::ZERO);
        assert_eq!(lowest_ask(&json!({"bids": [["1", "1"]]})), Decimal::ZERO);
        assert_eq!(lowest_ask(&json!({"asks": [[]]})), Decimal::ZERO);
        assert_eq!(lowest_ask(&json!({"asks": [["abc", "1"]]})), Decimal::ZERO);
        assert_eq!(lowest_ask(&json!([1, 2])), Decimal::ZERO);
    }

    #[test]
    fn test_common_commission_is_exact() {
        let fees = FeeInfo::from_value(&json!({"makerFee": "0.0015", "takerFee": "0.0025"})).unwrap();
        let total = fees.common_commission();
        assert_eq!(total, Decimal::from_str("0.0040").unwrap());
        assert_eq!(total.to_string(), "0.0040");
    }

    #[test]
    fn test_fee_info_missing_field() {
        let result = FeeInfo::from_value(&json!({"makerFee": "0.0015"}));
        assert!(matches!(result, Err(ExchangeError::DeserializationError(_))));
    }

    #[test]
    fn test_parse_currency_table() {
        let body = json!({
            "BTC": {"id": 28, "name": "Bitcoin", "txFee": "0.00050000", "delisted": 0},
            "ETH": {"id": 267, "name": "Ethereum", "txFee": "0.01"},
            "BROKEN": {"name": "no id"}
        });

        let table = parse_currency_table(&body).unwrap();
        assert_eq!(table.len(), 2);

        let btc = &table[&28];
        assert_eq!(btc.ticker, "BTC");
        assert_eq!(btc.name.as_deref(), Some("Bitcoin"));
        assert_eq!(btc.metadata["txFee"], "0.00050000");
        assert!(!btc.metadata.contains_key("id"));
        assert_eq!(table[&267].ticker, "ETH");
    }

    #[test]
    fn test_parse_currency_table_rejects_non_object() {
        assert!(parse_currency_table(&json!([])).is_err());
    }
}
