use crate::core::errors::ExchangeError;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

/// A single value inside a command payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadValue {
    Int(i64),
    UInt(u64),
    Decimal(Decimal),
    Str(String),
}

impl fmt::Display for PayloadValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::UInt(v) => write!(f, "{}", v),
            Self::Decimal(v) => write!(f, "{}", v),
            Self::Str(v) => f.write_str(v),
        }
    }
}

impl From<&str> for PayloadValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for PayloadValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<u64> for PayloadValue {
    fn from(value: u64) -> Self {
        Self::UInt(value)
    }
}

impl From<u32> for PayloadValue {
    fn from(value: u32) -> Self {
        Self::UInt(u64::from(value))
    }
}

impl From<i64> for PayloadValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<Decimal> for PayloadValue {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

/// Ordered field map sent as query string or form body.
///
/// Keys keep insertion order; setting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandPayload {
    fields: Vec<(String, PayloadValue)>,
}

impl CommandPayload {
    /// Start a payload with its `command` field
    pub fn new(command: &str) -> Self {
        Self::default().with("command", command)
    }

    /// Builder-style insert
    pub fn with(mut self, key: &str, value: impl Into<PayloadValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<PayloadValue>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&PayloadValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn command(&self) -> Option<String> {
        self.get("command").map(ToString::to_string)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields rendered as string pairs, in insertion order
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect()
    }

    /// `application/x-www-form-urlencoded` rendering; these are the exact bytes that get signed
    pub fn encode(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.fields {
            serializer.append_pair(key, &value.to_string());
        }
        serializer.finish()
    }
}

/// Raw HTTP response handed back to callers without interpretation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as untyped JSON
    pub fn value(&self) -> Result<Value, ExchangeError> {
        self.json()
    }

    /// Parse the body into a typed structure
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ExchangeError> {
        serde_json::from_str(&self.body).map_err(|e| {
            ExchangeError::DeserializationError(format!("Failed to parse JSON response: {}", e))
        })
    }
}

/// Candle width accepted by `returnChartData`, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartPeriod {
    Minutes5,
    Minutes15,
    Minutes30,
    Hours2,
    Hours4,
    Days1,
}

impl ChartPeriod {
    pub const ALL: [Self; 6] = [
        Self::Minutes5,
        Self::Minutes15,
        Self::Minutes30,
        Self::Hours2,
        Self::Hours4,
        Self::Days1,
    ];

    pub const fn as_seconds(self) -> u32 {
        match self {
            Self::Minutes5 => 300,
            Self::Minutes15 => 900,
            Self::Minutes30 => 1800,
            Self::Hours2 => 7200,
            Self::Hours4 => 14400,
            Self::Days1 => 86400,
        }
    }
}

impl TryFrom<u32> for ChartPeriod {
    type Error = ExchangeError;

    fn try_from(seconds: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|period| period.as_seconds() == seconds)
            .ok_or_else(|| {
                ExchangeError::InvalidParameters(format!(
                    "Unsupported chart period {}s, expected one of 300, 900, 1800, 7200, 14400, 86400",
                    seconds
                ))
            })
    }
}

impl fmt::Display for ChartPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_seconds())
    }
}

/// Execution modifiers for a buy order; each one is sent only when set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuyOptions {
    pub fill_or_kill: bool,
    pub immediate_or_cancel: bool,
    pub post_only: bool,
}

impl BuyOptions {
    #[must_use]
    pub const fn fill_or_kill(mut self) -> Self {
        self.fill_or_kill = true;
        self
    }

    #[must_use]
    pub const fn immediate_or_cancel(mut self) -> Self {
        self.immediate_or_cancel = true;
        self
    }

    #[must_use]
    pub const fn post_only(mut self) -> Self {
        self.post_only = true;
        self
    }
}

/// Conversion helpers that never panic
pub mod conversion {
    use rust_decimal::Decimal;
    use serde_json::Value;
    use std::str::FromStr;

    /// Read a decimal from a JSON string or number
    pub fn value_to_decimal(value: &Value) -> Option<Decimal> {
        match value {
            Value::String(s) => Decimal::from_str(s.trim()).ok(),
            // Go through the textual form so "0.1" stays exactly 0.1
            Value::Number(n) => Decimal::from_str(&n.to_string())
                .or_else(|_| Decimal::from_scientific(&n.to_string()))
                .ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn test_payload_keeps_insertion_order() {
        let payload = CommandPayload::new("buy")
            .with("currencyPair", "BTC_ETH")
            .with("rate", Decimal::from_str("0.025").unwrap())
            .with("nonce", 5_u64);
        let keys: Vec<&str> = payload.keys().collect();
        assert_eq!(keys, vec!["command", "currencyPair", "rate", "nonce"]);
        assert_eq!(payload.command().as_deref(), Some("buy"));
    }

    #[test]
    fn test_payload_insert_replaces() {
        let payload = CommandPayload::new("returnTicker").with("command", "returnCurrencies");
        assert_eq!(payload.len(), 1);
        assert_eq!(payload.command().as_deref(), Some("returnCurrencies"));
    }

    #[test]
    fn test_encode_form_body() {
        let payload = CommandPayload::new("returnOrderBook")
            .with("currencyPair", "BTC_ETH")
            .with("note", "a b&c");
        assert_eq!(
            payload.encode(),
            "command=returnOrderBook&currencyPair=BTC_ETH&note=a+b%26c"
        );
    }

    #[test]
    fn test_api_response_json() {
        let response = ApiResponse::new(200, r#"{"error":"Invalid command."}"#);
        assert!(response.is_success());
        let value = response.value().unwrap();
        assert_eq!(value["error"], "Invalid command.");

        let html = ApiResponse::new(502, "<html>bad gateway</html>");
        assert!(!html.is_success());
        assert!(matches!(
            html.value(),
            Err(ExchangeError::DeserializationError(_))
        ));
    }

    #[test]
    fn test_chart_period_policy() {
        assert_eq!(ChartPeriod::try_from(900_u32).unwrap(), ChartPeriod::Minutes15);
        assert_eq!(ChartPeriod::Days1.to_string(), "86400");
        assert!(matches!(
            ChartPeriod::try_from(60_u32),
            Err(ExchangeError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_value_to_decimal() {
        use serde_json::json;
        assert_eq!(
            conversion::value_to_decimal(&json!("0.0015")),
            Some(Decimal::from_str("0.0015").unwrap())
        );
        assert_eq!(
            conversion::value_to_decimal(&json!(0.1)),
            Some(Decimal::from_str("0.1").unwrap())
        );
        assert_eq!(conversion::value_to_decimal(&json!(null)), None);
    }
}
