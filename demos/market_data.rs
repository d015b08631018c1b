use poloniex_connector::core::config::ExchangeConfig;
use poloniex_connector::exchanges::poloniex::build_connector;
use poloniex_connector::{ChartPeriod, MarketDataSource};
use std::time::{SystemTime, UNIX_EPOCH};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // Public endpoints need no credentials
    let poloniex = build_connector(ExchangeConfig::read_only())?;

    println!("📊 Poloniex public market data");
    println!("==============================");

    match poloniex.return_ticker().await {
        Ok(response) if response.is_success() => {
            let tickers = response.value()?;
            let count = tickers.as_object().map_or(0, serde_json::Map::len);
            println!("Ticker covers {} pairs", count);
            println!("  BTC_ETH last: {}", tickers["BTC_ETH"]["last"]);
        }
        Ok(response) => eprintln!("Ticker returned HTTP {}: {}", response.status, response.body),
        Err(e) => eprintln!("Error getting ticker: {}", e),
    }

    match poloniex.first_sell_price("BTC_ETH").await {
        Ok(price) => println!("\n💰 BTC_ETH lowest ask: {}", price),
        Err(e) => eprintln!("Error getting order book: {}", e),
    }

    match poloniex.init_currencies().await {
        Ok(count) => {
            println!("\n🪙 Cached {} currencies", count);
            if let Some(btc) = poloniex.currency(28) {
                println!("  id 28 -> {} ({:?})", btc.ticker, btc.name);
            }
        }
        Err(e) => eprintln!("Error getting currencies: {}", e),
    }

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    match poloniex
        .return_chart_data("BTC_XMR", now - 86_400, now, ChartPeriod::Hours4)
        .await
    {
        Ok(response) => {
            let candles = response.value().ok();
            let count = candles
                .as_ref()
                .and_then(serde_json::Value::as_array)
                .map_or(0, Vec::len);
            println!("\n🕯️ BTC_XMR: {} four-hour candles in the last day", count);
        }
        Err(e) => eprintln!("Error getting chart data: {}", e),
    }

    Ok(())
}
