use poloniex_connector::core::config::ExchangeConfig;
use poloniex_connector::exchanges::poloniex::{build_connector, channel_ids, PoloniexMessage};
use poloniex_connector::{AccountInfo, ChannelSubscriber};
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // Needs POLONIEX_API_KEY and POLONIEX_SECRET_KEY, from the environment or .env
    let config = match ExchangeConfig::from_env_file("POLONIEX") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            eprintln!("Please set POLONIEX_API_KEY and POLONIEX_SECRET_KEY");
            return Ok(());
        }
    };

    let poloniex = build_connector(config)?;

    match poloniex.common_commission().await {
        Ok(fee) => println!("💸 Maker + taker fee: {}", fee),
        Err(e) => eprintln!("Error getting fee info: {}", e),
    }

    let balances = poloniex.return_balances().await?;
    println!("💼 Balances (HTTP {}): {}", balances.status, balances.body);

    let account = poloniex
        .subscribe_private(channel_ids::ACCOUNT_NOTIFICATIONS)
        .await?;
    println!("\n📡 Listening on account notifications for 30s...");

    let deadline = tokio::time::sleep(Duration::from_secs(30));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            () = &mut deadline => break,
            message = account.next_message() => match message {
                Some(Ok(PoloniexMessage::Heartbeat)) => {}
                Some(Ok(message)) => println!("  {:?}", message),
                Some(Err(e)) => {
                    eprintln!("Stream error: {}", e);
                    break;
                }
                None => {
                    println!("Stream closed by server");
                    break;
                }
            },
        }
    }

    poloniex.close_all().await?;
    Ok(())
}
