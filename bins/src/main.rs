use std::{env, sync::Arc};

use async_trait::async_trait;
use dotenv::dotenv;
use eyre::Context;
use ledger::service::notifications::{Button, Notifier};
use log::info;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    if let Err(err) = dotenv() {
        info!("Failed to load .env file: {}", err);
    }
    pretty_env_logger::init();
    color_eyre::install()?;

    let mongo_url = env::var("MONGO_URL").context("Failed to get MONGO_URL from env")?;
    let admin_chat_id = env::var("ADMIN_CHAT_ID")
        .ok()
        .map(|id| id.parse::<i64>())
        .transpose()
        .context("Failed to parse ADMIN_CHAT_ID")?;

    info!("connecting to mongo");
    let storage = storage::Storage::new(&mongo_url)
        .await
        .context("Failed to create storage")?;
    info!("creating ledger");
    let ledger = Arc::new(ledger::Ledger::new(
        storage,
        Arc::new(LogNotifier),
        admin_chat_id,
    ));

    info!("starting background processes");
    let mut scheduler = bg_process::start(ledger.clone()).await?;

    tokio::signal::ctrl_c().await?;
    scheduler
        .shutdown()
        .await
        .map_err(|err| eyre::eyre!("Failed to shut down scheduler: {err:?}"))?;
    Ok(())
}

/// Message delivery is an external collaborator; the default wiring only
/// logs what would be sent.
struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, chat_id: i64, text: &str, _buttons: &[Button]) -> eyre::Result<()> {
        info!("notify {}: {}", chat_id, text);
        Ok(())
    }
}
