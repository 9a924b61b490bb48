//! Write the stock categories into an empty data directory.

use std::process::ExitCode;

use dotenvy::dotenv;
use service::{adapters::COLLECTIONS, file::document_store::FileDocumentStore, seed};
use tracing::{error, info};

async fn run() -> anyhow::Result<usize> {
    let cfg = configs::AppConfig::load_and_validate()?;
    service::runtime::ensure_env(&cfg.store.frontend_dir, &cfg.store.data_dir).await?;
    let store = FileDocumentStore::open(&cfg.store.data_dir, &COLLECTIONS).await?;
    let written = seed::seed_if_empty(store.as_ref()).await?;
    info!(data_dir = %cfg.store.data_dir, written, "seed finished");
    Ok(written)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv().ok();
    common::utils::logging::init_logging_from_env();

    match run().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!(service = "seed", event = "seed_failed", error = %e, "seeding failed");
            ExitCode::FAILURE
        }
    }
}
