mod action;
mod app;
mod component;
mod components;
mod theme;
mod widgets;

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;

use moddash_proto::config::Config;
use moddash_sync::dispatch::FetchDispatcher;
use moddash_sync::session::{Session, Theme, User};
use moddash_sync::{Gateway, IntervalScheduler, SyncEvent, SyncHub};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = moddash_proto::platform::data_dir();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create {}", data_dir.display()))?;
    let log_path = data_dir.join("moddash.log");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // stdout belongs to the terminal UI
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    eprintln!("moddash log: {}", log_path.display());
    tracing::info!("moddash starting…");

    let config = Config::load()?;
    tracing::info!(
        "Config loaded from {:?}, backend {}",
        Config::config_path(),
        config.backend.base_url
    );

    let gateway = Arc::new(Gateway::new(&config.backend)?);
    let (sync_tx, sync_rx) = mpsc::channel::<SyncEvent>(256);

    let mut schedulers = IntervalScheduler::factory(sync_tx.clone());
    let hub = SyncHub::new(
        &config,
        &mut schedulers,
        Box::new(FetchDispatcher::new(gateway, sync_tx)),
    );

    let session = Session::new(Some(User::local_operator()), Theme::default());

    app::App::new(hub, session).run(sync_rx).await?;
    Ok(())
}
