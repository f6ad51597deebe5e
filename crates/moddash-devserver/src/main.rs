use std::time::Duration;

use chrono::Utc;
use moddash_devserver::{spawn_workers, start_server, SharedStore, Store};
use moddash_proto::config::Config;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,moddash_devserver=debug")),
        )
        .init();

    let config = Config::load()?;
    info!("Config loaded from: {:?}", Config::config_path());
    let dev = &config.devserver;

    let mut rng = StdRng::from_entropy();
    let store = SharedStore::new(Store::seeded(dev.seed_posts, Utc::now(), &mut rng));
    info!("Seeded {} posts", dev.seed_posts);

    let _workers = spawn_workers(
        store.clone(),
        Duration::from_secs(dev.moderation_tick_secs.max(1)),
        dev.worker_count.max(1),
    );

    let server = start_server(dev.bind_address.clone(), dev.port, store);
    server.await?;
    Ok(())
}
