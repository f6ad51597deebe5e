use std::time::Duration;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::store::SharedStore;

/// Simulated moderation pool: every `tick`, pending items move to
/// processing and processing items settle.
pub fn spawn_workers(
    store: SharedStore,
    tick: Duration,
    worker_count: usize,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut rng = StdRng::from_entropy();
        let mut interval = tokio::time::interval(tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!("[workers] {} workers, tick {:?}", worker_count, tick);
        loop {
            interval.tick().await;
            store
                .inner
                .write()
                .await
                .moderate_step(worker_count, Utc::now(), &mut rng);
        }
    })
}

#[cfg(test)]
mod tests {
    use moddash_proto::protocol::{NewPost, PostStatus};

    use super::*;
    use crate::store::Store;

    #[tokio::test(start_paused = true)]
    async fn test_pending_items_settle_on_second_tick() {
        let store = SharedStore::new(Store::new());
        store.inner.write().await.create(
            NewPost {
                title: "t".into(),
                content: "c".into(),
                author: "a".into(),
                category: "general".into(),
                server: "server1".into(),
            },
            Utc::now(),
        );
        let handle = spawn_workers(store.clone(), Duration::from_secs(1), 2);
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(
            store.inner.read().await.posts()[0].status,
            PostStatus::Processing
        );
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(store.inner.read().await.posts()[0].status.is_settled());
        handle.abort();
    }
}
