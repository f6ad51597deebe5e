#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use moddash_proto::config::{BackendConfig, Config};
use moddash_sync::dispatch::FetchDispatcher;
use moddash_sync::{FeedKey, Gateway, ManualScheduler, Scheduler, SyncEvent, SyncHub};

/// Serve `app` on an ephemeral local port.
pub async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

pub fn backend(addr: SocketAddr, timeout_secs: u64) -> BackendConfig {
    BackendConfig {
        base_url: format!("http://{}", addr),
        request_timeout_secs: timeout_secs,
    }
}

pub fn gateway(addr: SocketAddr) -> Gateway {
    Gateway::new(&backend(addr, 5)).unwrap()
}

/// A hub wired to a real backend.  Timers are manual so only the test
/// decides when a poll happens.
pub struct Live {
    pub hub: SyncHub,
    pub rx: mpsc::Receiver<SyncEvent>,
    pub timers: HashMap<FeedKey, ManualScheduler>,
}

pub fn live_hub(addr: SocketAddr) -> Live {
    let mut config = Config::default();
    config.backend = backend(addr, 5);
    let gateway = Arc::new(Gateway::new(&config.backend).unwrap());
    let (tx, rx) = mpsc::channel(64);

    let mut timers = HashMap::new();
    let mut factory = |key: FeedKey| {
        let timer = ManualScheduler::new();
        timers.insert(key, timer.clone());
        Box::new(timer) as Box<dyn Scheduler>
    };
    let hub = SyncHub::new(
        &config,
        &mut factory,
        Box::new(FetchDispatcher::new(gateway, tx)),
    );
    Live { hub, rx, timers }
}

impl Live {
    /// Receive and route `count` events; returns how many changed state.
    pub async fn pump(&mut self, count: usize) -> usize {
        let mut changed = 0;
        for _ in 0..count {
            let event = tokio::time::timeout(Duration::from_secs(10), self.rx.recv())
                .await
                .expect("timed out waiting for a sync event")
                .expect("event channel closed");
            if self.hub.handle(event) {
                changed += 1;
            }
        }
        changed
    }
}
