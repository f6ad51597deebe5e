//! Turns controller decisions into network calls.
//!
//! Controllers never await; they hand tickets to a sink.  The runtime sink
//! spawns one task per ticket and posts the outcome back into the event
//! channel, so a hung request never holds up the next trigger.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use moddash_proto::protocol::NewPost;

use crate::event::{FetchTicket, SyncEvent};
use crate::gateway::Gateway;

pub trait TicketSink: Send {
    fn dispatch(&mut self, ticket: FetchTicket);
    fn submit(&mut self, post: NewPost);
}

pub struct FetchDispatcher {
    gateway: Arc<Gateway>,
    tx: mpsc::Sender<SyncEvent>,
}

impl FetchDispatcher {
    pub fn new(gateway: Arc<Gateway>, tx: mpsc::Sender<SyncEvent>) -> Self {
        Self { gateway, tx }
    }
}

impl TicketSink for FetchDispatcher {
    fn dispatch(&mut self, ticket: FetchTicket) {
        let gateway = Arc::clone(&self.gateway);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let FetchTicket {
                key,
                generation,
                request,
            } = ticket;
            debug!("[dispatch] {} gen {}", key.label(), generation);
            let outcome = request.execute(&gateway).await;
            let event = SyncEvent::Fetched {
                key,
                generation,
                outcome,
            };
            if tx.send(event).await.is_err() {
                debug!("[dispatch] event loop gone, dropping {} result", key.label());
            }
        });
    }

    fn submit(&mut self, post: NewPost) {
        let gateway = Arc::clone(&self.gateway);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = gateway.create_post(&post).await;
            if tx.send(SyncEvent::Submitted(outcome)).await.is_err() {
                warn!("[dispatch] event loop gone, submission outcome lost");
            }
        });
    }
}

#[derive(Debug, Default)]
struct Recorded {
    tickets: Vec<FetchTicket>,
    posts: Vec<NewPost>,
}

/// Sink that only records what it was asked to do.  Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    log: Arc<Mutex<Recorded>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain recorded tickets.
    pub fn take_tickets(&self) -> Vec<FetchTicket> {
        let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut log.tickets)
    }

    pub fn take_posts(&self) -> Vec<NewPost> {
        let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut log.posts)
    }
}

impl TicketSink for RecordingSink {
    fn dispatch(&mut self, ticket: FetchTicket) {
        let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        log.tickets.push(ticket);
    }

    fn submit(&mut self, post: NewPost) {
        let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        log.posts.push(post);
    }
}
