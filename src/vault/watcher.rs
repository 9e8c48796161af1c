// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Vault Event Watcher
//!
//! Background task that follows vault events on chain and forwards them to a
//! channel, so callers can refresh their entry list after a mutation.
//!
//! Block ranges are queried in chunks from the last processed block to the
//! head. The watcher stops when the cancellation token fires or the receiving
//! side of the channel is dropped.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{StoreError, VaultEvent};

/// Default poll interval when caught up to chain head.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default block chunk size per log query.
const DEFAULT_CHUNK_SIZE: u64 = 2000;

/// Block-ranged event feed.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn head_block(&self) -> Result<u64, StoreError>;

    /// Events in `from_block..=to_block`, in log order.
    async fn events_between(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<VaultEvent>, StoreError>;
}

pub struct EntryEventWatcher {
    source: Arc<dyn EventSource>,
    sink: mpsc::Sender<VaultEvent>,
    next_block: u64,
    poll_interval: Duration,
    chunk_size: u64,
}

impl EntryEventWatcher {
    /// Watch from `start_block` onward.
    pub fn new(
        source: Arc<dyn EventSource>,
        sink: mpsc::Sender<VaultEvent>,
        start_block: u64,
    ) -> Self {
        Self {
            source,
            sink,
            next_block: start_block,
            poll_interval: DEFAULT_POLL_INTERVAL,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Run the watcher loop until the cancellation token is triggered.
    ///
    /// ```rust,ignore
    /// tokio::spawn(watcher.run(shutdown.clone()));
    /// ```
    pub async fn run(mut self, shutdown: CancellationToken) {
        tracing::info!(start_block = self.next_block, "Vault event watcher starting");

        loop {
            if shutdown.is_cancelled() || self.sink.is_closed() {
                tracing::info!("Vault event watcher shutting down");
                return;
            }

            if let Err(e) = self.poll_step().await {
                tracing::warn!(error = %e, "Watcher step failed, will retry");
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {},
                _ = shutdown.cancelled() => {
                    tracing::info!("Vault event watcher shutting down");
                    return;
                }
            }
        }
    }

    /// Forward everything from the checkpoint to the head. Returns the number
    /// of events delivered.
    async fn poll_step(&mut self) -> Result<usize, StoreError> {
        let head = self.source.head_block().await?;
        let mut delivered = 0;

        while self.next_block <= head {
            let to = self
                .next_block
                .saturating_add(self.chunk_size - 1)
                .min(head);
            let events = self.source.events_between(self.next_block, to).await?;

            for event in events {
                if self.sink.send(event).await.is_err() {
                    return Ok(delivered);
                }
                delivered += 1;
            }

            if delivered > 0 {
                tracing::debug!(
                    from_block = self.next_block,
                    to_block = to,
                    events = delivered,
                    "Forwarded vault events"
                );
            }
            self.next_block = to + 1;
        }

        Ok(delivered)
    }
}
