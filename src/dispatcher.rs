// SPDX-FileCopyrightText: 2025 cowrite contributors
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Routes client frames to the right document actor and fans committed
//! updates out to every subscriber of the same document.
//!
//! The registry maps document ids to actor handles, created on first
//! join. Fan-out rides on each actor's broadcast channel: the actor
//! publishes from inside its single-writer task, so every subscriber
//! observes commits in order. A subscriber's *own* commit is delivered as
//! the `ok` reply through the same ordered stream; an ack that overtook
//! an earlier peer commit (or vice versa) would make the subscriber
//! mis-transform everything after it. Only error replies, which commit
//! nothing, take the direct path. Ordering across documents is not
//! coordinated.

use crate::actor::{DocumentHandle, SubscriberId, UpdateError};
use crate::delta::Delta;
use crate::protocol::{DocumentId, ServerFrame, ServerMessage, UpdateReply};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Default)]
pub struct Dispatcher {
    documents: Mutex<HashMap<DocumentId, DocumentHandle>>,
}

/// One peer's membership in one document. Dropping it stops the fan-out
/// and removes the peer; a vanished subscriber is removed silently.
pub struct Subscription {
    forwarder: JoinHandle<()>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.forwarder.abort();
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// The actor handle for `id`, spawning one on first use. A document
    /// whose task died (an algebra bug panicked it) is restarted from the
    /// seed; its history is gone.
    fn handle(&self, id: &DocumentId) -> DocumentHandle {
        let mut documents = self
            .documents
            .lock()
            .expect("Document registry lock poisoned");
        if let Some(handle) = documents.get(id) {
            if handle.is_alive() {
                return handle.clone();
            }
            info!("Document task for {id} died; restarting it from the seed");
        } else {
            debug!("Creating document {id}");
        }
        let handle = DocumentHandle::spawn(id.clone());
        documents.insert(id.clone(), handle.clone());
        handle
    }

    /// Subscribes a peer: sends the `open` snapshot down `outgoing`, then
    /// forwards every later commit (peer commits as `update` frames, the
    /// subscriber's own as `ok` replies).
    pub async fn join(
        &self,
        id: &DocumentId,
        subscriber: SubscriberId,
        outgoing: mpsc::Sender<ServerMessage>,
    ) -> Result<Subscription> {
        let handle = self.handle(id);
        let mut updates = handle.updates();
        let (version, contents) = handle
            .contents()
            .await
            .with_context(|| format!("Failed to read contents of document {id}"))?;

        outgoing
            .send(ServerMessage::new(
                id,
                ServerFrame::Open { version, contents },
            ))
            .await
            .context("Subscriber went away before the open frame")?;

        let document = id.clone();
        let opened_version = version;
        let forwarder = tokio::spawn(async move {
            loop {
                match updates.recv().await {
                    Ok(update) => {
                        // Commits up to the snapshot version are already
                        // part of the open frame.
                        if update.version <= opened_version {
                            continue;
                        }
                        let frame = if update.origin == subscriber {
                            ServerFrame::Reply(UpdateReply::ok())
                        } else {
                            ServerFrame::Update {
                                version: update.version,
                                change: update.change,
                            }
                        };
                        if outgoing
                            .send(ServerMessage::new(&document, frame))
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(count)) => {
                        // Skipping updates would silently diverge this
                        // peer, so cut it off; it has to rejoin.
                        warn!(
                            "Subscriber #{subscriber} lagged {count} updates behind on {document}; dropping it"
                        );
                        break;
                    }
                }
            }
        });

        Ok(Subscription { forwarder })
    }

    /// Applies a peer's update to the document. On success the `ok` reply
    /// reaches the sender through its subscription stream and `None` is
    /// returned; on failure the error reply to send back directly.
    pub async fn update(
        &self,
        id: &DocumentId,
        subscriber: SubscriberId,
        version: usize,
        change: Delta,
    ) -> Option<UpdateReply> {
        let handle = self.handle(id);
        match handle.update(subscriber, version, change).await {
            Ok(_) => None,
            Err(error @ (UpdateError::ServerBehind | UpdateError::DocumentCorrupted)) => {
                Some(UpdateReply::error(error.to_string()))
            }
            Err(other) => Some(UpdateReply::error(format!("{other:?}"))),
        }
    }
}
