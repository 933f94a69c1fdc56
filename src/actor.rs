// SPDX-FileCopyrightText: 2025 cowrite contributors
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The per-document reconciliation actor.
//!
//! One single-writer task owns a document's `{version, history, contents}`
//! and serializes every `get` and `update` through its inbox, which makes
//! `update` linearizable for all clients of that document. Committed
//! updates are published on a broadcast channel from inside the task, so
//! subscribers observe them in commit order.

use crate::delta::{factories, Delta};
use crate::protocol::DocumentId;
use std::collections::VecDeque;
use std::fmt;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, warn};

/// How many committed updates a slow subscriber may fall behind before it
/// is cut off and has to rejoin.
const BROADCAST_CAPACITY: usize = 256;

/// Identifies the connection a frame came from, so that broadcasts can
/// skip the originator.
pub type SubscriberId = u64;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum UpdateError {
    /// The client claims a version the server never issued.
    #[error("server_behind")]
    ServerBehind,
    /// Applying the transformed change would leave non-insert operations
    /// in the document. State is untouched.
    #[error("document_corrupted")]
    DocumentCorrupted,
    /// The document task is gone; the caller must rejoin.
    #[error("document task has shut down")]
    Shutdown,
}

/// A successfully committed update, as published to subscribers.
#[derive(Clone, Debug)]
pub struct CommittedUpdate {
    pub version: usize,
    pub change: Delta,
    pub origin: SubscriberId,
}

pub enum DocMessage {
    GetContents {
        response_tx: oneshot::Sender<(usize, Delta)>,
    },
    Update {
        origin: SubscriberId,
        version: usize,
        change: Delta,
        response_tx: oneshot::Sender<Result<(usize, Delta), UpdateError>>,
    },
}

impl fmt::Debug for DocMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::GetContents { .. } => "get contents",
            Self::Update { .. } => "update",
        };
        write!(f, "{repr}")
    }
}

/// The authoritative state of one document.
pub struct DocumentState {
    id: DocumentId,
    version: usize,
    contents: Delta,
    /// Transformed changes, most recent first. `history.len() == version`.
    history: VecDeque<Delta>,
}

/// Every fresh document starts out as this one-block greeting.
pub fn seed_contents() -> Delta {
    factories::block_document("Hello world!\n", "hello")
}

impl DocumentState {
    pub fn new(id: DocumentId) -> Self {
        Self {
            id,
            version: 0,
            contents: seed_contents(),
            history: VecDeque::new(),
        }
    }

    pub fn version(&self) -> usize {
        self.version
    }

    pub fn contents(&self) -> &Delta {
        &self.contents
    }

    /// Reconciles a client change submitted against `client_version` and
    /// commits it. Returns the new version and the transformed change.
    /// Peers must apply the transformed change; echoing the original
    /// would diverge.
    pub fn update(
        &mut self,
        client_version: usize,
        change: Delta,
    ) -> Result<(usize, Delta), UpdateError> {
        if client_version > self.version {
            warn!(
                "Client submitted version {client_version} to document {} at version {}",
                self.id, self.version
            );
            return Err(UpdateError::ServerBehind);
        }

        // The first `lag` history entries are the changes this client has
        // not seen yet, most recent first; transform through them in
        // chronological order. The server side wins ties.
        let lag = self.version - client_version;
        let mut transformed = change;
        for concurrent in self.history.iter().take(lag).rev() {
            transformed = concurrent.transform(&transformed, true);
        }

        let new_contents = self.contents.compose(&transformed);
        if !new_contents.is_document() {
            warn!(
                "Rejecting change that would corrupt document {}: {transformed:?}",
                self.id
            );
            return Err(UpdateError::DocumentCorrupted);
        }

        self.history.push_front(transformed.clone());
        self.version += 1;
        self.contents = new_contents;
        debug!("Document {} is now at version {}", self.id, self.version);

        Ok((self.version, transformed))
    }
}

pub struct DocumentActor {
    inbox: mpsc::Receiver<DocMessage>,
    update_tx: broadcast::Sender<CommittedUpdate>,
    state: DocumentState,
}

impl DocumentActor {
    fn new(
        inbox: mpsc::Receiver<DocMessage>,
        update_tx: broadcast::Sender<CommittedUpdate>,
        id: DocumentId,
    ) -> Self {
        Self {
            inbox,
            update_tx,
            state: DocumentState::new(id),
        }
    }

    fn handle_message(&mut self, message: DocMessage) {
        debug!("Handling doc message: {message:?}");
        match message {
            DocMessage::GetContents { response_tx } => {
                // The requester may be gone already; that's not our problem.
                let _ = response_tx.send((self.state.version(), self.state.contents().clone()));
            }
            DocMessage::Update {
                origin,
                version,
                change,
                response_tx,
            } => {
                let result = self.state.update(version, change);
                if let Ok((version, transformed)) = &result {
                    // Publishing from inside the single-writer task keeps
                    // the broadcast in commit order. No receivers is fine.
                    let _ = self.update_tx.send(CommittedUpdate {
                        version: *version,
                        change: transformed.clone(),
                        origin,
                    });
                }
                let _ = response_tx.send(result);
            }
        }
    }

    async fn run(&mut self) {
        while let Some(message) = self.inbox.recv().await {
            self.handle_message(message);
        }
        debug!("Document {} task shutting down", self.state.id);
    }
}

/// Clonable handle to a document actor; the only way to reach its state.
#[derive(Clone)]
pub struct DocumentHandle {
    message_tx: mpsc::Sender<DocMessage>,
    update_tx: broadcast::Sender<CommittedUpdate>,
}

impl DocumentHandle {
    /// Spawns a fresh, seeded actor task for `id`.
    pub fn spawn(id: DocumentId) -> Self {
        let (message_tx, message_rx) = mpsc::channel(16);
        let (update_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        let mut actor = DocumentActor::new(message_rx, update_tx.clone(), id);
        tokio::spawn(async move { actor.run().await });
        Self {
            message_tx,
            update_tx,
        }
    }

    /// Whether the actor task is still alive.
    pub fn is_alive(&self) -> bool {
        !self.message_tx.is_closed()
    }

    /// Subscribes to committed updates, in commit order.
    pub fn updates(&self) -> broadcast::Receiver<CommittedUpdate> {
        self.update_tx.subscribe()
    }

    pub async fn contents(&self) -> Result<(usize, Delta), UpdateError> {
        let (response_tx, response_rx) = oneshot::channel();
        self.message_tx
            .send(DocMessage::GetContents { response_tx })
            .await
            .map_err(|_| UpdateError::Shutdown)?;
        response_rx.await.map_err(|_| UpdateError::Shutdown)
    }

    pub async fn update(
        &self,
        origin: SubscriberId,
        version: usize,
        change: Delta,
    ) -> Result<(usize, Delta), UpdateError> {
        let (response_tx, response_rx) = oneshot::channel();
        self.message_tx
            .send(DocMessage::Update {
                origin,
                version,
                change,
                response_tx,
            })
            .await
            .map_err(|_| UpdateError::Shutdown)?;
        response_rx.await.map_err(|_| UpdateError::Shutdown)?
    }
}
