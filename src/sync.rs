// SPDX-FileCopyrightText: 2025 cowrite contributors
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The client-side sync engine.
//!
//! A small single-threaded state machine that keeps one open document in
//! step with the server: it paces outgoing updates (at most one in
//! flight), folds further local edits into a queue, transforms concurrent
//! remote changes against both, and maintains the undo history. Instead
//! of invoking callbacks it *returns* what the caller has to do: the
//! frame to send, the delta to render.
//!
//! Two invariants hold across all interleavings:
//!
//! - I1: at most one update is in flight to the server at a time;
//! - I2: once the transport quiesces, the local document equals the
//!   server's contents.
//!
//! The engine bumps its version optimistically when sending. If the
//! server answers anything other than an `ok` or a `document_corrupted`
//! error, the versions have drifted and the caller must rejoin the
//! document. `document_corrupted` is fatal.

use crate::delta::Delta;
use crate::undo::UndoHistory;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SyncError {
    /// The editor handed us something that is not a document delta.
    #[error("local edits must produce a document containing only inserts")]
    NotADocument,
    /// A remote change broke the document invariants; the engine's state
    /// is no longer trustworthy.
    #[error("document corrupted by a remote change")]
    DocumentCorrupted,
}

/// An `update` frame the caller must send to the server.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingUpdate {
    pub version: usize,
    pub change: Delta,
}

pub struct SyncEngine {
    version: usize,
    current_document: Delta,
    in_flight: Option<Delta>,
    queued: Option<Delta>,
    history: UndoHistory,
}

impl SyncEngine {
    /// Starts tracking a document from the server's `open` snapshot.
    pub fn open(version: usize, contents: Delta) -> Self {
        Self {
            version,
            current_document: contents,
            in_flight: None,
            queued: None,
            history: UndoHistory::new(),
        }
    }

    pub fn version(&self) -> usize {
        self.version
    }

    pub fn document(&self) -> &Delta {
        &self.current_document
    }

    pub fn has_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// The editor's document changed locally. Returns the update to send,
    /// if one should go out now; otherwise the change waits in the queue
    /// until the in-flight update is acknowledged.
    pub fn local_change(&mut self, new_document: &Delta) -> Result<Option<OutgoingUpdate>, SyncError> {
        if !new_document.is_document() {
            return Err(SyncError::NotADocument);
        }
        let change = self
            .current_document
            .diff(new_document)
            .expect("both sides were just validated as documents");
        if change.is_empty() {
            return Ok(None);
        }

        self.history.record(&change, &self.current_document);
        self.current_document = new_document.clone();
        Ok(self.push_local(change))
    }

    /// The server acknowledged the in-flight update. Returns the queued
    /// change to send next, if any.
    pub fn acknowledged(&mut self) -> Option<OutgoingUpdate> {
        self.in_flight = None;
        let queued = self.queued.take()?;
        self.push_local(queued)
    }

    /// A broadcast change from some other participant. Returns the delta
    /// the caller must apply to its rendered document.
    pub fn remote_update(&mut self, change: &Delta) -> Result<Delta, SyncError> {
        let mut remote = change.clone();

        // The server committed this before seeing our in-flight update.
        // Pull the remote past what we sent, and re-base the in-flight
        // change onto the remote exactly the way the server will when it
        // arrives there (remote first, server wins ties); otherwise a
        // second remote in the same flight window mis-transforms.
        if let Some(in_flight) = self.in_flight.take() {
            let remote_past_in_flight = in_flight.transform(&remote, false);
            self.in_flight = Some(remote.transform(&in_flight, true));
            remote = remote_past_in_flight;
        }

        // The queue moves to the far side of the remote, and the remote
        // to the far side of the queue. The asymmetric priorities keep
        // our intent locally while matching the server-wins policy.
        if let Some(queued) = self.queued.take() {
            let remote_past_queue = queued.transform(&remote, false);
            self.queued = Some(remote.transform(&queued, true));
            remote = remote_past_queue;
        }

        let updated = self.current_document.compose(&remote);
        if !updated.is_document() {
            return Err(SyncError::DocumentCorrupted);
        }
        self.current_document = updated;
        self.history.remote_update(&remote);
        self.version += 1;
        Ok(remote)
    }

    /// Undoes the most recent local step. Returns the delta that was
    /// applied to the document and, possibly, the update to send.
    pub fn undo(&mut self) -> Option<(Delta, Option<OutgoingUpdate>)> {
        let inverse = self.history.pop_undo()?;
        let counter = inverse.invert(&self.current_document);
        self.current_document = self.current_document.compose(&inverse);
        self.history.push_redo(counter);
        let outgoing = self.push_local(inverse.clone());
        Some((inverse, outgoing))
    }

    /// Re-applies the most recently undone step.
    pub fn redo(&mut self) -> Option<(Delta, Option<OutgoingUpdate>)> {
        let inverse = self.history.pop_redo()?;
        let counter = inverse.invert(&self.current_document);
        self.current_document = self.current_document.compose(&inverse);
        self.history.push_undo(counter);
        let outgoing = self.push_local(inverse.clone());
        Some((inverse, outgoing))
    }

    fn push_local(&mut self, change: Delta) -> Option<OutgoingUpdate> {
        if self.in_flight.is_none() {
            self.in_flight = Some(change.clone());
            let update = OutgoingUpdate {
                version: self.version,
                change,
            };
            // Optimistic: from our point of view the document advanced;
            // the server will accept the change at this version or
            // transform it.
            self.version += 1;
            Some(update)
        } else {
            debug!("Queueing local change behind the in-flight update");
            let queued = self.queued.take().unwrap_or_default();
            self.queued = Some(queued.compose(&change));
            None
        }
    }
}
