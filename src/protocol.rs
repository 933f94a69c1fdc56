// SPDX-FileCopyrightText: 2025 cowrite contributors
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The wire protocol: JSON frames on a persistent duplex channel,
//! multiplexed by topic `document:<id>`.

use crate::delta::Delta;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const TOPIC_PREFIX: &str = "document:";

/// Opaque identifier of one document.
#[derive(
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    derive_more::AsRef,
    derive_more::Deref,
    derive_more::Display,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    /// Parses a `document:<id>` topic string.
    pub fn from_topic(topic: &str) -> Option<Self> {
        topic
            .strip_prefix(TOPIC_PREFIX)
            .filter(|id| !id.is_empty())
            .map(Self::new)
    }

    pub fn topic(&self) -> String {
        format!("{TOPIC_PREFIX}{}", self.0)
    }
}

/// Events a client may send on a document topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum ClientFrame {
    Join {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_id: Option<String>,
    },
    Update {
        version: usize,
        change: Delta,
    },
    Leave,
}

/// Events the server sends back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum ServerFrame {
    /// Snapshot sent once after a join.
    Open { version: usize, contents: Delta },
    /// A committed change from some other participant.
    Update { version: usize, change: Delta },
    /// Answer to the sender's own `update`.
    Reply(UpdateReply),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateReply {
    pub status: ReplyStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ErrorResponse>,
}

impl UpdateReply {
    pub fn ok() -> Self {
        Self {
            status: ReplyStatus::Ok,
            response: None,
        }
    }

    pub fn error<S: Into<String>>(reason: S) -> Self {
        Self {
            status: ReplyStatus::Error,
            response: Some(ErrorResponse {
                reason: reason.into(),
            }),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ReplyStatus::Ok
    }
}

/// A client frame together with the topic it was sent on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientMessage {
    pub topic: String,
    #[serde(flatten)]
    pub frame: ClientFrame,
}

impl ClientMessage {
    pub fn new(id: &DocumentId, frame: ClientFrame) -> Self {
        Self {
            topic: id.topic(),
            frame,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).with_context(|| format!("Failed to parse client frame: {json}"))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize client frame")
    }
}

/// A server frame together with the topic it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerMessage {
    pub topic: String,
    #[serde(flatten)]
    pub frame: ServerFrame,
}

impl ServerMessage {
    pub fn new(id: &DocumentId, frame: ServerFrame) -> Self {
        Self {
            topic: id.topic(),
            frame,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).with_context(|| format!("Failed to parse server frame: {json}"))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize server frame")
    }
}
