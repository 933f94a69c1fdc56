// SPDX-FileCopyrightText: 2025 cowrite contributors
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The primitive of the delta algebra: a single insert, retain or delete
//! operation, with an optional attribute map describing formatting.

use crate::attributes::Attributes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Attribute values are JSON primitives. `Null` is distinct from an absent
/// key: on a retain it marks the attribute for removal.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Str(String),
    Int(i64),
    Bool(bool),
    Null,
}

impl AttrValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for AttrValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// What an insert carries: a run of text, or a single embedded object
/// (an image, for example). An embed has delta length 1.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InsertValue {
    Text(String),
    Embed(HashMap<String, AttrValue>),
}

impl InsertValue {
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

impl From<&str> for InsertValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for InsertValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<HashMap<String, AttrValue>> for InsertValue {
    fn from(embed: HashMap<String, AttrValue>) -> Self {
        Self::Embed(embed)
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    Insert(InsertValue),
    Retain(usize),
    Delete(usize),
}

/// The kind of an operation without its payload. Used when walking deltas.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OpType {
    Insert,
    Retain,
    Delete,
}

#[derive(Error, Debug)]
#[error("operation is not a text insert")]
pub struct NotText;

/// One step of a delta. Serializes to the wire shape
/// `{"insert": ..., "attributes": ...?}`, `{"retain": n, ...}` or
/// `{"delete": n}`.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Op {
    #[serde(flatten)]
    kind: OpKind,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    attributes: Attributes,
}

impl Op {
    pub fn insert<V: Into<InsertValue>>(value: V) -> Self {
        Self {
            kind: OpKind::Insert(value.into()),
            attributes: Attributes::default(),
        }
    }

    pub fn insert_attr<V: Into<InsertValue>>(value: V, attributes: Attributes) -> Self {
        Self {
            kind: OpKind::Insert(value.into()),
            attributes,
        }
    }

    pub fn retain(count: usize) -> Self {
        Self {
            kind: OpKind::Retain(count),
            attributes: Attributes::default(),
        }
    }

    pub fn retain_attr(count: usize, attributes: Attributes) -> Self {
        Self {
            kind: OpKind::Retain(count),
            attributes,
        }
    }

    /// Deletes carry no attributes.
    pub fn delete(count: usize) -> Self {
        Self {
            kind: OpKind::Delete(count),
            attributes: Attributes::default(),
        }
    }

    pub fn kind(&self) -> &OpKind {
        &self.kind
    }

    pub fn op_type(&self) -> OpType {
        match self.kind {
            OpKind::Insert(_) => OpType::Insert,
            OpKind::Retain(_) => OpType::Retain,
            OpKind::Delete(_) => OpType::Delete,
        }
    }

    /// Delta length of this operation. Text counts characters, not bytes;
    /// an embed counts as one character.
    pub fn len(&self) -> usize {
        match &self.kind {
            OpKind::Retain(n) | OpKind::Delete(n) => *n,
            OpKind::Insert(InsertValue::Text(s)) => s.chars().count(),
            OpKind::Insert(InsertValue::Embed(_)) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn set_attributes(&mut self, attributes: Attributes) {
        self.attributes = attributes;
    }

    /// The payload of an insert.
    ///
    /// # Panics
    ///
    /// Panics when called on a retain or delete; callers check the kind
    /// first.
    pub fn insert_value(&self) -> &InsertValue {
        match &self.kind {
            OpKind::Insert(value) => value,
            _ => panic!("insert_value() called on a non-insert operation"),
        }
    }

    pub fn text(&self) -> Result<&str, NotText> {
        match &self.kind {
            OpKind::Insert(InsertValue::Text(s)) => Ok(s),
            _ => Err(NotText),
        }
    }

    pub fn has_same_attributes(&self, other: &Self) -> bool {
        self.attributes.is_equal(&other.attributes)
    }
}

/// Character-exact substring, `start` and `len` in characters.
pub(crate) fn char_slice(s: &str, start: usize, len: usize) -> String {
    s.chars().skip(start).take(len).collect()
}
