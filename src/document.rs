// SPDX-FileCopyrightText: 2025 cowrite contributors
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Operations that involve a *document* delta: a delta consisting solely
//! of inserts, representing whole content rather than a change to it.
//! Server-stored documents additionally end with a newline, and every
//! newline carries a [`NODE_ID_ATTR`] attribute naming its block.

use crate::attributes;
use crate::delta::Delta;
use crate::iterator::OpIterator;
use crate::operation::{InsertValue, OpKind, OpType};
use dissimilar::Chunk;
use thiserror::Error;

/// Attribute on a block-terminating newline that keeps rich-text blocks
/// addressable across edits.
pub const NODE_ID_ATTR: &str = "node_id";

/// Placeholder standing in for an embed while diffing text.
const EMBED_CHAR: char = '\0';

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DeltaError {
    #[error("not a document: documents contain only insert operations")]
    NotADocument,
}

impl Delta {
    /// A document delta contains nothing but inserts.
    pub fn is_document(&self) -> bool {
        self.iter().all(|op| op.op_type() == OpType::Insert)
    }

    /// Copy of the character range `start..end`.
    pub fn slice(&self, start: usize, end: usize) -> Self {
        let mut sliced = Self::default();
        let mut iter = OpIterator::new(self.ops());
        let mut index = 0;

        while index < end && iter.has_next() {
            if index < start {
                index += iter.take(start - index).len();
            } else {
                let op = iter.take(end - index);
                index += op.len();
                sliced.push(op);
            }
        }
        sliced
    }

    /// Returns the change undoing `self` against the document `base` it
    /// was applied to: `base.compose(self).compose(inverse) == base`.
    ///
    /// The base must be a document at least as long as `self` reaches;
    /// anything else is a caller bug.
    pub fn invert(&self, base: &Self) -> Self {
        let mut inverted = Self::default();
        let mut base_index = 0;

        for op in self {
            match op.op_type() {
                OpType::Insert => inverted.delete(op.len()),
                OpType::Retain if op.attributes().is_empty() => {
                    inverted.retain(op.len());
                    base_index += op.len();
                }
                // Deletes bring the removed content back; attributed
                // retains restore the previous attribute values.
                OpType::Retain | OpType::Delete => {
                    let length = op.len();
                    let removed = base.slice(base_index, base_index + length);
                    for base_op in &removed {
                        if op.op_type() == OpType::Delete {
                            inverted.push(base_op.clone());
                        } else {
                            inverted.retain_attr(
                                base_op.len(),
                                attributes::invert(op.attributes(), base_op.attributes()),
                            );
                        }
                    }
                    base_index += length;
                }
            }
        }

        inverted.chop();
        inverted
    }

    /// Returns the change that, composed onto `self`, yields `other`.
    /// Both deltas must be documents.
    pub fn diff(&self, other: &Self) -> Result<Self, DeltaError> {
        let this_text = diff_text(self)?;
        let other_text = diff_text(other)?;

        let mut change = Self::default();
        let mut this_iter = OpIterator::new(self.ops());
        let mut other_iter = OpIterator::new(other.ops());

        for chunk in dissimilar::diff(&this_text, &other_text) {
            match chunk {
                Chunk::Equal(s) => {
                    let mut remaining = s.chars().count();
                    while remaining > 0 {
                        let len = remaining
                            .min(this_iter.peek_len())
                            .min(other_iter.peek_len());
                        let this_op = this_iter.take(len);
                        let other_op = other_iter.take(len);
                        if this_op.insert_value() == other_op.insert_value() {
                            change.push(crate::operation::Op::retain_attr(
                                len,
                                attributes::diff(this_op.attributes(), other_op.attributes()),
                            ));
                        } else {
                            // Distinct embeds behind the same placeholder.
                            change.push(other_op);
                            change.delete(len);
                        }
                        remaining -= len;
                    }
                }
                Chunk::Delete(s) => {
                    let mut remaining = s.chars().count();
                    while remaining > 0 {
                        let len = remaining.min(this_iter.peek_len());
                        this_iter.take(len);
                        change.delete(len);
                        remaining -= len;
                    }
                }
                Chunk::Insert(s) => {
                    let mut remaining = s.chars().count();
                    while remaining > 0 {
                        let len = remaining.min(other_iter.peek_len());
                        change.push(other_iter.take(len));
                        remaining -= len;
                    }
                }
            }
        }

        change.chop();
        Ok(change)
    }
}

/// All insert payloads as one string, embeds replaced by a placeholder.
fn diff_text(delta: &Delta) -> Result<String, DeltaError> {
    let mut text = String::new();
    for op in delta {
        match op.kind() {
            OpKind::Insert(InsertValue::Text(s)) => text.push_str(s),
            OpKind::Insert(InsertValue::Embed(_)) => text.push(EMBED_CHAR),
            _ => return Err(DeltaError::NotADocument),
        }
    }
    Ok(text)
}
