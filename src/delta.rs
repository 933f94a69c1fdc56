// SPDX-FileCopyrightText: 2025 cowrite contributors
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! A delta is an ordered sequence of operations and describes either a
//! whole document (inserts only) or a change to one (any mix of insert,
//! retain and delete).
//!
//! [`Delta::push`] keeps the sequence in canonical form: adjacent ops of
//! the same kind with equal attributes are merged, and when a delete and
//! an insert land at the same position, the delete is ordered first.
//! [`Delta::chop`] drops a trailing attribute-less retain. Keeping every
//! construction path on `push` is what makes delta equality meaningful.

use crate::attributes::Attributes;
use crate::operation::{InsertValue, Op, OpKind, OpType};
use serde::{Deserialize, Serialize};

#[derive(Clone, Default, PartialEq, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Delta {
    ops: Vec<Op>,
}

impl Delta {
    pub fn new(ops: Vec<Op>) -> Self {
        let mut delta = Self::default();
        for op in ops {
            delta.push(op);
        }
        delta
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<Op> {
        self.ops
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Op> {
        self.ops.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Sum of all operation lengths, regardless of kind.
    pub fn length(&self) -> usize {
        self.ops.iter().map(Op::len).sum()
    }

    pub fn insert<V: Into<InsertValue>>(&mut self, value: V) {
        self.push(Op::insert(value));
    }

    pub fn insert_attr<V: Into<InsertValue>>(&mut self, value: V, attributes: Attributes) {
        self.push(Op::insert_attr(value, attributes));
    }

    pub fn retain(&mut self, count: usize) {
        self.push(Op::retain(count));
    }

    pub fn retain_attr(&mut self, count: usize, attributes: Attributes) {
        self.push(Op::retain_attr(count, attributes));
    }

    pub fn delete(&mut self, count: usize) {
        self.push(Op::delete(count));
    }

    /// Appends an operation, merging it into the tail where possible.
    pub fn push(&mut self, new_op: Op) {
        if new_op.is_empty() {
            return;
        }
        let Some(last_op) = self.ops.pop() else {
            self.ops.push(new_op);
            return;
        };

        match new_op.kind() {
            OpKind::Insert(value) => {
                if last_op.op_type() == OpType::Insert && last_op.has_same_attributes(&new_op) {
                    if let (Ok(last_text), InsertValue::Text(new_text)) = (last_op.text(), value) {
                        let mut merged = Op::insert([last_text, new_text.as_str()].concat());
                        merged.set_attributes(new_op.attributes().clone());
                        self.ops.push(merged);
                        return;
                    }
                }
            }
            OpKind::Retain(count) => {
                if last_op.op_type() == OpType::Retain && last_op.has_same_attributes(&new_op) {
                    let mut merged = Op::retain(last_op.len() + count);
                    merged.set_attributes(new_op.attributes().clone());
                    self.ops.push(merged);
                    return;
                }
            }
            OpKind::Delete(count) => {
                if last_op.op_type() == OpType::Delete {
                    self.ops.push(Op::delete(last_op.len() + count));
                    return;
                }
                // A delete and an insert at the same position are ordered
                // delete-first, so that equal changes compare equal.
                if last_op.op_type() == OpType::Insert {
                    match self.ops.pop() {
                        Some(before) if before.op_type() == OpType::Delete => {
                            self.ops.push(Op::delete(before.len() + count));
                        }
                        Some(before) => {
                            self.ops.push(before);
                            self.ops.push(new_op);
                        }
                        None => self.ops.push(new_op),
                    }
                    self.ops.push(last_op);
                    return;
                }
            }
        }

        self.ops.push(last_op);
        self.ops.push(new_op);
    }

    /// Drops a trailing retain without attributes; such a tail changes
    /// nothing and would make equal deltas compare unequal.
    pub fn chop(&mut self) -> &mut Self {
        if let Some(last_op) = self.ops.last() {
            if last_op.op_type() == OpType::Retain && last_op.attributes().is_empty() {
                self.ops.pop();
            }
        }
        self
    }

    /// Appends every operation of `other`, merging at the seam.
    pub fn append(&mut self, other: Self) {
        for op in other.ops {
            self.push(op);
        }
    }
}

impl From<Vec<Op>> for Delta {
    fn from(ops: Vec<Op>) -> Self {
        Self::new(ops)
    }
}

impl FromIterator<Op> for Delta {
    fn from_iter<T: IntoIterator<Item = Op>>(iter: T) -> Self {
        let mut delta = Self::default();
        for op in iter {
            delta.push(op);
        }
        delta
    }
}

impl<'a> IntoIterator for &'a Delta {
    type Item = &'a Op;
    type IntoIter = std::slice::Iter<'a, Op>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

/// Shorthand constructors for tests and examples.
pub mod factories {
    use super::{Attributes, Delta};

    pub fn insert(at: usize, text: &str) -> Delta {
        let mut delta = Delta::default();
        delta.retain(at);
        delta.insert(text);
        delta
    }

    pub fn delete(from: usize, length: usize) -> Delta {
        let mut delta = Delta::default();
        delta.retain(from);
        delta.delete(length);
        delta
    }

    pub fn replace(from: usize, length: usize, text: &str) -> Delta {
        let mut delta = Delta::default();
        delta.retain(from);
        delta.delete(length);
        delta.insert(text);
        delta
    }

    /// A one-block document: `text` must end with the block newline.
    pub fn block_document(text: &str, node_id: &str) -> Delta {
        assert!(text.ends_with('\n'), "a document ends with a newline");
        let mut attributes = Attributes::default();
        attributes.insert(crate::document::NODE_ID_ATTR, node_id);
        let mut delta = Delta::default();
        let body = &text[..text.len() - 1];
        if !body.is_empty() {
            delta.insert(body);
        }
        delta.insert_attr("\n", attributes);
        delta
    }
}
