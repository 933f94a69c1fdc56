// SPDX-FileCopyrightText: 2025 cowrite contributors
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The operational-transformation core: `compose`, `transform` and
//! `transform_position` on [`Delta`].
//!
//! All three walk the operand deltas with [`OpIterator`], pairing
//! equal-length slices. An exhausted operand behaves like an endless
//! retain, so operands of different lengths pair up without special
//! cases; a trailing plain retain in the result is chopped off again.

use crate::attributes;
use crate::delta::Delta;
use crate::iterator::OpIterator;
use crate::operation::{Op, OpType};

impl Delta {
    /// Returns a delta equivalent to applying `self`, then `other`.
    pub fn compose(&self, other: &Self) -> Self {
        let mut this_iter = OpIterator::new(self.ops());
        let mut other_iter = OpIterator::new(other.ops());
        let mut composed = Self::default();

        while this_iter.has_next() || other_iter.has_next() {
            if other_iter.peek_type() == OpType::Insert {
                // New material is passed through unchanged.
                composed.push(other_iter.take(usize::MAX));
            } else if this_iter.peek_type() == OpType::Delete {
                // Deletions of the earlier change happen regardless of
                // what the later change does after them.
                composed.push(this_iter.take(usize::MAX));
            } else {
                let len = this_iter.peek_len().min(other_iter.peek_len());
                let this_op = this_iter.take(len);
                let other_op = other_iter.take(len);

                if other_op.op_type() == OpType::Retain {
                    let mut kept = if this_op.op_type() == OpType::Retain {
                        Op::retain(len)
                    } else {
                        Op::insert(this_op.insert_value().clone())
                    };
                    // A null removal marker only makes sense on a retain;
                    // on an insert the key is simply gone.
                    kept.set_attributes(attributes::compose(
                        this_op.attributes(),
                        other_op.attributes(),
                        this_op.op_type() == OpType::Retain,
                    ));
                    composed.push(kept);
                } else if other_op.op_type() == OpType::Delete
                    && this_op.op_type() == OpType::Retain
                {
                    composed.push(other_op);
                }
                // this insert + other delete cancel out.
            }
        }

        composed.chop();
        composed
    }

    /// Transforms `other` so that it applies to a document that has
    /// already seen `self`. With `priority`, `self` is considered to have
    /// happened first: on inserts at the same position `other` is pushed
    /// behind `self`'s insertion, and on attribute conflicts `self`'s
    /// keys win.
    pub fn transform(&self, other: &Self, priority: bool) -> Self {
        let mut this_iter = OpIterator::new(self.ops());
        let mut other_iter = OpIterator::new(other.ops());
        let mut transformed = Self::default();

        while this_iter.has_next() || other_iter.has_next() {
            if this_iter.peek_type() == OpType::Insert
                && (priority || other_iter.peek_type() != OpType::Insert)
            {
                // Skip past material `self` inserted.
                transformed.retain(this_iter.take(usize::MAX).len());
            } else if other_iter.peek_type() == OpType::Insert {
                transformed.push(other_iter.take(usize::MAX));
            } else {
                let len = this_iter.peek_len().min(other_iter.peek_len());
                let this_op = this_iter.take(len);
                let other_op = other_iter.take(len);

                if this_op.op_type() == OpType::Delete {
                    // The characters `other` was aiming at are gone.
                } else if other_op.op_type() == OpType::Delete {
                    transformed.push(other_op);
                } else {
                    transformed.push(Op::retain_attr(
                        len,
                        attributes::transform(
                            this_op.attributes(),
                            other_op.attributes(),
                            priority,
                        ),
                    ));
                }
            }
        }

        transformed.chop();
        transformed
    }

    /// Where a cursor at character offset `index` lands after this delta
    /// is applied. Inserts strictly before the cursor push it right,
    /// deletes before or across it pull it left (clamped); an insert
    /// exactly at the cursor does not move it (left gravity).
    pub fn transform_position(&self, mut index: usize) -> usize {
        let mut iter = OpIterator::new(self.ops());
        let mut offset = 0;

        while iter.has_next() && offset <= index {
            let len = iter.peek_len();
            let op_type = iter.peek_type();
            iter.take(usize::MAX);

            match op_type {
                OpType::Delete => {
                    index -= len.min(index - offset);
                }
                OpType::Insert => {
                    if offset < index {
                        index += len;
                    }
                    offset += len;
                }
                OpType::Retain => {
                    offset += len;
                }
            }
        }

        index
    }
}
