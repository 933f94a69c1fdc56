// SPDX-FileCopyrightText: 2025 cowrite contributors
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! A pull-based iterator over the *content* of a delta: it does not just
//! step from op to op but can take a slice of the requested length out of
//! the current op, which is what the compose/transform/diff walks need.

use crate::operation::{char_slice, Op, OpType};

pub struct OpIterator<'a> {
    ops: &'a [Op],
    /// Index of the op we are currently consuming.
    index: usize,
    /// Characters of that op already handed out.
    offset: usize,
}

impl<'a> OpIterator<'a> {
    pub fn new(ops: &'a [Op]) -> Self {
        Self {
            ops,
            index: 0,
            offset: 0,
        }
    }

    pub fn has_next(&self) -> bool {
        self.index < self.ops.len()
    }

    /// Remaining length of the op under the cursor, or `usize::MAX` when
    /// the iterator is exhausted. An exhausted iterator behaves like an
    /// endless retain, which lets the walks pair deltas of different
    /// lengths without special cases.
    pub fn peek_len(&self) -> usize {
        match self.ops.get(self.index) {
            Some(op) => op.len() - self.offset,
            None => usize::MAX,
        }
    }

    pub fn peek_type(&self) -> OpType {
        match self.ops.get(self.index) {
            Some(op) => op.op_type(),
            None => OpType::Retain,
        }
    }

    /// Takes up to `len` characters from the current op. Shorter requests
    /// split the op; longer ones return its remainder. On an exhausted
    /// iterator this returns the endless phantom retain.
    pub fn take(&mut self, len: usize) -> Op {
        let Some(next_op) = self.ops.get(self.index) else {
            return Op::retain(usize::MAX);
        };

        let offset = self.offset;
        let remaining = next_op.len() - offset;
        let taken = if len >= remaining {
            self.index += 1;
            self.offset = 0;
            remaining
        } else {
            self.offset += len;
            len
        };

        match next_op.op_type() {
            OpType::Delete => Op::delete(taken),
            OpType::Retain => {
                let mut op = Op::retain(taken);
                op.set_attributes(next_op.attributes().clone());
                op
            }
            OpType::Insert => match next_op.text() {
                Ok(s) => {
                    let mut op = Op::insert(char_slice(s, offset, taken));
                    op.set_attributes(next_op.attributes().clone());
                    op
                }
                // An embed has length 1 and is never split.
                Err(_) => next_op.clone(),
            },
        }
    }

}
