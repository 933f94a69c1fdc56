// SPDX-FileCopyrightText: 2025 cowrite contributors
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Attribute maps and the pure functions the delta algebra needs on them.
//!
//! An attribute set maps keys like `"bold"` or `"node_id"` to primitive
//! values. A value of [`AttrValue::Null`] marks a key for removal when the
//! attributes ride on a retain.

use crate::operation::AttrValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(flatten)]
    attr: HashMap<String, AttrValue>,
}

impl Attributes {
    pub fn insert<K: Into<String>, V: Into<AttrValue>>(&mut self, key: K, value: V) {
        self.attr.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.attr.is_empty()
    }

    /// Equality in the attribute sense: both maps hold the same keys with
    /// the same values.
    pub fn is_equal(&self, other: &Self) -> bool {
        diff(self, other).is_empty()
    }
}

impl Deref for Attributes {
    type Target = HashMap<String, AttrValue>;

    fn deref(&self) -> &Self::Target {
        &self.attr
    }
}

impl DerefMut for Attributes {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.attr
    }
}

impl From<HashMap<String, AttrValue>> for Attributes {
    fn from(attr: HashMap<String, AttrValue>) -> Self {
        Self { attr }
    }
}

/// Attribute result of composing two changes: `second` was applied after
/// `first` and wins on conflicts. `keep_null` is true when the composed
/// operation is a retain, where a `Null` must survive as a removal marker;
/// on an insert the removal has already happened, so nulls are dropped.
pub fn compose(first: &Attributes, second: &Attributes, keep_null: bool) -> Attributes {
    let mut merged = second.clone();
    for (key, value) in &**first {
        if !second.contains_key(key) {
            merged.insert(key.clone(), value.clone());
        }
    }
    if !keep_null {
        merged.retain(|_, value| !value.is_null());
    }
    merged
}

/// Transforms `second`'s attributes against `first`'s. With `priority`,
/// `first` happened first and keeps its keys: the result is `second` minus
/// every key `first` already set. Without priority `second` simply wins.
pub fn transform(first: &Attributes, second: &Attributes, priority: bool) -> Attributes {
    if first.is_empty() || second.is_empty() || !priority {
        return second.clone();
    }

    let mut kept = Attributes::default();
    for (key, value) in &**second {
        if !first.contains_key(key) {
            kept.insert(key.clone(), value.clone());
        }
    }
    kept
}

/// The attribute change that turns `from` into `to`: keys only in `from`
/// map to `Null`, keys that differ take `to`'s value.
pub fn diff(from: &Attributes, to: &Attributes) -> Attributes {
    let mut changed = Attributes::default();
    for key in from.keys().chain(to.keys()) {
        if from.get(key) != to.get(key) {
            match to.get(key) {
                Some(value) => changed.insert(key.clone(), value.clone()),
                None => changed.insert(key.clone(), AttrValue::Null),
            }
        }
    }
    changed
}

/// The attribute change undoing `change` against the attributes `base` the
/// change was applied to: previous values for keys the change overwrote,
/// `Null` for keys the change added.
pub fn invert(change: &Attributes, base: &Attributes) -> Attributes {
    let mut inverted = Attributes::default();
    for (key, value) in &**base {
        if base.get(key) != change.get(key) && change.contains_key(key) {
            inverted.insert(key.clone(), value.clone());
        }
    }
    for key in change.keys() {
        if change.get(key) != base.get(key) && !base.contains_key(key) {
            inverted.insert(key.clone(), AttrValue::Null);
        }
    }
    inverted
}
