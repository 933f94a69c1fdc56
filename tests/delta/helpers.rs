// SPDX-FileCopyrightText: 2025 cowrite contributors
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Shared helpers for the algebra tests.

use cowrite::attributes::Attributes;
use cowrite::delta::Delta;
use rand::rngs::StdRng;
use rand::Rng;

pub fn doc(text: &str) -> Delta {
    let mut delta = Delta::default();
    delta.insert(text);
    delta
}

pub fn attrs(pairs: &[(&str, &str)]) -> Attributes {
    let mut attributes = Attributes::default();
    for (key, value) in pairs {
        attributes.insert(*key, *value);
    }
    attributes
}

const CHARS: [char; 6] = ['a', 'b', 'c', 'ö', '🥕', '\n'];

fn random_text(rng: &mut StdRng, len: usize) -> String {
    (0..len).map(|_| CHARS[rng.gen_range(0..CHARS.len())]).collect()
}

pub fn random_document(rng: &mut StdRng, max_len: usize) -> Delta {
    let len = rng.gen_range(1..=max_len);
    doc(&random_text(rng, len))
}

/// A random change valid against a document of `base_len` characters:
/// retains and deletes stay within the base, inserts go anywhere.
pub fn random_change(rng: &mut StdRng, base_len: usize) -> Delta {
    let mut delta = Delta::default();
    let mut remaining = base_len;
    while remaining > 0 {
        if rng.gen_bool(0.25) {
            let len = rng.gen_range(1..=3);
            let text = random_text(rng, len);
            delta.insert(text);
            continue;
        }
        let step = rng.gen_range(1..=remaining.min(3));
        if rng.gen_bool(0.5) {
            delta.retain(step);
        } else {
            delta.delete(step);
        }
        remaining -= step;
    }
    if rng.gen_bool(0.3) {
        let len = rng.gen_range(1..=3);
        let text = random_text(rng, len);
        delta.insert(text);
    }
    delta.chop();
    delta
}
