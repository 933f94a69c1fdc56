// SPDX-FileCopyrightText: 2025 cowrite contributors
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Algebraic laws, checked on hand-picked cases and randomized sweeps.

use super::helpers::{attrs, doc, random_change, random_document};
use cowrite::delta::{factories, Delta};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn compose_is_associative() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let base = random_document(&mut rng, 12);
        let a = random_change(&mut rng, base.length());
        let after_a = base.compose(&a);
        let b = random_change(&mut rng, after_a.length());
        let after_b = after_a.compose(&b);
        let c = random_change(&mut rng, after_b.length());

        let left = a.compose(&b.compose(&c));
        let right = a.compose(&b).compose(&c);
        assert_eq!(left, right, "base {base:?}, a {a:?}, b {b:?}, c {c:?}");
        assert_eq!(base.compose(&left), after_b.compose(&c));
    }
}

#[test]
fn invert_round_trips_to_the_base() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..200 {
        let base = random_document(&mut rng, 12);
        let change = random_change(&mut rng, base.length());
        let inverse = change.invert(&base);

        assert_eq!(
            base.compose(&change).compose(&inverse),
            base,
            "change {change:?}, inverse {inverse:?}"
        );
    }
}

#[test]
fn invert_round_trips_with_formatting() {
    let base = doc("Hello world!\n");

    let mut change = Delta::default();
    change.retain(2);
    change.retain_attr(3, attrs(&[("bold", "true")]));
    change.delete(2);
    change.insert_attr("?", attrs(&[("color", "red")]));

    let inverse = change.invert(&base);
    assert_eq!(base.compose(&change).compose(&inverse), base);
}

#[test]
fn diff_composes_to_the_target() {
    let mut rng = StdRng::seed_from_u64(13);
    for _ in 0..200 {
        let a = random_document(&mut rng, 12);
        let b = random_document(&mut rng, 12);

        let change = a.diff(&b).unwrap();
        assert_eq!(a.compose(&change), b, "a {a:?}, b {b:?}");
    }
}

/// The TP1 convergence property: transforming each of two concurrent
/// changes against the other (with opposite tie-breaking) leads both
/// compositions to the same document.
#[test]
fn transform_satisfies_tp1() {
    let mut rng = StdRng::seed_from_u64(17);
    for _ in 0..500 {
        let base = random_document(&mut rng, 12);
        let a = random_change(&mut rng, base.length());
        let b = random_change(&mut rng, base.length());

        let via_a = base.compose(&a).compose(&a.transform(&b, false));
        let via_b = base.compose(&b).compose(&b.transform(&a, true));
        assert_eq!(via_a, via_b, "base {base:?}, a {a:?}, b {b:?}");
    }
}

#[test]
fn tp1_holds_for_attribute_conflicts() {
    let base = doc("ab");

    let mut a = Delta::default();
    a.retain_attr(2, attrs(&[("color", "red")]));
    let mut b = Delta::default();
    b.retain_attr(2, attrs(&[("color", "blue"), ("font", "serif")]));

    let via_a = base.compose(&a).compose(&a.transform(&b, false));
    let via_b = base.compose(&b).compose(&b.transform(&a, true));
    assert_eq!(via_a, via_b);

    // Without priority, b's value survives on both paths.
    let mut expected = Delta::default();
    expected.insert_attr("ab", attrs(&[("color", "blue"), ("font", "serif")]));
    assert_eq!(via_a, expected);
}

#[test]
fn tp1_holds_for_inserts_at_the_same_position() {
    let base = doc("Hello world!\n");
    let a = factories::insert(0, "A");
    let b = factories::insert(0, "B");

    let via_a = base.compose(&a).compose(&a.transform(&b, false));
    let via_b = base.compose(&b).compose(&b.transform(&a, true));
    assert_eq!(via_a, via_b);
    assert_eq!(via_a, doc("BAHello world!\n"));
}

#[test]
fn transform_position_is_monotonic() {
    let mut rng = StdRng::seed_from_u64(19);
    for _ in 0..200 {
        let base = random_document(&mut rng, 12);
        let change = random_change(&mut rng, base.length());

        let mut previous = 0;
        for position in 0..=base.length() {
            let mapped = change.transform_position(position);
            assert!(
                mapped >= previous,
                "position {position} mapped to {mapped}, before {previous} ({change:?})"
            );
            previous = mapped;
        }
    }
}
