// SPDX-FileCopyrightText: 2025 cowrite contributors
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use super::helpers::attrs;
use cowrite::delta::{factories, Delta};
use pretty_assertions::assert_eq;

#[test]
fn insert_against_insert_with_priority() {
    let a = factories::insert(0, "A");
    let b = factories::insert(0, "B");

    // a happened first, so b is pushed behind a's insertion.
    let mut expected = Delta::default();
    expected.retain(1);
    expected.insert("B");
    assert_eq!(a.transform(&b, true), expected);
}

#[test]
fn insert_against_insert_without_priority() {
    let a = factories::insert(0, "A");
    let b = factories::insert(0, "B");

    let mut expected = Delta::default();
    expected.insert("B");
    expected.retain(1);
    assert_eq!(a.transform(&b, false), expected);
}

#[test]
fn insert_shifts_a_later_edit() {
    let a = factories::insert(0, ">> ");
    let b = factories::insert(5, "!");

    assert_eq!(a.transform(&b, true), factories::insert(8, "!"));
}

#[test]
fn unrelated_regions_pass_through() {
    let a = factories::insert(10, "xx");
    let b = factories::insert(2, "!");

    assert_eq!(a.transform(&b, true), factories::insert(2, "!"));
}

#[test]
fn delete_against_overlapping_delete_collapses() {
    let a = factories::delete(0, 3);
    let b = factories::delete(1, 3);

    // Characters 1..3 are already gone; only index 3 is left to delete.
    assert_eq!(a.transform(&b, true), factories::delete(0, 1));
}

#[test]
fn delete_shifts_a_later_delete() {
    let a = factories::delete(0, 2);
    let b = factories::delete(4, 2);

    assert_eq!(a.transform(&b, true), factories::delete(2, 2));
}

#[test]
fn retain_attributes_yield_to_priority() {
    let mut a = Delta::default();
    a.retain_attr(2, attrs(&[("color", "red")]));
    let mut b = Delta::default();
    b.retain_attr(2, attrs(&[("color", "blue"), ("font", "serif")]));

    // With priority, a's color wins; b keeps only its new key.
    let mut expected = Delta::default();
    expected.retain_attr(2, attrs(&[("font", "serif")]));
    assert_eq!(a.transform(&b, true), expected);

    // Without, b overwrites.
    let mut expected = Delta::default();
    expected.retain_attr(2, attrs(&[("color", "blue"), ("font", "serif")]));
    assert_eq!(a.transform(&b, false), expected);
}

#[test]
fn change_inside_a_deleted_range_keeps_only_inserts() {
    let a = factories::delete(0, 3);
    let b = factories::replace(1, 1, "x");

    let mut expected = Delta::default();
    expected.insert("x");
    assert_eq!(a.transform(&b, true), expected);
}

#[test]
fn transform_against_empty_is_identity() {
    let empty = Delta::default();
    let b = factories::replace(2, 1, "x");

    assert_eq!(empty.transform(&b, true), b);
    assert_eq!(empty.transform(&b, false), b);
}

#[test]
fn longer_deltas_interleave() {
    // a edits the middle, b edits both ends.
    let a = factories::replace(3, 2, "XY");
    let mut b = Delta::default();
    b.insert("(");
    b.retain(8);
    b.insert(")");

    let b_prime = a.transform(&b, true);
    let mut expected = Delta::default();
    expected.insert("(");
    expected.retain(8);
    expected.insert(")");
    assert_eq!(b_prime, expected);
}
