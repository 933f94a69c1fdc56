// SPDX-FileCopyrightText: 2025 cowrite contributors
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use super::helpers::{attrs, doc};
use cowrite::delta::{factories, Delta};
use cowrite::operation::AttrValue;
use pretty_assertions::assert_eq;

#[test]
fn insert_inverts_to_delete() {
    let base = doc("Hello");
    let change = factories::insert(2, "xy");

    assert_eq!(change.invert(&base), factories::delete(2, 2));
}

#[test]
fn delete_inverts_to_reinsert_from_base() {
    let base = doc("Hello");
    let change = factories::delete(1, 3);

    let mut expected = Delta::default();
    expected.retain(1);
    expected.insert("ell");
    assert_eq!(change.invert(&base), expected);
}

#[test]
fn delete_restores_formatting_from_base() {
    let mut bold = attrs(&[]);
    bold.insert("bold", true);

    let mut base = Delta::default();
    base.insert("He");
    base.insert_attr("ll", bold.clone());
    base.insert("o");

    let change = factories::delete(1, 3);
    let inverse = change.invert(&base);

    let mut expected = Delta::default();
    expected.retain(1);
    expected.insert("e");
    expected.insert_attr("ll", bold);
    assert_eq!(inverse, expected);
}

#[test]
fn format_inverts_to_previous_values() {
    let base = doc("Hello\nWorld");

    let mut change = Delta::default();
    change.retain_attr(6, attrs(&[("bold", "yes")]));
    change.insert("!");
    change.delete(5);

    let inverse = change.invert(&base);

    let mut removal = attrs(&[]);
    removal.insert("bold", AttrValue::Null);
    let mut expected = Delta::default();
    expected.retain_attr(6, removal);
    expected.delete(1);
    expected.insert("World");
    assert_eq!(inverse, expected);
}

#[test]
fn format_change_restores_the_overwritten_value() {
    let mut base = Delta::default();
    base.insert_attr("ab", attrs(&[("color", "blue")]));

    let mut change = Delta::default();
    change.retain_attr(2, attrs(&[("color", "red")]));

    let inverse = change.invert(&base);

    let mut expected = Delta::default();
    expected.retain_attr(2, attrs(&[("color", "blue")]));
    assert_eq!(inverse, expected);
}

#[test]
fn round_trip_composes_to_the_base() {
    let base = doc("Hello world!\n");
    let change = factories::replace(6, 5, "there");

    let inverse = change.invert(&base);
    assert_eq!(base.compose(&change).compose(&inverse), base);
}
