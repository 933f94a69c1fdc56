// SPDX-FileCopyrightText: 2025 cowrite contributors
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use super::helpers::{attrs, doc};
use cowrite::delta::Delta;
use cowrite::operation::AttrValue;
use pretty_assertions::assert_eq;

#[test]
fn insert_then_insert() {
    let mut a = Delta::default();
    a.insert("A");
    let mut b = Delta::default();
    b.insert("B");

    // b's insert lands in front of a's.
    assert_eq!(a.compose(&b), doc("BA"));
}

#[test]
fn insert_then_retain_formats_the_insert() {
    let mut a = Delta::default();
    a.insert("A");

    let mut retain_attrs = attrs(&[("color", "red")]);
    retain_attrs.insert("bold", true);
    retain_attrs.insert("font", AttrValue::Null);
    let mut b = Delta::default();
    b.retain_attr(1, retain_attrs);

    // The null removal marker vanishes on the insert.
    let mut expected_attrs = attrs(&[("color", "red")]);
    expected_attrs.insert("bold", true);
    let mut expected = Delta::default();
    expected.insert_attr("A", expected_attrs);

    assert_eq!(a.compose(&b), expected);
}

#[test]
fn insert_then_delete_cancels() {
    let mut a = Delta::default();
    a.insert("A");
    let mut b = Delta::default();
    b.delete(1);

    assert_eq!(a.compose(&b), Delta::default());
}

#[test]
fn delete_then_insert_keeps_delete_first() {
    let mut a = Delta::default();
    a.delete(1);
    let mut b = Delta::default();
    b.insert("B");

    let mut expected = Delta::default();
    expected.delete(1);
    expected.insert("B");
    assert_eq!(a.compose(&b), expected);
}

#[test]
fn retain_then_retain_merges_attributes() {
    let mut a = Delta::default();
    a.retain_attr(1, attrs(&[("color", "blue")]));
    let mut b = Delta::default();
    b.retain_attr(1, attrs(&[("color", "red")]));

    let mut expected = Delta::default();
    expected.retain_attr(1, attrs(&[("color", "red")]));
    assert_eq!(a.compose(&b), expected);
}

#[test]
fn retain_keeps_null_for_later_removal() {
    let mut a = Delta::default();
    a.retain_attr(1, attrs(&[("color", "blue")]));
    let mut b = Delta::default();
    let mut removal = attrs(&[]);
    removal.insert("color", AttrValue::Null);
    b.retain_attr(1, removal.clone());

    let mut expected = Delta::default();
    expected.retain_attr(1, removal);
    assert_eq!(a.compose(&b), expected);
}

#[test]
fn retain_then_delete_deletes() {
    let mut a = Delta::default();
    a.retain_attr(1, attrs(&[("color", "blue")]));
    let mut b = Delta::default();
    b.delete(1);

    let mut expected = Delta::default();
    expected.delete(1);
    assert_eq!(a.compose(&b), expected);
}

#[test]
fn delete_happens_before_the_later_change() {
    let mut a = Delta::default();
    a.delete(1);
    let mut b = Delta::default();
    b.retain(1);
    b.insert("X");

    let mut expected = Delta::default();
    expected.delete(1);
    expected.retain(1);
    expected.insert("X");
    assert_eq!(a.compose(&b), expected);
}

#[test]
fn change_spanning_several_ops() {
    let mut bold = attrs(&[]);
    bold.insert("bold", true);

    let mut a = Delta::default();
    a.insert("Hel");
    a.insert_attr("lo", bold);
    let mut b = Delta::default();
    b.retain(3);
    b.delete(2);
    b.insert("p!");

    let mut expected = Delta::default();
    expected.insert("Help!");
    assert_eq!(a.compose(&b), expected);
}

#[test]
fn composition_matches_plain_text_editing() {
    let base = doc("Hello world!\n");

    let mut exclaim = Delta::default();
    exclaim.retain(12);
    exclaim.insert("!");

    let mut shout = Delta::default();
    shout.delete(5);
    shout.insert("HELLO");

    let once = base.compose(&exclaim).compose(&shout);
    let combined = base.compose(&exclaim.compose(&shout));
    assert_eq!(once, doc("HELLO world!!\n"));
    assert_eq!(combined, once);
}

#[test]
fn trailing_plain_retain_is_elided() {
    let mut a = Delta::default();
    a.insert("x");
    let mut b = Delta::default();
    b.retain(4);

    let mut expected = Delta::default();
    expected.insert("x");
    assert_eq!(a.compose(&b), expected);
}
