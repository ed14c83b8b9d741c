// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 MCL Contributors

//! Tests for address arithmetic and rounding.

use super::{Addr, SLOT_WIDTH, round_up};

#[test]
fn round_up_is_identity_on_slot_boundaries() {
    for i in 0..8 {
        let p = i * SLOT_WIDTH;
        assert_eq!(round_up(p), p);
    }
}

#[test]
fn round_up_matches_ceiling_division() {
    for p in 0..256 {
        let expected = p.div_ceil(SLOT_WIDTH) * SLOT_WIDTH;
        assert_eq!(round_up(p), expected, "p = {p}");
    }
}

#[test]
fn addr_add_sub_diff_roundtrip() {
    let a = Addr::new(100);
    let b = a.add(40);
    assert_eq!(b.as_usize(), 140);
    assert_eq!(b.sub(40), a);
    assert_eq!(b.diff(a), 40);
}

#[test]
fn addr_round_up_to_slot() {
    let a = Addr::new(SLOT_WIDTH + 1);
    assert_eq!(a.round_up_to_slot().as_usize(), 2 * SLOT_WIDTH);
}
