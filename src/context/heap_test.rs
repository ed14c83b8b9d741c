// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 MCL Contributors

//! Tests for the relocating heap: neighbour content survives grow/shrink,
//! freeing a non-topmost block relocates correctly, and the
//! alloc-shift-free end-to-end scenario.

use crate::addr::SLOT_WIDTH;
use crate::context::init;

#[test]
fn grow_preserves_neighbour_content() {
    let mut buf = vec![0u8; 64 * SLOT_WIDTH];
    let mut ctx = init(&mut buf, ()).unwrap();

    let a = ctx.heap_alloc(8);
    ctx.buf[a.as_usize()..a.as_usize() + 8].copy_from_slice(b"AAAAAAAA");
    let b = ctx.heap_alloc(8);
    ctx.buf[b.as_usize()..b.as_usize() + 8].copy_from_slice(b"BBBBBBBB");

    ctx.push(b); // only B is stack-resident; A is referenced by its own local var

    ctx.heap_grow(a, 8, 16);
    let new_b = ctx.pop();
    assert_eq!(new_b, b.add(8));
    assert_eq!(&ctx.buf[new_b.as_usize()..new_b.as_usize() + 8], b"BBBBBBBB");
}

#[test]
fn shrink_preserves_neighbour_content() {
    let mut buf = vec![0u8; 64 * SLOT_WIDTH];
    let mut ctx = init(&mut buf, ()).unwrap();

    let a = ctx.heap_alloc(16);
    ctx.buf[a.as_usize()..a.as_usize() + 16].fill(b'A');
    let b = ctx.heap_alloc(8);
    ctx.buf[b.as_usize()..b.as_usize() + 8].copy_from_slice(b"BBBBBBBB");

    ctx.push(b);
    ctx.heap_shrink(a, 16, 4);
    let new_b = ctx.pop();
    assert_eq!(new_b, b.sub(12));
    assert_eq!(&ctx.buf[new_b.as_usize()..new_b.as_usize() + 8], b"BBBBBBBB");
}

#[test]
fn free_relocates_and_reclaims_space() {
    let mut buf = vec![0u8; 256 * SLOT_WIDTH];
    let mut ctx = init(&mut buf, ()).unwrap();
    let space_before = ctx.space();

    // Ten blocks, 8 bytes each, filled with a distinct byte per block.
    let mut ptrs = Vec::new();
    for i in 0..10u8 {
        let p = ctx.heap_alloc(8);
        ctx.buf[p.as_usize()..p.as_usize() + 8].fill(b'a' + i);
        ptrs.push(p);
        ctx.push(p);
    }
    let space_after_allocs = ctx.space();

    // Free the 3rd block (index 2).
    let freed = ptrs[2];
    ctx.heap_free(freed, 8);

    // Re-read every stack slot (rewritten by relocation) and verify content.
    let mut surviving = Vec::new();
    for _ in 0..10 {
        surviving.push(ctx.pop());
    }
    surviving.reverse(); // restore push order

    for (i, p) in surviving.iter().enumerate() {
        if i == 2 {
            continue; // freed block, no longer valid
        }
        let expected = b'a' + i as u8;
        assert_eq!(ctx.buf[p.as_usize()], expected, "block {i}");
    }

    assert_eq!(ctx.space(), space_after_allocs + 8 / SLOT_WIDTH);
    assert!(ctx.space() < space_before); // nine blocks remain allocated
}

#[test]
fn alloc_shift_free_scenario_s1() {
    let mut buf = vec![0u8; 8192 * SLOT_WIDTH];
    let mut ctx = init(&mut buf, ()).unwrap();

    let bottom = ctx.heap_alloc(7);
    let middle = ctx.heap_alloc(13);
    let top = ctx.heap_alloc(21);
    ctx.push(bottom);
    ctx.push(middle);
    ctx.push(top);

    ctx.heap_shrink(middle, 13, 5);
    let top_after_shrink = ctx.pop();
    assert_eq!(top_after_shrink, top.sub(8));
    let middle_after_shrink = ctx.pop();
    assert_eq!(middle_after_shrink, middle);
    let bottom_after_shrink = ctx.pop();
    assert_eq!(bottom_after_shrink, bottom);
    ctx.push(bottom_after_shrink);
    ctx.push(middle_after_shrink);
    ctx.push(top_after_shrink);

    ctx.heap_free(middle_after_shrink, 5);
    let top_after_free = ctx.pop();
    assert_eq!(top_after_free, top_after_shrink.sub(5));
    let middle_slot_is_gone = ctx.pop();
    assert_eq!(middle_slot_is_gone, middle_after_shrink);
    let bottom_after_free = ctx.pop();
    assert_eq!(bottom_after_free, bottom_after_shrink);
}

#[test]
fn heap_alloc_zero_is_a_no_op_bump() {
    let mut buf = vec![0u8; 32 * SLOT_WIDTH];
    let mut ctx = init(&mut buf, ()).unwrap();
    let before = ctx.heap_ptr();
    let addr = ctx.heap_alloc(0);
    assert_eq!(addr, before);
    assert_eq!(ctx.heap_ptr(), before);
}
