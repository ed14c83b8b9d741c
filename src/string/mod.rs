// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 MCL Contributors

//! Reference-counted, length-prefixed, mutable-length string objects.
//!
//! Wire layout (stable within a process):
//!
//! ```text
//! offset 0:          u8      refcount (1..255)
//! offset 1:          u16 LE  length (0..=MAX_STRING_LEN)
//! offset 3:          u8[len] payload
//! offset 3+len:      u8      0x00 (NUL)
//! ```
//!
//! Growing, shrinking, and unreffing a string may relocate the heap suffix
//! above it (see [`crate::context::Context`]'s relocating heap). Any caller
//! holding a string's `Addr` in a local variable across one of those calls
//! must reload it from a stack slot afterward.


use crate::addr::Addr;
use crate::context::Context;
use crate::error::ErrorCode;

/// Maximum payload length a string object may hold.
pub const MAX_STRING_LEN: usize = 32767;

const HEADER_LEN: usize = 3;
const REFCOUNT_MAX: u8 = 255;

fn total_size(len: usize) -> usize {
    HEADER_LEN + len + 1 // header + payload + NUL
}

fn read_refcount<U>(ctx: &Context<'_, U>, ptr: Addr) -> u8 {
    ctx.buf[ptr.as_usize()]
}

fn write_refcount<U>(ctx: &mut Context<'_, U>, ptr: Addr, count: u8) {
    ctx.buf[ptr.as_usize()] = count;
}

fn read_length<U>(ctx: &Context<'_, U>, ptr: Addr) -> usize {
    let o = ptr.as_usize() + 1;
    u16::from_le_bytes([ctx.buf[o], ctx.buf[o + 1]]) as usize
}

fn write_length<U>(ctx: &mut Context<'_, U>, ptr: Addr, len: usize) {
    let bytes = (len as u16).to_le_bytes();
    let o = ptr.as_usize() + 1;
    ctx.buf[o] = bytes[0];
    ctx.buf[o + 1] = bytes[1];
}

fn payload_start(ptr: Addr) -> usize {
    ptr.as_usize() + HEADER_LEN
}

/// Read a string object's payload bytes.
#[must_use]
pub fn string_bytes<'c, U>(ctx: &'c Context<'_, U>, ptr: Addr) -> &'c [u8] {
    let len = read_length(ctx, ptr);
    let start = payload_start(ptr);
    &ctx.buf[start..start + len]
}

/// Allocate a new string object of `len` bytes, zero-initialized.
///
/// Returns [`ErrorCode::OutOfMemory`] if `len` exceeds [`MAX_STRING_LEN`] or
/// there isn't `4 + len` free bytes.
pub fn string_alloc<U>(ctx: &mut Context<'_, U>, len: usize) -> Result<Addr, ErrorCode> {
    if len > MAX_STRING_LEN || ctx.free_bytes() < total_size(len) {
        return Err(ErrorCode::OutOfMemory);
    }

    let ptr = ctx.heap_alloc(total_size(len));
    write_refcount(ctx, ptr, 1);
    write_length(ctx, ptr, len);
    let start = payload_start(ptr);
    ctx.buf[start..start + len].fill(0);
    ctx.buf[start + len] = 0; // NUL terminator
    Ok(ptr)
}

/// Allocate a new string object initialized with `bytes`.
pub fn string_new_with_len<U>(ctx: &mut Context<'_, U>, bytes: &[u8]) -> Result<Addr, ErrorCode> {
    let ptr = string_alloc(ctx, bytes.len())?;
    let start = payload_start(ptr);
    ctx.buf[start..start + bytes.len()].copy_from_slice(bytes);
    Ok(ptr)
}

/// Allocate a new string object initialized from a UTF-8 str.
pub fn string_new<U>(ctx: &mut Context<'_, U>, s: &str) -> Result<Addr, ErrorCode> {
    string_new_with_len(ctx, s.as_bytes())
}

/// Increment a string's reference count.
///
/// Returns [`ErrorCode::RefcountOverflow`] if the count is already 255 —
/// recoverable by design (see `DESIGN.md`), not a process abort.
pub fn string_ref<U>(ctx: &mut Context<'_, U>, ptr: Addr) -> Result<Addr, ErrorCode> {
    let count = read_refcount(ctx, ptr);
    if count >= REFCOUNT_MAX {
        return Err(ErrorCode::RefcountOverflow);
    }
    write_refcount(ctx, ptr, count + 1);
    Ok(ptr)
}

/// Decrement a string's reference count, freeing the block when it reaches zero.
pub fn string_unref<U>(ctx: &mut Context<'_, U>, ptr: Addr) {
    let count = read_refcount(ctx, ptr);
    if count <= 1 {
        let len = read_length(ctx, ptr);
        ctx.heap_free(ptr, total_size(len));
    } else {
        write_refcount(ctx, ptr, count - 1);
    }
}

/// Grow a string in place to `new_len` bytes (`new_len > old_len`), via the
/// relocating heap. New bytes are zero-initialized.
pub fn string_grow<U>(ctx: &mut Context<'_, U>, ptr: Addr, new_len: usize) -> Result<(), ErrorCode> {
    let old_len = read_length(ctx, ptr);
    debug_assert!(new_len >= old_len);

    if new_len > MAX_STRING_LEN || ctx.free_bytes() < total_size(new_len) - total_size(old_len) {
        return Err(ErrorCode::OutOfMemory);
    }

    ctx.heap_grow(ptr, total_size(old_len), total_size(new_len));
    write_length(ctx, ptr, new_len);
    let start = payload_start(ptr);
    ctx.buf[start + old_len..start + new_len].fill(0);
    ctx.buf[start + new_len] = 0;
    Ok(())
}

/// Shrink a string in place to `new_len` bytes (`new_len < old_len`), via the
/// relocating heap.
pub fn string_shrink<U>(ctx: &mut Context<'_, U>, ptr: Addr, new_len: usize) {
    let old_len = read_length(ctx, ptr);
    debug_assert!(new_len <= old_len);

    ctx.heap_shrink(ptr, total_size(old_len), total_size(new_len));
    write_length(ctx, ptr, new_len);
    let start = payload_start(ptr);
    ctx.buf[start + new_len] = 0;
}

/// Lexicographic comparison of two strings' payloads, ties broken by length.
#[must_use]
pub fn string_compare<U>(ctx: &Context<'_, U>, a: Addr, b: Addr) -> core::cmp::Ordering {
    string_bytes(ctx, a).cmp(string_bytes(ctx, b))
}
