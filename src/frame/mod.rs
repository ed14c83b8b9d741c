// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 MCL Contributors

//! Activation frame chain, threaded through the operand stack.
//!
//! A frame is a two-slot record `[prev_frame_pointer, self_pointer]` pushed
//! onto the stack. `self_pointer` addresses the slot holding
//! `prev_frame_pointer`, giving the frame a stable identity that survives a
//! linear scan in either direction. The bottom-most frame's
//! `prev_frame_pointer` equals `stack_end` (the chain terminator).


use crate::addr::{Addr, SLOT_WIDTH};
use crate::context::Context;
use crate::error::ErrorCode;
use crate::string::string_unref;

/// Push a new frame, linking it to the current one.
///
/// Requires two free stack slots; returns [`ErrorCode::OutOfMemory`] otherwise.
pub fn frame_push<U>(ctx: &mut Context<'_, U>) -> Result<(), ErrorCode> {
    if ctx.space() < 2 {
        return Err(ErrorCode::OutOfMemory);
    }

    let prev_frame_ptr = ctx.frame_ptr();
    ctx.push(prev_frame_ptr);
    let self_ptr = ctx.stack_ptr();
    ctx.set_frame_ptr(self_ptr);
    ctx.push(self_ptr);
    Ok(())
}

/// Pop the current frame, releasing every stack-resident heap reference
/// pushed since it was opened.
///
/// Unconditionally succeeds; there is always at least one frame below the
/// one being popped until the bottom-most (procedure table) frame.
pub fn frame_pop<U>(ctx: &mut Context<'_, U>) {
    let frame_ptr = ctx.frame_ptr();

    while ctx.stack_ptr() != frame_ptr {
        let value = ctx.pop();
        if ctx.heap_contains(value) {
            string_unref(ctx, value);
        }
    }

    // The loop above already consumed self_pointer (it sits below
    // prev_frame_pointer); only prev_frame_pointer itself remains.
    let prev_frame_ptr = ctx.pop();
    ctx.set_frame_ptr(prev_frame_ptr);
}

/// Walk the frame chain from the current frame toward the base.
///
/// - `level == 0` returns the current frame's address.
/// - `level > 0` walks toward the base; returns `None` if more levels are
///   requested than exist.
/// - `level < 0` walks from the current frame to the base, then indexes from
///   the base using `-1 - level` (so `-1` is the bottom frame). Requires
///   scratch stack space proportional to the frame count; returns
///   [`ErrorCode::OutOfMemory`] if there isn't enough.
pub fn frame_seek<U>(ctx: &mut Context<'_, U>, level: i64) -> Result<Option<Addr>, ErrorCode> {
    if level >= 0 {
        Ok(seek_toward_base(ctx, level as u64))
    } else {
        seek_from_base(ctx, level)
    }
}

/// `prev_frame_pointer` dereferenced one slot below `frame.self_pointer`
/// links to the previous frame's header.
fn prev_frame_of<U>(ctx: &Context<'_, U>, frame: Addr) -> Addr {
    ctx.read_slot(frame)
}

fn seek_toward_base<U>(ctx: &Context<'_, U>, level: u64) -> Option<Addr> {
    let mut frame = ctx.frame_ptr();
    for _ in 0..level {
        let prev = prev_frame_of(ctx, frame);
        if prev == ctx.stack_end() {
            return None;
        }
        frame = prev;
    }
    Some(frame)
}

fn seek_from_base<U>(ctx: &mut Context<'_, U>, level: i64) -> Result<Option<Addr>, ErrorCode> {
    let index = (-1 - level) as u64; // level == -1 -> index 0 (bottom frame)

    // Collect every frame address from the current one to the base into a
    // scratch list on the stack, discarded before returning.
    let mut frame = ctx.frame_ptr();
    let mut count: u64 = 0;
    loop {
        if ctx.space() < 1 {
            return Err(ErrorCode::OutOfMemory);
        }
        ctx.push(frame);
        count += 1;
        let prev = prev_frame_of(ctx, frame);
        if prev == ctx.stack_end() {
            break;
        }
        frame = prev;
    }

    // The scratch list was pushed current-frame-first, base-last, so the
    // base sits at the lowest address (the current top of stack) and index
    // `i` (0 = base) sits `i` slots above that.
    let result = if index < count {
        let addr = ctx.stack_ptr().add((index as usize) * SLOT_WIDTH);
        Some(ctx.read_slot(addr))
    } else {
        None
    };

    ctx.pop_n(count as usize);
    Ok(result)
}
