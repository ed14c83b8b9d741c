// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 MCL Contributors

//! Non-local exception unwind.
//!
//! Modeled as a protected region: a function taking a closure that returns
//! a `Result`. Nesting falls out of ordinary
//! Rust call nesting — the call stack itself is the "previous jump buffer"
//! chain, so there is no explicit jump-buffer bookkeeping to maintain.
//!
//! `except_try` snapshots `stack_ptr`/`frame_ptr`, runs `f`, and on `Err`
//! unwinds: every stack slot pushed since the snapshot that points into the
//! heap is unreffed, then `stack_ptr`/`frame_ptr` are restored to the
//! snapshot.


use crate::addr::{Addr, SLOT_WIDTH};
use crate::context::Context;
use crate::error::ErrorCode;
use crate::string::string_unref;

/// Run `f` in a protected region, unwinding on error.
///
/// On success, returns `f`'s result unchanged. On error, every stack slot
/// pushed since entry that points into the heap is released, and
/// `stack_ptr`/`frame_ptr` are restored to their values at entry, before the
/// error code is returned to the caller.
pub fn except_try<U, F, T>(ctx: &mut Context<'_, U>, f: F) -> Result<T, ErrorCode>
where
    F: FnOnce(&mut Context<'_, U>) -> Result<T, ErrorCode>,
{
    let stack_snapshot = ctx.stack_ptr();
    let frame_snapshot = ctx.frame_ptr();

    match f(ctx) {
        Ok(value) => Ok(value),
        Err(code) => {
            unwind(ctx, stack_snapshot, frame_snapshot);
            Err(code)
        }
    }
}

/// Run `f` in a protected region, preserving a heap-allocated error message
/// across the unwind so it is the new top-of-stack entry on return.
///
/// `f` reports failure by returning `Err((code, message))`, where `message`
/// is a stack-resident string pointer (typically the top of `f`'s stack at
/// the point of failure) that should survive the unwind describing the
/// error. The slot holding `message` is kept resident for the whole unwind
/// pass — rather than popped and re-pushed by raw address — so that any
/// heap relocation triggered by releasing the *other* above-checkpoint
/// references keeps rewriting it exactly like every other live stack slot.
pub fn except_try_with_message<U, F, T>(
    ctx: &mut Context<'_, U>,
    f: F,
) -> Result<T, (ErrorCode, Addr)>
where
    F: FnOnce(&mut Context<'_, U>) -> Result<T, (ErrorCode, Addr)>,
{
    let stack_snapshot = ctx.stack_ptr();
    let frame_snapshot = ctx.frame_ptr();

    match f(ctx) {
        Ok(value) => Ok(value),
        Err((code, message)) => {
            let relocated_message = unwind_keeping(ctx, stack_snapshot, message);
            ctx.set_frame_ptr(frame_snapshot);
            ctx.push(relocated_message);
            Err((code, relocated_message))
        }
    }
}

fn unwind<U>(ctx: &mut Context<'_, U>, stack_snapshot: Addr, frame_snapshot: Addr) {
    while ctx.stack_ptr() != stack_snapshot {
        let value = ctx.pop();
        if ctx.heap_contains(value) {
            string_unref(ctx, value);
        }
    }
    ctx.set_frame_ptr(frame_snapshot);
}

/// Release every above-checkpoint heap reference except the one held in
/// `keep`'s slot, leaving that slot resident (so the relocating heap keeps
/// rewriting it) until every other slot has been processed. Returns the
/// slot's value once it has settled, i.e. after all relocations triggered by
/// releasing the other slots have happened. Does not touch `stack_ptr` or
/// `frame_ptr`; the caller restores both afterward.
fn unwind_keeping<U>(ctx: &mut Context<'_, U>, stack_snapshot: Addr, keep: Addr) -> Addr {
    let keep_slot = {
        let mut addr = ctx.stack_ptr();
        loop {
            assert!(addr != stack_snapshot, "carried message must be stack-resident");
            if ctx.read_slot(addr) == keep {
                break addr;
            }
            addr = addr.add(SLOT_WIDTH);
        }
    };

    let mut addr = ctx.stack_ptr();
    while addr != stack_snapshot {
        if addr != keep_slot {
            let value = ctx.read_slot(addr);
            if ctx.heap_contains(value) {
                string_unref(ctx, value);
            }
        }
        addr = addr.add(SLOT_WIDTH);
    }

    let relocated = ctx.read_slot(keep_slot);
    ctx.set_stack_ptr(stack_snapshot);
    relocated
}
