// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 MCL Contributors

//! Context & lifecycle.
//!
//! [`Context`] aggregates every piece of interpreter state: the host buffer,
//! the heap/stack cursors, the current frame pointer, and the host's opaque
//! user data. There is exactly one way to build one — [`init`] — and no
//! explicit destructor; the host reclaims the buffer whenever it wants.

mod arena;
mod heap;
#[cfg(test)]
mod heap_test;

use crate::error::ErrorCode;
use crate::except::except_try;
use crate::frame::frame_push;

/// Minimum buffer size, in pointer-slots, accepted by [`init`].
///
/// Derivation: two initial frames cost `2 * 2 = 4` slots, one minimum (empty)
/// string costs `round_up(4 bytes)` = 1 slot, rounded up with headroom for
/// `ctx_construct`'s own bookkeeping. See `DESIGN.md` for the full
/// derivation of this constant.
pub const MIN_HEAP_ENTRIES: usize = 8;

/// Debug-build tag confirming a [`Context`] completed construction.
#[cfg(debug_assertions)]
const TAG_VALID: u32 = 0x4D43_4C31;

/// Aggregates every piece of interpreter state living inside the host buffer.
///
/// `U` is the host's opaque user-data type, stored by value rather than as a
/// raw pointer — an opaque pointer is only opaque because C has no generics.
pub struct Context<'a, U = ()> {
    pub(crate) buf: &'a mut [u8],
    pub(crate) heap_ptr: usize,
    pub(crate) stack_ptr: usize,
    pub(crate) frame_ptr: usize,
    user_data: U,
    #[cfg(debug_assertions)]
    tag: u32,
}

impl<'a, U> Context<'a, U> {
    /// Read-only access to the host's opaque user data.
    #[must_use]
    pub const fn user_data(&self) -> &U {
        &self.user_data
    }

    /// Mutable access to the host's opaque user data.
    pub const fn user_data_mut(&mut self) -> &mut U {
        &mut self.user_data
    }

    /// Whether this context successfully completed `init`.
    ///
    /// Always `true` outside debug builds, where the tag sentinel is compiled
    /// out; a context can never be observed by a caller unless `init`
    /// returned `Ok`, so the sentinel only guards against internal misuse
    /// during construction.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        #[cfg(debug_assertions)]
        {
            self.tag == TAG_VALID
        }
        #[cfg(not(debug_assertions))]
        {
            true
        }
    }
}

/// Construct a context over a host-supplied buffer.
///
/// `buffer` must contain at least `MIN_HEAP_ENTRIES` pointer-slots, otherwise
/// this returns [`ErrorCode::OutOfMemory`] without touching `buffer`. On
/// success the heap occupies the low end of the buffer (empty), the stack
/// occupies the high end (empty), and two initial frames — a procedure-table
/// frame and a global-table frame — have been pushed.
pub fn init<U>(buffer: &mut [u8], user_data: U) -> Result<Context<'_, U>, ErrorCode> {
    use crate::addr::SLOT_WIDTH;

    if buffer.len() < MIN_HEAP_ENTRIES * SLOT_WIDTH {
        return Err(ErrorCode::OutOfMemory);
    }

    let stack_end = buffer.len();
    let mut ctx = Context {
        buf: buffer,
        heap_ptr: 0,
        stack_ptr: stack_end,
        frame_ptr: stack_end,
        user_data,
        #[cfg(debug_assertions)]
        tag: 0,
    };

    match except_try(&mut ctx, ctx_construct) {
        Ok(()) => {
            #[cfg(debug_assertions)]
            {
                ctx.tag = TAG_VALID;
            }
            Ok(ctx)
        }
        Err(code) => {
            #[cfg(debug_assertions)]
            {
                ctx.tag = 0;
            }
            Err(code)
        }
    }
}

/// Push the two frames every context starts with: a procedure table frame
/// (the bottom-most frame) and a global table frame above it.
fn ctx_construct<U>(ctx: &mut Context<'_, U>) -> Result<(), ErrorCode> {
    frame_push(ctx)?; // procedure table frame
    frame_push(ctx)?; // global table frame
    Ok(())
}
