// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 MCL Contributors

//! # MCL core
//!
//! Embeddable runtime core for a minimal command-language interpreter,
//! sized for microcontroller-class environments.
//!
//! This crate provides:
//! - A single-buffer, bidirectional arena: a compacting heap growing up
//!   from the start and a pointer-tagged operand stack growing down from
//!   the end
//! - Reference-counted, length-prefixed string objects living on the heap
//! - An activation-frame chain threaded through the operand stack,
//!   seekable from either end
//! - Non-local exception unwind via a protected-region call instead of
//!   `setjmp`/`longjmp`
//!
//! The host owns the backing buffer and drives the interpreter entirely
//! through [`Context`]; there is no global state and no allocation outside
//! the buffer the host supplies.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod addr;
pub mod context;
pub mod error;
pub mod except;
pub mod frame;
pub mod string;

// Re-export commonly used types at crate root
pub use addr::Addr;
pub use context::{Context, init};
pub use error::ErrorCode;
pub use except::{except_try, except_try_with_message};
pub use frame::{frame_pop, frame_push, frame_seek};
pub use string::{
    string_alloc, string_bytes, string_compare, string_grow, string_new, string_ref,
    string_shrink, string_unref,
};
