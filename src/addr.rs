// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 MCL Contributors

//! Arena-relative address newtype.
//!
//! An [`Addr`] is a byte offset measured from the start of the host-supplied
//! buffer, not a raw pointer. Every dereference goes through the owning
//! [`crate::Context`], which keeps the whole crate free of unsafe pointer
//! arithmetic while still matching the "pointer classified by address range"
//! model the arena substrate is built on.

#[cfg(test)]
mod addr_test;

use core::fmt;
use core::ops::{Add, Sub};

/// Pointer-slot width: one native machine word.
pub const SLOT_WIDTH: usize = core::mem::size_of::<usize>();

/// An offset into the host-supplied arena buffer.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Addr(usize);

impl Addr {
    /// Create a new arena-relative address.
    #[inline]
    #[must_use]
    pub const fn new(offset: usize) -> Self {
        Self(offset)
    }

    /// The raw byte offset.
    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0
    }

    /// Offset this address by `delta` bytes.
    #[inline]
    #[must_use]
    pub const fn add(self, delta: usize) -> Self {
        Self(self.0 + delta)
    }

    /// Offset this address backward by `delta` bytes.
    #[inline]
    #[must_use]
    pub const fn sub(self, delta: usize) -> Self {
        Self(self.0 - delta)
    }

    /// Distance from `other` to `self` (`self - other`).
    #[inline]
    #[must_use]
    pub const fn diff(self, other: Self) -> usize {
        self.0 - other.0
    }

    /// Round this offset up to the next multiple of the pointer-slot width.
    #[inline]
    #[must_use]
    pub const fn round_up_to_slot(self) -> Self {
        Self(round_up(self.0))
    }
}

/// Round a byte offset up to the next multiple of [`SLOT_WIDTH`].
#[inline]
#[must_use]
pub const fn round_up(offset: usize) -> usize {
    (offset + SLOT_WIDTH - 1) / SLOT_WIDTH * SLOT_WIDTH
}

impl Add<usize> for Addr {
    type Output = Self;

    #[inline]
    fn add(self, rhs: usize) -> Self {
        self.add(rhs)
    }
}

impl Sub<usize> for Addr {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: usize) -> Self {
        self.sub(rhs)
    }
}

impl fmt::Debug for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Addr({:#x})", self.0)
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Where a stack slot's value points, classified by address range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Region {
    /// Inside the live heap (`[heap_start, heap_ptr)`).
    Heap,
    /// Inside the occupied stack (`[stack_ptr, stack_end)`).
    Stack,
    /// Exactly `stack_end`, the chain terminator sentinel.
    Sentinel,
    /// Anything else: an opaque value the host attached meaning to.
    External,
}
