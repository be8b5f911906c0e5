//! Address Types and the Address-Space Seam
//!
//! Type-safe wrapper for user virtual addresses plus the page-table lookup
//! interface the trap layer depends on. The actual page tables are owned by
//! the embedding kernel; this layer only asks "is this address mapped, and
//! with what permissions?".
//!
//! # Security Properties
//! - Virtual addresses are never dereferenced without going through the
//!   syscall validator first
//! - User/kernel split is a compile-time constant checked before any
//!   page-table lookup

use bitflags::bitflags;
use core::fmt;

/// Page size (4 KiB)
pub const PAGE_SIZE: usize = 4096;
/// Page size mask
pub const PAGE_MASK: usize = PAGE_SIZE - 1;

/// Lowest user-mappable virtual address. Page zero is never mapped, so a
/// null dereference always shows up as a validation failure.
pub const USER_BASE: usize = PAGE_SIZE;

/// One past the highest user virtual address (48-bit canonical split).
/// Everything at or above this is kernel space.
pub const USER_LIMIT: usize = 0x0000_8000_0000_0000;

bitflags! {
    /// Permission bits reported by a page-table lookup.
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct MapFlags: u8 {
        /// The page is mapped.
        const PRESENT  = 1 << 0;
        /// The page is writable.
        const WRITABLE = 1 << 1;
        /// The page is accessible from user mode.
        const USER     = 1 << 2;
    }
}

/// A user-supplied virtual address.
///
/// Newtype wrapper so raw trap arguments cannot be used as pointers by
/// accident. Conversion to a real pointer only happens in the validator,
/// after every check has passed.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct VirtAddr(usize);

impl VirtAddr {
    /// Wrap a raw address value.
    #[inline]
    pub const fn new(addr: usize) -> Self {
        Self(addr)
    }

    /// Get the raw address value.
    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0
    }

    /// Check for the null address.
    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Check the address lies in the user region of the address space.
    #[inline]
    pub const fn in_user_range(self) -> bool {
        self.0 >= USER_BASE && self.0 < USER_LIMIT
    }

    /// Align the address down to the nearest page boundary.
    #[inline]
    pub const fn align_down(self) -> Self {
        Self(self.0 & !PAGE_MASK)
    }

    /// Add an offset, failing on address-space wraparound.
    #[inline]
    pub const fn checked_add(self, offset: usize) -> Option<Self> {
        match self.0.checked_add(offset) {
            Some(addr) => Some(Self(addr)),
            None => None,
        }
    }
}

impl fmt::Debug for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VirtAddr({:#018x})", self.0)
    }
}

impl fmt::Display for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Per-process address-space mapping, owned by the embedding kernel.
///
/// One instance per process. The trap layer only ever queries it; mapping
/// and unmapping pages is out of scope here.
pub trait AddressSpace: Send {
    /// Page-table lookup for `addr`.
    ///
    /// Returns `None` when the page is not mapped in this address space.
    fn query(&self, addr: VirtAddr) -> Option<MapFlags>;
}
