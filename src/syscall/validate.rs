//! User Pointer Validation
//!
//! Every pointer a user program hands across the trap boundary goes through
//! here before it is dereferenced. This is the sole defense against a user
//! process steering the kernel at arbitrary memory, so the checks run
//! synchronously and before any side effect of the handler that uses the
//! pointer.
//!
//! # Checks
//! 1. The address is not null
//! 2. The address lies in the user region of the address space
//! 3. The page is actually mapped, with user access, in the calling
//!    process's address space
//!
//! A failed check is fatal to the calling process (exit status -1), never
//! to the kernel: the dispatcher turns the returned [`Fault`] into process
//! termination.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::mm::{AddressSpace, MapFlags, VirtAddr, PAGE_SIZE};

/// Longest path (in bytes, excluding the terminator) a user string read
/// will walk before giving up.
pub const PATH_MAX: usize = 256;

/// Why a user pointer was rejected.
///
/// Any of these terminates the offending process; they are diagnostics for
/// the kernel log, not errors a handler can recover from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// The pointer was null.
    NullPointer,
    /// The pointer was outside the user region.
    KernelAddress,
    /// The page is not mapped in the calling process's address space.
    NotMapped,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NullPointer => write!(f, "null pointer"),
            Self::KernelAddress => write!(f, "address outside user region"),
            Self::NotMapped => write!(f, "unmapped address"),
        }
    }
}

/// Check a single user address: non-null, in the user region, and mapped
/// with user access in `aspace`.
pub fn validate(aspace: &dyn AddressSpace, addr: VirtAddr) -> Result<(), Fault> {
    if addr.is_null() {
        return Err(Fault::NullPointer);
    }
    if !addr.in_user_range() {
        return Err(Fault::KernelAddress);
    }
    match aspace.query(addr) {
        Some(flags) if flags.contains(MapFlags::PRESENT | MapFlags::USER) => Ok(()),
        _ => Err(Fault::NotMapped),
    }
}

/// Check every page a `len`-byte buffer at `addr` touches.
///
/// The base address is checked even for zero-length buffers; a bad pointer
/// is a bad pointer regardless of the size argument next to it.
pub fn validate_range(
    aspace: &dyn AddressSpace,
    addr: VirtAddr,
    len: usize,
) -> Result<(), Fault> {
    validate(aspace, addr)?;
    if len < 2 {
        return Ok(());
    }
    let last = addr.checked_add(len - 1).ok_or(Fault::KernelAddress)?;
    // step through each page boundary the buffer crosses
    let mut page = addr.align_down().as_usize() + PAGE_SIZE;
    while page <= last.as_usize() {
        validate(aspace, VirtAddr::new(page))?;
        page += PAGE_SIZE;
    }
    Ok(())
}

/// A validated read-only user buffer.
///
/// Only constructed after [`validate_range`] has passed on the whole span.
#[derive(Debug)]
pub struct UserBuffer {
    ptr: *const u8,
    len: usize,
}

impl UserBuffer {
    /// View the buffer as a byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        if self.len == 0 {
            return &[];
        }
        // SAFETY: every page of ptr..ptr+len was validated as a mapped user
        // address before this struct was constructed.
        unsafe { core::slice::from_raw_parts(self.ptr, self.len) }
    }
}

/// A validated writable user buffer.
#[derive(Debug)]
pub struct UserBufferMut {
    ptr: *mut u8,
    len: usize,
}

impl UserBufferMut {
    /// View the buffer as a mutable byte slice.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        if self.len == 0 {
            return &mut [];
        }
        // SAFETY: same validation as UserBuffer, plus mutability; the slice
        // never outlives the trap that validated it.
        unsafe { core::slice::from_raw_parts_mut(self.ptr, self.len) }
    }
}

/// Validate a user buffer the kernel will read from.
pub fn user_buffer(
    aspace: &dyn AddressSpace,
    addr: VirtAddr,
    len: usize,
) -> Result<UserBuffer, Fault> {
    validate_range(aspace, addr, len)?;
    Ok(UserBuffer {
        ptr: addr.as_usize() as *const u8,
        len,
    })
}

/// Validate a user buffer the kernel will write into.
pub fn user_buffer_mut(
    aspace: &dyn AddressSpace,
    addr: VirtAddr,
    len: usize,
) -> Result<UserBufferMut, Fault> {
    validate_range(aspace, addr, len)?;
    Ok(UserBufferMut {
        ptr: addr.as_usize() as *mut u8,
        len,
    })
}

/// Copy a NUL-terminated string out of user memory, validating each byte's
/// address before it is read.
///
/// Returns `Ok(None)` when the string is unterminated within [`PATH_MAX`]
/// bytes or is not UTF-8; both are recoverable (the caller answers with a
/// sentinel), unlike a bad pointer, which faults.
pub fn user_cstr(
    aspace: &dyn AddressSpace,
    addr: VirtAddr,
) -> Result<Option<String>, Fault> {
    let mut bytes = Vec::new();
    for offset in 0..=PATH_MAX {
        let at = addr.checked_add(offset).ok_or(Fault::KernelAddress)?;
        validate(aspace, at)?;
        // SAFETY: `at` was validated as a mapped user address just above.
        let byte = unsafe { core::ptr::read(at.as_usize() as *const u8) };
        if byte == 0 {
            return Ok(String::from_utf8(bytes).ok());
        }
        bytes.push(byte);
    }
    Ok(None)
}
