//! OcelotOS Syscall Layer
//!
//! The trap-handling boundary of a minimal instructional kernel: the layer
//! that receives a user-mode request, validates everything the user program
//! handed it, and performs the requested operation on the calling process's
//! behalf.
//!
//! The surrounding kernel plugs in through trait seams: the filesystem
//! ([`fs::FileSystem`]), the console device ([`console::Console`]), and the
//! per-process page-table lookup ([`mm::AddressSpace`]). This keeps the
//! trust-boundary logic testable on a host without the rest of the kernel.
//!
//! # Security Model
//! - Every user pointer is validated (non-null, user region, mapped) before
//!   any dereference; a bad pointer kills the process, never the kernel
//! - File handles are owned exclusively by one descriptor slot; double
//!   close and dead-handle operations are harmless no-ops
//! - All real file I/O is serialized behind one global filesystem lock
//!
//! # Modules
//! - [`syscall`] - trap dispatch, handlers, pointer validation
//! - [`fd`] - per-process file descriptor table
//! - [`io`] - synchronized gateway to the filesystem and console
//! - [`process`] - process record, exit status, teardown
//! - [`mm`] - address types and the address-space seam
//! - [`fs`], [`console`] - collaborator interfaces

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]

extern crate alloc;

pub mod console;
pub mod fd;
pub mod fs;
pub mod io;
pub mod mm;
pub mod process;
pub mod syscall;

#[cfg(test)]
mod testutil;
