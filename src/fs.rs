//! Filesystem Collaborator Interface
//!
//! The trap layer never touches storage directly; it drives an external
//! filesystem through these traits. The embedding kernel supplies the
//! implementation, and every call into it is serialized behind the global
//! filesystem lock in [`crate::io`].

use alloc::boxed::Box;

/// An open file owned by exactly one file descriptor slot.
///
/// Ownership transfers out of the filesystem on `open` and back on drop:
/// dropping the box is the filesystem's close path, so releasing a
/// descriptor slot (or tearing a process down) closes the file.
pub trait File: Send {
    /// Read from the current position, advancing it.
    ///
    /// Returns the byte count actually read, which may be short; `0` means
    /// end of file.
    fn read(&mut self, buf: &mut [u8]) -> usize;

    /// Write at the current position, advancing it.
    ///
    /// Returns the byte count actually written, which may be short.
    fn write(&mut self, buf: &[u8]) -> usize;

    /// Move the current position to `pos` bytes from the start.
    fn seek(&mut self, pos: usize);

    /// Current position in bytes from the start.
    fn tell(&self) -> usize;

    /// Total file length in bytes.
    fn len(&self) -> usize;

    /// Check for a zero-length file.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The filesystem itself: naming and lifecycle of files.
///
/// Failures surface as `false`/`None` only; nothing in here is allowed to
/// take down a process, let alone the kernel.
pub trait FileSystem: Send {
    /// Create an empty file of `initial_size` bytes.
    ///
    /// Returns `false` when the file already exists or creation fails.
    fn create(&mut self, path: &str, initial_size: usize) -> bool;

    /// Remove a file by name. Returns `false` when it does not exist.
    fn remove(&mut self, path: &str) -> bool;

    /// Open an existing file, transferring ownership of the file object to
    /// the caller. `None` when the file does not exist.
    fn open(&mut self, path: &str) -> Option<Box<dyn File>>;
}
