//! Console Collaborator Interface
//!
//! Character input and buffered output for the two reserved descriptors
//! (0 = console in, 1 = console out). The device carries its own internal
//! synchronization, which is why both methods take `&self`; console traffic
//! deliberately bypasses the global filesystem lock.

pub trait Console: Sync {
    /// Blocking read of one byte of input.
    fn read_byte(&self) -> u8;

    /// Write the whole buffer in one piece.
    ///
    /// Must be atomic with respect to other writers so concurrent processes
    /// do not interleave output mid-buffer.
    fn write_bytes(&self, bytes: &[u8]);
}
