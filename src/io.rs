//! Synchronized I/O Gateway
//!
//! Routes reads and writes to the console device or to open files, and
//! serializes every call into the filesystem collaborator behind a single
//! global lock. Coarse-grained on purpose: one lock for all real file I/O
//! keeps the teaching-grade concurrency story easy to reason about.
//!
//! Console traffic (handles 0 and 1) bypasses the lock; the console device
//! synchronizes itself.

use alloc::boxed::Box;
use spin::Mutex;

use crate::console::Console;
use crate::fd::{FdTable, STDIN, STDOUT};
use crate::fs::{File, FileSystem};

/// Shared gateway to the filesystem and console, kernel lifetime.
///
/// One instance is created at boot and handed to the trap dispatcher; every
/// process goes through it, which is what makes the filesystem lock global.
pub struct IoGateway<F: FileSystem, C: Console> {
    fs: Mutex<F>,
    console: C,
}

impl<F: FileSystem, C: Console> IoGateway<F, C> {
    /// Wrap the collaborators. The filesystem goes behind the global lock.
    pub const fn new(fs: F, console: C) -> Self {
        Self {
            fs: Mutex::new(fs),
            console,
        }
    }

    /// The console device, for output that is not tied to a handle
    /// (e.g. the process termination line).
    pub fn console(&self) -> &C {
        &self.console
    }

    /// Create a file of `initial_size` bytes. Delegates under the lock.
    pub fn create(&self, path: &str, initial_size: usize) -> bool {
        self.fs.lock().create(path, initial_size)
    }

    /// Remove a file by name. Delegates under the lock.
    pub fn remove(&self, path: &str) -> bool {
        self.fs.lock().remove(path)
    }

    /// Open a file, transferring ownership of the file object out of the
    /// filesystem. Delegates under the lock.
    pub fn open(&self, path: &str) -> Option<Box<dyn File>> {
        self.fs.lock().open(path)
    }

    /// Read up to `buf.len()` bytes from `handle` into `buf`.
    ///
    /// - Handle 0 reads console input a byte at a time, stopping at a
    ///   newline (discarded) or when the buffer is full.
    /// - Handle 1 is invalid for reading: `-1`.
    /// - Anything else resolves through the table; dead handles are `-1`,
    ///   live ones read under the filesystem lock. Short reads, including
    ///   `0` at end of file, pass through.
    pub fn read(&self, table: &mut FdTable, handle: i32, buf: &mut [u8]) -> i64 {
        match handle {
            STDIN => self.read_console(buf) as i64,
            STDOUT => -1,
            _ => match table.get(handle) {
                Some(file) => {
                    let _fs = self.fs.lock();
                    file.read(buf) as i64
                }
                None => -1,
            },
        }
    }

    /// Write `buf` to `handle`.
    ///
    /// - Handle 1 writes the whole buffer atomically to the console and
    ///   always reports `buf.len()`.
    /// - Handle 0 is invalid for writing: `-1`.
    /// - Anything else resolves through the table; dead handles are `-1`,
    ///   live ones write under the filesystem lock.
    pub fn write(&self, table: &mut FdTable, handle: i32, buf: &[u8]) -> i64 {
        match handle {
            STDOUT => {
                self.console.write_bytes(buf);
                buf.len() as i64
            }
            STDIN => -1,
            _ => match table.get(handle) {
                Some(file) => {
                    let _fs = self.fs.lock();
                    file.write(buf) as i64
                }
                None => -1,
            },
        }
    }

    fn read_console(&self, buf: &mut [u8]) -> usize {
        let mut stored = 0;
        while stored < buf.len() {
            let byte = self.console.read_byte();
            if byte == b'\n' {
                // the newline terminates the read and is not stored
                break;
            }
            buf[stored] = byte;
            stored += 1;
        }
        stored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{MemFs, ScriptConsole};

    fn gateway(input: &[u8]) -> IoGateway<MemFs, ScriptConsole> {
        IoGateway::new(MemFs::new(), ScriptConsole::new(input))
    }

    #[test]
    fn console_read_stops_at_newline_and_discards_it() {
        let gw = gateway(b"hello\nworld");
        let mut table = FdTable::new();
        let mut buf = [0u8; 16];
        assert_eq!(gw.read(&mut table, STDIN, &mut buf), 5);
        assert_eq!(&buf[..5], b"hello");
    }

    #[test]
    fn console_read_is_bounded_by_the_buffer() {
        let gw = gateway(b"abcdef\n");
        let mut table = FdTable::new();
        let mut buf = [0u8; 4];
        assert_eq!(gw.read(&mut table, STDIN, &mut buf), 4);
        assert_eq!(&buf, b"abcd");
    }

    #[test]
    fn console_write_reports_the_full_length() {
        let gw = gateway(b"");
        let mut table = FdTable::new();
        assert_eq!(gw.write(&mut table, STDOUT, b"hi there"), 8);
        assert_eq!(gw.console().output(), b"hi there");
    }

    #[test]
    fn reserved_handles_reject_the_wrong_direction() {
        let gw = gateway(b"");
        let mut table = FdTable::new();
        let mut buf = [0u8; 4];
        assert_eq!(gw.read(&mut table, STDOUT, &mut buf), -1);
        assert_eq!(gw.write(&mut table, STDIN, b"x"), -1);
    }

    #[test]
    fn dead_handles_return_the_sentinel() {
        let gw = gateway(b"");
        let mut table = FdTable::new();
        let mut buf = [0u8; 4];
        assert_eq!(gw.read(&mut table, 7, &mut buf), -1);
        assert_eq!(gw.write(&mut table, 7, b"x"), -1);
    }

    #[test]
    fn file_io_round_trips_through_the_table() {
        let gw = gateway(b"");
        let mut table = FdTable::new();
        assert!(gw.create("notes.txt", 0));
        let handle = table.insert(gw.open("notes.txt").unwrap()).unwrap();

        assert_eq!(gw.write(&mut table, handle, b"data"), 4);
        table.get(handle).unwrap().seek(0);
        let mut buf = [0u8; 8];
        assert_eq!(gw.read(&mut table, handle, &mut buf), 4);
        assert_eq!(&buf[..4], b"data");
        // a second read sits at end of file
        assert_eq!(gw.read(&mut table, handle, &mut buf), 0);
    }
}
