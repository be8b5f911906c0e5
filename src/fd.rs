//! Per-Process File Descriptor Table
//!
//! Maps small integer handles to owned file objects. Handles 0 and 1 are
//! permanently reserved for the console and never occupy a slot; real files
//! start at handle 2 and live in a growable arena indexed by `handle - 2`.
//!
//! # Invariants
//! - A file object is owned by at most one slot, in at most one table
//! - Two live handles in the same table never share a slot index
//! - Closing an invalid or already-closed handle is a no-op, never an error

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::fs::File;

/// Reserved handle for console input.
pub const STDIN: i32 = 0;
/// Reserved handle for console output.
pub const STDOUT: i32 = 1;
/// Lowest handle that can refer to an open file.
pub const FIRST_FILE: i32 = 2;

/// Most files one process may hold open at once.
pub const MAX_OPEN_FILES: usize = 128;

/// File descriptor table, one per process.
///
/// Empty slots are explicit tombstones so handle numbers stay stable while
/// neighbouring files are opened and closed.
pub struct FdTable {
    slots: Vec<Option<Box<dyn File>>>,
}

impl FdTable {
    /// Create an empty table.
    pub const fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Insert an open file into the lowest-numbered free slot and return its
    /// handle (always >= [`FIRST_FILE`]).
    ///
    /// Returns `None` when the table is full; the file is dropped, which
    /// runs the filesystem's close path.
    pub fn insert(&mut self, file: Box<dyn File>) -> Option<i32> {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some(file);
                return Some(index as i32 + FIRST_FILE);
            }
        }
        if self.slots.len() >= MAX_OPEN_FILES {
            return None;
        }
        self.slots.push(Some(file));
        Some((self.slots.len() - 1) as i32 + FIRST_FILE)
    }

    /// Look up the file behind `handle`.
    ///
    /// Reserved handles (< 2) and unallocated or closed slots return `None`;
    /// callers must treat that as a distinct outcome and never reach for a
    /// file object that is not there.
    pub fn get(&mut self, handle: i32) -> Option<&mut (dyn File + 'static)> {
        if handle < FIRST_FILE {
            return None;
        }
        self.slots
            .get_mut((handle - FIRST_FILE) as usize)?
            .as_deref_mut()
    }

    /// Release `handle`, dropping the owned file (filesystem close path).
    ///
    /// Idempotent: reserved, unallocated, and already-closed handles are
    /// all no-ops and never disturb other slots.
    pub fn close(&mut self, handle: i32) {
        if handle < FIRST_FILE {
            return;
        }
        if let Some(slot) = self.slots.get_mut((handle - FIRST_FILE) as usize) {
            *slot = None;
        }
    }

    /// Drop every live handle. Called once at process teardown.
    pub fn close_all(&mut self) {
        self.slots.clear();
    }

    /// Number of live handles in the table.
    pub fn open_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

impl Default for FdTable {
    fn default() -> Self {
        Self::new()
    }
}
