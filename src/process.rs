//! Process Record and Teardown
//!
//! The slice of the process record the trap layer owns: name, exit status,
//! the address space used for pointer validation, and the file descriptor
//! table. Scheduling state lives with the scheduler, out of scope here.
//!
//! The table is private to its process and only mutated by trap handling
//! running on that process's behalf, so it carries no lock of its own.

use alloc::boxed::Box;
use alloc::string::String;

use crate::fd::FdTable;
use crate::mm::AddressSpace;

/// Kernel-side record for one user process.
pub struct Process {
    name: String,
    exit_status: Option<i32>,
    aspace: Box<dyn AddressSpace>,
    fd_table: FdTable,
}

impl Process {
    /// Create a record for a freshly loaded process with no open files.
    pub fn new(name: &str, aspace: Box<dyn AddressSpace>) -> Self {
        Self {
            name: String::from(name),
            exit_status: None,
            aspace,
            fd_table: FdTable::new(),
        }
    }

    /// Process name, as printed in the termination line.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Recorded exit status; `None` while the process is still running.
    pub fn exit_status(&self) -> Option<i32> {
        self.exit_status
    }

    /// The address space pointer validation runs against.
    pub fn aspace(&self) -> &dyn AddressSpace {
        self.aspace.as_ref()
    }

    /// The process's file descriptor table.
    pub fn fd_table(&mut self) -> &mut FdTable {
        &mut self.fd_table
    }

    /// Record the exit status. The first recorded status wins; exit never
    /// returns to the caller, so a second call cannot happen on a live
    /// process and is ignored if it does.
    pub(crate) fn set_exit_status(&mut self, status: i32) {
        if self.exit_status.is_none() {
            self.exit_status = Some(status);
        }
    }

    /// Release everything the process owns: every live file handle is
    /// closed through the filesystem's close path.
    pub(crate) fn teardown(&mut self) {
        self.fd_table.close_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{MemFile, WideOpen};

    fn process() -> Process {
        Process::new("proc", Box::new(WideOpen))
    }

    #[test]
    fn starts_with_no_status_and_no_files() {
        let proc = process();
        assert_eq!(proc.exit_status(), None);
        assert_eq!(proc.name(), "proc");
    }

    #[test]
    fn first_exit_status_wins() {
        let mut proc = process();
        proc.set_exit_status(7);
        proc.set_exit_status(-1);
        assert_eq!(proc.exit_status(), Some(7));
    }

    #[test]
    fn teardown_closes_every_handle() {
        let mut proc = process();
        proc.fd_table().insert(Box::new(MemFile::detached()));
        proc.fd_table().insert(Box::new(MemFile::detached()));
        assert_eq!(proc.fd_table().open_count(), 2);
        proc.teardown();
        assert_eq!(proc.fd_table().open_count(), 0);
    }
}
