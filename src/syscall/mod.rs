//! System Call Interface
//!
//! The trap boundary between user mode and the kernel: decode the call,
//! validate everything the user handed in, perform the operation on the
//! calling process's behalf.
//!
//! # Security Model
//! - The call-number mapping is total and compiler-checked; unknown numbers
//!   are a logged no-op and the caller resumes
//! - All user pointers are validated before use; a bad pointer terminates
//!   the offending process with exit status -1, never the kernel
//! - Recoverable failures (missing file, dead handle) are sentinels, not
//!   terminations
//!
//! # Call Table
//! - 0: halt() - power off, terminal
//! - 1: exit(status) - terminate the calling process, terminal
//! - 2-4: fork/exec/wait - recognized, not implemented here
//! - 5: create(path, size), 6: remove(path)
//! - 7: open(path), 8: filesize(h), 9: read(h, buf, n),
//!   10: write(h, buf, n), 11: seek(h, pos), 12: tell(h), 13: close(h)

mod handler;
mod validate;

pub use handler::{dispatch, numbers, Syscall, TrapFrame, TrapOutcome};
pub use validate::{
    user_buffer, user_buffer_mut, user_cstr, validate, validate_range, Fault, UserBuffer,
    UserBufferMut, PATH_MAX,
};
