//! Trap Dispatch and System Call Handlers
//!
//! Decodes the incoming call number and arguments, runs exactly one handler,
//! and reports back whether the caller resumes. Every call except `halt` and
//! `exit` is non-terminal: its result lands in the frame's result slot and
//! the process continues. Termination only ever happens through the two
//! terminal calls or a pointer-validation fault.
//!
//! # Security Considerations
//! - The call-number mapping is total: unknown numbers are a logged no-op
//!   that still resumes the caller
//! - Every user pointer is validated before any dereference or side effect
//! - A validation fault terminates the calling process, not the kernel

use crate::console::Console;
use crate::fs::FileSystem;
use crate::io::IoGateway;
use crate::mm::VirtAddr;
use crate::process::Process;

use super::validate::{self, Fault};

/// System call numbers (ABI contract with user mode).
pub mod numbers {
    pub const SYS_HALT: u64 = 0;
    pub const SYS_EXIT: u64 = 1;
    pub const SYS_FORK: u64 = 2;
    pub const SYS_EXEC: u64 = 3;
    pub const SYS_WAIT: u64 = 4;
    pub const SYS_CREATE: u64 = 5;
    pub const SYS_REMOVE: u64 = 6;
    pub const SYS_OPEN: u64 = 7;
    pub const SYS_FILESIZE: u64 = 8;
    pub const SYS_READ: u64 = 9;
    pub const SYS_WRITE: u64 = 10;
    pub const SYS_SEEK: u64 = 11;
    pub const SYS_TELL: u64 = 12;
    pub const SYS_CLOSE: u64 = 13;
}

/// Decoded system call.
///
/// Decoding goes through this enum so the dispatch below is an exhaustive
/// match the compiler checks: a call with no handler cannot slip through to
/// a runtime fall-through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syscall {
    Halt,
    Exit,
    Fork,
    Exec,
    Wait,
    Create,
    Remove,
    Open,
    Filesize,
    Read,
    Write,
    Seek,
    Tell,
    Close,
}

impl Syscall {
    /// Map a raw call number to a call, `None` for unknown numbers.
    pub const fn decode(nr: u64) -> Option<Self> {
        Some(match nr {
            numbers::SYS_HALT => Self::Halt,
            numbers::SYS_EXIT => Self::Exit,
            numbers::SYS_FORK => Self::Fork,
            numbers::SYS_EXEC => Self::Exec,
            numbers::SYS_WAIT => Self::Wait,
            numbers::SYS_CREATE => Self::Create,
            numbers::SYS_REMOVE => Self::Remove,
            numbers::SYS_OPEN => Self::Open,
            numbers::SYS_FILESIZE => Self::Filesize,
            numbers::SYS_READ => Self::Read,
            numbers::SYS_WRITE => Self::Write,
            numbers::SYS_SEEK => Self::Seek,
            numbers::SYS_TELL => Self::Tell,
            numbers::SYS_CLOSE => Self::Close,
            _ => return None,
        })
    }
}

/// Register view of one trap: call number, up to three argument slots, and
/// the result slot the dispatcher writes back for non-terminal calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrapFrame {
    /// Call number slot.
    pub nr: u64,
    /// Argument slots.
    pub args: [u64; 3],
    /// Result slot, written on every resumed trap.
    pub ret: i64,
}

impl TrapFrame {
    /// Build a frame for `nr` with up to three arguments.
    pub const fn new(nr: u64, args: [u64; 3]) -> Self {
        Self { nr, args, ret: 0 }
    }
}

/// What the arch layer must do after a trap is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapOutcome {
    /// The result slot is filled in; resume the calling process.
    Resume,
    /// The process recorded this exit status and was torn down;
    /// never resume it.
    Exit(i32),
    /// Power off the machine.
    Halt,
}

/// Handle one trap on behalf of `proc`.
///
/// Returns [`TrapOutcome::Resume`] for every non-terminal call, including
/// unknown call numbers (logged, result slot set to -1). For
/// [`TrapOutcome::Exit`] the process teardown has already run by the time
/// this returns; the caller must not re-enter the process.
pub fn dispatch<F: FileSystem, C: Console>(
    gateway: &IoGateway<F, C>,
    proc: &mut Process,
    frame: &mut TrapFrame,
) -> TrapOutcome {
    let Some(call) = Syscall::decode(frame.nr) else {
        log::warn!("{}: unknown system call {}", proc.name(), frame.nr);
        frame.ret = -1;
        return TrapOutcome::Resume;
    };

    let flow = match call {
        Syscall::Halt => return TrapOutcome::Halt,
        Syscall::Exit => return terminate(gateway, proc, frame.args[0] as i32),
        Syscall::Fork | Syscall::Exec | Syscall::Wait => {
            log::warn!("{}: {:?} is not implemented", proc.name(), call);
            Ok(-1)
        }
        Syscall::Create => sys_create(gateway, proc, frame.args[0], frame.args[1]),
        Syscall::Remove => sys_remove(gateway, proc, frame.args[0]),
        Syscall::Open => sys_open(gateway, proc, frame.args[0]),
        Syscall::Filesize => sys_filesize(proc, frame.args[0]),
        Syscall::Read => sys_read(gateway, proc, frame.args),
        Syscall::Write => sys_write(gateway, proc, frame.args),
        Syscall::Seek => sys_seek(proc, frame.args[0], frame.args[1]),
        Syscall::Tell => sys_tell(proc, frame.args[0]),
        Syscall::Close => sys_close(proc, frame.args[0]),
    };

    match flow {
        Ok(value) => {
            frame.ret = value;
            TrapOutcome::Resume
        }
        Err(fault) => {
            log::warn!("{}: bad user pointer ({})", proc.name(), fault);
            terminate(gateway, proc, -1)
        }
    }
}

/// Exit path shared by the `exit` call and validation faults: record the
/// status, emit the termination line, release every open handle.
fn terminate<F: FileSystem, C: Console>(
    gateway: &IoGateway<F, C>,
    proc: &mut Process,
    status: i32,
) -> TrapOutcome {
    proc.set_exit_status(status);
    let line = alloc::format!("{}: exit({})\n", proc.name(), status);
    gateway.console().write_bytes(line.as_bytes());
    proc.teardown();
    TrapOutcome::Exit(status)
}

/// Narrow a raw handle argument, mapping out-of-range values to the
/// sentinel instead of letting truncation alias them onto handles 0/1.
fn handle_arg(raw: u64) -> i32 {
    match i32::try_from(raw as i64) {
        Ok(handle) => handle,
        Err(_) => -1,
    }
}

fn sys_create<F: FileSystem, C: Console>(
    gateway: &IoGateway<F, C>,
    proc: &mut Process,
    path: u64,
    initial_size: u64,
) -> Result<i64, Fault> {
    let Some(path) = validate::user_cstr(proc.aspace(), VirtAddr::new(path as usize))? else {
        return Ok(0);
    };
    Ok(gateway.create(&path, initial_size as usize) as i64)
}

fn sys_remove<F: FileSystem, C: Console>(
    gateway: &IoGateway<F, C>,
    proc: &mut Process,
    path: u64,
) -> Result<i64, Fault> {
    let Some(path) = validate::user_cstr(proc.aspace(), VirtAddr::new(path as usize))? else {
        return Ok(0);
    };
    Ok(gateway.remove(&path) as i64)
}

fn sys_open<F: FileSystem, C: Console>(
    gateway: &IoGateway<F, C>,
    proc: &mut Process,
    path: u64,
) -> Result<i64, Fault> {
    let Some(path) = validate::user_cstr(proc.aspace(), VirtAddr::new(path as usize))? else {
        return Ok(-1);
    };
    let Some(file) = gateway.open(&path) else {
        return Ok(-1);
    };
    // a full table drops the file, which closes it
    match proc.fd_table().insert(file) {
        Some(handle) => Ok(handle as i64),
        None => Ok(-1),
    }
}

fn sys_filesize(proc: &mut Process, handle: u64) -> Result<i64, Fault> {
    Ok(match proc.fd_table().get(handle_arg(handle)) {
        Some(file) => file.len() as i64,
        None => -1,
    })
}

fn sys_read<F: FileSystem, C: Console>(
    gateway: &IoGateway<F, C>,
    proc: &mut Process,
    args: [u64; 3],
) -> Result<i64, Fault> {
    let mut buf = validate::user_buffer_mut(
        proc.aspace(),
        VirtAddr::new(args[1] as usize),
        args[2] as usize,
    )?;
    Ok(gateway.read(proc.fd_table(), handle_arg(args[0]), buf.as_bytes_mut()))
}

fn sys_write<F: FileSystem, C: Console>(
    gateway: &IoGateway<F, C>,
    proc: &mut Process,
    args: [u64; 3],
) -> Result<i64, Fault> {
    let buf = validate::user_buffer(
        proc.aspace(),
        VirtAddr::new(args[1] as usize),
        args[2] as usize,
    )?;
    Ok(gateway.write(proc.fd_table(), handle_arg(args[0]), buf.as_bytes()))
}

fn sys_seek(proc: &mut Process, handle: u64, pos: u64) -> Result<i64, Fault> {
    if let Some(file) = proc.fd_table().get(handle_arg(handle)) {
        file.seek(pos as usize);
    }
    Ok(0)
}

fn sys_tell(proc: &mut Process, handle: u64) -> Result<i64, Fault> {
    Ok(match proc.fd_table().get(handle_arg(handle)) {
        Some(file) => file.tell() as i64,
        None => -1,
    })
}

fn sys_close(proc: &mut Process, handle: u64) -> Result<i64, Fault> {
    proc.fd_table().close(handle_arg(handle));
    Ok(0)
}
