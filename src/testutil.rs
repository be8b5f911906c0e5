//! In-memory mock collaborators for unit tests.
//!
//! Host-side stand-ins for the external seams: a map-backed filesystem, a
//! scripted console, and an address space that treats registered host
//! allocations as mapped user pages.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use spin::Mutex;

use crate::console::Console;
use crate::fs::{File, FileSystem};
use crate::mm::{AddressSpace, MapFlags, VirtAddr};

/// A file backed by a shared byte vector.
///
/// The backing storage lives in the [`MemFs`], so contents written through
/// one open file survive a close and show up in the next open.
pub struct MemFile {
    data: Arc<Mutex<Vec<u8>>>,
    pos: usize,
}

impl MemFile {
    /// A file with its own private backing, for table tests that do not
    /// need a filesystem.
    pub fn detached() -> Self {
        Self {
            data: Arc::new(Mutex::new(Vec::new())),
            pos: 0,
        }
    }

    fn shared(data: Arc<Mutex<Vec<u8>>>) -> Self {
        Self { data, pos: 0 }
    }
}

impl File for MemFile {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        let data = self.data.lock();
        let remaining = data.len().saturating_sub(self.pos);
        let count = remaining.min(buf.len());
        buf[..count].copy_from_slice(&data[self.pos..self.pos + count]);
        self.pos += count;
        count
    }

    fn write(&mut self, buf: &[u8]) -> usize {
        let mut data = self.data.lock();
        let end = self.pos + buf.len();
        if data.len() < end {
            data.resize(end, 0);
        }
        data[self.pos..end].copy_from_slice(buf);
        self.pos = end;
        buf.len()
    }

    fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    fn tell(&self) -> usize {
        self.pos
    }

    fn len(&self) -> usize {
        self.data.lock().len()
    }
}

/// Map-backed filesystem.
pub struct MemFs {
    files: BTreeMap<String, Arc<Mutex<Vec<u8>>>>,
}

impl MemFs {
    pub fn new() -> Self {
        Self {
            files: BTreeMap::new(),
        }
    }
}

impl FileSystem for MemFs {
    fn create(&mut self, path: &str, initial_size: usize) -> bool {
        if self.files.contains_key(path) {
            return false;
        }
        let data = Arc::new(Mutex::new(alloc::vec![0; initial_size]));
        self.files.insert(String::from(path), data);
        true
    }

    fn remove(&mut self, path: &str) -> bool {
        self.files.remove(path).is_some()
    }

    fn open(&mut self, path: &str) -> Option<Box<dyn File>> {
        let data = self.files.get(path)?;
        Some(Box::new(MemFile::shared(Arc::clone(data))))
    }
}

/// Console with scripted input and captured output.
pub struct ScriptConsole {
    input: Mutex<Vec<u8>>,
    output: Mutex<Vec<u8>>,
}

impl ScriptConsole {
    pub fn new(input: &[u8]) -> Self {
        let mut script = Vec::from(input);
        script.reverse(); // pop from the back = read from the front
        Self {
            input: Mutex::new(script),
            output: Mutex::new(Vec::new()),
        }
    }

    /// Everything written to the console so far.
    pub fn output(&self) -> Vec<u8> {
        self.output.lock().clone()
    }
}

impl Console for ScriptConsole {
    fn read_byte(&self) -> u8 {
        // an exhausted script reads as an endless newline
        self.input.lock().pop().unwrap_or(b'\n')
    }

    fn write_bytes(&self, bytes: &[u8]) {
        self.output.lock().extend_from_slice(bytes);
    }
}

/// Address space that reports registered host byte ranges as mapped user
/// pages. Clones share the registry, so ranges added after a process takes
/// ownership of one clone are visible through it.
#[derive(Clone)]
pub struct TestSpace {
    mapped: Arc<Mutex<Vec<(usize, usize)>>>,
}

impl TestSpace {
    pub fn new() -> Self {
        Self {
            mapped: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Register a host slice as mapped user memory.
    pub fn map_slice(&self, slice: &[u8]) {
        self.mapped
            .lock()
            .push((slice.as_ptr() as usize, slice.len()));
    }
}

impl AddressSpace for TestSpace {
    fn query(&self, addr: VirtAddr) -> Option<MapFlags> {
        let addr = addr.as_usize();
        for &(base, len) in self.mapped.lock().iter() {
            if addr >= base && addr < base + len {
                return Some(MapFlags::PRESENT | MapFlags::USER | MapFlags::WRITABLE);
            }
        }
        None
    }
}

/// Address space with every user-range address mapped.
pub struct WideOpen;

impl AddressSpace for WideOpen {
    fn query(&self, _addr: VirtAddr) -> Option<MapFlags> {
        Some(MapFlags::PRESENT | MapFlags::USER | MapFlags::WRITABLE)
    }
}
