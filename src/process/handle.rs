//! Process handles opened for command line extraction

use crate::core::types::{CmdlineResult, ProcessId};
use crate::windows::bindings::kernel32;
use crate::windows::types::Handle;
use std::fmt;
use winapi::um::winnt::HANDLE;

/// Access rights for process handles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessAccess {
    value: u32,
}

impl ProcessAccess {
    /// `PROCESS_QUERY_INFORMATION`
    pub const QUERY_INFORMATION: Self = Self { value: 0x0400 };
    /// `PROCESS_VM_READ`
    pub const VM_READ: Self = Self { value: 0x0010 };
    /// `SYNCHRONIZE`
    pub const SYNCHRONIZE: Self = Self { value: 0x0010_0000 };

    /// Combine access rights
    pub fn combine(rights: &[Self]) -> Self {
        let mut value = 0;
        for right in rights {
            value |= right.value;
        }
        Self { value }
    }

    pub fn value(&self) -> u32 {
        self.value
    }
}

/// An open handle to a target process
pub struct ProcessHandle {
    handle: Handle,
    pid: ProcessId,
    access: ProcessAccess,
}

impl ProcessHandle {
    /// Open a process with the given access rights
    pub fn open(pid: ProcessId, access: ProcessAccess) -> CmdlineResult<Self> {
        let raw_handle = kernel32::open_process(pid, access.value())?;
        Ok(ProcessHandle {
            handle: Handle::new(raw_handle),
            pid,
            access,
        })
    }

    /// Open a process with the rights an extraction needs
    pub fn open_for_query(pid: ProcessId) -> CmdlineResult<Self> {
        Self::open(
            pid,
            ProcessAccess::combine(&[ProcessAccess::QUERY_INFORMATION, ProcessAccess::VM_READ]),
        )
    }

    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    /// Raw handle, valid only while `self` is alive
    pub fn raw(&self) -> HANDLE {
        self.handle.raw()
    }

    pub fn access(&self) -> ProcessAccess {
        self.access
    }

    pub fn is_valid(&self) -> bool {
        !self.handle.is_null()
    }
}

impl fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("pid", &self.pid)
            .field("valid", &self.is_valid())
            .field("access", &format!("0x{:X}", self.access.value()))
            .finish()
    }
}

impl fmt::Display for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ProcessHandle(pid={}, valid={})",
            self.pid,
            self.is_valid()
        )
    }
}
