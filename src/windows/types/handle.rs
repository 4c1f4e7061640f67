//! Owned HANDLE that is closed on drop

use crate::windows::bindings::kernel32;
use std::ptr;
use tracing::warn;
use winapi::um::winnt::HANDLE;

/// Owned Windows HANDLE with RAII semantics
pub struct Handle {
    handle: HANDLE,
}

impl Handle {
    /// Take ownership of `handle`
    pub fn new(handle: HANDLE) -> Self {
        Handle { handle }
    }

    pub fn null() -> Self {
        Handle {
            handle: ptr::null_mut(),
        }
    }

    pub fn is_null(&self) -> bool {
        self.handle.is_null()
    }

    /// Borrow the raw handle; it stays owned by `self`
    pub fn raw(&self) -> HANDLE {
        self.handle
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        if self.handle.is_null() {
            return;
        }
        if let Err(code) = unsafe { kernel32::close_handle(self.handle) } {
            warn!(%code, "failed to close handle");
        }
    }
}

// HANDLEs are process-wide values, not thread-affine
unsafe impl Send for Handle {}
unsafe impl Sync for Handle {}
