//! Kernel32.dll bindings for process handles and same-width reads

use crate::core::types::{CmdlineError, CmdlineResult, ErrorCode, NativeError, NativeResult};
use winapi::shared::minwindef::{FALSE, LPCVOID, LPVOID};
use winapi::um::errhandlingapi::GetLastError;
use winapi::um::handleapi::CloseHandle;
use winapi::um::memoryapi::ReadProcessMemory;
use winapi::um::processthreadsapi::{GetCurrentProcess, OpenProcess};
use winapi::um::winnt::HANDLE;

/// Get the last Windows error
pub fn last_error() -> ErrorCode {
    ErrorCode::from(unsafe { GetLastError() })
}

/// Pseudo handle of the calling process; never needs closing
pub fn current_process() -> HANDLE {
    unsafe { GetCurrentProcess() }
}

/// Safe wrapper for OpenProcess
pub fn open_process(pid: u32, desired_access: u32) -> CmdlineResult<HANDLE> {
    let handle = unsafe { OpenProcess(desired_access, FALSE, pid) };
    if handle.is_null() {
        Err(CmdlineError::OpenProcess {
            pid,
            code: last_error(),
        })
    } else {
        Ok(handle)
    }
}

/// Safe wrapper for CloseHandle
///
/// # Safety
/// The handle must be a valid Windows handle owned by the caller
pub unsafe fn close_handle(handle: HANDLE) -> Result<(), ErrorCode> {
    if handle.is_null() {
        return Ok(());
    }

    if CloseHandle(handle) == FALSE {
        Err(last_error())
    } else {
        Ok(())
    }
}

/// Wrapper for ReadProcessMemory.
///
/// A partial copy is reported as success with the short count, so the
/// caller can tell it apart from a read that failed outright.
///
/// # Safety
/// The handle must be a valid process handle with `PROCESS_VM_READ`
pub unsafe fn read_process_memory(
    handle: HANDLE,
    address: usize,
    buffer: &mut [u8],
) -> NativeResult<usize> {
    let mut bytes_read = 0;

    let result = ReadProcessMemory(
        handle,
        address as LPCVOID,
        buffer.as_mut_ptr() as LPVOID,
        buffer.len(),
        &mut bytes_read,
    );

    if result != FALSE {
        return Ok(bytes_read);
    }
    match last_error() {
        ErrorCode::PartialCopy => Ok(bytes_read),
        code => Err(NativeError::Win32(code)),
    }
}
