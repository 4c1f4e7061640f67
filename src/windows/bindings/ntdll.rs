//! NTDLL.dll bindings resolved at runtime
//!
//! The WOW64 primitives only exist in the 32-bit ntdll loaded into WOW64
//! processes, so nothing here is linked statically: every function goes
//! through the process-wide [`FunctionTable`].

use super::kernel32;
use crate::core::types::{NativeError, NativeResult, NtStatus};
use crate::native::{FunctionTable, InfoClass, NativeApi, NativeFunction, SymbolProvider};
use std::ffi::{c_void, CString};
use std::mem;
use std::num::NonZeroUsize;
use tracing::warn;
use winapi::shared::ntdef::NTSTATUS;
use winapi::um::winnt::HANDLE;
use ::windows::core::{s, PCSTR};
use ::windows::Win32::Foundation::HMODULE;
use ::windows::Win32::System::LibraryLoader::{GetModuleHandleA, GetProcAddress};

type NtQueryInformationProcessFn = unsafe extern "system" fn(
    process_handle: HANDLE,
    process_info_class: u32,
    process_info: *mut c_void,
    process_info_length: u32,
    return_length: *mut u32,
) -> NTSTATUS;

type NtWow64ReadVirtualMemory64Fn = unsafe extern "system" fn(
    process_handle: HANDLE,
    base_address: u64,
    buffer: *mut c_void,
    buffer_length: u64,
    return_length: *mut u64,
) -> NTSTATUS;

/// Looks symbols up in the `ntdll.dll` already mapped into every process
pub struct NtdllSymbols {
    module: Option<isize>,
}

impl NtdllSymbols {
    /// Locate the loaded `ntdll.dll`
    pub fn locate() -> Self {
        let module = unsafe { GetModuleHandleA(s!("ntdll.dll")) }
            .ok()
            .map(|module| module.0);
        if module.is_none() {
            warn!("ntdll.dll is not mapped into this process");
        }
        NtdllSymbols { module }
    }
}

impl SymbolProvider for NtdllSymbols {
    fn lookup(&self, symbol: &str) -> Option<NonZeroUsize> {
        let module = HMODULE(self.module?);
        let name = CString::new(symbol).ok()?;
        let function = unsafe { GetProcAddress(module, PCSTR(name.as_ptr() as *const u8)) }?;
        NonZeroUsize::new(function as usize)
    }
}

lazy_static::lazy_static! {
    static ref NTDLL: FunctionTable<NtdllSymbols> = FunctionTable::new(NtdllSymbols::locate());
}

/// The process-wide function table for `ntdll.dll`
pub fn ntdll_table() -> &'static FunctionTable<NtdllSymbols> {
    &NTDLL
}

/// [`NativeApi`] over `ntdll.dll` and `kernel32.dll`
pub struct NtApi<'t, P: SymbolProvider = NtdllSymbols> {
    table: &'t FunctionTable<P>,
}

impl NtApi<'static, NtdllSymbols> {
    /// API backed by the process-wide `ntdll.dll` table
    pub fn system() -> Self {
        NtApi::new(ntdll_table())
    }
}

impl<'t, P: SymbolProvider> NtApi<'t, P> {
    /// API backed by an explicit function table
    pub fn new(table: &'t FunctionTable<P>) -> Self {
        NtApi { table }
    }

    fn query(
        &self,
        function: NativeFunction,
        process: HANDLE,
        class: InfoClass,
        buffer: &mut [u8],
    ) -> NativeResult<usize> {
        let address = self.table.resolve(function)?;
        // Both query functions share the NtQueryInformationProcess signature
        let query: NtQueryInformationProcessFn = unsafe { mem::transmute(address.get()) };

        let mut return_length = 0u32;
        let status = NtStatus(unsafe {
            query(
                process,
                class.value(),
                buffer.as_mut_ptr() as *mut c_void,
                buffer.len() as u32,
                &mut return_length,
            )
        });

        if status.is_success() {
            Ok(return_length as usize)
        } else {
            Err(NativeError::Status(status))
        }
    }
}

impl<'t, P: SymbolProvider> NativeApi for NtApi<'t, P> {
    type Handle = HANDLE;

    fn current_process(&self) -> HANDLE {
        kernel32::current_process()
    }

    fn query_information_process(
        &self,
        process: HANDLE,
        class: InfoClass,
        buffer: &mut [u8],
    ) -> NativeResult<usize> {
        self.query(NativeFunction::QueryInformationProcess, process, class, buffer)
    }

    fn wow64_query_information_process64(
        &self,
        process: HANDLE,
        class: InfoClass,
        buffer: &mut [u8],
    ) -> NativeResult<usize> {
        self.query(
            NativeFunction::Wow64QueryInformationProcess64,
            process,
            class,
            buffer,
        )
    }

    fn read_virtual_memory(
        &self,
        process: HANDLE,
        address: usize,
        buffer: &mut [u8],
    ) -> NativeResult<usize> {
        unsafe { kernel32::read_process_memory(process, address, buffer) }
    }

    fn wow64_read_virtual_memory64(
        &self,
        process: HANDLE,
        address: u64,
        buffer: &mut [u8],
    ) -> NativeResult<usize> {
        let function = self.table.resolve(NativeFunction::Wow64ReadVirtualMemory64)?;
        let read: NtWow64ReadVirtualMemory64Fn = unsafe { mem::transmute(function.get()) };

        let mut bytes_read = 0u64;
        let status = NtStatus(unsafe {
            read(
                process,
                address,
                buffer.as_mut_ptr() as *mut c_void,
                buffer.len() as u64,
                &mut bytes_read,
            )
        });

        if status.is_success() || status == NtStatus::PARTIAL_COPY {
            Ok(bytes_read as usize)
        } else {
            Err(NativeError::Status(status))
        }
    }
}
