//! Native primitive seam
//!
//! The walk only ever talks to the target through [`NativeApi`]. On Windows it
//! is implemented over `ntdll.dll` and `kernel32.dll`
//! (see `crate::windows::bindings::ntdll::NtApi`); tests implement it over a
//! simulated address space.

pub mod layout;
pub mod resolver;

pub use layout::StructureLayout;
pub use resolver::{FunctionTable, NativeFunction, SymbolProvider};

use crate::core::types::{NativeResult, PointerWidth};

/// Process information class for `NtQueryInformationProcess`
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoClass {
    /// `PROCESS_BASIC_INFORMATION`, holds the PEB address
    BasicInformation = 0,
    /// `ULONG_PTR` holding the 32-bit PEB address of a WOW64 process, 0 otherwise
    Wow64Information = 26,
}

impl InfoClass {
    /// Raw class value passed to the native call
    pub const fn value(self) -> u32 {
        self as u32
    }
}

/// The primitives the command-line walk is built from.
///
/// Every method returns the number of bytes the primitive reports as written
/// or read. A short count is not an error at this level.
pub trait NativeApi {
    /// Borrowed process handle type
    type Handle: Copy;

    /// Pointer width of the calling process
    fn native_width(&self) -> PointerWidth {
        PointerWidth::NATIVE
    }

    /// Pseudo handle of the calling process
    fn current_process(&self) -> Self::Handle;

    /// `NtQueryInformationProcess`
    fn query_information_process(
        &self,
        process: Self::Handle,
        class: InfoClass,
        buffer: &mut [u8],
    ) -> NativeResult<usize>;

    /// `NtWow64QueryInformationProcess64`, only usable from a WOW64 caller
    fn wow64_query_information_process64(
        &self,
        process: Self::Handle,
        class: InfoClass,
        buffer: &mut [u8],
    ) -> NativeResult<usize>;

    /// Same-width read of target memory (`ReadProcessMemory`)
    fn read_virtual_memory(
        &self,
        process: Self::Handle,
        address: usize,
        buffer: &mut [u8],
    ) -> NativeResult<usize>;

    /// `NtWow64ReadVirtualMemory64`, only usable from a WOW64 caller
    fn wow64_read_virtual_memory64(
        &self,
        process: Self::Handle,
        address: u64,
        buffer: &mut [u8],
    ) -> NativeResult<usize>;
}
