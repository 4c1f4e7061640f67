//! Windows API layer
//!
//! Implements [`crate::native::NativeApi`] over `ntdll.dll` and
//! `kernel32.dll`. All unsafe FFI calls are contained within this module.

pub mod bindings;
pub mod types;

pub use bindings::ntdll::{ntdll_table, NtApi, NtdllSymbols};
pub use types::Handle;
