//! Core type definitions for remote-cmdline
//!
//! Addresses, bitness, string descriptors, status codes and the error model
//! shared by every layer of the walk.

mod address;
mod bitness;
mod descriptor;
mod error;
mod status;

// Re-export all public types
pub use address::RemoteAddress;
pub use bitness::{BitnessRelationship, PointerWidth};
pub use descriptor::{decode_utf16le, DescriptorFault, ProcessStrings, StringDescriptor, StringField};
pub use error::{CmdlineError, CmdlineResult, Hop, NativeError, NativeResult};
pub use status::{ErrorCode, NtStatus};

// Common type aliases
pub type ProcessId = u32;
