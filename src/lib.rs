//! remote-cmdline: read the command line of another Windows process
//!
//! The walk from process handle to command line (PEB, process parameters,
//! `UNICODE_STRING`, UTF-16 buffer) is plain Rust written against the
//! [`native::NativeApi`] seam. The `windows` module binds that seam to
//! `ntdll.dll`, including the WOW64 primitives a 32-bit caller needs to read
//! a 64-bit target.

pub mod config;
pub mod core;
pub mod extractor;
pub mod memory;
pub mod native;
pub mod process;
#[cfg(windows)]
pub mod windows;

pub use crate::core::types::{
    BitnessRelationship, CmdlineError, CmdlineResult, DescriptorFault, Hop, NativeError,
    PointerWidth, ProcessId, ProcessStrings, RemoteAddress, StringDescriptor,
};
pub use extractor::{
    extract_batch, split_command_line, BatchEntry, BatchReport, CommandLineExtractor,
};
pub use native::{InfoClass, NativeApi};

#[cfg(windows)]
pub use extractor::extract_command_line;

pub use crate::core::{AUTHORS, VERSION};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_constants() {
        assert_eq!(VERSION, env!("CARGO_PKG_VERSION"));
        assert_eq!(AUTHORS, env!("CARGO_PKG_AUTHORS"));
    }

    #[test]
    fn test_error_reexport() {
        let error = CmdlineError::NullPointer {
            hop: Hop::ReadEnvironmentBlock(RemoteAddress::new(0x7FF0_0000)),
        };
        assert!(error.to_string().contains("0x000000007FF00000"));
    }

    #[test]
    fn test_relationship_reexport() {
        let relationship = BitnessRelationship::from_wow64_flags(true, false);
        assert_eq!(relationship, BitnessRelationship::Wow64CallerToNativeTarget);
        assert_eq!(
            relationship.target_width(PointerWidth::Bits32),
            PointerWidth::Bits64
        );
    }
}
