//! Process-side functionality
//!
//! Bitness detection for a target, and (on Windows) the RAII handle the CLI
//! opens targets with. The extraction core only ever borrows handles.

pub mod bitness;
#[cfg(windows)]
pub mod handle;

pub use bitness::BitnessDetector;
#[cfg(windows)]
pub use handle::{ProcessAccess, ProcessHandle};
