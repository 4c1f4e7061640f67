//! Core module containing fundamental types for remote-cmdline
//!
//! This module provides the building blocks used throughout the crate:
//! remote addresses, bitness relationships, string descriptors and errors.

pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    BitnessRelationship, CmdlineError, CmdlineResult, Hop, PointerWidth, ProcessId,
    RemoteAddress, StringDescriptor,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
