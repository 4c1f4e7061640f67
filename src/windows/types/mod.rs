//! Windows-specific types

pub mod handle;

pub use handle::Handle;
