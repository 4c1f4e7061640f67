//! Remote memory access for the command-line walk

pub mod reader;

pub use reader::RemoteMemoryReader;
