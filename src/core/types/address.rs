//! Remote address wrapper type

use serde::{Deserialize, Serialize};
use std::fmt;

/// A location in the target process's address space.
///
/// Always 64 bits wide, whatever the pointer width of the target. Addresses
/// read out of 32-bit structures are zero-extended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct RemoteAddress(pub u64);

impl RemoteAddress {
    /// Creates a new address from a u64 value
    pub const fn new(value: u64) -> Self {
        RemoteAddress(value)
    }

    /// Creates a null address (0x0)
    pub const fn null() -> Self {
        RemoteAddress(0)
    }

    /// Checks if the address is null
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Returns the raw u64 value
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Converts to a caller-side `usize`, failing if the address does not fit
    /// the caller's pointer width.
    pub fn to_usize(&self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

impl fmt::Display for RemoteAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.0)
    }
}
