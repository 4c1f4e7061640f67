//! Counted UTF-16 string descriptors read out of a target process

use super::address::RemoteAddress;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A `UNICODE_STRING` as found in the target: byte length, byte capacity and
/// the remote address of the character buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StringDescriptor {
    pub length: u16,
    pub maximum_length: u16,
    pub buffer: RemoteAddress,
}

/// Why a string descriptor was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorFault {
    /// `length` is larger than `maximum_length`
    LengthExceedsMaximum { length: u16, maximum_length: u16 },
    /// `length` is not a whole number of UTF-16 code units
    OddLength(u16),
    /// Non-empty string with a null buffer
    NullBuffer,
    /// Fewer structure bytes than the layout requires
    Truncated { needed: usize, available: usize },
}

impl fmt::Display for DescriptorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptorFault::LengthExceedsMaximum {
                length,
                maximum_length,
            } => write!(
                f,
                "length {} exceeds maximum length {}",
                length, maximum_length
            ),
            DescriptorFault::OddLength(length) => {
                write!(f, "odd byte length {} for UTF-16 text", length)
            }
            DescriptorFault::NullBuffer => write!(f, "non-empty string with null buffer"),
            DescriptorFault::Truncated { needed, available } => write!(
                f,
                "structure truncated: needed {} bytes, have {}",
                needed, available
            ),
        }
    }
}

impl StringDescriptor {
    /// Creates a new descriptor
    pub const fn new(length: u16, maximum_length: u16, buffer: RemoteAddress) -> Self {
        StringDescriptor {
            length,
            maximum_length,
            buffer,
        }
    }

    /// Whether the descriptor describes an empty string
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Checks the descriptor invariants.
    ///
    /// An empty descriptor is valid whatever its buffer holds.
    pub fn validate(&self) -> Result<(), DescriptorFault> {
        if self.length > self.maximum_length {
            return Err(DescriptorFault::LengthExceedsMaximum {
                length: self.length,
                maximum_length: self.maximum_length,
            });
        }
        if self.length == 0 {
            return Ok(());
        }
        if self.length % 2 != 0 {
            return Err(DescriptorFault::OddLength(self.length));
        }
        if self.buffer.is_null() {
            return Err(DescriptorFault::NullBuffer);
        }
        Ok(())
    }
}

/// Which string of the process-parameters block a hop is after
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringField {
    ImagePath,
    CommandLine,
}

impl fmt::Display for StringField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StringField::ImagePath => write!(f, "image path"),
            StringField::CommandLine => write!(f, "command line"),
        }
    }
}

/// Both strings recovered from one walk of the process-parameters block
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProcessStrings {
    pub image_path: String,
    pub command_line: String,
}

/// Decodes little-endian UTF-16 bytes.
///
/// The byte count is authoritative; no terminator is looked for. Unpaired
/// surrogates become U+FFFD.
pub fn decode_utf16le(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}
