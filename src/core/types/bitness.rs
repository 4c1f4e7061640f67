//! Pointer widths and caller/target bitness relationships

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pointer width of a process's address space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerWidth {
    /// 32-bit pointers
    Bits32,
    /// 64-bit pointers
    Bits64,
}

impl PointerWidth {
    /// Pointer width of the running (calling) process
    #[cfg(target_pointer_width = "64")]
    pub const NATIVE: PointerWidth = PointerWidth::Bits64;

    /// Pointer width of the running (calling) process
    #[cfg(not(target_pointer_width = "64"))]
    pub const NATIVE: PointerWidth = PointerWidth::Bits32;

    /// Returns the pointer size in bytes
    pub const fn pointer_size(&self) -> usize {
        match self {
            PointerWidth::Bits32 => 4,
            PointerWidth::Bits64 => 8,
        }
    }
}

impl fmt::Display for PointerWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointerWidth::Bits32 => write!(f, "32-bit"),
            PointerWidth::Bits64 => write!(f, "64-bit"),
        }
    }
}

/// How the caller's architecture relates to the target's.
///
/// Selected once per extraction. It decides both the read primitive and the
/// structure layout used for every hop of the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BitnessRelationship {
    /// Caller and target share a pointer width
    NativeToNative,
    /// 64-bit caller, 32-bit WOW64 target
    NativeCallerToWow64Target,
    /// 32-bit WOW64 caller, 64-bit target
    Wow64CallerToNativeTarget,
}

impl BitnessRelationship {
    /// Derives the relationship from the WOW64 status of both processes
    pub const fn from_wow64_flags(caller_is_wow64: bool, target_is_wow64: bool) -> Self {
        match (caller_is_wow64, target_is_wow64) {
            (false, true) => BitnessRelationship::NativeCallerToWow64Target,
            (true, false) => BitnessRelationship::Wow64CallerToNativeTarget,
            _ => BitnessRelationship::NativeToNative,
        }
    }

    /// Pointer width of the target's structures, given the caller's own width
    pub const fn target_width(&self, caller: PointerWidth) -> PointerWidth {
        match self {
            BitnessRelationship::NativeToNative => caller,
            BitnessRelationship::NativeCallerToWow64Target => PointerWidth::Bits32,
            BitnessRelationship::Wow64CallerToNativeTarget => PointerWidth::Bits64,
        }
    }
}

impl fmt::Display for BitnessRelationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitnessRelationship::NativeToNative => write!(f, "native-to-native"),
            BitnessRelationship::NativeCallerToWow64Target => {
                write!(f, "native-caller-to-wow64-target")
            }
            BitnessRelationship::Wow64CallerToNativeTarget => {
                write!(f, "wow64-caller-to-native-target")
            }
        }
    }
}
