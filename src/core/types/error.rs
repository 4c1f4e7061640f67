//! Error types for remote command-line extraction

use super::address::RemoteAddress;
use super::descriptor::{DescriptorFault, StringField};
use super::status::{ErrorCode, NtStatus};
use std::fmt;
use thiserror::Error;

/// The step of the walk an operation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hop {
    /// WOW64 status queries on caller and target
    DetectBitness,
    /// Basic information query yielding the environment block address
    QueryBasicInformation,
    /// Read of the environment block (PEB)
    ReadEnvironmentBlock(RemoteAddress),
    /// Read of the process-parameters block
    ReadProcessParameters(RemoteAddress),
    /// Read of a string buffer
    ReadString(StringField, RemoteAddress),
}

impl Hop {
    /// Whether this hop reads target memory (as opposed to querying)
    pub const fn is_read(&self) -> bool {
        matches!(
            self,
            Hop::ReadEnvironmentBlock(_) | Hop::ReadProcessParameters(_) | Hop::ReadString(..)
        )
    }

    /// Target address the hop reads from, if any
    pub const fn address(&self) -> Option<RemoteAddress> {
        match self {
            Hop::DetectBitness | Hop::QueryBasicInformation => None,
            Hop::ReadEnvironmentBlock(address)
            | Hop::ReadProcessParameters(address)
            | Hop::ReadString(_, address) => Some(*address),
        }
    }
}

impl fmt::Display for Hop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hop::DetectBitness => write!(f, "bitness detection"),
            Hop::QueryBasicInformation => write!(f, "basic information query"),
            Hop::ReadEnvironmentBlock(address) => {
                write!(f, "environment block read at {}", address)
            }
            Hop::ReadProcessParameters(address) => {
                write!(f, "process parameters read at {}", address)
            }
            Hop::ReadString(field, address) => write!(f, "{} buffer read at {}", field, address),
        }
    }
}

/// Raw failure of a native primitive, before it is attributed to a hop
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeError {
    #[error("{0}")]
    Status(NtStatus),

    #[error("Win32 error {code}: {0}", code = .0.code())]
    Win32(ErrorCode),

    #[error("symbol {0} not exported by ntdll.dll")]
    SymbolNotFound(&'static str),

    #[error("address 0x{0:X} does not fit the caller's pointer width")]
    AddressOutOfRange(u64),
}

impl NativeError {
    /// Access denied, invalid handle or an address the primitive cannot reach
    pub fn is_access_failure(&self) -> bool {
        match self {
            NativeError::Status(status) => {
                *status == NtStatus::ACCESS_DENIED || *status == NtStatus::INVALID_HANDLE
            }
            NativeError::Win32(code) => {
                matches!(code, ErrorCode::AccessDenied | ErrorCode::InvalidHandle)
            }
            NativeError::AddressOutOfRange(_) => true,
            NativeError::SymbolNotFound(_) => false,
        }
    }
}

/// Result type alias for native primitives
pub type NativeResult<T> = Result<T, NativeError>;

/// Main error type for command-line extraction
#[derive(Error, Debug)]
pub enum CmdlineError {
    #[error("Native symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("Query failed during {hop}: {cause}")]
    Query { hop: Hop, cause: NativeError },

    #[error("Access failure during {hop}: {cause}")]
    Access { hop: Hop, cause: NativeError },

    #[error("Partial read during {hop}: expected {expected} bytes, got {actual}")]
    PartialRead {
        hop: Hop,
        expected: usize,
        actual: usize,
    },

    #[error("Malformed descriptor during {hop}: {fault}")]
    MalformedDescriptor { hop: Hop, fault: DescriptorFault },

    #[error("Null pointer encountered during {hop}")]
    NullPointer { hop: Hop },

    #[error("Failed to open process {pid}: {code}")]
    OpenProcess { pid: u32, code: ErrorCode },

    #[error("Worker pool error: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result type alias for extraction operations
pub type CmdlineResult<T> = Result<T, CmdlineError>;

impl CmdlineError {
    /// Attributes a native failure to the hop it happened in.
    ///
    /// Access-type failures are `Access` wherever they happen. Anything else
    /// is `Access` on a read hop and `Query` on a query hop.
    pub fn from_native(hop: Hop, cause: NativeError) -> Self {
        match cause {
            NativeError::SymbolNotFound(symbol) => CmdlineError::SymbolNotFound {
                symbol: symbol.to_string(),
            },
            cause if cause.is_access_failure() || hop.is_read() => {
                CmdlineError::Access { hop, cause }
            }
            cause => CmdlineError::Query { hop, cause },
        }
    }

    /// Creates a malformed descriptor error
    pub fn malformed(hop: Hop, fault: DescriptorFault) -> Self {
        CmdlineError::MalformedDescriptor { hop, fault }
    }

    /// Creates a partial read error
    pub fn partial_read(hop: Hop, expected: usize, actual: usize) -> Self {
        CmdlineError::PartialRead {
            hop,
            expected,
            actual,
        }
    }

    /// Hop the error is attributed to, if any
    pub fn hop(&self) -> Option<Hop> {
        match self {
            CmdlineError::Query { hop, .. }
            | CmdlineError::Access { hop, .. }
            | CmdlineError::PartialRead { hop, .. }
            | CmdlineError::MalformedDescriptor { hop, .. }
            | CmdlineError::NullPointer { hop } => Some(*hop),
            CmdlineError::SymbolNotFound { .. }
            | CmdlineError::OpenProcess { .. }
            | CmdlineError::WorkerPool(_) => None,
        }
    }
}
