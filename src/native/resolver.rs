//! Lazy, process-wide resolution of undocumented `ntdll.dll` exports

use crate::core::types::{NativeError, NativeResult};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, trace};

/// The native functions the walk may need
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeFunction {
    QueryInformationProcess,
    Wow64QueryInformationProcess64,
    Wow64ReadVirtualMemory64,
}

impl NativeFunction {
    /// Every function the table has a slot for
    pub const ALL: [NativeFunction; 3] = [
        NativeFunction::QueryInformationProcess,
        NativeFunction::Wow64QueryInformationProcess64,
        NativeFunction::Wow64ReadVirtualMemory64,
    ];

    /// Exported symbol name
    pub const fn symbol(self) -> &'static str {
        match self {
            NativeFunction::QueryInformationProcess => "NtQueryInformationProcess",
            NativeFunction::Wow64QueryInformationProcess64 => "NtWow64QueryInformationProcess64",
            NativeFunction::Wow64ReadVirtualMemory64 => "NtWow64ReadVirtualMemory64",
        }
    }

    const fn slot(self) -> usize {
        match self {
            NativeFunction::QueryInformationProcess => 0,
            NativeFunction::Wow64QueryInformationProcess64 => 1,
            NativeFunction::Wow64ReadVirtualMemory64 => 2,
        }
    }
}

/// Looks symbols up by name in the library hosting the native primitives
pub trait SymbolProvider: Send + Sync {
    /// Entry-point address of `symbol`, or `None` if it is not exported
    fn lookup(&self, symbol: &str) -> Option<NonZeroUsize>;
}

/// Cache of resolved entry points, one slot per [`NativeFunction`].
///
/// A slot holds 0 until its symbol resolves, then the address forever.
/// Slots are filled with a compare-and-swap, so racing first calls only
/// repeat the lookup and every reader sees either 0 or the final address.
/// Failed lookups are not cached.
pub struct FunctionTable<P> {
    provider: P,
    slots: [AtomicUsize; 3],
}

impl<P: SymbolProvider> FunctionTable<P> {
    /// Creates an empty table over a symbol provider
    pub const fn new(provider: P) -> Self {
        FunctionTable {
            provider,
            slots: [AtomicUsize::new(0), AtomicUsize::new(0), AtomicUsize::new(0)],
        }
    }

    /// Address of `function`, looking it up on first use
    pub fn resolve(&self, function: NativeFunction) -> NativeResult<NonZeroUsize> {
        let slot = &self.slots[function.slot()];
        if let Some(address) = NonZeroUsize::new(slot.load(Ordering::Acquire)) {
            return Ok(address);
        }

        let symbol = function.symbol();
        let address = self
            .provider
            .lookup(symbol)
            .ok_or(NativeError::SymbolNotFound(symbol))?;

        match slot.compare_exchange(0, address.get(), Ordering::AcqRel, Ordering::Acquire) {
            Ok(_) => {
                debug!(symbol, "resolved native symbol at 0x{:X}", address.get());
                Ok(address)
            }
            Err(existing) => {
                trace!(symbol, "lost resolution race, keeping cached address");
                // `existing` is non-zero: only non-zero values are ever stored
                Ok(NonZeroUsize::new(existing).unwrap_or(address))
            }
        }
    }

    /// Cached address of `function` without triggering a lookup
    pub fn cached(&self, function: NativeFunction) -> Option<NonZeroUsize> {
        NonZeroUsize::new(self.slots[function.slot()].load(Ordering::Acquire))
    }

    /// The underlying symbol provider
    pub fn provider(&self) -> &P {
        &self.provider
    }
}
