//! Bitness-aware reads of another process's memory
//!
//! One reader serves every hop of one extraction. The relationship it is
//! built with fixes both the primitive used for each read and the structure
//! layout the hops decode with, so the two can never disagree mid-walk.

use crate::core::types::{
    BitnessRelationship, CmdlineError, CmdlineResult, ErrorCode, Hop, NativeError, NativeResult,
    NtStatus, PointerWidth, RemoteAddress,
};
use crate::native::layout::LAYOUT_64;
use crate::native::{InfoClass, NativeApi, StructureLayout};
use tracing::{debug, trace};

/// Reads target memory with the strategy a bitness relationship calls for
pub struct RemoteMemoryReader<'a, A: NativeApi> {
    api: &'a A,
    process: A::Handle,
    relationship: BitnessRelationship,
}

impl<'a, A: NativeApi> RemoteMemoryReader<'a, A> {
    /// Create a reader for `process` using the strategy for `relationship`
    pub fn new(api: &'a A, process: A::Handle, relationship: BitnessRelationship) -> Self {
        RemoteMemoryReader {
            api,
            process,
            relationship,
        }
    }

    /// The relationship this reader was built for
    pub fn relationship(&self) -> BitnessRelationship {
        self.relationship
    }

    /// Structure layout of the target's control blocks
    pub fn layout(&self) -> &'static StructureLayout {
        StructureLayout::for_width(self.relationship.target_width(self.api.native_width()))
    }

    /// Address of the target's environment block (PEB)
    pub fn environment_block_address(&self) -> CmdlineResult<RemoteAddress> {
        let hop = Hop::QueryBasicInformation;
        let native = StructureLayout::for_width(self.api.native_width());

        let address = match self.relationship {
            BitnessRelationship::NativeToNative => {
                let mut pbi = vec![0u8; native.basic_information_size];
                let written = self
                    .api
                    .query_information_process(self.process, InfoClass::BasicInformation, &mut pbi)
                    .map_err(|cause| CmdlineError::from_native(hop, cause))?;
                // Never decode bytes the query did not write
                pbi.truncate(written);
                trace!(%hop, bytes = %hex::encode(&pbi), "basic information");
                native.peb_address(&pbi)
            }
            BitnessRelationship::NativeCallerToWow64Target => {
                // The 32-bit PEB of a WOW64 process is reported directly
                let mut peb32 = vec![0u8; native.width.pointer_size()];
                let written = self
                    .api
                    .query_information_process(self.process, InfoClass::Wow64Information, &mut peb32)
                    .map_err(|cause| CmdlineError::from_native(hop, cause))?;
                peb32.truncate(written);
                native.read_pointer(&peb32, 0)
            }
            BitnessRelationship::Wow64CallerToNativeTarget => {
                let mut pbi = vec![0u8; LAYOUT_64.basic_information_size];
                let written = self
                    .api
                    .wow64_query_information_process64(
                        self.process,
                        InfoClass::BasicInformation,
                        &mut pbi,
                    )
                    .map_err(|cause| CmdlineError::from_native(hop, cause))?;
                pbi.truncate(written);
                trace!(%hop, bytes = %hex::encode(&pbi), "basic information (64-bit)");
                LAYOUT_64.peb_address(&pbi)
            }
        }
        .map_err(|fault| CmdlineError::malformed(hop, fault))?;

        debug!(relationship = %self.relationship, peb = %address, "environment block located");
        Ok(address)
    }

    /// Read exactly `length` bytes at `address`.
    ///
    /// A read that copies nothing is a [`CmdlineError::Access`]. A short one
    /// is a [`CmdlineError::PartialRead`]; nothing read before the failure is
    /// returned.
    pub fn read(&self, hop: Hop, address: RemoteAddress, length: usize) -> CmdlineResult<Vec<u8>> {
        let mut buffer = vec![0u8; length];
        if length == 0 {
            return Ok(buffer);
        }

        let (transferred, nothing_copied) = match self.relationship {
            BitnessRelationship::Wow64CallerToNativeTarget => (
                self.api
                    .wow64_read_virtual_memory64(self.process, address.as_u64(), &mut buffer),
                NativeError::Status(NtStatus::PARTIAL_COPY),
            ),
            BitnessRelationship::NativeToNative
            | BitnessRelationship::NativeCallerToWow64Target => (
                self.native_address(address).and_then(|native| {
                    self.api.read_virtual_memory(self.process, native, &mut buffer)
                }),
                NativeError::Win32(ErrorCode::PartialCopy),
            ),
        };
        let transferred = transferred.map_err(|cause| CmdlineError::from_native(hop, cause))?;

        // An exited target still answers queries but has no address space left
        if transferred == 0 {
            return Err(CmdlineError::Access {
                hop,
                cause: nothing_copied,
            });
        }
        if transferred < length {
            return Err(CmdlineError::partial_read(hop, length, transferred));
        }

        // String contents may carry secrets; only structure bytes are dumped
        if matches!(hop, Hop::ReadString(..)) {
            trace!(%hop, length, "read target string");
        } else {
            trace!(%hop, length, bytes = %hex::encode(&buffer), "read target memory");
        }
        Ok(buffer)
    }

    /// Converts a target address into one the caller's own read can take
    fn native_address(&self, address: RemoteAddress) -> NativeResult<usize> {
        let fits = match self.api.native_width() {
            PointerWidth::Bits32 => address.as_u64() <= u64::from(u32::MAX),
            PointerWidth::Bits64 => true,
        };
        address
            .to_usize()
            .filter(|_| fits)
            .ok_or(NativeError::AddressOutOfRange(address.as_u64()))
    }
}
