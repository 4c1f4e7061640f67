//! Command-line extraction from a remote process
//!
//! The walk runs in four hops, each one using the address the previous hop
//! produced:
//!
//! 1. query basic process information for the environment block (PEB) address
//! 2. read the PEB up to its process-parameters pointer
//! 3. read the process-parameters block up to the command-line descriptor
//! 4. validate the descriptor and read its UTF-16 buffer
//!
//! A failure at any hop ends the extraction. Nothing is retried, since every
//! later address is derived from the failed one.

pub mod argv;
pub mod batch;

pub use argv::split_command_line;
pub use batch::{extract_batch, BatchEntry, BatchReport};

use crate::core::types::{
    decode_utf16le, BitnessRelationship, CmdlineError, CmdlineResult, Hop, ProcessStrings,
    RemoteAddress, StringField,
};
use crate::memory::RemoteMemoryReader;
use crate::native::NativeApi;
use crate::process::BitnessDetector;
use tracing::{debug, warn};

/// Walks a target's control blocks to recover its startup strings
pub struct CommandLineExtractor<'a, A: NativeApi> {
    api: &'a A,
}

/// State left after hop 3: the reader and the raw process-parameters bytes
struct ParametersBlock<'a, A: NativeApi> {
    reader: RemoteMemoryReader<'a, A>,
    address: RemoteAddress,
    bytes: Vec<u8>,
}

impl<'a, A: NativeApi> CommandLineExtractor<'a, A> {
    /// Create a new extractor over a native API
    pub fn new(api: &'a A) -> Self {
        CommandLineExtractor { api }
    }

    /// Bitness relationship between the caller and `process`
    pub fn relationship(&self, process: A::Handle) -> CmdlineResult<BitnessRelationship> {
        BitnessDetector::new(self.api).detect(process)
    }

    /// Command line of `process`
    pub fn extract(&self, process: A::Handle) -> CmdlineResult<String> {
        self.walk(process)?.read_string(StringField::CommandLine)
    }

    /// Image path of `process`
    pub fn extract_image_path(&self, process: A::Handle) -> CmdlineResult<String> {
        self.walk(process)?.read_string(StringField::ImagePath)
    }

    /// Image path and command line of `process` from a single walk
    pub fn extract_parameters(&self, process: A::Handle) -> CmdlineResult<ProcessStrings> {
        let block = self.walk(process)?;
        Ok(ProcessStrings {
            image_path: block.read_string(StringField::ImagePath)?,
            command_line: block.read_string(StringField::CommandLine)?,
        })
    }

    fn walk(&self, process: A::Handle) -> CmdlineResult<ParametersBlock<'a, A>> {
        let relationship = self.relationship(process)?;
        let reader = RemoteMemoryReader::new(self.api, process, relationship);
        let layout = reader.layout();

        let peb = reader.environment_block_address()?;
        if peb.is_null() {
            return Err(CmdlineError::NullPointer {
                hop: Hop::QueryBasicInformation,
            });
        }

        let hop = Hop::ReadEnvironmentBlock(peb);
        let peb_bytes = reader.read(hop, peb, layout.peb_read_size())?;
        let parameters = layout
            .process_parameters(&peb_bytes)
            .map_err(|fault| CmdlineError::malformed(hop, fault))?;
        if parameters.is_null() {
            return Err(CmdlineError::NullPointer { hop });
        }

        let hop = Hop::ReadProcessParameters(parameters);
        let bytes = reader.read(hop, parameters, layout.parameters_read_size())?;
        debug!(%peb, %parameters, width = %layout.width, "process parameters located");

        Ok(ParametersBlock {
            reader,
            address: parameters,
            bytes,
        })
    }
}

impl<'a, A: NativeApi> ParametersBlock<'a, A> {
    fn read_string(&self, field: StringField) -> CmdlineResult<String> {
        let hop = Hop::ReadProcessParameters(self.address);
        let descriptor = self
            .reader
            .layout()
            .string_descriptor(&self.bytes, field)
            .map_err(|fault| CmdlineError::malformed(hop, fault))?;

        if let Err(fault) = descriptor.validate() {
            warn!(%field, %fault, "rejecting string descriptor, layout assumptions may not hold");
            return Err(CmdlineError::malformed(hop, fault));
        }
        if descriptor.is_empty() {
            return Ok(String::new());
        }

        let hop = Hop::ReadString(field, descriptor.buffer);
        let bytes = self
            .reader
            .read(hop, descriptor.buffer, usize::from(descriptor.length))?;
        Ok(decode_utf16le(&bytes))
    }
}

/// Command line of `process` using the system's `ntdll.dll`.
///
/// The handle needs `PROCESS_QUERY_INFORMATION` (or the limited variant) and
/// `PROCESS_VM_READ`. It is borrowed, never closed.
#[cfg(windows)]
pub fn extract_command_line(process: winapi::um::winnt::HANDLE) -> CmdlineResult<String> {
    let api = crate::windows::NtApi::system();
    CommandLineExtractor::new(&api).extract(process)
}
