//! Simulated caller and target processes for exercising the walk off-Windows

#![allow(dead_code)]

use remote_cmdline::core::types::{ErrorCode, NtStatus, StringField};
use remote_cmdline::{InfoClass, NativeApi, NativeError, PointerWidth};
use std::sync::atomic::{AtomicUsize, Ordering};

pub const SAMPLE_COMMAND_LINE: &str = "sample.exe --flag value";
pub const SAMPLE_IMAGE_PATH: &str = r"C:\Tools\sample.exe";

// 64-bit targets keep their blocks above 4 GiB so a 32-bit pointer cannot reach them
pub const PEB_64: u64 = 0x0000_00D2_3A5E_0000;
pub const PARAMETERS_64: u64 = 0x0000_01F4_C7A2_0000;
pub const STRINGS_64: u64 = 0x0000_01F4_C7A2_1000;

pub const PEB_32: u64 = 0x7EFD_E000;
pub const PARAMETERS_32: u64 = 0x0062_0000;
pub const STRINGS_32: u64 = 0x0062_1000;

/// Offset of the command-line text from the start of the strings region
const COMMAND_LINE_TEXT: u64 = 0x400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeHandle {
    Caller,
    Target,
}

struct Region {
    base: u64,
    bytes: Vec<u8>,
}

/// A caller/target pair with a byte-addressable target address space
pub struct FakeNative {
    pub native_width: PointerWidth,
    pub caller_wow64: bool,
    pub target_wow64: bool,
    /// PEB reported by the basic information query of the caller's width
    pub basic_peb: u64,
    /// PEB reported by the 64-bit WOW64 basic information query
    pub basic_peb64: u64,
    /// 32-bit PEB reported through `Wow64Information` for a WOW64 target
    pub wow64_peb: u64,
    /// Every query against the target fails with this
    pub query_failure: Option<NativeError>,
    /// Every read against the target fails with this
    pub read_failure: Option<NativeError>,
    /// Target calls after which it behaves as exited
    pub exit_after: Option<usize>,
    /// The target is gone: queries still answer but reads copy nothing
    pub exited: bool,
    /// Byte count reported by basic information queries, if short
    pub basic_information_written: Option<usize>,
    /// Hides the WOW64 primitives as a 64-bit ntdll would
    pub wow64_exports: bool,
    regions: Vec<Region>,
    pub target_calls: AtomicUsize,
    pub native_reads: AtomicUsize,
    pub wow64_reads: AtomicUsize,
}

impl FakeNative {
    fn empty(native_width: PointerWidth, caller_wow64: bool, target_wow64: bool) -> Self {
        FakeNative {
            native_width,
            caller_wow64,
            target_wow64,
            basic_peb: 0,
            basic_peb64: 0,
            wow64_peb: 0,
            query_failure: None,
            read_failure: None,
            exit_after: None,
            exited: false,
            basic_information_written: None,
            wow64_exports: caller_wow64,
            regions: Vec::new(),
            target_calls: AtomicUsize::new(0),
            native_reads: AtomicUsize::new(0),
            wow64_reads: AtomicUsize::new(0),
        }
    }

    /// 64-bit caller, 64-bit target
    pub fn native64(command_line: &str) -> Self {
        let mut fake = Self::empty(PointerWidth::Bits64, false, false);
        fake.write_image(PointerWidth::Bits64, SAMPLE_IMAGE_PATH, command_line);
        fake.basic_peb = PEB_64;
        fake
    }

    /// 32-bit caller, 32-bit target, on 32-bit Windows
    pub fn native32(command_line: &str) -> Self {
        let mut fake = Self::empty(PointerWidth::Bits32, false, false);
        fake.write_image(PointerWidth::Bits32, SAMPLE_IMAGE_PATH, command_line);
        fake.basic_peb = PEB_32;
        fake
    }

    /// 32-bit caller under WOW64, 64-bit target
    pub fn wow64_caller(command_line: &str) -> Self {
        let mut fake = Self::empty(PointerWidth::Bits32, true, false);
        fake.write_image(PointerWidth::Bits64, SAMPLE_IMAGE_PATH, command_line);
        // The 32-bit query cannot describe a 64-bit PEB
        fake.basic_peb = 0;
        fake.basic_peb64 = PEB_64;
        fake
    }

    /// 32-bit caller and 32-bit target, both under WOW64
    pub fn wow64_both(command_line: &str) -> Self {
        let mut fake = Self::empty(PointerWidth::Bits32, true, true);
        fake.write_image(PointerWidth::Bits32, SAMPLE_IMAGE_PATH, command_line);
        fake.basic_peb = PEB_32;
        fake.wow64_peb = PEB_32;
        fake
    }

    /// 64-bit caller, 32-bit target under WOW64
    pub fn wow64_target(command_line: &str) -> Self {
        let mut fake = Self::empty(PointerWidth::Bits64, false, true);
        fake.write_image(PointerWidth::Bits32, SAMPLE_IMAGE_PATH, command_line);
        // The native PEB of a WOW64 process is the 64-bit one, which is not mapped here
        fake.basic_peb = PEB_64;
        fake.wow64_peb = PEB_32;
        fake
    }

    fn addresses(width: PointerWidth) -> (u64, u64, u64) {
        match width {
            PointerWidth::Bits32 => (PEB_32, PARAMETERS_32, STRINGS_32),
            PointerWidth::Bits64 => (PEB_64, PARAMETERS_64, STRINGS_64),
        }
    }

    fn write_image(&mut self, width: PointerWidth, image_path: &str, command_line: &str) {
        let (peb, parameters, strings) = Self::addresses(width);
        self.map(peb, 0x100);
        self.map(parameters, 0x400);
        self.map(strings, 0x2000);

        let pointer = width.pointer_size();
        let parameters_offset = match width {
            PointerWidth::Bits32 => 0x10,
            PointerWidth::Bits64 => 0x20,
        };
        self.poke(peb + parameters_offset, &parameters.to_le_bytes()[..pointer]);

        let image = utf16(image_path);
        let command = utf16(command_line);
        self.poke(strings, &image);
        self.poke(strings + COMMAND_LINE_TEXT, &command);

        self.set_descriptor(
            width,
            StringField::ImagePath,
            image.len() as u16,
            image.len() as u16 + 2,
            strings,
        );
        self.set_descriptor(
            width,
            StringField::CommandLine,
            command.len() as u16,
            command.len() as u16 + 2,
            strings + COMMAND_LINE_TEXT,
        );
    }

    /// Overwrite a `UNICODE_STRING` in the target's process parameters
    pub fn set_descriptor(
        &mut self,
        width: PointerWidth,
        field: StringField,
        length: u16,
        maximum_length: u16,
        buffer: u64,
    ) {
        let (_, parameters, _) = Self::addresses(width);
        let (offset, buffer_offset) = match (width, field) {
            (PointerWidth::Bits32, StringField::ImagePath) => (0x38, 4),
            (PointerWidth::Bits32, StringField::CommandLine) => (0x40, 4),
            (PointerWidth::Bits64, StringField::ImagePath) => (0x60, 8),
            (PointerWidth::Bits64, StringField::CommandLine) => (0x70, 8),
        };
        let address = parameters + offset;
        self.poke(address, &length.to_le_bytes());
        self.poke(address + 2, &maximum_length.to_le_bytes());
        self.poke(
            address + buffer_offset,
            &buffer.to_le_bytes()[..width.pointer_size()],
        );
    }

    /// Map a zeroed region of the target
    pub fn map(&mut self, base: u64, size: usize) {
        self.regions.push(Region {
            base,
            bytes: vec![0; size],
        });
    }

    /// Drop every region starting at `base`
    pub fn unmap(&mut self, base: u64) {
        self.regions.retain(|region| region.base != base);
    }

    /// Shrink the region starting at `base` to `size` bytes
    pub fn truncate(&mut self, base: u64, size: usize) {
        for region in self.regions.iter_mut().filter(|r| r.base == base) {
            region.bytes.truncate(size);
        }
    }

    /// Write into an already mapped region of the target
    pub fn poke(&mut self, address: u64, bytes: &[u8]) {
        let region = self
            .regions
            .iter_mut()
            .find(|r| {
                address >= r.base && address + bytes.len() as u64 <= r.base + r.bytes.len() as u64
            })
            .expect("poke outside mapped memory");
        let start = (address - region.base) as usize;
        region.bytes[start..start + bytes.len()].copy_from_slice(bytes);
    }

    fn copy_out(&self, address: u64, buffer: &mut [u8]) -> Option<usize> {
        let region = self
            .regions
            .iter()
            .find(|r| address >= r.base && address < r.base + r.bytes.len() as u64)?;
        let start = (address - region.base) as usize;
        let count = buffer.len().min(region.bytes.len() - start);
        buffer[..count].copy_from_slice(&region.bytes[start..start + count]);
        Some(count)
    }

    fn target_call(&self, handle: FakeHandle) -> Result<(), NativeError> {
        if handle == FakeHandle::Caller {
            return Ok(());
        }
        let calls = self.target_calls.fetch_add(1, Ordering::SeqCst);
        match self.exit_after {
            Some(limit) if calls >= limit => {
                Err(NativeError::Status(NtStatus::PROCESS_IS_TERMINATING))
            }
            _ => Ok(()),
        }
    }

    fn write_pointer(buffer: &mut [u8], offset: usize, value: u64) -> Result<(), NativeError> {
        let size = buffer.len().saturating_sub(offset).min(8);
        if size == 0 {
            return Err(NativeError::Status(NtStatus::INFO_LENGTH_MISMATCH));
        }
        buffer[offset..offset + size].copy_from_slice(&value.to_le_bytes()[..size]);
        Ok(())
    }

    fn basic_information(
        &self,
        buffer: &mut [u8],
        width: PointerWidth,
        peb: u64,
    ) -> Result<usize, NativeError> {
        let (size, peb_offset) = match width {
            PointerWidth::Bits32 => (24, 4),
            PointerWidth::Bits64 => (48, 8),
        };
        if buffer.len() < size {
            return Err(NativeError::Status(NtStatus::INFO_LENGTH_MISMATCH));
        }
        buffer.fill(0);
        buffer[peb_offset..peb_offset + width.pointer_size()]
            .copy_from_slice(&peb.to_le_bytes()[..width.pointer_size()]);
        Ok(self.basic_information_written.unwrap_or(size))
    }
}

impl NativeApi for FakeNative {
    type Handle = FakeHandle;

    fn native_width(&self) -> PointerWidth {
        self.native_width
    }

    fn current_process(&self) -> FakeHandle {
        FakeHandle::Caller
    }

    fn query_information_process(
        &self,
        process: FakeHandle,
        class: InfoClass,
        buffer: &mut [u8],
    ) -> Result<usize, NativeError> {
        self.target_call(process)?;
        if process == FakeHandle::Target {
            if let Some(failure) = self.query_failure {
                return Err(failure);
            }
        }

        match class {
            InfoClass::Wow64Information => {
                let value = match process {
                    FakeHandle::Caller => u64::from(self.caller_wow64),
                    FakeHandle::Target if self.target_wow64 => self.wow64_peb,
                    FakeHandle::Target => 0,
                };
                Self::write_pointer(buffer, 0, value)?;
                Ok(buffer.len())
            }
            InfoClass::BasicInformation => {
                self.basic_information(buffer, self.native_width, self.basic_peb)
            }
        }
    }

    fn wow64_query_information_process64(
        &self,
        process: FakeHandle,
        class: InfoClass,
        buffer: &mut [u8],
    ) -> Result<usize, NativeError> {
        if !self.wow64_exports {
            return Err(NativeError::SymbolNotFound("NtWow64QueryInformationProcess64"));
        }
        self.target_call(process)?;
        if let Some(failure) = self.query_failure {
            return Err(failure);
        }
        match class {
            InfoClass::BasicInformation => {
                self.basic_information(buffer, PointerWidth::Bits64, self.basic_peb64)
            }
            InfoClass::Wow64Information => Err(NativeError::Status(NtStatus::INVALID_PARAMETER)),
        }
    }

    fn read_virtual_memory(
        &self,
        process: FakeHandle,
        address: usize,
        buffer: &mut [u8],
    ) -> Result<usize, NativeError> {
        self.target_call(process)?;
        self.native_reads.fetch_add(1, Ordering::SeqCst);
        if let Some(failure) = self.read_failure {
            return Err(failure);
        }
        if self.exited {
            return Ok(0);
        }
        self.copy_out(address as u64, buffer)
            .ok_or(NativeError::Win32(ErrorCode::NoAccess))
    }

    fn wow64_read_virtual_memory64(
        &self,
        process: FakeHandle,
        address: u64,
        buffer: &mut [u8],
    ) -> Result<usize, NativeError> {
        if !self.wow64_exports {
            return Err(NativeError::SymbolNotFound("NtWow64ReadVirtualMemory64"));
        }
        self.target_call(process)?;
        self.wow64_reads.fetch_add(1, Ordering::SeqCst);
        if let Some(failure) = self.read_failure {
            return Err(failure);
        }
        if self.exited {
            return Ok(0);
        }
        self.copy_out(address, buffer)
            .ok_or(NativeError::Status(NtStatus::ACCESS_VIOLATION))
    }
}

/// UTF-16LE bytes of `text`
pub fn utf16(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_le_bytes).collect()
}
