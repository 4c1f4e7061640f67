//! Fixed structure layouts of the target's control blocks
//!
//! Only the fields the walk consumes are described. Offsets come from the
//! public `winternl.h` partial definitions and are stable across Windows
//! releases that ship WOW64, but they are layout assumptions all the same:
//! a mismatch shows up as a [`DescriptorFault`] rather than as garbage text.

use crate::core::types::{
    DescriptorFault, PointerWidth, RemoteAddress, StringDescriptor, StringField,
};

/// Byte offsets for one pointer width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructureLayout {
    pub width: PointerWidth,
    /// `sizeof(PROCESS_BASIC_INFORMATION)`
    pub basic_information_size: usize,
    /// `PROCESS_BASIC_INFORMATION.PebBaseAddress`
    pub basic_information_peb_offset: usize,
    /// `PEB.ProcessParameters`
    pub peb_process_parameters_offset: usize,
    /// `RTL_USER_PROCESS_PARAMETERS.ImagePathName`
    pub image_path_offset: usize,
    /// `RTL_USER_PROCESS_PARAMETERS.CommandLine`
    pub command_line_offset: usize,
    /// `sizeof(UNICODE_STRING)`
    pub unicode_string_size: usize,
    /// `UNICODE_STRING.Buffer`
    pub unicode_string_buffer_offset: usize,
}

/// 32-bit structures (x86 processes, including WOW64 targets)
pub const LAYOUT_32: StructureLayout = StructureLayout {
    width: PointerWidth::Bits32,
    basic_information_size: 24,
    basic_information_peb_offset: 0x04,
    peb_process_parameters_offset: 0x10,
    image_path_offset: 0x38,
    command_line_offset: 0x40,
    unicode_string_size: 8,
    unicode_string_buffer_offset: 0x04,
};

/// 64-bit structures (also the explicit `*_WOW64` variants)
pub const LAYOUT_64: StructureLayout = StructureLayout {
    width: PointerWidth::Bits64,
    basic_information_size: 48,
    basic_information_peb_offset: 0x08,
    peb_process_parameters_offset: 0x20,
    image_path_offset: 0x60,
    command_line_offset: 0x70,
    unicode_string_size: 16,
    unicode_string_buffer_offset: 0x08,
};

impl StructureLayout {
    /// Layout for a pointer width
    pub const fn for_width(width: PointerWidth) -> &'static StructureLayout {
        match width {
            PointerWidth::Bits32 => &LAYOUT_32,
            PointerWidth::Bits64 => &LAYOUT_64,
        }
    }

    /// Bytes of the PEB needed to reach the process-parameters pointer
    pub const fn peb_read_size(&self) -> usize {
        self.peb_process_parameters_offset + self.width.pointer_size()
    }

    /// Bytes of the process-parameters block needed to reach both descriptors
    pub const fn parameters_read_size(&self) -> usize {
        self.command_line_offset + self.unicode_string_size
    }

    /// Offset of a string descriptor within the process-parameters block
    pub const fn string_offset(&self, field: StringField) -> usize {
        match field {
            StringField::ImagePath => self.image_path_offset,
            StringField::CommandLine => self.command_line_offset,
        }
    }

    /// Reads a pointer-width little-endian value, zero-extended
    pub fn read_pointer(&self, bytes: &[u8], offset: usize) -> Result<RemoteAddress, DescriptorFault> {
        let size = self.width.pointer_size();
        let field = field_bytes(bytes, offset, size)?;
        let value = match self.width {
            PointerWidth::Bits32 => u64::from(u32::from_le_bytes([
                field[0], field[1], field[2], field[3],
            ])),
            PointerWidth::Bits64 => u64::from_le_bytes([
                field[0], field[1], field[2], field[3], field[4], field[5], field[6], field[7],
            ]),
        };
        Ok(RemoteAddress::new(value))
    }

    /// PEB address out of a `PROCESS_BASIC_INFORMATION` buffer
    pub fn peb_address(&self, basic_information: &[u8]) -> Result<RemoteAddress, DescriptorFault> {
        self.read_pointer(basic_information, self.basic_information_peb_offset)
    }

    /// Process-parameters pointer out of the start of a PEB
    pub fn process_parameters(&self, peb: &[u8]) -> Result<RemoteAddress, DescriptorFault> {
        self.read_pointer(peb, self.peb_process_parameters_offset)
    }

    /// A string descriptor out of the start of the process-parameters block
    pub fn string_descriptor(
        &self,
        parameters: &[u8],
        field: StringField,
    ) -> Result<StringDescriptor, DescriptorFault> {
        let offset = self.string_offset(field);
        let raw = field_bytes(parameters, offset, self.unicode_string_size)?;
        let length = u16::from_le_bytes([raw[0], raw[1]]);
        let maximum_length = u16::from_le_bytes([raw[2], raw[3]]);
        let buffer = self.read_pointer(raw, self.unicode_string_buffer_offset)?;
        Ok(StringDescriptor::new(length, maximum_length, buffer))
    }
}

fn field_bytes(bytes: &[u8], offset: usize, size: usize) -> Result<&[u8], DescriptorFault> {
    bytes
        .get(offset..offset + size)
        .ok_or(DescriptorFault::Truncated {
            needed: offset + size,
            available: bytes.len(),
        })
}
