use scroll::Pread;

use crate::error::{Error, Result};

/// A 40-byte `IMAGE_SECTION_HEADER` record.
#[repr(C)]
#[derive(Debug, PartialEq, Copy, Clone, Default)]
pub struct SectionTable {
    pub name: [u8; 8],
    pub virtual_size: u32,
    pub virtual_address: u32,
    pub size_of_raw_data: u32,
    pub pointer_to_raw_data: u32,
    pub pointer_to_relocations: u32,
    pub pointer_to_linenumbers: u32,
    pub number_of_relocations: u16,
    pub number_of_linenumbers: u16,
    pub characteristics: u32,
}

pub const SIZEOF_SECTION_TABLE: usize = 8 * 5;

impl SectionTable {
    pub fn parse(bytes: &[u8], offset: &mut usize) -> Result<Self> {
        let mut table = SectionTable::default();
        let mut name = [0u8; 8];
        for byte in name.iter_mut() {
            *byte = bytes
                .gread_with(offset, scroll::LE)
                .map_err(|_| Error::Truncated("section header"))?;
        }
        table.name = name;
        table.virtual_size = bytes.gread_with(offset, scroll::LE)?;
        table.virtual_address = bytes.gread_with(offset, scroll::LE)?;
        table.size_of_raw_data = bytes.gread_with(offset, scroll::LE)?;
        table.pointer_to_raw_data = bytes.gread_with(offset, scroll::LE)?;
        table.pointer_to_relocations = bytes.gread_with(offset, scroll::LE)?;
        table.pointer_to_linenumbers = bytes.gread_with(offset, scroll::LE)?;
        table.number_of_relocations = bytes.gread_with(offset, scroll::LE)?;
        table.number_of_linenumbers = bytes.gread_with(offset, scroll::LE)?;
        table.characteristics = bytes.gread_with(offset, scroll::LE)?;
        Ok(table)
    }

    /// The name up to its first NUL, when it is valid UTF-8. Long names
    /// live in the COFF string table, which images do not carry.
    pub fn name(&self) -> Option<&str> {
        let len = self
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.name.len());
        core::str::from_utf8(&self.name[..len]).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_name() {
        let mut bytes = [0u8; SIZEOF_SECTION_TABLE];
        bytes[..5].copy_from_slice(b".text");
        bytes[8..12].copy_from_slice(&0x200u32.to_le_bytes()); // virtual_size
        bytes[12..16].copy_from_slice(&0x1000u32.to_le_bytes()); // virtual_address
        bytes[16..20].copy_from_slice(&0x200u32.to_le_bytes()); // size_of_raw_data
        bytes[20..24].copy_from_slice(&0x400u32.to_le_bytes()); // pointer_to_raw_data
        let mut offset = 0;
        let section = SectionTable::parse(&bytes, &mut offset).unwrap();
        assert_eq!(offset, SIZEOF_SECTION_TABLE);
        assert_eq!(section.name(), Some(".text"));
        assert_eq!(section.virtual_address, 0x1000);
        assert_eq!(section.size_of_raw_data, 0x200);
        assert_eq!(section.pointer_to_raw_data, 0x400);
    }
}
