use scroll::Pread;

use crate::error::{Error, Result};

#[repr(C)]
#[derive(Debug, PartialEq, Copy, Clone, Default, Pread)]
pub struct DataDirectory {
    pub virtual_address: u32,
    pub size: u32,
}

pub const SIZEOF_DATA_DIRECTORY: usize = 8;
pub const NUM_DATA_DIRECTORIES: usize = 16;

/// Certificate table slot. Uniquely among the directories, its
/// `virtual_address` is a plain file offset, not an RVA.
pub const IMAGE_DIRECTORY_ENTRY_SECURITY: usize = 4;
/// CLR runtime header slot; a resolvable entry marks a managed image.
pub const IMAGE_DIRECTORY_ENTRY_COM_DESCRIPTOR: usize = 14;

/// The 16 well-known directory slots. A slot is `None` when the image
/// declares fewer entries than its index or stores an all-zero entry.
#[derive(Debug, PartialEq, Copy, Clone, Default)]
pub struct DataDirectories {
    pub data_directories: [Option<DataDirectory>; NUM_DATA_DIRECTORIES],
}

impl DataDirectories {
    /// Reads `min(count, 16)` entries from the stream. A count past 16
    /// claims entries the fixed table has no slots for; a count below 16
    /// leaves the remaining well-known slots implicitly absent. Either way
    /// the stream is never read past what the image actually declares.
    pub fn parse(bytes: &[u8], count: usize, offset: &mut usize) -> Result<Self> {
        let mut data_directories = [None; NUM_DATA_DIRECTORIES];
        let count = count.min(NUM_DATA_DIRECTORIES);
        for dir in data_directories.iter_mut().take(count) {
            let dd: DataDirectory = bytes
                .gread_with(offset, scroll::LE)
                .map_err(|_| Error::Truncated("data directories"))?;
            if dd.virtual_address != 0 || dd.size != 0 {
                *dir = Some(dd);
            }
        }
        Ok(DataDirectories { data_directories })
    }

    pub fn get_certificate_table(&self) -> &Option<DataDirectory> {
        &self.data_directories[IMAGE_DIRECTORY_ENTRY_SECURITY]
    }

    pub fn get_clr_runtime_header(&self) -> &Option<DataDirectory> {
        &self.data_directories[IMAGE_DIRECTORY_ENTRY_COM_DESCRIPTOR]
    }
}
