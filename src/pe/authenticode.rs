//! Authenticode image-digest range planning.
//!
//! Authenticode digests a PE image by hashing every on-disk byte except
//! three spans: the optional-header CheckSum field, the SECURITY
//! data-directory entry, and the attribute certificate table that entry
//! points at. Headers come first, then section bodies ordered by their
//! file offset, then whatever trails the last section.
//
// Reference:
//   https://learn.microsoft.com/en-us/windows-hardware/drivers/install/authenticode
//   https://download.microsoft.com/download/9/c/5/9c5b2167-8017-4bae-9fde-d599bac8184a/Authenticode_PE.docx

use crate::pe::data_directories::DataDirectory;
use crate::pe::section_table::SectionTable;
use crate::range::{self, HashRanges, StreamRange};

/// Assembles the digest plan for an image of `file_size` bytes.
///
/// Anomalies are absorbed, never rejected: a certificate directory outside
/// the file leaves the tail hashed, overlapping or overlong sections are
/// passed through verbatim. The resulting digest then simply matches no
/// signer, which is the observable a verifier wants for a tampered image.
pub fn hash_ranges(
    file_size: u64,
    size_of_headers: u64,
    checksum_range: StreamRange,
    security_entry_range: StreamRange,
    certificate_table: Option<DataDirectory>,
    sections: &[SectionTable],
) -> HashRanges {
    // header bytes minus the checksum field and the certificate-table
    // directory entry
    let mut excluded = [checksum_range, security_entry_range];
    excluded.sort_unstable_by_key(|range| range.position);
    let mut included = range::invert(size_of_headers, &excluded);

    // section bodies in file order; sections without raw data contribute
    // nothing. The sort is stable, so duplicate offsets keep table order.
    let mut by_offset: Vec<&SectionTable> = sections
        .iter()
        .filter(|section| section.pointer_to_raw_data != 0 && section.size_of_raw_data != 0)
        .collect();
    by_offset.sort_by_key(|section| section.pointer_to_raw_data);

    let mut sum_of_bytes_hashed = size_of_headers;
    for section in by_offset {
        let body = StreamRange::new(
            u64::from(section.pointer_to_raw_data),
            u64::from(section.size_of_raw_data),
        );
        sum_of_bytes_hashed = body.end();
        included.push(body);
    }

    // trailing data, minus the certificate table when the directory points
    // inside the file
    match certificate_table {
        Some(ct)
            if ct.virtual_address != 0
                && ct.size != 0
                && u64::from(ct.virtual_address) < file_size =>
        {
            let table_start = u64::from(ct.virtual_address);
            let table_end = table_start + u64::from(ct.size);
            if table_start > sum_of_bytes_hashed {
                included.push(StreamRange::new(
                    sum_of_bytes_hashed,
                    table_start - sum_of_bytes_hashed,
                ));
            }
            if table_end < file_size {
                included.push(StreamRange::new(table_end, file_size - table_end));
            }
        }
        _ => {
            if file_size > sum_of_bytes_hashed {
                included.push(StreamRange::new(
                    sum_of_bytes_hashed,
                    file_size - sum_of_bytes_hashed,
                ));
            }
        }
    }

    // already in stream order by construction; only coalesce
    range::merge_neighbors(&mut included);
    HashRanges {
        ranges: included,
        reserved: [0; 2],
    }
}
