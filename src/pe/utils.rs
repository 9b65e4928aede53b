use log::debug;

use crate::pe::section_table::SectionTable;

fn rva2offset(rva: usize, section: &SectionTable) -> usize {
    (rva - section.virtual_address as usize) + section.pointer_to_raw_data as usize
}

fn is_in_section(rva: usize, size: usize, section: &SectionTable) -> bool {
    let virtual_address = section.virtual_address as usize;
    virtual_address <= rva && rva + size <= virtual_address + section.virtual_size as usize
}

/// Maps the span `[rva, rva + size)` to the file offset of its first byte,
/// via the first section whose virtual extent contains the whole span.
pub(crate) fn find_offset(rva: usize, size: usize, sections: &[SectionTable]) -> Option<usize> {
    for (i, section) in sections.iter().enumerate() {
        debug!(
            "checking {} for {:#x} ∈ {:#x}..{:#x}",
            section.name().unwrap_or(""),
            rva,
            section.virtual_address,
            u64::from(section.virtual_address) + u64::from(section.virtual_size)
        );
        if is_in_section(rva, size, section) {
            let offset = rva2offset(rva, section);
            debug!(
                "found in section {}({}), remapped into offset {:#x}",
                section.name().unwrap_or(""),
                i,
                offset
            );
            return Some(offset);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_section() -> SectionTable {
        SectionTable {
            virtual_size: 0x200,
            virtual_address: 0x1000,
            size_of_raw_data: 0x200,
            pointer_to_raw_data: 0x400,
            ..SectionTable::default()
        }
    }

    #[test]
    fn translates_span_inside_a_section() {
        let sections = [text_section()];
        assert_eq!(find_offset(0x1048, 0x48, &sections), Some(0x448));
    }

    #[test]
    fn span_ending_on_the_section_boundary_is_inside() {
        let sections = [text_section()];
        assert_eq!(find_offset(0x11b8, 0x48, &sections), Some(0x5b8));
    }

    #[test]
    fn span_leaking_past_the_section_is_not() {
        let sections = [text_section()];
        assert_eq!(find_offset(0x11b9, 0x48, &sections), None);
        assert_eq!(find_offset(0x800, 0x48, &sections), None);
    }
}
