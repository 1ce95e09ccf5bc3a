//! In-memory structure of a decoded ELF file.
//!
//! Produced once per loaded file by a [`DecodeEngine`](crate::engine::DecodeEngine)
//! and shared read-only afterwards. The JSON shape matches what the web
//! front end reads.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::{bits, elf::SHT_NOBITS};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Ident {
    pub magic: [u8; 4],
    pub class: u8,
    pub data: u8,
    pub version: u8,
    #[serde(rename = "OSABI")]
    pub os_abi: u8,
    pub pad: [u8; 8],
}

/// Where the program and section tables live. Only the header display uses it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableLayout {
    pub version: u32,
    pub flags: u32,
    pub ehsize: u16,
    pub phoff: u64,
    pub phentsize: u16,
    pub phnum: u16,
    pub shoff: u64,
    pub shentsize: u16,
    pub shnum: u16,
    pub shstrndx: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub class: u8,
    #[serde(rename = "type")]
    pub e_type: u16,
    pub machine: u16,
    /// Always widened to 64 bits.
    pub entry: u64,
    #[serde(skip)]
    pub layout: TableLayout,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SectionHeader {
    /// Position in the file's section table. Fixed at decode time.
    pub original_index: usize,
    pub name: String,
    #[serde(rename = "Type")]
    pub sh_type: u32,
    pub flags: u64,
    pub addr: u64,
    pub offset: u64,
    pub size: u64,
    pub link: u32,
    pub info: u32,
    pub addr_align: u64,
    pub ent_size: u64,
}

impl SectionHeader {
    /// Byte range of the section in the file, `None` for `SHT_NOBITS`.
    pub fn file_range(&self) -> Option<Range<u64>> {
        if self.sh_type == SHT_NOBITS {
            return None;
        }

        Some(self.offset..self.offset.saturating_add(self.size))
    }

    pub fn flags_code(&self) -> String {
        bits::section_flags(self.flags)
    }

    pub fn has_flags(&self) -> bool {
        !self.flags_code().trim().is_empty()
    }

    /// Only named sections with content are offered for dumping.
    pub fn is_dumpable(&self) -> bool {
        !self.name.is_empty() && self.size > 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProgramHeader {
    #[serde(rename = "Type")]
    pub p_type: u32,
    pub flags: u32,
    pub offset: u64,
    #[serde(rename = "VAddr")]
    pub vaddr: u64,
    #[serde(rename = "PAddr")]
    pub paddr: u64,
    pub file_sz: u64,
    pub mem_sz: u64,
    pub align: u64,
}

impl ProgramHeader {
    pub fn contains_offset(&self, offset: u64) -> bool {
        offset >= self.offset && offset < self.offset.saturating_add(self.file_sz)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Symbol {
    pub name: String,
    pub value: u64,
    pub size: u64,
    pub info: u8,
    pub other: u8,
    pub shndx: u16,
}

impl Symbol {
    #[inline]
    pub fn sym_type(&self) -> u8 {
        bits::symbol_type(self.info)
    }

    #[inline]
    pub fn sym_bind(&self) -> u8 {
        bits::symbol_bind(self.info)
    }

    #[inline]
    pub fn visibility(&self) -> u8 {
        bits::symbol_visibility(self.other)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElfModel {
    pub ident: Ident,
    #[serde(flatten)]
    pub header: Header,
    #[serde(rename = "sectionHeaders")]
    pub sections: Vec<SectionHeader>,
    #[serde(rename = "programHeaders")]
    pub segments: Vec<ProgramHeader>,
    pub symbols: Vec<Symbol>,
}

impl ElfModel {
    /// First section carrying `name`.
    pub fn section_by_name(&self, name: &str) -> Option<&SectionHeader> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Slice of `bytes` backing `section`. Empty for `SHT_NOBITS`, `None`
    /// when the recorded range does not fit in the file.
    pub fn section_data<'a>(bytes: &'a [u8], section: &SectionHeader) -> Option<&'a [u8]> {
        if section.file_range().is_none() {
            return Some(&[]);
        }

        let end = section.offset.checked_add(section.size)?;
        let start = usize::try_from(section.offset).ok()?;
        let end = usize::try_from(end).ok()?;

        bytes.get(start..end)
    }

    /// Sections whose file offset falls inside the segment's file image.
    pub fn segment_sections<'a>(
        &'a self,
        segment: &'a ProgramHeader,
    ) -> impl Iterator<Item = &'a SectionHeader> + 'a {
        self.sections
            .iter()
            .filter(move |s| segment.contains_offset(s.offset))
    }

    pub fn dumpable_sections(&self) -> impl Iterator<Item = &SectionHeader> {
        self.sections.iter().filter(|s| s.is_dumpable())
    }
}
