use std::fmt;

use crate::{
    elf::{SHN_ABS, SHN_COMMON, SHN_UNDEF},
    model::SectionHeader,
};

/// What a symbol's `st_shndx` points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionRef<'a> {
    Undefined,
    Absolute,
    Common,
    Section(u16, &'a SectionHeader),
    /// Reserved values other than the three above, or past the table end.
    Raw(u16),
}

impl<'a> SectionRef<'a> {
    pub fn resolve(shndx: u16, sections: &'a [SectionHeader]) -> Self {
        match shndx {
            SHN_UNDEF => SectionRef::Undefined,
            SHN_ABS => SectionRef::Absolute,
            SHN_COMMON => SectionRef::Common,
            _ => match sections.get(shndx as usize) {
                Some(section) => SectionRef::Section(shndx, section),
                None => SectionRef::Raw(shndx),
            },
        }
    }
}

impl fmt::Display for SectionRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionRef::Undefined => write!(f, "UND"),
            SectionRef::Absolute => write!(f, "ABS"),
            SectionRef::Common => write!(f, "COMMON"),
            SectionRef::Section(shndx, section) if section.name.is_empty() => {
                write!(f, "{shndx}")
            }
            SectionRef::Section(_, section) => write!(f, "{}", section.name),
            SectionRef::Raw(shndx) => write!(f, "{shndx}"),
        }
    }
}

pub fn section_index_name(shndx: u16, sections: &[SectionHeader]) -> String {
    SectionRef::resolve(shndx, sections).to_string()
}
