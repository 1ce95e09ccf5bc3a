//! Packed field decoders for symbols, section flags and segment flags.

use crate::elf::*;

#[inline]
pub fn symbol_type(info: u8) -> u8 {
    info & 0xf
}

#[inline]
pub fn symbol_bind(info: u8) -> u8 {
    info >> 4
}

#[inline]
pub fn symbol_visibility(other: u8) -> u8 {
    other & 0x3
}

pub fn symbol_type_name(t: u8) -> String {
    let name = match t {
        STT_NOTYPE => "NOTYPE",
        STT_OBJECT => "OBJECT",
        STT_FUNC => "FUNC",
        STT_SECTION => "SECTION",
        STT_FILE => "FILE",
        STT_COMMON => "COMMON",
        STT_TLS => "TLS",
        _ => return format!("<{t}>"),
    };

    name.to_string()
}

pub fn symbol_bind_name(b: u8) -> String {
    let name = match b {
        STB_LOCAL => "LOCAL",
        STB_GLOBAL => "GLOBAL",
        STB_WEAK => "WEAK",
        _ => return format!("<{b}>"),
    };

    name.to_string()
}

pub fn symbol_visibility_name(v: u8) -> String {
    let name = match v {
        STV_DEFAULT => "DEFAULT",
        STV_INTERNAL => "INTERNAL",
        STV_HIDDEN => "HIDDEN",
        STV_PROTECTED => "PROTECTED",
        _ => return format!("<{v}>"),
    };

    name.to_string()
}

/// `W`, `A`, `X` in that order for the set bits; two spaces when none are set.
pub fn section_flags(flags: u64) -> String {
    let mut s = String::with_capacity(3);

    if flags & SHF_WRITE != 0 {
        s.push('W');
    }
    if flags & SHF_ALLOC != 0 {
        s.push('A');
    }
    if flags & SHF_EXECINSTR != 0 {
        s.push('X');
    }

    if s.is_empty() {
        s.push_str("  ");
    }

    s
}

/// `R`, `W`, `E` for the set bits, always padded to three columns.
pub fn segment_flags(flags: u32) -> String {
    let mut s = String::with_capacity(3);

    if flags & PF_R != 0 {
        s.push('R');
    }
    if flags & PF_W != 0 {
        s.push('W');
    }
    if flags & PF_X != 0 {
        s.push('E');
    }

    format!("{s:<3}")
}
