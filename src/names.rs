//! Numeric code to name tables for header, section and segment fields.
//!
//! Every function is total: codes outside the table render as
//! `Unknown (<value>)`, decimal for class/data/machine and hexadecimal for
//! the type codes.

use crate::elf::*;

pub fn class_name(class: u8) -> String {
    match class {
        ELFCLASS32 => "ELF32".to_string(),
        ELFCLASS64 => "ELF64".to_string(),
        _ => format!("Unknown ({class})"),
    }
}

pub fn data_encoding_name(data: u8) -> String {
    match data {
        ELFDATA2LSB => "2's complement, little endian".to_string(),
        ELFDATA2MSB => "2's complement, big endian".to_string(),
        _ => format!("Unknown ({data})"),
    }
}

pub fn object_type_name(e_type: u16) -> String {
    match e_type {
        ET_NONE => "NONE (No file type)".to_string(),
        ET_REL => "REL (Relocatable file)".to_string(),
        ET_EXEC => "EXEC (Executable file)".to_string(),
        ET_DYN => "DYN (Shared object file)".to_string(),
        ET_CORE => "CORE (Core file)".to_string(),
        _ => format!("Unknown ({e_type:#x})"),
    }
}

pub fn machine_name(machine: u16) -> String {
    match machine {
        EM_NONE => "None".to_string(),
        EM_386 => "Intel 80386".to_string(),
        EM_ARM => "ARM".to_string(),
        EM_X86_64 => "AMD x86-64".to_string(),
        EM_AARCH64 => "ARM AArch64".to_string(),
        _ => format!("Unknown ({machine})"),
    }
}

pub fn section_type_name(sh_type: u32) -> String {
    let name = match sh_type {
        SHT_NULL => "NULL",
        SHT_PROGBITS => "PROGBITS",
        SHT_SYMTAB => "SYMTAB",
        SHT_STRTAB => "STRTAB",
        SHT_RELA => "RELA",
        SHT_HASH => "HASH",
        SHT_DYNAMIC => "DYNAMIC",
        SHT_NOTE => "NOTE",
        SHT_NOBITS => "NOBITS",
        SHT_REL => "REL",
        SHT_SHLIB => "SHLIB",
        SHT_DYNSYM => "DYNSYM",
        _ => return format!("Unknown ({sh_type:#x})"),
    };

    name.to_string()
}

pub fn segment_type_name(p_type: u32) -> String {
    let name = match p_type {
        PT_NULL => "NULL",
        PT_LOAD => "LOAD",
        PT_DYNAMIC => "DYNAMIC",
        PT_INTERP => "INTERP",
        PT_NOTE => "NOTE",
        PT_SHLIB => "SHLIB",
        PT_PHDR => "PHDR",
        _ => return format!("Unknown ({p_type:#x})"),
    };

    name.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identification_names() {
        assert_eq!(class_name(1), "ELF32");
        assert_eq!(class_name(2), "ELF64");
        assert_eq!(class_name(7), "Unknown (7)");

        assert_eq!(data_encoding_name(1), "2's complement, little endian");
        assert_eq!(data_encoding_name(2), "2's complement, big endian");
        assert_eq!(data_encoding_name(0), "Unknown (0)");
    }

    #[test]
    fn object_types_fall_back_to_hex() {
        assert_eq!(object_type_name(2), "EXEC (Executable file)");
        assert_eq!(object_type_name(3), "DYN (Shared object file)");
        assert_eq!(object_type_name(0xfe00), "Unknown (0xfe00)");
    }

    #[test]
    fn machines_fall_back_to_decimal() {
        assert_eq!(machine_name(0), "None");
        assert_eq!(machine_name(3), "Intel 80386");
        assert_eq!(machine_name(40), "ARM");
        assert_eq!(machine_name(62), "AMD x86-64");
        assert_eq!(machine_name(183), "ARM AArch64");
        assert_eq!(machine_name(243), "Unknown (243)");
    }

    #[test]
    fn section_types_in_numeric_order() {
        let expected = [
            "NULL", "PROGBITS", "SYMTAB", "STRTAB", "RELA", "HASH", "DYNAMIC", "NOTE", "NOBITS",
            "REL", "SHLIB", "DYNSYM",
        ];

        for (code, name) in expected.iter().enumerate() {
            assert_eq!(section_type_name(code as u32), *name);
        }
        assert_eq!(section_type_name(12), "Unknown (0xc)");
        assert_eq!(section_type_name(0x6ffffff6), "Unknown (0x6ffffff6)");
    }

    #[test]
    fn segment_types_in_numeric_order() {
        let expected = ["NULL", "LOAD", "DYNAMIC", "INTERP", "NOTE", "SHLIB", "PHDR"];

        for (code, name) in expected.iter().enumerate() {
            assert_eq!(segment_type_name(code as u32), *name);
        }
        assert_eq!(segment_type_name(0x6474e551), "Unknown (0x6474e551)");
    }
}
