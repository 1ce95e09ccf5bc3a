//! Built-in decoding of raw ELF bytes into an [`ElfModel`].
//!
//! Handles ELF32 and ELF64 in either byte order. Every read is bounds
//! checked; malformed input yields a [`DecodeError`] and never a partial
//! model.

use crate::{
    elf::*,
    error::DecodeError,
    model::{ElfModel, Header, Ident, ProgramHeader, SectionHeader, Symbol, TableLayout},
};

pub fn decode_structure(data: &[u8]) -> Result<ElfModel, DecodeError> {
    let ident = parse_ident(data)?;

    let endian = match ident.data {
        ELFDATA2LSB => Endian::Little,
        ELFDATA2MSB => Endian::Big,
        d => return Err(DecodeError::UnsupportedEncoding(d)),
    };
    let width = match ident.class {
        ELFCLASS32 => Width::Elf32,
        ELFCLASS64 => Width::Elf64,
        c => return Err(DecodeError::UnsupportedClass(c)),
    };

    let reader = ByteReader::new(data, endian, width);
    let header = parse_header(&reader, ident.class)?;

    let sections = parse_section_headers(&reader, &header.layout)?;
    let segments = parse_program_headers(&reader, &header.layout)?;
    let symbols = parse_symbols(&reader, &sections)?;

    Ok(ElfModel {
        ident,
        header,
        sections,
        segments,
        symbols,
    })
}

fn parse_ident(data: &[u8]) -> Result<Ident, DecodeError> {
    if data.len() < EI_NIDENT {
        return Err(DecodeError::Truncated);
    }

    let mut magic = [0; 4];
    magic.copy_from_slice(&data[..4]);
    if magic != ELF_MAGIC {
        return Err(DecodeError::BadMagic(magic));
    }

    let mut pad = [0; 8];
    pad.copy_from_slice(&data[EI_PAD..EI_NIDENT]);

    Ok(Ident {
        magic,
        class: data[EI_CLASS],
        data: data[EI_DATA],
        version: data[EI_VERSION],
        os_abi: data[EI_OSABI],
        pad,
    })
}

fn parse_header(r: &ByteReader, class: u8) -> Result<Header, DecodeError> {
    if r.len() < r.width().ehdr_size() {
        return Err(DecodeError::Truncated);
    }

    // e_entry 以降のオフセットはクラスで異なる
    let (entry, phoff, shoff, rest) = match r.width() {
        Width::Elf32 => (r.word(24)?, r.word(28)?, r.word(32)?, 36),
        Width::Elf64 => (r.word(24)?, r.word(32)?, r.word(40)?, 48),
    };

    let layout = TableLayout {
        version: r.u32(20)?,
        flags: r.u32(rest)?,
        ehsize: r.u16(rest + 4)?,
        phoff,
        phentsize: r.u16(rest + 6)?,
        phnum: r.u16(rest + 8)?,
        shoff,
        shentsize: r.u16(rest + 10)?,
        shnum: r.u16(rest + 12)?,
        shstrndx: r.u16(rest + 14)?,
    };

    Ok(Header {
        class,
        e_type: r.u16(16)?,
        machine: r.u16(18)?,
        entry,
        layout,
    })
}

/// File offset of entry `index` of a table, if it lies within the file.
fn entry_offset(
    r: &ByteReader,
    base: u64,
    entsize: u16,
    record: usize,
    index: usize,
) -> Option<usize> {
    let off = (index as u64)
        .checked_mul(u64::from(entsize))?
        .checked_add(base)?;
    let off = usize::try_from(off).ok()?;

    if off.checked_add(record)? > r.len() {
        return None;
    }

    Some(off)
}

fn parse_section_headers(
    r: &ByteReader,
    layout: &TableLayout,
) -> Result<Vec<SectionHeader>, DecodeError> {
    if layout.shoff == 0 || layout.shnum == 0 {
        return Ok(Vec::new());
    }

    let record = r.width().shdr_size();
    if (layout.shentsize as usize) < record {
        return Err(DecodeError::BadEntrySize {
            table: "section header",
            size: layout.shentsize,
        });
    }

    let mut sections = Vec::with_capacity(layout.shnum as usize);
    let mut name_offsets = Vec::with_capacity(layout.shnum as usize);

    for i in 0..layout.shnum as usize {
        let off = entry_offset(r, layout.shoff, layout.shentsize, record, i)
            .ok_or(DecodeError::SectionHeaderOutOfBounds(i))?;
        let b = r.at(off)?;

        let section = match r.width() {
            Width::Elf32 => SectionHeader {
                original_index: i,
                name: String::new(),
                sh_type: b.u32(4)?,
                flags: b.word(8)?,
                addr: b.word(12)?,
                offset: b.word(16)?,
                size: b.word(20)?,
                link: b.u32(24)?,
                info: b.u32(28)?,
                addr_align: b.word(32)?,
                ent_size: b.word(36)?,
            },
            Width::Elf64 => SectionHeader {
                original_index: i,
                name: String::new(),
                sh_type: b.u32(4)?,
                flags: b.word(8)?,
                addr: b.word(16)?,
                offset: b.word(24)?,
                size: b.word(32)?,
                link: b.u32(40)?,
                info: b.u32(44)?,
                addr_align: b.word(48)?,
                ent_size: b.word(56)?,
            },
        };

        name_offsets.push(b.u32(0)?);
        sections.push(section);
    }

    // 名前が解決できない場合は空のまま
    let strtab = sections
        .get(layout.shstrndx as usize)
        .and_then(|sh| ElfModel::section_data(r.data(), sh));
    if let Some(strtab) = strtab {
        for (section, name_off) in sections.iter_mut().zip(name_offsets) {
            section.name = get_string(strtab, name_off);
        }
    }

    Ok(sections)
}

fn parse_program_headers(
    r: &ByteReader,
    layout: &TableLayout,
) -> Result<Vec<ProgramHeader>, DecodeError> {
    if layout.phoff == 0 || layout.phnum == 0 {
        return Ok(Vec::new());
    }

    let record = r.width().phdr_size();
    if (layout.phentsize as usize) < record {
        return Err(DecodeError::BadEntrySize {
            table: "program header",
            size: layout.phentsize,
        });
    }

    let mut segments = Vec::with_capacity(layout.phnum as usize);

    for i in 0..layout.phnum as usize {
        let off = entry_offset(r, layout.phoff, layout.phentsize, record, i)
            .ok_or(DecodeError::ProgramHeaderOutOfBounds(i))?;
        let b = r.at(off)?;

        let segment = match r.width() {
            Width::Elf32 => ProgramHeader {
                p_type: b.u32(0)?,
                offset: b.word(4)?,
                vaddr: b.word(8)?,
                paddr: b.word(12)?,
                file_sz: b.word(16)?,
                mem_sz: b.word(20)?,
                flags: b.u32(24)?,
                align: b.word(28)?,
            },
            Width::Elf64 => ProgramHeader {
                p_type: b.u32(0)?,
                flags: b.u32(4)?,
                offset: b.word(8)?,
                vaddr: b.word(16)?,
                paddr: b.word(24)?,
                file_sz: b.word(32)?,
                mem_sz: b.word(40)?,
                align: b.word(48)?,
            },
        };

        segments.push(segment);
    }

    Ok(segments)
}

fn parse_symbols(r: &ByteReader, sections: &[SectionHeader]) -> Result<Vec<Symbol>, DecodeError> {
    let data = r.data();
    let mut symbols = Vec::new();
    let record = r.width().sym_size();

    for sh in sections
        .iter()
        .filter(|s| s.sh_type == SHT_SYMTAB || s.sh_type == SHT_DYNSYM)
    {
        let table = ElfModel::section_data(data, sh)
            .ok_or(DecodeError::SectionDataOutOfBounds(sh.original_index))?;

        let Some(strtab_sh) = sections.get(sh.link as usize) else {
            continue;
        };
        let strtab = ElfModel::section_data(data, strtab_sh)
            .ok_or(DecodeError::SectionDataOutOfBounds(strtab_sh.original_index))?;

        let entries = ByteReader::new(table, r.endian(), r.width());
        for i in 0..table.len() / record {
            let b = entries.at(i * record)?;

            let (name_off, symbol) = match r.width() {
                Width::Elf32 => (
                    b.u32(0)?,
                    Symbol {
                        name: String::new(),
                        value: b.word(4)?,
                        size: b.word(8)?,
                        info: b.u8(12)?,
                        other: b.u8(13)?,
                        shndx: b.u16(14)?,
                    },
                ),
                Width::Elf64 => (
                    b.u32(0)?,
                    Symbol {
                        name: String::new(),
                        info: b.u8(4)?,
                        other: b.u8(5)?,
                        shndx: b.u16(6)?,
                        value: b.u64(8)?,
                        size: b.u64(16)?,
                    },
                ),
            };

            symbols.push(Symbol {
                name: get_string(strtab, name_off),
                ..symbol
            });
        }
    }

    Ok(symbols)
}
