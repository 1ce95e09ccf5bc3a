//! readelf-style text output.
//!
//! Every renderer takes the decoded model plus the view state that applies
//! to it, so the command line and the interactive browser print the same
//! rows for the same flags.

use std::io::{self, Write};

use crate::{
    bits,
    model::ElfModel,
    names,
    view::{SectionView, SymbolView},
    xref,
};

pub fn write_header<W: Write>(w: &mut W, model: &ElfModel) -> io::Result<()> {
    let ident = &model.ident;
    let header = &model.header;
    let layout = &header.layout;

    writeln!(w, "ELF Header:")?;
    write!(w, "  Magic:   ")?;
    for b in ident.magic {
        write!(w, "{b:02x} ")?;
    }
    writeln!(w)?;

    writeln!(w, "  Class:                             {}", names::class_name(ident.class))?;
    writeln!(
        w,
        "  Data:                              {}",
        names::data_encoding_name(ident.data)
    )?;
    writeln!(w, "  Version:                           {} (current)", ident.version)?;
    writeln!(w, "  OS/ABI:                            {}", ident.os_abi)?;
    writeln!(
        w,
        "  Type:                              {}",
        names::object_type_name(header.e_type)
    )?;
    writeln!(
        w,
        "  Machine:                           {}",
        names::machine_name(header.machine)
    )?;
    writeln!(w, "  Entry point address:               {:#x}", header.entry)?;
    writeln!(w, "  Start of program headers:          {} (bytes into file)", layout.phoff)?;
    writeln!(w, "  Start of section headers:          {} (bytes into file)", layout.shoff)?;
    writeln!(w, "  Flags:                             {:#x}", layout.flags)?;
    writeln!(w, "  Size of this header:               {} (bytes)", layout.ehsize)?;
    writeln!(w, "  Size of program headers:           {} (bytes)", layout.phentsize)?;
    writeln!(w, "  Number of program headers:         {}", layout.phnum)?;
    writeln!(w, "  Size of section headers:           {} (bytes)", layout.shentsize)?;
    writeln!(w, "  Number of section headers:         {}", layout.shnum)?;
    writeln!(w, "  Section header string table index: {}", layout.shstrndx)?;

    Ok(())
}

pub fn write_sections<W: Write>(w: &mut W, model: &ElfModel, view: &SectionView) -> io::Result<()> {
    let rows = view.apply(&model.sections);

    writeln!(w, "Section Headers:")?;
    if rows.len() != model.sections.len() {
        writeln!(w, "  Showing {} of {}", rows.len(), model.sections.len())?;
    }
    writeln!(w, "  [Nr] Name              Type            Address          Offset")?;
    writeln!(w, "       Size              EntSize         Flags  Link  Info  Align")?;

    for sh in rows {
        writeln!(
            w,
            "  [{:2}] {:<16} {:<15} {:016x} {:08x}",
            sh.original_index,
            sh.name,
            names::section_type_name(sh.sh_type),
            sh.addr,
            sh.offset
        )?;
        writeln!(
            w,
            "       {:016x} {:016x} {:>3} {:5} {:5} {:5}",
            sh.size,
            sh.ent_size,
            sh.flags_code(),
            sh.link,
            sh.info,
            sh.addr_align
        )?;
    }

    writeln!(w)?;
    writeln!(w, "Key to Flags:")?;
    writeln!(w, "  W (write), A (alloc), X (execute), M (merge), S (strings), I (info),")?;
    writeln!(w, "  L (link order), O (extra OS processing required), G (group), T (TLS),")?;
    writeln!(w, "  C (compressed), x (unknown), o (OS specific), E (exclude),")?;
    writeln!(w, "  D (mbind), l (large), p (processor specific)")?;

    Ok(())
}

pub fn write_segments<W: Write>(w: &mut W, model: &ElfModel) -> io::Result<()> {
    writeln!(w)?;
    if model.segments.is_empty() {
        writeln!(w, "There are no program headers in this file.")?;
        return Ok(());
    }

    writeln!(w, "Program Headers:")?;
    writeln!(w, "  Type           Offset             VirtAddr           PhysAddr")?;
    writeln!(w, "                 FileSiz            MemSiz              Flags  Align")?;

    for ph in &model.segments {
        writeln!(
            w,
            "  {:<14} 0x{:016x} 0x{:016x} 0x{:016x}",
            names::segment_type_name(ph.p_type),
            ph.offset,
            ph.vaddr,
            ph.paddr
        )?;
        writeln!(
            w,
            "                 0x{:016x} 0x{:016x}  {} {:#x}",
            ph.file_sz,
            ph.mem_sz,
            bits::segment_flags(ph.flags),
            ph.align
        )?;
    }

    writeln!(w)?;
    writeln!(w, " Section to Segment mapping:")?;
    writeln!(w, "  Segment Sections...")?;

    for (i, ph) in model.segments.iter().enumerate() {
        write!(w, "   {i:02}     ")?;
        for sh in model.segment_sections(ph) {
            write!(w, "{} ", sh.name)?;
        }
        writeln!(w)?;
    }

    Ok(())
}

pub fn write_symbols<W: Write>(w: &mut W, model: &ElfModel, view: &SymbolView) -> io::Result<()> {
    writeln!(w)?;
    if model.symbols.is_empty() {
        writeln!(w, "No symbols found.")?;
        return Ok(());
    }

    let rows = view.apply(&model.symbols);
    if rows.len() == model.symbols.len() {
        writeln!(w, "Symbol table contains {} entries:", model.symbols.len())?;
    } else {
        writeln!(
            w,
            "Symbol table contains {} entries (showing {}):",
            model.symbols.len(),
            rows.len()
        )?;
    }

    let mut table = vec![
        ["   Num:", "Value", "Size", "Type", "Bind", "Vis", "Ndx", "Name"].map(String::from),
    ];
    for row in rows {
        let sym = row.symbol;
        table.push([
            format!("{:6}:", row.index),
            format!("{:016x}", sym.value),
            sym.size.to_string(),
            bits::symbol_type_name(sym.sym_type()),
            bits::symbol_bind_name(sym.sym_bind()),
            bits::symbol_visibility_name(sym.visibility()),
            xref::section_index_name(sym.shndx, &model.sections),
            sym.name.clone(),
        ]);
    }

    write_columns(w, &table)
}

pub fn write_dynamic<W: Write>(w: &mut W, model: &ElfModel) -> io::Result<()> {
    writeln!(w)?;
    match model.section_by_name(".dynamic") {
        Some(sh) => writeln!(w, "Dynamic section at offset {:#x} contains entries:", sh.offset),
        None => writeln!(w, "No dynamic section found."),
    }
}

// 各列を最大幅 + 2 で揃える。最後の列は詰めない
fn write_columns<W: Write, const N: usize>(w: &mut W, table: &[[String; N]]) -> io::Result<()> {
    let mut widths = [0usize; N];
    for row in table {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    for row in table {
        let mut line = String::new();
        for (i, cell) in row.iter().enumerate() {
            if i + 1 == N {
                line.push_str(cell);
            } else {
                line.push_str(&format!("{cell:<width$}", width = widths[i] + 2));
            }
        }
        writeln!(w, "{}", line.trim_end())?;
    }

    Ok(())
}
