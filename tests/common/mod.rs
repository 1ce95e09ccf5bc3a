#![allow(dead_code)]

use tiny_elf_viewer::elf::*;

pub struct Section {
    pub name: &'static str,
    pub sh_type: u32,
    pub flags: u64,
    pub addr: u64,
    pub data: Vec<u8>,
    /// Size recorded in the header when it differs from `data`, e.g. NOBITS.
    pub size: Option<u64>,
}

impl Section {
    pub fn progbits(name: &'static str, flags: u64, addr: u64, data: &[u8]) -> Self {
        Self {
            name,
            sh_type: SHT_PROGBITS,
            flags,
            addr,
            data: data.to_vec(),
            size: None,
        }
    }

    pub fn nobits(name: &'static str, flags: u64, addr: u64, size: u64) -> Self {
        Self {
            name,
            sh_type: SHT_NOBITS,
            flags,
            addr,
            data: Vec::new(),
            size: Some(size),
        }
    }
}

pub struct Sym {
    pub name: &'static str,
    pub value: u64,
    pub size: u64,
    pub info: u8,
    pub other: u8,
    pub shndx: u16,
}

impl Sym {
    pub fn new(name: &'static str, info: u8, shndx: u16) -> Self {
        Self {
            name,
            value: 0,
            size: 0,
            info,
            other: 0,
            shndx,
        }
    }

    pub fn sized(mut self, value: u64, size: u64) -> Self {
        self.value = value;
        self.size = size;
        self
    }
}

pub struct Segment {
    pub p_type: u32,
    pub flags: u32,
    /// Names of the sections the segment spans, in file order.
    pub sections: Vec<&'static str>,
}

/// Writes small but well-formed ELF images.
///
/// Layout: header, program headers, section contents, `.symtab`,
/// `.strtab`, `.shstrtab`, section headers. Index 0 is the null section and
/// symbol 0 the null symbol, as in real files.
pub struct ElfBuilder {
    pub elf64: bool,
    pub big_endian: bool,
    pub e_type: u16,
    pub machine: u16,
    pub entry: u64,
    pub sections: Vec<Section>,
    pub symbols: Vec<Sym>,
    pub segments: Vec<Segment>,
}

impl ElfBuilder {
    pub fn new(elf64: bool, big_endian: bool) -> Self {
        Self {
            elf64,
            big_endian,
            e_type: ET_EXEC,
            machine: EM_X86_64,
            entry: 0x401000,
            sections: Vec::new(),
            symbols: Vec::new(),
            segments: Vec::new(),
        }
    }

    pub fn section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    pub fn symbol(mut self, symbol: Sym) -> Self {
        self.symbols.push(symbol);
        self
    }

    pub fn segment(mut self, p_type: u32, flags: u32, sections: &[&'static str]) -> Self {
        self.segments.push(Segment {
            p_type,
            flags,
            sections: sections.to_vec(),
        });
        self
    }

    /// Section index the builder will give to `name`.
    pub fn index_of(&self, name: &str) -> u16 {
        let i = self
            .sections
            .iter()
            .position(|s| s.name == name)
            .expect("no such section");
        (i + 1) as u16
    }

    fn put16(&self, buf: &mut Vec<u8>, v: u16) {
        if self.big_endian {
            buf.extend_from_slice(&v.to_be_bytes());
        } else {
            buf.extend_from_slice(&v.to_le_bytes());
        }
    }

    fn put32(&self, buf: &mut Vec<u8>, v: u32) {
        if self.big_endian {
            buf.extend_from_slice(&v.to_be_bytes());
        } else {
            buf.extend_from_slice(&v.to_le_bytes());
        }
    }

    fn put64(&self, buf: &mut Vec<u8>, v: u64) {
        if self.big_endian {
            buf.extend_from_slice(&v.to_be_bytes());
        } else {
            buf.extend_from_slice(&v.to_le_bytes());
        }
    }

    fn word(&self, buf: &mut Vec<u8>, v: u64) {
        if self.elf64 {
            self.put64(buf, v);
        } else {
            self.put32(buf, v as u32);
        }
    }

    pub fn build(&self) -> Vec<u8> {
        let (ehsize, phentsize, shentsize, symsize) = if self.elf64 {
            (64usize, 56usize, 64usize, 24usize)
        } else {
            (52, 32, 40, 16)
        };

        struct Out {
            name: String,
            sh_type: u32,
            flags: u64,
            addr: u64,
            offset: u64,
            size: u64,
            link: u32,
            ent_size: u64,
        }

        let phoff = ehsize;
        let mut cursor = phoff + phentsize * self.segments.len();
        let mut body: Vec<(usize, Vec<u8>)> = Vec::new();
        let mut out = vec![Out {
            name: String::new(),
            sh_type: SHT_NULL,
            flags: 0,
            addr: 0,
            offset: 0,
            size: 0,
            link: 0,
            ent_size: 0,
        }];

        let align = |n: usize| (n + 7) & !7;

        for s in &self.sections {
            cursor = align(cursor);
            let size = s.size.unwrap_or(s.data.len() as u64);
            out.push(Out {
                name: s.name.to_string(),
                sh_type: s.sh_type,
                flags: s.flags,
                addr: s.addr,
                offset: cursor as u64,
                size,
                link: 0,
                ent_size: 0,
            });
            if s.sh_type != SHT_NOBITS {
                body.push((cursor, s.data.clone()));
                cursor += s.data.len();
            }
        }

        if !self.symbols.is_empty() {
            let mut strtab = vec![0u8];
            let mut symtab = vec![0u8; symsize];

            for sym in &self.symbols {
                let name = strtab.len() as u32;
                strtab.extend_from_slice(sym.name.as_bytes());
                strtab.push(0);

                if self.elf64 {
                    self.put32(&mut symtab, name);
                    symtab.push(sym.info);
                    symtab.push(sym.other);
                    self.put16(&mut symtab, sym.shndx);
                    self.put64(&mut symtab, sym.value);
                    self.put64(&mut symtab, sym.size);
                } else {
                    self.put32(&mut symtab, name);
                    self.put32(&mut symtab, sym.value as u32);
                    self.put32(&mut symtab, sym.size as u32);
                    symtab.push(sym.info);
                    symtab.push(sym.other);
                    self.put16(&mut symtab, sym.shndx);
                }
            }

            let symtab_index = out.len();
            cursor = align(cursor);
            out.push(Out {
                name: ".symtab".to_string(),
                sh_type: SHT_SYMTAB,
                flags: 0,
                addr: 0,
                offset: cursor as u64,
                size: symtab.len() as u64,
                link: (symtab_index + 1) as u32,
                ent_size: symsize as u64,
            });
            cursor += symtab.len();
            body.push((cursor - symtab.len(), symtab));

            cursor = align(cursor);
            out.push(Out {
                name: ".strtab".to_string(),
                sh_type: SHT_STRTAB,
                flags: 0,
                addr: 0,
                offset: cursor as u64,
                size: strtab.len() as u64,
                link: 0,
                ent_size: 0,
            });
            cursor += strtab.len();
            body.push((cursor - strtab.len(), strtab));
        }

        // .shstrtab
        let shstrndx = out.len();
        out.push(Out {
            name: ".shstrtab".to_string(),
            sh_type: SHT_STRTAB,
            flags: 0,
            addr: 0,
            offset: 0,
            size: 0,
            link: 0,
            ent_size: 0,
        });
        let mut shstrtab = vec![0u8];
        let mut name_offsets = Vec::new();
        for o in &out {
            if o.name.is_empty() {
                name_offsets.push(0u32);
            } else {
                name_offsets.push(shstrtab.len() as u32);
                shstrtab.extend_from_slice(o.name.as_bytes());
                shstrtab.push(0);
            }
        }
        cursor = align(cursor);
        out[shstrndx].offset = cursor as u64;
        out[shstrndx].size = shstrtab.len() as u64;
        cursor += shstrtab.len();
        body.push((cursor - shstrtab.len(), shstrtab));

        let shoff = align(cursor);
        let total = shoff + shentsize * out.len();

        // header
        let mut buf = Vec::with_capacity(total);
        buf.extend_from_slice(&ELF_MAGIC);
        buf.push(if self.elf64 { ELFCLASS64 } else { ELFCLASS32 });
        buf.push(if self.big_endian { ELFDATA2MSB } else { ELFDATA2LSB });
        buf.push(1);
        buf.extend_from_slice(&[0; 9]);
        self.put16(&mut buf, self.e_type);
        self.put16(&mut buf, self.machine);
        self.put32(&mut buf, 1);
        self.word(&mut buf, self.entry);
        self.word(&mut buf, if self.segments.is_empty() { 0 } else { phoff as u64 });
        self.word(&mut buf, shoff as u64);
        self.put32(&mut buf, 0);
        self.put16(&mut buf, ehsize as u16);
        self.put16(&mut buf, phentsize as u16);
        self.put16(&mut buf, self.segments.len() as u16);
        self.put16(&mut buf, shentsize as u16);
        self.put16(&mut buf, out.len() as u16);
        self.put16(&mut buf, shstrndx as u16);
        assert_eq!(buf.len(), ehsize);

        // program headers
        for seg in &self.segments {
            let covered: Vec<&Out> = seg
                .sections
                .iter()
                .map(|name| out.iter().find(|o| o.name == *name).expect("no such section"))
                .collect();
            let offset = covered.first().map_or(0, |o| o.offset);
            let vaddr = covered.first().map_or(0, |o| o.addr);
            let file_end = covered
                .iter()
                .filter(|o| o.sh_type != SHT_NOBITS)
                .map(|o| o.offset + o.size)
                .max()
                .unwrap_or(offset);
            let mem_end = covered
                .iter()
                .map(|o| o.addr + o.size)
                .max()
                .unwrap_or(vaddr);

            if self.elf64 {
                self.put32(&mut buf, seg.p_type);
                self.put32(&mut buf, seg.flags);
                self.put64(&mut buf, offset);
                self.put64(&mut buf, vaddr);
                self.put64(&mut buf, vaddr);
                self.put64(&mut buf, file_end - offset);
                self.put64(&mut buf, mem_end - vaddr);
                self.put64(&mut buf, 0x1000);
            } else {
                self.put32(&mut buf, seg.p_type);
                self.put32(&mut buf, offset as u32);
                self.put32(&mut buf, vaddr as u32);
                self.put32(&mut buf, vaddr as u32);
                self.put32(&mut buf, (file_end - offset) as u32);
                self.put32(&mut buf, (mem_end - vaddr) as u32);
                self.put32(&mut buf, seg.flags);
                self.put32(&mut buf, 0x1000);
            }
        }

        // contents
        buf.resize(shoff, 0);
        for (off, bytes) in body {
            buf[off..off + bytes.len()].copy_from_slice(&bytes);
        }

        // section headers
        for (o, name) in out.iter().zip(name_offsets) {
            self.put32(&mut buf, name);
            self.put32(&mut buf, o.sh_type);
            self.word(&mut buf, o.flags);
            self.word(&mut buf, o.addr);
            self.word(&mut buf, o.offset);
            self.word(&mut buf, o.size);
            self.put32(&mut buf, o.link);
            self.put32(&mut buf, 0);
            self.word(&mut buf, if o.sh_type == SHT_NULL { 0 } else { 1 });
            self.word(&mut buf, o.ent_size);
        }
        assert_eq!(buf.len(), total);

        buf
    }
}

pub const TEXT: &[u8] = b"\x55\x48\x89\xe5\x31\xc0\x5d\xc3Hello, ELF text!";
pub const DATA: &[u8] = b"0123456789abcdef";

/// The file most tests start from: `.text`, `.data`, `.bss`, `.comment`,
/// one LOAD segment over code and data, and a handful of symbols.
pub fn sample(elf64: bool, big_endian: bool) -> ElfBuilder {
    let b = ElfBuilder::new(elf64, big_endian)
        .section(Section::progbits(".text", SHF_ALLOC | SHF_EXECINSTR, 0x401000, TEXT))
        .section(Section::progbits(".data", SHF_ALLOC | SHF_WRITE, 0x402000, DATA))
        .section(Section::nobits(".bss", SHF_ALLOC | SHF_WRITE, 0x402010, 0x40))
        .section(Section::progbits(".comment", 0, 0, b"GCC: 13.2\0"))
        .segment(PT_LOAD, PF_R | PF_X, &[".text", ".data"]);

    let text = b.index_of(".text");
    let data = b.index_of(".data");
    let bss = b.index_of(".bss");

    b.symbol(Sym::new("crt.c", 0x04, SHN_ABS))
        .symbol(Sym::new("main", 0x12, text).sized(0x401000, 8))
        .symbol(Sym::new("counter", 0x11, data).sized(0x402000, 4))
        .symbol(Sym::new("buffer", 0x11, bss).sized(0x402010, 0x40))
        .symbol(Sym::new("_start", 0x12, text).sized(0x401004, 2))
        .symbol(Sym::new("puts", 0x10, SHN_UNDEF))
}
