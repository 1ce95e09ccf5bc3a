use crate::error::DecodeError;

pub const EI_NIDENT: usize = 16;
pub const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];

pub const EI_CLASS: usize = 4;
pub const EI_DATA: usize = 5;
pub const EI_VERSION: usize = 6;
pub const EI_OSABI: usize = 7;
pub const EI_PAD: usize = 8;

pub const ELFCLASS32: u8 = 1;
pub const ELFCLASS64: u8 = 2;

pub const ELFDATA2LSB: u8 = 1;
pub const ELFDATA2MSB: u8 = 2;

pub const ET_NONE: u16 = 0;
pub const ET_REL: u16 = 1;
pub const ET_EXEC: u16 = 2;
pub const ET_DYN: u16 = 3;
pub const ET_CORE: u16 = 4;

pub const EM_NONE: u16 = 0;
pub const EM_386: u16 = 3;
pub const EM_ARM: u16 = 40;
pub const EM_X86_64: u16 = 62;
pub const EM_AARCH64: u16 = 183;

pub const SHT_NULL: u32 = 0;
pub const SHT_PROGBITS: u32 = 1;
pub const SHT_SYMTAB: u32 = 2;
pub const SHT_STRTAB: u32 = 3;
pub const SHT_RELA: u32 = 4;
pub const SHT_HASH: u32 = 5;
pub const SHT_DYNAMIC: u32 = 6;
pub const SHT_NOTE: u32 = 7;
pub const SHT_NOBITS: u32 = 8;
pub const SHT_REL: u32 = 9;
pub const SHT_SHLIB: u32 = 10;
pub const SHT_DYNSYM: u32 = 11;

pub const SHF_WRITE: u64 = 0x1;
pub const SHF_ALLOC: u64 = 0x2;
pub const SHF_EXECINSTR: u64 = 0x4;

pub const PT_NULL: u32 = 0;
pub const PT_LOAD: u32 = 1;
pub const PT_DYNAMIC: u32 = 2;
pub const PT_INTERP: u32 = 3;
pub const PT_NOTE: u32 = 4;
pub const PT_SHLIB: u32 = 5;
pub const PT_PHDR: u32 = 6;

pub const PF_X: u32 = 0x1;
pub const PF_W: u32 = 0x2;
pub const PF_R: u32 = 0x4;

pub const SHN_UNDEF: u16 = 0;
pub const SHN_ABS: u16 = 0xfff1;
pub const SHN_COMMON: u16 = 0xfff2;

pub const STT_NOTYPE: u8 = 0;
pub const STT_OBJECT: u8 = 1;
pub const STT_FUNC: u8 = 2;
pub const STT_SECTION: u8 = 3;
pub const STT_FILE: u8 = 4;
pub const STT_COMMON: u8 = 5;
pub const STT_TLS: u8 = 6;

pub const STB_LOCAL: u8 = 0;
pub const STB_GLOBAL: u8 = 1;
pub const STB_WEAK: u8 = 2;

pub const STV_DEFAULT: u8 = 0;
pub const STV_INTERNAL: u8 = 1;
pub const STV_HIDDEN: u8 = 2;
pub const STV_PROTECTED: u8 = 3;

// ファイル上のレコードサイズ
pub const ELF32_EHDR_SIZE: usize = 52;
pub const ELF64_EHDR_SIZE: usize = 64;
pub const ELF32_SHDR_SIZE: usize = 40;
pub const ELF64_SHDR_SIZE: usize = 64;
pub const ELF32_PHDR_SIZE: usize = 32;
pub const ELF64_PHDR_SIZE: usize = 56;
pub const ELF32_SYM_SIZE: usize = 16;
pub const ELF64_SYM_SIZE: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    Elf32,
    Elf64,
}

impl Width {
    pub fn ehdr_size(&self) -> usize {
        match self {
            Width::Elf32 => ELF32_EHDR_SIZE,
            Width::Elf64 => ELF64_EHDR_SIZE,
        }
    }

    pub fn shdr_size(&self) -> usize {
        match self {
            Width::Elf32 => ELF32_SHDR_SIZE,
            Width::Elf64 => ELF64_SHDR_SIZE,
        }
    }

    pub fn phdr_size(&self) -> usize {
        match self {
            Width::Elf32 => ELF32_PHDR_SIZE,
            Width::Elf64 => ELF64_PHDR_SIZE,
        }
    }

    pub fn sym_size(&self) -> usize {
        match self {
            Width::Elf32 => ELF32_SYM_SIZE,
            Width::Elf64 => ELF64_SYM_SIZE,
        }
    }
}

/// Bounds-checked field reader over a byte slice in the file's byte order.
#[derive(Debug, Clone, Copy)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    endian: Endian,
    width: Width,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8], endian: Endian, width: Width) -> Self {
        Self {
            data,
            endian,
            width,
        }
    }

    pub fn width(&self) -> Width {
        self.width
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn array<const N: usize>(&self, off: usize) -> Result<[u8; N], DecodeError> {
        let end = off.checked_add(N).ok_or(DecodeError::Truncated)?;
        let chunk = self.data.get(off..end).ok_or(DecodeError::Truncated)?;

        let mut buf = [0; N];
        buf.copy_from_slice(chunk);

        Ok(buf)
    }

    pub fn u8(&self, off: usize) -> Result<u8, DecodeError> {
        self.data.get(off).copied().ok_or(DecodeError::Truncated)
    }

    pub fn u16(&self, off: usize) -> Result<u16, DecodeError> {
        let buf = self.array::<2>(off)?;

        Ok(match self.endian {
            Endian::Little => u16::from_le_bytes(buf),
            Endian::Big => u16::from_be_bytes(buf),
        })
    }

    pub fn u32(&self, off: usize) -> Result<u32, DecodeError> {
        let buf = self.array::<4>(off)?;

        Ok(match self.endian {
            Endian::Little => u32::from_le_bytes(buf),
            Endian::Big => u32::from_be_bytes(buf),
        })
    }

    pub fn u64(&self, off: usize) -> Result<u64, DecodeError> {
        let buf = self.array::<8>(off)?;

        Ok(match self.endian {
            Endian::Little => u64::from_le_bytes(buf),
            Endian::Big => u64::from_be_bytes(buf),
        })
    }

    /// Reads an address/offset sized field: 4 bytes for ELF32, 8 for ELF64.
    pub fn word(&self, off: usize) -> Result<u64, DecodeError> {
        match self.width {
            Width::Elf32 => self.u32(off).map(u64::from),
            Width::Elf64 => self.u64(off),
        }
    }

    /// Returns a reader over `data[off..]`.
    pub fn at(&self, off: usize) -> Result<Self, DecodeError> {
        let data = self.data.get(off..).ok_or(DecodeError::Truncated)?;

        Ok(Self {
            data,
            endian: self.endian,
            width: self.width,
        })
    }
}

/// NUL-terminated string lookup inside a string table section.
pub fn get_string(table: &[u8], offset: u32) -> String {
    let start = offset as usize;
    let Some(rest) = table.get(start..) else {
        return String::new();
    };

    let end = rest.iter().position(|&b| b == 0).unwrap_or(rest.len());

    String::from_utf8_lossy(&rest[..end]).into_owned()
}
