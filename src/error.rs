use std::fmt;

/// The decoding engine could not be brought up, or has stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineInitError {
    /// The worker thread could not be spawned.
    Spawn(String),
    /// The engine factory failed on the worker.
    Setup(String),
    /// The worker exited; requests can no longer be delivered.
    Stopped,
}

impl fmt::Display for EngineInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn(e) => write!(f, "failed to start decoding engine: {e}"),
            Self::Setup(e) => write!(f, "decoding engine failed to initialize: {e}"),
            Self::Stopped => write!(f, "decoding engine is not running"),
        }
    }
}

impl std::error::Error for EngineInitError {}

/// The supplied bytes are not an ELF object the engine can interpret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Shorter than the identification block or a declared structure.
    Truncated,
    BadMagic([u8; 4]),
    UnsupportedClass(u8),
    UnsupportedEncoding(u8),
    /// A table entry size smaller than the record it must hold.
    BadEntrySize { table: &'static str, size: u16 },
    SectionHeaderOutOfBounds(usize),
    ProgramHeaderOutOfBounds(usize),
    SectionDataOutOfBounds(usize),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated => write!(f, "file too small to be ELF"),
            Self::BadMagic(m) => write!(
                f,
                "invalid ELF magic: {:02x}{:02x}{:02x}{:02x}",
                m[0], m[1], m[2], m[3]
            ),
            Self::UnsupportedClass(c) => write!(f, "unknown ELF class: {c}"),
            Self::UnsupportedEncoding(d) => write!(f, "invalid data encoding: {d}"),
            Self::BadEntrySize { table, size } => {
                write!(f, "invalid {table} entry size: {size}")
            }
            Self::SectionHeaderOutOfBounds(i) => write!(f, "section header {i} out of bounds"),
            Self::ProgramHeaderOutOfBounds(i) => write!(f, "program header {i} out of bounds"),
            Self::SectionDataOutOfBounds(i) => write!(f, "section {i} data out of bounds"),
        }
    }
}

impl std::error::Error for DecodeError {}

/// A section could not be dumped. The loaded model stays valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DumpError {
    NotFound(String),
    Empty(String),
    /// `SHT_NOBITS` sections occupy no file bytes.
    NoFileData(String),
    OutOfBounds(String),
    Decode(DecodeError),
}

impl fmt::Display for DumpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(name) => write!(f, "section {name} not found"),
            Self::Empty(name) => write!(f, "section {name} is empty"),
            Self::NoFileData(name) => write!(f, "section {name} has no data in the file"),
            Self::OutOfBounds(name) => write!(f, "section {name} data out of bounds"),
            Self::Decode(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for DumpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DecodeError> for DumpError {
    fn from(value: DecodeError) -> Self {
        DumpError::Decode(value)
    }
}
