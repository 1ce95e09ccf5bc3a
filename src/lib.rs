//! Structural view of ELF files: decoding into a shared model, name and
//! flag tables, symbol to section cross-references, filter/sort view state,
//! and section hex dumps behind a generation check.

pub mod bits;
pub mod display;
pub mod elf;
pub mod engine;
pub mod error;
pub mod hexdump;
pub mod json;
pub mod model;
pub mod names;
pub mod parser;
pub mod verbose;
pub mod view;
pub mod xref;

#[cfg(not(target_arch = "wasm32"))]
pub mod cli;
#[cfg(not(target_arch = "wasm32"))]
pub mod native;
#[cfg(not(target_arch = "wasm32"))]
pub mod session;
#[cfg(not(target_arch = "wasm32"))]
pub mod shell;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use engine::{DecodeEngine, ElfEngine};
pub use error::{DecodeError, DumpError, EngineInitError};
pub use model::{ElfModel, Header, Ident, ProgramHeader, SectionHeader, Symbol};
pub use parser::decode_structure;
