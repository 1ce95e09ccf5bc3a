//! Section hex dumps and the selection state that requests them.
//!
//! A dump is computed from the original file bytes, not from the model.
//! Selecting a section starts a new generation; a finished dump is only
//! shown when it belongs to the current generation, so a slow reply for an
//! earlier selection can never replace the one the user is looking at.

use std::fmt::Write;

use crate::{
    error::DumpError,
    model::{ElfModel, SectionHeader},
    parser::decode_structure,
};

const BYTES_PER_LINE: usize = 16;

/// Decodes `bytes` and dumps the first section called `name`.
pub fn dump_section(bytes: &[u8], name: &str) -> Result<String, DumpError> {
    let model = decode_structure(bytes)?;
    let section = model
        .section_by_name(name)
        .ok_or_else(|| DumpError::NotFound(name.to_string()))?;

    dump_with(bytes, section)
}

/// Dumps an already located section out of `bytes`.
pub fn dump_with(bytes: &[u8], section: &SectionHeader) -> Result<String, DumpError> {
    if section.size == 0 {
        return Err(DumpError::Empty(section.name.clone()));
    }
    if section.file_range().is_none() {
        return Err(DumpError::NoFileData(section.name.clone()));
    }

    let data = ElfModel::section_data(bytes, section)
        .ok_or_else(|| DumpError::OutOfBounds(section.name.clone()))?;

    Ok(format_dump(&section.name, section.addr, data))
}

pub fn format_dump(name: &str, base: u64, data: &[u8]) -> String {
    let mut out = String::new();

    // String への write! は失敗しない
    let _ = writeln!(out, "\nHex dump of section '{name}':");

    for (line, chunk) in data.chunks(BYTES_PER_LINE).enumerate() {
        let addr = base.wrapping_add((line * BYTES_PER_LINE) as u64);
        let _ = write!(out, "  0x{addr:08x} ");

        for j in 0..BYTES_PER_LINE {
            match chunk.get(j) {
                Some(b) => {
                    let _ = write!(out, "{b:02x}");
                }
                None => out.push_str("  "),
            }
            if j % 4 == 3 {
                out.push(' ');
            }
        }

        out.push(' ');
        for &c in chunk {
            out.push(if (32..127).contains(&c) { c as char } else { '.' });
        }
        out.push('\n');
    }

    out
}

/// A dump the presentation layer has asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpRequest {
    pub generation: u64,
    pub section: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DumpStatus {
    /// Nothing selected, or no section can be dumped.
    #[default]
    Idle,
    Loading,
    Ready(String),
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct HexDumpState {
    choices: Vec<String>,
    selected: Option<String>,
    generation: u64,
    status: DumpStatus,
}

impl HexDumpState {
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn status(&self) -> &DumpStatus {
        &self.status
    }

    /// Starts over with `dumpable` as the choices and selects the first one.
    /// The generation keeps counting so replies for the previous file are
    /// dropped too.
    pub fn reset<'a>(
        &mut self,
        dumpable: impl IntoIterator<Item = &'a SectionHeader>,
    ) -> Option<DumpRequest> {
        self.choices = dumpable.into_iter().map(|s| s.name.clone()).collect();
        self.generation += 1;
        self.selected = None;
        self.status = DumpStatus::Idle;

        let first = self.choices.first()?.clone();
        Some(self.select(&first))
    }

    /// Clears everything, e.g. after a failed load.
    pub fn clear(&mut self) {
        self.choices.clear();
        self.generation += 1;
        self.selected = None;
        self.status = DumpStatus::Idle;
    }

    pub fn select(&mut self, section: &str) -> DumpRequest {
        self.generation += 1;
        self.selected = Some(section.to_string());
        self.status = DumpStatus::Loading;

        DumpRequest {
            generation: self.generation,
            section: section.to_string(),
        }
    }

    /// Moves the selection `step` entries through the choices, wrapping.
    pub fn cycle(&mut self, step: isize) -> Option<DumpRequest> {
        if self.choices.is_empty() {
            return None;
        }

        let len = self.choices.len() as isize;
        let current = self
            .selected
            .as_ref()
            .and_then(|s| self.choices.iter().position(|c| c == s))
            .unwrap_or(0) as isize;
        let next = (current + step).rem_euclid(len) as usize;

        let section = self.choices[next].clone();
        Some(self.select(&section))
    }

    /// Applies a finished dump. Returns `false` when it was superseded.
    pub fn complete(&mut self, generation: u64, result: Result<String, DumpError>) -> bool {
        match result {
            Ok(text) => self.settle(generation, DumpStatus::Ready(text)),
            Err(e) => self.fail(generation, e.to_string()),
        }
    }

    /// Shows `message` in place of the dump, e.g. when the request never
    /// reached the engine.
    pub fn fail(&mut self, generation: u64, message: String) -> bool {
        self.settle(generation, DumpStatus::Failed(message))
    }

    fn settle(&mut self, generation: u64, status: DumpStatus) -> bool {
        if generation != self.generation {
            return false;
        }

        self.status = status;
        true
    }
}
