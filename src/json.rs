//! JSON documents handed to the web front end.

use serde::Serialize;

use crate::{
    model::{ElfModel, SectionHeader, Symbol},
    view::{SectionView, SymbolView},
    xref,
};

pub fn model_json(model: &ElfModel) -> serde_json::Result<String> {
    serde_json::to_string(model)
}

pub fn section_rows_json(model: &ElfModel, view: &SectionView) -> serde_json::Result<String> {
    let rows: Vec<&SectionHeader> = view.apply(&model.sections);
    serde_json::to_string(&rows)
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SymbolRowJson<'a> {
    original_index: usize,
    #[serde(flatten)]
    symbol: &'a Symbol,
    section_name: String,
}

/// Symbol rows in view order, each with its decoded position and the name
/// of the section it belongs to.
pub fn symbol_rows_json(model: &ElfModel, view: &SymbolView) -> serde_json::Result<String> {
    let rows: Vec<_> = view
        .apply(&model.symbols)
        .into_iter()
        .map(|row| SymbolRowJson {
            original_index: row.index,
            symbol: row.symbol,
            section_name: xref::section_index_name(row.symbol.shndx, &model.sections),
        })
        .collect();

    serde_json::to_string(&rows)
}
