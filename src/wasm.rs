use wasm_bindgen::{JsValue, prelude::wasm_bindgen};

use crate::{
    engine::{DecodeEngine, ElfEngine},
    hexdump::{DumpRequest, DumpStatus, HexDumpState},
    json,
    model::ElfModel,
    verbose::vprintln,
    view::{SectionView, SymbolSortKey, SymbolView},
};

fn js_error(e: impl ToString) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Decodes `data` and returns the model as JSON.
#[wasm_bindgen(js_name = parseELF)]
pub fn parse_elf(data: &[u8]) -> Result<String, JsValue> {
    let model = ElfEngine.decode_structure(data).map_err(js_error)?;
    json::model_json(&model).map_err(js_error)
}

#[wasm_bindgen(js_name = getHexDump)]
pub fn get_hex_dump(data: &[u8], section: &str) -> Result<String, JsValue> {
    ElfEngine.dump_section(data, section).map_err(js_error)
}

/// One loaded file together with its view state.
///
/// The browser has no worker thread here, so dumps are produced in place;
/// they still go through the generation check of [`HexDumpState`].
#[wasm_bindgen]
pub struct WasmViewer {
    bytes: Vec<u8>,
    model: ElfModel,
    sections: SectionView,
    symbols: SymbolView,
    hexdump: HexDumpState,
}

#[wasm_bindgen]
impl WasmViewer {
    #[wasm_bindgen(constructor)]
    pub fn new(data: &[u8]) -> Result<WasmViewer, JsValue> {
        let model = ElfEngine.decode_structure(data).map_err(js_error)?;
        vprintln!(
            "loaded {} sections, {} symbols",
            model.sections.len(),
            model.symbols.len()
        );

        let mut viewer = WasmViewer {
            bytes: data.to_vec(),
            model,
            sections: SectionView::default(),
            symbols: SymbolView::default(),
            hexdump: HexDumpState::default(),
        };
        if let Some(request) = viewer.hexdump.reset(viewer.model.dumpable_sections()) {
            viewer.run_dump(request);
        }

        Ok(viewer)
    }

    #[wasm_bindgen(js_name = modelJson)]
    pub fn model_json(&self) -> Result<String, JsValue> {
        json::model_json(&self.model).map_err(js_error)
    }

    #[wasm_bindgen(js_name = sectionRows)]
    pub fn section_rows(&self) -> Result<String, JsValue> {
        json::section_rows_json(&self.model, &self.sections).map_err(js_error)
    }

    #[wasm_bindgen(js_name = symbolRows)]
    pub fn symbol_rows(&self) -> Result<String, JsValue> {
        json::symbol_rows_json(&self.model, &self.symbols).map_err(js_error)
    }

    #[wasm_bindgen(js_name = toggleSortByAddress)]
    pub fn toggle_sort_by_address(&mut self) -> bool {
        self.sections.toggle_sort_by_address();
        self.sections.sort_by_address
    }

    #[wasm_bindgen(js_name = toggleFlaggedOnly)]
    pub fn toggle_flagged_only(&mut self) -> bool {
        self.sections.toggle_flagged_only();
        self.sections.flagged_only
    }

    #[wasm_bindgen(js_name = toggleHideNotype)]
    pub fn toggle_hide_notype(&mut self) -> bool {
        self.symbols.toggle_hide_notype();
        self.symbols.hide_notype
    }

    /// `"declaration"`, `"name"` or `"size"`. Selecting the active key
    /// reverses the order.
    #[wasm_bindgen(js_name = sortSymbols)]
    pub fn sort_symbols(&mut self, key: &str) -> Result<(), JsValue> {
        let key: SymbolSortKey = key.parse().map_err(js_error)?;
        self.symbols.select_sort(key);
        Ok(())
    }

    #[wasm_bindgen(js_name = dumpChoices)]
    pub fn dump_choices(&self) -> Vec<String> {
        self.hexdump.choices().to_vec()
    }

    #[wasm_bindgen(js_name = selectedDump)]
    pub fn selected_dump(&self) -> Option<String> {
        self.hexdump.selected().map(str::to_string)
    }

    #[wasm_bindgen(js_name = selectDump)]
    pub fn select_dump(&mut self, section: &str) {
        let request = self.hexdump.select(section);
        self.run_dump(request);
    }

    #[wasm_bindgen(js_name = cycleDump)]
    pub fn cycle_dump(&mut self, step: isize) {
        if let Some(request) = self.hexdump.cycle(step) {
            self.run_dump(request);
        }
    }

    /// The current dump text. Errors are returned as a rejected value.
    #[wasm_bindgen(js_name = hexDump)]
    pub fn hex_dump(&self) -> Result<Option<String>, JsValue> {
        match self.hexdump.status() {
            DumpStatus::Ready(text) => Ok(Some(text.clone())),
            DumpStatus::Failed(e) => Err(js_error(e)),
            DumpStatus::Idle | DumpStatus::Loading => Ok(None),
        }
    }
}

impl WasmViewer {
    fn run_dump(&mut self, request: DumpRequest) {
        let result = ElfEngine.dump_section(&self.bytes, &request.section);
        self.hexdump.complete(request.generation, result);
    }
}
