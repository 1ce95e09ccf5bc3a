//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

use crate::view::{SectionView, SymbolSortKey, SymbolView};

/// Display the structure of ELF files.
#[derive(Parser, Debug)]
#[command(name = "tiny-elf-viewer", version, about, disable_help_flag = true)]
pub struct Cli {
    /// ELF file to inspect.
    pub file: PathBuf,

    /// Show the ELF header (default when nothing else is selected).
    #[arg(long, short = 'h')]
    pub header: bool,

    /// Show section headers.
    #[arg(long, short = 'S')]
    pub sections: bool,

    /// Show program headers.
    #[arg(long, short = 'l')]
    pub segments: bool,

    /// Show the symbol table.
    #[arg(long, short = 's')]
    pub symbols: bool,

    /// Show the dynamic section.
    #[arg(long, short = 'd')]
    pub dynamic: bool,

    /// Show all information.
    #[arg(long, short = 'a')]
    pub all: bool,

    /// Dump a section in hex.
    #[arg(long = "hex", short = 'x', value_name = "SECTION")]
    pub hex: Option<String>,

    /// Order section headers by address.
    #[arg(long)]
    pub sort_by_address: bool,

    /// Only list sections with W, A or X set.
    #[arg(long)]
    pub flagged_only: bool,

    /// Hide symbols of type NOTYPE.
    #[arg(long)]
    pub hide_notype: bool,

    /// Symbol table order.
    #[arg(long, value_enum, default_value_t = SymbolSort::Declaration)]
    pub symbol_sort: SymbolSort,

    /// Reverse the symbol order.
    #[arg(long)]
    pub descending: bool,

    /// Browse the file interactively.
    #[arg(long, short = 'i')]
    pub interactive: bool,

    /// Suppress diagnostics.
    #[arg(long, short = 'q', conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print engine and timing diagnostics to stderr.
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Print help.
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SymbolSort {
    Declaration,
    Name,
    Size,
}

impl From<SymbolSort> for SymbolSortKey {
    fn from(value: SymbolSort) -> Self {
        match value {
            SymbolSort::Declaration => SymbolSortKey::Declaration,
            SymbolSort::Name => SymbolSortKey::Name,
            SymbolSort::Size => SymbolSortKey::Size,
        }
    }
}

/// What to print, after `--all` and the header default are folded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub header: bool,
    pub sections: bool,
    pub segments: bool,
    pub symbols: bool,
    pub dynamic: bool,
}

impl Cli {
    pub fn selection(&self) -> Selection {
        if self.all {
            return Selection {
                // -x のときはヘッダを出さない
                header: self.hex.is_none(),
                sections: true,
                segments: true,
                symbols: true,
                dynamic: true,
            };
        }

        let any = self.sections || self.segments || self.symbols || self.dynamic;

        Selection {
            header: (self.header || !any) && self.hex.is_none(),
            sections: self.sections,
            segments: self.segments,
            symbols: self.symbols,
            dynamic: self.dynamic,
        }
    }

    pub fn section_view(&self) -> SectionView {
        SectionView {
            sort_by_address: self.sort_by_address,
            flagged_only: self.flagged_only,
        }
    }

    /// Builds the symbol view through the same toggles the browser uses.
    pub fn symbol_view(&self) -> SymbolView {
        let mut view = SymbolView::default();
        if self.hide_notype {
            view.toggle_hide_notype();
        }

        let key = SymbolSortKey::from(self.symbol_sort);
        if key != view.key() {
            view.select_sort(key);
        }
        if self.descending {
            view.select_sort(key);
        }

        view
    }
}
