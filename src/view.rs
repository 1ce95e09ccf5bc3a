//! Filter and sort state for the section and symbol tables.
//!
//! Both views are pure functions of (records, flags): they borrow the shared
//! model and never reorder or renumber it. Rows keep the position each
//! record had in the file so numbering is stable under any combination of
//! filter and sort.

use std::{cmp::Ordering, str::FromStr};

use crate::{
    elf::STT_NOTYPE,
    model::{SectionHeader, Symbol},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionView {
    pub sort_by_address: bool,
    pub flagged_only: bool,
}

impl SectionView {
    pub fn toggle_sort_by_address(&mut self) {
        self.sort_by_address = !self.sort_by_address;
    }

    pub fn toggle_flagged_only(&mut self) {
        self.flagged_only = !self.flagged_only;
    }

    /// Filter first, then a stable ascending sort on `Addr`.
    pub fn apply<'a>(&self, sections: &'a [SectionHeader]) -> Vec<&'a SectionHeader> {
        let mut rows: Vec<_> = sections
            .iter()
            .filter(|s| !self.flagged_only || s.has_flags())
            .collect();

        if self.sort_by_address {
            rows.sort_by_key(|s| s.addr);
        }

        rows
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SymbolSortKey {
    #[default]
    Declaration,
    Name,
    Size,
}

impl FromStr for SymbolSortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "declaration" | "index" => Ok(SymbolSortKey::Declaration),
            "name" => Ok(SymbolSortKey::Name),
            "size" => Ok(SymbolSortKey::Size),
            _ => Err(format!("unknown symbol sort key: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SymbolRow<'a> {
    /// Position in the decoded symbol list, taken before filtering.
    pub index: usize,
    pub symbol: &'a Symbol,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SymbolView {
    pub hide_notype: bool,
    key: SymbolSortKey,
    direction: SortDirection,
}

impl SymbolView {
    pub fn key(&self) -> SymbolSortKey {
        self.key
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    pub fn toggle_hide_notype(&mut self) {
        self.hide_notype = !self.hide_notype;
    }

    /// Same key flips the direction; a different key starts ascending.
    pub fn select_sort(&mut self, key: SymbolSortKey) {
        if self.key == key {
            self.direction = self.direction.flip();
        } else {
            self.key = key;
            self.direction = SortDirection::Ascending;
        }
    }

    pub fn apply<'a>(&self, symbols: &'a [Symbol]) -> Vec<SymbolRow<'a>> {
        let mut rows: Vec<_> = symbols
            .iter()
            .enumerate()
            .map(|(index, symbol)| SymbolRow { index, symbol })
            .filter(|row| !self.hide_notype || row.symbol.sym_type() != STT_NOTYPE)
            .collect();

        let direction = self.direction;
        match self.key {
            SymbolSortKey::Declaration => {
                rows.sort_by(|a, b| direction.apply(a.index.cmp(&b.index)))
            }
            SymbolSortKey::Name => {
                rows.sort_by(|a, b| direction.apply(collate(&a.symbol.name, &b.symbol.name)))
            }
            SymbolSortKey::Size => {
                rows.sort_by(|a, b| direction.apply(a.symbol.size.cmp(&b.symbol.size)))
            }
        }

        rows
    }
}

// 句読点 < 記号 < 数字 < 文字 の順
fn char_class(c: char) -> u8 {
    if c.is_whitespace() {
        0
    } else if matches!(c, '$' | '+' | '<' | '=' | '>' | '^' | '`' | '|' | '~') {
        2
    } else if c.is_ascii_punctuation() {
        1
    } else if c.is_numeric() {
        3
    } else if c.is_alphabetic() {
        4
    } else {
        5
    }
}

fn lower(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Base letter of a Latin letter with diacritics, lowercased.
fn base_letter(c: char) -> char {
    match lower(c) {
        'à'..='æ' | '\u{100}'..='\u{105}' => 'a',
        'ç' | '\u{106}'..='\u{10d}' => 'c',
        'ð' | '\u{10e}'..='\u{111}' => 'd',
        'è'..='ë' | '\u{112}'..='\u{11b}' => 'e',
        '\u{11c}'..='\u{123}' => 'g',
        '\u{124}'..='\u{127}' => 'h',
        'ì'..='ï' | '\u{128}'..='\u{133}' => 'i',
        '\u{134}'..='\u{135}' => 'j',
        '\u{136}'..='\u{138}' => 'k',
        '\u{139}'..='\u{142}' => 'l',
        'ñ' | '\u{143}'..='\u{14b}' => 'n',
        'ò'..='ö' | 'ø' | '\u{14c}'..='\u{153}' => 'o',
        '\u{154}'..='\u{159}' => 'r',
        'ß' | '\u{15a}'..='\u{161}' | '\u{17f}' => 's',
        '\u{162}'..='\u{167}' => 't',
        'ù'..='ü' | '\u{168}'..='\u{173}' => 'u',
        '\u{174}'..='\u{175}' => 'w',
        'ý' | 'ÿ' | '\u{176}'..='\u{178}' => 'y',
        '\u{179}'..='\u{17e}' => 'z',
        other => other,
    }
}

fn primary_key(c: char) -> (u8, char) {
    (char_class(c), base_letter(c))
}

// アクセントなし < アクセント付き
fn accent_key(c: char) -> u32 {
    let lowered = lower(c);
    if base_letter(c) == lowered {
        0
    } else {
        lowered as u32
    }
}

/// Locale-style name ordering: base letters case-insensitively first, then
/// accents, then lowercase before uppercase, raw code points last.
pub fn collate(a: &str, b: &str) -> Ordering {
    let primary = a.chars().map(primary_key).cmp(b.chars().map(primary_key));
    if primary != Ordering::Equal {
        return primary;
    }

    let secondary = a.chars().map(accent_key).cmp(b.chars().map(accent_key));
    if secondary != Ordering::Equal {
        return secondary;
    }

    let tertiary = a
        .chars()
        .map(|c| c.is_uppercase())
        .cmp(b.chars().map(|c| c.is_uppercase()));
    if tertiary != Ordering::Equal {
        return tertiary;
    }

    a.cmp(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(index: usize, name: &str, addr: u64, flags: u64) -> SectionHeader {
        SectionHeader {
            original_index: index,
            name: name.to_string(),
            addr,
            flags,
            ..Default::default()
        }
    }

    fn symbol(name: &str, size: u64, info: u8) -> Symbol {
        Symbol {
            name: name.to_string(),
            size,
            info,
            ..Default::default()
        }
    }

    fn names<'a>(rows: &[SymbolRow<'a>]) -> Vec<&'a str> {
        rows.iter().map(|r| r.symbol.name.as_str()).collect()
    }

    #[test]
    fn default_section_view_is_identity() {
        let sections = vec![section(0, "", 0, 0), section(1, ".text", 0x1000, 6)];

        let rows = SectionView::default().apply(&sections);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].original_index, 1);
    }

    #[test]
    fn address_sort_is_stable_and_keeps_indices() {
        let sections = vec![
            section(0, "", 0, 0),
            section(1, ".b", 0x2000, 2),
            section(2, ".a", 0x1000, 2),
            section(3, ".c", 0x2000, 2),
            section(4, ".comment", 0, 0),
        ];
        let view = SectionView {
            sort_by_address: true,
            flagged_only: false,
        };

        let order: Vec<_> = view.apply(&sections).iter().map(|s| s.original_index).collect();
        assert_eq!(order, [0, 4, 2, 1, 3]);
        assert_eq!(sections[1].original_index, 1);
    }

    #[test]
    fn flag_filter_runs_before_sort() {
        let sections = vec![
            section(0, "", 0, 0),
            section(1, ".data", 0x2000, 3),
            section(2, ".text", 0x1000, 6),
            section(3, ".comment", 0, 0),
        ];
        let mut view = SectionView::default();
        view.toggle_flagged_only();
        view.toggle_sort_by_address();

        let order: Vec<_> = view.apply(&sections).iter().map(|s| s.original_index).collect();
        assert_eq!(order, [2, 1]);

        view.toggle_sort_by_address();
        let order: Vec<_> = view.apply(&sections).iter().map(|s| s.original_index).collect();
        assert_eq!(order, [1, 2]);
    }

    #[test]
    fn sort_toggle_semantics() {
        let mut view = SymbolView::default();
        assert_eq!(view.key(), SymbolSortKey::Declaration);
        assert_eq!(view.direction(), SortDirection::Ascending);

        view.select_sort(SymbolSortKey::Name);
        assert_eq!(view.direction(), SortDirection::Ascending);
        view.select_sort(SymbolSortKey::Name);
        assert_eq!(view.direction(), SortDirection::Descending);
        view.select_sort(SymbolSortKey::Size);
        assert_eq!(view.key(), SymbolSortKey::Size);
        assert_eq!(view.direction(), SortDirection::Ascending);
    }

    #[test]
    fn name_sort_reverses_without_touching_filter() {
        let symbols = vec![
            symbol("", 0, 0x00),
            symbol("main", 10, 0x12),
            symbol("Alpha", 4, 0x11),
            symbol("beta", 8, 0x12),
        ];
        let mut view = SymbolView::default();
        view.toggle_hide_notype();

        view.select_sort(SymbolSortKey::Name);
        assert_eq!(names(&view.apply(&symbols)), ["Alpha", "beta", "main"]);

        view.select_sort(SymbolSortKey::Name);
        assert_eq!(names(&view.apply(&symbols)), ["main", "beta", "Alpha"]);
        assert!(view.hide_notype);
    }

    #[test]
    fn declaration_order_survives_filtering() {
        let symbols = vec![
            symbol("a", 0, 0x00),
            symbol("b", 0, 0x12),
            symbol("c", 0, 0x00),
            symbol("d", 0, 0x11),
        ];
        let mut view = SymbolView::default();
        view.toggle_hide_notype();

        let rows = view.apply(&symbols);
        let indices: Vec<_> = rows.iter().map(|r| r.index).collect();
        assert_eq!(indices, [1, 3]);

        view.select_sort(SymbolSortKey::Declaration);
        let indices: Vec<_> = view.apply(&symbols).iter().map(|r| r.index).collect();
        assert_eq!(indices, [3, 1]);
    }

    #[test]
    fn size_sort_is_numeric() {
        let symbols = vec![
            symbol("x", 100, 0x11),
            symbol("y", 9, 0x11),
            symbol("z", 20, 0x11),
        ];
        let mut view = SymbolView::default();
        view.select_sort(SymbolSortKey::Size);

        assert_eq!(names(&view.apply(&symbols)), ["y", "z", "x"]);
    }

    #[test]
    fn sort_keys_from_str() {
        assert_eq!("name".parse(), Ok(SymbolSortKey::Name));
        assert_eq!("index".parse(), Ok(SymbolSortKey::Declaration));
        assert!("value".parse::<SymbolSortKey>().is_err());
    }

    #[test]
    fn collation_order() {
        assert_eq!(collate("abc", "ABD"), Ordering::Less);
        assert_eq!(collate("abc", "ABC"), Ordering::Less);
        assert_eq!(collate("_start", "main"), Ordering::Less);
        assert_eq!(collate("a1", "aa"), Ordering::Less);
        assert_eq!(collate("same", "same"), Ordering::Equal);
        assert_eq!(collate("", "a"), Ordering::Less);
    }

    #[test]
    fn accented_names_sort_next_to_their_base_letter() {
        let symbols: Vec<_> = ["f", "é", "e", "z"]
            .iter()
            .map(|name| symbol(name, 0, 0x12))
            .collect();
        let mut view = SymbolView::default();
        view.select_sort(SymbolSortKey::Name);

        assert_eq!(names(&view.apply(&symbols)), ["e", "é", "f", "z"]);

        assert_eq!(collate("é", "E"), Ordering::Greater);
        assert_eq!(collate("éa", "eb"), Ordering::Less);
        assert_eq!(collate("Ångström", "angstrom"), Ordering::Greater);
        assert_eq!(collate("Łódź", "lodz"), Ordering::Greater);
        assert_eq!(collate("Łódź", "lodzia"), Ordering::Less);
    }

    #[test]
    fn punctuation_sorts_before_symbols() {
        assert_eq!(collate("_a", "$a"), Ordering::Less);
        assert_eq!(collate(".a", "~a"), Ordering::Less);
        assert_eq!(collate("$a", "0a"), Ordering::Less);
        assert_eq!(collate(" a", "_a"), Ordering::Less);
    }
}
