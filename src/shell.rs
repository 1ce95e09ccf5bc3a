//! Interactive terminal browser.
//!
//! Keys are read on their own thread and forwarded over a channel; the main
//! loop waits on that channel with a short timeout so engine replies are
//! picked up even while no key is pressed.

use std::{
    io::{Write, stdin, stdout},
    sync::{
        Arc,
        mpsc::{self, RecvTimeoutError},
    },
    thread,
    time::Duration,
};

use anyhow::{Context, Result};
use termion::{
    clear, cursor,
    event::Key,
    input::TermRead,
    raw::IntoRawMode,
    screen::{IntoAlternateScreen, ToMainScreen},
};

use crate::{
    cli::Cli,
    display,
    hexdump::DumpStatus,
    session::Session,
    verbose::vprintln,
    view::{SortDirection, SymbolSortKey},
};

const TICK: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Header,
    Sections,
    Segments,
    Symbols,
    HexDump,
}

impl Tab {
    const ALL: [Tab; 5] = [
        Tab::Header,
        Tab::Sections,
        Tab::Segments,
        Tab::Symbols,
        Tab::HexDump,
    ];

    fn title(self) -> &'static str {
        match self {
            Tab::Header => "Header",
            Tab::Sections => "Sections",
            Tab::Segments => "Segments",
            Tab::Symbols => "Symbols",
            Tab::HexDump => "Hex Dump",
        }
    }

    fn next(self) -> Self {
        let i = Tab::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Tab::ALL[(i + 1) % Tab::ALL.len()]
    }
}

pub struct Browser {
    session: Session,
    bytes: Arc<[u8]>,
    title: String,
    tab: Tab,
    scroll: usize,
}

impl Browser {
    pub fn new(session: Session, bytes: Arc<[u8]>, title: String) -> Self {
        Self {
            session,
            bytes,
            title,
            tab: Tab::Header,
            scroll: 0,
        }
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn reload(&mut self) -> Result<()> {
        self.scroll = 0;
        self.session.load(self.bytes.clone())?;
        Ok(())
    }

    fn switch(&mut self, tab: Tab) {
        if self.tab != tab {
            self.tab = tab;
            self.scroll = 0;
        }
    }

    /// Applies one key. Returns `false` when the browser should close.
    pub fn handle_key(&mut self, key: Key) -> Result<bool> {
        match key {
            Key::Char('q') | Key::Ctrl('c') | Key::Ctrl('d') => return Ok(false),

            Key::Char('1') => self.switch(Tab::Header),
            Key::Char('2') => self.switch(Tab::Sections),
            Key::Char('3') => self.switch(Tab::Segments),
            Key::Char('4') => self.switch(Tab::Symbols),
            Key::Char('5') => self.switch(Tab::HexDump),
            Key::Char('\t') => self.switch(self.tab.next()),

            Key::Down | Key::Char('j') => self.scroll += 1,
            Key::Up | Key::Char('k') => self.scroll = self.scroll.saturating_sub(1),
            Key::PageDown | Key::Char(' ') => self.scroll += 20,
            Key::PageUp => self.scroll = self.scroll.saturating_sub(20),
            Key::Home | Key::Char('g') => self.scroll = 0,

            Key::Char('r') => self.reload()?,

            Key::Char('a') if self.tab == Tab::Sections => {
                self.session.sections.toggle_sort_by_address()
            }
            Key::Char('f') if self.tab == Tab::Sections => {
                self.session.sections.toggle_flagged_only()
            }

            Key::Char('t') if self.tab == Tab::Symbols => self.session.symbols.toggle_hide_notype(),
            Key::Char('o') if self.tab == Tab::Symbols => {
                self.session.symbols.select_sort(SymbolSortKey::Declaration)
            }
            Key::Char('n') if self.tab == Tab::Symbols => {
                self.session.symbols.select_sort(SymbolSortKey::Name)
            }
            Key::Char('z') if self.tab == Tab::Symbols => {
                self.session.symbols.select_sort(SymbolSortKey::Size)
            }

            Key::Char(']') | Key::Right if self.tab == Tab::HexDump => {
                self.scroll = 0;
                self.session.cycle_dump(1)?;
            }
            Key::Char('[') | Key::Left if self.tab == Tab::HexDump => {
                self.scroll = 0;
                self.session.cycle_dump(-1)?;
            }

            _ => {}
        }

        Ok(true)
    }

    /// Body lines of the current tab.
    pub fn render_body(&self) -> Result<Vec<String>> {
        let Some(model) = self.session.model() else {
            let line = if self.session.is_loading() {
                "Loading...".to_string()
            } else {
                "No file loaded.".to_string()
            };
            return Ok(vec![line]);
        };

        let mut out = Vec::new();
        match self.tab {
            Tab::Header => display::write_header(&mut out, model)?,
            Tab::Sections => {
                writeln!(
                    out,
                    "[a] sort by address: {}  [f] flagged only: {}",
                    on_off(self.session.sections.sort_by_address),
                    on_off(self.session.sections.flagged_only)
                )?;
                display::write_sections(&mut out, model, &self.session.sections)?
            }
            Tab::Segments => display::write_segments(&mut out, model)?,
            Tab::Symbols => {
                let symbols = &self.session.symbols;
                let direction = match symbols.direction() {
                    SortDirection::Ascending => "asc",
                    SortDirection::Descending => "desc",
                };
                writeln!(
                    out,
                    "[t] hide NOTYPE: {}  [o/n/z] sort: {:?} {direction}",
                    on_off(symbols.hide_notype),
                    symbols.key()
                )?;
                display::write_symbols(&mut out, model, symbols)?
            }
            Tab::HexDump => {
                let hexdump = self.session.hexdump();
                writeln!(
                    out,
                    "[ / ] section: {}  ({} dumpable)",
                    hexdump.selected().unwrap_or("-"),
                    hexdump.choices().len()
                )?;
                match hexdump.status() {
                    DumpStatus::Idle => writeln!(out, "No dumpable sections.")?,
                    DumpStatus::Loading => writeln!(out, "Loading...")?,
                    DumpStatus::Ready(text) => write!(out, "{text}")?,
                    DumpStatus::Failed(e) => writeln!(out, "Error: {e}")?,
                }
            }
        }

        Ok(String::from_utf8_lossy(&out).lines().map(str::to_string).collect())
    }

    fn status_line(&self) -> String {
        let mut line = format!(" {} |", self.title);
        for (i, tab) in Tab::ALL.iter().enumerate() {
            if *tab == self.tab {
                line.push_str(&format!(" [{}:{}]", i + 1, tab.title()));
            } else {
                line.push_str(&format!("  {}:{} ", i + 1, tab.title()));
            }
        }
        if self.session.is_loading() {
            line.push_str("  loading");
        }
        if let Some(e) = self.session.error() {
            line.push_str(&format!("  error: {e}"));
        }
        line
    }

    fn draw<W: Write>(&mut self, w: &mut W) -> Result<()> {
        let (width, height) = termion::terminal_size().unwrap_or((80, 24));
        let rows = (height as usize).saturating_sub(2);

        let body = self.render_body()?;
        self.scroll = self.scroll.min(body.len().saturating_sub(1));

        write!(w, "{}{}", clear::All, cursor::Goto(1, 1))?;
        write!(w, "{}\r\n", clip(&self.status_line(), width))?;
        for line in body.iter().skip(self.scroll).take(rows) {
            write!(w, "{}\r\n", clip(line, width))?;
        }
        write!(
            w,
            "{}q quit  tab/1-5 switch  j/k scroll  r reload",
            cursor::Goto(1, height)
        )?;
        w.flush()?;

        Ok(())
    }
}

fn on_off(b: bool) -> &'static str {
    if b { "on" } else { "off" }
}

fn clip(line: &str, width: u16) -> String {
    line.chars().take(width as usize).collect()
}

/// Opens the browser on `bytes` and blocks until the user quits.
pub fn run_shell(session: Session, bytes: Vec<u8>, cli: &Cli) -> Result<()> {
    let mut browser = Browser::new(session, bytes.into(), cli.file.display().to_string());
    browser.reload()?;

    let (key_tx, key_rx) = mpsc::channel();
    thread::Builder::new()
        .name("shell-keys".to_string())
        .spawn(move || {
            for k in stdin().keys() {
                let Ok(k) = k else { break };
                if key_tx.send(k).is_err() {
                    break;
                }
            }
        })
        .context("failed to start the key reader")?;

    let mut stdout = stdout()
        .into_raw_mode()?
        .into_alternate_screen()?;
    write!(stdout, "{}", cursor::Hide)?;

    let mut loaded = false;
    let mut dirty = true;
    loop {
        if browser.session.poll() > 0 {
            dirty = true;
        }
        // 最初の読み込みが終わったら CLI のビュー設定を反映する
        if !loaded && browser.session.model().is_some() {
            browser.session.sections = cli.section_view();
            browser.session.symbols = cli.symbol_view();
            loaded = true;
        }

        if dirty {
            browser.draw(&mut stdout)?;
            dirty = false;
        }

        match key_rx.recv_timeout(TICK) {
            Ok(key) => {
                if !browser.handle_key(key)? {
                    break;
                }
                dirty = true;
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    write!(stdout, "{}{}", cursor::Show, ToMainScreen)?;
    stdout.flush()?;
    vprintln!("browser closed");

    Ok(())
}
