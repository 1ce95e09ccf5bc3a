#[cfg(not(target_arch = "wasm32"))]
mod app {
    use std::{
        fs,
        io::{self, BufWriter, Write},
        time::Duration,
    };

    use anyhow::{Context, Result, bail};
    use clap::Parser;

    use tiny_elf_viewer::{
        cli::Cli,
        display,
        hexdump::DumpStatus,
        native,
        session::Session,
        shell,
        verbose::{self, Timer},
    };

    const ENGINE_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn main() -> Result<()> {
        let cli = Cli::parse();
        verbose::init(cli.quiet, cli.verbose);

        let bytes = {
            let _t = Timer::start("read");
            fs::read(&cli.file).with_context(|| format!("failed to open {}", cli.file.display()))?
        };

        let engine = native::ready().context("failed to start the decoding engine")?;
        let mut session = Session::new(engine);

        if cli.interactive {
            return shell::run_shell(session, bytes, &cli);
        }

        session.load(bytes)?;
        if !session.wait_idle(ENGINE_TIMEOUT) {
            bail!("timed out waiting for the decoding engine");
        }
        if let Some(e) = session.error() {
            bail!("failed to open {}: {e}", cli.file.display());
        }

        let Some(model) = session.model().cloned() else {
            bail!("no model was produced for {}", cli.file.display());
        };

        // ビューは読み込み完了時に初期化される
        session.sections = cli.section_view();
        session.symbols = cli.symbol_view();

        let selection = cli.selection();
        let mut out = BufWriter::new(io::stdout().lock());

        if selection.header {
            display::write_header(&mut out, &model)?;
            writeln!(out)?;
        }
        if selection.sections {
            display::write_sections(&mut out, &model, &session.sections)?;
            writeln!(out)?;
        }
        if selection.segments {
            display::write_segments(&mut out, &model)?;
            writeln!(out)?;
        }
        if selection.symbols {
            display::write_symbols(&mut out, &model, &session.symbols)?;
            writeln!(out)?;
        }
        if selection.dynamic {
            display::write_dynamic(&mut out, &model)?;
            writeln!(out)?;
        }

        if let Some(name) = cli.hex.as_deref() {
            session.select_dump(name)?;
            if !session.wait_idle(ENGINE_TIMEOUT) {
                bail!("timed out waiting for the decoding engine");
            }

            match session.hexdump().status() {
                DumpStatus::Ready(text) => {
                    write!(out, "{text}")?;
                    writeln!(out)?;
                }
                DumpStatus::Failed(e) => {
                    out.flush()?;
                    bail!("{e}");
                }
                DumpStatus::Idle | DumpStatus::Loading => {
                    bail!("no dump was produced for section {name}");
                }
            }
        }

        out.flush()?;
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    app::main()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
