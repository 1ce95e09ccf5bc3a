//! Presentation-side state for one viewer: the loaded file, its model, the
//! view flags, and the hex dump selection.
//!
//! Requests go to the engine worker without blocking; replies are picked up
//! by [`Session::poll`]. Each reply carries the ticket of its request and is
//! dropped when a newer load or selection has superseded it.

use std::{
    sync::{
        Arc,
        mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError},
    },
    time::{Duration, Instant},
};

use crate::{
    engine::{EngineEvent, EngineRequest},
    error::EngineInitError,
    hexdump::{DumpRequest, HexDumpState},
    model::ElfModel,
    native::EngineHandle,
    verbose::{dprintln, vprintln},
    view::{SectionView, SymbolView},
};

#[derive(Debug, Clone)]
struct Loaded {
    bytes: Arc<[u8]>,
    model: Arc<ElfModel>,
}

pub struct Session {
    engine: EngineHandle,
    reply_tx: Sender<EngineEvent>,
    reply_rx: Receiver<EngineEvent>,

    load_ticket: u64,
    pending: Option<Arc<[u8]>>,
    in_flight: usize,

    loaded: Option<Loaded>,
    pub sections: SectionView,
    pub symbols: SymbolView,
    hexdump: HexDumpState,
    error: Option<String>,
}

impl Session {
    pub fn new(engine: EngineHandle) -> Self {
        let (reply_tx, reply_rx) = mpsc::channel();

        Self {
            engine,
            reply_tx,
            reply_rx,
            load_ticket: 0,
            pending: None,
            in_flight: 0,
            loaded: None,
            sections: SectionView::default(),
            symbols: SymbolView::default(),
            hexdump: HexDumpState::default(),
            error: None,
        }
    }

    pub fn model(&self) -> Option<&Arc<ElfModel>> {
        self.loaded.as_ref().map(|l| &l.model)
    }

    pub fn hexdump(&self) -> &HexDumpState {
        &self.hexdump
    }

    /// Message of the last failed load or engine failure.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Requests submitted but not yet answered.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Submits a new file. The current model stays visible until the
    /// decode finishes; any reply for an earlier load is ignored.
    pub fn load(&mut self, bytes: impl Into<Arc<[u8]>>) -> Result<(), EngineInitError> {
        let bytes = bytes.into();

        self.load_ticket += 1;
        self.pending = Some(bytes.clone());
        self.error = None;

        self.submit(EngineRequest::Decode {
            ticket: self.load_ticket,
            bytes,
            reply: self.reply_tx.clone(),
        })
    }

    /// Selects a section for dumping. Does nothing before a file is loaded.
    pub fn select_dump(&mut self, section: &str) -> Result<(), EngineInitError> {
        if self.loaded.is_none() {
            return Ok(());
        }

        let request = self.hexdump.select(section);
        self.request_dump(request)
    }

    pub fn cycle_dump(&mut self, step: isize) -> Result<(), EngineInitError> {
        if self.loaded.is_none() {
            return Ok(());
        }

        match self.hexdump.cycle(step) {
            Some(request) => self.request_dump(request),
            None => Ok(()),
        }
    }

    /// Applies every reply that has arrived so far. Never blocks.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;

        loop {
            match self.reply_rx.try_recv() {
                Ok(event) => {
                    self.apply(event);
                    applied += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        applied
    }

    /// Blocks until every submitted request has been answered, or `timeout`
    /// passes. Returns `false` on timeout.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;

        while self.in_flight > 0 {
            let left = deadline.saturating_duration_since(Instant::now());

            match self.reply_rx.recv_timeout(left) {
                Ok(event) => self.apply(event),
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return false;
                }
            }
        }

        true
    }

    fn submit(&mut self, request: EngineRequest) -> Result<(), EngineInitError> {
        match self.engine.submit(request) {
            Ok(()) => {
                self.in_flight += 1;
                Ok(())
            }
            Err(e) => {
                dprintln!("engine request failed: {e}");
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn request_dump(&mut self, request: DumpRequest) -> Result<(), EngineInitError> {
        let Some(loaded) = self.loaded.as_ref() else {
            return Ok(());
        };

        let bytes = loaded.bytes.clone();
        let generation = request.generation;
        let submitted = self.submit(EngineRequest::Dump {
            ticket: generation,
            bytes,
            section: request.section,
            reply: self.reply_tx.clone(),
        });

        if let Err(e) = &submitted {
            self.hexdump.fail(generation, e.to_string());
        }
        submitted
    }

    fn apply(&mut self, event: EngineEvent) {
        self.in_flight = self.in_flight.saturating_sub(1);

        match event {
            EngineEvent::Decoded { ticket, result } => {
                if ticket != self.load_ticket {
                    vprintln!("discarding decode result for superseded load {ticket}");
                    return;
                }

                let Some(bytes) = self.pending.take() else {
                    return;
                };

                match result {
                    Ok(model) => {
                        let model = Arc::new(model);
                        vprintln!(
                            "loaded {} sections, {} segments, {} symbols",
                            model.sections.len(),
                            model.segments.len(),
                            model.symbols.len()
                        );

                        self.sections = SectionView::default();
                        self.symbols = SymbolView::default();
                        let first = self.hexdump.reset(model.dumpable_sections());
                        self.loaded = Some(Loaded { bytes, model });

                        if let Some(request) = first {
                            // エラーは submit 内で記録済み
                            let _ = self.request_dump(request);
                        }
                    }
                    Err(e) => {
                        self.loaded = None;
                        self.hexdump.clear();
                        self.error = Some(e.to_string());
                    }
                }
            }
            EngineEvent::Dumped {
                ticket,
                section,
                result,
            } => {
                if !self.hexdump.complete(ticket, result) {
                    vprintln!("discarding stale dump of {section} (generation {ticket})");
                }
            }
        }
    }
}
