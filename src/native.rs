use std::{
    sync::{
        Mutex, PoisonError,
        mpsc::{self, Receiver, Sender},
    },
    thread,
};

use crate::{
    engine::{DecodeEngine, ElfEngine, EngineRequest},
    error::EngineInitError,
    verbose::{Timer, vprintln},
};

/// Sending side of a running engine worker. Cheap to clone.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    sender: Sender<EngineRequest>,
}

impl EngineHandle {
    pub fn submit(&self, request: EngineRequest) -> Result<(), EngineInitError> {
        self.sender
            .send(request)
            .map_err(|_| EngineInitError::Stopped)
    }
}

/// Starts a worker thread that builds its engine with `factory` and then
/// serves requests in arrival order. Returns once the engine is ready.
pub fn spawn<E, F>(factory: F) -> Result<EngineHandle, EngineInitError>
where
    E: DecodeEngine + 'static,
    F: FnOnce() -> Result<E, String> + Send + 'static,
{
    let (sender, reciever) = mpsc::channel();
    let (ready_tx, ready_rx) = mpsc::channel();

    thread::Builder::new()
        .name("elf-engine".to_string())
        .spawn(move || {
            let engine = match factory() {
                Ok(engine) => engine,
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };
            let _ = ready_tx.send(Ok(()));

            run(engine, reciever);
        })
        .map_err(|e| EngineInitError::Spawn(e.to_string()))?;

    match ready_rx.recv() {
        Ok(Ok(())) => Ok(EngineHandle { sender }),
        Ok(Err(e)) => Err(EngineInitError::Setup(e)),
        // factory の中でパニックした
        Err(_) => Err(EngineInitError::Stopped),
    }
}

fn run<E: DecodeEngine>(engine: E, reciever: Receiver<EngineRequest>) {
    for request in reciever {
        let _t = Timer::start("engine request");
        request.handle(&engine);
    }

    vprintln!("decoding engine stopped");
}

/// Memoized engine start. Concurrent callers wait on the same attempt and
/// share its handle; a failed attempt is not remembered so the next call
/// tries again.
pub struct EngineCell {
    slot: Mutex<Option<EngineHandle>>,
}

impl EngineCell {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    pub fn get_or_start<F>(&self, start: F) -> Result<EngineHandle, EngineInitError>
    where
        F: FnOnce() -> Result<EngineHandle, EngineInitError>,
    {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(handle) = slot.as_ref() {
            return Ok(handle.clone());
        }

        let handle = start()?;
        *slot = Some(handle.clone());

        Ok(handle)
    }
}

impl Default for EngineCell {
    fn default() -> Self {
        Self::new()
    }
}

static ENGINE: EngineCell = EngineCell::new();

/// The process-wide built-in engine, started on first use.
pub fn ready() -> Result<EngineHandle, EngineInitError> {
    ENGINE.get_or_start(|| {
        let handle = spawn(|| Ok(ElfEngine))?;
        vprintln!("decoding engine started");
        Ok(handle)
    })
}
