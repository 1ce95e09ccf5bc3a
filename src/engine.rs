use std::sync::{Arc, mpsc::Sender};

use crate::{
    error::{DecodeError, DumpError},
    hexdump,
    model::ElfModel,
    parser,
};

/// The decoding boundary. Everything above it works on [`ElfModel`] and
/// formatted dumps only, so tests can swap in their own engine.
pub trait DecodeEngine {
    fn decode_structure(&self, bytes: &[u8]) -> Result<ElfModel, DecodeError>;
    fn dump_section(&self, bytes: &[u8], section: &str) -> Result<String, DumpError>;
}

/// The engine backed by this crate's own parser.
#[derive(Debug, Default, Clone, Copy)]
pub struct ElfEngine;

impl DecodeEngine for ElfEngine {
    fn decode_structure(&self, bytes: &[u8]) -> Result<ElfModel, DecodeError> {
        parser::decode_structure(bytes)
    }

    fn dump_section(&self, bytes: &[u8], section: &str) -> Result<String, DumpError> {
        hexdump::dump_section(bytes, section)
    }
}

// セッションからエンジンへのリクエスト
pub enum EngineRequest {
    Decode {
        ticket: u64,
        bytes: Arc<[u8]>,
        reply: Sender<EngineEvent>,
    },
    Dump {
        ticket: u64,
        bytes: Arc<[u8]>,
        section: String,
        reply: Sender<EngineEvent>,
    },
}

// エンジンからの応答。ticket は要求時のものをそのまま返す
#[derive(Debug)]
pub enum EngineEvent {
    Decoded {
        ticket: u64,
        result: Result<ElfModel, DecodeError>,
    },
    Dumped {
        ticket: u64,
        section: String,
        result: Result<String, DumpError>,
    },
}

impl EngineRequest {
    pub fn handle<E: DecodeEngine>(self, engine: &E) {
        match self {
            EngineRequest::Decode {
                ticket,
                bytes,
                reply,
            } => {
                let result = engine.decode_structure(&bytes);
                // 受け手がいなくなっていれば捨てる
                let _ = reply.send(EngineEvent::Decoded { ticket, result });
            }
            EngineRequest::Dump {
                ticket,
                bytes,
                section,
                reply,
            } => {
                let result = engine.dump_section(&bytes, &section);
                let _ = reply.send(EngineEvent::Dumped {
                    ticket,
                    section,
                    result,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    #[test]
    fn requests_echo_their_ticket() {
        let (tx, rx) = mpsc::channel();
        let bytes: Arc<[u8]> = Arc::from(&b"not an elf at all"[..]);

        EngineRequest::Decode {
            ticket: 7,
            bytes: bytes.clone(),
            reply: tx.clone(),
        }
        .handle(&ElfEngine);
        EngineRequest::Dump {
            ticket: 8,
            bytes,
            section: ".text".to_string(),
            reply: tx,
        }
        .handle(&ElfEngine);

        match rx.recv().unwrap() {
            EngineEvent::Decoded { ticket, result } => {
                assert_eq!(ticket, 7);
                assert!(matches!(result, Err(DecodeError::BadMagic(_))));
            }
            other => panic!("unexpected {other:?}"),
        }
        match rx.recv().unwrap() {
            EngineEvent::Dumped {
                ticket,
                section,
                result,
            } => {
                assert_eq!(ticket, 8);
                assert_eq!(section, ".text");
                assert!(matches!(result, Err(DumpError::Decode(_))));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
