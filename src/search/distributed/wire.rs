//! The length-framed JSON wire protocol between master and client.
//!
//! Grounded in `code_breaking_distributed.py`'s job/result queue pair, but
//! reworked from Python's shared-memory `multiprocessing.managers` queues
//! (not available across a language boundary this crate doesn't have) into
//! plain length-prefixed `serde_json` frames over a `TcpStream` — the same
//! trade the rest of this crate makes wherever the original relied on
//! Python-only machinery.

use std::io::{self, Read, Write};

use serde::{Deserialize, Serialize};

/// One unit of work as sent over the wire: the configuration in its
/// canonical `Display`/`FromStr` string form, rather than a bespoke binary
/// encoding, so the wire format stays legible and reuses the configuration
/// model's own parser as the wire codec.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialSpec {
    pub configuration: String,
    pub offset: usize,
    pub reflector_wiring: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClientMessage {
    Hello { token: String, hostname: String },
    RequestBatch,
    Report(ResultMessage),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ResultMessage {
    Match {
        configuration: String,
        offset: usize,
        decryption: String,
        reflector_wiring: Option<String>,
    },
    /// Sent once per client after its timing sample, mirroring
    /// `code_breaking_distributed.py`'s `"SPEED,{speed},{node},{cpus}"`.
    Speed { trials_per_second: f64 },
    /// Sent once, after the client's job queue is exhausted.
    Final,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ServerMessage {
    Welcome { accepted: bool },
    Batch {
        trials: Vec<TrialSpec>,
        crib: String,
        ciphertext: String,
    },
    NoMoreWork,
}

/// Writes one frame: a 4-byte big-endian length prefix followed by the
/// JSON payload.
pub fn write_message<W: Write, T: Serialize>(writer: &mut W, message: &T) -> io::Result<()> {
    let bytes = serde_json::to_vec(message)?;
    writer.write_all(&(bytes.len() as u32).to_be_bytes())?;
    writer.write_all(&bytes)?;
    writer.flush()
}

/// Reads one frame written by [`write_message`].
pub fn read_message<R: Read, T: for<'de> Deserialize<'de>>(reader: &mut R) -> io::Result<T> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf)?;
    let len = u32::from_be_bytes(len_buf) as usize;
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    serde_json::from_slice(&buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
