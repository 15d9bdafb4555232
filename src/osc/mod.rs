//! OSC wire codec for talking to the mixer.
//!
//! Implements the subset of Open Sound Control the XR-series consoles speak
//! on UDP: single messages (no bundles) with string, int32, float32 and blob
//! arguments, every field null-padded to a 4-byte boundary.

pub mod decoder;
pub mod encoder;

use thiserror::Error;

/// A single OSC argument. The variant determines both the wire encoding and
/// the character contributed to the type tag string.
#[derive(Clone, Debug, PartialEq)]
pub enum OscType {
    String(String),
    Int(i32),
    Float(f32),
    Blob(Vec<u8>),
}

impl OscType {
    /// Type tag byte for this argument (`s`, `i`, `f` or `b`).
    pub fn tag(&self) -> u8 {
        match self {
            OscType::String(_) => b's',
            OscType::Int(_) => b'i',
            OscType::Float(_) => b'f',
            OscType::Blob(_) => b'b',
        }
    }
}

/// A full OSC message: address pattern plus ordered arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct OscMessage {
    pub addr: String,
    pub args: Vec<OscType>,
}

impl OscMessage {
    pub fn new(addr: impl Into<String>, args: Vec<OscType>) -> Self {
        OscMessage {
            addr: addr.into(),
            args,
        }
    }
}

/// Errors produced while decoding OSC data. Encoding cannot fail.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OscError {
    #[error("buffer truncated at offset {offset}: need {needed} bytes, {available} available")]
    TruncatedBuffer {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("malformed field at offset {offset}: {reason}")]
    MalformedField { offset: usize, reason: &'static str },

    #[error("unknown type tag '{0}'")]
    UnknownTypeTag(char),
}
