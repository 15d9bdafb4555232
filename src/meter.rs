//! Decoder for the mixer's periodic meter payload.
//!
//! `/meters/1` updates carry one OSC blob whose inner layout is the mixer's
//! own, not OSC: a big-endian byte count, then a little-endian sample
//! count, then that many little-endian 16-bit samples. The endianness flip
//! between the outer OSC framing and the inner fields is the device's
//! native byte order and has to be reproduced exactly; getting it wrong
//! still yields plausible-looking numbers, hence the dedicated tests.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MeterError {
    #[error("meter blob truncated: need {needed} bytes, {available} available")]
    TruncatedBuffer { needed: usize, available: usize },

    #[error("meter blob declares {declared} payload bytes but {actual} arrived")]
    LengthMismatch { declared: u32, actual: usize },

    #[error("meter blob carries no samples")]
    EmptyBlob,
}

/// One decoded meter update. Loudness samples run from -32768 (silence)
/// up to 0 (clipping); index 0 is channel 1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MeterBlob {
    declared_length: u32,
    payload_length: usize,
    pub samples: Vec<i16>,
}

impl MeterBlob {
    /// Decodes the inner meter payload from a blob argument's bytes.
    ///
    /// The declared length only validates; reads are bounded by the bytes
    /// actually present, so a wrong declaration can never push the sample
    /// read out of bounds. A discrepancy is left for
    /// [`MeterBlob::length_mismatch`] to report.
    pub fn decode(bytes: &[u8]) -> Result<MeterBlob, MeterError> {
        if bytes.len() < 8 {
            return Err(MeterError::TruncatedBuffer {
                needed: 8,
                available: bytes.len(),
            });
        }
        let declared_length = BigEndian::read_u32(&bytes[..4]);
        let payload = &bytes[4..];
        let sample_count = LittleEndian::read_u32(&payload[..4]) as usize;

        let needed = 4 + sample_count * 2;
        if payload.len() < needed {
            return Err(MeterError::TruncatedBuffer {
                needed,
                available: payload.len(),
            });
        }

        let mut samples = vec![0i16; sample_count];
        LittleEndian::read_i16_into(&payload[4..needed], &mut samples);

        Ok(MeterBlob {
            declared_length,
            payload_length: payload.len(),
            samples,
        })
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// The discrepancy between the declared byte count and what arrived,
    /// if any. Worth a log line, not a dropped update.
    pub fn length_mismatch(&self) -> Option<MeterError> {
        if self.declared_length as usize != self.payload_length {
            Some(MeterError::LengthMismatch {
                declared: self.declared_length,
                actual: self.payload_length,
            })
        } else {
            None
        }
    }

    /// Channel 1 is the first sample in the array.
    pub fn loudness_of_channel_1(&self) -> Result<i16, MeterError> {
        self.samples.first().copied().ok_or(MeterError::EmptyBlob)
    }
}

/// Maps a raw loudness sample onto a bar length between 0 and `max_width`:
/// -32768 is an empty bar, 0 (clipping) a full one, linearly in between.
/// Samples above 0 clamp to the full width.
pub fn loudness_to_bar(sample: i16, max_width: usize) -> usize {
    let level = sample.min(0) as i64 - i16::MIN as i64; // 0..=32768
    (level as u64 * max_width as u64 / 32768) as usize
}
