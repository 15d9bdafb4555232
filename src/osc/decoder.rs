//! Decoding of inbound OSC datagrams.
//!
//! All functions are pure reads of `(buffer, offset)`; they never mutate
//! shared state, so datagrams can be decoded independently.

use std::str;

use byteorder::{BigEndian, ByteOrder};

use super::{OscError, OscMessage, OscType};

/// Bounds-checked slice of `len` bytes starting at `offset`.
fn take(buf: &[u8], offset: usize, len: usize) -> Result<&[u8], OscError> {
    let end = offset.checked_add(len).ok_or(OscError::TruncatedBuffer {
        offset,
        needed: len,
        available: 0,
    })?;
    buf.get(offset..end).ok_or(OscError::TruncatedBuffer {
        offset,
        needed: len,
        available: buf.len().saturating_sub(offset),
    })
}

/// Rounds a field length up to the next 4-byte boundary.
fn aligned(len: usize) -> usize {
    (len + 3) & !3
}

/// Reads a null-terminated, null-padded string. Returns the string and the
/// offset just past the padding.
pub fn decode_string(buf: &[u8], offset: usize) -> Result<(&str, usize), OscError> {
    let field = buf.get(offset..).unwrap_or(&[]);
    let nul = field
        .iter()
        .position(|&b| b == 0)
        .ok_or(OscError::MalformedField {
            offset,
            reason: "unterminated string",
        })?;
    let s = str::from_utf8(&field[..nul]).map_err(|_| OscError::MalformedField {
        offset,
        reason: "string is not valid UTF-8",
    })?;

    // The terminator and padding must actually be present.
    let consumed = aligned(nul + 1);
    take(buf, offset, consumed)?;
    Ok((s, offset + consumed))
}

/// Reads a big-endian i32.
pub fn decode_i32(buf: &[u8], offset: usize) -> Result<(i32, usize), OscError> {
    let bytes = take(buf, offset, 4)?;
    Ok((BigEndian::read_i32(bytes), offset + 4))
}

/// Reads a big-endian IEEE-754 f32.
pub fn decode_f32(buf: &[u8], offset: usize) -> Result<(f32, usize), OscError> {
    let bytes = take(buf, offset, 4)?;
    Ok((BigEndian::read_f32(bytes), offset + 4))
}

/// Reads a blob: big-endian byte count, that many bytes, then padding.
pub fn decode_blob(buf: &[u8], offset: usize) -> Result<(&[u8], usize), OscError> {
    let len = BigEndian::read_u32(take(buf, offset, 4)?) as usize;
    let data = take(buf, offset + 4, len)?;
    let consumed = 4 + aligned(len);
    take(buf, offset, consumed)?;
    Ok((data, offset + consumed))
}

fn decode_arg(tag: char, buf: &[u8], offset: usize) -> Result<(OscType, usize), OscError> {
    match tag {
        's' => {
            let (s, next) = decode_string(buf, offset)?;
            Ok((OscType::String(s.to_string()), next))
        }
        'i' => {
            let (n, next) = decode_i32(buf, offset)?;
            Ok((OscType::Int(n), next))
        }
        'f' => {
            let (f, next) = decode_f32(buf, offset)?;
            Ok((OscType::Float(f), next))
        }
        'b' => {
            let (data, next) = decode_blob(buf, offset)?;
            Ok((OscType::Blob(data.to_vec()), next))
        }
        other => Err(OscError::UnknownTypeTag(other)),
    }
}

/// Decodes one datagram into a message. This is the only parsing entry
/// point for inbound traffic; it does not interpret the address pattern.
pub fn decode(buf: &[u8]) -> Result<OscMessage, OscError> {
    let (addr, offset) = decode_string(buf, 0)?;
    let addr = addr.to_string();

    let tag_offset = offset;
    let (tags, mut offset) = decode_string(buf, offset)?;
    let tags = tags.strip_prefix(',').ok_or(OscError::MalformedField {
        offset: tag_offset,
        reason: "type tag string does not start with ','",
    })?;

    let mut args = Vec::with_capacity(tags.len());
    for tag in tags.chars() {
        let (arg, next) = decode_arg(tag, buf, offset)?;
        args.push(arg);
        offset = next;
    }
    Ok(OscMessage { addr, args })
}
