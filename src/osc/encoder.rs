//! Encoding of outbound OSC messages.

use byteorder::{BigEndian, ByteOrder};

use super::{OscMessage, OscType};

/// Pads the buffer with null bytes up to the next 4-byte boundary.
fn pad(buf: &mut Vec<u8>) {
    const ZEROS: [u8; 3] = [0; 3];
    let m = buf.len() % 4;
    if m != 0 {
        buf.extend_from_slice(&ZEROS[..4 - m]);
    }
}

/// Writes the string, a null terminator, and padding. Even an empty string
/// occupies 4 bytes on the wire.
pub fn encode_string(s: &str, buf: &mut Vec<u8>) {
    buf.extend_from_slice(s.as_bytes());
    buf.push(0);
    pad(buf);
}

/// Writes a 32-bit big-endian two's-complement integer. Already aligned.
pub fn encode_i32(n: i32, buf: &mut Vec<u8>) {
    let mut bytes = [0u8; 4];
    BigEndian::write_i32(&mut bytes, n);
    buf.extend_from_slice(&bytes);
}

/// Writes a 32-bit big-endian IEEE-754 float. Already aligned.
pub fn encode_f32(f: f32, buf: &mut Vec<u8>) {
    let mut bytes = [0u8; 4];
    BigEndian::write_f32(&mut bytes, f);
    buf.extend_from_slice(&bytes);
}

/// Writes a blob: big-endian byte count, the bytes, then padding.
pub fn encode_blob(data: &[u8], buf: &mut Vec<u8>) {
    let mut len = [0u8; 4];
    BigEndian::write_u32(&mut len, data.len() as u32);
    buf.extend_from_slice(&len);
    buf.extend_from_slice(data);
    pad(buf);
}

fn encode_arg(arg: &OscType, buf: &mut Vec<u8>) {
    match arg {
        OscType::String(s) => encode_string(s, buf),
        OscType::Int(n) => encode_i32(*n, buf),
        OscType::Float(f) => encode_f32(*f, buf),
        OscType::Blob(data) => encode_blob(data, buf),
    }
}

/// Encodes a complete message: address pattern, type tag string (`,` plus
/// one code per argument), then the arguments in order. The result is
/// always a multiple of 4 bytes long.
pub fn encode(msg: &OscMessage) -> Vec<u8> {
    let mut buf = Vec::with_capacity(64);

    encode_string(&msg.addr, &mut buf);

    let mut tags = String::with_capacity(msg.args.len() + 1);
    tags.push(',');
    for arg in &msg.args {
        tags.push(arg.tag() as char);
    }
    encode_string(&tags, &mut buf);

    for arg in &msg.args {
        encode_arg(arg, &mut buf);
    }
    buf
}
