//! Binary VDF record decoder
//!
//! Steam stores non-Steam shortcuts in a nested, typed, null-terminated
//! record format with no length prefixes. A dictionary is a sequence of
//! `(type tag, key, value)` triples closed by an explicit end marker; the
//! four value types are nested dictionaries, null-terminated strings, and
//! little-endian 32/64-bit unsigned integers.

use crate::error::DecodeError;
use std::io::BufRead;

/// Value opens a nested dictionary.
const TAG_DICTIONARY: u8 = 0x00;
/// Value is a null-terminated string.
const TAG_STRING: u8 = 0x01;
/// Value is a 4-byte little-endian unsigned integer.
const TAG_UINT32: u8 = 0x02;
/// Value is an 8-byte little-endian unsigned integer.
const TAG_UINT64: u8 = 0x07;
/// Closes the current dictionary.
const END_MARKER: u8 = 0x08;

/// A typed value recovered from the shortcuts container.
#[derive(Debug, Clone, PartialEq)]
pub enum BinaryNode {
    Dictionary(Dictionary),
    String(String),
    UInt32(u32),
    UInt64(u64),
}

impl BinaryNode {
    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            BinaryNode::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            BinaryNode::String(s) => Some(s),
            _ => None,
        }
    }
}

/// An insertion-ordered string-keyed mapping of decoded values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary(Vec<(String, BinaryNode)>);

impl Dictionary {
    pub fn new() -> Self {
        Dictionary(Vec::new())
    }

    /// First value stored under `key`, in insertion order.
    pub fn get(&self, key: &str) -> Option<&BinaryNode> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BinaryNode)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn push(&mut self, key: String, value: BinaryNode) {
        self.0.push((key, value));
    }
}

/// Decode a complete shortcuts container from `reader`.
///
/// The root dictionary is the whole document: decoding stops at its end
/// marker and never consumes trailing bytes. Any unknown type tag or
/// premature end of input aborts the parse; the format has no resync point.
pub fn decode<R: BufRead>(reader: &mut R) -> Result<Dictionary, DecodeError> {
    read_dictionary(reader)
}

fn read_dictionary<R: BufRead>(reader: &mut R) -> Result<Dictionary, DecodeError> {
    let mut dict = Dictionary::new();
    loop {
        let tag = read_byte(reader)?;
        if tag == END_MARKER {
            return Ok(dict);
        }
        let key = read_string(reader)?;
        let value = match tag {
            TAG_DICTIONARY => BinaryNode::Dictionary(read_dictionary(reader)?),
            TAG_STRING => BinaryNode::String(read_string(reader)?),
            TAG_UINT32 => BinaryNode::UInt32(u32::from_le_bytes(read_exact(reader)?)),
            TAG_UINT64 => BinaryNode::UInt64(u64::from_le_bytes(read_exact(reader)?)),
            other => return Err(DecodeError::UnknownRecordType(other)),
        };
        dict.push(key, value);
    }
}

fn read_byte<R: BufRead>(reader: &mut R) -> Result<u8, DecodeError> {
    let [byte] = read_exact::<1, R>(reader)?;
    Ok(byte)
}

fn read_exact<const N: usize, R: BufRead>(reader: &mut R) -> Result<[u8; N], DecodeError> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            DecodeError::Truncated
        } else {
            DecodeError::Io(e)
        }
    })?;
    Ok(buf)
}

/// Read bytes up to the next NUL, scanning the reader's buffer in chunks.
///
/// The NUL is consumed but excluded from the result. Bytes are decoded as
/// UTF-8, falling back to Latin-1 so no byte sequence is unrepresentable.
fn read_string<R: BufRead>(reader: &mut R) -> Result<String, DecodeError> {
    let mut raw: Vec<u8> = Vec::new();
    loop {
        let chunk = reader.fill_buf()?;
        if chunk.is_empty() {
            return Err(DecodeError::Truncated);
        }
        match chunk.iter().position(|&b| b == 0) {
            Some(nul) => {
                raw.extend_from_slice(&chunk[..nul]);
                reader.consume(nul + 1);
                break;
            }
            None => {
                let len = chunk.len();
                raw.extend_from_slice(chunk);
                reader.consume(len);
            }
        }
    }
    Ok(decode_text(raw))
}

fn decode_text(raw: Vec<u8>) -> String {
    match String::from_utf8(raw) {
        Ok(s) => s,
        // Latin-1: every byte maps to the code point of the same value.
        Err(err) => err.into_bytes().iter().map(|&b| b as char).collect(),
    }
}
