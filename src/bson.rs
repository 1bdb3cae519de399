use nom::bytes::complete::take;

use crate::cursor::{
    read_cstring, read_f64_le, read_i32_le, read_i64_le, read_objectid, read_u32_le, read_u64_le,
    take_bytes,
};
use crate::document::{BsonValue, Document};
use crate::errors::{FtdcParseError, ParseErrorKind, ParseResult};

pub use crate::encoder::bson_encoder::write_document;

/// Default cap on document nesting. Real `serverStatus` documents sit
/// well below this; adversarial inputs hit the cap instead of the stack.
pub const DEFAULT_MAX_DEPTH: usize = 64;

pub(crate) const TYPE_DOUBLE: u8 = 0x01;
pub(crate) const TYPE_STRING: u8 = 0x02;
pub(crate) const TYPE_DOCUMENT: u8 = 0x03;
pub(crate) const TYPE_ARRAY: u8 = 0x04;
pub(crate) const TYPE_BINARY: u8 = 0x05;
pub(crate) const TYPE_UNDEFINED: u8 = 0x06;
pub(crate) const TYPE_OBJECTID: u8 = 0x07;
pub(crate) const TYPE_BOOLEAN: u8 = 0x08;
pub(crate) const TYPE_DATETIME: u8 = 0x09;
pub(crate) const TYPE_NULL: u8 = 0x0A;
pub(crate) const TYPE_REGEX: u8 = 0x0B;
pub(crate) const TYPE_DBPOINTER: u8 = 0x0C;
pub(crate) const TYPE_CODE: u8 = 0x0D;
pub(crate) const TYPE_SYMBOL: u8 = 0x0E;
pub(crate) const TYPE_CODE_WITH_SCOPE: u8 = 0x0F;
pub(crate) const TYPE_INT32: u8 = 0x10;
pub(crate) const TYPE_TIMESTAMP: u8 = 0x11;
pub(crate) const TYPE_INT64: u8 = 0x12;
pub(crate) const TYPE_DECIMAL128: u8 = 0x13;
pub(crate) const TYPE_MIN_KEY: u8 = 0xFF;
pub(crate) const TYPE_MAX_KEY: u8 = 0x7F;

/// The compressed metrics payload embedded in a chunk document.
///
/// The payload borrows from the chunk bytes; the driver inflates it
/// before anything else needs the buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct FtdcCarrier<'a> {
    pub subtype: u8,
    pub payload: &'a [u8],
}

/// Parses one top-level BSON document.
pub fn read_document(input: &[u8]) -> ParseResult<Document> {
    read_document_with_depth(input, DEFAULT_MAX_DEPTH)
}

/// Parses one top-level BSON document with an explicit nesting cap.
///
/// `max_depth` counts container levels including the top-level document
/// itself, so it must be at least 1.
pub fn read_document_with_depth(input: &[u8], max_depth: usize) -> ParseResult<Document> {
    let (remaining_input, entries) = read_container(input, max_depth)?;
    let mut document = Document::new();
    for (key, value) in entries {
        document.insert(key, value);
    }
    Ok((remaining_input, document))
}

/// Scans a chunk document for its compressed metrics payload.
///
/// Stops at the first top-level Binary element and returns it without
/// touching the rest of the document: the trailer elements that follow
/// the payload can declare sizes that do not line up with the outer
/// document, so this mode never enforces the end offset. A document that
/// terminates without a Binary element yields `None`.
pub fn read_ftdc_carrier(input: &[u8]) -> ParseResult<Option<FtdcCarrier<'_>>> {
    let (mut remaining_input, declared_size) = read_u32_le(input)?;
    if (declared_size as usize) < 5 {
        return FtdcParseError::err(input, ParseErrorKind::InvalidSize);
    }

    loop {
        let (rest, type_buffer) = take(1usize)(remaining_input)?;
        let type_byte = type_buffer[0];
        if type_byte == 0x00 {
            return Ok((rest, None));
        }

        let (rest, _key) = read_cstring(rest)?;
        if type_byte == TYPE_BINARY {
            let (rest, (subtype, payload)) = read_binary(rest)?;
            return Ok((rest, Some(FtdcCarrier { subtype, payload })));
        }

        let (rest, _value) = read_value(rest, type_byte, DEFAULT_MAX_DEPTH)?;
        remaining_input = rest;
    }
}

/// Shared framing for documents and arrays: size field, element loop,
/// trailing NUL exactly at the declared end.
fn read_container(input: &[u8], depth_left: usize) -> ParseResult<Vec<(String, BsonValue)>> {
    if depth_left == 0 {
        return FtdcParseError::err(input, ParseErrorKind::RecursionLimit);
    }

    let (after_size, declared_size) = read_u32_le(input)?;
    let declared_size = declared_size as usize;
    if declared_size < 5 || declared_size > input.len() {
        return FtdcParseError::err(input, ParseErrorKind::InvalidSize);
    }

    let (terminated, mut body) = take(declared_size - 5)(after_size)?;
    let (remaining_input, terminator) = take(1usize)(terminated)?;
    if terminator[0] != 0x00 {
        return FtdcParseError::err(terminated, ParseErrorKind::InvalidTerminator);
    }

    let mut entries = Vec::new();
    while !body.is_empty() {
        let (rest, type_buffer) = take(1usize)(body)?;
        let type_byte = type_buffer[0];
        if type_byte == 0x00 {
            // A NUL here means the element bytes ran short of the
            // declared size.
            return FtdcParseError::err(body, ParseErrorKind::InvalidTerminator);
        }

        let (rest, key) = read_cstring(rest)?;
        let (rest, value) = read_value(rest, type_byte, depth_left)?;
        if let Some(value) = value {
            entries.push((key.to_owned(), value));
        }
        body = rest;
    }

    Ok((remaining_input, entries))
}

/// Parses the value bytes of one element. `None` means the element was a
/// recognised-but-unsupported type whose bytes were consumed and dropped.
fn read_value(input: &[u8], type_byte: u8, depth_left: usize) -> ParseResult<Option<BsonValue>> {
    match type_byte {
        TYPE_DOUBLE => {
            let (rest, value) = read_f64_le(input)?;
            Ok((rest, Some(BsonValue::Double(value))))
        }
        TYPE_STRING => {
            let (rest, text) = read_string(input)?;
            Ok((rest, Some(BsonValue::String(text.to_owned()))))
        }
        TYPE_DOCUMENT => {
            let (rest, entries) = read_container(input, depth_left - 1)?;
            let mut document = Document::new();
            for (key, value) in entries {
                document.insert(key, value);
            }
            Ok((rest, Some(BsonValue::Document(document))))
        }
        TYPE_ARRAY => {
            // Arrays are documents with decimal keys; the byte order
            // already carries the element order, so the keys are dropped.
            let (rest, entries) = read_container(input, depth_left - 1)?;
            let values = entries.into_iter().map(|(_, value)| value).collect();
            Ok((rest, Some(BsonValue::Array(values))))
        }
        TYPE_BINARY => {
            let (rest, (subtype, payload)) = read_binary(input)?;
            Ok((
                rest,
                Some(BsonValue::Binary {
                    subtype,
                    payload: payload.to_vec(),
                }),
            ))
        }
        TYPE_OBJECTID => {
            let (rest, objectid) = read_objectid(input)?;
            Ok((rest, Some(BsonValue::ObjectId(objectid))))
        }
        TYPE_BOOLEAN => {
            let (rest, byte_buffer) = take(1usize)(input)?;
            Ok((rest, Some(BsonValue::Boolean(byte_buffer[0] != 0))))
        }
        TYPE_DATETIME => {
            let (rest, milliseconds) = read_i64_le(input)?;
            Ok((rest, Some(BsonValue::DateTime(milliseconds))))
        }
        TYPE_NULL => Ok((input, Some(BsonValue::Null))),
        TYPE_INT32 => {
            let (rest, value) = read_i32_le(input)?;
            Ok((rest, Some(BsonValue::Int32(value))))
        }
        TYPE_TIMESTAMP => {
            let (rest, value) = read_u64_le(input)?;
            Ok((rest, Some(BsonValue::Timestamp(value))))
        }
        TYPE_INT64 => {
            let (rest, value) = read_i64_le(input)?;
            Ok((rest, Some(BsonValue::Int64(value))))
        }
        // Deprecated or out-of-scope types whose width is still known:
        // consume the exact payload so the element stream stays in sync.
        TYPE_UNDEFINED | TYPE_MIN_KEY | TYPE_MAX_KEY => Ok((input, None)),
        TYPE_REGEX => {
            let (rest, _pattern) = read_cstring(input)?;
            let (rest, _options) = read_cstring(rest)?;
            Ok((rest, None))
        }
        TYPE_DBPOINTER => {
            let (rest, _namespace) = read_string(input)?;
            let (rest, _) = take_bytes(rest, 12)?;
            Ok((rest, None))
        }
        TYPE_CODE | TYPE_SYMBOL => {
            let (rest, _text) = read_string(input)?;
            Ok((rest, None))
        }
        TYPE_CODE_WITH_SCOPE => {
            // The leading i32 covers the whole value, itself included.
            let (rest, total_size) = read_i32_le(input)?;
            if total_size < 4 {
                return FtdcParseError::err(input, ParseErrorKind::InvalidSize);
            }
            let (rest, _) = take_bytes(rest, total_size as usize - 4)?;
            Ok((rest, None))
        }
        TYPE_DECIMAL128 => {
            let (rest, _) = take_bytes(input, 16)?;
            Ok((rest, None))
        }
        other => FtdcParseError::err(input, ParseErrorKind::UnsupportedType(other)),
    }
}

/// Length-prefixed UTF-8 string: i32 length including the trailing NUL,
/// then that many bytes.
fn read_string(input: &[u8]) -> ParseResult<&str> {
    let (after_length, length) = read_i32_le(input)?;
    if length < 1 {
        return FtdcParseError::err(input, ParseErrorKind::InvalidSize);
    }
    let length = length as usize;
    let (remaining_input, bytes) = take(length)(after_length)?;
    if bytes[length - 1] != 0x00 {
        return FtdcParseError::err(after_length, ParseErrorKind::InvalidTerminator);
    }
    match std::str::from_utf8(&bytes[..length - 1]) {
        Ok(text) => Ok((remaining_input, text)),
        Err(_) => FtdcParseError::err(after_length, ParseErrorKind::Utf8),
    }
}

fn read_binary(input: &[u8]) -> ParseResult<(u8, &[u8])> {
    let (rest, length) = read_i32_le(input)?;
    if length < 0 {
        return FtdcParseError::err(input, ParseErrorKind::InvalidSize);
    }
    let (rest, subtype_buffer) = take(1usize)(rest)?;
    let (rest, payload) = take(length as usize)(rest)?;
    Ok((rest, (subtype_buffer[0], payload)))
}
