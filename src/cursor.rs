//! Little-endian primitive readers shared by the BSON and metrics parsers.
//!
//! The "cursor position" is the remaining-input slice that every parser
//! returns: a successful read hands back the input advanced by exactly the
//! bytes it consumed, a failing read hands back an error and leaves the
//! caller's slice untouched. `remaining` and `peek` are the slice's own
//! `len` and indexing.

use nom::bytes::complete::take;

use crate::errors::{FtdcParseError, ParseErrorKind, ParseResult};

pub fn read_u32_le(input: &[u8]) -> ParseResult<u32> {
    nom::number::complete::le_u32(input)
}

pub fn read_i32_le(input: &[u8]) -> ParseResult<i32> {
    nom::number::complete::le_i32(input)
}

pub fn read_u64_le(input: &[u8]) -> ParseResult<u64> {
    nom::number::complete::le_u64(input)
}

pub fn read_i64_le(input: &[u8]) -> ParseResult<i64> {
    nom::number::complete::le_i64(input)
}

/// Reads 8 bytes as an IEEE-754 binary64.
pub fn read_f64_le(input: &[u8]) -> ParseResult<f64> {
    nom::number::complete::le_f64(input)
}

/// Reads the 12 raw bytes of an ObjectId.
pub fn read_objectid(input: &[u8]) -> ParseResult<[u8; 12]> {
    let (remaining_input, bytes) = take(12usize)(input)?;
    let mut objectid = [0u8; 12];
    objectid.copy_from_slice(bytes);
    Ok((remaining_input, objectid))
}

/// Reads a NUL-terminated UTF-8 string, consuming the NUL but not
/// including it in the result.
pub fn read_cstring(input: &[u8]) -> ParseResult<&str> {
    let nul_position = match input.iter().position(|&byte| byte == 0) {
        Some(position) => position,
        None => return FtdcParseError::err(input, ParseErrorKind::OutOfRange),
    };
    let (remaining_input, bytes) = take(nul_position + 1)(input)?;
    match std::str::from_utf8(&bytes[..nul_position]) {
        Ok(text) => Ok((remaining_input, text)),
        Err(_) => FtdcParseError::err(input, ParseErrorKind::Utf8),
    }
}

/// Takes a `count`-byte sub-slice, advancing past it.
pub fn take_bytes(input: &[u8], count: usize) -> ParseResult<&[u8]> {
    take(count)(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_reads_advance_by_width() {
        let input = b"\x2a\x00\x00\x00\xff\xff\xff\xff\xff\xff\xff\xff\x00";

        let (remaining_input, value) = read_u32_le(input).unwrap();
        assert_eq!(value, 42);
        assert_eq!(remaining_input.len(), input.len() - 4);

        let (remaining_input, value) = read_i64_le(remaining_input).unwrap();
        assert_eq!(value, -1);
        assert_eq!(remaining_input.len(), 1);
    }

    #[test]
    fn test_signed_reads() {
        let input = b"\xfe\xff\xff\xff";
        let (_, value) = read_i32_le(input).unwrap();
        assert_eq!(value, -2);

        let input = b"\x01\x00\x00\x00\x00\x00\x00\x00";
        let (_, value) = read_u64_le(input).unwrap();
        assert_eq!(value, 1);
    }

    #[test]
    fn test_read_f64() {
        // 12000.0 in little-endian binary64
        let input = b"\x00\x00\x00\x00\x00\x70\xc7\x40";
        let (remaining_input, value) = read_f64_le(input).unwrap();
        assert_eq!(value, 12000.0);
        assert!(remaining_input.is_empty());
    }

    #[test]
    fn test_short_read_leaves_input_usable() {
        let input = b"\x01\x02";
        assert!(read_u32_le(input).is_err());

        // The failing read consumed nothing, a narrower read still works.
        let (remaining_input, _) = take_bytes(input, 1).unwrap();
        assert_eq!(remaining_input, b"\x02");
    }

    #[test]
    fn test_read_cstring() {
        let input = b"metrics\x00rest";
        let (remaining_input, text) = read_cstring(input).unwrap();
        assert_eq!(text, "metrics");
        assert_eq!(remaining_input, b"rest");

        let input = b"\x00";
        let (remaining_input, text) = read_cstring(input).unwrap();
        assert_eq!(text, "");
        assert!(remaining_input.is_empty());
    }

    #[test]
    fn test_read_cstring_without_nul() {
        let error = read_cstring(b"no terminator").unwrap_err();
        match error {
            nom::Err::Error(e) => assert_eq!(e.kind, ParseErrorKind::OutOfRange),
            _ => panic!("expected a plain error"),
        }
    }

    #[test]
    fn test_read_cstring_bad_utf8() {
        let error = read_cstring(b"\xff\xfe\x00").unwrap_err();
        match error {
            nom::Err::Error(e) => assert_eq!(e.kind, ParseErrorKind::Utf8),
            _ => panic!("expected a plain error"),
        }
    }

    #[test]
    fn test_read_objectid() {
        let input = b"\x01\x02\x03\x04\x05\x06\x07\x08\x09\x0a\x0b\x0c!";
        let (remaining_input, objectid) = read_objectid(input).unwrap();
        assert_eq!(objectid[0], 1);
        assert_eq!(objectid[11], 12);
        assert_eq!(remaining_input, b"!");
    }
}
