use std::io::Read;

use flate2::read::ZlibDecoder;

use crate::errors::RustyFtdcError;

/// Inflates a chunk's compressed payload.
///
/// The payload is zlib-wrapped DEFLATE; a corrupt stream surfaces as
/// `InflateError`.
pub fn inflate(input: &[u8]) -> Result<Vec<u8>, RustyFtdcError> {
    let mut decoder = ZlibDecoder::new(input);
    let mut inflated = Vec::new();
    decoder.read_to_end(&mut inflated)?;
    Ok(inflated)
}
