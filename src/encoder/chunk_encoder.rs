use std::io::Write;

use flate2::{write::ZlibEncoder, Compression};

use crate::document::{BsonValue, Document};
use crate::flatten::flatten_reference;

use super::{bson_encoder::write_document, delta_encoder::write_delta_stream};

/// Assembles a complete chunk document from a reference document and a
/// metric-major delta matrix.
///
/// The layout mirrors what the producer writes: an outer document with an
/// `_id` date, a `type` marker and a zlib-compressed `data` payload
/// holding the reference document, the two counts and the delta stream.
/// `deltas` must hold `num_samples` values per flattened metric, all
/// samples of the first metric first.
pub fn write_chunk<W: std::io::Write>(
    reference: &Document,
    id_milliseconds: i64,
    num_samples: u32,
    deltas: &[i64],
    writer: &mut W,
) -> std::io::Result<()> {
    let num_metrics = flatten_reference(reference).len() as u32;

    let mut plain: Vec<u8> = Vec::new();
    write_document(reference, &mut plain)?;
    plain.extend_from_slice(&num_metrics.to_le_bytes());
    plain.extend_from_slice(&num_samples.to_le_bytes());
    write_delta_stream(deltas, &mut plain)?;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&plain)?;
    let compressed = encoder.finish()?;

    let mut chunk = Document::new();
    chunk.insert("_id", BsonValue::DateTime(id_milliseconds));
    chunk.insert("type", BsonValue::Int32(1));
    chunk.insert(
        "data",
        BsonValue::Binary {
            subtype: 0x00,
            payload: compressed,
        },
    );
    write_document(&chunk, writer)
}
