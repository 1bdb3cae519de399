//!
//! A Rust decoder for MongoDB's [Full-Time Diagnostic Data Capture](https://github.com/mongodb/mongo/tree/master/src/mongo/db/ftdc)
//! (FTDC) metric chunks.
//!
//! ## Features
//!
//! - Parse the BSON documents FTDC wraps its payloads in (every scalar
//!   type a `serverStatus` document uses, plus document/array/binary
//!   traversal).
//! - Decode a metrics chunk: inflate the zlib payload, flatten the
//!   embedded reference document into its metric columns, expand the
//!   zero-run-compressed varint deltas and restore one sample per
//!   time-point through cumulative sums.
//! - Also comes with utilities to read and write LEB128 varints,
//!   zero-run delta streams and the supported BSON subset.
//!
//! ## Why?
//!
//! `mongod` continuously records its own diagnostics under
//! `diagnostic.data`, but the format is compact and takes a few layers of
//! unwrapping to read. This crate decodes one chunk at a time into plain
//! `(dotted path, i64)` samples, so tooling can stream, graph or export
//! them without the server's own source tree.
//!
//! ## Example
//!
//! ```rust
//! use rusty_ftdc::{BsonValue, Document};
//!
//! // A reference document with two counters.
//! let mut server_status = Document::new();
//! server_status.insert("connections", BsonValue::Int64(3));
//! server_status.insert("opcounters", BsonValue::Int32(100));
//! let mut reference = Document::new();
//! reference.insert("serverStatus", BsonValue::Document(server_status));
//!
//! // Two metric columns, three samples each, metric-major deltas.
//! let deltas = [1, 0, 2, 10, 10, 10];
//! let mut chunk_bytes: Vec<u8> = Vec::new();
//! rusty_ftdc::chunk::write_chunk(&reference, 0, 3, &deltas, &mut chunk_bytes).unwrap();
//!
//! let chunk = rusty_ftdc::read_chunk(&chunk_bytes)
//!     .unwrap()
//!     .expect("a metrics chunk");
//! let samples: Vec<_> = chunk.samples().collect();
//! assert_eq!(samples.len(), 3);
//! assert_eq!(samples[0].get("serverStatus.connections"), Some(4));
//! assert_eq!(samples[2].get("serverStatus.opcounters"), Some(130));
//! ```

/// BSON document reader, including the chunk-payload scan.
pub mod bson;
/// FTDC chunk decoding: one chunk document in, restored samples out.
pub mod chunk;
/// Little-endian primitive readers.
pub mod cursor;
/// Zero-run varint delta streams and cumulative restoration.
pub mod delta;
/// The in-memory BSON value model.
pub mod document;
mod encoder;
/// Error types.
pub mod errors;
/// Reference document flattening.
pub mod flatten;
/// The zlib decompression collaborator.
pub mod inflate;
/// LEB128 varints.
pub mod uvarint;

// Re-exports
pub use bson::{read_document, read_ftdc_carrier, FtdcCarrier};
pub use chunk::{read_chunk, Chunk, Sample, Samples};
pub use document::{BsonValue, Document};
pub use errors::RustyFtdcError;
pub use flatten::{flatten_reference, ReferenceMetric};
