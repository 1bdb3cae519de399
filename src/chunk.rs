use crate::bson::{read_document, read_ftdc_carrier};
use crate::delta::{read_delta_counts, read_delta_stream, restore_columns, MAX_MATRIX_VALUES};
use crate::errors::RustyFtdcError;
use crate::flatten::flatten_reference;
use crate::inflate::inflate;

pub use crate::encoder::chunk_encoder::write_chunk;

/// Binary subtypes a metrics chunk is allowed to carry. Anything else is
/// some other embedded blob and the chunk is skipped.
const ACCEPTED_SUBTYPES: [u8; 2] = [0x00, 0x01];

/// One decoded FTDC chunk: the flattened schema plus every restored
/// metric value.
///
/// The chunk owns the path list once; samples borrow it and own only
/// their value column.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    paths: Vec<String>,
    num_samples: usize,
    // Metric-major: all samples of metric 0, then all of metric 1, ...
    values: Vec<i64>,
}

impl Chunk {
    /// The flattened reference paths, one per metric column.
    pub fn metric_paths(&self) -> &[String] {
        &self.paths
    }

    pub fn num_metrics(&self) -> usize {
        self.paths.len()
    }

    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Iterates the samples in chronological order.
    pub fn samples(&self) -> Samples<'_> {
        Samples {
            chunk: self,
            index: 0,
        }
    }
}

/// Chronological iterator over the samples of a decoded chunk.
#[derive(Debug, Clone)]
pub struct Samples<'a> {
    chunk: &'a Chunk,
    index: usize,
}

impl<'a> Iterator for Samples<'a> {
    type Item = Sample<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.chunk.num_samples {
            return None;
        }
        let sample_index = self.index;
        self.index += 1;

        let num_samples = self.chunk.num_samples;
        let values = (0..self.chunk.paths.len())
            .map(|metric| self.chunk.values[metric * num_samples + sample_index])
            .collect();
        Some(Sample {
            paths: &self.chunk.paths,
            values,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.chunk.num_samples - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Samples<'_> {}

/// One reconstructed sample: every metric's restored value at a single
/// time-point, keyed by the flattened reference paths in reference order.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample<'a> {
    paths: &'a [String],
    values: Vec<i64>,
}

impl<'a> Sample<'a> {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The value column, in reference order.
    pub fn values(&self) -> &[i64] {
        &self.values
    }

    /// Value of the first column matching `path`. Timestamp expansion
    /// repeats a path, so the seconds column wins for those.
    pub fn get(&self, path: &str) -> Option<i64> {
        self.paths
            .iter()
            .position(|candidate| candidate == path)
            .map(|index| self.values[index])
    }

    /// Iterates `(path, value)` pairs in reference order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, i64)> + '_ {
        self.paths
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// Decodes one FTDC chunk document into its samples.
///
/// Returns `Ok(None)` when the document carries no metrics payload, or a
/// payload with a subtype this decoder does not consume. Everything else
/// fails the chunk: no error is recovered here.
pub fn read_chunk(input: &[u8]) -> Result<Option<Chunk>, RustyFtdcError> {
    let (_, carrier) = read_ftdc_carrier(input)?;
    let carrier = match carrier {
        Some(carrier) if ACCEPTED_SUBTYPES.contains(&carrier.subtype) => carrier,
        _ => return Ok(None),
    };

    let inflated = inflate(carrier.payload)?;
    let (tail, reference) = read_document(&inflated)?;
    let metrics = flatten_reference(&reference);

    let (tail, (num_metrics, num_samples)) = read_delta_counts(tail)?;
    if metrics.len() != num_metrics as usize {
        return Err(RustyFtdcError::MetricsCountMismatch {
            declared: num_metrics,
            flattened: metrics.len(),
        });
    }
    if u64::from(num_metrics) * u64::from(num_samples) > MAX_MATRIX_VALUES {
        return Err(RustyFtdcError::ChunkTooLarge {
            metrics: num_metrics,
            samples: num_samples,
        });
    }

    let num_samples = num_samples as usize;
    let bases: Vec<i64> = metrics.iter().map(|metric| metric.base).collect();
    let paths: Vec<String> = metrics.into_iter().map(|metric| metric.path).collect();

    if num_samples == 0 {
        return Ok(Some(Chunk {
            paths,
            num_samples: 0,
            values: Vec::new(),
        }));
    }

    let (_, mut values) = read_delta_stream(tail, paths.len() * num_samples)?;
    restore_columns(&mut values, &bases, num_samples);

    Ok(Some(Chunk {
        paths,
        num_samples,
        values,
    }))
}

#[cfg(test)]
mod tests {
    use crate::document::{BsonValue, Document};

    use super::*;

    fn reference_with_counter(value: i64) -> Document {
        let mut reference = Document::new();
        reference.insert("counter", BsonValue::Int64(value));
        reference
    }

    #[test]
    fn test_single_metric_chunk() {
        let reference = reference_with_counter(100);
        let mut chunk_bytes: Vec<u8> = Vec::new();
        write_chunk(&reference, 0, 3, &[5, 3, -2], &mut chunk_bytes).unwrap();

        let chunk = read_chunk(&chunk_bytes).unwrap().expect("a metrics chunk");
        assert_eq!(chunk.num_metrics(), 1);
        assert_eq!(chunk.num_samples(), 3);

        let restored: Vec<i64> = chunk
            .samples()
            .map(|sample| sample.get("counter").unwrap())
            .collect();
        assert_eq!(restored, vec![105, 108, 106]);
    }

    #[test]
    fn test_chunk_without_binary_payload_is_skipped() {
        let mut document = Document::new();
        document.insert("type", BsonValue::Int32(1));
        let mut bytes: Vec<u8> = Vec::new();
        crate::bson::write_document(&document, &mut bytes).unwrap();

        assert!(read_chunk(&bytes).unwrap().is_none());
    }

    #[test]
    fn test_unexpected_subtype_is_skipped() {
        let mut document = Document::new();
        document.insert(
            "data",
            BsonValue::Binary {
                subtype: 0x04,
                payload: vec![1, 2, 3],
            },
        );
        let mut bytes: Vec<u8> = Vec::new();
        crate::bson::write_document(&document, &mut bytes).unwrap();

        assert!(read_chunk(&bytes).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_payload_is_an_inflate_error() {
        let mut document = Document::new();
        document.insert(
            "data",
            BsonValue::Binary {
                subtype: 0x00,
                payload: vec![0xde, 0xad, 0xbe, 0xef],
            },
        );
        let mut bytes: Vec<u8> = Vec::new();
        crate::bson::write_document(&document, &mut bytes).unwrap();

        let error = read_chunk(&bytes).unwrap_err();
        assert!(matches!(error, RustyFtdcError::InflateError(_)));
    }

    #[test]
    fn test_empty_sample_stream() {
        let reference = reference_with_counter(1);
        let mut chunk_bytes: Vec<u8> = Vec::new();
        write_chunk(&reference, 0, 0, &[], &mut chunk_bytes).unwrap();

        let chunk = read_chunk(&chunk_bytes).unwrap().expect("a metrics chunk");
        assert_eq!(chunk.num_metrics(), 1);
        assert_eq!(chunk.num_samples(), 0);
        assert_eq!(chunk.samples().count(), 0);
    }

    #[test]
    fn test_sample_iteration_order() {
        let mut reference = Document::new();
        reference.insert("a", BsonValue::Int32(0));
        reference.insert("b", BsonValue::Int32(10));

        let mut chunk_bytes: Vec<u8> = Vec::new();
        // Metric-major deltas: a = [1, 1], b = [2, 2]
        write_chunk(&reference, 0, 2, &[1, 1, 2, 2], &mut chunk_bytes).unwrap();

        let chunk = read_chunk(&chunk_bytes).unwrap().expect("a metrics chunk");
        let samples: Vec<_> = chunk.samples().collect();
        assert_eq!(samples.len(), 2);

        let first: Vec<(&str, i64)> = samples[0].iter().collect();
        assert_eq!(first, vec![("a", 1), ("b", 12)]);
        let second: Vec<(&str, i64)> = samples[1].iter().collect();
        assert_eq!(second, vec![("a", 2), ("b", 14)]);
    }
}
