use crate::document::{BsonValue, Document};

/// One flattened metric column: the dotted path of a reference leaf plus
/// its base value, the value the first delta applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceMetric {
    pub path: String,
    pub base: i64,
}

/// Linearizes a reference document into its ordered metric columns.
///
/// The walk follows document order exactly; the producer writes deltas in
/// the same order, so the position of each entry is its column index.
/// Non-numeric leaves contribute nothing. A Timestamp contributes two
/// columns, seconds then ordinal, both under the leaf's own path.
pub fn flatten_reference(reference: &Document) -> Vec<ReferenceMetric> {
    let mut metrics = Vec::new();
    let mut path = String::new();
    flatten_document(reference, &mut path, &mut metrics);
    metrics
}

fn flatten_document(document: &Document, path: &mut String, out: &mut Vec<ReferenceMetric>) {
    for (key, value) in document.iter() {
        let parent_length = path.len();
        if !path.is_empty() {
            path.push('.');
        }
        path.push_str(key);
        flatten_value(value, path, out);
        path.truncate(parent_length);
    }
}

fn flatten_array(values: &[BsonValue], path: &mut String, out: &mut Vec<ReferenceMetric>) {
    for (index, value) in values.iter().enumerate() {
        let parent_length = path.len();
        if !path.is_empty() {
            path.push('.');
        }
        path.push_str(&index.to_string());
        flatten_value(value, path, out);
        path.truncate(parent_length);
    }
}

fn flatten_value(value: &BsonValue, path: &mut String, out: &mut Vec<ReferenceMetric>) {
    match value {
        BsonValue::Document(document) => flatten_document(document, path, out),
        BsonValue::Array(values) => flatten_array(values, path, out),
        BsonValue::Double(value) => push_metric(out, path, *value as i64),
        BsonValue::Int32(value) => push_metric(out, path, i64::from(*value)),
        BsonValue::Int64(value) => push_metric(out, path, *value),
        BsonValue::Boolean(value) => push_metric(out, path, i64::from(*value)),
        BsonValue::DateTime(milliseconds) => push_metric(out, path, *milliseconds),
        BsonValue::Timestamp(raw) => {
            // Seconds sit in the high half, the ordinal in the low half;
            // the producer writes the seconds column first.
            push_metric(out, path, (raw >> 32) as i64);
            push_metric(out, path, (raw & 0xffff_ffff) as i64);
        }
        BsonValue::String(text) => {
            if let Some((seconds, ordinal)) = parse_timestamp_string(text) {
                push_metric(out, path, seconds);
                push_metric(out, path, ordinal);
            } else if let Some(value) = parse_numeric_string(text) {
                push_metric(out, path, value);
            }
        }
        // Null, Binary and ObjectId leaves carry no metric column.
        BsonValue::Null | BsonValue::Binary { .. } | BsonValue::ObjectId(_) => {}
    }
}

fn push_metric(out: &mut Vec<ReferenceMetric>, path: &str, base: i64) {
    out.push(ReferenceMetric {
        path: path.to_owned(),
        base,
    });
}

/// Accepts `-?digits(.digits)?`, truncating toward zero. Anything else,
/// including an integral numeral that overflows i64, is not a metric.
fn parse_numeric_string(text: &str) -> Option<i64> {
    let unsigned = text.strip_prefix('-').unwrap_or(text);
    let (integral, fractional) = match unsigned.split_once('.') {
        Some((integral, fractional)) => (integral, Some(fractional)),
        None => (unsigned, None),
    };
    if integral.is_empty() || !integral.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    match fractional {
        Some(fractional) => {
            if fractional.is_empty() || !fractional.bytes().all(|byte| byte.is_ascii_digit()) {
                return None;
            }
            Some(text.parse::<f64>().ok()? as i64)
        }
        None => text.parse::<i64>().ok(),
    }
}

/// Accepts the shell's textual timestamp, `Timestamp(<seconds>, <ordinal>)`,
/// expanding it into the same two columns the binary form produces.
fn parse_timestamp_string(text: &str) -> Option<(i64, i64)> {
    let inner = text.strip_prefix("Timestamp(")?.strip_suffix(')')?;
    let (seconds, ordinal) = inner.split_once(',')?;
    let seconds = seconds.trim().parse::<u32>().ok()?;
    let ordinal = ordinal.trim().parse::<u32>().ok()?;
    Some((i64::from(seconds), i64::from(ordinal)))
}
