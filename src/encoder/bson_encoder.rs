use crate::bson::{
    TYPE_ARRAY, TYPE_BINARY, TYPE_BOOLEAN, TYPE_DATETIME, TYPE_DOCUMENT, TYPE_DOUBLE, TYPE_INT32,
    TYPE_INT64, TYPE_NULL, TYPE_OBJECTID, TYPE_STRING, TYPE_TIMESTAMP,
};
use crate::document::{BsonValue, Document};

/// Serialises a document with the element layout the reader parses:
/// size field, elements in insertion order, trailing NUL.
pub fn write_document<W: std::io::Write>(
    document: &Document,
    writer: &mut W,
) -> std::io::Result<()> {
    // The size field comes first, so the body has to be buffered.
    let mut body: Vec<u8> = Vec::with_capacity(64);
    for (key, value) in document.iter() {
        write_element(key, value, &mut body)?;
    }
    write_framing(&body, writer)
}

fn write_array<W: std::io::Write>(values: &[BsonValue], writer: &mut W) -> std::io::Result<()> {
    let mut body: Vec<u8> = Vec::with_capacity(64);
    for (index, value) in values.iter().enumerate() {
        write_element(&index.to_string(), value, &mut body)?;
    }
    write_framing(&body, writer)
}

fn write_framing<W: std::io::Write>(body: &[u8], writer: &mut W) -> std::io::Result<()> {
    let total_size = body.len() as u32 + 5;
    writer.write_all(&total_size.to_le_bytes())?;
    writer.write_all(body)?;
    writer.write_all(&[0x00])?;
    Ok(())
}

fn write_element<W: std::io::Write>(
    key: &str,
    value: &BsonValue,
    writer: &mut W,
) -> std::io::Result<()> {
    writer.write_all(&[element_type(value)])?;
    write_cstring(key, writer)?;
    write_value(value, writer)
}

fn element_type(value: &BsonValue) -> u8 {
    match value {
        BsonValue::Double(_) => TYPE_DOUBLE,
        BsonValue::String(_) => TYPE_STRING,
        BsonValue::Document(_) => TYPE_DOCUMENT,
        BsonValue::Array(_) => TYPE_ARRAY,
        BsonValue::Binary { .. } => TYPE_BINARY,
        BsonValue::ObjectId(_) => TYPE_OBJECTID,
        BsonValue::Boolean(_) => TYPE_BOOLEAN,
        BsonValue::DateTime(_) => TYPE_DATETIME,
        BsonValue::Null => TYPE_NULL,
        BsonValue::Int32(_) => TYPE_INT32,
        BsonValue::Timestamp(_) => TYPE_TIMESTAMP,
        BsonValue::Int64(_) => TYPE_INT64,
    }
}

fn write_cstring<W: std::io::Write>(text: &str, writer: &mut W) -> std::io::Result<()> {
    writer.write_all(text.as_bytes())?;
    writer.write_all(&[0x00])?;
    Ok(())
}

fn write_value<W: std::io::Write>(value: &BsonValue, writer: &mut W) -> std::io::Result<()> {
    match value {
        BsonValue::Double(value) => writer.write_all(&value.to_le_bytes()),
        BsonValue::String(text) => {
            let length = text.len() as u32 + 1;
            writer.write_all(&length.to_le_bytes())?;
            write_cstring(text, writer)
        }
        BsonValue::Document(document) => write_document(document, writer),
        BsonValue::Array(values) => write_array(values, writer),
        BsonValue::Binary { subtype, payload } => {
            writer.write_all(&(payload.len() as u32).to_le_bytes())?;
            writer.write_all(&[*subtype])?;
            writer.write_all(payload)
        }
        BsonValue::ObjectId(objectid) => writer.write_all(objectid),
        BsonValue::Boolean(value) => writer.write_all(&[u8::from(*value)]),
        BsonValue::DateTime(milliseconds) => writer.write_all(&milliseconds.to_le_bytes()),
        BsonValue::Null => Ok(()),
        BsonValue::Int32(value) => writer.write_all(&value.to_le_bytes()),
        BsonValue::Timestamp(value) => writer.write_all(&value.to_le_bytes()),
        BsonValue::Int64(value) => writer.write_all(&value.to_le_bytes()),
    }
}
