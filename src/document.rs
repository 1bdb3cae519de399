/// A BSON value, restricted to the types a `serverStatus`-shaped
/// reference document can contain.
#[derive(Debug, Clone, PartialEq)]
pub enum BsonValue {
    Double(f64),
    String(String),
    Document(Document),
    Array(Vec<BsonValue>),
    Binary { subtype: u8, payload: Vec<u8> },
    ObjectId([u8; 12]),
    Boolean(bool),
    /// Milliseconds since the epoch.
    DateTime(i64),
    Null,
    Int32(i32),
    /// Raw u64: seconds in the high half, ordinal in the low half.
    Timestamp(u64),
    Int64(i64),
}

/// An insertion-ordered BSON document.
///
/// The flattener walks documents in the producer's write order, so this is
/// a plain pair vector rather than a map: iteration order IS the byte
/// order of the source.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    entries: Vec<(String, BsonValue)>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: BsonValue) {
        self.entries.push((key.into(), value));
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&BsonValue> {
        self.entries
            .iter()
            .find(|(entry_key, _)| entry_key == key)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BsonValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_is_preserved() {
        let mut document = Document::new();
        document.insert("zeta", BsonValue::Int32(1));
        document.insert("alpha", BsonValue::Int32(2));
        document.insert("mid", BsonValue::Int32(3));

        let keys: Vec<&str> = document.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_get() {
        let mut document = Document::new();
        document.insert("uptime", BsonValue::Int64(3600));

        assert_eq!(document.get("uptime"), Some(&BsonValue::Int64(3600)));
        assert_eq!(document.get("missing"), None);
        assert_eq!(document.len(), 1);
        assert!(!document.is_empty());
    }
}
