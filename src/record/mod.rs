//! Generated record model.
//!
//! A [`Record`] is an ordered list of `field name -> value` pairs. All records
//! coming from one source share the same field names (an `Arc` to the same
//! slice), which is what the CSV header of a generated file is built from.

use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    names: Arc<[String]>,
    values: Vec<String>,
}

impl Record {
    /// Build a record from shared field names and one value per field.
    ///
    /// Returns `None` when the value count does not match the field count.
    pub fn new(names: Arc<[String]>, values: Vec<String>) -> Option<Self> {
        if names.len() != values.len() {
            return None;
        }
        Some(Self { names, values })
    }

    /// Convenience constructor for ad-hoc records (mostly tests).
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let (names, values): (Vec<String>, Vec<String>) =
            pairs.into_iter().map(|(k, v)| (k.into(), v.into())).unzip();
        Self {
            names: names.into(),
            values,
        }
    }

    pub fn field_names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| self.values[idx].as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate `(name, value)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }

    /// True when the record has exactly these field names, in this order.
    pub fn same_fields(&self, names: &[String]) -> bool {
        self.names.as_ref() == names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_lookup_and_order() {
        let record = Record::from_pairs([("file", "a.txt"), ("date", "2020-02-02")]);

        assert_eq!(record.get("date"), Some("2020-02-02"));
        assert_eq!(record.get("missing"), None);
        let pairs: Vec<_> = record.iter().collect();
        assert_eq!(pairs, vec![("file", "a.txt"), ("date", "2020-02-02")]);
    }

    #[test]
    fn test_record_new_checks_length() {
        let names: Arc<[String]> = vec!["a".to_string(), "b".to_string()].into();
        assert!(Record::new(names.clone(), vec!["1".to_string()]).is_none());
        assert!(Record::new(names, vec!["1".to_string(), "2".to_string()]).is_some());
    }
}
