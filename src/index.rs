use std::collections::HashMap;

use crate::flag::{FlagKey, ParsedFlagRecord, Partition};

/// Compiled flag definitions from every partition, keyed by
/// `{namespace}/{package}.{name}`.
#[derive(Debug, Clone, Default)]
pub struct SnapshotIndex {
    flags: HashMap<FlagKey, ParsedFlagRecord>,
}

impl SnapshotIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the index in the given order. A key seen again replaces the
    /// earlier record without complaint.
    pub fn from_partitions<I>(partitions: I) -> Self
    where
        I: IntoIterator<Item = (Partition, Vec<ParsedFlagRecord>)>,
    {
        let mut index = Self::new();
        for (_, records) in partitions {
            for record in records {
                index.insert(record);
            }
        }
        index
    }

    /// Returns the record that was replaced, if any.
    pub fn insert(&mut self, record: ParsedFlagRecord) -> Option<ParsedFlagRecord> {
        self.flags.insert(record.key(), record)
    }

    pub fn lookup(&self, namespace: &str, qualified_name: &str) -> Option<&ParsedFlagRecord> {
        self.flags.get(&FlagKey::new(namespace, qualified_name))
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// All records, sorted by key.
    pub fn records(&self) -> Vec<(&FlagKey, &ParsedFlagRecord)> {
        let mut records: Vec<_> = self.flags.iter().collect();
        records.sort_by(|a, b| a.0.cmp(b.0));
        records
    }
}

impl FromIterator<ParsedFlagRecord> for SnapshotIndex {
    fn from_iter<I: IntoIterator<Item = ParsedFlagRecord>>(iter: I) -> Self {
        let mut index = Self::new();
        for record in iter {
            index.insert(record);
        }
        index
    }
}
