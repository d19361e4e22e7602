use std::collections::HashMap;

use super::models::{IdentityKey, TournamentRecord};

/// Records indexed by identity key, remembering first-seen order
pub struct RecordCollection {
    index: HashMap<IdentityKey, usize>,
    records: Vec<TournamentRecord>,
}

impl RecordCollection {
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            records: Vec::new(),
        }
    }

    /// Insert a record, or fold it into the one already held under its key
    pub fn merge_with<F>(&mut self, record: TournamentRecord, merge: F)
    where
        F: FnOnce(&TournamentRecord, TournamentRecord) -> TournamentRecord,
    {
        let key = record.identity_key();
        match self.index.get(&key) {
            Some(&slot) => {
                let merged = merge(&self.records[slot], record);
                self.records[slot] = merged;
            }
            None => {
                self.index.insert(key, self.records.len());
                self.records.push(record);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, key: &IdentityKey) -> Option<&TournamentRecord> {
        self.index.get(key).map(|&slot| &self.records[slot])
    }

    pub fn into_vec(self) -> Vec<TournamentRecord> {
        self.records
    }
}

impl Default for RecordCollection {
    fn default() -> Self {
        Self::new()
    }
}
