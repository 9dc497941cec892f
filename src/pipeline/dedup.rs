use crate::constants::DEDUP_DELIMITER;
use crate::pipeline::merge::OutputRecord;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use tracing::debug;

/// Resolved-address signature: the verified delivery lines, city, state,
/// full ZIP and urbanization joined by a delimiter that never occurs in
/// address text.
pub fn dedup_key(record: &OutputRecord) -> String {
    let verified = &record.verified;
    let parts = [
        verified.delivery_line_1.as_str(),
        verified.delivery_line_2.as_str(),
        verified.city.as_str(),
        verified.state.as_str(),
        verified.full_zip_code.as_str(),
        verified.urbanization.as_str(),
    ];
    parts.join(&DEDUP_DELIMITER.to_string())
}

fn is_blank_key(key: &str) -> bool {
    key.chars().all(|c| c == DEDUP_DELIMITER)
}

/// Remembers every resolved address seen in the run. The first record with
/// a given address wins; later ones are flagged.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<[u8; 32]>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag `record` if its address was already seen. Records that resolved
    /// to nothing are never duplicates of each other.
    pub fn mark(&mut self, record: &mut OutputRecord) -> bool {
        let key = dedup_key(record);
        if is_blank_key(&key) {
            return false;
        }

        let digest: [u8; 32] = Sha256::digest(key.as_bytes()).into();
        if self.seen.insert(digest) {
            return false;
        }

        debug!(
            sequence = record.sequence(),
            key = %hex::encode(digest),
            "Duplicate address"
        );
        record.duplicate = "Y".to_string();
        true
    }

    pub fn unique_addresses(&self) -> usize {
        self.seen.len()
    }
}
