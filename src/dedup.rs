use crate::schema::{Identified, RecordId};
use std::collections::HashMap;

/// Collapses records sharing an id. Each id keeps the position of its first
/// appearance and the value of its last one.
pub fn dedupe<T: Identified>(records: Vec<T>) -> Vec<T> {
    let mut positions: HashMap<RecordId, usize> = HashMap::with_capacity(records.len());
    let mut unique: Vec<T> = Vec::with_capacity(records.len());

    for record in records {
        let existing = positions.get(record.record_id()).copied();
        if let Some(idx) = existing {
            unique[idx] = record;
            continue;
        }
        positions.insert(record.record_id().clone(), unique.len());
        unique.push(record);
    }

    unique
}

/// Borrowing variant of [`dedupe`] for callers that keep their snapshot.
pub fn dedupe_cloned<T: Identified + Clone>(records: &[T]) -> Vec<T> {
    dedupe(records.to_vec())
}
