use std::collections::HashMap;

use crate::model::{Relationship, RelationshipKey};

/// Whether `candidate` should replace `current` at the same key.
///
/// Declared foreign keys beat inferred ones; otherwise the higher
/// confidence wins and ties keep the incumbent.
fn supersedes(candidate: &Relationship, current: &Relationship) -> bool {
    match (candidate.is_inferred, current.is_inferred) {
        (false, true) => true,
        (true, false) => false,
        _ => candidate.confidence > current.confidence,
    }
}

/// Reduce analyzer output to one relationship per endpoint key.
///
/// The result is sorted by descending confidence. Ties keep the order in
/// which their keys were first seen. Running the output through again
/// returns it unchanged.
pub fn fuse_relationships<I>(relationships: I) -> Vec<Relationship>
where
    I: IntoIterator<Item = Relationship>,
{
    let mut index: HashMap<RelationshipKey, usize> = HashMap::new();
    let mut fused: Vec<Relationship> = Vec::new();

    for rel in relationships {
        match index.get(&rel.key()) {
            Some(&slot) => {
                if supersedes(&rel, &fused[slot]) {
                    fused[slot] = rel;
                }
            }
            None => {
                index.insert(rel.key(), fused.len());
                fused.push(rel);
            }
        }
    }

    // Stable sort keeps first-seen order among equal confidences.
    fused.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    fused
}
