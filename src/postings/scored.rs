use std::cmp::Ordering;

use super::DocId;

/// A document with the score it received for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDoc {
    pub doc_id: DocId,
    pub score: f64,
}

impl ScoredDoc {
    pub const fn new(doc_id: DocId, score: f64) -> Self {
        Self { doc_id, score }
    }
}

/// Sorts by descending score; equal scores keep ascending `doc_id` order.
pub fn sort_by_score_descending(docs: &mut [ScoredDoc]) {
    docs.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then(a.doc_id.cmp(&b.doc_id))
    });
}
