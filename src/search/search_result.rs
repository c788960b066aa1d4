use crate::postings::{DocId, PostingsList, ScoredDoc};

#[derive(Debug, Clone, PartialEq)]
pub enum SearchResult {
    /// Boolean and phrase queries, ascending by doc id.
    Postings(PostingsList),
    /// Ranked queries, best first.
    Ranked(Vec<ScoredDoc>),
}

impl SearchResult {
    pub fn len(&self) -> usize {
        match self {
            Self::Postings(list) => list.len(),
            Self::Ranked(docs) => docs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn doc_ids(&self) -> Vec<DocId> {
        match self {
            Self::Postings(list) => list.doc_ids(),
            Self::Ranked(docs) => docs.iter().map(|doc| doc.doc_id).collect(),
        }
    }
}
