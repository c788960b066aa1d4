use std::collections::HashMap;

use crate::{
    error::{Error, Result},
    hashed_index::{
        byte_store::{ByteStore, FileStore},
        paths::IndexPaths,
        HashedIndex,
    },
    kgram::KGramIndex,
    pagerank::PageRankScores,
    postings::{sort_by_score_descending, DocId, Offset, PostingsList, ScoredDoc},
};

use super::{
    merge::{intersect, positional_intersect, union},
    query::{Query, QueryType, RankingType},
    search_result::SearchResult,
};

pub const DEFAULT_COMBINED_WEIGHT: f64 = 5.0;

/// Distance between consecutive terms of a phrase query.
const PHRASE_DISTANCE: Offset = 1;

pub fn check_combined_weight(weight: f64) -> Result<f64> {
    if weight.is_nan() || weight <= 0.0 {
        return Err(Error::Generic(format!("combined weight must be positive, got {weight}")));
    }
    Ok(weight)
}

/// Evaluates queries against a committed [`HashedIndex`].
pub struct SearchEngine<S: ByteStore = FileStore> {
    index: HashedIndex<S>,
    kgram: Option<KGramIndex>,
    pagerank: PageRankScores,
    combined_weight: f64,
    shortest_first: bool,
}

impl SearchEngine<FileStore> {
    /// Opens the index under `paths` and rebuilds its k-gram index from the
    /// committed terms.
    pub fn open(paths: &IndexPaths, kgram_k: usize) -> Result<Self> {
        let index = HashedIndex::open(paths)?;
        let kgram = KGramIndex::from_terms(kgram_k, index.terms())?;

        tracing::info!(
            root = %paths.root.display(),
            documents = index.doc_count(),
            terms = kgram.term_count(),
            "opened index"
        );

        Ok(Self::new(index).with_kgram(kgram))
    }
}

impl<S: ByteStore> SearchEngine<S> {
    pub fn new(index: HashedIndex<S>) -> Self {
        Self {
            index,
            kgram: None,
            pagerank: PageRankScores::new(),
            combined_weight: DEFAULT_COMBINED_WEIGHT,
            shortest_first: true,
        }
    }

    #[must_use]
    pub fn with_kgram(mut self, kgram: KGramIndex) -> Self {
        self.kgram = Some(kgram);
        self
    }

    #[must_use]
    pub fn with_pagerank(mut self, pagerank: PageRankScores) -> Self {
        self.pagerank = pagerank;
        self
    }

    /// Sets the blend weight of combined ranking; it must be positive.
    pub fn with_combined_weight(mut self, weight: f64) -> Result<Self> {
        self.combined_weight = check_combined_weight(weight)?;
        Ok(self)
    }

    /// Intersect terms in the order given instead of shortest list first.
    #[must_use]
    pub const fn in_query_order(mut self) -> Self {
        self.shortest_first = false;
        self
    }

    pub const fn index(&self) -> &HashedIndex<S> {
        &self.index
    }

    pub const fn kgram(&self) -> Option<&KGramIndex> {
        self.kgram.as_ref()
    }

    /// Terms containing every one of `kgrams`. Candidates are not checked for
    /// the grams appearing contiguously.
    pub fn candidate_terms<T: AsRef<str>>(&self, kgrams: &[T]) -> Result<Vec<&str>> {
        self.kgram
            .as_ref()
            .ok_or_else(|| Error::Generic("No k-gram index loaded".to_string()))?
            .candidate_terms(kgrams)
    }

    /// `None` for an empty query, otherwise the (possibly empty) result.
    pub fn search(
        &mut self,
        query: &Query,
        query_type: QueryType,
        ranking: RankingType,
    ) -> Result<Option<SearchResult>> {
        if query.is_empty() {
            return Ok(None);
        }

        let result = match query_type {
            QueryType::Ranked => SearchResult::Ranked(self.ranked(query, ranking)?),
            _ if query.len() == 1 => SearchResult::Postings(
                self.index.lookup(&query.terms[0].term)?.unwrap_or_default(),
            ),
            QueryType::Intersection => SearchResult::Postings(self.intersection(query)?),
            QueryType::Phrase => SearchResult::Postings(self.phrase(query)?),
        };

        tracing::debug!(?query_type, ?ranking, hits = result.len(), "evaluated query");

        Ok(Some(result))
    }

    /// Postings of every query term, in query order. Unknown terms give
    /// `None`.
    fn postings(&mut self, query: &Query) -> Result<Vec<Option<PostingsList>>> {
        query
            .terms
            .iter()
            .map(|term| self.index.lookup(&term.term))
            .collect()
    }

    fn intersection(&mut self, query: &Query) -> Result<PostingsList> {
        let Some(mut lists) = self.postings(query)?.into_iter().collect::<Option<Vec<_>>>()
        else {
            return Ok(PostingsList::new());
        };

        if self.shortest_first {
            lists.sort_by_key(PostingsList::len);
        }

        let mut lists = lists.into_iter();
        let first = lists.next().unwrap_or_default();
        Ok(lists.fold(first, |answer, list| intersect(&answer, &list)))
    }

    fn phrase(&mut self, query: &Query) -> Result<PostingsList> {
        let Some(lists) = self.postings(query)?.into_iter().collect::<Option<Vec<_>>>() else {
            return Ok(PostingsList::new());
        };

        let mut lists = lists.into_iter();
        let first = lists.next().unwrap_or_default();
        Ok(lists.fold(first, |answer, list| {
            positional_intersect(&answer, &list, PHRASE_DISTANCE)
        }))
    }

    fn ranked(&mut self, query: &Query, ranking: RankingType) -> Result<Vec<ScoredDoc>> {
        let mut docs = match ranking {
            RankingType::TfIdf => self.fast_cosine_score(query)?,
            RankingType::PageRank => self.pagerank_score(query)?,
            RankingType::Combined => {
                let weight = self.combined_weight;
                let mut docs = self.fast_cosine_score(query)?;
                for doc in &mut docs {
                    doc.score = weight * self.pagerank_of(doc.doc_id) + doc.score / weight.powi(2);
                }
                docs
            }
        };

        sort_by_score_descending(&mut docs);
        Ok(docs)
    }

    /// `score[d] += w * ln(N / df) * tf / len[d]` over every query term.
    #[allow(clippy::cast_precision_loss)]
    fn fast_cosine_score(&mut self, query: &Query) -> Result<Vec<ScoredDoc>> {
        let n = self.index.doc_count() as f64;
        let mut scores: HashMap<DocId, f64> = HashMap::new();
        let mut order = Vec::new();

        for term in &query.terms {
            let Some(list) = self.index.lookup(&term.term)? else {
                continue;
            };

            let idf = (n / list.len() as f64).ln();
            for entry in &list {
                let length = self
                    .index
                    .docs()
                    .length(entry.doc_id)
                    .ok_or(Error::UnknownDocument(entry.doc_id))?;
                let tf = entry.tf() as f64;

                let score = scores.entry(entry.doc_id).or_insert_with(|| {
                    order.push(entry.doc_id);
                    0.0
                });
                *score += term.weight * idf * tf / f64::from(length);
            }
        }

        Ok(order
            .into_iter()
            .map(|doc_id| ScoredDoc::new(doc_id, scores[&doc_id]))
            .collect())
    }

    fn pagerank_score(&mut self, query: &Query) -> Result<Vec<ScoredDoc>> {
        let lists: Vec<PostingsList> = self.postings(query)?.into_iter().flatten().collect();

        Ok(union(&lists)
            .iter()
            .map(|entry| ScoredDoc::new(entry.doc_id, self.pagerank_of(entry.doc_id)))
            .collect())
    }

    /// PageRank of a document by its identifier; unranked documents score 0.
    fn pagerank_of(&self, doc_id: DocId) -> f64 {
        let Some(meta) = self.index.docs().get(doc_id) else {
            tracing::warn!(doc_id, "document has no metadata, pagerank 0");
            return 0.0;
        };

        self.pagerank.get(meta.identifier()).unwrap_or_else(|| {
            tracing::warn!(doc_id, name = meta.identifier(), "document has no pagerank, using 0");
            0.0
        })
    }
}
