use std::str::FromStr;

use clap::ValueEnum;

use crate::error::{Error, Result};

const WEIGHT_DELIMITER: char = '^';

#[derive(Debug, Clone, PartialEq)]
pub struct QueryTerm {
    pub term: String,
    pub weight: f64,
}

impl QueryTerm {
    pub fn new(term: impl Into<String>, weight: f64) -> Self {
        Self {
            term: term.into(),
            weight,
        }
    }
}

/// An ordered sequence of weighted terms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub terms: Vec<QueryTerm>,
}

impl Query {
    pub const fn new(terms: Vec<QueryTerm>) -> Self {
        Self { terms }
    }

    /// Every term with weight 1.
    pub fn from_terms<I, T>(terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self::new(
            terms
                .into_iter()
                .map(|term| QueryTerm::new(term, 1.0))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Rewrites every term, e.g. to apply the indexing normalization.
    #[must_use]
    pub fn map_terms(self, f: impl Fn(&str) -> String) -> Self {
        Self::new(
            self.terms
                .into_iter()
                .map(|term| QueryTerm::new(f(&term.term), term.weight))
                .collect(),
        )
    }
}

/// Whitespace separated terms, each optionally suffixed with `^weight`.
impl FromStr for Query {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.split_whitespace()
            .map(|word| match word.rsplit_once(WEIGHT_DELIMITER) {
                Some((term, weight)) if !term.is_empty() => weight
                    .parse()
                    .map(|weight| QueryTerm::new(term, weight))
                    .map_err(|_| Error::Generic(format!("Invalid weight in '{word}'"))),
                _ => Ok(QueryTerm::new(word, 1.0)),
            })
            .collect::<Result<Vec<_>>>()
            .map(Self::new)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum QueryType {
    Intersection,
    Phrase,
    Ranked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RankingType {
    TfIdf,
    PageRank,
    Combined,
}
