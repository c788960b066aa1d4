//! Character k-gram index over the term vocabulary.
//!
//! Each term is padded as `^term$` and every window of `k` characters maps
//! to the ids of the terms containing it. Intersecting the sets for several
//! k-grams yields *candidate* terms: the grams are not checked to occur
//! contiguously or in order within a candidate.

use std::collections::HashMap;

use crate::error::{Error, Result};

pub type TermId = u32;

const START_MARKER: char = '^';
const END_MARKER: char = '$';

#[derive(Debug, Clone)]
pub struct KGramIndex {
    k: usize,
    id_to_term: Vec<String>,
    term_to_id: HashMap<String, TermId>,
    index: HashMap<String, Vec<TermId>>,
}

impl KGramIndex {
    pub fn new(k: usize) -> Result<Self> {
        if k == 0 {
            return Err(Error::InvalidK(k));
        }

        Ok(Self {
            k,
            id_to_term: Vec::new(),
            term_to_id: HashMap::new(),
            index: HashMap::new(),
        })
    }

    pub fn from_terms<I, T>(k: usize, terms: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut index = Self::new(k)?;
        for term in terms {
            index.insert(term.as_ref());
        }
        Ok(index)
    }

    pub const fn k(&self) -> usize {
        self.k
    }

    pub fn term_count(&self) -> usize {
        self.id_to_term.len()
    }

    pub fn kgram_count(&self) -> usize {
        self.index.len()
    }

    /// Adds `term` under a fresh id; known terms are left untouched.
    pub fn insert(&mut self, term: &str) {
        if self.term_to_id.contains_key(term) {
            return;
        }

        #[allow(clippy::cast_possible_truncation)]
        let id = self.id_to_term.len() as TermId;
        self.id_to_term.push(term.to_string());
        self.term_to_id.insert(term.to_string(), id);

        for kgram in self.kgrams_of(term) {
            let postings = self.index.entry(kgram).or_default();
            // Ids are handed out in increasing order, so a repeat can only be the tail.
            if postings.last() != Some(&id) {
                postings.push(id);
            }
        }
    }

    /// The k-grams of `^term$`, in order, repeats included.
    pub fn kgrams_of(&self, term: &str) -> Vec<String> {
        let padded: Vec<char> = std::iter::once(START_MARKER)
            .chain(term.chars())
            .chain(std::iter::once(END_MARKER))
            .collect();

        padded
            .windows(self.k)
            .map(|window| window.iter().collect())
            .collect()
    }

    /// Term ids containing `kgram`, ascending.
    pub fn postings(&self, kgram: &str) -> Option<&[TermId]> {
        self.index.get(kgram).map(Vec::as_slice)
    }

    pub fn id_by_term(&self, term: &str) -> Option<TermId> {
        self.term_to_id.get(term).copied()
    }

    pub fn term_by_id(&self, id: TermId) -> Option<&str> {
        self.id_to_term.get(id as usize).map(String::as_str)
    }

    /// Ids of the terms that contain every k-gram in `kgrams`.
    pub fn candidates<S: AsRef<str>>(&self, kgrams: &[S]) -> Result<Vec<TermId>> {
        let mut result: Option<Vec<TermId>> = None;

        for kgram in kgrams {
            let kgram = kgram.as_ref();
            let len = kgram.chars().count();
            if len != self.k {
                return Err(Error::KGramLength {
                    kgram: kgram.to_string(),
                    len,
                    k: self.k,
                });
            }

            let postings = self.postings(kgram);
            result = Some(match result {
                None => postings.map(<[TermId]>::to_vec).unwrap_or_default(),
                Some(previous) => intersect(Some(previous.as_slice()), postings),
            });
        }

        Ok(result.unwrap_or_default())
    }

    /// Like [`KGramIndex::candidates`], resolved to term strings.
    pub fn candidate_terms<S: AsRef<str>>(&self, kgrams: &[S]) -> Result<Vec<&str>> {
        Ok(self
            .candidates(kgrams)?
            .into_iter()
            .filter_map(|id| self.term_by_id(id))
            .collect())
    }
}

/// Two-pointer merge of two ascending id lists; empty if either is absent.
pub fn intersect(a: Option<&[TermId]>, b: Option<&[TermId]>) -> Vec<TermId> {
    let (Some(a), Some(b)) = (a, b) else {
        return Vec::new();
    };

    let mut result = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Equal => {
                result.push(a[i]);
                i += 1;
                j += 1;
            }
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_k_is_rejected() {
        assert!(matches!(KGramIndex::new(0), Err(Error::InvalidK(0))));
    }

    #[test]
    fn kgrams_are_padded() {
        let index = KGramIndex::new(2).expect("Failed to create index");

        assert_eq!(index.kgrams_of("cat"), vec!["^c", "ca", "at", "t$"]);
        assert!(KGramIndex::new(6)
            .expect("Failed to create index")
            .kgrams_of("cat")
            .is_empty());
    }

    #[test]
    fn insert_is_idempotent() {
        let mut index = KGramIndex::new(2).expect("Failed to create index");
        index.insert("banana");
        let kgrams = index.kgram_count();
        let an = index.postings("an").expect("Missing kgram").to_vec();

        index.insert("banana");

        assert_eq!(index.term_count(), 1);
        assert_eq!(index.id_by_term("banana"), Some(0));
        assert_eq!(index.kgram_count(), kgrams);
        assert_eq!(index.postings("an").expect("Missing kgram"), an.as_slice());
        // "an" occurs twice in "banana" but is listed once.
        assert_eq!(an, vec![0]);
    }

    #[test]
    fn ids_are_sequential() {
        let index =
            KGramIndex::from_terms(3, ["cat", "cart", "dog"]).expect("Failed to create index");

        assert_eq!(index.id_by_term("dog"), Some(2));
        assert_eq!(index.term_by_id(1), Some("cart"));
        assert_eq!(index.postings("^ca"), Some([0, 1].as_slice()));
    }

    #[test]
    fn intersect_two_pointer() {
        assert_eq!(
            intersect(Some(&[1, 3, 5, 8][..]), Some(&[0, 3, 4, 8, 9][..])),
            vec![3, 8]
        );
        assert!(intersect(Some(&[1, 2][..]), None).is_empty());
        assert!(intersect(None, Some(&[1, 2][..])).is_empty());
    }

    #[test]
    fn candidates_fold_over_kgrams() {
        let index = KGramIndex::from_terms(2, ["cat", "act", "dog", "catalog"])
            .expect("Failed to create index");

        let terms = index
            .candidate_terms(&["ca", "at"])
            .expect("Failed to find candidates");
        assert_eq!(terms, vec!["cat", "catalog"]);

        // No term contains "atca", yet both of its outer grams match.
        let terms = index
            .candidate_terms(&["at", "ca"])
            .expect("Failed to find candidates");
        assert_eq!(terms, vec!["cat", "catalog"]);

        assert!(index
            .candidates(&["zz"])
            .expect("Failed to find candidates")
            .is_empty());
    }

    #[test]
    fn candidates_check_kgram_length() {
        let index = KGramIndex::from_terms(2, ["cat"]).expect("Failed to create index");

        assert!(matches!(
            index.candidates(&["cat"]),
            Err(Error::KGramLength { len: 3, k: 2, .. })
        ));
    }
}
