use crate::{
    error::{Error, Result},
    postings::Offset,
};
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};

/// Splits text into lowercase word tokens numbered by position.
pub struct Tokenizer {
    stemmer: Option<Stemmer>,
    regex: Regex,
}

impl Tokenizer {
    pub fn new(stem: bool) -> Result<Self> {
        Ok(Self {
            stemmer: stem.then(|| Stemmer::create(Algorithm::English)),
            regex: Regex::new(r"\b\w+\b")
                .map_err(|e| Error::Generic(format!("Failed to compile regex: {e}")))?,
        })
    }

    /// Normalized tokens with their offsets, counted from 0.
    pub fn tokenize(&self, text: &str) -> Vec<(String, Offset)> {
        self.regex
            .find_iter(text)
            .map(|token| self.normalize(token.as_str()))
            .zip(0..)
            .collect()
    }

    /// The form a single word is indexed under.
    pub fn normalize(&self, word: &str) -> String {
        let word = word.to_lowercase();
        match &self.stemmer {
            Some(stemmer) => stemmer.stem(&word).into_owned(),
            None => word,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_follow_token_order() {
        let tokenizer = Tokenizer::new(false).expect("Failed to create tokenizer");

        assert_eq!(
            tokenizer.tokenize("The cat, the HAT."),
            vec![
                ("the".to_string(), 0),
                ("cat".to_string(), 1),
                ("the".to_string(), 2),
                ("hat".to_string(), 3),
            ]
        );
    }

    #[test]
    fn stemming_is_optional() {
        let plain = Tokenizer::new(false).expect("Failed to create tokenizer");
        let stemmed = Tokenizer::new(true).expect("Failed to create tokenizer");

        assert_eq!(plain.normalize("Running"), "running");
        assert_eq!(stemmed.normalize("Running"), "run");
    }
}
