use crate::postings::DocId;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Generic {0}")]
    Generic(String),

    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error("Malformed postings block: {0}")]
    MalformedPostings(String),

    #[error("Malformed line {line} in {file}")]
    Malformed { file: &'static str, line: usize },

    #[error("Corrupt dictionary: {0}")]
    CorruptDictionary(String),

    #[error("Terms '{first}' and '{second}' share checker {checker} on one probe chain")]
    CheckerCollision {
        first: String,
        second: String,
        checker: i32,
    },

    #[error("Dictionary table is full ({0} slots)")]
    TableFull(u64),

    #[error("K-gram size must be positive, got {0}")]
    InvalidK(usize),

    #[error("K-gram '{kgram}' has length {len}, expected {k}")]
    KGramLength { kgram: String, len: usize, k: usize },

    #[error("Document {0} has no metadata")]
    UnknownDocument(DocId),
}

pub type Result<T> = core::result::Result<T, Error>;
