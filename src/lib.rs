pub mod config;
pub mod error;
pub mod hashed_index;
pub mod indexer;
pub mod kgram;
pub mod pagerank;
pub mod postings;
pub mod search;
pub mod tokenizer;
