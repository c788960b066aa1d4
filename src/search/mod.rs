pub mod engine;
pub mod merge;
pub mod query;
pub mod search_result;

pub use self::{
    engine::SearchEngine,
    query::{Query, QueryTerm, QueryType, RankingType},
    search_result::SearchResult,
};
