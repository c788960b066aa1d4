use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    hashed_index::dictionary::DEFAULT_TABLE_SIZE,
    pagerank::PageRankConfig,
    search::engine::{check_combined_weight, DEFAULT_COMBINED_WEIGHT},
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub index_dir: PathBuf,
    /// Dictionary slots before growth.
    pub table_size: u64,
    pub kgram_k: usize,
    pub combined_weight: f64,
    /// Index and query with English stemming.
    pub stem: bool,
    /// `name:score` file read by the search engine.
    pub pagerank_scores: Option<PathBuf>,
    pub pagerank: PageRankConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index_dir: PathBuf::from("./index"),
            table_size: DEFAULT_TABLE_SIZE,
            kgram_k: 2,
            combined_weight: DEFAULT_COMBINED_WEIGHT,
            stem: false,
            pagerank_scores: None,
            pagerank: PageRankConfig::default(),
        }
    }
}

impl Config {
    /// Reads a JSON config; absent fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        check_combined_weight(config.combined_weight)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "kgram_k": 3, "pagerank": { "parallel": true } }"#)
                .expect("Failed to parse config");

        assert_eq!(config.kgram_k, 3);
        assert!(config.pagerank.parallel);
        assert!((config.pagerank.damping - 0.15).abs() < f64::EPSILON);
        assert_eq!(config.table_size, 611_953);
        assert_eq!(config.index_dir, PathBuf::from("./index"));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "stem": true, "combined_weight": 2.5 }"#)
            .expect("Failed to write config");

        let config = Config::load(&path).expect("Failed to load config");

        assert!(config.stem);
        assert!((config.combined_weight - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn load_rejects_zero_combined_weight() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "combined_weight": 0 }"#).expect("Failed to write config");

        assert!(Config::load(&path).is_err());
    }
}
