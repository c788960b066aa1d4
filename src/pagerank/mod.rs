//! PageRank by power iteration over a [`LinkGraph`].
//!
//! Each step computes `a'[i] = sum_j a[j] * P(j, i)` with
//!
//! ```text
//! P(j, i) = (1 - d) / out[j] + d / N   if j links to i
//!         = (1 - d) / N + d / N        if j has no outlinks
//!         = d / N                      otherwise
//! ```
//!
//! then renormalizes `a'` to sum to one. Iteration stops once the L1 change
//! drops below `epsilon` or after `max_iterations` steps.

pub mod link_graph;

use std::{
    collections::HashMap,
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use self::link_graph::LinkGraph;

const SCORE_DELIMITER: char = ':';
const TITLE_DELIMITER: char = ';';

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PageRankConfig {
    /// Probability of a random jump instead of following a link.
    pub damping: f64,
    pub epsilon: f64,
    pub max_iterations: usize,
    /// Compute the rows of each step on the rayon pool.
    pub parallel: bool,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping: 0.15,
            epsilon: 1e-4,
            max_iterations: 1000,
            parallel: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedDocument {
    pub name: String,
    pub probability: f64,
}

#[derive(Debug, Clone)]
pub struct PageRank {
    config: PageRankConfig,
}

impl PageRank {
    pub const fn new(config: PageRankConfig) -> Self {
        Self { config }
    }

    /// Stationary probabilities indexed by document number.
    pub fn iterate(&self, graph: &LinkGraph) -> Vec<f64> {
        let n = graph.len();
        if n == 0 {
            return Vec::new();
        }

        let mut current = vec![0.0; n];
        current[0] = 1.0;

        let mut iterations = 0;
        let mut change = f64::INFINITY;
        while iterations < self.config.max_iterations {
            let next = self.step(graph, &current);
            change = current
                .iter()
                .zip(&next)
                .map(|(before, after)| (before - after).abs())
                .sum();

            current = next;
            iterations += 1;

            if change < self.config.epsilon {
                break;
            }
        }

        tracing::info!(documents = n, iterations, change, "pagerank finished");

        current
    }

    /// One multiplication by the transition matrix, renormalized.
    pub fn step(&self, graph: &LinkGraph, a: &[f64]) -> Vec<f64> {
        let mut next: Vec<f64> = if self.config.parallel {
            (0..a.len())
                .into_par_iter()
                .map(|i| self.row(graph, a, i))
                .collect()
        } else {
            (0..a.len()).map(|i| self.row(graph, a, i)).collect()
        };

        let total: f64 = next.iter().sum();
        if total > 0.0 {
            for value in &mut next {
                *value /= total;
            }
        }

        next
    }

    #[allow(clippy::cast_precision_loss)]
    fn row(&self, graph: &LinkGraph, a: &[f64], i: usize) -> f64 {
        let d = self.config.damping;
        let jump = 1.0 / a.len() as f64;

        a.iter()
            .enumerate()
            .map(|(j, &mass)| {
                let out = graph.out_degree(j);
                let p = if out == 0 {
                    (1.0 - d) * jump + d * jump
                } else if graph.links_to(j, i) {
                    (1.0 - d) * (1.0 / out as f64) + d * jump
                } else {
                    d * jump
                };
                mass * p
            })
            .sum()
    }

    /// Documents with their probabilities, most probable first.
    pub fn rank(&self, graph: &LinkGraph) -> Vec<RankedDocument> {
        let mut ranking: Vec<RankedDocument> = self
            .iterate(graph)
            .into_iter()
            .enumerate()
            .filter_map(|(number, probability)| {
                graph.name(number).map(|name| RankedDocument {
                    name: name.to_string(),
                    probability,
                })
            })
            .collect();

        ranking.sort_by(|a, b| {
            b.probability
                .total_cmp(&a.probability)
                .then_with(|| a.name.cmp(&b.name))
        });

        ranking
    }
}

/// Reads `"<docNumber>;<title>"` lines mapping link-file names to titles.
pub fn load_titles(path: &Path) -> Result<HashMap<String, String>> {
    let reader = BufReader::new(File::open(path)?);
    let mut titles = HashMap::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let (name, title) = line.split_once(TITLE_DELIMITER).ok_or(Error::Malformed {
            file: "titles",
            line: i + 1,
        })?;
        titles.insert(name.to_string(), title.to_string());
    }

    Ok(titles)
}

/// PageRank probabilities keyed by document identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageRankScores {
    scores: HashMap<String, f64>,
}

impl PageRankScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys the ranking by name, renamed through `titles` where present.
    pub fn from_ranking(
        ranking: &[RankedDocument],
        titles: Option<&HashMap<String, String>>,
    ) -> Self {
        let scores = ranking
            .iter()
            .map(|doc| {
                let name = titles
                    .and_then(|titles| titles.get(&doc.name))
                    .unwrap_or(&doc.name);
                (name.clone(), doc.probability)
            })
            .collect();

        Self { scores }
    }

    pub fn insert(&mut self, name: String, probability: f64) {
        self.scores.insert(name, probability);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.scores.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Writes `"<name>:<probability>"` lines, most probable first.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut entries: Vec<_> = self.scores.iter().collect();
        entries.sort_by(|a, b| b.1.total_cmp(a.1).then_with(|| a.0.cmp(b.0)));

        for (name, probability) in entries {
            writeln!(writer, "{name}{SCORE_DELIMITER}{probability}")?;
        }
        Ok(())
    }

    pub fn read_from<R: BufRead>(reader: R) -> Result<Self> {
        let mut scores = Self::new();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let malformed = || Error::Malformed {
                file: "pagerank scores",
                line: i + 1,
            };
            // Names may contain ':', scores never do.
            let (name, probability) = line.rsplit_once(SCORE_DELIMITER).ok_or_else(malformed)?;
            scores.insert(
                name.to_string(),
                probability.trim().parse().map_err(|_| malformed())?,
            );
        }

        Ok(scores)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Loads a score file; a missing file yields an empty table.
    pub fn load(path: &Path) -> Result<Self> {
        match File::open(path) {
            Ok(file) => Self::read_from(BufReader::new(file)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "no pagerank scores, ranking without them");
                Ok(Self::new())
            }
            Err(e) => Err(e.into()),
        }
    }
}
