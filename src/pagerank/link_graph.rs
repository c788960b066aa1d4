use std::{
    collections::{BTreeSet, HashMap},
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::error::Result;

const TITLE_DELIMITER: char = ';';
const LINK_DELIMITER: char = ',';

/// Directed link graph over documents numbered in first-seen order.
#[derive(Debug, Default, Clone)]
pub struct LinkGraph {
    names: Vec<String>,
    numbers: HashMap<String, usize>,
    links: Vec<BTreeSet<usize>>,
}

impl LinkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    /// Reads `"<title>;<outlink1>,<outlink2>,...\n"` lines.
    ///
    /// Lines without a `;` are logged and skipped.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut graph = Self::new();
        let mut skipped = 0;

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let Some((title, outlinks)) = line.split_once(TITLE_DELIMITER) else {
                tracing::warn!(line = i + 1, "skipping link line without '{TITLE_DELIMITER}'");
                skipped += 1;
                continue;
            };

            let from = graph.document(title);
            for target in outlinks.split(LINK_DELIMITER).filter(|t| !t.is_empty()) {
                let to = graph.document(target);
                graph.add_link(from, to);
            }
        }

        tracing::info!(documents = graph.len(), skipped, "read link graph");

        Ok(graph)
    }

    /// Number of the document called `name`, assigning the next one if new.
    pub fn document(&mut self, name: &str) -> usize {
        if let Some(&number) = self.numbers.get(name) {
            return number;
        }

        let number = self.names.len();
        self.names.push(name.to_string());
        self.numbers.insert(name.to_string(), number);
        self.links.push(BTreeSet::new());
        number
    }

    /// Adds the edge `from -> to`; repeated links collapse into one.
    pub fn add_link(&mut self, from: usize, to: usize) {
        self.links[from].insert(to);
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, number: usize) -> Option<&str> {
        self.names.get(number).map(String::as_str)
    }

    pub fn number(&self, name: &str) -> Option<usize> {
        self.numbers.get(name).copied()
    }

    pub fn out_degree(&self, number: usize) -> usize {
        self.links.get(number).map_or(0, BTreeSet::len)
    }

    pub fn links_to(&self, from: usize, to: usize) -> bool {
        self.links.get(from).is_some_and(|links| links.contains(&to))
    }

    pub fn outlinks(&self, from: usize) -> impl Iterator<Item = usize> + '_ {
        self.links.get(from).into_iter().flatten().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_follow_first_appearance() {
        let graph = LinkGraph::from_reader("1;2,3\n3;1\n".as_bytes()).expect("Failed to read");

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.number("1"), Some(0));
        assert_eq!(graph.number("2"), Some(1));
        assert_eq!(graph.number("3"), Some(2));
        assert!(graph.links_to(2, 0));
        assert_eq!(graph.out_degree(1), 0);
    }

    #[test]
    fn duplicate_links_collapse() {
        let graph = LinkGraph::from_reader("a;b,b,,b\n".as_bytes()).expect("Failed to read");

        assert_eq!(graph.out_degree(0), 1);
        assert_eq!(graph.outlinks(0).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let graph = LinkGraph::from_reader("a;b\nno delimiter here\nb;a\n".as_bytes())
            .expect("Failed to read");

        assert_eq!(graph.len(), 2);
        assert!(graph.links_to(1, 0));
    }
}
