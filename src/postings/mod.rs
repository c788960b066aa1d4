mod scored;

use std::slice::Iter;

use crate::error::{Error, Result};

pub use self::scored::{sort_by_score_descending, ScoredDoc};

pub type DocId = u32;
pub type Offset = u32;

/// One term's occurrences inside one document.
///
/// `positions` is empty for entries built without offsets (candidate sets,
/// unions), and strictly increasing otherwise.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct PostingsEntry {
    pub doc_id: DocId,
    pub positions: Vec<Offset>,
}

impl PostingsEntry {
    pub const fn new(doc_id: DocId) -> Self {
        Self {
            doc_id,
            positions: Vec::new(),
        }
    }

    pub const fn with_positions(doc_id: DocId, positions: Vec<Offset>) -> Self {
        Self { doc_id, positions }
    }

    /// Number of occurrences of the term in this document.
    pub fn tf(&self) -> usize {
        self.positions.len()
    }
}

/// Postings of one term, ascending by `doc_id`.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct PostingsList {
    entries: Vec<PostingsEntry>,
}

impl PostingsList {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&PostingsEntry> {
        self.entries.get(i)
    }

    pub fn iter(&self) -> Iter<'_, PostingsEntry> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[PostingsEntry] {
        &self.entries
    }

    pub fn doc_ids(&self) -> Vec<DocId> {
        self.entries.iter().map(|entry| entry.doc_id).collect()
    }

    /// Records an occurrence of the term at `offset` in `doc_id`.
    ///
    /// Insertions for one term must arrive grouped by increasing `doc_id`:
    /// only the most recent entry is ever extended.
    pub fn add(&mut self, doc_id: DocId, offset: Offset) {
        match self.entries.last_mut() {
            Some(last) if last.doc_id == doc_id => last.positions.push(offset),
            _ => self
                .entries
                .push(PostingsEntry::with_positions(doc_id, vec![offset])),
        }
    }

    /// Adds a positions-free entry unless `doc_id` is already present.
    ///
    /// Linear in the list length, meant for small candidate lists.
    pub fn add_doc(&mut self, doc_id: DocId) {
        if !self.entries.iter().any(|entry| entry.doc_id == doc_id) {
            self.entries.push(PostingsEntry::new(doc_id));
        }
    }

    pub fn push(&mut self, entry: PostingsEntry) {
        self.entries.push(entry);
    }

    /// Encodes the list as one `"<docID> <pos1> <pos2> ...\n"` line per entry.
    pub fn serialize(&self) -> String {
        self.entries
            .iter()
            .map(|entry| {
                std::iter::once(entry.doc_id)
                    .chain(entry.positions.iter().copied())
                    .map(|number| number.to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
                    + "\n"
            })
            .collect()
    }

    pub fn deserialize(block: &str) -> Result<Self> {
        let mut list = Self::new();

        for line in block.lines().filter(|line| !line.trim().is_empty()) {
            let mut fields = line.split_whitespace();
            let doc_id = parse_number(fields.next(), line)?;
            let positions = fields
                .map(|field| parse_number(Some(field), line))
                .collect::<Result<Vec<Offset>>>()?;

            list.push(PostingsEntry::with_positions(doc_id, positions));
        }

        Ok(list)
    }
}

impl FromIterator<PostingsEntry> for PostingsList {
    fn from_iter<I: IntoIterator<Item = PostingsEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PostingsList {
    type Item = &'a PostingsEntry;
    type IntoIter = Iter<'a, PostingsEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for PostingsList {
    type Item = PostingsEntry;
    type IntoIter = std::vec::IntoIter<PostingsEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

fn parse_number(field: Option<&str>, line: &str) -> Result<u32> {
    field
        .ok_or_else(|| Error::MalformedPostings(format!("empty line '{line}'")))?
        .parse()
        .map_err(|_| Error::MalformedPostings(format!("couldn't parse '{line}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_groups_offsets_by_document() {
        let mut list = PostingsList::new();
        list.add(0, 1);
        list.add(0, 4);
        list.add(3, 2);

        assert_eq!(
            list.entries(),
            &[
                PostingsEntry::with_positions(0, vec![1, 4]),
                PostingsEntry::with_positions(3, vec![2]),
            ]
        );
    }

    #[test]
    fn add_doc_skips_duplicates() {
        let mut list = PostingsList::new();
        list.add_doc(5);
        list.add_doc(2);
        list.add_doc(5);

        assert_eq!(list.doc_ids(), vec![5, 2]);
        assert!(list.iter().all(|entry| entry.positions.is_empty()));
    }

    #[test]
    fn serialize_text_block() {
        let mut list = PostingsList::new();
        list.add(0, 0);
        list.add(1, 0);
        list.add(1, 7);

        let block = list.serialize();
        assert_eq!(block, "0 0\n1 0 7\n");
        assert_eq!(
            PostingsList::deserialize(&block).expect("Failed to parse block"),
            list
        );
    }

    #[test]
    fn deserialize_tolerates_trailing_spaces() {
        let list = PostingsList::deserialize("4 1 2 \n9 \n").expect("Failed to parse block");

        assert_eq!(
            list.entries(),
            &[
                PostingsEntry::with_positions(4, vec![1, 2]),
                PostingsEntry::new(9),
            ]
        );
    }

    #[test]
    fn deserialize_rejects_garbage() {
        assert!(matches!(
            PostingsList::deserialize("4 x\n"),
            Err(Error::MalformedPostings(_))
        ));
    }
}
