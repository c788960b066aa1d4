//! Persistent inverted index: a hashed dictionary file pointing into an
//! append-only data file of postings blocks.
//!
//! Terms are staged in memory by [`IndexBuilder`] and written in a single
//! [`IndexBuilder::commit`], which hands back a read-only [`HashedIndex`].

pub mod byte_store;
pub mod dictionary;
pub mod doc_info;
pub mod paths;

use std::collections::{HashMap, HashSet};

use crate::{
    error::{Error, Result},
    postings::{DocId, Offset, PostingsList},
};

use self::{
    byte_store::{ByteStore, FileStore},
    dictionary::{checker, next_prime, slot_hash, table_capacity, DictionaryEntry, ENTRY_SIZE},
    doc_info::{DocInfo, DocMeta},
    paths::IndexPaths,
};

const MAX_REGROWTHS: usize = 8;

/// Build phase: owns the staging map and both stores until commit.
pub struct IndexBuilder<S: ByteStore = FileStore> {
    dictionary: S,
    data: S,
    paths: Option<IndexPaths>,
    table_size: u64,
    staging: HashMap<String, PostingsList>,
    docs: DocInfo,
}

impl IndexBuilder<FileStore> {
    /// Starts a fresh index under `paths.root`, truncating any previous files.
    pub fn create(paths: IndexPaths, table_size: u64) -> Result<Self> {
        paths.ensure_root()?;

        let dictionary = FileStore::create(&paths.dictionary())?;
        let data = FileStore::create(&paths.data())?;

        let mut builder = Self::with_stores(dictionary, data, table_size);
        builder.paths = Some(paths);
        Ok(builder)
    }
}

impl<S: ByteStore> IndexBuilder<S> {
    pub fn with_stores(dictionary: S, data: S, table_size: u64) -> Self {
        Self {
            dictionary,
            data,
            paths: None,
            table_size,
            staging: HashMap::new(),
            docs: DocInfo::new(),
        }
    }

    /// Records one occurrence of `term`; calls must follow document order.
    pub fn insert(&mut self, term: &str, doc_id: DocId, offset: Offset) {
        if let Some(list) = self.staging.get_mut(term) {
            list.add(doc_id, offset);
        } else {
            let mut list = PostingsList::new();
            list.add(doc_id, offset);
            self.staging.insert(term.to_string(), list);
        }
    }

    pub fn set_document(&mut self, doc_id: DocId, name: String, length: u32) {
        self.docs.insert(doc_id, DocMeta::new(name, length));
    }

    pub fn staged(&self, term: &str) -> Option<&PostingsList> {
        self.staging.get(term)
    }

    pub fn term_count(&self) -> usize {
        self.staging.len()
    }

    pub const fn docs(&self) -> &DocInfo {
        &self.docs
    }

    /// Writes every staged postings list to the data file and its slot to
    /// the dictionary, then reopens the result for lookups.
    ///
    /// Two terms whose checkers meet on one probe chain move the whole
    /// table to a larger prime, at most `MAX_REGROWTHS` times.
    pub fn commit(mut self) -> Result<HashedIndex<S>> {
        let mut terms: Vec<String> = self.staging.keys().cloned().collect();
        terms.sort_unstable();

        let mut table_size = table_capacity(self.table_size, terms.len() as u64);
        if table_size != self.table_size {
            tracing::warn!(
                configured = self.table_size,
                table_size,
                terms = terms.len(),
                "growing dictionary table"
            );
        }

        let mut regrowths = 0;
        let (slots, collisions) = loop {
            match place(&terms, table_size) {
                Err(Error::CheckerCollision {
                    first,
                    second,
                    checker,
                }) if regrowths < MAX_REGROWTHS => {
                    let grown = next_prime(table_size.saturating_mul(2));
                    tracing::warn!(
                        %first,
                        %second,
                        checker,
                        table_size,
                        grown,
                        "checker collision, growing dictionary table"
                    );
                    table_size = grown;
                    regrowths += 1;
                }
                placed => break placed?,
            }
        };

        self.dictionary.set_len(0)?;
        self.dictionary.set_len(table_size * ENTRY_SIZE)?;
        self.data.set_len(0)?;

        let mut free = 0;
        for (term, slot) in terms.iter().zip(slots) {
            let block = self.staging[term].serialize();
            let byte_length = u32::try_from(block.len()).map_err(|_| {
                Error::Generic(format!("postings block for '{term}' exceeds 4 GiB"))
            })?;

            self.data.write_at(free, block.as_bytes())?;
            self.dictionary.write_at(
                slot * ENTRY_SIZE,
                &DictionaryEntry::new(free, byte_length, checker(term)).encode(),
            )?;

            free += u64::from(byte_length);
        }

        self.dictionary.flush()?;
        self.data.flush()?;

        if let Some(paths) = &self.paths {
            self.docs.save(&paths.doc_info())?;
            paths.save_terms(terms.iter().map(String::as_str))?;
        }

        tracing::info!(
            terms = terms.len(),
            documents = self.docs.len(),
            table_size,
            collisions,
            regrowths,
            data_bytes = free,
            "committed index"
        );

        Ok(HashedIndex {
            dictionary: self.dictionary,
            data: self.data,
            table_size,
            docs: self.docs,
            vocabulary: terms.into_iter().collect(),
        })
    }
}

/// Slot of every term under linear probing, plus the number of terms that
/// left their home slot.
fn place(terms: &[String], table_size: u64) -> Result<(Vec<u64>, usize)> {
    // slot -> index into `terms` of the occupant
    let mut used: HashMap<u64, usize> = HashMap::with_capacity(terms.len());
    let mut slots = Vec::with_capacity(terms.len());
    let mut collisions = 0;

    for (i, term) in terms.iter().enumerate() {
        let term_checker = checker(term);
        let home = slot_hash(term, table_size);

        let mut slot = home;
        let mut probes = 0;
        while let Some(&occupant) = used.get(&slot) {
            if checker(&terms[occupant]) == term_checker {
                return Err(Error::CheckerCollision {
                    first: terms[occupant].clone(),
                    second: term.clone(),
                    checker: term_checker,
                });
            }

            probes += 1;
            if probes >= table_size {
                return Err(Error::TableFull(table_size));
            }
            slot = (home + probes) % table_size;
        }
        if probes > 0 {
            collisions += 1;
        }

        used.insert(slot, i);
        slots.push(slot);
    }

    Ok((slots, collisions))
}

/// Read phase: random-access lookups into committed files.
pub struct HashedIndex<S: ByteStore = FileStore> {
    dictionary: S,
    data: S,
    table_size: u64,
    docs: DocInfo,
    vocabulary: HashSet<String>,
}

impl HashedIndex<FileStore> {
    /// Opens a committed index read-only. Each call gets its own handles.
    pub fn open(paths: &IndexPaths) -> Result<Self> {
        let dictionary = FileStore::open(&paths.dictionary())?;
        let data = FileStore::open(&paths.data())?;
        let docs = DocInfo::load(&paths.doc_info())?;
        let vocabulary = paths.load_terms()?.into_iter().collect();

        Self::from_stores(dictionary, data, docs, vocabulary)
    }
}

impl<S: ByteStore> HashedIndex<S> {
    /// Only terms in `vocabulary` are looked up in the dictionary.
    pub fn from_stores(
        mut dictionary: S,
        data: S,
        docs: DocInfo,
        vocabulary: HashSet<String>,
    ) -> Result<Self> {
        let len = dictionary.len()?;
        if len % ENTRY_SIZE != 0 {
            return Err(Error::CorruptDictionary(format!(
                "file length {len} is not a multiple of {ENTRY_SIZE}"
            )));
        }

        Ok(Self {
            dictionary,
            data,
            table_size: len / ENTRY_SIZE,
            docs,
            vocabulary,
        })
    }

    pub const fn table_size(&self) -> u64 {
        self.table_size
    }

    pub const fn docs(&self) -> &DocInfo {
        &self.docs
    }

    pub fn doc_count(&self) -> usize {
        self.docs.len()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.vocabulary.contains(term)
    }

    /// Committed terms in sorted order.
    pub fn terms(&self) -> Vec<&str> {
        let mut terms: Vec<&str> = self.vocabulary.iter().map(String::as_str).collect();
        terms.sort_unstable();
        terms
    }

    /// Postings for `term`, or `None` if it was never committed.
    pub fn lookup(&mut self, term: &str) -> Result<Option<PostingsList>> {
        let Some(entry) = self.find_entry(term)? else {
            return Ok(None);
        };

        let mut buffer = vec![0; entry.byte_length as usize];
        self.data.read_at(entry.data_offset, &mut buffer)?;

        let block = String::from_utf8(buffer).map_err(|e| {
            Error::MalformedPostings(format!("block for '{term}' is not utf-8: {e}"))
        })?;

        PostingsList::deserialize(&block).map(Some)
    }

    fn find_entry(&mut self, term: &str) -> Result<Option<DictionaryEntry>> {
        // A checker only tells committed terms apart from each other.
        if self.table_size == 0 || !self.contains(term) {
            return Ok(None);
        }

        let term_checker = checker(term);
        let home = slot_hash(term, self.table_size);

        for probes in 0..self.table_size {
            let slot = (home + probes) % self.table_size;
            let entry = self.read_entry(slot)?;

            if entry.is_empty() {
                return Ok(None);
            }
            if entry.checker == term_checker {
                return Ok(Some(entry));
            }
        }

        Ok(None)
    }

    fn read_entry(&mut self, slot: u64) -> Result<DictionaryEntry> {
        let mut bytes = [0; ENTRY_SIZE as usize];
        self.dictionary.read_at(slot * ENTRY_SIZE, &mut bytes)?;
        DictionaryEntry::decode(&bytes)
    }
}
