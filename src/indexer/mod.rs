//! Walks a corpus directory and feeds every document through the tokenizer
//! into an [`IndexBuilder`] and a [`KGramIndex`].

use std::{
    fs::{self, File},
    io::{self, BufReader},
    path::Path,
};

use scraper::Html;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::{
    error::{Error, Result},
    hashed_index::{byte_store::ByteStore, HashedIndex, IndexBuilder},
    kgram::KGramIndex,
    postings::DocId,
    tokenizer::Tokenizer,
};

/// A crawled page saved as JSON.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct ScrapeData {
    url: String,
    content: String,
}

/// Name and plain text of one corpus file.
#[derive(Debug, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    pub text: String,
}

pub struct Indexer {
    tokenizer: Tokenizer,
    kgram: KGramIndex,
}

impl Indexer {
    pub const fn new(tokenizer: Tokenizer, kgram: KGramIndex) -> Self {
        Self { tokenizer, kgram }
    }

    /// Indexes every file under `corpus` in path order, numbering documents
    /// from 0, and commits the builder.
    pub fn index_corpus<S: ByteStore>(
        mut self,
        corpus: &Path,
        mut builder: IndexBuilder<S>,
    ) -> Result<(HashedIndex<S>, KGramIndex)> {
        let mut doc_id: DocId = 0;

        for entry in WalkDir::new(corpus).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::Generic(format!("Failed to walk corpus: {e}")))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let Some(document) = read_document(entry.path())? else {
                continue;
            };

            self.index_document(&mut builder, doc_id, document)?;
            doc_id += 1;
        }

        tracing::info!(
            corpus = %corpus.display(),
            documents = doc_id,
            terms = builder.term_count(),
            "indexed corpus"
        );

        Ok((builder.commit()?, self.kgram))
    }

    /// Inserts one document's tokens and records its length.
    pub fn index_document<S: ByteStore>(
        &mut self,
        builder: &mut IndexBuilder<S>,
        doc_id: DocId,
        document: Document,
    ) -> Result<()> {
        let tokens = self.tokenizer.tokenize(&document.text);
        let length = u32::try_from(tokens.len())
            .map_err(|_| Error::Generic(format!("'{}' has too many tokens", document.name)))?;

        for (term, offset) in &tokens {
            builder.insert(term, doc_id, *offset);
            self.kgram.insert(term);
        }
        builder.set_document(doc_id, document.name, length);

        tracing::debug!(doc_id, length, "indexed document");
        Ok(())
    }
}

/// Plain text of a corpus file: HTML is stripped, scraped JSON pages are
/// named by their URL. Files that are not UTF-8 text are skipped.
pub fn read_document(path: &Path) -> Result<Option<Document>> {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_ascii_lowercase);

    let document = match extension.as_deref() {
        Some("json") => {
            let data: ScrapeData = serde_json::from_reader(BufReader::new(File::open(path)?))?;
            Document {
                name: data.url,
                text: html_text(&data.content),
            }
        }
        Some("html" | "htm") => match read_text(path)? {
            Some(content) => Document {
                name: path.display().to_string(),
                text: html_text(&content),
            },
            None => return Ok(None),
        },
        _ => match read_text(path)? {
            Some(text) => Document {
                name: path.display().to_string(),
                text,
            },
            None => return Ok(None),
        },
    };

    Ok(Some(document))
}

fn read_text(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
            tracing::warn!(path = %path.display(), "skipping file that is not UTF-8");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn html_text(content: &str) -> String {
    Html::parse_document(content)
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ")
}
