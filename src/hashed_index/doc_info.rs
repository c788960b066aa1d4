use std::{
    collections::BTreeMap,
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use crate::{
    error::{Error, Result},
    postings::DocId,
};

const DOC_INFO_DELIMITER: char = ';';

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct DocMeta {
    pub name: String,
    pub length: u32,
}

impl DocMeta {
    pub const fn new(name: String, length: u32) -> Self {
        Self { name, length }
    }

    /// The part of the name after its final path separator.
    pub fn identifier(&self) -> &str {
        self.name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.name)
    }
}

/// Document names and token lengths, keyed by document id.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DocInfo {
    docs: BTreeMap<DocId, DocMeta>,
}

impl DocInfo {
    pub const fn new() -> Self {
        Self {
            docs: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, doc_id: DocId, meta: DocMeta) {
        self.docs.insert(doc_id, meta);
    }

    pub fn get(&self, doc_id: DocId) -> Option<&DocMeta> {
        self.docs.get(&doc_id)
    }

    pub fn length(&self, doc_id: DocId) -> Option<u32> {
        self.docs.get(&doc_id).map(|meta| meta.length)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DocId, &DocMeta)> {
        self.docs.iter().map(|(doc_id, meta)| (*doc_id, meta))
    }

    /// Writes `"<docID>;<docName>;<docLength>\n"` lines in doc id order.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        for (doc_id, meta) in &self.docs {
            writeln!(
                writer,
                "{doc_id}{DOC_INFO_DELIMITER}{}{DOC_INFO_DELIMITER}{}",
                meta.name, meta.length
            )?;
        }
        Ok(())
    }

    pub fn read_from<R: BufRead>(reader: R) -> Result<Self> {
        let mut info = Self::new();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let malformed = || Error::Malformed {
                file: "docInfo",
                line: i + 1,
            };

            // Names may contain the delimiter; id and length never do.
            let (doc_id, rest) = line.split_once(DOC_INFO_DELIMITER).ok_or_else(malformed)?;
            let (name, length) = rest.rsplit_once(DOC_INFO_DELIMITER).ok_or_else(malformed)?;

            info.insert(
                doc_id.trim().parse().map_err(|_| malformed())?,
                DocMeta::new(name.to_string(), length.trim().parse().map_err(|_| malformed())?),
            );
        }

        Ok(info)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Loads the docInfo file; a missing file yields empty metadata.
    pub fn load(path: &Path) -> Result<Self> {
        match File::open(path) {
            Ok(file) => Self::read_from(BufReader::new(file)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(
                    path = %path.display(),
                    "no docInfo file, starting without metadata"
                );
                Ok(Self::new())
            }
            Err(e) => Err(e.into()),
        }
    }
}
