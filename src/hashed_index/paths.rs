use std::{
    fs::{create_dir_all, File},
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::error::{Error, Result};

const DICTIONARY_FILE: &str = "dictionary";
const DATA_FILE: &str = "data";
const DOC_INFO_FILE: &str = "docInfo";
const TERMS_FILE: &str = "terms";

/// Locations of the files making up one committed index.
#[derive(Debug, Clone)]
pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn dictionary(&self) -> PathBuf {
        self.root.join(DICTIONARY_FILE)
    }

    pub fn data(&self) -> PathBuf {
        self.root.join(DATA_FILE)
    }

    pub fn doc_info(&self) -> PathBuf {
        self.root.join(DOC_INFO_FILE)
    }

    pub fn terms(&self) -> PathBuf {
        self.root.join(TERMS_FILE)
    }

    pub fn ensure_root(&self) -> Result<()> {
        create_dir_all(&self.root)?;
        Ok(())
    }

    pub fn save_terms<'a, I>(&self, terms: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut writer = BufWriter::new(File::create(self.terms())?);
        for term in terms {
            writeln!(writer, "{term}")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Terms of a committed index; empty when the terms file is absent.
    pub fn load_terms(&self) -> Result<Vec<String>> {
        let file = match File::open(self.terms()) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        BufReader::new(file)
            .lines()
            .enumerate()
            .filter(|(_, line)| line.as_ref().map_or(true, |line| !line.is_empty()))
            .map(|(i, line)| {
                let line = line?;
                if line.chars().any(char::is_whitespace) {
                    return Err(Error::Malformed {
                        file: TERMS_FILE,
                        line: i + 1,
                    });
                }
                Ok(line)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terms_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let paths = IndexPaths::new(dir.path());

        assert!(paths.load_terms().expect("Failed to load terms").is_empty());

        paths
            .save_terms(["cat", "dog"])
            .expect("Failed to save terms");
        assert_eq!(
            paths.load_terms().expect("Failed to load terms"),
            vec!["cat".to_string(), "dog".to_string()]
        );
    }
}
