//! Append-only journal persisted as a single CSV file.
//!
//! Every append reloads the whole file, adds one row, and rewrites the file
//! from the combined set. There is no locking: two processes appending at the
//! same time race and the last writer wins.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::core::types::{COLUMNS, JournalEntry};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("read journal {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("write journal {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("encode journal row: {0}")]
    Encode(#[source] csv::Error),
    /// The file exists but does not have the expected shape.
    #[error("malformed journal {}: {message}", path.display())]
    Format { path: PathBuf, message: String },
}

/// Full contents of the journal file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Journal {
    /// Column names, always [`COLUMNS`] for a well-formed store.
    pub columns: Vec<String>,
    /// Entries in file order (oldest first).
    pub entries: Vec<JournalEntry>,
}

impl Journal {
    pub fn empty() -> Self {
        Self {
            columns: COLUMNS.iter().map(|c| c.to_string()).collect(),
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Handle to the journal CSV at a fixed path.
#[derive(Debug, Clone)]
pub struct JournalStore {
    path: PathBuf,
}

impl JournalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every entry. A missing file is an empty journal.
    pub fn load_all(&self) -> Result<Journal, StoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "journal missing, starting empty");
                return Ok(Journal::empty());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let mut reader = csv::Reader::from_reader(file);
        let headers = reader.headers().map_err(|err| self.csv_error(err))?.clone();
        if !headers.iter().eq(COLUMNS.iter().copied()) {
            return Err(self.format_error(format!(
                "expected columns [{}], found [{}]",
                COLUMNS.join(","),
                headers.iter().collect::<Vec<_>>().join(",")
            )));
        }

        let mut entries = Vec::new();
        for (idx, row) in reader.deserialize::<JournalEntry>().enumerate() {
            let entry = row.map_err(|err| match self.csv_error(err) {
                StoreError::Format { path, message } => StoreError::Format {
                    path,
                    message: format!("row {}: {message}", idx + 1),
                },
                other => other,
            })?;
            entries.push(entry);
        }

        debug!(path = %self.path.display(), entries = entries.len(), "journal loaded");
        Ok(Journal {
            columns: headers.iter().map(str::to_string).collect(),
            entries,
        })
    }

    /// Append `entry` as the last row and rewrite the whole file.
    pub fn append(&self, entry: &JournalEntry) -> Result<(), StoreError> {
        let mut journal = self.load_all()?;
        journal.entries.push(entry.clone());
        self.write_all(&journal.entries)?;
        info!(
            path = %self.path.display(),
            date = %entry.date,
            entries = journal.len(),
            "journal entry saved"
        );
        Ok(())
    }

    fn write_all(&self, entries: &[JournalEntry]) -> Result<(), StoreError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.write_record(COLUMNS).map_err(StoreError::Encode)?;
        for entry in entries {
            writer.serialize(entry).map_err(StoreError::Encode)?;
        }
        let buf = writer.into_inner().map_err(|err| StoreError::Write {
            path: self.path.clone(),
            source: io::Error::new(err.error().kind(), err.error().to_string()),
        })?;
        write_atomic(&self.path, &buf).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }

    fn csv_error(&self, err: csv::Error) -> StoreError {
        let message = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(source) => StoreError::Read {
                path: self.path.clone(),
                source,
            },
            _ => self.format_error(message),
        }
    }

    fn format_error(&self, message: String) -> StoreError {
        StoreError::Format {
            path: self.path.clone(),
            message,
        }
    }
}

/// Write to a sibling temp file, then rename over the target.
fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("csv.tmp");
    fs::write(&tmp_path, contents)?;
    fs::rename(&tmp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Mood;
    use chrono::NaiveDate;

    fn entry(date: &str, mood: Option<u8>, ai_response: &str) -> JournalEntry {
        JournalEntry {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("date"),
            affirmation: "I am calm".to_string(),
            gratitude: "coffee".to_string(),
            mood: mood.map(|m| Mood::new(m).expect("mood")),
            good_thing: "sunshine".to_string(),
            ai_response: ai_response.to_string(),
        }
    }

    #[test]
    fn load_missing_returns_empty_with_canonical_columns() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = JournalStore::new(temp.path().join("journal.csv"));
        let journal = store.load_all().expect("load");
        assert!(journal.is_empty());
        assert_eq!(
            journal.columns,
            vec![
                "date",
                "affirmation",
                "gratitude",
                "mood",
                "good_thing",
                "ai_response"
            ]
        );
    }

    /// Verifies the on-disk layout: header row, blank mood, quoted delimiters.
    #[test]
    fn append_writes_header_and_quotes_fields() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("journal.csv");
        let store = JournalStore::new(&path);
        store
            .append(&entry("2024-01-02", None, "Hello, \"friend\"\nsecond line"))
            .expect("append");

        let contents = fs::read_to_string(&path).expect("read");
        let expected = "date,affirmation,gratitude,mood,good_thing,ai_response\n\
                        2024-01-02,I am calm,coffee,,sunshine,\"Hello, \"\"friend\"\"\nsecond line\"\n";
        assert_eq!(contents, expected);
    }

    #[test]
    fn append_preserves_prior_entries_in_order() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = JournalStore::new(temp.path().join("nested").join("journal.csv"));
        let first = entry("2024-01-01", Some(7), "first");
        let second = entry("2024-01-01", Some(3), "same day again");
        store.append(&first).expect("append first");
        store.append(&second).expect("append second");

        let journal = store.load_all().expect("load");
        assert_eq!(journal.entries, vec![first, second]);
    }

    #[test]
    fn legacy_float_mood_is_accepted() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("journal.csv");
        fs::write(
            &path,
            "date,affirmation,gratitude,mood,good_thing,ai_response\n\
             2024-03-01,,,7.0,,ok\n\
             2024-03-02,,,,,Error: timeout\n",
        )
        .expect("write");

        let journal = JournalStore::new(&path).load_all().expect("load");
        assert_eq!(journal.entries[0].mood.map(Mood::value), Some(7));
        assert_eq!(journal.entries[0].affirmation, "");
        assert_eq!(journal.entries[1].mood, None);
    }

    #[test]
    fn wrong_header_is_a_format_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("journal.csv");
        fs::write(&path, "date,mood\n2024-01-01,5\n").expect("write");

        let err = JournalStore::new(&path).load_all().unwrap_err();
        assert!(matches!(err, StoreError::Format { .. }), "{err}");
        assert!(err.to_string().contains("expected columns"));
    }

    #[test]
    fn unparseable_row_is_a_format_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("journal.csv");
        fs::write(
            &path,
            "date,affirmation,gratitude,mood,good_thing,ai_response\n\
             2024-01-01,a,b,5,c,d\n\
             2024-01-02,a,b,7.5,c,d\n",
        )
        .expect("write");

        let err = JournalStore::new(&path).load_all().unwrap_err();
        assert!(matches!(err, StoreError::Format { .. }), "{err}");
        assert!(err.to_string().contains("row 2"));
    }

    /// A failed append leaves the existing file untouched.
    #[test]
    fn append_does_not_rewrite_malformed_store() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("journal.csv");
        fs::write(&path, "not,a,journal\n").expect("write");

        let store = JournalStore::new(&path);
        assert!(store.append(&entry("2024-01-01", None, "x")).is_err());
        assert_eq!(fs::read_to_string(&path).expect("read"), "not,a,journal\n");
    }
}
