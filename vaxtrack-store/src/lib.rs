//! Persistence for vaccination records, keyed by `(location, date)`.
//!
//! [`CsvStore`] keeps one CSV file per location, sorted by date, with at most
//! one row per date. Files are rewritten through a temp file in the same
//! directory and renamed into place, so readers never see a partial file.
use chrono::NaiveDate;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use vaxtrack_common::{IngestError, Result, VaccinationRecord};

/// What [`RecordStore::increment`] did with a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// No row existed for the date.
    Appended,
    /// The row for the date was overwritten.
    Replaced,
    /// A stored row already reports more doses; nothing was written.
    Stale { stored_max: u64 },
}

pub trait RecordStore {
    /// Insert or replace the row for the record's `(location, date)`.
    fn increment(&self, record: &VaccinationRecord) -> Result<WriteOutcome>;

    fn get(&self, location: &str, date: NaiveDate) -> Result<Option<VaccinationRecord>>;

    /// All rows for `location`, oldest first. Empty when nothing was stored.
    fn load(&self, location: &str) -> Result<Vec<VaccinationRecord>>;
}

#[derive(Debug, Clone)]
pub struct CsvStore {
    dir: PathBuf,
}

impl CsvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<location>.csv`, with path separators in the name replaced.
    pub fn path_for(&self, location: &str) -> PathBuf {
        let name: String = location
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        self.dir.join(format!("{name}.csv"))
    }

    fn read_rows(&self, path: &Path) -> Result<Vec<VaccinationRecord>> {
        let mut rdr = match csv::Reader::from_path(path) {
            Ok(rdr) => rdr,
            Err(e) if is_not_found(&e) => return Ok(Vec::new()),
            Err(e) => return Err(store_err(path, e)),
        };
        rdr.deserialize()
            .collect::<std::result::Result<Vec<VaccinationRecord>, _>>()
            .map_err(|e| store_err(path, e))
    }

    fn write_rows(&self, path: &Path, rows: &[VaccinationRecord]) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| store_err(&self.dir, e))?;
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|e| store_err(&self.dir, e))?;
        {
            let mut wtr = csv::Writer::from_writer(&mut tmp);
            for row in rows {
                wtr.serialize(row).map_err(|e| store_err(path, e))?;
            }
            wtr.flush().map_err(|e| store_err(path, e))?;
        }
        tmp.persist(path).map_err(|e| store_err(path, e.error))?;
        Ok(())
    }
}

impl RecordStore for CsvStore {
    fn increment(&self, record: &VaccinationRecord) -> Result<WriteOutcome> {
        let path = self.path_for(&record.location);
        let mut rows = self.read_rows(&path)?;

        // Distinct locations can share a file once separators are replaced.
        let same_location = |r: &VaccinationRecord| r.location == record.location;

        if let Some(stored_max) = rows
            .iter()
            .filter(|r| same_location(r))
            .map(|r| r.total_vaccinations)
            .max()
        {
            if record.total_vaccinations < stored_max {
                warn!(
                    location = %record.location,
                    date = %record.date,
                    total_vaccinations = record.total_vaccinations,
                    stored_max,
                    "store.increment.stale"
                );
                return Ok(WriteOutcome::Stale { stored_max });
            }
        }

        let before = rows.len();
        rows.retain(|r| !(same_location(r) && r.date == record.date));
        let outcome = if rows.len() < before {
            WriteOutcome::Replaced
        } else {
            WriteOutcome::Appended
        };
        rows.push(record.clone());
        rows.sort_by_key(|r| r.date);

        self.write_rows(&path, &rows)?;
        info!(
            location = %record.location,
            date = %record.date,
            path = %path.display(),
            rows = rows.len(),
            ?outcome,
            "store.increment.written"
        );
        Ok(outcome)
    }

    fn get(&self, location: &str, date: NaiveDate) -> Result<Option<VaccinationRecord>> {
        let found = self
            .load(location)?
            .into_iter()
            .find(|r| r.date == date);
        debug!(location, %date, hit = found.is_some(), "store.get");
        Ok(found)
    }

    fn load(&self, location: &str) -> Result<Vec<VaccinationRecord>> {
        let mut rows = self.read_rows(&self.path_for(location))?;
        rows.retain(|r| r.location == location);
        Ok(rows)
    }
}

fn is_not_found(e: &csv::Error) -> bool {
    matches!(e.kind(), csv::ErrorKind::Io(err) if err.kind() == io::ErrorKind::NotFound)
}

fn store_err(path: &Path, e: impl std::fmt::Display) -> IngestError {
    IngestError::Store(format!("{}: {e}", path.display()))
}
