//! Download record log
//!
//! An append-only CSV file with one row per built bundle, mapping the archive
//! filename to the name the requester supplied. The file is named after the date
//! the process started (`downloads_YYYY-MM-DD.csv`) and keeps that name for the
//! lifetime of the process.
//!
//! Appends are serialized by an in-process mutex and an exclusive file lock, so
//! rows from concurrent builds never interleave.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use fs2::FileExt;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::error::records::{read_failed, write_failed};

/// Header row written when the log file is created
pub const HEADER: [&str; 2] = ["文件名", "村民名"];

/// One audit row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadRecord {
    #[serde(rename = "fileName")]
    pub file_name: String,
    #[serde(rename = "personName")]
    pub person_name: String,
}

impl DownloadRecord {
    pub fn new(file_name: impl Into<String>, person_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            person_name: person_name.into(),
        }
    }
}

/// Log file name for a given date
pub fn log_file_name(date: NaiveDate) -> String {
    format!("downloads_{}.csv", date.format("%Y-%m-%d"))
}

/// Owner of the record log file
#[derive(Debug)]
pub struct RecordLog {
    path: PathBuf,
    append_guard: Mutex<()>,
}

impl RecordLog {
    /// Open the log for `date` inside `dir`, creating it with a header row if absent
    pub fn open(dir: &Path, date: NaiveDate) -> Result<Self> {
        Self::open_at(dir.join(log_file_name(date)))
    }

    /// Open the log at an explicit path, creating it with a header row if absent
    pub fn open_at(path: impl Into<PathBuf>) -> Result<Self> {
        let log = Self {
            path: path.into(),
            append_guard: Mutex::new(()),
        };
        log.initialize()?;
        Ok(log)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file with its header row in one step
    ///
    /// The header is staged in a temporary file and linked into place, so a
    /// concurrent appender never sees a log without its header.
    fn initialize(&self) -> Result<()> {
        if self.path.is_file() {
            debug!(target: "shpbundle::records", path = %self.path.display(), "Record log exists");
            return Ok(());
        }

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| write_failed(&self.path, e))?;

        let mut staging =
            tempfile::NamedTempFile::new_in(dir).map_err(|e| write_failed(&self.path, e))?;
        let header = encode_row(&HEADER).map_err(|e| write_failed(&self.path, e))?;
        staging
            .write_all(&header)
            .and_then(|()| staging.as_file().sync_data())
            .map_err(|e| write_failed(&self.path, e))?;

        match staging.persist_noclobber(&self.path) {
            Ok(_) => {
                info!(
                    target: "shpbundle::records",
                    path = %self.path.display(),
                    "Created record log"
                );
                Ok(())
            }
            Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => {
                debug!(
                    target: "shpbundle::records",
                    path = %self.path.display(),
                    "Record log exists"
                );
                Ok(())
            }
            Err(e) => Err(write_failed(&self.path, e.error)),
        }
    }

    /// Every row after the header, in file order
    ///
    /// A log file that does not exist yields no rows.
    pub fn load_records(&self) -> Result<Vec<DownloadRecord>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(read_failed(&self.path, e)),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(|e| read_failed(&self.path, e))?;
            records.push(DownloadRecord::new(
                row.get(0).unwrap_or_default(),
                row.get(1).unwrap_or_default(),
            ));
        }
        Ok(records)
    }

    /// Append exactly one row
    ///
    /// A log removed since startup is recreated with its header before the row
    /// is written.
    pub fn append_record(&self, file_name: &str, person_name: &str) -> Result<()> {
        let row = encode_row(&[file_name, person_name]).map_err(|e| write_failed(&self.path, e))?;

        let _guard = self.append_guard.lock();
        let mut file = match self.open_for_append() {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    target: "shpbundle::records",
                    path = %self.path.display(),
                    "Record log disappeared, recreating it"
                );
                self.initialize()?;
                self.open_for_append()
            }
            opened => opened,
        }
        .map_err(|e| write_failed(&self.path, e))?;
        file.lock_exclusive()
            .map_err(|e| write_failed(&self.path, e))?;

        let written = file.write_all(&row).and_then(|()| file.sync_data());
        let unlocked = FileExt::unlock(&file);
        written.map_err(|e| write_failed(&self.path, e))?;
        unlocked.map_err(|e| write_failed(&self.path, e))?;

        info!(
            target: "shpbundle::records",
            file_name = %file_name,
            person_name = %person_name,
            "Recorded download"
        );
        Ok(())
    }

    fn open_for_append(&self) -> std::io::Result<File> {
        OpenOptions::new().append(true).open(&self.path)
    }
}

/// Encode one CSV row, CRLF-terminated
fn encode_row(fields: &[&str]) -> std::result::Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());
    writer.write_record(fields)?;
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}
