//! Command helper utilities

use chrono::NaiveDate;

use crate::config::Settings;
use crate::error::Result;
use crate::records::RecordLog;

/// Open the record log for the date the process started
///
/// Creates the log with its header row when it does not exist yet.
pub fn open_record_log(settings: &Settings, started: NaiveDate) -> Result<RecordLog> {
    RecordLog::open(&settings.record_dir, started)
}
