//! Bundle build pipeline
//!
//! One build request runs the copy engine, packs the resulting directory into an
//! archive and records the download, strictly in that order:
//!
//! ```text
//! {output_root}/{target}/                 renamed files and category folders
//! {output_root}/{target}/{target}_files.zip
//! {record_dir}/downloads_YYYY-MM-DD.csv   one row per built bundle
//! ```

pub mod lock;

use std::path::PathBuf;

use tracing::{error, info};

use crate::archive;
use crate::engine::{CopyEngine, CopyReport};
use crate::error::Result;
use crate::error::fs::create_dir_failed;
use crate::error::request::invalid_identifier;
use crate::records::RecordLog;

pub use lock::{LOCK_DIR, TargetLock};

/// Suggested download name for a target folder
pub fn archive_name(target_folder_id: &str) -> String {
    format!("{target_folder_id}_files.zip")
}

/// Reject values that cannot be used as a single path segment
pub fn validate_identifier(field: &str, value: &str) -> Result<()> {
    let reason = if value.trim().is_empty() {
        Some("must not be empty")
    } else if value == "." || value == ".." {
        Some("must not be a relative path component")
    } else if value.contains(['/', '\\']) {
        Some("must not contain path separators")
    } else if value.chars().any(char::is_control) {
        Some("must not contain control characters")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(invalid_identifier(field, value, reason)),
        None => Ok(()),
    }
}

/// Result of one successful build
#[derive(Debug, Clone)]
pub struct BuiltBundle {
    /// Absolute path of the archive
    pub archive_path: PathBuf,
    /// Suggested filename for the downloaded archive
    pub download_name: String,
    pub report: CopyReport,
    /// False when the archive was built but the record log could not be written
    pub recorded: bool,
}

/// Runs build requests against one source directory and one record log
#[derive(Debug)]
pub struct BundleService {
    engine: CopyEngine,
    output_root: PathBuf,
    records: RecordLog,
}

impl BundleService {
    pub fn new(engine: CopyEngine, output_root: impl Into<PathBuf>, records: RecordLog) -> Self {
        Self {
            engine,
            output_root: output_root.into(),
            records,
        }
    }

    #[cfg(test)]
    pub fn records(&self) -> &RecordLog {
        &self.records
    }

    /// Build the bundle for `target_folder_id`, renaming files with `name_token`
    ///
    /// Fails with `TargetBusy` when another build of the same target is running.
    /// A record log failure does not fail the build; it is reported through
    /// [`BuiltBundle::recorded`] and the diagnostics log.
    pub fn build(&self, target_folder_id: &str, name_token: &str) -> Result<BuiltBundle> {
        validate_identifier("target folder id", target_folder_id)?;
        if target_folder_id == LOCK_DIR {
            return Err(invalid_identifier(
                "target folder id",
                target_folder_id,
                "is reserved for build locks",
            ));
        }
        validate_identifier("name", name_token)?;

        std::fs::create_dir_all(&self.output_root)
            .map_err(|e| create_dir_failed(&self.output_root, &e))?;
        let _lock = TargetLock::acquire(&self.output_root, target_folder_id)?;

        let target_dir = self.output_root.join(target_folder_id);
        let report = self.engine.copy_and_rename(&target_dir, name_token)?;

        let download_name = archive_name(target_folder_id);
        let archive_path = archive::build_archive(&target_dir, &download_name)?;

        let recorded = match self.records.append_record(&download_name, name_token) {
            Ok(()) => true,
            Err(e) => {
                error!(
                    target: "shpbundle::bundle",
                    archive = %download_name,
                    error = %e,
                    "Archive built but download was not recorded"
                );
                false
            }
        };

        info!(
            target: "shpbundle::bundle",
            archive = %download_name,
            copied = report.copied(),
            missing = report.missing(),
            skipped = report.skipped_existing(),
            "Bundle ready for download"
        );

        Ok(BuiltBundle {
            archive_path,
            download_name,
            report,
            recorded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::error::BundleError;
    use crate::records::DownloadRecord;
    use std::fs;
    use std::io::Read;
    use std::path::Path;
    use tempfile::TempDir;

    struct Fixture {
        temp: TempDir,
        service: BundleService,
    }

    impl Fixture {
        fn new(source_files: &[&str]) -> Self {
            let temp = TempDir::new().unwrap();
            let source = temp.path().join("source");
            fs::create_dir_all(&source).unwrap();
            for name in source_files {
                fs::write(source.join(name), format!("bytes of {name}")).unwrap();
            }
            let records = RecordLog::open_at(temp.path().join("downloads.csv")).unwrap();
            let engine = CopyEngine::new(&source, Catalog::builtin().unwrap());
            let service = BundleService::new(engine, temp.path().join("temp_output"), records);
            Self { temp, service }
        }

        fn out(&self) -> PathBuf {
            self.temp.path().join("temp_output")
        }
    }

    fn archive_names(path: &Path) -> Vec<String> {
        let archive = zip::ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
        let mut names: Vec<_> = archive.file_names().map(str::to_string).collect();
        names.sort();
        names
    }

    #[test]
    fn test_point_asset_scenario() {
        let sidecars = ["资产点状图.shp", "资产点状图.shx", "资产点状图.dbf"];
        let fixture = Fixture::new(&sidecars);

        let built = fixture.service.build("cunA", "村A").unwrap();

        assert_eq!(built.download_name, "cunA_files.zip");
        assert!(built.recorded);
        assert_eq!(built.report.copied(), 3);
        assert_eq!(built.report.missing(), 14);
        for ext in ["shp", "shx", "dbf"] {
            assert!(fixture.out().join(format!("cunA/村A_资产点状图.{ext}")).is_file());
        }
        assert_eq!(
            built.archive_path,
            dunce::canonicalize(fixture.out().join("cunA/cunA_files.zip")).unwrap()
        );
        assert_eq!(
            archive_names(&built.archive_path),
            vec![
                "村A_资产点状图.dbf".to_string(),
                "村A_资产点状图.shp".to_string(),
                "村A_资产点状图.shx".to_string(),
            ]
        );
        assert_eq!(
            fixture.service.records().load_records().unwrap(),
            vec![DownloadRecord::new("cunA_files.zip", "村A")]
        );
    }

    #[test]
    fn test_empty_source_still_builds_and_records() {
        let fixture = Fixture::new(&[]);

        let built = fixture.service.build("cunB", "村B").unwrap();

        assert_eq!(built.report.missing(), 17);
        assert!(archive_names(&built.archive_path).is_empty());
        assert_eq!(fixture.service.records().load_records().unwrap().len(), 1);
    }

    #[test]
    fn test_resource_fan_out_is_archived() {
        let fixture = Fixture::new(&["资源面状图.shp"]);

        let built = fixture.service.build("cunC", "村C").unwrap();

        let names = archive_names(&built.archive_path);
        assert_eq!(names.len(), 19);
        assert!(names.contains(&"0601 公益林/村C_0601 公益林_资源面状图.shp".to_string()));

        let file = fs::File::open(&built.archive_path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        let mut entry = archive
            .by_name("04 “四荒”地/村C_04 “四荒”地_资源面状图.shp")
            .unwrap();
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        assert_eq!(content, "bytes of 资源面状图.shp");
    }

    #[test]
    fn test_rebuild_appends_second_record() {
        let fixture = Fixture::new(&["资产面状图.shp"]);

        fixture.service.build("cunA", "村A").unwrap();
        let second = fixture.service.build("cunA", "村A").unwrap();

        assert_eq!(second.report.copied(), 0);
        assert_eq!(second.report.skipped_existing(), 1);
        assert_eq!(archive_names(&second.archive_path), vec!["村A_资产面状图.shp"]);
        assert_eq!(fixture.service.records().load_records().unwrap().len(), 2);
    }

    #[test]
    fn test_path_hostile_input_rejected() {
        let fixture = Fixture::new(&[]);

        let cases = [
            ("../x", "n"),
            ("a/b", "n"),
            ("..", "n"),
            ("ok", "a\\b"),
            ("", "n"),
        ];
        for (target, name) in cases {
            let err = fixture.service.build(target, name).unwrap_err();
            assert!(matches!(err, BundleError::InvalidIdentifier { .. }), "{target:?} {name:?}");
        }
        assert!(fixture.service.records().load_records().unwrap().is_empty());
    }

    #[test]
    fn test_busy_target_rejected() {
        let fixture = Fixture::new(&[]);
        fs::create_dir_all(fixture.out()).unwrap();
        let _held = TargetLock::acquire(&fixture.out(), "cunA").unwrap();

        let err = fixture.service.build("cunA", "村A").unwrap_err();

        assert!(matches!(err, BundleError::TargetBusy { .. }));
        assert!(fixture.service.records().load_records().unwrap().is_empty());
    }

    #[test]
    fn test_lock_like_target_does_not_block_other_targets() {
        let fixture = Fixture::new(&["资产点状图.shp"]);

        fixture.service.build(".cunA.lock", "村A").unwrap();
        let built = fixture.service.build("cunA", "村A").unwrap();

        assert!(built.archive_path.is_file());
        assert_eq!(fixture.service.records().load_records().unwrap().len(), 2);
    }

    #[test]
    fn test_lock_directory_is_not_a_target() {
        let fixture = Fixture::new(&[]);

        let err = fixture.service.build(LOCK_DIR, "村A").unwrap_err();

        assert!(matches!(err, BundleError::InvalidIdentifier { .. }));
        assert!(err.to_string().contains("reserved"));
    }

    #[test]
    fn test_record_failure_does_not_fail_build() {
        let fixture = Fixture::new(&["资产点状图.shp"]);
        let log_path = fixture.service.records().path().to_path_buf();
        fs::remove_file(&log_path).unwrap();
        fs::create_dir_all(&log_path).unwrap();

        let built = fixture.service.build("cunA", "村A").unwrap();

        assert!(!built.recorded);
        assert!(built.archive_path.is_file());
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("name", "村A").is_ok());
        assert!(validate_identifier("name", "a..b").is_ok());
        assert!(validate_identifier("name", "  ").is_err());
        assert!(validate_identifier("name", "a\nb").is_err());
    }

    #[test]
    fn test_archive_name() {
        assert_eq!(archive_name("cunA"), "cunA_files.zip");
    }
}
