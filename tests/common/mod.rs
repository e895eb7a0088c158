//! Common test utilities for shpbundle integration tests

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Every file of the built-in catalog
pub const CATALOG_FILES: [&str; 17] = [
    "资产点状图.cpg",
    "资产点状图.dbf",
    "资产点状图.prj",
    "资产点状图.qix",
    "资产点状图.shp",
    "资产点状图.shx",
    "资产面状图.cpg",
    "资产面状图.dbf",
    "资产面状图.prj",
    "资产面状图.shp",
    "资产面状图.shx",
    "资源面状图.cpg",
    "资源面状图.dbf",
    "资源面状图.prj",
    "资源面状图.qix",
    "资源面状图.shp",
    "资源面状图.shx",
];

/// Number of land-use categories a resource layer fans out into
pub const CATEGORY_COUNT: usize = 19;

/// A test workspace with a source directory next to it
pub struct TestWorkspace {
    /// Temporary directory
    pub temp: TempDir,
    /// Path to workspace root
    pub path: PathBuf,
}

impl TestWorkspace {
    /// Create a new test workspace with an empty source directory
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        std::fs::create_dir_all(path.join("source")).expect("Failed to create source directory");
        Self { temp, path }
    }

    pub fn source_dir(&self) -> PathBuf {
        self.path.join("source")
    }

    pub fn output_root(&self) -> PathBuf {
        self.path.join("temp_output")
    }

    /// Write a file into the source directory, content derived from its name
    pub fn write_source(&self, name: &str) {
        std::fs::write(self.source_dir().join(name), source_content(name))
            .expect("Failed to write source file");
    }

    /// Write every catalog file into the source directory
    pub fn populate_catalog(&self) {
        for name in CATALOG_FILES {
            self.write_source(name);
        }
    }

    /// Write a file in workspace
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file from workspace
    pub fn read_file(&self, path: &str) -> String {
        std::fs::read_to_string(self.path.join(path)).expect("Failed to read file")
    }

    /// Check if a file exists in workspace
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// The single record log written into the workspace
    pub fn record_log(&self) -> PathBuf {
        let logs: Vec<_> = std::fs::read_dir(&self.path)
            .expect("Failed to read workspace")
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("downloads_") && n.ends_with(".csv"))
            })
            .collect();
        assert_eq!(logs.len(), 1, "expected one record log, found {logs:?}");
        logs.into_iter().next().expect("one record log")
    }

    /// Data rows of the record log, header excluded
    pub fn record_rows(&self) -> Vec<(String, String)> {
        let mut reader = csv::Reader::from_path(self.record_log()).expect("Failed to open log");
        reader
            .records()
            .map(|r| {
                let r = r.expect("Failed to read row");
                (r[0].to_string(), r[1].to_string())
            })
            .collect()
    }

    /// Command preconfigured for this workspace, isolated from the user's settings
    pub fn cmd(&self) -> Command {
        let mut cmd = shpbundle_cmd();
        cmd.current_dir(&self.path)
            .env("SHPBUNDLE_CONFIG_DIR", self.path.join(".config"))
            .env("SHPBUNDLE_SOURCE_DIR", self.source_dir());
        cmd
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Binary with every `SHPBUNDLE_*` override removed
#[allow(deprecated)]
pub fn shpbundle_cmd() -> Command {
    let mut cmd = Command::cargo_bin("shpbundle").expect("binary is built");
    for var in [
        "SHPBUNDLE_WORKSPACE",
        "SHPBUNDLE_SOURCE_DIR",
        "SHPBUNDLE_OUTPUT_ROOT",
        "SHPBUNDLE_RECORD_DIR",
        "SHPBUNDLE_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// Deterministic content of a source file
pub fn source_content(name: &str) -> Vec<u8> {
    format!("layer data for {name}\n").into_bytes()
}

/// Entry names and decompressed contents of a zip archive
pub fn read_zip(path: &Path) -> BTreeMap<String, Vec<u8>> {
    let file = std::fs::File::open(path).expect("Failed to open archive");
    read_zip_from(file)
}

/// Entry names and decompressed contents of zip bytes
pub fn read_zip_bytes(bytes: Vec<u8>) -> BTreeMap<String, Vec<u8>> {
    read_zip_from(std::io::Cursor::new(bytes))
}

fn read_zip_from<R: std::io::Read + std::io::Seek>(reader: R) -> BTreeMap<String, Vec<u8>> {
    let mut archive = zip::ZipArchive::new(reader).expect("Invalid zip archive");
    let mut entries = BTreeMap::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).expect("Failed to read entry");
        let mut content = Vec::new();
        file.read_to_end(&mut content).expect("Failed to decompress entry");
        entries.insert(file.name().to_string(), content);
    }
    entries
}
