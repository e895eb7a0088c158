//! Source catalog and category list
//!
//! The set of shapefile sidecar files a bundle is built from, and the land-use
//! categories one of them fans out into, are fixed domain data. They are kept in
//! `catalog.yaml` next to this module and compiled into the binary, so the copy
//! engine never hard-codes a filename.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::error::config::catalog_invalid;

const BUILTIN_CATALOG: &str = include_str!("catalog.yaml");

/// Renaming rule applied to a catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenameClass {
    /// Single copy to `{name}_{marker}.{ext}`
    PointAsset,
    /// Single copy to `{name}_{marker}.{ext}`
    PolygonAsset,
    /// One copy per category: `{label}/{name}_{label}_{marker}.{ext}`
    PolygonResource,
}

impl RenameClass {
    /// Whether files of this class are replicated into category subfolders
    pub fn fans_out(self) -> bool {
        matches!(self, RenameClass::PolygonResource)
    }
}

impl std::fmt::Display for RenameClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RenameClass::PointAsset => "point_asset",
            RenameClass::PolygonAsset => "polygon_asset",
            RenameClass::PolygonResource => "polygon_resource",
        };
        f.write_str(name)
    }
}

/// Substring marker identifying a rename class inside a filename
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassMarker {
    pub class: RenameClass,
    pub marker: String,
}

/// One fixed source filename, classified at load time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub file_name: String,
    pub class: Option<RenameClass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
}

impl CatalogEntry {
    /// Extension as the segment after the last `.`
    ///
    /// A name without a dot yields the whole name. Renamed files depend on this
    /// exact behavior, so it is not replaced with `Path::extension`.
    pub fn extension(&self) -> &str {
        self.file_name
            .rsplit('.')
            .next()
            .unwrap_or(self.file_name.as_str())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogData {
    classes: Vec<ClassMarker>,
    files: Vec<String>,
    categories: Vec<String>,
}

/// Ordered source catalog plus the fan-out category list
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    categories: Vec<String>,
}

impl Catalog {
    /// Load the catalog compiled into the binary
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(BUILTIN_CATALOG)
    }

    /// Parse and validate catalog data
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let data: CatalogData = serde_yaml::from_str(yaml)
            .map_err(|e| catalog_invalid(format!("failed to parse catalog data: {e}")))?;
        Self::from_data(data)
    }

    fn from_data(data: CatalogData) -> Result<Self> {
        validate_markers(&data.classes)?;
        validate_categories(&data.categories)?;

        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(data.files.len());
        for file_name in data.files {
            if !seen.insert(file_name.clone()) {
                return Err(catalog_invalid(format!(
                    "file '{file_name}' is listed more than once"
                )));
            }
            entries.push(classify(file_name, &data.classes)?);
        }

        Ok(Self {
            entries,
            categories: data.categories,
        })
    }

    /// Catalog entries in processing order
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Category labels in fan-out order
    pub fn categories(&self) -> &[String] {
        &self.categories
    }
}

fn classify(file_name: String, markers: &[ClassMarker]) -> Result<CatalogEntry> {
    let mut matching = markers
        .iter()
        .filter(|m| file_name.contains(m.marker.as_str()));

    let first = matching.next();
    if let Some(second) = matching.next() {
        return Err(catalog_invalid(format!(
            "file '{file_name}' matches both '{}' and '{}'",
            first.map(|m| m.marker.as_str()).unwrap_or_default(),
            second.marker
        )));
    }

    Ok(CatalogEntry {
        class: first.map(|m| m.class),
        marker: first.map(|m| m.marker.clone()),
        file_name,
    })
}

fn validate_markers(markers: &[ClassMarker]) -> Result<()> {
    let mut classes = HashSet::new();
    for m in markers {
        if m.marker.is_empty() {
            return Err(catalog_invalid(format!("class '{}' has an empty marker", m.class)));
        }
        if !classes.insert(m.class) {
            return Err(catalog_invalid(format!("class '{}' is declared twice", m.class)));
        }
    }
    Ok(())
}

fn validate_categories(categories: &[String]) -> Result<()> {
    if categories.is_empty() {
        return Err(catalog_invalid("category list is empty"));
    }

    let mut seen = HashSet::new();
    for label in categories {
        if label.trim().is_empty() {
            return Err(catalog_invalid("category label is blank"));
        }
        if label.contains(['/', '\\']) || label == "." || label == ".." {
            return Err(catalog_invalid(format!(
                "category '{label}' cannot be used as a folder name"
            )));
        }
        if !seen.insert(label.as_str()) {
            return Err(catalog_invalid(format!("category '{label}' is listed twice")));
        }
    }
    Ok(())
}
