//! CSV import for listing catalogues.
//!
//! One row per listing: `owner,title,description,category,price,radius_km,
//! days,start,end`, where `days` is a pipe-separated list of weekday numbers
//! (`1`=Monday .. `7`=Sunday) and `start`/`end` are `HH:MM` times. `price`
//! and `radius_km` may be left empty.

mod parser;

use std::io::Read;
use std::path::Path;

use crate::booking::{ListingDraft, WeeklySlot};

/// One parsed seed row: the listing to publish and the weekly slots to
/// install on it. Validation happens when the slots are applied, not here.
#[derive(Debug, Clone)]
pub struct ListingSeed {
    pub draft: ListingDraft,
    pub slots: Vec<WeeklySlot>,
}

#[derive(Debug)]
pub enum CatalogImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Row { line: u64, message: String },
}

impl std::fmt::Display for CatalogImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogImportError::Io(err) => write!(f, "failed to read catalog seed: {}", err),
            CatalogImportError::Csv(err) => write!(f, "invalid catalog CSV data: {}", err),
            CatalogImportError::Row { line, message } => {
                write!(f, "invalid catalog row at line {}: {}", line, message)
            }
        }
    }
}

impl std::error::Error for CatalogImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogImportError::Io(err) => Some(err),
            CatalogImportError::Csv(err) => Some(err),
            CatalogImportError::Row { .. } => None,
        }
    }
}

impl From<std::io::Error> for CatalogImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CatalogImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct CatalogImporter;

impl CatalogImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<ListingSeed>, CatalogImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<ListingSeed>, CatalogImportError> {
        parser::parse_seeds(reader)
    }
}
