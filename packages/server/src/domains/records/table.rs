use std::path::{Path, PathBuf};

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use super::columns::{normalize_column, ColumnResolver, ColumnRole};
use super::models::{value_text, Record};
use super::spreadsheet::{is_workbook, read_sheet};
use crate::kernel::BaseRecordLookup;

#[derive(Error, Debug)]
pub enum RecordSourceError {
    #[error("Could not detect {0} column in record table")]
    MissingColumn(ColumnRole),

    #[error("Failed to read record table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Record table is not a JSON array of objects: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Worksheet '{0}' not found")]
    SheetNotFound(String),
}

/// In-memory record table loaded once at startup.
#[derive(Debug, Clone)]
pub struct RecordTable {
    columns: Vec<String>,
    rows: Vec<Record>,
    resolver: ColumnResolver,
}

impl RecordTable {
    /// Build a table from raw rows, normalizing header names.
    pub fn from_rows(raw_rows: Vec<IndexMap<String, Value>>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        let rows: Vec<Record> = raw_rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|(name, value)| {
                        let name = normalize_column(&name);
                        if !columns.contains(&name) {
                            columns.push(name.clone());
                        }
                        (name, value)
                    })
                    .collect()
            })
            .collect();

        let resolver = ColumnResolver::new(&columns);
        Self {
            columns,
            rows,
            resolver,
        }
    }

    /// Load a table from a workbook (`.xlsx`, `.xls`, `.ods`, ...) or from a
    /// JSON file containing an array of row objects.
    ///
    /// `sheet_name` only applies to workbooks; `None` reads the first sheet.
    pub async fn load(
        path: impl AsRef<Path>,
        sheet_name: Option<&str>,
    ) -> Result<Self, RecordSourceError> {
        let path = path.as_ref();
        let rows = if is_workbook(path) {
            let owned_path = path.to_path_buf();
            let sheet = sheet_name.map(str::to_string);
            tokio::task::spawn_blocking(move || read_sheet(&owned_path, sheet.as_deref()))
                .await
                .map_err(|e| RecordSourceError::Io {
                    path: path.to_path_buf(),
                    source: std::io::Error::other(e),
                })??
        } else {
            read_json_rows(path).await?
        };
        let table = Self::from_rows(rows);

        info!(
            path = %path.display(),
            sheet = ?sheet_name,
            rows = table.row_count(),
            cols = table.column_count(),
            identifier_column = ?table.resolver.resolve(ColumnRole::Identifier),
            phone_columns = ?table.resolver.resolve_all(ColumnRole::Phone),
            "Record table loaded"
        );
        Ok(table)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn resolver(&self) -> &ColumnResolver {
        &self.resolver
    }

    /// First row whose identifier cell matches, ignoring case and surrounding whitespace.
    pub fn find(&self, identifier: &str) -> Result<Option<&Record>, RecordSourceError> {
        let column = self
            .resolver
            .resolve(ColumnRole::Identifier)
            .ok_or(RecordSourceError::MissingColumn(ColumnRole::Identifier))?;
        let wanted = identifier.trim().to_lowercase();

        Ok(self
            .rows
            .iter()
            .find(|row| value_text_of(row, column).trim().to_lowercase() == wanted))
    }
}

async fn read_json_rows(
    path: &Path,
) -> Result<Vec<IndexMap<String, Value>>, RecordSourceError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| RecordSourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(serde_json::from_str(&raw)?)
}

fn value_text_of(row: &Record, column: &str) -> String {
    row.get(column).map(value_text).unwrap_or_default()
}

#[async_trait]
impl BaseRecordLookup for RecordTable {
    async fn find_record(&self, identifier: &str) -> Result<Option<Record>, RecordSourceError> {
        self.find(identifier).map(|row| row.cloned())
    }

    fn phone_fields(&self, _record: &Record) -> Vec<String> {
        self.resolver
            .resolve_all(ColumnRole::Phone)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    fn shape(&self) -> (usize, usize) {
        (self.row_count(), self.column_count())
    }
}
