// CSV table files shared by the credential and task stores. Reads are strict
// (any malformed row makes the whole file corrupt); writes replace the file.
use std::fs;
use std::path::{Path, PathBuf};
use serde::{de::DeserializeOwned, Serialize};
use crate::errors::{StoreError, StoreResult};

/// Reads every row of `path`. Returns `None` when the file does not exist,
/// which callers treat as an empty table.
pub fn read_records<T: DeserializeOwned>(
    path: &Path,
    required_columns: &[&str],
) -> StoreResult<Option<Vec<T>>> {
    if !path.exists() {
        tracing::debug!("Store file {} not found, starting empty", path.display());
        return Ok(None);
    }

    // A zero-byte file has no header at all; treat it like a fresh table.
    if fs::metadata(path)?.len() == 0 {
        return Ok(Some(Vec::new()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| StoreError::corrupt(path, e))?;

    let headers = reader
        .headers()
        .map_err(|e| StoreError::corrupt(path, e))?
        .clone();
    for column in required_columns {
        if !headers.iter().any(|h| h == *column) {
            return Err(StoreError::missing_column(path, column));
        }
    }

    let records = reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()
        .map_err(|e| StoreError::corrupt(path, e))?;

    tracing::debug!("Loaded {} rows from {}", records.len(), path.display());
    Ok(Some(records))
}

/// Rewrites `path` with `header` followed by `records`. The table is written
/// to a sibling file first and renamed into place.
pub fn write_records<T: Serialize>(
    path: &Path,
    header: &[&str],
    records: &[T],
) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = temp_path(path);
    {
        // The header is written by hand so an empty table still has one.
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&tmp_path)?;
        writer.write_record(header)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
    }
    fs::rename(&tmp_path, path)?;

    tracing::debug!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Row {
        name: String,
        value: u32,
    }

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempdir().unwrap();
        let rows: Option<Vec<Row>> = read_records(&dir.path().join("nope.csv"), &["name"]).unwrap();
        assert!(rows.is_none());
    }

    #[test]
    fn empty_table_keeps_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rows.csv");
        write_records::<Row>(&path, &["name", "value"], &[]).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "name,value\n");
        let rows: Vec<Row> = read_records(&path, &["name", "value"]).unwrap().unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn creates_parent_directories_and_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/data/rows.csv");
        let rows = vec![Row { name: "a,b".into(), value: 1 }];
        write_records(&path, &["name", "value"], &rows).unwrap();

        assert!(path.exists());
        assert!(!temp_path(&path).exists());
        let back: Vec<Row> = read_records(&path, &["name", "value"]).unwrap().unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn missing_column_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rows.csv");
        fs::write(&path, "name\nx\n").unwrap();

        let err = read_records::<Row>(&path, &["name", "value"]).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
        assert!(err.to_string().contains("value"));
    }

    #[test]
    fn bad_value_reports_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rows.csv");
        fs::write(&path, "name,value\na,1\nb,two\n").unwrap();

        match read_records::<Row>(&path, &["name", "value"]).unwrap_err() {
            StoreError::Corrupt { line, .. } => assert_eq!(line, Some(3)),
            other => panic!("unexpected error: {other}"),
        }
    }
}
