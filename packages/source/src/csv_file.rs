//! Local CSV file source.
//!
//! Reads a single CSV file or every `*.csv` file in a directory into a
//! [`RawDataset`]. Files exported by INPE are sometimes Latin-1 encoded,
//! so bytes that are not valid UTF-8 are decoded as Latin-1 instead.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use queimadas_source_models::{RawDataset, RawRecord};

use crate::{FetchOptions, HotspotSource, SourceError};

/// Loads hotspot rows from CSV files on disk.
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    /// Creates a source reading `path`, which may be a file or a directory.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl HotspotSource for CsvFileSource {
    fn name(&self) -> &'static str {
        "Local CSV files"
    }

    async fn fetch(&self, options: &FetchOptions) -> Result<RawDataset, SourceError> {
        let files = list_csv_files(&self.path)?;
        options.progress.set_total(files.len() as u64);

        let mut dataset = RawDataset::empty();
        for file in &files {
            options
                .progress
                .set_message(file.display().to_string());
            match read_csv_file(file) {
                Ok(part) => {
                    log::debug!("{}: {} rows", file.display(), part.len());
                    dataset.extend(part);
                }
                Err(e) => log::warn!("Skipping unreadable file {}: {e}", file.display()),
            }
            options.progress.inc(1);

            if let Some(limit) = options.limit {
                #[allow(clippy::cast_possible_truncation)]
                let limit = limit as usize;
                if dataset.len() >= limit {
                    dataset.records.truncate(limit);
                    log::info!("Reached limit of {limit} rows");
                    break;
                }
            }
        }

        options
            .progress
            .finish(format!("{} rows from {} files", dataset.len(), files.len()));
        Ok(dataset)
    }
}

/// Returns `path` itself if it is a file, or the `*.csv` files inside it
/// sorted by name.
///
/// # Errors
///
/// Returns [`SourceError::Io`] if `path` does not exist or the directory
/// cannot be listed.
pub fn list_csv_files(path: &Path) -> Result<Vec<PathBuf>, SourceError> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(path)? {
        let entry_path = entry?.path();
        let is_csv = entry_path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv && entry_path.is_file() {
            files.push(entry_path);
        }
    }
    files.sort();

    if files.is_empty() {
        log::warn!("No CSV files found in {}", path.display());
    }
    Ok(files)
}

/// Reads one CSV file into a dataset.
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be read or parsed.
pub fn read_csv_file(path: &Path) -> Result<RawDataset, SourceError> {
    let bytes = std::fs::read(path)?;
    read_csv_bytes(&bytes)
}

/// Decodes bytes as UTF-8, falling back to Latin-1. A leading UTF-8 byte
/// order mark is dropped.
#[must_use]
pub fn decode_bytes(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            log::debug!("Input is not valid UTF-8, decoding as Latin-1");
            Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect())
        }
    }
}

/// Picks `;` when the header line has more semicolons than commas.
fn sniff_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or("");
    let commas = header.matches(',').count();
    let semicolons = header.matches(';').count();
    if semicolons > commas { b';' } else { b',' }
}

/// Parses CSV bytes (header row first) into a dataset.
///
/// # Errors
///
/// Returns [`SourceError::Csv`] if the header or a row cannot be parsed.
pub fn read_csv_bytes(bytes: &[u8]) -> Result<RawDataset, SourceError> {
    let text = decode_bytes(bytes);
    if text.trim().is_empty() {
        return Ok(RawDataset::empty());
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(&text))
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_owned())
        .collect();

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        let record: RawRecord = columns
            .iter()
            .enumerate()
            .map(|(i, column)| (column.clone(), row.get(i).unwrap_or("").trim().to_owned()))
            .collect();
        records.push(record);
    }

    Ok(RawDataset { columns, records })
}

/// Writes a dataset back out as CSV, creating parent directories.
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be created or written.
pub fn write_raw_csv(path: &Path, dataset: &RawDataset) -> Result<(), SourceError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&dataset.columns)?;
    for record in &dataset.records {
        writer.write_record(
            dataset
                .columns
                .iter()
                .map(|c| record.get(c).map_or("", String::as_str)),
        )?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_header_and_rows() {
        let csv = b"data,latitude,longitude,uf\n2024-01-01 10:00:00,-10.0,-50.0,MT\n";
        let dataset = read_csv_bytes(csv).unwrap();
        assert_eq!(dataset.columns, vec!["data", "latitude", "longitude", "uf"]);
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.records[0]["uf"], "MT");
    }

    #[test]
    fn falls_back_to_latin1() {
        // "municipio\nSão Félix" in Latin-1
        let bytes = b"municipio\nS\xe3o F\xe9lix\n";
        let dataset = read_csv_bytes(bytes).unwrap();
        assert_eq!(dataset.records[0]["municipio"], "São Félix");
    }

    #[test]
    fn strips_bom_and_sniffs_semicolons() {
        let bytes = b"\xEF\xBB\xBFuf;bioma\nPA;Amazonia\n";
        let dataset = read_csv_bytes(bytes).unwrap();
        assert_eq!(dataset.columns, vec!["uf", "bioma"]);
        assert_eq!(dataset.records[0]["bioma"], "Amazonia");
    }

    #[test]
    fn empty_input_is_empty_dataset() {
        assert!(read_csv_bytes(b"").unwrap().is_empty());
    }

    #[test]
    fn short_rows_get_empty_cells() {
        let dataset = read_csv_bytes(b"a,b,c\n1,2\n").unwrap();
        assert_eq!(dataset.records[0]["c"], "");
    }

    #[tokio::test]
    async fn loads_every_csv_in_directory_in_name_order() {
        let dir = std::env::temp_dir().join("queimadas_csv_file_source_test");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("focos_2024-01-02.csv"), "uf\nSP\n").unwrap();
        std::fs::write(dir.join("focos_2024-01-01.csv"), "uf\nMT\nPA\n").unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let source = CsvFileSource::new(&dir);
        let dataset = source.fetch(&FetchOptions::new(&dir)).await.unwrap();
        let ufs: Vec<&str> = dataset.records.iter().map(|r| r["uf"].as_str()).collect();
        assert_eq!(ufs, vec!["MT", "PA", "SP"]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn write_then_read_preserves_rows() {
        let dir = std::env::temp_dir().join("queimadas_write_raw_csv_test");
        let path = dir.join("out.csv");
        let mut record = RawRecord::new();
        record.insert("uf".to_string(), "AM".to_string());
        let dataset = RawDataset {
            columns: vec!["uf".to_string(), "bioma".to_string()],
            records: vec![record],
        };
        write_raw_csv(&path, &dataset).unwrap();
        let back = read_csv_file(&path).unwrap();
        assert_eq!(back.records[0]["uf"], "AM");
        assert_eq!(back.records[0]["bioma"], "");
        std::fs::remove_dir_all(&dir).ok();
    }
}
