//! Delimited tabular files.
//!
//! Reading is lenient: the delimiter is sniffed, a UTF-8 byte order mark is
//! dropped, ragged rows are padded, and a missing file is simply an empty
//! table. Writing is atomic: content goes to a temporary file in the target
//! directory and is renamed into place, so a concurrent reader sees either the
//! old file or the new one.

pub mod columns;
pub mod sniff;

use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, trace};

use crate::error::{Error, Result};

pub use columns::{normalize_header, ColumnResolver, Field, Rule};
pub use sniff::{delimiter_or_default, sniff_delimiter};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// An in-memory table: a header row plus rows padded to the header width.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// The header row as written in the file.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows, in file order.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// A resolver over this table's headers.
    #[must_use]
    pub fn resolver(&self) -> ColumnResolver {
        ColumnResolver::new(&self.headers)
    }

    /// Trimmed cell value, or `""` when the column is out of range.
    #[must_use]
    pub fn cell(row: &[String], column: Option<usize>) -> &str {
        column
            .and_then(|idx| row.get(idx))
            .map_or("", |value| value.trim())
    }
}

/// Read a delimited file. A missing file yields an empty table.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn read_table(path: &Path) -> Result<Table> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "table file missing, treating as empty");
            return Ok(Table::default());
        }
        Err(source) => {
            return Err(Error::FileRead {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let table = parse_table(&bytes)?;
    debug!(
        path = %path.display(),
        columns = table.headers.len(),
        rows = table.rows.len(),
        "read table"
    );
    Ok(table)
}

/// Parse delimited bytes into a [`Table`].
///
/// # Errors
///
/// Returns an error if the content is not valid UTF-8 CSV.
pub fn parse_table(bytes: &[u8]) -> Result<Table> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let delimiter = delimiter_or_default(bytes);
    trace!(delimiter = %char::from(delimiter).escape_default(), "sniffed delimiter");

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let width = headers.len();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row: Vec<String> = record.iter().take(width).map(str::to_string).collect();
        row.resize(width, String::new());
        rows.push(row);
    }

    Ok(Table { headers, rows })
}

/// Read typed rows back from a comma-separated file written by [`write_rows`].
///
/// # Errors
///
/// Returns an error if the file cannot be read or a row does not deserialize.
pub fn read_rows<R: DeserializeOwned>(path: &Path) -> Result<Vec<R>> {
    let file = std::fs::File::open(path).map_err(|source| Error::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);
    let rows = reader
        .deserialize()
        .collect::<std::result::Result<Vec<R>, _>>()?;
    Ok(rows)
}

/// Serialize rows to comma-separated bytes, header taken from the field order.
///
/// # Errors
///
/// Returns an error if a row fails to serialize.
pub fn serialize_rows<R: Serialize>(rows: &[R]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|err| Error::internal(format!("flushing CSV buffer: {err}")))
}

/// Atomically write typed rows to `path`.
///
/// # Errors
///
/// Returns an error if serialization or any file operation fails.
pub fn write_rows<R: Serialize>(path: &Path, rows: &[R]) -> Result<()> {
    let bytes = serialize_rows(rows)?;
    replace_file(path, &bytes)
}

/// Atomically replace `path` with `bytes`, creating parent directories.
///
/// # Errors
///
/// Returns an error if the directory, temporary file or rename fails.
pub fn replace_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let file = staged_file(path, bytes)?;
    file.persist(path).map_err(|err| Error::Persist {
        path: path.to_path_buf(),
        source: err.error,
    })?;
    debug!(path = %path.display(), bytes = bytes.len(), "replaced file");
    Ok(())
}

/// Write `bytes` to a temporary file next to `path`, ready to be persisted.
pub(crate) fn staged_file(path: &Path, bytes: &[u8]) -> Result<NamedTempFile> {
    let dir = parent_dir(path);
    ensure_dir(dir)?;
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    Ok(file)
}

/// Create `dir` and its parents if needed.
pub(crate) fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreate {
        path: dir.to_path_buf(),
        source,
    })
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
