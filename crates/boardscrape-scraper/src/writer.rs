//! Delimited-file output with atomic replacement.

use crate::error::{Result, ScrapeError};
use boardscrape_core::{LeaderboardSnapshot, OutputConfig, OutputFormat, Timestamp};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Where a snapshot ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFileInfo {
    /// Final, timestamp-suffixed path
    pub path: PathBuf,
    /// Data rows written, excluding the header line
    pub rows: usize,
    /// File size in bytes
    pub bytes: u64,
}

/// Insert `_YYYYMMDD_HHMMSS` before the extension of `path`.
pub fn timestamped_path(path: &Path, at: Timestamp) -> Result<PathBuf> {
    let stem = path
        .file_stem()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            ScrapeError::write(
                path,
                io::Error::new(io::ErrorKind::InvalidInput, "output path has no file name"),
            )
        })?;

    let mut name = stem.to_os_string();
    name.push("_");
    name.push(at.file_suffix());
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    Ok(path.with_file_name(name))
}

/// Writes snapshots as CSV or TSV.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotWriter {
    format: OutputFormat,
}

impl SnapshotWriter {
    /// Writer emitting `format`.
    #[must_use]
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Writer for the configured output format.
    #[must_use]
    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(config.format)
    }

    /// Delimited format this writer emits.
    #[must_use]
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Write `snapshot` next to `output_path`, suffixed with its timestamp.
    ///
    /// Rows go to a temporary sibling that is renamed into place once
    /// flushed, so the final path is either complete or absent.
    pub fn write(
        &self,
        snapshot: &LeaderboardSnapshot,
        output_path: &Path,
    ) -> Result<WrittenFileInfo> {
        let path = timestamped_path(output_path, snapshot.scraped_at())?;
        let parent = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };

        fs::create_dir_all(&parent).map_err(|e| ScrapeError::write(&parent, e))?;

        let mut staged = tempfile::Builder::new()
            .prefix(".boardscrape-")
            .suffix(".tmp")
            .tempfile_in(&parent)
            .map_err(|e| ScrapeError::write(&path, e))?;

        self.encode(snapshot, staged.as_file_mut())
            .and_then(|()| publish_mode(staged.as_file()))
            .and_then(|()| staged.as_file().sync_all())
            .map_err(|e| ScrapeError::write(&path, e))?;

        let file = staged
            .persist(&path)
            .map_err(|e| ScrapeError::write(&path, e.error))?;
        let bytes = file
            .metadata()
            .map_err(|e| ScrapeError::write(&path, e))?
            .len();

        tracing::info!(
            path = %path.display(),
            rows = snapshot.rows().len(),
            bytes,
            "Wrote snapshot"
        );

        Ok(WrittenFileInfo {
            path,
            rows: snapshot.rows().len(),
            bytes,
        })
    }

    fn encode<W: Write>(&self, snapshot: &LeaderboardSnapshot, sink: W) -> io::Result<()> {
        let mut out = csv::WriterBuilder::new()
            .delimiter(self.format.delimiter())
            .quote_style(csv::QuoteStyle::Necessary)
            .from_writer(sink);

        out.write_record(snapshot.columns()).map_err(into_io)?;
        for row in snapshot.rows() {
            out.write_record(row.values()).map_err(into_io)?;
        }
        out.flush()
    }
}

impl Default for SnapshotWriter {
    fn default() -> Self {
        Self::new(OutputFormat::Csv)
    }
}

/// Staged files start owner-only; open them up to the usual `rw-r--r--`.
#[cfg(unix)]
fn publish_mode(file: &fs::File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn publish_mode(_file: &fs::File) -> io::Result<()> {
    Ok(())
}

fn into_io(err: csv::Error) -> io::Error {
    if !err.is_io_error() {
        return io::Error::other(err);
    }
    match err.into_kind() {
        csv::ErrorKind::Io(e) => e,
        kind => io::Error::other(format!("{kind:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WriteFailureKind;
    use boardscrape_core::{ColumnSchema, Row};
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn at() -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap())
    }

    fn snapshot() -> LeaderboardSnapshot {
        let columns = ColumnSchema::new(vec![
            "API Provider".to_string(),
            "Model".to_string(),
            "Notes".to_string(),
        ]);
        let rows = vec![
            Row::aligned(
                vec!["OpenAI".into(), "GPT-5".into(), "fast, cheap".into()],
                3,
            ),
            Row::aligned(
                vec![
                    "Anthropic".into(),
                    "Claude \"Opus\"".into(),
                    "line one\nline two".into(),
                ],
                3,
            ),
        ];
        LeaderboardSnapshot::new(columns, rows, at(), "https://example.com")
    }

    fn read_back(path: &Path, delimiter: u8) -> (Vec<String>, Vec<Vec<String>>) {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .from_path(path)
            .unwrap();
        let headers = reader.headers().unwrap().iter().map(String::from).collect();
        let rows = reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect();
        (headers, rows)
    }

    #[test]
    fn test_timestamped_path() {
        assert_eq!(
            timestamped_path(Path::new("output/leaderboard.csv"), at()).unwrap(),
            PathBuf::from("output/leaderboard_20250314_092653.csv")
        );
        assert_eq!(
            timestamped_path(Path::new("board"), at()).unwrap(),
            PathBuf::from("board_20250314_092653")
        );
        assert!(timestamped_path(Path::new(""), at()).is_err());
    }

    #[test]
    fn test_csv_round_trip() {
        let dir = TempDir::new().unwrap();
        let snap = snapshot();

        let info = SnapshotWriter::default()
            .write(&snap, &dir.path().join("leaderboard.csv"))
            .unwrap();

        assert_eq!(info.rows, 2);
        assert!(info.bytes > 0);
        let (headers, rows) = read_back(&info.path, b',');
        assert_eq!(headers, snap.columns().names());
        let expected: Vec<Vec<String>> = snap.rows().iter().map(|r| r.values().to_vec()).collect();
        assert_eq!(rows, expected);
    }

    #[test]
    fn test_creates_missing_directories() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("nested/deeper/board.csv");

        let info = SnapshotWriter::default().write(&snapshot(), &target).unwrap();

        assert_eq!(
            info.path,
            dir.path().join("nested/deeper/board_20250314_092653.csv")
        );
        assert!(info.path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_written_file_is_readable_by_others() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let info = SnapshotWriter::default()
            .write(&snapshot(), &dir.path().join("board.csv"))
            .unwrap();

        let mode = fs::metadata(&info.path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn test_tsv_output() {
        let dir = TempDir::new().unwrap();

        let info = SnapshotWriter::new(OutputFormat::Tsv)
            .write(&snapshot(), &dir.path().join("board.tsv"))
            .unwrap();

        let text = fs::read_to_string(&info.path).unwrap();
        assert!(text.starts_with("API Provider\tModel\tNotes\n"));
        let (_, rows) = read_back(&info.path, b'\t');
        assert_eq!(rows[0], vec!["OpenAI", "GPT-5", "fast, cheap"]);
    }

    #[test]
    fn test_header_only_snapshot() {
        let dir = TempDir::new().unwrap();
        let snap = LeaderboardSnapshot::new(
            ColumnSchema::new(vec!["Provider".to_string()]),
            Vec::new(),
            at(),
            "u",
        );

        let info = SnapshotWriter::default()
            .write(&snap, &dir.path().join("empty.csv"))
            .unwrap();

        assert_eq!(info.rows, 0);
        assert_eq!(fs::read_to_string(&info.path).unwrap(), "Provider\n");
    }

    #[test]
    fn test_failed_write_leaves_nothing_and_can_be_retried() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let snap = snapshot();
        let writer = SnapshotWriter::default();

        let err = writer.write(&snap, &blocker.join("board.csv")).unwrap_err();
        assert!(matches!(err, ScrapeError::Write { .. }));

        let info = writer.write(&snap, &dir.path().join("board.csv")).unwrap();
        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries.len(), 2, "only the blocker and the output remain");
        assert!(info.path.exists());
    }

    #[test]
    fn test_invalid_path_classification() {
        let err = SnapshotWriter::default()
            .write(&snapshot(), Path::new(""))
            .unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::Write {
                kind: WriteFailureKind::InvalidPath,
                ..
            }
        ));
    }
}
