//! CSV file source with modification-time aware caching.
//!
//! ## Cache Rules
//!
//! - Parsed rows are reused while the file's mtime is unchanged **and**
//!   the entry is younger than the TTL.
//! - Either condition failing forces a full re-read.
//! - The whole check → read → store sequence runs under one async lock.
//!
//! ## Parse Rules
//!
//! - First record is the header; columns are matched by name.
//! - Fields are trimmed; every value stays a string.
//! - Rows with a wrong field count are kept (missing columns are empty) and
//!   reported; undecodable rows are reported and skipped.
//! - Empty lines are skipped, but a row of blank fields is kept so later
//!   rows keep their position-based ids.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant, SystemTime};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::{COLUMNS, DataConfig, RawRow, header_index};
use crate::storage::{ListingSource, LoadOutcome};

/// Diagnostics beyond this count are summarized instead of logged one by one.
const MAX_LOGGED_DIAGNOSTICS: usize = 10;

/// A row-level problem found while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    /// 1-based line in the source, when known
    pub line: Option<u64>,
    pub message: String,
}

/// Rows parsed from one file read.
#[derive(Debug, Default)]
pub struct ParsedRows {
    pub rows: Vec<RawRow>,
    pub diagnostics: Vec<ParseDiagnostic>,
}

/// Parse CSV bytes into rows.
///
/// Fails only when the header cannot be read.
pub fn parse_rows(data: &[u8]) -> Result<ParsedRows> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(::csv::Trim::All)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let index = header_index(headers.iter());
    let mut parsed = ParsedRows::default();

    if !headers.is_empty() {
        let missing: Vec<&str> = COLUMNS
            .iter()
            .copied()
            .filter(|c| !index.contains_key(*c))
            .collect();
        if !missing.is_empty() {
            parsed.diagnostics.push(ParseDiagnostic {
                line: Some(1),
                message: format!("header is missing columns: {}", missing.join(", ")),
            });
        }
    }

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                parsed.diagnostics.push(ParseDiagnostic {
                    line: e.position().map(|p| p.line()),
                    message: format!("skipped undecodable row: {e}"),
                });
                continue;
            }
        };

        let line = record.position().map(|p| p.line());
        if record.len() != headers.len() {
            parsed.diagnostics.push(ParseDiagnostic {
                line,
                message: format!(
                    "expected {} fields, found {}",
                    headers.len(),
                    record.len()
                ),
            });
        }

        let row = RawRow::from_fields(&index, |i| record.get(i));
        if row.is_blank() {
            parsed.diagnostics.push(ParseDiagnostic {
                line,
                message: "row has only blank fields".to_string(),
            });
        }
        parsed.rows.push(row);
    }

    Ok(parsed)
}

/// Resolve `.` and `..` without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Cached result of the last successful read.
#[derive(Debug)]
struct FileCacheEntry {
    rows: Arc<[RawRow]>,
    modified: SystemTime,
    loaded_at: Instant,
}

/// CSV-backed listing source.
#[derive(Debug)]
pub struct CsvLoader {
    base_dir: PathBuf,
    path: PathBuf,
    ttl: Duration,
    state: Mutex<Option<FileCacheEntry>>,
    reads: AtomicUsize,
}

impl CsvLoader {
    /// Create a loader for the configured source file.
    pub fn new(config: &DataConfig) -> Self {
        Self::with_paths(&config.base_dir, &config.file_name, config.cache_ttl())
    }

    /// Create a loader for `base_dir/file_name`.
    pub fn with_paths(
        base_dir: impl Into<PathBuf>,
        file_name: impl AsRef<Path>,
        ttl: Duration,
    ) -> Self {
        let base_dir = base_dir.into();
        let path = base_dir.join(file_name);
        Self {
            base_dir,
            path,
            ttl,
            state: Mutex::new(None),
            reads: AtomicUsize::new(0),
        }
    }

    /// Configured (unresolved) source path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of times the file has actually been read.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    /// Whether parsed rows are currently held.
    pub async fn is_cached(&self) -> bool {
        self.state.lock().await.is_some()
    }

    /// Check that the source path stays inside the base directory.
    ///
    /// Returns the canonical path, or `Ok(None)` when either path does not
    /// exist.
    async fn resolve(&self) -> Result<Option<PathBuf>> {
        let lexical_base = normalize_lexically(&self.base_dir);
        let lexical_path = normalize_lexically(&self.path);
        if !lexical_path.starts_with(&lexical_base) {
            return Err(AppError::path_violation(lexical_path, lexical_base));
        }

        let Ok(base) = tokio::fs::canonicalize(&self.base_dir).await else {
            return Ok(None);
        };
        let Ok(path) = tokio::fs::canonicalize(&self.path).await else {
            return Ok(None);
        };

        if !path.starts_with(&base) {
            return Err(AppError::path_violation(path, base));
        }
        Ok(Some(path))
    }

    fn unavailable(&self, reason: String) -> LoadOutcome {
        log::error!("CSV source unavailable ({}): {}", self.path.display(), reason);
        LoadOutcome::unavailable(reason)
    }
}

#[async_trait]
impl ListingSource for CsvLoader {
    async fn load(&self) -> Result<LoadOutcome> {
        let mut state = self.state.lock().await;

        let Some(path) = self.resolve().await? else {
            return Ok(self.unavailable("source file not found".to_string()));
        };

        let modified = match tokio::fs::metadata(&path).await.and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(e) => return Ok(self.unavailable(format!("cannot stat source file: {e}"))),
        };

        if let Some(entry) = state.as_ref() {
            if entry.modified == modified && entry.loaded_at.elapsed() < self.ttl {
                log::debug!("CSV data loaded from cache ({} rows)", entry.rows.len());
                return Ok(LoadOutcome::Loaded(Arc::clone(&entry.rows)));
            }
        }

        log::info!("Loading CSV data from {}", path.display());
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) => return Ok(self.unavailable(format!("cannot read source file: {e}"))),
        };
        self.reads.fetch_add(1, Ordering::Relaxed);

        let parsed = match parse_rows(&bytes) {
            Ok(parsed) => parsed,
            Err(e) => return Ok(self.unavailable(format!("cannot parse source file: {e}"))),
        };

        for diagnostic in parsed.diagnostics.iter().take(MAX_LOGGED_DIAGNOSTICS) {
            log::warn!(
                "CSV parse issue at line {}: {}",
                diagnostic
                    .line
                    .map(|l| l.to_string())
                    .unwrap_or_else(|| "?".to_string()),
                diagnostic.message
            );
        }
        if parsed.diagnostics.len() > MAX_LOGGED_DIAGNOSTICS {
            log::warn!(
                "CSV parse issues: {} more not shown",
                parsed.diagnostics.len() - MAX_LOGGED_DIAGNOSTICS
            );
        }

        let rows: Arc<[RawRow]> = parsed.rows.into();
        log::info!(
            "Loaded {} rows ({} parse issues)",
            rows.len(),
            parsed.diagnostics.len()
        );

        *state = Some(FileCacheEntry {
            rows: Arc::clone(&rows),
            modified,
            loaded_at: Instant::now(),
        });

        Ok(LoadOutcome::Loaded(rows))
    }

    async fn clear(&self) {
        *self.state.lock().await = None;
        log::info!("CSV cache cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const HEADER: &str = "company_name,post_name,registration_date,deadline,qualification_agent,qualification_education,qualification_career,region,Field,keywords_list,source_info,source_type,update_date,status";

    fn csv_with(rows: &[&str]) -> String {
        let mut out = String::from(HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out.push('\n');
        out
    }

    const ROW_A: &str = "삼성전자,AI 연구원,2025-06-15,2025-07-31,\"신규, 편입\",석사,신입,서울특별시 강남구,AI/ML,\"['Python', 'PyTorch']\",https://example.com/1,rndjob,2025-06-15 10:00:00,open";
    const ROW_B: &str = "SK하이닉스,공정 엔지니어,2025-06-10,상시채용,신규,학사,신입,경기도 이천시,반도체,공정 개발,https://example.com/2,military,2025-06-10 09:00:00,open";

    fn bump_mtime(path: &Path) {
        let file = fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(60))
            .unwrap();
    }

    fn loader_for(tmp: &TempDir, ttl: Duration) -> CsvLoader {
        CsvLoader::with_paths(tmp.path(), "jobs.csv", ttl)
    }

    #[test]
    fn test_parse_trims_and_keeps_strings() {
        let data = csv_with(&[ROW_A, ROW_B]);
        let parsed = parse_rows(data.as_bytes()).unwrap();

        assert_eq!(parsed.rows.len(), 2);
        let row = &parsed.rows[0];
        assert_eq!(row.company_name, "삼성전자");
        assert_eq!(row.qualification_agent, "신규, 편입");
        assert_eq!(row.field, "AI/ML");
        assert_eq!(row.keywords_list, "['Python', 'PyTorch']");
        assert_eq!(row.status, "open");
    }

    #[test]
    fn test_blank_fields_row_keeps_position() {
        let data = csv_with(&[ROW_A, "", "  ,  ,  ", ROW_B]);
        let parsed = parse_rows(data.as_bytes()).unwrap();

        // The empty line is dropped; the blank-field row holds slot 2
        assert_eq!(parsed.rows.len(), 3);
        assert!(parsed.rows[1].is_blank());
        assert_eq!(parsed.rows[2].company_name, "SK하이닉스");
        assert!(
            parsed
                .diagnostics
                .iter()
                .any(|d| d.message.contains("only blank fields"))
        );
    }

    #[test]
    fn test_parse_short_row_is_kept_with_diagnostic() {
        let data = csv_with(&[ROW_A, "카카오,백엔드 개발자"]);
        let parsed = parse_rows(data.as_bytes()).unwrap();

        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[1].company_name, "카카오");
        assert_eq!(parsed.rows[1].deadline, "");
        assert!(
            parsed
                .diagnostics
                .iter()
                .any(|d| d.message.contains("expected 14 fields"))
        );
    }

    #[test]
    fn test_parse_reports_missing_columns() {
        let parsed = parse_rows("company_name,post_name\n네이버,dev\n".as_bytes()).unwrap();
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0].company_name, "네이버");
        assert!(parsed.diagnostics[0].message.contains("Field"));
    }

    #[test]
    fn test_parse_skips_undecodable_row() {
        let mut data = csv_with(&[ROW_A]).into_bytes();
        data.extend_from_slice(b"\xff\xfe,broken\n");
        let parsed = parse_rows(&data).unwrap();

        assert_eq!(parsed.rows.len(), 1);
        assert!(!parsed.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn test_second_load_hits_cache() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("jobs.csv"), csv_with(&[ROW_A, ROW_B])).unwrap();
        let loader = loader_for(&tmp, Duration::from_secs(300));

        let first = loader.load().await.unwrap();
        let second = loader.load().await.unwrap();

        assert_eq!(first.rows().unwrap().len(), 2);
        assert_eq!(first.rows(), second.rows());
        assert_eq!(loader.read_count(), 1);
        assert!(loader.is_cached().await);
    }

    #[tokio::test]
    async fn test_mtime_change_forces_reload() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("jobs.csv");
        fs::write(&path, csv_with(&[ROW_A])).unwrap();
        let loader = loader_for(&tmp, Duration::from_secs(300));

        assert_eq!(loader.load().await.unwrap().rows().unwrap().len(), 1);

        fs::write(&path, csv_with(&[ROW_A, ROW_B])).unwrap();
        bump_mtime(&path);

        let reloaded = loader.load().await.unwrap();
        assert_eq!(reloaded.rows().unwrap().len(), 2);
        assert_eq!(loader.read_count(), 2);
    }

    #[tokio::test]
    async fn test_expired_ttl_forces_reload() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("jobs.csv"), csv_with(&[ROW_A])).unwrap();
        let loader = loader_for(&tmp, Duration::ZERO);

        loader.load().await.unwrap();
        loader.load().await.unwrap();
        assert_eq!(loader.read_count(), 2);
    }

    #[tokio::test]
    async fn test_clear_forces_reload() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("jobs.csv"), csv_with(&[ROW_A])).unwrap();
        let loader = loader_for(&tmp, Duration::from_secs(300));

        loader.load().await.unwrap();
        loader.clear().await;
        assert!(!loader.is_cached().await);
        loader.load().await.unwrap();
        assert_eq!(loader.read_count(), 2);
    }

    #[tokio::test]
    async fn test_missing_file_is_unavailable() {
        let tmp = TempDir::new().unwrap();
        let loader = loader_for(&tmp, Duration::from_secs(300));

        let outcome = loader.load().await.unwrap();
        assert!(outcome.is_unavailable());
        assert_eq!(loader.read_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_file_is_loaded_not_unavailable() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("jobs.csv"), format!("{HEADER}\n")).unwrap();
        let loader = loader_for(&tmp, Duration::from_secs(300));

        let outcome = loader.load().await.unwrap();
        assert!(!outcome.is_unavailable());
        assert!(outcome.rows().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_path_escape_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let base = tmp.path().join("data");
        fs::create_dir(&base).unwrap();
        fs::write(tmp.path().join("secret.csv"), csv_with(&[ROW_A])).unwrap();

        let loader = CsvLoader::with_paths(&base, "../secret.csv", Duration::from_secs(300));
        let err = loader.load().await.unwrap_err();
        assert!(matches!(err, AppError::PathViolation { .. }));
    }

    #[test]
    fn test_normalize_lexically() {
        assert_eq!(
            normalize_lexically(Path::new("data/./a/../jobs.csv")),
            PathBuf::from("data/jobs.csv")
        );
        assert_eq!(
            normalize_lexically(Path::new("data/../../x.csv")),
            PathBuf::from("../x.csv")
        );
    }
}
