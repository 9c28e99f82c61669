//! Persists scan output to a directory.
//!
//! Two artifacts per run:
//!   - `live_candidates.jsonl`: one JSON object per gate-passing result, in rank order
//!   - `live_scan_summary.json`: the pretty-printed run summary
//!
//! Each file is written to a `.tmp` sibling and renamed into place so readers
//! never observe a partial file.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::info;

use crate::error::ScanError;
use crate::scan::types::ScanReport;

pub const CANDIDATES_FILE: &str = "live_candidates.jsonl";
pub const SUMMARY_FILE: &str = "live_scan_summary.json";

#[derive(Clone, Debug)]
pub struct ResultSink {
    dir: PathBuf,
}

impl ResultSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn candidates_path(&self) -> PathBuf {
        self.dir.join(CANDIDATES_FILE)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.dir.join(SUMMARY_FILE)
    }

    /// Writes both artifacts. The summary is written even when no symbol
    /// passed the gates, in which case the candidates file is empty.
    pub async fn write(&self, report: &ScanReport) -> Result<(), ScanError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| ScanError::Persistence {
                path: self.dir.clone(),
                source,
            })?;

        let mut jsonl = String::new();
        let mut written = 0usize;
        for candidate in report.candidates() {
            let line = serde_json::to_string(candidate).map_err(|source| ScanError::Serialize {
                what: "candidate",
                source,
            })?;
            jsonl.push_str(&line);
            jsonl.push('\n');
            written += 1;
        }

        let summary = serde_json::to_string_pretty(&report.summary)
            .map_err(|source| ScanError::Serialize {
                what: "summary",
                source,
            })?;

        let candidates_path = self.candidates_path();
        let summary_path = self.summary_path();
        write_atomic(&candidates_path, jsonl.as_bytes()).await?;
        write_atomic(&summary_path, summary.as_bytes()).await?;

        info!(
            candidates = written,
            candidates_path = %candidates_path.display(),
            summary_path = %summary_path.display(),
            "scan results written"
        );
        Ok(())
    }
}

async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), ScanError> {
    let tmp = path.with_extension("tmp");
    let persistence = |source| ScanError::Persistence {
        path: path.to_path_buf(),
        source,
    };

    let res = match fs::write(&tmp, contents).await {
        Ok(()) => fs::rename(&tmp, path).await,
        Err(e) => Err(e),
    };
    if let Err(e) = res {
        // Best effort.
        let _ = fs::remove_file(&tmp).await;
        return Err(persistence(e));
    }
    Ok(())
}
