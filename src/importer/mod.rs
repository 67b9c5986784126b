pub mod parser;

use serde::Serialize;
use std::io::ErrorKind;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::db::BuildingStore;
pub use parser::{decode_line, parse_line, LineError};

/// Per-file counters. Blank lines are not counted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IngestionSummary {
    pub success_count: usize,
    pub error_count: usize,
    pub total_count: usize,
    pub success_rate: f64,
}

impl IngestionSummary {
    pub fn from_counts(success_count: usize, error_count: usize) -> Self {
        let total_count = success_count + error_count;
        let success_rate = if total_count > 0 {
            success_count as f64 / total_count as f64 * 100.0
        } else {
            0.0
        };

        Self {
            success_count,
            error_count,
            total_count,
            success_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IngestionReport {
    Completed(IngestionSummary),
    /// The file could not be opened or read; nothing was processed.
    Failed { message: String },
}

impl IngestionReport {
    pub fn is_success(&self) -> bool {
        matches!(self, IngestionReport::Completed(_))
    }
}

/// Insert every `<WKT>,<height>` line of `path` into `store`.
///
/// Each line is parsed and inserted on its own. A bad line is counted and
/// skipped, and rows inserted before a failure stay in place. Only a file
/// that cannot be opened or read produces [`IngestionReport::Failed`].
pub async fn ingest_file(store: &dyn BuildingStore, path: impl AsRef<Path>) -> IngestionReport {
    let path = path.as_ref();
    tracing::info!("Inserting buildings from file: {}", path.display());

    let lines = match read_lines(path).await {
        Ok(lines) => lines,
        Err(message) => {
            tracing::error!("{}: {}", path.display(), message);
            return IngestionReport::Failed { message };
        }
    };

    tracing::info!("Read {} lines from file", lines.len());

    let mut success_count = 0;
    let mut error_count = 0;

    for (idx, raw) in lines.iter().enumerate() {
        let line_num = idx + 1;
        let result = match decode_line(raw) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                process_line(store, line).await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(id) => {
                success_count += 1;
                tracing::info!("Line {}: inserted building {}", line_num, id);
            }
            Err(e) => {
                error_count += 1;
                tracing::warn!("Line {}: {}", line_num, e);
            }
        }
    }

    let summary = IngestionSummary::from_counts(success_count, error_count);

    tracing::info!(
        "File ingestion completed: {} inserted, {} failed, success rate {:.1}%",
        summary.success_count,
        summary.error_count,
        summary.success_rate
    );

    IngestionReport::Completed(summary)
}

// 行単位でUTF-8デコードする（不正な行だけを失敗扱いにするため）
async fn read_lines(path: &Path) -> Result<Vec<Vec<u8>>, String> {
    let file = tokio::fs::File::open(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => "File not found".to_string(),
        _ => format!("Failed to open file: {}", e),
    })?;

    let mut reader = BufReader::new(file).split(b'\n');
    let mut lines = Vec::new();
    loop {
        match reader.next_segment().await {
            Ok(Some(line)) => lines.push(line),
            Ok(None) => break,
            Err(e) => return Err(format!("Error reading file: {}", e)),
        }
    }

    Ok(lines)
}

async fn process_line(store: &dyn BuildingStore, line: &str) -> Result<i64, LineError> {
    let building = parse_line(line)?;
    store.insert_building(&building).await?;
    Ok(building.id)
}
