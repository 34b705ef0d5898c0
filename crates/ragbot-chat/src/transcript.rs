//! Transcript export.
//!
//! File format: JSONL in `~/.ragbot/transcripts/ragbot-{timestamp}.jsonl`
//! - Line 1: `{"_type":"metadata","exported_at":"...","vendor":"groq","turns":4}`
//! - Line 2+: `{"role":"user","content":"hello"}`

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use ragbot_core::{Turn, Vendor};

/// Metadata header written as the first line of each export.
#[derive(Debug, Serialize)]
struct TranscriptMetadata {
    #[serde(rename = "_type")]
    record_type: String,
    exported_at: DateTime<Utc>,
    vendor: Vendor,
    turns: usize,
}

/// Write `turns` to a new file under `dir` and return its path.
pub fn export_transcript(turns: &[Turn], vendor: Vendor, dir: &Path) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let exported_at = Utc::now();
    let path = dir.join(format!(
        "ragbot-{}.jsonl",
        exported_at.format("%Y%m%d-%H%M%S%.3f")
    ));

    let mut file = std::io::BufWriter::new(std::fs::File::create(&path)?);

    let meta = TranscriptMetadata {
        record_type: "metadata".to_string(),
        exported_at,
        vendor,
        turns: turns.len(),
    };
    writeln!(file, "{}", serde_json::to_string(&meta)?)?;

    for turn in turns {
        writeln!(file, "{}", serde_json::to_string(turn)?)?;
    }
    file.flush()?;

    debug!("Exported {} turns to {}", turns.len(), path.display());
    Ok(path)
}
