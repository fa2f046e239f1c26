//! CSV export with a compliance preamble.
//!
//! A written file looks like this:
//!
//! ```text
//! # Reddit Data Collection Report
//! # Collection Time: 2024-05-01 12:00:00
//! # Data Source: Reddit API (official)
//! # Purpose: Research/Analysis (non-commercial)
//! # Compliance: Reddit ToS compliant collection
//! # Retention: Delete within 48 hours per Reddit guidelines
//! # Total Posts: 2
//!
//! title,url,score,created_date,id,num_comments,is_self,subreddit
//! ...
//! ```

use chrono::{DateTime, Utc};
use harvest_core::{CoreError, PostRecord, TIMESTAMP_FORMAT};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};


const FILENAME_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    /// Nothing to write; no file was touched.
    Skipped,
    Written { path: PathBuf, records: usize },
}

/// `{community}_posts_{YYYYMMDD_HHMMSS}.csv`
pub fn output_filename(community: &str, at: DateTime<Utc>) -> String {
    format!(
        "{}_posts_{}.csv",
        community,
        at.format(FILENAME_TIMESTAMP_FORMAT)
    )
}

/// Writes `records` to `path`, stamping the preamble with the current time.
pub fn persist(records: &[PostRecord], path: &Path) -> Result<PersistOutcome, CoreError> {
    persist_at(records, path, Utc::now())
}

pub fn persist_at(
    records: &[PostRecord],
    path: &Path,
    collected_at: DateTime<Utc>,
) -> Result<PersistOutcome, CoreError> {
    if records.is_empty() {
        info!("No posts to save, skipping {}", path.display());
        return Ok(PersistOutcome::Skipped);
    }

    let mut file = BufWriter::new(File::create(path)?);
    write_preamble(&mut file, records.len(), collected_at)?;

    // Rows end in `\n` like the preamble above them.
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(file);
    for record in records {
        writer.serialize(record)?;
    }

    let mut file = writer.into_inner().map_err(|e| e.into_error())?;
    file.flush()?;

    info!("Saved {} posts to {}", records.len(), path.display());
    Ok(PersistOutcome::Written {
        path: path.to_path_buf(),
        records: records.len(),
    })
}

fn write_preamble<W: Write>(
    out: &mut W,
    total: usize,
    collected_at: DateTime<Utc>,
) -> std::io::Result<()> {
    writeln!(out, "# Reddit Data Collection Report")?;
    writeln!(
        out,
        "# Collection Time: {}",
        collected_at.format(TIMESTAMP_FORMAT)
    )?;
    writeln!(out, "# Data Source: Reddit API (official)")?;
    writeln!(out, "# Purpose: Research/Analysis (non-commercial)")?;
    writeln!(out, "# Compliance: Reddit ToS compliant collection")?;
    writeln!(out, "# Retention: Delete within 48 hours per Reddit guidelines")?;
    writeln!(out, "# Total Posts: {}", total)?;
    writeln!(out)
}

/// Reads a persisted file back, ignoring the preamble.
pub fn read_records(path: &Path) -> Result<Vec<PostRecord>, CoreError> {
    let contents = std::fs::read_to_string(path)?;
    // The preamble ends at the first blank line; titles may start with '#'.
    let body = contents
        .split_once("\n\n")
        .map_or(contents.as_str(), |(_, body)| body);

    let records = csv::Reader::from_reader(body.as_bytes())
        .deserialize()
        .collect::<Result<Vec<PostRecord>, _>>()?;

    debug!("Read {} posts from {}", records.len(), path.display());
    Ok(records)
}
