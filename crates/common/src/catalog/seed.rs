//! Catalog seeding
//!
//! Materialises a catalog of at least [`MIN_CATALOG_SIZE`] records from a
//! base list of real assessments, previously generated records, and
//! numbered variations of the base list.

use super::{AssessmentRecord, DatasetError};
use crate::MIN_CATALOG_SIZE;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// CSV export header
pub const CSV_HEADER: &str = "name,url,description,duration,test_type,adaptive_support,remote_support";

/// Read a JSON list of records without any size validation
pub fn read_records(path: &Path) -> Result<Vec<AssessmentRecord>, DatasetError> {
    let data = std::fs::read_to_string(path).map_err(|source| DatasetError::Unreadable {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&data)?)
}

/// Read a previously generated catalog; a missing or unparsable file yields
/// an empty list so seeding can start from scratch.
pub fn read_existing(path: &Path) -> Vec<AssessmentRecord> {
    match read_records(path) {
        Ok(records) => records,
        Err(e) => {
            tracing::info!(
                path = %path.display(),
                reason = %e,
                "No existing assessments found, creating new dataset"
            );
            Vec::new()
        }
    }
}

/// Combine base and existing records, then pad with variations up to the
/// minimum catalog size.
pub fn expand_catalog(
    base: &[AssessmentRecord],
    existing: Vec<AssessmentRecord>,
) -> Result<Vec<AssessmentRecord>, DatasetError> {
    let mut combined = base.to_vec();

    let remaining = MIN_CATALOG_SIZE.saturating_sub(base.len());
    if remaining > 0 {
        combined.extend(existing.into_iter().take(remaining));
    }

    if combined.len() < MIN_CATALOG_SIZE && base.is_empty() {
        return Err(DatasetError::EmptySeed);
    }

    while combined.len() < MIN_CATALOG_SIZE {
        let template = &base[combined.len() % base.len()];
        let variation = (combined.len() / base.len()) as u32 + 1;

        combined.push(AssessmentRecord {
            name: format!("{} - Variation {}", template.name, variation),
            url: format!("{}?v={}", template.url, variation),
            duration: template.duration + variation * 5,
            ..template.clone()
        });
    }

    for (index, record) in combined.iter_mut().enumerate() {
        record.index = index;
    }

    Ok(combined)
}

/// Write records as pretty-printed JSON
pub fn write_json(path: &Path, records: &[AssessmentRecord]) -> Result<(), DatasetError> {
    let data = serde_json::to_string_pretty(records)?;
    ensure_parent(path)?;
    std::fs::write(path, data).map_err(|e| DatasetError::Write {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Write records as CSV; test-type labels are joined with `"; "`
pub fn write_csv(path: &Path, records: &[AssessmentRecord]) -> Result<(), DatasetError> {
    let write_err = |message: String| DatasetError::Write {
        path: path.display().to_string(),
        message,
    };

    ensure_parent(path)?;
    let mut file = File::create(path).map_err(|e| write_err(e.to_string()))?;
    writeln!(file, "{}", CSV_HEADER).map_err(|e| write_err(e.to_string()))?;

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::NonNumeric)
        .from_writer(file);

    for record in records {
        writer
            .write_record([
                record.name.clone(),
                record.url.clone(),
                record.description.clone(),
                record.duration.to_string(),
                record.test_type.joined("; "),
                record.adaptive_support.to_string(),
                record.remote_support.to_string(),
            ])
            .map_err(|e| write_err(e.to_string()))?;
    }

    writer.flush().map_err(|e| write_err(e.to_string()))
}

fn ensure_parent(path: &Path) -> Result<(), DatasetError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|e| DatasetError::Write {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        }
        _ => Ok(()),
    }
}
