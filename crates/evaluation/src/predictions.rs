//! Top-1 predictions for an unlabelled test set

use crate::dataset::Sample;
use crate::{EvaluationError, Recommender, Result};
use std::io::Write;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Required first line of a predictions file
pub const PREDICTIONS_HEADER: &str = "Query,Assessment_url";

const PROGRESS_INTERVAL: usize = 10;

/// One output row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    pub query: String,
    /// Empty when the recommendation failed or returned nothing
    pub assessment_url: String,
}

/// Predict the top assessment URL for every sample with a query.
///
/// Rows without a query are skipped. A failed recommendation still emits a
/// row with an empty URL so output order matches input order.
pub async fn generate<R>(recommender: &R, samples: &[Sample]) -> Vec<Prediction>
where
    R: Recommender + ?Sized,
{
    info!(samples = samples.len(), "Generating predictions");

    let mut predictions = Vec::with_capacity(samples.len());
    for (i, sample) in samples.iter().enumerate() {
        let Some(query) = sample.query.as_deref() else {
            warn!(row = sample.row, "No query found for sample");
            continue;
        };

        let assessment_url = match recommender.recommend_urls(query).await {
            Ok(urls) => urls.into_iter().next().unwrap_or_default(),
            Err(e) => {
                error!(row = sample.row, error = %e, "Error generating prediction");
                String::new()
            }
        };

        predictions.push(Prediction {
            query: query.to_string(),
            assessment_url,
        });

        if i % PROGRESS_INTERVAL == 0 {
            debug!(generated = i + 1, total = samples.len(), "Prediction progress");
        }
    }

    predictions
}

/// Write predictions as CSV with every field quoted
pub fn write_predictions(path: impl AsRef<Path>, predictions: &[Prediction]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| EvaluationError::io(parent, e))?;
    }

    let mut file = std::fs::File::create(path).map_err(|e| EvaluationError::io(path, e))?;
    writeln!(file, "{}", PREDICTIONS_HEADER).map_err(|e| EvaluationError::io(path, e))?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::NonNumeric)
        .from_writer(file);
    for prediction in predictions {
        writer.write_record([prediction.query.as_str(), prediction.assessment_url.as_str()])?;
    }
    writer.flush().map_err(|e| EvaluationError::io(path, e))?;

    info!(path = %path.display(), predictions = predictions.len(), "Predictions saved");
    Ok(())
}

/// Check a written predictions file and return its row count.
///
/// The header must match exactly; rows without an `https://` URL are only
/// warned about.
pub fn validate_predictions(path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| EvaluationError::io(path, e))?;

    let header = content.lines().next().unwrap_or_default().trim_end_matches('\r');
    if header != PREDICTIONS_HEADER {
        return Err(EvaluationError::InvalidHeader {
            expected: PREDICTIONS_HEADER.to_string(),
            found: header.to_string(),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = 0;
    for record in reader.records() {
        let record = record?;
        rows += 1;

        let url = record.get(1).unwrap_or_default();
        if !url.starts_with("https://") {
            warn!(line = rows + 1, url, "Prediction row may have formatting issues");
        }
    }

    info!(path = %path.display(), predictions = rows, "Prediction file format validated");
    Ok(rows)
}
