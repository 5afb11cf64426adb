//! Labelled and unlabelled query datasets
//!
//! Rows come from header-named CSV files. The query is read from `Query` or
//! `query`; relevant assessment URLs are gathered from every URL column
//! present, each cell holding a comma-separated list.

use crate::{EvaluationError, Result};
use csv::StringRecord;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Columns checked for the query text, first non-empty wins
pub const QUERY_COLUMNS: [&str; 2] = ["Query", "query"];

/// Columns holding relevant assessment URLs, all are merged
pub const URL_COLUMNS: [&str; 4] = ["Assessment_url", "assessment_url", "url", "relevant_urls"];

/// One dataset row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    /// Row position in the source file
    pub row: usize,
    pub query: Option<String>,
    /// De-duplicated, in first-seen order
    pub relevant_urls: Vec<String>,
}

/// Load every row of a CSV dataset
pub fn load_samples(path: impl AsRef<Path>) -> Result<Vec<Sample>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| EvaluationError::io(path, e))?;

    let samples = parse_samples(file)?;
    if samples.is_empty() {
        info!(path = %path.display(), "Dataset is empty");
    } else if samples.iter().all(|s| s.query.is_none()) {
        return Err(EvaluationError::NoQueries {
            path: path.to_path_buf(),
        });
    }

    info!(path = %path.display(), samples = samples.len(), "Loaded dataset");
    Ok(samples)
}

/// Parse CSV rows from any reader
pub fn parse_samples<R: Read>(reader: R) -> Result<Vec<Sample>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let query_columns = column_indices(&headers, &QUERY_COLUMNS);
    let url_columns = column_indices(&headers, &URL_COLUMNS);

    let mut samples = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;

        let query = query_columns
            .iter()
            .filter_map(|&i| record.get(i))
            .find(|value| !value.is_empty())
            .map(str::to_string);

        let cells = url_columns.iter().filter_map(|&i| record.get(i));
        samples.push(Sample {
            row,
            query,
            relevant_urls: parse_url_list(cells),
        });
    }

    Ok(samples)
}

/// Split each cell on `,`, trim, drop empties and de-duplicate
pub fn parse_url_list<'a, I>(cells: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    cells
        .into_iter()
        .flat_map(|cell| cell.split(','))
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .filter(|url| seen.insert(url.to_string()))
        .map(str::to_string)
        .collect()
}

fn column_indices(headers: &StringRecord, names: &[&str]) -> Vec<usize> {
    names
        .iter()
        .filter_map(|name| headers.iter().position(|header| header == *name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_labelled_rows() {
        let data = "Query,Assessment_url\n\
            \"Java developer, 40 minutes\",\"https://a.example/1, https://a.example/2,,https://a.example/1\"\n\
            Sales role,https://a.example/3\n";

        let samples = parse_samples(data.as_bytes()).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].query.as_deref(), Some("Java developer, 40 minutes"));
        assert_eq!(samples[0].relevant_urls, vec!["https://a.example/1", "https://a.example/2"]);
        assert_eq!(samples[1].relevant_urls, vec!["https://a.example/3"]);
    }

    #[test]
    fn test_lowercase_columns_and_merged_urls() {
        let data = "query,url,relevant_urls\nanalyst,https://a.example/1,\"https://a.example/2,https://a.example/1\"\n";

        let samples = parse_samples(data.as_bytes()).unwrap();
        assert_eq!(samples[0].query.as_deref(), Some("analyst"));
        assert_eq!(samples[0].relevant_urls, vec!["https://a.example/1", "https://a.example/2"]);
    }

    #[test]
    fn test_empty_query_falls_through_to_next_column() {
        let data = "Query,query\n,fallback\n,\n";

        let samples = parse_samples(data.as_bytes()).unwrap();
        assert_eq!(samples[0].query.as_deref(), Some("fallback"));
        assert_eq!(samples[1].query, None);
        assert!(samples[1].relevant_urls.is_empty());
    }

    #[test]
    fn test_unlabelled_rows() {
        let data = "Query\nfirst\nsecond\n";

        let samples = parse_samples(data.as_bytes()).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].row, 1);
        assert!(samples.iter().all(|s| s.relevant_urls.is_empty()));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_samples("/nonexistent/train_data.csv").unwrap_err();
        assert!(matches!(err, EvaluationError::Io { .. }));
    }

    #[test]
    fn test_load_without_queries() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Text,url").unwrap();
        writeln!(file, "hello,https://a.example/1").unwrap();

        let err = load_samples(file.path()).unwrap_err();
        assert!(matches!(err, EvaluationError::NoQueries { .. }));
    }
}
