use crate::domain::model::{RawTable, Record, Sample};
use crate::utils::error::{ChartError, RejectReason, Result};
use serde::Serialize;
use std::collections::HashMap;

pub const SAMPLE_COLUMN: &str = "Sample";
pub const LL_COLUMN: &str = "LL";
pub const PL_COLUMN: &str = "PL";
pub const REQUIRED_COLUMNS: [&str; 3] = [SAMPLE_COLUMN, LL_COLUMN, PL_COLUMN];

/// Header spellings produced by the lab spreadsheets.
pub const DEFAULT_COLUMN_ALIASES: [(&str, &str); 3] = [
    ("Boring Name", SAMPLE_COLUMN),
    ("LL (Liquid Limit)", LL_COLUMN),
    ("PL (Plastic Limit)", PL_COLUMN),
];

/// Row cap used for manual entry.
pub const MANUAL_ENTRY_MAX_ROWS: usize = 20;

#[derive(Debug, Clone, Default)]
pub struct DatasetOptions {
    /// `None` means unbounded.
    pub max_rows: Option<usize>,
    /// Extra header aliases on top of [`DEFAULT_COLUMN_ALIASES`].
    pub extra_aliases: HashMap<String, String>,
}

impl DatasetOptions {
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    /// 去除前後空白後套用別名
    pub fn normalize_column(&self, column: &str) -> String {
        let trimmed = column.trim();
        if let Some(target) = self.extra_aliases.get(trimmed) {
            return target.clone();
        }
        DEFAULT_COLUMN_ALIASES
            .iter()
            .find(|(alias, _)| *alias == trimmed)
            .map(|(_, target)| target.to_string())
            .unwrap_or_else(|| trimmed.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedSample {
    /// 1-based position in the input table.
    pub row: usize,
    pub sample: String,
    pub reason: RejectReason,
}

impl RejectedSample {
    pub fn to_error(&self) -> ChartError {
        ChartError::InvalidSample {
            row: self.row,
            sample: self.sample.clone(),
            reason: self.reason.clone(),
        }
    }

    /// Only `InvalidSample` errors describe a single row.
    pub fn from_error(err: ChartError) -> Option<Self> {
        match err {
            ChartError::InvalidSample {
                row,
                sample,
                reason,
            } => Some(Self {
                row,
                sample,
                reason,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetRow {
    pub row: usize,
    pub sample: Sample,
}

/// Samples in display order, plus the rows that could not be read.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartDataset {
    pub rows: Vec<DatasetRow>,
    pub rejected: Vec<RejectedSample>,
}

impl ChartDataset {
    /// Build a dataset from a raw table.
    ///
    /// Fails as a whole with `EmptyDataset` when the table has no rows, with
    /// `DuplicateColumns` when two headers normalise to the same name and
    /// with `MissingColumns` when Sample, LL or PL is absent after alias
    /// normalisation. Rows whose values cannot be read are collected in
    /// `rejected` instead; if nothing usable remains the result is
    /// `EmptyDataset` again.
    pub fn from_table(table: &RawTable, options: &DatasetOptions) -> Result<Self> {
        if table.is_empty() {
            return Err(ChartError::EmptyDataset);
        }

        // 欄位名稱正規化
        let columns: Vec<String> = table
            .columns
            .iter()
            .map(|c| options.normalize_column(c))
            .collect();

        // 同一欄位出現兩次時無法決定要用哪一個值
        let mut duplicates: Vec<String> = Vec::new();
        for (i, column) in columns.iter().enumerate() {
            let repeated = !column.is_empty() && columns[..i].contains(column);
            if repeated && !duplicates.contains(column) {
                duplicates.push(column.clone());
            }
        }
        if !duplicates.is_empty() {
            return Err(ChartError::DuplicateColumns {
                columns: duplicates,
            });
        }

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|required| !columns.iter().any(|c| c == *required))
            .map(|s| s.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ChartError::MissingColumns { missing });
        }

        // 逐列轉換，失敗的列收集起來而不中止
        let mut dataset = ChartDataset::default();
        let mut accepted_rows = 0usize;

        for (index, raw) in table.records.iter().enumerate() {
            let row = index + 1;
            let record = normalize_record(raw, options);
            if record.is_blank() {
                tracing::debug!("Skipping blank row {}", row);
                continue;
            }

            let sample_id = cell_text(record.data.get(SAMPLE_COLUMN));

            if let Some(limit) = options.max_rows {
                if accepted_rows >= limit {
                    dataset.rejected.push(RejectedSample {
                        row,
                        sample: sample_id,
                        reason: RejectReason::RowLimitExceeded { limit },
                    });
                    continue;
                }
            }
            accepted_rows += 1;

            match parse_sample(&record, sample_id.clone()) {
                Ok(sample) => dataset.rows.push(DatasetRow { row, sample }),
                Err(reason) => {
                    tracing::warn!("⚠️ Row {} ({}) rejected: {}", row, sample_id, reason);
                    dataset.rejected.push(RejectedSample {
                        row,
                        sample: sample_id,
                        reason,
                    });
                }
            }
        }

        if dataset.rows.is_empty() {
            return Err(ChartError::EmptyDataset);
        }

        tracing::debug!(
            "Dataset built: {} samples, {} rejected",
            dataset.rows.len(),
            dataset.rejected.len()
        );
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn samples(&self) -> impl Iterator<Item = &Sample> {
        self.rows.iter().map(|r| &r.sample)
    }
}

fn normalize_record(record: &Record, options: &DatasetOptions) -> Record {
    Record {
        data: record
            .data
            .iter()
            .map(|(k, v)| (options.normalize_column(k), v.clone()))
            .collect(),
    }
}

fn cell_text(value: Option<&serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(s)) => s.trim().to_string(),
        Some(serde_json::Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn parse_number(
    field: &str,
    value: Option<&serde_json::Value>,
) -> std::result::Result<f64, RejectReason> {
    let parsed = match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(number) if number.is_finite() => Ok(number),
        _ => Err(RejectReason::NonNumeric {
            field: field.to_string(),
            value: cell_text(value),
        }),
    }
}

fn parse_sample(record: &Record, id: String) -> std::result::Result<Sample, RejectReason> {
    if id.is_empty() {
        return Err(RejectReason::EmptySampleId);
    }
    let ll = parse_number(LL_COLUMN, record.data.get(LL_COLUMN))?;
    let pl = parse_number(PL_COLUMN, record.data.get(PL_COLUMN))?;
    Ok(Sample::new(id, ll, pl))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(columns: &[&str], rows: Vec<Vec<serde_json::Value>>) -> RawTable {
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let records = rows
            .into_iter()
            .map(|values| Record {
                data: columns.iter().cloned().zip(values).collect(),
            })
            .collect();
        RawTable::new(columns, records)
    }

    #[test]
    fn test_builds_samples_with_pi() {
        let t = table(
            &["Sample", "LL", "PL"],
            vec![
                vec![json!("B-1"), json!(47), json!(25)],
                vec![json!("B-2"), json!("47"), json!(" 26 ")],
            ],
        );
        let dataset = ChartDataset::from_table(&t, &DatasetOptions::default()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.rows[0].sample.pi, 22.0);
        assert_eq!(dataset.rows[1].sample.pi, 21.0);
        assert_eq!(dataset.rows[1].row, 2);
        assert!(dataset.rejected.is_empty());
    }

    #[test]
    fn test_aliases_are_applied() {
        let t = table(
            &[" Boring Name ", "LL (Liquid Limit)", "PL (Plastic Limit)", "Depth"],
            vec![vec![json!("P-1"), json!(47), json!(19), json!(3.5)]],
        );
        let dataset = ChartDataset::from_table(&t, &DatasetOptions::default()).unwrap();
        assert_eq!(dataset.rows[0].sample.id, "P-1");
        assert_eq!(dataset.rows[0].sample.pi, 28.0);
    }

    #[test]
    fn test_extra_aliases() {
        let mut options = DatasetOptions::default();
        options
            .extra_aliases
            .insert("Liquid Limit".to_string(), "LL".to_string());
        let t = table(
            &["Sample", "Liquid Limit", "PL"],
            vec![vec![json!("S-1"), json!(52), json!(24)]],
        );
        let dataset = ChartDataset::from_table(&t, &options).unwrap();
        assert_eq!(dataset.rows[0].sample.ll, 52.0);
    }

    #[test]
    fn test_missing_columns_is_fatal() {
        let t = table(&["Sample", "LL"], vec![vec![json!("B-1"), json!(47)]]);
        match ChartDataset::from_table(&t, &DatasetOptions::default()) {
            Err(ChartError::MissingColumns { missing }) => assert_eq!(missing, vec!["PL"]),
            other => panic!("expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_columns_after_aliasing_are_fatal() {
        let t = table(
            &["Sample", "Boring Name", "LL", "PL"],
            vec![vec![json!("A"), json!("B"), json!(47), json!(25)]],
        );
        match ChartDataset::from_table(&t, &DatasetOptions::default()) {
            Err(ChartError::DuplicateColumns { columns }) => assert_eq!(columns, vec!["Sample"]),
            other => panic!("expected DuplicateColumns, got {:?}", other),
        }

        let repeated = table(
            &["Sample", "LL", "PL", "LL"],
            vec![vec![json!("A"), json!(47), json!(25), json!(48)]],
        );
        assert!(matches!(
            ChartDataset::from_table(&repeated, &DatasetOptions::default()),
            Err(ChartError::DuplicateColumns { .. })
        ));
    }

    #[test]
    fn test_blank_trailing_headers_are_not_duplicates() {
        let t = table(
            &["Sample", "LL", "PL", "", ""],
            vec![vec![json!("B-1"), json!(47), json!(25), json!(""), json!("")]],
        );
        let dataset = ChartDataset::from_table(&t, &DatasetOptions::default()).unwrap();
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn test_empty_table_is_fatal() {
        let t = table(&["Sample", "LL", "PL"], vec![]);
        assert!(matches!(
            ChartDataset::from_table(&t, &DatasetOptions::default()),
            Err(ChartError::EmptyDataset)
        ));
        assert!(matches!(
            ChartDataset::from_table(&RawTable::default(), &DatasetOptions::default()),
            Err(ChartError::EmptyDataset)
        ));
    }

    #[test]
    fn test_non_numeric_row_is_rejected_alone() {
        let t = table(
            &["Sample", "LL", "PL"],
            vec![
                vec![json!("B-1"), json!("abc"), json!(25)],
                vec![json!("B-2"), json!(53), json!(20)],
            ],
        );
        let dataset = ChartDataset::from_table(&t, &DatasetOptions::default()).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.rows[0].sample.id, "B-2");
        assert_eq!(
            dataset.rejected,
            vec![RejectedSample {
                row: 1,
                sample: "B-1".to_string(),
                reason: RejectReason::NonNumeric {
                    field: "LL".to_string(),
                    value: "abc".to_string(),
                },
            }]
        );
    }

    #[test]
    fn test_negative_pi_is_kept_for_the_classifier() {
        let t = table(
            &["Sample", "LL", "PL"],
            vec![vec![json!("X"), json!(40), json!(45)]],
        );
        let dataset = ChartDataset::from_table(&t, &DatasetOptions::default()).unwrap();
        assert_eq!(dataset.rows[0].sample.pi, -5.0);
    }

    #[test]
    fn test_blank_rows_are_skipped_and_all_invalid_is_empty() {
        let t = table(
            &["Sample", "LL", "PL"],
            vec![
                vec![json!(""), json!(""), json!("")],
                vec![json!("B-1"), json!("n/a"), json!("")],
            ],
        );
        assert!(matches!(
            ChartDataset::from_table(&t, &DatasetOptions::default()),
            Err(ChartError::EmptyDataset)
        ));
    }

    #[test]
    fn test_row_cap() {
        let rows = (0..25)
            .map(|i| vec![json!(format!("S-{}", i)), json!(40), json!(20)])
            .collect();
        let t = table(&["Sample", "LL", "PL"], rows);
        let options = DatasetOptions::default().with_max_rows(MANUAL_ENTRY_MAX_ROWS);
        let dataset = ChartDataset::from_table(&t, &options).unwrap();
        assert_eq!(dataset.len(), 20);
        assert_eq!(dataset.rejected.len(), 5);
        assert_eq!(dataset.rejected[0].row, 21);
        assert_eq!(
            dataset.rejected[0].reason,
            RejectReason::RowLimitExceeded { limit: 20 }
        );
    }

    #[test]
    fn test_rejected_sample_round_trips_through_error() {
        let rejected = RejectedSample {
            row: 2,
            sample: "B-3".to_string(),
            reason: RejectReason::EmptySampleId,
        };
        let back = RejectedSample::from_error(rejected.to_error());
        assert_eq!(back, Some(rejected));
        assert_eq!(RejectedSample::from_error(ChartError::EmptyDataset), None);
    }
}
