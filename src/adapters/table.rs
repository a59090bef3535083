//! Table readers and writers at the edge of the chart engine.

use crate::core::chart::ChartModel;
use crate::core::dataset::{RejectedSample, LL_COLUMN, PL_COLUMN, SAMPLE_COLUMN};
use crate::domain::model::{RawTable, Record, Sample};
use crate::utils::error::{ChartError, Result};
use serde::Serialize;

/// Borings shipped with the standalone chart script.
const DEMO_SAMPLES: [(&str, f64, f64); 15] = [
    ("B-1", 47.0, 25.0),
    ("B-2", 47.0, 26.0),
    ("B-3", 53.0, 20.0),
    ("B-4", 59.0, 21.0),
    ("B-5", 55.0, 23.0),
    ("C-1", 50.0, 20.0),
    ("C-2", 50.0, 21.0),
    ("C-3", 49.0, 19.0),
    ("UST-1", 51.0, 19.0),
    ("P-1", 47.0, 19.0),
    ("P-2", 43.0, 21.0),
    ("P-3", 50.0, 25.0),
    ("P-4", 48.0, 21.0),
    ("P-5", 48.0, 26.0),
    ("S-1", 52.0, 24.0),
];

fn standard_columns() -> Vec<String> {
    vec![
        SAMPLE_COLUMN.to_string(),
        LL_COLUMN.to_string(),
        PL_COLUMN.to_string(),
    ]
}

pub fn delimiter_for_path(path: &str) -> u8 {
    let is_tsv = std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("tsv"))
        .unwrap_or(false);
    if is_tsv {
        b'\t'
    } else {
        b','
    }
}

/// 讀取 CSV/TSV；欄位名稱保持原樣，由資料集負責別名轉換
///
/// Cells that are not valid UTF-8 (e.g. cp1252 exports) are decoded lossily
/// so one bad byte does not sink the whole file.
pub fn read_delimited(bytes: &[u8], delimiter: u8) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let columns: Vec<String> = reader.byte_headers()?.iter().map(decode_cell).collect();

    let mut records = Vec::new();
    for (index, row) in reader.byte_records().enumerate() {
        let row = row?;
        if std::str::from_utf8(row.as_slice()).is_err() {
            tracing::warn!("⚠️ Row {} is not valid UTF-8; invalid bytes replaced", index + 1);
        }
        let record = Record {
            data: columns
                .iter()
                .zip(row.iter())
                .map(|(column, value)| (column.clone(), serde_json::Value::String(decode_cell(value))))
                .collect(),
        };
        records.push(record);
    }

    tracing::debug!("Read {} rows with columns {:?}", records.len(), columns);
    Ok(RawTable::new(columns, records))
}

fn decode_cell(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Rows copied from a spreadsheet: one line per row, tab-separated,
/// first three cells are Sample, LL and PL. Extra cells are ignored.
pub fn parse_pasted_rows(text: &str) -> RawTable {
    let columns = standard_columns();
    let records = text
        .trim_matches(|c| c == '\n' || c == '\r')
        .lines()
        .map(|line| Record {
            data: columns
                .iter()
                .zip(line.trim_end_matches('\r').split('\t'))
                .map(|(column, cell)| {
                    (
                        column.clone(),
                        serde_json::Value::String(cell.trim().to_string()),
                    )
                })
                .collect(),
        })
        .collect();
    RawTable::new(columns, records)
}

pub fn demo_table() -> RawTable {
    let records = DEMO_SAMPLES
        .iter()
        .map(|(id, ll, pl)| {
            Record::from_pairs([
                (SAMPLE_COLUMN, serde_json::Value::from(*id)),
                (LL_COLUMN, serde_json::Value::from(*ll)),
                (PL_COLUMN, serde_json::Value::from(*pl)),
            ])
        })
        .collect();
    RawTable::new(standard_columns(), records)
}

#[derive(Serialize)]
struct SampleCsvRow<'a> {
    #[serde(rename = "Sample")]
    sample: &'a str,
    #[serde(rename = "LL")]
    ll: f64,
    #[serde(rename = "PL")]
    pl: f64,
    #[serde(rename = "PI")]
    pi: f64,
}

#[derive(Serialize)]
struct ClassifiedCsvRow<'a> {
    #[serde(rename = "Sample")]
    sample: &'a str,
    #[serde(rename = "LL")]
    ll: f64,
    #[serde(rename = "PL")]
    pl: f64,
    #[serde(rename = "PI")]
    pi: f64,
    #[serde(rename = "Zone")]
    zone: &'static str,
    #[serde(rename = "ColorIndex")]
    color_index: usize,
    #[serde(rename = "AboveULine")]
    above_u_line: bool,
}

#[derive(Serialize)]
struct RejectedCsvRow<'a> {
    #[serde(rename = "Row")]
    row: usize,
    #[serde(rename = "Sample")]
    sample: &'a str,
    #[serde(rename = "Reason")]
    reason: String,
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| ChartError::IoError(e.into_error()))
}

/// Save samples back out as `Sample,LL,PL,PI`, readable again by [`read_delimited`].
pub fn write_samples_csv<'a>(samples: impl IntoIterator<Item = &'a Sample>) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for sample in samples {
        writer.serialize(SampleCsvRow {
            sample: &sample.id,
            ll: sample.ll,
            pl: sample.pl,
            pi: sample.pi,
        })?;
    }
    finish(writer)
}

pub fn write_classified_csv(chart: &ChartModel) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for point in &chart.points {
        writer.serialize(ClassifiedCsvRow {
            sample: &point.sample.id,
            ll: point.sample.ll,
            pl: point.sample.pl,
            pi: point.sample.pi,
            zone: point.zone.code(),
            color_index: point.color_index,
            above_u_line: point.above_u_line,
        })?;
    }
    finish(writer)
}

pub fn write_rejected_csv(rejected: &[RejectedSample]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for entry in rejected {
        writer.serialize(RejectedCsvRow {
            row: entry.row,
            sample: &entry.sample,
            reason: entry.reason.to_string(),
        })?;
    }
    finish(writer)
}
