use crate::core::chart::ChartModel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One row of a raw input table, keyed by (normalised) column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, serde_json::Value>,
}

impl Record {
    pub fn from_pairs<K: Into<String>, V: Into<serde_json::Value>>(
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        Self {
            data: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// 全部欄位都是空值時視為空白列
    pub fn is_blank(&self) -> bool {
        self.data.values().all(|value| match value {
            serde_json::Value::Null => true,
            serde_json::Value::String(s) => s.trim().is_empty(),
            _ => false,
        })
    }
}

/// Column headers plus rows, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl RawTable {
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Self {
        Self { columns, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub id: String,
    pub ll: f64,
    pub pl: f64,
    pub pi: f64,
}

impl Sample {
    /// PI is derived as `ll - pl` and may be negative here.
    pub fn new(id: impl Into<String>, ll: f64, pl: f64) -> Self {
        Self {
            id: id.into(),
            ll,
            pl,
            pi: ll - pl,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    #[serde(rename = "CL")]
    Cl,
    #[serde(rename = "CH")]
    Ch,
    #[serde(rename = "ML")]
    Ml,
    #[serde(rename = "MH")]
    Mh,
    #[serde(rename = "CL-ML")]
    ClMl,
}

impl Zone {
    pub const ALL: [Zone; 5] = [Zone::Cl, Zone::Ch, Zone::Ml, Zone::Mh, Zone::ClMl];

    pub fn code(&self) -> &'static str {
        match self {
            Zone::Cl => "CL",
            Zone::Ch => "CH",
            Zone::Ml => "ML",
            Zone::Mh => "MH",
            Zone::ClMl => "CL-ML",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Zone::Cl => "Lean clay (low plasticity)",
            Zone::Ch => "Fat clay (high plasticity)",
            Zone::Ml => "Silt (low plasticity)",
            Zone::Mh => "Elastic silt (high plasticity)",
            Zone::ClMl => "Silty clay",
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Where a render request gets its rows from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum InputSource {
    /// CSV/TSV file, read through `Storage`.
    File(String),
    /// Tab-separated rows as copied from a spreadsheet.
    Paste(String),
    /// Built-in example borings.
    Demo,
}

impl InputSource {
    pub fn describe(&self) -> String {
        match self {
            InputSource::File(path) => format!("file:{}", path),
            InputSource::Paste(text) => format!("paste:{} lines", text.lines().count()),
            InputSource::Demo => "demo".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportMetadata {
    pub source: String,
    pub generated_at: DateTime<Utc>,
    pub plotted: usize,
    pub rejected: usize,
}

/// Transform output: the chart model plus bookkeeping for the load step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartReport {
    pub metadata: ReportMetadata,
    pub chart: ChartModel,
}

impl ChartReport {
    pub fn new(source: &InputSource, chart: ChartModel) -> Self {
        Self {
            metadata: ReportMetadata {
                source: source.describe(),
                generated_at: Utc::now(),
                plotted: chart.points.len(),
                rejected: chart.rejected.len(),
            },
            chart,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_derives_pi() {
        let sample = Sample::new("B-1", 47.0, 25.0);
        assert_eq!(sample.pi, 22.0);

        let negative = Sample::new("X", 40.0, 45.0);
        assert_eq!(negative.pi, -5.0);
    }

    #[test]
    fn test_zone_serializes_as_code() {
        assert_eq!(serde_json::to_string(&Zone::ClMl).unwrap(), "\"CL-ML\"");
        for zone in Zone::ALL {
            assert_eq!(
                serde_json::to_value(zone).unwrap(),
                serde_json::Value::String(zone.code().to_string())
            );
        }
    }

    #[test]
    fn test_blank_record() {
        let blank = Record::from_pairs([("Sample", " "), ("LL", ""), ("PL", "")]);
        assert!(blank.is_blank());

        let filled = Record::from_pairs([("Sample", "B-1"), ("LL", ""), ("PL", "")]);
        assert!(!filled.is_blank());
    }
}
