//! Assembles everything a renderer needs to draw the plasticity chart.

use crate::core::boundary::{BoundaryCurve, CurvePoint, SamplingDomain, DEFAULT_CURVE_DOMAIN};
use crate::core::classifier::SampleClassifier;
use crate::core::dataset::{ChartDataset, DatasetOptions, RejectedSample};
use crate::core::geometry::{AnchorMethod, ZoneGeometry, DEFAULT_ANCHOR_DOMAIN};
use crate::domain::model::{RawTable, Sample, Zone};
use crate::utils::error::{ChartError, Result};
use crate::utils::validation::Validate;
use serde::Serialize;
use std::collections::BTreeMap;

pub const CHART_TITLE: &str = "Atterberg Limits Chart";
/// Number of distinct marker colours before they repeat (tab20).
pub const PALETTE_SIZE: usize = 20;

#[derive(Debug, Clone)]
pub struct ChartOptions {
    pub curve_domain: SamplingDomain,
    pub anchor_domain: SamplingDomain,
    pub anchor_method: AnchorMethod,
    pub dataset: DatasetOptions,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            curve_domain: DEFAULT_CURVE_DOMAIN,
            anchor_domain: DEFAULT_ANCHOR_DOMAIN,
            anchor_method: AnchorMethod::default(),
            dataset: DatasetOptions::default(),
        }
    }
}

impl Validate for ChartOptions {
    fn validate(&self) -> Result<()> {
        self.curve_domain.validate()?;
        self.anchor_domain.validate()?;
        if let Some(max_rows) = self.dataset.max_rows {
            crate::utils::validation::validate_positive_number("dataset.max_rows", max_rows, 1)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisSpec {
    pub x: Axis,
    pub y: Axis,
}

impl Default for AxisSpec {
    fn default() -> Self {
        Self {
            x: Axis {
                label: "Liquid Limit (LL)",
                min: 0.0,
                max: 100.0,
            },
            y: Axis {
                label: "Plasticity Index (PI)",
                min: 0.0,
                max: 60.0,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LegendEntry {
    Line { label: String },
    Marker { label: String, color_index: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlottedSample {
    pub row: usize,
    #[serde(flatten)]
    pub sample: Sample,
    pub zone: Zone,
    pub color_index: usize,
    pub above_u_line: bool,
}

/// Renderer input: curves, reference geometry and classified points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartModel {
    pub title: &'static str,
    pub axes: AxisSpec,
    pub a_line: Vec<CurvePoint>,
    pub u_line: Vec<CurvePoint>,
    pub geometry: ZoneGeometry,
    pub points: Vec<PlottedSample>,
    pub rejected: Vec<RejectedSample>,
    pub legend: Vec<LegendEntry>,
}

impl ChartModel {
    pub fn zone_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for point in &self.points {
            *counts.entry(point.zone.code()).or_insert(0) += 1;
        }
        counts
    }

    pub fn rejection_errors(&self) -> Vec<ChartError> {
        self.rejected.iter().map(RejectedSample::to_error).collect()
    }
}

/// 驗證 → 幾何 → 分類；資料集層級的錯誤會在計算幾何前中止
pub fn build_chart(table: &RawTable, options: &ChartOptions) -> Result<ChartModel> {
    options.validate()?;
    let dataset = ChartDataset::from_table(table, &options.dataset)?;
    chart_from_dataset(dataset, options)
}

pub fn chart_from_dataset(dataset: ChartDataset, options: &ChartOptions) -> Result<ChartModel> {
    options.validate()?;
    if dataset.is_empty() {
        return Err(ChartError::EmptyDataset);
    }

    // 計算參考幾何
    let geometry = ZoneGeometry::compute(options.anchor_domain, options.anchor_method);
    let classifier = SampleClassifier::new(&geometry);

    // 依輸入順序分類，顏色只分配給成功繪製的樣本
    let mut points = Vec::with_capacity(dataset.len());
    let mut rejected = dataset.rejected;

    for entry in dataset.rows {
        match classifier.classify_row(entry.row, &entry.sample) {
            Ok(classification) => {
                if classification.above_u_line {
                    tracing::warn!(
                        "⚠️ Sample {} (LL={}, PI={}) plots above the U-line",
                        entry.sample.id,
                        entry.sample.ll,
                        entry.sample.pi
                    );
                }
                let color_index = points.len() % PALETTE_SIZE;
                points.push(PlottedSample {
                    row: entry.row,
                    sample: entry.sample,
                    zone: classification.zone,
                    color_index,
                    above_u_line: classification.above_u_line,
                });
            }
            Err(err) => {
                tracing::warn!("⚠️ {}", err);
                rejected.extend(RejectedSample::from_error(err));
            }
        }
    }

    if points.is_empty() {
        return Err(ChartError::EmptyDataset);
    }
    rejected.sort_by_key(|r| r.row);

    // 圖例：三條參考線，之後每個樣本一個標記
    let mut legend = vec![
        LegendEntry::Line {
            label: "A-Line".to_string(),
        },
        LegendEntry::Line {
            label: "U-Line".to_string(),
        },
        LegendEntry::Line {
            label: "PI = 4 & 7.3".to_string(),
        },
    ];
    legend.extend(points.iter().map(|p| LegendEntry::Marker {
        label: p.sample.id.clone(),
        color_index: p.color_index,
    }));

    Ok(ChartModel {
        title: CHART_TITLE,
        axes: AxisSpec::default(),
        a_line: BoundaryCurve::a_line().sample(options.curve_domain),
        u_line: BoundaryCurve::u_line().sample(options.curve_domain),
        geometry,
        points,
        rejected,
        legend,
    })
}
