use crate::core::geometry::{ZoneGeometry, LL_SPLIT};
use crate::domain::model::{Sample, Zone};
use crate::utils::error::{ChartError, RejectReason, Result};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub zone: Zone,
    /// Above the U-line: physically implausible, worth re-checking in the lab.
    pub above_u_line: bool,
}

/// 依 A-line、PI=4/7.3 水平線與 LL=50 垂直線判定分區
pub struct SampleClassifier<'a> {
    geometry: &'a ZoneGeometry,
}

impl<'a> SampleClassifier<'a> {
    pub fn new(geometry: &'a ZoneGeometry) -> Self {
        Self { geometry }
    }

    /// Physical sanity checks; a sample passing these maps to exactly one zone.
    pub fn check(sample: &Sample) -> std::result::Result<(), RejectReason> {
        if sample.id.trim().is_empty() {
            return Err(RejectReason::EmptySampleId);
        }
        if !sample.ll.is_finite() || sample.ll <= 0.0 {
            return Err(RejectReason::OutOfRange {
                field: "LL".to_string(),
                value: sample.ll,
                constraint: "a finite number greater than 0".to_string(),
            });
        }
        if !sample.pl.is_finite() || sample.pl < 0.0 {
            return Err(RejectReason::OutOfRange {
                field: "PL".to_string(),
                value: sample.pl,
                constraint: "a finite number of at least 0".to_string(),
            });
        }
        if sample.pi < 0.0 {
            return Err(RejectReason::NegativePlasticityIndex { pi: sample.pi });
        }
        Ok(())
    }

    pub fn classify(&self, sample: &Sample) -> std::result::Result<Classification, RejectReason> {
        Self::check(sample)?;
        let (ll, pi) = (sample.ll, sample.pi);
        let above_a_line = self.geometry.on_or_above_a_line(ll, pi);

        let zone = if ll >= LL_SPLIT {
            if above_a_line {
                Zone::Ch
            } else {
                Zone::Mh
            }
        } else if !above_a_line || self.geometry.below_cl_ml_band(pi) {
            Zone::Ml
        } else if self.geometry.in_cl_ml_band(pi) {
            Zone::ClMl
        } else {
            Zone::Cl
        };

        Ok(Classification {
            zone,
            above_u_line: self.geometry.above_u_line(ll, pi),
        })
    }

    /// Same as [`classify`](Self::classify), reporting failures against a 1-based row number.
    pub fn classify_row(&self, row: usize, sample: &Sample) -> Result<Classification> {
        self.classify(sample)
            .map_err(|reason| ChartError::InvalidSample {
                row,
                sample: sample.id.clone(),
                reason,
            })
    }
}
