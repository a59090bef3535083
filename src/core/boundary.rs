//! A-line / U-line boundary curves of the plasticity chart.

use crate::utils::error::{ChartError, Result};
use crate::utils::validation::{validate_finite, validate_positive_number, Validate};
use serde::{Deserialize, Serialize};

pub const A_LINE_SLOPE: f64 = 0.73;
pub const A_LINE_LL_OFFSET: f64 = 20.0;
pub const A_LINE_MIN_PI: f64 = 4.0;

pub const U_LINE_SLOPE: f64 = 0.9;
pub const U_LINE_LL_OFFSET: f64 = 8.0;
pub const U_LINE_MIN_PI: f64 = 7.0;

/// LL range the curves are drawn over.
pub const DEFAULT_CURVE_DOMAIN: SamplingDomain = SamplingDomain {
    start: 15.0,
    end: 100.0,
    resolution: 1000,
};

/// 在 [start, end] 之間等距取 resolution 個點（含兩端點）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingDomain {
    pub start: f64,
    pub end: f64,
    pub resolution: usize,
}

impl SamplingDomain {
    pub fn new(start: f64, end: f64, resolution: usize) -> Self {
        Self {
            start,
            end,
            resolution,
        }
    }

    pub fn step(&self) -> f64 {
        (self.end - self.start) / self.resolution.saturating_sub(1).max(1) as f64
    }

    /// LL value of the `index`-th sample; the last index lands exactly on `end`
    /// unless the domain is a single point, which is `start`.
    pub fn value_at(&self, index: usize) -> f64 {
        if self.resolution > 1 && index + 1 == self.resolution {
            self.end
        } else {
            self.start + index as f64 * self.step()
        }
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + Clone + '_ {
        (0..self.resolution).map(move |i| self.value_at(i))
    }
}

impl Validate for SamplingDomain {
    fn validate(&self) -> Result<()> {
        validate_finite("domain.start", self.start)?;
        validate_finite("domain.end", self.end)?;
        validate_positive_number("domain.resolution", self.resolution, 2)?;
        if self.start >= self.end {
            return Err(ChartError::InvalidConfigValueError {
                field: "domain".to_string(),
                value: format!("{}..{}", self.start, self.end),
                reason: "start must be less than end".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveKind {
    ALine,
    ULine,
}

impl CurveKind {
    pub fn label(&self) -> &'static str {
        match self {
            CurveKind::ALine => "A-Line",
            CurveKind::ULine => "U-Line",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub ll: f64,
    pub pi: f64,
}

/// `PI = slope * (LL - ll_offset)`, kept only where `PI >= min_pi`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundaryCurve {
    pub kind: CurveKind,
    pub slope: f64,
    pub ll_offset: f64,
    pub min_pi: f64,
}

impl BoundaryCurve {
    pub const fn a_line() -> Self {
        Self {
            kind: CurveKind::ALine,
            slope: A_LINE_SLOPE,
            ll_offset: A_LINE_LL_OFFSET,
            min_pi: A_LINE_MIN_PI,
        }
    }

    pub const fn u_line() -> Self {
        Self {
            kind: CurveKind::ULine,
            slope: U_LINE_SLOPE,
            ll_offset: U_LINE_LL_OFFSET,
            min_pi: U_LINE_MIN_PI,
        }
    }

    /// Unrestricted formula value at `ll`.
    pub fn value(&self, ll: f64) -> f64 {
        self.slope * (ll - self.ll_offset)
    }

    pub fn in_domain(&self, ll: f64) -> bool {
        self.value(ll) >= self.min_pi
    }

    /// LL at which the formula reaches `pi`.
    pub fn ll_at(&self, pi: f64) -> f64 {
        pi / self.slope + self.ll_offset
    }

    /// Lazily sample the curve over `domain`, dropping points below `min_pi`.
    /// The iterator is `Clone`, so callers can restart it freely.
    pub fn points(&self, domain: SamplingDomain) -> impl Iterator<Item = CurvePoint> + Clone {
        let curve = *self;
        (0..domain.resolution)
            .map(move |i| domain.value_at(i))
            .filter(move |&ll| curve.in_domain(ll))
            .map(move |ll| CurvePoint {
                ll,
                pi: curve.value(ll),
            })
    }

    pub fn sample(&self, domain: SamplingDomain) -> Vec<CurvePoint> {
        self.points(domain).collect()
    }
}
