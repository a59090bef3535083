use crate::core::boundary::{BoundaryCurve, SamplingDomain};
use crate::domain::model::Zone;
use serde::{Deserialize, Serialize};

/// LL range searched for the A-line crossings.
pub const DEFAULT_ANCHOR_DOMAIN: SamplingDomain = SamplingDomain {
    start: 10.0,
    end: 60.0,
    resolution: 1000,
};

/// Lower and upper PI of the CL-ML band.
pub const CL_ML_LOWER_PI: f64 = 4.0;
pub const CL_ML_UPPER_PI: f64 = 7.3;

/// Vertical split between low (L) and high (H) plasticity.
pub const LL_SPLIT: f64 = 50.0;

pub const CL_ML_LABEL_PI: f64 = 5.5;

/// Tolerance for boundary comparisons; PI derived from decimal LL/PL carries
/// rounding error of a few ulps.
pub const BOUNDARY_EPSILON: f64 = 1e-9;

/// Fixed label positions, kept as literals for output compatibility.
pub const ZONE_LABEL_ANCHORS: [LabelAnchor; 4] = [
    LabelAnchor { zone: Zone::Cl, ll: 45.0, pi: 55.0 },
    LabelAnchor { zone: Zone::Ch, ll: 55.0, pi: 55.0 },
    LabelAnchor { zone: Zone::Ml, ll: 45.0, pi: 5.0 },
    LabelAnchor { zone: Zone::Mh, ll: 55.0, pi: 5.0 },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorMethod {
    /// 在取樣點中找最接近目標值的 LL（與舊版輸出一致）
    #[default]
    Sampled,
    /// 直接解 A-line 方程式
    Analytic,
}

impl std::str::FromStr for AnchorMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sampled" => Ok(AnchorMethod::Sampled),
            "analytic" => Ok(AnchorMethod::Analytic),
            other => Err(format!("unknown anchor method: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LabelAnchor {
    pub zone: Zone,
    pub ll: f64,
    pub pi: f64,
}

/// Horizontal boundary at `pi` from `ll_start` to `ll_end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HorizontalSegment {
    pub pi: f64,
    pub ll_start: f64,
    pub ll_end: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneGeometry {
    pub a_line: BoundaryCurve,
    pub u_line: BoundaryCurve,
    pub pi4_end_ll: f64,
    pub pi7_end_ll: f64,
    pub pi4_segment: HorizontalSegment,
    pub pi7_segment: HorizontalSegment,
    pub vertical_ll: f64,
    pub cl_ml_label: LabelAnchor,
    pub zone_labels: [LabelAnchor; 4],
}

/// 取樣點中 |curve(LL) - target| 最小的 LL，相同時取第一個
pub fn nearest_sample_ll(curve: &BoundaryCurve, domain: SamplingDomain, target: f64) -> f64 {
    let mut best_ll = domain.start;
    let mut best_distance = f64::INFINITY;
    for ll in domain.values() {
        let distance = (curve.value(ll) - target).abs();
        if distance < best_distance {
            best_distance = distance;
            best_ll = ll;
        }
    }
    best_ll
}

impl ZoneGeometry {
    pub fn compute(anchor_domain: SamplingDomain, method: AnchorMethod) -> Self {
        let a_line = BoundaryCurve::a_line();
        let crossing = |target: f64| match method {
            AnchorMethod::Sampled => nearest_sample_ll(&a_line, anchor_domain, target),
            AnchorMethod::Analytic => a_line.ll_at(target),
        };

        let pi4_end_ll = crossing(CL_ML_LOWER_PI);
        let pi7_end_ll = crossing(CL_ML_UPPER_PI);
        tracing::debug!(
            pi4_end_ll,
            pi7_end_ll,
            ?method,
            "Computed A-line reference points"
        );

        Self {
            a_line,
            u_line: BoundaryCurve::u_line(),
            pi4_end_ll,
            pi7_end_ll,
            pi4_segment: HorizontalSegment {
                pi: CL_ML_LOWER_PI,
                ll_start: 0.0,
                ll_end: pi4_end_ll,
            },
            pi7_segment: HorizontalSegment {
                pi: CL_ML_UPPER_PI,
                ll_start: 0.0,
                ll_end: pi7_end_ll,
            },
            vertical_ll: LL_SPLIT,
            cl_ml_label: LabelAnchor {
                zone: Zone::ClMl,
                ll: pi4_end_ll / 2.0,
                pi: CL_ML_LABEL_PI,
            },
            zone_labels: ZONE_LABEL_ANCHORS,
        }
    }

    /// Whether a point sits on or above the A-line.
    pub fn on_or_above_a_line(&self, ll: f64, pi: f64) -> bool {
        pi >= self.a_line.value(ll) - BOUNDARY_EPSILON
    }

    pub fn above_u_line(&self, ll: f64, pi: f64) -> bool {
        pi > self.u_line.value(ll) + BOUNDARY_EPSILON
    }

    /// PI below the CL-ML band (the PI = 4 line itself is in the band).
    pub fn below_cl_ml_band(&self, pi: f64) -> bool {
        pi < self.pi4_segment.pi - BOUNDARY_EPSILON
    }

    pub fn in_cl_ml_band(&self, pi: f64) -> bool {
        (self.pi4_segment.pi - BOUNDARY_EPSILON..=self.pi7_segment.pi + BOUNDARY_EPSILON)
            .contains(&pi)
    }
}

impl Default for ZoneGeometry {
    fn default() -> Self {
        Self::compute(DEFAULT_ANCHOR_DOMAIN, AnchorMethod::Sampled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampled_crossings_are_nearest_samples() {
        let geometry = ZoneGeometry::default();
        let half_step = DEFAULT_ANCHOR_DOMAIN.step() / 2.0;

        assert!((geometry.pi4_end_ll - (4.0 / 0.73 + 20.0)).abs() <= half_step);
        assert!((geometry.pi7_end_ll - (7.3 / 0.73 + 20.0)).abs() <= half_step);
        assert!(geometry.pi7_end_ll > geometry.pi4_end_ll);

        // the chosen LL really is a sample of the anchor domain
        assert!(DEFAULT_ANCHOR_DOMAIN
            .values()
            .any(|ll| ll == geometry.pi4_end_ll));
    }

    #[test]
    fn test_sampled_crossing_is_global_minimum() {
        let a = BoundaryCurve::a_line();
        let best = nearest_sample_ll(&a, DEFAULT_ANCHOR_DOMAIN, 4.0);
        let best_distance = (a.value(best) - 4.0).abs();
        for ll in DEFAULT_ANCHOR_DOMAIN.values() {
            assert!((a.value(ll) - 4.0).abs() >= best_distance);
        }
    }

    #[test]
    fn test_nearest_sample_tie_breaks_to_first() {
        let identity = BoundaryCurve {
            kind: crate::core::boundary::CurveKind::ALine,
            slope: 1.0,
            ll_offset: 0.0,
            min_pi: 0.0,
        };
        let domain = SamplingDomain::new(0.0, 2.0, 3);
        assert_eq!(nearest_sample_ll(&identity, domain, 0.5), 0.0);
        assert_eq!(nearest_sample_ll(&identity, domain, 1.5), 1.0);
    }

    #[test]
    fn test_analytic_crossings() {
        let geometry = ZoneGeometry::compute(DEFAULT_ANCHOR_DOMAIN, AnchorMethod::Analytic);
        assert!((geometry.pi4_end_ll - 25.479452054794521).abs() < 1e-9);
        assert!((geometry.pi7_end_ll - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_segments_and_labels() {
        let geometry = ZoneGeometry::default();
        assert_eq!(geometry.pi4_segment.pi, 4.0);
        assert_eq!(geometry.pi4_segment.ll_start, 0.0);
        assert_eq!(geometry.pi4_segment.ll_end, geometry.pi4_end_ll);
        assert_eq!(geometry.pi7_segment.pi, 7.3);
        assert_eq!(geometry.pi7_segment.ll_end, geometry.pi7_end_ll);
        assert_eq!(geometry.vertical_ll, 50.0);

        assert_eq!(geometry.cl_ml_label.zone, Zone::ClMl);
        assert_eq!(geometry.cl_ml_label.ll, geometry.pi4_end_ll / 2.0);
        assert_eq!(geometry.cl_ml_label.pi, 5.5);

        let labels: Vec<_> = geometry
            .zone_labels
            .iter()
            .map(|l| (l.zone, l.ll, l.pi))
            .collect();
        assert_eq!(
            labels,
            vec![
                (Zone::Cl, 45.0, 55.0),
                (Zone::Ch, 55.0, 55.0),
                (Zone::Ml, 45.0, 5.0),
                (Zone::Mh, 55.0, 5.0),
            ]
        );
    }

    #[test]
    fn test_boundary_checks_tolerate_rounding() {
        let geometry = ZoneGeometry::default();
        // 28.0 - 20.7 and 10.2 - 6.2 are a few ulps off 7.3 and 4.0
        assert!(geometry.in_cl_ml_band(28.0 - 20.7));
        assert!(geometry.in_cl_ml_band(10.2 - 6.2));
        assert!(!geometry.below_cl_ml_band(10.2 - 6.2));
        assert!(geometry.on_or_above_a_line(52.8, 52.8 - 28.856));

        assert!(!geometry.in_cl_ml_band(7.31));
        assert!(geometry.below_cl_ml_band(3.99));
        assert!(!geometry.on_or_above_a_line(52.8, 23.94));
    }

    #[test]
    fn test_compute_is_idempotent() {
        let first = ZoneGeometry::compute(DEFAULT_ANCHOR_DOMAIN, AnchorMethod::Sampled);
        let second = ZoneGeometry::compute(DEFAULT_ANCHOR_DOMAIN, AnchorMethod::Sampled);
        assert_eq!(first, second);
    }

    #[test]
    fn test_anchor_method_from_str() {
        assert_eq!("Analytic".parse::<AnchorMethod>(), Ok(AnchorMethod::Analytic));
        assert_eq!("sampled".parse::<AnchorMethod>(), Ok(AnchorMethod::Sampled));
        assert!("newton".parse::<AnchorMethod>().is_err());
    }
}
