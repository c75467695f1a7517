//! Phase groups, chaff, diffraction/add-on mappings, and phase statistics
//! (C9), loaded once from auxiliary files and shared read-only thereafter.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseGroup {
    pub name: String,
    pub codes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffractionEntry {
    pub diffracted_code: String,
    pub x_diff_deg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddOnEntry {
    pub add_on_code: String,
    /// Minimum `x_max` (degrees) of the base branch required to activate
    /// this add-on phase.
    pub activation_x_max_deg: f64,
}

/// One segment of a piecewise-linear fit over distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearSegment {
    pub delta_start_deg: f64,
    pub delta_end_deg: f64,
    pub slope: f64,
    pub offset: f64,
}

impl LinearSegment {
    fn value_at(&self, delta_deg: f64) -> f64 {
        self.offset + self.slope * delta_deg
    }
}

/// Bias, spread, and observability curves for one phase, each a piecewise
/// linear fit over Δ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseStatCurves {
    pub bias: Vec<LinearSegment>,
    pub spread: Vec<LinearSegment>,
    pub observability: Vec<LinearSegment>,
}

fn evaluate(segments: &[LinearSegment], delta_deg: f64) -> Option<f64> {
    if segments.is_empty() {
        return None;
    }
    let segment = segments
        .iter()
        .find(|s| delta_deg >= s.delta_start_deg && delta_deg <= s.delta_end_deg)
        .unwrap_or_else(|| {
            if delta_deg < segments[0].delta_start_deg {
                &segments[0]
            } else {
                &segments[segments.len() - 1]
            }
        });
    Some(segment.value_at(delta_deg))
}

impl PhaseStatCurves {
    pub fn bias_at(&self, delta_deg: f64) -> Option<f64> {
        evaluate(&self.bias, delta_deg)
    }

    pub fn spread_at(&self, delta_deg: f64) -> Option<f64> {
        evaluate(&self.spread, delta_deg)
    }

    /// Numeric derivative of the spread curve, used for the arrival's
    /// "spread-vs-distance slope" field; exact within one segment, and the
    /// nearer segment's slope at a boundary.
    pub fn spread_slope_at(&self, delta_deg: f64) -> Option<f64> {
        self.spread
            .iter()
            .find(|s| delta_deg >= s.delta_start_deg && delta_deg <= s.delta_end_deg)
            .map(|s| s.slope)
    }

    pub fn observability_at(&self, delta_deg: f64) -> Option<f64> {
        evaluate(&self.observability, delta_deg)
    }
}

/// The full set of auxiliary phase data loaded once per model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseExtras {
    groups: Vec<PhaseGroup>,
    chaff: HashSet<String>,
    diffraction: HashMap<String, DiffractionEntry>,
    add_on: HashMap<String, AddOnEntry>,
    statistics: HashMap<String, PhaseStatCurves>,
}

impl PhaseExtras {
    pub fn new(
        groups: Vec<PhaseGroup>,
        chaff: HashSet<String>,
        diffraction: HashMap<String, DiffractionEntry>,
        add_on: HashMap<String, AddOnEntry>,
        statistics: HashMap<String, PhaseStatCurves>,
    ) -> Self {
        Self { groups, chaff, diffraction, add_on, statistics }
    }

    /// The name of the group a phase code belongs to, if any.
    pub fn phase_group(&self, code: &str) -> Option<&str> {
        self.groups
            .iter()
            .find(|g| g.codes.iter().any(|c| c == code))
            .map(|g| g.name.as_str())
    }

    pub fn is_chaff(&self, code: &str) -> bool {
        self.chaff.contains(code)
    }

    /// Every group name known to this model, for validating a phase filter
    /// that names a group rather than an individual phase code.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }

    pub fn diff_of(&self, code: &str) -> Option<&DiffractionEntry> {
        self.diffraction.get(code)
    }

    /// The add-on phase code for `code`, if the base branch's `x_max`
    /// satisfies the mapping's activation rule.
    pub fn add_on_of(&self, code: &str, x_max_deg: f64) -> Option<&str> {
        self.add_on.get(code).and_then(|entry| {
            if x_max_deg >= entry.activation_x_max_deg {
                Some(entry.add_on_code.as_str())
            } else {
                None
            }
        })
    }

    pub fn statistics_for(&self, code: &str) -> Option<&PhaseStatCurves> {
        self.statistics.get(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_extras() -> PhaseExtras {
        let groups = vec![PhaseGroup { name: "P".into(), codes: vec!["P".into(), "Pdiff".into()] }];
        let mut chaff = HashSet::new();
        chaff.insert("PcP2".into());
        let mut diffraction = HashMap::new();
        diffraction.insert(
            "P".into(),
            DiffractionEntry { diffracted_code: "Pdiff".into(), x_diff_deg: 150.0 },
        );
        let mut add_on = HashMap::new();
        add_on.insert(
            "P".into(),
            AddOnEntry { add_on_code: "pP".into(), activation_x_max_deg: 20.0 },
        );
        let mut statistics = HashMap::new();
        statistics.insert(
            "P".into(),
            PhaseStatCurves {
                bias: vec![
                    LinearSegment { delta_start_deg: 0.0, delta_end_deg: 50.0, slope: 0.01, offset: 0.0 },
                    LinearSegment { delta_start_deg: 50.0, delta_end_deg: 180.0, slope: -0.02, offset: 1.5 },
                ],
                spread: vec![LinearSegment { delta_start_deg: 0.0, delta_end_deg: 180.0, slope: 0.0, offset: 1.2 }],
                observability: vec![LinearSegment { delta_start_deg: 0.0, delta_end_deg: 180.0, slope: 0.0, offset: 0.9 }],
            },
        );
        PhaseExtras::new(groups, chaff, diffraction, add_on, statistics)
    }

    #[test]
    fn lists_group_names() {
        let extras = sample_extras();
        let names: Vec<&str> = extras.group_names().collect();
        assert_eq!(names, vec!["P"]);
    }

    #[test]
    fn looks_up_phase_group() {
        let extras = sample_extras();
        assert_eq!(extras.phase_group("Pdiff"), Some("P"));
        assert_eq!(extras.phase_group("ScS"), None);
    }

    #[test]
    fn detects_chaff() {
        let extras = sample_extras();
        assert!(extras.is_chaff("PcP2"));
        assert!(!extras.is_chaff("P"));
    }

    #[test]
    fn add_on_respects_activation_rule() {
        let extras = sample_extras();
        assert_eq!(extras.add_on_of("P", 25.0), Some("pP"));
        assert_eq!(extras.add_on_of("P", 5.0), None);
    }

    #[test]
    fn statistics_segments_are_continuous_at_the_boundary() {
        let extras = sample_extras();
        let curves = extras.statistics_for("P").unwrap();
        let seg1 = curves.bias[0].value_at(50.0);
        let seg2 = curves.bias[1].value_at(50.0);
        assert!((seg1 - seg2).abs() < 1e-9);
    }
}
