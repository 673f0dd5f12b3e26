use crate::core::config::WeightTables;
use crate::core::fusion::axis::{Axis, AxisScore};
use crate::core::provenance::ProvenanceResult;
use serde::Serialize;
use std::collections::BTreeMap;

/// 两种融合权重方案，不存在第三种
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightProfile {
    Default,
    ProvenanceDominant,
}

impl WeightProfile {
    pub fn select(provenance: &ProvenanceResult, dominant_confidence: f64) -> Self {
        if provenance.kind.is_verified() && provenance.confidence >= dominant_confidence {
            WeightProfile::ProvenanceDominant
        } else {
            WeightProfile::Default
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeightProfile::Default => "default",
            WeightProfile::ProvenanceDominant => "provenance_dominant",
        }
    }

    pub fn weights<'a>(&self, tables: &'a WeightTables) -> &'a BTreeMap<Axis, f64> {
        match self {
            WeightProfile::Default => &tables.default,
            WeightProfile::ProvenanceDominant => &tables.provenance_dominant,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeightedSum {
    pub base_score: f64,
    pub contributions: BTreeMap<Axis, f64>,
}

/// Weighted sum over the profile's axes. The provenance axis takes its value
/// from the provenance confidence; an axis missing from `axes` counts as 0.
pub fn weighted_sum(
    weights: &BTreeMap<Axis, f64>,
    axes: &BTreeMap<Axis, AxisScore>,
    provenance: &ProvenanceResult,
) -> WeightedSum {
    let mut contributions = BTreeMap::new();
    for (axis, weight) in weights {
        let value = match axis {
            Axis::Provenance => provenance.confidence,
            _ => axes.get(axis).map_or(0.0, |s| s.value),
        };
        contributions.insert(*axis, weight * value);
    }
    let base_score = contributions.values().sum::<f64>().clamp(0.0, 1.0);
    WeightedSum {
        base_score,
        contributions,
    }
}
