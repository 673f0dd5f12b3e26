//! Holistic overlay: counts strongly-leaning axes and clamps the weighted sum
//! toward the direction several axes agree on.

use crate::core::config::HolisticConfig;
use crate::core::fusion::axis::{Axis, AxisScore};
use crate::core::provenance::ProvenanceResult;
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HolisticRule {
    MultipleStrongAi,
    VerifiedWithSupport,
    MultipleStrongReal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SignalCounts {
    pub strong_ai: u32,
    pub strong_real: u32,
    pub ai_axes: Vec<Axis>,
    pub real_axes: Vec<Axis>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HolisticOutcome {
    pub base_score: f64,
    pub score: f64,
    pub counts: SignalCounts,
    pub rule: Option<HolisticRule>,
}

impl HolisticOutcome {
    pub fn reason(&self) -> Option<String> {
        let rule = self.rule?;
        let names = |axes: &[Axis]| axes.iter().map(Axis::as_str).collect::<Vec<_>>().join(", ");
        let text = match rule {
            HolisticRule::MultipleStrongAi => format!(
                "multiple strong AI signals ({}: {})",
                self.counts.strong_ai,
                names(&self.counts.ai_axes)
            ),
            HolisticRule::VerifiedWithSupport => format!(
                "verified watermark supported by strong AI axis ({})",
                names(&self.counts.ai_axes)
            ),
            HolisticRule::MultipleStrongReal => format!(
                "multiple strong authentic signals ({}: {}) and no AI signal",
                self.counts.strong_real,
                names(&self.counts.real_axes)
            ),
        };
        Some(format!(
            "Holistic: {} moved score {:.3} to {:.3}",
            text, self.base_score, self.score
        ))
    }
}

pub struct HolisticReasoner<'a> {
    config: &'a HolisticConfig,
}

impl<'a> HolisticReasoner<'a> {
    pub fn new(config: &'a HolisticConfig) -> Self {
        Self { config }
    }

    /// Only reported axes are counted. A verified provenance adds
    /// `verified_signal_count` strong-AI signals; provenance never counts as
    /// a strong-REAL signal.
    pub fn count(&self, axes: &BTreeMap<Axis, AxisScore>, provenance: &ProvenanceResult) -> SignalCounts {
        let mut counts = SignalCounts::default();
        for (axis, score) in axes {
            if !score.reported || *axis == Axis::Provenance {
                continue;
            }
            let (strong_ai, strong_real) = self.config.thresholds_for(*axis);
            if score.value >= strong_ai {
                counts.strong_ai += 1;
                counts.ai_axes.push(*axis);
            } else if score.value <= strong_real {
                counts.strong_real += 1;
                counts.real_axes.push(*axis);
            }
        }
        if provenance.kind.is_verified() {
            counts.strong_ai += self.config.verified_signal_count;
            counts.ai_axes.push(Axis::Provenance);
        }
        counts
    }

    pub fn apply(
        &self,
        base_score: f64,
        axes: &BTreeMap<Axis, AxisScore>,
        provenance: &ProvenanceResult,
    ) -> HolisticOutcome {
        let c = self.config;
        let counts = self.count(axes, provenance);
        let supporting_axes = counts.ai_axes.iter().filter(|a| **a != Axis::Provenance).count();

        let (score, rule) = if counts.strong_ai >= c.multi_ai_min {
            (base_score.max(c.multi_ai_floor), Some(HolisticRule::MultipleStrongAi))
        } else if provenance.kind.is_verified() && supporting_axes >= 1 {
            (base_score.max(c.verified_support_floor), Some(HolisticRule::VerifiedWithSupport))
        } else if counts.strong_real >= c.real_min && counts.strong_ai == 0 {
            (base_score.min(c.real_cap), Some(HolisticRule::MultipleStrongReal))
        } else {
            (base_score, None)
        };

        debug!(
            "🧠 Holistic: ai={} real={} rule={:?} {:.3} -> {:.3}",
            counts.strong_ai, counts.strong_real, rule, base_score, score
        );

        HolisticOutcome {
            base_score,
            score: score.clamp(0.0, 1.0),
            counts,
            rule,
        }
    }
}
