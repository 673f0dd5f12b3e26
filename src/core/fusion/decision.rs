//! 决策引擎：Scoring -> Deciding -> Done

use crate::core::config::DetectorConfig;
use crate::core::fusion::axis::{Axis, AxisScore};
use crate::core::fusion::holistic::{HolisticOutcome, HolisticReasoner};
use crate::core::fusion::semantic::{SemanticBoost, SemanticBooster};
use crate::core::fusion::verdict::{Label, Verdict};
use crate::core::fusion::weights::{weighted_sum, WeightProfile, WeightedSum};
use crate::core::provenance::ProvenanceResult;
use log::info;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Everything the engine needs for one verdict.
pub struct DecisionInputs<'a> {
    pub axes: &'a BTreeMap<Axis, AxisScore>,
    pub provenance: &'a ProvenanceResult,
    pub subject: Option<&'a str>,
    pub frames_analyzed: usize,
    /// Pipeline notes (skipped frames, truncation) carried into the explanations.
    pub notes: &'a [String],
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DecisionStage {
    Scoring,
    Deciding { score: f64 },
    Done { score: f64, label: Label },
}

impl DecisionStage {
    fn transition(self, scored: f64, ai_threshold: f64, auth_threshold: f64) -> DecisionStage {
        match self {
            DecisionStage::Scoring => DecisionStage::Deciding { score: scored },
            DecisionStage::Deciding { score } => {
                let label = if score >= ai_threshold {
                    Label::AiGenerated
                } else if score <= auth_threshold {
                    Label::Authentic
                } else {
                    Label::Uncertain
                };
                DecisionStage::Done { score, label }
            }
            done @ DecisionStage::Done { .. } => done,
        }
    }
}

struct Scored {
    profile: WeightProfile,
    sum: WeightedSum,
    holistic: HolisticOutcome,
    boost: SemanticBoost,
    degraded: bool,
    final_score: f64,
}

pub struct DecisionEngine {
    config: Arc<DetectorConfig>,
}

impl DecisionEngine {
    pub fn new(config: Arc<DetectorConfig>) -> Self {
        Self { config }
    }

    pub fn decide(&self, inputs: &DecisionInputs) -> Verdict {
        let scored = self.score(inputs);

        let mut stage = DecisionStage::Scoring;
        let (final_score, label) = loop {
            stage = match stage {
                DecisionStage::Done { score, label } => break (score, label),
                other => other.transition(
                    scored.final_score,
                    self.config.ai_threshold,
                    self.config.auth_threshold,
                ),
            };
        };

        let explanations = self.explain(inputs, &scored, final_score, label);
        info!("🏁 Verdict {} at {:.3} ({})", label.as_str(), final_score, scored.profile.as_str());

        let mut axis_scores: BTreeMap<Axis, f64> = inputs.axes.iter().map(|(a, s)| (*a, s.value)).collect();
        axis_scores.insert(Axis::Provenance, inputs.provenance.confidence);

        Verdict {
            final_score,
            label,
            weight_profile: scored.profile,
            weights_used: scored.profile.weights(&self.config.weights).clone(),
            axis_scores,
            axis_evidence: inputs.axes.clone(),
            contributions: scored.sum.contributions,
            provenance: inputs.provenance.clone(),
            holistic: scored.holistic,
            semantic_boost: scored.boost,
            explanations,
            degraded: scored.degraded,
            frames_analyzed: inputs.frames_analyzed,
        }
    }

    fn score(&self, inputs: &DecisionInputs) -> Scored {
        let c = &self.config;
        let profile = WeightProfile::select(inputs.provenance, c.provenance.dominant_confidence);
        let sum = weighted_sum(profile.weights(&c.weights), inputs.axes, inputs.provenance);
        let holistic = HolisticReasoner::new(&c.holistic).apply(sum.base_score, inputs.axes, inputs.provenance);
        let boost = SemanticBooster::new(&c.impossible_subjects).evaluate(inputs.subject, &inputs.provenance.kind);

        let mut final_score = (holistic.score + boost.value).clamp(0.0, 1.0);
        let degraded = inputs.frames_analyzed < c.min_frame_count;
        if degraded {
            let centre = (c.ai_threshold + c.auth_threshold) / 2.0;
            final_score = (final_score + c.degraded_pull * (centre - final_score)).clamp(0.0, 1.0);
        }

        Scored {
            profile,
            sum,
            holistic,
            boost,
            degraded,
            final_score,
        }
    }

    fn explain(&self, inputs: &DecisionInputs, scored: &Scored, final_score: f64, label: Label) -> Vec<String> {
        let c = &self.config;
        let weights = scored.profile.weights(&c.weights);
        let mut lines = Vec::new();

        lines.push(match scored.profile {
            WeightProfile::ProvenanceDominant => format!(
                "Weight profile: provenance_dominant (verified {} watermark, confidence {:.2})",
                inputs.provenance.provider.as_deref().unwrap_or("provider"),
                inputs.provenance.confidence
            ),
            WeightProfile::Default => "Weight profile: default".to_string(),
        });

        for (axis, score) in inputs.axes {
            let weight = weights.get(axis).copied().unwrap_or(0.0);
            if !score.reported {
                lines.push(format!(
                    "{}: not reported, default {:.2} used (weight {:.2})",
                    axis, score.value, weight
                ));
                continue;
            }
            let triggered: Vec<&str> = score
                .evidence
                .iter()
                .filter(|e| e.triggered)
                .map(|e| e.name.as_str())
                .collect();
            let mut line = format!(
                "{}: {:.2} (weight {:.2}) - {}",
                axis,
                score.value,
                weight,
                axis.describe(score.value)
            );
            if !triggered.is_empty() {
                line.push_str(&format!(" [triggered: {}]", triggered.join(", ")));
            }
            lines.push(line);
            lines.extend(score.input_flags.iter().map(|f| format!("Input clamped: {f}")));
        }

        lines.push(format!(
            "provenance: {} (confidence {:.2}, weight {:.2}) - {}",
            inputs.provenance.kind.as_str(),
            inputs.provenance.confidence,
            weights.get(&Axis::Provenance).copied().unwrap_or(0.0),
            Axis::Provenance.describe(inputs.provenance.confidence)
        ));
        lines.extend(inputs.provenance.details.iter().cloned());

        lines.push(format!("Weighted base score: {:.3}", scored.sum.base_score));
        if let Some(reason) = scored.holistic.reason() {
            lines.push(reason);
        }
        if scored.boost.is_applied() {
            lines.push(format!(
                "Semantic boost +{:.2}: {}",
                scored.boost.value, scored.boost.reason
            ));
        }

        lines.extend(inputs.notes.iter().cloned());
        if scored.degraded {
            lines.push(format!(
                "Only {} usable frame(s) (minimum {}); score pulled toward the uncertain band",
                inputs.frames_analyzed, c.min_frame_count
            ));
        }

        lines.push(match label {
            Label::AiGenerated => format!(
                "Final score {:.3} >= AI threshold {:.2}: {}",
                final_score,
                c.ai_threshold,
                label.as_str()
            ),
            Label::Authentic => format!(
                "Final score {:.3} <= authentic threshold {:.2}: {}",
                final_score,
                c.auth_threshold,
                label.as_str()
            ),
            Label::Uncertain => format!(
                "Final score {:.3} between {:.2} and {:.2}: {}",
                final_score,
                c.auth_threshold,
                c.ai_threshold,
                label.as_str()
            ),
        });
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::provenance::ProvenanceType;

    fn reported(values: &[(Axis, f64)]) -> BTreeMap<Axis, AxisScore> {
        let mut axes: BTreeMap<Axis, AxisScore> = Axis::EVIDENCE
            .iter()
            .map(|a| (*a, AxisScore::unreported(*a, 0.2)))
            .collect();
        for (axis, v) in values {
            let mut s = AxisScore::unreported(*axis, *v);
            s.reported = true;
            axes.insert(*axis, s);
        }
        axes
    }

    fn decide_with(config: DetectorConfig, axes: &BTreeMap<Axis, AxisScore>, provenance: &ProvenanceResult) -> Verdict {
        let engine = DecisionEngine::new(Arc::new(config));
        engine.decide(&DecisionInputs {
            axes,
            provenance,
            subject: None,
            frames_analyzed: 10,
            notes: &[],
        })
    }

    #[test]
    fn test_threshold_boundaries_are_inclusive() {
        let transition = |score: f64| {
            DecisionStage::Deciding { score }.transition(score, 0.50, 0.40)
        };
        assert_eq!(transition(0.50), DecisionStage::Done { score: 0.50, label: Label::AiGenerated });
        assert_eq!(transition(0.40), DecisionStage::Done { score: 0.40, label: Label::Authentic });
        assert_eq!(transition(0.45), DecisionStage::Done { score: 0.45, label: Label::Uncertain });
    }

    #[test]
    fn test_scoring_stage_moves_to_deciding() {
        assert_eq!(
            DecisionStage::Scoring.transition(0.3, 0.5, 0.4),
            DecisionStage::Deciding { score: 0.3 }
        );
    }

    #[test]
    fn test_exact_threshold_score_end_to_end() {
        // 单轴权重 1.0，使最终分数精确等于阈值
        let mut config = DetectorConfig::default();
        config.weights.default = BTreeMap::from([(Axis::Motion, 1.0)]);
        let none = ProvenanceResult::none(Vec::new());

        let v = decide_with(config.clone(), &reported(&[(Axis::Motion, 0.50)]), &none);
        assert_eq!(v.final_score, 0.50);
        assert_eq!(v.label, Label::AiGenerated);

        let v = decide_with(config, &reported(&[(Axis::Motion, 0.40)]), &none);
        assert_eq!(v.final_score, 0.40);
        assert_eq!(v.label, Label::Authentic);
    }

    #[test]
    fn test_degraded_pulls_toward_uncertain() {
        let config = DetectorConfig::default();
        let engine = DecisionEngine::new(Arc::new(config));
        let axes = reported(&[
            (Axis::Motion, 0.9),
            (Axis::Bio, 0.9),
            (Axis::Scene, 0.9),
            (Axis::Texture, 0.9),
        ]);
        let provenance = ProvenanceResult::none(Vec::new());
        let v = engine.decide(&DecisionInputs {
            axes: &axes,
            provenance: &provenance,
            subject: None,
            frames_analyzed: 1,
            notes: &[],
        });
        assert!(v.degraded);
        // 0.855 -> 0.855 + 0.5 * (0.45 - 0.855)
        assert!((v.final_score - 0.6525).abs() < 1e-9);
        assert!(v.explanations.iter().any(|e| e.contains("usable frame")));
    }

    #[test]
    fn test_semantic_boost_clamped() {
        let config = DetectorConfig::default();
        let engine = DecisionEngine::new(Arc::new(config));
        let axes = reported(&[
            (Axis::Motion, 1.0),
            (Axis::Bio, 1.0),
            (Axis::Scene, 1.0),
            (Axis::Texture, 1.0),
        ]);
        let provenance = ProvenanceResult {
            kind: ProvenanceType::GenericOrUntrusted,
            confidence: 0.3,
            weight_recommendation: 0.15,
            ..ProvenanceResult::none(Vec::new())
        };
        let v = engine.decide(&DecisionInputs {
            axes: &axes,
            provenance: &provenance,
            subject: Some("Michael Jackson"),
            frames_analyzed: 10,
            notes: &[],
        });
        assert_eq!(v.semantic_boost.value, 0.30);
        assert_eq!(v.final_score, 1.0);
        assert_eq!(v.label, Label::AiGenerated);
    }

    #[test]
    fn test_explanations_ordered() {
        let axes = reported(&[(Axis::Motion, 0.1), (Axis::Bio, 0.1), (Axis::Scene, 0.1), (Axis::Texture, 0.1)]);
        let v = decide_with(DetectorConfig::default(), &axes, &ProvenanceResult::none(Vec::new()));
        assert!(v.explanations[0].starts_with("Weight profile: default"));
        assert!(v.explanations[1].starts_with("motion: 0.10"));
        assert!(v.explanations.iter().any(|e| e.starts_with("audio: not reported")));
        assert!(v.explanations.last().unwrap().ends_with("AUTHENTIC"));
    }

    #[test]
    fn test_monotone_in_each_axis() {
        let provenance = ProvenanceResult::none(Vec::new());
        let grid = [0.0, 0.1, 0.29, 0.3, 0.31, 0.5, 0.69, 0.7, 0.71, 0.9, 1.0];
        let base = [(Axis::Motion, 0.5), (Axis::Bio, 0.25), (Axis::Scene, 0.2), (Axis::Texture, 0.6)];
        for (i, (axis, _)) in base.iter().enumerate() {
            let mut last = -1.0;
            for v in grid {
                let mut values = base.to_vec();
                values[i] = (*axis, v);
                let verdict = decide_with(DetectorConfig::default(), &reported(&values), &provenance);
                assert!(verdict.final_score >= last, "{axis} at {v}");
                last = verdict.final_score;
            }
        }
    }
}
