use crate::core::fusion::axis::{Axis, AxisScore};
use crate::core::fusion::holistic::HolisticOutcome;
use crate::core::fusion::semantic::SemanticBoost;
use crate::core::fusion::weights::WeightProfile;
use crate::core::provenance::ProvenanceResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Label {
    AiGenerated,
    Authentic,
    Uncertain,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::AiGenerated => "AI_GENERATED",
            Label::Authentic => "AUTHENTIC",
            Label::Uncertain => "UNCERTAIN",
        }
    }
}

/// 一次分析的最终结论，唯一对外输出
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub final_score: f64,
    pub label: Label,
    pub weight_profile: WeightProfile,
    pub weights_used: BTreeMap<Axis, f64>,
    /// Fused value per axis, provenance included.
    pub axis_scores: BTreeMap<Axis, f64>,
    pub axis_evidence: BTreeMap<Axis, AxisScore>,
    pub contributions: BTreeMap<Axis, f64>,
    pub provenance: ProvenanceResult,
    pub holistic: HolisticOutcome,
    pub semantic_boost: SemanticBoost,
    pub explanations: Vec<String>,
    /// Too few usable frames; the score was pulled toward the uncertain band.
    pub degraded: bool,
    pub frames_analyzed: usize,
}

impl Verdict {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
