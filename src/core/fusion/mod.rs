pub mod axis;
pub mod decision;
pub mod holistic;
pub mod semantic;
pub mod verdict;
pub mod weights;

pub use axis::{Axis, AxisAggregator, AxisReport, AxisRuleTable, AxisScore, EvidenceEntry, RawEvidence};
pub use decision::{DecisionEngine, DecisionInputs};
pub use holistic::{HolisticOutcome, HolisticReasoner, HolisticRule, SignalCounts};
pub use semantic::{SemanticBoost, SemanticBooster};
pub use verdict::{Label, Verdict};
pub use weights::{weighted_sum, WeightProfile, WeightedSum};
