//! Axis evidence aggregation.
//!
//! External extractors hand over one [`AxisReport`] per axis. Each report is
//! reduced to a single [`AxisScore`] by interpreting that axis' rule table: an
//! ordered list of `(predicate, score)` bands per sub-feature, first match wins.

use log::{debug, warn};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Motion,
    Bio,
    Scene,
    Texture,
    Audio,
    Provenance,
}

impl Axis {
    /// Axes fed by external extractors. Provenance is computed in-process.
    pub const EVIDENCE: [Axis; 5] = [
        Axis::Motion,
        Axis::Bio,
        Axis::Scene,
        Axis::Texture,
        Axis::Audio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Motion => "motion",
            Axis::Bio => "bio",
            Axis::Scene => "scene",
            Axis::Texture => "texture",
            Axis::Audio => "audio",
            Axis::Provenance => "provenance",
        }
    }

    /// Accepts the canonical names plus the long-form names extractors use.
    pub fn parse(name: &str) -> Option<Axis> {
        match name.trim().to_ascii_lowercase().as_str() {
            "motion" | "motion_temporal" => Some(Axis::Motion),
            "bio" | "bio_physics" | "biological" => Some(Axis::Bio),
            "scene" | "scene_logic" => Some(Axis::Scene),
            "texture" | "texture_freq" | "frequency" => Some(Axis::Texture),
            "audio" | "audio_sync" => Some(Axis::Audio),
            "provenance" | "watermark" => Some(Axis::Provenance),
            _ => None,
        }
    }

    /// 分数区间的人类可读描述
    pub fn describe(&self, score: f64) -> &'static str {
        let band = match score {
            s if s <= 0.2 => 0,
            s if s <= 0.4 => 1,
            s if s <= 0.6 => 2,
            s if s <= 0.8 => 3,
            _ => 4,
        };
        match self {
            Axis::Motion => [
                "Excellent temporal stability: static objects stable, edges consistent",
                "Good temporal stability with minor artifacts",
                "Moderate temporal artifacts in static regions or edges",
                "Significant temporal artifacts: pixel boiling or edge wobbling",
                "Strong AI signal: heavy pixel boiling and unnatural motion patterns",
            ][band],
            Axis::Bio => [
                "All motion appears physically and biologically plausible",
                "Mostly plausible motion with minor anomalies",
                "Some odd motion patterns, could still be real",
                "Clear anatomical or physical inconsistencies",
                "Strong evidence of anatomical impossibilities or unnatural physics",
            ][band],
            Axis::Scene => [
                "Lighting, shadows, reflections and geometry all consistent",
                "Mostly consistent scene logic with minor inconsistencies",
                "Some scene logic violations in lighting, shadows or geometry",
                "Significant scene logic violations: inconsistent shadows or perspective",
                "Impossible lighting, shadows or geometry",
            ][band],
            Axis::Texture => [
                "Natural textures with only compression artifacts",
                "Mostly natural textures with some generative-style patterns",
                "Some generative-style textures: over-smooth detail or repeats",
                "Strong generative artifacts: halos or melting textures",
                "Clear GAN/diffusion texture signatures",
            ][band],
            Axis::Audio => [
                "Audio and lip motion tightly synchronised",
                "Audio sync mostly consistent",
                "Some audio/lip drift",
                "Noticeable audio/lip mismatch",
                "Audio and lip motion clearly decoupled",
            ][band],
            Axis::Provenance => [
                "No generator watermark evidence",
                "Weak overlay evidence",
                "Plausible overlay, not a verified generator mark",
                "Likely generator watermark",
                "Verified generator watermark",
            ][band],
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    Above(f64),
    AtLeast(f64),
    Below(f64),
    AtMost(f64),
}

impl Predicate {
    pub fn holds(&self, raw: f64) -> bool {
        match *self {
            Predicate::Above(t) => raw > t,
            Predicate::AtLeast(t) => raw >= t,
            Predicate::Below(t) => raw < t,
            Predicate::AtMost(t) => raw <= t,
        }
    }

    pub fn threshold(&self) -> f64 {
        match *self {
            Predicate::Above(t) | Predicate::AtLeast(t) | Predicate::Below(t) | Predicate::AtMost(t) => t,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub when: Predicate,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubFeatureRule {
    pub bands: Vec<Band>,
    pub otherwise: f64,
}

impl SubFeatureRule {
    fn new(bands: &[(Predicate, f64)], otherwise: f64) -> Self {
        Self {
            bands: bands
                .iter()
                .map(|(when, score)| Band {
                    when: *when,
                    score: *score,
                })
                .collect(),
            otherwise,
        }
    }

    /// Returns (score, matched band) for a raw value.
    pub fn evaluate(&self, raw: f64) -> (f64, Option<&Band>) {
        match self.bands.iter().find(|band| band.when.holds(raw)) {
            Some(band) => (band.score, Some(band)),
            None => (self.otherwise, None),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisRuleTable {
    /// Value used when the axis is not reported or carries nothing usable.
    pub default_value: f64,
    pub rules: BTreeMap<String, SubFeatureRule>,
    /// Scores for sub-features without a rule, decided by the extractor's own threshold.
    pub unmatched_triggered: f64,
    pub unmatched_quiet: f64,
}

impl Default for AxisRuleTable {
    fn default() -> Self {
        Self {
            default_value: 0.5,
            rules: BTreeMap::new(),
            unmatched_triggered: 0.70,
            unmatched_quiet: 0.10,
        }
    }
}

impl AxisRuleTable {
    pub fn defaults_for(axis: Axis) -> Self {
        use Predicate::*;

        let (default_value, rules): (f64, Vec<(&str, SubFeatureRule)>) = match axis {
            Axis::Motion => (
                0.1,
                vec![
                    (
                        "static_variance_change",
                        SubFeatureRule::new(&[(Above(0.15), 0.75), (Above(0.08), 0.55), (Above(0.04), 0.35)], 0.1),
                    ),
                    (
                        "edge_instability",
                        SubFeatureRule::new(&[(Above(0.12), 0.85), (Above(0.06), 0.65), (Above(0.03), 0.45)], 0.1),
                    ),
                    (
                        "flow_relative_variance",
                        SubFeatureRule::new(&[(Above(1.5), 0.75), (Above(0.8), 0.55), (Above(0.4), 0.35)], 0.1),
                    ),
                ],
            ),
            Axis::Bio => (
                0.2,
                vec![
                    (
                        "face_max_shift",
                        SubFeatureRule::new(&[(Above(50.0), 0.85), (Above(25.0), 0.65), (Above(12.0), 0.45)], 0.1),
                    ),
                    (
                        "movement_jitter",
                        SubFeatureRule::new(&[(Above(1.5), 0.7), (Above(0.8), 0.5), (Above(0.4), 0.3)], 0.1),
                    ),
                    (
                        "face_size_change",
                        SubFeatureRule::new(&[(Above(0.2), 0.75), (Above(0.1), 0.55), (Above(0.05), 0.35)], 0.1),
                    ),
                    (
                        "blink_irregularity",
                        SubFeatureRule::new(&[(Above(0.9), 0.7), (Above(0.6), 0.45)], 0.1),
                    ),
                ],
            ),
            Axis::Scene => (
                0.2,
                vec![
                    (
                        "brightness_variance",
                        SubFeatureRule::new(&[(Above(0.15), 0.6), (Above(0.08), 0.3)], 0.1),
                    ),
                    (
                        "line_angle_std",
                        SubFeatureRule::new(&[(Above(10.0), 0.7), (Above(5.0), 0.4)], 0.1),
                    ),
                    (
                        "color_correlation",
                        SubFeatureRule::new(&[(Below(0.7), 0.6), (Below(0.85), 0.3)], 0.1),
                    ),
                    (
                        "logic_break",
                        SubFeatureRule::new(&[(AtLeast(0.8), 0.85), (AtLeast(0.4), 0.5)], 0.1),
                    ),
                ],
            ),
            Axis::Texture => (
                0.2,
                vec![
                    (
                        "mid_freq_ratio",
                        SubFeatureRule::new(&[(Above(1.5), 0.7), (Above(1.2), 0.4)], 0.1),
                    ),
                    (
                        "laplacian_variance",
                        SubFeatureRule::new(&[(Above(500.0), 0.5), (Below(10.0), 0.5)], 0.1),
                    ),
                    (
                        "halo_brightness_diff",
                        SubFeatureRule::new(&[(Above(30.0), 0.6), (Above(15.0), 0.3)], 0.1),
                    ),
                ],
            ),
            Axis::Audio => (
                0.5,
                vec![
                    (
                        "lip_audio_correlation",
                        SubFeatureRule::new(&[(Below(0.45), 0.7), (Below(0.6), 0.4)], 0.1),
                    ),
                    ("phoneme_lag", SubFeatureRule::new(&[(Above(0.5), 0.6)], 0.1)),
                ],
            ),
            Axis::Provenance => (0.0, Vec::new()),
        };

        Self {
            default_value,
            rules: rules
                .into_iter()
                .map(|(name, rule)| (name.to_string(), rule))
                .collect(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let unit = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
        if !unit(self.default_value) || !unit(self.unmatched_triggered) || !unit(self.unmatched_quiet) {
            return Err("default and unmatched scores must lie in [0, 1]".to_string());
        }
        for (name, rule) in &self.rules {
            if !unit(rule.otherwise) {
                return Err(format!("{name}: otherwise score out of range"));
            }
            for band in &rule.bands {
                if !unit(band.score) || !band.when.threshold().is_finite() {
                    return Err(format!("{name}: band score or threshold out of range"));
                }
            }
        }
        Ok(())
    }
}

/// A partial rule table from configuration. Missing fields keep the axis'
/// built-in values and listed sub-features replace the built-in rule of the
/// same name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AxisRuleOverride {
    pub default_value: Option<f64>,
    pub rules: BTreeMap<String, SubFeatureRule>,
    pub unmatched_triggered: Option<f64>,
    pub unmatched_quiet: Option<f64>,
}

impl AxisRuleTable {
    pub fn with_override(axis: Axis, patch: AxisRuleOverride) -> Self {
        let mut table = Self::defaults_for(axis);
        if let Some(v) = patch.default_value {
            table.default_value = v;
        }
        if let Some(v) = patch.unmatched_triggered {
            table.unmatched_triggered = v;
        }
        if let Some(v) = patch.unmatched_quiet {
            table.unmatched_quiet = v;
        }
        table.rules.extend(patch.rules);
        table
    }
}

/// Rule tables for every evidence axis, with configured overrides merged onto
/// the built-in tables.
pub fn deserialize_rule_tables<'de, D>(deserializer: D) -> Result<BTreeMap<Axis, AxisRuleTable>, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = BTreeMap::<Axis, AxisRuleOverride>::deserialize(deserializer)?;
    let mut tables: BTreeMap<Axis, AxisRuleTable> = Axis::EVIDENCE
        .iter()
        .map(|axis| (*axis, AxisRuleTable::defaults_for(*axis)))
        .collect();
    for (axis, patch) in overrides {
        tables.insert(axis, AxisRuleTable::with_override(axis, patch));
    }
    Ok(tables)
}

/// One sub-feature as delivered by an external extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvidence {
    pub name: String,
    pub raw_value: f64,
    pub threshold: f64,
}

/// 外部特征提取器的输出记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisReport {
    pub axis_name: String,
    pub value: f64,
    #[serde(default)]
    pub evidence: Vec<RawEvidence>,
}

impl AxisReport {
    pub fn new(axis: Axis, value: f64) -> Self {
        Self {
            axis_name: axis.as_str().to_string(),
            value,
            evidence: Vec::new(),
        }
    }

    pub fn with_evidence(mut self, name: &str, raw_value: f64, threshold: f64) -> Self {
        self.evidence.push(RawEvidence {
            name: name.to_string(),
            raw_value,
            threshold,
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvidenceEntry {
    pub name: String,
    pub raw_value: f64,
    pub threshold: f64,
    pub triggered: bool,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisScore {
    pub axis: Axis,
    pub value: f64,
    pub evidence: Vec<EvidenceEntry>,
    /// false when no extractor reported this axis and the table default stands in.
    pub reported: bool,
    /// Set when the input had to be clamped or replaced.
    pub input_flags: Vec<String>,
}

impl AxisScore {
    pub fn unreported(axis: Axis, default_value: f64) -> Self {
        Self {
            axis,
            value: default_value,
            evidence: Vec::new(),
            reported: false,
            input_flags: Vec::new(),
        }
    }
}

pub struct AxisAggregator<'a> {
    tables: &'a BTreeMap<Axis, AxisRuleTable>,
}

impl<'a> AxisAggregator<'a> {
    pub fn new(tables: &'a BTreeMap<Axis, AxisRuleTable>) -> Self {
        Self { tables }
    }

    /// Reduces all reports to one score per evidence axis. Every evidence axis
    /// appears in the output, reported or not.
    pub fn aggregate(&self, reports: &[AxisReport]) -> BTreeMap<Axis, AxisScore> {
        let mut scores = BTreeMap::new();

        for report in reports {
            let Some(axis) = Axis::parse(&report.axis_name) else {
                warn!("⚠️ Unknown axis '{}' ignored", report.axis_name);
                continue;
            };
            if axis == Axis::Provenance {
                warn!("⚠️ External provenance report ignored, provenance is computed from frames");
                continue;
            }
            if scores.contains_key(&axis) {
                warn!("⚠️ Duplicate report for axis {} ignored", axis);
                continue;
            }
            scores.insert(axis, self.score_report(axis, report));
        }

        for axis in Axis::EVIDENCE {
            scores
                .entry(axis)
                .or_insert_with(|| AxisScore::unreported(axis, self.table(axis).default_value));
        }

        scores
    }

    fn table(&self, axis: Axis) -> AxisRuleTable {
        self.tables
            .get(&axis)
            .cloned()
            .unwrap_or_else(|| AxisRuleTable::defaults_for(axis))
    }

    fn score_report(&self, axis: Axis, report: &AxisReport) -> AxisScore {
        let table = self.table(axis);
        let mut flags = Vec::new();
        let mut evidence = Vec::with_capacity(report.evidence.len());

        for item in &report.evidence {
            if !item.raw_value.is_finite() {
                warn!("⚠️ {}: sub-feature '{}' is not finite, skipped", axis, item.name);
                flags.push(format!("{} sub-feature '{}' was not a finite number and was skipped", axis, item.name));
                continue;
            }

            let entry = match table.rules.get(&item.name) {
                Some(rule) => {
                    let (score, band) = rule.evaluate(item.raw_value);
                    let threshold = band
                        .or(rule.bands.first())
                        .map(|b| b.when.threshold())
                        .unwrap_or(item.threshold);
                    EvidenceEntry {
                        name: item.name.clone(),
                        raw_value: item.raw_value,
                        threshold,
                        triggered: band.is_some(),
                        score,
                    }
                }
                None => {
                    let triggered = item.threshold.is_finite() && item.raw_value >= item.threshold;
                    EvidenceEntry {
                        name: item.name.clone(),
                        raw_value: item.raw_value,
                        threshold: item.threshold,
                        triggered,
                        score: if triggered {
                            table.unmatched_triggered
                        } else {
                            table.unmatched_quiet
                        },
                    }
                }
            };
            evidence.push(entry);
        }

        // 有证据时以证据为准，但上报值异常仍要记录
        let reported_value = self.sanitize_value(axis, report.value, table.default_value, &mut flags);
        let value = if evidence.is_empty() {
            reported_value
        } else {
            let mean = evidence.iter().map(|e| e.score).sum::<f64>() / evidence.len() as f64;
            mean.clamp(0.0, 1.0)
        };

        debug!(
            "📊 Axis {}: value={:.3} from {} evidence entries",
            axis,
            value,
            evidence.len()
        );

        AxisScore {
            axis,
            value,
            evidence,
            reported: true,
            input_flags: flags,
        }
    }

    fn sanitize_value(&self, axis: Axis, value: f64, default_value: f64, flags: &mut Vec<String>) -> f64 {
        if value.is_nan() {
            warn!("⚠️ {}: NaN value replaced by default {:.2}", axis, default_value);
            flags.push(format!("{} value was NaN, replaced by default {:.2}", axis, default_value));
            return default_value;
        }
        if !(0.0..=1.0).contains(&value) {
            let clamped = value.clamp(0.0, 1.0);
            warn!("⚠️ {}: value {} clamped to {:.2}", axis, value, clamped);
            flags.push(format!("{} value {} was out of range, clamped to {:.2}", axis, value, clamped));
            return clamped;
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_tables() -> BTreeMap<Axis, AxisRuleTable> {
        Axis::EVIDENCE
            .iter()
            .map(|a| (*a, AxisRuleTable::defaults_for(*a)))
            .collect()
    }

    #[test]
    fn test_axis_parse_aliases() {
        assert_eq!(Axis::parse("bio_physics"), Some(Axis::Bio));
        assert_eq!(Axis::parse(" Motion "), Some(Axis::Motion));
        assert_eq!(Axis::parse("watermark"), Some(Axis::Provenance));
        assert_eq!(Axis::parse("smell"), None);
    }

    #[test]
    fn test_first_matching_band_wins() {
        let rule = SubFeatureRule::new(
            &[(Predicate::Above(0.15), 0.75), (Predicate::Above(0.08), 0.55)],
            0.1,
        );
        assert_eq!(rule.evaluate(0.2).0, 0.75);
        assert_eq!(rule.evaluate(0.1).0, 0.55);
        assert_eq!(rule.evaluate(0.08).0, 0.1);
        assert!(rule.evaluate(0.01).1.is_none());
    }

    #[test]
    fn test_two_sided_rule() {
        let table = AxisRuleTable::defaults_for(Axis::Texture);
        let rule = &table.rules["laplacian_variance"];
        assert_eq!(rule.evaluate(900.0).0, 0.5);
        assert_eq!(rule.evaluate(5.0).0, 0.5);
        assert_eq!(rule.evaluate(100.0).0, 0.1);
    }

    #[test]
    fn test_value_from_evidence_mean() {
        let tables = default_tables();
        let aggregator = AxisAggregator::new(&tables);
        let report = AxisReport::new(Axis::Motion, 0.0)
            .with_evidence("edge_instability", 0.2, 0.12)
            .with_evidence("flow_relative_variance", 0.1, 0.4);
        let scores = aggregator.aggregate(&[report]);
        let motion = &scores[&Axis::Motion];
        assert!((motion.value - (0.85 + 0.1) / 2.0).abs() < 1e-12);
        assert!(motion.evidence[0].triggered);
        assert!(!motion.evidence[1].triggered);
        assert_eq!(motion.evidence[0].threshold, 0.12);
    }

    #[test]
    fn test_unknown_sub_feature_uses_extractor_threshold() {
        let tables = default_tables();
        let aggregator = AxisAggregator::new(&tables);
        let report = AxisReport::new(Axis::Scene, 0.0).with_evidence("shadow_mismatch", 0.9, 0.5);
        let scores = aggregator.aggregate(&[report]);
        let scene = &scores[&Axis::Scene];
        assert!(scene.evidence[0].triggered);
        assert_eq!(scene.value, 0.70);
    }

    #[test]
    fn test_invalid_values_are_clamped_and_flagged() {
        let tables = default_tables();
        let aggregator = AxisAggregator::new(&tables);
        let scores = aggregator.aggregate(&[
            AxisReport::new(Axis::Motion, f64::NAN),
            AxisReport::new(Axis::Bio, 1.7),
            AxisReport::new(Axis::Scene, -0.2),
        ]);
        assert_eq!(scores[&Axis::Motion].value, 0.1);
        assert_eq!(scores[&Axis::Bio].value, 1.0);
        assert_eq!(scores[&Axis::Scene].value, 0.0);
        assert_eq!(scores[&Axis::Motion].input_flags.len(), 1);
        assert_eq!(scores[&Axis::Bio].input_flags.len(), 1);
    }

    #[test]
    fn test_non_finite_evidence_skipped() {
        let tables = default_tables();
        let aggregator = AxisAggregator::new(&tables);
        let report = AxisReport::new(Axis::Motion, 0.4).with_evidence("edge_instability", f64::INFINITY, 0.1);
        let scores = aggregator.aggregate(&[report]);
        let motion = &scores[&Axis::Motion];
        assert!(motion.evidence.is_empty());
        assert_eq!(motion.value, 0.4);
        assert_eq!(motion.input_flags.len(), 1);
    }

    #[test]
    fn test_unreported_axes_filled_with_defaults() {
        let tables = default_tables();
        let aggregator = AxisAggregator::new(&tables);
        let scores = aggregator.aggregate(&[AxisReport::new(Axis::Motion, 0.3)]);
        assert_eq!(scores.len(), 5);
        assert!(scores[&Axis::Motion].reported);
        assert!(!scores[&Axis::Audio].reported);
        assert_eq!(scores[&Axis::Texture].value, 0.2);
    }

    #[test]
    fn test_axis_value_isolated_from_other_axes() {
        let tables = default_tables();
        let aggregator = AxisAggregator::new(&tables);
        let a = aggregator.aggregate(&[AxisReport::new(Axis::Motion, 0.3), AxisReport::new(Axis::Bio, 0.1)]);
        let b = aggregator.aggregate(&[AxisReport::new(Axis::Motion, 0.3), AxisReport::new(Axis::Bio, 0.9)]);
        assert_eq!(a[&Axis::Motion], b[&Axis::Motion]);
    }

    #[test]
    fn test_duplicate_and_provenance_reports_ignored() {
        let tables = default_tables();
        let aggregator = AxisAggregator::new(&tables);
        let scores = aggregator.aggregate(&[
            AxisReport::new(Axis::Motion, 0.3),
            AxisReport::new(Axis::Motion, 0.9),
            AxisReport::new(Axis::Provenance, 1.0),
        ]);
        assert_eq!(scores[&Axis::Motion].value, 0.3);
        assert!(!scores.contains_key(&Axis::Provenance));
    }

    #[test]
    fn test_bad_reported_value_flagged_alongside_evidence() {
        let tables = default_tables();
        let aggregator = AxisAggregator::new(&tables);
        let scores = aggregator.aggregate(&[
            AxisReport::new(Axis::Motion, f64::NAN).with_evidence("edge_instability", 0.2, 0.12),
            AxisReport::new(Axis::Bio, 3.5).with_evidence("face_max_shift", 60.0, 50.0),
        ]);
        let motion = &scores[&Axis::Motion];
        assert_eq!(motion.value, 0.85);
        assert_eq!(motion.input_flags.len(), 1);
        assert!(motion.input_flags[0].contains("NaN"));
        assert_eq!(scores[&Axis::Bio].value, 0.85);
        assert!(scores[&Axis::Bio].input_flags[0].contains("out of range"));
    }

    #[test]
    fn test_override_merges_onto_axis_defaults() {
        let patch = AxisRuleOverride {
            rules: BTreeMap::from([(
                "edge_instability".to_string(),
                SubFeatureRule::new(&[(Predicate::Above(0.2), 0.9)], 0.05),
            )]),
            ..Default::default()
        };
        let table = AxisRuleTable::with_override(Axis::Motion, patch);
        assert_eq!(table.default_value, 0.1);
        assert_eq!(table.rules.len(), 3);
        assert_eq!(table.rules["edge_instability"].evaluate(0.3).0, 0.9);
        assert_eq!(table.rules["static_variance_change"].evaluate(0.2).0, 0.75);
    }
}
