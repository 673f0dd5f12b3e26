//! 检测配置 - 启动时加载一次，校验后只读共享

use crate::core::error::ConfigError;
use crate::core::fusion::axis::{self, Axis, AxisRuleTable};
use crate::core::provenance::lexicon;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Upper bound for any single semantic impossibility boost.
pub const MAX_SEMANTIC_BOOST: f64 = 0.40;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub ai_threshold: f64,
    pub auth_threshold: f64,
    /// Below this many decoded frames the verdict is marked degraded.
    pub min_frame_count: usize,
    /// How far a degraded score is pulled toward the centre of the uncertain band.
    pub degraded_pull: f64,
    pub provenance: ProvenanceConfig,
    pub matcher: MatcherConfig,
    pub regions: RegionConfig,
    pub holistic: HolisticConfig,
    pub weights: WeightTables,
    #[serde(deserialize_with = "axis::deserialize_rule_tables")]
    pub axis_rules: BTreeMap<Axis, AxisRuleTable>,
    /// provider name -> aliases that may show up in overlay text
    pub lexicon: BTreeMap<String, Vec<String>>,
    pub impossible_subjects: BTreeMap<String, ImpossibleSubject>,
    pub limits: AnalysisLimits,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            ai_threshold: 0.50,
            auth_threshold: 0.40,
            min_frame_count: 3,
            degraded_pull: 0.5,
            provenance: ProvenanceConfig::default(),
            matcher: MatcherConfig::default(),
            regions: RegionConfig::default(),
            holistic: HolisticConfig::default(),
            weights: WeightTables::default(),
            axis_rules: Axis::EVIDENCE
                .iter()
                .map(|axis| (*axis, AxisRuleTable::defaults_for(*axis)))
                .collect(),
            lexicon: lexicon::default_lexicon(),
            impossible_subjects: default_impossible_subjects(),
            limits: AnalysisLimits::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvenanceConfig {
    pub verified_threshold: f64,
    pub persistence_min: f64,
    /// Per-frame similarity a provider needs before the frame counts as "detected".
    pub detection_floor: f64,
    pub provider_floors: BTreeMap<String, f64>,
    /// Lower similarity floor that still marks an overlay as generic/untrusted.
    pub generic_floor: f64,
    pub generic_confidence_cap: f64,
    /// Confidence a verified match needs before the provenance-dominant profile applies.
    pub dominant_confidence: f64,
    pub similarity_weight: f64,
    pub persistence_weight: f64,
    pub corner_weight: f64,
}

impl Default for ProvenanceConfig {
    fn default() -> Self {
        Self {
            verified_threshold: 0.80,
            persistence_min: 0.50,
            detection_floor: 0.50,
            provider_floors: BTreeMap::new(),
            generic_floor: 0.40,
            generic_confidence_cap: 0.30,
            dominant_confidence: 0.80,
            similarity_weight: 0.5,
            persistence_weight: 0.3,
            corner_weight: 0.2,
        }
    }
}

impl ProvenanceConfig {
    pub fn floor_for(&self, provider: &str) -> f64 {
        self.provider_floors
            .get(provider)
            .copied()
            .unwrap_or(self.detection_floor)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    pub template_weight: f64,
    pub feature_weight: f64,
    pub histogram_weight: f64,
    pub structural_weight: f64,
    /// Crops with a side shorter than this are scored 0 without running any method.
    pub min_crop_side: u32,
    /// Longest side of the common working resolution.
    pub working_size: u32,
    /// Longest side of the crop copy the logo is searched in.
    pub search_size: u32,
    /// Smallest logo height tried, relative to the largest that fits the crop.
    pub min_logo_scale: f64,
    /// Coarse template score a window needs before it is re-aligned at full resolution.
    pub refine_floor: f64,
    pub max_keypoints: usize,
    pub ratio_test: f64,
    pub max_descriptor_distance: u32,
    /// Share of the logo's keypoints expected to survive matching on a true hit.
    pub expected_match_fraction: f64,
    pub histogram_bins: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            template_weight: 1.0,
            feature_weight: 1.0,
            histogram_weight: 1.0,
            structural_weight: 1.0,
            min_crop_side: 16,
            working_size: 64,
            search_size: 96,
            min_logo_scale: 0.25,
            refine_floor: 0.5,
            max_keypoints: 48,
            ratio_test: 0.75,
            max_descriptor_distance: 64,
            expected_match_fraction: 0.5,
            histogram_bins: 8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    pub corner_width_frac: f64,
    pub corner_height_frac: f64,
    /// Text-band search starts at this fraction of the frame height.
    pub band_scan_start: f64,
    pub band_brightness: u8,
    pub band_row_ratio: f64,
    pub min_band_frac: f64,
    pub max_band_frac: f64,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            corner_width_frac: 0.25,
            corner_height_frac: 1.0 / 6.0,
            band_scan_start: 0.6,
            band_brightness: 180,
            band_row_ratio: 0.15,
            min_band_frac: 0.03,
            max_band_frac: 0.15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HolisticConfig {
    pub strong_ai: f64,
    pub strong_real: f64,
    /// Per-axis (strong_ai, strong_real) overrides.
    pub axis_overrides: BTreeMap<Axis, (f64, f64)>,
    pub verified_signal_count: u32,
    pub multi_ai_min: u32,
    pub multi_ai_floor: f64,
    pub verified_support_floor: f64,
    pub real_min: u32,
    pub real_cap: f64,
}

impl Default for HolisticConfig {
    fn default() -> Self {
        Self {
            strong_ai: 0.70,
            strong_real: 0.30,
            axis_overrides: BTreeMap::new(),
            verified_signal_count: 2,
            multi_ai_min: 2,
            multi_ai_floor: 0.70,
            verified_support_floor: 0.65,
            real_min: 3,
            real_cap: 0.35,
        }
    }
}

impl HolisticConfig {
    pub fn thresholds_for(&self, axis: Axis) -> (f64, f64) {
        self.axis_overrides
            .get(&axis)
            .copied()
            .unwrap_or((self.strong_ai, self.strong_real))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightTables {
    pub default: BTreeMap<Axis, f64>,
    pub provenance_dominant: BTreeMap<Axis, f64>,
}

impl Default for WeightTables {
    fn default() -> Self {
        Self {
            default: BTreeMap::from([
                (Axis::Motion, 0.50),
                (Axis::Bio, 0.20),
                (Axis::Scene, 0.15),
                (Axis::Texture, 0.10),
                (Axis::Provenance, 0.05),
            ]),
            provenance_dominant: BTreeMap::from([
                (Axis::Motion, 0.25),
                (Axis::Bio, 0.10),
                (Axis::Scene, 0.10),
                (Axis::Texture, 0.05),
                (Axis::Provenance, 0.50),
            ]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpossibleSubject {
    pub reason: String,
    #[serde(default = "default_subject_boost")]
    pub boost: f64,
}

fn default_subject_boost() -> f64 {
    0.30
}

fn default_impossible_subjects() -> BTreeMap<String, ImpossibleSubject> {
    [
        ("kobe_bryant", "deceased 2020"),
        ("michael_jackson", "deceased 2009"),
        ("princess_diana", "deceased 1997"),
        ("heath_ledger", "deceased 2008"),
    ]
    .into_iter()
    .map(|(name, reason)| {
        (
            name.to_string(),
            ImpossibleSubject {
                reason: reason.to_string(),
                boost: default_subject_boost(),
            },
        )
    })
    .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisLimits {
    /// Wall-clock budget for the frame matching phase.
    pub time_budget_ms: u64,
    pub max_frames: usize,
    /// 0 = one worker per core.
    pub worker_threads: usize,
}

impl Default for AnalysisLimits {
    fn default() -> Self {
        Self {
            time_budget_ms: 30_000,
            max_frames: 100,
            worker_threads: 0,
        }
    }
}

impl DetectorConfig {
    /// 从 JSON5 文件加载并校验
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_json5(&text)?;
        info!("⚙️ Detector config loaded from {}", path.display());
        Ok(config)
    }

    pub fn from_json5(text: &str) -> Result<Self, ConfigError> {
        let config: DetectorConfig =
            json5::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit("ai_threshold", self.ai_threshold)?;
        check_unit("auth_threshold", self.auth_threshold)?;
        if self.auth_threshold >= self.ai_threshold {
            return Err(ConfigError::ThresholdOrder {
                auth: self.auth_threshold,
                ai: self.ai_threshold,
            });
        }
        check_unit("degraded_pull", self.degraded_pull)?;

        let p = &self.provenance;
        check_unit("provenance.verified_threshold", p.verified_threshold)?;
        check_unit("provenance.persistence_min", p.persistence_min)?;
        check_unit("provenance.detection_floor", p.detection_floor)?;
        check_unit("provenance.generic_floor", p.generic_floor)?;
        check_unit("provenance.generic_confidence_cap", p.generic_confidence_cap)?;
        check_unit("provenance.dominant_confidence", p.dominant_confidence)?;
        for (provider, floor) in &p.provider_floors {
            check_unit(&format!("provenance.provider_floors.{provider}"), *floor)?;
        }
        if p.generic_floor >= p.verified_threshold {
            return Err(ConfigError::Invalid(
                "provenance.generic_floor must be below verified_threshold".to_string(),
            ));
        }
        if p.generic_confidence_cap >= p.verified_threshold {
            return Err(ConfigError::Invalid(
                "provenance.generic_confidence_cap must be below verified_threshold".to_string(),
            ));
        }
        check_weight_sum(
            "provenance.confidence",
            &[p.similarity_weight, p.persistence_weight, p.corner_weight],
        )?;

        let m = &self.matcher;
        let method_weights = [
            m.template_weight,
            m.feature_weight,
            m.histogram_weight,
            m.structural_weight,
        ];
        if method_weights.iter().any(|w| *w < 0.0 || !w.is_finite())
            || method_weights.iter().sum::<f64>() <= 0.0
        {
            return Err(ConfigError::Invalid(
                "matcher method weights must be non-negative with a positive sum".to_string(),
            ));
        }
        if m.working_size < 16 || m.histogram_bins == 0 || m.histogram_bins > 64 {
            return Err(ConfigError::Invalid(
                "matcher.working_size must be >= 16 and histogram_bins in 1..=64".to_string(),
            ));
        }
        if m.search_size < 16 || !(m.min_logo_scale > 0.0 && m.min_logo_scale <= 1.0) {
            return Err(ConfigError::Invalid(
                "matcher.search_size must be >= 16 and min_logo_scale in (0, 1]".to_string(),
            ));
        }
        check_unit("matcher.refine_floor", m.refine_floor)?;
        check_unit("matcher.ratio_test", m.ratio_test)?;
        check_unit("matcher.expected_match_fraction", m.expected_match_fraction)?;

        let r = &self.regions;
        check_unit("regions.corner_width_frac", r.corner_width_frac)?;
        check_unit("regions.corner_height_frac", r.corner_height_frac)?;
        check_unit("regions.band_scan_start", r.band_scan_start)?;

        let h = &self.holistic;
        check_unit("holistic.strong_ai", h.strong_ai)?;
        check_unit("holistic.strong_real", h.strong_real)?;
        check_unit("holistic.multi_ai_floor", h.multi_ai_floor)?;
        check_unit("holistic.verified_support_floor", h.verified_support_floor)?;
        check_unit("holistic.real_cap", h.real_cap)?;
        for (axis, (ai, real)) in &h.axis_overrides {
            check_unit(&format!("holistic.axis_overrides.{axis}.strong_ai"), *ai)?;
            check_unit(&format!("holistic.axis_overrides.{axis}.strong_real"), *real)?;
            if real >= ai {
                return Err(ConfigError::Invalid(format!(
                    "holistic.axis_overrides.{axis}: strong_real must be below strong_ai"
                )));
            }
        }

        self.validate_profile("default", &self.weights.default)?;
        self.validate_profile("provenance_dominant", &self.weights.provenance_dominant)?;

        for (axis, table) in &self.axis_rules {
            table
                .validate()
                .map_err(|msg| ConfigError::Invalid(format!("axis_rules.{axis}: {msg}")))?;
        }

        for (subject, entry) in &self.impossible_subjects {
            if !(0.0..=MAX_SEMANTIC_BOOST).contains(&entry.boost) {
                return Err(ConfigError::OutOfRange {
                    field: format!("impossible_subjects.{subject}.boost"),
                    value: entry.boost,
                });
            }
        }

        Ok(())
    }

    fn validate_profile(&self, name: &str, weights: &BTreeMap<Axis, f64>) -> Result<(), ConfigError> {
        if weights.contains_key(&Axis::Audio) {
            return Err(ConfigError::Invalid(format!(
                "weights.{name}: audio carries no fusion weight"
            )));
        }
        let values: Vec<f64> = weights.values().copied().collect();
        check_weight_sum(&format!("weights.{name}"), &values)
    }
}

fn check_unit(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field: field.to_string(),
            value,
        })
    }
}

fn check_weight_sum(profile: &str, weights: &[f64]) -> Result<(), ConfigError> {
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(ConfigError::Invalid(format!(
            "{profile}: weights must be finite and non-negative"
        )));
    }
    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(ConfigError::WeightSum {
            profile: profile.to_string(),
            sum,
        });
    }
    Ok(())
}
