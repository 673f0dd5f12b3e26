//! 水印来源分类：verified / generic / none

use crate::core::config::ProvenanceConfig;
use crate::core::provenance::lexicon::{KeywordHit, LexiconMatcher};
use crate::core::provenance::persistence::PersistenceSummary;
use log::{debug, info, warn};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

const WEIGHT_VERIFIED: f64 = 0.50;
const WEIGHT_VERIFIED_LOW_CONFIDENCE: f64 = 0.25;
const WEIGHT_REINFORCED: f64 = 0.25;
const WEIGHT_KEYWORD_ONLY: f64 = 0.15;
const WEIGHT_LOGO_ONLY: f64 = 0.10;
const WEIGHT_BASELINE: f64 = 0.05;

/// OCR 阶段的输出
#[derive(Debug, Clone, PartialEq)]
pub enum TextHint {
    Absent,
    Text(String),
    /// The OCR stage ran and failed; treated exactly like `Absent`.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvenanceType {
    None,
    GenericOrUntrusted,
    VerifiedProvider(String),
}

impl ProvenanceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProvenanceType::None => "none",
            ProvenanceType::GenericOrUntrusted => "generic_or_untrusted",
            ProvenanceType::VerifiedProvider(_) => "verified_provider",
        }
    }

    pub fn provider(&self) -> Option<&str> {
        match self {
            ProvenanceType::VerifiedProvider(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, ProvenanceType::VerifiedProvider(_))
    }

    /// Any AI-generation signal at all.
    pub fn has_signal(&self) -> bool {
        !matches!(self, ProvenanceType::None)
    }
}

impl Serialize for ProvenanceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvenanceResult {
    #[serde(rename = "type")]
    pub kind: ProvenanceType,
    pub provider: Option<String>,
    pub confidence: f64,
    pub persistence_fraction: f64,
    pub corner_bonus: f64,
    pub max_similarity: f64,
    pub generator_hint: Option<String>,
    pub weight_recommendation: f64,
    pub details: Vec<String>,
}

impl ProvenanceResult {
    pub fn none(details: Vec<String>) -> Self {
        Self {
            kind: ProvenanceType::None,
            provider: None,
            confidence: 0.0,
            persistence_fraction: 0.0,
            corner_bonus: 0.0,
            max_similarity: 0.0,
            generator_hint: None,
            weight_recommendation: WEIGHT_BASELINE,
            details,
        }
    }
}

pub struct ProvenanceClassifier<'a> {
    config: &'a ProvenanceConfig,
    lexicon: LexiconMatcher,
}

impl<'a> ProvenanceClassifier<'a> {
    pub fn new(config: &'a ProvenanceConfig, lexicon: &BTreeMap<String, Vec<String>>) -> Self {
        Self {
            config,
            lexicon: LexiconMatcher::new(lexicon),
        }
    }

    /// Rules in order, first match wins: verified logo, then any keyword or
    /// weaker logo evidence, then none.
    pub fn classify(
        &self,
        summaries: &BTreeMap<String, PersistenceSummary>,
        hint: &TextHint,
        missing_logos: &[String],
    ) -> ProvenanceResult {
        let mut details = Vec::new();
        if !missing_logos.is_empty() {
            details.push(format!("No reference logo for: {}", missing_logos.join(", ")));
        }

        let keyword = match hint {
            TextHint::Absent => None,
            TextHint::Text(text) => self.lexicon.match_text(text),
            TextHint::Failed(reason) => {
                warn!("⚠️ OCR failed ({}), provenance uses logo evidence only", reason);
                details.push(format!("Text recognition failed ({reason}); using logo evidence only"));
                None
            }
        };

        if let Some(result) = self.verified(summaries, &mut details) {
            return result;
        }

        let best_logo = summaries
            .values()
            .fold(None::<&PersistenceSummary>, |best, s| match best {
                Some(b) if b.max_similarity >= s.max_similarity => Some(b),
                _ => Some(s),
            });
        let logo_signal = best_logo.filter(|s| s.max_similarity >= self.config.generic_floor);

        if keyword.is_some() || logo_signal.is_some() {
            return self.generic(keyword, logo_signal, details);
        }

        debug!("🔍 No provenance evidence");
        ProvenanceResult {
            max_similarity: best_logo.map_or(0.0, |s| s.max_similarity),
            ..ProvenanceResult::none(details)
        }
    }

    fn verified(
        &self,
        summaries: &BTreeMap<String, PersistenceSummary>,
        details: &mut Vec<String>,
    ) -> Option<ProvenanceResult> {
        let c = self.config;
        let mut best: Option<(f64, &PersistenceSummary)> = None;
        for summary in summaries.values() {
            if summary.max_similarity < c.verified_threshold || summary.persistence_fraction < c.persistence_min {
                continue;
            }
            let confidence = (c.similarity_weight * summary.max_similarity
                + c.persistence_weight * summary.persistence_fraction
                + c.corner_weight * summary.corner_fraction)
                .clamp(0.0, 1.0);
            if best.map_or(true, |(b, _)| confidence > b) {
                best = Some((confidence, summary));
            }
        }

        let (confidence, summary) = best?;
        let weight_recommendation = if confidence >= c.dominant_confidence {
            WEIGHT_VERIFIED
        } else {
            WEIGHT_VERIFIED_LOW_CONFIDENCE
        };

        info!(
            "✅ Verified {} watermark: similarity {:.2}, persistence {:.2}, confidence {:.2}",
            summary.provider, summary.max_similarity, summary.persistence_fraction, confidence
        );
        details.push(format!(
            "{} logo matched in {}/{} frames (max similarity {:.2}, corner share {:.2}, stability {:.2})",
            summary.provider,
            summary.frames_detected,
            summary.frames_sampled,
            summary.max_similarity,
            summary.corner_fraction,
            summary.region_stability
        ));

        Some(ProvenanceResult {
            kind: ProvenanceType::VerifiedProvider(summary.provider.clone()),
            provider: Some(summary.provider.clone()),
            confidence,
            persistence_fraction: summary.persistence_fraction,
            corner_bonus: summary.corner_fraction,
            max_similarity: summary.max_similarity,
            generator_hint: Some(summary.provider.clone()),
            weight_recommendation,
            details: std::mem::take(details),
        })
    }

    fn generic(
        &self,
        keyword: Option<KeywordHit>,
        logo: Option<&PersistenceSummary>,
        mut details: Vec<String>,
    ) -> ProvenanceResult {
        let logo_similarity = logo.map_or(0.0, |s| s.max_similarity);
        let keyword_confidence = keyword.as_ref().map_or(0.0, |k| k.confidence);
        let confidence = logo_similarity
            .max(keyword_confidence)
            .min(self.config.generic_confidence_cap);

        let weight_recommendation = match (&keyword, logo) {
            (Some(_), Some(_)) => WEIGHT_REINFORCED,
            (Some(_), None) => WEIGHT_KEYWORD_ONLY,
            (None, Some(_)) => WEIGHT_LOGO_ONLY,
            (None, None) => WEIGHT_BASELINE,
        };

        if let Some(hit) = &keyword {
            details.push(format!(
                "Overlay text '{}' names {} (match confidence {:.2})",
                hit.matched_text, hit.provider, hit.confidence
            ));
        }
        if let Some(summary) = logo {
            details.push(format!(
                "Partial {} logo match (max similarity {:.2}, persistence {:.2}) below verification",
                summary.provider, summary.max_similarity, summary.persistence_fraction
            ));
        }

        let generator_hint = keyword
            .as_ref()
            .map(|k| k.provider.clone())
            .or_else(|| logo.map(|s| s.provider.clone()));

        debug!(
            "🔍 Generic/untrusted overlay: confidence {:.2}, weight {:.2}, hint {:?}",
            confidence, weight_recommendation, generator_hint
        );

        ProvenanceResult {
            kind: ProvenanceType::GenericOrUntrusted,
            provider: None,
            confidence,
            persistence_fraction: logo.map_or(0.0, |s| s.persistence_fraction),
            corner_bonus: logo.map_or(0.0, |s| s.corner_fraction),
            max_similarity: logo_similarity,
            generator_hint,
            weight_recommendation,
            details,
        }
    }
}
