use crate::core::config::{ImpossibleSubject, MAX_SEMANTIC_BOOST};
use crate::core::provenance::ProvenanceType;
use log::{debug, info};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemanticBoost {
    pub value: f64,
    pub reason: String,
}

impl SemanticBoost {
    pub fn none() -> Self {
        Self {
            value: 0.0,
            reason: String::new(),
        }
    }

    pub fn is_applied(&self) -> bool {
        self.value > 0.0
    }
}

/// 语义不可能性加分：已故名人等不可能出现在真实新视频中的主体
pub struct SemanticBooster<'a> {
    registry: &'a BTreeMap<String, ImpossibleSubject>,
}

impl<'a> SemanticBooster<'a> {
    pub fn new(registry: &'a BTreeMap<String, ImpossibleSubject>) -> Self {
        Self { registry }
    }

    /// Boost only when the subject is registered and provenance carries some
    /// AI-generation signal.
    pub fn evaluate(&self, subject: Option<&str>, provenance: &ProvenanceType) -> SemanticBoost {
        let Some(subject) = subject else {
            return SemanticBoost::none();
        };
        let key = registry_key(subject);
        let Some(entry) = self.registry.get(&key) else {
            return SemanticBoost::none();
        };
        if !provenance.has_signal() {
            debug!("🧩 Subject '{}' is registered but no AI signal is present", subject);
            return SemanticBoost::none();
        }

        let value = entry.boost.clamp(0.0, MAX_SEMANTIC_BOOST);
        info!("🧩 Semantic impossibility: '{}' ({}), boost {:.2}", subject, entry.reason, value);
        SemanticBoost {
            value,
            reason: format!(
                "Subject '{}' cannot appear in authentic new footage ({}) and a {} overlay is present",
                subject.trim(),
                entry.reason,
                provenance.as_str()
            ),
        }
    }
}

fn registry_key(subject: &str) -> String {
    subject
        .trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::DetectorConfig;

    #[test]
    fn test_registry_key_normalisation() {
        assert_eq!(registry_key("  Kobe  Bryant "), "kobe_bryant");
        assert_eq!(registry_key("michael-jackson"), "michael_jackson");
    }

    #[test]
    fn test_boost_requires_signal() {
        let config = DetectorConfig::default();
        let booster = SemanticBooster::new(&config.impossible_subjects);

        let boost = booster.evaluate(Some("Kobe Bryant"), &ProvenanceType::GenericOrUntrusted);
        assert_eq!(boost.value, 0.30);
        assert!(boost.reason.contains("Kobe Bryant"));

        let verified = booster.evaluate(
            Some("kobe_bryant"),
            &ProvenanceType::VerifiedProvider("sora".to_string()),
        );
        assert_eq!(verified.value, 0.30);

        assert_eq!(booster.evaluate(Some("Kobe Bryant"), &ProvenanceType::None), SemanticBoost::none());
    }

    #[test]
    fn test_unknown_or_absent_subject() {
        let config = DetectorConfig::default();
        let booster = SemanticBooster::new(&config.impossible_subjects);
        assert!(!booster
            .evaluate(Some("Jane Doe"), &ProvenanceType::GenericOrUntrusted)
            .is_applied());
        assert!(!booster.evaluate(None, &ProvenanceType::GenericOrUntrusted).is_applied());
    }
}
