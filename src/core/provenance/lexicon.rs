//! Provider keyword lexicon and OCR text matching.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

/// Tokens of overlay text: words, handles, dotted domains and dashed names.
static TOKEN_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"[a-z0-9@][a-z0-9@.\-]*[a-z0-9]|[a-z0-9]").ok());

/// 常见误报词
const BLACKLIST: &[&str] = &[
    "the", "and", "or", "of", "to", "in", "a", "is", "for", "on", "with", "by", "at", "from",
    "image", "imagine", "imaging", "imagenes",
];

const EXACT_CONFIDENCE: f64 = 1.0;
const SUBSTRING_CONFIDENCE: f64 = 0.85;
/// Candidates shorter than this only match exactly.
const MIN_FUZZY_LEN: usize = 4;

pub fn default_lexicon() -> BTreeMap<String, Vec<String>> {
    [
        ("sora", &["sora", "sora ai", "sora.ai", "soraai", "openai", "@openai"][..]),
        ("gemini", &["gemini", "veo", "imagen", "google ai"][..]),
        ("runway", &["runway", "runwayml", "@runwayml", "gen-2", "gen-3"][..]),
        ("pika", &["pika", "pika labs", "pika.art"][..]),
        ("luma", &["luma", "luma ai", "dream machine"][..]),
        ("heygen", &["heygen"][..]),
        ("did", &["d-id"][..]),
    ]
    .into_iter()
    .map(|(provider, aliases)| {
        (
            provider.to_string(),
            aliases.iter().map(|a| a.to_string()).collect(),
        )
    })
    .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeywordHit {
    pub provider: String,
    pub alias: String,
    pub matched_text: String,
    pub confidence: f64,
}

/// 将 OCR 文本与各家的别名做匹配
pub struct LexiconMatcher {
    aliases: Vec<(String, String)>,
}

impl LexiconMatcher {
    pub fn new(lexicon: &BTreeMap<String, Vec<String>>) -> Self {
        let aliases = lexicon
            .iter()
            .flat_map(|(provider, aliases)| {
                std::iter::once(provider.clone())
                    .chain(aliases.iter().cloned())
                    .map(move |alias| (provider.clone(), alias.trim().to_lowercase()))
            })
            .filter(|(_, alias)| !alias.is_empty())
            .collect();
        Self { aliases }
    }

    /// Best hit over the whole text, its tokens and adjacent token pairs.
    pub fn match_text(&self, text: &str) -> Option<KeywordHit> {
        let normalized = text.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }

        let mut best: Option<KeywordHit> = None;
        for candidate in candidates(&normalized) {
            if BLACKLIST.contains(&candidate.as_str()) {
                continue;
            }
            for (provider, alias) in &self.aliases {
                let Some(confidence) = score_alias(&candidate, alias) else {
                    continue;
                };
                if best.as_ref().map_or(true, |b| confidence > b.confidence) {
                    best = Some(KeywordHit {
                        provider: provider.clone(),
                        alias: alias.clone(),
                        matched_text: candidate.clone(),
                        confidence,
                    });
                }
            }
        }

        if let Some(hit) = &best {
            debug!(
                "🔤 Keyword '{}' matched {} via '{}' ({:.2})",
                hit.matched_text, hit.provider, hit.alias, hit.confidence
            );
        }
        best
    }
}

fn candidates(normalized: &str) -> Vec<String> {
    let tokens: Vec<String> = match TOKEN_RE.as_ref() {
        Some(re) => re.find_iter(normalized).map(|m| m.as_str().to_string()).collect(),
        None => normalized.split_whitespace().map(str::to_string).collect(),
    };

    let mut out = vec![normalized.to_string()];
    for pair in tokens.windows(2) {
        out.push(format!("{} {}", pair[0], pair[1]));
    }
    out.extend(tokens);
    out.dedup();
    out
}

fn score_alias(candidate: &str, alias: &str) -> Option<f64> {
    if candidate == alias {
        return Some(EXACT_CONFIDENCE);
    }

    let cand_len = candidate.chars().count();
    let alias_len = alias.chars().count();
    if cand_len < MIN_FUZZY_LEN || alias_len < 3 {
        return None;
    }

    if contains_word(candidate, alias) || contains_word(alias, candidate) {
        return Some(SUBSTRING_CONFIDENCE);
    }

    if alias_len < MIN_FUZZY_LEN {
        return None;
    }
    let max_distance = if alias_len > 6 { 3 } else { 2 };
    let distance = levenshtein(candidate, alias);
    if distance <= max_distance {
        let longest = cand_len.max(alias_len) as f64;
        return Some(1.0 - distance as f64 / longest);
    }
    None
}

/// `needle` inside `haystack` without cutting through an alphanumeric run on either side.
fn contains_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !before.is_some_and(|c| c.is_alphanumeric()) && !after.is_some_and(|c| c.is_alphanumeric())
    })
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> LexiconMatcher {
        LexiconMatcher::new(&default_lexicon())
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("sora", "sora"), 0);
        assert_eq!(levenshtein("sora", "s0ra"), 1);
        assert_eq!(levenshtein("runway", "runwy"), 1);
        assert_eq!(levenshtein("", "abc"), 3);
    }

    #[test]
    fn test_exact_alias() {
        let hit = matcher().match_text("sora.ai").unwrap();
        assert_eq!(hit.provider, "sora");
        assert_eq!(hit.confidence, 1.0);
    }

    #[test]
    fn test_alias_inside_sentence() {
        let hit = matcher().match_text("Made with Runway Gen-3").unwrap();
        assert_eq!(hit.provider, "runway");
        assert_eq!(hit.confidence, 1.0);
    }

    #[test]
    fn test_substring_match() {
        let hit = matcher().match_text("heygen-studio").unwrap();
        assert_eq!(hit.provider, "heygen");
        assert_eq!(hit.confidence, SUBSTRING_CONFIDENCE);
    }

    #[test]
    fn test_ocr_typo_matches_with_reduced_confidence() {
        let hit = matcher().match_text("runwvy").unwrap();
        assert_eq!(hit.provider, "runway");
        assert!((hit.confidence - (1.0 - 1.0 / 6.0)).abs() < 1e-9);
    }

    #[test]
    fn test_blacklist_and_noise_ignored() {
        let m = matcher();
        assert!(m.match_text("the").is_none());
        assert!(m.match_text("imagine").is_none());
        assert!(m.match_text("").is_none());
        assert!(m.match_text("weather forecast tonight").is_none());
    }
}
