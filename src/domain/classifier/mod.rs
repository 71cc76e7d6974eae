//! Query classification
//!
//! Maps raw query text to a (temporal class, topic, confidence) triple. Pure
//! and deterministic; no I/O and no failure mode beyond the low-confidence
//! evergreen fallback.

mod patterns;

use serde::{Deserialize, Serialize};

use patterns::{DOMAIN_KEYWORDS, EVERGREEN_TEMPLATES, TEMPORAL_KEYWORDS, TOPIC_RULES};

/// Topic assigned when no topic rule matches.
pub const GENERAL_TOPIC: &str = "general";

const TEMPLATE_CONFIDENCE: f32 = 0.9;
const STRONG_TEMPORAL_CONFIDENCE: f32 = 0.95;
const WEAK_TEMPORAL_CONFIDENCE: f32 = 0.7;
const FALLBACK_CONFIDENCE: f32 = 0.6;

/// Governs matching strictness and TTL for a cached answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalClass {
    TimeSensitive,
    Evergreen,
}

impl TemporalClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TimeSensitive => "time_sensitive",
            Self::Evergreen => "evergreen",
        }
    }
}

/// Classification result for a single query. Produced per request, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub temporal_class: TemporalClass,
    pub topic: String,
    pub confidence: f32,
}

/// Classify a query into temporal class, topic and confidence.
///
/// Evergreen phrasal templates are checked before temporal keyword counting
/// and short-circuit when they match. A query containing both a template and
/// temporal keywords ("what is the current definition of inflation") is
/// therefore evergreen; this precedence is intentional and must not be
/// reordered.
pub fn classify(text: &str) -> Classification {
    let normalized = text.to_lowercase();

    let (temporal_class, confidence) = classify_temporal(&normalized);
    let topic = classify_topic(&normalized);

    Classification {
        temporal_class,
        topic,
        confidence,
    }
}

fn classify_temporal(normalized: &str) -> (TemporalClass, f32) {
    if EVERGREEN_TEMPLATES.iter().any(|p| p.is_match(normalized)) {
        return (TemporalClass::Evergreen, TEMPLATE_CONFIDENCE);
    }

    // Distinct keywords matched, not total occurrences.
    let matches = TEMPORAL_KEYWORDS
        .iter()
        .chain(DOMAIN_KEYWORDS.iter())
        .filter(|p| p.is_match(normalized))
        .count();

    match matches {
        0 => (TemporalClass::Evergreen, FALLBACK_CONFIDENCE),
        1 => (TemporalClass::TimeSensitive, WEAK_TEMPORAL_CONFIDENCE),
        _ => (TemporalClass::TimeSensitive, STRONG_TEMPORAL_CONFIDENCE),
    }
}

fn classify_topic(normalized: &str) -> String {
    TOPIC_RULES
        .iter()
        .find(|(_, rules)| rules.iter().any(|p| p.is_match(normalized)))
        .map(|(name, _)| (*name).to_string())
        .unwrap_or_else(|| GENERAL_TOPIC.to_string())
}
