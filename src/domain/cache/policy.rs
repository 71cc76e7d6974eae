//! Caching policy derived from the temporal class

use std::time::Duration;

use crate::domain::classifier::TemporalClass;

/// Matching strictness and lifetime for cached answers of one temporal class.
///
/// Policies are static configuration; every temporal class maps to exactly one
/// policy and nothing derives them per request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachePolicy {
    /// Maximum cosine distance for a lookup to count as a hit.
    pub distance_threshold: f32,
    /// How long the external store keeps an entry.
    pub ttl: Duration,
}

impl CachePolicy {
    /// Tight matching, short lifetime: answers go stale quickly.
    pub const TIME_SENSITIVE: CachePolicy = CachePolicy {
        distance_threshold: 0.15,
        ttl: Duration::from_secs(300),
    };

    /// Loose matching, week-long lifetime.
    pub const EVERGREEN: CachePolicy = CachePolicy {
        distance_threshold: 0.30,
        ttl: Duration::from_secs(604_800),
    };

    pub fn for_class(class: TemporalClass) -> CachePolicy {
        match class {
            TemporalClass::TimeSensitive => Self::TIME_SENSITIVE,
            TemporalClass::Evergreen => Self::EVERGREEN,
        }
    }
}
