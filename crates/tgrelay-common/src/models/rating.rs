//! Access-log and rating records.

use serde::{Deserialize, Serialize};

/// Safety score cached per retrieval path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rating(pub i64);

impl Rating {
    /// The moderation lookup failed.
    pub const LOOKUP_FAILED: Self = Self(-1);
    /// No moderation service is configured.
    pub const UNRATED: Self = Self(0);
    /// Files at this level are never served to untrusted referers.
    pub const BLOCKED: Self = Self(3);

    pub fn is_blocked(self) -> bool {
        self == Self::BLOCKED
    }
}

/// One row of `tgimglog`; written for every untrusted retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessLogEntry {
    pub url: String,
    pub referer: String,
    pub ip: String,
    pub time: String,
}

/// One row of `imginfo`, keyed by retrieval path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RatingRecord {
    pub url: String,
    pub referer: String,
    pub ip: String,
    pub rating: i64,
    pub total: i64,
    pub time: String,
}

impl RatingRecord {
    pub fn rating(&self) -> Rating {
        Rating(self.rating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_sentinel_blocks() {
        assert!(Rating(3).is_blocked());
        for value in [-1, 0, 1, 2, 4] {
            assert!(!Rating(value).is_blocked(), "{value}");
        }
    }
}
