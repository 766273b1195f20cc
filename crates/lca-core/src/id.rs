//! Project identifiers
//!
//! Ids have the form `proj_<millisecond-timestamp>`. A single [`IdGenerator`]
//! never hands out the same id twice: two requests inside the same
//! millisecond yield consecutive timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

const PREFIX: &str = "proj_";

/// Identifier of a stored result
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    /// Id for a millisecond timestamp
    #[inline]
    #[must_use]
    pub fn from_millis(millis: i64) -> Self {
        Self(format!("{PREFIX}{millis}"))
    }

    /// Wrap an arbitrary key, e.g. one taken from a URL path
    #[inline]
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Timestamp component, when the id is well formed
    #[must_use]
    pub fn millis(&self) -> Option<i64> {
        self.0.strip_prefix(PREFIX)?.parse().ok()
    }

    /// Raw string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProjectId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl std::str::FromStr for ProjectId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

/// Issues strictly increasing [`ProjectId`]s
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    /// Create a generator
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator that never issues ids at or below `floor`
    ///
    /// Used after reloading persisted results so fresh ids stay unique.
    #[must_use]
    pub fn starting_after(floor: i64) -> Self {
        Self {
            last: AtomicI64::new(floor),
        }
    }

    /// Id for the current instant
    pub fn next_id(&self) -> ProjectId {
        self.next_at(Utc::now())
    }

    /// Id for `now`, bumped past the last issued id when necessary
    pub fn next_at(&self, now: DateTime<Utc>) -> ProjectId {
        let wanted = now.timestamp_millis();
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = wanted.max(last + 1);
            match self
                .last
                .compare_exchange_weak(last, candidate, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return ProjectId::from_millis(candidate),
                Err(current) => last = current,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn id_format() {
        let id = ProjectId::from_millis(1_700_000_000_123);
        assert_eq!(id.as_str(), "proj_1700000000123");
        assert_eq!(id.millis(), Some(1_700_000_000_123));
    }

    #[test]
    fn malformed_id_has_no_millis() {
        assert_eq!(ProjectId::new("other").millis(), None);
        assert_eq!(ProjectId::new("proj_abc").millis(), None);
    }

    #[test]
    fn same_millisecond_yields_distinct_ids() {
        let generator = IdGenerator::new();
        let now = Utc.timestamp_millis_opt(1_000).unwrap();
        let a = generator.next_at(now);
        let b = generator.next_at(now);
        let c = generator.next_at(now);
        assert_eq!(a.millis(), Some(1_000));
        assert_eq!(b.millis(), Some(1_001));
        assert_eq!(c.millis(), Some(1_002));
    }

    #[test]
    fn starting_after_floor() {
        let generator = IdGenerator::starting_after(5_000);
        let id = generator.next_at(Utc.timestamp_millis_opt(10).unwrap());
        assert_eq!(id.millis(), Some(5_001));
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = ProjectId::from_millis(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"proj_42\"");
    }
}
