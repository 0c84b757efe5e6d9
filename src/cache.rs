use crate::models::ApartmentRecord;
use chrono::{DateTime, Duration, Utc};

/// One run's dataset with its fetch timestamp. The staleness window is the
/// caller's policy: the cache only answers `is_fresh`, it never refreshes
/// itself. Each run fully replaces the previous entry; there is no cross-run
/// merge.
pub struct DatasetCache {
    records: Vec<ApartmentRecord>,
    fetched_at: DateTime<Utc>,
}

impl DatasetCache {
    pub fn new(records: Vec<ApartmentRecord>) -> Self {
        Self {
            records,
            fetched_at: Utc::now(),
        }
    }

    pub fn records(&self) -> &[ApartmentRecord] {
        &self.records
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn age(&self) -> Duration {
        Utc::now().signed_duration_since(self.fetched_at)
    }

    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.age() < ttl
    }
}
