use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::services::store::TripStore;

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
    pub store: TripStore,
}

impl Session {
    pub fn new(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            created_at: now,
            last_seen_at: now,
            store: TripStore::default(),
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_seen_at = now;
    }

    pub fn is_idle(&self, now: DateTime<Utc>, idle_timeout: Duration) -> bool {
        now - self.last_seen_at > idle_timeout
    }
}
