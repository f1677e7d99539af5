use std::{collections::HashMap, sync::Arc};

use chrono::{Duration, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{models::session::Session, services::store::TripStore};

/// Keeps one [`TripStore`] per browser session for as long as the session
/// stays active.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<Uuid, Session>>>,
    idle_timeout: Duration,
}

impl SessionRegistry {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            idle_timeout,
        }
    }

    /// Marks `id` as seen, or opens a new session when it is unknown or
    /// expired. Returns the id to use and whether it is new.
    pub async fn resume_or_start(&self, id: Option<Uuid>) -> (Uuid, bool) {
        let now = Utc::now();
        let mut sessions = self.sessions.lock().await;
        let evicted = self.evict_idle(&mut sessions);
        if evicted > 0 {
            info!(evicted, "idle sessions evicted");
        }

        if let Some(id) = id {
            if let Some(session) = sessions.get_mut(&id) {
                session.touch(now);
                return (id, false);
            }
        }

        let id = Uuid::new_v4();
        sessions.insert(id, Session::new(id));
        info!(session = %id, "session started");
        (id, true)
    }

    /// Runs `f` against the session's store while holding the registry lock.
    pub async fn with_store<R>(&self, id: Uuid, f: impl FnOnce(&mut TripStore) -> R) -> R {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.entry(id).or_insert_with(|| Session::new(id));
        f(&mut session.store)
    }

    pub async fn end(&self, id: Uuid) -> bool {
        self.sessions.lock().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    fn evict_idle(&self, sessions: &mut HashMap<Uuid, Session>) -> usize {
        let now = Utc::now();
        let before = sessions.len();
        sessions.retain(|_, session| {
            if !session.is_idle(now, self.idle_timeout) {
                return true;
            }
            debug!(
                session = %session.id,
                age_minutes = (now - session.created_at).num_minutes(),
                trips = session.store.len(),
                "idle session dropped"
            );
            false
        });
        before - sessions.len()
    }
}
