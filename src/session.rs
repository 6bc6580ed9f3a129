//! In-memory planner sessions keyed by a random id
//!
//! Each browser gets its own `PlannerSession`. Nothing is shared between
//! sessions and nothing survives a restart.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::wizard::PlannerSession;

struct Entry {
    session: PlannerSession,
    started_at: DateTime<Utc>,
    last_seen: Instant,
}

impl Entry {
    fn new() -> Self {
        Self {
            session: PlannerSession::new(),
            started_at: Utc::now(),
            last_seen: Instant::now(),
        }
    }
}

/// Copy of a session taken under the lock
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub session: PlannerSession,
}

/// How often idle sessions are swept out
pub const REAP_INTERVAL: Duration = Duration::from_secs(60);

/// All live planner sessions
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Entry>>,
    idle_timeout: Duration,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
            max_sessions: max_sessions.max(1),
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.idle_timeout(), config.max_sessions)
    }

    fn is_idle(&self, entry: &Entry, now: Instant) -> bool {
        now.duration_since(entry.last_seen) > self.idle_timeout
    }

    /// Return the id of a live session, creating a fresh one when `id` is unknown or expired
    pub async fn resolve(&self, id: Option<Uuid>) -> Uuid {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();

        if let Some(id) = id {
            match sessions.get(&id).map(|entry| self.is_idle(entry, now)) {
                Some(false) => {
                    if let Some(entry) = sessions.get_mut(&id) {
                        entry.last_seen = now;
                    }
                    return id;
                }
                Some(true) => {
                    sessions.remove(&id);
                    debug!(%id, "Session expired");
                }
                None => {}
            }
        }

        if sessions.len() >= self.max_sessions {
            self.make_room(&mut sessions, now);
        }

        let id = Uuid::new_v4();
        sessions.insert(id, Entry::new());
        debug!(%id, "Started planner session");
        id
    }

    /// Drop idle sessions, then the least recently used ones, until one more fits
    fn make_room(&self, sessions: &mut HashMap<Uuid, Entry>, now: Instant) {
        sessions.retain(|_, entry| !self.is_idle(entry, now));
        while sessions.len() >= self.max_sessions {
            let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| *id)
            else {
                break;
            };
            sessions.remove(&oldest);
            warn!(id = %oldest, "Session limit reached, evicted least recently used session");
        }
    }

    /// Remove every idle session, returning how many were dropped
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();
        let before = sessions.len();
        sessions.retain(|_, entry| !self.is_idle(entry, now));
        let purged = before - sessions.len();
        if purged > 0 {
            debug!("Purged {} idle session(s)", purged);
        }
        purged
    }

    /// Sweep idle sessions every `every` until the store is dropped
    pub fn spawn_reaper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let store = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(store) = store.upgrade() else {
                    break;
                };
                store.purge_expired().await;
            }
        })
    }

    /// Clone the current state of a session
    pub async fn snapshot(&self, id: Uuid) -> Option<SessionSnapshot> {
        let sessions = self.sessions.read().await;
        sessions.get(&id).map(|entry| SessionSnapshot {
            id,
            started_at: entry.started_at,
            session: entry.session.clone(),
        })
    }

    /// Mutate a session in place; `None` if it does not exist
    pub async fn update<F, T>(&self, id: Uuid, f: F) -> Option<T>
    where
        F: FnOnce(&mut PlannerSession) -> T,
    {
        let mut sessions = self.sessions.write().await;
        sessions.get_mut(&id).map(|entry| {
            entry.last_seen = Instant::now();
            f(&mut entry.session)
        })
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
