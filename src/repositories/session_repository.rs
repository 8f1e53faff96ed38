use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, instrument, warn};

use crate::models::{RepositoryError, RepositoryResult, StorefrontSession};

/// Trait defining the interface for visitor session storage
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Find a session by ID
    async fn find_session(&self, session_id: &str) -> RepositoryResult<Option<StorefrontSession>>;

    /// Save a session (create or replace)
    async fn save_session(&self, session: StorefrontSession) -> RepositoryResult<StorefrontSession>;

    /// Delete a session. Returns whether it existed.
    async fn delete_session(&self, session_id: &str) -> RepositoryResult<bool>;

    /// Count live sessions
    async fn count_sessions(&self) -> RepositoryResult<usize>;

    /// Take the write lock of one session, or `None` if it does not exist.
    ///
    /// Callers hold the guard across a find, change and save so that
    /// concurrent transitions on the same session apply one after another.
    async fn lock_session(&self, session_id: &str) -> RepositoryResult<Option<OwnedMutexGuard<()>>>;

    /// Drop sessions last updated before `cutoff`. Returns how many went.
    async fn purge_idle(&self, cutoff: DateTime<Utc>) -> RepositoryResult<usize>;
}

struct SessionSlot {
    session: StorefrontSession,
    lock: Arc<Mutex<()>>,
}

/// Sessions held in process memory; they do not survive a restart
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<String, SessionSlot>>,
    max_sessions: usize,
}

impl InMemorySessionRepository {
    pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_MAX_SESSIONS)
    }

    /// A repository that refuses new sessions once `max_sessions` are live
    pub fn with_capacity(max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions,
        }
    }
}

impl Default for InMemorySessionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn find_session(&self, session_id: &str) -> RepositoryResult<Option<StorefrontSession>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).map(|slot| slot.session.clone()))
    }

    #[instrument(skip(self, session), fields(session_id = %session.id))]
    async fn save_session(&self, session: StorefrontSession) -> RepositoryResult<StorefrontSession> {
        let mut sessions = self.sessions.write().await;

        match sessions.get_mut(&session.id) {
            Some(slot) => slot.session = session.clone(),
            None => {
                if sessions.len() >= self.max_sessions {
                    warn!(limit = self.max_sessions, "Session table is full");
                    return Err(RepositoryError::StorageUnavailable {
                        message: format!("session limit of {} reached", self.max_sessions),
                    });
                }
                sessions.insert(
                    session.id.clone(),
                    SessionSlot {
                        session: session.clone(),
                        lock: Arc::new(Mutex::new(())),
                    },
                );
            }
        }

        debug!("Session saved");
        Ok(session)
    }

    #[instrument(skip(self))]
    async fn delete_session(&self, session_id: &str) -> RepositoryResult<bool> {
        let mut sessions = self.sessions.write().await;
        Ok(sessions.remove(session_id).is_some())
    }

    async fn count_sessions(&self) -> RepositoryResult<usize> {
        Ok(self.sessions.read().await.len())
    }

    async fn lock_session(&self, session_id: &str) -> RepositoryResult<Option<OwnedMutexGuard<()>>> {
        // Clone the handle out so the table lock is released before waiting
        let lock = {
            let sessions = self.sessions.read().await;
            match sessions.get(session_id) {
                Some(slot) => slot.lock.clone(),
                None => return Ok(None),
            }
        };
        Ok(Some(lock.lock_owned().await))
    }

    #[instrument(skip(self))]
    async fn purge_idle(&self, cutoff: DateTime<Utc>) -> RepositoryResult<usize> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, slot| slot.session.updated_at >= cutoff);
        Ok(before - sessions.len())
    }
}
