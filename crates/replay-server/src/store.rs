//! Concurrent registry of trace sessions.
//!
//! [`SessionStore`] maps [`SessionId`]s to sessions and implements the replay
//! protocol on top of them. The map is a `DashMap`, so loads, lookups, and
//! deletes on different sessions never contend beyond a shard. Each session
//! sits behind its own `tokio::sync::Mutex`; every operation on one session,
//! including its deletion, is serialised on that lock.
//!
//! Shard guards are never held across an `.await`: operations clone the
//! session handle out of the map first and then lock it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::Mutex;

use replay_core::{
    LoadError, Session, SessionError, SessionId, Snapshot, State, StepOutcome, Trace,
};

use crate::executor::Executor;

type SessionHandle = Arc<Mutex<Session>>;

/// Result of a successful load.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub id: SessionId,
    /// First state, or `None` for an empty trace.
    pub initial_state: Option<State>,
    pub total_steps: usize,
}

/// Full trace plus the cursor at the time of the read.
#[derive(Debug, Clone)]
pub struct History {
    pub states: Trace,
    pub position: usize,
    pub total_steps: usize,
}

/// Process-wide session registry.
pub struct SessionStore {
    sessions: DashMap<SessionId, SessionHandle>,
    executor: Arc<dyn Executor>,
}

impl SessionStore {
    /// Creates an empty store that obtains traces from `executor`.
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        SessionStore {
            sessions: DashMap::new(),
            executor,
        }
    }

    /// Runs the program once and registers a session at position 0.
    ///
    /// No map lock is held while the executor runs. On failure nothing is
    /// registered.
    pub async fn load(&self, payload: &str) -> Result<Loaded, LoadError> {
        let trace = match self.executor.execute(payload).await {
            Ok(trace) => trace,
            Err(err) => {
                tracing::warn!("load failed: {}", err);
                return Err(err);
            }
        };

        let total_steps = trace.len();
        let initial_state = trace.get(0).cloned();

        let id = loop {
            let candidate = SessionId::generate();
            if !self.sessions.contains_key(&candidate) {
                break candidate;
            }
        };
        let session = Session::new(id, trace);
        self.sessions.insert(id, Arc::new(Mutex::new(session)));

        tracing::info!("loaded session {} with {} state(s)", id, total_steps);
        Ok(Loaded {
            id,
            initial_state,
            total_steps,
        })
    }

    /// Advances the cursor of `id` by one state.
    pub async fn step(&self, id: &SessionId) -> Result<StepOutcome, SessionError> {
        let handle = self.handle(id)?;
        let mut session = handle.lock().await;
        ensure_open(&session)?;
        let out = session.step();
        tracing::debug!("session {} step -> {} (at_end={})", id, out.position, out.at_end);
        Ok(out)
    }

    /// Moves the cursor of `id` back to position 0.
    pub async fn reset(&self, id: &SessionId) -> Result<Snapshot, SessionError> {
        let handle = self.handle(id)?;
        let mut session = handle.lock().await;
        ensure_open(&session)?;
        tracing::debug!("session {} reset", id);
        Ok(session.reset())
    }

    /// Jumps the cursor of `id` to the final recorded state.
    pub async fn run_to_end(&self, id: &SessionId) -> Result<Snapshot, SessionError> {
        let handle = self.handle(id)?;
        let mut session = handle.lock().await;
        ensure_open(&session)?;
        let snap = session.run_to_end();
        tracing::debug!("session {} continue -> {}", id, snap.position);
        Ok(snap)
    }

    /// Reads the state under the cursor of `id`.
    pub async fn current(&self, id: &SessionId) -> Result<Snapshot, SessionError> {
        let handle = self.handle(id)?;
        let mut session = handle.lock().await;
        ensure_open(&session)?;
        Ok(session.current())
    }

    /// Reads the whole trace of `id` along with its cursor.
    pub async fn history(&self, id: &SessionId) -> Result<History, SessionError> {
        let handle = self.handle(id)?;
        let mut session = handle.lock().await;
        ensure_open(&session)?;
        let (states, position) = session.history();
        let total_steps = states.len();
        Ok(History {
            states,
            position,
            total_steps,
        })
    }

    /// Removes `id` once in-flight operations on it have finished.
    ///
    /// Operations that were already waiting on the session when the delete
    /// took its lock fail with `NotFound`.
    pub async fn delete(&self, id: &SessionId) -> Result<(), SessionError> {
        let handle = self.handle(id)?;
        let mut session = handle.lock().await;
        ensure_open(&session)?;
        session.close();
        self.sessions.remove(id);
        drop(session);

        tracing::info!("deleted session {}", id);
        Ok(())
    }

    /// Number of registered sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Removes sessions that have been idle for at least `timeout`.
    ///
    /// Sessions whose lock is currently held are in use and are skipped.
    /// Returns the IDs that were evicted.
    pub fn sweep_idle(&self, timeout: Duration) -> Vec<SessionId> {
        let now = Instant::now();
        let mut evicted = Vec::new();
        self.sessions.retain(|id, handle| match handle.try_lock() {
            Ok(mut session) => {
                let idle = session.idle_for(now);
                if idle >= timeout {
                    tracing::debug!(
                        "evicting session {} (age {:?}, idle {:?})",
                        id,
                        now.saturating_duration_since(session.created_at()),
                        idle
                    );
                    session.close();
                    evicted.push(*id);
                    false
                } else {
                    true
                }
            }
            Err(_) => true,
        });
        evicted
    }

    /// Spawns a background tokio task that periodically evicts idle sessions.
    pub fn start_idle_sweep(self: &Arc<Self>, interval: Duration, idle_timeout: Duration) {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(interval);
            loop {
                tick.tick().await;
                let evicted = store.sweep_idle(idle_timeout);
                if !evicted.is_empty() {
                    tracing::info!("Evicted {} idle session(s): {:?}", evicted.len(), evicted);
                }
            }
        });
    }

    fn handle(&self, id: &SessionId) -> Result<SessionHandle, SessionError> {
        self.sessions
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(SessionError::NotFound(*id))
    }
}

fn ensure_open(session: &Session) -> Result<(), SessionError> {
    if session.is_closed() {
        Err(SessionError::NotFound(session.id()))
    } else {
        Ok(())
    }
}
