//! Cursor state machine over one immutable trace.
//!
//! A [`Session`] binds a [`SessionId`] to a [`Trace`] and a cursor. The cursor
//! always lies in `0..=trace.last_position()`; only [`Session::step`] and
//! [`Session::run_to_end`] move it forward and only [`Session::reset`] moves
//! it back. Reads never move it.
//!
//! `Session` itself is not synchronised. Callers that share one across tasks
//! wrap it in a mutex so every operation sees a whole cursor value.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::id::SessionId;
use crate::trace::{State, Trace};

/// State at a cursor position together with the trace length.
///
/// `state` is `None` only when the trace is empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub state: Option<State>,
    pub position: usize,
    pub total_steps: usize,
}

/// Result of a single forward step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepOutcome {
    pub state: Option<State>,
    pub position: usize,
    /// True when `position` is the last recorded state.
    pub at_end: bool,
}

/// A registered trace plus its cursor.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    trace: Trace,
    cursor: usize,
    created_at: Instant,
    last_active: Instant,
    closed: bool,
}

impl Session {
    /// Creates a session positioned at the first state.
    pub fn new(id: SessionId, trace: Trace) -> Self {
        let now = Instant::now();
        Session {
            id,
            trace,
            cursor: 0,
            created_at: now,
            last_active: now,
            closed: false,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn total_steps(&self) -> usize {
        self.trace.len()
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn last_active(&self) -> Instant {
        self.last_active
    }

    /// How long the session has gone without an operation, as of `now`.
    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_active)
    }

    /// Whether the session has been torn down by a delete or an eviction.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Marks the session as torn down. Operations queued behind the closer
    /// check this flag and report the session as missing.
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Returns the state under the cursor without moving it.
    pub fn current(&mut self) -> Snapshot {
        self.touch();
        self.snapshot()
    }

    /// Advances the cursor by one, or stays put at the last state.
    pub fn step(&mut self) -> StepOutcome {
        self.touch();
        let last = self.trace.last_position();
        if self.cursor < last {
            self.cursor += 1;
        }
        StepOutcome {
            state: self.trace.get(self.cursor).cloned(),
            position: self.cursor,
            at_end: self.cursor == last,
        }
    }

    /// Moves the cursor back to the first state.
    pub fn reset(&mut self) -> Snapshot {
        self.touch();
        self.cursor = 0;
        self.snapshot()
    }

    /// Jumps the cursor to the last recorded state.
    pub fn run_to_end(&mut self) -> Snapshot {
        self.touch();
        self.cursor = self.trace.last_position();
        self.snapshot()
    }

    /// Returns a shared read-only view of the whole trace plus the cursor.
    pub fn history(&mut self) -> (Trace, usize) {
        self.touch();
        (self.trace.clone(), self.cursor)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.trace.get(self.cursor).cloned(),
            position: self.cursor,
            total_steps: self.trace.len(),
        }
    }

    fn touch(&mut self) {
        self.last_active = Instant::now();
    }
}
