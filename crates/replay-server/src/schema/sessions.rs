//! Request/response types for trace session navigation.
//!
//! States are passed through untouched; an empty trace yields `null` wherever
//! a state is expected.

use serde::{Deserialize, Serialize};

use replay_core::{SessionId, State, Trace};

/// Request to execute a program and open a session over its trace.
#[derive(Debug, Clone, Deserialize)]
pub struct LoadRequest {
    /// Program text handed to the simulator on stdin (e.g. `.yo` object code).
    pub program: String,
}

/// Response after a successful load.
#[derive(Debug, Clone, Serialize)]
pub struct LoadResponse {
    pub session_id: SessionId,
    pub initial_state: Option<State>,
    pub total_steps: usize,
}

/// Response from a single step.
#[derive(Debug, Clone, Serialize)]
pub struct StepResponse {
    pub state: Option<State>,
    pub current_step: usize,
    /// True once the cursor sits on the last recorded state.
    pub done: bool,
}

/// Response from a reset to the first state.
#[derive(Debug, Clone, Serialize)]
pub struct ResetResponse {
    pub state: Option<State>,
    pub current_step: usize,
}

/// Response from a jump to the final state.
#[derive(Debug, Clone, Serialize)]
pub struct ContinueResponse {
    pub final_state: Option<State>,
    pub current_step: usize,
    pub total_steps: usize,
}

/// Response for a read of the current state.
#[derive(Debug, Clone, Serialize)]
pub struct StateResponse {
    pub state: Option<State>,
    pub current_step: usize,
    pub total_steps: usize,
}

/// Full execution history of a session.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub states: Trace,
    pub current_step: usize,
    pub total_steps: usize,
}

/// Acknowledgement of a session deletion.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}
