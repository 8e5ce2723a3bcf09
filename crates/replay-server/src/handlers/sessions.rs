//! Trace session handlers (load, step, reset, continue, state, history, delete).

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;

use replay_core::SessionId;

use crate::error::ApiError;
use crate::schema::sessions::{
    ContinueResponse, DeleteResponse, HistoryResponse, LoadRequest, LoadResponse, ResetResponse,
    StateResponse, StepResponse,
};
use crate::state::AppState;

/// Executes a program and opens a session over its trace.
///
/// `POST /api/load`
pub async fn load(
    State(state): State<AppState>,
    req: Result<Json<LoadRequest>, JsonRejection>,
) -> Result<Json<LoadResponse>, ApiError> {
    let Json(req) = req?;
    let loaded = state.store.load(&req.program).await?;
    Ok(Json(LoadResponse {
        session_id: loaded.id,
        initial_state: loaded.initial_state,
        total_steps: loaded.total_steps,
    }))
}

/// `POST /api/step/{id}`
pub async fn step(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StepResponse>, ApiError> {
    let id = parse_session_id(&id)?;
    let out = state.store.step(&id).await?;
    Ok(Json(StepResponse {
        state: out.state,
        current_step: out.position,
        done: out.at_end,
    }))
}

/// `POST /api/reset/{id}`
pub async fn reset(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ResetResponse>, ApiError> {
    let id = parse_session_id(&id)?;
    let snap = state.store.reset(&id).await?;
    Ok(Json(ResetResponse {
        state: snap.state,
        current_step: snap.position,
    }))
}

/// `POST /api/continue/{id}`
pub async fn continue_execution(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ContinueResponse>, ApiError> {
    let id = parse_session_id(&id)?;
    let snap = state.store.run_to_end(&id).await?;
    Ok(Json(ContinueResponse {
        final_state: snap.state,
        current_step: snap.position,
        total_steps: snap.total_steps,
    }))
}

/// `GET /api/state/{id}`
pub async fn current_state(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StateResponse>, ApiError> {
    let id = parse_session_id(&id)?;
    let snap = state.store.current(&id).await?;
    Ok(Json(StateResponse {
        state: snap.state,
        current_step: snap.position,
        total_steps: snap.total_steps,
    }))
}

/// `GET /api/history/{id}`
pub async fn history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let id = parse_session_id(&id)?;
    let history = state.store.history(&id).await?;
    Ok(Json(HistoryResponse {
        states: history.states,
        current_step: history.position,
        total_steps: history.total_steps,
    }))
}

/// `DELETE /api/session/{id}`
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let id = parse_session_id(&id)?;
    state.store.delete(&id).await?;
    Ok(Json(DeleteResponse {
        success: true,
        message: "Session deleted".to_string(),
    }))
}

/// Text that is not a UUID can never have been issued, so it is reported the
/// same way as an unknown session.
fn parse_session_id(raw: &str) -> Result<SessionId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::NotFound(format!("session not found: {}", raw)))
}
