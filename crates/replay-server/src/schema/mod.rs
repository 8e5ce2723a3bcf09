//! API schema types for request/response definitions.
//!
//! Field names follow the wire format the visualizer frontend already speaks
//! (`session_id`, `current_step`, `total_steps`, `done`, ...).

pub mod health;
pub mod sessions;
