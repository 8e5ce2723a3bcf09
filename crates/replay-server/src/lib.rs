//! HTTP/JSON replay server for simulator execution traces.
//!
//! A program is executed once by an external simulator; the resulting state
//! trace is cached in a session that clients step through, rewind, and
//! fast-forward. This crate holds the executor boundary, the concurrent
//! session store, and the axum API over it.

pub mod config;
pub mod error;
pub mod executor;
pub mod handlers;
pub mod router;
pub mod schema;
pub mod state;
pub mod store;
