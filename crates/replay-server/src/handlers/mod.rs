//! HTTP handler modules for the replay API.
//!
//! Handlers are thin: they parse the request, delegate to the
//! [`SessionStore`](crate::store::SessionStore), and shape the JSON response.
//! No business logic lives here.

pub mod health;
pub mod sessions;
