pub mod error;
pub mod id;
pub mod session;
pub mod trace;

// Re-export commonly used types
pub use error::{ExecutionError, LoadError, SessionError};
pub use id::SessionId;
pub use session::{Session, Snapshot, StepOutcome};
pub use trace::{State, Trace};
