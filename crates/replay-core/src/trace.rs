//! Opaque machine states and the immutable trace that orders them.
//!
//! A [`State`] is whatever record the simulator emitted for one step; nothing
//! in this crate looks inside it. A [`Trace`] is produced atomically from one
//! simulator run and shared by reference afterwards, so handing out the full
//! history never copies the states.

use std::sync::Arc;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::ExecutionError;

/// Maximum number of output characters echoed back in a decode error.
const OUTPUT_EXCERPT_CHARS: usize = 200;

/// One opaque machine state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(serde_json::Value);

impl State {
    pub fn new(value: serde_json::Value) -> Self {
        State(value)
    }

    /// Borrows the underlying record.
    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }
}

impl From<serde_json::Value> for State {
    fn from(value: serde_json::Value) -> Self {
        State(value)
    }
}

/// Ordered, fixed-length sequence of states from a single simulator run.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    states: Arc<[State]>,
}

impl Trace {
    pub fn new(states: Vec<State>) -> Self {
        Trace {
            states: states.into(),
        }
    }

    /// Decodes raw simulator output into a trace.
    ///
    /// The output must be a single JSON array; every element becomes one
    /// state. Anything else is rejected whole, so a garbled tail or bytes
    /// that are not valid UTF-8 can never turn into a valid trace.
    pub fn decode(output: &[u8]) -> Result<Self, ExecutionError> {
        if output.iter().all(u8::is_ascii_whitespace) {
            return Err(ExecutionError::MalformedOutput(
                "simulator produced no output".to_string(),
            ));
        }

        let value: serde_json::Value = serde_json::from_slice(output).map_err(|e| {
            ExecutionError::MalformedOutput(format!(
                "invalid JSON ({}); output was: {}",
                e,
                excerpt(output)
            ))
        })?;

        match value {
            serde_json::Value::Array(items) => {
                Ok(Trace::new(items.into_iter().map(State).collect()))
            }
            other => Err(ExecutionError::MalformedOutput(format!(
                "expected a JSON array of states, found {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Returns the state at `position`, if it exists.
    pub fn get(&self, position: usize) -> Option<&State> {
        self.states.get(position)
    }

    /// Last valid cursor position (0 for an empty trace).
    pub fn last_position(&self) -> usize {
        self.states.len().saturating_sub(1)
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }
}

impl FromIterator<State> for Trace {
    fn from_iter<I: IntoIterator<Item = State>>(iter: I) -> Self {
        Trace {
            states: iter.into_iter().collect(),
        }
    }
}

impl Serialize for Trace {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.states.iter())
    }
}

/// Lossy, bounded rendering of raw output for error messages.
fn excerpt(output: &[u8]) -> String {
    let lossy = String::from_utf8_lossy(output);
    let text = lossy.trim();
    let mut out: String = text.chars().take(OUTPUT_EXCERPT_CHARS).collect();
    if text.chars().count() > OUTPUT_EXCERPT_CHARS {
        out.push_str("...");
    }
    out
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
