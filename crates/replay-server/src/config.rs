//! Server configuration from command-line flags and environment variables.
//!
//! Every flag has an environment fallback (`REPLAY_*`) so the server can be
//! configured either way in containers and on the command line.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::executor::ProcessExecutor;

/// Configuration for the trace replay server.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "replay-server",
    version,
    about = "Step-through replay server for simulator traces"
)]
pub struct ServerConfig {
    /// Address to bind.
    #[arg(long, env = "REPLAY_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, env = "REPLAY_PORT", default_value_t = 5005)]
    pub port: u16,

    /// Path to the simulator binary.
    #[arg(long, env = "REPLAY_SIMULATOR", default_value = "./cpu")]
    pub simulator: PathBuf,

    /// Extra arguments passed to the simulator (space separated).
    #[arg(long, env = "REPLAY_SIMULATOR_ARGS", value_delimiter = ' ', num_args = 0..)]
    pub simulator_args: Vec<String>,

    /// Simulator time budget in milliseconds.
    #[arg(long, env = "REPLAY_EXEC_TIMEOUT_MS", default_value_t = 5000)]
    pub exec_timeout_ms: u64,

    /// Evict sessions idle for this many seconds (0 disables eviction).
    #[arg(long, env = "REPLAY_IDLE_TIMEOUT_SECS", default_value_t = 30 * 60)]
    pub idle_timeout_secs: u64,

    /// How often the idle sweep runs, in seconds.
    #[arg(long, env = "REPLAY_SWEEP_INTERVAL_SECS", default_value_t = 60)]
    pub sweep_interval_secs: u64,
}

impl ServerConfig {
    /// `host:port` string for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn exec_timeout(&self) -> Duration {
        Duration::from_millis(self.exec_timeout_ms)
    }

    /// Idle threshold, or `None` when eviction is disabled.
    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_secs > 0).then(|| Duration::from_secs(self.idle_timeout_secs))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }

    /// Builds the process executor described by this configuration.
    pub fn executor(&self) -> ProcessExecutor {
        ProcessExecutor::new(self.simulator.clone())
            .with_args(self.simulator_args.clone())
            .with_timeout(self.exec_timeout())
    }
}
