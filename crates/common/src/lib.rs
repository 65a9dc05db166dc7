pub mod config;
pub mod logging;
pub mod telemetry;

pub use config::{EnvVars, Environment};
pub use logging::setup_logging;
pub use telemetry::TelemetryGuard;
