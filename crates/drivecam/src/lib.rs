pub mod app;
pub mod config;
pub mod metrics;
pub mod naming;
pub mod scheduler;

pub use config::{AppConfig, ScheduleConfig};
pub use scheduler::{CycleOutcome, RunSummary, Scheduler};
