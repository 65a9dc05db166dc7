use anyhow::Context;
use capture::V4lCamera;
use common::{TelemetryGuard, setup_logging};
use drivecam::{
    app::{connect_drive, start},
    config::AppConfig,
};
use signal_hook::{
    consts::{SIGINT, SIGTERM},
    flag,
};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    // The OTLP batch exporters need a Tokio runtime that outlives the guard,
    // so the runtime is declared first and dropped last.
    let runtime = match config.otel_endpoint {
        Some(_) => Some(tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?),
        None => None,
    };

    let _telemetry = match (runtime.as_ref(), config.otel_endpoint.as_deref()) {
        (Some(rt), Some(endpoint)) => Some(
            rt.block_on(async { TelemetryGuard::init("drivecam", endpoint, config.environment) })?,
        ),
        _ => {
            setup_logging(config.environment);
            None
        }
    };

    let shutdown = Arc::new(AtomicBool::new(false));
    flag::register(SIGTERM, Arc::clone(&shutdown))?;
    flag::register(SIGINT, Arc::clone(&shutdown))?;

    tracing::info!("Signal handlers registered (SIGTERM, SIGINT)");

    let camera = V4lCamera::new(config.camera.clone());

    match start(&config, camera, connect_drive, &shutdown) {
        Ok(_) => Ok(()),
        Err(e) => {
            tracing::error!("{:#}", e);
            Err(e)
        }
    }
}
