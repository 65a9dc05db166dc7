use crate::{
    config::AppConfig,
    scheduler::{RunSummary, Scheduler},
};
use anyhow::{Context, Result};
use capture::StillCapture;
use drive::{DriveClient, DriveError, Uploader};
use std::sync::atomic::AtomicBool;

/// Authenticate once, then run the capture loop until `shutdown` is raised.
///
/// Authentication failures are returned before the camera is touched.
pub fn start<C, U, F>(
    config: &AppConfig,
    camera: C,
    connect: F,
    shutdown: &AtomicBool,
) -> Result<RunSummary>
where
    C: StillCapture,
    U: Uploader,
    F: FnOnce(&AppConfig) -> Result<U, DriveError>,
{
    let uploader = connect(config).context("Failed to authenticate with Google Drive")?;

    let mut scheduler = Scheduler::new(config.schedule.clone(), camera, uploader);
    Ok(scheduler.run(shutdown))
}

pub fn connect_drive(config: &AppConfig) -> Result<DriveClient, DriveError> {
    DriveClient::authenticate(&config.credentials_path, config.drive_settings())
}
