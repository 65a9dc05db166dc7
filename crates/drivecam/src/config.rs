use anyhow::{Context, Result, bail};
use capture::CameraConfig;
use common::{EnvVars, Environment};
use drive::DriveSettings;
use std::{path::PathBuf, time::Duration};

pub const DEFAULT_CREDENTIALS_PATH: &str = "./service-account-credentials.json";
pub const DEFAULT_STORE_DIR: &str = "local_store";
pub const DEFAULT_INTERVAL_SECS: f64 = 6.0;

#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    pub interval: Duration,
    pub store_dir: PathBuf,
    pub folder_id: Option<String>,
    /// Keep the local JPEG after a successful upload.
    pub keep_local: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub credentials_path: PathBuf,
    pub otel_endpoint: Option<String>,
    pub upload_timeout: Duration,
    pub camera: CameraConfig,
    pub schedule: ScheduleConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(&EnvVars::process())
    }

    pub fn from_vars<F>(vars: &EnvVars<F>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = CameraConfig::default();

        let environment = Environment::from_vars(vars);

        let credentials_path =
            PathBuf::from(vars.string_or("CREDENTIALS_PATH", DEFAULT_CREDENTIALS_PATH));

        let otel_endpoint = vars.string("OTEL_EXPORTER_OTLP_ENDPOINT");

        let upload_timeout_secs: u64 = vars.parse_or("UPLOAD_TIMEOUT_SECS", 60)?;
        if upload_timeout_secs == 0 {
            bail!("UPLOAD_TIMEOUT_SECS must be at least 1");
        }
        let upload_timeout = Duration::from_secs(upload_timeout_secs);

        let interval_secs = vars.parse_or("CAPTURE_INTERVAL_SECS", DEFAULT_INTERVAL_SECS)?;
        let interval = interval_from_secs(interval_secs).context("Invalid CAPTURE_INTERVAL_SECS")?;

        let resolution = match (
            vars.parse_opt::<u32>("CAPTURE_WIDTH")?,
            vars.parse_opt::<u32>("CAPTURE_HEIGHT")?,
        ) {
            (Some(width), Some(height)) => Some((width, height)),
            (None, None) => None,
            _ => bail!("CAPTURE_WIDTH and CAPTURE_HEIGHT must be set together"),
        };

        let jpeg_quality: u8 = vars.parse_or("JPEG_QUALITY", defaults.jpeg_quality)?;
        if !(1..=100).contains(&jpeg_quality) {
            bail!("JPEG_QUALITY must be between 1 and 100, got {}", jpeg_quality);
        }

        let camera = CameraConfig {
            device_index: vars.parse_or("CAMERA_DEVICE", defaults.device_index)?,
            resolution,
            warmup_frames: vars.parse_or("WARMUP_FRAMES", defaults.warmup_frames)?,
            read_timeout: Duration::from_millis(vars.parse_or(
                "CAMERA_READ_TIMEOUT_MS",
                defaults.read_timeout.as_millis() as u64,
            )?),
            jpeg_quality,
        };

        let schedule = ScheduleConfig {
            interval,
            store_dir: PathBuf::from(vars.string_or("LOCAL_STORE_DIR", DEFAULT_STORE_DIR)),
            folder_id: vars.string("DRIVE_FOLDER_ID"),
            keep_local: vars.flag_or("KEEP_LOCAL_COPIES", true)?,
        };

        Ok(Self {
            environment,
            credentials_path,
            otel_endpoint,
            upload_timeout,
            camera,
            schedule,
        })
    }

    pub fn drive_settings(&self) -> DriveSettings {
        DriveSettings {
            timeout: self.upload_timeout,
            ..DriveSettings::default()
        }
    }
}

fn interval_from_secs(secs: f64) -> Result<Duration> {
    if !secs.is_finite() || secs <= 0.0 {
        bail!("capture interval must be a positive number of seconds, got {}", secs);
    }
    Duration::try_from_secs_f64(secs).context("capture interval out of range")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_vars(&EnvVars::new(move |key: &str| map.get(key).cloned()))
    }

    #[test]
    fn defaults_match_documented_behaviour() {
        let config = load(&[]).unwrap();

        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.credentials_path, PathBuf::from(DEFAULT_CREDENTIALS_PATH));
        assert_eq!(config.schedule.interval, Duration::from_secs(6));
        assert_eq!(config.schedule.store_dir, PathBuf::from("local_store"));
        assert_eq!(config.schedule.folder_id, None);
        assert!(config.schedule.keep_local);
        assert_eq!(config.camera.device_index, 0);
        assert_eq!(config.camera.resolution, None);
        assert!(config.otel_endpoint.is_none());
        assert_eq!(config.drive_settings().scope, drive::DRIVE_FILE_SCOPE);
    }

    #[test]
    fn reads_overrides() {
        let config = load(&[
            ("CAPTURE_INTERVAL_SECS", "0.5"),
            ("DRIVE_FOLDER_ID", "1_7AUcGa"),
            ("CAMERA_DEVICE", "1"),
            ("CAPTURE_WIDTH", "1280"),
            ("CAPTURE_HEIGHT", "720"),
            ("KEEP_LOCAL_COPIES", "false"),
            ("JPEG_QUALITY", "75"),
            ("UPLOAD_TIMEOUT_SECS", "15"),
        ])
        .unwrap();

        assert_eq!(config.schedule.interval, Duration::from_millis(500));
        assert_eq!(config.schedule.folder_id.as_deref(), Some("1_7AUcGa"));
        assert_eq!(config.camera.device_index, 1);
        assert_eq!(config.camera.resolution, Some((1280, 720)));
        assert_eq!(config.camera.jpeg_quality, 75);
        assert!(!config.schedule.keep_local);
        assert_eq!(config.drive_settings().timeout, Duration::from_secs(15));
    }

    #[test]
    fn rejects_non_positive_interval() {
        for bad in ["0", "-3", "NaN", "inf"] {
            assert!(
                load(&[("CAPTURE_INTERVAL_SECS", bad)]).is_err(),
                "interval {:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn accepts_interval_longer_than_the_clock_can_reach() {
        let config = load(&[("CAPTURE_INTERVAL_SECS", "1e19")]).unwrap();
        assert_eq!(config.schedule.interval, Duration::from_secs(10_000_000_000_000_000_000));
    }

    #[test]
    fn rejects_zero_upload_timeout() {
        let err = load(&[("UPLOAD_TIMEOUT_SECS", "0")]).unwrap_err();
        assert!(err.to_string().contains("UPLOAD_TIMEOUT_SECS"));
        assert!(load(&[("UPLOAD_TIMEOUT_SECS", "1")]).is_ok());
    }

    #[test]
    fn rejects_half_specified_resolution() {
        assert!(load(&[("CAPTURE_WIDTH", "640")]).is_err());
    }

    #[test]
    fn rejects_out_of_range_quality() {
        assert!(load(&[("JPEG_QUALITY", "0")]).is_err());
        assert!(load(&[("JPEG_QUALITY", "101")]).is_err());
    }

    #[test]
    fn blank_folder_means_no_folder() {
        let config = load(&[("DRIVE_FOLDER_ID", "")]).unwrap();
        assert_eq!(config.schedule.folder_id, None);
    }
}
