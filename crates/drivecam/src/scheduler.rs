use crate::{config::ScheduleConfig, metrics::CycleMetrics, naming::FrameNamer};
use capture::StillCapture;
use chrono::NaiveDateTime;
use drive::Uploader;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
    thread,
    time::{Duration, Instant},
};

/// Longest uninterrupted nap while waiting out the interval.
const SLEEP_SLICE: Duration = Duration::from_millis(200);

pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time, which is what file names are stamped with.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

pub trait Sleeper {
    /// Block for `duration`, returning early once `shutdown` is raised.
    fn sleep(&mut self, duration: Duration, shutdown: &AtomicBool);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration, shutdown: &AtomicBool) {
        // `None` when the interval is too long to land on the monotonic clock;
        // such a nap only ends on shutdown.
        let deadline = Instant::now().checked_add(duration);

        while !shutdown.load(Ordering::Relaxed) {
            let remaining = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        break;
                    }
                    deadline - now
                }
                None => SLEEP_SLICE,
            };
            thread::sleep(remaining.min(SLEEP_SLICE));
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Uploaded { name: String, remote_id: String },
    CaptureFailed { name: String, error: String },
    UploadFailed { name: String, error: String },
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub uploaded: u64,
    pub capture_failures: u64,
    pub upload_failures: u64,
}

impl RunSummary {
    fn record(&mut self, outcome: &CycleOutcome) {
        self.cycles += 1;
        match outcome {
            CycleOutcome::Uploaded { .. } => self.uploaded += 1,
            CycleOutcome::CaptureFailed { .. } => self.capture_failures += 1,
            CycleOutcome::UploadFailed { .. } => self.upload_failures += 1,
        }
    }
}

/// Capture → upload → sleep, until asked to stop.
pub struct Scheduler<C, U, K = LocalClock, S = ThreadSleeper> {
    config: ScheduleConfig,
    camera: C,
    uploader: U,
    clock: K,
    sleeper: S,
    namer: FrameNamer,
    metrics: CycleMetrics,
}

impl<C, U> Scheduler<C, U>
where
    C: StillCapture,
    U: Uploader,
{
    pub fn new(config: ScheduleConfig, camera: C, uploader: U) -> Self {
        Self::with_timing(config, camera, uploader, LocalClock, ThreadSleeper)
    }
}

impl<C, U, K, S> Scheduler<C, U, K, S>
where
    C: StillCapture,
    U: Uploader,
    K: Clock,
    S: Sleeper,
{
    pub fn with_timing(
        config: ScheduleConfig,
        camera: C,
        uploader: U,
        clock: K,
        sleeper: S,
    ) -> Self {
        Self {
            config,
            camera,
            uploader,
            clock,
            sleeper,
            namer: FrameNamer::new(),
            metrics: CycleMetrics::new(),
        }
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    pub fn uploader(&self) -> &U {
        &self.uploader
    }

    pub fn run(&mut self, shutdown: &AtomicBool) -> RunSummary {
        tracing::info!(
            interval_secs = self.config.interval.as_secs_f64(),
            store_dir = %self.config.store_dir.display(),
            folder_id = self.config.folder_id.as_deref().unwrap_or("<none>"),
            keep_local = self.config.keep_local,
            "Starting continuous capture"
        );

        if self.config.interval < Duration::from_secs(1) {
            tracing::warn!(
                "Capture interval {:?} is below one second; repeated names get a numeric suffix",
                self.config.interval
            );
        }

        let mut summary = RunSummary::default();

        while !shutdown.load(Ordering::Relaxed) {
            let outcome = self.run_cycle(summary.cycles);
            summary.record(&outcome);

            if shutdown.load(Ordering::Relaxed) {
                break;
            }

            tracing::info!(
                "Waiting {:.1} seconds before next capture...",
                self.config.interval.as_secs_f64()
            );
            self.sleeper.sleep(self.config.interval, shutdown);
        }

        tracing::info!(
            cycles = summary.cycles,
            uploaded = summary.uploaded,
            capture_failures = summary.capture_failures,
            upload_failures = summary.upload_failures,
            "Process stopped by user"
        );

        summary
    }

    /// One capture and, if it produced a file, one upload.
    pub fn run_cycle(&mut self, cycle: u64) -> CycleOutcome {
        let span = tracing::info_span!("capture_cycle", cycle);
        let _enter = span.enter();

        let (name, path) = self.reserve_path();

        let frame = match self.camera.capture(&path) {
            Ok(frame) => {
                self.metrics.capture(true);
                tracing::info!(
                    width = frame.width,
                    height = frame.height,
                    bytes = frame.bytes,
                    "Image saved: {}",
                    frame.path.display()
                );
                frame
            }
            Err(e) => {
                self.metrics.capture(false);
                tracing::warn!(error = %e, "Failed to capture image, skipping upload");
                return CycleOutcome::CaptureFailed {
                    name,
                    error: e.to_string(),
                };
            }
        };

        match self
            .uploader
            .upload(&frame.path, self.config.folder_id.as_deref())
        {
            Ok(remote) => {
                self.metrics.upload_succeeded(frame.bytes);
                tracing::info!("File uploaded: {} (ID: {})", name, remote.id);

                if !self.config.keep_local {
                    discard_local(&frame.path);
                }

                CycleOutcome::Uploaded {
                    name,
                    remote_id: remote.id,
                }
            }
            Err(e) => {
                self.metrics.upload_failed();
                tracing::error!(error = %e, "Failed to upload {}, keeping local copy", name);
                CycleOutcome::UploadFailed {
                    name,
                    error: e.to_string(),
                }
            }
        }
    }

    /// Next timestamp name whose path is not taken on disk yet.
    fn reserve_path(&mut self) -> (String, PathBuf) {
        let now = self.clock.now();
        loop {
            let name = self.namer.next_name(now);
            let path = self.config.store_dir.join(&name);
            if !path.exists() {
                return (name, path);
            }
        }
    }
}

fn discard_local(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => tracing::debug!("Removed local copy {}", path.display()),
        Err(e) => tracing::warn!(error = %e, "Failed to remove local copy {}", path.display()),
    }
}
