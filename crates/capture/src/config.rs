use std::time::Duration;

#[derive(Debug, Clone)]
pub struct CameraConfig {
    /// V4L2 index, i.e. `/dev/video<N>`.
    pub device_index: u32,
    /// Requested `(width, height)`; the driver may round to the nearest mode.
    pub resolution: Option<(u32, u32)>,
    /// Frames dropped before the still so auto exposure can settle.
    pub warmup_frames: usize,
    pub read_timeout: Duration,
    pub jpeg_quality: u8,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device_index: 0,
            resolution: None,
            warmup_frames: 3,
            read_timeout: Duration::from_secs(5),
            jpeg_quality: 90,
        }
    }
}
