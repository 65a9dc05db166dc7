use crate::{
    config::CameraConfig, decoder::decoder_for, device::CameraDevice, encoder::encode_jpeg,
    error::CaptureError, source::FrameSource,
};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// A JPEG written to local disk by a successful capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedFrame {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub bytes: u64,
}

/// Single-shot image capture.
///
/// Implementations write nothing at `path` unless they return `Ok`.
pub trait StillCapture {
    fn capture(&mut self, path: &Path) -> Result<CapturedFrame, CaptureError>;
}

/// Captures stills from a V4L2 device, opening and releasing it per call.
pub struct V4lCamera {
    config: CameraConfig,
}

impl V4lCamera {
    pub fn new(config: CameraConfig) -> Self {
        Self { config }
    }

    fn grab_jpeg(&self) -> Result<(Vec<u8>, u32, u32), CaptureError> {
        let camera = CameraDevice::open(&self.config)?;
        let mut source = FrameSource::new(&camera.device, self.config.read_timeout)?;

        let flushed = source.warm_up(self.config.warmup_frames);
        if flushed < self.config.warmup_frames {
            tracing::debug!(
                "Warm-up read {} of {} frames",
                flushed,
                self.config.warmup_frames
            );
        }

        let raw = source.next_frame()?;
        let mut decoder = decoder_for(camera.pixel_format)?;
        let frame = decoder.decode(raw, camera.width, camera.height)?;
        let jpeg = encode_jpeg(
            frame.pixels,
            frame.width,
            frame.height,
            self.config.jpeg_quality,
        )?;

        Ok((jpeg, frame.width, frame.height))
    }
}

impl StillCapture for V4lCamera {
    #[tracing::instrument(skip(self), fields(device = self.config.device_index))]
    fn capture(&mut self, path: &Path) -> Result<CapturedFrame, CaptureError> {
        // Stream and device are dropped inside grab_jpeg, before any disk IO
        let (jpeg, width, height) = self.grab_jpeg()?;
        write_atomically(path, &jpeg)?;

        Ok(CapturedFrame {
            path: path.to_path_buf(),
            width,
            height,
            bytes: jpeg.len() as u64,
        })
    }
}

/// Write through a sibling temp file so a failed write never leaves a
/// truncated JPEG at `path`.
pub(crate) fn write_atomically(path: &Path, data: &[u8]) -> Result<(), CaptureError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut partial = path.as_os_str().to_owned();
    partial.push(".part");
    let partial = PathBuf::from(partial);

    if let Err(e) = fs::write(&partial, data).and_then(|_| fs::rename(&partial, path)) {
        let _ = fs::remove_file(&partial);
        return Err(e.into());
    }

    Ok(())
}
