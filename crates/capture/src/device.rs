use crate::{config::CameraConfig, error::CaptureError};
use v4l::{Device, FourCC, capability::Flags, video::Capture};

const FOURCC_YUYV: FourCC = FourCC { repr: *b"YUYV" };
const FOURCC_MJPG: FourCC = FourCC { repr: *b"MJPG" };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Yuyv,
    Mjpeg,
}

impl PixelFormat {
    pub fn fourcc(&self) -> FourCC {
        match self {
            PixelFormat::Yuyv => FOURCC_YUYV,
            PixelFormat::Mjpeg => FOURCC_MJPG,
        }
    }

    pub fn from_fourcc(fourcc: FourCC) -> Option<Self> {
        if fourcc == FOURCC_MJPG {
            Some(PixelFormat::Mjpeg)
        } else if fourcc == FOURCC_YUYV {
            Some(PixelFormat::Yuyv)
        } else {
            None
        }
    }
}

/// Select best pixel format for a still: prefer MJPEG (full sensor
/// resolution over USB), fallback to YUYV.
pub fn select_format(available: &[FourCC]) -> Result<PixelFormat, CaptureError> {
    if available.contains(&FOURCC_MJPG) {
        return Ok(PixelFormat::Mjpeg);
    }

    if available.contains(&FOURCC_YUYV) {
        return Ok(PixelFormat::Yuyv);
    }

    Err(CaptureError::UnsupportedFormat(format!("{:?}", available)))
}

/// An opened, configured V4L2 device. Closed when dropped.
pub struct CameraDevice {
    pub device: Device,
    pub width: u32,
    pub height: u32,
    pub pixel_format: PixelFormat,
}

impl CameraDevice {
    pub fn open(config: &CameraConfig) -> Result<Self, CaptureError> {
        let index = config.device_index;
        let unavailable = |source| CaptureError::DeviceUnavailable { index, source };

        let device = Device::new(index as usize).map_err(unavailable)?;
        let caps = device.query_caps().map_err(unavailable)?;

        if !caps.capabilities.contains(Flags::VIDEO_CAPTURE) {
            return Err(unavailable(std::io::Error::other(format!(
                "{} does not support video capture",
                caps.card
            ))));
        }

        tracing::debug!("Camera opened: {} ({})", caps.card, caps.driver);

        let formats = device.enum_formats().map_err(CaptureError::Configure)?;
        for fmt in &formats {
            tracing::trace!("  {:?}: {}", fmt.fourcc, fmt.description);
        }

        let wanted = select_format(&formats.iter().map(|f| f.fourcc).collect::<Vec<_>>())?;

        let mut format = device.format().map_err(CaptureError::Configure)?;
        format.fourcc = wanted.fourcc();
        if let Some((width, height)) = config.resolution {
            format.width = width;
            format.height = height;
        }
        let format = device
            .set_format(&format)
            .map_err(CaptureError::Configure)?;

        // Drivers may silently keep a different format
        let pixel_format = PixelFormat::from_fourcc(format.fourcc)
            .ok_or_else(|| CaptureError::UnsupportedFormat(format!("{:?}", format.fourcc)))?;

        tracing::debug!(
            "Capture format: {}x{} {:?} ({:?})",
            format.width,
            format.height,
            format.fourcc,
            pixel_format
        );

        Ok(Self {
            device,
            width: format.width,
            height: format.height,
            pixel_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_mjpeg_when_both_available() {
        let formats = [FOURCC_YUYV, FOURCC_MJPG];
        assert_eq!(select_format(&formats).unwrap(), PixelFormat::Mjpeg);
    }

    #[test]
    fn falls_back_to_yuyv() {
        let formats = [FourCC::new(b"GREY"), FOURCC_YUYV];
        assert_eq!(select_format(&formats).unwrap(), PixelFormat::Yuyv);
    }

    #[test]
    fn rejects_unknown_formats() {
        let formats = [FourCC::new(b"GREY")];
        assert!(matches!(
            select_format(&formats),
            Err(CaptureError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn fourcc_round_trips_for_known_formats() {
        for format in [PixelFormat::Yuyv, PixelFormat::Mjpeg] {
            assert_eq!(PixelFormat::from_fourcc(format.fourcc()), Some(format));
        }
    }
}
