use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Camera device {index} unavailable: {source}")]
    DeviceUnavailable {
        index: u32,
        #[source]
        source: io::Error,
    },

    #[error("Camera supports neither MJPEG nor YUYV (available: {0})")]
    UnsupportedFormat(String),

    #[error("Camera configuration failed: {0}")]
    Configure(#[source] io::Error),

    #[error("Frame read failed: {0}")]
    Read(#[source] io::Error),

    #[error("Frame decode failed: {0}")]
    Decode(String),

    #[error("JPEG encode failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_unavailable_names_the_index() {
        let err = CaptureError::DeviceUnavailable {
            index: 3,
            source: io::Error::new(io::ErrorKind::NotFound, "no such device"),
        };
        assert_eq!(
            err.to_string(),
            "Camera device 3 unavailable: no such device",
            "DeviceUnavailable should include index and cause"
        );
    }

    #[test]
    fn io_errors_convert_with_question_mark() {
        fn write_fails() -> Result<(), io::Error> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }

        fn capture() -> Result<(), CaptureError> {
            write_fails()?;
            Ok(())
        }

        match capture().unwrap_err() {
            CaptureError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::PermissionDenied),
            other => panic!("Expected Io variant, got {:?}", other),
        }
    }
}
