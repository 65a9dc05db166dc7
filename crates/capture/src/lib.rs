pub mod config;
pub mod decoder;
pub mod device;
pub mod encoder;
pub mod error;
pub mod source;
pub mod still;

pub use config::CameraConfig;
pub use decoder::{FrameDecoder, MjpegDecoder, RgbFrame, YuyvDecoder};
pub use device::{CameraDevice, PixelFormat};
pub use error::CaptureError;
pub use still::{CapturedFrame, StillCapture, V4lCamera};
