use crate::error::CaptureError;
use std::{io, time::Duration};
use v4l::{
    Device,
    buffer::Type,
    io::{mmap::Stream, traits::CaptureStream},
};

const BUFFER_COUNT: u32 = 2;

pub struct FrameSource<'a> {
    stream: Stream<'a>,
}

impl<'a> FrameSource<'a> {
    /// Starts an mmap stream whose reads fail after `timeout`.
    pub fn new(device: &'a Device, timeout: Duration) -> Result<Self, CaptureError> {
        let mut stream = Stream::with_buffers(device, Type::VideoCapture, BUFFER_COUNT)
            .map_err(CaptureError::Configure)?;
        stream.set_timeout(timeout);
        Ok(Self { stream })
    }

    /// Discard the first frames of a fresh stream. Returns how many were read.
    pub fn warm_up(&mut self, frames: usize) -> usize {
        (0..frames)
            .take_while(|_| self.stream.next().is_ok())
            .count()
    }

    pub fn next_frame(&mut self) -> Result<&[u8], CaptureError> {
        let (data, meta) = self.stream.next().map_err(CaptureError::Read)?;
        let used = (meta.bytesused as usize).min(data.len());

        if used == 0 {
            return Err(CaptureError::Read(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "driver returned an empty frame",
            )));
        }

        Ok(&data[..used])
    }
}
