//! Frame acquisition
//!
//! A camera is reached through a prioritized list of [`CaptureStrategy`]s.
//! Each strategy probes its backend when opened (by reading a first frame) and
//! either yields a [`FrameSource`] or fails; [`open_first`] returns the first
//! that succeeds.

use crate::observer::{BenchEvent, Observer};
use crate::types::{BenchError, Result};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

/// A packed image frame
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Bytes per pixel (3 for packed RGB/BGR)
    pub channels: u32,
    pub data: Vec<u8>,
}

impl Frame {
    /// Size in bytes of a frame with the given geometry
    pub fn byte_len(width: u32, height: u32, channels: u32) -> usize {
        width as usize * height as usize * channels as usize
    }
}

/// Supplies frames until exhausted
pub trait FrameSource {
    /// Read the next frame, or `None` when the source has no more frames
    fn read_frame(&mut self) -> Result<Option<Frame>>;
}

/// One way of opening a camera
pub trait CaptureStrategy {
    /// Short name used in logs and error messages
    fn name(&self) -> &str;

    /// Open and probe the backend
    fn open(&self) -> Result<Box<dyn FrameSource>>;
}

/// Try each strategy in order and return the first that opens
///
/// # Returns
/// * The winning strategy's name and its frame source
///
/// # Errors
/// * `BenchError::NoCaptureBackend` listing every failed attempt
pub fn open_first(
    strategies: &[Box<dyn CaptureStrategy>],
    observer: &mut dyn Observer,
) -> Result<(String, Box<dyn FrameSource>)> {
    let mut failures = Vec::new();

    for strategy in strategies {
        log::debug!("Trying capture strategy '{}'", strategy.name());
        match strategy.open() {
            Ok(source) => {
                observer.notify(&BenchEvent::CaptureOpened {
                    strategy: strategy.name().to_string(),
                });
                return Ok((strategy.name().to_string(), source));
            }
            Err(e) => {
                observer.notify(&BenchEvent::CaptureFailed {
                    strategy: strategy.name().to_string(),
                    reason: e.to_string(),
                });
                failures.push(format!("{}: {}", strategy.name(), e));
            }
        }
    }

    Err(BenchError::NoCaptureBackend(failures))
}

/// Frames read as fixed-size packed chunks from a device node or file
///
/// Works with capture devices that support plain `read()` I/O, named pipes fed
/// by an external grabber, and recorded raw streams.
#[derive(Debug, Clone)]
pub struct RawStream {
    name: String,
    path: PathBuf,
    width: u32,
    height: u32,
    channels: u32,
}

impl RawStream {
    pub fn new(path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        let path = path.into();
        Self {
            name: format!("raw:{}", path.display()),
            path,
            width,
            height,
            channels: 3,
        }
    }

    /// Builder method: set bytes per pixel
    pub fn with_channels(mut self, channels: u32) -> Self {
        self.channels = channels;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CaptureStrategy for RawStream {
    fn name(&self) -> &str {
        &self.name
    }

    fn open(&self) -> Result<Box<dyn FrameSource>> {
        if self.width == 0 || self.height == 0 || self.channels == 0 {
            return Err(BenchError::InvalidConfig(format!(
                "frame geometry {}x{}x{} is empty",
                self.width, self.height, self.channels
            )));
        }

        let file = File::open(&self.path)?;
        let mut source = RawStreamSource {
            file,
            width: self.width,
            height: self.height,
            channels: self.channels,
            pending: None,
        };

        // Probe: the backend only counts as open once it delivers a frame
        let first = source
            .read_frame()?
            .ok_or_else(|| BenchError::Capture(format!("{:?} delivered no frame", self.path)))?;
        source.pending = Some(first);

        Ok(Box::new(source))
    }
}

struct RawStreamSource {
    file: File,
    width: u32,
    height: u32,
    channels: u32,
    /// Frame read while probing, handed out first
    pending: Option<Frame>,
}

impl FrameSource for RawStreamSource {
    fn read_frame(&mut self) -> Result<Option<Frame>> {
        if let Some(frame) = self.pending.take() {
            return Ok(Some(frame));
        }

        let mut data = vec![0u8; Frame::byte_len(self.width, self.height, self.channels)];
        match self.file.read_exact(&mut data) {
            Ok(()) => Ok(Some(Frame {
                width: self.width,
                height: self.height,
                channels: self.channels,
                data,
            })),
            // A trailing partial frame is dropped
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Deterministic moving test pattern for headless and dry runs
#[derive(Debug, Clone)]
pub struct Synthetic {
    width: u32,
    height: u32,
    frame_limit: Option<u64>,
}

impl Synthetic {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frame_limit: None,
        }
    }

    /// Builder method: stop after `limit` frames
    pub fn with_frame_limit(mut self, limit: u64) -> Self {
        self.frame_limit = Some(limit);
        self
    }
}

impl CaptureStrategy for Synthetic {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn open(&self) -> Result<Box<dyn FrameSource>> {
        if self.width == 0 || self.height == 0 {
            return Err(BenchError::InvalidConfig(format!(
                "frame geometry {}x{} is empty",
                self.width, self.height
            )));
        }
        Ok(Box::new(SyntheticSource {
            width: self.width,
            height: self.height,
            frame_limit: self.frame_limit,
            produced: 0,
        }))
    }
}

struct SyntheticSource {
    width: u32,
    height: u32,
    frame_limit: Option<u64>,
    produced: u64,
}

impl FrameSource for SyntheticSource {
    fn read_frame(&mut self) -> Result<Option<Frame>> {
        if self.frame_limit.is_some_and(|limit| self.produced >= limit) {
            return Ok(None);
        }

        // Diagonal gradient shifted by one pixel per frame
        let shift = self.produced as u32;
        let mut data = Vec::with_capacity(Frame::byte_len(self.width, self.height, 3));
        for y in 0..self.height {
            for x in 0..self.width {
                let v = (x.wrapping_add(y).wrapping_add(shift) % 256) as u8;
                data.extend_from_slice(&[v, v.wrapping_mul(3), 255 - v]);
            }
        }

        self.produced += 1;
        Ok(Some(Frame {
            width: self.width,
            height: self.height,
            channels: 3,
            data,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NoopObserver;
    use std::io::Write;

    struct Broken;

    impl CaptureStrategy for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn open(&self) -> Result<Box<dyn FrameSource>> {
            Err(BenchError::Capture("device busy".to_string()))
        }
    }

    #[test]
    fn test_first_success_wins() {
        let strategies: Vec<Box<dyn CaptureStrategy>> = vec![
            Box::new(Broken),
            Box::new(Synthetic::new(4, 2)),
            Box::new(Broken),
        ];
        let mut events = Vec::new();
        let mut observer = |e: &BenchEvent| events.push(e.clone());

        let (name, mut source) = open_first(&strategies, &mut observer).unwrap();
        assert_eq!(name, "synthetic");
        let frame = source.read_frame().unwrap().unwrap();
        assert_eq!(frame.data.len(), 4 * 2 * 3);

        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], BenchEvent::CaptureFailed { strategy, .. } if strategy == "broken"));
        assert!(matches!(&events[1], BenchEvent::CaptureOpened { strategy } if strategy == "synthetic"));
    }

    #[test]
    fn test_all_strategies_fail() {
        let strategies: Vec<Box<dyn CaptureStrategy>> = vec![
            Box::new(Broken),
            Box::new(RawStream::new("/nonexistent/video9", 320, 240)),
        ];
        match open_first(&strategies, &mut NoopObserver) {
            Err(BenchError::NoCaptureBackend(attempts)) => {
                assert_eq!(attempts.len(), 2);
                assert_eq!(attempts[0], "broken: Capture failed: device busy");
                assert!(attempts[1].starts_with("raw:/nonexistent/video9"));
            }
            Ok(_) => panic!("expected failure"),
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    #[test]
    fn test_raw_stream_frames() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        // Two full 2x2 RGB frames plus a partial one
        file.write_all(&[1u8; 12]).unwrap();
        file.write_all(&[2u8; 12]).unwrap();
        file.write_all(&[3u8; 5]).unwrap();
        file.flush().unwrap();

        let strategy = RawStream::new(file.path(), 2, 2);
        let mut source = strategy.open().unwrap();

        assert_eq!(source.read_frame().unwrap().unwrap().data, vec![1u8; 12]);
        assert_eq!(source.read_frame().unwrap().unwrap().data, vec![2u8; 12]);
        assert!(source.read_frame().unwrap().is_none());
    }

    #[test]
    fn test_raw_stream_empty_file_fails_probe() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let strategy = RawStream::new(file.path(), 2, 2);
        assert!(matches!(strategy.open(), Err(BenchError::Capture(_))));
    }

    #[test]
    fn test_synthetic_frame_limit() {
        let mut source = Synthetic::new(8, 8).with_frame_limit(2).open().unwrap();
        let a = source.read_frame().unwrap().unwrap();
        let b = source.read_frame().unwrap().unwrap();
        assert_ne!(a.data, b.data);
        assert!(source.read_frame().unwrap().is_none());
    }
}
