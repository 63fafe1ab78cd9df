//! Object detector seam
//!
//! Model loading and inference live outside this crate. Backends implement
//! [`Detector`]; the benchmark loop only times `detect` and counts results.

use crate::capture::Frame;
use crate::types::Result;

/// One detected object
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub class_name: String,
    pub confidence: f32,
}

/// An object detection backend
pub trait Detector {
    /// Model name used in logs
    fn name(&self) -> &str;

    /// Whether this backend yields per-object results
    ///
    /// Quantized backends that only expose raw output tensors return `false`;
    /// their runs are recorded without a detections column.
    fn reports_detections(&self) -> bool {
        true
    }

    /// Run inference on one frame
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>>;
}

/// Detector that returns nothing, for measuring pipeline overhead
#[derive(Debug, Clone)]
pub struct NullDetector {
    name: String,
    reports_detections: bool,
}

impl NullDetector {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reports_detections: true,
        }
    }

    /// Builder method: behave like a quantized backend with no detection output
    pub fn quantized(mut self) -> Self {
        self.reports_detections = false;
        self
    }
}

impl Detector for NullDetector {
    fn name(&self) -> &str {
        &self.name
    }

    fn reports_detections(&self) -> bool {
        self.reports_detections
    }

    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>> {
        log::trace!("{}: {}x{} frame, no model attached", self.name, frame.width, frame.height);
        Ok(Vec::new())
    }
}
