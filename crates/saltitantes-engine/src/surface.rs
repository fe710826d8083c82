//! Render surface that reports frames through tracing.
//!
//! The binary has no window; every `every`-th frame is summarized at
//! `debug` and the full frame is emitted as JSON at `trace`, so
//! `RUST_LOG=saltitantes_engine=trace` yields a replayable frame log.

use saltitantes_core::collaborators::RenderSurface;
use saltitantes_types::{Frame, ShapeKind};
use tracing::{debug, trace, warn};

/// Surface that logs frames instead of drawing them.
#[derive(Debug, Clone)]
pub struct LogSurface {
    every: u64,
}

impl LogSurface {
    /// Log one frame out of every `every` (0 is treated as 1).
    pub const fn new(every: u64) -> Self {
        Self {
            every: if every == 0 { 1 } else { every },
        }
    }

    /// Whether the frame for `tick` should be logged.
    pub const fn samples(&self, tick: u64) -> bool {
        matches!(tick.checked_rem(self.every), Some(0))
    }
}

impl RenderSurface for LogSurface {
    fn render(&mut self, frame: &Frame) {
        if !self.samples(frame.tick) {
            return;
        }
        let count = |shape: ShapeKind| frame.items.iter().filter(|i| i.shape == shape).count();
        debug!(
            tick = frame.tick,
            creatures = count(ShapeKind::Circle),
            clusters = count(ShapeKind::Rect),
            guardian = count(ShapeKind::Triangle),
            "Frame"
        );
        match serde_json::to_string(frame) {
            Ok(json) => trace!(frame = %json, "Frame JSON"),
            Err(e) => warn!(error = %e, "Failed to serialize frame"),
        }
    }
}
