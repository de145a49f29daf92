//! Per-frame view transform

/// Pan/zoom transform handed to the renderer each frame
///
/// Pre-allocated by the frame handshake and mutated in place, so the
/// once-per-frame path never constructs a new object. `Copy`, so callers
/// take their own value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    /// Pan offset x, in page coordinates
    pub x: f32,
    /// Pan offset y, in page coordinates
    pub y: f32,
    /// Zoom scale
    pub scale: f32,
}

impl ViewTransform {
    /// Create a new transform
    pub fn new(x: f32, y: f32, scale: f32) -> Self {
        Self { x, y, scale }
    }

    /// Overwrite all fields in place
    pub fn set(&mut self, x: f32, y: f32, scale: f32) {
        self.x = x;
        self.y = y;
        self.scale = scale;
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }
}
