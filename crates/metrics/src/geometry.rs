//! Plain float geometry value types shared across the viewport pipeline.

/// 2D point with float coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FloatPoint {
    pub x: f32,
    pub y: f32,
}

impl FloatPoint {
    /// Create a new point
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// 2D size with float dimensions
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FloatSize {
    pub width: f32,
    pub height: f32,
}

impl FloatSize {
    /// Create a new size
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle (top-left origin plus size)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FloatRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl FloatRect {
    /// Create a new rectangle
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (x + width)
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge (y + height)
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Check whether `other` lies entirely within this rectangle
    pub fn contains(&self, other: &FloatRect) -> bool {
        self.x <= other.x
            && self.y <= other.y
            && self.right() >= other.right()
            && self.bottom() >= other.bottom()
    }

    /// Translate the rectangle by the given deltas
    pub fn translate(&self, dx: f32, dy: f32) -> FloatRect {
        FloatRect::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// Integer pixel size, used for screen and window dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntSize {
    pub width: i32,
    pub height: i32,
}

impl IntSize {
    /// Create a new size
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}
