//! Viewport metrics: the mutable working form and its frozen snapshot
//!
//! `ViewportMetrics` is the mutable value the UI thread and the layout
//! peer negotiate over. `ImmutableViewportMetrics` is a frozen copy taken
//! once per publish; it is `Copy` and safe to hand to concurrent readers.
//!
//! Clamping is an explicit, idempotent operation. Setters replace fields
//! without any cross-field recompute, so a viewport may be transiently
//! out of bounds until the caller clamps it.

use crate::geometry::{FloatPoint, FloatRect, FloatSize};

/// Mutable viewport state: origin, zoom, viewport size, page size
///
/// The origin is in page coordinates, the viewport size is in device
/// pixels, and the page size is in page coordinates. The visible span in
/// page coordinates on each axis is `viewport_size / zoom_factor`.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportMetrics {
    origin: FloatPoint,
    zoom_factor: f32,
    viewport_size: FloatSize,
    page_size: FloatSize,
}

impl ViewportMetrics {
    /// Create viewport metrics from live controller state
    pub fn new(
        origin: FloatPoint,
        zoom_factor: f32,
        viewport_size: FloatSize,
        page_size: FloatSize,
    ) -> Self {
        Self {
            origin,
            zoom_factor,
            viewport_size,
            page_size,
        }
    }

    /// Viewport origin in page coordinates
    pub fn origin(&self) -> FloatPoint {
        self.origin
    }

    /// Current zoom factor (always positive; enforced at the decode boundary)
    pub fn zoom_factor(&self) -> f32 {
        self.zoom_factor
    }

    /// Viewport size in device pixels
    pub fn viewport_size(&self) -> FloatSize {
        self.viewport_size
    }

    /// Page size in page coordinates
    pub fn page_size(&self) -> FloatSize {
        self.page_size
    }

    /// Replace the origin
    pub fn set_origin(&mut self, origin: FloatPoint) {
        self.origin = origin;
    }

    /// Replace the zoom factor
    pub fn set_zoom_factor(&mut self, zoom_factor: f32) {
        self.zoom_factor = zoom_factor;
    }

    /// Replace the page size
    pub fn set_page_size(&mut self, page_size: FloatSize) {
        self.page_size = page_size;
    }

    /// Replace the viewport size
    pub fn set_viewport_size(&mut self, viewport_size: FloatSize) {
        self.viewport_size = viewport_size;
    }

    /// Visible span on the x axis, in page coordinates
    pub fn visible_width(&self) -> f32 {
        self.viewport_size.width / self.zoom_factor
    }

    /// Visible span on the y axis, in page coordinates
    pub fn visible_height(&self) -> f32 {
        self.viewport_size.height / self.zoom_factor
    }

    /// The visible rectangle in page coordinates
    pub fn visible_rect(&self) -> FloatRect {
        FloatRect::new(
            self.origin.x,
            self.origin.y,
            self.visible_width(),
            self.visible_height(),
        )
    }

    /// Origin adjusted so the visible rectangle lies within the page
    ///
    /// Per axis: when the page covers the visible span, the origin is
    /// clamped to `[0, page - visible]`; when the page is smaller than the
    /// visible span, content is centered (`(page - visible) / 2`, which is
    /// zero or negative).
    pub fn clamped_origin(&self) -> FloatPoint {
        FloatPoint::new(
            clamp_axis(self.origin.x, self.visible_width(), self.page_size.width),
            clamp_axis(self.origin.y, self.visible_height(), self.page_size.height),
        )
    }

    /// Copy of this viewport with the origin clamped to page bounds
    ///
    /// Idempotent: clamping a clamped viewport is a no-op.
    pub fn clamped(&self) -> ViewportMetrics {
        let mut clamped = self.clone();
        clamped.set_origin(self.clamped_origin());
        clamped
    }

    /// Take a frozen value snapshot of this viewport
    pub fn freeze(&self) -> ImmutableViewportMetrics {
        ImmutableViewportMetrics::from(self)
    }
}

fn clamp_axis(origin: f32, visible: f32, page: f32) -> f32 {
    if page >= visible {
        origin.clamp(0.0, page - visible)
    } else {
        (page - visible) / 2.0
    }
}

/// Frozen snapshot of viewport state
///
/// Constructed once per publish and never mutated afterwards. `Copy`, so
/// every reader takes its own copy of the primitive fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImmutableViewportMetrics {
    /// Left edge of the visible rectangle, in page coordinates
    pub viewport_rect_left: f32,
    /// Top edge of the visible rectangle, in page coordinates
    pub viewport_rect_top: f32,
    /// Viewport width in device pixels
    pub viewport_width: f32,
    /// Viewport height in device pixels
    pub viewport_height: f32,
    /// Page width in page coordinates
    pub page_width: f32,
    /// Page height in page coordinates
    pub page_height: f32,
    /// Zoom factor at snapshot time
    pub zoom_factor: f32,
}

impl ImmutableViewportMetrics {
    /// The visible rectangle in page coordinates
    pub fn visible_rect(&self) -> FloatRect {
        FloatRect::new(
            self.viewport_rect_left,
            self.viewport_rect_top,
            self.viewport_width / self.zoom_factor,
            self.viewport_height / self.zoom_factor,
        )
    }

    /// Page size as a float size
    pub fn page_size(&self) -> FloatSize {
        FloatSize::new(self.page_width, self.page_height)
    }

    /// Thaw the snapshot back into a mutable viewport
    pub fn thaw(&self) -> ViewportMetrics {
        ViewportMetrics::new(
            FloatPoint::new(self.viewport_rect_left, self.viewport_rect_top),
            self.zoom_factor,
            FloatSize::new(self.viewport_width, self.viewport_height),
            self.page_size(),
        )
    }
}

impl From<&ViewportMetrics> for ImmutableViewportMetrics {
    fn from(metrics: &ViewportMetrics) -> Self {
        Self {
            viewport_rect_left: metrics.origin().x,
            viewport_rect_top: metrics.origin().y,
            viewport_width: metrics.viewport_size().width,
            viewport_height: metrics.viewport_size().height,
            page_width: metrics.page_size().width,
            page_height: metrics.page_size().height,
            zoom_factor: metrics.zoom_factor(),
        }
    }
}

/// Pan/zoom velocity in device pixels per second
///
/// Reported by the pan/zoom controller; used to bias the display port in
/// the direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VelocityVector {
    pub x: f32,
    pub y: f32,
}

impl VelocityVector {
    /// Create a new velocity vector
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Velocity magnitude
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Whether this velocity is too small to bias the display port
    pub fn is_negligible(&self, threshold: f32) -> bool {
        self.length() < threshold
    }
}
