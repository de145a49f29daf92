//! Root render-tree layer and render contexts

use driftview_metrics::{FloatPoint, FloatSize, ImmutableViewportMetrics};

/// Root node of the render tree
///
/// Tracks the document content's device-pixel placement and the pixel
/// density it was rendered at. The frame handshake updates it once per
/// frame from the compositor's visible rect.
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualLayer {
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
    resolution: f32,
}

impl VirtualLayer {
    /// Create a layer covering `width` x `height` device pixels at 1:1
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            left: 0,
            top: 0,
            right: width,
            bottom: height,
            resolution: 1.0,
        }
    }

    /// Update device-pixel placement and pixel density for this frame
    pub fn set_position_and_resolution(
        &mut self,
        left: i32,
        top: i32,
        right: i32,
        bottom: i32,
        resolution: f32,
    ) {
        self.left = left;
        self.top = top;
        self.right = right;
        self.bottom = bottom;
        self.resolution = resolution;
    }

    /// Current placement as (left, top, right, bottom)
    pub fn position(&self) -> (i32, i32, i32, i32) {
        (self.left, self.top, self.right, self.bottom)
    }

    /// Current pixel density
    pub fn resolution(&self) -> f32 {
        self.resolution
    }
}

/// Coordinate space a frame is drawn in
///
/// A page context positions page-space content under the current pan and
/// zoom; a screen context draws overlays in raw device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderContext {
    /// Offset applied to content, in device pixels
    pub offset: FloatPoint,
    /// Extent of the space, in its own units
    pub size: FloatSize,
    /// Scale from space units to device pixels
    pub zoom: f32,
}

impl RenderContext {
    /// Page-space context for a frame's viewport snapshot
    pub fn page(metrics: &ImmutableViewportMetrics) -> Self {
        Self {
            offset: FloatPoint::new(
                -metrics.viewport_rect_left * metrics.zoom_factor,
                -metrics.viewport_rect_top * metrics.zoom_factor,
            ),
            size: metrics.page_size(),
            zoom: metrics.zoom_factor,
        }
    }

    /// Screen-space context for a window of the given size
    pub fn screen(size: FloatSize) -> Self {
        Self {
            offset: FloatPoint::new(0.0, 0.0),
            size,
            zoom: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftview_metrics::ViewportMetrics;

    #[test]
    fn test_layer_placement_updates() {
        let mut layer = VirtualLayer::new(1080, 1920);
        assert_eq!(layer.position(), (0, 0, 1080, 1920));
        assert_eq!(layer.resolution(), 1.0);

        layer.set_position_and_resolution(10, 20, 1090, 1940, 2.0);
        assert_eq!(layer.position(), (10, 20, 1090, 1940));
        assert_eq!(layer.resolution(), 2.0);
    }

    #[test]
    fn test_page_context_offsets_by_scaled_origin() {
        let metrics = ViewportMetrics::new(
            FloatPoint::new(100.0, 50.0),
            2.0,
            FloatSize::new(320.0, 480.0),
            FloatSize::new(1000.0, 2000.0),
        )
        .freeze();

        let context = RenderContext::page(&metrics);
        assert_eq!(context.offset, FloatPoint::new(-200.0, -100.0));
        assert_eq!(context.size, FloatSize::new(1000.0, 2000.0));
        assert_eq!(context.zoom, 2.0);
    }

    #[test]
    fn test_screen_context_is_identity() {
        let context = RenderContext::screen(FloatSize::new(1080.0, 1920.0));
        assert_eq!(context.offset, FloatPoint::new(0.0, 0.0));
        assert_eq!(context.zoom, 1.0);
    }
}
