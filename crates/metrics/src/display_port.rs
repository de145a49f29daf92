//! Display port prediction
//!
//! The display port is the region around the visible viewport that should
//! be kept rendered ahead of scrolling. The calculator sizes margins as a
//! fraction of the visible span and, when the pan/zoom controller reports
//! motion, shifts the margin budget toward the direction of travel so
//! more content is ready ahead of the user than behind them.

use serde::{Deserialize, Serialize};

use crate::geometry::FloatRect;
use crate::viewport::{ImmutableViewportMetrics, VelocityVector};

/// Predicted display port region, in page coordinates
///
/// Derived from a viewport snapshot and never mutated afterwards; a newer
/// computation supersedes it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayPortMetrics {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    /// Zoom factor the region was computed at
    pub resolution: f32,
}

impl DisplayPortMetrics {
    /// The region as a rectangle
    pub fn rect(&self) -> FloatRect {
        FloatRect::new(
            self.left,
            self.top,
            self.right - self.left,
            self.bottom - self.top,
        )
    }

    /// Check whether the region fully contains `rect`
    pub fn contains_rect(&self, rect: &FloatRect) -> bool {
        self.rect().contains(rect)
    }
}

/// Tuning parameters for display port prediction
#[derive(Debug, Clone, Copy)]
pub struct DisplayPortConfig {
    /// Total extra span per axis, as a fraction of the visible span.
    /// The extra is split between the two sides of the viewport.
    pub viewport_margin: f32,

    /// Seconds of travel to lead by when velocity is present. The lead
    /// distance is converted to a shift of the margin budget toward the
    /// direction of motion.
    pub velocity_bias: f32,

    /// Cap on the margin shift, as a fraction of the margin. Must stay
    /// below 0.5 so the trailing side always keeps some margin.
    pub max_bias: f32,

    /// Speeds below this (device pixels per second) are treated as no
    /// velocity and produce a symmetric margin.
    pub negligible_speed: f32,
}

impl Default for DisplayPortConfig {
    fn default() -> Self {
        Self {
            viewport_margin: 1.0,
            velocity_bias: 0.25,
            max_bias: 0.45,
            negligible_speed: 1.0,
        }
    }
}

/// Pure calculator from viewport snapshot to display port
///
/// `calculate` is deterministic, does no I/O, and mutates no shared
/// state. The region it produces always contains the clamped visible
/// rectangle and never extends past page bounds; when the page is smaller
/// than the viewport on an axis, the region spans the full page on that
/// axis.
#[derive(Debug, Clone, Default)]
pub struct DisplayPortCalculator {
    config: DisplayPortConfig,
}

impl DisplayPortCalculator {
    /// Create a calculator with the given tuning parameters
    pub fn new(config: DisplayPortConfig) -> Self {
        Self { config }
    }

    /// Create a calculator with default tuning
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Current tuning parameters
    pub fn config(&self) -> &DisplayPortConfig {
        &self.config
    }

    /// Compute the display port for a viewport snapshot
    ///
    /// The snapshot's origin is clamped to page bounds before expansion,
    /// so a transiently out-of-bounds viewport still yields a valid
    /// region. Velocity, when present and above the negligible-speed
    /// threshold, shifts the margin toward the direction of travel,
    /// monotonically in speed up to the configured cap.
    pub fn calculate(
        &self,
        metrics: &ImmutableViewportMetrics,
        velocity: Option<VelocityVector>,
    ) -> DisplayPortMetrics {
        let visible = metrics.thaw().clamped().visible_rect();
        let velocity = velocity.filter(|v| !v.is_negligible(self.config.negligible_speed));

        // Velocity arrives in device pixels/second; margins are in page
        // coordinates, so convert through the zoom factor.
        let zoom = metrics.zoom_factor;
        let (left, right) = self.expand_axis(
            visible.x,
            visible.width,
            metrics.page_width,
            velocity.map(|v| v.x / zoom),
        );
        let (top, bottom) = self.expand_axis(
            visible.y,
            visible.height,
            metrics.page_height,
            velocity.map(|v| v.y / zoom),
        );

        DisplayPortMetrics {
            left,
            top,
            right,
            bottom,
            resolution: zoom,
        }
    }

    /// Expand one axis of the visible span into a display port interval
    ///
    /// Returns `(start, end)` clamped to `[0, page]`.
    fn expand_axis(
        &self,
        start: f32,
        span: f32,
        page: f32,
        velocity: Option<f32>,
    ) -> (f32, f32) {
        // Page smaller than the visible span: the whole page is the port.
        if page <= span {
            return (0.0, page);
        }

        let margin = self.config.viewport_margin * span;
        let shift = match velocity {
            Some(v) => {
                let lead = v.abs() * self.config.velocity_bias;
                let fraction = (lead / margin).min(self.config.max_bias);
                fraction.copysign(v)
            }
            None => 0.0,
        };

        // The margin budget splits evenly, then shifts toward travel.
        let margin_after = margin * (0.5 + shift);
        let margin_before = margin - margin_after;

        let lo = (start - margin_before).max(0.0);
        let hi = (start + span + margin_after).min(page);
        (lo, hi)
    }
}
