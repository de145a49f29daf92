//! Driftview Metrics Library
//!
//! Value types for the document viewport and its predictive display port.
//!
//! A viewport is described by an origin (in page coordinates), a zoom
//! factor, a viewport size (in device pixels), and a page size (in page
//! coordinates). The display port is the region around the visible
//! viewport that should be kept rendered ahead of scrolling, predicted
//! from the current pan/zoom velocity.
//!
//! # Example
//!
//! ```
//! use driftview_metrics::{
//!     DisplayPortCalculator, FloatPoint, FloatSize, VelocityVector, ViewportMetrics,
//! };
//!
//! let viewport = ViewportMetrics::new(
//!     FloatPoint::new(0.0, 0.0),
//!     1.0,
//!     FloatSize::new(100.0, 100.0),
//!     FloatSize::new(500.0, 500.0),
//! );
//!
//! let calculator = DisplayPortCalculator::with_defaults();
//! let display_port =
//!     calculator.calculate(&viewport.freeze(), Some(VelocityVector::new(10.0, 0.0)));
//!
//! // Scrolling right, so the predictive margin leads to the right.
//! assert!(display_port.right - 100.0 > 0.0 - display_port.left);
//! ```

mod display_port;
mod geometry;
mod viewport;

pub use display_port::{DisplayPortCalculator, DisplayPortConfig, DisplayPortMetrics};
pub use geometry::{FloatPoint, FloatRect, FloatSize, IntSize};
pub use viewport::{ImmutableViewportMetrics, VelocityVector, ViewportMetrics};
