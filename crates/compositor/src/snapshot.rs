//! Lock-free viewport snapshot cell for the renderer
//!
//! The renderer reads the viewport once per composited frame and must not
//! contend with the UI thread or the peer-message handler. This cell
//! publishes each viewport field as an atomic f32 bit pattern with
//! relaxed ordering.
//!
//! The consistency trade-off is intentional and must not be "fixed" with
//! a lock: a read that interleaves with a publish may mix fields from two
//! publishes (a one-frame visual glitch), but every individual field is
//! always a whole, valid value and the read is never undefined behavior.

use std::sync::atomic::{AtomicU32, Ordering};

use driftview_metrics::ImmutableViewportMetrics;

/// Atomic per-field viewport snapshot, one writer and any readers
#[derive(Debug)]
pub struct SharedViewportCell {
    origin_x: AtomicU32,
    origin_y: AtomicU32,
    zoom_factor: AtomicU32,
    viewport_width: AtomicU32,
    viewport_height: AtomicU32,
    page_width: AtomicU32,
    page_height: AtomicU32,
}

impl SharedViewportCell {
    /// Create a cell holding the given initial snapshot
    pub fn new(initial: &ImmutableViewportMetrics) -> Self {
        let cell = Self {
            origin_x: AtomicU32::new(0),
            origin_y: AtomicU32::new(0),
            zoom_factor: AtomicU32::new(0),
            viewport_width: AtomicU32::new(0),
            viewport_height: AtomicU32::new(0),
            page_width: AtomicU32::new(0),
            page_height: AtomicU32::new(0),
        };
        cell.publish(initial);
        cell
    }

    /// Publish a new snapshot, field by field
    pub fn publish(&self, metrics: &ImmutableViewportMetrics) {
        self.origin_x
            .store(metrics.viewport_rect_left.to_bits(), Ordering::Relaxed);
        self.origin_y
            .store(metrics.viewport_rect_top.to_bits(), Ordering::Relaxed);
        self.zoom_factor
            .store(metrics.zoom_factor.to_bits(), Ordering::Relaxed);
        self.viewport_width
            .store(metrics.viewport_width.to_bits(), Ordering::Relaxed);
        self.viewport_height
            .store(metrics.viewport_height.to_bits(), Ordering::Relaxed);
        self.page_width
            .store(metrics.page_width.to_bits(), Ordering::Relaxed);
        self.page_height
            .store(metrics.page_height.to_bits(), Ordering::Relaxed);
    }

    /// Read the current snapshot without taking any lock
    ///
    /// May mix fields from two concurrent publishes; never tears a
    /// single field.
    pub fn load(&self) -> ImmutableViewportMetrics {
        ImmutableViewportMetrics {
            viewport_rect_left: f32::from_bits(self.origin_x.load(Ordering::Relaxed)),
            viewport_rect_top: f32::from_bits(self.origin_y.load(Ordering::Relaxed)),
            viewport_width: f32::from_bits(self.viewport_width.load(Ordering::Relaxed)),
            viewport_height: f32::from_bits(self.viewport_height.load(Ordering::Relaxed)),
            page_width: f32::from_bits(self.page_width.load(Ordering::Relaxed)),
            page_height: f32::from_bits(self.page_height.load(Ordering::Relaxed)),
            zoom_factor: f32::from_bits(self.zoom_factor.load(Ordering::Relaxed)),
        }
    }
}
