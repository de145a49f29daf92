//! Authoritative viewport owner
//!
//! `ViewController` holds the single source of truth for the viewport
//! between document updates. All mutation happens under one short
//! critical section, shared by the UI thread and the peer-message
//! context, so neither ever observes a half-updated value. Every
//! committed mutation is republished to the lock-free snapshot cell the
//! renderer reads from.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use driftview_metrics::{FloatSize, ImmutableViewportMetrics, VelocityVector, ViewportMetrics};

use crate::host::PanZoomHandle;
use crate::snapshot::SharedViewportCell;

/// Owner of the authoritative viewport and the pan/zoom seam
pub struct ViewController {
    /// The critical section. Held only for metrics construction,
    /// mutation, and clamping; never across I/O.
    viewport: Mutex<ViewportMetrics>,

    /// Relaxed snapshot for the renderer's per-frame read
    cell: SharedViewportCell,

    pan_zoom: Box<dyn PanZoomHandle>,

    /// Whether a viewport adjustment should actually be forwarded to the
    /// peer on the next geometry change
    redraw_hint: AtomicBool,

    /// Debug overlay for unfinished-paint regions
    show_checkerboard: AtomicBool,
}

impl ViewController {
    /// Create a controller owning `initial` as the authoritative viewport
    pub fn new(initial: ViewportMetrics, pan_zoom: Box<dyn PanZoomHandle>) -> Self {
        let cell = SharedViewportCell::new(&initial.freeze());
        Self {
            viewport: Mutex::new(initial),
            cell,
            pan_zoom,
            redraw_hint: AtomicBool::new(true),
            show_checkerboard: AtomicBool::new(false),
        }
    }

    /// Enter the viewport critical section
    ///
    /// The returned guard dereferences to the authoritative
    /// `ViewportMetrics`; when it drops, the (possibly mutated) viewport
    /// is republished to the renderer's snapshot cell.
    pub fn lock_viewport(&self) -> ViewportGuard<'_> {
        ViewportGuard {
            guard: self.viewport.lock().unwrap(),
            cell: &self.cell,
        }
    }

    /// Strongly-consistent snapshot of the authoritative viewport
    ///
    /// Takes the critical section; for use from the UI-thread and
    /// peer-message contexts only.
    pub fn viewport_metrics(&self) -> ImmutableViewportMetrics {
        self.viewport.lock().unwrap().freeze()
    }

    /// Relaxed snapshot for the renderer's per-frame read
    ///
    /// Lock-free; may mix fields across two concurrent publishes. See
    /// [`SharedViewportCell`] for the trade-off.
    pub fn frame_metrics(&self) -> ImmutableViewportMetrics {
        self.cell.load()
    }

    /// Replace the viewport size (window resize)
    pub fn set_viewport_size(&self, size: FloatSize) {
        self.lock_viewport().set_viewport_size(size);
    }

    /// Current pan/zoom velocity from the gesture recognizer
    pub fn velocity_vector(&self) -> VelocityVector {
        self.pan_zoom.velocity_vector()
    }

    /// Discard any in-flight pan/zoom animation
    pub fn abort_pan_zoom_animation(&self) {
        self.pan_zoom.abort_animation();
    }

    /// Whether the UI layer wants viewport adjustments forwarded
    pub fn redraw_hint(&self) -> bool {
        self.redraw_hint.load(Ordering::Acquire)
    }

    /// Set the redraw hint
    pub fn set_redraw_hint(&self, hint: bool) {
        self.redraw_hint.store(hint, Ordering::Release);
    }

    /// Whether unfinished-paint regions should be drawn as a checkerboard
    pub fn show_checkerboard(&self) -> bool {
        self.show_checkerboard.load(Ordering::Acquire)
    }

    /// Toggle the unfinished-paint debug overlay
    pub fn set_show_checkerboard(&self, show: bool) {
        self.show_checkerboard.store(show, Ordering::Release);
    }
}

/// Guard over the viewport critical section
///
/// Republishes the viewport to the renderer snapshot cell on drop, so a
/// committed mutation is always visible to the next frame.
pub struct ViewportGuard<'a> {
    guard: MutexGuard<'a, ViewportMetrics>,
    cell: &'a SharedViewportCell,
}

impl Deref for ViewportGuard<'_> {
    type Target = ViewportMetrics;

    fn deref(&self) -> &ViewportMetrics {
        &self.guard
    }
}

impl DerefMut for ViewportGuard<'_> {
    fn deref_mut(&mut self) -> &mut ViewportMetrics {
        &mut self.guard
    }
}

impl Drop for ViewportGuard<'_> {
    fn drop(&mut self) {
        self.cell.publish(&self.guard.freeze());
    }
}
