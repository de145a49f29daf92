//! Trait seams to the hub's external collaborators
//!
//! The pan/zoom recognizer, the native render loop, and the windowing
//! layer are independent components. The hub reaches them through these
//! traits, injected at construction time.

use driftview_metrics::{IntSize, VelocityVector};

/// Handle to the pan/zoom gesture recognizer and animation engine
pub trait PanZoomHandle: Send + Sync {
    /// Current fling/pan velocity, in device pixels per second
    fn velocity_vector(&self) -> VelocityVector;

    /// Discard any in-flight pan/zoom animation
    ///
    /// Called when the peer replaces the viewport outright (a document
    /// switch or a full viewport update); continuing a stale animation
    /// would fight the new state.
    fn abort_animation(&self);
}

/// Scheduling seam to the native render loop
pub trait CompositionHost: Send + Sync {
    /// Ask the host to composite a frame soon
    fn schedule_render(&self);

    /// Stop compositing until resumed
    fn pause_composition(&self);

    /// Resume compositing after a pause
    fn resume_composition(&self);
}

/// Source of current display and window dimensions
pub trait DisplaySurface: Send + Sync {
    /// Full device screen size, in device pixels
    fn screen_size(&self) -> IntSize;

    /// Drawable window size, in device pixels
    fn window_size(&self) -> IntSize;
}

/// Observer fired when a frame containing new peer content is drawn
///
/// Instrumentation hook for tests and tooling; production embedders
/// normally leave it unset.
pub trait DrawListener: Send + Sync {
    /// A frame with updated layer content was composited
    fn draw_finished(&self);
}
