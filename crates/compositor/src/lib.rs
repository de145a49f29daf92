//! Driftview Compositor Library
//!
//! The synchronization hub between the three timelines of a zoomable,
//! pannable document view:
//!
//! 1. The UI thread, which owns pan/zoom input and mutates the
//!    authoritative viewport.
//! 2. The asynchronous layout peer, which negotiates viewport and page
//!    size changes through the message protocol.
//! 3. The renderer, which snapshots the viewport once per composited
//!    frame and must never block on the other two.
//!
//! The UI thread and the peer-message context share one short critical
//! section around the authoritative viewport. The renderer deliberately
//! bypasses that lock and reads a lock-free atomic snapshot instead; see
//! [`SharedViewportCell`] for the consistency trade-off.

mod controller;
mod host;
mod layer_client;
mod snapshot;

pub use controller::{ViewController, ViewportGuard};
pub use host::{CompositionHost, DisplaySurface, DrawListener, PanZoomHandle};
pub use layer_client::{LayerClient, PaintState};
pub use snapshot::SharedViewportCell;
