//! Driftview Render Library
//!
//! Renderer-facing types for the per-frame handshake: the frame
//! transform, the root render-tree layer, page/screen render contexts,
//! and the lazily-initialized layer renderer that assembles them into a
//! renderable frame.

pub mod layer;
pub mod renderer;
pub mod transform;

pub use layer::{RenderContext, VirtualLayer};
pub use renderer::{Frame, LayerRenderer};
pub use transform::ViewTransform;
