//! Layer renderer with lazily-initialized GPU program state
//!
//! The renderer's GPU program is created exactly once, on the first frame
//! the compositor produces, because the GL context does not exist before
//! then. Everything else here is cheap value assembly: render contexts in
//! and an opaque frame out.

use log::{debug, warn};

use driftview_metrics::{FloatSize, ImmutableViewportMetrics};

use crate::layer::RenderContext;

/// A renderable frame: the contexts the GPU pipeline draws with
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Page-space context (document content)
    pub page_context: RenderContext,
    /// Screen-space context (overlays, scroll bars)
    pub screen_context: RenderContext,
    /// Whether to paint unfinished-paint regions as a debug checkerboard
    pub show_checkerboard: bool,
}

/// Assembles render contexts and frames for the compositor
pub struct LayerRenderer {
    window_size: FloatSize,

    /// GPU program/shader state. Created once on the first frame; `Some`
    /// thereafter. In a full implementation this would hold compiled
    /// shaders, pipeline state objects, and uniform buffers.
    program: Option<DefaultProgram>,
}

#[derive(Debug)]
struct DefaultProgram {
    active: bool,
}

impl LayerRenderer {
    /// Create a renderer for a window of the given size
    pub fn new(window_size: FloatSize) -> Self {
        Self {
            window_size,
            program: None,
        }
    }

    /// Update the window size (call after a surface resize)
    pub fn set_window_size(&mut self, window_size: FloatSize) {
        self.window_size = window_size;
    }

    /// Build the default GPU program
    ///
    /// Idempotent: a second call is a no-op. Must be called from the
    /// renderer execution context once the GL surface exists.
    pub fn create_default_program(&mut self) {
        if self.program.is_some() {
            return;
        }
        debug!("creating default layer program");
        self.program = Some(DefaultProgram { active: false });
    }

    /// Whether the default program has been created
    pub fn is_program_created(&self) -> bool {
        self.program.is_some()
    }

    /// Bind the default program for drawing
    pub fn activate_default_program(&mut self) {
        match self.program.as_mut() {
            Some(program) => program.active = true,
            None => warn!("activate_default_program called before program creation"),
        }
    }

    /// Unbind the default program
    pub fn deactivate_default_program(&mut self) {
        if let Some(program) = self.program.as_mut() {
            program.active = false;
        }
    }

    /// Whether the default program is currently bound
    pub fn is_program_active(&self) -> bool {
        self.program.as_ref().is_some_and(|program| program.active)
    }

    /// Page-space render context for a frame's viewport snapshot
    pub fn create_page_context(&self, metrics: &ImmutableViewportMetrics) -> RenderContext {
        RenderContext::page(metrics)
    }

    /// Screen-space render context for the current window
    pub fn create_screen_context(&self) -> RenderContext {
        RenderContext::screen(self.window_size)
    }

    /// Assemble a renderable frame from the given contexts
    pub fn create_frame(
        &self,
        page_context: RenderContext,
        screen_context: RenderContext,
        show_checkerboard: bool,
    ) -> Frame {
        Frame {
            page_context,
            screen_context,
            show_checkerboard,
        }
    }
}
