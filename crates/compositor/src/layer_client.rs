//! The viewport synchronization hub
//!
//! `LayerClient` mediates every cross-thread interaction around the
//! viewport: it pushes UI-thread viewport changes to the layout peer,
//! applies viewport and page-size updates the peer sends back, and hands
//! the renderer an immutable frame-metrics snapshot once per composited
//! frame.
//!
//! Execution contexts:
//! - UI thread: `geometry_changed`, `viewport_size_changed`,
//!   `surface_changed` and the composition pause/resume/render calls.
//! - Peer-message context: `handle_message` and `take_response`, plus the
//!   document-lifecycle calls `set_first_paint_viewport` and
//!   `set_page_size`.
//! - Renderer context: `sync_viewport_info`, `create_frame`, and the
//!   program activation calls, invoked once per frame by the native
//!   render loop. These never take the viewport critical section.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use log::{debug, error, info};

use driftview_metrics::{
    DisplayPortCalculator, DisplayPortMetrics, FloatPoint, FloatSize, ImmutableViewportMetrics,
    IntSize, ViewportMetrics,
};
use driftview_protocol::{
    OutboundEvent, PageSizePayload, PeerLink, PeerMessage, ReturnSlot, ViewportSnapshot,
};
use driftview_render::{Frame, LayerRenderer, ViewTransform, VirtualLayer};

use crate::controller::ViewController;
use crate::host::{CompositionHost, DisplaySurface, DrawListener};

/// Renderer paint phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintState {
    /// A new document was displayed; no real content frame has been
    /// composited for it yet
    BeforeFirst = 0,
    /// At least one frame of peer content has been composited
    Painted = 1,
}

/// State shared by the UI-thread and peer-message contexts
struct PeerState {
    /// Display port most recently computed; mirrors what the peer was
    /// last told to pre-render
    display_port: DisplayPortMetrics,

    /// The viewport most recently sent to the peer. Peer-relative events
    /// must use this as their reference frame; see
    /// [`LayerClient::peer_viewport`].
    last_sent: Option<ViewportMetrics>,

    screen_size: IntSize,
    window_size: IntSize,
}

/// State owned by the renderer context
///
/// Behind a mutex for interior mutability, but uncontended by
/// construction: only per-frame calls touch it, except `surface_changed`,
/// which runs while composition is paused.
struct FrameState {
    /// Snapshot taken by the last `sync_viewport_info`; `create_frame`
    /// builds its contexts from this, not from the live viewport, which
    /// can change between the two calls
    metrics: ImmutableViewportMetrics,

    /// Pre-allocated transform mutated in place each frame
    transform: ViewTransform,

    /// Root render-tree node
    root_layer: VirtualLayer,

    renderer: LayerRenderer,
}

/// Synchronization hub between UI thread, layout peer, and renderer
pub struct LayerClient {
    controller: Arc<ViewController>,
    peer: Box<dyn PeerLink>,
    host: Box<dyn CompositionHost>,
    surface: Box<dyn DisplaySurface>,
    calculator: DisplayPortCalculator,

    peer_state: Mutex<PeerState>,
    frame_state: Mutex<FrameState>,

    /// At most one pending display-port response for the peer
    return_slot: ReturnSlot<DisplayPortMetrics>,

    paint_state: AtomicU8,

    draw_listener: Option<Box<dyn DrawListener>>,
}

impl LayerClient {
    /// Create a hub around the given controller and collaborator seams
    pub fn new(
        controller: Arc<ViewController>,
        peer: Box<dyn PeerLink>,
        host: Box<dyn CompositionHost>,
        surface: Box<dyn DisplaySurface>,
    ) -> Self {
        let calculator = DisplayPortCalculator::with_defaults();
        let metrics = controller.frame_metrics();
        let display_port = calculator.calculate(&metrics, None);

        let window = surface.window_size();
        let frame_state = FrameState {
            metrics,
            transform: ViewTransform::default(),
            root_layer: VirtualLayer::new(window.width, window.height),
            renderer: LayerRenderer::new(FloatSize::new(
                window.width as f32,
                window.height as f32,
            )),
        };

        Self {
            controller,
            peer,
            host,
            surface,
            calculator,
            peer_state: Mutex::new(PeerState {
                display_port,
                last_sent: None,
                // Dummy values; always written before the first read
                // because attach() forces a resize notification.
                screen_size: IntSize::default(),
                window_size: IntSize::default(),
            }),
            frame_state: Mutex::new(frame_state),
            return_slot: ReturnSlot::new(),
            paint_state: AtomicU8::new(PaintState::BeforeFirst as u8),
            draw_listener: None,
        }
    }

    /// Replace the display port calculator tuning
    pub fn with_calculator(mut self, calculator: DisplayPortCalculator) -> Self {
        self.calculator = calculator;
        self
    }

    /// Register a draw-finished observer (instrumentation hook)
    pub fn with_draw_listener(mut self, listener: Box<dyn DrawListener>) -> Self {
        self.draw_listener = Some(listener);
        self
    }

    /// Finish wiring: report the initial window/screen size to the peer
    pub fn attach(&self) {
        self.send_resize_event_if_necessary(true);
    }

    /// Inform the peer that the screen or window size changed
    ///
    /// Idempotent: with `force` false and unchanged dimensions this is a
    /// no-op producing no peer traffic.
    fn send_resize_event_if_necessary(&self, force: bool) {
        let new_screen = self.surface.screen_size();
        let new_window = self.surface.window_size();

        let (screen_changed, window_changed);
        {
            let mut state = self.peer_state.lock().unwrap();
            screen_changed = state.screen_size != new_screen;
            window_changed = state.window_size != new_window;
            if !force && !screen_changed && !window_changed {
                return;
            }
            state.screen_size = new_screen;
            state.window_size = new_window;
        }

        if screen_changed {
            debug!(
                "screen size changed to {}x{}",
                new_screen.width, new_screen.height
            );
        }
        if window_changed {
            debug!(
                "window size changed to {}x{}",
                new_window.width, new_window.height
            );
        }

        self.peer.send(OutboundEvent::SizeChanged {
            window_width: new_window.width,
            window_height: new_window.height,
            screen_width: new_screen.width,
            screen_height: new_screen.height,
        });
    }

    /// The viewport size changed; the peer re-flows and replies with a
    /// viewport update of its own, so only a forced resize goes out here
    pub fn viewport_size_changed(&self) {
        self.send_resize_event_if_necessary(true);
    }

    /// UI-thread geometry notification
    ///
    /// Checks for screen/window size changes, then forwards a viewport
    /// adjustment only when the UI layer signals a redraw is warranted.
    pub fn geometry_changed(&self) {
        self.send_resize_event_if_necessary(false);
        if self.controller.redraw_hint() {
            self.adjust_viewport();
        }
    }

    /// Clamp the live viewport, predict a display port from the current
    /// velocity, and send both to the peer
    fn adjust_viewport(&self) {
        let clamped = self.controller.lock_viewport().clamped();
        let velocity = self.controller.velocity_vector();
        let display_port = self.calculator.calculate(&clamped.freeze(), Some(velocity));

        self.peer.send(OutboundEvent::Viewport {
            viewport: (&clamped).into(),
            display_port,
        });

        let mut state = self.peer_state.lock().unwrap();
        state.display_port = display_port;
        state.last_sent = Some(clamped);
    }

    /// Handle one decoded-from-the-wire peer request
    ///
    /// Malformed or out-of-contract payloads are logged and dropped; no
    /// response is produced for them and the return slot keeps whatever
    /// it previously held.
    pub fn handle_message(&self, event: &str, payload: &str) {
        match PeerMessage::decode(event, payload) {
            Ok(PeerMessage::ViewportUpdate(snapshot)) => self.apply_viewport_update(snapshot),
            Ok(PeerMessage::PageSizeUpdate(payload)) => self.apply_page_size_update(payload),
            Ok(PeerMessage::DisplayPortQuery(snapshot)) => self.answer_display_port_query(snapshot),
            Ok(PeerMessage::CheckerboardToggle(value)) => {
                self.controller.set_show_checkerboard(value);
                info!("showing checkerboard: {value}");
            }
            Err(err) => error!("dropping peer message \"{event}\": {err}"),
        }
    }

    /// The peer moved or re-zoomed the viewport; adopt it wholesale
    fn apply_viewport_update(&self, snapshot: ViewportSnapshot) {
        let applied = {
            let mut viewport = self.controller.lock_viewport();
            let size = viewport.viewport_size();
            let mut incoming = snapshot.to_metrics(size);
            // Viewport dimensions are never peer-controlled.
            incoming.set_viewport_size(size);
            *viewport = incoming.clone();
            self.controller.abort_pan_zoom_animation();
            incoming
        };
        self.finish_peer_update(applied);
    }

    /// Layout re-flow changed the page size; merge it in
    fn apply_page_size_update(&self, payload: PageSizePayload) {
        let applied = {
            let mut viewport = self.controller.lock_viewport();
            viewport.set_page_size(payload.size());
            viewport.clone()
        };
        self.finish_peer_update(applied);
    }

    fn finish_peer_update(&self, applied: ViewportMetrics) {
        let display_port = self.calculator.calculate(&applied.freeze(), None);
        {
            let mut state = self.peer_state.lock().unwrap();
            state.display_port = display_port;
            state.last_sent = Some(applied);
        }
        self.return_slot.put(display_port);
    }

    /// Pure display-port computation for a scratch viewport; nothing is
    /// applied to authoritative state
    fn answer_display_port_query(&self, snapshot: ViewportSnapshot) {
        let current = self.controller.viewport_metrics();
        let scratch = snapshot.to_metrics(FloatSize::new(
            current.viewport_width,
            current.viewport_height,
        ));
        self.return_slot
            .put(self.calculator.calculate(&scratch.freeze(), None));
    }

    /// Consume the pending display-port response, if any
    ///
    /// Each peer request that computes a display port overwrites the
    /// slot; a stale result is simply superseded. Callers see either no
    /// pending result or the most recent one, never a history.
    pub fn take_response(&self) -> Option<DisplayPortMetrics> {
        self.return_slot.take()
    }

    /// The peer is about to composite a frame for a different document
    ///
    /// The viewport held here is no longer valid and is replaced with the
    /// peer-provided one. Any in-flight pan/zoom animation is aborted and
    /// the paint state rewinds to awaiting the first real paint. Always
    /// called before `sync_viewport_info` for the frame it affects.
    pub fn set_first_paint_viewport(
        &self,
        offset_x: f32,
        offset_y: f32,
        zoom: f32,
        page_width: f32,
        page_height: f32,
    ) {
        if zoom <= 0.0 || page_width <= 0.0 || page_height <= 0.0 {
            error!(
                "ignoring first-paint viewport with non-positive dimensions \
                 (zoom={zoom}, page={page_width}x{page_height})"
            );
            return;
        }

        {
            let mut viewport = self.controller.lock_viewport();
            viewport.set_origin(FloatPoint::new(offset_x, offset_y));
            viewport.set_zoom_factor(zoom);
            viewport.set_page_size(FloatSize::new(page_width, page_height));
            self.controller.abort_pan_zoom_animation();
        }

        self.paint_state
            .store(PaintState::BeforeFirst as u8, Ordering::Release);
        debug!(
            "first paint at ({offset_x}, {offset_y}), zoom {zoom}, page {page_width}x{page_height}"
        );
    }

    /// Layout re-flow changed the page size without a document switch
    ///
    /// The peer reports dimensions at the zoom it rendered at, which may
    /// have diverged from the zoom displayed here, so the dimensions are
    /// rescaled by `ui_zoom / peer_zoom`. If the two zooms stay diverged
    /// across repeated updates this correction compounds; see DESIGN.md.
    /// No message goes to the peer: the next viewport adjustment carries
    /// the refreshed display port.
    pub fn set_page_size(&self, zoom: f32, page_width: f32, page_height: f32) {
        if zoom <= 0.0 || page_width <= 0.0 || page_height <= 0.0 {
            error!(
                "ignoring page size with non-positive dimensions \
                 (zoom={zoom}, page={page_width}x{page_height})"
            );
            return;
        }

        let mut viewport = self.controller.lock_viewport();
        let ui_zoom = viewport.zoom_factor();
        viewport.set_page_size(FloatSize::new(
            page_width * ui_zoom / zoom,
            page_height * ui_zoom / zoom,
        ));
    }

    /// Per-frame handshake: snapshot the viewport and return this
    /// frame's pan/zoom transform
    ///
    /// Called once per composited frame from the renderer context. Takes
    /// no viewport lock and allocates nothing: the viewport read is the
    /// relaxed snapshot cell, and the transform is a pre-allocated value
    /// overwritten in place. A read torn across a concurrent publish
    /// costs one glitched frame at worst.
    pub fn sync_viewport_info(
        &self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        resolution: f32,
        layers_updated: bool,
    ) -> ViewTransform {
        let metrics = self.controller.frame_metrics();

        let transform = {
            let mut frame = self.frame_state.lock().unwrap();
            frame.metrics = metrics;
            frame.transform.set(
                metrics.viewport_rect_left,
                metrics.viewport_rect_top,
                metrics.zoom_factor,
            );
            frame
                .root_layer
                .set_position_and_resolution(x, y, x + width, y + height, resolution);
            frame.transform
        };

        if layers_updated {
            self.paint_state
                .store(PaintState::Painted as u8, Ordering::Release);
            if let Some(listener) = &self.draw_listener {
                listener.draw_finished();
            }
        }

        transform
    }

    /// Build this frame's renderable state
    ///
    /// Creates the GPU program on the first call (the GL context does not
    /// exist before the first frame), then assembles page and screen
    /// contexts from the snapshot taken by `sync_viewport_info`.
    pub fn create_frame(&self) -> Frame {
        let mut frame = self.frame_state.lock().unwrap();
        if !frame.renderer.is_program_created() {
            frame.renderer.create_default_program();
        }

        let page_context = frame.renderer.create_page_context(&frame.metrics);
        let screen_context = frame.renderer.create_screen_context();
        frame.renderer.create_frame(
            page_context,
            screen_context,
            self.controller.show_checkerboard(),
        )
    }

    /// Bind the default GPU program for this frame
    pub fn activate_program(&self) {
        self.frame_state
            .lock()
            .unwrap()
            .renderer
            .activate_default_program();
    }

    /// Unbind the default GPU program
    pub fn deactivate_program(&self) {
        self.frame_state
            .lock()
            .unwrap()
            .renderer
            .deactivate_default_program();
    }

    /// Windowing layer asked for a frame
    pub fn render_requested(&self) {
        self.host.schedule_render();
    }

    /// Windowing layer asked composition to stop
    pub fn composition_pause_requested(&self) {
        self.host.pause_composition();
    }

    /// Windowing layer asked composition to resume
    pub fn composition_resume_requested(&self) {
        self.host.resume_composition();
    }

    /// The drawable surface was resized
    ///
    /// Ordering is mandatory: pause composition, apply the new viewport
    /// size, resume composition, request a render. Any other order risks
    /// compositing a frame against a stale surface size.
    pub fn surface_changed(&self, width: i32, height: i32) {
        self.composition_pause_requested();

        self.controller
            .set_viewport_size(FloatSize::new(width as f32, height as f32));
        self.frame_state
            .lock()
            .unwrap()
            .renderer
            .set_window_size(FloatSize::new(width as f32, height as f32));
        self.viewport_size_changed();

        self.composition_resume_requested();
        self.render_requested();
    }

    /// Display port most recently computed
    pub fn display_port(&self) -> DisplayPortMetrics {
        self.peer_state.lock().unwrap().display_port
    }

    /// The last viewport sent to the peer
    ///
    /// Further peer-relative events must be expressed relative to this
    /// viewport and sent from the same single-threaded context as the
    /// viewport adjustments. The peer processes messages in FIFO order,
    /// which is what keeps relative offsets correct even though the peer
    /// runs on its own timeline. When the peer updates its viewport
    /// independently, this value is refreshed synchronously with that
    /// update.
    pub fn peer_viewport(&self) -> Option<ViewportMetrics> {
        self.peer_state.lock().unwrap().last_sent.clone()
    }

    /// Current renderer paint phase
    pub fn paint_state(&self) -> PaintState {
        if self.paint_state.load(Ordering::Acquire) == PaintState::BeforeFirst as u8 {
            PaintState::BeforeFirst
        } else {
            PaintState::Painted
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::PanZoomHandle;
    use driftview_metrics::VelocityVector;
    use driftview_protocol::event;
    use std::sync::atomic::AtomicUsize;

    struct RecordingPeer {
        events: Arc<Mutex<Vec<OutboundEvent>>>,
    }

    impl PeerLink for RecordingPeer {
        fn send(&self, event: OutboundEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    struct RecordingHost {
        calls: Arc<Mutex<Vec<&'static str>>>,
    }

    impl CompositionHost for RecordingHost {
        fn schedule_render(&self) {
            self.calls.lock().unwrap().push("render");
        }
        fn pause_composition(&self) {
            self.calls.lock().unwrap().push("pause");
        }
        fn resume_composition(&self) {
            self.calls.lock().unwrap().push("resume");
        }
    }

    struct FakeSurface {
        screen: Arc<Mutex<IntSize>>,
        window: Arc<Mutex<IntSize>>,
    }

    impl DisplaySurface for FakeSurface {
        fn screen_size(&self) -> IntSize {
            *self.screen.lock().unwrap()
        }
        fn window_size(&self) -> IntSize {
            *self.window.lock().unwrap()
        }
    }

    struct FakePanZoom {
        velocity: Arc<Mutex<VelocityVector>>,
        aborts: Arc<AtomicUsize>,
    }

    impl PanZoomHandle for FakePanZoom {
        fn velocity_vector(&self) -> VelocityVector {
            *self.velocity.lock().unwrap()
        }
        fn abort_animation(&self) {
            self.aborts.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct CountingListener {
        draws: Arc<AtomicUsize>,
    }

    impl DrawListener for CountingListener {
        fn draw_finished(&self) {
            self.draws.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Fixture {
        client: LayerClient,
        controller: Arc<ViewController>,
        events: Arc<Mutex<Vec<OutboundEvent>>>,
        host_calls: Arc<Mutex<Vec<&'static str>>>,
        velocity: Arc<Mutex<VelocityVector>>,
        aborts: Arc<AtomicUsize>,
        window: Arc<Mutex<IntSize>>,
        draws: Arc<AtomicUsize>,
    }

    impl Fixture {
        fn sent_events(&self) -> Vec<OutboundEvent> {
            self.events.lock().unwrap().clone()
        }

        fn clear_events(&self) {
            self.events.lock().unwrap().clear();
        }
    }

    /// Viewport 100x100 at zoom 1 over a 500x500 page, 1080x1920 window
    fn fixture() -> Fixture {
        let events = Arc::new(Mutex::new(Vec::new()));
        let host_calls = Arc::new(Mutex::new(Vec::new()));
        let velocity = Arc::new(Mutex::new(VelocityVector::new(0.0, 0.0)));
        let aborts = Arc::new(AtomicUsize::new(0));
        let screen = Arc::new(Mutex::new(IntSize::new(1080, 2280)));
        let window = Arc::new(Mutex::new(IntSize::new(1080, 1920)));
        let draws = Arc::new(AtomicUsize::new(0));

        let controller = Arc::new(ViewController::new(
            ViewportMetrics::new(
                FloatPoint::new(0.0, 0.0),
                1.0,
                FloatSize::new(100.0, 100.0),
                FloatSize::new(500.0, 500.0),
            ),
            Box::new(FakePanZoom {
                velocity: Arc::clone(&velocity),
                aborts: Arc::clone(&aborts),
            }),
        ));

        let client = LayerClient::new(
            Arc::clone(&controller),
            Box::new(RecordingPeer {
                events: Arc::clone(&events),
            }),
            Box::new(RecordingHost {
                calls: Arc::clone(&host_calls),
            }),
            Box::new(FakeSurface {
                screen: Arc::clone(&screen),
                window: Arc::clone(&window),
            }),
        )
        .with_draw_listener(Box::new(CountingListener {
            draws: Arc::clone(&draws),
        }));

        Fixture {
            client,
            controller,
            events,
            host_calls,
            velocity,
            aborts,
            window,
            draws,
        }
    }

    #[test]
    fn test_attach_reports_initial_sizes() {
        let fixture = fixture();
        fixture.client.attach();

        let events = fixture.sent_events();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0],
            OutboundEvent::SizeChanged {
                window_width: 1080,
                window_height: 1920,
                screen_width: 1080,
                screen_height: 2280,
            }
        );
    }

    #[test]
    fn test_repeated_resize_notification_is_suppressed() {
        let fixture = fixture();
        fixture.client.attach();
        fixture.controller.set_redraw_hint(false);
        fixture.clear_events();

        // Same dimensions, not forced: no peer traffic.
        fixture.client.geometry_changed();
        fixture.client.geometry_changed();
        assert!(fixture.sent_events().is_empty());

        // Window actually changes: exactly one notification.
        *fixture.window.lock().unwrap() = IntSize::new(1080, 1600);
        fixture.client.geometry_changed();
        fixture.client.geometry_changed();
        assert_eq!(fixture.sent_events().len(), 1);
    }

    #[test]
    fn test_geometry_changed_sends_clamped_viewport_and_display_port() {
        let fixture = fixture();
        fixture.client.attach();
        fixture.clear_events();

        // Live viewport dragged past the right page edge mid-gesture.
        fixture
            .controller
            .lock_viewport()
            .set_origin(FloatPoint::new(600.0, 0.0));
        *fixture.velocity.lock().unwrap() = VelocityVector::new(10.0, 0.0);

        fixture.client.geometry_changed();

        let events = fixture.sent_events();
        assert_eq!(events.len(), 1);
        let OutboundEvent::Viewport {
            viewport,
            display_port,
        } = &events[0]
        else {
            panic!("expected a viewport event");
        };

        // Clamped to [0, page - visible] on x.
        assert_eq!(viewport.x, 400.0);
        assert_eq!(viewport.y, 0.0);

        // Display port is within page bounds and covers the visible rect.
        assert!(display_port.left >= 0.0 && display_port.right <= 500.0);
        assert!(display_port.left <= 400.0 && display_port.right >= 500.0);

        // Last-sent viewport becomes the peer-relative reference frame.
        let last = fixture.client.peer_viewport().unwrap();
        assert_eq!(last.origin(), FloatPoint::new(400.0, 0.0));
    }

    #[test]
    fn test_redraw_hint_gates_viewport_adjustment() {
        let fixture = fixture();
        fixture.client.attach();
        fixture.clear_events();

        fixture.controller.set_redraw_hint(false);
        fixture.client.geometry_changed();
        assert!(fixture.sent_events().is_empty());
        assert!(fixture.client.peer_viewport().is_none());
    }

    #[test]
    fn test_viewport_update_replaces_but_keeps_local_size() {
        let fixture = fixture();
        fixture.client.handle_message(
            event::VIEWPORT_UPDATE,
            r#"{"x":50.0,"y":60.0,"zoom":2.0,"pageWidth":1000.0,"pageHeight":1000.0,
                "viewportWidth":9999.0,"viewportHeight":9999.0}"#,
        );

        let metrics = fixture.controller.viewport_metrics();
        assert_eq!(metrics.viewport_rect_left, 50.0);
        assert_eq!(metrics.viewport_rect_top, 60.0);
        assert_eq!(metrics.zoom_factor, 2.0);
        assert_eq!(metrics.page_width, 1000.0);
        // The peer never controls viewport dimensions.
        assert_eq!(metrics.viewport_width, 100.0);
        assert_eq!(metrics.viewport_height, 100.0);

        // The update aborted any in-flight pan/zoom animation.
        assert_eq!(fixture.aborts.load(Ordering::SeqCst), 1);

        // One display-port response is pending, consumed exactly once.
        let response = fixture.client.take_response();
        assert!(response.is_some());
        assert_eq!(response.unwrap().resolution, 2.0);
        assert_eq!(fixture.client.take_response(), None);
    }

    #[test]
    fn test_page_size_update_is_idempotent() {
        let fixture = fixture();
        let payload = r#"{"pageWidth":800.0,"pageHeight":900.0}"#;

        fixture.client.handle_message(event::PAGE_SIZE_UPDATE, payload);
        let once = fixture.controller.viewport_metrics();

        fixture.client.handle_message(event::PAGE_SIZE_UPDATE, payload);
        let twice = fixture.controller.viewport_metrics();

        assert_eq!(once, twice);
        assert_eq!(twice.page_width, 800.0);
        assert_eq!(twice.page_height, 900.0);
        // Origin and zoom are untouched by a page-size merge.
        assert_eq!(twice.viewport_rect_left, 0.0);
        assert_eq!(twice.zoom_factor, 1.0);
    }

    #[test]
    fn test_stale_query_overwrites_slot_but_not_viewport() {
        let fixture = fixture();
        fixture.client.handle_message(
            event::VIEWPORT_UPDATE,
            r#"{"x":50.0,"y":60.0,"zoom":2.0,"pageWidth":1000.0,"pageHeight":1000.0}"#,
        );
        let after_update = fixture.controller.viewport_metrics();

        // A stale query arrives before the update's response was read.
        fixture.client.handle_message(
            event::DISPLAY_PORT_QUERY,
            r#"{"x":0.0,"y":0.0,"zoom":1.0,"pageWidth":500.0,"pageHeight":500.0}"#,
        );

        // Authoritative viewport untouched by the scratch computation.
        assert_eq!(fixture.controller.viewport_metrics(), after_update);

        // The slot holds only the query's result (last write wins).
        let response = fixture.client.take_response().unwrap();
        assert_eq!(response.resolution, 1.0);
        assert_eq!(fixture.client.take_response(), None);
    }

    #[test]
    fn test_checkerboard_toggle_reaches_frames() {
        let fixture = fixture();
        fixture
            .client
            .handle_message(event::CHECKERBOARD_TOGGLE, r#"{"value":true}"#);

        fixture.client.sync_viewport_info(0, 0, 100, 100, 1.0, false);
        let frame = fixture.client.create_frame();
        assert!(frame.show_checkerboard);

        fixture
            .client
            .handle_message(event::CHECKERBOARD_TOGGLE, r#"{"value":false}"#);
        assert!(!fixture.client.create_frame().show_checkerboard);
    }

    #[test]
    fn test_malformed_message_is_dropped() {
        let fixture = fixture();

        // Prime the slot with a valid response.
        fixture.client.handle_message(
            event::VIEWPORT_UPDATE,
            r#"{"x":0.0,"y":0.0,"zoom":1.0,"pageWidth":500.0,"pageHeight":500.0}"#,
        );
        let before = fixture.controller.viewport_metrics();

        fixture
            .client
            .handle_message(event::VIEWPORT_UPDATE, "not json at all");
        fixture.client.handle_message(
            event::VIEWPORT_UPDATE,
            r#"{"x":0.0,"y":0.0,"zoom":-1.0,"pageWidth":500.0,"pageHeight":500.0}"#,
        );
        fixture.client.handle_message("no-such-event", "{}");

        // Authoritative viewport untouched, prior response still pending.
        assert_eq!(fixture.controller.viewport_metrics(), before);
        assert!(fixture.client.take_response().is_some());
        assert_eq!(fixture.client.take_response(), None);
    }

    #[test]
    fn test_first_paint_then_begin_frame_reflects_new_viewport() {
        let fixture = fixture();
        fixture
            .client
            .set_first_paint_viewport(50.0, 50.0, 2.0, 1000.0, 2000.0);

        assert_eq!(fixture.client.paint_state(), PaintState::BeforeFirst);
        assert_eq!(fixture.aborts.load(Ordering::SeqCst), 1);

        let transform = fixture.client.sync_viewport_info(0, 0, 1080, 1920, 2.0, false);
        assert_eq!(transform.x, 50.0);
        assert_eq!(transform.y, 50.0);
        assert_eq!(transform.scale, 2.0);

        // No content frame yet, so the paint state has not advanced.
        assert_eq!(fixture.client.paint_state(), PaintState::BeforeFirst);
    }

    #[test]
    fn test_first_paint_rejects_non_positive_dimensions() {
        let fixture = fixture();
        let before = fixture.controller.viewport_metrics();

        fixture.client.set_first_paint_viewport(0.0, 0.0, 0.0, 1000.0, 2000.0);
        fixture.client.set_first_paint_viewport(0.0, 0.0, 1.0, -5.0, 2000.0);

        assert_eq!(fixture.controller.viewport_metrics(), before);
        assert_eq!(fixture.aborts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_page_size_rescales_for_zoom_divergence() {
        let fixture = fixture();
        fixture.controller.lock_viewport().set_zoom_factor(2.0);

        // Peer rendered at zoom 1, this side displays at zoom 2.
        fixture.client.set_page_size(1.0, 1000.0, 2000.0);

        let metrics = fixture.controller.viewport_metrics();
        assert_eq!(metrics.page_width, 2000.0);
        assert_eq!(metrics.page_height, 4000.0);

        // No peer traffic from a page-size change.
        assert!(fixture.sent_events().is_empty());
    }

    #[test]
    fn test_surface_changed_ordering() {
        let fixture = fixture();
        fixture.client.surface_changed(200, 400);

        assert_eq!(
            *fixture.host_calls.lock().unwrap(),
            vec!["pause", "resume", "render"]
        );

        let metrics = fixture.controller.viewport_metrics();
        assert_eq!(metrics.viewport_width, 200.0);
        assert_eq!(metrics.viewport_height, 400.0);

        // The forced resize notification went out between pause and resume.
        assert!(matches!(
            fixture.sent_events().as_slice(),
            [OutboundEvent::SizeChanged { .. }]
        ));
    }

    #[test]
    fn test_draw_listener_fires_only_for_updated_layers() {
        let fixture = fixture();

        fixture.client.sync_viewport_info(0, 0, 100, 100, 1.0, false);
        assert_eq!(fixture.draws.load(Ordering::SeqCst), 0);

        fixture.client.sync_viewport_info(0, 0, 100, 100, 1.0, true);
        assert_eq!(fixture.draws.load(Ordering::SeqCst), 1);
        assert_eq!(fixture.client.paint_state(), PaintState::Painted);
    }

    #[test]
    fn test_create_frame_uses_frame_snapshot_not_live_viewport() {
        let fixture = fixture();
        fixture.client.sync_viewport_info(0, 0, 100, 100, 1.0, false);

        // The live viewport moves after the handshake snapshot.
        fixture
            .controller
            .lock_viewport()
            .set_origin(FloatPoint::new(250.0, 250.0));

        let frame = fixture.client.create_frame();
        // Page context still reflects the snapshot at origin (0, 0).
        assert_eq!(frame.page_context.offset, FloatPoint::new(0.0, 0.0));
        assert_eq!(frame.page_context.zoom, 1.0);
    }

    #[test]
    fn test_frame_handshake_does_not_block_on_viewport_lock() {
        let fixture = fixture();
        let guard = fixture.controller.lock_viewport();

        // Renderer-context calls must complete while the critical
        // section is held by another context.
        let transform = fixture.client.sync_viewport_info(0, 0, 100, 100, 1.0, false);
        assert_eq!(transform.scale, 1.0);
        let _ = fixture.client.create_frame();

        drop(guard);
    }

    #[test]
    fn test_concurrent_gestures_and_frames() {
        let fixture = fixture();
        let client = Arc::new(fixture.client);
        let controller = fixture.controller;

        let ui = {
            let controller = Arc::clone(&controller);
            std::thread::spawn(move || {
                for i in 0..2_000 {
                    controller
                        .lock_viewport()
                        .set_origin(FloatPoint::new(i as f32 % 400.0, 0.0));
                }
            })
        };

        let renderer = {
            let client = Arc::clone(&client);
            std::thread::spawn(move || {
                for _ in 0..2_000 {
                    let transform = client.sync_viewport_info(0, 0, 100, 100, 1.0, false);
                    assert!(transform.x >= 0.0 && transform.x < 400.0);
                    assert_eq!(transform.scale, 1.0);
                }
            })
        };

        ui.join().unwrap();
        renderer.join().unwrap();
    }
}
