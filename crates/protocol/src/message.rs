//! Peer message decoding and outbound event encoding
//!
//! Inbound messages arrive as an event name plus a JSON payload and are
//! decoded into typed values here. Validation happens at this boundary:
//! zoom and page dimensions must be positive and finite before a message
//! is allowed to reach the synchronization hub.

use serde::{Deserialize, Serialize};

use driftview_metrics::{
    DisplayPortMetrics, FloatPoint, FloatSize, ImmutableViewportMetrics, ViewportMetrics,
};

/// Event names for the peer messaging protocol
pub mod event {
    /// Full viewport snapshot; replaces the authoritative viewport
    pub const VIEWPORT_UPDATE: &str = "viewport-update";
    /// Page size only; merged into the current authoritative viewport
    pub const PAGE_SIZE_UPDATE: &str = "page-size-update";
    /// Scratch snapshot; display port computed but nothing applied
    pub const DISPLAY_PORT_QUERY: &str = "display-port-query";
    /// Debug flag for showing unfinished-paint regions
    pub const CHECKERBOARD_TOGGLE: &str = "checkerboard-toggle";
}

/// Errors produced at the message decode/validate boundary
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The event name is not part of the protocol
    #[error("unknown peer event \"{0}\"")]
    UnknownEvent(String),

    /// The payload is not valid JSON for the event's schema
    #[error("malformed payload for \"{event}\": {source}")]
    MalformedPayload {
        event: String,
        #[source]
        source: serde_json::Error,
    },

    /// A field violates the protocol contract (e.g. non-positive zoom)
    #[error("\"{event}\": field {field} must be positive and finite, got {value}")]
    InvalidField {
        event: String,
        field: &'static str,
        value: f32,
    },
}

/// Viewport snapshot as carried on the wire
///
/// Origin and page size are in page coordinates; the viewport dimensions
/// are optional because the peer never controls them; they are only
/// meaningful for `display-port-query`, where the computation is scratch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportSnapshot {
    pub x: f32,
    pub y: f32,
    pub zoom: f32,
    pub page_width: f32,
    pub page_height: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport_width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport_height: Option<f32>,
}

impl ViewportSnapshot {
    fn validate(&self, event: &str) -> Result<(), ProtocolError> {
        check_positive(event, "zoom", self.zoom)?;
        check_positive(event, "pageWidth", self.page_width)?;
        check_positive(event, "pageHeight", self.page_height)?;
        if let Some(width) = self.viewport_width {
            check_positive(event, "viewportWidth", width)?;
        }
        if let Some(height) = self.viewport_height {
            check_positive(event, "viewportHeight", height)?;
        }
        Ok(())
    }

    /// Build viewport metrics from this snapshot, taking the viewport
    /// size from `fallback_size` when the wire omitted it
    pub fn to_metrics(&self, fallback_size: FloatSize) -> ViewportMetrics {
        let size = FloatSize::new(
            self.viewport_width.unwrap_or(fallback_size.width),
            self.viewport_height.unwrap_or(fallback_size.height),
        );
        ViewportMetrics::new(
            FloatPoint::new(self.x, self.y),
            self.zoom,
            size,
            FloatSize::new(self.page_width, self.page_height),
        )
    }
}

impl From<&ViewportMetrics> for ViewportSnapshot {
    fn from(metrics: &ViewportMetrics) -> Self {
        Self {
            x: metrics.origin().x,
            y: metrics.origin().y,
            zoom: metrics.zoom_factor(),
            page_width: metrics.page_size().width,
            page_height: metrics.page_size().height,
            viewport_width: Some(metrics.viewport_size().width),
            viewport_height: Some(metrics.viewport_size().height),
        }
    }
}

impl From<&ImmutableViewportMetrics> for ViewportSnapshot {
    fn from(metrics: &ImmutableViewportMetrics) -> Self {
        (&metrics.thaw()).into()
    }
}

/// Page size payload for `page-size-update`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSizePayload {
    pub page_width: f32,
    pub page_height: f32,
}

impl PageSizePayload {
    fn validate(&self, event: &str) -> Result<(), ProtocolError> {
        check_positive(event, "pageWidth", self.page_width)?;
        check_positive(event, "pageHeight", self.page_height)?;
        Ok(())
    }

    /// The payload as a float size
    pub fn size(&self) -> FloatSize {
        FloatSize::new(self.page_width, self.page_height)
    }
}

#[derive(Debug, Deserialize)]
struct TogglePayload {
    value: bool,
}

/// A decoded, validated message from the layout peer
#[derive(Debug, Clone, PartialEq)]
pub enum PeerMessage {
    /// Replace the authoritative viewport (viewport size stays local)
    ViewportUpdate(ViewportSnapshot),
    /// Merge a new page size into the authoritative viewport
    PageSizeUpdate(PageSizePayload),
    /// Compute a display port for a scratch viewport, applying nothing
    DisplayPortQuery(ViewportSnapshot),
    /// Toggle the unfinished-paint debug overlay
    CheckerboardToggle(bool),
}

impl PeerMessage {
    /// Decode and validate a peer message
    ///
    /// Returns an error for unknown events, malformed JSON, or payloads
    /// that violate the protocol contract. Callers are expected to log
    /// the error and drop the request without producing a response.
    pub fn decode(event: &str, payload: &str) -> Result<PeerMessage, ProtocolError> {
        match event {
            event::VIEWPORT_UPDATE => {
                let snapshot: ViewportSnapshot = parse(event, payload)?;
                snapshot.validate(event)?;
                Ok(PeerMessage::ViewportUpdate(snapshot))
            }
            event::PAGE_SIZE_UPDATE => {
                let payload: PageSizePayload = parse(event, payload)?;
                payload.validate(event)?;
                Ok(PeerMessage::PageSizeUpdate(payload))
            }
            event::DISPLAY_PORT_QUERY => {
                let snapshot: ViewportSnapshot = parse(event, payload)?;
                snapshot.validate(event)?;
                Ok(PeerMessage::DisplayPortQuery(snapshot))
            }
            event::CHECKERBOARD_TOGGLE => {
                let toggle: TogglePayload = parse(event, payload)?;
                Ok(PeerMessage::CheckerboardToggle(toggle.value))
            }
            other => Err(ProtocolError::UnknownEvent(other.to_string())),
        }
    }
}

fn parse<'de, T: Deserialize<'de>>(event: &str, payload: &'de str) -> Result<T, ProtocolError> {
    serde_json::from_str(payload).map_err(|source| ProtocolError::MalformedPayload {
        event: event.to_string(),
        source,
    })
}

fn check_positive(event: &str, field: &'static str, value: f32) -> Result<(), ProtocolError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ProtocolError::InvalidField {
            event: event.to_string(),
            field,
            value,
        })
    }
}

/// Events sent from the hub to the layout peer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OutboundEvent {
    /// Combined viewport + display port update after a UI-thread change
    #[serde(rename_all = "camelCase")]
    Viewport {
        viewport: ViewportSnapshot,
        display_port: DisplayPortMetrics,
    },
    /// Window and/or screen dimensions changed
    #[serde(rename_all = "camelCase")]
    SizeChanged {
        window_width: i32,
        window_height: i32,
        screen_width: i32,
        screen_height: i32,
    },
}

/// Outbound transport seam to the layout peer
///
/// Implementations forward events over whatever channel reaches the peer.
/// Events must be delivered in the order sent (FIFO); the hub's
/// relative-positioning contract depends on it.
pub trait PeerLink: Send + Sync {
    /// Send one event to the peer
    fn send(&self, event: OutboundEvent);
}
