//! Driftview Protocol Library
//!
//! Message types exchanged with the asynchronous layout peer, plus the
//! single-slot return channel used to hand a computed display port back
//! to the peer in response to its request.
//!
//! The transport itself (how bytes reach the peer) is out of scope; this
//! crate covers the state the messages carry and the decode/validate
//! boundary. Malformed or out-of-contract payloads are rejected here so
//! the synchronization hub never sees a non-positive zoom or page size.
//!
//! # Example
//!
//! ```
//! use driftview_protocol::{PeerMessage, event};
//!
//! let message = PeerMessage::decode(
//!     event::VIEWPORT_UPDATE,
//!     r#"{"x":0.0,"y":0.0,"zoom":1.0,"pageWidth":500.0,"pageHeight":500.0}"#,
//! )
//! .unwrap();
//!
//! match message {
//!     PeerMessage::ViewportUpdate(snapshot) => assert_eq!(snapshot.page_width, 500.0),
//!     _ => unreachable!(),
//! }
//! ```

mod message;
mod return_slot;

pub use message::{
    event, OutboundEvent, PageSizePayload, PeerLink, PeerMessage, ProtocolError, ViewportSnapshot,
};
pub use return_slot::ReturnSlot;
