//! Real-time notifications for connected dashboards.
//!
//! The server fans scan events out through [`EventHub`] and streams them as
//! server-sent events framed by [`sse::encode`].

pub mod hub;
pub mod sse;

pub use hub::{EventHub, PushEvent};
