//! Server-Sent Events feed of the notification registry.
//!
//! # Endpoint
//!
//! `GET /api/v1/notifications/stream`
//!
//! # Event Types
//!
//! - `snapshot` - the full list of visible notifications (JSON array), sent
//!   on connect and after every change
//! - `toast` - a pop-up request mirrored from a newly added notification
//!
//! Keep-alive comments are sent while the registry is idle. The stream ends
//! when the server shuts down.

mod handler;

pub use handler::{sse_handler, sse_messages, SseMessage};
