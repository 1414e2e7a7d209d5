//! WebSocket layer: live swap notifications.
//!
//! The endpoint at `/ws` binds each connection to the caller identified by
//! `X-User-Id` and pushes every [`crate::domain::SwapNotification`] in which
//! that user is requester or requestee.

pub mod connection;
pub mod handler;
pub mod messages;
