//! Data Transfer Objects for REST request/response serialization.
//!
//! Identifiers serialize as bare UUID strings and timestamps as ISO-8601.

pub mod common_dto;
pub mod event_dto;
pub mod swap_dto;

pub use common_dto::*;
pub use event_dto::*;
pub use swap_dto::*;
