//! Bands module — the resource surface gated by the authorization guards

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
