//! Inbound interfaces: REST API and notification WebSocket

pub mod http;
pub mod ws;
