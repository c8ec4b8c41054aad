//! Client-side MCP handler.
//!
//! Providers only ever receive our client info during `initialize`; no
//! server-initiated requests are served.

use rmcp::{model::ClientInfo, ClientHandler};

#[derive(Clone)]
pub struct ConciergeClientHandler {
    client_info: ClientInfo,
}

impl ConciergeClientHandler {
    pub fn new() -> Self {
        let mut client_info = ClientInfo::default();
        client_info.client_info.name = "concierge".to_string();
        client_info.client_info.version = env!("CARGO_PKG_VERSION").to_string();
        Self { client_info }
    }
}

impl Default for ConciergeClientHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientHandler for ConciergeClientHandler {
    fn get_info(&self) -> ClientInfo {
        self.client_info.clone()
    }
}
