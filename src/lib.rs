//! Personal concierge over MCP tool providers.
//!
//! Calendar and maps requests are classified, routed through a small state
//! machine that calls provider tools, and answered by a language model.
//! Tools that change the calendar are gated by human approval, either on the
//! terminal or through a chat surface.

pub mod assistant;
pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod logging;
pub mod parsers;
pub mod session;
