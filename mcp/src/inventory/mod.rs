//! Tool inventory and indexing.
//!
//! - Typed argument shapes compiled from provider schemas
//! - A flat, last-registration-wins name index

pub mod index;
pub mod schema;
pub mod types;

pub use index::ToolInventory;
pub use schema::{ArgSchema, ParamSpec, ParamType, ToolArgs};
pub use types::{ToolDescriptor, ToolEntry};
