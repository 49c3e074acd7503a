//! HTTP handlers for whisk-api.

pub mod chat;
pub mod recipes;
pub mod system;
