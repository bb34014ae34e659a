//! HTTP route handlers for the relay server.

pub mod chat;
pub mod health;
