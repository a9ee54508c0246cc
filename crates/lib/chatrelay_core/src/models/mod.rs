//! Domain models shared by the store, the provider and the HTTP layer.

pub mod auth;
pub mod chat;
