//! Request-independent business flows behind the handlers.

pub mod auth;
pub mod chat;
pub mod conversations;
