//! Webhook Lambda handler and request processing

pub mod handler;
pub mod parsing;
pub mod signature;

// Re-export the main handler for convenience
pub use handler::{Responder, handler};
