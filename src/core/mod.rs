//! Configuration, shared state and data shapes

pub mod config;
pub mod credentials;
pub mod models;
pub mod session;
