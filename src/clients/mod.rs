//! Client modules for external API interactions

pub mod vision_client;

pub use vision_client::{ImageAnalyzer, VisionClient};
