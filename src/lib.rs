//! GalekPrompt: turn an uploaded image into a style prompt for Gemini.
//!
//! The HTTP service validates a `data:image/...;base64,...` upload, asks one
//! configured vision provider to describe it and renders the result into a
//! ready-to-paste prompt.

pub mod analysis;
pub mod classify;
pub mod config;
pub mod error;
pub mod image_data;
pub mod prompt;
pub mod providers;
pub mod server;
pub mod web;

pub use analysis::{ImageAnalysis, VisionReport};
pub use config::Config;
pub use error::{AnalyzeError, ValidationError};
pub use image_data::ImageUpload;
pub use providers::VisionProvider;
pub use server::{create_app, AppState, ServiceSettings};
