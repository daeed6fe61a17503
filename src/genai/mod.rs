//! Hosted image-generation API integration

pub mod client;
pub mod refs;

pub use client::{GeminiClient, GeneratedImage, DEFAULT_MODEL};
pub use refs::{resolve_reference_images, ReferenceImage, MAX_REFERENCE_IMAGES};
