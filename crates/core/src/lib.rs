//! Domain core for pose extraction and pose image generation.
//!
//! Pure functions, constants and collaborator contracts with no internal
//! crate dependencies, shared by the persistence, pipeline and API layers.

pub mod ai_json;
pub mod entities;
pub mod error;
pub mod image_generation;
pub mod pose_extraction;
pub mod providers;
pub mod stores;
pub mod style;
pub mod task;
pub mod types;
