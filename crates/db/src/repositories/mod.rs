//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod drama_repo;
pub mod episode_repo;
pub mod image_generation_repo;
pub mod pose_repo;
pub mod storyboard_repo;
pub mod task_repo;

pub use drama_repo::DramaRepo;
pub use episode_repo::EpisodeRepo;
pub use image_generation_repo::ImageGenerationRepo;
pub use pose_repo::PoseRepo;
pub use storyboard_repo::StoryboardRepo;
pub use task_repo::TaskRepo;
