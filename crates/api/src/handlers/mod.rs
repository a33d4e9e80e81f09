pub mod poses;
pub mod storyboards;
pub mod styles;
pub mod tasks;
