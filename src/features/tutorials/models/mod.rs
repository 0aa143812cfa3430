mod media;
mod tutorial;

pub use media::{MediaItem, MediaKind};
pub use tutorial::{Tutorial, TutorialStatus};
