pub mod search_dto;

pub use search_dto::{CategoryHit, MatchField, SearchHit, SearchResults, TutorialHit};
