pub mod category_service;

pub use category_service::{descendants_of, path_of, CategoryService};
