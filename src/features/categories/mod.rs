//! Hierarchical category feature.
//!
//! Categories form a self-referential tree (`parent_id`) rendered as nested
//! navigation. The service guards the structural invariants: the parent
//! graph stays acyclic and categories with children cannot be deleted.

pub mod dtos;
pub mod models;
pub mod services;

pub use services::CategoryService;
