//! Admin account feature.
//!
//! Credentials are bcrypt-hashed; listings never expose the hash. The last
//! remaining account cannot be deleted so the back-office stays reachable.

pub mod dtos;
pub mod models;
pub mod services;

pub use services::AdminUserService;
