pub mod admin_user_service;

pub use admin_user_service::AdminUserService;
