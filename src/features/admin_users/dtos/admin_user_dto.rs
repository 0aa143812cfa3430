use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::features::admin_users::models::AdminUser;

/// Listing/response shape for an admin account. Deliberately has no
/// password field.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserDto {
    pub id: String,
    pub username: String,
    pub name: String,
}

impl From<AdminUser> for AdminUserDto {
    fn from(user: AdminUser) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
        }
    }
}

/// Request DTO for creating an admin account
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdminUserDto {
    #[validate(length(min = 1, max = 64, message = "Username must be 1-64 characters"))]
    pub username: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    /// Defaults to the username.
    #[serde(default)]
    pub name: Option<String>,
}

/// Request DTO for updating an admin account.
///
/// A password change requires `current_password` alongside `new_password`;
/// the current one is re-verified before the hash is replaced.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdminUserDto {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 64, message = "Username must be 1-64 characters"))]
    pub username: Option<String>,

    pub current_password: Option<String>,

    pub new_password: Option<String>,
}
