use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::admin_users::dtos::{AdminUserDto, CreateAdminUserDto, UpdateAdminUserDto};
use crate::features::admin_users::models::AdminUser;
use crate::modules::storage::RecordStore;
use crate::shared::constants::{BCRYPT_COST, MIN_PASSWORD_LEN};
use crate::shared::validation::USERNAME_REGEX;

/// Admin account management: bcrypt-hashed credentials, unique usernames,
/// last-admin delete protection.
pub struct AdminUserService {
    store: Arc<dyn RecordStore<AdminUser>>,
}

impl AdminUserService {
    pub fn new(store: Arc<dyn RecordStore<AdminUser>>) -> Self {
        Self { store }
    }

    /// List all admin accounts, without password hashes.
    pub async fn list(&self) -> Result<Vec<AdminUserDto>> {
        let users = self.store.read_all().await?;
        Ok(users.into_iter().map(AdminUserDto::from).collect())
    }

    pub async fn create(&self, dto: CreateAdminUserDto) -> Result<AdminUserDto> {
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        if !USERNAME_REGEX.is_match(&dto.username) {
            return Err(AppError::Validation(format!(
                "Invalid username '{}'",
                dto.username
            )));
        }

        let mut users = self.store.read_all().await?;
        if users.iter().any(|u| u.username == dto.username) {
            return Err(AppError::Validation(format!(
                "Username '{}' is already taken",
                dto.username
            )));
        }

        let password = bcrypt::hash(&dto.password, BCRYPT_COST)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;

        let user = AdminUser {
            id: format!("user-{}", Utc::now().timestamp_millis()),
            name: dto.name.filter(|n| !n.is_empty()).unwrap_or_else(|| dto.username.clone()),
            username: dto.username,
            password,
        };

        users.push(user.clone());
        self.store.write_all(&users).await?;

        tracing::info!(user_id = %user.id, username = %user.username, "Admin user created");
        Ok(AdminUserDto::from(user))
    }

    /// Patch name and/or username, or change the password after
    /// re-verifying the current one. An empty patch is rejected.
    pub async fn update(&self, id: &str, dto: UpdateAdminUserDto) -> Result<AdminUserDto> {
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if dto.name.is_none() && dto.username.is_none() && dto.new_password.is_none() {
            return Err(AppError::Validation("Nothing to update".to_string()));
        }

        let mut users = self.store.read_all().await?;
        let index = users
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Admin user '{}' not found", id)))?;

        if let Some(username) = &dto.username {
            if !USERNAME_REGEX.is_match(username) {
                return Err(AppError::Validation(format!(
                    "Invalid username '{}'",
                    username
                )));
            }
            if users.iter().any(|u| &u.username == username && u.id != id) {
                return Err(AppError::Validation(format!(
                    "Username '{}' is already taken",
                    username
                )));
            }
        }

        let new_password_hash = match &dto.new_password {
            Some(new_password) => {
                let current = dto.current_password.as_deref().ok_or_else(|| {
                    AppError::Validation("Current password is required".to_string())
                })?;
                let verified = bcrypt::verify(current, &users[index].password)
                    .map_err(|e| AppError::Internal(format!("Failed to verify password: {}", e)))?;
                if !verified {
                    return Err(AppError::Validation(
                        "Current password is incorrect".to_string(),
                    ));
                }
                if new_password.len() < MIN_PASSWORD_LEN {
                    return Err(AppError::Validation(format!(
                        "Password must be at least {} characters",
                        MIN_PASSWORD_LEN
                    )));
                }
                Some(
                    bcrypt::hash(new_password, BCRYPT_COST)
                        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?,
                )
            }
            None => None,
        };

        let user = &mut users[index];
        if let Some(name) = dto.name {
            user.name = name;
        }
        if let Some(username) = dto.username {
            user.username = username;
        }
        if let Some(password) = new_password_hash {
            user.password = password;
        }
        let updated = user.clone();

        self.store.write_all(&users).await?;
        Ok(AdminUserDto::from(updated))
    }

    /// Remove an admin account. The last remaining one is protected.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let mut users = self.store.read_all().await?;

        if users.len() <= 1 {
            return Err(AppError::Conflict(
                "Cannot delete the last admin user".to_string(),
            ));
        }

        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return Err(AppError::NotFound(format!(
                "Admin user '{}' not found",
                id
            )));
        }

        self.store.write_all(&users).await?;
        tracing::info!(user_id = %id, "Admin user deleted");
        Ok(())
    }

    /// Check a username/password pair. Returns the account on success,
    /// `None` on any mismatch. Session handling is the caller's concern.
    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<AdminUserDto>> {
        let users = self.store.read_all().await?;
        let user = match users.into_iter().find(|u| u.username == username) {
            Some(user) => user,
            None => return Ok(None),
        };

        match bcrypt::verify(password, &user.password) {
            Ok(true) => Ok(Some(AdminUserDto::from(user))),
            Ok(false) => Ok(None),
            Err(e) => {
                tracing::warn!(username = %username, error = %e, "Unverifiable password hash");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::storage::JsonFileStore;
    use tempfile::TempDir;

    fn service_with(dir: &TempDir, users: Vec<AdminUser>) -> AdminUserService {
        AdminUserService::new(Arc::new(JsonFileStore::new(
            dir.path().join("admin.json"),
            users,
        )))
    }

    fn hashed_user(id: &str, username: &str, password: &str) -> AdminUser {
        AdminUser {
            id: id.to_string(),
            username: username.to_string(),
            password: bcrypt::hash(password, 4).unwrap(),
            name: username.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_username_and_hides_hash() {
        let dir = TempDir::new().unwrap();
        let service = service_with(&dir, vec![]);

        let created = service
            .create(CreateAdminUserDto {
                username: "admin".to_string(),
                password: "rahasia".to_string(),
                name: None,
            })
            .await
            .unwrap();
        assert_eq!(created.name, "admin");

        let duplicate = service
            .create(CreateAdminUserDto {
                username: "admin".to_string(),
                password: "rahasia2".to_string(),
                name: None,
            })
            .await;
        assert!(matches!(duplicate, Err(AppError::Validation(_))));

        let listed = service.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        let json = serde_json::to_value(&listed).unwrap();
        assert!(json[0].get("password").is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_short_password() {
        let dir = TempDir::new().unwrap();
        let service = service_with(&dir, vec![]);

        let result = service
            .create(CreateAdminUserDto {
                username: "admin".to_string(),
                password: "12345".to_string(),
                name: None,
            })
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_password_change_requires_correct_current_password() {
        let dir = TempDir::new().unwrap();
        let service = service_with(&dir, vec![hashed_user("user-1", "admin", "lama-123")]);

        let missing_current = service
            .update(
                "user-1",
                UpdateAdminUserDto {
                    new_password: Some("baru-456".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(missing_current, Err(AppError::Validation(_))));

        let wrong_current = service
            .update(
                "user-1",
                UpdateAdminUserDto {
                    current_password: Some("salah".to_string()),
                    new_password: Some("baru-456".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(wrong_current, Err(AppError::Validation(_))));

        service
            .update(
                "user-1",
                UpdateAdminUserDto {
                    current_password: Some("lama-123".to_string()),
                    new_password: Some("baru-456".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let verified = service
            .verify_credentials("admin", "baru-456")
            .await
            .unwrap();
        assert!(verified.is_some());
        let old = service.verify_credentials("admin", "lama-123").await.unwrap();
        assert!(old.is_none());
    }

    #[tokio::test]
    async fn test_delete_protects_last_admin() {
        let dir = TempDir::new().unwrap();
        let service = service_with(&dir, vec![hashed_user("user-1", "admin", "rahasia")]);

        let blocked = service.delete("user-1").await;
        assert!(matches!(blocked, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_delete_with_two_admins_leaves_other_untouched() {
        let dir = TempDir::new().unwrap();
        let service = service_with(
            &dir,
            vec![
                hashed_user("user-1", "admin", "rahasia"),
                hashed_user("user-2", "editor", "rahasia"),
            ],
        );

        service.delete("user-1").await.unwrap();
        let remaining = service.list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].username, "editor");
    }
}
