use serde::{Deserialize, Serialize};

/// Admin account as persisted. `password` is a bcrypt hash, never the
/// plaintext; it stays out of every listing DTO.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: String,
    pub username: String,
    pub password: String,
    pub name: String,
}

impl AdminUser {
    /// Admin accounts have no bundled seed; the first one is provisioned
    /// explicitly.
    pub fn default_dataset() -> Vec<AdminUser> {
        Vec::new()
    }
}
