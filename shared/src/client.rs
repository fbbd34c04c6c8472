//! Auth DTOs shared between the server and its API clients

use serde::{Deserialize, Serialize};

use crate::models::{Account, Role};

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    /// Seconds until the token expires
    pub expires_in: i64,
    pub user: UserInfo,
}

/// Public view of the logged-in account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    /// Stores the account manages; empty for superusers
    #[serde(default)]
    pub store_ids: Vec<i64>,
}

impl UserInfo {
    pub fn from_account(account: &Account, store_ids: Vec<i64>) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
            full_name: account.display_name().to_string(),
            role: account.role(),
            store_ids,
        }
    }
}
