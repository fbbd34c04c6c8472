//! Account Model

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role, derived from `is_superuser`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Sees and manages every store
    Superuser,
    /// Limited to the stores they manage
    Manager,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Superuser => "superuser",
            Self::Manager => "manager",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "superuser" => Some(Self::Superuser),
            "manager" => Some(Self::Manager),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account entity (password hash never leaves the repository)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub is_superuser: bool,
    pub is_active: bool,
    pub created_at: i64,
}

impl Account {
    pub fn role(&self) -> Role {
        if self.is_superuser {
            Role::Superuser
        } else {
            Role::Manager
        }
    }

    /// Full name, falling back to the username when blank
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.username
        } else {
            &self.full_name
        }
    }
}

/// Create account payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountCreate {
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub password: String,
    pub is_superuser: Option<bool>,
}

/// Edit account payload; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountUpdate {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub is_superuser: Option<bool>,
}

/// Superuser password reset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordReset {
    pub new_password: String,
}

/// Own password change, proven with the current one
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

/// Enable / disable an account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountActiveUpdate {
    pub is_active: bool,
}

/// Sales performed by one seller in a date range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerStats {
    pub account_id: i64,
    pub sales_count: i64,
    pub units_sold: i64,
    pub total_value: Decimal,
}

/// Date range for [`SellerStats`]; both ends inclusive and optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SellerStatsQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(full_name: &str, is_superuser: bool) -> Account {
        Account {
            id: 1,
            username: "ana".to_string(),
            email: "ana@example.com".to_string(),
            full_name: full_name.to_string(),
            is_superuser,
            is_active: true,
            created_at: 0,
        }
    }

    #[test]
    fn role_follows_superuser_flag() {
        assert_eq!(account("", true).role(), Role::Superuser);
        assert_eq!(account("", false).role(), Role::Manager);
        assert_eq!(Role::parse("manager"), Some(Role::Manager));
        assert_eq!(Role::parse("admin"), None);
    }

    #[test]
    fn display_name_falls_back_to_username() {
        assert_eq!(account("  ", false).display_name(), "ana");
        assert_eq!(account("Ana Paula", false).display_name(), "Ana Paula");
    }
}
