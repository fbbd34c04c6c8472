//! Unified error codes
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Store errors
//! - 4xxx: Catalog and stock errors
//! - 5xxx: Sale errors
//! - 6xxx: Daily report errors
//! - 7xxx: Balance errors
//! - 8xxx: Account errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Represented as u16 values on the wire so API clients can switch on them
/// without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1007,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Superuser role required
    SuperuserRequired = 2002,
    /// User does not manage the store
    StoreAccessDenied = 2003,
    /// Only the author (or a superuser) may change the resource
    NotAuthor = 2004,

    // ==================== 3xxx: Store ====================
    /// Store not found
    StoreNotFound = 3001,
    /// Province is not one of the known provinces
    InvalidProvince = 3002,
    /// No store available for the current user
    NoStoreAvailable = 3003,

    // ==================== 4xxx: Catalog / Stock ====================
    /// Product not found
    ProductNotFound = 4001,
    /// Recharge not found
    RechargeNotFound = 4002,
    /// Stock line not found
    StockLineNotFound = 4003,
    /// Not enough stock for the requested quantity
    InsufficientStock = 4004,
    /// Quantity must be positive
    InvalidQuantity = 4005,
    /// Price is negative or has too many decimals
    InvalidPrice = 4006,
    /// Item kind is not product/recharge
    InvalidItemKind = 4007,

    // ==================== 5xxx: Sale ====================
    /// Sale not found
    SaleNotFound = 5001,
    /// Item kind does not match the stock line
    ItemKindMismatch = 5002,

    // ==================== 6xxx: Daily Report ====================
    /// Daily report not found
    ReportNotFound = 6001,
    /// A report already exists for this store and date
    ReportAlreadyExists = 6002,
    /// Shortage note is required when collected < grand total
    ShortageNoteRequired = 6003,

    // ==================== 7xxx: Balance ====================
    /// Balance not found
    BalanceNotFound = 7001,
    /// A balance already exists for this period
    BalanceAlreadyExists = 7002,
    /// Invalid period (start after end, unknown kind)
    InvalidPeriod = 7003,

    // ==================== 8xxx: Account ====================
    /// Account not found
    AccountNotFound = 8001,
    /// Username already taken
    UsernameExists = 8002,
    /// Email already taken
    EmailExists = 8003,
    /// Password too short
    PasswordTooShort = 8004,
    /// Account is referenced by recorded sales
    AccountHasSales = 8005,
    /// Current password did not match
    WrongPassword = 8006,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
    /// Operation timed out
    TimeoutError = 9004,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::SuperuserRequired => "Superuser role is required",
            ErrorCode::StoreAccessDenied => "You do not manage this store",
            ErrorCode::NotAuthor => "Only the author can change this resource",

            // Store
            ErrorCode::StoreNotFound => "Store not found",
            ErrorCode::InvalidProvince => "Unknown province",
            ErrorCode::NoStoreAvailable => "No store available",

            // Catalog / Stock
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::RechargeNotFound => "Recharge not found",
            ErrorCode::StockLineNotFound => "Stock line not found",
            ErrorCode::InsufficientStock => "Insufficient stock",
            ErrorCode::InvalidQuantity => "Quantity must be greater than zero",
            ErrorCode::InvalidPrice => "Invalid price",
            ErrorCode::InvalidItemKind => "Item kind must be 'product' or 'recharge'",

            // Sale
            ErrorCode::SaleNotFound => "Sale not found",
            ErrorCode::ItemKindMismatch => "Item kind does not match the stock line",

            // Daily Report
            ErrorCode::ReportNotFound => "Daily report not found",
            ErrorCode::ReportAlreadyExists => {
                "A daily report already exists for this store and date"
            }
            ErrorCode::ShortageNoteRequired => "A shortage note is required when cash is missing",

            // Balance
            ErrorCode::BalanceNotFound => "Balance not found",
            ErrorCode::BalanceAlreadyExists => "A balance already exists for this period",
            ErrorCode::InvalidPeriod => "Invalid period",

            // Account
            ErrorCode::AccountNotFound => "Account not found",
            ErrorCode::UsernameExists => "Username already exists",
            ErrorCode::EmailExists => "Email already exists",
            ErrorCode::PasswordTooShort => "Password is too short",
            ErrorCode::AccountHasSales => "Account has recorded sales and cannot be deleted",
            ErrorCode::WrongPassword => "Current password is incorrect",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::TimeoutError => "Operation timed out",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1007 => Ok(ErrorCode::AccountDisabled),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::SuperuserRequired),
            2003 => Ok(ErrorCode::StoreAccessDenied),
            2004 => Ok(ErrorCode::NotAuthor),

            // Store
            3001 => Ok(ErrorCode::StoreNotFound),
            3002 => Ok(ErrorCode::InvalidProvince),
            3003 => Ok(ErrorCode::NoStoreAvailable),

            // Catalog / Stock
            4001 => Ok(ErrorCode::ProductNotFound),
            4002 => Ok(ErrorCode::RechargeNotFound),
            4003 => Ok(ErrorCode::StockLineNotFound),
            4004 => Ok(ErrorCode::InsufficientStock),
            4005 => Ok(ErrorCode::InvalidQuantity),
            4006 => Ok(ErrorCode::InvalidPrice),
            4007 => Ok(ErrorCode::InvalidItemKind),

            // Sale
            5001 => Ok(ErrorCode::SaleNotFound),
            5002 => Ok(ErrorCode::ItemKindMismatch),

            // Daily Report
            6001 => Ok(ErrorCode::ReportNotFound),
            6002 => Ok(ErrorCode::ReportAlreadyExists),
            6003 => Ok(ErrorCode::ShortageNoteRequired),

            // Balance
            7001 => Ok(ErrorCode::BalanceNotFound),
            7002 => Ok(ErrorCode::BalanceAlreadyExists),
            7003 => Ok(ErrorCode::InvalidPeriod),

            // Account
            8001 => Ok(ErrorCode::AccountNotFound),
            8002 => Ok(ErrorCode::UsernameExists),
            8003 => Ok(ErrorCode::EmailExists),
            8004 => Ok(ErrorCode::PasswordTooShort),
            8005 => Ok(ErrorCode::AccountHasSales),
            8006 => Ok(ErrorCode::WrongPassword),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::ConfigError),
            9004 => Ok(ErrorCode::TimeoutError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}
