//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::StoreNotFound
            | Self::ProductNotFound
            | Self::RechargeNotFound
            | Self::StockLineNotFound
            | Self::SaleNotFound
            | Self::ReportNotFound
            | Self::BalanceNotFound
            | Self::AccountNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::ReportAlreadyExists
            | Self::BalanceAlreadyExists
            | Self::UsernameExists
            | Self::EmailExists
            | Self::AccountHasSales => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::AccountDisabled => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied
            | Self::SuperuserRequired
            | Self::StoreAccessDenied
            | Self::NotAuthor => StatusCode::FORBIDDEN,

            // 422 Unprocessable (business rule rejected a well-formed request)
            Self::InsufficientStock | Self::ShortageNoteRequired => {
                StatusCode::UNPROCESSABLE_ENTITY
            }

            // 503 Service Unavailable
            Self::TimeoutError => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::InternalError | Self::DatabaseError | Self::ConfigError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request (default for validation errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_status() {
        assert_eq!(ErrorCode::NotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::StoreNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::BalanceNotFound.http_status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_conflict_status() {
        assert_eq!(ErrorCode::ReportAlreadyExists.http_status(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::UsernameExists.http_status(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::AccountHasSales.http_status(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::WrongPassword.http_status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_auth_and_permission_status() {
        assert_eq!(ErrorCode::TokenExpired.http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::StoreAccessDenied.http_status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::SuperuserRequired.http_status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_business_rule_status() {
        assert_eq!(
            ErrorCode::InsufficientStock.http_status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ErrorCode::InvalidQuantity.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::InvalidPeriod.http_status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_system_status() {
        assert_eq!(
            ErrorCode::DatabaseError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
