//! Authentication handlers

use std::time::Duration;

use axum::{Json, extract::State};
use shared::client::{LoginRequest, LoginResponse, UserInfo};
use shared::models::{Account, PasswordChange};

use crate::auth::{CurrentUser, hash_password, verify_password};
use crate::core::ServerState;
use crate::db::repository::{account, store};
use crate::security_log;
use crate::utils::validation::validate_password;
use crate::utils::{AppError, AppResult, ErrorCode};

/// Fixed delay before answering a login, found or not
const AUTH_FIXED_DELAY_MS: u64 = 500;

async fn user_info(state: &ServerState, account: &Account) -> AppResult<UserInfo> {
    let store_ids = if account.is_superuser {
        Vec::new()
    } else {
        store::managed_store_ids(&state.pool, account.id).await?
    };
    Ok(UserInfo::from_account(account, store_ids))
}

/// POST /api/auth/login - exchange credentials for a JWT
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let username = req.username.trim().to_string();
    let found = account::find_with_hash(&state.pool, &username).await?;

    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Same error for unknown user and wrong password
    let account = match found {
        Some((account, hash)) => {
            let valid = verify_password(&req.password, &hash)
                .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;
            if !valid {
                security_log!(
                    "WARN",
                    "login_failed",
                    username = username.clone(),
                    reason = "invalid_password"
                );
                return Err(AppError::invalid_credentials());
            }
            account
        }
        None => {
            security_log!(
                "WARN",
                "login_failed",
                username = username.clone(),
                reason = "unknown_user"
            );
            return Err(AppError::invalid_credentials());
        }
    };

    if !account.is_active {
        security_log!("WARN", "login_disabled", user_id = account.id, username = username.clone());
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }

    let jwt_service = state.get_jwt_service();
    let token = jwt_service
        .generate_token(&account)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    tracing::info!(
        user_id = account.id,
        username = %account.username,
        role = %account.role(),
        "User logged in"
    );

    Ok(Json(LoginResponse {
        token,
        expires_in: jwt_service.config.expiration_minutes * 60,
        user: user_info(&state, &account).await?,
    }))
}

/// GET /api/auth/me - the logged-in account
pub async fn me(State(state): State<ServerState>, user: CurrentUser) -> AppResult<Json<UserInfo>> {
    let account = account::find_by_id(&state.pool, user.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::AccountNotFound).with_detail("id", user.id))?;
    Ok(Json(user_info(&state, &account).await?))
}

/// PUT /api/auth/me/password - change the own password, proven with the current one
pub async fn change_password(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<PasswordChange>,
) -> AppResult<Json<bool>> {
    let hash = account::find_hash(&state.pool, user.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::AccountNotFound).with_detail("id", user.id))?;
    let valid = verify_password(&payload.current_password, &hash)
        .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;
    if !valid {
        security_log!("WARN", "password_change_failed", user_id = user.id);
        return Err(AppError::new(ErrorCode::WrongPassword));
    }
    validate_password(&payload.new_password)?;

    let new_hash = hash_password(&payload.new_password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;
    account::set_password(&state.pool, user.id, &new_hash).await?;
    security_log!("INFO", "password_changed", user_id = user.id);
    Ok(Json(true))
}
