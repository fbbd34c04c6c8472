//! Account API handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::models::{
    Account, AccountActiveUpdate, AccountCreate, AccountUpdate, PasswordReset, SellerStats,
    SellerStatsQuery,
};

use crate::auth::{CurrentUser, hash_password};
use crate::core::ServerState;
use crate::db::repository::{RepoError, account, sale};
use crate::security_log;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_email, validate_optional_text, validate_password,
    validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};

fn account_not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::AccountNotFound).with_detail("id", id)
}

/// GET /api/accounts - all accounts
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Account>>> {
    let accounts = account::find_all(&state.pool).await?;
    Ok(Json(accounts))
}

/// GET /api/accounts/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Account>> {
    let found = account::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| account_not_found(id))?;
    Ok(Json(found))
}

/// POST /api/accounts - create a superuser or store manager
pub async fn create(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(payload): Json<AccountCreate>,
) -> AppResult<Json<Account>> {
    validate_required_text(&payload.username, "username", MAX_SHORT_TEXT_LEN)?;
    validate_email(payload.email.trim())?;
    validate_optional_text(&payload.full_name, "full_name", MAX_NAME_LEN)?;
    validate_password(&payload.password)?;

    let username = payload.username.trim();
    if account::username_exists(&state.pool, username).await? {
        return Err(AppError::new(ErrorCode::UsernameExists).with_detail("username", username));
    }
    let email = payload.email.trim();
    if account::email_exists(&state.pool, email).await? {
        return Err(AppError::new(ErrorCode::EmailExists).with_detail("email", email));
    }

    let hash = hash_password(&payload.password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;
    let created = account::create(&state.pool, payload, &hash)
        .await
        .map_err(|e| match e {
            // lost a race with a concurrent create
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::UsernameExists, msg),
            other => other.into(),
        })?;

    tracing::info!(
        account_id = created.id,
        username = %created.username,
        role = %created.role(),
        created_by = current_user.id,
        "Account created"
    );
    Ok(Json(created))
}

/// PUT /api/accounts/:id - edit email, full name or role
pub async fn update(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<AccountUpdate>,
) -> AppResult<Json<Account>> {
    if id == current_user.id && payload.is_superuser == Some(false) {
        return Err(AppError::validation("You cannot remove your own superuser role"));
    }
    validate_optional_text(&payload.full_name, "full_name", MAX_NAME_LEN)?;
    if let Some(email) = payload.email.as_deref().map(str::trim) {
        validate_email(email)?;
        if account::email_used_by_other(&state.pool, email, id).await? {
            return Err(AppError::new(ErrorCode::EmailExists).with_detail("email", email));
        }
    }

    let updated = account::update(&state.pool, id, payload)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => account_not_found(id),
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::EmailExists, msg),
            other => other.into(),
        })?;
    tracing::info!(account_id = id, updated_by = current_user.id, "Account updated");
    Ok(Json(updated))
}

/// PUT /api/accounts/:id/password - set a new password without the old one
pub async fn reset_password(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<PasswordReset>,
) -> AppResult<Json<bool>> {
    validate_password(&payload.new_password)?;
    let hash = hash_password(&payload.new_password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;
    account::set_password(&state.pool, id, &hash)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => account_not_found(id),
            other => other.into(),
        })?;
    security_log!("INFO", "password_reset", user_id = id, reset_by = current_user.id);
    Ok(Json(true))
}

/// DELETE /api/accounts/:id - only accounts without sales
pub async fn delete(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    if id == current_user.id {
        return Err(AppError::validation("You cannot delete your own account"));
    }
    account::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| account_not_found(id))?;
    let sales = sale::seller_stats(&state.pool, id, None, None).await?;
    if sales.sales_count > 0 {
        return Err(AppError::new(ErrorCode::AccountHasSales)
            .with_detail("id", id)
            .with_detail("sales_count", sales.sales_count));
    }

    let deleted = account::delete(&state.pool, id).await?;
    tracing::info!(account_id = id, deleted_by = current_user.id, "Account deleted");
    Ok(Json(deleted))
}

/// PUT /api/accounts/:id/active - enable or disable login
pub async fn set_active(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<AccountActiveUpdate>,
) -> AppResult<Json<Account>> {
    if id == current_user.id && !payload.is_active {
        return Err(AppError::validation("You cannot disable your own account"));
    }
    let updated = account::set_active(&state.pool, id, payload.is_active)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => account_not_found(id),
            other => other.into(),
        })?;
    tracing::info!(account_id = id, is_active = payload.is_active, "Account status changed");
    Ok(Json(updated))
}

/// GET /api/accounts/:id/stats?from&to - sales made by the account
pub async fn stats(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Query(query): Query<SellerStatsQuery>,
) -> AppResult<Json<SellerStats>> {
    account::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| account_not_found(id))?;
    if let (Some(from), Some(to)) = (query.from, query.to)
        && from > to
    {
        return Err(AppError::new(ErrorCode::InvalidPeriod)
            .with_detail("from", from.to_string())
            .with_detail("to", to.to_string()));
    }
    let stats = sale::seller_stats(&state.pool, id, query.from, query.to).await?;
    Ok(Json(stats))
}
