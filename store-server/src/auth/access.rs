//! Store access rules
//!
//! Superusers reach every store. Managers reach only the stores listed for
//! them in `store_manager`.

use sqlx::SqlitePool;

use crate::AppError;
use crate::auth::CurrentUser;
use crate::db::repository::store;
use crate::security_log;

/// Fail with `StoreAccessDenied` unless `user` may work on `store_id`
pub async fn ensure_store_access(
    pool: &SqlitePool,
    user: &CurrentUser,
    store_id: i64,
) -> Result<(), AppError> {
    if user.is_superuser() {
        return Ok(());
    }
    if store::is_manager(pool, store_id, user.id).await? {
        return Ok(());
    }
    security_log!(
        "WARN",
        "store_access_denied",
        user_id = user.id,
        username = user.username.clone(),
        store_id = store_id
    );
    Err(AppError::store_access_denied(store_id))
}

/// Stores visible to `user`; `None` means every store
pub async fn accessible_store_ids(
    pool: &SqlitePool,
    user: &CurrentUser,
) -> Result<Option<Vec<i64>>, AppError> {
    if user.is_superuser() {
        return Ok(None);
    }
    Ok(Some(store::managed_store_ids(pool, user.id).await?))
}

/// Resolve an optional store id from a request.
///
/// An explicit id is access-checked. Without one, managers get their first
/// managed store and superusers the first store.
pub async fn default_store_for(
    pool: &SqlitePool,
    user: &CurrentUser,
    requested: Option<i64>,
) -> Result<i64, AppError> {
    if let Some(store_id) = requested {
        store::find_by_id(pool, store_id)
            .await?
            .ok_or_else(|| AppError::new(shared::ErrorCode::StoreNotFound))?;
        ensure_store_access(pool, user, store_id).await?;
        return Ok(store_id);
    }

    let first = if user.is_superuser() {
        store::first_store_id(pool).await?
    } else {
        store::managed_store_ids(pool, user.id)
            .await?
            .into_iter()
            .next()
    };
    first.ok_or_else(|| AppError::new(shared::ErrorCode::NoStoreAvailable))
}

/// Keep only the requested store if visible; otherwise the visible set
pub fn narrow_to_store(
    visible: Option<Vec<i64>>,
    requested: Option<i64>,
) -> Option<Vec<i64>> {
    match (visible, requested) {
        (None, None) => None,
        (None, Some(id)) => Some(vec![id]),
        (Some(ids), None) => Some(ids),
        (Some(ids), Some(id)) => Some(ids.into_iter().filter(|s| *s == id).collect()),
    }
}
