//! Account Repository

use super::{RepoError, RepoResult};
use shared::models::{Account, AccountCreate, AccountUpdate};
use sqlx::SqlitePool;

const ACCOUNT_SELECT: &str =
    "SELECT id, username, email, full_name, is_superuser, is_active, created_at FROM account";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Account>> {
    let sql = format!("{ACCOUNT_SELECT} ORDER BY username");
    let rows = sqlx::query_as::<_, Account>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Account>> {
    let sql = format!("{ACCOUNT_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Account>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Account plus its password hash, for login only
pub async fn find_with_hash(
    pool: &SqlitePool,
    username: &str,
) -> RepoResult<Option<(Account, String)>> {
    #[derive(sqlx::FromRow)]
    struct Row {
        #[sqlx(flatten)]
        account: Account,
        password_hash: String,
    }

    let sql = "SELECT id, username, email, full_name, is_superuser, is_active, created_at, password_hash FROM account WHERE username = ? LIMIT 1";
    let row = sqlx::query_as::<_, Row>(sql)
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|r| (r.account, r.password_hash)))
}

pub async fn username_exists(pool: &SqlitePool, username: &str) -> RepoResult<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM account WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}

pub async fn email_exists(pool: &SqlitePool, email: &str) -> RepoResult<bool> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT id FROM account WHERE lower(email) = lower(?)")
            .bind(email)
            .fetch_optional(pool)
            .await?;
    Ok(found.is_some())
}

/// Whether `email` belongs to an account other than `id`
pub async fn email_used_by_other(pool: &SqlitePool, email: &str, id: i64) -> RepoResult<bool> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT id FROM account WHERE lower(email) = lower(?) AND id <> ?")
            .bind(email)
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(found.is_some())
}

/// Password hash of one account
pub async fn find_hash(pool: &SqlitePool, id: i64) -> RepoResult<Option<String>> {
    let hash = sqlx::query_scalar("SELECT password_hash FROM account WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(hash)
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let n = sqlx::query_scalar("SELECT COUNT(*) FROM account")
        .fetch_one(pool)
        .await?;
    Ok(n)
}

/// Insert an account; the caller hashes the password
pub async fn create(
    pool: &SqlitePool,
    data: AccountCreate,
    password_hash: &str,
) -> RepoResult<Account> {
    let now = shared::util::now_millis();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO account (username, email, full_name, password_hash, is_superuser, is_active, created_at) VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6) RETURNING id",
    )
    .bind(data.username.trim())
    .bind(data.email.trim())
    .bind(data.full_name.as_deref().map(str::trim).unwrap_or(""))
    .bind(password_hash)
    .bind(data.is_superuser.unwrap_or(false))
    .bind(now)
    .fetch_one(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create account".into()))
}

pub async fn set_active(pool: &SqlitePool, id: i64, is_active: bool) -> RepoResult<Account> {
    let rows = sqlx::query("UPDATE account SET is_active = ? WHERE id = ?")
        .bind(is_active)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Account {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Account {id} not found")))
}

/// Edit profile fields; `None` keeps the stored value
pub async fn update(pool: &SqlitePool, id: i64, data: AccountUpdate) -> RepoResult<Account> {
    let rows = sqlx::query(
        "UPDATE account SET email = COALESCE(?1, email), full_name = COALESCE(?2, full_name), is_superuser = COALESCE(?3, is_superuser) WHERE id = ?4",
    )
    .bind(data.email.as_deref().map(str::trim))
    .bind(data.full_name.as_deref().map(str::trim))
    .bind(data.is_superuser)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Account {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Account {id} not found")))
}

/// Replace the password hash; the caller hashes
pub async fn set_password(pool: &SqlitePool, id: i64, password_hash: &str) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE account SET password_hash = ? WHERE id = ?")
        .bind(password_hash)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Account {id} not found")));
    }
    Ok(())
}

/// Delete an account; store assignments go with it
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM account WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    fn payload(username: &str, email: &str) -> AccountCreate {
        AccountCreate {
            username: username.into(),
            email: email.into(),
            full_name: Some(" Joana Silva ".into()),
            password: "secret1".into(),
            is_superuser: None,
        }
    }

    #[tokio::test]
    async fn create_find_and_toggle() {
        let db = DbService::in_memory().await.unwrap();
        let pool = &db.pool;

        let account = create(pool, payload("joana", "joana@example.com"), "hash")
            .await
            .unwrap();
        assert_eq!(account.full_name, "Joana Silva");
        assert!(!account.is_superuser);
        assert!(account.is_active);

        let (found, hash) = find_with_hash(pool, "joana").await.unwrap().unwrap();
        assert_eq!(found.id, account.id);
        assert_eq!(hash, "hash");

        assert!(username_exists(pool, "joana").await.unwrap());
        assert!(email_exists(pool, "JOANA@example.com").await.unwrap());
        assert_eq!(count(pool).await.unwrap(), 1);

        let disabled = set_active(pool, account.id, false).await.unwrap();
        assert!(!disabled.is_active);
        assert!(matches!(
            set_active(pool, 999, true).await,
            Err(RepoError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn edit_password_and_delete() {
        let db = DbService::in_memory().await.unwrap();
        let pool = &db.pool;
        let joana = create(pool, payload("joana", "joana@example.com"), "old-hash")
            .await
            .unwrap();
        create(pool, payload("rui", "rui@example.com"), "h").await.unwrap();

        let edited = update(
            pool,
            joana.id,
            AccountUpdate {
                full_name: Some(" Joana M. Silva ".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(edited.full_name, "Joana M. Silva");
        assert_eq!(edited.email, "joana@example.com");
        assert!(!edited.is_superuser);

        assert!(email_used_by_other(pool, "RUI@example.com", joana.id).await.unwrap());
        assert!(!email_used_by_other(pool, "joana@example.com", joana.id).await.unwrap());
        let err = update(
            pool,
            joana.id,
            AccountUpdate {
                email: Some("rui@example.com".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));

        set_password(pool, joana.id, "new-hash").await.unwrap();
        assert_eq!(find_hash(pool, joana.id).await.unwrap().as_deref(), Some("new-hash"));
        assert!(matches!(
            set_password(pool, 999, "x").await,
            Err(RepoError::NotFound(_))
        ));

        assert!(delete(pool, joana.id).await.unwrap());
        assert!(find_by_id(pool, joana.id).await.unwrap().is_none());
        assert!(!delete(pool, joana.id).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_username_is_reported() {
        let db = DbService::in_memory().await.unwrap();
        create(&db.pool, payload("rui", "rui@example.com"), "h")
            .await
            .unwrap();
        let err = create(&db.pool, payload("rui", "other@example.com"), "h")
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }
}
