//! Store Repository

use std::collections::HashMap;

use super::{ITEM_NAME, ITEM_PRICE, RepoError, RepoResult, item_join, parse_column, placeholders};
use shared::models::{
    ItemKind, ItemSoldCount, LOW_STOCK_THRESHOLD, Store, StoreCreate, StoreStats, StoreUpdate,
};
use shared::money::from_cents;
use sqlx::{Sqlite, SqlitePool, Transaction};

const STORE_SELECT: &str = "SELECT id, name, neighborhood, city, province, municipality, created_at, updated_at FROM store";

/// Stores ordered by name; `ids = Some(..)` restricts the result
pub async fn find_all(pool: &SqlitePool, ids: Option<&[i64]>) -> RepoResult<Vec<Store>> {
    let mut stores = match ids {
        None => {
            let sql = format!("{STORE_SELECT} ORDER BY name, id");
            sqlx::query_as::<_, Store>(&sql).fetch_all(pool).await?
        }
        Some([]) => return Ok(vec![]),
        Some(ids) => {
            let sql = format!(
                "{STORE_SELECT} WHERE id IN {} ORDER BY name, id",
                placeholders(ids.len())
            );
            let mut query = sqlx::query_as::<_, Store>(&sql);
            for id in ids {
                query = query.bind(*id);
            }
            query.fetch_all(pool).await?
        }
    };

    let managers = manager_map(pool).await?;
    for store in &mut stores {
        store.manager_ids = managers.get(&store.id).cloned().unwrap_or_default();
    }
    Ok(stores)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Store>> {
    let sql = format!("{STORE_SELECT} WHERE id = ?");
    let store = sqlx::query_as::<_, Store>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    match store {
        Some(mut store) => {
            store.manager_ids = manager_ids(pool, id).await?;
            Ok(Some(store))
        }
        None => Ok(None),
    }
}

pub async fn create(pool: &SqlitePool, data: StoreCreate) -> RepoResult<Store> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO store (name, neighborhood, city, province, municipality, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6) RETURNING id",
    )
    .bind(data.name.trim())
    .bind(data.neighborhood.trim())
    .bind(data.city.trim())
    .bind(&data.province)
    .bind(data.municipality.trim())
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;
    replace_managers(&mut tx, id, &data.manager_ids).await?;
    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create store".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: StoreUpdate) -> RepoResult<Store> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE store SET name = COALESCE(?1, name), neighborhood = COALESCE(?2, neighborhood), city = COALESCE(?3, city), province = COALESCE(?4, province), municipality = COALESCE(?5, municipality), updated_at = ?6 WHERE id = ?7",
    )
    .bind(data.name.as_deref().map(str::trim))
    .bind(data.neighborhood.as_deref().map(str::trim))
    .bind(data.city.as_deref().map(str::trim))
    .bind(data.province.as_deref())
    .bind(data.municipality.as_deref().map(str::trim))
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Store {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Store {id} not found")))
}

/// Delete a store and everything that belongs to it (cascade)
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM store WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Replace the manager set of a store
pub async fn set_managers(pool: &SqlitePool, id: i64, account_ids: &[i64]) -> RepoResult<Store> {
    let mut tx = pool.begin().await?;
    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM store WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    if exists.is_none() {
        return Err(RepoError::NotFound(format!("Store {id} not found")));
    }
    replace_managers(&mut tx, id, account_ids).await?;
    sqlx::query("UPDATE store SET updated_at = ? WHERE id = ?")
        .bind(shared::util::now_millis())
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Store {id} not found")))
}

async fn replace_managers(
    tx: &mut Transaction<'_, Sqlite>,
    store_id: i64,
    account_ids: &[i64],
) -> RepoResult<()> {
    sqlx::query("DELETE FROM store_manager WHERE store_id = ?")
        .bind(store_id)
        .execute(&mut **tx)
        .await?;
    for account_id in account_ids {
        sqlx::query("INSERT OR IGNORE INTO store_manager (store_id, account_id) VALUES (?, ?)")
            .bind(store_id)
            .bind(*account_id)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

pub async fn manager_ids(pool: &SqlitePool, store_id: i64) -> RepoResult<Vec<i64>> {
    let ids = sqlx::query_scalar(
        "SELECT account_id FROM store_manager WHERE store_id = ? ORDER BY account_id",
    )
    .bind(store_id)
    .fetch_all(pool)
    .await?;
    Ok(ids)
}

async fn manager_map(pool: &SqlitePool) -> RepoResult<HashMap<i64, Vec<i64>>> {
    let rows: Vec<(i64, i64)> = sqlx::query_as(
        "SELECT store_id, account_id FROM store_manager ORDER BY store_id, account_id",
    )
    .fetch_all(pool)
    .await?;
    let mut map: HashMap<i64, Vec<i64>> = HashMap::new();
    for (store_id, account_id) in rows {
        map.entry(store_id).or_default().push(account_id);
    }
    Ok(map)
}

pub async fn is_manager(pool: &SqlitePool, store_id: i64, account_id: i64) -> RepoResult<bool> {
    let found: Option<i64> = sqlx::query_scalar(
        "SELECT 1 FROM store_manager WHERE store_id = ? AND account_id = ?",
    )
    .bind(store_id)
    .bind(account_id)
    .fetch_optional(pool)
    .await?;
    Ok(found.is_some())
}

/// Stores managed by an account, by store id
pub async fn managed_store_ids(pool: &SqlitePool, account_id: i64) -> RepoResult<Vec<i64>> {
    let ids = sqlx::query_scalar(
        "SELECT store_id FROM store_manager WHERE account_id = ? ORDER BY store_id",
    )
    .bind(account_id)
    .fetch_all(pool)
    .await?;
    Ok(ids)
}

pub async fn first_store_id(pool: &SqlitePool) -> RepoResult<Option<i64>> {
    let id = sqlx::query_scalar("SELECT id FROM store ORDER BY id LIMIT 1")
        .fetch_optional(pool)
        .await?;
    Ok(id)
}

/// Lifetime sales and current stock figures of a store
pub async fn stats(pool: &SqlitePool, store_id: i64) -> RepoResult<StoreStats> {
    let (total_sales, total_value, total_items): (i64, i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(total_value), 0), COALESCE(SUM(quantity), 0) FROM sale WHERE store_id = ?",
    )
    .bind(store_id)
    .fetch_one(pool)
    .await?;

    let sql = format!(
        "SELECT sl.item_kind, sl.quantity, {ITEM_PRICE} FROM stock_line sl {} WHERE sl.store_id = ?",
        item_join("sl")
    );
    let lines: Vec<(String, i64, i64)> = sqlx::query_as(&sql)
        .bind(store_id)
        .fetch_all(pool)
        .await?;

    let mut stats = StoreStats {
        total_sales,
        total_sales_value: from_cents(total_value),
        total_items_sold: total_items,
        ..Default::default()
    };
    let mut stock_cents = 0i64;
    for (kind, quantity, price) in lines {
        let kind = parse_column(&kind, "item_kind", ItemKind::parse)?;
        if quantity > 0 {
            match kind {
                ItemKind::Product => stats.products_in_stock += 1,
                ItemKind::Recharge => stats.recharges_in_stock += 1,
            }
        }
        if quantity == 0 {
            stats.out_of_stock += 1;
        } else if quantity < LOW_STOCK_THRESHOLD {
            stats.low_stock += 1;
        }
        stats.total_stock_items += quantity;
        stock_cents = stock_cents.saturating_add(quantity.saturating_mul(price));
    }
    stats.stock_value = from_cents(stock_cents);
    stats.product_ranking = sold_ranking(pool, store_id, ItemKind::Product).await?;
    stats.recharge_ranking = sold_ranking(pool, store_id, ItemKind::Recharge).await?;
    Ok(stats)
}

/// Top 10 items of one kind by units sold
async fn sold_ranking(
    pool: &SqlitePool,
    store_id: i64,
    kind: ItemKind,
) -> RepoResult<Vec<ItemSoldCount>> {
    let sql = format!(
        "SELECT s.item_id, {ITEM_NAME} AS name, SUM(s.quantity) AS sold, SUM(s.total_value) AS value \
         FROM sale s {} WHERE s.store_id = ? AND s.item_kind = ? \
         GROUP BY s.item_id ORDER BY sold DESC, name ASC, s.item_id ASC LIMIT 10",
        item_join("s")
    );
    let rows: Vec<(i64, String, i64, i64)> = sqlx::query_as(&sql)
        .bind(store_id)
        .bind(kind.as_str())
        .fetch_all(pool)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(item_id, name, quantity_sold, value)| ItemSoldCount {
            item_id,
            name,
            quantity_sold,
            total_value: from_cents(value),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    fn payload(name: &str) -> StoreCreate {
        StoreCreate {
            name: name.into(),
            neighborhood: "Talatona".into(),
            city: "Luanda".into(),
            province: "Luanda".into(),
            municipality: "Belas".into(),
            manager_ids: vec![],
        }
    }

    async fn account(pool: &SqlitePool, username: &str) -> i64 {
        sqlx::query_scalar(
            "INSERT INTO account (username, email, password_hash, created_at) VALUES (?, ?, 'x', 0) RETURNING id",
        )
        .bind(username)
        .bind(format!("{username}@example.com"))
        .fetch_one(pool)
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn crud_and_managers() {
        let db = DbService::in_memory().await.unwrap();
        let pool = &db.pool;
        let a = account(pool, "a").await;
        let b = account(pool, "b").await;

        let mut data = payload("Loja Talatona");
        data.manager_ids = vec![a];
        let store = create(pool, data).await.unwrap();
        assert_eq!(store.manager_ids, vec![a]);

        let updated = update(
            pool,
            store.id,
            StoreUpdate {
                city: Some("Benguela".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.city, "Benguela");
        assert_eq!(updated.name, "Loja Talatona");

        let store = set_managers(pool, store.id, &[b]).await.unwrap();
        assert_eq!(store.manager_ids, vec![b]);
        assert!(!is_manager(pool, store.id, a).await.unwrap());
        assert_eq!(managed_store_ids(pool, b).await.unwrap(), vec![store.id]);

        let other = create(pool, payload("Loja B")).await.unwrap();
        let all = find_all(pool, None).await.unwrap();
        assert_eq!(all.len(), 2);
        let only = find_all(pool, Some(&[other.id])).await.unwrap();
        assert_eq!(only.len(), 1);
        assert!(find_all(pool, Some(&[])).await.unwrap().is_empty());

        assert!(delete(pool, other.id).await.unwrap());
        assert!(!delete(pool, other.id).await.unwrap());
        assert!(matches!(
            update(pool, other.id, StoreUpdate::default()).await,
            Err(RepoError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn stats_of_empty_store() {
        let db = DbService::in_memory().await.unwrap();
        let store = create(&db.pool, payload("Vazia")).await.unwrap();
        let stats = stats(&db.pool, store.id).await.unwrap();
        assert_eq!(stats.total_sales, 0);
        assert!(stats.stock_value.is_zero());
        assert!(stats.product_ranking.is_empty());
    }
}
