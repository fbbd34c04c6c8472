//! Catalog Repository (products and recharges)
//!
//! Both tables share one shape: `id, name, price (cents), created_at`.

use super::{RepoError, RepoResult, cents};
use rust_decimal::Decimal;
use shared::models::{
    ItemKind, Product, ProductCreate, ProductUpdate, Recharge, RechargeCreate, RechargeUpdate,
};
use shared::money::from_cents;
use sqlx::SqlitePool;

#[derive(sqlx::FromRow)]
struct CatalogRow {
    id: i64,
    name: String,
    price: i64,
    created_at: i64,
}

impl From<CatalogRow> for Product {
    fn from(row: CatalogRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            price: from_cents(row.price),
            created_at: row.created_at,
        }
    }
}

impl From<CatalogRow> for Recharge {
    fn from(row: CatalogRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            price: from_cents(row.price),
            created_at: row.created_at,
        }
    }
}

fn table(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Product => "product",
        ItemKind::Recharge => "recharge",
    }
}

fn label(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Product => "Product",
        ItemKind::Recharge => "Recharge",
    }
}

async fn find_all(pool: &SqlitePool, kind: ItemKind) -> RepoResult<Vec<CatalogRow>> {
    let sql = format!(
        "SELECT id, name, price, created_at FROM {} ORDER BY name, id",
        table(kind)
    );
    Ok(sqlx::query_as::<_, CatalogRow>(&sql).fetch_all(pool).await?)
}

async fn find_by_id(pool: &SqlitePool, kind: ItemKind, id: i64) -> RepoResult<Option<CatalogRow>> {
    let sql = format!(
        "SELECT id, name, price, created_at FROM {} WHERE id = ?",
        table(kind)
    );
    Ok(sqlx::query_as::<_, CatalogRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?)
}

async fn create(
    pool: &SqlitePool,
    kind: ItemKind,
    name: &str,
    price: Decimal,
) -> RepoResult<CatalogRow> {
    let sql = format!(
        "INSERT INTO {} (name, price, created_at) VALUES (?, ?, ?) RETURNING id",
        table(kind)
    );
    let id: i64 = sqlx::query_scalar(&sql)
        .bind(name.trim())
        .bind(cents(price, "price")?)
        .bind(shared::util::now_millis())
        .fetch_one(pool)
        .await?;
    find_by_id(pool, kind, id)
        .await?
        .ok_or_else(|| RepoError::Database(format!("Failed to create {}", table(kind))))
}

async fn update(
    pool: &SqlitePool,
    kind: ItemKind,
    id: i64,
    name: Option<String>,
    price: Option<Decimal>,
) -> RepoResult<CatalogRow> {
    let sql = format!(
        "UPDATE {} SET name = COALESCE(?1, name), price = COALESCE(?2, price) WHERE id = ?3",
        table(kind)
    );
    let rows = sqlx::query(&sql)
        .bind(name.as_deref().map(str::trim))
        .bind(price.map(|p| cents(p, "price")).transpose()?)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("{} {id} not found", label(kind))));
    }
    find_by_id(pool, kind, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("{} {id} not found", label(kind))))
}

/// Delete an item and its (sale-free) stock lines.
///
/// Items that were ever sold are kept so sale history stays intact.
async fn delete(pool: &SqlitePool, kind: ItemKind, id: i64) -> RepoResult<bool> {
    let mut tx = pool.begin().await?;
    let sales: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM sale WHERE item_kind = ? AND item_id = ?")
            .bind(kind.as_str())
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
    if sales > 0 {
        return Err(RepoError::Validation(format!(
            "{} {id} has {sales} sales and cannot be deleted",
            label(kind)
        )));
    }
    sqlx::query("DELETE FROM stock_line WHERE item_kind = ? AND item_id = ?")
        .bind(kind.as_str())
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let sql = format!("DELETE FROM {} WHERE id = ?", table(kind));
    let rows = sqlx::query(&sql).bind(id).execute(&mut *tx).await?;
    tx.commit().await?;
    Ok(rows.rows_affected() > 0)
}

/// Name and current price of any catalog item
pub async fn item_info(
    pool: &SqlitePool,
    kind: ItemKind,
    id: i64,
) -> RepoResult<Option<(String, Decimal)>> {
    Ok(find_by_id(pool, kind, id)
        .await?
        .map(|row| (row.name, from_cents(row.price))))
}

// ── Products ────────────────────────────────────────────────────────

pub async fn find_all_products(pool: &SqlitePool) -> RepoResult<Vec<Product>> {
    Ok(find_all(pool, ItemKind::Product)
        .await?
        .into_iter()
        .map(Product::from)
        .collect())
}

pub async fn find_product(pool: &SqlitePool, id: i64) -> RepoResult<Option<Product>> {
    Ok(find_by_id(pool, ItemKind::Product, id).await?.map(Product::from))
}

pub async fn create_product(pool: &SqlitePool, data: ProductCreate) -> RepoResult<Product> {
    Ok(create(pool, ItemKind::Product, &data.name, data.price).await?.into())
}

pub async fn update_product(
    pool: &SqlitePool,
    id: i64,
    data: ProductUpdate,
) -> RepoResult<Product> {
    Ok(update(pool, ItemKind::Product, id, data.name, data.price)
        .await?
        .into())
}

pub async fn delete_product(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    delete(pool, ItemKind::Product, id).await
}

// ── Recharges ───────────────────────────────────────────────────────

pub async fn find_all_recharges(pool: &SqlitePool) -> RepoResult<Vec<Recharge>> {
    Ok(find_all(pool, ItemKind::Recharge)
        .await?
        .into_iter()
        .map(Recharge::from)
        .collect())
}

pub async fn find_recharge(pool: &SqlitePool, id: i64) -> RepoResult<Option<Recharge>> {
    Ok(find_by_id(pool, ItemKind::Recharge, id)
        .await?
        .map(Recharge::from))
}

pub async fn create_recharge(pool: &SqlitePool, data: RechargeCreate) -> RepoResult<Recharge> {
    Ok(create(pool, ItemKind::Recharge, &data.name, data.price)
        .await?
        .into())
}

pub async fn update_recharge(
    pool: &SqlitePool,
    id: i64,
    data: RechargeUpdate,
) -> RepoResult<Recharge> {
    Ok(update(pool, ItemKind::Recharge, id, data.name, data.price)
        .await?
        .into())
}

pub async fn delete_recharge(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    delete(pool, ItemKind::Recharge, id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    #[tokio::test]
    async fn product_crud_keeps_cents() {
        let db = DbService::in_memory().await.unwrap();
        let pool = &db.pool;

        let product = create_product(
            pool,
            ProductCreate {
                name: " Carregador USB ".into(),
                price: Decimal::new(250050, 2),
            },
        )
        .await
        .unwrap();
        assert_eq!(product.name, "Carregador USB");
        assert_eq!(product.price, Decimal::new(250050, 2));

        let updated = update_product(
            pool,
            product.id,
            ProductUpdate {
                price: Some(Decimal::new(3000, 0)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.price, Decimal::new(3000, 0));
        assert_eq!(updated.name, "Carregador USB");

        assert_eq!(find_all_products(pool).await.unwrap().len(), 1);
        assert!(find_all_recharges(pool).await.unwrap().is_empty());

        assert!(delete_product(pool, product.id).await.unwrap());
        assert!(find_product(pool, product.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn recharge_update_missing() {
        let db = DbService::in_memory().await.unwrap();
        let err = update_recharge(&db.pool, 7, RechargeUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(msg) if msg == "Recharge 7 not found"));
    }

    #[tokio::test]
    async fn price_beyond_cents_range_is_not_stored() {
        let db = DbService::in_memory().await.unwrap();
        let err = create_product(
            &db.pool,
            ProductCreate {
                name: "Gigante".into(),
                price: Decimal::from(100_000_000_000_000_000_i64),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::OutOfRange(_)));
        assert!(find_all_products(&db.pool).await.unwrap().is_empty());
    }
}
