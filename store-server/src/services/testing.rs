//! Fixtures shared by service tests

use rust_decimal::Decimal;
use shared::models::{AccountCreate, ProductCreate, RechargeCreate, Role, StoreCreate};
use sqlx::SqlitePool;

use crate::auth::CurrentUser;
use crate::db::repository::{account, catalog, store};

pub(crate) struct Seed {
    pub admin: CurrentUser,
    /// Manages `store_id` only
    pub manager: CurrentUser,
    /// Manager without stores
    pub outsider: CurrentUser,
    pub store_id: i64,
    pub other_store: i64,
    /// Priced 100.00
    pub product_id: i64,
    /// Priced 500.00
    pub recharge_id: i64,
}

async fn user(pool: &SqlitePool, username: &str, superuser: bool) -> CurrentUser {
    let created = account::create(
        pool,
        AccountCreate {
            username: username.into(),
            email: format!("{username}@example.com"),
            full_name: None,
            password: "secret1".into(),
            is_superuser: Some(superuser),
        },
        "hash",
    )
    .await
    .unwrap();
    CurrentUser {
        id: created.id,
        username: created.username,
        role: if superuser { Role::Superuser } else { Role::Manager },
    }
}

fn store_payload(name: &str, managers: Vec<i64>) -> StoreCreate {
    StoreCreate {
        name: name.into(),
        neighborhood: "Maianga".into(),
        city: "Luanda".into(),
        province: "Luanda".into(),
        municipality: "Luanda".into(),
        manager_ids: managers,
    }
}

pub(crate) async fn seed(pool: &SqlitePool) -> Seed {
    let admin = user(pool, "admin", true).await;
    let manager = user(pool, "gestor", false).await;
    let outsider = user(pool, "outro", false).await;
    let store_id = store::create(pool, store_payload("Loja Centro", vec![manager.id]))
        .await
        .unwrap()
        .id;
    let other_store = store::create(pool, store_payload("Loja Norte", vec![]))
        .await
        .unwrap()
        .id;
    let product_id = catalog::create_product(
        pool,
        ProductCreate {
            name: "Capa de telemóvel".into(),
            price: Decimal::new(10000, 2),
        },
    )
    .await
    .unwrap()
    .id;
    let recharge_id = catalog::create_recharge(
        pool,
        RechargeCreate {
            name: "Unitel 500".into(),
            price: Decimal::new(50000, 2),
        },
    )
    .await
    .unwrap()
    .id;

    Seed {
        admin,
        manager,
        outsider,
        store_id,
        other_store,
        product_id,
        recharge_id,
    }
}
