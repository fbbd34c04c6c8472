//! Store Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Angola's 18 provinces
pub const PROVINCES: [&str; 18] = [
    "Bengo",
    "Benguela",
    "Bié",
    "Cabinda",
    "Cuando-Cubango",
    "Cuanza-Norte",
    "Cuanza-Sul",
    "Cunene",
    "Huambo",
    "Huíla",
    "Luanda",
    "Lunda-Norte",
    "Lunda-Sul",
    "Malanje",
    "Moxico",
    "Namibe",
    "Uíge",
    "Zaire",
];

pub fn is_valid_province(province: &str) -> bool {
    PROVINCES.contains(&province)
}

/// Store entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Store {
    pub id: i64,
    pub name: String,
    pub neighborhood: String,
    pub city: String,
    pub province: String,
    pub municipality: String,
    pub created_at: i64,
    pub updated_at: i64,

    // -- Relations (populated by application code, skipped by FromRow) --
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub manager_ids: Vec<i64>,
}

/// Create store payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreCreate {
    pub name: String,
    pub neighborhood: String,
    pub city: String,
    pub province: String,
    pub municipality: String,
    #[serde(default)]
    pub manager_ids: Vec<i64>,
}

/// Update store payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreUpdate {
    pub name: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub municipality: Option<String>,
}

/// Replace the managers of a store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreManagersUpdate {
    pub account_ids: Vec<i64>,
}

/// Units sold of one product or recharge at a store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSoldCount {
    pub item_id: i64,
    pub name: String,
    pub quantity_sold: i64,
    pub total_value: Decimal,
}

/// Lifetime statistics of a store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreStats {
    /// Number of sale transactions
    pub total_sales: i64,
    pub total_sales_value: Decimal,
    /// Sum of sold quantities
    pub total_items_sold: i64,
    /// Distinct product lines with quantity > 0
    pub products_in_stock: i64,
    /// Distinct recharge lines with quantity > 0
    pub recharges_in_stock: i64,
    pub total_stock_items: i64,
    /// Σ quantity × current price
    pub stock_value: Decimal,
    pub low_stock: i64,
    pub out_of_stock: i64,
    pub product_ranking: Vec<ItemSoldCount>,
    pub recharge_ranking: Vec<ItemSoldCount>,
}

/// Store with its statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreDetail {
    #[serde(flatten)]
    pub store: Store,
    pub stats: StoreStats,
}
