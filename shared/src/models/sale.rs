//! Sale Model

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::stock::ItemKind;

/// A recorded sale of one stock line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: i64,
    pub store_id: i64,
    pub stock_line_id: i64,
    pub item_kind: ItemKind,
    pub item_id: i64,
    pub item_name: String,
    pub quantity: i64,
    /// Catalog price at the time of sale
    pub unit_price: Decimal,
    /// quantity × unit_price
    pub total_value: Decimal,
    pub seller_id: i64,
    pub seller_name: String,
    /// Unix millis
    pub sold_at: i64,
    /// UTC date of `sold_at`
    pub business_date: NaiveDate,
    pub note: Option<String>,
}

/// Register sale payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleCreate {
    pub stock_line_id: i64,
    pub item_kind: ItemKind,
    pub quantity: i64,
    pub note: Option<String>,
}

/// Sale list filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaleQuery {
    pub store_id: Option<i64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub seller_id: Option<i64>,
}

/// Store and day for [`DaySalesTotal`]; the date defaults to today
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySalesQuery {
    pub store_id: i64,
    pub date: Option<NaiveDate>,
}

/// Sales of one store on one day
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaySalesTotal {
    pub sales_count: i64,
    pub units_sold: i64,
    pub total_value: Decimal,
}
