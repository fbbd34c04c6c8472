//! Catalog Models (products and recharge vouchers)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub created_at: i64,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub price: Decimal,
}

/// Update product payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<Decimal>,
}

/// Recharge voucher type (e.g. "Unitel 1000")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recharge {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub created_at: i64,
}

/// Create recharge payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RechargeCreate {
    pub name: String,
    pub price: Decimal,
}

/// Update recharge payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RechargeUpdate {
    pub name: Option<String>,
    pub price: Option<Decimal>,
}
