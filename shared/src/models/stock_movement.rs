//! Stock Movement Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::stock::ItemKind;

/// Accepted reasons for incoming stock
pub const ENTRY_REASONS: [&str; 5] = [
    "purchase",
    "transfer_in",
    "customer_return",
    "inventory",
    "other",
];

/// Accepted reasons for outgoing stock
pub const EXIT_REASONS: [&str; 6] = [
    "sale",
    "transfer_out",
    "loss",
    "internal_use",
    "inventory",
    "other",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Entry,
    Exit,
    Adjustment,
    Return,
    Transfer,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entry => "entry",
            Self::Exit => "exit",
            Self::Adjustment => "adjustment",
            Self::Return => "return",
            Self::Transfer => "transfer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "entry" => Some(Self::Entry),
            "exit" => Some(Self::Exit),
            "adjustment" => Some(Self::Adjustment),
            "return" => Some(Self::Return),
            "transfer" => Some(Self::Transfer),
            _ => None,
        }
    }

    /// Prefix of the movement reference
    pub fn reference_prefix(&self) -> &'static str {
        match self {
            Self::Entry => "ENT",
            Self::Exit => "SAI",
            Self::Adjustment => "AJT",
            Self::Return => "DEV",
            Self::Transfer => "TRF",
        }
    }

    /// Reason recorded when the caller gives none
    pub fn default_reason(&self) -> Option<&'static str> {
        match self {
            Self::Entry => Some("purchase"),
            Self::Exit => Some("sale"),
            Self::Adjustment => Some("inventory"),
            _ => None,
        }
    }

    pub fn accepts_reason(&self, reason: &str) -> bool {
        match self {
            Self::Entry => ENTRY_REASONS.contains(&reason),
            Self::Exit => EXIT_REASONS.contains(&reason),
            _ => true,
        }
    }
}

/// One audited change of a stock line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: i64,
    pub reference: String,
    pub kind: MovementKind,
    pub store_id: i64,
    pub stock_line_id: i64,
    pub item_kind: ItemKind,
    pub item_id: i64,
    pub quantity_before: i64,
    pub quantity_moved: i64,
    pub quantity_after: i64,
    pub unit_cost: Decimal,
    pub total_cost: Decimal,
    pub unit_sale_price: Decimal,
    pub reason: Option<String>,
    pub reason_detail: Option<String>,
    pub supplier: Option<String>,
    pub invoice_number: Option<String>,
    pub sale_id: Option<i64>,
    pub created_by: Option<i64>,
    pub created_at: i64,
}

/// Movement list filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovementQuery {
    pub store_id: Option<i64>,
    pub kind: Option<MovementKind>,
    pub limit: Option<i64>,
}
