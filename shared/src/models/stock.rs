//! Stock Models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Below this quantity a stock line is "low"
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// What a stock line (and therefore a sale) holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Product,
    Recharge,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Recharge => "recharge",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "product" => Some(Self::Product),
            "recharge" => Some(Self::Recharge),
            _ => None,
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Out,
    Low,
    Normal,
}

impl StockStatus {
    pub fn from_quantity(quantity: i64) -> Self {
        if quantity <= 0 {
            Self::Out
        } else if quantity < LOW_STOCK_THRESHOLD {
            Self::Low
        } else {
            Self::Normal
        }
    }
}

/// Quantity of one product or recharge held at one store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockLine {
    pub id: i64,
    pub store_id: i64,
    pub item_kind: ItemKind,
    pub item_id: i64,
    pub item_name: String,
    /// Current catalog price
    pub unit_price: Decimal,
    pub quantity: i64,
    pub status: StockStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

impl StockLine {
    /// Value of the line at the current price
    pub fn stock_value(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Register incoming stock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockEntryCreate {
    pub store_id: i64,
    pub item_kind: ItemKind,
    pub item_id: i64,
    pub quantity: i64,
    #[serde(default)]
    pub unit_cost: Decimal,
    pub unit_sale_price: Option<Decimal>,
    pub reason: Option<String>,
    pub reason_detail: Option<String>,
    pub supplier: Option<String>,
    pub invoice_number: Option<String>,
}

/// Register outgoing stock (losses, transfers, returns to supplier)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockExitCreate {
    pub stock_line_id: i64,
    pub quantity: i64,
    pub reason: Option<String>,
    pub reason_detail: Option<String>,
}

/// Set the counted quantity of a stock line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAdjust {
    pub quantity: i64,
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_thresholds() {
        assert_eq!(StockStatus::from_quantity(0), StockStatus::Out);
        assert_eq!(StockStatus::from_quantity(1), StockStatus::Low);
        assert_eq!(StockStatus::from_quantity(9), StockStatus::Low);
        assert_eq!(StockStatus::from_quantity(10), StockStatus::Normal);
    }

    #[test]
    fn item_kind_serde() {
        assert_eq!(serde_json::to_string(&ItemKind::Recharge).unwrap(), "\"recharge\"");
        let kind: ItemKind = serde_json::from_str("\"product\"").unwrap();
        assert_eq!(kind, ItemKind::Product);
        assert!(serde_json::from_str::<ItemKind>("\"service\"").is_err());
        assert_eq!(ItemKind::parse("recharge"), Some(ItemKind::Recharge));
    }
}
