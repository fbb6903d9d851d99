use serde::{Deserialize, Serialize};

use super::stats::lenient_f64;
use super::BadgeColor;

/// Orders shown in the "recent orders" panel
pub const RECENT_ORDERS_LIMIT: u32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct OrderItem {
    pub order_item_id: i64,
    pub product_id: i64,
    pub product_name: String,
    #[serde(default)]
    pub product_sku: Option<String>,
    pub quantity: i64,
    #[serde(deserialize_with = "lenient_f64")]
    pub price: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub total_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Order {
    pub order_id: i64,
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub status: String,
    pub payment_status: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub total_amount: f64,
    pub created_at: String,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    pub fn status_badge(&self) -> BadgeColor {
        BadgeColor::for_order_status(&self.status)
    }

    pub fn payment_badge(&self) -> BadgeColor {
        BadgeColor::for_payment_status(&self.payment_status)
    }

    pub fn item_count_display(&self) -> String {
        match self.items.len() {
            1 => "1 item".to_string(),
            n => format!("{} items", n),
        }
    }
}

/// `GET /api/admin/orders` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrdersResponse {
    #[serde(default)]
    pub data: Vec<Order>,
}
