use serde::{Deserialize, Serialize};

use super::BadgeColor;

/// Products per page in the moderation queue
pub const PRODUCT_PAGE_SIZE: u32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub compare_at_price: Option<f64>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub category_names: Option<String>,
    #[serde(default)]
    pub vendor_name: Option<String>,
    pub status: String,
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub reviews_count: i64,
}

impl Product {
    pub fn badge(&self) -> BadgeColor {
        BadgeColor::for_moderation_status(&self.status)
    }

    pub fn rating_display(&self) -> String {
        match self.average_rating {
            Some(r) => format!("{:.1} ({})", r, self.reviews_count),
            None => "No reviews".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPagination {
    #[serde(rename = "totalItems", default)]
    pub total_items: u64,
}

/// `GET /api/admin/products/moderation` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPage {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub pagination: ProductPagination,
}

/// Target state in a moderation decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::str::FromStr for ModerationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(ModerationStatus::Pending),
            "approved" | "approve" => Ok(ModerationStatus::Approved),
            "rejected" | "reject" => Ok(ModerationStatus::Rejected),
            other => Err(format!("Unknown moderation status: {}", other)),
        }
    }
}

/// Body of `PATCH /api/admin/products/{id}/moderate`.
#[derive(Debug, Clone, Serialize)]
pub struct ModerationDecision {
    pub status: ModerationStatus,
    pub review_notes: String,
}
