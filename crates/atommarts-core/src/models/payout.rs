use serde::{Deserialize, Serialize};

use super::BadgeColor;

/// Default number of payout requests per page
pub const DEFAULT_PAYOUT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct PayoutRequest {
    pub request_id: i64,
    pub vendor_id: i64,
    pub business_name: String,
    pub vendor_email: String,
    pub amount: f64,
    pub status: String,
    pub payment_method: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub request_date: String,
    pub processed_date: Option<String>,
    pub processed_by: Option<String>,
    #[serde(default)]
    pub available_balance: f64,
    #[serde(default)]
    pub pending_balance: f64,
}

impl PayoutRequest {
    pub fn badge(&self) -> BadgeColor {
        BadgeColor::for_payout_status(&self.status)
    }

    /// Only pending requests can be approved or rejected.
    pub fn is_actionable(&self) -> bool {
        self.status.eq_ignore_ascii_case("pending")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayoutPagination {
    #[serde(default)]
    pub total: u64,
    #[serde(rename = "totalPages", default)]
    pub total_pages: u32,
}

/// `GET /api/admin/payouts` response. A body without `data` reads as empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PayoutPage {
    #[serde(default)]
    pub data: Vec<PayoutRequest>,
    #[serde(default)]
    pub pagination: PayoutPagination,
}

/// Query for the payout review table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayoutFilter {
    pub status: String,
    pub vendor_id: Option<String>,
    pub page: u32,
    pub limit: u32,
}

impl Default for PayoutFilter {
    fn default() -> Self {
        Self {
            status: "pending".to_string(),
            vendor_id: None,
            page: 1,
            limit: DEFAULT_PAYOUT_PAGE_SIZE,
        }
    }
}

impl PayoutFilter {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("status", self.status.clone())];
        if let Some(vendor) = self.vendor_id.as_deref().filter(|v| !v.is_empty()) {
            pairs.push(("vendor_id", vendor.to_string()));
        }
        pairs.push(("page", self.page.to_string()));
        pairs.push(("limit", self.limit.to_string()));
        pairs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PayoutAction {
    Approve,
    Reject,
}

/// Body of `POST /api/admin/payouts/process`.
#[derive(Debug, Clone, Serialize)]
pub struct PayoutDecision {
    pub request_id: i64,
    pub action: PayoutAction,
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_reference: Option<String>,
}

impl PayoutDecision {
    /// The transaction reference only travels with an approval.
    pub fn new(
        request_id: i64,
        action: PayoutAction,
        notes: impl Into<String>,
        transaction_reference: Option<String>,
    ) -> Self {
        let transaction_reference = match action {
            PayoutAction::Approve => transaction_reference.filter(|r| !r.is_empty()),
            PayoutAction::Reject => None,
        };
        Self {
            request_id,
            action,
            notes: notes.into(),
            transaction_reference,
        }
    }
}
