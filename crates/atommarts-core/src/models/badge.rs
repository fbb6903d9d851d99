//! Status badge colors shared by every table.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum BadgeColor {
    Success,
    Warning,
    Info,
    Error,
    Default,
}

impl BadgeColor {
    /// Order lifecycle: pending, completed, cancelled, refunded
    pub fn for_order_status(status: &str) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "completed" => BadgeColor::Success,
            "pending" => BadgeColor::Warning,
            "cancelled" => BadgeColor::Error,
            "refunded" => BadgeColor::Info,
            _ => BadgeColor::Default,
        }
    }

    /// Order payment: pending, paid, failed, refunded
    pub fn for_payment_status(status: &str) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "paid" => BadgeColor::Success,
            "pending" => BadgeColor::Warning,
            "failed" => BadgeColor::Error,
            "refunded" => BadgeColor::Info,
            _ => BadgeColor::Default,
        }
    }

    /// Vendor payout: pending, processing, completed, rejected, failed
    pub fn for_payout_status(status: &str) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "completed" => BadgeColor::Success,
            "pending" => BadgeColor::Warning,
            "processing" => BadgeColor::Info,
            "rejected" | "failed" => BadgeColor::Error,
            _ => BadgeColor::Default,
        }
    }

    /// Product moderation: pending, approved, rejected
    pub fn for_moderation_status(status: &str) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "approved" => BadgeColor::Success,
            "pending" => BadgeColor::Warning,
            "rejected" => BadgeColor::Error,
            _ => BadgeColor::Default,
        }
    }

    pub fn for_active(is_active: bool) -> Self {
        if is_active {
            BadgeColor::Success
        } else {
            BadgeColor::Error
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeColor::Success => "success",
            BadgeColor::Warning => "warning",
            BadgeColor::Info => "info",
            BadgeColor::Error => "error",
            BadgeColor::Default => "default",
        }
    }
}

impl std::fmt::Display for BadgeColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_colors() {
        assert_eq!(BadgeColor::for_order_status("completed"), BadgeColor::Success);
        assert_eq!(BadgeColor::for_order_status("pending"), BadgeColor::Warning);
        assert_eq!(BadgeColor::for_order_status("cancelled"), BadgeColor::Error);
        assert_eq!(BadgeColor::for_order_status("refunded"), BadgeColor::Info);
        assert_eq!(BadgeColor::for_order_status("shipped"), BadgeColor::Default);
    }

    #[test]
    fn test_payment_status_colors() {
        assert_eq!(BadgeColor::for_payment_status("paid"), BadgeColor::Success);
        assert_eq!(BadgeColor::for_payment_status("failed"), BadgeColor::Error);
        assert_eq!(BadgeColor::for_payment_status(""), BadgeColor::Default);
    }

    #[test]
    fn test_payout_status_is_case_insensitive() {
        assert_eq!(BadgeColor::for_payout_status("COMPLETED"), BadgeColor::Success);
        assert_eq!(BadgeColor::for_payout_status("Processing"), BadgeColor::Info);
        assert_eq!(BadgeColor::for_payout_status("rejected"), BadgeColor::Error);
        assert_eq!(BadgeColor::for_payout_status("failed"), BadgeColor::Error);
        assert_eq!(BadgeColor::for_payout_status("on hold"), BadgeColor::Default);
    }

    #[test]
    fn test_moderation_and_active_colors() {
        assert_eq!(BadgeColor::for_moderation_status("approved"), BadgeColor::Success);
        assert_eq!(BadgeColor::for_moderation_status("rejected"), BadgeColor::Error);
        assert_eq!(BadgeColor::for_active(true), BadgeColor::Success);
        assert_eq!(BadgeColor::for_active(false), BadgeColor::Error);
        assert_eq!(BadgeColor::Warning.to_string(), "warning");
    }
}
