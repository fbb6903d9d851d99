//! Monthly dashboard statistics and the series derived from them.

use chrono::Datelike;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

/// Accept `12.5`, `"12.5"` or `null`; anything unparseable reads as zero.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<NumberOrString>::deserialize(deserializer)? {
        Some(NumberOrString::Number(n)) => n,
        Some(NumberOrString::Text(s)) => s.trim().parse().unwrap_or(0.0),
        None => 0.0,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderMonth {
    /// "YYYY-MM"
    pub month: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub revenue: f64,
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerMonth {
    pub month: String,
    #[serde(default)]
    pub count: u64,
}

/// `GET /api/dashboard/monthly-stats` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonthlyStats {
    #[serde(default)]
    pub orders: Vec<OrderMonth>,
    #[serde(default)]
    pub customers: Vec<CustomerMonth>,
}

/// Split "YYYY-MM" into a year and a zero-based month index.
fn month_slot(month: &str, year: i32) -> Option<usize> {
    let (y, m) = month.split_once('-')?;
    let y: i32 = y.trim().parse().ok()?;
    let m: usize = m.trim().get(..2).unwrap_or(m.trim()).parse().ok()?;
    (y == year && (1..=12).contains(&m)).then(|| m - 1)
}

impl MonthlyStats {
    /// Revenue per month of `year`.
    pub fn sales_for_year(&self, year: i32) -> [f64; 12] {
        let mut series = [0.0; 12];
        for order in &self.orders {
            if let Some(slot) = month_slot(&order.month, year) {
                series[slot] += order.revenue;
            }
        }
        series
    }

    /// Order count per month of `year`.
    pub fn orders_for_year(&self, year: i32) -> [u64; 12] {
        let mut series = [0; 12];
        for order in &self.orders {
            if let Some(slot) = month_slot(&order.month, year) {
                series[slot] += order.count;
            }
        }
        series
    }

    /// New customers per month of `year`.
    pub fn customers_for_year(&self, year: i32) -> [u64; 12] {
        let mut series = [0; 12];
        for customer in &self.customers {
            if let Some(slot) = month_slot(&customer.month, year) {
                series[slot] += customer.count;
            }
        }
        series
    }

    /// Customer growth of the current month over the previous one, in
    /// whole percent.
    pub fn customer_growth_now(&self) -> i64 {
        let today = chrono::Local::now().date_naive();
        let series = self.customers_for_year(today.year());
        growth_percentage(&series, today.month0() as usize)
    }
}

/// Month-over-month change in whole percent. Zero when either month is
/// zero. January compares against December of the same series.
pub fn growth_percentage(series: &[u64; 12], month_index: usize) -> i64 {
    let current = series[month_index % 12];
    let previous = series[(month_index + 11) % 12];
    if current == 0 || previous == 0 {
        return 0;
    }
    let growth = (current as f64 - previous as f64) / previous as f64 * 100.0;
    growth.round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> MonthlyStats {
        serde_json::from_str(
            r#"{
                "orders": [
                    {"month": "2025-01", "revenue": "150.25", "count": 3},
                    {"month": "2025-01", "revenue": 49.75, "count": 1},
                    {"month": "2025-03", "revenue": null, "count": 2},
                    {"month": "2024-12", "revenue": "99", "count": 1},
                    {"month": "garbage", "revenue": "1"}
                ],
                "customers": [
                    {"month": "2025-02", "count": 10},
                    {"month": "2025-03", "count": 15}
                ]
            }"#,
        )
        .expect("Failed to parse stats JSON")
    }

    #[test]
    fn test_sales_for_year() {
        let sales = stats().sales_for_year(2025);
        assert_eq!(sales[0], 200.0);
        assert_eq!(sales[2], 0.0);
        assert_eq!(sales.iter().sum::<f64>(), 200.0);
        assert_eq!(stats().sales_for_year(2024)[11], 99.0);
    }

    #[test]
    fn test_orders_and_customers_for_year() {
        let s = stats();
        assert_eq!(s.orders_for_year(2025)[0], 4);
        assert_eq!(s.orders_for_year(2025)[2], 2);
        let customers = s.customers_for_year(2025);
        assert_eq!(customers[1], 10);
        assert_eq!(customers[2], 15);
    }

    #[test]
    fn test_growth_percentage() {
        let customers = stats().customers_for_year(2025);
        assert_eq!(growth_percentage(&customers, 2), 50);
        // Previous month empty
        assert_eq!(growth_percentage(&customers, 1), 0);

        let mut wrap = [0u64; 12];
        wrap[11] = 4;
        wrap[0] = 3;
        assert_eq!(growth_percentage(&wrap, 0), -25);
    }

    #[test]
    fn test_month_slot() {
        assert_eq!(month_slot("2025-07", 2025), Some(6));
        assert_eq!(month_slot("2025-07-01", 2025), Some(6));
        assert_eq!(month_slot("2025-13", 2025), None);
        assert_eq!(month_slot("2024-07", 2025), None);
        assert_eq!(month_slot("July", 2025), None);
    }
}
