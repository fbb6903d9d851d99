use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::BadgeColor;

/// Categories per page
pub const CATEGORY_PAGE_SIZE: u32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    pub created_at: String,
}

impl Category {
    pub fn badge(&self) -> BadgeColor {
        BadgeColor::for_active(self.is_active)
    }

    pub fn status_label(&self) -> &'static str {
        if self.is_active {
            "Active"
        } else {
            "Inactive"
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryPagination {
    #[serde(default)]
    pub total: u64,
}

/// `GET /api/category` answers either a paginated envelope or a bare list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CategoriesResponse {
    Paginated {
        data: Vec<Category>,
        #[serde(default)]
        pagination: Option<CategoryPagination>,
    },
    Bare(Vec<Category>),
}

impl CategoriesResponse {
    /// Rows and the total item count. Falls back to the row count when the
    /// server gives no usable total.
    pub fn into_parts(self) -> (Vec<Category>, u64) {
        match self {
            CategoriesResponse::Paginated { data, pagination } => {
                let total = pagination
                    .map(|p| p.total)
                    .filter(|t| *t > 0)
                    .unwrap_or(data.len() as u64);
                (data, total)
            }
            CategoriesResponse::Bare(data) => {
                let total = data.len() as u64;
                (data, total)
            }
        }
    }
}

/// Fields of the "add category" form.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub description: String,
    pub is_active: bool,
    pub parent_id: Option<i64>,
    pub image: Option<PathBuf>,
}

impl NewCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            is_active: true,
            parent_id: None,
            image: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATEGORY: &str = r#"{"id": 2, "name": "Fonts", "description": null, "image_url": null, "is_active": true, "created_at": "2025-01-04T00:00:00Z"}"#;

    #[test]
    fn test_paginated_response() {
        let json = format!(r#"{{"data": [{}], "pagination": {{"total": 14}}}}"#, CATEGORY);
        let resp: CategoriesResponse = serde_json::from_str(&json).expect("Failed to parse categories JSON");
        let (rows, total) = resp.into_parts();
        assert_eq!(rows.len(), 1);
        assert_eq!(total, 14);
        assert_eq!(rows[0].badge(), BadgeColor::Success);
    }

    #[test]
    fn test_bare_list_response() {
        let json = format!("[{0}, {0}]", CATEGORY);
        let resp: CategoriesResponse = serde_json::from_str(&json).expect("Failed to parse categories JSON");
        let (rows, total) = resp.into_parts();
        assert_eq!(rows.len(), 2);
        assert_eq!(total, 2);
    }

    #[test]
    fn test_missing_total_falls_back_to_row_count() {
        let json = format!(r#"{{"data": [{}]}}"#, CATEGORY);
        let resp: CategoriesResponse = serde_json::from_str(&json).expect("Failed to parse categories JSON");
        assert_eq!(resp.into_parts().1, 1);
    }
}
