//! Data models for the marketplace admin API.
//!
//! This module contains the payloads the dashboard reads and writes:
//!
//! - `User`, `PasswordChange`: the signed-in staff member
//! - `PayoutRequest`, `PayoutFilter`, `PayoutAction`: vendor payout review
//! - `Product`, `ModerationStatus`: product moderation queue
//! - `Category`, `NewCategory`: catalog categories
//! - `Order`, `OrderItem`: recent orders
//! - `MonthlyStats`: dashboard chart series
//! - `BadgeColor`, `Pagination`: presentation helpers shared by every table

pub mod badge;
pub mod category;
pub mod order;
pub mod pagination;
pub mod payout;
pub mod product;
pub mod stats;
pub mod user;

pub use badge::BadgeColor;
pub use category::{CategoriesResponse, Category, NewCategory};
pub use order::{Order, OrderItem, OrdersResponse};
pub use pagination::Pagination;
pub use payout::{
    PayoutAction, PayoutDecision, PayoutFilter, PayoutPage, PayoutPagination, PayoutRequest,
};
pub use product::{ModerationDecision, ModerationStatus, Product, ProductPage};
pub use stats::{CustomerMonth, MonthlyStats, OrderMonth};
pub use user::{FieldError, PasswordChange, User};
