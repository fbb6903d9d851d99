//! API client for the marketplace admin REST API.
//!
//! This module provides the `ApiClient` struct for signing in, exchanging
//! refresh tokens, and making authenticated requests for the dashboard's
//! payouts, products, categories, orders and statistics.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::auth::TokenRefresher;
use crate::config::Config;
use crate::models::category::CATEGORY_PAGE_SIZE;
use crate::models::order::RECENT_ORDERS_LIMIT;
use crate::models::{
    CategoriesResponse, Category, ModerationDecision, MonthlyStats, NewCategory, Order,
    OrdersResponse, PasswordChange, PayoutDecision, PayoutFilter, PayoutPage, ProductPage, User,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Token exchange endpoint
const REFRESH_PATH: &str = "/api/auth/refresh";

/// Sign-in endpoint
const LOGIN_PATH: &str = "/api/auth/login";

/// Maximum number of retries for rate-limited (429) requests.
/// 3 retries with exponential backoff usually succeeds without excessive delay.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Credentials issued by the sign-in endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub refresh_token: String,
    pub user: User,
    #[serde(default)]
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    token: Option<String>,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChangePasswordRequest<'a> {
    current_password: &'a str,
    new_password: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    message: Option<String>,
}

/// API client for the admin backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a client for the configured API host
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_base_url(
            config.base_url(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn bearer(&self) -> Result<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| ApiError::NotSignedIn.into())
    }

    // ===== Authentication =====

    /// Sign in with email and password
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let response = self
            .client
            .post(self.url(LOGIN_PATH))
            .json(&LoginRequest { email, password })
            .send()
            .await
            .context("Failed to send sign-in request")?;

        let response = Self::check_response(response).await?;
        response.json().await.context("Failed to parse sign-in response")
    }

    /// Exchange a refresh token for a new access token. Single attempt.
    pub async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<String> {
        let response = self
            .client
            .post(self.url(REFRESH_PATH))
            .json(&RefreshRequest { refresh_token })
            .send()
            .await
            .context("Failed to send refresh request")?;

        let response = Self::check_response(response).await?;
        let body: RefreshResponse = response
            .json()
            .await
            .context("Failed to parse refresh response")?;

        body.token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::InvalidResponse("refresh response has no token".to_string()).into())
    }

    /// Change the signed-in user's password. The form is validated first and
    /// nothing is sent when it has errors.
    pub async fn change_password(&self, form: &PasswordChange) -> Result<String> {
        let errors = form.validate();
        if !errors.is_empty() {
            let messages: Vec<&str> = errors.iter().map(|e| e.message).collect();
            return Err(anyhow::anyhow!(messages.join("; ")));
        }

        let body = ChangePasswordRequest {
            current_password: &form.current_password,
            new_password: &form.new_password,
        };
        let response: MessageResponse = self.post("/api/auth/change-password", &body).await?;
        Ok(response
            .message
            .unwrap_or_else(|| "Password changed successfully".to_string()))
    }

    // ===== Response handling =====

    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(response: Response) -> Result<Option<Response>> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// Send the request built by `build`, retrying 429s with exponential backoff.
    async fn send_with_retry<F>(&self, url: &str, build: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = build()
                .send()
                .await
                .with_context(|| format!("Failed to send request to {}", url))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => return Ok(response),
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited.into());
                    }
                    warn!(url = url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2;
                }
            }
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let token = self.bearer()?;
        let url = self.url(path);
        let response = self
            .send_with_retry(&url, || self.client.get(&url).bearer_auth(token).query(query))
            .await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let token = self.bearer()?;
        let url = self.url(path);
        let response = self
            .send_with_retry(&url, || self.client.post(&url).bearer_auth(token).json(body))
            .await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    /// Send once and discard the body. For mutations the dashboard only
    /// needs to know succeeded.
    async fn send_discarding(&self, request: RequestBuilder, what: &str) -> Result<()> {
        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to send {} request", what))?;
        Self::check_response(response).await?;
        Ok(())
    }

    // ===== Payouts =====

    /// Fetch one page of vendor payout requests
    pub async fn fetch_payouts(&self, filter: &PayoutFilter) -> Result<PayoutPage> {
        let page: PayoutPage = self.get("/api/admin/payouts", &filter.query_pairs()).await?;
        debug!(count = page.data.len(), total = page.pagination.total, "Payouts fetched");
        Ok(page)
    }

    /// Approve or reject a payout request
    pub async fn process_payout(&self, decision: &PayoutDecision) -> Result<()> {
        let token = self.bearer()?;
        let request = self
            .client
            .post(self.url("/api/admin/payouts/process"))
            .bearer_auth(token)
            .json(decision);
        self.send_discarding(request, "payout processing").await
    }

    // ===== Products =====

    /// Fetch one page of the product moderation queue
    pub async fn fetch_moderation_queue(
        &self,
        page: u32,
        limit: u32,
        search: Option<&str>,
    ) -> Result<ProductPage> {
        let query = page_query(page, limit, search);
        self.get("/api/admin/products/moderation", &query).await
    }

    /// Set a product's moderation status
    pub async fn moderate_product(&self, product_id: i64, decision: &ModerationDecision) -> Result<()> {
        let token = self.bearer()?;
        let request = self
            .client
            .patch(self.url(&format!("/api/admin/products/{}/moderate", product_id)))
            .bearer_auth(token)
            .json(decision);
        self.send_discarding(request, "product moderation").await
    }

    // ===== Categories =====

    /// Fetch one page of categories with the total item count
    pub async fn fetch_categories(
        &self,
        page: u32,
        search: Option<&str>,
    ) -> Result<(Vec<Category>, u64)> {
        let query = page_query(page, CATEGORY_PAGE_SIZE, search);
        let response: CategoriesResponse = self.get("/api/category", &query).await?;
        Ok(response.into_parts())
    }

    /// Create a category. Sent as a multipart form so an image can ride along.
    pub async fn create_category(&self, category: &NewCategory) -> Result<()> {
        let token = self.bearer()?;

        let mut form = Form::new()
            .text("name", category.name.clone())
            .text("description", category.description.clone())
            .text("is_active", category.is_active.to_string());
        if let Some(parent_id) = category.parent_id {
            form = form.text("parent_id", parent_id.to_string());
        }
        if let Some(ref path) = category.image {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read image {}", path.display()))?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image".to_string());
            form = form.part("image", Part::bytes(bytes).file_name(file_name));
        }

        let request = self
            .client
            .post(self.url("/api/category"))
            .bearer_auth(token)
            .multipart(form);
        self.send_discarding(request, "category creation").await
    }

    pub async fn delete_category(&self, category_id: i64) -> Result<()> {
        let token = self.bearer()?;
        let request = self
            .client
            .delete(self.url(&format!("/api/category/{}", category_id)))
            .bearer_auth(token);
        self.send_discarding(request, "category deletion").await
    }

    // ===== Orders & statistics =====

    /// Fetch the most recent orders, newest first
    pub async fn fetch_recent_orders(&self) -> Result<Vec<Order>> {
        let query = [
            ("limit", RECENT_ORDERS_LIMIT.to_string()),
            ("sortBy", "created_at".to_string()),
            ("sortOrder", "desc".to_string()),
        ];
        let response: OrdersResponse = self.get("/api/admin/orders", &query).await?;
        Ok(response.data)
    }

    /// Fetch the monthly order and customer series for the dashboard charts
    pub async fn fetch_monthly_stats(&self) -> Result<MonthlyStats> {
        self.get("/api/dashboard/monthly-stats", &[]).await
    }
}

#[async_trait]
impl TokenRefresher for ApiClient {
    async fn refresh(&self, refresh_token: &str) -> Option<String> {
        match self.exchange_refresh_token(refresh_token).await {
            Ok(token) => Some(token),
            Err(e) => {
                warn!(error = %e, "Token refresh failed");
                None
            }
        }
    }
}

/// `limit`/`page` plus `search` when there is something to search for.
fn page_query(page: u32, limit: u32, search: Option<&str>) -> Vec<(&'static str, String)> {
    let mut query = vec![("limit", limit.to_string()), ("page", page.to_string())];
    if let Some(term) = search.map(str::trim).filter(|s| !s.is_empty()) {
        query.push(("search", term.to_string()));
    }
    query
}
