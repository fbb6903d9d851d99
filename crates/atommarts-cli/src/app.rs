//! Command handlers for the Atommarts admin CLI.
//!
//! `App` owns the configuration, the shared API client and the
//! `SessionManager`. Handlers pass the session's `view()` through a
//! `RouteGuard` before doing anything, the same way each screen of the
//! dashboard is wrapped in its guard.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Datelike;
use tracing::{debug, warn};

use atommarts_core::auth::{token, EndReason, DEFAULT_ROUTE, SIGN_IN_ROUTE};
use atommarts_core::models::category::CATEGORY_PAGE_SIZE;
use atommarts_core::models::product::PRODUCT_PAGE_SIZE;
use atommarts_core::models::{
    ModerationDecision, ModerationStatus, NewCategory, Pagination, PasswordChange, PayoutAction,
    PayoutDecision, PayoutFilter,
};
use atommarts_core::{
    ApiClient, Config, GuardDecision, InitOutcome, RouteGuard, SessionEnded, SessionManager,
};

use crate::render;

pub struct App {
    config: Config,
    api: ApiClient,
    session: SessionManager<ApiClient>,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let api = ApiClient::new(&config)?;
        let store = config.open_store()?;
        let session = SessionManager::new(store, api.clone());
        Ok(Self {
            config,
            api,
            session,
        })
    }

    /// Restore the saved session. Must finish before any guard is consulted.
    pub async fn start(&mut self) {
        match self.session.initialize().await {
            InitOutcome::Ended(ended) => self.on_session_ended(ended),
            outcome => debug!(?outcome, "Session ready"),
        }
    }

    fn on_session_ended(&self, ended: SessionEnded) {
        match ended.reason {
            EndReason::SignedOut => {}
            EndReason::RefreshTokenExpired | EndReason::RefreshFailed => {
                eprintln!("Your session has expired. Please sign in again.");
            }
        }
        debug!(to = ended.redirect_to(), "Redirecting after session end");
    }

    /// Apply a route guard. `Ok(true)` means the command may run.
    fn admit(&self, guard: RouteGuard) -> Result<bool> {
        match guard.decide(&self.session.view()) {
            GuardDecision::Render => Ok(true),
            GuardDecision::Placeholder => Err(anyhow::anyhow!("Session is still loading")),
            GuardDecision::Redirect { to, .. } if to == SIGN_IN_ROUTE => Err(anyhow::anyhow!(
                "Not signed in. Run `atommarts signin` first."
            )),
            GuardDecision::Redirect { to, .. } => {
                debug!(to = to, "Already signed in");
                if to == DEFAULT_ROUTE {
                    render::print_already_signed_in(self.session.user());
                }
                Ok(false)
            }
        }
    }

    /// Client carrying the current access token, for protected commands.
    fn authorized(&self) -> Result<ApiClient> {
        if !self.admit(RouteGuard::Protected)? {
            return Err(anyhow::anyhow!("Command not available"));
        }
        let token = self
            .session
            .token()
            .ok_or_else(|| anyhow::anyhow!("Not signed in"))?;
        Ok(self.api.with_token(token.to_string()))
    }

    // ===== Session commands =====

    pub async fn sign_in(&mut self, email: Option<String>) -> Result<()> {
        if !self.admit(RouteGuard::AuthOnly)? {
            return Ok(());
        }

        let email = match email {
            Some(email) => email,
            None => prompt_email(self.config.last_email.as_deref())?,
        };
        if email.is_empty() {
            return Err(anyhow::anyhow!("Email is required"));
        }
        let password = rpassword::prompt_password("Password: ").context("Failed to read password")?;

        let auth = self.api.authenticate(&email, &password).await?;
        let user = auth.user.clone();
        self.session
            .login(auth.token, auth.refresh_token, auth.user, auth.expires_in)
            .context("Signed in, but the session could not be saved")?;

        self.config.last_email = Some(email);
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        println!("Signed in as {} ({})", user.full_name(), user.role);
        Ok(())
    }

    pub fn sign_out(&mut self) {
        let ended = self.session.logout();
        self.on_session_ended(ended);
        println!("Signed out.");
    }

    pub fn status(&self) {
        let view = self.session.view();
        let expires = view.token.as_deref().and_then(token::expires_at);
        render::print_status(&view, expires);
    }

    // ===== Dashboard =====

    pub async fn dashboard(&self, year: Option<i32>) -> Result<()> {
        let api = self.authorized()?;
        let year = year.unwrap_or_else(|| chrono::Local::now().year());

        // Panels load independently; one failing does not hide the other
        let (stats, orders) = futures::join!(api.fetch_monthly_stats(), api.fetch_recent_orders());

        match stats {
            Ok(stats) => render::print_monthly(&stats, year),
            Err(e) => eprintln!("Failed to load monthly statistics: {}", e),
        }
        match orders {
            Ok(orders) => render::print_orders(&orders),
            Err(e) => eprintln!("Failed to fetch orders: {}", e),
        }
        Ok(())
    }

    // ===== Payouts =====

    pub async fn payouts(
        &self,
        status: String,
        vendor: Option<String>,
        page: u32,
        limit: u32,
    ) -> Result<()> {
        let api = self.authorized()?;
        let filter = PayoutFilter {
            status,
            vendor_id: vendor,
            page: page.max(1),
            limit: limit.max(1),
        };
        let payouts = api
            .fetch_payouts(&filter)
            .await
            .context("Failed to fetch payout requests")?;
        render::print_payouts(&payouts, &filter);
        Ok(())
    }

    pub async fn process_payout(
        &self,
        request_id: i64,
        action: PayoutAction,
        notes: String,
        reference: Option<String>,
    ) -> Result<()> {
        let api = self.authorized()?;
        let decision = PayoutDecision::new(request_id, action, notes, reference);
        api.process_payout(&decision)
            .await
            .context("Failed to process payout")?;
        println!("Payout request #{} {}.", request_id, match action {
            PayoutAction::Approve => "approved",
            PayoutAction::Reject => "rejected",
        });
        Ok(())
    }

    // ===== Products =====

    pub async fn products(&self, page: u32, search: Option<String>) -> Result<()> {
        let api = self.authorized()?;
        let mut pagination = Pagination::new(PRODUCT_PAGE_SIZE);
        pagination.page = page.max(1);

        let queue = api
            .fetch_moderation_queue(pagination.page, PRODUCT_PAGE_SIZE, search.as_deref())
            .await
            .context("Failed to fetch products")?;
        pagination.total_items = queue.pagination.total_items;
        render::print_products(&queue.products, &pagination);
        Ok(())
    }

    pub async fn moderate(&self, product_id: i64, status: &str, notes: String) -> Result<()> {
        let status: ModerationStatus = status.parse().map_err(anyhow::Error::msg)?;
        let api = self.authorized()?;
        let decision = ModerationDecision {
            status,
            review_notes: notes,
        };
        api.moderate_product(product_id, &decision)
            .await
            .context("Failed to moderate product")?;
        println!("Product #{} moderated.", product_id);
        Ok(())
    }

    // ===== Categories =====

    pub async fn categories(&self, page: u32, search: Option<String>) -> Result<()> {
        let api = self.authorized()?;
        let mut pagination = Pagination::new(CATEGORY_PAGE_SIZE);
        pagination.page = page.max(1);

        let (rows, total) = api
            .fetch_categories(pagination.page, search.as_deref())
            .await
            .context("Failed to fetch categories")?;
        pagination.total_items = total;
        render::print_categories(&rows, &pagination);
        Ok(())
    }

    pub async fn add_category(
        &self,
        name: String,
        description: String,
        is_active: bool,
        parent_id: Option<i64>,
        image: Option<PathBuf>,
    ) -> Result<()> {
        let api = self.authorized()?;
        let category = NewCategory {
            description,
            is_active,
            parent_id,
            image,
            ..NewCategory::new(name)
        };
        api.create_category(&category)
            .await
            .context("Failed to add category")?;
        println!("Category \"{}\" created.", category.name);
        Ok(())
    }

    pub async fn delete_category(&self, category_id: i64) -> Result<()> {
        let api = self.authorized()?;
        api.delete_category(category_id)
            .await
            .context("Failed to delete category")?;
        println!("Category #{} deleted.", category_id);
        Ok(())
    }

    // ===== Orders & account =====

    pub async fn orders(&self) -> Result<()> {
        let api = self.authorized()?;
        let orders = api
            .fetch_recent_orders()
            .await
            .context("Failed to fetch orders")?;
        render::print_orders(&orders);
        Ok(())
    }

    pub async fn change_password(&self) -> Result<()> {
        let api = self.authorized()?;
        let form = PasswordChange {
            current_password: rpassword::prompt_password("Current password: ")?,
            new_password: rpassword::prompt_password("New password: ")?,
            confirm_password: rpassword::prompt_password("Confirm new password: ")?,
        };
        let message = api
            .change_password(&form)
            .await
            .context("Failed to change password")?;
        println!("{}", message);
        Ok(())
    }
}

/// Ask for an email, offering the last one used as the default.
fn prompt_email(last: Option<&str>) -> Result<String> {
    match last {
        Some(last) => print!("Email [{}]: ", last),
        None => print!("Email: "),
    }
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let entered = line.trim();

    Ok(match (entered.is_empty(), last) {
        (true, Some(last)) => last.to_string(),
        _ => entered.to_string(),
    })
}
