use serde::Serialize;
use tracing::{debug, info, warn};

use crate::models::User;

use super::guard::SIGN_IN_ROUTE;
use super::refresh::TokenRefresher;
use super::store::{
    CredentialStore, StoreError, EXPIRES_IN_KEY, REFRESH_TOKEN_KEY, SESSION_KEYS, TOKEN_KEY,
    USER_KEY,
};
use super::token;

/// In-memory copy of the persisted session fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<User>,
    /// Informational; the `exp` claim of the access token is authoritative.
    pub expires_in: Option<i64>,
}

impl Session {
    /// Access token present and its `exp` claim still ahead of the clock.
    pub fn is_authenticated(&self) -> bool {
        self.access_token
            .as_deref()
            .map(|t| !token::is_expired(t))
            .unwrap_or(false)
    }
}

/// What the rest of the application reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<User>,
    pub expires_in: Option<i64>,
    pub is_authenticated: bool,
    pub loading: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// Explicit sign-out.
    SignedOut,
    /// The access token expired and the refresh token was expired or missing.
    RefreshTokenExpired,
    /// The refresh exchange did not produce a new access token.
    RefreshFailed,
}

/// Emitted whenever the session is torn down. The presentation layer
/// answers it by sending the user to `redirect_to()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct SessionEnded {
    pub reason: EndReason,
}

impl SessionEnded {
    pub fn redirect_to(&self) -> &'static str {
        SIGN_IN_ROUTE
    }
}

/// Result of startup reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// Nothing persisted.
    Empty,
    /// Persisted access token was still valid and was adopted as-is.
    Restored,
    /// Access token was expired and a new one was obtained.
    Refreshed,
    /// The persisted session could not be kept and was cleared.
    Ended(SessionEnded),
    /// `initialize` had already run.
    AlreadyInitialized,
}

/// Owner and single writer of the session.
///
/// Constructed once at startup. Readers take `view()`; only `initialize`,
/// `login` and `logout` mutate, and each mutation writes through to the store.
pub struct SessionManager<R> {
    store: Box<dyn CredentialStore>,
    refresher: R,
    session: Session,
    loading: bool,
}

impl<R: TokenRefresher> SessionManager<R> {
    pub fn new(store: Box<dyn CredentialStore>, refresher: R) -> Self {
        Self {
            store,
            refresher,
            session: Session::default(),
            loading: true,
        }
    }

    /// Hydrate from the store and reconcile expiry. Runs once; `loading`
    /// stays true until it returns.
    pub async fn initialize(&mut self) -> InitOutcome {
        if !self.loading {
            return InitOutcome::AlreadyInitialized;
        }
        let outcome = self.reconcile().await;
        self.loading = false;
        debug!(?outcome, "Session initialized");
        outcome
    }

    async fn reconcile(&mut self) -> InitOutcome {
        let stored = self.load_persisted();

        let Some(access_token) = stored.access_token.as_deref() else {
            debug!("No persisted session");
            return InitOutcome::Empty;
        };

        if !token::is_expired(access_token) {
            info!("Restored persisted session");
            self.session = stored;
            return InitOutcome::Restored;
        }

        let Some(refresh_token) = stored.refresh_token.as_deref() else {
            info!("Access token expired and no refresh token is stored");
            return InitOutcome::Ended(self.teardown(EndReason::RefreshTokenExpired));
        };

        // An unreadable refresh token counts as expired, same as the access token
        if token::is_expired(refresh_token) {
            info!("Access and refresh tokens both expired");
            return InitOutcome::Ended(self.teardown(EndReason::RefreshTokenExpired));
        }

        match self.refresher.refresh(refresh_token).await {
            Some(new_token) => {
                // Memory only adopts a token the store holds
                if let Err(e) = self.store.set(TOKEN_KEY, &new_token) {
                    warn!(error = %e, "Failed to persist refreshed access token");
                    return InitOutcome::Ended(self.teardown(EndReason::RefreshFailed));
                }
                info!("Access token refreshed");
                self.session = Session {
                    access_token: Some(new_token),
                    ..stored
                };
                InitOutcome::Refreshed
            }
            None => InitOutcome::Ended(self.teardown(EndReason::RefreshFailed)),
        }
    }

    fn load_persisted(&self) -> Session {
        let access_token = self.read_key(TOKEN_KEY);
        let refresh_token = self.read_key(REFRESH_TOKEN_KEY);

        let user = self.read_key(USER_KEY).and_then(|raw| {
            serde_json::from_str::<User>(&raw)
                .map_err(|e| warn!(error = %e, "Ignoring unreadable persisted user"))
                .ok()
        });

        let expires_in = self
            .read_key(EXPIRES_IN_KEY)
            .and_then(|raw| raw.trim().parse::<i64>().ok());

        Session {
            access_token,
            refresh_token,
            user,
            expires_in,
        }
    }

    fn read_key(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!(key = key, error = %e, "Failed to read session entry");
                None
            }
        }
    }

    /// Replace the whole session with freshly issued credentials.
    /// Tokens are not validated here. If any write fails both the store and
    /// the in-memory session are cleared.
    pub fn login(
        &mut self,
        access_token: String,
        refresh_token: String,
        user: User,
        expires_in: i64,
    ) -> Result<(), StoreError> {
        let user_json = serde_json::to_string(&user)?;
        let expires_json = expires_in.to_string();
        let entries = [
            (TOKEN_KEY, access_token.as_str()),
            (REFRESH_TOKEN_KEY, refresh_token.as_str()),
            (USER_KEY, user_json.as_str()),
            (EXPIRES_IN_KEY, expires_json.as_str()),
        ];

        for (key, value) in entries {
            if let Err(e) = self.store.set(key, value) {
                warn!(key = key, error = %e, "Failed to persist session, rolling back");
                self.session = Session::default();
                self.clear_store();
                return Err(e);
            }
        }

        info!(user_id = user.id, "Signed in");
        self.session = Session {
            access_token: Some(access_token),
            refresh_token: Some(refresh_token),
            user: Some(user),
            expires_in: Some(expires_in),
        };
        Ok(())
    }

    /// Clear the session from memory and the store. Safe to call repeatedly.
    pub fn logout(&mut self) -> SessionEnded {
        self.teardown(EndReason::SignedOut)
    }

    fn teardown(&mut self, reason: EndReason) -> SessionEnded {
        self.session = Session::default();
        self.clear_store();
        info!(?reason, "Session ended");
        SessionEnded { reason }
    }

    fn clear_store(&self) {
        for key in SESSION_KEYS {
            if let Err(e) = self.store.remove(key) {
                warn!(key = key, error = %e, "Failed to clear session entry");
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn token(&self) -> Option<&str> {
        self.session.access_token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.session.user.as_ref()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            token: self.session.access_token.clone(),
            refresh_token: self.session.refresh_token.clone(),
            user: self.session.user.clone(),
            expires_in: self.session.expires_in,
            is_authenticated: self.is_authenticated(),
            loading: self.loading,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::auth::store::MemoryStore;
    use crate::auth::token::{token_expiring_in, token_with_claims};

    /// Refresher that records calls and answers with a fixed token.
    #[derive(Clone)]
    struct FakeRefresher {
        response: Option<String>,
        calls: Arc<AtomicUsize>,
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl FakeRefresher {
        fn answering(response: Option<&str>) -> Self {
            Self {
                response: response.map(str::to_string),
                calls: Arc::new(AtomicUsize::new(0)),
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TokenRefresher for FakeRefresher {
        async fn refresh(&self, refresh_token: &str) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(refresh_token.to_string());
            self.response.clone()
        }
    }

    /// Delegates to a `MemoryStore` but refuses to write one key.
    struct FailingStore {
        inner: MemoryStore,
        failing_key: &'static str,
    }

    impl FailingStore {
        fn on(inner: &MemoryStore, failing_key: &'static str) -> Self {
            Self {
                inner: inner.clone(),
                failing_key,
            }
        }
    }

    impl CredentialStore for FailingStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            if key == self.failing_key {
                return Err(StoreError::Io(std::io::Error::other("disk full")));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key)
        }
    }

    fn sample_user() -> User {
        User {
            id: 7,
            email: "admin@atommarts.test".to_string(),
            role: "admin".to_string(),
            first_name: "Ada".to_string(),
            last_name: None,
        }
    }

    fn user_json() -> String {
        serde_json::to_string(&sample_user()).unwrap()
    }

    fn persisted(access: &str, refresh: &str) -> MemoryStore {
        let user = user_json();
        MemoryStore::with_entries([
            (TOKEN_KEY, access),
            (REFRESH_TOKEN_KEY, refresh),
            (USER_KEY, user.as_str()),
            (EXPIRES_IN_KEY, "3600"),
        ])
    }

    fn manager(
        store: &MemoryStore,
        refresher: &FakeRefresher,
    ) -> SessionManager<FakeRefresher> {
        SessionManager::new(Box::new(store.clone()), refresher.clone())
    }

    fn assert_store_cleared(store: &MemoryStore) {
        for key in SESSION_KEYS {
            assert_eq!(store.get(key).unwrap(), None, "{} should be cleared", key);
        }
    }

    #[tokio::test]
    async fn test_loading_until_initialized() {
        let store = MemoryStore::new();
        let refresher = FakeRefresher::answering(None);
        let mut session = manager(&store, &refresher);

        assert!(session.is_loading());
        assert!(session.view().loading);

        assert_eq!(session.initialize().await, InitOutcome::Empty);
        assert!(!session.is_loading());
        assert!(!session.is_authenticated());
        assert_eq!(refresher.calls(), 0);
    }

    #[tokio::test]
    async fn test_valid_session_restored_without_network() {
        let access = token_expiring_in(3600);
        let refresh = token_expiring_in(86_400);
        let store = persisted(&access, &refresh);
        let refresher = FakeRefresher::answering(Some("unused"));
        let mut session = manager(&store, &refresher);

        assert_eq!(session.initialize().await, InitOutcome::Restored);

        let view = session.view();
        assert!(view.is_authenticated);
        assert!(!view.loading);
        assert_eq!(view.token.as_deref(), Some(access.as_str()));
        assert_eq!(view.refresh_token.as_deref(), Some(refresh.as_str()));
        assert_eq!(view.user, Some(sample_user()));
        assert_eq!(view.expires_in, Some(3600));
        assert_eq!(refresher.calls(), 0);
    }

    #[tokio::test]
    async fn test_expired_access_is_refreshed_once() {
        let access = token_expiring_in(-60);
        let refresh = token_expiring_in(86_400);
        let store = persisted(&access, &refresh);
        let refresher = FakeRefresher::answering(Some("NEW"));
        let mut session = manager(&store, &refresher);

        assert_eq!(session.initialize().await, InitOutcome::Refreshed);
        assert_eq!(refresher.calls(), 1);
        assert_eq!(*refresher.seen.lock().unwrap(), vec![refresh.clone()]);

        assert_eq!(session.token(), Some("NEW"));
        assert_eq!(session.session().refresh_token.as_deref(), Some(refresh.as_str()));
        assert_eq!(session.user(), Some(&sample_user()));
        assert_eq!(session.session().expires_in, Some(3600));

        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("NEW"));
        assert_eq!(store.get(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some(refresh.as_str()));
        assert_eq!(store.get(USER_KEY).unwrap(), Some(user_json()));
        assert_eq!(store.get(EXPIRES_IN_KEY).unwrap().as_deref(), Some("3600"));
    }

    #[tokio::test]
    async fn test_refreshed_jwt_authenticates() {
        let store = persisted(&token_expiring_in(-60), &token_expiring_in(86_400));
        let fresh = token_expiring_in(900);
        let refresher = FakeRefresher::answering(Some(&fresh));
        let mut session = manager(&store, &refresher);

        assert_eq!(session.initialize().await, InitOutcome::Refreshed);
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_both_tokens_expired_tears_down_without_network() {
        let store = persisted(&token_expiring_in(-60), &token_expiring_in(-1));
        let refresher = FakeRefresher::answering(Some("NEW"));
        let mut session = manager(&store, &refresher);

        let outcome = session.initialize().await;
        assert_eq!(
            outcome,
            InitOutcome::Ended(SessionEnded {
                reason: EndReason::RefreshTokenExpired
            })
        );
        assert_eq!(refresher.calls(), 0);
        assert!(!session.is_authenticated());
        assert_store_cleared(&store);
    }

    #[tokio::test]
    async fn test_missing_refresh_token_tears_down() {
        let access = token_expiring_in(-60);
        let store = MemoryStore::with_entries([(TOKEN_KEY, access.as_str())]);
        let refresher = FakeRefresher::answering(Some("NEW"));
        let mut session = manager(&store, &refresher);

        assert!(matches!(session.initialize().await, InitOutcome::Ended(_)));
        assert_eq!(refresher.calls(), 0);
        assert_store_cleared(&store);
    }

    #[tokio::test]
    async fn test_failed_refresh_tears_down() {
        let store = persisted(&token_expiring_in(-60), &token_expiring_in(86_400));
        let refresher = FakeRefresher::answering(None);
        let mut session = manager(&store, &refresher);

        let outcome = session.initialize().await;
        assert_eq!(
            outcome,
            InitOutcome::Ended(SessionEnded {
                reason: EndReason::RefreshFailed
            })
        );
        assert_eq!(refresher.calls(), 1);
        assert!(!session.is_authenticated());
        assert!(!session.is_loading());
        assert_store_cleared(&store);
    }

    #[tokio::test]
    async fn test_unreadable_refresh_token_tears_down_without_network() {
        let store = persisted(&token_expiring_in(-60), "d41d8cd98f00b204e9800998ecf8427e");
        let refresher = FakeRefresher::answering(Some("NEW"));
        let mut session = manager(&store, &refresher);

        assert_eq!(
            session.initialize().await,
            InitOutcome::Ended(SessionEnded {
                reason: EndReason::RefreshTokenExpired
            })
        );
        assert_eq!(refresher.calls(), 0);
        assert_store_cleared(&store);
    }

    #[tokio::test]
    async fn test_refreshed_token_that_cannot_be_saved_ends_session() {
        let inner = persisted(&token_expiring_in(-60), &token_expiring_in(86_400));
        let store = FailingStore::on(&inner, TOKEN_KEY);
        let refresher = FakeRefresher::answering(Some(token_expiring_in(3600).as_str()));
        let mut session = SessionManager::new(Box::new(store), refresher.clone());

        assert_eq!(
            session.initialize().await,
            InitOutcome::Ended(SessionEnded {
                reason: EndReason::RefreshFailed
            })
        );
        assert_eq!(refresher.calls(), 1);
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
        assert_store_cleared(&inner);
    }

    #[tokio::test]
    async fn test_failed_login_write_rolls_back() {
        let inner = persisted(&token_expiring_in(3600), "old-refresh");
        let store = FailingStore::on(&inner, REFRESH_TOKEN_KEY);
        let mut session = SessionManager::new(Box::new(store), FakeRefresher::answering(None));
        session.initialize().await;
        assert!(session.is_authenticated());

        let result = session.login(
            token_expiring_in(7200),
            "new-refresh".to_string(),
            sample_user(),
            7200,
        );

        assert!(result.is_err());
        assert_store_cleared(&inner);
        assert_eq!(session.session(), &Session::default());
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_unreadable_access_token_is_treated_as_expired() {
        let store = persisted("garbage", &token_expiring_in(-5));
        let refresher = FakeRefresher::answering(None);
        let mut session = manager(&store, &refresher);

        assert!(matches!(session.initialize().await, InitOutcome::Ended(_)));
        assert_store_cleared(&store);
    }

    #[tokio::test]
    async fn test_initialize_runs_once() {
        let store = persisted(&token_expiring_in(-60), &token_expiring_in(86_400));
        let refresher = FakeRefresher::answering(None);
        let mut session = manager(&store, &refresher);

        session.initialize().await;
        assert_eq!(session.initialize().await, InitOutcome::AlreadyInitialized);
        assert_eq!(refresher.calls(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_user_entry_is_ignored() {
        let access = token_expiring_in(3600);
        let refresh = token_expiring_in(86_400);
        let store = MemoryStore::with_entries([
            (TOKEN_KEY, access.as_str()),
            (REFRESH_TOKEN_KEY, refresh.as_str()),
            (USER_KEY, "{broken"),
            (EXPIRES_IN_KEY, "soon"),
        ]);
        let refresher = FakeRefresher::answering(None);
        let mut session = manager(&store, &refresher);

        assert_eq!(session.initialize().await, InitOutcome::Restored);
        assert!(session.is_authenticated());
        assert_eq!(session.user(), None);
        assert_eq!(session.session().expires_in, None);
    }

    #[tokio::test]
    async fn test_login_writes_through() {
        let store = MemoryStore::new();
        let refresher = FakeRefresher::answering(None);
        let mut session = manager(&store, &refresher);
        session.initialize().await;

        let access = token_expiring_in(3600);
        session
            .login(access.clone(), "refresh-1".to_string(), sample_user(), 3600)
            .unwrap();

        assert!(session.is_authenticated());
        assert_eq!(store.get(TOKEN_KEY).unwrap(), Some(access));
        assert_eq!(store.get(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some("refresh-1"));
        assert_eq!(store.get(USER_KEY).unwrap(), Some(user_json()));
        assert_eq!(store.get(EXPIRES_IN_KEY).unwrap().as_deref(), Some("3600"));
    }

    #[tokio::test]
    async fn test_login_with_expired_token_is_not_authenticated() {
        let store = MemoryStore::new();
        let mut session = manager(&store, &FakeRefresher::answering(None));
        session.initialize().await;

        let expired = token_with_claims(serde_json::json!({ "exp": 1 }));
        session
            .login(expired, "r".to_string(), sample_user(), 0)
            .unwrap();
        assert!(!session.is_authenticated());
        assert!(session.token().is_some());
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let store = persisted(&token_expiring_in(3600), &token_expiring_in(86_400));
        let refresher = FakeRefresher::answering(None);
        let mut session = manager(&store, &refresher);
        session.initialize().await;
        assert!(session.is_authenticated());

        let first = session.logout();
        assert_eq!(first.reason, EndReason::SignedOut);
        assert_eq!(first.redirect_to(), SIGN_IN_ROUTE);
        assert_store_cleared(&store);
        let after_first = session.view();

        let second = session.logout();
        assert_eq!(first, second);
        assert_eq!(session.view(), after_first);
        assert!(!session.is_authenticated());
        assert_eq!(session.session(), &Session::default());
        assert_store_cleared(&store);
    }

    #[test]
    fn test_session_view_serializes_camel_case() {
        let view = SessionView {
            token: Some("t".to_string()),
            refresh_token: None,
            user: None,
            expires_in: Some(60),
            is_authenticated: false,
            loading: false,
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["refreshToken"], serde_json::Value::Null);
        assert_eq!(json["expiresIn"], 60);
        assert_eq!(json["isAuthenticated"], false);
    }
}
