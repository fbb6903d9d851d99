use async_trait::async_trait;

/// Exchanges a refresh token for a new access token.
///
/// Implementations never fail outward: any network error, non-success status
/// or malformed response comes back as `None`. One call is one attempt; the
/// session treats `None` as the end of the session, not as something to retry.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Option<String>;
}
