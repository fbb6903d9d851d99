use super::session::SessionView;

/// Sign-in entry point
pub const SIGN_IN_ROUTE: &str = "/signin";

/// Landing route for an authenticated user
pub const DEFAULT_ROUTE: &str = "/";

/// Which side of the sign-in boundary a screen lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteGuard {
    /// Requires a signed-in user.
    Protected,
    /// Only for signed-out users (the sign-in screen itself).
    AuthOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session is still initializing; show something neutral.
    Placeholder,
    /// Navigate away. `replace` drops the guarded entry from history.
    Redirect { to: &'static str, replace: bool },
    /// Show the guarded content.
    Render,
}

impl RouteGuard {
    pub fn decide(self, view: &SessionView) -> GuardDecision {
        if view.loading {
            return GuardDecision::Placeholder;
        }
        match (self, view.is_authenticated) {
            (RouteGuard::Protected, false) => GuardDecision::Redirect {
                to: SIGN_IN_ROUTE,
                replace: true,
            },
            (RouteGuard::AuthOnly, true) => GuardDecision::Redirect {
                to: DEFAULT_ROUTE,
                replace: true,
            },
            _ => GuardDecision::Render,
        }
    }
}
