//! Hooks the client calls when the session changes under a caller.

use std::sync::Mutex;

use tracing::warn;

/// Route of the login entry point.
pub const LOGIN_ROUTE: &str = "/login";

/// Moves the user interface to another route.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);

    fn redirect_to_login(&self) {
        self.navigate(LOGIN_ROUTE);
    }
}

/// Told about session changes the client makes on its own, from the 401
/// refresh path.
pub trait SessionListener: Send + Sync {
    /// A refresh stored `token` as the new access token.
    fn token_refreshed(&self, _token: &str) {}

    /// Refresh failed; the stored session was cleared.
    fn session_ended(&self) {}
}

/// Navigator for headless callers: records nothing, logs the redirect.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, route: &str) {
        warn!(route, "Session ended, navigation requested");
    }
}

/// Navigator that remembers every route it was asked to open.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn last_route(&self) -> Option<String> {
        self.routes().pop()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        if let Ok(mut routes) = self.routes.lock() {
            routes.push(route.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_to_login_uses_login_route() {
        let nav = RecordingNavigator::new();
        nav.redirect_to_login();
        assert_eq!(nav.last_route().as_deref(), Some(LOGIN_ROUTE));
        assert_eq!(nav.routes().len(), 1);
    }
}
