use axum::http::StatusCode;

use crate::config::RoutesConfig;

/// Paths that require a session. Matched by prefix.
const PROTECTED_PREFIXES: &[&str] = &[
    "/countdown",
    "/gift",
    "/gift-selected",
    "/happy-birthday",
    "/api/gift-selection",
    "/api/user/birthday",
];

/// Paths that additionally carry admin-only operations. The gate treats
/// these like any protected path; admin rights are checked per operation
/// inside the handlers, never here.
const ADMIN_PREFIXES: &[&str] = &["/admin", "/api/admin"];

/// What a request path is, before looking at who sent it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyClass {
    /// Exactly `/`; always forwarded somewhere else.
    RootRedirect,
    /// The sign-in page; only useful to anonymous visitors.
    AuthEntry,
    Protected,
    AdminProtected,
    Public,
}

/// What the gate should do with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Redirect(String),
    Reject(StatusCode),
}

/// Classifies request paths and decides gating outcomes.
///
/// Classification is pure: the same path always yields the same class.
/// Unknown paths are public; only the declared prefixes gate.
pub struct PathPolicy {
    landing: String,
    login: String,
}

impl PathPolicy {
    pub fn new(routes: &RoutesConfig) -> Self {
        Self {
            landing: routes.landing.clone(),
            login: routes.login.clone(),
        }
    }

    /// `/` and the login path match exactly; everything else goes to the
    /// longest matching declared prefix, or Public when none matches.
    pub fn classify(&self, path: &str) -> PolicyClass {
        if path == "/" {
            return PolicyClass::RootRedirect;
        }
        if path == self.login {
            return PolicyClass::AuthEntry;
        }

        let mut best_len = 0;
        let mut best = PolicyClass::Public;
        for &prefix in PROTECTED_PREFIXES {
            if path.starts_with(prefix) && prefix.len() > best_len {
                best_len = prefix.len();
                best = PolicyClass::Protected;
            }
        }
        for &prefix in ADMIN_PREFIXES {
            if path.starts_with(prefix) && prefix.len() > best_len {
                best_len = prefix.len();
                best = PolicyClass::AdminProtected;
            }
        }
        best
    }

    /// Applies the gating rules for a classified path.
    ///
    /// Protected API paths reject anonymous callers with 401; protected
    /// page paths redirect them to the login page instead.
    pub fn decide(&self, class: PolicyClass, path: &str, authenticated: bool) -> Outcome {
        match class {
            PolicyClass::RootRedirect => {
                if authenticated {
                    Outcome::Redirect(self.landing.clone())
                } else {
                    Outcome::Redirect(self.login.clone())
                }
            }
            PolicyClass::AuthEntry => {
                if authenticated {
                    Outcome::Redirect(self.landing.clone())
                } else {
                    Outcome::Continue
                }
            }
            PolicyClass::Protected | PolicyClass::AdminProtected => {
                if authenticated {
                    Outcome::Continue
                } else if path.starts_with("/api/") {
                    Outcome::Reject(StatusCode::UNAUTHORIZED)
                } else {
                    Outcome::Redirect(self.login.clone())
                }
            }
            PolicyClass::Public => Outcome::Continue,
        }
    }
}
