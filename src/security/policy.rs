//! The route authorization policy, as a plain lookup table.

use axum::http::Method;

/// Role granted to every regular account.
pub const ROLE_USER: &str = "ROLE_USER";
/// Role granted to administrator accounts.
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";
/// Fine-grained authority: full administrative access.
pub const ADMIN: &str = "ADMIN";
/// Fine-grained authority: may trigger catalog imports.
pub const VIDEO_IMPORTER: &str = "VIDEO_IMPORTER";
/// Fine-grained authority: may read catalog statistics.
pub const VIDEO_ANALYTICS: &str = "VIDEO_ANALYTICS";

/// Satisfied by any signed-in account; required on every protected route.
const ANY_AUTHENTICATED: &[&str] = &[ROLE_USER, ROLE_ADMIN];
/// Additionally required to trigger an import.
const IMPORTERS: &[&str] = &[ADMIN, VIDEO_IMPORTER];
/// Additionally required to read statistics.
const ANALYSTS: &[&str] = &[ADMIN, VIDEO_ANALYTICS];

/// Routes reachable without a token, whatever the method.
const PUBLIC_ROUTES: &[&str] = &["/auth/login", "/health"];

/// Operations that demand more than a signed-in account. Each entry lists
/// every authority set the caller must satisfy; within a set, holding any
/// one authority suffices.
const OPERATION_RULES: &[(Method, &str, &[&[&str]])] = &[
    (Method::POST, "/videos/import", &[ANY_AUTHENTICATED, IMPORTERS]),
    (Method::GET, "/videos/stats", &[ANY_AUTHENTICATED, ANALYSTS]),
];

/// The requirement every protected route carries when no operation rule
/// matches.
const DEFAULT_PROTECTED: &[&[&str]] = &[ANY_AUTHENTICATED];

/// What a request must present to proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// No identity required.
    Public,
    /// All listed authority sets must be satisfied.
    Protected(&'static [&'static [&'static str]]),
}

/// Looks up the access requirements for a request line.
///
/// Unknown paths fall through to the default rule: even a request that will
/// end in a 404 needs an identity first.
pub fn requirements_for(method: &Method, path: &str) -> Access {
    if PUBLIC_ROUTES.contains(&path) {
        return Access::Public;
    }

    for (rule_method, rule_path, required) in OPERATION_RULES {
        if rule_method == method && *rule_path == path {
            return Access::Protected(*required);
        }
    }

    Access::Protected(DEFAULT_PROTECTED)
}
