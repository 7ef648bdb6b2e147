//! The route decision table.
//!
//! A pure function of `(role, context)`. Rules are checked in a fixed
//! priority order and the first match wins:
//!
//! 1. No valid session → sign-in
//! 2. Root path → the role's landing page (unknown → sign-in)
//! 3. Users index → the role's user listing (unknown → root)
//! 4. Admin subtree without the admin role → root
//! 5. Otherwise → allow
//!
//! Nothing a session carries can make rule 4 fall through to allow unless
//! the role classified as `Admin`.
//!
//! The root is fixed at `/`. Rules 3 and 4 send their fallbacks there, so
//! a second hop always lands on rule 2.

use serde::Deserialize;

use crate::paths;
use crate::role::{ClassifiedRole, Role};
use crate::target::PathMatcher;
use crate::types::{
    Decision, RequestContext, RouteDecision, ADMIN_ONLY, NO_RESTRICTION, ROOT_DISPATCH,
    UNAUTHENTICATED, UNKNOWN_ROLE, USERS_INDEX_DISPATCH,
};

/// A source of route decisions for the gate.
///
/// [`RouteTable`] is the built-in policy. Other policies can return
/// [`RouteDecision::Deny`], which the table itself never does.
pub trait RoutePolicy: Send + Sync {
    /// Decide what to do with a request and report which rule fired.
    fn evaluate(&self, role: ClassifiedRole, context: RequestContext<'_>) -> Decision;
}

impl<R: RoutePolicy + ?Sized> RoutePolicy for std::sync::Arc<R> {
    fn evaluate(&self, role: ClassifiedRole, context: RequestContext<'_>) -> Decision {
        (**self).evaluate(role, context)
    }
}

/// Which request paths trigger the users-index and admin rules.
///
/// Redirect targets are fixed; only the paths that are matched can move.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TableConfig {
    /// Path dispatched to the role's user listing (rule 3).
    pub users_index: String,
    /// Subtree reserved for admins (rule 4).
    pub admin_subtree: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            users_index: paths::USERS_INDEX.to_string(),
            admin_subtree: paths::ADMIN.to_string(),
        }
    }
}

/// Evaluates the access policy for a single request.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    config: TableConfig,
}

impl RouteTable {
    /// Create a table matching the given paths.
    pub fn new(config: TableConfig) -> Self {
        RouteTable { config }
    }

    /// The matched paths.
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Decide what to do with a request.
    pub fn decide(&self, role: ClassifiedRole, context: RequestContext<'_>) -> RouteDecision {
        self.evaluate(role, context).route
    }

    /// Decide what to do with a request and report which rule fired.
    pub fn evaluate(&self, role: ClassifiedRole, context: RequestContext<'_>) -> Decision {
        if !context.is_authenticated {
            return Decision::redirect(paths::SIGN_IN, UNAUTHENTICATED);
        }

        let path = context.requested_path;

        if PathMatcher::Exact(paths::ROOT).matches(path) {
            return match role {
                ClassifiedRole::Known(role) => {
                    Decision::redirect(landing_page(role), ROOT_DISPATCH)
                }
                ClassifiedRole::Unknown => Decision::redirect(paths::SIGN_IN, UNKNOWN_ROLE),
            };
        }

        if PathMatcher::Exact(&self.config.users_index).matches(path) {
            return match role {
                ClassifiedRole::Known(role) => {
                    Decision::redirect(users_listing(role), USERS_INDEX_DISPATCH)
                }
                ClassifiedRole::Unknown => Decision::redirect(paths::ROOT, UNKNOWN_ROLE),
            };
        }

        if PathMatcher::Subtree(&self.config.admin_subtree).matches(path) && !role.is_admin() {
            return Decision::redirect(paths::ROOT, ADMIN_ONLY);
        }

        Decision::allow(NO_RESTRICTION)
    }
}

impl RoutePolicy for RouteTable {
    fn evaluate(&self, role: ClassifiedRole, context: RequestContext<'_>) -> Decision {
        RouteTable::evaluate(self, role, context)
    }
}

/// Where the root path sends each role.
pub const fn landing_page(role: Role) -> &'static str {
    match role {
        Role::Admin => paths::ADMIN,
        Role::Dietitian => paths::DIETITIAN_DASHBOARD,
        Role::HealthCounselor => paths::HEALTH_COUNSELOR_CLIENTS,
        Role::Client => paths::CLIENT_HOME,
    }
}

/// Where the users index sends each role.
pub const fn users_listing(role: Role) -> &'static str {
    match role {
        Role::Admin => paths::ADMIN_USERS,
        Role::Dietitian | Role::HealthCounselor => paths::CLIENTS,
        Role::Client => paths::CLIENT_DASHBOARD,
    }
}
