//! Core type definitions for route decisions.
//!
//! All decision types are small value objects: they are produced per
//! request, compared by value, and never shared across requests.

/// The outcome of evaluating access policy for one request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RouteDecision {
    /// Render the requested subtree.
    Allow,
    /// Abort rendering and send the client to this path.
    RedirectTo(&'static str),
    /// Explicit rejection, distinct from "wrong place".
    ///
    /// The built-in table never produces it. Gates that need to say "no
    /// access" instead of redirecting return it, and the HTTP adapter maps
    /// it to `403 Forbidden`.
    Deny,
}

impl RouteDecision {
    /// Returns `true` if this decision renders the subtree.
    #[inline]
    pub fn is_allow(&self) -> bool {
        matches!(self, RouteDecision::Allow)
    }

    /// Returns `true` if this decision is an explicit rejection.
    #[inline]
    pub fn is_deny(&self) -> bool {
        matches!(self, RouteDecision::Deny)
    }

    /// Returns the redirect target, if this decision is a redirect.
    #[inline]
    pub fn redirect_target(&self) -> Option<&'static str> {
        match self {
            RouteDecision::RedirectTo(path) => Some(*path),
            _ => None,
        }
    }
}

/// A stable reason code for audit logs.
///
/// Every decision carries one so that log lines can say which rule fired
/// without logging free-form strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReasonCode(pub u32);

impl ReasonCode {
    /// Create a new reason code.
    #[inline]
    pub const fn new(code: u32) -> Self {
        ReasonCode(code)
    }

    /// Get the numeric value of this reason code.
    #[inline]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

/// No rule restricted the request.
pub const NO_RESTRICTION: ReasonCode = ReasonCode(0);
/// No valid session; sent to sign-in.
pub const UNAUTHENTICATED: ReasonCode = ReasonCode(1);
/// The root path dispatched a known role to its landing page.
pub const ROOT_DISPATCH: ReasonCode = ReasonCode(2);
/// The session's role is not part of the closed enumeration.
pub const UNKNOWN_ROLE: ReasonCode = ReasonCode(3);
/// The users index dispatched a known role to its user listing.
pub const USERS_INDEX_DISPATCH: ReasonCode = ReasonCode(4);
/// A non-admin session requested the admin subtree.
pub const ADMIN_ONLY: ReasonCode = ReasonCode(5);
/// The subtree declares no gate.
pub const OPEN_SUBTREE: ReasonCode = ReasonCode(6);

/// The request facts the decision table looks at.
///
/// Borrowed from the inbound request; the table never keeps it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext<'a> {
    /// Whether a valid session was resolved for this request.
    pub is_authenticated: bool,
    /// The path being requested, as received.
    pub requested_path: &'a str,
}

impl<'a> RequestContext<'a> {
    /// Context for a request carrying a valid session.
    pub fn authenticated(requested_path: &'a str) -> Self {
        RequestContext {
            is_authenticated: true,
            requested_path,
        }
    }

    /// Context for a request without a valid session.
    pub fn anonymous(requested_path: &'a str) -> Self {
        RequestContext {
            is_authenticated: false,
            requested_path,
        }
    }
}

/// A route decision together with the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// What to do with the request.
    pub route: RouteDecision,
    /// Which rule decided.
    pub reason: ReasonCode,
}

impl Decision {
    /// Create a new decision.
    #[inline]
    pub const fn new(route: RouteDecision, reason: ReasonCode) -> Self {
        Decision { route, reason }
    }

    /// Create an Allow decision with the given reason.
    #[inline]
    pub const fn allow(reason: ReasonCode) -> Self {
        Decision::new(RouteDecision::Allow, reason)
    }

    /// Create a redirect decision with the given reason.
    #[inline]
    pub const fn redirect(path: &'static str, reason: ReasonCode) -> Self {
        Decision::new(RouteDecision::RedirectTo(path), reason)
    }

    /// Returns `true` if this decision renders the subtree.
    #[inline]
    pub fn is_allow(&self) -> bool {
        self.route.is_allow()
    }
}
