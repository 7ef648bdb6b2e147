//! # Wellgate
//!
//! Role-based session routing and layout gating for a multi-role coaching
//! platform (admins, dietitians, health counselors, clients).
//!
//! ## Overview
//!
//! Every page request passes a layout gate. The gate resolves the session
//! through an injected [`SessionProvider`], classifies the session's role
//! into the closed [`Role`] set, and evaluates a [`RoutePolicy`], by
//! default the [`RouteTable`]. The result is a [`RouteDecision`]: render
//! the subtree, redirect, or deny.
//! Only the HTTP adapter in [`http`] turns that into a response.
//!
//! ## Guarantees
//!
//! - **Fail closed**: missing, invalid and unresolvable sessions all go to
//!   sign-in; unknown roles never reach the admin subtree
//! - **Deterministic**: the decision table is a pure function
//! - **No partial renders**: children only run after an allow
//! - **Explicit opt-out**: open subtrees are declared in the [`GateLayout`]
//!
//! ## Example
//!
//! ```
//! use wellgate::{classify, RequestContext, RouteDecision, RouteTable};
//!
//! let table = RouteTable::default();
//!
//! let role = classify(Some("dietitian"));
//! let decision = table.decide(role, RequestContext::authenticated("/"));
//! assert_eq!(decision, RouteDecision::RedirectTo("/dashboard/dietitian"));
//!
//! let role = classify(Some("CLIENT"));
//! let decision = table.decide(role, RequestContext::authenticated("/admin/users"));
//! assert_eq!(decision, RouteDecision::RedirectTo("/"));
//! ```
//!
//! ## Decision order
//!
//! 1. No valid session → `/auth/signin`
//! 2. `/` → the role's landing page
//! 3. `/users` → the role's user listing
//! 4. `/admin/**` without the admin role → `/`
//! 5. Otherwise → allow

pub mod config;
pub mod deprecated;
mod error;
mod gate;
pub mod http;
mod layout;
pub mod paths;
mod role;
pub mod server;
mod session;
mod table;
mod target;
mod types;

// Public API exports
pub use config::Config;
pub use error::{AccessError, ConfigError, LayoutError, SessionError};
pub use gate::{Gate, RenderResult};
pub use http::{credentials_from_headers, GateLayer, GateState};
pub use layout::{
    load_routing_file, parse_routing, GateLayout, GateLayoutBuilder, GateMode, RoutingConfig,
};
pub use role::{classify, ClassifiedRole, Role};
pub use server::{router, start_server, ServeError};
pub use session::{Credentials, MemorySessionProvider, Session, SessionProvider, UserId};
pub use table::{landing_page, users_listing, RoutePolicy, RouteTable, TableConfig};
pub use target::{is_within, normalize_path, PathMatcher};
pub use types::{
    Decision, ReasonCode, RequestContext, RouteDecision, ADMIN_ONLY, NO_RESTRICTION, OPEN_SUBTREE,
    ROOT_DISPATCH, UNAUTHENTICATED, UNKNOWN_ROLE, USERS_INDEX_DISPATCH,
};
