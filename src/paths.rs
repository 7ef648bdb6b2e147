//! Page paths the router redirects to and matches on.
//!
//! These strings are the contract with the page tree and with clients that
//! bookmark them. Changing one is a breaking change.

/// Application root. Dispatches authenticated sessions by role.
pub const ROOT: &str = "/";
/// Sign-in page. Every unauthenticated request ends up here.
pub const SIGN_IN: &str = "/auth/signin";
/// Forgot-password entry of the recovery flow.
pub const FORGOT_PASSWORD: &str = "/auth/forgot-password";
/// Reset-password page of the recovery flow.
pub const RESET_PASSWORD: &str = "/auth/reset-password";

/// Admin landing page; also the root of the admin-only subtree.
pub const ADMIN: &str = "/admin";
/// Admin user management.
pub const ADMIN_USERS: &str = "/admin/users";
/// Dietitian landing page.
pub const DIETITIAN_DASHBOARD: &str = "/dashboard/dietitian";
/// Health-counselor landing page.
pub const HEALTH_COUNSELOR_CLIENTS: &str = "/health-counselor/clients";
/// Client landing page.
pub const CLIENT_HOME: &str = "/user";
/// Client dashboard, target of the users index for clients.
pub const CLIENT_DASHBOARD: &str = "/dashboard/client";
/// Client roster shared by dietitians and health counselors.
pub const CLIENTS: &str = "/clients";

/// Generic users index. Dispatches to the role's own user listing.
pub const USERS_INDEX: &str = "/users";
