//! The layout gate.
//!
//! A gate sits in front of a page subtree. For guarded subtrees it awaits
//! the session lookup (the only suspension point), classifies the role,
//! consults the route policy and only then decides whether the children
//! run at all. Children of a redirected request are never invoked.

use std::future::Future;

use tracing::{debug, info, warn};

use crate::error::AccessError;
use crate::layout::GateMode;
use crate::role::{classify, ClassifiedRole};
use crate::session::{Credentials, Session, SessionProvider};
use crate::table::{RoutePolicy, RouteTable};
use crate::types::{Decision, RequestContext, RouteDecision, OPEN_SUBTREE};

/// What a gated render produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderResult<T> {
    /// The children ran; this is their output, unmodified.
    Rendered(T),
    /// The children did not run; navigate here instead.
    Redirect(&'static str),
    /// The children did not run; access is refused.
    Denied,
}

impl<T> RenderResult<T> {
    /// Returns the rendered output, if the children ran.
    pub fn rendered(self) -> Option<T> {
        match self {
            RenderResult::Rendered(output) => Some(output),
            _ => None,
        }
    }
}

/// Guards page subtrees using an injected session provider.
///
/// Decisions come from `R`, the built-in [`RouteTable`] unless another
/// [`RoutePolicy`] is supplied.
#[derive(Debug, Clone)]
pub struct Gate<P, R = RouteTable> {
    provider: P,
    policy: R,
}

impl<P: SessionProvider, R: RoutePolicy> Gate<P, R> {
    /// Create a gate over `provider` evaluating `policy`.
    pub fn new(provider: P, policy: R) -> Self {
        Gate { provider, policy }
    }

    /// The policy this gate consults.
    pub fn policy(&self) -> &R {
        &self.policy
    }

    /// The injected session provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Resolve a valid session for `credentials`.
    ///
    /// A missing session and an invalid one both come back as
    /// [`AccessError::Unauthenticated`].
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<Session, AccessError> {
        match self.provider.resolve_session(credentials).await? {
            Some(session) if session.is_valid() => Ok(session),
            _ => Err(AccessError::Unauthenticated),
        }
    }

    /// Evaluate a guarded request.
    ///
    /// Resolver failures fail closed: they are logged and evaluated as an
    /// unauthenticated request.
    pub async fn decide(&self, credentials: &Credentials, requested_path: &str) -> Decision {
        let session = self.authenticate(credentials).await;
        self.evaluate(session, requested_path)
    }

    fn evaluate(&self, session: Result<Session, AccessError>, requested_path: &str) -> Decision {
        let session = match session {
            Ok(session) => session,
            Err(err) => {
                if let AccessError::ResolverFailure(_) = err {
                    warn!(
                        path = requested_path,
                        error = %err,
                        "session lookup failed, treating as unauthenticated"
                    );
                }
                let decision = self
                    .policy
                    .evaluate(ClassifiedRole::Unknown, RequestContext::anonymous(requested_path));
                info!(path = requested_path, reason = decision.reason.value(), "{err}");
                return decision;
            }
        };

        let role = classify(session.role.as_deref());
        if role == ClassifiedRole::Unknown {
            let err = AccessError::UnknownRole(session.role.clone());
            warn!(user_id = %session.user_id, path = requested_path, "{err}");
        }

        let decision = self
            .policy
            .evaluate(role, RequestContext::authenticated(requested_path));

        match decision.route {
            RouteDecision::Allow => {
                debug!(
                    user_id = %session.user_id,
                    role = ?role,
                    path = requested_path,
                    "gate allowed"
                );
            }
            RouteDecision::RedirectTo(target) => {
                info!(
                    user_id = %session.user_id,
                    role = ?role,
                    path = requested_path,
                    redirect_to = target,
                    reason = decision.reason.value(),
                    "gate redirected"
                );
            }
            RouteDecision::Deny => {
                info!(
                    user_id = %session.user_id,
                    role = ?role,
                    path = requested_path,
                    reason = decision.reason.value(),
                    "gate denied"
                );
            }
        }

        decision
    }

    /// Render `children` if the gate allows it.
    ///
    /// `children` is only called on allow. Dropping the returned future
    /// before it completes discards the decision without side effects.
    pub async fn render<F, Fut, T>(
        &self,
        credentials: &Credentials,
        requested_path: &str,
        mode: GateMode,
        children: F,
    ) -> RenderResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let decision = match mode {
            GateMode::Open => {
                debug!(path = requested_path, "open subtree, gate skipped");
                Decision::allow(OPEN_SUBTREE)
            }
            GateMode::Guarded => self.decide(credentials, requested_path).await,
        };
        finish(decision, children).await
    }

    /// Like [`Gate::render`], but gives up if `cancelled` completes first.
    ///
    /// Returns `None` when the request was aborted before the session lookup
    /// resolved. In that case neither the children nor a redirect happen.
    pub async fn render_until<C, F, Fut, T>(
        &self,
        credentials: &Credentials,
        requested_path: &str,
        mode: GateMode,
        cancelled: C,
        children: F,
    ) -> Option<RenderResult<T>>
    where
        C: Future<Output = ()>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let decision = match mode {
            GateMode::Open => Decision::allow(OPEN_SUBTREE),
            GateMode::Guarded => {
                tokio::select! {
                    biased;
                    _ = cancelled => {
                        debug!(path = requested_path, "request aborted before session resolved");
                        return None;
                    }
                    decision = self.decide(credentials, requested_path) => decision,
                }
            }
        };
        Some(finish(decision, children).await)
    }
}

async fn finish<F, Fut, T>(decision: Decision, children: F) -> RenderResult<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>,
{
    match decision.route {
        RouteDecision::Allow => RenderResult::Rendered(children().await),
        RouteDecision::RedirectTo(path) => RenderResult::Redirect(path),
        RouteDecision::Deny => RenderResult::Denied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SessionError;
    use crate::session::MemorySessionProvider;
    use crate::types::{ReasonCode, UNAUTHENTICATED, UNKNOWN_ROLE};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FailingProvider;

    #[async_trait]
    impl SessionProvider for FailingProvider {
        async fn resolve_session(
            &self,
            _credentials: &Credentials,
        ) -> Result<Option<Session>, SessionError> {
            Err(SessionError::Unavailable("auth service down".into()))
        }
    }

    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SessionProvider for CountingProvider {
        async fn resolve_session(
            &self,
            _credentials: &Credentials,
        ) -> Result<Option<Session>, SessionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }
    }

    /// A provider whose lookup never completes.
    struct PendingProvider;

    #[async_trait]
    impl SessionProvider for PendingProvider {
        async fn resolve_session(
            &self,
            _credentials: &Credentials,
        ) -> Result<Option<Session>, SessionError> {
            std::future::pending().await
        }
    }

    async fn gate_with(sessions: &[(&str, &str, Option<&str>)]) -> Gate<MemorySessionProvider> {
        let provider = MemorySessionProvider::new();
        for (token, user, role) in sessions {
            provider.insert(*token, *user, *role, None).await;
        }
        Gate::new(provider, RouteTable::default())
    }

    #[tokio::test]
    async fn test_allow_renders_children() {
        let gate = gate_with(&[("t", "alice", Some("ADMIN"))]).await;
        let result = gate
            .render(&Credentials::token("t"), "/admin/users", GateMode::Guarded, || async {
                "admin users page"
            })
            .await;
        assert_eq!(result, RenderResult::Rendered("admin users page"));
    }

    #[tokio::test]
    async fn test_redirect_never_runs_children() {
        let gate = gate_with(&[("t", "bob", Some("CLIENT"))]).await;
        let ran = AtomicBool::new(false);
        let ran_ref = &ran;

        let result = gate
            .render(&Credentials::token("t"), "/admin", GateMode::Guarded, move || async move {
                ran_ref.store(true, Ordering::SeqCst);
            })
            .await;

        assert_eq!(result, RenderResult::Redirect("/"));
        assert!(!ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_missing_session_redirects_to_signin() {
        let gate = gate_with(&[]).await;
        let result = gate
            .render(&Credentials::none(), "/user", GateMode::Guarded, || async {})
            .await;
        assert_eq!(result, RenderResult::Redirect("/auth/signin"));
    }

    #[tokio::test]
    async fn test_invalid_session_is_unauthenticated() {
        let provider = MemorySessionProvider::new();
        let expired = std::time::SystemTime::now() - std::time::Duration::from_secs(1);
        provider.insert("t", "carol", Some("ADMIN"), Some(expired)).await;
        let gate = Gate::new(provider, RouteTable::default());

        assert_eq!(
            gate.authenticate(&Credentials::token("t")).await,
            Err(AccessError::Unauthenticated)
        );
        let decision = gate.decide(&Credentials::token("t"), "/admin").await;
        assert_eq!(decision.route, RouteDecision::RedirectTo("/auth/signin"));
        assert_eq!(decision.reason, UNAUTHENTICATED);
    }

    #[tokio::test]
    async fn test_resolver_failure_fails_closed() {
        let gate = Gate::new(FailingProvider, RouteTable::default());

        let err = gate.authenticate(&Credentials::token("t")).await.unwrap_err();
        assert!(matches!(err, AccessError::ResolverFailure(SessionError::Unavailable(_))));

        let result = gate
            .render(&Credentials::token("t"), "/admin", GateMode::Guarded, || async { "secret" })
            .await;
        assert_eq!(result, RenderResult::Redirect("/auth/signin"));
    }

    #[tokio::test]
    async fn test_unknown_role_is_default_deny() {
        let gate = gate_with(&[("t", "eve", Some("superadmin"))]).await;

        let decision = gate.decide(&Credentials::token("t"), "/").await;
        assert_eq!(decision.route, RouteDecision::RedirectTo("/auth/signin"));
        assert_eq!(decision.reason, UNKNOWN_ROLE);

        let result = gate
            .render(&Credentials::token("t"), "/admin", GateMode::Guarded, || async { "secret" })
            .await;
        assert_eq!(result, RenderResult::Redirect("/"));
    }

    #[tokio::test]
    async fn test_lowercase_role_is_normalized() {
        let gate = gate_with(&[("t", "frank", Some("health_counselor"))]).await;
        let decision = gate.decide(&Credentials::token("t"), "/").await;
        assert_eq!(decision.route, RouteDecision::RedirectTo("/health-counselor/clients"));
    }

    #[tokio::test]
    async fn test_open_mode_skips_provider() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        let gate = Gate::new(Arc::clone(&provider), RouteTable::default());

        let result = gate
            .render(&Credentials::none(), "/auth/reset-password", GateMode::Open, || async {
                "reset form"
            })
            .await;

        assert_eq!(result, RenderResult::Rendered("reset form"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);

        let result = gate
            .render(&Credentials::none(), "/auth/profile", GateMode::Guarded, || async {
                "profile"
            })
            .await;
        assert_eq!(result, RenderResult::Redirect("/auth/signin"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_lookup_discards_decision() {
        let gate = Gate::new(PendingProvider, RouteTable::default());
        let ran = AtomicBool::new(false);
        let ran_ref = &ran;

        let result = gate
            .render_until(
                &Credentials::token("t"),
                "/admin",
                GateMode::Guarded,
                std::future::ready(()),
                move || async move {
                    ran_ref.store(true, Ordering::SeqCst);
                },
            )
            .await;

        assert_eq!(result, None);
        assert!(!ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_render_until_completes_when_not_cancelled() {
        let gate = gate_with(&[("t", "alice", Some("ADMIN"))]).await;
        let result = gate
            .render_until(
                &Credentials::token("t"),
                "/",
                GateMode::Guarded,
                std::future::pending(),
                || async { "never" },
            )
            .await;
        assert_eq!(result, Some(RenderResult::Redirect("/admin")));
    }

    /// Refuses clients outright instead of redirecting them.
    struct NoClients;

    impl RoutePolicy for NoClients {
        fn evaluate(&self, role: ClassifiedRole, context: RequestContext<'_>) -> Decision {
            match role {
                ClassifiedRole::Known(crate::role::Role::Client) if context.is_authenticated => {
                    Decision::new(RouteDecision::Deny, ReasonCode::new(100))
                }
                _ => RouteTable::default().evaluate(role, context),
            }
        }
    }

    #[tokio::test]
    async fn test_deny_never_runs_children() {
        let provider = MemorySessionProvider::new();
        provider.insert("client", "grace", Some("CLIENT"), None).await;
        provider.insert("admin", "heidi", Some("ADMIN"), None).await;
        let gate = Gate::new(provider, NoClients);
        let ran = AtomicBool::new(false);
        let ran_ref = &ran;

        let result = gate
            .render(&Credentials::token("client"), "/user", GateMode::Guarded, move || {
                async move {
                    ran_ref.store(true, Ordering::SeqCst);
                }
            })
            .await;
        assert_eq!(result, RenderResult::Denied);
        assert!(!ran.load(Ordering::SeqCst));

        let decision = gate.decide(&Credentials::token("admin"), "/admin").await;
        assert!(decision.is_allow());
        let decision = gate.decide(&Credentials::none(), "/user").await;
        assert_eq!(decision.route, RouteDecision::RedirectTo("/auth/signin"));
    }

    #[test]
    fn test_render_result_rendered() {
        assert_eq!(RenderResult::Rendered(5).rendered(), Some(5));
        assert_eq!(RenderResult::<i32>::Redirect("/").rendered(), None);
        assert_eq!(RenderResult::<i32>::Denied.rendered(), None);
    }
}
