//! HTTP boundary for the layout gate.
//!
//! [`GateLayer`] wraps an axum page router. For every request it picks the
//! gate mode from the layout, extracts credentials and runs the gate. The
//! inner service is only called when the gate allows the request.
//!
//! ```ignore
//! let state = GateState::new(gate, GateLayout::standard(), "next-auth.session-token");
//! let app = Router::new()
//!     .route("/admin", get(admin_page))
//!     .layer(GateLayer::new(state));
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{
        header::{AUTHORIZATION, COOKIE},
        HeaderMap, Request, StatusCode,
    },
    response::{IntoResponse, Redirect, Response},
};
use cookie::Cookie;
use tower::{Layer, Service};

use crate::gate::{Gate, RenderResult};
use crate::layout::GateLayout;
use crate::session::{Credentials, SessionProvider};
use crate::table::{RoutePolicy, RouteTable};

/// Default cookie carrying the session token.
pub const DEFAULT_SESSION_COOKIE: &str = "next-auth.session-token";

/// Everything the gate layer shares between requests. Read-only.
pub struct GateState<P, R = RouteTable> {
    gate: Arc<Gate<P, R>>,
    layout: Arc<GateLayout>,
    cookie_name: Arc<str>,
}

impl<P, R> Clone for GateState<P, R> {
    fn clone(&self) -> Self {
        GateState {
            gate: Arc::clone(&self.gate),
            layout: Arc::clone(&self.layout),
            cookie_name: Arc::clone(&self.cookie_name),
        }
    }
}

impl<P: SessionProvider, R: RoutePolicy> GateState<P, R> {
    /// Bundle a gate with its layout and the session cookie name.
    pub fn new(gate: Gate<P, R>, layout: GateLayout, cookie_name: &str) -> Self {
        GateState {
            gate: Arc::new(gate),
            layout: Arc::new(layout),
            cookie_name: Arc::from(cookie_name),
        }
    }

    /// The shared gate.
    pub fn gate(&self) -> &Gate<P, R> {
        &self.gate
    }

    /// The shared layout.
    pub fn layout(&self) -> &GateLayout {
        &self.layout
    }
}

/// Extract session credentials from request headers.
///
/// A `Bearer` authorization header wins over the session cookie. Empty
/// tokens count as no credentials.
pub fn credentials_from_headers(headers: &HeaderMap, cookie_name: &str) -> Credentials {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| {
            let (scheme, token) = value.trim().split_once(' ')?;
            scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
        })
        .filter(|token| !token.is_empty());
    if let Some(token) = bearer {
        return Credentials::token(token);
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| Cookie::split_parse(value))
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == cookie_name)
        .map(|cookie| cookie.value_trimmed().to_string())
        .filter(|token| !token.is_empty())
        .map(Credentials::token)
        .unwrap_or_default()
}

/// Tower layer running the gate in front of a page router.
pub struct GateLayer<P, R = RouteTable> {
    state: GateState<P, R>,
}

impl<P, R> Clone for GateLayer<P, R> {
    fn clone(&self) -> Self {
        GateLayer {
            state: self.state.clone(),
        }
    }
}

impl<P: SessionProvider, R: RoutePolicy> GateLayer<P, R> {
    /// Create a layer over the shared state.
    pub fn new(state: GateState<P, R>) -> Self {
        GateLayer { state }
    }
}

impl<S, P, R> Layer<S> for GateLayer<P, R> {
    type Service = GateService<S, P, R>;

    fn layer(&self, inner: S) -> Self::Service {
        GateService {
            inner,
            state: self.state.clone(),
        }
    }
}

/// Service wrapper for [`GateLayer`].
pub struct GateService<S, P, R = RouteTable> {
    inner: S,
    state: GateState<P, R>,
}

impl<S: Clone, P, R> Clone for GateService<S, P, R> {
    fn clone(&self) -> Self {
        GateService {
            inner: self.inner.clone(),
            state: self.state.clone(),
        }
    }
}

impl<S, P, R> Service<Request<Body>> for GateService<S, P, R>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    P: SessionProvider + 'static,
    R: RoutePolicy + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        // The clone may not be ready; keep the one that was polled.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let state = self.state.clone();

        Box::pin(async move {
            let path = req.uri().path().to_string();
            let credentials = credentials_from_headers(req.headers(), &state.cookie_name);
            let mode = state.layout.mode_for(&path);

            let result = state
                .gate
                .render(&credentials, &path, mode, move || inner.call(req))
                .await;

            match result {
                RenderResult::Rendered(response) => response,
                RenderResult::Redirect(target) => Ok(Redirect::temporary(target).into_response()),
                RenderResult::Denied => Ok(StatusCode::FORBIDDEN.into_response()),
            }
        })
    }
}
