use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::{Method, Request},
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;

use crate::{
    crypto::token::TokenIssuer,
    error::{AppError, Result},
    models::session::Principal,
    services::cookies::{CookieSource, CookieTransport},
};

/// Routes the guard lets through without a session.
#[derive(Debug, Clone, Default)]
pub struct PublicRoutes {
    routes: HashSet<(Method, String)>,
}

impl PublicRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `method path` as public. `path` is the route pattern as
    /// registered on the router, e.g. `/sellers/{id}`.
    pub fn allow(mut self, method: Method, path: &str) -> Self {
        self.routes.insert((method, path.to_string()));
        self
    }

    pub fn contains(&self, method: &Method, path: &str) -> bool {
        self.routes.contains(&(method.clone(), path.to_string()))
    }
}

/// What the guard needs from a request, independent of the HTTP framework.
pub trait GuardRequest: CookieSource {
    /// Whether the target handler is registered as public.
    fn is_public(&self) -> bool;

    /// Makes the authenticated principal visible to the handler.
    fn attach_principal(&mut self, principal: Principal);
}

/// How the guard admitted a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Public route; no principal attached.
    Public,
    /// Valid session; the principal was attached.
    Authenticated(Principal),
}

/// Decides whether a request may reach its handler.
#[derive(Clone)]
pub struct AccessGuard {
    tokens: TokenIssuer,
    cookies: CookieTransport,
}

impl AccessGuard {
    pub fn new(tokens: TokenIssuer, cookies: CookieTransport) -> Self {
        Self { tokens, cookies }
    }

    /// Admits or rejects `request`.
    ///
    /// Rejects with `Unauthenticated` when no session cookie was sent and
    /// with `InvalidOrExpiredToken` when the token fails validation. Never
    /// touches anything beyond the request itself.
    pub fn check<R>(&self, request: &mut R) -> Result<Admission>
    where
        R: GuardRequest,
    {
        if request.is_public() {
            return Ok(Admission::Public);
        }

        let token = self
            .cookies
            .extract_token(&*request)
            .ok_or(AppError::Unauthenticated)?;

        let principal = self.tokens.validate(&token)?;
        request.attach_principal(principal);

        Ok(Admission::Authenticated(principal))
    }
}

/// State handed to the [`require_auth`] middleware.
#[derive(Clone)]
pub struct GuardState {
    pub guard: AccessGuard,
    pub public_routes: Arc<PublicRoutes>,
}

/// Adapts an axum request to [`GuardRequest`].
struct AxumGuardRequest<'a> {
    request: &'a mut Request<Body>,
    cookies: &'a Cookies,
    public: bool,
}

impl CookieSource for AxumGuardRequest<'_> {
    fn cookie_value(&self, name: &str) -> Option<String> {
        self.cookies.cookie_value(name)
    }
}

impl GuardRequest for AxumGuardRequest<'_> {
    fn is_public(&self) -> bool {
        self.public
    }

    fn attach_principal(&mut self, principal: Principal) {
        self.request.extensions_mut().insert(principal);
    }
}

/// A middleware that requires a valid session unless the route is public.
///
/// Must be installed with `route_layer` so `MatchedPath` is available.
///
/// # Arguments
///
/// * `state` - The guard and the public route registry.
/// * `cookies` - The request cookies.
/// * `request` - The incoming request.
/// * `next` - The next middleware in the chain.
///
/// # Returns
///
/// A `Response` or an error `AppError`.
pub async fn require_auth(
    State(state): State<GuardState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response> {
    let public = request
        .extensions()
        .get::<MatchedPath>()
        .is_some_and(|path| state.public_routes.contains(request.method(), path.as_str()));

    let admission = state.guard.check(&mut AxumGuardRequest {
        request: &mut request,
        cookies: &cookies,
        public,
    })?;

    match admission {
        Admission::Public => tracing::debug!("Public route, skipping authentication"),
        Admission::Authenticated(principal) => {
            tracing::debug!("✅ Seller authenticated: {}", principal.seller_id)
        }
    }

    Ok(next.run(request).await)
}
