use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};

use farmxchain_auth::{RoutePolicy, SecurityContext, TokenCodec, check_expiry};

use crate::app::errors::ApiError;

/// Authentication gate state: the shared codec plus the paths it never inspects.
#[derive(Debug, Clone)]
pub struct GateConfig {
    codec: Arc<TokenCodec>,
    public_paths: Vec<String>,
}

impl GateConfig {
    pub fn new<I, P>(codec: Arc<TokenCodec>, public_paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            codec,
            public_paths: public_paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.public_paths.iter().any(|p| p == path)
    }

    /// Resolve the caller's identity from the `Authorization` header.
    ///
    /// Fail-open: a missing, malformed, forged or expired token yields `None`
    /// and the request continues anonymously.
    pub fn authenticate(&self, headers: &HeaderMap, now: DateTime<Utc>) -> Option<SecurityContext> {
        let token = bearer_token(headers)?;

        let claims = match self.codec.decode_claims(token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!(error = %e, "ignoring unusable bearer token");
                return None;
            }
        };

        if let Err(e) = check_expiry(&claims, now) {
            tracing::debug!(error = %e, "ignoring expired bearer token");
            return None;
        }

        Some(SecurityContext::from_claims(&claims))
    }
}

/// Attach a [`SecurityContext`] to requests carrying a valid bearer token.
///
/// Never rejects. Routes that need an identity are enforced by
/// [`authorize_route`] or the [`crate::context::Authenticated`] extractor.
pub async fn authentication_gate(
    State(gate): State<Arc<GateConfig>>,
    mut req: Request,
    next: Next,
) -> Response {
    let already_authenticated = req.extensions().get::<SecurityContext>().is_some();

    if !already_authenticated && !gate.is_public(req.uri().path()) {
        if let Some(ctx) = gate.authenticate(req.headers(), Utc::now()) {
            req.extensions_mut().insert(ctx);
        }
    }

    next.run(req).await
}

/// Role gate: deny before any handler runs when the route table says so.
pub async fn authorize_route(
    State(policy): State<Arc<RoutePolicy>>,
    req: Request,
    next: Next,
) -> Response {
    let ctx = req.extensions().get::<SecurityContext>();

    match policy.evaluate(req.method().as_str(), req.uri().path(), ctx) {
        Ok(()) => next.run(req).await,
        Err(e) => {
            tracing::debug!(
                method = %req.method(),
                path = %req.uri().path(),
                reason = %e,
                "request denied by route policy"
            );
            ApiError::from(e).into_response()
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        return None;
    }

    Some(token)
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension, Router,
        body::Body,
        http::{HeaderValue, StatusCode, header::AUTHORIZATION},
        routing::get,
    };
    use chrono::Duration;
    use farmxchain_auth::{Access, Role, SigningKey};
    use farmxchain_core::AccountId;
    use tower::ServiceExt;

    use super::*;

    const SECRET: &[u8] = b"middleware-test-secret-0123456789abcdef";

    fn codec() -> Arc<TokenCodec> {
        Arc::new(TokenCodec::new(SigningKey::new(SECRET).unwrap()))
    }

    fn gate(codec: Arc<TokenCodec>) -> GateConfig {
        GateConfig::new(codec, ["/login"])
    }

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    async fn whoami(ctx: Option<Extension<SecurityContext>>) -> String {
        match ctx {
            Some(Extension(ctx)) => format!("{}|{}", ctx.subject(), ctx.authority().as_str()),
            None => "anonymous".to_string(),
        }
    }

    fn app(codec: Arc<TokenCodec>) -> Router {
        let policy = RoutePolicy::new()
            .rule("GET", "/whoami", Access::Anyone)
            .rule("GET", "/login", Access::Anyone)
            .rule("GET", "/farm", Access::Role(Role::FARMER));

        Router::new()
            .route("/whoami", get(whoami))
            .route("/login", get(whoami))
            .route("/farm", get(whoami))
            .layer(axum::middleware::from_fn_with_state(Arc::new(policy), authorize_route))
            .layer(axum::middleware::from_fn_with_state(
                Arc::new(gate(codec)),
                authentication_gate,
            ))
    }

    async fn call(app: Router, path: &str, auth: Option<&str>) -> (StatusCode, String) {
        let mut req = axum::http::Request::builder().uri(path);
        if let Some(auth) = auth {
            req = req.header(AUTHORIZATION, auth);
        }
        let res = app.oneshot(req.body(Body::empty()).unwrap()).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[test]
    fn bearer_parsing() {
        assert_eq!(bearer_token(&headers("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("Bearer   abc  ")), Some("abc"));
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("Basic abc")), None);
        assert_eq!(bearer_token(&headers("bearer abc")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn authenticate_yields_normalized_context() {
        let codec = codec();
        let token = codec.issue(AccountId::new(42), "a@b.com", &Role::FARMER).unwrap();
        let ctx = gate(codec)
            .authenticate(&headers(&format!("Bearer {token}")), Utc::now())
            .unwrap();

        assert_eq!(ctx.subject(), "a@b.com");
        assert_eq!(ctx.authority().as_str(), "ROLE_FARMER");
        assert_eq!(ctx.account_id(), AccountId::new(42));
    }

    #[test]
    fn authenticate_fails_open_on_expired_and_foreign_tokens() {
        let codec = codec();
        let issued = Utc::now() - Duration::hours(11);
        let expired = codec.issue_at(AccountId::new(1), "a@b.com", &Role::FARMER, issued).unwrap();
        let gate = gate(codec);
        assert!(gate.authenticate(&headers(&format!("Bearer {expired}")), Utc::now()).is_none());

        let other = TokenCodec::new(SigningKey::new(&b"some-other-secret-some-other-secret"[..]).unwrap());
        let foreign = other.issue(AccountId::new(1), "a@b.com", &Role::FARMER).unwrap();
        assert!(gate.authenticate(&headers(&format!("Bearer {foreign}")), Utc::now()).is_none());
        assert!(gate.authenticate(&headers("Bearer garbage"), Utc::now()).is_none());
    }

    #[tokio::test]
    async fn anonymous_requests_pass_through_on_open_routes() {
        let (status, body) = call(app(codec()), "/whoami", Some("Bearer garbage")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
    }

    #[tokio::test]
    async fn valid_token_populates_context() {
        let codec = codec();
        let token = codec.issue(AccountId::new(42), "a@b.com", &Role::FARMER).unwrap();
        let (status, body) = call(app(codec), "/farm", Some(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "a@b.com|ROLE_FARMER");
    }

    #[tokio::test]
    async fn existing_context_is_not_replaced() {
        let codec = codec();
        let token = codec.issue(AccountId::new(42), "a@b.com", &Role::FARMER).unwrap();
        let preset = SecurityContext::new(
            "pre@x.com",
            farmxchain_auth::Authority::from_role_str("FARMER"),
            AccountId::new(7),
        );
        let app = app(codec).layer(Extension(preset));

        let (status, body) = call(app, "/whoami", Some(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "pre@x.com|ROLE_FARMER");
    }

    #[tokio::test]
    async fn head_is_gated_like_get() {
        let codec = codec();
        let token = codec.issue(AccountId::new(42), "a@b.com", &Role::FARMER).unwrap();
        let head = |auth: Option<String>| {
            let mut req = axum::http::Request::builder()
                .method(axum::http::Method::HEAD)
                .uri("/farm");
            if let Some(auth) = auth {
                req = req.header(AUTHORIZATION, auth);
            }
            req.body(Body::empty()).unwrap()
        };

        let res = app(codec.clone()).oneshot(head(None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let res = app(codec).oneshot(head(Some(format!("Bearer {token}")))).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn public_paths_are_never_inspected() {
        let codec = codec();
        let token = codec.issue(AccountId::new(42), "a@b.com", &Role::FARMER).unwrap();
        let (status, body) = call(app(codec), "/login", Some(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
    }

    #[tokio::test]
    async fn role_gate_denies_before_handler() {
        let codec = codec();
        let buyer = codec.issue(AccountId::new(3), "c@d.com", &Role::new("BUYER")).unwrap();

        let (status, _) = call(app(codec.clone()), "/farm", None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = call(app(codec.clone()), "/farm", Some(&format!("Bearer {buyer}"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body.contains("forbidden"));

        let (status, _) = call(app(codec), "/unlisted", None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
