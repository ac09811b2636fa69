#![allow(dead_code)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode, header};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};
use tower::ServiceExt;

use oidc_actions::app::build_router;
use oidc_actions::config::HttpLimits;
use oidc_actions::context::{ProfileConfiguration, SigningParameters};
use oidc_actions::services::directory::UserDirectory;
use oidc_actions::state::AppState;

pub const ISSUER: &str = "https://op.example";
pub const REDIRECT_URI: &str = "https://rp.example/cb";
pub const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

pub fn profile() -> ProfileConfiguration {
    ProfileConfiguration {
        issuer: ISSUER.into(),
        id_token_lifetime_seconds: 3600,
        access_token_lifetime_seconds: 600,
        authorization_code_lifetime_seconds: 300,
        supported_response_types: vec![
            "code".into(),
            "id_token".into(),
            "id_token token".into(),
            "code id_token".into(),
        ],
        token_endpoint_auth_methods: vec![
            "client_secret_basic".into(),
            "client_secret_post".into(),
        ],
        supported_signing_algorithms: vec!["HS256".into()],
        pairwise_salt: "integration-salt".into(),
    }
}

pub fn directory() -> UserDirectory {
    UserDirectory::from_json_str(
        r#"{
            "alice": {
                "name": "Alice Liddell",
                "email": "alice@example.com",
                "email_verified": true,
                "phone_number": "+1 555 0100"
            }
        }"#,
    )
    .expect("directory fixture")
}

pub fn app() -> Router {
    let signing = SigningParameters::hmac("HS256", SECRET, Some("k1".into()));
    let state = AppState::new(profile(), Some(signing), directory());
    build_router(state, HttpLimits::default())
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.expect("router is infallible")
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

pub fn location(response: &Response<Body>) -> url::Url {
    let raw = response.headers()[header::LOCATION]
        .to_str()
        .expect("ascii location");
    url::Url::parse(raw).expect("absolute location")
}

/// Query or fragment parameter of a redirect.
pub fn redirect_param(location: &url::Url, name: &str) -> Option<String> {
    let from_query = location
        .query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned());
    from_query.or_else(|| {
        url::form_urlencoded::parse(location.fragment().unwrap_or_default().as_bytes())
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    })
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn basic(client_id: &str, secret: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{client_id}:{secret}")))
}

/// Registers a code-flow client and returns `(client_id, client_secret)`.
pub async fn register_client(app: &Router, extra: Value) -> (String, String) {
    let mut body = json!({
        "redirect_uris": [REDIRECT_URI],
        "response_types": ["code", "code id_token"],
        "scope": "openid profile email",
        "client_name": "Example RP",
    });
    if let (Some(body), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
        body.extend(extra.clone());
    }

    let response = send(app, post_json("/api/v1/register", body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    (
        json["client_id"].as_str().expect("client_id").to_string(),
        json["client_secret"].as_str().unwrap_or_default().to_string(),
    )
}

pub fn authorize_uri(client_id: &str, response_type: &str, scope: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("client_id", client_id)
        .append_pair("response_type", response_type)
        .append_pair("redirect_uri", REDIRECT_URI)
        .append_pair("scope", scope)
        .append_pair("state", "af0ifjsldkj")
        .append_pair("nonce", "n-0S6_WzA2Mj")
        .finish();
    format!("/api/v1/authorize?{query}")
}

pub fn authorize_as(uri: &str, principal: &str) -> Request<Body> {
    Request::get(uri)
        .header("x-authenticated-user", principal)
        .header("x-authenticated-acr", "urn:acr:password")
        .body(Body::empty())
        .expect("request")
}

pub fn token_request(client_id: &str, secret: &str, code: &str) -> Request<Body> {
    let form = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("grant_type", "authorization_code")
        .append_pair("code", code)
        .append_pair("redirect_uri", REDIRECT_URI)
        .finish();
    Request::post("/api/v1/token")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(header::AUTHORIZATION, basic(client_id, secret))
        .body(Body::from(form))
        .expect("request")
}

/// Decodes a compact JWS payload without verifying it.
pub fn jwt_payload(token: &str) -> Value {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    let payload = token.split('.').nth(1).expect("payload segment");
    serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).expect("base64url")).expect("json")
}
