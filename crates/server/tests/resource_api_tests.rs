//! Resource API validating tokens against its authority's key set.

mod common;

use axum::http::{HeaderValue, header};
use axum_test::TestServer;
use common::{resource_config, test_config};
use oidc_authority::bootstrap::{authorization_server_with, resource_api};
use oidc_authority::catalog::Catalog;
use oidc_authority::credential::SigningCredential;
use oidc_authority::engine::AccessTokenClaims;
use sea_orm::Database;
use std::sync::Arc;
use time::OffsetDateTime;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const JWKS: &str = "/.well-known/openid-configuration/jwks";

fn sign(credential: &SigningCredential, issuer: &str, audience: &str) -> String {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let claims = AccessTokenClaims {
        iss: issuer.into(),
        aud: vec![audience.into()],
        client_id: "client".into(),
        scope: vec!["api1".into()],
        exp: now + 300,
        iat: now,
        nbf: now,
        jti: uuid::Uuid::new_v4().to_string(),
    };
    jsonwebtoken::encode(&credential.header(), &claims, credential.encoding_key()).unwrap()
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
}

async fn authority_with_keys(credential: &SigningCredential) -> MockServer {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(JWKS))
        .respond_with(ResponseTemplate::new(200).set_body_json(credential.jwks()))
        .mount(&mock)
        .await;
    mock
}

#[tokio::test]
async fn test_identity_returns_token_claims() {
    let credential = SigningCredential::ephemeral().unwrap();
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(JWKS))
        .respond_with(ResponseTemplate::new(200).set_body_json(credential.jwks()))
        // the key set is cached after the first fetch
        .expect(1)
        .mount(&mock)
        .await;

    let router = resource_api(&resource_config(&mock.uri())).expect("bootstrap");
    let server = TestServer::new(router).expect("create test server");
    let token = sign(&credential, &mock.uri(), "api1");

    for _ in 0..2 {
        let response = server
            .get("/identity")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .await;
        response.assert_status_ok();
        let claims: Vec<serde_json::Value> = response.json();
        assert!(
            claims
                .iter()
                .any(|c| c["type"] == "client_id" && c["value"] == "client")
        );
        assert!(
            claims
                .iter()
                .any(|c| c["type"] == "scope" && c["value"] == "api1")
        );
    }
}

#[tokio::test]
async fn test_identity_requires_token() {
    let credential = SigningCredential::ephemeral().unwrap();
    let mock = authority_with_keys(&credential).await;
    let router = resource_api(&resource_config(&mock.uri())).expect("bootstrap");
    let server = TestServer::new(router).expect("create test server");

    server.get("/identity").await.assert_status_unauthorized();
    server.get("/healthz").await.assert_status_ok();
}

#[tokio::test]
async fn test_rejects_wrong_audience_and_foreign_key() {
    let credential = SigningCredential::ephemeral().unwrap();
    let mock = authority_with_keys(&credential).await;
    let router = resource_api(&resource_config(&mock.uri())).expect("bootstrap");
    let server = TestServer::new(router).expect("create test server");

    let wrong_audience = sign(&credential, &mock.uri(), "api2");
    server
        .get("/identity")
        .add_header(header::AUTHORIZATION, bearer(&wrong_audience))
        .await
        .assert_status_unauthorized();

    let stranger = SigningCredential::ephemeral().unwrap();
    let foreign = sign(&stranger, &mock.uri(), "api1");
    server
        .get("/identity")
        .add_header(header::AUTHORIZATION, bearer(&foreign))
        .await
        .assert_status_unauthorized();

    let wrong_issuer = sign(&credential, "https://elsewhere.test", "api1");
    server
        .get("/identity")
        .add_header(header::AUTHORIZATION, bearer(&wrong_issuer))
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn test_unknown_key_ids_do_not_refetch_key_set() {
    let credential = SigningCredential::ephemeral().unwrap();
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(JWKS))
        .respond_with(ResponseTemplate::new(200).set_body_json(credential.jwks()))
        .expect(1)
        .mount(&mock)
        .await;

    let router = resource_api(&resource_config(&mock.uri())).expect("bootstrap");
    let server = TestServer::new(router).expect("create test server");

    let stranger = SigningCredential::ephemeral().unwrap();
    let foreign = sign(&stranger, &mock.uri(), "api1");
    for _ in 0..20 {
        server
            .get("/identity")
            .add_header(header::AUTHORIZATION, bearer(&foreign))
            .await
            .assert_status_unauthorized();
    }

    // the genuine key is still served from the cached set
    let token = sign(&credential, &mock.uri(), "api1");
    server
        .get("/identity")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_token_from_authority_is_accepted() {
    // The authority's issuer is the mock server, which serves the authority's keys.
    let mock = MockServer::start().await;
    let db = Database::connect("sqlite::memory:").await.expect("connect");
    let authority = authorization_server_with(
        Arc::new(db),
        Arc::new(test_config(&mock.uri())),
        &Catalog::standard(),
    )
    .await
    .expect("bootstrap authority");
    Mock::given(method("GET"))
        .and(path(JWKS))
        .respond_with(ResponseTemplate::new(200).set_body_json(authority.credential.jwks()))
        .mount(&mock)
        .await;

    let auth_server = TestServer::new(authority.router).expect("create test server");
    let response = auth_server
        .post("/connect/token")
        .form(&[
            ("grant_type", "client_credentials"),
            ("client_id", "client"),
            ("client_secret", "secret"),
            ("scope", "api1"),
        ])
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let token = body["access_token"].as_str().expect("access token").to_string();

    let api = TestServer::new(resource_api(&resource_config(&mock.uri())).expect("bootstrap"))
        .expect("create test server");
    api.get("/identity")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await
        .assert_status_ok();
}
