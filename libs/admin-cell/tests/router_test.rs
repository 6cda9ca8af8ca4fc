use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use admin_cell::admin_routes;
use shared_utils::test_utils::{JwtTestUtils, MockSupabaseResponses, TestConfig, TestUser};

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_admin_routes_require_token() {
    let app = admin_routes(TestConfig::default().to_arc());

    let response = app
        .oneshot(Request::builder().uri("/profiles/pending").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_staff_token_is_forbidden() {
    let config = TestConfig::default();
    let token = JwtTestUtils::create_test_token(&TestUser::staff("north"), &config.jwt_secret, None);
    let app = admin_routes(config.to_arc());

    let response = app
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri("/profiles/p-new/approve")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Only administrators can manage accounts and units");
}

#[tokio::test]
async fn test_admin_token_approves_through_router() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::profile_response("p-new", "Joana Prado", Some("north"), "active"),
        ])))
        .mount(&server)
        .await;

    let config = TestConfig::with_supabase_url(&server.uri());
    let token = JwtTestUtils::create_test_token(&TestUser::admin(), &config.jwt_secret, None);
    let app = admin_routes(config.to_arc());

    let response = app
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri("/profiles/p-new/approve")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["profile"]["status"], "active");
}
