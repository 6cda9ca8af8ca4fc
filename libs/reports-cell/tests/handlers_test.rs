use std::sync::Arc;

use assert_matches::assert_matches;
use axum::extract::{Extension, Query, State};
use axum_extra::TypedHeader;
use chrono::Utc;
use headers::{authorization::Bearer, Authorization};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use reports_cell::handlers::*;
use shared_config::AppConfig;
use shared_models::{auth::User, error::AppError};
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig, TestUser};

fn state_for(server: &MockServer) -> State<Arc<AppConfig>> {
    State(TestConfig::with_supabase_url(&server.uri()).to_arc())
}

fn auth_header() -> TypedHeader<Authorization<Bearer>> {
    TypedHeader(Authorization::bearer("test-token").unwrap())
}

fn as_user(user: TestUser) -> Extension<User> {
    Extension(user.to_user())
}

fn inventory_row(name: &str, stock: i64, min: i64, cost: f64, category: Option<(&str, &str)>) -> serde_json::Value {
    json!({
        "id": name.to_lowercase(),
        "name": name,
        "current_stock": stock,
        "min_stock": min,
        "cost_per_unit": cost,
        "unit_id": "north",
        "categories": category.map(|(name, color)| json!({ "name": name, "color": color })),
    })
}

async fn mount_inventory(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/inventory_items"))
        .and(query_param("unit_id", "eq.north"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            inventory_row("Gloves", 0, 10, 2.0, Some(("Supplies", "#22C55E"))),
            inventory_row("Reagent", 10, 5, 30.0, Some(("Lab", "#3B82F6"))),
            inventory_row("Gauze", 20, 5, 1.0, None),
        ])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_summary_for_staff_unit() {
    let server = MockServer::start().await;
    mount_inventory(&server).await;

    let now = Utc::now().to_rfc3339();
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("unit_id", "eq.north"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::appointment_response("a1", "doc-north", "north", &now, "completed"),
            MockSupabaseResponses::appointment_response("a2", "doc-north", "north", &now, "cancelled"),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/exam_types"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::exam_type_response("ecg", "Resting ECG", Some("Cardiology"), 80.0),
            MockSupabaseResponses::exam_type_response("cbc", "Complete Blood Count", Some("Laboratory"), 20.0),
        ])))
        .mount(&server)
        .await;

    let result = get_summary(
        state_for(&server),
        auth_header(),
        as_user(TestUser::staff("north")),
        Query(SummaryQuery { unit_id: Some("all".to_string()) }),
    )
    .await
    .unwrap();

    let body = result.0;
    assert_eq!(body["scope"]["unit_id"], "north");
    assert_eq!(body["appointments"]["total"], 2);
    assert_eq!(body["appointments"]["this_month"], 2);
    assert_eq!(body["appointments"]["revenue"], 120.0);
    assert_eq!(body["appointments"]["completion_rate"], 50.0);
    assert_eq!(body["exams"]["total"], 2);
    assert_eq!(body["exams"]["average_cost"], 50.0);
    assert_eq!(body["inventory"]["total_items"], 3);
    assert_eq!(body["inventory"]["total_value"], 320.0);
    assert_eq!(body["inventory"]["low_stock"], 1);
    assert_eq!(body["inventory"]["out_of_stock"], 1);
}

#[tokio::test]
async fn test_inventory_categories_respects_limit() {
    let server = MockServer::start().await;
    mount_inventory(&server).await;

    let result = get_inventory_categories(
        state_for(&server),
        auth_header(),
        as_user(TestUser::supervisor("south")),
        Query(CategoriesQuery { unit_id: Some("north".to_string()), limit: Some(2) }),
    )
    .await
    .unwrap();

    let categories = result.0["categories"].as_array().unwrap().clone();
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0]["label"], "Lab");
    assert_eq!(categories[0]["color"], "#3B82F6");
    assert_eq!(categories[1]["label"], "Other");
}

#[tokio::test]
async fn test_zero_limit_is_rejected() {
    let server = MockServer::start().await;

    let result = get_inventory_categories(
        state_for(&server),
        auth_header(),
        as_user(TestUser::admin()),
        Query(CategoriesQuery { unit_id: None, limit: Some(0) }),
    )
    .await;

    assert_matches!(result, Err(AppError::BadRequest(_)));
}

#[tokio::test]
async fn test_upstream_failure_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let result = get_summary(
        state_for(&server),
        auth_header(),
        as_user(TestUser::admin()),
        Query(SummaryQuery { unit_id: None }),
    )
    .await;

    assert_matches!(result, Err(AppError::Database(_)));
}
