use axum::{extract::State, routing::get, Router};
use serde::Serialize;

use crate::AppState;

use super::{api, api::extract::Json, errors::ServerError};

pub(crate) fn make_router() -> Router<AppState> {
    Router::new()
        .route("/_", get(versions))
        .nest("/api", api::router())
        .fallback(fallback)
}

#[derive(Debug, Serialize)]
struct Versions {
    name: &'static str,
    version: &'static str,
}

async fn versions(State(state): State<AppState>) -> Json<Versions> {
    Json(Versions {
        name: state.versions.name,
        version: state.versions.version,
    })
}

async fn fallback() -> ServerError {
    ServerError::not_found("Route")
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use tower::ServiceExt as _;

    use crate::http_server::test_helpers::{
        create_offline_app, create_test_app, response_body_json, TEST_ADMIN_TOKEN,
    };

    fn json_request(method: Method, uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_versions_endpoint() {
        let response = create_offline_app()
            .oneshot(empty_request(Method::GET, "/_"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = response_body_json(response).await;
        assert_eq!(body["name"], "family-fork");
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let response = create_offline_app()
            .oneshot(empty_request(Method::GET, "/api/nope"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = response_body_json(response).await;
        assert_eq!(body["detail"], "Route not found");
    }

    #[tokio::test]
    async fn test_admin_verify_requires_token() {
        let response = create_offline_app()
            .oneshot(empty_request(Method::GET, "/api/admin/verify"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = response_body_json(response).await;
        assert_eq!(body["detail"], "Invalid or missing admin token");
    }

    #[tokio::test]
    async fn test_admin_verify_with_token() {
        let request = Request::builder()
            .uri("/api/admin/verify")
            .header(header::AUTHORIZATION, format!("Bearer {TEST_ADMIN_TOKEN}"))
            .body(Body::empty())
            .unwrap();

        let response = create_offline_app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = response_body_json(response).await;
        assert_eq!(body["valid"], true);
    }

    #[tokio::test]
    async fn test_admin_routes_reject_wrong_token() {
        let id = uuid::Uuid::new_v4();

        let delete = Request::builder()
            .method(Method::DELETE)
            .uri(format!("/api/bugs/{id}"))
            .header(header::AUTHORIZATION, "Bearer not-the-token")
            .body(Body::empty())
            .unwrap();
        let response = create_offline_app().oneshot(delete).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let status = json_request(
            Method::PUT,
            &format!("/api/bugs/{id}/status"),
            &serde_json::json!({ "status": "resolved" }),
        );
        let response = create_offline_app().oneshot(status).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let seed = empty_request(Method::POST, "/api/seed-recipes");
        let response = create_offline_app().oneshot(seed).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_internal_comment_requires_admin() {
        let id = uuid::Uuid::new_v4();
        let request = json_request(
            Method::POST,
            &format!("/api/bugs/{id}/comments"),
            &serde_json::json!({ "comment": "secret", "is_internal": true }),
        );

        let response = create_offline_app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_barcode_is_400() {
        for barcode in ["abc12345", "1234567", "123456789012345"] {
            let response = create_offline_app()
                .oneshot(empty_request(
                    Method::POST,
                    &format!("/api/inventory/barcode/{barcode}"),
                ))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{barcode}");
            let body: serde_json::Value = response_body_json(response).await;
            assert_eq!(body["detail"], "Invalid barcode format");
        }
    }

    #[tokio::test]
    async fn test_recipe_servings_must_be_positive() {
        let request = json_request(
            Method::POST,
            "/api/recipes",
            &serde_json::json!({ "name": "Toast", "servings": 0 }),
        );

        let response = create_offline_app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response_body_json(response).await;
        assert_eq!(body["detail"], "Servings must be greater than 0");
    }

    #[tokio::test]
    async fn test_meal_plan_servings_must_be_positive() {
        let request = json_request(
            Method::POST,
            "/api/meal-plans",
            &serde_json::json!({
                "week_start_date": "2025-03-02",
                "family_member_id": uuid::Uuid::new_v4(),
                "day_of_week": "monday",
                "meal_type": "dinner",
                "recipe_id": uuid::Uuid::new_v4(),
                "servings": -2,
            }),
        );

        let response = create_offline_app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_bad_path_and_body_use_detail_errors() {
        let response = create_offline_app()
            .oneshot(empty_request(Method::GET, "/api/recipes/not-a-uuid"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response_body_json(response).await;
        assert!(body["detail"].is_string());

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/family-members")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = create_offline_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response_body_json(response).await;
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_configured_origin() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/recipes")
            .header(header::ORIGIN, "https://family.example")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();

        let response = create_offline_app().oneshot(request).await.unwrap();

        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "https://family.example"
        );
    }

    #[sqlx::test(migrations = "../db/migrations")]
    #[ignore = "needs a Postgres DATABASE_URL"]
    async fn test_plan_week_and_generate_grocery_list(pool: sqlx::PgPool) {
        let app = create_test_app(pool);

        let member = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/family-members",
                &serde_json::json!({ "name": "Avery" }),
            ))
            .await
            .unwrap();
        let member: serde_json::Value = response_body_json(member).await;

        let recipe = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/recipes",
                &serde_json::json!({
                    "name": "Pancakes",
                    "servings": 2,
                    "ingredients": [
                        { "name": "Flour", "quantity": "1", "unit": "cup", "store_section": "pantry" },
                        { "name": "Salt", "quantity": "a pinch", "unit": "", "store_section": "pantry" }
                    ]
                }),
            ))
            .await
            .unwrap();
        let recipe: serde_json::Value = response_body_json(recipe).await;

        for day in ["monday", "tuesday"] {
            let response = app
                .clone()
                .oneshot(json_request(
                    Method::POST,
                    "/api/meal-plans",
                    &serde_json::json!({
                        "week_start_date": "2025-03-02",
                        "family_member_id": member["family_member_id"],
                        "day_of_week": day,
                        "meal_type": "breakfast",
                        "recipe_id": recipe["recipe_id"],
                        "servings": 1,
                    }),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app
            .clone()
            .oneshot(empty_request(Method::POST, "/api/grocery-list/2025-03-02"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let list: serde_json::Value = response_body_json(response).await;

        assert_eq!(list["items"][0]["ingredient_name"], "Flour");
        assert_eq!(list["items"][0]["total_quantity"], "1.0");
        assert_eq!(list["items"][1]["total_quantity"], "See recipes: Pancakes");

        let response = app
            .oneshot(empty_request(Method::GET, "/api/grocery-lists/2025-03-02"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
