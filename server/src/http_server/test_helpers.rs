use axum::{body::Body, http::Response, Router};
use serde::de::DeserializeOwned;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    barcode::OpenFoodFactsConfig,
    state::{AdminConfig, AppConfig, VersionInfo},
    AppState,
};

pub const TEST_ADMIN_TOKEN: &str = "test-admin-token";

pub fn test_state(pool: PgPool) -> AppState {
    AppState {
        db: pool,
        app: AppConfig {
            base_url: "http://localhost:3000".parse().unwrap(),
            cors_origins: vec!["https://family.example".to_string()],
        },
        admin: AdminConfig {
            token: Some(TEST_ADMIN_TOKEN.to_string()),
        },
        open_ai: None,
        mailer: None,
        open_food_facts: OpenFoodFactsConfig::default(),
        http: reqwest::Client::new(),
        versions: VersionInfo::current(),
    }
}

/// Router over a pool that never connects. Only for requests rejected before any query runs.
pub fn create_offline_app() -> Router {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://offline@localhost/offline")
        .unwrap();

    create_test_app(pool)
}

pub fn create_test_app(pool: PgPool) -> Router {
    let state = test_state(pool);
    let cors = super::cors_layer(&state.app);

    super::routes::make_router().with_state(state).layer(cors)
}

pub async fn response_body_json<T: DeserializeOwned>(response: Response<Body>) -> T {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}
