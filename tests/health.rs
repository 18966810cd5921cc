use axum::extract::State;
use sea_orm::DatabaseConnection;
use template_store_api::{config::AppConfig, routes::health::health_check, state::AppState};

fn offline_state() -> AppState {
    let config = AppConfig {
        database_url: "postgres://unused".into(),
        host: "127.0.0.1".into(),
        port: 3000,
        jwt_secret: "test-secret".into(),
        upload_dir: std::env::temp_dir().display().to_string(),
        public_base_url: "http://localhost:3000".into(),
        max_upload_bytes: 1024,
        promo_codes: Vec::new(),
    };
    AppState::new(DatabaseConnection::Disconnected, config)
}

#[tokio::test]
async fn health_check_reports_unavailable_database() {
    let response = health_check(State(offline_state())).await;
    assert_eq!(response.0.message, "Health check");

    let data = response.0.data.expect("health data");
    assert_eq!(data.status, "ok");
    assert_eq!(data.database, "unavailable");
}
