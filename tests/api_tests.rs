use chrono::Utc;
use pagegate::{
    AppConfig, AppState, MemoryRepository, create_router,
    models::{AccessGrant, PrivatePage, User},
    repository::Repository,
    seed::SeedData,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use uuid::Uuid;

#[derive(Debug)]
pub struct TestApp {
    pub address: String,
    pub user_id: Uuid,
}

/// Serves the full router on an ephemeral port with one user and one private page.
async fn spawn_app() -> TestApp {
    let repo = Arc::new(MemoryRepository::new());
    let user_id = Uuid::new_v4();
    repo.create_user(User {
        id: user_id,
        email: "t@t.com".to_string(),
    })
    .await;
    repo.create_page(PrivatePage {
        id: Uuid::new_v4(),
        slug: "roadmap".to_string(),
        title: "Roadmap".to_string(),
        body: "Q3: ship it".to_string(),
        access_code: "ROAD-MAP".to_string(),
        created_at: Utc::now(),
    })
    .await;

    let state = AppState::new(repo, AppConfig::default());
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp { address, user_id }
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("req fail");
    assert!(response.status().is_success());
}

#[tokio::test]
async fn test_mutating_request_without_origin_gets_403() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/pages/roadmap/redeem", app.address))
        .header("x-user-id", app.user_id.to_string())
        .json(&serde_json::json!({ "code": "ROAD-MAP" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    // Nothing was unlocked.
    let grants: Vec<AccessGrant> = client
        .get(format!("{}/me/grants", app.address))
        .header("x-user-id", app.user_id.to_string())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(grants.is_empty());
}

#[tokio::test]
async fn test_redeem_lifecycle() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/pages/roadmap/redeem", app.address))
        .header("origin", "http://localhost:3000")
        .header("x-user-id", app.user_id.to_string())
        .json(&serde_json::json!({ "code": "ROAD-MAP" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let grants: Vec<AccessGrant> = client
        .get(format!("{}/me/grants", app.address))
        .header("x-user-id", app.user_id.to_string())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].user_id, app.user_id);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = spawn_app().await;
    let doc: serde_json::Value = reqwest::get(format!("{}/api-docs/openapi.json", app.address))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(doc["paths"]["/auth/email-check"].is_object());
    assert!(doc["paths"]["/pages/{slug}/redeem"].is_object());
    // Accounts are internal; no endpoint returns them.
    assert!(doc["components"]["schemas"]["User"].is_null());
    assert!(doc["components"]["schemas"]["PageSummary"].is_object());
}

#[tokio::test]
async fn test_server_boots_from_seed_file() {
    let user_id = Uuid::new_v4();
    let seed = serde_json::json!({
        "users": [{ "id": user_id, "email": "seeded@example.com" }],
        "pages": [{
            "slug": "handbook",
            "title": "Handbook",
            "body": "Be kind.",
            "access_code": "HAND-BOOK"
        }]
    });
    let path = std::env::temp_dir().join(format!("pagegate-seed-{}.json", Uuid::new_v4()));
    std::fs::write(&path, seed.to_string()).unwrap();

    let config = AppConfig {
        seed_file: Some(path.clone()),
        ..AppConfig::default()
    };
    let repo = Arc::new(MemoryRepository::new());
    let seed = SeedData::from_file(config.seed_file.as_deref().unwrap()).unwrap();
    assert_eq!(seed.apply(repo.as_ref()).await, (1, 1));
    std::fs::remove_file(&path).ok();

    let router = create_router(AppState::new(repo, config));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = format!("http://127.0.0.1:{}", listener.local_addr().unwrap().port());
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    let client = reqwest::Client::new();

    let summary = client
        .get(format!("{address}/pages/handbook"))
        .send()
        .await
        .unwrap();
    assert_eq!(summary.status(), 200);

    let redeemed = client
        .post(format!("{address}/pages/handbook/redeem"))
        .header("origin", "http://localhost:3000")
        .header("x-user-id", user_id.to_string())
        .json(&serde_json::json!({ "code": "HAND-BOOK" }))
        .send()
        .await
        .unwrap();
    assert_eq!(redeemed.status(), 200);
    let body: serde_json::Value = redeemed.json().await.unwrap();
    assert_eq!(body["body"], "Be kind.");
}
