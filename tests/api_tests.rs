use chrono::Utc;
use contacts_api::{
    AppState, InMemoryRepository, create_router,
    auth::Claims,
    config::{AdminListScope, AppConfig, Env},
    models::{Contact, Role, User, WriteResult},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;
use uuid::Uuid;

const TEST_JWT_SECRET: &str = "api-test-secret";

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

fn account(email: &str, role: Role) -> User {
    User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        role,
        ..Default::default()
    }
}

fn token_for(email: &str) -> String {
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: email.to_string(),
        iat: now,
        exp: now + 3600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

async fn spawn_app_with(config: AppConfig) -> TestApp {
    let repo = InMemoryRepository::with_users(vec![
        account("a@x.com", Role::User),
        account("b@x.com", Role::User),
        account("root@x.com", Role::Admin),
    ]);
    let router = create_router(AppState::new(Arc::new(repo), config));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp {
        address,
        client: reqwest::Client::new(),
    }
}

async fn spawn_app() -> TestApp {
    spawn_app_with(AppConfig {
        env: Env::Production,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::default()
    })
    .await
}

async fn create_as(app: &TestApp, email: &str, body: Value) -> Contact {
    let response = app
        .client
        .post(app.url("/contacts"))
        .bearer_auth(token_for(email))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    response.json().await.unwrap()
}

// --- Tests ---

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;

    let response = app.client.get(app.url("/health")).send().await.unwrap();

    assert!(response.status().is_success());
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_contacts_require_authentication() {
    let app = spawn_app().await;

    let response = app.client.get(app.url("/contacts")).send().await.unwrap();

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_create_contact_scenario() {
    let app = spawn_app().await;

    let contact = create_as(
        &app,
        "a@x.com",
        json!({ "name": "Ana", "phone": "555-1", "userEmail": "mallory@x.com" }),
    )
    .await;

    assert_eq!(contact.name, "Ana");
    assert_eq!(contact.phone, "555-1");
    assert_eq!(contact.user_email, "a@x.com");
    assert!(!contact.is_favorite);
    assert_eq!(contact.deleted_at, None);
}

#[tokio::test]
async fn test_create_contact_with_missing_phone_is_rejected() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/contacts"))
        .bearer_auth(token_for("a@x.com"))
        .json(&json!({ "name": "Ana", "phone": " " }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_create_contact_with_absent_phone_is_validation_error() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/contacts"))
        .bearer_auth(token_for("a@x.com"))
        .json(&json!({ "name": "Ana" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("phone"));
}

#[tokio::test]
async fn test_foreign_update_is_unauthorized() {
    let app = spawn_app().await;
    let contact = create_as(&app, "a@x.com", json!({ "name": "Ana", "phone": "555-1" })).await;

    let response = app
        .client
        .patch(app.url(&format!("/contacts/{}", contact.id)))
        .bearer_auth(token_for("b@x.com"))
        .json(&json!({ "name": "Ana B" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let unchanged: Contact = app
        .client
        .get(app.url(&format!("/contacts/{}", contact.id)))
        .bearer_auth(token_for("a@x.com"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(unchanged.name, "Ana");
}

#[tokio::test]
async fn test_admin_reads_any_contact() {
    let app = spawn_app().await;
    let contact = create_as(&app, "a@x.com", json!({ "name": "Ana", "phone": "555-1" })).await;

    let response = app
        .client
        .get(app.url(&format!("/contacts/{}", contact.id)))
        .bearer_auth(token_for("root@x.com"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let fetched: Contact = response.json().await.unwrap();
    assert_eq!(fetched, contact);
}

#[tokio::test]
async fn test_remove_then_get_is_not_found() {
    let app = spawn_app().await;
    let contact = create_as(&app, "a@x.com", json!({ "name": "Ana", "phone": "555-1" })).await;
    let path = app.url(&format!("/contacts/{}", contact.id));

    let deleted: WriteResult = app
        .client
        .delete(&path)
        .bearer_auth(token_for("a@x.com"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(deleted.affected, 1);

    let response = app
        .client
        .get(&path)
        .bearer_auth(token_for("a@x.com"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Contact not found");
}

#[tokio::test]
async fn test_list_contacts_per_owner() {
    let app = spawn_app().await;
    create_as(&app, "a@x.com", json!({ "name": "Ana", "phone": "1" })).await;
    create_as(&app, "b@x.com", json!({ "name": "Bea", "phone": "2" })).await;

    let listed: Vec<Contact> = app
        .client
        .get(app.url("/contacts"))
        .bearer_auth(token_for("b@x.com"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Bea");

    // Admins see only their own contacts under the default scope.
    let admin_view: Vec<Contact> = app
        .client
        .get(app.url("/contacts"))
        .bearer_auth(token_for("root@x.com"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(admin_view.is_empty());
}

#[tokio::test]
async fn test_admin_list_scope_all() {
    let app = spawn_app_with(AppConfig {
        env: Env::Production,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        admin_list_scope: AdminListScope::All,
        ..AppConfig::default()
    })
    .await;
    create_as(&app, "a@x.com", json!({ "name": "Ana", "phone": "1" })).await;
    create_as(&app, "b@x.com", json!({ "name": "Bea", "phone": "2" })).await;

    let admin_view: Vec<Contact> = app
        .client
        .get(app.url("/contacts"))
        .bearer_auth(token_for("root@x.com"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(admin_view.len(), 2);
}

#[tokio::test]
async fn test_me_and_local_bypass() {
    let app = spawn_app_with(AppConfig {
        env: Env::Local,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::default()
    })
    .await;

    let me: Value = app
        .client
        .get(app.url("/me"))
        .header("x-user-email", "root@x.com")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(me["email"], "root@x.com");
    assert_eq!(me["role"], "admin");
}

#[tokio::test]
async fn test_invalid_id_is_rejected() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/contacts/not-a-number"))
        .bearer_auth(token_for("a@x.com"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_openapi_document_lists_contact_routes() {
    let app = spawn_app().await;

    let doc: Value = app
        .client
        .get(app.url("/api-docs/openapi.json"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(doc["paths"]["/contacts"].is_object());
    assert!(doc["paths"]["/contacts/{id}"].is_object());
}
