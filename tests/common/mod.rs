//! Common test utilities

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, Response},
    Router,
};
use banka::auth::{hash_password, TokenService};
use banka::domain::{AccountType, Balance, Identity, NewAccount, NewUser, Role};
use banka::store::{AccountStore, MemoryStore, UserStore};
use banka::{build_router, AppState};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub const SECRET: &str = "integration-test-secret";
pub const ACCOUNT_NUMBER: i64 = 2039939293;
pub const OPENING_BALANCE: i64 = 1_000_000;
pub const OWNER_ID: i64 = 90;

pub const ADMIN_EMAIL: &str = "admin@banka.com";
pub const ADMIN_PASSWORD: &str = "adminpass";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub tokens: TokenService,
    /// Token for the owner of the seeded account
    pub token: String,
}

impl TestApp {
    pub fn token_for(&self, id: i64, email: &str, role: Role, is_admin: bool) -> String {
        self.tokens
            .issue(&Identity {
                id,
                email: email.to_string(),
                role,
                is_admin,
            })
            .unwrap()
    }

    /// Send a request and return the status code with the decoded JSON body
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (u16, Value) {
        use tower::util::ServiceExt;

        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", token);
        }
        let body = match body {
            Some(json) => Body::from(json.to_string()),
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        read_json(response).await
    }

    /// Send a request with a raw, possibly malformed, body
    pub async fn send_raw(&self, method: &str, uri: &str, token: &str, body: &'static str) -> (u16, Value) {
        use tower::util::ServiceExt;

        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .header("authorization", token)
            .body(Body::from(body))
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        read_json(response).await
    }
}

pub async fn read_json(response: Response<Body>) -> (u16, Value) {
    let status = response.status().as_u16();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Router over a fresh in-memory store holding one active savings account
/// and an admin user.
pub async fn setup_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());

    store
        .create_account(NewAccount {
            account_number: ACCOUNT_NUMBER,
            owner_id: OWNER_ID,
            account_type: AccountType::Savings,
            opening_balance: Balance::new(OPENING_BALANCE).unwrap(),
        })
        .await
        .expect("Failed to seed account");

    store
        .insert_user(NewUser {
            first_name: "Banka".to_string(),
            last_name: "Admin".to_string(),
            email: ADMIN_EMAIL.to_string(),
            password_hash: hash_password(ADMIN_PASSWORD),
            role: Role::Admin,
            is_admin: true,
        })
        .await
        .expect("Failed to seed admin");

    let tokens = TokenService::new(SECRET, chrono::Duration::hours(24));
    let token = tokens
        .issue(&Identity {
            id: OWNER_ID,
            email: "testing@transaction.com".to_string(),
            role: Role::Client,
            is_admin: false,
        })
        .unwrap();

    let router = build_router(AppState::new(store.clone(), tokens.clone()));

    TestApp {
        router,
        store,
        tokens,
        token,
    }
}

/// Connect to the test database and make sure the schema exists.
///
/// Tests share the database and run in parallel, so they use fresh account
/// numbers and emails instead of truncating tables.
pub async fn setup_test_db() -> PgPool {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    banka::db::apply_schema(&pool)
        .await
        .expect("Failed to apply schema");

    pool
}
