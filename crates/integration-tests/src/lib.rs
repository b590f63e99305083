//! Integration tests for ProductStore.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p productstore-integration-tests
//! ```
//!
//! Each test starts its own storefront on an ephemeral port, backed by an
//! in-memory document store, and talks to it over HTTP.
//!
//! # Test Categories
//!
//! - `products` - Catalog reads, seller writes and ownership checks
//! - `auth` - Registration, login, logout and sessions
//! - `postgres_store` - The `PostgreSQL` store against a live database
//!   (ignored by default, run with `-- --ignored`)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use productstore_storefront::config::{PasswordHashingConfig, StorefrontConfig};
use productstore_storefront::db::MemoryStore;
use productstore_storefront::routes;
use productstore_storefront::state::AppState;
use reqwest::{Client, Response, StatusCode};
use serde_json::{Value, json};

/// Password used by [`TestContext::signed_in`] users.
pub const PASSWORD: &str = "demo123";

/// A running storefront and a cookie-aware client pointed at it.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl TestContext {
    /// Start a storefront on a random local port.
    ///
    /// # Panics
    ///
    /// Panics if the server cannot be started.
    pub async fn new() -> Self {
        let config = StorefrontConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            // Minimum Argon2 cost keeps the suite fast
            password_hashing: PasswordHashingConfig {
                memory_kib: 8,
                iterations: 1,
                parallelism: 1,
            },
            ..StorefrontConfig::default()
        };
        let state = AppState::new(config, Arc::new(MemoryStore::new()))
            .expect("test config is valid");

        let listener = tokio::net::TcpListener::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("listener has an address");

        tokio::spawn(async move {
            axum::serve(listener, routes::app(state))
                .await
                .expect("storefront server");
        });

        Self {
            client: Self::new_client(),
            base_url: format!("http://{addr}"),
        }
    }

    /// A second client with its own cookie jar, sharing the same server.
    #[must_use]
    pub fn other_client(&self) -> Self {
        Self {
            client: Self::new_client(),
            base_url: self.base_url.clone(),
        }
    }

    fn new_client() -> Client {
        Client::builder()
            .cookie_store(true)
            .build()
            .expect("build reqwest client")
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("send GET")
    }

    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn post(&self, path: &str, body: &Value) -> Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("send POST")
    }

    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn put(&self, path: &str, body: &Value) -> Response {
        self.client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .expect("send PUT")
    }

    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn delete(&self, path: &str) -> Response {
        self.client
            .delete(self.url(path))
            .send()
            .await
            .expect("send DELETE")
    }

    /// Register a user with [`PASSWORD`].
    ///
    /// # Panics
    ///
    /// Panics if registration does not return 201.
    pub async fn register(&self, name: &str, email: &str) -> Value {
        let resp = self
            .post(
                "/register",
                &json!({ "name": name, "email": email, "password": PASSWORD }),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED, "register {email}");
        resp.json().await.expect("register body")
    }

    /// # Panics
    ///
    /// Panics if login does not return 200.
    pub async fn login(&self, email: &str) -> Value {
        let resp = self
            .post("/login", &json!({ "email": email, "password": PASSWORD }))
            .await;
        assert_eq!(resp.status(), StatusCode::OK, "login {email}");
        resp.json().await.expect("login body")
    }

    /// Register and sign in, returning the user profile.
    pub async fn signed_in(&self, name: &str, email: &str) -> Value {
        self.register(name, email).await;
        self.login(email).await
    }

    /// Create a product as the signed-in user.
    ///
    /// # Panics
    ///
    /// Panics if creation does not return 201.
    pub async fn create_product(&self, name: &str, price: f64) -> Value {
        let resp = self
            .post(
                "/products",
                &json!({
                    "name": name,
                    "description": format!("{name} description"),
                    "price": price,
                }),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED, "create {name}");
        resp.json().await.expect("product body")
    }

    /// All products from the public listing.
    ///
    /// # Panics
    ///
    /// Panics if the listing fails.
    pub async fn products(&self) -> Vec<Value> {
        let resp = self.get("/products").await;
        assert_eq!(resp.status(), StatusCode::OK);
        resp.json().await.expect("products body")
    }
}

/// Read the `message` field of an error or status body.
///
/// # Panics
///
/// Panics if the body is not JSON.
pub async fn message(resp: Response) -> String {
    let body: Value = resp.json().await.expect("json body");
    body["message"].as_str().unwrap_or_default().to_string()
}
