//! Integration tests for the product catalog and seller writes.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use productstore_integration_tests::{TestContext, message};
use reqwest::StatusCode;
use serde_json::json;

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_create_requires_authentication() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .post(
            "/products",
            &json!({ "name": "Mouse", "description": "Wireless", "price": 9.99 }),
        )
        .await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(message(resp).await, "Authentication required");
    assert!(ctx.products().await.is_empty());
}

#[tokio::test]
async fn test_create_then_read_back() {
    let ctx = TestContext::new().await;
    let user = ctx.signed_in("Seller", "seller@example.com").await;

    let resp = ctx
        .post(
            "/products",
            &json!({ "name": "Mouse", "description": "Wireless", "price": 9.99 }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: serde_json::Value = resp.json().await.unwrap();

    assert_eq!(created["name"], "Mouse");
    assert_eq!(created["price"], 9.99);
    assert_eq!(created["image"], "/images/placeholder.svg");
    assert_eq!(created["ownerId"], user["id"]);

    let id = created["id"].as_str().unwrap();
    let resp = ctx.get(&format!("/products/{id}")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_create_rejects_bad_price() {
    let ctx = TestContext::new().await;
    ctx.signed_in("Seller", "seller@example.com").await;

    for price in [json!(-5), json!("abc"), json!(1e12), json!(1.23456)] {
        let resp = ctx
            .post(
                "/products",
                &json!({ "name": "Mouse", "description": "Wireless", "price": price }),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "price {price}");
        assert_eq!(message(resp).await, "Price must be a non-negative number");
    }

    assert!(ctx.products().await.is_empty());
}

#[tokio::test]
async fn test_create_requires_all_fields() {
    let ctx = TestContext::new().await;
    ctx.signed_in("Seller", "seller@example.com").await;

    let resp = ctx
        .post("/products", &json!({ "name": "Mouse", "price": 9.99 }))
        .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        message(resp).await,
        "Name, description, and price are required"
    );
}

#[tokio::test]
async fn test_create_allows_zero_price_and_custom_image() {
    let ctx = TestContext::new().await;
    ctx.signed_in("Seller", "seller@example.com").await;

    let resp = ctx
        .post(
            "/products",
            &json!({
                "name": "Sticker",
                "description": "Free with any order",
                "price": 0,
                "image": "/images/sticker.png",
            }),
        )
        .await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(created["price"], 0.0);
    assert_eq!(created["image"], "/images/sticker.png");
}

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn test_list_is_newest_first_with_owner() {
    let ctx = TestContext::new().await;
    ctx.signed_in("Seller", "seller@example.com").await;

    for name in ["A", "B", "C"] {
        ctx.create_product(name, 1.0).await;
    }

    let products = ctx.products().await;
    let names: Vec<&str> = products
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["C", "B", "A"]);

    for product in &products {
        assert_eq!(product["owner"]["name"], "Seller");
        assert_eq!(product["owner"]["email"], "seller@example.com");
        assert!(product["owner"].get("password").is_none());
    }
}

#[tokio::test]
async fn test_dashboard_lists_only_own_products() {
    let alice = TestContext::new().await;
    let bob = alice.other_client();
    alice.signed_in("Alice", "alice@example.com").await;
    bob.signed_in("Bob", "bob@example.com").await;

    alice.create_product("Lamp", 20.0).await;
    bob.create_product("Desk", 150.0).await;
    alice.create_product("Chair", 80.0).await;

    let resp = alice.get("/dashboard/products").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let products: Vec<serde_json::Value> = resp.json().await.unwrap();
    let names: Vec<&str> = products
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Chair", "Lamp"]);

    assert_eq!(alice.products().await.len(), 3);
}

#[tokio::test]
async fn test_dashboard_requires_authentication() {
    let ctx = TestContext::new().await;

    let resp = ctx.get("/dashboard/products").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Ownership
// =============================================================================

#[tokio::test]
async fn test_non_owner_cannot_update_or_delete() {
    let alice = TestContext::new().await;
    let bob = alice.other_client();
    alice.signed_in("Alice", "alice@example.com").await;
    bob.signed_in("Bob", "bob@example.com").await;

    let product = alice.create_product("Lamp", 20.0).await;
    let path = format!("/products/{}", product["id"].as_str().unwrap());

    let resp = bob
        .put(
            &path,
            &json!({ "name": "Stolen", "description": "Mine now", "price": 1 }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(message(resp).await, "You can only update your own products");

    let resp = bob.delete(&path).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(message(resp).await, "You can only delete your own products");

    let unchanged: serde_json::Value = alice.get(&path).await.json().await.unwrap();
    assert_eq!(unchanged, product);
}

#[tokio::test]
async fn test_anonymous_update_is_unauthorized() {
    let seller = TestContext::new().await;
    let anonymous = seller.other_client();
    seller.signed_in("Seller", "seller@example.com").await;

    let product = seller.create_product("Lamp", 20.0).await;
    let path = format!("/products/{}", product["id"].as_str().unwrap());

    let resp = anonymous
        .put(
            &path,
            &json!({ "name": "Lamp", "description": "d", "price": 1 }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = anonymous.delete(&path).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_owner_can_update() {
    let ctx = TestContext::new().await;
    ctx.signed_in("Seller", "seller@example.com").await;

    let product = ctx.create_product("Lamp", 20.0).await;
    let path = format!("/products/{}", product["id"].as_str().unwrap());

    let resp = ctx
        .put(
            &path,
            &json!({ "name": "Desk Lamp", "description": "Brighter", "price": 25.5 }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: serde_json::Value = resp.json().await.unwrap();

    assert_eq!(updated["id"], product["id"]);
    assert_eq!(updated["name"], "Desk Lamp");
    assert_eq!(updated["price"], 25.5);
    assert_eq!(updated["ownerId"], product["ownerId"]);
    assert_eq!(updated["createdAt"], product["createdAt"]);
}

#[tokio::test]
async fn test_owner_update_validates_body() {
    let ctx = TestContext::new().await;
    ctx.signed_in("Seller", "seller@example.com").await;

    let product = ctx.create_product("Lamp", 20.0).await;
    let path = format!("/products/{}", product["id"].as_str().unwrap());

    let resp = ctx
        .put(
            &path,
            &json!({ "name": "Lamp", "description": "d", "price": -1 }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let unchanged: serde_json::Value = ctx.get(&path).await.json().await.unwrap();
    assert_eq!(unchanged["price"], 20.0);
}

#[tokio::test]
async fn test_owner_can_delete() {
    let ctx = TestContext::new().await;
    ctx.signed_in("Seller", "seller@example.com").await;

    let product = ctx.create_product("Lamp", 20.0).await;
    let path = format!("/products/{}", product["id"].as_str().unwrap());

    let resp = ctx.delete(&path).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(message(resp).await, "Product deleted successfully");

    assert_eq!(ctx.get(&path).await.status(), StatusCode::NOT_FOUND);
    assert!(ctx.products().await.is_empty());
}

// =============================================================================
// Missing products
// =============================================================================

#[tokio::test]
async fn test_unknown_or_malformed_id_is_not_found() {
    let ctx = TestContext::new().await;
    let unknown = "/products/00000000-0000-4000-8000-000000000000";
    let body = json!({ "name": "x", "description": "y", "price": 1 });

    // Existence is checked before authentication, so every method and
    // sign-in state gets the same answer.
    for signed_in in [false, true] {
        if signed_in {
            ctx.signed_in("Seller", "seller@example.com").await;
        }

        for path in [unknown, "/products/not-an-id"] {
            let resp = ctx.get(path).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "GET {path} {signed_in}");
            assert_eq!(message(resp).await, "Product not found");

            let resp = ctx.put(path, &body).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "PUT {path} {signed_in}");
            assert_eq!(message(resp).await, "Product not found");

            let resp = ctx.delete(path).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "DELETE {path} {signed_in}");
            assert_eq!(message(resp).await, "Product not found");
        }
    }
}
