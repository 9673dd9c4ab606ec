//! Integration tests for the API server.

use std::sync::OnceLock;

use api::{AppState, Stores};
use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use common::{Identity, Money};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use store::{InMemoryCatalogStore, InMemoryEventStore, ProductDraft};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

async fn setup() -> Router {
    let mut retired = ProductDraft::new("Retired Leash", Money::from_major(100));
    retired.is_active = false;
    let catalog = InMemoryCatalogStore::seeded([
        ProductDraft::new("Premium Cat Food Mix", Money::from_major(890)),
        ProductDraft::new("Interactive Dog Toy Set", Money::from_major(450)),
        retired,
    ])
    .await
    .unwrap();

    let state = AppState::new(
        InMemoryEventStore::new(),
        Stores::in_memory(catalog),
        Money::from_major(50),
    );
    api::create_app(state, get_metrics_handle(), "/api/login")
}

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

impl Reply {
    fn invalidates(&self) -> Option<&str> {
        self.headers
            .get(api::routes::INVALIDATE_HEADER)
            .and_then(|v| v.to_str().ok())
    }
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    caller: Option<&Identity>,
    body: Option<Value>,
) -> Reply {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(identity) = caller {
        builder = builder
            .header(api::identity::USER_ID_HEADER, identity.user_id.to_string())
            .header(api::identity::ADMIN_HEADER, identity.is_admin.to_string());
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    Reply {
        status,
        headers,
        body,
    }
}

fn alice() -> Identity {
    Identity::customer("alice")
}

fn admin() -> Identity {
    Identity::admin("root")
}

async fn add_to_cart(app: &Router, who: &Identity, product_id: i64, quantity: i64) -> Reply {
    send(
        app,
        Method::POST,
        "/api/cart",
        Some(who),
        Some(json!({ "productId": product_id, "quantity": quantity })),
    )
    .await
}

async fn checkout(app: &Router, who: &Identity) -> Reply {
    send(
        app,
        Method::POST,
        "/api/orders",
        Some(who),
        Some(json!({ "shippingAddress": "House 12, Road 5", "phoneNumber": "01700000000" })),
    )
    .await
}

#[tokio::test]
async fn test_health_check() {
    let app = setup().await;
    let reply = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["status"], "ok");
}

#[tokio::test]
async fn test_missing_identity_points_to_login() {
    let app = setup().await;
    let reply = send(&app, Method::GET, "/api/cart", None, None).await;

    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body["kind"], "unauthorized");
    assert_eq!(reply.body["recovery"], "reauthenticate");
    assert_eq!(reply.body["loginUrl"], "/api/login");
}

#[tokio::test]
async fn test_cart_add_increments_and_invalidates_cart() {
    let app = setup().await;

    let first = add_to_cart(&app, &alice(), 1, 1).await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(first.invalidates(), Some("/api/cart"));

    let second = add_to_cart(&app, &alice(), 1, 2).await;
    assert_eq!(second.body["id"], first.body["id"]);

    let cart = send(&app, Method::GET, "/api/cart", Some(&alice()), None).await;
    assert_eq!(cart.status, StatusCode::OK);
    let items = cart.body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 3);
    assert_eq!(items[0]["product"]["name"], "Premium Cat Food Mix");
    assert_eq!(cart.body["subtotal"], "2670");
    assert_eq!(cart.body["itemCount"], 3);
}

#[tokio::test]
async fn test_out_of_range_quantity_leaves_line_unchanged() {
    let app = setup().await;
    let line = add_to_cart(&app, &alice(), 2, 4).await;
    let line_id = line.body["id"].as_i64().unwrap();

    for quantity in [0, 100] {
        let reply = send(
            &app,
            Method::PUT,
            &format!("/api/cart/{line_id}"),
            Some(&alice()),
            Some(json!({ "quantity": quantity })),
        )
        .await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.body["kind"], "validation");
        assert_eq!(reply.body["recovery"], "correct_input");
        assert!(reply.invalidates().is_none());
    }

    let cart = send(&app, Method::GET, "/api/cart", Some(&alice()), None).await;
    assert_eq!(cart.body["items"][0]["quantity"], 4);
}

#[tokio::test]
async fn test_malformed_input_uses_the_error_body() {
    let app = setup().await;
    let line = add_to_cart(&app, &alice(), 2, 4).await;
    let line_id = line.body["id"].as_i64().unwrap();

    let cases = [
        (
            Method::PUT,
            format!("/api/cart/{line_id}"),
            Some(json!({ "quantity": 10_000_000_000_000_000_000u64 })),
        ),
        (Method::DELETE, "/api/cart/abc".to_string(), None),
        (
            Method::POST,
            "/api/cart".to_string(),
            Some(json!({ "productId": "x" })),
        ),
        (Method::GET, "/api/products?featured=maybe".to_string(), None),
    ];
    for (method, uri, body) in cases {
        let reply = send(&app, method, &uri, Some(&alice()), body).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(reply.body["kind"], "validation", "{uri}");
        assert_eq!(reply.body["recovery"], "correct_input", "{uri}");
        assert!(reply.body["error"].is_string(), "{uri}");
    }

    let cart = send(&app, Method::GET, "/api/cart", Some(&alice()), None).await;
    assert_eq!(cart.body["items"][0]["quantity"], 4);
}

#[tokio::test]
async fn test_inactive_product_cannot_be_added() {
    let app = setup().await;
    let reply = add_to_cart(&app, &alice(), 3, 1).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let missing = add_to_cart(&app, &alice(), 99, 1).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_removing_another_users_line_is_not_found() {
    let app = setup().await;
    let line = add_to_cart(&app, &alice(), 1, 1).await;
    let line_id = line.body["id"].as_i64().unwrap();

    let bob = Identity::customer("bob");
    let reply = send(
        &app,
        Method::DELETE,
        &format!("/api/cart/{line_id}"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let cart = send(&app, Method::GET, "/api/cart", Some(&alice()), None).await;
    assert_eq!(cart.body["items"].as_array().unwrap().len(), 1);

    let own = send(
        &app,
        Method::DELETE,
        &format!("/api/cart/{line_id}"),
        Some(&alice()),
        None,
    )
    .await;
    assert_eq!(own.status, StatusCode::NO_CONTENT);
    assert_eq!(own.invalidates(), Some("/api/cart"));
}

#[tokio::test]
async fn test_checkout_totals_and_clears_cart() {
    let app = setup().await;
    add_to_cart(&app, &alice(), 1, 2).await;
    add_to_cart(&app, &alice(), 2, 1).await;

    let order = checkout(&app, &alice()).await;
    assert_eq!(order.status, StatusCode::CREATED);
    assert_eq!(order.invalidates(), Some("/api/cart,/api/orders"));
    assert_eq!(order.body["totalAmount"], "2280");
    assert_eq!(order.body["shippingFee"], "50");
    assert_eq!(order.body["status"], "pending");
    assert_eq!(order.body["paymentMethod"], "cash_on_delivery");
    assert_eq!(order.body["lines"].as_array().unwrap().len(), 2);

    let cart = send(&app, Method::GET, "/api/cart", Some(&alice()), None).await;
    assert!(cart.body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_cart_checkout_is_rejected() {
    let app = setup().await;
    let reply = checkout(&app, &alice()).await;

    assert_eq!(reply.status, StatusCode::CONFLICT);
    assert_eq!(reply.body["kind"], "empty_cart");
    assert_eq!(reply.body["recovery"], "return_to_catalog");

    let orders = send(&app, Method::GET, "/api/orders", Some(&alice()), None).await;
    assert!(orders.body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_checkout_requires_shipping_details() {
    let app = setup().await;
    add_to_cart(&app, &alice(), 1, 1).await;

    let reply = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(&alice()),
        Some(json!({ "shippingAddress": "  ", "phoneNumber": "01700000000" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["error"], "shippingAddress is required");
}

#[tokio::test]
async fn test_status_changes_are_admin_only() {
    let app = setup().await;
    add_to_cart(&app, &alice(), 1, 1).await;
    let order = checkout(&app, &alice()).await;
    let order_id = order.body["id"].as_str().unwrap().to_string();
    let uri = format!("/api/orders/{order_id}/status");

    let denied = send(
        &app,
        Method::PUT,
        &uri,
        Some(&alice()),
        Some(json!({ "status": "cancelled" })),
    )
    .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    assert_eq!(denied.body["recovery"], "reauthenticate");
    assert_eq!(denied.body["loginUrl"], "/api/login");

    let cancelled = send(
        &app,
        Method::PUT,
        &uri,
        Some(&admin()),
        Some(json!({ "status": "cancelled" })),
    )
    .await;
    assert_eq!(cancelled.status, StatusCode::OK);
    assert_eq!(cancelled.invalidates(), Some("/api/orders"));
    assert_eq!(cancelled.body["status"], "cancelled");
    assert_eq!(cancelled.body["history"][0]["changedBy"], "root");

    let reopened = send(
        &app,
        Method::PUT,
        &uri,
        Some(&admin()),
        Some(json!({ "status": "pending" })),
    )
    .await;
    assert_eq!(reopened.status, StatusCode::BAD_REQUEST);

    let unknown = send(
        &app,
        Method::PUT,
        &uri,
        Some(&admin()),
        Some(json!({ "status": "lost" })),
    )
    .await;
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_order_visibility() {
    let app = setup().await;
    let bob = Identity::customer("bob");
    add_to_cart(&app, &alice(), 1, 1).await;
    let alice_order = checkout(&app, &alice()).await;
    add_to_cart(&app, &bob, 2, 1).await;
    checkout(&app, &bob).await;

    let mine = send(&app, Method::GET, "/api/orders", Some(&alice()), None).await;
    let mine = mine.body.as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["orderId"], alice_order.body["id"]);
    assert_eq!(mine[0]["trackingSteps"][0]["active"], true);

    let all = send(&app, Method::GET, "/api/orders", Some(&admin()), None).await;
    assert_eq!(all.body.as_array().unwrap().len(), 2);

    let uri = format!("/api/orders/{}", alice_order.body["id"].as_str().unwrap());
    let hidden = send(&app, Method::GET, &uri, Some(&bob), None).await;
    assert_eq!(hidden.status, StatusCode::NOT_FOUND);
    let own = send(&app, Method::GET, &uri, Some(&alice()), None).await;
    assert_eq!(own.status, StatusCode::OK);

    let bad = send(&app, Method::GET, "/api/orders/not-a-uuid", Some(&alice()), None).await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_order_list_filters_by_status() {
    let app = setup().await;
    let bob = Identity::customer("bob");
    add_to_cart(&app, &alice(), 1, 1).await;
    let alice_order = checkout(&app, &alice()).await;
    add_to_cart(&app, &bob, 2, 1).await;
    checkout(&app, &bob).await;

    let uri = format!("/api/orders/{}/status", alice_order.body["id"].as_str().unwrap());
    send(
        &app,
        Method::PUT,
        &uri,
        Some(&admin()),
        Some(json!({ "status": "shipped" })),
    )
    .await;

    let shipped = send(&app, Method::GET, "/api/orders?status=shipped", Some(&admin()), None).await;
    let shipped = shipped.body.as_array().unwrap();
    assert_eq!(shipped.len(), 1);
    assert_eq!(shipped[0]["orderId"], alice_order.body["id"]);

    let own_shipped = send(&app, Method::GET, "/api/orders?status=shipped", Some(&bob), None).await;
    assert!(own_shipped.body.as_array().unwrap().is_empty());
    let own_pending = send(&app, Method::GET, "/api/orders?status=pending", Some(&bob), None).await;
    assert_eq!(own_pending.body.as_array().unwrap().len(), 1);

    let bogus = send(&app, Method::GET, "/api/orders?status=lost", Some(&admin()), None).await;
    assert_eq!(bogus.status, StatusCode::BAD_REQUEST);
    assert_eq!(bogus.body["kind"], "validation");
}

#[tokio::test]
async fn test_wishlist_round_trip() {
    let app = setup().await;
    let added = send(
        &app,
        Method::POST,
        "/api/wishlist",
        Some(&alice()),
        Some(json!({ "productId": 2 })),
    )
    .await;
    assert_eq!(added.status, StatusCode::CREATED);
    assert_eq!(added.invalidates(), Some("/api/wishlist"));

    let list = send(&app, Method::GET, "/api/wishlist", Some(&alice()), None).await;
    assert_eq!(list.body[0]["product"]["name"], "Interactive Dog Toy Set");

    let removed = send(&app, Method::DELETE, "/api/wishlist/2", Some(&alice()), None).await;
    assert_eq!(removed.status, StatusCode::NO_CONTENT);
    let again = send(&app, Method::DELETE, "/api/wishlist/2", Some(&alice()), None).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_product_admin_and_dashboard() {
    let app = setup().await;
    let draft = json!({ "name": "Cat Tree Tower", "price": "2500", "originalPrice": "3000" });

    let denied = send(
        &app,
        Method::POST,
        "/api/products",
        Some(&alice()),
        Some(draft.clone()),
    )
    .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let created = send(&app, Method::POST, "/api/products", Some(&admin()), Some(draft)).await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.invalidates(), Some("/api/products"));
    assert_eq!(created.body["badge"], "sale");
    assert_eq!(created.body["discountPercent"], 17);

    let public = send(&app, Method::GET, "/api/products", None, None).await;
    assert_eq!(public.body.as_array().unwrap().len(), 3);
    let everything = send(&app, Method::GET, "/api/admin/products", Some(&admin()), None).await;
    assert_eq!(everything.body.as_array().unwrap().len(), 4);

    add_to_cart(&app, &alice(), 1, 2).await;
    add_to_cart(&app, &alice(), 2, 1).await;
    let order = checkout(&app, &alice()).await;
    let uri = format!("/api/orders/{}/status", order.body["id"].as_str().unwrap());
    send(
        &app,
        Method::PUT,
        &uri,
        Some(&admin()),
        Some(json!({ "status": "delivered" })),
    )
    .await;

    let stats = send(&app, Method::GET, "/api/admin/stats", Some(&admin()), None).await;
    assert_eq!(stats.status, StatusCode::OK);
    assert_eq!(stats.body["totalOrders"], 1);
    assert_eq!(stats.body["pendingOrders"], 0);
    assert_eq!(stats.body["totalRevenue"], "2280");
    assert_eq!(stats.body["activeProducts"], 3);

    let forbidden = send(&app, Method::GET, "/api/admin/stats", Some(&alice()), None).await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_categories_and_category_filter() {
    let app = setup().await;
    for (name, category) in [("Rope Toy", 3), ("Squeaky Ball", 3), ("Cozy Bed", 6)] {
        let draft = json!({ "name": name, "price": "120", "categoryId": category });
        let created = send(&app, Method::POST, "/api/products", Some(&admin()), Some(draft)).await;
        assert_eq!(created.status, StatusCode::CREATED);
    }

    let categories = send(&app, Method::GET, "/api/categories", None, None).await;
    assert_eq!(categories.status, StatusCode::OK);
    assert_eq!(
        categories.body,
        json!([{ "id": 3, "productCount": 2 }, { "id": 6, "productCount": 1 }])
    );

    let toys = send(&app, Method::GET, "/api/products?category=3", None, None).await;
    let names: Vec<&str> = toys
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Rope Toy", "Squeaky Ball"]);
}

#[tokio::test]
async fn test_oversized_price_is_rejected() {
    let app = setup().await;
    let draft = json!({ "name": "Gold Leash", "price": "79228162514264337593543950335" });
    let reply = send(&app, Method::POST, "/api/products", Some(&admin()), Some(draft)).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["kind"], "validation");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup().await;
    add_to_cart(&app, &alice(), 1, 1).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
