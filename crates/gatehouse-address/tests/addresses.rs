//! Address resource through the full pipeline.

use std::sync::Arc;

use gatehouse_address::{address_routes, Address, InMemoryAddressStore};
use gatehouse_core::Role;
use gatehouse_middleware::Pipeline;
use gatehouse_test::{TestClient, TokenFactory};
use http::StatusCode;
use serde_json::{json, Value};

const KEY: [u8; 32] = [42u8; 32];

struct Harness {
    client: TestClient,
    tokens: TokenFactory,
    store: Arc<InMemoryAddressStore>,
}

fn harness() -> Harness {
    let tokens = TokenFactory::new(&KEY).unwrap();
    let store = Arc::new(InMemoryAddressStore::new());
    let pipeline = Pipeline::builder(tokens.verifier())
        .routes(address_routes(Arc::clone(&store)))
        .build();
    let client = TestClient::new(pipeline)
        .with_bearer_token(tokens.access_for("1", Role::Admin).unwrap());

    Harness {
        client,
        tokens,
        store,
    }
}

fn body(client_id: i64, title: &str) -> Value {
    json!({
        "client_id": client_id,
        "title": title,
        "city": "Lisbon",
        "street": "Rua Augusta 10",
        "phone": "+351 21 000 0000",
        "zip": "1100-048",
        "lat": 38.71,
        "long": -9.14
    })
}

async fn create(h: &Harness, client_id: i64, title: &str) -> Address {
    let response = h.client.post("/addresses").json(&body(client_id, title)).send().await;
    response.assert_status(StatusCode::CREATED);
    response.json().unwrap()
}

#[tokio::test]
async fn test_create_returns_record() {
    let h = harness();
    let response = h.client.post("/addresses").json(&body(5, "Office")).send().await;

    response
        .assert_status(StatusCode::CREATED)
        .assert_json_content_type()
        .assert_json_field("id", &json!(1))
        .assert_json_field("client_id", &json!(5))
        .assert_json_field("title", &json!("Office"));

    let address: Address = response.json().unwrap();
    assert_eq!(address.created_at, address.updated_at);
    assert_eq!(h.store.len(), 1);
}

#[tokio::test]
async fn test_create_undecodable_body() {
    let h = harness();
    h.client
        .post("/addresses")
        .content_type("application/json")
        .body("{not json")
        .send()
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error("invalid request body");
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn test_create_reports_every_violation() {
    let h = harness();
    h.client
        .post("/addresses")
        .json(&json!({"lat": 91.0, "zip": "1234567890123"}))
        .send()
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY)
        .assert_field_errors(&["client_id", "title", "city", "zip", "lat"]);
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn test_get_by_id() {
    let h = harness();
    let created = create(&h, 3, "Home").await;

    let fetched: Address = h
        .client
        .get(format!("/addresses/{}", created.id))
        .send()
        .await
        .assert_status(StatusCode::OK)
        .json()
        .unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_get_missing_and_malformed_id() {
    let h = harness();

    h.client
        .get("/addresses/99")
        .send()
        .await
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error("address not found");

    h.client
        .get("/addresses/abc")
        .send()
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error("invalid id");
}

#[tokio::test]
async fn test_list_requires_client_id() {
    let h = harness();

    for uri in ["/addresses", "/addresses?client_id="] {
        h.client
            .get(uri)
            .send()
            .await
            .assert_status(StatusCode::BAD_REQUEST)
            .assert_error("client_id is required");
    }

    h.client
        .get("/addresses?client_id=seven")
        .send()
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error("invalid client_id");
}

#[tokio::test]
async fn test_list_filters_by_client_in_id_order() {
    let h = harness();
    create(&h, 1, "first").await;
    create(&h, 2, "elsewhere").await;
    create(&h, 1, "second").await;

    let listed: Vec<Address> = h
        .client
        .get("/addresses?client_id=1")
        .send()
        .await
        .assert_status(StatusCode::OK)
        .json()
        .unwrap();
    let titles: Vec<_> = listed.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, ["first", "second"]);

    h.client
        .get("/addresses?client_id=77")
        .send()
        .await
        .assert_status(StatusCode::OK)
        .assert_json_eq(&json!([]));
}

#[tokio::test]
async fn test_update_merges_present_fields() {
    let h = harness();
    let created = create(&h, 4, "Depot").await;

    let updated: Address = h
        .client
        .put(format!("/addresses/{}", created.id))
        .json(&json!({"title": "Main depot", "lat": 10.5}))
        .send()
        .await
        .assert_status(StatusCode::OK)
        .json()
        .unwrap();

    assert_eq!(updated.title, "Main depot");
    assert_eq!(updated.lat, Some(10.5));
    assert_eq!(updated.city, created.city);
    assert_eq!(updated.client_id, created.client_id);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);
}

#[tokio::test]
async fn test_update_validation_and_missing() {
    let h = harness();
    let created = create(&h, 4, "Depot").await;

    h.client
        .put(format!("/addresses/{}", created.id))
        .json(&json!({"title": "  ", "phone": "12"}))
        .send()
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY)
        .assert_field_errors(&["title", "phone"]);

    h.client
        .put("/addresses/500")
        .json(&json!({"title": "Nowhere"}))
        .send()
        .await
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error("address not found");
}

#[tokio::test]
async fn test_delete_then_gone() {
    let h = harness();
    let created = create(&h, 8, "Temporary").await;
    let uri = format!("/addresses/{}", created.id);

    let response = h.client.delete(&uri).send().await;
    response.assert_status(StatusCode::NO_CONTENT);
    assert!(response.body().is_empty());

    h.client
        .delete(&uri)
        .send()
        .await
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error("address not found");
    h.client.get(&uri).send().await.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_viewer_is_forbidden() {
    let h = harness();
    let viewer = h.tokens.access(Role::Viewer).unwrap();

    h.client
        .post("/addresses")
        .bearer_token(&viewer)
        .json(&body(1, "Nope"))
        .send()
        .await
        .assert_status(StatusCode::FORBIDDEN)
        .assert_error("forbidden");
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn test_every_admin_tier_role_is_admitted() {
    let h = harness();
    for role in [Role::Superuser, Role::Owner, Role::Admin, Role::Operator, Role::Driver] {
        h.client
            .get("/addresses?client_id=1")
            .bearer_token(h.tokens.access(role).unwrap())
            .send()
            .await
            .assert_status(StatusCode::OK);
    }
}

#[tokio::test]
async fn test_unauthenticated_requests() {
    let h = harness();
    let anonymous = TestClient::from_shared(Arc::clone(h.client.pipeline()));

    anonymous
        .get("/addresses/1")
        .send()
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .assert_error("unauthorized");

    h.client
        .get("/addresses/1")
        .bearer_token(h.tokens.refresh(Role::Admin).unwrap())
        .send()
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    h.client
        .get("/addresses/1")
        .bearer_token(h.tokens.expired(Role::Admin).unwrap())
        .send()
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}
