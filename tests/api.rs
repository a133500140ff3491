use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::sync::watch;
use tower::ServiceExt;
use trips::{
    db::{connect, init_pool, StoreStatus},
    models::trip::{Trip, TripStatus},
    routes::{create_router, public::WELCOME_MESSAGE},
    state::AppState,
};

struct TestApp {
    router: Router,
    _root: TempDir,
}

impl TestApp {
    async fn new() -> Self {
        Self::with_status(StoreStatus::Connected).await
    }

    async fn with_status(status: StoreStatus) -> Self {
        let root = TempDir::new().expect("temp dir");
        let database_url = format!("sqlite://{}", root.path().join("api.sqlite").display());
        let db = init_pool(&database_url).expect("pool");
        connect(&db).await.expect("connect");

        let (_tx, rx) = watch::channel(status);
        let router = create_router(AppState::new(db, rx));
        Self {
            router,
            _root: root,
        }
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");
        self.send_raw(request).await
    }

    async fn send_raw(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let value = serde_json::from_slice(&bytes).expect("json body");
        (status, value)
    }

    async fn create(&self, body: Value) -> Trip {
        let (status, value) = self.send(Method::POST, "/api/trips", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {value}");
        serde_json::from_value(value).expect("trip")
    }

    async fn list(&self) -> Vec<Trip> {
        let (status, value) = self.send(Method::GET, "/api/trips", None).await;
        assert_eq!(status, StatusCode::OK);
        serde_json::from_value(value).expect("trips")
    }
}

fn minimal_trip() -> Value {
    json!({
        "date": "2024-03-01",
        "vehicleNo": "MH12AB1234",
        "luggageCompany": "Blue Dart",
        "from": "Pune",
        "to": "Nagpur",
    })
}

#[tokio::test]
async fn root_returns_welcome_message() {
    let app = TestApp::new().await;
    let (status, body) = app.send(Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": WELCOME_MESSAGE }));
}

#[tokio::test]
async fn create_with_required_fields_only_fills_defaults() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send(Method::POST, "/api/trips", Some(minimal_trip()))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    for field in [
        "advance",
        "advanceSal",
        "advanceTags",
        "advanceFuel",
        "distance",
        "tripDays",
        "costToCustomer",
        "penalty",
        "transporterAdvance",
        "transporterRemaining",
        "bonus",
    ] {
        assert_eq!(body[field].as_f64(), Some(0.0), "{field}");
    }
    for (cost, comment) in [
        ("servicingCost", "servicingComment"),
        ("tyreCost", "tyreComment"),
        ("roadMaintenance", "roadMaintenanceComment"),
        ("roadRTO", "roadRTOComment"),
        ("fixedRTO", "fixedRTOComment"),
    ] {
        assert_eq!(body["maintenance"][cost].as_f64(), Some(0.0), "{cost}");
        assert_eq!(body["maintenance"][comment], "", "{comment}");
    }
    for (amount, comment) in [
        ("driverAccount", "driverAccountComment"),
        ("fuel", "fuelComment"),
        ("tags", "tagsComment"),
    ] {
        assert_eq!(body["driver"][amount].as_f64(), Some(0.0), "{amount}");
        assert_eq!(body["driver"][comment], "", "{comment}");
    }
    assert_eq!(body["status"], "not_delivered");
    assert_eq!(body["createdAt"], body["updatedAt"]);
    assert!(body["id"].as_str().is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn create_missing_required_field_persists_nothing() {
    let app = TestApp::new().await;
    for field in ["date", "vehicleNo", "luggageCompany", "from", "to"] {
        let mut body = minimal_trip();
        body.as_object_mut().unwrap().remove(field);
        let (status, error) = app.send(Method::POST, "/api/trips", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let message = error["error"].as_str().expect("error message");
        assert!(message.contains(field), "{message}");
    }
    assert!(app.list().await.is_empty());
}

#[tokio::test]
async fn create_rejects_unknown_status() {
    let app = TestApp::new().await;
    let mut body = minimal_trip();
    body["status"] = json!("in_transit");
    let (status, error) = app.send(Method::POST, "/api/trips", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["error"].as_str().unwrap().contains("in_transit"));
    assert!(app.list().await.is_empty());
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/trips")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{\"date\": "))
        .unwrap();
    let (status, body) = app.send_raw(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn list_returns_every_created_trip() {
    let app = TestApp::new().await;
    assert!(app.list().await.is_empty());

    let mut created = Vec::new();
    for (idx, to) in ["Nagpur", "Nashik", "Goa"].into_iter().enumerate() {
        let mut body = minimal_trip();
        body["to"] = json!(to);
        body["distance"] = json!(100 * (idx + 1));
        body["status"] = json!("delivered");
        created.push(app.create(body).await);
    }

    let listed = app.list().await;
    assert_eq!(listed.len(), created.len());
    for trip in &created {
        let found = listed
            .iter()
            .find(|t| t.id == trip.id)
            .expect("created trip listed");
        assert_eq!(found, trip);
        assert_eq!(found.status, TripStatus::Delivered);
    }
}

#[tokio::test]
async fn update_unknown_id_is_not_found() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send(
            Method::PUT,
            "/api/trips/2f6b3f3e-0000-4000-8000-000000000000",
            Some(json!({ "distance": 120 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "message": "User not found" }));
    assert!(app.list().await.is_empty());
}

#[tokio::test]
async fn partial_update_changes_only_supplied_fields() {
    let app = TestApp::new().await;
    let mut body = minimal_trip();
    body["status"] = json!("late_unload");
    body["driver"] = json!({ "fuel": 2200, "fuelComment": "Full tank" });
    let created = app.create(body).await;

    let (status, value) = app
        .send(
            Method::PUT,
            &format!("/api/trips/{}", created.id),
            Some(json!({ "distance": 120 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let updated: Trip = serde_json::from_value(value).unwrap();

    assert_eq!(updated.distance, 120.0);
    assert!(updated.updated_at > created.updated_at);
    assert_eq!(
        Trip {
            distance: created.distance,
            updated_at: created.updated_at,
            ..updated.clone()
        },
        created
    );

    let listed = app.list().await;
    assert_eq!(listed, vec![updated]);
}

#[tokio::test]
async fn invalid_update_leaves_record_unchanged() {
    let app = TestApp::new().await;
    let created = app.create(minimal_trip()).await;

    let (status, error) = app
        .send(
            Method::PUT,
            &format!("/api/trips/{}", created.id),
            Some(json!({ "status": "lost", "distance": 50 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["error"].as_str().unwrap().contains("status"));

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/trips/{}", created.id),
            Some(json!({ "date": "" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(app.list().await, vec![created]);
}

#[tokio::test]
async fn health_reflects_store_status() {
    let app = TestApp::new().await;
    let (status, body) = app.send(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "store": "connected" }));

    let app = TestApp::with_status(StoreStatus::Failed {
        error: "unable to open database file".into(),
    })
    .await;
    let (status, body) = app.send(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["store"], "failed");
    assert_eq!(body["error"], "unable to open database file");
}

#[tokio::test]
async fn wrong_content_type_is_a_bad_request() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/trips")
        .header(CONTENT_TYPE, "text/plain")
        .body(Body::from(minimal_trip().to_string()))
        .unwrap();
    let (status, body) = app.send_raw(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert!(app.list().await.is_empty());
}

#[tokio::test]
async fn null_maintenance_is_rejected() {
    let app = TestApp::new().await;
    let mut body = minimal_trip();
    body["maintenance"] = Value::Null;
    let (status, error) = app.send(Method::POST, "/api/trips", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["error"].as_str().unwrap().contains("maintenance"));
    assert!(app.list().await.is_empty());
}

#[tokio::test]
async fn connecting_store_reports_unavailable_and_refuses_trips() {
    let app = TestApp::with_status(StoreStatus::Connecting).await;
    let (status, body) = app.send(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({ "store": "connecting" }));

    let (status, body) = app
        .send(Method::POST, "/api/trips", Some(minimal_trip()))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "store is still connecting" }));

    let (status, body) = app.send(Method::GET, "/api/trips", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}
