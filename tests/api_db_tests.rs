// HTTP-level tests that need a real database: registration, order intake,
// promo checks and the image lifecycle of products and stories.
//
// Skipped unless BOODAI_TEST_DATABASE_URL points at a disposable database.

use std::sync::{Arc, Mutex};

use axum::body::{Body, Bytes};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use boodai::api;
use boodai::auth::TokenIssuer;
use boodai::db::NewPromoCode;
use boodai::ports::{ImageStore, Notifier, PortFuture, StoredObject};
use boodai::types::{ProductInput, UserRecord};
use boodai::{ApiError, AppState, BoodaiDb};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

const SECRET: &str = "api-db-test-secret";
const BOUNDARY: &str = "boodai-test-boundary";

static SCHEMA_READY: tokio::sync::Mutex<bool> = tokio::sync::Mutex::const_new(false);

async fn test_db() -> Option<BoodaiDb> {
    let url = std::env::var("BOODAI_TEST_DATABASE_URL").ok()?;
    let db = BoodaiDb::new(&url, 4).await.expect("connect test database");

    let mut ready = SCHEMA_READY.lock().await;
    if !*ready {
        db.initialize_schema().await.expect("schema init failed");
        *ready = true;
    }
    Some(db)
}

#[derive(Default)]
struct RecordingImages {
    puts: Mutex<Vec<String>>,
    deletes: Mutex<Vec<String>>,
}

impl RecordingImages {
    fn puts(&self) -> Vec<String> {
        self.puts.lock().expect("images lock").clone()
    }

    fn deletes(&self) -> Vec<String> {
        self.deletes.lock().expect("images lock").clone()
    }
}

impl ImageStore for RecordingImages {
    fn put<'a>(&'a self, key: &'a str, _bytes: Bytes, _content_type: &'a str) -> PortFuture<'a, ()> {
        Box::pin(async move {
            self.puts.lock().expect("images lock").push(key.to_string());
            Ok(())
        })
    }

    fn get<'a>(&'a self, key: &'a str) -> PortFuture<'a, StoredObject> {
        Box::pin(async move { Err(ApiError::not_found(format!("{key} not found"))) })
    }

    fn delete<'a>(&'a self, key: &'a str) -> PortFuture<'a, ()> {
        Box::pin(async move {
            self.deletes.lock().expect("images lock").push(key.to_string());
            Ok(())
        })
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn send<'a>(&'a self, chat_id: &'a str, _text: &'a str) -> PortFuture<'a, ()> {
        Box::pin(async move {
            self.sent.lock().expect("notifier lock").push(chat_id.to_string());
            Ok(())
        })
    }
}

struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn send<'a>(&'a self, _chat_id: &'a str, _text: &'a str) -> PortFuture<'a, ()> {
        Box::pin(async { Err(ApiError::NotificationError("chat is down".to_string())) })
    }
}

fn app(db: &BoodaiDb, images: Arc<RecordingImages>, notifier: Arc<dyn Notifier>) -> Router {
    let state = AppState::new(
        db.clone(),
        TokenIssuer::new(SECRET, 3600),
        images,
        notifier,
        None,
    );
    api::router(state, &[])
}

fn admin_token() -> String {
    let admin = UserRecord {
        id: 1,
        name: "Admin".to_string(),
        email: "admin@boodaypizza.com".to_string(),
        password: String::new(),
        is_admin: true,
        created_at: Utc::now(),
    };
    TokenIssuer::new(SECRET, 3600).issue(&admin).expect("token")
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

/// Multipart request signed as admin; `file` becomes the `image` part.
fn form_request(method: &str, uri: &str, fields: &[(&str, String)], file: Option<&str>) -> Request<Body> {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    if let Some(filename) = file {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\nContent-Type: image/png\r\n\r\nPNGDATA\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::AUTHORIZATION, format!("Bearer {}", admin_token()))
        .body(Body::from(body))
        .expect("request")
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

struct Menu {
    branch_id: i32,
    category_id: i32,
    pizza_id: i32,
    cola_id: i32,
}

async fn menu(db: &BoodaiDb, chat: Option<&str>) -> Menu {
    let tag = Uuid::new_v4().simple().to_string();
    let branch = db
        .insert_branch(&format!("Branch {tag}"), Some("Chui 1"), None, chat)
        .await
        .expect("insert branch");
    let category = db
        .insert_category(&format!("Menu {tag}"))
        .await
        .expect("insert category");

    let pizza_id = db
        .insert_product(
            &ProductInput {
                name: format!("Pepperoni {tag}"),
                price_small: Some(400.0),
                price_large: Some(800.0),
                branch_id: branch.id,
                category_id: category.id,
                is_pizza: true,
                ..ProductInput::default()
            },
            "products/pepperoni.png",
        )
        .await
        .expect("insert pizza");
    let cola_id = db
        .insert_product(
            &ProductInput {
                name: format!("Cola {tag}"),
                price_single: Some(90.0),
                branch_id: branch.id,
                category_id: category.id,
                ..ProductInput::default()
            },
            "products/cola.png",
        )
        .await
        .expect("insert cola");

    Menu {
        branch_id: branch.id,
        category_id: category.id,
        pizza_id,
        cola_id,
    }
}

fn pickup_order(branch_id: i32, items: Value) -> Value {
    json!({
        "branchId": branch_id,
        "customer": {"name": "Aibek", "phone": "+996700000000"},
        "deliveryType": "pickup",
        "items": items,
    })
}

fn product_fields(menu: &Menu, name: &str, category_id: i32) -> Vec<(&'static str, String)> {
    vec![
        ("name", name.to_string()),
        ("priceSmall", "450".to_string()),
        ("priceLarge", "790".to_string()),
        ("branchId", menu.branch_id.to_string()),
        ("categoryId", category_id.to_string()),
        ("isPizza", "true".to_string()),
    ]
}

#[tokio::test]
async fn registered_password_is_kept_as_typed() {
    let Some(db) = test_db().await else {
        return;
    };
    let app = app(&db, Arc::default(), Arc::new(RecordingNotifier::default()));
    let email = format!("{}@boodaypizza.com", Uuid::new_v4().simple());

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/register",
            &json!({"name": "Aibek", "email": email, "password": " secret "}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["token"].is_string());

    let (status, _) = send(
        &app,
        json_request("POST", "/login", &json!({"email": email, "password": " secret "})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        json_request("POST", "/login", &json!({"email": email, "password": "secret"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/register",
            &json!({"name": "Blank", "email": format!("x{email}"), "password": "   "}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn concurrent_registrations_with_one_email_get_bad_request() {
    let Some(db) = test_db().await else {
        return;
    };
    let app = app(&db, Arc::default(), Arc::new(RecordingNotifier::default()));
    let body = json!({
        "name": "Twin",
        "email": format!("{}@boodaypizza.com", Uuid::new_v4().simple()),
        "password": "pizza",
    });

    let (first, second) = tokio::join!(
        send(&app, json_request("POST", "/register", &body)),
        send(&app, json_request("POST", "/register", &body)),
    );
    let mut statuses = [first.0, second.0];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::BAD_REQUEST]);
}

#[tokio::test]
async fn order_sizes_are_lenient_and_receipt_has_totals() {
    let Some(db) = test_db().await else {
        return;
    };
    let menu = menu(&db, Some("-100500")).await;
    let notifier = Arc::new(RecordingNotifier::default());
    let app = app(&db, Arc::default(), notifier.clone());

    let items = json!([
        {"productId": menu.cola_id, "size": "single", "quantity": 1},
        {"productId": menu.pizza_id, "size": "Large", "quantity": 1},
        {"productId": menu.cola_id, "size": "xl", "quantity": 1},
    ]);
    let (status, receipt) = send(
        &app,
        json_request("POST", "/orders", &pickup_order(menu.branch_id, items)),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{receipt}");
    assert!(receipt["id"].is_i64());
    assert_eq!(receipt["subtotal"], json!(980.0));
    assert_eq!(receipt["discount_amount"], json!(0.0));
    assert_eq!(receipt["total"], json!(980.0));
    assert_eq!(receipt["status"], json!("new"));
    assert_eq!(notifier.sent.lock().expect("notifier lock").len(), 1);

    let id = receipt["id"].as_i64().expect("order id");
    let stored = db.get_order(id).await.expect("get order").expect("order exists");
    assert_eq!(stored.items.len(), 3);
    assert!(stored.items.iter().filter(|l| l.product_id == menu.cola_id).all(|l| l.size.is_none()));
}

#[tokio::test]
async fn failed_notification_is_bad_gateway_and_nothing_is_stored() {
    let Some(db) = test_db().await else {
        return;
    };
    let menu = menu(&db, Some("-100500")).await;
    let app = app(&db, Arc::default(), Arc::new(FailingNotifier));

    let items = json!([{"productId": menu.pizza_id, "size": "small", "quantity": 2}]);
    let (status, body) = send(
        &app,
        json_request("POST", "/orders", &pickup_order(menu.branch_id, items)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], json!("DEPENDENCY"));
    let orders = db
        .list_orders(Some(menu.branch_id), None)
        .await
        .expect("list orders");
    assert!(orders.is_empty());
}

#[tokio::test]
async fn promo_check_rejects_inactive_and_expired_codes() {
    let Some(db) = test_db().await else {
        return;
    };
    let app = app(&db, Arc::default(), Arc::new(RecordingNotifier::default()));
    let tag = &Uuid::new_v4().simple().to_string()[..10];

    let promo = |suffix: &str, is_active: bool, expires_at| NewPromoCode {
        code: format!("{suffix}{tag}"),
        discount_percent: 15,
        expires_at,
        is_active,
    };
    let live = promo("live", true, Some(Utc::now() + Duration::days(1)));
    let off = promo("off", false, None);
    let old = promo("old", true, Some(Utc::now() - Duration::days(1)));
    for code in [&live, &off, &old] {
        db.insert_promo_code(code).await.expect("insert promo");
    }

    let check = |code: String| json_request("POST", "/promo-codes/check", &json!({ "code": code }));

    let (status, body) = send(&app, check(live.code.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], json!(live.code.to_uppercase()));
    assert_eq!(body["discount_percent"], json!(15));

    assert_eq!(send(&app, check(off.code)).await.0, StatusCode::BAD_REQUEST);
    assert_eq!(send(&app, check(old.code)).await.0, StatusCode::BAD_REQUEST);
    assert_eq!(
        send(&app, check(format!("none{tag}"))).await.0,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn product_images_follow_the_row() {
    let Some(db) = test_db().await else {
        return;
    };
    let menu = menu(&db, None).await;
    let images = Arc::new(RecordingImages::default());
    let app = app(&db, images.clone(), Arc::new(RecordingNotifier::default()));

    // Unknown category: the upload is removed again.
    let (status, _) = send(
        &app,
        form_request(
            "POST",
            "/products",
            &product_fields(&menu, "Orphan", i32::MAX),
            Some("orphan.png"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(images.puts().len(), 1);
    assert_eq!(images.deletes(), images.puts());

    let (status, created) = send(
        &app,
        form_request(
            "POST",
            "/products",
            &product_fields(&menu, "Margherita", menu.category_id),
            Some("margherita.png"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().expect("product id");
    let first_key = created["image"].as_str().expect("image key").to_string();
    assert_eq!(images.puts().last(), Some(&first_key));
    assert_eq!(images.deletes().len(), 1);

    // Failed update keeps the stored image and drops the new upload.
    let (status, _) = send(
        &app,
        form_request(
            "PUT",
            &format!("/products/{id}"),
            &product_fields(&menu, "Margherita", i32::MAX),
            Some("rejected.png"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let rejected_key = images.puts().last().cloned().expect("rejected upload");
    assert_eq!(images.deletes().last(), Some(&rejected_key));
    let product = db
        .get_product(i32::try_from(id).expect("id fits"))
        .await
        .expect("get product")
        .expect("product exists");
    assert_eq!(product.image, first_key);

    // Replacement removes the previous object.
    let (status, updated) = send(
        &app,
        form_request(
            "PUT",
            &format!("/products/{id}"),
            &product_fields(&menu, "Margherita XL", menu.category_id),
            Some("margherita-xl.png"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let second_key = updated["image"].as_str().expect("image key").to_string();
    assert_ne!(second_key, first_key);
    assert_eq!(images.deletes().last(), Some(&first_key));

    let (status, _) = send(&app, form_request("DELETE", &format!("/products/{id}"), &[], None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(images.deletes().last(), Some(&second_key));
    assert!(db
        .get_product(i32::try_from(id).expect("id fits"))
        .await
        .expect("get product")
        .is_none());
}

#[tokio::test]
async fn story_images_follow_the_row() {
    let Some(db) = test_db().await else {
        return;
    };
    let images = Arc::new(RecordingImages::default());
    let app = app(&db, images.clone(), Arc::new(RecordingNotifier::default()));

    let (status, created) = send(&app, form_request("POST", "/stories", &[], Some("promo.png"))).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().expect("story id");
    let first_key = created["image"].as_str().expect("image key").to_string();
    assert_eq!(images.puts(), vec![first_key.clone()]);

    let (status, unchanged) = send(&app, form_request("PUT", &format!("/stories/{id}"), &[], None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unchanged["image"], json!(first_key));
    assert!(images.deletes().is_empty());

    let (status, updated) = send(
        &app,
        form_request("PUT", &format!("/stories/{id}"), &[], Some("autumn.png")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let second_key = updated["image"].as_str().expect("image key").to_string();
    assert_eq!(images.deletes(), vec![first_key]);

    let (status, _) = send(&app, form_request("DELETE", &format!("/stories/{id}"), &[], None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(images.deletes().last(), Some(&second_key));
}
