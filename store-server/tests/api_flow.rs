use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use store_server::core::build_app;
use store_server::{Config, ErrorCode, ServerState};
use tower::ServiceExt;

async fn app() -> Router {
    let mut config = Config::for_tests();
    config.bootstrap_admin_username = Some("admin".into());
    config.bootstrap_admin_password = Some("admin-password".into());
    let state = ServerState::initialize(&config).await.unwrap();
    build_app(state)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["token"].as_str().unwrap().to_string()
}

/// Decimals may come back as strings or numbers
fn dec(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().unwrap(),
        Value::Number(n) => n.to_string().parse().unwrap(),
        other => panic!("not a decimal: {other}"),
    }
}

fn error_code(body: &Value) -> u64 {
    body["code"].as_u64().unwrap()
}

#[tokio::test]
async fn health_is_public_and_api_is_not() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/health/detailed", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"]["status"], "ok");

    let (status, body) = send(&app, Method::GET, "/api/stores", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), ErrorCode::NotAuthenticated.code() as u64);

    let (status, _) = send(&app, Method::GET, "/api/stores", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

async fn request_id(app: &Router) -> String {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    response.headers()["x-request-id"].to_str().unwrap().to_string()
}

#[tokio::test]
async fn request_ids_are_uuids() {
    let first = request_id(&app().await).await;
    // a fresh app, as after a restart
    let second = request_id(&app().await).await;

    assert!(uuid::Uuid::parse_str(&first).is_ok(), "not a uuid: {first}");
    assert!(uuid::Uuid::parse_str(&second).is_ok());
    assert_ne!(first, second);

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "from-proxy")
        .body(Body::empty())
        .unwrap();
    let response = app().await.oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "from-proxy");
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let app = app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": "admin", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), ErrorCode::InvalidCredentials.code() as u64);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": "nobody", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), ErrorCode::InvalidCredentials.code() as u64);

    let token = login(&app, "admin", "admin-password").await;
    let (status, me) = send(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "admin");
    assert_eq!(me["role"], "superuser");
}

#[tokio::test]
async fn sale_to_balance_flow() {
    let app = app().await;
    let admin = login(&app, "admin", "admin-password").await;

    // manager account and their store
    let (status, manager) = send(
        &app,
        Method::POST,
        "/api/accounts",
        Some(&admin),
        Some(json!({
            "username": "gestor",
            "email": "gestor@example.com",
            "full_name": "Gestor Centro",
            "password": "gestor-password",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{manager}");
    let manager_id = manager["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/accounts",
        Some(&admin),
        Some(json!({
            "username": "gestor",
            "email": "outro@example.com",
            "password": "gestor-password",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), ErrorCode::UsernameExists.code() as u64);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/stores",
        Some(&admin),
        Some(json!({
            "name": "Loja Centro",
            "neighborhood": "Maianga",
            "city": "Luanda",
            "province": "Lisboa",
            "municipality": "Luanda",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), ErrorCode::InvalidProvince.code() as u64);

    let (status, store) = send(
        &app,
        Method::POST,
        "/api/stores",
        Some(&admin),
        Some(json!({
            "name": "Loja Centro",
            "neighborhood": "Maianga",
            "city": "Luanda",
            "province": "Luanda",
            "municipality": "Luanda",
            "manager_ids": [manager_id],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{store}");
    let store_id = store["id"].as_i64().unwrap();

    let (status, product) = send(
        &app,
        Method::POST,
        "/api/products",
        Some(&admin),
        Some(json!({ "name": "Carregador USB", "price": "100.00" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{product}");
    let product_id = product["id"].as_i64().unwrap();

    let manager = login(&app, "gestor", "gestor-password").await;

    // catalog changes are superuser-only
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/products",
        Some(&manager),
        Some(json!({ "name": "Cabo", "price": "10.00" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), ErrorCode::SuperuserRequired.code() as u64);

    let (status, entry) = send(
        &app,
        Method::POST,
        "/api/stock/entries",
        Some(&manager),
        Some(json!({
            "store_id": store_id,
            "item_kind": "product",
            "item_id": product_id,
            "quantity": 5,
            "unit_cost": "60.00",
            "supplier": "Distribuidora Kwanza",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{entry}");
    let line_id = entry["stock_line_id"].as_i64().unwrap();

    let sell = |quantity: i64| {
        json!({ "stock_line_id": line_id, "item_kind": "product", "quantity": quantity })
    };
    for _ in 0..2 {
        let (status, sale) =
            send(&app, Method::POST, "/api/sales", Some(&manager), Some(sell(1))).await;
        assert_eq!(status, StatusCode::OK, "{sale}");
        assert_eq!(dec(&sale["total_value"]), Decimal::from(100));
    }

    let (status, body) =
        send(&app, Method::POST, "/api/sales", Some(&manager), Some(sell(4))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_code(&body), ErrorCode::InsufficientStock.code() as u64);
    assert_eq!(body["message"], "Insufficient stock. Available: 3, requested: 4");

    let (status, lines) = send(
        &app,
        Method::GET,
        &format!("/api/stores/{store_id}/stock"),
        Some(&manager),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lines[0]["quantity"], 3);

    let (status, detail) = send(
        &app,
        Method::GET,
        &format!("/api/stores/{store_id}"),
        Some(&manager),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["stats"]["total_sales"], 2);
    assert_eq!(dec(&detail["stats"]["total_sales_value"]), Decimal::from(200));

    // balance over today's sales
    let today = shared::util::today().to_string();
    let (status, balance) = send(
        &app,
        Method::POST,
        "/api/balances/custom",
        Some(&manager),
        Some(json!({ "start_date": today, "end_date": today })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{balance}");
    assert_eq!(balance["store_id"], store_id);
    assert_eq!(dec(&balance["gross_total"]), Decimal::from(200));
    assert_eq!(balance["snapshot"]["sales"]["transactions"], 2);
    let balance_id = balance["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/balances/custom",
        Some(&manager),
        Some(json!({ "start_date": today, "end_date": today })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), ErrorCode::BalanceAlreadyExists.code() as u64);

    let (status, listed) = send(&app, Method::GET, "/api/balances", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, preview) = send(
        &app,
        Method::GET,
        &format!("/api/balances/preview?store_id={store_id}&start={today}&end={today}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dec(&preview["sales"]["gross_total"]), Decimal::from(200));

    let (status, seller) = send(
        &app,
        Method::GET,
        &format!("/api/accounts/{manager_id}/stats?from={today}&to={today}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(seller["sales_count"], 2);

    let (status, deleted) = send(
        &app,
        Method::DELETE,
        &format!("/api/balances/{balance_id}"),
        Some(&manager),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, true);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/balances/preview?store_id={store_id}&start=2000-01-01&end=2024-01-01"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), ErrorCode::InvalidPeriod.code() as u64);

    // sellers keep their account while their sales exist
    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/accounts/{manager_id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), ErrorCode::AccountHasSales.code() as u64);
}

#[tokio::test]
async fn account_management_over_http() {
    let app = app().await;
    let admin = login(&app, "admin", "admin-password").await;
    let (_, me) = send(&app, Method::GET, "/api/auth/me", Some(&admin), None).await;
    let admin_id = me["id"].as_i64().unwrap();

    let mut ids = Vec::new();
    for (username, email) in [("caixa", "caixa@example.com"), ("apoio", "apoio@example.com")] {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/accounts",
            Some(&admin),
            Some(json!({ "username": username, "email": email, "password": "first-pass" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        ids.push(body["id"].as_i64().unwrap());
    }
    let (caixa_id, apoio_id) = (ids[0], ids[1]);

    let (status, edited) = send(
        &app,
        Method::PUT,
        &format!("/api/accounts/{caixa_id}"),
        Some(&admin),
        Some(json!({ "full_name": "Caixa Principal", "email": "caixa.principal@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{edited}");
    assert_eq!(edited["full_name"], "Caixa Principal");
    assert_eq!(edited["email"], "caixa.principal@example.com");
    assert_eq!(edited["username"], "caixa");

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/accounts/{caixa_id}"),
        Some(&admin),
        Some(json!({ "email": "APOIO@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), ErrorCode::EmailExists.code() as u64);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/accounts/{admin_id}"),
        Some(&admin),
        Some(json!({ "is_superuser": false })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    // superuser reset, no old password needed
    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/accounts/{caixa_id}/password"),
        Some(&admin),
        Some(json!({ "new_password": "reset-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": "caixa", "password": "first-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let caixa = login(&app, "caixa", "reset-pass").await;

    // own change needs the current password
    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/auth/me/password",
        Some(&caixa),
        Some(json!({ "current_password": "first-pass", "new_password": "own-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), ErrorCode::WrongPassword.code() as u64);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/auth/me/password",
        Some(&caixa),
        Some(json!({ "current_password": "reset-pass", "new_password": "abc" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), ErrorCode::PasswordTooShort.code() as u64);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/auth/me/password",
        Some(&caixa),
        Some(json!({ "current_password": "reset-pass", "new_password": "own-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let caixa = login(&app, "caixa", "own-pass").await;

    // managers cannot manage accounts
    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/accounts/{apoio_id}"),
        Some(&caixa),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), ErrorCode::SuperuserRequired.code() as u64);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/accounts/{admin_id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, deleted) = send(
        &app,
        Method::DELETE,
        &format!("/api/accounts/{apoio_id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, true);
    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/accounts/{apoio_id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), ErrorCode::AccountNotFound.code() as u64);
}

#[tokio::test]
async fn daily_report_over_http() {
    let app = app().await;
    let admin = login(&app, "admin", "admin-password").await;

    let (_, store) = send(
        &app,
        Method::POST,
        "/api/stores",
        Some(&admin),
        Some(json!({
            "name": "Loja Sul",
            "neighborhood": "Benfica",
            "city": "Luanda",
            "province": "Luanda",
            "municipality": "Belas",
        })),
    )
    .await;
    let store_id = store["id"].as_i64().unwrap();

    let report = json!({
        "store_id": store_id,
        "report_date": "2024-03-01",
        "tpa": 100, "dstv": 200, "zap": 100, "unitel": 50, "africell": 50,
        "recharges": 300, "acc": 100, "cash": 500, "coins": 50, "expenses": 50,
    });
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/daily-reports",
        Some(&admin),
        Some(report.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_code(&body), ErrorCode::ShortageNoteRequired.code() as u64);

    let mut with_note = report;
    with_note["shortage_note"] = json!("Faltam 100 Kz");
    let (status, created) = send(
        &app,
        Method::POST,
        "/api/daily-reports",
        Some(&admin),
        Some(with_note),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{created}");
    assert_eq!(dec(&created["grand_total"]), Decimal::from(800));
    assert_eq!(dec(&created["difference"]), Decimal::from(100));
    assert_eq!(created["status"], "negative");

    let (status, listed) = send(
        &app,
        Method::GET,
        &format!("/api/daily-reports?store_id={store_id}&from=2024-03-01&to=2024-03-31"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
}
