use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use tvcatalog::config::Config;

const API_KEY: &str = "test-static-key";

fn test_config() -> Config {
    let db_path =
        std::env::temp_dir().join(format!("tvcatalog-api-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.security.api_key = Some(API_KEY.to_string());
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config
}

async fn spawn_app_with(config: Config) -> Router {
    let state = tvcatalog::api::create_app_state_from_config(config, None)
        .await
        .expect("failed to create app state");
    tvcatalog::api::router(state).await
}

async fn spawn_app() -> Router {
    spawn_app_with(test_config()).await
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("X-Api-Key", API_KEY);
    let body = match body {
        Some(value) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    read(response).await
}

async fn read(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_auth_required_for_catalog_routes() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/v1/shows").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let (status, body) = read(response).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["kind"], "unauthorized");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/shows")
                .header("X-Api-Key", "wrong-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/shows")
                .header("Authorization", format!("Bearer {API_KEY}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/shows?apikey={API_KEY}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/v1/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let (status, body) = read(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_query_api_key_when_enabled() {
    let mut config = test_config();
    config.server.allow_api_key_in_query = true;
    let app = spawn_app_with(config).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/genres?apikey={API_KEY}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_register_login_and_user_key() {
    let app = spawn_app().await;
    let register = |body: Value| {
        let app = app.clone();
        async move {
            let response = app
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/api/v1/auth/register")
                        .header("Content-Type", "application/json")
                        .body(Body::from(body.to_string()))
                        .unwrap(),
                )
                .await
                .unwrap();
            read(response).await
        }
    };

    let (status, body) = register(json!({
        "email": "Viewer@Example.com",
        "password": "hunter22",
        "phone": "+1 555 123 4567",
    }))
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["user"]["email"], "viewer@example.com");
    assert_eq!(body["data"]["user"]["role"], "user");
    let user_key = body["data"]["apiKey"].as_str().unwrap().to_string();

    let (status, body) = register(json!({"email": "viewer@example.com", "password": "another1"})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["kind"], "conflict");

    let (status, _) = register(json!({"email": "not-an-email", "password": "hunter22"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = register(json!({"email": "short@example.com", "password": "abc"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = register(json!({"email": "missing@example.com"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let login = |body: Value| {
        let app = app.clone();
        async move {
            let response = app
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/api/v1/auth/login")
                        .header("Content-Type", "application/json")
                        .body(Body::from(body.to_string()))
                        .unwrap(),
                )
                .await
                .unwrap();
            read(response).await
        }
    };

    let (status, body) = login(json!({"email": "viewer@example.com", "password": "hunter22"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["apiKey"], user_key.as_str());

    let (status, body) = login(json!({"email": "viewer@example.com", "password": "wrong"})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Invalid email or password");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/shows")
                .header("X-Api-Key", &user_key)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_show_lifecycle() {
    let app = spawn_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/shows",
        Some(json!({
            "name": "Alpha",
            "first_air_date": "2020-01-15",
            "overview": "First show",
            "tmdb_rating": 8.4,
            "genres": ["Drama"],
            "actors": [{"name": "A", "character_name": "Ace"}, "B"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["actors"], "A, B");
    assert_eq!(body["data"]["relations"]["actors"][0]["character_name"], "Ace");
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send(&app, "GET", &format!("/api/v1/shows/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["first_air_date"], "2020-01-15");
    assert_eq!(body["data"]["genres"], "Drama");

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/v1/shows/{id}"),
        Some(json!({"actors": ["B"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["actors"], "B");
    assert_eq!(body["data"]["name"], "Alpha");

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/v1/shows/{id}"),
        Some(json!({"name": "Alpha Redux"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "validation_error");

    let (status, body) = send(&app, "GET", "/api/v1/shows?genre=drama&minRating=8", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalRecords"], 1);
    assert_eq!(body["data"]["currentPage"], 1);
    assert_eq!(body["data"]["totalPages"], 1);
    assert_eq!(body["data"]["pageSize"], 25);
    assert_eq!(body["data"]["results"][0]["name"], "Alpha");

    let (status, _) = send(&app, "DELETE", &format!("/api/v1/shows/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", &format!("/api/v1/shows/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["kind"], "not_found");
}

#[tokio::test]
async fn test_bad_requests() {
    let app = spawn_app().await;

    let (status, body) = send(&app, "GET", "/api/v1/shows/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "validation_error");

    let (status, _) = send(&app, "GET", "/api/v1/shows?year=soon", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/api/v1/shows?sortBy=hacked&order=up", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/shows",
        Some(json!({"name": "No Date", "overview": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/shows",
        Some(json!({
            "name": "Overrated",
            "first_air_date": "2020-01-01",
            "overview": "x",
            "tmdb_rating": 11,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/shows")
                .header("X-Api-Key", API_KEY)
                .header("Content-Type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    let (status, body) = read(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "validation_error");

    let (status, _) = send(&app, "GET", "/api/v1/planets", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_entities_and_links() {
    let app = spawn_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/networks",
        Some(json!({"name": "NetX", "country": "US"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["country"], "US");
    let network_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send(&app, "POST", "/api/v1/networks", Some(json!({"name": "NetX"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["kind"], "conflict");

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/v1/networks/{network_id}"),
        Some(json!({"logo_url": "netx.png"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["logo_url"], "netx.png");

    let (_, body) = send(
        &app,
        "POST",
        "/api/v1/shows",
        Some(json!({"name": "Linked", "first_air_date": "2021-09-09", "overview": "x"})),
    )
    .await;
    let show_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/shows/{show_id}/networks"),
        Some(json!({"name": "NetX"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["id"], network_id);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/v1/shows/{show_id}/networks"),
        Some(json!("NetX")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, "GET", &format!("/api/v1/shows/{show_id}/networks"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["name"], "NetX");

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/v1/networks/{network_id}/shows"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["entity"]["id"], network_id);
    assert_eq!(body["data"]["entity"]["country"], "US");
    assert_eq!(body["data"]["totalRecords"], 1);
    assert_eq!(body["data"]["results"][0]["name"], "Linked");

    let (status, body) = send(&app, "GET", "/api/v1/networks?search=net", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalRecords"], 1);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/v1/shows/{show_id}/networks/{network_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/v1/shows/{show_id}/networks/{network_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "GET", &format!("/api/v1/networks/{network_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "NetX");
}
