use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::{app, app_with_state, MockState, DEFAULT_PASSWORD, DEFAULT_USERNAME, PAGE_SIZE};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn request(method: &str, uri: &str, token: Option<&str>, body: &str) -> Request<String> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(body.to_string()).unwrap()
}

async fn login(app: &Router) -> String {
    let credentials = json!({"username": DEFAULT_USERNAME, "password": DEFAULT_PASSWORD}).to_string();
    let resp = app
        .clone()
        .oneshot(request("POST", "/api/authentication_token", None, &credentials))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await["token"].as_str().unwrap().to_string()
}

async fn create(app: &Router, token: &str, uri: &str, body: Value) -> Value {
    let resp = app
        .clone()
        .oneshot(request("POST", uri, Some(token), &body.to_string()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED, "POST {uri}");
    body_json(resp).await
}

async fn get(app: &Router, token: &str, uri: &str) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(request("GET", uri, Some(token), "")).await.unwrap();
    let status = resp.status();
    let bytes = body_bytes(resp).await;
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

// --- authentication ---

#[tokio::test]
async fn wrong_password_is_401() {
    let resp = app()
        .oneshot(request(
            "POST",
            "/api/authentication_token",
            None,
            r#"{"username":"admin","password":"nope"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_token_is_401_problem() {
    let resp = app().oneshot(request("GET", "/api/collections", None, "")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.headers()[http::header::CONTENT_TYPE], "application/problem+json");
    let problem = body_json(resp).await;
    assert_eq!(problem["status"], 401);
    assert_eq!(problem["detail"], "JWT Token not found");
}

#[tokio::test]
async fn forged_token_is_401() {
    let resp = app()
        .oneshot(request("GET", "/api/collections", Some("forged"), ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- lists ---

#[tokio::test]
async fn empty_list_has_member_envelope() {
    let app = app();
    let token = login(&app).await;
    let (status, body) = get(&app, &token, "/api/items").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["member"], json!([]));
    assert_eq!(body["totalItems"], 0);
}

#[tokio::test]
async fn users_are_seeded() {
    let app = app();
    let token = login(&app).await;
    let (_, body) = get(&app, &token, "/api/users").await;
    assert_eq!(body["member"][0]["username"], DEFAULT_USERNAME);
}

#[tokio::test]
async fn unknown_base_is_404() {
    let app = app();
    let token = login(&app).await;
    let (status, body) = get(&app, &token, "/api/nothing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
}

#[tokio::test]
async fn long_lists_are_paged_with_next_links() {
    let app = app();
    let token = login(&app).await;
    for n in 0..(PAGE_SIZE + 2) {
        create(&app, &token, "/api/tags", json!({"label": format!("tag {n}")})).await;
    }

    let (_, first) = get(&app, &token, "/api/tags").await;
    assert_eq!(first["member"].as_array().unwrap().len(), PAGE_SIZE);
    assert_eq!(first["totalItems"], PAGE_SIZE + 2);
    assert_eq!(first["view"]["next"], "/api/tags?page=2");

    let (_, second) = get(&app, &token, "/api/tags?page=2").await;
    assert_eq!(second["member"].as_array().unwrap().len(), 2);
    assert!(second["view"].get("next").is_none());
    assert_eq!(second["view"]["previous"], "/api/tags?page=1");

    let (_, small) = get(&app, &token, "/api/tags?itemsPerPage=10&page=4").await;
    assert_eq!(small["member"].as_array().unwrap().len(), 2);
    assert_eq!(small["view"]["@id"], "/api/tags?itemsPerPage=10&page=4");
}

// --- validation and integrity ---

#[tokio::test]
async fn missing_required_field_is_422_with_violations() {
    let app = app();
    let token = login(&app).await;
    let resp = app
        .clone()
        .oneshot(request("POST", "/api/collections", Some(&token), "{}"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let problem = body_json(resp).await;
    assert_eq!(problem["violations"][0]["propertyPath"], "title");
}

#[tokio::test]
async fn malformed_json_is_400() {
    let app = app();
    let token = login(&app).await;
    let resp = app
        .clone()
        .oneshot(request("POST", "/api/tags", Some(&token), "{not json"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_of_referenced_collection_is_409() {
    let app = app();
    let token = login(&app).await;
    let collection = create(&app, &token, "/api/collections", json!({"title": "Books"})).await;
    create(
        &app,
        &token,
        "/api/items",
        json!({"name": "Dune", "collection": collection["@id"], "quantity": 1}),
    )
    .await;

    let uri = format!("/api/collections/{}", collection["id"].as_str().unwrap());
    let resp = app.clone().oneshot(request("DELETE", &uri, Some(&token), "")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn logs_cannot_be_created() {
    let app = app();
    let token = login(&app).await;
    let resp = app
        .clone()
        .oneshot(request("POST", "/api/logs", Some(&token), "{}"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// --- relations, uploads, search ---

#[tokio::test]
async fn relation_endpoints() {
    let app = app();
    let token = login(&app).await;
    let collection = create(&app, &token, "/api/collections", json!({"title": "Books"})).await;
    let item = create(&app, &token, "/api/items", json!({"name": "Dune", "collection": collection["@id"]})).await;
    create(
        &app,
        &token,
        "/api/data",
        json!({"item": item["@id"], "type": "text", "label": "author", "value": "Herbert"}),
    )
    .await;

    let item_id = item["id"].as_str().unwrap();
    let (_, data) = get(&app, &token, &format!("/api/items/{item_id}/data")).await;
    assert_eq!(data["member"][0]["value"], "Herbert");

    let (status, parent) = get(&app, &token, &format!("/api/items/{item_id}/collection")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parent["title"], "Books");

    let collection_id = collection["id"].as_str().unwrap();
    let (_, items) = get(&app, &token, &format!("/api/collections/{collection_id}/items")).await;
    assert_eq!(items["member"][0]["name"], "Dune");
}

#[tokio::test]
async fn multipart_upload_sets_image() {
    let app = app();
    let token = login(&app).await;
    let tag = create(&app, &token, "/api/tags", json!({"label": "sci-fi"})).await;
    let body = "--B\r\nContent-Disposition: form-data; name=\"file\"; filename=\"file\"\r\n\
                Content-Type: application/octet-stream\r\n\r\nGIF89a\r\n--B--\r\n";
    let uri = format!("/api/tags/{}/image", tag["id"].as_str().unwrap());
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(&uri)
                .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
                .header(http::header::CONTENT_TYPE, "multipart/form-data; boundary=B")
                .body(body.to_string())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let updated = body_json(resp).await;
    assert!(updated["image"].as_str().unwrap().ends_with("/image"));
}

#[tokio::test]
async fn search_matches_item_names() {
    let app = app();
    let token = login(&app).await;
    let collection = create(&app, &token, "/api/collections", json!({"title": "Books"})).await;
    for name in ["Dune", "Emma"] {
        create(&app, &token, "/api/items", json!({"name": name, "collection": collection["@id"]})).await;
    }
    let (_, found) = get(&app, &token, "/search?name=dun").await;
    assert_eq!(found["member"].as_array().unwrap().len(), 1);
    assert_eq!(found["member"][0]["name"], "Dune");
}

#[tokio::test]
async fn metrics_count_resources() {
    let state = MockState::default();
    let app = app_with_state(state.clone());
    let token = login(&app).await;
    create(&app, &token, "/api/tags", json!({"label": "a"})).await;
    let (_, metrics) = get(&app, &token, "/api/metrics").await;
    assert_eq!(metrics["tags"], "1");
    assert_eq!(state.count("logs").await, 1);
}

// --- full lifecycle ---

#[tokio::test]
async fn crud_lifecycle() {
    let app = app_with_state(MockState::default().with_inventory("2024", json!({"collections": []})));
    let token = login(&app).await;

    let created = create(&app, &token, "/api/wishlists", json!({"name": "Gifts"})).await;
    let id = created["id"].as_str().unwrap().to_string();
    let uri = format!("/api/wishlists/{id}");

    let (status, fetched) = get(&app, &token, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["@id"], uri);
    assert_eq!(fetched["name"], "Gifts");

    let resp = app
        .clone()
        .oneshot(request("PUT", &uri, Some(&token), r#"{"name":"Presents","color":"red"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["name"], "Presents");

    let resp = app
        .clone()
        .oneshot(request("PATCH", &uri, Some(&token), r#"{"color":null}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let patched = body_json(resp).await;
    assert_eq!(patched["name"], "Presents");
    assert!(patched.get("color").is_none());

    let resp = app.clone().oneshot(request("DELETE", &uri, Some(&token), "")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    let (status, _) = get(&app, &token, &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, inventories) = get(&app, &token, "/api/inventories").await;
    assert_eq!(inventories["member"][0]["name"], "2024");
}
