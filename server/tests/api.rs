use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use todo_server::{app, app_with_store, Todo, TodoStore};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

async fn send(app: &axum::Router, req: Request<String>) -> axum::response::Response {
    app.clone().oneshot(req).await.unwrap()
}

async fn assert_error(response: axum::response::Response, status: StatusCode, message: &str) {
    assert_eq!(response.status(), status);
    let body: Value = body_json(response).await;
    assert_eq!(body, serde_json::json!({ "error": message }));
}

async fn list(app: &axum::Router) -> Vec<Todo> {
    let resp = send(app, empty_request("GET", "/todos")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await
}

// --- list ---

#[tokio::test]
async fn list_todos_returns_seed_records() {
    let todos = list(&app()).await;
    assert_eq!(todos.len(), 2);
    assert_eq!(todos[0].id, 1);
    assert_eq!(todos[0].title, "Learn React");
    assert!(!todos[0].completed);
    assert_eq!(todos[1].id, 2);
    assert_eq!(todos[1].title, "Build a todo app");
    assert!(todos[1].completed);
}

#[tokio::test]
async fn list_todos_empty_store() {
    let app = app_with_store(TodoStore::empty().shared());
    assert!(list(&app).await.is_empty());
}

#[tokio::test]
async fn list_serializes_wire_fields() {
    let resp = send(&app(), empty_request("GET", "/todos")).await;
    let body: Value = body_json(resp).await;
    let first = body[0].as_object().unwrap();
    let mut keys: Vec<_> = first.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, ["completed", "created_at", "id", "title"]);
    assert!(first["created_at"].as_str().unwrap().ends_with('Z'));
}

// --- create ---

#[tokio::test]
async fn create_todo_returns_201() {
    let app = app();
    let resp = send(&app, json_request("POST", "/todos", r#"{"title":"Buy milk"}"#)).await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let todo: Todo = body_json(resp).await;
    assert_eq!(todo.id, 3);
    assert_eq!(todo.title, "Buy milk");
    assert!(!todo.completed);
}

#[tokio::test]
async fn create_assigns_increasing_ids() {
    let app = app();
    let mut last = list(&app).await.iter().map(|t| t.id).max().unwrap();
    for title in ["one", "two", "three"] {
        let body = serde_json::json!({ "title": title }).to_string();
        let resp = send(&app, json_request("POST", "/todos", &body)).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let todo: Todo = body_json(resp).await;
        assert!(todo.id > last);
        assert!(!todo.completed);
        last = todo.id;
    }
}

#[tokio::test]
async fn create_trims_title_and_ignores_completed() {
    let app = app();
    let resp = send(
        &app,
        json_request("POST", "/todos", r#"{"title":"  Already done  ","completed":true}"#),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let todo: Todo = body_json(resp).await;
    assert_eq!(todo.title, "Already done");
    assert!(!todo.completed);
}

#[tokio::test]
async fn create_blank_title_returns_400_and_keeps_list() {
    let app = app();
    for body in [r#"{"title":""}"#, r#"{"title":"   "}"#] {
        let resp = send(&app, json_request("POST", "/todos", body)).await;
        assert_error(
            resp,
            StatusCode::BAD_REQUEST,
            "Title is required and must be a non-empty string",
        )
        .await;
    }
    assert_eq!(list(&app).await.len(), 2);
}

#[tokio::test]
async fn create_missing_title_returns_400() {
    let resp = send(&app(), json_request("POST", "/todos", r#"{"not_title":1}"#)).await;
    assert_error(
        resp,
        StatusCode::BAD_REQUEST,
        "Title is required and must be a non-empty string",
    )
    .await;
}

#[tokio::test]
async fn create_title_length_limit() {
    let app = app();
    let too_long = serde_json::json!({ "title": "a".repeat(201) }).to_string();
    let resp = send(&app, json_request("POST", "/todos", &too_long)).await;
    assert_error(resp, StatusCode::BAD_REQUEST, "Title must be 200 characters or less").await;

    let at_limit = serde_json::json!({ "title": "a".repeat(200) }).to_string();
    let resp = send(&app, json_request("POST", "/todos", &at_limit)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn create_malformed_json_returns_400() {
    let app = app();
    let resp = send(&app, json_request("POST", "/todos", r#"{"title":"#)).await;
    assert_error(resp, StatusCode::BAD_REQUEST, "Invalid JSON data").await;
    assert_eq!(list(&app).await.len(), 2);
}

#[tokio::test]
async fn create_accepts_body_without_content_type() {
    let req = Request::builder()
        .method("POST")
        .uri("/todos")
        .body(r#"{"title":"plain"}"#.to_string())
        .unwrap();
    let resp = send(&app(), req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
}

// --- get ---

#[tokio::test]
async fn get_todo_not_found() {
    let resp = send(&app(), empty_request("GET", "/todos/99")).await;
    assert_error(resp, StatusCode::NOT_FOUND, "Todo not found").await;
}

#[tokio::test]
async fn non_numeric_id_returns_400_for_every_item_method() {
    let app = app();
    for (method, body) in [("GET", ""), ("PUT", r#"{"completed":true}"#), ("DELETE", "")] {
        let resp = send(&app, json_request(method, "/todos/abc", body)).await;
        assert_error(resp, StatusCode::BAD_REQUEST, "Invalid todo ID").await;
    }
    assert_eq!(list(&app).await.len(), 2);
}

#[tokio::test]
async fn undecodable_id_segment_returns_json_400() {
    let app = app();
    for method in ["GET", "PUT", "DELETE"] {
        let resp = send(&app, json_request(method, "/todos/%FF", r#"{"completed":true}"#)).await;
        assert_error(resp, StatusCode::BAD_REQUEST, "Invalid todo ID").await;
    }
}

#[tokio::test]
async fn id_segment_uses_its_leading_integer() {
    let app = app();

    let resp = send(&app, empty_request("GET", "/todos/1.5")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let todo: Todo = body_json(resp).await;
    assert_eq!(todo.id, 1);

    let resp = send(&app, empty_request("GET", "/todos/2abc")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let todo: Todo = body_json(resp).await;
    assert_eq!(todo.id, 2);

    let resp = send(&app, empty_request("GET", "/todos/12abc")).await;
    assert_error(resp, StatusCode::NOT_FOUND, "Todo not found").await;
}

#[tokio::test]
async fn unsupported_method_returns_json_405() {
    let app = app();
    for (method, uri) in [("PATCH", "/todos/1"), ("POST", "/todos/1"), ("DELETE", "/todos")] {
        let resp = send(&app, json_request(method, uri, r#"{"title":"x"}"#)).await;
        assert_error(resp, StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").await;
    }
    assert_eq!(list(&app).await.len(), 2);
}

#[tokio::test]
async fn oversized_body_returns_json_413() {
    let app = app();
    let body = serde_json::json!({ "title": "a".repeat(3 * 1024 * 1024) }).to_string();
    let resp = send(&app, json_request("POST", "/todos", &body)).await;
    assert_error(resp, StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").await;

    let resp = send(&app, json_request("PUT", "/todos/1", &body)).await;
    assert_error(resp, StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").await;
    assert_eq!(list(&app).await.len(), 2);
}

#[tokio::test]
async fn create_then_get_returns_identical_json() {
    let app = app();
    let resp = send(&app, json_request("POST", "/todos", r#"{"title":"Round trip"}"#)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = body_json(resp).await;
    let id = created["id"].as_i64().unwrap();

    let resp = send(&app, empty_request("GET", &format!("/todos/{id}"))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Value = body_json(resp).await;
    assert_eq!(fetched, created);
}

// --- update ---

#[tokio::test]
async fn update_todo_not_found() {
    let resp = send(&app(), json_request("PUT", "/todos/99", r#"{"title":"Nope"}"#)).await;
    assert_error(resp, StatusCode::NOT_FOUND, "Todo not found").await;
}

#[tokio::test]
async fn update_missing_id_is_404_even_with_bad_body() {
    let resp = send(&app(), json_request("PUT", "/todos/99", "not json")).await;
    assert_error(resp, StatusCode::NOT_FOUND, "Todo not found").await;
}

#[tokio::test]
async fn update_completed_only_changes_completed() {
    let app = app();
    let before = list(&app).await.remove(0);

    let resp = send(&app, json_request("PUT", "/todos/1", r#"{"completed":true}"#)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Todo = body_json(resp).await;
    assert_eq!(updated.id, before.id);
    assert_eq!(updated.title, before.title);
    assert_eq!(updated.created_at, before.created_at);
    assert!(updated.completed);

    assert_eq!(list(&app).await[0], updated);
}

#[tokio::test]
async fn update_rejects_invalid_fields_without_mutating() {
    let app = app();
    let before = list(&app).await;

    let cases = [
        (r#"{"completed":"true"}"#, "Completed must be a boolean"),
        (r#"{"title":42}"#, "Title must be a non-empty string"),
        (r#"{"title":"  ","completed":true}"#, "Title must be a non-empty string"),
        (r#"{"title":"","completed":"x"}"#, "Title must be a non-empty string"),
        ("{broken", "Invalid JSON data"),
    ];
    for (body, message) in cases {
        let resp = send(&app, json_request("PUT", "/todos/1", body)).await;
        assert_error(resp, StatusCode::BAD_REQUEST, message).await;
    }

    let too_long = serde_json::json!({ "title": "b".repeat(201) }).to_string();
    let resp = send(&app, json_request("PUT", "/todos/1", &too_long)).await;
    assert_error(resp, StatusCode::BAD_REQUEST, "Title must be 200 characters or less").await;

    assert_eq!(list(&app).await, before);
}

// --- delete ---

#[tokio::test]
async fn delete_todo_not_found() {
    let resp = send(&app(), empty_request("DELETE", "/todos/99")).await;
    assert_error(resp, StatusCode::NOT_FOUND, "Todo not found").await;
}

#[tokio::test]
async fn delete_twice_second_is_404() {
    let app = app();
    let resp = send(&app, empty_request("DELETE", "/todos/2")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body, serde_json::json!({ "message": "Todo deleted successfully" }));

    let resp = send(&app, empty_request("DELETE", "/todos/2")).await;
    assert_error(resp, StatusCode::NOT_FOUND, "Todo not found").await;
}

// --- misc ---

#[tokio::test]
async fn unknown_route_returns_json_404() {
    let resp = send(&app(), empty_request("GET", "/nope")).await;
    assert_error(resp, StatusCode::NOT_FOUND, "Not found").await;
}

// --- full CRUD lifecycle ---

#[tokio::test]
async fn crud_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/todos", r#"{"title":"Walk dog"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Todo = body_json(resp).await;
    assert_eq!(created.title, "Walk dog");
    assert!(!created.completed);
    let id = created.id;

    // list: seeds plus the new one, in insertion order
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/todos"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let todos: Vec<Todo> = body_json(resp).await;
    assert_eq!(todos.len(), 3);
    assert_eq!(todos[2].id, id);

    // update: only title
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            &format!("/todos/{id}"),
            r#"{"title":"Walk cat"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Todo = body_json(resp).await;
    assert_eq!(updated.title, "Walk cat");
    assert!(!updated.completed);
    assert_eq!(updated.created_at, created.created_at);

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", &format!("/todos/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(!body_bytes(resp).await.is_empty());

    // get after delete: 404
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", &format!("/todos/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // list after delete: back to the seeds
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/todos"))
        .await
        .unwrap();
    let todos: Vec<Todo> = body_json(resp).await;
    assert_eq!(todos.len(), 2);
}
