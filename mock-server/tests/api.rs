use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Echo, Problem, Todo, CREATE_TODO, ECHO, PROBLEM, TODO, TODO_LIST, UPDATE_TODO};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn content_type(response: &axum::response::Response) -> Option<&str> {
    response
        .headers()
        .get(http::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
}

fn document_request(method: &str, uri: &str, media_type: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, media_type)
        .body(body.to_string())
        .unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- list ---

#[tokio::test]
async fn list_todos_empty() {
    let resp = app().oneshot(get("/todos")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(content_type(&resp), Some(TODO_LIST));
    let todos: Vec<Todo> = body_json(resp).await;
    assert!(todos.is_empty());
}

// --- create ---

#[tokio::test]
async fn create_todo_returns_vendor_document() {
    let resp = app()
        .oneshot(document_request("POST", "/todos", CREATE_TODO, r#"{"title":"Buy milk"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(content_type(&resp), Some(TODO));
    let todo: Todo = body_json(resp).await;
    assert_eq!(todo.title, "Buy milk");
    assert!(!todo.completed);
}

#[tokio::test]
async fn create_todo_with_plain_json_is_unsupported() {
    let resp = app()
        .oneshot(document_request("POST", "/todos", "application/json", r#"{"title":"x"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(content_type(&resp), Some(PROBLEM));
    let problem: Problem = body_json(resp).await;
    assert_eq!(problem.status, 415);
}

#[tokio::test]
async fn create_todo_malformed_body_returns_422() {
    let resp = app()
        .oneshot(document_request("POST", "/todos", CREATE_TODO, r#"{"not_title":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- get ---

#[tokio::test]
async fn get_todo_not_found_is_a_problem_document() {
    let resp = app()
        .oneshot(get("/todos/00000000-0000-0000-0000-000000000000"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(content_type(&resp), Some(PROBLEM));
    let problem: Problem = body_json(resp).await;
    assert_eq!(problem.title, "todo not found");
}

#[tokio::test]
async fn get_todo_bad_uuid_returns_400() {
    let resp = app().oneshot(get("/todos/not-a-uuid")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- update / delete ---

#[tokio::test]
async fn update_todo_not_found() {
    let resp = app()
        .oneshot(document_request(
            "PUT",
            "/todos/00000000-0000-0000-0000-000000000000",
            UPDATE_TODO,
            r#"{"title":"Nope"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_todo_not_found() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/todos/00000000-0000-0000-0000-000000000000")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- negotiation fixtures ---

#[tokio::test]
async fn echo_reflects_request_headers() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/echo/a/b")
                .header("Accept", "*/*")
                .header("X-Api-Key", "secret")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(content_type(&resp), Some(ECHO));
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.path, "/echo/a/b");
    assert_eq!(echo.headers.get("accept").map(String::as_str), Some("*/*"));
    assert_eq!(echo.headers.get("x-api-key").map(String::as_str), Some("secret"));
}

#[tokio::test]
async fn fixtures_advertise_their_media_types() {
    let resp = app().oneshot(get("/export")).await.unwrap();
    assert_eq!(content_type(&resp), Some("text/csv; header=present"));

    let resp = app().oneshot(get("/broken")).await.unwrap();
    assert_eq!(content_type(&resp), Some(TODO));
    assert!(serde_json::from_slice::<serde_json::Value>(&body_bytes(resp).await).is_err());

    let resp = app().oneshot(get("/untyped")).await.unwrap();
    assert_eq!(content_type(&resp), None);
    assert_eq!(body_bytes(resp).await, "plain bytes");
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
        .call(document_request("POST", "/todos", CREATE_TODO, r#"{"title":"Walk dog"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Todo = body_json(resp).await;
    let id = created.id;

    // update — partial: only completed
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(document_request(
            "PUT",
            &format!("/todos/{id}"),
            UPDATE_TODO,
            r#"{"completed":true}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Todo = body_json(resp).await;
    assert_eq!(updated.title, "Walk dog"); // unchanged
    assert!(updated.completed);

    // list — should contain the one todo
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/todos"))
        .await
        .unwrap();
    let todos: Vec<Todo> = body_json(resp).await;
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].id, id);

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("DELETE")
                .uri(&format!("/todos/{id}"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(content_type(&resp), None);
    assert!(body_bytes(resp).await.is_empty());

    // get after delete — 404
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/todos/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
