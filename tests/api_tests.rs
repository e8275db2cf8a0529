use axum::body::{to_bytes, Body};
use axum::response::Json;
use http::{Request, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

// App de test autocontenida con la misma forma de respuestas que la API real
fn create_test_app() -> Router {
    Router::new()
        .route(
            "/test",
            get(|| async {
                Json(json!({
                    "status": "ok",
                    "message": "¡API de operaciones de alquiler funcionando correctamente!",
                }))
            }),
        )
        .route(
            "/api/trip/:id/start",
            post(|Json(body): Json<Value>| async move {
                if body.get("start_meter").and_then(|v| v.as_i64()).is_none() {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(json!({
                            "error": "Validation Error",
                            "code": "VALIDATION_ERROR",
                        })),
                    );
                }
                (StatusCode::OK, Json(json!({ "success": true })))
            }),
        )
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app();
    let response = app
        .oneshot(Request::builder().uri("/test").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = create_test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/unknown")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_start_trip_requires_start_meter() {
    let app = create_test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/trip/00000000-0000-0000-0000-000000000000/start")
                .header("content-type", "application/json")
                .body(Body::from(json!({}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");
}
