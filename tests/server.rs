//! HTTP API tests driven through the router with `tower::ServiceExt`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use parking_lot::RwLock;
use tower::ServiceExt;

use flowsight::api::ProcessMiner;
use flowsight::server::{router, SharedMiner};

const BOUNDARY: &str = "flowsight-test-boundary";

const ORDERS: &str = "\
case_id,timestamp,activity,result
order-1,2024-01-15T10:00:00Z,Process start,success
order-1,2024-01-15T10:01:00Z,Review,success
order-1,2024-01-15T10:03:00Z,End,success
";

fn app() -> (axum::Router, SharedMiner) {
    let miner: SharedMiner = Arc::new(RwLock::new(ProcessMiner::new()));
    let router = router(Arc::clone(&miner), 10 * 1024 * 1024);
    (router, miner)
}

fn multipart_upload(csv: &str) -> Request<Body> {
    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"log.csv\"\r\n\
         Content-Type: text/csv\r\n\r\n\
         {csv}\r\n\
         --{BOUNDARY}--\r\n"
    );
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let (app, _) = app();
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn graph_is_empty_before_any_upload() {
    let (app, _) = app();
    let response = app
        .oneshot(Request::builder().uri("/graph").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["nodes"].as_array().unwrap().len(), 0);
    assert_eq!(json["edges"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn upload_builds_model_and_graph_serves_cytoscape_elements() {
    let (app, _) = app();

    let response = app
        .clone()
        .oneshot(multipart_upload(ORDERS))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::builder().uri("/graph").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_json(response).await;

    let nodes = json["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 5); // 3 activities + boundary nodes
    assert!(nodes.iter().all(|n| n.get("data").is_some()));

    let edges = json["edges"].as_array().unwrap();
    assert!(edges
        .iter()
        .any(|e| e["data"]["from"] == "Process start" && e["data"]["to"] == "Review"));
    assert!(edges
        .iter()
        .any(|e| e["data"]["style"] == "dashed" && e["data"]["from"] == "start"));
}

#[tokio::test]
async fn metrics_endpoint_serves_full_report() {
    let (app, _) = app();
    app.clone().oneshot(multipart_upload(ORDERS)).await.unwrap();

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
    let json = body_json(response).await;
    assert_eq!(json["total_process_instances"], 1);
    assert_eq!(json["total_events"], 3);
    assert_eq!(json["metrics"].as_array().unwrap().len(), 12);
}

#[tokio::test]
async fn upload_with_malformed_csv_is_rejected_and_keeps_state() {
    let (app, miner) = app();
    app.clone().oneshot(multipart_upload(ORDERS)).await.unwrap();

    let bad = "case_id,timestamp,activity\nc1,yesterday,A\n";
    let response = app.clone().oneshot(multipart_upload(bad)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The previous model survives a failed upload.
    assert_eq!(miner.read().sessions().len(), 1);
}

#[tokio::test]
async fn upload_without_file_part_is_a_bad_request() {
    let (app, _) = app();
    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"comment\"\r\n\r\n\
         hello\r\n\
         --{BOUNDARY}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn clear_resets_the_model() {
    let (app, miner) = app();
    app.clone().oneshot(multipart_upload(ORDERS)).await.unwrap();
    assert_eq!(miner.read().sessions().len(), 1);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/clear")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(miner.read().sessions().is_empty());

    let response = app
        .oneshot(Request::builder().uri("/graph").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["nodes"].as_array().unwrap().len(), 0);
}
