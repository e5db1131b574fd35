//! HTTP boundary for flowsight.
//!
//! A small axum application around a shared [`ProcessMiner`]:
//!
//! | Route          | Method | Purpose                                   |
//! |----------------|--------|-------------------------------------------|
//! | `/health`      | GET    | Liveness probe                            |
//! | `/upload`      | POST   | Multipart CSV upload, rebuilds the model  |
//! | `/graph`       | GET    | Aggregated graph in Cytoscape element form|
//! | `/metrics`     | GET    | Full inefficiency metrics report          |
//! | `/clear`       | POST   | Drop all model state                      |
//!
//! `/graph` wraps every node and edge in a `{"data": ...}` envelope, the
//! element format Cytoscape.js consumes directly.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use parking_lot::RwLock;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::api::ProcessMiner;
use crate::builder::graph::{Edge, Node};
use crate::config::Config;
use crate::error::{FlowsightError, Result};

/// Shared, lock-guarded miner state.
pub type SharedMiner = Arc<RwLock<ProcessMiner>>;

/// Graph payload in Cytoscape element form.
#[derive(Debug, Serialize)]
struct CytoscapeGraph {
    nodes: Vec<CytoscapeElement<Node>>,
    edges: Vec<CytoscapeElement<Edge>>,
}

#[derive(Debug, Serialize)]
struct CytoscapeElement<T> {
    data: T,
}

/// Build the application router over a shared miner.
#[must_use]
pub fn router(miner: SharedMiner, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/upload", post(upload))
        .route("/graph", get(graph))
        .route("/metrics", get(metrics))
        .route("/clear", post(clear))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(miner)
}

/// Bind and serve until the task is cancelled.
pub async fn serve(config: Config) -> Result<()> {
    let miner = Arc::new(RwLock::new(ProcessMiner::with_analyzer(
        config.analyzer.to_analyzer(),
    )));
    let app = router(miner, config.server.max_upload_bytes);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| FlowsightError::io(format!("Failed to bind {addr}"), e))?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| FlowsightError::server(format!("Server error: {e}")))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Accept a multipart upload with a `file` part and rebuild the model.
async fn upload(State(miner): State<SharedMiner>, mut multipart: Multipart) -> Response {
    info!("upload started");
    let mut payload: Option<Vec<u8>> = None;

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some("file") {
                    continue;
                }
                match field.bytes().await {
                    Ok(bytes) => payload = Some(bytes.to_vec()),
                    Err(e) => {
                        error!(error = %e, "failed to read upload body");
                        return (StatusCode::BAD_REQUEST, "Failed to read uploaded file")
                            .into_response();
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                error!(error = %e, "malformed multipart request");
                return (StatusCode::BAD_REQUEST, "Malformed multipart request").into_response();
            }
        }
    }

    let Some(payload) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing 'file' part").into_response();
    };

    let outcome = miner.write().build_from_reader(payload.as_slice());
    match outcome {
        Ok(()) => {
            info!("upload processed");
            (StatusCode::OK, "File uploaded and graph built").into_response()
        }
        Err(e) => {
            error!(error = %e, "model build failed");
            let status = match &e {
                FlowsightError::ParseError { .. } | FlowsightError::CsvError { .. } => {
                    StatusCode::BAD_REQUEST
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, format!("Failed to build graph: {e}")).into_response()
        }
    }
}

async fn graph(State(miner): State<SharedMiner>) -> Json<CytoscapeGraph> {
    let miner = miner.read();
    let graph = miner.graph();
    Json(CytoscapeGraph {
        nodes: graph
            .nodes
            .iter()
            .cloned()
            .map(|data| CytoscapeElement { data })
            .collect(),
        edges: graph
            .edges
            .iter()
            .cloned()
            .map(|data| CytoscapeElement { data })
            .collect(),
    })
}

async fn metrics(State(miner): State<SharedMiner>) -> Response {
    let report = miner.read().metrics_report();
    Json(report).into_response()
}

async fn clear(State(miner): State<SharedMiner>) -> &'static str {
    miner.write().clear();
    info!("model cleared via API");
    "Graph cleared"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared() -> SharedMiner {
        Arc::new(RwLock::new(ProcessMiner::new()))
    }

    #[test]
    fn router_builds_over_empty_state() {
        let _app = router(shared(), 1024 * 1024);
    }

    #[tokio::test]
    async fn graph_handler_serves_cytoscape_envelopes() {
        let miner = shared();
        miner
            .write()
            .build_from_str(
                "case_id,timestamp,activity\n\
                 c1,2024-01-15T10:00:00Z,A\n\
                 c1,2024-01-15T10:00:30Z,B\n",
            )
            .unwrap();

        let Json(payload) = graph(State(miner)).await;
        assert_eq!(payload.nodes.len(), 4); // A, B + boundary nodes
        assert!(payload.nodes.iter().any(|n| n.data.id == "A"));
        assert!(payload
            .edges
            .iter()
            .any(|e| e.data.from == "A" && e.data.to == "B"));
    }

    #[tokio::test]
    async fn clear_handler_resets_state() {
        let miner = shared();
        miner
            .write()
            .build_from_str(
                "case_id,timestamp,activity\n\
                 c1,2024-01-15T10:00:00Z,A\n\
                 c1,2024-01-15T10:00:30Z,B\n",
            )
            .unwrap();

        let _ = clear(State(Arc::clone(&miner))).await;
        assert!(miner.read().sessions().is_empty());
    }
}
