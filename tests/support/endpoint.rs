//! Local scoring endpoint backed by `axum`.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Player name the endpoint answers with `500 Internal Server Error`.
pub const REJECTED_NAME: &str = "reject";

/// A running endpoint and the bodies it has received.
pub struct ScoreEndpoint {
    pub url: String,
    received: Arc<Mutex<Vec<Value>>>,
    server: JoinHandle<()>,
}

impl ScoreEndpoint {
    pub async fn start() -> Self {
        let received = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/api/score", post(record_score))
            .with_state(Arc::clone(&received));

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });

        Self {
            url: format!("http://{addr}/api/score"),
            received,
            server,
        }
    }

    pub fn received(&self) -> Vec<Value> {
        self.received.lock().unwrap().clone()
    }
}

impl Drop for ScoreEndpoint {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn record_score(
    State(received): State<Arc<Mutex<Vec<Value>>>>,
    Json(body): Json<Value>,
) -> StatusCode {
    let rejected = body["name"] == REJECTED_NAME;
    received.lock().unwrap().push(body);
    if rejected {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    }
}

/// An address nothing is listening on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    listener.local_addr().expect("local addr")
}
