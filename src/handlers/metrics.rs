//! Metrics endpoint handler for Prometheus scraping.
//!
//! The handler never triggers a collection; it returns whatever the refresh
//! loop published last, so scrape latency does not depend on host size.

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};
use bytes::Bytes;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument};

use crate::state::SharedState;

/// Shares a published document with the response body.
struct DocumentBytes(Arc<str>);

impl AsRef<[u8]> for DocumentBytes {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// Wraps the snapshot without copying it; the body holds one more reference.
fn document_body(document: Arc<str>) -> Body {
    Body::from(Bytes::from_owner(DocumentBytes(document)))
}

/// Handler for the /metrics endpoint.
#[instrument(skip(state))]
pub async fn metrics_handler(State(state): State<SharedState>) -> impl IntoResponse {
    let start = Instant::now();
    let document = state.store.read().await;

    debug!(
        "Served {} bytes from snapshot in {:.3}ms",
        document.len(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain")],
        document_body(document),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::state::AppState;
    use procmetrics_exporter::{Collector, ProcFs, Snapshot, SnapshotStore};
    use tempfile::tempdir;

    fn test_state(root: &std::path::Path) -> SharedState {
        Arc::new(AppState {
            store: Arc::new(SnapshotStore::new()),
            collector: Arc::new(Collector::new(Arc::new(ProcFs::new(root)), 1).unwrap()),
            config: Arc::new(Config::default()),
            start_time: Instant::now(),
        })
    }

    async fn body_of(resp: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        String::from_utf8(bytes.to_vec()).expect("body is not utf-8")
    }

    #[tokio::test]
    async fn test_metrics_handler_empty_before_first_cycle() {
        let dir = tempdir().expect("Failed to create temp dir");
        let resp = metrics_handler(State(test_state(dir.path())))
            .await
            .into_response();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/plain");
        assert_eq!(body_of(resp).await, "");
    }

    #[tokio::test]
    async fn test_metrics_handler_serves_snapshot_verbatim() {
        let dir = tempdir().expect("Failed to create temp dir");
        let state = test_state(dir.path());
        let doc = "process_memory_usage{pid=\"1\",command=\"init\",args=\"\"} 4096\n";
        state.store.publish(Snapshot::from_document(doc)).await;

        let resp = metrics_handler(State(state)).await.into_response();
        assert_eq!(body_of(resp).await, doc);
    }

    #[tokio::test]
    async fn test_body_shares_snapshot_buffer() {
        let doc: Arc<str> = Arc::from("process_cpu_usage{pid=\"1\",command=\"init\",args=\"\"} 0.50\n");

        let bytes = Bytes::from_owner(DocumentBytes(Arc::clone(&doc)));
        assert_eq!(bytes.as_ptr(), doc.as_ptr());
        assert_eq!(Arc::strong_count(&doc), 2);
        drop(bytes);
        assert_eq!(Arc::strong_count(&doc), 1);

        let collected = axum::body::to_bytes(document_body(Arc::clone(&doc)), usize::MAX)
            .await
            .expect("Failed to read body");
        assert_eq!(&collected[..], doc.as_bytes());
    }
}
