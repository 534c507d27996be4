// ==============================================================================
// test_support.rs - Test Fixtures
// ==============================================================================
// Description: In-process mock of the RefSNP frequency endpoint
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::models::DEFAULT_ORGANISM;

#[derive(Clone)]
struct MockState {
    responses: Arc<HashMap<String, (u16, Value)>>,
    hits: Arc<AtomicUsize>,
}

/// Running mock server
pub struct MockAlfa {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl MockAlfa {
    /// Number of requests served so far
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Start a mock server answering `/refsnp/{id}/frequency`
///
/// Ids not listed answer 404 with an NCBI-style error body.
pub async fn spawn_mock(responses: Vec<(&str, u16, Value)>) -> MockAlfa {
    let responses: HashMap<String, (u16, Value)> = responses
        .into_iter()
        .map(|(id, status, body)| (id.to_string(), (status, body)))
        .collect();

    let hits = Arc::new(AtomicUsize::new(0));
    let state = MockState {
        responses: Arc::new(responses),
        hits: hits.clone(),
    };

    let app = Router::new()
        .route("/refsnp/{id}/frequency", get(frequency_handler))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockAlfa {
        base_url: format!("http://{}", addr),
        hits,
    }
}

async fn frequency_handler(
    State(state): State<MockState>,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    state.hits.fetch_add(1, Ordering::SeqCst);

    match state.responses.get(&id) {
        Some((status, body)) => (
            StatusCode::from_u16(*status).unwrap(),
            Json(body.clone()),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": { "code": 404, "message": format!("Unknown RefSNP rs{}", id) }
            })),
        ),
    }
}

/// Build a frequency payload for the default organism
///
/// `populations` lists (accession, [(allele, count)]).
pub fn alfa_payload(reference: &str, populations: Vec<(&str, Vec<(&str, u64)>)>) -> Value {
    let mut allele_counts = Map::new();
    for (accession, counts) in populations {
        let counts: Map<String, Value> = counts
            .into_iter()
            .map(|(allele, count)| (allele.to_string(), json!(count)))
            .collect();
        allele_counts.insert(accession.to_string(), Value::Object(counts));
    }

    json!({
        "build_id": "20201027095038",
        "results": {
            "1@100": {
                "ref": reference,
                "counts": {
                    DEFAULT_ORGANISM: { "allele_counts": allele_counts }
                }
            }
        }
    })
}
