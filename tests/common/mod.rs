// Stand-in for the Enigma API: an axum router on a background runtime.
#![allow(dead_code)]

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use tokio::{net::TcpListener, runtime::Runtime};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

pub const NYC_DATASET_ID: &str = "fa7ab996-fb43-4e86-80e7-f8e82ccba15f";
pub const NYC_DISPLAY_NAME: &str = "New York City, New York - Restaurant Inspections";
pub const NYC_SNAPSHOT_ID: &str = "7ef4b6d0-5c2e-4a7e-9e59-0c1c8a1f2b11";

pub const NYC_EXPORT_CSV: &str = "\
camis,dba,boro,zipcode,cuisine_description,score,grade
30075445,MORRIS PARK BAKE SHOP,Bronx,10462,Bakery,12,A
30112340,WENDY'S,Brooklyn,11225,Hamburgers,,
40356018,RIVIERA CATERERS,Brooklyn,11224,American,7,A
";

pub fn init_test_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,enigma_fetch=debug")),
        )
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

pub fn nyc_metadata(snapshot_id: &str) -> String {
    format!(
        r#"{{
            "id": "{NYC_DATASET_ID}",
            "display_name": "{NYC_DISPLAY_NAME}",
            "current_snapshot": {{"id": "{snapshot_id}", "row_count": 3}}
        }}"#
    )
}

#[derive(Debug, Clone)]
pub struct Canned {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Canned {
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: "application/json",
            body: body.into().into_bytes(),
        }
    }

    pub fn csv(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: "text/csv; charset=utf-8",
            body: body.into(),
        }
    }

    pub fn status(status: StatusCode) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: b"stub error".to_vec(),
        }
    }
}

impl IntoResponse for Canned {
    fn into_response(self) -> Response {
        (self.status, [(header::CONTENT_TYPE, self.content_type)], self.body).into_response()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Dataset,
    Export,
}

/// One request the router matched.
#[derive(Debug, Clone)]
pub struct Hit {
    pub endpoint: Endpoint,
    pub id: String,
    pub row_limit: Option<u32>,
    pub authorization: Option<String>,
}

#[derive(Deserialize)]
struct RowLimit {
    row_limit: u32,
}

#[derive(Clone, Default)]
struct StubState {
    datasets: Arc<Mutex<HashMap<String, Canned>>>,
    exports: Arc<Mutex<HashMap<String, Canned>>>,
    hits: Arc<Mutex<Vec<Hit>>>,
}

impl StubState {
    fn record(&self, endpoint: Endpoint, id: String, row_limit: Option<u32>, headers: &HeaderMap) {
        let authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        self.hits.lock().unwrap().push(Hit {
            endpoint,
            id,
            row_limit,
            authorization,
        });
    }
}

fn lookup(routes: &Mutex<HashMap<String, Canned>>, id: &str) -> Canned {
    routes
        .lock()
        .unwrap()
        .get(id)
        .cloned()
        .unwrap_or_else(|| Canned::status(StatusCode::NOT_FOUND))
}

// A missing or non-numeric `row_limit` is rejected by the `Query` extractor with 400.
async fn dataset_handler(
    State(state): State<StubState>,
    Path(dataset_id): Path<String>,
    Query(query): Query<RowLimit>,
    headers: HeaderMap,
) -> Canned {
    let canned = lookup(&state.datasets, &dataset_id);
    state.record(Endpoint::Dataset, dataset_id, Some(query.row_limit), &headers);
    canned
}

async fn export_handler(
    State(state): State<StubState>,
    Path(snapshot_id): Path<String>,
    headers: HeaderMap,
) -> Canned {
    let canned = lookup(&state.exports, &snapshot_id);
    state.record(Endpoint::Export, snapshot_id, None, &headers);
    canned
}

pub struct StubServer {
    base_url: String,
    state: StubState,
    _runtime: Runtime,
}

impl StubServer {
    pub fn start() -> Self {
        let runtime = Runtime::new().expect("stub runtime");
        let state = StubState::default();

        let app = Router::new()
            .route("/api/datasets/:dataset_id", get(dataset_handler))
            .route("/api/export/:snapshot_id", get(export_handler))
            .with_state(state.clone());

        let listener = runtime
            .block_on(TcpListener::bind("127.0.0.1:0"))
            .expect("bind stub listener");
        let addr = listener.local_addr().expect("stub addr");
        runtime.spawn(async move {
            axum::serve(listener, app).await.expect("stub server");
        });

        Self {
            base_url: format!("http://{addr}/api/"),
            state,
            _runtime: runtime,
        }
    }

    /// Base URL with the `/api/` prefix the real service uses.
    pub fn base_url(&self) -> String {
        self.base_url.clone()
    }

    pub fn dataset(&self, dataset_id: &str, canned: Canned) {
        self.state
            .datasets
            .lock()
            .unwrap()
            .insert(dataset_id.to_string(), canned);
    }

    pub fn export(&self, snapshot_id: &str, canned: Canned) {
        self.state
            .exports
            .lock()
            .unwrap()
            .insert(snapshot_id.to_string(), canned);
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.state.hits.lock().unwrap().clone()
    }
}
