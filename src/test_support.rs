// src/test_support.rs
//
// Local stand-in for an ERDDAP server, bound to an ephemeral port.

use serde_json::{json, Value};
use std::{
    convert::Infallible,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};
use url::Url;
use warp::{http::Response, Filter};

pub enum FakeReply {
    Json(Value),
    Raw(String),
    Status(u16),
    /// Respond with `Json` after a delay.
    Delayed(Duration, Value),
    /// One row whose dataset id is the 1-based request count.
    Numbered,
}

struct FakeState {
    reply: FakeReply,
    queries: Mutex<Vec<String>>,
    hits: AtomicUsize,
}

pub struct FakeErddap {
    /// Pass to `CatalogSource::new` as the ERDDAP base URL.
    pub base: Url,
    state: Arc<FakeState>,
}

impl FakeErddap {
    pub fn queries(&self) -> Vec<String> {
        self.state.queries.lock().unwrap().clone()
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }
}

pub fn sample_body() -> Value {
    json!({
        "table": {
            "columnNames": ["griddap", "Make A Graph", "Title", "Summary", "Institution", "Dataset ID"],
            "rows": [
                [
                    "https://example.org/erddap/griddap/sst",
                    "https://example.org/erddap/griddap/sst.graph",
                    "Sea Surface Temp",
                    "Daily <b>SST</b> analysis & anomalies.",
                    "NOAA National Centers for Environmental Information",
                    "sst"
                ],
                [
                    "https://example.org/erddap/griddap/chl",
                    "",
                    "Chlorophyll",
                    "Monthly chlorophyll.",
                    "NASA",
                    "chl"
                ]
            ]
        }
    })
}

pub fn numbered_body(n: usize) -> Value {
    json!({
        "table": {
            "columnNames": ["Dataset ID"],
            "rows": [[n.to_string()]]
        }
    })
}

pub async fn fake_erddap(reply: FakeReply) -> FakeErddap {
    let state = Arc::new(FakeState {
        reply,
        queries: Mutex::new(Vec::new()),
        hits: AtomicUsize::new(0),
    });

    let with_state = {
        let state = state.clone();
        warp::any().map(move || state.clone())
    };

    let route = warp::path!("erddap" / String / "index.json")
        .and(warp::query::raw().or(warp::any().map(String::new)).unify())
        .and(with_state)
        .and_then(|_catalog: String, query: String, state: Arc<FakeState>| async move {
            state.queries.lock().unwrap().push(query);
            let n = state.hits.fetch_add(1, Ordering::SeqCst) + 1;
            let (status, body) = match &state.reply {
                FakeReply::Json(v) => (200, v.to_string()),
                FakeReply::Raw(s) => (200, s.clone()),
                FakeReply::Status(code) => (*code, "{}".to_string()),
                FakeReply::Delayed(delay, v) => {
                    tokio::time::sleep(*delay).await;
                    (200, v.to_string())
                }
                FakeReply::Numbered => (200, numbered_body(n).to_string()),
            };
            let resp = Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(body)
                .unwrap();
            Ok::<_, Infallible>(resp)
        });

    let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);

    FakeErddap {
        base: Url::parse(&format!("http://{}/erddap", addr)).unwrap(),
        state,
    }
}

/// Poll `check` until it holds or `timeout` elapses.
pub async fn eventually(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
