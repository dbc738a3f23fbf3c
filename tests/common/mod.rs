//! Shared fixtures: an in-process upstream tile server

#![allow(dead_code)]

use axum::{Router, body::Bytes, extract::State, http::StatusCode};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tileingest::fetch::{HttpClient, HttpConfig};
use tileingest::ingest::Ingestor;
use tileingest::storage::StorageClient;
use tokio::net::TcpListener;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone)]
struct UpstreamState {
    hits: Arc<AtomicUsize>,
    response: Arc<Mutex<(StatusCode, Bytes)>>,
}

/// Handle to a running upstream; every path answers with the current response
pub struct Upstream {
    pub base_url: String,
    state: UpstreamState,
}

impl Upstream {
    pub async fn start(status: StatusCode, body: &'static [u8]) -> Self {
        let state = UpstreamState {
            hits: Arc::new(AtomicUsize::new(0)),
            response: Arc::new(Mutex::new((status, Bytes::from_static(body)))),
        };

        let app = Router::new().fallback(respond).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn respond_with(&self, status: StatusCode, body: &'static [u8]) {
        *self.state.response.lock().unwrap() = (status, Bytes::from_static(body));
    }
}

async fn respond(State(state): State<UpstreamState>) -> (StatusCode, Bytes) {
    state.hits.fetch_add(1, Ordering::SeqCst);
    state.response.lock().unwrap().clone()
}

pub fn ingestor_with(storage: StorageClient) -> Ingestor {
    Ingestor::new(HttpClient::new(HttpConfig::default()).unwrap(), storage)
}

/// In-memory sink for formatted log lines
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
