//! In-process stand-in for the worksheet backend, used by the tests.
//!
//! Each endpoint answers with a canned reply and records what it received.
//! Unconfigured endpoints answer 500 with an `error` body.

use std::{collections::HashMap, sync::Arc};

use axum::{
  extract::{Multipart, Query},
  http::StatusCode,
  response::{IntoResponse, Response},
  routing::{get, post},
  Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::Mutex};

use crate::protocol::{COMPILE_PATH, GENERATE_SIMILAR_PATH, HISTORY_PATH, PROCESS_PATH};

#[derive(Clone, Debug)]
pub struct RecordedFile {
  pub field: String,
  pub file_name: String,
  pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, Default)]
pub struct RecordedCall {
  pub path: &'static str,
  pub fields: HashMap<String, String>,
  pub files: Vec<RecordedFile>,
  pub json: Option<Value>,
  pub query: HashMap<String, String>,
}

#[derive(Clone)]
enum Reply {
  Json(StatusCode, Value),
  Raw(StatusCode, &'static str),
}

#[derive(Default)]
struct Inner {
  replies: HashMap<&'static str, Reply>,
  calls: Vec<RecordedCall>,
}

#[derive(Clone, Default)]
pub struct MockBackend {
  inner: Arc<Mutex<Inner>>,
}

impl MockBackend {
  pub async fn reply(&self, path: &'static str, status: u16, body: Value) {
    let status = StatusCode::from_u16(status).expect("status");
    self.inner.lock().await.replies.insert(path, Reply::Json(status, body));
  }

  pub async fn reply_raw(&self, path: &'static str, status: u16, body: &'static str) {
    let status = StatusCode::from_u16(status).expect("status");
    self.inner.lock().await.replies.insert(path, Reply::Raw(status, body));
  }

  pub async fn calls(&self) -> Vec<RecordedCall> {
    self.inner.lock().await.calls.clone()
  }

  pub async fn calls_to(&self, path: &str) -> Vec<RecordedCall> {
    self.calls().await.into_iter().filter(|c| c.path == path).collect()
  }

  /// Serve on an ephemeral local port and return its base URL.
  pub async fn spawn(&self) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");

    let (m1, m2, m3, m4) = (self.clone(), self.clone(), self.clone(), self.clone());
    let app = Router::new()
      .route(PROCESS_PATH, post(move |mp: Multipart| record_multipart(m1.clone(), PROCESS_PATH, mp)))
      .route(
        GENERATE_SIMILAR_PATH,
        post(move |mp: Multipart| record_multipart(m2.clone(), GENERATE_SIMILAR_PATH, mp)),
      )
      .route(COMPILE_PATH, post(move |Json(body): Json<Value>| record_json(m3.clone(), body)))
      .route(
        HISTORY_PATH,
        get(move |Query(q): Query<HashMap<String, String>>| record_query(m4.clone(), q)),
      );

    tokio::spawn(async move {
      let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
  }

  async fn answer(&self, call: RecordedCall) -> Response {
    let mut inner = self.inner.lock().await;
    let reply = inner.replies.get(call.path).cloned();
    inner.calls.push(call);
    match reply {
      Some(Reply::Json(status, body)) => (status, Json(body)).into_response(),
      Some(Reply::Raw(status, body)) => (status, body).into_response(),
      None => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "no reply configured"}))).into_response(),
    }
  }
}

async fn record_multipart(mock: MockBackend, path: &'static str, mut mp: Multipart) -> Response {
  let mut call = RecordedCall { path, ..Default::default() };
  while let Ok(Some(field)) = mp.next_field().await {
    let name = field.name().unwrap_or_default().to_string();
    let file_name = field.file_name().map(str::to_string);
    let bytes = field.bytes().await.unwrap_or_default().to_vec();
    match file_name {
      Some(file_name) => call.files.push(RecordedFile { field: name, file_name, bytes }),
      None => {
        call.fields.insert(name, String::from_utf8_lossy(&bytes).into_owned());
      }
    }
  }
  mock.answer(call).await
}

async fn record_json(mock: MockBackend, body: Value) -> Response {
  let call = RecordedCall { path: COMPILE_PATH, json: Some(body), ..Default::default() };
  mock.answer(call).await
}

async fn record_query(mock: MockBackend, query: HashMap<String, String>) -> Response {
  let call = RecordedCall { path: HISTORY_PATH, query, ..Default::default() };
  mock.answer(call).await
}

/// Base URL of a port nobody listens on.
pub async fn closed_port_url() -> String {
  let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
  let addr = listener.local_addr().expect("addr");
  drop(listener);
  format!("http://{addr}")
}
