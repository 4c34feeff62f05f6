//! HTTP client for the worksheet backend.
//!
//! Four endpoints: process (multipart upload), compile (JSON), generate_similar
//! (multipart form) and history (GET). Calls are instrumented and log the
//! endpoint, status, latency and payload sizes, never the payloads themselves.
//!
//! Any 2xx status is success. A non-2xx response yields `ApiError::Server`
//! carrying the body's `error` field verbatim; everything that prevents us
//! from getting a decodable body (connect failure, timeout, bad JSON) is
//! `ApiError::Transport`.

use std::time::{Duration, Instant};

use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::domain::{Difficulty, HistoryEntry, Selection, Upload};
use crate::protocol::*;

const CLIENT_USER_AGENT: &str = concat!("worksheet-client/", env!("CARGO_PKG_VERSION"));

/// The two ways a request can fail. `Display` is the message shown on the page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
  /// The backend answered with a non-2xx status.
  #[error("Ошибка: {message}")]
  Server { status: u16, message: String },
  /// The request never produced a usable response.
  #[error("Ошибка сети: {0}")]
  Transport(String),
}

impl ApiError {
  /// The bare message, without the user-facing prefix.
  pub fn message(&self) -> &str {
    match self {
      ApiError::Server { message, .. } => message,
      ApiError::Transport(message) => message,
    }
  }

  pub fn is_transport(&self) -> bool {
    matches!(self, ApiError::Transport(_))
  }
}

impl From<reqwest::Error> for ApiError {
  fn from(e: reqwest::Error) -> Self {
    ApiError::Transport(e.to_string())
  }
}

/// Fields of a generate-similar request besides the selection snapshot.
#[derive(Debug, Clone)]
pub struct SimilarRequest<'a> {
  pub original_text: &'a str,
  pub difficulty: Difficulty,
  pub selection: &'a Selection,
}

#[derive(Clone)]
pub struct WorksheetApi {
  client: reqwest::Client,
  base_url: Url,
}

impl WorksheetApi {
  /// Build a client for the backend at `base_url` (e.g. `http://127.0.0.1:3000`).
  pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
    let mut base_url = Url::parse(base_url)
      .map_err(|e| ApiError::Transport(format!("invalid backend url {base_url:?}: {e}")))?;
    // Endpoints are joined relative to the base, so a path prefix must end in '/'.
    if !base_url.path().ends_with('/') {
      let path = format!("{}/", base_url.path());
      base_url.set_path(&path);
    }
    let builder = reqwest::Client::builder()
      .timeout(timeout)
      .user_agent(CLIENT_USER_AGENT);
    #[cfg(test)]
    let builder = builder.no_proxy();
    let client = builder.build()?;
    Ok(Self { client, base_url })
  }

  pub fn base_url(&self) -> &Url {
    &self.base_url
  }

  fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
    self.base_url
      .join(path.trim_start_matches('/'))
      .map_err(|e| ApiError::Transport(format!("invalid endpoint {path}: {e}")))
  }

  /// Upload the picked files with the selection snapshot.
  #[instrument(
    level = "info",
    skip(self, files, selection),
    fields(files = files.len(), bytes = files.iter().map(|f| f.bytes.len()).sum::<usize>(), task_count = %selection.task_count, model = %selection.model)
  )]
  pub async fn process(&self, files: &[Upload], selection: &Selection) -> Result<ProcessOut, ApiError> {
    let mut form = Form::new();
    for f in files {
      let mut part = Part::bytes(f.bytes.clone()).file_name(f.file_name.clone());
      if let Some(mime) = &f.mime {
        part = part.mime_str(mime)?;
      }
      form = form.part("files", part);
    }
    let form = form
      .text("task_count", selection.task_count.to_string())
      .text("topic", selection.topic.clone())
      .text("teacher_name", selection.teacher_name.clone())
      .text("model", selection.model.as_str());

    let url = self.endpoint(PROCESS_PATH)?;
    let start = Instant::now();
    let res = self.client.post(url).header(ACCEPT, "application/json").multipart(form).send().await;
    finish(PROCESS_PATH, start, res).await
  }

  /// Compile LaTeX into a PDF (and, when the source has answers, an answer key).
  #[instrument(level = "info", skip(self, body), fields(latex_len = body.latex_code.len(), is_variant2 = body.is_variant2, layout = %body.layout.as_str()))]
  pub async fn compile(&self, body: &CompileIn) -> Result<CompileOut, ApiError> {
    let url = self.endpoint(COMPILE_PATH)?;
    let start = Instant::now();
    let res = self.client.post(url).header(ACCEPT, "application/json").json(body).send().await;
    finish(COMPILE_PATH, start, res).await
  }

  /// Ask for a second variant derived from `original_text`.
  #[instrument(level = "info", skip(self, req), fields(text_len = req.original_text.len(), difficulty = %req.difficulty, model = %req.selection.model))]
  pub async fn generate_similar(&self, req: &SimilarRequest<'_>) -> Result<GenerateSimilarOut, ApiError> {
    let sel = req.selection;
    let form = Form::new()
      .text("original_text", req.original_text.to_string())
      .text("difficulty", req.difficulty.as_str())
      .text("task_count", sel.task_count.to_string())
      .text("model", sel.model.as_str())
      .text("topic", sel.topic.clone())
      .text("teacher_name", sel.teacher_name.clone());

    let url = self.endpoint(GENERATE_SIMILAR_PATH)?;
    let start = Instant::now();
    let res = self.client.post(url).header(ACCEPT, "application/json").multipart(form).send().await;
    finish(GENERATE_SIMILAR_PATH, start, res).await
  }

  /// Most recent worksheets, newest first, at most `limit`.
  #[instrument(level = "info", skip(self))]
  pub async fn history(&self, limit: usize) -> Result<Vec<HistoryEntry>, ApiError> {
    let url = self.endpoint(HISTORY_PATH)?;
    let start = Instant::now();
    let res = self.client.get(url).header(ACCEPT, "application/json").query(&[("limit", limit)]).send().await;
    let out: HistoryOut = finish(HISTORY_PATH, start, res).await?;
    Ok(out.history)
  }
}

/// Turn a send result into a typed body or an `ApiError`, logging the outcome.
async fn finish<T: DeserializeOwned>(
  endpoint: &'static str,
  start: Instant,
  res: Result<reqwest::Response, reqwest::Error>,
) -> Result<T, ApiError> {
  let res = match res {
    Ok(r) => r,
    Err(e) => {
      error!(%endpoint, elapsed = ?start.elapsed(), error = %e, "Request failed before a response arrived");
      return Err(e.into());
    }
  };
  let status = res.status();
  let body = res.bytes().await?;
  let elapsed = start.elapsed();

  if status.is_success() {
    info!(%endpoint, status = status.as_u16(), ?elapsed, body_len = body.len(), "Backend call succeeded");
    return serde_json::from_slice::<T>(&body).map_err(|e| {
      error!(%endpoint, error = %e, "Success body is not the expected JSON");
      ApiError::Transport(format!("invalid JSON response: {e}"))
    });
  }

  let parsed: ErrorOut = serde_json::from_slice(&body).map_err(|e| {
    error!(%endpoint, status = status.as_u16(), error = %e, "Error body is not JSON");
    ApiError::Transport(format!("invalid JSON response: {e}"))
  })?;
  let message = parsed.error.unwrap_or_else(|| status.to_string());
  warn!(%endpoint, status = status.as_u16(), ?elapsed, %message, "Backend reported an error");
  Err(ApiError::Server { status: status.as_u16(), message })
}

/// Default request timeout; generation on the backend can take minutes.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);
