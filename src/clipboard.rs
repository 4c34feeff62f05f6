//! Clipboard access for the modal's copy button.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("clipboard unavailable: {0}")]
pub struct ClipboardError(pub String);

#[async_trait]
pub trait Clipboard: Send + Sync {
  async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Process-local clipboard. The CLI host and the tests use it.
#[derive(Clone, Default)]
pub struct MemoryClipboard {
  contents: Arc<Mutex<Option<String>>>,
}

impl MemoryClipboard {
  pub async fn contents(&self) -> Option<String> {
    self.contents.lock().await.clone()
  }
}

#[async_trait]
impl Clipboard for MemoryClipboard {
  async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
    *self.contents.lock().await = Some(text.to_string());
    Ok(())
  }
}

/// A clipboard that refuses every write, as browsers do without permission.
#[derive(Clone, Copy, Default)]
pub struct DeniedClipboard;

#[async_trait]
impl Clipboard for DeniedClipboard {
  async fn write_text(&self, _text: &str) -> Result<(), ClipboardError> {
    Err(ClipboardError("write permission denied".into()))
  }
}
