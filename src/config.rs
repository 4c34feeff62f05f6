//! Loading client configuration from TOML.
//!
//! WORKSHEET_CONFIG_PATH names the file; BACKEND_URL overrides the backend
//! address from the file. Every key is optional.
//!
//! ```toml
//! backend_url = "http://127.0.0.1:3000"
//! request_timeout_secs = 180
//! history_limit = 10
//!
//! [defaults]
//! task_count = 5
//! topic = "Дроби"
//! teacher_name = "Иванова"
//! model = "GigaChat-Pro"
//! layout = "2col"
//! ```

use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info};

use crate::controller::HISTORY_LIMIT;
use crate::domain::{FormControls, Layout, Model, TaskCount};

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:3000";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
  pub backend_url: String,
  pub request_timeout_secs: u64,
  pub history_limit: usize,
  pub defaults: FormDefaults,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      backend_url: DEFAULT_BACKEND_URL.into(),
      request_timeout_secs: 180,
      history_limit: HISTORY_LIMIT,
      defaults: FormDefaults::default(),
    }
  }
}

/// Initial values of the form controls.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FormDefaults {
  pub task_count: TaskCount,
  pub topic: String,
  pub teacher_name: String,
  pub model: Model,
  pub layout: Layout,
}

impl From<FormDefaults> for FormControls {
  fn from(d: FormDefaults) -> Self {
    FormControls {
      task_count: d.task_count,
      topic: d.topic,
      teacher_name: d.teacher_name,
      model: d.model,
      layout: d.layout,
    }
  }
}

impl ClientConfig {
  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.request_timeout_secs)
  }

  /// Parse a TOML document.
  pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
    toml::from_str(s)
  }

  /// Load from WORKSHEET_CONFIG_PATH and apply BACKEND_URL.
  /// Read or parse failures are logged and defaults are used.
  pub fn load_from_env() -> Self {
    let mut cfg = load_file_from_env().unwrap_or_default();
    if let Ok(url) = std::env::var("BACKEND_URL") {
      if !url.trim().is_empty() {
        cfg.backend_url = url.trim().to_string();
      }
    }
    cfg
  }
}

fn load_file_from_env() -> Option<ClientConfig> {
  let path = std::env::var("WORKSHEET_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match ClientConfig::from_toml(&s) {
      Ok(cfg) => {
        info!(target: "worksheet_client", %path, backend = %cfg.backend_url, "Loaded client config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "worksheet_client", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "worksheet_client", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
