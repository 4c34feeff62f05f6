//! worksheet-client · command-line host for the worksheet page
//!
//! - `run`: upload scans, compile variant 1, optionally generate variant 2
//! - `history`: render the most recent worksheets
//!
//! The rendered page goes to `--out` or stdout; logs go to stderr.
//!
//! Important env variables:
//!   BACKEND_URL           : backend base URL (default "http://127.0.0.1:3000")
//!   WORKSHEET_CONFIG_PATH : path to TOML config (backend, timeout, form defaults)
//!   LOG_LEVEL             : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT            : "pretty" (default) or "json"

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument};

use worksheet_client::api::WorksheetApi;
use worksheet_client::clipboard::MemoryClipboard;
use worksheet_client::config::ClientConfig;
use worksheet_client::controller::{PageController, PageEvent};
use worksheet_client::domain::{Difficulty, FormControls, Layout, Model, TaskCount, Upload};
use worksheet_client::page::{InlineStatus, StatusArea};
use worksheet_client::telemetry;

#[derive(Parser, Debug)]
#[command(name = "worksheet-client", version, about = "Generate printable worksheets from scanned pages")]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Upload scans, compile the worksheet and optionally a second variant.
  Run {
    /// Images or PDFs to recognise.
    #[arg(required = true)]
    files: Vec<PathBuf>,
    #[arg(long)]
    task_count: Option<TaskCount>,
    #[arg(long)]
    topic: Option<String>,
    #[arg(long)]
    teacher_name: Option<String>,
    #[arg(long)]
    model: Option<Model>,
    #[arg(long)]
    layout: Option<Layout>,
    /// Also generate variant 2 at this difficulty (easier, same, harder).
    #[arg(long)]
    variant: Option<Difficulty>,
    /// Write the rendered page here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
  },
  /// Render the most recent worksheets.
  History {
    #[arg(long)]
    out: Option<PathBuf>,
  },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();
  let cli = Cli::parse();
  let cfg = ClientConfig::load_from_env();

  let api = WorksheetApi::new(&cfg.backend_url, cfg.request_timeout())?;
  info!(target: "worksheet_client", backend = %api.base_url(), "Client ready");
  let form: FormControls = cfg.defaults.clone().into();
  let mut page = PageController::new(api, Arc::new(MemoryClipboard::default()), form)
    .with_history_limit(cfg.history_limit);

  match cli.command {
    Command::History { out } => {
      page.dispatch(PageEvent::Loaded).await;
      write_page(&page, out.as_deref()).await?;
    }
    Command::Run { files, task_count, topic, teacher_name, model, layout, variant, out } => {
      if let Some(n) = task_count {
        page.form.task_count = n;
      }
      if let Some(t) = topic {
        page.form.topic = t;
      }
      if let Some(t) = teacher_name {
        page.form.teacher_name = t;
      }
      if let Some(m) = model {
        page.form.model = m;
      }
      if let Some(l) = layout {
        page.form.layout = l;
      }

      page.dispatch(PageEvent::Loaded).await;
      let uploads = read_uploads(&files).await?;
      let outcome = run_pipeline(&mut page, uploads, variant).await;
      write_page(&page, out.as_deref()).await?;
      outcome?;
    }
  }
  Ok(())
}

/// Intake, then compile unless the backend already produced a document,
/// then the optional variant 2.
#[instrument(level = "info", skip_all, fields(files = uploads.len(), variant = ?variant))]
async fn run_pipeline(
  page: &mut PageController,
  uploads: Vec<Upload>,
  variant: Option<Difficulty>,
) -> Result<(), Box<dyn std::error::Error>> {
  page.dispatch(PageEvent::FilesSelected(uploads)).await;
  let ws = match &page.page().status {
    StatusArea::Ready(ws) => ws,
    StatusArea::Failed(message) => return Err(message.clone().into()),
    _ => return Err("intake produced no result".into()),
  };

  if ws.variant1.is_none() {
    page.dispatch(PageEvent::CompileClicked).await;
    if let Some(ws) = page.page().status.workspace() {
      if let InlineStatus::Failed(message) = &ws.compile_status {
        return Err(message.clone().into());
      }
    }
  }

  if let Some(difficulty) = variant {
    page.dispatch(PageEvent::DifficultySelected(difficulty)).await;
    page.dispatch(PageEvent::GenerateSimilarClicked).await;
    let panel = page.page().status.workspace().and_then(|ws| ws.variant2.as_ref());
    if let Some(panel) = panel {
      if let InlineStatus::Failed(message) = &panel.status {
        return Err(message.clone().into());
      }
    }
  }
  Ok(())
}

async fn read_uploads(paths: &[PathBuf]) -> Result<Vec<Upload>, Box<dyn std::error::Error>> {
  let mut uploads = Vec::with_capacity(paths.len());
  for path in paths {
    let bytes = tokio::fs::read(path).await.map_err(|e| format!("{}: {e}", path.display()))?;
    let file_name = path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_else(|| "upload".to_string());
    uploads.push(Upload { file_name, bytes, mime: guess_mime(path).map(str::to_string) });
  }
  Ok(uploads)
}

fn guess_mime(path: &Path) -> Option<&'static str> {
  let ext = path.extension()?.to_str()?.to_ascii_lowercase();
  match ext.as_str() {
    "jpg" | "jpeg" => Some("image/jpeg"),
    "png" => Some("image/png"),
    "webp" => Some("image/webp"),
    "pdf" => Some("application/pdf"),
    _ => None,
  }
}

async fn write_page(page: &PageController, out: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
  let html = page.render_document().into_string();
  match out {
    Some(path) => {
      tokio::fs::write(path, html).await?;
      info!(target: "worksheet_client", path = %path.display(), "Page written");
    }
    None => {
      let mut stdout = tokio::io::stdout();
      stdout.write_all(html.as_bytes()).await?;
      stdout.flush().await?;
    }
  }
  Ok(())
}
