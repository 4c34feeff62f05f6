//! Page controller: turns page events into backend calls and view-model updates.
//!
//! One controller per page load. It owns the page view-model and the latest
//! source text of variant 1 and variant 2; handlers take `&mut self` and await
//! their own request, so a button can never have two requests in flight.
//!
//! Failures are local: each one lands in the region of the control that
//! triggered it and leaves that control retryable.

use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use crate::api::{ApiError, SimilarRequest, WorksheetApi};
use crate::clipboard::Clipboard;
use crate::domain::{Difficulty, DocumentLinks, FormControls, Selection, Upload};
use crate::html::Html;
use crate::page::{CopyFeedback, HistoryArea, InlineStatus, Page, StatusArea, VariantPanel, Workspace};
use crate::protocol::CompileIn;
use crate::util::trunc_for_log;
use crate::views;

/// Number of history rows requested on page load.
pub const HISTORY_LIMIT: usize = 10;

pub const SOURCE_UNAVAILABLE: &str = "Код недоступен.";
pub const VARIANT2_SOURCE_UNAVAILABLE: &str = "LaTeX код недоступен";
const VARIANT2_COMPILE_ERROR_PREFIX: &str = "Ошибка компиляции В2: ";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Key {
  Escape,
  Other(String),
}

/// Where a click on the open modal landed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickTarget {
  Overlay,
  Panel,
}

/// Which source text a "show source" control refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceRef {
  /// The editor of the current workspace.
  Editor,
  /// The stored variant 2 source.
  Variant2,
  /// The stored text of the history row at this index.
  History(usize),
}

/// Everything the page can ask the controller to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageEvent {
  Loaded,
  FilesSelected(Vec<Upload>),
  SourceEdited(String),
  CompileClicked,
  DifficultySelected(Difficulty),
  GenerateSimilarClicked,
  ShowSource(SourceRef),
  OverlayClicked(ClickTarget),
  CloseModalClicked,
  KeyPressed(Key),
  CopyClicked,
}

pub struct PageController {
  api: WorksheetApi,
  clipboard: Arc<dyn Clipboard>,
  /// Current values of the form controls; the host keeps them in sync.
  pub form: FormControls,
  page: Page,
  variant1_source: String,
  variant2_source: Option<String>,
  history_limit: usize,
}

impl PageController {
  pub fn new(api: WorksheetApi, clipboard: Arc<dyn Clipboard>, form: FormControls) -> Self {
    Self {
      api,
      clipboard,
      form,
      page: Page::default(),
      variant1_source: String::new(),
      variant2_source: None,
      history_limit: HISTORY_LIMIT,
    }
  }

  pub fn with_history_limit(mut self, limit: usize) -> Self {
    self.history_limit = limit;
    self
  }

  pub fn page(&self) -> &Page {
    &self.page
  }

  /// Source text returned by the last successful intake.
  pub fn variant1_source(&self) -> &str {
    &self.variant1_source
  }

  /// Source text of the last generated variant 2.
  pub fn variant2_source(&self) -> Option<&str> {
    self.variant2_source.as_deref()
  }

  pub fn render(&self) -> Html {
    views::render_page(&self.page, Instant::now())
  }

  pub fn render_document(&self) -> Html {
    views::render_document(&self.page, Instant::now())
  }

  #[instrument(level = "debug", skip(self, event))]
  pub async fn dispatch(&mut self, event: PageEvent) {
    match event {
      PageEvent::Loaded => self.load_history().await,
      PageEvent::FilesSelected(files) => self.submit_intake(files).await,
      PageEvent::SourceEdited(text) => self.edit_source(text),
      PageEvent::CompileClicked => self.compile().await,
      PageEvent::DifficultySelected(d) => self.select_difficulty(d),
      PageEvent::GenerateSimilarClicked => self.generate_similar().await,
      PageEvent::ShowSource(which) => self.show_source(which),
      PageEvent::OverlayClicked(target) => self.overlay_clicked(target),
      PageEvent::CloseModalClicked => self.close_modal(),
      PageEvent::KeyPressed(key) => self.key_pressed(&key),
      PageEvent::CopyClicked => self.copy_source().await,
    }
  }

  /// Fetch the most recent worksheets into the history area.
  #[instrument(level = "info", skip(self), fields(limit = self.history_limit))]
  pub async fn load_history(&mut self) {
    self.page.history = HistoryArea::Loading;
    self.page.history = match self.api.history(self.history_limit).await {
      Ok(entries) => {
        info!(target: "worksheet_client", rows = entries.len(), "History loaded");
        HistoryArea::Loaded(entries)
      }
      Err(e) => {
        warn!(target: "worksheet_client", error = %e, "History failed to load");
        HistoryArea::Failed(e.message().to_string())
      }
    };
  }

  /// Upload the picked files. Zero files does nothing.
  #[instrument(level = "info", skip(self, files), fields(files = files.len()))]
  pub async fn submit_intake(&mut self, files: Vec<Upload>) {
    if files.is_empty() {
      debug!(target: "worksheet_client", "No files selected; intake skipped");
      return;
    }
    let selection = Selection::read(&self.form);
    self.page.status = StatusArea::Processing;

    match self.api.process(&files, &selection).await {
      Ok(out) => {
        let source = out.source_text();
        info!(target: "worksheet_client", source_len = source.len(), has_pdf = out.pdf_url.is_some(), "Intake succeeded");
        self.variant1_source = source.clone();
        let mut ws = Workspace::new(selection, source);
        if let Some(pdf_url) = out.pdf_url.filter(|u| !u.trim().is_empty()) {
          ws.set_variant1(DocumentLinks { pdf_url, answer_key_url: None });
        }
        self.page.status = StatusArea::Ready(Box::new(ws));
      }
      Err(e) => {
        error!(target: "worksheet_client", error = %trunc_for_log(&e.to_string(), 200), "Intake failed");
        self.page.status = StatusArea::Failed(e.to_string());
      }
    }
  }

  pub fn edit_source(&mut self, text: String) {
    if let Some(ws) = self.page.status.workspace_mut() {
      ws.editor = text;
    }
  }

  pub fn select_difficulty(&mut self, difficulty: Difficulty) {
    if let Some(panel) = self.variant_panel_mut() {
      panel.difficulty = difficulty;
    }
  }

  /// Compile the editor contents as variant 1.
  #[instrument(level = "info", skip(self))]
  pub async fn compile(&mut self) {
    let layout = self.form.layout;
    let Some(ws) = self.page.status.workspace_mut() else {
      debug!(target: "worksheet_client", "Compile ignored: nothing recognised yet");
      return;
    };
    if !ws.compile.begin() {
      debug!(target: "worksheet_client", phase = ?ws.compile.phase(), "Compile ignored: button not idle");
      return;
    }
    ws.compile_status = InlineStatus::Busy;
    let body = CompileIn {
      latex_code: ws.editor.clone(),
      topic: ws.selection.topic.clone(),
      teacher_name: ws.selection.teacher_name.clone(),
      is_variant2: false,
      layout,
    };

    let result = self.api.compile(&body).await;

    let Some(ws) = self.page.status.workspace_mut() else { return };
    match result {
      Ok(out) => {
        info!(target: "worksheet_client", pdf_url = %out.pdf_url, has_keys = out.keys_url.is_some(), "Variant 1 compiled");
        ws.compile.succeed();
        ws.compile_status = InlineStatus::Empty;
        ws.set_variant1(out.into());
      }
      Err(e) => {
        warn!(target: "worksheet_client", error = %e, "Variant 1 compile failed");
        ws.compile.fail();
        ws.compile_status = InlineStatus::Failed(e.to_string());
      }
    }
  }

  /// Generate variant 2 from the editor contents, compiling it if the
  /// backend did not already.
  #[instrument(level = "info", skip(self))]
  pub async fn generate_similar(&mut self) {
    let Some(ws) = self.page.status.workspace_mut() else {
      debug!(target: "worksheet_client", "Generate ignored: nothing recognised yet");
      return;
    };
    let original_text = ws.editor.clone();
    let selection = ws.selection.clone();
    let Some(panel) = ws.variant2.as_mut() else {
      debug!(target: "worksheet_client", "Generate ignored: variant 1 has no document yet");
      return;
    };
    if !panel.button.begin() {
      debug!(target: "worksheet_client", phase = ?panel.button.phase(), "Generate ignored: button not idle");
      return;
    }
    panel.status = InlineStatus::Busy;
    let difficulty = panel.difficulty;

    let request = SimilarRequest { original_text: &original_text, difficulty, selection: &selection };
    let generated = match self.api.generate_similar(&request).await {
      Ok(g) => g,
      Err(e) => {
        warn!(target: "worksheet_client", error = %e, %difficulty, "Variant 2 generation failed");
        self.fail_variant2(e.to_string());
        return;
      }
    };

    let source = generated.latex_code.unwrap_or_default();
    self.variant2_source = Some(source.clone());

    let links = match generated.pdf_url.filter(|u| !u.trim().is_empty()) {
      Some(pdf_url) => DocumentLinks { pdf_url, answer_key_url: generated.keys_url },
      None => {
        let body = CompileIn {
          latex_code: source,
          topic: selection.topic.clone(),
          teacher_name: selection.teacher_name.clone(),
          is_variant2: true,
          layout: self.form.layout,
        };
        match self.api.compile(&body).await {
          Ok(out) => out.into(),
          Err(e) => {
            warn!(target: "worksheet_client", error = %e, "Variant 2 compile failed");
            self.fail_variant2(variant2_compile_message(&e));
            return;
          }
        }
      }
    };

    info!(target: "worksheet_client", pdf_url = %links.pdf_url, %difficulty, "Variant 2 ready");
    if let Some(panel) = self.variant_panel_mut() {
      panel.button.succeed();
      panel.status = InlineStatus::Empty;
      panel.document = Some(links);
    }
  }

  fn fail_variant2(&mut self, message: String) {
    if let Some(panel) = self.variant_panel_mut() {
      panel.button.fail();
      panel.status = InlineStatus::Failed(message);
    }
  }

  fn variant_panel_mut(&mut self) -> Option<&mut VariantPanel> {
    self.page.status.workspace_mut().and_then(|ws| ws.variant2.as_mut())
  }

  /// Open the source modal for the referenced text.
  pub fn show_source(&mut self, which: SourceRef) {
    let text = match which {
      SourceRef::Editor => match self.page.status.workspace() {
        Some(ws) if !ws.editor.is_empty() => ws.editor.clone(),
        Some(_) => SOURCE_UNAVAILABLE.to_string(),
        None => return,
      },
      SourceRef::Variant2 => match self.variant2_source.as_deref() {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => VARIANT2_SOURCE_UNAVAILABLE.to_string(),
      },
      SourceRef::History(index) => match &self.page.history {
        HistoryArea::Loaded(entries) => match entries.get(index) {
          Some(entry) => entry.latex_code.clone().unwrap_or_default(),
          None => return,
        },
        _ => return,
      },
    };
    debug!(target: "worksheet_client", ?which, text_len = text.len(), "Source modal opened");
    self.page.open_modal(text);
  }

  /// Clicks inside the panel do not close the modal.
  pub fn overlay_clicked(&mut self, target: ClickTarget) {
    if target == ClickTarget::Overlay {
      self.close_modal();
    }
  }

  pub fn close_modal(&mut self) {
    if self.page.close_modal() {
      debug!(target: "worksheet_client", "Source modal closed");
    }
  }

  pub fn key_pressed(&mut self, key: &Key) {
    if *key == Key::Escape {
      self.close_modal();
    }
  }

  /// Copy the modal's text. Only the copy button reflects the outcome.
  #[instrument(level = "debug", skip(self))]
  pub async fn copy_source(&mut self) {
    let Some(text) = self.page.modal().map(|m| m.text.clone()) else { return };
    let result = self.clipboard.write_text(&text).await;
    let Some(modal) = self.page.modal_mut() else { return };
    modal.copy = match result {
      Ok(()) => CopyFeedback::copied_at(Instant::now()),
      Err(e) => {
        error!(target: "worksheet_client", error = %e, "Failed to copy");
        CopyFeedback::Failed
      }
    };
  }
}

fn variant2_compile_message(e: &ApiError) -> String {
  match e {
    ApiError::Server { message, .. } => format!("{VARIANT2_COMPILE_ERROR_PREFIX}{message}"),
    ApiError::Transport(_) => e.to_string(),
  }
}
