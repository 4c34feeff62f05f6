//! Page view-model: what every region of the worksheet page currently shows.
//!
//! The controller mutates these types; `views.rs` renders them. Nothing here
//! talks to the network.

use tokio::time::{Duration, Instant};

use crate::domain::{Difficulty, DocumentLinks, HistoryEntry, Selection};

/// How long the copy button shows its acknowledgment.
pub const COPY_ACK_DURATION: Duration = Duration::from_millis(2000);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonPhase {
  Idle,
  Pending,
  Done,
}

/// A button that triggers one request at a time.
///
/// `Idle → Pending → Done` on success, `Pending → Idle` on failure.
/// `Pending` is only reachable from `Idle`; `Done` is terminal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionButton {
  phase: ButtonPhase,
  failed: bool,
}

impl Default for ActionButton {
  fn default() -> Self {
    Self { phase: ButtonPhase::Idle, failed: false }
  }
}

impl ActionButton {
  pub fn phase(&self) -> ButtonPhase {
    self.phase
  }

  pub fn is_enabled(&self) -> bool {
    self.phase == ButtonPhase::Idle
  }

  /// True when the last attempt failed and the button is waiting for a retry.
  pub fn has_failed(&self) -> bool {
    self.failed && self.phase == ButtonPhase::Idle
  }

  /// Enter `Pending`. Returns false (and changes nothing) unless idle.
  pub fn begin(&mut self) -> bool {
    if self.phase != ButtonPhase::Idle {
      return false;
    }
    self.phase = ButtonPhase::Pending;
    true
  }

  pub fn succeed(&mut self) {
    if self.phase == ButtonPhase::Pending {
      self.phase = ButtonPhase::Done;
      self.failed = false;
    }
  }

  pub fn fail(&mut self) {
    if self.phase == ButtonPhase::Pending {
      self.phase = ButtonPhase::Idle;
      self.failed = true;
    }
  }
}

/// Inline status next to a button: spinner or error.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum InlineStatus {
  #[default]
  Empty,
  Busy,
  /// Full user-facing message, prefix included.
  Failed(String),
}

/// Variant 2 controls: difficulty select, button, status and result.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VariantPanel {
  pub difficulty: Difficulty,
  pub button: ActionButton,
  pub status: InlineStatus,
  pub document: Option<DocumentLinks>,
}

/// Everything shown after a successful intake.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Workspace {
  /// Form snapshot taken at upload time, reused by later steps.
  pub selection: Selection,
  /// Contents of the source editor; the user may edit it.
  pub editor: String,
  pub compile: ActionButton,
  pub compile_status: InlineStatus,
  /// Variant 1 download links.
  pub variant1: Option<DocumentLinks>,
  /// Revealed once variant 1 has a document.
  pub variant2: Option<VariantPanel>,
}

impl Workspace {
  pub fn new(selection: Selection, source: String) -> Self {
    Self {
      selection,
      editor: source,
      compile: ActionButton::default(),
      compile_status: InlineStatus::Empty,
      variant1: None,
      variant2: None,
    }
  }

  /// Record variant 1's document and reveal the variant 2 controls.
  pub fn set_variant1(&mut self, links: DocumentLinks) {
    self.variant1 = Some(links);
    if self.variant2.is_none() {
      self.variant2 = Some(VariantPanel::default());
    }
  }
}

/// The top status area fed by the upload zone.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum StatusArea {
  #[default]
  Empty,
  Processing,
  Failed(String),
  Ready(Box<Workspace>),
}

impl StatusArea {
  pub fn workspace(&self) -> Option<&Workspace> {
    match self {
      StatusArea::Ready(ws) => Some(ws),
      _ => None,
    }
  }

  pub fn workspace_mut(&mut self) -> Option<&mut Workspace> {
    match self {
      StatusArea::Ready(ws) => Some(ws),
      _ => None,
    }
  }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum HistoryArea {
  #[default]
  Loading,
  Loaded(Vec<HistoryEntry>),
  Failed(String),
}

/// State of the modal's copy button.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CopyFeedback {
  #[default]
  Ready,
  Copied { until: Instant },
  Failed,
}

impl CopyFeedback {
  pub fn copied_at(now: Instant) -> Self {
    CopyFeedback::Copied { until: now + COPY_ACK_DURATION }
  }

  /// Acknowledgment is shown while `now < until`.
  pub fn is_acknowledging(&self, now: Instant) -> bool {
    matches!(self, CopyFeedback::Copied { until } if now < *until)
  }

  pub fn label(&self, now: Instant) -> &'static str {
    match self {
      CopyFeedback::Failed => "Ошибка",
      _ if self.is_acknowledging(now) => "Скопировано!",
      _ => "Копировать",
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceModal {
  pub text: String,
  pub copy: CopyFeedback,
}

/// The whole page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Page {
  pub status: StatusArea,
  pub history: HistoryArea,
  modal: Option<SourceModal>,
}

impl Page {
  pub fn modal(&self) -> Option<&SourceModal> {
    self.modal.as_ref()
  }

  pub fn modal_mut(&mut self) -> Option<&mut SourceModal> {
    self.modal.as_mut()
  }

  /// Scrolling is disabled exactly while the modal is open.
  pub fn scroll_locked(&self) -> bool {
    self.modal.is_some()
  }

  /// Open the modal, replacing any open one.
  pub fn open_modal(&mut self, text: String) {
    self.modal = Some(SourceModal { text, copy: CopyFeedback::Ready });
  }

  /// Close the modal. Returns whether one was open.
  pub fn close_modal(&mut self) -> bool {
    self.modal.take().is_some()
  }
}
