//! Rendering of the page view-model into HTML.
//!
//! Pure functions: state in, `Html` out. Interactive elements carry a
//! `data-action` attribute naming the `PageEvent` they trigger; no inline
//! handlers are emitted.

use tokio::time::Instant;

use crate::domain::{Difficulty, DocumentLinks, HistoryEntry};
use crate::html::Html;
use crate::page::{
  ActionButton, ButtonPhase, HistoryArea, InlineStatus, Page, SourceModal, StatusArea, VariantPanel, Workspace,
};
use crate::util::format_created_at;

pub const PROCESSING_MESSAGE: &str = "Обработка... Пожалуйста, подождите.";
pub const INTAKE_SUCCESS_MESSAGE: &str = "Текст распознан! ✅";
pub const HISTORY_EMPTY_MESSAGE: &str = "История пуста. Создайте свой первый рабочий лист!";
pub const HISTORY_ERROR_PREFIX: &str = "Ошибка загрузки истории: ";

/// Third-party LaTeX editors linked from the modal.
pub const EXTERNAL_EDITORS: [(&str, &str); 3] = [
  ("https://www.overleaf.com/project", "Открыть в Overleaf"),
  ("https://papeeria.com/", "Открыть в Papeeria"),
  ("https://latexbase.com/", "LaTeX Base"),
];

#[derive(Clone, Copy)]
enum VariantNo {
  One,
  Two,
}

impl VariantNo {
  fn download_label(self) -> &'static str {
    match self {
      VariantNo::One => "Скачать Вариант 1",
      VariantNo::Two => "Скачать Вариант 2",
    }
  }

  fn keys_label(self) -> &'static str {
    match self {
      VariantNo::One => "Ответы В1",
      VariantNo::Two => "Ответы В2",
    }
  }
}

/// Full HTML document around the page regions.
pub fn render_document(page: &Page, now: Instant) -> Html {
  let mut h = Html::new();
  h.raw("<!DOCTYPE html>\n<html lang=\"ru\">\n<head>\n<meta charset=\"utf-8\">\n")
    .raw("<title>Генератор рабочих листов</title>\n</head>\n<body");
  if page.scroll_locked() {
    h.raw(" style=\"overflow: hidden;\"");
  }
  h.raw(">\n").append(render_page(page, now)).raw("\n</body>\n</html>\n");
  h
}

/// The three page regions: status, history, and the modal when open.
pub fn render_page(page: &Page, now: Instant) -> Html {
  let mut h = Html::new();
  h.raw("<div id=\"status\">").append(render_status(&page.status)).raw("</div>\n");
  h.raw("<div id=\"historyContainer\">").append(render_history(&page.history)).raw("</div>\n");
  if let Some(modal) = page.modal() {
    h.append(render_modal(modal, now));
  }
  h
}

pub fn render_status(status: &StatusArea) -> Html {
  let mut h = Html::new();
  match status {
    StatusArea::Empty => {}
    StatusArea::Processing => {
      h.raw("<p>").text(PROCESSING_MESSAGE).raw("</p><div class=\"loader\"></div>");
    }
    StatusArea::Failed(message) => {
      h.raw("<p class=\"error\">").text(message).raw("</p>");
    }
    StatusArea::Ready(ws) => {
      h.append(render_workspace(ws));
    }
  }
  h
}

fn render_workspace(ws: &Workspace) -> Html {
  let mut h = Html::new();
  h.raw("<p class=\"success\">").text(INTAKE_SUCCESS_MESSAGE).raw("</p>");
  h.raw("<div class=\"editor-container\"><div class=\"editor-header\"><span>")
    .raw("Редактор LaTeX (проверьте код перед печатью)</span></div>")
    .raw("<textarea id=\"latexEditorInput\" class=\"latex-textarea\" data-action=\"edit-source\">")
    .text(&ws.editor)
    .raw("</textarea></div>");

  h.raw("<div class=\"result-buttons\">");
  if ws.compile.phase() != ButtonPhase::Done {
    h.raw("<div class=\"action-group\">")
      .append(render_button(&ws.compile, "compilePdfBtn", "compile", "action-btn primary", "Сгенерировать PDF", "Компиляция..."))
      .raw("</div>");
  }

  h.raw("<div id=\"statusCompile\">").append(render_inline_status(&ws.compile_status));
  if let Some(links) = &ws.variant1 {
    h.append(render_links(links, VariantNo::One));
  }
  if let Some(panel) = &ws.variant2 {
    h.append(render_variant_controls(panel));
  }
  h.raw("</div>");

  h.raw("<div class=\"action-group\"><button id=\"showLatexBtn\" class=\"action-btn tertiary\" data-action=\"show-source\">")
    .raw("Код в отдельном окне</button></div>");

  h.raw("<div id=\"status2\">");
  if let Some(panel) = &ws.variant2 {
    h.append(render_inline_status(&panel.status));
    if let Some(links) = &panel.document {
      h.append(render_links(links, VariantNo::Two));
    }
  }
  h.raw("</div></div>");
  h
}

fn render_inline_status(status: &InlineStatus) -> Html {
  let mut h = Html::new();
  match status {
    InlineStatus::Empty => {}
    InlineStatus::Busy => {
      h.raw("<div class=\"loader small\"></div>");
    }
    InlineStatus::Failed(message) => {
      h.raw("<span class=\"error\">").text(message).raw("</span>");
    }
  }
  h
}

fn render_button(
  button: &ActionButton,
  id: &'static str,
  action: &'static str,
  class: &'static str,
  idle_label: &'static str,
  pending_label: &'static str,
) -> Html {
  let label = match button.phase() {
    ButtonPhase::Pending => pending_label,
    ButtonPhase::Done => "Готово!",
    ButtonPhase::Idle if button.has_failed() => "Ошибка",
    ButtonPhase::Idle => idle_label,
  };
  let mut h = Html::new();
  h.raw("<button").attr("id", id).attr("class", class).attr("data-action", action);
  if !button.is_enabled() {
    h.raw(" disabled");
  }
  h.raw(">").text(label).raw("</button>");
  h
}

fn render_links(links: &DocumentLinks, variant: VariantNo) -> Html {
  let mut h = Html::new();
  h.raw("<div class=\"action-group\">");
  h.raw("<a").href(&links.pdf_url).raw(" target=\"_blank\" class=\"action-btn primary\">")
    .text(variant.download_label())
    .raw("</a>");
  if let Some(keys) = &links.answer_key_url {
    h.raw("<a").href(keys).raw(" target=\"_blank\" class=\"action-btn tertiary\">")
      .text(variant.keys_label())
      .raw("</a>");
  }
  if let VariantNo::Two = variant {
    h.raw("<button class=\"action-btn tertiary\" data-action=\"show-variant2-source\">LaTeX Варианта 2</button>");
  }
  h.raw("</div>");
  h
}

fn render_variant_controls(panel: &VariantPanel) -> Html {
  let mut h = Html::new();
  h.raw("<div class=\"action-group variant-controls\">");
  h.raw("<select id=\"variantDifficulty\" class=\"topic-input\" data-action=\"select-difficulty\"");
  if !panel.button.is_enabled() {
    h.raw(" disabled");
  }
  h.raw(">");
  for d in Difficulty::ALL {
    h.raw("<option").attr("value", d.as_str());
    if d == panel.difficulty {
      h.raw(" selected");
    }
    h.raw(">").text(d.label()).raw("</option>");
  }
  h.raw("</select>");
  h.append(render_button(
    &panel.button,
    "genSimilarBtn",
    "generate-similar",
    "action-btn secondary",
    "Создать Вариант 2",
    "Генерация...",
  ));
  h.raw("</div>");
  h
}

pub fn render_history(history: &HistoryArea) -> Html {
  let mut h = Html::new();
  match history {
    HistoryArea::Loading => {}
    HistoryArea::Failed(message) => {
      h.raw("<p class=\"error\">").text(HISTORY_ERROR_PREFIX).text(message).raw("</p>");
    }
    HistoryArea::Loaded(entries) if entries.is_empty() => {
      h.raw("<p class=\"history-empty\">").text(HISTORY_EMPTY_MESSAGE).raw("</p>");
    }
    HistoryArea::Loaded(entries) => {
      for (index, entry) in entries.iter().enumerate() {
        h.append(render_history_row(index, entry));
      }
    }
  }
  h
}

fn non_empty(value: &Option<String>) -> Option<&str> {
  value.as_deref().filter(|s| !s.trim().is_empty())
}

fn render_history_row(index: usize, entry: &HistoryEntry) -> Html {
  let date = entry.created_at.as_deref().map(format_created_at).unwrap_or_default();
  let topic = non_empty(&entry.topic).unwrap_or("Без темы");
  let teacher = non_empty(&entry.teacher_name).unwrap_or("Не указан");

  let mut h = Html::new();
  h.raw("<div class=\"history-item\"><div class=\"history-info\"><h4>")
    .text(topic)
    .raw("</h4><p>")
    .text(&date)
    .text(" | Учитель: ")
    .text(teacher)
    .raw("</p></div><div class=\"history-actions\">");
  if let Some(pdf) = non_empty(&entry.pdf_url) {
    h.raw("<a").href(pdf).raw(" target=\"_blank\" class=\"action-btn primary\" title=\"Скачать PDF\">PDF</a>");
  }
  if let Some(keys) = non_empty(&entry.keys_url) {
    h.raw("<a").href(keys).raw(" target=\"_blank\" class=\"action-btn tertiary\" title=\"Скачать Ответы\">Ключи</a>");
  }
  h.raw("<button class=\"action-btn secondary\" title=\"Посмотреть код\" data-action=\"show-history-source\"")
    .attr("data-index", &index.to_string())
    .raw(">Код</button></div></div>");
  h
}

pub fn render_modal(modal: &SourceModal, now: Instant) -> Html {
  let mut h = Html::new();
  h.raw("<div class=\"latex-modal-overlay\" data-action=\"overlay\">")
    .raw("<div class=\"latex-modal\">")
    .raw("<div class=\"latex-modal-header\"><h3>LaTeX код документа</h3>")
    .raw("<button class=\"modal-close-btn\" data-action=\"close-modal\">&times;</button></div>")
    .raw("<div class=\"latex-modal-body\"><div class=\"latex-code-container\">")
    .raw("<div class=\"latex-code-header\"><span>document.tex</span>");
  h.raw("<button class=\"copy-btn");
  if modal.copy.is_acknowledging(now) {
    h.raw(" copied");
  }
  h.raw("\" data-action=\"copy-source\">").text(modal.copy.label(now)).raw("</button></div>");
  h.raw("<pre class=\"latex-code\" id=\"latexCodeContent\">").text(&modal.text).raw("</pre></div></div>");
  h.raw("<div class=\"latex-modal-footer\">");
  for (url, label) in EXTERNAL_EDITORS {
    h.raw("<a").href(url).raw(" target=\"_blank\" class=\"external-link-btn\">").text(label).raw("</a>");
  }
  h.raw("</div></div></div>");
  h
}
