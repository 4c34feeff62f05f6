//! Escape-by-default HTML building.
//!
//! `Html` only accepts markup as `&'static str`; every runtime string goes
//! through `text` or `attr`, which escape it. Server-supplied text therefore
//! cannot inject markup into the page.

use std::fmt;

/// Escape text for use in element content or a quoted attribute value.
pub fn escape(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for ch in text.chars() {
    match ch {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      _ => out.push(ch),
    }
  }
  out
}

/// A link target is kept only when it is a site-relative path or an http(s) URL.
pub fn safe_href(url: &str) -> &str {
  let trimmed = url.trim();
  let lower = trimmed.to_ascii_lowercase();
  let relative = trimmed.starts_with('/') && !trimmed.starts_with("//");
  if relative || lower.starts_with("https://") || lower.starts_with("http://") {
    trimmed
  } else {
    "#"
  }
}

/// Rendered markup. Cheap to concatenate; only ever holds escaped content.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Html(String);

impl Html {
  pub fn new() -> Self {
    Self::default()
  }

  /// Append trusted static markup.
  pub fn raw(&mut self, markup: &'static str) -> &mut Self {
    self.0.push_str(markup);
    self
  }

  /// Append text content, escaped.
  pub fn text(&mut self, text: &str) -> &mut Self {
    self.0.push_str(&escape(text));
    self
  }

  /// Append ` name="value"` with the value escaped.
  pub fn attr(&mut self, name: &'static str, value: &str) -> &mut Self {
    self.0.push(' ');
    self.0.push_str(name);
    self.0.push_str("=\"");
    self.0.push_str(&escape(value));
    self.0.push('"');
    self
  }

  /// Append ` href="..."`, replacing unsafe targets with `#`.
  pub fn href(&mut self, url: &str) -> &mut Self {
    self.attr("href", safe_href(url))
  }

  /// Append already-rendered markup.
  pub fn append(&mut self, other: Html) -> &mut Self {
    self.0.push_str(&other.0);
    self
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn into_string(self) -> String {
    self.0
  }
}

impl fmt::Display for Html {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn text_and_attributes_are_escaped() {
    let mut h = Html::new();
    h.raw("<p").attr("title", "a\"b").raw(">").text("<script>alert('x')</script> & co").raw("</p>");
    assert_eq!(
      h.as_str(),
      "<p title=\"a&quot;b\">&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; co</p>"
    );
  }

  #[test]
  fn latex_survives_escaping_unchanged_apart_from_entities() {
    assert_eq!(escape("\\frac{1}{2} < x"), "\\frac{1}{2} &lt; x");
  }

  #[test]
  fn only_relative_and_http_links_are_kept() {
    assert_eq!(safe_href("/generated/a.pdf"), "/generated/a.pdf");
    assert_eq!(safe_href("https://example.org/a.pdf"), "https://example.org/a.pdf");
    assert_eq!(safe_href("javascript:alert(1)"), "#");
    assert_eq!(safe_href(" JavaScript:alert(1)"), "#");
    assert_eq!(safe_href("//evil.example/a.pdf"), "#");
  }
}
