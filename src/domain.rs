//! Domain models for the worksheet page: form selection, generated documents,
//! and the read-only history entries served by the backend.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Topic used whenever the topic field is left empty.
pub const DEFAULT_TOPIC: &str = "Рабочий лист";

/// Number of tasks per page requested from the generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct TaskCount(u8);

impl TaskCount {
  pub const MIN: u8 = 1;
  pub const MAX: u8 = 10;

  pub fn new(n: u8) -> Option<Self> {
    (Self::MIN..=Self::MAX).contains(&n).then_some(Self(n))
  }

  pub fn get(self) -> u8 { self.0 }
}

impl Default for TaskCount {
  fn default() -> Self { Self(3) }
}

impl TryFrom<u8> for TaskCount {
  type Error = String;
  fn try_from(n: u8) -> Result<Self, Self::Error> {
    Self::new(n).ok_or_else(|| format!("task count must be {}..={}, got {n}", Self::MIN, Self::MAX))
  }
}

impl From<TaskCount> for u8 {
  fn from(t: TaskCount) -> u8 { t.0 }
}

impl FromStr for TaskCount {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let n: u8 = s.trim().parse().map_err(|_| format!("invalid task count: {s:?}"))?;
    Self::try_from(n)
  }
}

impl fmt::Display for TaskCount {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Generator model offered on the page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Model {
  #[serde(rename = "GigaChat")]
  GigaChat,
  #[serde(rename = "GigaChat-Pro")]
  GigaChatPro,
  #[default]
  #[serde(rename = "GigaChat-Max")]
  GigaChatMax,
}

impl Model {
  pub const ALL: [Model; 3] = [Model::GigaChat, Model::GigaChatPro, Model::GigaChatMax];

  pub fn as_str(self) -> &'static str {
    match self {
      Model::GigaChat => "GigaChat",
      Model::GigaChatPro => "GigaChat-Pro",
      Model::GigaChatMax => "GigaChat-Max",
    }
  }
}

/// Page layout of the compiled PDF.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layout {
  #[default]
  #[serde(rename = "1col")]
  OneColumn,
  #[serde(rename = "2col")]
  TwoColumns,
}

impl Layout {
  pub const ALL: [Layout; 2] = [Layout::OneColumn, Layout::TwoColumns];

  pub fn as_str(self) -> &'static str {
    match self {
      Layout::OneColumn => "1col",
      Layout::TwoColumns => "2col",
    }
  }
}

/// Difficulty of variant 2 relative to variant 1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  Easier,
  #[default]
  Same,
  Harder,
}

impl Difficulty {
  pub const ALL: [Difficulty; 3] = [Difficulty::Same, Difficulty::Easier, Difficulty::Harder];

  pub fn as_str(self) -> &'static str {
    match self {
      Difficulty::Easier => "easier",
      Difficulty::Same => "same",
      Difficulty::Harder => "harder",
    }
  }

  /// Label of the option in the difficulty select.
  pub fn label(self) -> &'static str {
    match self {
      Difficulty::Easier => "Сложность: Проще",
      Difficulty::Same => "Сложность: Такая же",
      Difficulty::Harder => "Сложность: Сложнее",
    }
  }
}

macro_rules! from_str_via_as_str {
  ($ty:ty, $what:literal) => {
    impl FromStr for $ty {
      type Err = String;
      fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
          .iter()
          .copied()
          .find(|v| v.as_str() == s)
          .ok_or_else(|| format!(concat!("unknown ", $what, ": {:?}"), s))
      }
    }

    impl fmt::Display for $ty {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
    }
  };
}

from_str_via_as_str!(Model, "model");
from_str_via_as_str!(Layout, "layout");
from_str_via_as_str!(Difficulty, "difficulty");

/// Raw values of the form controls as the user left them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormControls {
  pub task_count: TaskCount,
  pub topic: String,
  pub teacher_name: String,
  pub model: Model,
  pub layout: Layout,
}

/// Snapshot of the form taken when an upload is submitted.
///
/// Layout is not part of the snapshot: each compile reads it from the form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
  pub task_count: TaskCount,
  pub topic: String,
  pub teacher_name: String,
  pub model: Model,
}

impl Selection {
  /// Read the form, substituting defaults for empty text fields.
  pub fn read(form: &FormControls) -> Self {
    let topic = form.topic.trim();
    Self {
      task_count: form.task_count,
      topic: if topic.is_empty() { DEFAULT_TOPIC.to_string() } else { topic.to_string() },
      teacher_name: form.teacher_name.trim().to_string(),
      model: form.model,
    }
  }
}

/// A file picked in the upload zone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Upload {
  pub file_name: String,
  pub bytes: Vec<u8>,
  pub mime: Option<String>,
}

/// Download links of one compiled variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentLinks {
  pub pdf_url: String,
  pub answer_key_url: Option<String>,
}

/// One row of the server-side history. Never mutated by the client.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
  #[serde(default)] pub topic: Option<String>,
  #[serde(default)] pub created_at: Option<String>,
  #[serde(default)] pub teacher_name: Option<String>,
  #[serde(default)] pub pdf_url: Option<String>,
  #[serde(default)] pub keys_url: Option<String>,
  #[serde(default)] pub latex_code: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_topic_falls_back_to_default() {
    let form = FormControls { topic: "   ".into(), teacher_name: " Иванова ".into(), ..Default::default() };
    let sel = Selection::read(&form);
    assert_eq!(sel.topic, DEFAULT_TOPIC);
    assert_eq!(sel.teacher_name, "Иванова");
    assert_eq!(sel.model, Model::GigaChatMax);
  }

  #[test]
  fn task_count_is_bounded() {
    assert_eq!("10".parse::<TaskCount>().unwrap().get(), 10);
    assert!("0".parse::<TaskCount>().is_err());
    assert!("11".parse::<TaskCount>().is_err());
    assert!("ten".parse::<TaskCount>().is_err());
  }

  #[test]
  fn enums_parse_from_their_wire_values() {
    assert_eq!("GigaChat-Pro".parse::<Model>().unwrap(), Model::GigaChatPro);
    assert_eq!("2col".parse::<Layout>().unwrap(), Layout::TwoColumns);
    assert_eq!("harder".parse::<Difficulty>().unwrap(), Difficulty::Harder);
    assert!("hardest".parse::<Difficulty>().is_err());
    assert_eq!(serde_json::to_string(&Layout::OneColumn).unwrap(), "\"1col\"");
    assert_eq!(Difficulty::default(), Difficulty::Same);
  }
}
