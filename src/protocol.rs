//! Wire DTOs for the backend endpoints (serde ready).
//! Multipart requests are assembled in `api.rs`; only JSON shapes live here.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{DocumentLinks, HistoryEntry, Layout};

pub const PROCESS_PATH: &str = "/api/process";
pub const COMPILE_PATH: &str = "/api/compile";
pub const GENERATE_SIMILAR_PATH: &str = "/api/generate_similar";
pub const HISTORY_PATH: &str = "/api/history";

/// Body of `/api/process` on success.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ProcessOut {
    #[serde(default)]
    pub original_text: Option<String>,
    #[serde(default)]
    pub pdf_url: Option<String>,
    #[serde(default)]
    pub latex_code: Option<String>,
}

impl ProcessOut {
    /// The recognised source: generated LaTeX if present, otherwise the raw text.
    pub fn source_text(&self) -> String {
        self.latex_code
            .clone()
            .or_else(|| self.original_text.clone())
            .unwrap_or_default()
    }
}

/// JSON body of `/api/compile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileIn {
    pub latex_code: String,
    pub topic: String,
    pub teacher_name: String,
    pub is_variant2: bool,
    pub layout: Layout,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CompileOut {
    pub pdf_url: String,
    #[serde(default)]
    pub keys_url: Option<String>,
}

impl From<CompileOut> for DocumentLinks {
    fn from(c: CompileOut) -> Self {
        DocumentLinks { pdf_url: c.pdf_url, answer_key_url: c.keys_url }
    }
}

/// Body of `/api/generate_similar` on success. `pdf_url` is set when the
/// backend compiled the variant itself.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GenerateSimilarOut {
    #[serde(default)]
    pub latex_code: Option<String>,
    #[serde(default)]
    pub pdf_url: Option<String>,
    #[serde(default)]
    pub keys_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct HistoryOut {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub history: Vec<HistoryEntry>,
}

/// `null` and a missing field both mean "no entries".
fn null_as_empty<'de, D, T>(de: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(de)?.unwrap_or_default())
}

/// Failure body shared by every endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorOut {
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_source_prefers_latex() {
        let out: ProcessOut = serde_json::from_str(
            r#"{"original_text":"2+2","pdf_url":"/f1.pdf","latex_code":"\\documentclass{article}"}"#,
        )
        .unwrap();
        assert_eq!(out.source_text(), "\\documentclass{article}");

        let out: ProcessOut = serde_json::from_str(r#"{"original_text":"2+2"}"#).unwrap();
        assert_eq!(out.source_text(), "2+2");
        assert_eq!(ProcessOut::default().source_text(), "");
    }

    #[test]
    fn history_tolerates_null_and_missing_list() {
        let out: HistoryOut = serde_json::from_str(r#"{"history":null}"#).unwrap();
        assert!(out.history.is_empty());
        let out: HistoryOut = serde_json::from_str("{}").unwrap();
        assert!(out.history.is_empty());
    }

    #[test]
    fn compile_request_uses_wire_names() {
        let body = CompileIn {
            latex_code: "x".into(),
            topic: "Алгебра".into(),
            teacher_name: String::new(),
            is_variant2: true,
            layout: Layout::TwoColumns,
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["is_variant2"], true);
        assert_eq!(v["layout"], "2col");
    }
}
