//! Prompt templates for vidqa.
//!
//! The question-answering template can be replaced by pointing
//! `prompts.qa_path` at a text file.

use crate::error::{Result, VidqaError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Placeholders the QA template must contain.
pub const QA_PLACEHOLDERS: [&str; 2] = ["question", "context"];

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Prompts {
    /// Question-answering template with `{{question}}` and `{{context}}`.
    pub qa: String,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            qa: r#"You are a helpful assistant answering questions about a video using excerpts from its transcript.

Use only the context below to answer. If the context does not contain the answer, say that you don't know.

Context:
{{context}}

Question: {{question}}

Answer:"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts, replacing the QA template with the file at `qa_path` if given.
    pub fn load(qa_path: Option<&str>) -> Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(path) = qa_path {
            let path = PathBuf::from(shellexpand::tilde(path).to_string());
            let template = std::fs::read_to_string(&path)?;
            for name in QA_PLACEHOLDERS {
                if !template.contains(&format!("{{{{{}}}}}", name)) {
                    return Err(VidqaError::Config(format!(
                        "QA template {:?} is missing the {{{{{}}}}} placeholder",
                        path, name
                    )));
                }
            }
            prompts.qa = template;
        }

        Ok(prompts)
    }

    /// Render the QA template for a question and its retrieved context.
    pub fn render_qa(&self, question: &str, context: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        vars.insert("context".to_string(), context.to_string());
        Self::render(&self.qa, &vars)
    }

    /// Render a template with the given variables.
    ///
    /// Substitution is a single left-to-right pass: inserted values are never
    /// re-scanned, so `{{...}}` text inside a value is kept verbatim. Unknown
    /// placeholders are left untouched. Values are not escaped.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find("}}") {
                Some(end) => {
                    let key = &after[..end];
                    match vars.get(key) {
                        Some(value) => result.push_str(value),
                        None => {
                            result.push_str("{{");
                            result.push_str(key);
                            result.push_str("}}");
                        }
                    }
                    rest = &after[end + 2..];
                }
                None => {
                    result.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        result.push_str(rest);

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_qa_has_both_placeholders() {
        let prompts = Prompts::default();
        for name in QA_PLACEHOLDERS {
            assert!(prompts.qa.contains(&format!("{{{{{}}}}}", name)));
        }
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_render_does_not_rescan_values() {
        let prompts = Prompts {
            qa: "Q: {{question}}\nC: {{context}}".to_string(),
        };
        let rendered = prompts.render_qa("why?", "the chunk says {{question}}");
        assert_eq!(rendered, "Q: why?\nC: the chunk says {{question}}");
    }

    #[test]
    fn test_render_keeps_unknown_and_unterminated() {
        let vars = HashMap::new();
        assert_eq!(Prompts::render("a {{x}} b {{y", &vars), "a {{x}} b {{y");
    }

    #[test]
    fn test_load_custom_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qa.prompt");
        std::fs::write(&path, "{{context}} => {{question}}").unwrap();

        let prompts = Prompts::load(path.to_str()).unwrap();
        assert_eq!(prompts.render_qa("q", "c"), "c => q");
    }

    #[test]
    fn test_load_rejects_template_without_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qa.prompt");
        std::fs::write(&path, "only {{question}}").unwrap();

        let err = Prompts::load(path.to_str()).unwrap_err();
        assert!(matches!(err, VidqaError::Config(_)));
    }
}
