// SPDX-License-Identifier: MIT

//! Prompt template loading and rendering
//!
//! Templates are JSON files (`{"template": "..."}`) keyed by file stem, one
//! per agent role. Rendering interpolates `{placeholder}` variables; a
//! placeholder with no supplied variable is a fatal error, which aborts the
//! workflow run before any remote call is made.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use crate::error::ScholarError;

#[derive(Debug, Deserialize)]
struct TemplateFile {
    template: String,
}

/// Registry of role-keyed prompt templates
#[derive(Debug, Clone, Default)]
pub struct PromptManager {
    templates: HashMap<String, String>,
}

impl PromptManager {
    /// Load every `*.json` template from a directory
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, ScholarError> {
        let mut templates = HashMap::new();
        for entry in fs::read_dir(dir.as_ref())? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                let parsed: TemplateFile = serde_json::from_str(&fs::read_to_string(&path)?)?;
                templates.insert(stem.to_string(), parsed.template);
            }
        }
        log::info!("Loaded {} prompt templates", templates.len());
        Ok(Self { templates })
    }

    /// Build a manager from in-memory templates
    pub fn from_templates(templates: HashMap<String, String>) -> Self {
        Self { templates }
    }

    /// Names of the loaded templates
    pub fn roles(&self) -> impl Iterator<Item = &String> {
        self.templates.keys()
    }

    /// Render the template registered under `role`
    ///
    /// Fails if no such template exists or if the template references a
    /// variable missing from `vars`. `{{` and `}}` escape literal braces.
    pub fn render(
        &self,
        role: &str,
        vars: &BTreeMap<String, String>,
    ) -> Result<String, ScholarError> {
        let template = self
            .templates
            .get(role)
            .ok_or_else(|| ScholarError::UnknownTemplate(role.to_string()))?;

        let mut out = String::with_capacity(template.len());
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    out.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    out.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    for c in chars.by_ref() {
                        if c == '}' {
                            break;
                        }
                        name.push(c);
                    }
                    let value = vars
                        .get(&name)
                        .ok_or_else(|| ScholarError::template(role, &name))?;
                    out.push_str(value);
                }
                other => out.push(other),
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> PromptManager {
        let mut templates = HashMap::new();
        templates.insert(
            "search_specialist".to_string(),
            "Context:\n{dynamic_state}\n\nResults:\n{content}".to_string(),
        );
        templates.insert(
            "braced".to_string(),
            "literal {{json}} and {value}".to_string(),
        );
        PromptManager::from_templates(templates)
    }

    fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_interpolates() {
        let prompt = manager()
            .render(
                "search_specialist",
                &vars(&[("dynamic_state", "iteration 0"), ("content", "paper list")]),
            )
            .unwrap();

        assert!(prompt.contains("iteration 0"));
        assert!(prompt.contains("paper list"));
    }

    #[test]
    fn test_missing_variable_fails() {
        let err = manager()
            .render("search_specialist", &vars(&[("content", "only content")]))
            .unwrap_err();

        assert!(matches!(
            err,
            ScholarError::Template { ref role, ref variable }
                if role == "search_specialist" && variable == "dynamic_state"
        ));
    }

    #[test]
    fn test_unknown_template_fails() {
        let err = manager().render("nope", &vars(&[])).unwrap_err();
        assert!(matches!(err, ScholarError::UnknownTemplate(_)));
    }

    #[test]
    fn test_brace_escapes() {
        let prompt = manager()
            .render("braced", &vars(&[("value", "x")]))
            .unwrap();
        assert_eq!(prompt, "literal {json} and x");
    }

    #[test]
    fn test_from_dir_loads_shipped_templates() {
        let manager = PromptManager::from_dir("templates").unwrap();
        for role in [
            "expert_supervisor",
            "search_specialist",
            "summary_specialist",
            "screening_specialist",
            "synthesizer_writer",
        ] {
            assert!(
                manager.templates.contains_key(role),
                "missing template {}",
                role
            );
        }
    }
}
