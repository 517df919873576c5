// SPDX-License-Identifier: MIT

//! Run configuration loaded from YAML

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::ScholarError;

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-large".to_string()
}

fn default_template_dir() -> String {
    "templates".to_string()
}

fn default_checkpoint_dir() -> String {
    ".checkpoints".to_string()
}

/// Everything needed to start (or resume) a review run
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_model")]
    pub model_name: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_template_dir")]
    pub template_dir: String,
    #[serde(default = "default_checkpoint_dir")]
    pub checkpoint_dir: String,
    pub thread_id: String,
    pub topic: String,
    pub research_question: String,
    #[serde(default)]
    pub inclusion_criteria: Vec<String>,
    #[serde(default)]
    pub exclusion_criteria: Vec<String>,
}

impl RunConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScholarError> {
        let content = fs::read_to_string(path.as_ref())?;
        Ok(serde_yaml::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let yaml = r#"
            thread_id: review-1
            topic: 2D materials
            research_question: X-ray diffraction in 2D materials
        "#;
        let config: RunConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.model_name, "gpt-4o-mini");
        assert_eq!(config.embedding_model, "text-embedding-3-large");
        assert_eq!(config.template_dir, "templates");
        assert_eq!(config.thread_id, "review-1");
        assert!(config.inclusion_criteria.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
            model_name: gemini-1.5-flash
            embedding_model: text-embedding-3-small
            template_dir: custom/templates
            checkpoint_dir: /tmp/checkpoints
            thread_id: review-2
            topic: graphene
            research_question: what is known
            inclusion_criteria: [peer-reviewed, english]
            exclusion_criteria: [preprints]
        "#;
        let config: RunConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.model_name, "gemini-1.5-flash");
        assert_eq!(config.inclusion_criteria.len(), 2);
        assert_eq!(config.exclusion_criteria, vec!["preprints"]);
    }

    #[test]
    fn test_missing_required_field_fails() {
        let yaml = "topic: incomplete";
        assert!(serde_yaml::from_str::<RunConfig>(yaml).is_err());
    }
}
