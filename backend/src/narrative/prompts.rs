use std::path::Path;

use serde::{Deserialize, Serialize};
use shared::Disease;
use thiserror::Error;

const EMBEDDED_PROMPTS: &str = include_str!("../../../config/prompts.yaml");

const DISEASE_PLACEHOLDER: &str = "{{{diseaseName}}}";
const PLANT_PLACEHOLDER: &str = "{{{plantType}}}";

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Failed to read prompt file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse prompt file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Prompt `{prompt}` is missing the {placeholder} placeholder")]
    MissingPlaceholder {
        prompt: &'static str,
        placeholder: &'static str,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptSpec {
    pub template: String,
    #[serde(default)]
    pub bilingual_instruction: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptTemplates {
    pub version: f32,
    pub disease_summary: PromptSpec,
    pub preventative_measures: PromptSpec,
}

impl PromptTemplates {
    pub fn embedded() -> Result<Self, PromptError> {
        Self::parse(EMBEDDED_PROMPTS)
    }

    /// Loads templates from `path` when given, otherwise the built-in set.
    pub fn load(path: Option<&Path>) -> Result<Self, PromptError> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                Self::parse(&raw)
            }
            None => Self::embedded(),
        }
    }

    pub fn parse(raw: &str) -> Result<Self, PromptError> {
        let templates: PromptTemplates = serde_yaml::from_str(raw)?;
        if !templates.disease_summary.template.contains(DISEASE_PLACEHOLDER) {
            return Err(PromptError::MissingPlaceholder {
                prompt: "disease_summary",
                placeholder: DISEASE_PLACEHOLDER,
            });
        }
        if !templates.preventative_measures.template.contains(PLANT_PLACEHOLDER) {
            return Err(PromptError::MissingPlaceholder {
                prompt: "preventative_measures",
                placeholder: PLANT_PLACEHOLDER,
            });
        }
        Ok(templates)
    }

    pub fn disease_summary(&self, disease: Disease, bilingual: bool) -> String {
        let prompt = self
            .disease_summary
            .template
            .replace(DISEASE_PLACEHOLDER, &disease.to_string());
        with_instruction(prompt, &self.disease_summary.bilingual_instruction, bilingual)
    }

    pub fn preventative_measures(&self, plant_type: &str, bilingual: bool) -> String {
        let prompt = self
            .preventative_measures
            .template
            .replace(PLANT_PLACEHOLDER, plant_type);
        with_instruction(prompt, &self.preventative_measures.bilingual_instruction, bilingual)
    }
}

fn with_instruction(prompt: String, instruction: &str, bilingual: bool) -> String {
    if bilingual && !instruction.trim().is_empty() {
        format!("{}\n{}", prompt.trim_end(), instruction.trim())
    } else {
        prompt.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_templates_render_disease_name() {
        let prompts = PromptTemplates::embedded().unwrap();
        let prompt = prompts.disease_summary(Disease::LateBlight, false);

        assert!(prompt.contains("Disease Name: Late Blight"));
        assert!(!prompt.contains("{{{"));
        assert!(!prompt.contains("summaryHindi"));
    }

    #[test]
    fn bilingual_flag_appends_hindi_instruction() {
        let prompts = PromptTemplates::embedded().unwrap();

        let care = prompts.preventative_measures("potato", true);
        assert!(care.contains("potato plant"));
        assert!(care.contains("suggestionsHindi"));
        assert!(!care.contains("Early Blight"));
    }

    #[test]
    fn template_without_placeholder_is_rejected() {
        let raw = r#"
version: 1.0
disease_summary:
  template: "Describe a disease."
preventative_measures:
  template: "Care for a {{{plantType}}}."
"#;
        assert!(matches!(
            PromptTemplates::parse(raw),
            Err(PromptError::MissingPlaceholder {
                prompt: "disease_summary",
                ..
            })
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = PromptTemplates::load(Some(Path::new("/nonexistent/prompts.yaml")));
        assert!(matches!(result, Err(PromptError::Io(_))));
    }
}
