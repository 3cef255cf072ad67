//! Generative refinement — asks the LLM to pick one persona from the rule-based shortlist.
//!
//! Errors from the completion call are returned as-is; whether they are
//! surfaced or ignored is up to the caller.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::llm_client::{CompletionBackend, LlmClient, LlmError};
use crate::persona::catalog::Persona;
use crate::persona::prompts::{
    load_prompt_template, render_classification_prompt, DEFAULT_TEMPLATE_PATH,
};

#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("failed to read prompt template {path}: {source}")]
    Template {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("classification call failed: {0}")]
    Llm(#[from] LlmError),
}

/// The model named a persona outside the shortlist it was given.
#[derive(Debug, Error, PartialEq)]
#[error("model selected unknown persona '{0}'")]
pub struct UnknownPersonaReference(pub String);

/// Parsed model answer. Either field may be empty when the model omitted it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Classification {
    pub persona_name: String,
    pub reasoning: String,
}

impl Classification {
    pub fn has_pick(&self) -> bool {
        !self.persona_name.is_empty()
    }
}

/// Classifier bound to a completion backend and a prompt template on disk.
#[derive(Clone)]
pub struct PersonaClassifier {
    backend: Arc<dyn CompletionBackend>,
    template_path: PathBuf,
}

impl PersonaClassifier {
    pub fn new(backend: Arc<dyn CompletionBackend>, template_path: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            template_path: template_path.into(),
        }
    }

    pub fn template_path(&self) -> &Path {
        &self.template_path
    }

    /// Renders the prompt for `shortlist`, sends it, and parses the reply.
    pub async fn classify(
        &self,
        bio: &str,
        posts_text: &str,
        shortlist: &[&Persona],
    ) -> Result<Classification, ClassificationError> {
        let template = load_prompt_template(&self.template_path).map_err(|source| {
            ClassificationError::Template {
                path: self.template_path.display().to_string(),
                source,
            }
        })?;
        let prompt = render_classification_prompt(&template, shortlist, bio, posts_text);
        debug!("Classification prompt:\n{prompt}");

        let content = self.backend.complete(&prompt).await?;
        debug!("Raw classification response:\n{content}");

        Ok(parse_classification(&content))
    }
}

/// One-shot classification with a fresh client for `api_key` and the default template.
pub async fn classify_with_gpt(
    bio: &str,
    posts_text: &str,
    shortlist: &[&Persona],
    api_key: &str,
) -> Result<Classification, ClassificationError> {
    let client = LlmClient::new(api_key.to_string())?;
    PersonaClassifier::new(Arc::new(client), DEFAULT_TEMPLATE_PATH)
        .classify(bio, posts_text, shortlist)
        .await
}

/// Reads `Persona:` and `Reasoning:` lines (prefix match ignores case).
/// A later matching line replaces an earlier one.
pub fn parse_classification(content: &str) -> Classification {
    let mut classification = Classification::default();

    for line in content.lines() {
        let lower = line.to_lowercase();
        let value = || {
            line.split_once(':')
                .map(|(_, rest)| rest.trim().to_string())
                .unwrap_or_default()
        };

        if lower.starts_with("persona:") {
            classification.persona_name = value();
        } else if lower.starts_with("reasoning:") {
            classification.reasoning = value();
        }
    }

    classification
}

/// Looks the model's pick up in the shortlist it was offered.
pub fn resolve_pick<'a>(
    shortlist: &[&'a Persona],
    persona_name: &str,
) -> Result<&'a Persona, UnknownPersonaReference> {
    shortlist
        .iter()
        .copied()
        .find(|p| p.persona_name == persona_name)
        .ok_or_else(|| UnknownPersonaReference(persona_name.to_string()))
}
