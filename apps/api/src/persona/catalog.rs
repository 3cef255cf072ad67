//! Persona catalog — loads the YAML persona definitions once at startup.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::persona::extractor::LanguageAnalyzer;

#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("failed to read persona catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed persona catalog: {0}")]
    Malformed(#[from] serde_yaml::Error),

    #[error("persona #{index} is missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("duplicate persona_name '{0}'")]
    DuplicatePersona(String),
}

/// A named archetype with matching keywords and presentation metadata.
///
/// `notable_figures`, `notable_influencers` and `related_entities` are carried
/// through for display and never take part in scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub persona_name: String,
    pub display_name: String,
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub negative_keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notable_figures: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notable_influencers: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_entities: Vec<String>,
}

/// Raw record as it appears on disk. Required fields are optional here so a
/// missing one can be reported by name instead of as a generic parse error.
#[derive(Debug, Deserialize)]
struct PersonaRecord {
    persona_name: Option<String>,
    display_name: Option<String>,
    description: Option<String>,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    keywords: Option<Vec<String>>,
    #[serde(default)]
    negative_keywords: Option<Vec<String>>,
    #[serde(default)]
    notable_figures: Option<Vec<String>>,
    #[serde(default)]
    notable_influencers: Option<Vec<String>>,
    #[serde(default)]
    related_entities: Option<Vec<String>>,
}

impl PersonaRecord {
    fn into_persona(self, index: usize) -> Result<Persona, CatalogLoadError> {
        let required = |value: Option<String>, field| {
            value.ok_or(CatalogLoadError::MissingField { index, field })
        };

        Ok(Persona {
            persona_name: required(self.persona_name, "persona_name")?,
            display_name: required(self.display_name, "display_name")?,
            description: required(self.description, "description")?,
            icon: self.icon.unwrap_or_default(),
            keywords: self.keywords.unwrap_or_default(),
            negative_keywords: self.negative_keywords.unwrap_or_default(),
            notable_figures: self.notable_figures.unwrap_or_default(),
            notable_influencers: self.notable_influencers.unwrap_or_default(),
            related_entities: self.related_entities.unwrap_or_default(),
        })
    }
}

/// Reads the catalog at `path`, preserving source order.
pub fn load_personas(path: impl AsRef<Path>) -> Result<Vec<Persona>, CatalogLoadError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| CatalogLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let personas = parse_personas(&raw)?;
    info!("Loaded {} personas from {}", personas.len(), path.display());
    Ok(personas)
}

/// Parses catalog YAML. An empty document is an empty catalog.
pub fn parse_personas(yaml: &str) -> Result<Vec<Persona>, CatalogLoadError> {
    let records: Option<Vec<PersonaRecord>> = serde_yaml::from_str(yaml)?;

    let personas = records
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(index, record)| record.into_persona(index))
        .collect::<Result<Vec<_>, _>>()?;

    let mut seen = HashSet::new();
    for persona in &personas {
        if !seen.insert(persona.persona_name.as_str()) {
            return Err(CatalogLoadError::DuplicatePersona(
                persona.persona_name.clone(),
            ));
        }
    }

    Ok(personas)
}

pub fn to_yaml(personas: &[Persona]) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(personas)
}

pub fn save_personas(path: impl AsRef<Path>, personas: &[Persona]) -> anyhow::Result<()> {
    let yaml = to_yaml(personas)?;
    std::fs::write(path.as_ref(), yaml)?;
    Ok(())
}

/// Rewrites every keyword and negative keyword into lemma form.
///
/// Each entry is lemmatized word by word and re-joined with a single space;
/// duplicates produced by lemmatization collapse onto their first occurrence.
pub fn lemmatize_catalog(personas: &mut [Persona], analyzer: &dyn LanguageAnalyzer) {
    for persona in personas.iter_mut() {
        persona.keywords = lemmatize_list(&persona.keywords, analyzer);
        persona.negative_keywords = lemmatize_list(&persona.negative_keywords, analyzer);
    }
}

fn lemmatize_list(words: &[String], analyzer: &dyn LanguageAnalyzer) -> Vec<String> {
    let mut seen = HashSet::new();
    words
        .iter()
        .map(|phrase| {
            phrase
                .split_whitespace()
                .map(|w| analyzer.lemmatize(w))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|lemma| !lemma.is_empty() && seen.insert(lemma.clone()))
        .collect()
}
