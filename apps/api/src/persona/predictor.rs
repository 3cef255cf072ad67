//! Persona prediction — runs one request through extraction, scoring and optional refinement.
//!
//! `PersonaPredictor` owns the catalog and analyzer for the life of the process.
//! It is built once at startup and shared read-only through `AppState`.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::persona::catalog::Persona;
use crate::persona::extractor::{extract_keywords, LanguageAnalyzer};
use crate::persona::refinement::{resolve_pick, PersonaClassifier};
use crate::persona::scoring::{explain_match, score_personas, ScoredCandidate};

/// One ranked persona in a prediction response.
#[derive(Debug, Clone, Serialize)]
pub struct RankedPersona {
    pub persona_name: String,
    pub display_name: String,
    pub icon: String,
    pub description: String,
    pub score: f64,
    pub confidence: f64,
    pub matched_keywords: Vec<String>,
    pub is_match: bool,
    /// Present only for real matches.
    pub explanation: Option<String>,
}

impl From<&ScoredCandidate<'_>> for RankedPersona {
    fn from(candidate: &ScoredCandidate<'_>) -> Self {
        let is_match = candidate.is_match();
        Self {
            persona_name: candidate.persona.persona_name.clone(),
            display_name: candidate.persona.display_name.clone(),
            icon: candidate.persona.icon.clone(),
            description: candidate.persona.description.clone(),
            score: candidate.score,
            confidence: candidate.confidence,
            matched_keywords: candidate.matched_keywords.clone(),
            is_match,
            explanation: is_match.then(|| explain_match(candidate)),
        }
    }
}

/// What happened to the generative refinement step for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RefinementOutcome {
    Selected {
        persona_name: String,
        display_name: String,
        reasoning: String,
    },
    /// The model answered without naming a persona.
    NoPick { reasoning: String },
    /// The model named a persona outside the shortlist.
    UnknownPersona { persona_name: String, reasoning: String },
    Failed { error: String },
    Skipped { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionReport {
    pub prediction_id: Uuid,
    pub predicted_at: DateTime<Utc>,
    pub keywords: Vec<String>,
    pub candidates: Vec<RankedPersona>,
    /// Names forwarded to refinement: positive score with at least one keyword hit.
    pub shortlist: Vec<String>,
    pub refinement: RefinementOutcome,
}

impl PredictionReport {
    pub fn has_matches(&self) -> bool {
        !self.shortlist.is_empty()
    }
}

pub struct PersonaPredictor {
    personas: Vec<Persona>,
    analyzer: Arc<dyn LanguageAnalyzer>,
    classifier: Option<PersonaClassifier>,
    top_n: usize,
}

impl PersonaPredictor {
    pub fn new(
        personas: Vec<Persona>,
        analyzer: Arc<dyn LanguageAnalyzer>,
        top_n: usize,
    ) -> Self {
        Self {
            personas,
            analyzer,
            classifier: None,
            top_n,
        }
    }

    /// Enables generative refinement for every prediction.
    pub fn with_classifier(mut self, classifier: PersonaClassifier) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn personas(&self) -> &[Persona] {
        &self.personas
    }

    pub fn find_persona(&self, persona_name: &str) -> Option<&Persona> {
        self.personas.iter().find(|p| p.persona_name == persona_name)
    }

    pub fn refinement_enabled(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn extract(&self, text: &str) -> BTreeSet<String> {
        extract_keywords(self.analyzer.as_ref(), text)
    }

    /// Predicts a persona for `bio` plus `posts`.
    ///
    /// Refinement failures never fail the prediction; they are recorded in
    /// `PredictionReport::refinement` next to the rule-based ranking.
    pub async fn predict(&self, bio: &str, posts: &[String]) -> PredictionReport {
        let prediction_id = Uuid::new_v4();
        let posts_text = posts.join(" ");
        let user_input = format!("{bio} {posts_text}");

        info!("Prediction {prediction_id} received: bio={bio:?}, posts={posts:?}");

        let tokens = self.extract(&user_input);
        let ranked = score_personas(&self.personas, &tokens, self.top_n);

        for candidate in ranked.iter().filter(|c| c.is_match()) {
            info!(
                "Rule-based match - persona: {}, score: {}, keywords: {:?}, confidence: {:.1}%",
                candidate.persona.display_name,
                candidate.score,
                candidate.matched_keywords,
                candidate.confidence
            );
        }

        let shortlist: Vec<&Persona> = ranked
            .iter()
            .filter(|c| c.is_match())
            .map(|c| c.persona)
            .collect();

        let refinement = self.refine(prediction_id, bio, &posts_text, &shortlist).await;
        info!("Prediction {prediction_id} refinement: {refinement:?}");

        PredictionReport {
            prediction_id,
            predicted_at: Utc::now(),
            keywords: tokens.into_iter().collect(),
            candidates: ranked.iter().map(RankedPersona::from).collect(),
            shortlist: shortlist.iter().map(|p| p.persona_name.clone()).collect(),
            refinement,
        }
    }

    async fn refine(
        &self,
        prediction_id: Uuid,
        bio: &str,
        posts_text: &str,
        shortlist: &[&Persona],
    ) -> RefinementOutcome {
        let Some(classifier) = &self.classifier else {
            return RefinementOutcome::Skipped {
                reason: "refinement is disabled (no OpenAI API key configured)".to_string(),
            };
        };
        if shortlist.is_empty() {
            return RefinementOutcome::Skipped {
                reason: "no rule-based matches to refine".to_string(),
            };
        }

        let classification = match classifier.classify(bio, posts_text, shortlist).await {
            Ok(classification) => classification,
            Err(e) => {
                warn!("Prediction {prediction_id}: refinement failed: {e}");
                return RefinementOutcome::Failed {
                    error: e.to_string(),
                };
            }
        };

        if !classification.has_pick() {
            return RefinementOutcome::NoPick {
                reasoning: classification.reasoning,
            };
        }

        match resolve_pick(shortlist, &classification.persona_name) {
            Ok(persona) => RefinementOutcome::Selected {
                persona_name: persona.persona_name.clone(),
                display_name: persona.display_name.clone(),
                reasoning: classification.reasoning,
            },
            Err(e) => {
                warn!("Prediction {prediction_id}: {e}");
                RefinementOutcome::UnknownPersona {
                    persona_name: classification.persona_name,
                    reasoning: classification.reasoning,
                }
            }
        }
    }
}
