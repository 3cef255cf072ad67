//! Axum route handlers for the Persona API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::persona::catalog::Persona;
use crate::persona::predictor::PredictionReport;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub posts: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExtractKeywordsRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractKeywordsResponse {
    pub keywords: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PersonaListResponse {
    pub personas: Vec<Persona>,
    pub refinement_enabled: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/personas
pub async fn handle_list_personas(State(state): State<AppState>) -> Json<PersonaListResponse> {
    Json(PersonaListResponse {
        personas: state.predictor.personas().to_vec(),
        refinement_enabled: state.predictor.refinement_enabled(),
    })
}

/// GET /api/v1/personas/:name
pub async fn handle_get_persona(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Persona>, AppError> {
    state
        .predictor
        .find_persona(&name)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Persona '{name}' not found")))
}

/// POST /api/v1/predict
///
/// Requires a bio and at least one non-blank post. Blank posts are dropped
/// before the bio and posts are joined into a single input text.
pub async fn handle_predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictionReport>, AppError> {
    let posts: Vec<String> = request
        .posts
        .into_iter()
        .filter(|p| !p.trim().is_empty())
        .collect();

    if request.bio.trim().is_empty() || posts.is_empty() {
        return Err(AppError::Validation(
            "Please provide both a bio and at least one post".to_string(),
        ));
    }

    let report = state.predictor.predict(&request.bio, &posts).await;
    Ok(Json(report))
}

/// POST /api/v1/keywords
///
/// Debug view of the normalized keyword set for arbitrary text.
pub async fn handle_extract_keywords(
    State(state): State<AppState>,
    Json(request): Json<ExtractKeywordsRequest>,
) -> Json<ExtractKeywordsResponse> {
    Json(ExtractKeywordsResponse {
        keywords: state.predictor.extract(&request.text).into_iter().collect(),
    })
}
