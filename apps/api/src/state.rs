use std::sync::Arc;

use crate::persona::predictor::PersonaPredictor;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Catalog, analyzer and optional classifier. Built once at startup, read-only afterwards.
    pub predictor: Arc<PersonaPredictor>,
}
