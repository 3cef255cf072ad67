pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::persona::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/personas", get(handlers::handle_list_personas))
        .route("/api/v1/predict", post(handlers::handle_predict))
        .route("/api/v1/personas/:name", get(handlers::handle_get_persona))
        .route("/api/v1/keywords", post(handlers::handle_extract_keywords))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::persona::analyzer::RuleBasedAnalyzer;
    use crate::persona::catalog::parse_personas;
    use crate::persona::predictor::PersonaPredictor;

    fn router() -> Router {
        let personas = parse_personas(
            r#"
- persona_name: explorer
  display_name: The Explorer
  description: Always on the road.
  keywords: [travel, hike]
"#,
        )
        .unwrap();

        build_router(AppState {
            predictor: Arc::new(PersonaPredictor::new(
                personas,
                Arc::new(RuleBasedAnalyzer::new()),
                3,
            )),
        })
    }

    async fn send(method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if body.is_some() {
            request = request.header("content-type", "application/json");
        }
        let request = request
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();

        let response = router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_route_table() {
        assert_eq!(send("GET", "/health", None).await.0, StatusCode::OK);
        assert_eq!(send("GET", "/api/v1/personas", None).await.0, StatusCode::OK);

        let (status, persona) = send("GET", "/api/v1/personas/explorer", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(persona["display_name"], "The Explorer");

        let (status, keywords) =
            send("POST", "/api/v1/keywords", Some(r#"{"text":"hiking trips"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(keywords["keywords"], serde_json::json!(["hike", "trip"]));

        let (status, report) = send(
            "POST",
            "/api/v1/predict",
            Some(r#"{"bio":"I travel","posts":["hiking"]}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["candidates"][0]["persona_name"], "explorer");

        assert_eq!(
            send("GET", "/api/v1/predict", None).await.0,
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[tokio::test]
    async fn test_unknown_persona_is_json_not_found() {
        let (status, body) = send("GET", "/api/v1/personas/ghost", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_predict_without_bio_is_validation_error() {
        let (status, body) =
            send("POST", "/api/v1/predict", Some(r#"{"posts":["hiking"]}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}
