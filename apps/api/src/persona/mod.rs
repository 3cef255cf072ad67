// Persona prediction engine.
// Implements: catalog loading, keyword extraction, rule-based scoring, LLM refinement.
// All LLM calls go through llm_client — refinement only sees the rule-based shortlist.

pub mod analyzer;
pub mod catalog;
pub mod extractor;
pub mod handlers;
pub mod predictor;
pub mod prompts;
pub mod refinement;
pub mod scoring;
