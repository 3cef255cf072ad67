//! Persona scoring — rule-based keyword matching with confidence normalization.
//!
//! Algorithm:
//! 1. Count token frequencies.
//! 2. Each persona keyword present adds its token frequency; each negative
//!    keyword present subtracts a flat `NEGATIVE_KEYWORD_PENALTY`.
//! 3. confidence = max(0, score) / Σ max(0, score) × 100, or 0 when the sum is 0.
//! 4. Stable sort by raw score, descending (ties keep catalog order).
//! 5. All-zero scores return every candidate; otherwise the first `top_n`,
//!    whatever their sign.

use std::collections::HashMap;

use serde::Serialize;

use crate::persona::catalog::Persona;

/// Subtracted once per matched negative keyword, regardless of frequency.
pub const NEGATIVE_KEYWORD_PENALTY: f64 = 0.3;

pub const DEFAULT_TOP_N: usize = 3;

/// One persona's result for a single request.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredCandidate<'a> {
    pub persona: &'a Persona,
    pub score: f64,
    pub matched_keywords: Vec<String>,
    /// Share of the total positive score, 0 – 100.
    pub confidence: f64,
}

impl ScoredCandidate<'_> {
    /// Positive score backed by at least one keyword hit. Only these are
    /// shown as matches and forwarded to refinement.
    pub fn is_match(&self) -> bool {
        self.score > 0.0 && !self.matched_keywords.is_empty()
    }
}

/// Scores every persona against `tokens` and returns the ranked shortlist.
pub fn score_personas<'a, I>(
    personas: &'a [Persona],
    tokens: I,
    top_n: usize,
) -> Vec<ScoredCandidate<'a>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut token_counts: HashMap<String, u32> = HashMap::new();
    for token in tokens {
        *token_counts.entry(token.as_ref().to_string()).or_insert(0) += 1;
    }

    let mut candidates: Vec<ScoredCandidate<'a>> = personas
        .iter()
        .map(|persona| score_one(persona, &token_counts))
        .collect();

    let total_positive: f64 = candidates.iter().map(|c| c.score.max(0.0)).sum();

    for candidate in &mut candidates {
        candidate.confidence = if total_positive > 0.0 {
            candidate.score.max(0.0) / total_positive * 100.0
        } else {
            0.0
        };
    }

    // `sort_by` is stable, so equal scores keep catalog order.
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    if candidates.iter().all(|c| c.score == 0.0) {
        return candidates;
    }

    candidates.truncate(top_n);
    candidates
}

fn score_one<'a>(
    persona: &'a Persona,
    token_counts: &HashMap<String, u32>,
) -> ScoredCandidate<'a> {
    let mut score = 0.0_f64;
    let mut matched_keywords = Vec::new();

    for keyword in &persona.keywords {
        if let Some(&count) = token_counts.get(&keyword.to_lowercase()) {
            score += f64::from(count);
            matched_keywords.push(keyword.clone());
        }
    }

    for negative in &persona.negative_keywords {
        if token_counts.contains_key(&negative.to_lowercase()) {
            score -= NEGATIVE_KEYWORD_PENALTY;
        }
    }

    ScoredCandidate {
        persona,
        score,
        matched_keywords,
        confidence: 0.0,
    }
}

/// Template explanation used when no generative reasoning is available.
pub fn explain_match(candidate: &ScoredCandidate<'_>) -> String {
    format!(
        "You seem like a {} because you mentioned: {}.",
        candidate.persona.display_name,
        candidate.matched_keywords.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn persona(name: &str, keywords: &[&str], negative: &[&str]) -> Persona {
        Persona {
            persona_name: name.to_string(),
            display_name: format!("The {name}"),
            description: format!("{name} description"),
            icon: String::new(),
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            negative_keywords: negative.iter().map(|s| s.to_string()).collect(),
            notable_figures: vec![],
            notable_influencers: vec![],
            related_entities: vec![],
        }
    }

    fn names<'a>(candidates: &[ScoredCandidate<'a>]) -> Vec<&'a str> {
        candidates
            .iter()
            .map(|c| c.persona.persona_name.as_str())
            .collect()
    }

    #[test]
    fn test_frequency_weighted_scores_and_confidence() {
        let personas = vec![
            persona("A", &["travel", "adventure"], &[]),
            persona("B", &["tech"], &[]),
        ];
        let ranked = score_personas(&personas, ["travel", "travel", "tech"], DEFAULT_TOP_N);

        assert_eq!(names(&ranked), vec!["A", "B"]);
        assert_eq!(ranked[0].score, 2.0);
        assert_eq!(ranked[1].score, 1.0);
        assert!((ranked[0].confidence - 66.666).abs() < 0.01);
        assert!((ranked[1].confidence - 33.333).abs() < 0.01);
        assert_eq!(ranked[0].matched_keywords, vec!["travel"]);
    }

    #[test]
    fn test_confidences_sum_to_100_when_positive() {
        let personas = vec![
            persona("A", &["travel"], &["couch"]),
            persona("B", &["tech", "code"], &[]),
            persona("C", &["food"], &[]),
            persona("D", &["art"], &["travel"]),
        ];
        let tokens = ["travel", "code", "tech", "food", "couch", "art"];
        let ranked = score_personas(&personas, tokens, 10);

        let total: f64 = ranked.iter().map(|c| c.confidence).sum();
        assert!((total - 100.0).abs() < 0.01, "sum was {total}");
        assert!(ranked.iter().all(|c| (0.0..=100.0).contains(&c.confidence)));
    }

    #[test]
    fn test_empty_tokens_return_every_persona_with_zero() {
        let personas = vec![
            persona("A", &["travel"], &[]),
            persona("B", &["tech"], &[]),
            persona("C", &["food"], &[]),
            persona("D", &["art"], &[]),
        ];
        let ranked = score_personas(&personas, BTreeSet::<String>::new(), 3);

        assert_eq!(names(&ranked), vec!["A", "B", "C", "D"]);
        assert!(ranked.iter().all(|c| c.score == 0.0 && c.confidence == 0.0));
    }

    #[test]
    fn test_no_keyword_hits_returns_full_list() {
        let personas = vec![
            persona("A", &["travel"], &[]),
            persona("B", &["tech"], &[]),
            persona("C", &["food"], &[]),
            persona("D", &["art"], &[]),
        ];
        let ranked = score_personas(&personas, ["quantum", "gardening"], 2);
        assert_eq!(ranked.len(), 4);
    }

    #[test]
    fn test_negative_penalty_is_flat() {
        let personas = vec![persona("A", &["travel"], &["couch"])];

        let once = score_personas(&personas, ["travel", "couch"], 3);
        let many = score_personas(&personas, ["travel", "couch", "couch", "couch"], 3);

        assert!((once[0].score - 0.7).abs() < 1e-9);
        assert!((many[0].score - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_penalty_applies_per_distinct_negative_keyword() {
        let personas = vec![persona("A", &["travel", "hike"], &["couch", "tv"])];
        let ranked = score_personas(&personas, ["travel", "hike", "couch", "tv"], 3);
        assert!((ranked[0].score - 1.4).abs() < 1e-9);
    }

    #[test]
    fn test_negative_only_is_not_all_zero_and_truncates() {
        let personas = vec![
            persona("A", &["travel"], &["couch"]),
            persona("B", &["tech"], &[]),
            persona("C", &["food"], &[]),
            persona("D", &["art"], &[]),
        ];
        let ranked = score_personas(&personas, ["couch"], 3);

        assert_eq!(ranked.len(), 3);
        assert_eq!(names(&ranked), vec!["B", "C", "D"]);
        assert!(ranked.iter().all(|c| c.confidence == 0.0));
    }

    #[test]
    fn test_negative_score_can_appear_in_top_n() {
        let personas = vec![
            persona("A", &["travel"], &[]),
            persona("B", &["tech"], &["travel"]),
        ];
        let ranked = score_personas(&personas, ["travel"], 3);

        assert_eq!(names(&ranked), vec!["A", "B"]);
        assert!(ranked[1].score < 0.0);
        assert!(!ranked[1].is_match());
        assert_eq!(ranked[1].confidence, 0.0);
        assert_eq!(ranked[0].confidence, 100.0);
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let personas = vec![
            persona("first", &["music"], &[]),
            persona("second", &["music"], &[]),
            persona("third", &["art"], &[]),
        ];
        let ranked = score_personas(&personas, ["music", "art"], 3);
        assert_eq!(names(&ranked), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let personas = vec![persona("A", &["Travel", "NYC"], &["Couch"])];
        let ranked = score_personas(&personas, ["travel", "nyc", "couch"], 3);
        assert!((ranked[0].score - 1.7).abs() < 1e-9);
        assert_eq!(ranked[0].matched_keywords, vec!["Travel", "NYC"]);
    }

    #[test]
    fn test_is_match_requires_keyword_hit() {
        let personas = vec![persona("A", &["travel"], &[])];
        let ranked = score_personas(&personas, ["travel"], 3);
        assert!(ranked[0].is_match());
    }

    #[test]
    fn test_explain_match_lists_keywords() {
        let personas = vec![persona("Explorer", &["travel", "hike"], &[])];
        let ranked = score_personas(&personas, ["travel", "hike"], 3);
        assert_eq!(
            explain_match(&ranked[0]),
            "You seem like a The Explorer because you mentioned: travel, hike."
        );
    }
}
