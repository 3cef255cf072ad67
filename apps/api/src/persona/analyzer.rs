//! Rule-based English analyzer — the default `LanguageAnalyzer`.
//!
//! Deterministic and model-free: UAX #29 word segmentation, a fixed stopword
//! list, title-case runs as entities, determiner + content-word runs as noun
//! chunks, and a suffix-rule lemmatizer backed by an irregular-form table.

use std::collections::{HashMap, HashSet};

use unicode_segmentation::UnicodeSegmentation;

use crate::persona::extractor::{AnalyzedToken, LanguageAnalyzer};

const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "almost", "also", "am", "an",
    "and", "any", "are", "as", "at", "be", "because", "been", "before", "being", "below",
    "between", "both", "but", "by", "can", "could", "did", "do", "does", "doing", "down",
    "during", "each", "either", "else", "ever", "every", "few", "for", "from", "further", "had",
    "has", "have", "having", "he", "her", "here", "hers", "herself", "him", "himself", "his",
    "how", "however", "i", "if", "in", "into", "is", "it", "its", "itself", "just", "me",
    "might", "mine", "more", "most", "much", "must", "my", "myself", "neither", "no", "nor",
    "not", "now", "of", "off", "often", "on", "once", "only", "or", "other", "our", "ours",
    "ourselves", "out", "over", "own", "per", "quite", "rather", "really", "same", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "though", "through", "to",
    "too", "under", "until", "up", "upon", "us", "very", "via", "was", "we", "well", "were",
    "what", "whatever", "when", "where", "whether", "which", "while", "who", "whom", "whose",
    "why", "will", "with", "within", "without", "would", "yet", "you", "your", "yours",
    "yourself", "yourselves", "i'm", "i've", "i'll", "i'd", "it's", "don't", "doesn't",
    "didn't", "can't", "won't", "isn't", "aren't", "wasn't", "weren't", "you're", "you've",
    "we're", "we've", "they're", "that's", "there's", "let's",
];

/// Words that may open a noun chunk without being part of its content.
const CHUNK_DETERMINERS: &[&str] = &[
    "a", "an", "the", "my", "our", "your", "his", "her", "their", "its", "this", "that",
    "these", "those",
];

const IRREGULAR_FORMS: &[(&str, &str)] = &[
    ("am", "be"), ("are", "be"), ("is", "be"), ("was", "be"), ("were", "be"), ("been", "be"),
    ("being", "be"), ("has", "have"), ("had", "have"), ("having", "have"), ("did", "do"),
    ("does", "do"), ("done", "do"), ("doing", "do"), ("went", "go"), ("gone", "go"),
    ("goes", "go"), ("going", "go"), ("ran", "run"), ("ate", "eat"), ("eaten", "eat"),
    ("saw", "see"), ("seen", "see"), ("took", "take"), ("taken", "take"), ("made", "make"),
    ("wrote", "write"), ("written", "write"), ("bought", "buy"), ("brought", "bring"),
    ("thought", "think"), ("felt", "feel"), ("met", "meet"), ("kept", "keep"),
    ("slept", "sleep"), ("spent", "spend"), ("built", "build"), ("sold", "sell"),
    ("told", "tell"), ("found", "find"), ("won", "win"), ("swam", "swim"), ("began", "begin"),
    ("begun", "begin"), ("sang", "sing"), ("sung", "sing"), ("drove", "drive"),
    ("driven", "drive"), ("rode", "ride"), ("ridden", "ride"), ("flew", "fly"),
    ("flown", "fly"), ("knew", "know"), ("known", "know"), ("grew", "grow"), ("grown", "grow"),
    ("gave", "give"), ("given", "give"), ("got", "get"), ("gotten", "get"), ("came", "come"),
    ("taught", "teach"), ("caught", "catch"), ("fought", "fight"), ("led", "lead"),
    ("children", "child"), ("people", "person"), ("men", "man"), ("women", "woman"),
    ("feet", "foot"), ("teeth", "tooth"), ("mice", "mouse"), ("geese", "goose"),
    ("better", "good"), ("best", "good"), ("worse", "bad"), ("worst", "bad"),
    ("shoes", "shoe"), ("movies", "movie"), ("cookies", "cookie"), ("selfies", "selfie"),
    ("using", "use"), ("used", "use"), ("uses", "use"), ("exploring", "explore"),
    ("explored", "explore"), ("explores", "explore"),
];

/// Words that look inflected but are already base forms.
const INVARIANT_FORMS: &[&str] = &[
    "news", "series", "species", "lens", "always", "perhaps", "sometimes", "christmas",
    "thing", "something", "anything", "everything", "nothing", "king", "ring", "wing",
    "spring", "string", "swing", "sing", "morning", "evening", "ceiling", "wedding", "during",
    "embed", "speed", "need", "seed", "feed", "shed", "bed", "hundred", "sacred", "canvas",
];

/// Deterministic English analyzer used when no external linguistic model is wired in.
pub struct RuleBasedAnalyzer {
    stopwords: HashSet<&'static str>,
    irregular: HashMap<&'static str, &'static str>,
    invariant: HashSet<&'static str>,
}

impl Default for RuleBasedAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// A word-bearing segment plus the layout facts entity and chunk detection need.
struct Segment<'a> {
    text: &'a str,
    lower: String,
    is_punct: bool,
    /// True when only whitespace separates this segment from the previous one.
    adjacent: bool,
    sentence_start: bool,
}

impl RuleBasedAnalyzer {
    pub fn new() -> Self {
        Self {
            stopwords: STOPWORDS.iter().copied().collect(),
            irregular: IRREGULAR_FORMS.iter().copied().collect(),
            invariant: INVARIANT_FORMS.iter().copied().collect(),
        }
    }

    fn segments<'a>(&self, text: &'a str) -> Vec<Segment<'a>> {
        let mut segments = Vec::new();
        let mut adjacent = false;
        let mut sentence_start = true;

        for piece in text.split_word_bounds() {
            if piece.chars().all(char::is_whitespace) {
                adjacent = true;
                continue;
            }

            let is_punct = !piece.chars().any(char::is_alphanumeric);
            segments.push(Segment {
                text: piece,
                lower: normalize_apostrophes(&piece.to_lowercase()),
                is_punct,
                adjacent: adjacent || segments.is_empty(),
                sentence_start,
            });

            sentence_start = is_punct && piece.chars().any(|c| matches!(c, '.' | '!' | '?'));
            adjacent = false;
        }

        segments
    }
}

impl LanguageAnalyzer for RuleBasedAnalyzer {
    fn entities(&self, text: &str) -> Vec<String> {
        let mut entities = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for segment in self.segments(text) {
            let capitalized = segment
                .text
                .chars()
                .next()
                .is_some_and(char::is_uppercase);
            let candidate = capitalized
                && !segment.is_punct
                && !segment.sentence_start
                && !self.stopwords.contains(segment.lower.as_str());

            if candidate && (current.is_empty() || segment.adjacent) {
                current.push(segment.text);
                continue;
            }

            if !current.is_empty() {
                entities.push(current.join(" "));
                current.clear();
            }
            if candidate {
                current.push(segment.text);
            }
        }
        if !current.is_empty() {
            entities.push(current.join(" "));
        }

        entities
    }

    fn noun_chunks(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut determiner: Option<&str> = None;
        let mut content: Vec<&str> = Vec::new();

        for segment in self.segments(text) {
            let is_content = !segment.is_punct && !self.stopwords.contains(segment.lower.as_str());

            if is_content && segment.adjacent && (determiner.is_some() || !content.is_empty()) {
                content.push(segment.text);
                continue;
            }

            flush_chunk(&mut chunks, &mut determiner, &mut content);

            if is_content {
                content.push(segment.text);
            } else if CHUNK_DETERMINERS.contains(&segment.lower.as_str()) {
                determiner = Some(segment.text);
            }
        }
        flush_chunk(&mut chunks, &mut determiner, &mut content);

        chunks
    }

    fn tokens(&self, text: &str) -> Vec<AnalyzedToken> {
        self.segments(text)
            .into_iter()
            .map(|segment| AnalyzedToken {
                text: segment.text.to_string(),
                lemma: if segment.is_punct {
                    segment.text.to_string()
                } else {
                    self.lemmatize(segment.text)
                },
                is_stop: self.stopwords.contains(segment.lower.as_str()),
                is_punct: segment.is_punct,
            })
            .collect()
    }

    fn lemmatize(&self, token: &str) -> String {
        let lower = normalize_apostrophes(&token.to_lowercase());
        let word = lower
            .strip_suffix("'s")
            .or_else(|| lower.strip_suffix('\''))
            .unwrap_or(&lower);

        // Strip until a fixed point so "paintings" and "painting" share a lemma.
        let mut current = word.to_string();
        loop {
            if let Some(lemma) = self.irregular.get(current.as_str()) {
                return lemma.to_string();
            }
            if self.invariant.contains(current.as_str())
                || current.chars().count() <= 3
                || !current.chars().all(|c| c.is_ascii_alphabetic())
            {
                return current;
            }

            let stripped = strip_inflection(&current);
            if stripped == current {
                return current;
            }
            current = stripped;
        }
    }
}

fn flush_chunk(chunks: &mut Vec<String>, determiner: &mut Option<&str>, content: &mut Vec<&str>) {
    if !content.is_empty() {
        let mut chunk = determiner.map(|d| format!("{d} ")).unwrap_or_default();
        chunk.push_str(&content.join(" "));
        chunks.push(chunk);
    }
    content.clear();
    *determiner = None;
}

fn normalize_apostrophes(word: &str) -> String {
    word.replace('\u{2019}', "'")
}

/// Suffix rules for regular English inflection. Input is lowercase ASCII, length > 3.
fn strip_inflection(word: &str) -> String {
    let len = word.len();

    if len > 4 {
        if let Some(stem) = word.strip_suffix("ies") {
            return format!("{stem}y");
        }
        if let Some(stem) = word.strip_suffix("ied") {
            return format!("{stem}y");
        }
    }
    if let Some(stem) = word.strip_suffix("sses") {
        return format!("{stem}ss");
    }
    for suffix in ["xes", "ches", "shes"] {
        if word.ends_with(suffix) {
            return word[..len - 2].to_string();
        }
    }
    if len > 4 && word.ends_with("oes") {
        return word[..len - 2].to_string();
    }
    if word.ends_with('s')
        && !["ss", "us", "is", "ics"].iter().any(|s| word.ends_with(s))
    {
        return word[..len - 1].to_string();
    }

    if let Some(stem) = word.strip_suffix("ing") {
        if stem.len() >= 3 && has_vowel(stem) {
            return restore_stem(stem);
        }
    }
    if let Some(stem) = word.strip_suffix("ed") {
        if !word.ends_with("eed") && stem.len() >= 3 && has_vowel(stem) {
            return restore_stem(stem);
        }
    }

    word.to_string()
}

/// Repairs a stem left behind by removing "-ing" or "-ed".
fn restore_stem(stem: &str) -> String {
    let bytes = stem.as_bytes();
    let n = bytes.len();
    let last = bytes[n - 1];

    if n > 3 && last == bytes[n - 2] && b"bdgkmnprt".contains(&last) {
        return stem[..n - 1].to_string();
    }

    let needs_e = matches!(last, b'c' | b'v')
        || (stem.ends_with("at") && n >= 4)
        || stem.ends_with("iz")
        || stem.ends_with("yz")
        || stem.ends_with("ir")
        || stem.ends_with("ur")
        || stem.ends_with("eas")
        || stem.ends_with("dg")
        || (n >= 5 && (stem.ends_with("ang") || stem.ends_with("eng")))
        || is_short_cvc(stem);

    if needs_e {
        format!("{stem}e")
    } else {
        stem.to_string()
    }
}

fn is_vowel(bytes: &[u8], i: usize) -> bool {
    match bytes[i] {
        b'a' | b'e' | b'i' | b'o' | b'u' => true,
        b'y' => i > 0 && !is_vowel(bytes, i - 1),
        _ => false,
    }
}

fn has_vowel(stem: &str) -> bool {
    let bytes = stem.as_bytes();
    (0..bytes.len()).any(|i| is_vowel(bytes, i))
}

/// One syllable ending consonant-vowel-consonant, as in "hik" or "cod".
fn is_short_cvc(stem: &str) -> bool {
    let bytes = stem.as_bytes();
    let n = bytes.len();
    if n < 3 {
        return false;
    }

    let vowel_groups = (0..n)
        .filter(|&i| is_vowel(bytes, i) && (i == 0 || !is_vowel(bytes, i - 1)))
        .count();

    vowel_groups == 1
        && !is_vowel(bytes, n - 3)
        && is_vowel(bytes, n - 2)
        && !is_vowel(bytes, n - 1)
        && !b"wxy".contains(&bytes[n - 1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::extractor::extract_keywords;

    fn lemma(word: &str) -> String {
        RuleBasedAnalyzer::new().lemmatize(word)
    }

    #[test]
    fn test_regular_verb_forms() {
        assert_eq!(lemma("running"), "run");
        assert_eq!(lemma("hiking"), "hike");
        assert_eq!(lemma("hiked"), "hike");
        assert_eq!(lemma("visited"), "visit");
        assert_eq!(lemma("traveling"), "travel");
        assert_eq!(lemma("coding"), "code");
        assert_eq!(lemma("dancing"), "dance");
        assert_eq!(lemma("released"), "release");
        assert_eq!(lemma("creating"), "create");
        assert_eq!(lemma("played"), "play");
        assert_eq!(lemma("studied"), "study");
    }

    #[test]
    fn test_plural_nouns() {
        assert_eq!(lemma("reasons"), "reason");
        assert_eq!(lemma("stories"), "story");
        assert_eq!(lemma("beaches"), "beach");
        assert_eq!(lemma("classes"), "class");
        assert_eq!(lemma("vlogs"), "vlog");
        assert_eq!(lemma("focus"), "focus");
        assert_eq!(lemma("analytics"), "analytics");
    }

    #[test]
    fn test_inflected_plurals_reach_the_base_form() {
        assert_eq!(lemma("paintings"), "paint");
        assert_eq!(lemma("painting"), "paint");
        assert_eq!(lemma("readings"), "read");
        assert_eq!(lemma("mornings"), "morning");
        assert_eq!(lemma("canvas"), "canvas");
    }

    #[test]
    fn test_irregular_and_invariant_forms() {
        assert_eq!(lemma("went"), "go");
        assert_eq!(lemma("Was"), "be");
        assert_eq!(lemma("children"), "child");
        assert_eq!(lemma("news"), "news");
        assert_eq!(lemma("morning"), "morning");
    }

    #[test]
    fn test_possessive_and_case() {
        assert_eq!(lemma("World's"), "world");
        assert_eq!(lemma("world\u{2019}s"), "world");
        assert_eq!(lemma("TECH"), "tech");
    }

    #[test]
    fn test_numbers_pass_through() {
        assert_eq!(lemma("10"), "10");
        assert_eq!(lemma("2024"), "2024");
    }

    #[test]
    fn test_lemmatizer_is_idempotent_on_its_output() {
        let analyzer = RuleBasedAnalyzer::new();
        for word in [
            "running", "hiking", "visited", "stories", "beaches", "released", "dancing",
            "travelers", "photos", "gaming", "vlogging", "cooked", "changed", "paintings",
            "readings", "meetings", "mornings", "doings",
        ] {
            let once = analyzer.lemmatize(word);
            assert_eq!(analyzer.lemmatize(&once), once, "not idempotent for {word}");
        }
    }

    #[test]
    fn test_tokens_flag_stopwords_and_punctuation() {
        let tokens = RuleBasedAnalyzer::new().tokens("Visited Naples today. Was fun!");
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Visited", "Naples", "today", ".", "Was", "fun", "!"]);

        assert_eq!(tokens[0].lemma, "visit");
        assert!(!tokens[0].is_stop);
        assert!(tokens[3].is_punct);
        assert!(tokens[4].is_stop);
        assert_eq!(tokens[4].lemma, "be");
    }

    #[test]
    fn test_entities_are_capitalized_runs_outside_sentence_start() {
        let analyzer = RuleBasedAnalyzer::new();
        let entities =
            analyzer.entities("Here are the reasons why you should go to Black Forest. Naples too");
        assert_eq!(entities, vec!["Black Forest"]);
    }

    #[test]
    fn test_entities_break_on_punctuation() {
        let entities = RuleBasedAnalyzer::new().entities("I love Rome, Paris and Tokyo");
        assert_eq!(entities, vec!["Rome", "Paris", "Tokyo"]);
    }

    #[test]
    fn test_noun_chunks_keep_leading_determiner() {
        let chunks = RuleBasedAnalyzer::new()
            .noun_chunks("I just released a vlog on my stay in Maldives.");
        assert_eq!(chunks, vec!["released", "a vlog", "my stay", "Maldives"]);
    }

    #[test]
    fn test_extract_keywords_end_to_end() {
        let analyzer = RuleBasedAnalyzer::new();
        let keywords = extract_keywords(
            &analyzer,
            "Adventurer, Traveler, Tech Enthusiast. Here are the 10 reasons why you should go to Black Forest",
        );

        for expected in ["black", "forest", "tech", "reason", "10", "the"] {
            assert!(keywords.contains(expected), "missing {expected}: {keywords:?}");
        }
        assert!(!keywords.contains(","));
        assert!(!keywords.contains("why"));
    }

    #[test]
    fn test_extract_keywords_idempotent_on_its_output() {
        let analyzer = RuleBasedAnalyzer::new();
        let first = extract_keywords(&analyzer, "paintings caused readings meetings");
        assert!(first.contains("paint"));
        assert!(!first.contains("painting"));

        let joined = first.iter().cloned().collect::<Vec<_>>().join(" ");
        assert_eq!(extract_keywords(&analyzer, &joined), first);
    }

    #[test]
    fn test_extract_keywords_idempotent_on_lemmas() {
        let analyzer = RuleBasedAnalyzer::new();
        let first = extract_keywords(&analyzer, "travel adventure hike code photography music");
        let joined = first.iter().cloned().collect::<Vec<_>>().join(" ");
        let second = extract_keywords(&analyzer, &joined);
        assert_eq!(first, second);
    }
}
