//! Lexicon-based polarity classification for reconstructed statement text.
//!
//! Scores a statement against a compiled-in valence lexicon, producing
//! independent nonnegative weights for positive, negative, and neutral —
//! proportions of the statement's tokens, so a lone polar word inside a long
//! sentence still yields a neutral-dominant label. No compound/aggregate
//! score exists. The assigned label is the argmax over the three weights;
//! an exact tie keeps the first maximum in declared order
//! (positive, negative, neutral).

use serde::{Deserialize, Serialize};

/// Dampened flip applied to a valence preceded by a negation token.
const NEGATION_SCALAR: f64 = -0.74;

/// The dominant polarity of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolarityLabel {
    Positive,
    Negative,
    Neutral,
}

impl PolarityLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }

    /// Parse an annotated polarity string (as found on opinion expressions).
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "positive" | "pos" => Some(Self::Positive),
            "negative" | "neg" => Some(Self::Negative),
            "neutral" | "neu" => Some(Self::Neutral),
            _ => None,
        }
    }
}

impl std::fmt::Display for PolarityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Independent nonnegative weights for the three polarity classes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PolarityWeights {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

impl PolarityWeights {
    /// Argmax label; ties keep the first maximum in declared order.
    pub fn label(&self) -> PolarityLabel {
        let ordered = [
            (PolarityLabel::Positive, self.positive),
            (PolarityLabel::Negative, self.negative),
            (PolarityLabel::Neutral, self.neutral),
        ];
        let mut best = ordered[0];
        for candidate in &ordered[1..] {
            if candidate.1 > best.1 {
                best = *candidate;
            }
        }
        best.0
    }
}

/// Score a statement into per-class weights.
///
/// Tokens are lowercased and stripped of surrounding punctuation; a token
/// carrying lexicon valence contributes to the positive or negative weight,
/// every other token counts toward neutral. A negation token flips and
/// dampens the next valence. Weights are normalized to proportions; empty
/// input scores fully neutral.
pub fn score(text: &str) -> PolarityWeights {
    let mut positive = 0.0f64;
    let mut negative = 0.0f64;
    let mut neutral = 0.0f64;
    let mut negated = false;

    for raw in text.split_whitespace() {
        let token: String = raw
            .trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
            .to_lowercase();
        if token.is_empty() {
            continue;
        }
        if is_negation(&token) {
            negated = true;
            neutral += 1.0;
            continue;
        }
        match valence(&token) {
            Some(mut v) => {
                if negated {
                    v *= NEGATION_SCALAR;
                    negated = false;
                }
                if v > 0.0 {
                    positive += v;
                } else {
                    negative += -v;
                }
            }
            None => {
                negated = false;
                neutral += 1.0;
            }
        }
    }

    let total = positive + negative + neutral;
    if total == 0.0 {
        return PolarityWeights { positive: 0.0, negative: 0.0, neutral: 1.0 };
    }
    PolarityWeights {
        positive: positive / total,
        negative: negative / total,
        neutral: neutral / total,
    }
}

/// Classify a statement into its dominant polarity label.
pub fn classify(text: &str) -> PolarityLabel {
    score(text).label()
}

fn is_negation(token: &str) -> bool {
    matches!(
        token,
        "not" | "no" | "never" | "none" | "neither" | "nor" | "cannot" | "n't" | "without"
    ) || token.ends_with("n't")
}

/// Lexicon valence for a lowercased token, if any.
fn valence(token: &str) -> Option<f64> {
    LEXICON
        .binary_search_by_key(&token, |&(word, _)| word)
        .ok()
        .map(|i| LEXICON[i].1)
}

/// Compiled-in valence lexicon, sorted for binary search. Values follow the
/// usual [-4, 4] valence convention; inflected forms common in news prose
/// are listed alongside their lemmas.
static LEXICON: &[(&str, f64)] = &[
    ("abandon", -1.9),
    ("abuse", -3.2),
    ("accomplish", 1.9),
    ("accuse", -1.6),
    ("accused", -1.6),
    ("admire", 2.2),
    ("affordable", 1.4),
    ("afraid", -2.2),
    ("aggressive", -1.4),
    ("agree", 1.5),
    ("alarming", -2.0),
    ("amazing", 2.8),
    ("anger", -2.7),
    ("angry", -2.3),
    ("anxious", -1.9),
    ("applaud", 2.0),
    ("approve", 1.8),
    ("attack", -2.1),
    ("attacked", -2.1),
    ("awful", -3.0),
    ("backing", 1.5),
    ("bad", -2.5),
    ("benefit", 1.9),
    ("best", 3.2),
    ("betray", -3.0),
    ("blame", -2.4),
    ("blamed", -2.4),
    ("block", -1.2),
    ("boost", 1.7),
    ("brilliant", 2.8),
    ("broken", -1.8),
    ("calm", 1.3),
    ("catastrophe", -3.4),
    ("celebrate", 2.7),
    ("champion", 2.4),
    ("chaos", -2.6),
    ("cheat", -2.6),
    ("clash", -1.9),
    ("collapse", -2.5),
    ("commend", 2.1),
    ("concern", -1.2),
    ("condemn", -2.4),
    ("condemned", -2.4),
    ("confident", 2.2),
    ("conflict", -1.8),
    ("congratulate", 2.5),
    ("corrupt", -3.1),
    ("crisis", -2.9),
    ("criticize", -1.9),
    ("criticized", -1.9),
    ("cruel", -3.1),
    ("damage", -2.2),
    ("danger", -2.4),
    ("dead", -3.3),
    ("deadly", -3.0),
    ("deceive", -2.7),
    ("defeat", -1.7),
    ("delight", 2.9),
    ("denied", -1.3),
    ("denounce", -2.3),
    ("deny", -1.3),
    ("destroy", -2.9),
    ("destroyed", -2.9),
    ("devastate", -3.3),
    ("disappoint", -2.2),
    ("disaster", -3.1),
    ("dismiss", -1.4),
    ("dispute", -1.5),
    ("doubt", -1.3),
    ("dread", -2.5),
    ("effective", 1.8),
    ("embrace", 1.7),
    ("emergency", -2.2),
    ("endorse", 1.9),
    ("enjoy", 2.3),
    ("error", -1.5),
    ("excellent", 3.0),
    ("exciting", 2.4),
    ("fail", -2.3),
    ("failed", -2.3),
    ("failure", -2.5),
    ("fair", 1.6),
    ("fake", -2.0),
    ("fear", -2.4),
    ("fight", -1.7),
    ("fine", 1.1),
    ("flourish", 2.3),
    ("fraud", -3.0),
    ("free", 1.5),
    ("gain", 1.6),
    ("generous", 2.3),
    ("good", 1.9),
    ("great", 2.8),
    ("grief", -2.9),
    ("growth", 1.7),
    ("happy", 2.7),
    ("harm", -2.5),
    ("hate", -3.2),
    ("heal", 2.0),
    ("help", 1.7),
    ("hero", 2.6),
    ("honest", 2.3),
    ("hope", 1.9),
    ("hostile", -2.3),
    ("hurt", -2.4),
    ("ideal", 2.4),
    ("illegal", -2.4),
    ("improve", 1.9),
    ("innovative", 2.0),
    ("inspire", 2.3),
    ("insult", -2.2),
    ("jeopardy", -2.4),
    ("joy", 2.9),
    ("kill", -3.6),
    ("killed", -3.6),
    ("laud", 2.4),
    ("lie", -2.4),
    ("lose", -1.9),
    ("loss", -2.1),
    ("lost", -1.9),
    ("love", 3.2),
    ("loyal", 2.1),
    ("mislead", -2.3),
    ("mistake", -1.7),
    ("murder", -3.7),
    ("neglect", -2.2),
    ("nice", 1.8),
    ("oppose", -1.3),
    ("optimistic", 2.1),
    ("outrage", -2.8),
    ("panic", -2.6),
    ("peace", 2.5),
    ("perfect", 2.9),
    ("plunge", -2.0),
    ("poor", -2.1),
    ("praise", 2.5),
    ("praised", 2.5),
    ("problem", -1.7),
    ("progress", 1.9),
    ("promise", 1.3),
    ("prosper", 2.4),
    ("protect", 1.6),
    ("protest", -1.3),
    ("proud", 2.2),
    ("reject", -1.7),
    ("rejected", -1.7),
    ("relief", 1.9),
    ("rescue", 2.1),
    ("resign", -1.2),
    ("respect", 2.1),
    ("rich", 1.8),
    ("risk", -1.5),
    ("ruin", -2.8),
    ("sad", -2.1),
    ("safe", 1.8),
    ("scandal", -2.7),
    ("secure", 1.7),
    ("severe", -2.0),
    ("shock", -2.0),
    ("slam", -2.0),
    ("slammed", -2.0),
    ("smart", 1.9),
    ("strong", 1.8),
    ("succeed", 2.3),
    ("success", 2.7),
    ("support", 1.7),
    ("terrible", -3.0),
    ("terror", -3.2),
    ("threat", -2.4),
    ("thrive", 2.4),
    ("tragedy", -3.2),
    ("triumph", 2.8),
    ("trust", 2.1),
    ("ugly", -2.3),
    ("unfair", -2.1),
    ("urgent", -1.4),
    ("victory", 2.6),
    ("violence", -3.1),
    ("vital", 1.2),
    ("warn", -1.3),
    ("warned", -1.3),
    ("weak", -1.7),
    ("welcome", 1.9),
    ("welcomed", 1.9),
    ("win", 2.8),
    ("won", 2.8),
    ("wonderful", 2.9),
    ("worry", -1.9),
    ("worst", -3.1),
    ("wrong", -2.1),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexicon_is_sorted() {
        for pair in LEXICON.windows(2) {
            assert!(pair[0].0 < pair[1].0, "{} >= {}", pair[0].0, pair[1].0);
        }
    }

    #[test]
    fn classification_is_total_and_deterministic() {
        let texts = [
            "The mayor rejected the plan",
            "wonderful",
            "utter chaos and violence",
            "plain words only here",
        ];
        for text in texts {
            let first = classify(text);
            let second = classify(text);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn polar_words_dominate_short_statements() {
        assert_eq!(classify("awful terrible disaster"), PolarityLabel::Negative);
        assert_eq!(classify("a wonderful triumph"), PolarityLabel::Positive);
    }

    #[test]
    fn long_neutral_context_wins() {
        // One mildly polar token among many neutral ones.
        let label = classify("The committee met on Tuesday to discuss the rejected proposal in detail");
        assert_eq!(label, PolarityLabel::Neutral);
    }

    #[test]
    fn negation_flips_valence() {
        let weights = score("not good");
        assert!(weights.negative > 0.0);
        assert_eq!(weights.positive, 0.0);
    }

    #[test]
    fn empty_text_is_neutral() {
        assert_eq!(classify(""), PolarityLabel::Neutral);
        assert_eq!(score("").neutral, 1.0);
    }

    #[test]
    fn tie_break_keeps_declared_order() {
        let weights = PolarityWeights { positive: 0.5, negative: 0.5, neutral: 0.0 };
        assert_eq!(weights.label(), PolarityLabel::Positive);
        let weights = PolarityWeights { positive: 0.0, negative: 0.5, neutral: 0.5 };
        assert_eq!(weights.label(), PolarityLabel::Negative);
    }

    #[test]
    fn polarity_parse() {
        assert_eq!(PolarityLabel::parse("negative"), Some(PolarityLabel::Negative));
        assert_eq!(PolarityLabel::parse("POS"), Some(PolarityLabel::Positive));
        assert_eq!(PolarityLabel::parse("mixed"), None);
    }
}
