//! Rule-based valence scoring in the manner of VADER
//!
//! Each token found in the valence lexicon contributes its mean valence,
//! adjusted by capitalization emphasis, preceding boosters, negations,
//! "least" constructions and a few idioms. Contributions before "but" are
//! damped and those after it amplified. The sum, raised by `!` and `?`
//! emphasis, is squashed into the compound score.

use super::lexicon::ValenceLexicon;
use serde::{Deserialize, Serialize};

const B_INCR: f64 = 0.293;
const B_DECR: f64 = -0.293;
const C_INCR: f64 = 0.733;
const N_SCALAR: f64 = -0.74;
const NORMALIZE_ALPHA: f64 = 15.0;

const NEGATE: &[&str] = &[
    "aint", "arent", "cannot", "cant", "couldnt", "darent", "didnt", "doesnt", "ain't",
    "aren't", "can't", "couldn't", "daren't", "didn't", "doesn't", "dont", "hadnt", "hasnt",
    "havent", "isnt", "mightnt", "mustnt", "neither", "don't", "hadn't", "hasn't", "haven't",
    "isn't", "mightn't", "mustn't", "neednt", "needn't", "never", "none", "nope", "nor", "not",
    "nothing", "nowhere", "oughtnt", "shant", "shouldnt", "uhuh", "wasnt", "werent", "oughtn't",
    "shan't", "shouldn't", "uh-uh", "wasn't", "weren't", "without", "wont", "wouldnt", "won't",
    "wouldn't", "rarely", "seldom", "despite",
];

const BOOSTERS_UP: &[&str] = &[
    "absolutely", "amazingly", "awfully", "completely", "considerable", "considerably",
    "decidedly", "deeply", "enormous", "enormously", "entirely", "especially", "exceptional",
    "exceptionally", "extreme", "extremely", "fabulously", "fully", "greatly", "hella", "highly",
    "hugely", "incredible", "incredibly", "intensely", "major", "majorly", "more", "most",
    "particularly", "purely", "quite", "really", "remarkably", "so", "substantially",
    "thoroughly", "total", "totally", "tremendous", "tremendously", "uber", "unbelievably",
    "unusually", "utter", "utterly", "very",
];

const BOOSTERS_DOWN: &[&str] = &[
    "almost", "barely", "hardly", "just enough", "kind of", "kinda", "kindof", "kind-of", "less",
    "little", "marginal", "marginally", "occasional", "occasionally", "partly", "scarce",
    "scarcely", "slight", "slightly", "somewhat", "sort of", "sorta", "sortof", "sort-of",
];

const SPECIAL_CASES: &[(&str, f64)] = &[
    ("the shit", 3.0),
    ("the bomb", 3.0),
    ("bad ass", 1.5),
    ("badass", 1.5),
    ("bus stop", 0.0),
    ("yeah right", -2.0),
    ("kiss of death", -1.5),
    ("to die for", 3.0),
    ("beating heart", 3.1),
    ("broken heart", -2.9),
];

/// VADER-style scores; `neg`, `neu`, `pos` sum to about 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ValenceScores {
    pub neg: f64,
    pub neu: f64,
    pub pos: f64,
    pub compound: f64,
}

#[derive(Debug, Clone)]
pub struct ValenceAnalyzer {
    lexicon: ValenceLexicon,
}

fn booster(word: &str) -> Option<f64> {
    if BOOSTERS_UP.contains(&word) {
        Some(B_INCR)
    } else if BOOSTERS_DOWN.contains(&word) {
        Some(B_DECR)
    } else {
        None
    }
}

fn special_case(phrase: &str) -> Option<f64> {
    SPECIAL_CASES
        .iter()
        .find(|(p, _)| *p == phrase)
        .map(|(_, v)| *v)
}

fn is_negated(word: &str) -> bool {
    NEGATE.contains(&word) || word.contains("n't")
}

/// Python-style `isupper`: some cased characters, none of them lower-case.
fn is_all_caps(word: &str) -> bool {
    let mut cased = false;
    for ch in word.chars() {
        if ch.is_lowercase() {
            return false;
        }
        cased |= ch.is_uppercase();
    }
    cased
}

/// Strip surrounding punctuation unless that leaves two characters or
/// fewer, which keeps emoticons such as `:)` intact.
fn strip_punctuation(token: &str) -> &str {
    let stripped = token.trim_matches(|c: char| c.is_ascii_punctuation());
    if stripped.chars().count() <= 2 {
        token
    } else {
        stripped
    }
}

fn normalize_sum(score: f64) -> f64 {
    let norm = score / (score * score + NORMALIZE_ALPHA).sqrt();
    norm.clamp(-1.0, 1.0)
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

struct Tokens<'a> {
    words: Vec<&'a str>,
    lower: Vec<String>,
    cap_differential: bool,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        let words: Vec<&str> = text.split_whitespace().map(strip_punctuation).collect();
        let lower = words.iter().map(|w| w.to_lowercase()).collect();
        let caps = words.iter().filter(|w| is_all_caps(w)).count();
        let cap_differential = caps > 0 && caps < words.len();
        Self {
            words,
            lower,
            cap_differential,
        }
    }
}

impl ValenceAnalyzer {
    pub fn new(lexicon: ValenceLexicon) -> Self {
        Self { lexicon }
    }

    pub fn polarity_scores(&self, text: &str) -> ValenceScores {
        let tokens = Tokens::new(text);
        let n = tokens.words.len();
        let mut sentiments = Vec::with_capacity(n);

        for i in 0..n {
            let lower = tokens.lower[i].as_str();
            if booster(lower).is_some() {
                sentiments.push(0.0);
                continue;
            }
            if i + 1 < n && lower == "kind" && tokens.lower[i + 1] == "of" {
                sentiments.push(0.0);
                continue;
            }
            sentiments.push(self.token_valence(&tokens, i));
        }

        apply_but_rule(&tokens.lower, &mut sentiments);
        self.score(&sentiments, text)
    }

    fn token_valence(&self, tokens: &Tokens<'_>, i: usize) -> f64 {
        let lower = &tokens.lower;
        let item = lower[i].as_str();
        let Some(base) = self.lexicon.get(item) else {
            return 0.0;
        };
        let mut valence = base;

        // "no" in front of another lexicon word acts as a negation only
        if item == "no" && i + 1 < lower.len() && self.lexicon.contains(&lower[i + 1]) {
            valence = 0.0;
        }
        if (i > 0 && lower[i - 1] == "no")
            || (i > 1 && lower[i - 2] == "no")
            || (i > 2 && lower[i - 3] == "no" && matches!(lower[i - 1].as_str(), "or" | "nor"))
        {
            valence = base * N_SCALAR;
        }

        if is_all_caps(tokens.words[i]) && tokens.cap_differential {
            if valence > 0.0 {
                valence += C_INCR;
            } else {
                valence -= C_INCR;
            }
        }

        for start in 0..3 {
            if i > start && !self.lexicon.contains(&lower[i - (start + 1)]) {
                let mut s = self.scalar_inc_dec(tokens, i - (start + 1), valence);
                if start == 1 && s != 0.0 {
                    s *= 0.95;
                }
                if start == 2 && s != 0.0 {
                    s *= 0.9;
                }
                valence += s;
                valence = negation_check(valence, lower, start, i);
                if start == 2 {
                    valence = special_idioms_check(valence, lower, i);
                }
            }
        }

        self.least_check(valence, lower, i)
    }

    fn scalar_inc_dec(&self, tokens: &Tokens<'_>, j: usize, valence: f64) -> f64 {
        let Some(mut scalar) = booster(&tokens.lower[j]) else {
            return 0.0;
        };
        if valence < 0.0 {
            scalar = -scalar;
        }
        if is_all_caps(tokens.words[j]) && tokens.cap_differential {
            if valence > 0.0 {
                scalar += C_INCR;
            } else {
                scalar -= C_INCR;
            }
        }
        scalar
    }

    fn least_check(&self, valence: f64, lower: &[String], i: usize) -> f64 {
        if i > 1 && !self.lexicon.contains(&lower[i - 1]) && lower[i - 1] == "least" {
            if lower[i - 2] != "at" && lower[i - 2] != "very" {
                return valence * N_SCALAR;
            }
        } else if i > 0 && !self.lexicon.contains(&lower[i - 1]) && lower[i - 1] == "least" {
            return valence * N_SCALAR;
        }
        valence
    }

    fn score(&self, sentiments: &[f64], text: &str) -> ValenceScores {
        if sentiments.is_empty() {
            return ValenceScores::default();
        }
        let emphasis = punctuation_emphasis(text);
        let mut sum: f64 = sentiments.iter().sum();
        if sum > 0.0 {
            sum += emphasis;
        } else if sum < 0.0 {
            sum -= emphasis;
        }
        let compound = normalize_sum(sum);

        let (mut pos_sum, mut neg_sum, mut neu_count) = (0.0, 0.0, 0.0);
        for &s in sentiments {
            if s > 0.0 {
                pos_sum += s + 1.0;
            } else if s < 0.0 {
                neg_sum += s - 1.0;
            } else {
                neu_count += 1.0;
            }
        }
        if pos_sum > neg_sum.abs() {
            pos_sum += emphasis;
        } else if pos_sum < neg_sum.abs() {
            neg_sum -= emphasis;
        }

        let total = pos_sum + neg_sum.abs() + neu_count;
        ValenceScores {
            neg: round_to((neg_sum / total).abs(), 3),
            neu: round_to((neu_count / total).abs(), 3),
            pos: round_to((pos_sum / total).abs(), 3),
            compound: round_to(compound, 4),
        }
    }
}

fn negation_check(valence: f64, lower: &[String], start: usize, i: usize) -> f64 {
    let at = |back: usize| lower[i - back].as_str();
    match start {
        0 => {
            if is_negated(at(1)) {
                return valence * N_SCALAR;
            }
        }
        1 => {
            if at(2) == "never" && matches!(at(1), "so" | "this") {
                return valence * 1.25;
            } else if at(2) == "without" && at(1) == "doubt" {
                return valence;
            } else if is_negated(at(2)) {
                return valence * N_SCALAR;
            }
        }
        2 => {
            if at(3) == "never"
                && (matches!(at(2), "so" | "this") || matches!(at(1), "so" | "this"))
            {
                return valence * 1.25;
            } else if at(3) == "without" && (at(2) == "doubt" || at(1) == "doubt") {
                return valence;
            } else if is_negated(at(3)) {
                return valence * N_SCALAR;
            }
        }
        _ => {}
    }
    valence
}

fn special_idioms_check(valence: f64, lower: &[String], i: usize) -> f64 {
    let mut valence = valence;
    let one_zero = format!("{} {}", lower[i - 1], lower[i]);
    let two_one_zero = format!("{} {} {}", lower[i - 2], lower[i - 1], lower[i]);
    let two_one = format!("{} {}", lower[i - 2], lower[i - 1]);
    let three_two_one = format!("{} {} {}", lower[i - 3], lower[i - 2], lower[i - 1]);
    let three_two = format!("{} {}", lower[i - 3], lower[i - 2]);

    for seq in [&one_zero, &two_one_zero, &two_one, &three_two_one, &three_two] {
        if let Some(v) = special_case(seq) {
            valence = v;
            break;
        }
    }
    if lower.len() > i + 1 {
        if let Some(v) = special_case(&format!("{} {}", lower[i], lower[i + 1])) {
            valence = v;
        }
    }
    if lower.len() > i + 2 {
        let zero_one_two = format!("{} {} {}", lower[i], lower[i + 1], lower[i + 2]);
        if let Some(v) = special_case(&zero_one_two) {
            valence = v;
        }
    }
    for n_gram in [&three_two_one, &three_two, &two_one] {
        if let Some(b) = booster(n_gram) {
            valence += b;
        }
    }
    valence
}

/// Damp sentiment before "but", amplify it after.
fn apply_but_rule(lower: &[String], sentiments: &mut [f64]) {
    let Some(but_idx) = lower.iter().position(|w| w == "but") else {
        return;
    };
    for (idx, s) in sentiments.iter_mut().enumerate() {
        if idx < but_idx {
            *s *= 0.5;
        } else if idx > but_idx {
            *s *= 1.5;
        }
    }
}

fn punctuation_emphasis(text: &str) -> f64 {
    let exclamations = text.chars().filter(|c| *c == '!').count().min(4);
    let ep = exclamations as f64 * 0.292;
    let questions = text.chars().filter(|c| *c == '?').count();
    let qm = match questions {
        0 | 1 => 0.0,
        2 | 3 => questions as f64 * 0.18,
        _ => 0.96,
    };
    ep + qm
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> ValenceAnalyzer {
        ValenceAnalyzer::new(ValenceLexicon::from_entries([
            ("good", 1.9),
            ("great", 3.1),
            ("bad", -2.5),
            ("no", -1.2),
            ("excellent", 2.7),
        ]))
    }

    #[test]
    fn test_neutral_text() {
        let scores = analyzer().polarity_scores("the box arrived on tuesday");
        assert_eq!(scores.compound, 0.0);
        assert_eq!(scores.neu, 1.0);
        assert_eq!(scores.pos, 0.0);
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(analyzer().polarity_scores(""), ValenceScores::default());
    }

    #[test]
    fn test_single_positive_word() {
        // sum 1.9 -> 1.9 / sqrt(1.9^2 + 15)
        let scores = analyzer().polarity_scores("good");
        let expected = 1.9 / (1.9f64 * 1.9 + 15.0).sqrt();
        assert!((scores.compound - round_to(expected, 4)).abs() < 1e-9);
        assert_eq!(scores.pos, 1.0);
    }

    #[test]
    fn test_negation_flips_sign() {
        let a = analyzer();
        assert!(a.polarity_scores("this is good").compound > 0.0);
        assert!(a.polarity_scores("this is not good").compound < 0.0);
        assert!(a.polarity_scores("this isn't good").compound < 0.0);
    }

    #[test]
    fn test_booster_and_caps() {
        let a = analyzer();
        let plain = a.polarity_scores("the food is good").compound;
        let boosted = a.polarity_scores("the food is very good").compound;
        let shouted = a.polarity_scores("the food is GOOD").compound;
        assert!(boosted > plain);
        assert!(shouted > plain);
    }

    #[test]
    fn test_but_shifts_weight() {
        let scores = analyzer().polarity_scores("the price is good but the taste is bad");
        assert!(scores.compound < 0.0);
    }

    #[test]
    fn test_exclamation_emphasis() {
        let a = analyzer();
        let calm = a.polarity_scores("great").compound;
        let loud = a.polarity_scores("great!!!").compound;
        assert!(loud > calm);
        assert!(loud <= 1.0);
    }

    #[test]
    fn test_no_before_lexicon_word() {
        // "no" loses its own valence and negates the following word
        let scores = analyzer().polarity_scores("no bad surprises");
        assert!(scores.compound > 0.0);
    }

    #[test]
    fn test_scores_in_range() {
        let scores = analyzer()
            .polarity_scores("GREAT great EXCELLENT excellent good good good!!!! really great");
        assert!((-1.0..=1.0).contains(&scores.compound));
        for part in [scores.neg, scores.neu, scores.pos] {
            assert!((0.0..=1.0).contains(&part));
        }
    }

    #[test]
    fn test_strip_punctuation_keeps_short_tokens() {
        assert_eq!(strip_punctuation("good!"), "good");
        assert_eq!(strip_punctuation(":)"), ":)");
        assert_eq!(strip_punctuation("ok."), "ok.");
    }
}
