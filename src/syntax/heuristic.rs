//! Rule-based English tagger.
//!
//! Two passes over whitespace tokens. The first assigns part-of-speech
//! tags from closed-class lexicons, a small open-class verb list, and two
//! context rules (a word after a determiner or preposition is nominal, a
//! participle after an auxiliary is a verb). The second assigns dependency
//! roles around the first predicate: the last nominal before it becomes
//! the subject, the first nominal after it becomes the object.
//!
//! The tagger is intentionally coarse. It exists to answer "does this
//! sentence have a subject and a predicate", not to win a treebank
//! benchmark.

use super::{DepRole, ParsedToken, PosTag, SyntaxParser};
use crate::types::Result;

const DETERMINERS: &[&str] = &[
    "the", "a", "an", "this", "that", "these", "those", "no", "every", "each", "some", "any",
    "all", "both", "either", "neither", "another", "such", "its", "their", "his", "her", "my",
    "your", "our",
];

const SUBJECT_PRONOUNS: &[&str] = &["i", "we", "you", "he", "she", "it", "they", "who"];

const OBJECT_PRONOUNS: &[&str] = &["me", "him", "us", "them", "himself", "herself", "itself"];

const AUXILIARIES: &[&str] = &[
    "is", "are", "was", "were", "am", "be", "been", "being", "has", "have", "had", "do", "does",
    "did", "will", "would", "can", "could", "may", "might", "must", "shall", "should",
];

const PREPOSITIONS: &[&str] = &[
    "of", "in", "on", "at", "by", "for", "with", "from", "to", "into", "onto", "over", "under",
    "between", "through", "during", "about", "against", "among", "within", "without", "across",
    "after", "before", "behind", "below", "above", "near", "upon", "as",
];

const CONJUNCTIONS: &[&str] = &[
    "and", "or", "but", "nor", "so", "yet", "because", "although", "though", "while", "whereas",
    "if", "unless", "since", "when", "where", "whether",
];

/// Open-class verbs the pipeline's own phrasing and typical web snippets
/// lean on. Third-person and past forms are listed explicitly since there
/// is no morphology engine behind this.
const COMMON_VERBS: &[&str] = &[
    "suggest", "suggests", "suggested", "show", "shows", "showed", "shown", "indicate",
    "indicates", "indicated", "reveal", "reveals", "revealed", "find", "finds", "found", "prove",
    "proves", "proved", "demonstrate", "demonstrates", "demonstrated", "confirm", "confirms",
    "confirmed", "mean", "means", "meant", "make", "makes", "made", "take", "takes", "took",
    "give", "gives", "gave", "work", "works", "worked", "use", "uses", "used", "form", "forms",
    "formed", "create", "creates", "created", "provide", "provides", "provided", "include",
    "includes", "included", "contain", "contains", "contained", "require", "requires",
    "required", "support", "supports", "supported", "appear", "appears", "appeared", "seem",
    "seems", "seemed", "remain", "remains", "remained", "become", "becomes", "became", "exist",
    "exists", "existed", "occur", "occurs", "occurred", "happen", "happens", "happened", "say",
    "says", "said", "state", "states", "stated", "report", "reports", "reported", "describe",
    "describes", "described", "explain", "explains", "explained", "enable", "enables",
    "enabled", "allow", "allows", "allowed", "help", "helps", "helped", "need", "needs",
    "needed", "know", "knows", "knew", "known", "think", "thinks", "thought", "believe",
    "believes", "believed", "offer", "offers", "offered", "run", "runs", "ran", "go", "goes",
    "went", "come", "comes", "came", "get", "gets", "got", "keep", "keeps", "kept", "hold",
    "holds", "held", "call", "calls", "called", "consider", "considers", "considered", "verify",
    "verifies", "verified", "answer", "answers", "answered",
];

/// Rule-based implementation of [`SyntaxParser`]. Infallible.
#[derive(Debug, Default)]
pub struct HeuristicParser;

impl HeuristicParser {
    /// Create a new parser.
    pub fn new() -> Self {
        Self
    }

    fn tag_pos(&self, words: &[String]) -> Vec<PosTag> {
        let mut tags = Vec::with_capacity(words.len());

        for (i, word) in words.iter().enumerate() {
            let lower = word.to_lowercase();
            let prev = if i == 0 { None } else { tags.get(i - 1).copied() };

            let tag = if lower.parse::<f64>().is_ok() {
                PosTag::Number
            } else if DETERMINERS.contains(&lower.as_str()) {
                PosTag::Determiner
            } else if AUXILIARIES.contains(&lower.as_str()) {
                PosTag::Auxiliary
            } else if PREPOSITIONS.contains(&lower.as_str()) {
                PosTag::Adposition
            } else if CONJUNCTIONS.contains(&lower.as_str()) {
                PosTag::Conjunction
            } else if SUBJECT_PRONOUNS.contains(&lower.as_str())
                || OBJECT_PRONOUNS.contains(&lower.as_str())
            {
                PosTag::Pronoun
            } else if prev == Some(PosTag::Determiner) || prev == Some(PosTag::Adposition) {
                // "an answer", "of use": a determiner or preposition forces
                // the next open-class word into the nominal bucket even when
                // it doubles as a verb.
                PosTag::Noun
            } else if COMMON_VERBS.contains(&lower.as_str()) {
                PosTag::Verb
            } else if prev == Some(PosTag::Auxiliary) && has_verbal_suffix(&lower) {
                PosTag::Verb
            } else {
                // Everything untagged lands in the nominal bucket, which is
                // the common case for content words in web snippets.
                PosTag::Noun
            };
            tags.push(tag);
        }

        tags
    }

    fn assign_roles(&self, words: &[String], tags: &[PosTag]) -> Vec<DepRole> {
        let mut roles = vec![DepRole::Other; words.len()];

        // Predicate region starts at the first verb or auxiliary.
        let pred_start = tags.iter().position(|t| t.is_predicate());

        // Root: prefer a main verb; a bare auxiliary heads the sentence
        // otherwise ("rust is fast").
        let root = tags
            .iter()
            .position(|t| *t == PosTag::Verb)
            .or(pred_start);

        // Passive: auxiliary supporting a past-participle verb, with at
        // most one non-predicate word between ("was quickly formed").
        let passive = root.is_some_and(|r| {
            tags[r] == PosTag::Verb
                && is_past_participle_shaped(&words[r].to_lowercase())
                && ((r >= 1 && tags[r - 1] == PosTag::Auxiliary)
                    || (r >= 2 && tags[r - 2] == PosTag::Auxiliary && !tags[r - 1].is_predicate()))
        });

        for (i, tag) in tags.iter().enumerate() {
            match tag {
                PosTag::Determiner => roles[i] = DepRole::Det,
                PosTag::Auxiliary => roles[i] = DepRole::Aux,
                _ => {}
            }
        }

        if let Some(root) = root {
            roles[root] = DepRole::Root;

            if let Some(pred_start) = pred_start {
                // Last nominal before the predicate region is the subject.
                if let Some(subject) = (0..pred_start).rev().find(|&i| tags[i].is_nominal()) {
                    roles[subject] = if passive {
                        DepRole::PassiveNominalSubject
                    } else {
                        DepRole::NominalSubject
                    };
                }
            }

            // First nominal after the root is the object.
            if let Some(object) = (root + 1..tags.len()).find(|&i| tags[i].is_nominal()) {
                roles[object] = DepRole::Object;
            }
        }

        roles
    }
}

/// Any inflected verb shape, used after an auxiliary ("is running",
/// "was formed", "has taken").
fn has_verbal_suffix(lower: &str) -> bool {
    lower.ends_with("ed") || lower.ends_with("en") || lower.ends_with("ing")
}

/// Past-participle shape only; progressive -ing forms stay active.
fn is_past_participle_shaped(lower: &str) -> bool {
    lower.ends_with("ed") || lower.ends_with("en")
}

/// Whitespace tokens with surrounding punctuation trimmed; empty tokens
/// (bare punctuation) are dropped.
fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .filter(|w| !w.is_empty())
        .collect()
}

impl SyntaxParser for HeuristicParser {
    fn parse(&self, text: &str) -> Result<Vec<ParsedToken>> {
        let words = tokenize(text);
        let tags = self.tag_pos(&words);
        let roles = self.assign_roles(&words, &tags);

        Ok(words
            .into_iter()
            .zip(tags)
            .zip(roles)
            .map(|((text, pos), dep)| ParsedToken { text, pos, dep })
            .collect())
    }
}
