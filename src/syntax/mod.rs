//! Linguistic analysis seam.
//!
//! The reflect stage needs one structural fact about a hypothesis: does it
//! contain a subject and a predicate. [`SyntaxParser`] exposes exactly the
//! token-level view that check needs (coarse part-of-speech tags plus
//! dependency roles), and [`HeuristicParser`] implements it with a
//! rule-based English tagger. A heavier external parser can be dropped in
//! behind the same trait.

use serde::{Deserialize, Serialize};

use crate::types::Result;

pub mod heuristic;

pub use heuristic::HeuristicParser;

/// Coarse part-of-speech tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PosTag {
    /// Nouns and anything defaulted into the nominal bucket.
    Noun,
    /// Personal pronouns.
    Pronoun,
    /// Main verbs.
    Verb,
    /// Auxiliary and modal verbs.
    Auxiliary,
    /// Determiners and possessives.
    Determiner,
    /// Prepositions.
    Adposition,
    /// Coordinating and subordinating conjunctions.
    Conjunction,
    /// Numeric literals.
    Number,
    /// Everything else.
    Other,
}

impl PosTag {
    /// True for tags that can head or support a predicate.
    pub fn is_predicate(&self) -> bool {
        matches!(self, PosTag::Verb | PosTag::Auxiliary)
    }

    /// True for tags that can fill a subject slot.
    pub fn is_nominal(&self) -> bool {
        matches!(self, PosTag::Noun | PosTag::Pronoun | PosTag::Number)
    }
}

/// Dependency role of a token within its sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DepRole {
    /// Subject of an active predicate.
    NominalSubject,
    /// Subject of a passive predicate.
    PassiveNominalSubject,
    /// Predicate head of the sentence.
    Root,
    /// Object of the predicate.
    Object,
    /// Auxiliary supporting the predicate.
    Aux,
    /// Determiner attached to a nominal.
    Det,
    /// Everything else.
    Other,
}

impl DepRole {
    /// True for the subject roles the coherence check looks for.
    pub fn is_subject(&self) -> bool {
        matches!(
            self,
            DepRole::NominalSubject | DepRole::PassiveNominalSubject
        )
    }
}

/// One analyzed token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedToken {
    /// The token text with surrounding punctuation stripped.
    pub text: String,
    /// Part-of-speech tag.
    pub pos: PosTag,
    /// Dependency role.
    pub dep: DepRole,
}

/// Abstract sentence parser.
pub trait SyntaxParser: Send + Sync {
    /// Analyze `text` into a token sequence.
    ///
    /// Implementations backed by external engines may fail with
    /// [`crate::types::AppError::Parsing`]; the built-in heuristic parser
    /// never does.
    fn parse(&self, text: &str) -> Result<Vec<ParsedToken>>;
}
