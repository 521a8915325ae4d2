//! Coherence checking stage.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::StageProcessor;
use crate::syntax::SyntaxParser;
use crate::types::{AppError, ResearchRecord, Result};

/// Marks whether the hypothesis is a well-formed sentence.
///
/// Well-formed means the parse contains at least one subject-role token
/// and at least one predicate-tagged token. A structural sanity check,
/// not a truth check; nothing downstream branches on the result.
pub struct ReflectStage {
    parser: Arc<dyn SyntaxParser>,
}

impl ReflectStage {
    /// Create the stage over a shared parser.
    pub fn new(parser: Arc<dyn SyntaxParser>) -> Self {
        Self { parser }
    }
}

#[async_trait]
impl StageProcessor for ReflectStage {
    fn name(&self) -> &'static str {
        "reflect"
    }

    async fn process(&self, mut record: ResearchRecord) -> Result<ResearchRecord> {
        let hypothesis = record.hypothesis.as_deref().ok_or_else(|| {
            AppError::Pipeline("reflect stage ran before a hypothesis existed".to_string())
        })?;

        let coherent = match self.parser.parse(hypothesis) {
            Ok(tokens) => {
                let has_subject = tokens.iter().any(|t| t.dep.is_subject());
                let has_predicate = tokens.iter().any(|t| t.pos.is_predicate());
                has_subject && has_predicate
            }
            Err(e) => {
                warn!(error = %e, "parser failed, marking hypothesis incoherent");
                false
            }
        };

        debug!(coherent, "checked hypothesis structure");
        record.coherent = Some(coherent);
        Ok(record)
    }
}
