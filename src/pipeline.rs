//! End-to-end pipeline: slots to DAG to token DAG to model inputs.

use crate::assembler::{prepare_inputs, ModelInputs};
use crate::builder::{build_multitext, BuildError};
use crate::config::PipelineConfig;
use crate::merge::{MergeError, MergeReport, TokenMerger};
use crate::multitext::{GraphError, MultiText};
use crate::tokenizer::Tokenizer;
use crate::types::{parse_slots, Slot, TokenRun};

/// Error type for pipeline runs.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Slots could not be laid out.
    #[error("Build failed: {0}")]
    Build(#[from] BuildError),
    /// Branch tokenizations could not be reconciled.
    #[error("Merge failed: {0}")]
    Merge(#[from] MergeError),
    /// A graph invariant was violated.
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
}

/// Slots-to-inputs pipeline bound to one tokenizer and config.
///
/// ## Stages
///
/// 1. Lay the slots out as a text DAG ([`PipelineConfig::build_mode`])
/// 2. Tokenize every leaf ancestry and merge the runs per vertex
/// 3. Flatten into model inputs ([`PipelineConfig::positioning`])
pub struct MultiTextPipeline<T: Tokenizer> {
    tokenizer: T,
    config: PipelineConfig,
}

impl<T: Tokenizer> MultiTextPipeline<T> {
    /// Create a pipeline.
    pub fn new(tokenizer: T, config: PipelineConfig) -> Self {
        Self { tokenizer, config }
    }

    /// Get the config.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Get the tokenizer.
    pub fn tokenizer(&self) -> &T {
        &self.tokenizer
    }

    /// Lay `slots` out as a text DAG.
    pub fn build(&self, slots: &[Slot]) -> Result<MultiText<String>, PipelineError> {
        Ok(build_multitext(self.config.build_mode, slots)?)
    }

    /// Tokenize a text DAG.
    pub fn tokenize(&self, graph: &MultiText<String>) -> Result<MultiText<TokenRun>, PipelineError> {
        self.tokenize_with_report(graph).map(|(tokens, _)| tokens)
    }

    /// Tokenize a text DAG, also returning merge statistics.
    pub fn tokenize_with_report(
        &self,
        graph: &MultiText<String>,
    ) -> Result<(MultiText<TokenRun>, MergeReport), PipelineError> {
        TokenMerger::new(&self.tokenizer)
            .merge_with_report(graph)
            .map_err(|e| {
                tracing::warn!(
                    error = %e,
                    vertices = graph.len(),
                    build_mode = %self.config.build_mode,
                    "Branch tokenizations could not be reconciled"
                );
                PipelineError::from(e)
            })
    }

    /// Flatten a token DAG.
    pub fn assemble(&self, tokens: &MultiText<TokenRun>) -> ModelInputs {
        prepare_inputs(tokens, self.config.positioning)
    }

    /// Run every stage on `slots`.
    pub fn run(&self, slots: &[Slot]) -> Result<ModelInputs, PipelineError> {
        let _span = tracing::debug_span!(
            "multitext_run",
            slots = slots.len(),
            params_hash = %self.config.params_hash(),
        )
        .entered();

        let graph = self.build(slots)?;
        let (tokens, report) = self.tokenize_with_report(&graph)?;
        let inputs = self.assemble(&tokens);

        tracing::debug!(
            vertices = graph.len(),
            leaves = report.leaves,
            relocations = report.relocations,
            tokens = inputs.len(),
            "pipeline run complete"
        );
        Ok(inputs)
    }

    /// Run every stage on a JSON slot list such as `["A ", ["x", "y"], " B"]`.
    pub fn run_json(&self, json: &str) -> Result<ModelInputs, PipelineError> {
        let slots = parse_slots(json).map_err(BuildError::from)?;
        self.run(&slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::PositioningMethod;
    use crate::builder::BuildMode;
    use crate::tokenizer::{Encoding, GreedyTokenizer};

    fn tokenizer() -> GreedyTokenizer {
        GreedyTokenizer::new(
            [("A", 1), (" ", 2), ("x", 3), ("y", 4), ("B", 5), (" B", 6)],
            0,
        )
    }

    #[test]
    fn test_run_standard() {
        let pipeline = MultiTextPipeline::new(tokenizer(), PipelineConfig::standard());
        let inputs = pipeline.run_json(r#"["A ", ["x", "y"], " B"]"#).unwrap();

        assert_eq!(inputs.input_ids, vec![1, 2, 3, 4, 6, 6]);
        assert_eq!(inputs.position_ids, vec![0, 1, 2, 2, 3, 3]);
        assert_eq!(inputs.attended_tokens(4), vec![1, 2, 3, 6]);
        assert_eq!(inputs.attended_tokens(5), vec![1, 2, 4, 6]);
    }

    #[test]
    fn test_modes_share_histories() {
        let slots = parse_slots(r#"["A ", ["x", "y"], " B"]"#).unwrap();
        let mut per_mode = Vec::new();
        for mode in BuildMode::ALL {
            let config = PipelineConfig::new(mode, PositioningMethod::NoAlignment);
            let inputs = MultiTextPipeline::new(tokenizer(), config).run(&slots).unwrap();
            let keys: Vec<_> = inputs.tokens_by_fingerprint(2).into_keys().collect();
            per_mode.push(keys);
        }
        assert_eq!(per_mode[0], per_mode[1]);
        assert_eq!(per_mode[1], per_mode[2]);
    }

    #[test]
    fn test_build_errors_propagate() {
        let pipeline = MultiTextPipeline::new(tokenizer(), PipelineConfig::default());
        assert!(matches!(
            pipeline.run_json(r#"["A", []]"#),
            Err(PipelineError::Build(BuildError::InvalidSlot { slot: 1 }))
        ));
        assert!(matches!(
            pipeline.run_json("not json"),
            Err(PipelineError::Build(BuildError::Parse(_)))
        ));
    }

    #[test]
    fn test_merge_errors_propagate() {
        let broken = |_: &str| Encoding::new(vec![1, 2], vec![Some((0, 1)), None]);
        let pipeline = MultiTextPipeline::new(broken, PipelineConfig::default());
        assert!(matches!(
            pipeline.run(&[Slot::literal("ab")]),
            Err(PipelineError::Merge(MergeError::UnsupportedEmptyToken { token: 1, .. }))
        ));
    }

    #[test]
    fn test_report_counts_leaves() {
        let pipeline = MultiTextPipeline::new(tokenizer(), PipelineConfig::full());
        let graph = pipeline
            .build(&[Slot::literal("A"), Slot::alternatives(["x", "y"]), Slot::alternatives(["A", "B"])])
            .unwrap();
        let (_, report) = pipeline.tokenize_with_report(&graph).unwrap();
        assert_eq!(report.leaves, 4);
        assert_eq!(report.relocations, 0);
    }
}
