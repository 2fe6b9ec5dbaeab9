//! Document pipeline: render, tag, reconcile
//!
//! Every document runs on its own with its own registry. A batch fans out
//! over the rayon pool; a failing document turns into an empty output and
//! never affects the others.

use std::collections::BTreeMap;

use log::{error, info};
use mlptext_tree::Page;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::external::{IdentifierExtractor, PosTagger};
use crate::core::reconcile::{reconcile_document, ReconcileOptions, Sentence};
use crate::core::render::{render_page, RenderOptions, RenderedDocument};
use crate::utils::error::ProcessingWarning;
use crate::utils::panic_message;

/// Options for the whole pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub render: RenderOptions,
    pub reconcile: ReconcileOptions,
}

/// Everything produced for one document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentOutput {
    pub title: String,
    pub document: RenderedDocument,
    pub sentences: Vec<Sentence>,
    /// How many sentences mention each identifier
    pub identifier_counts: BTreeMap<String, usize>,
    /// Word count of the longest sentence
    pub max_sentence_length: usize,
    pub warnings: Vec<ProcessingWarning>,
    pub success: bool,
}

impl DocumentOutput {
    /// Output for a document that failed as a whole.
    pub fn empty(title: impl Into<String>, reason: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            document: RenderedDocument::failed(title.clone(), reason),
            title,
            success: false,
            ..Self::default()
        }
    }

    fn summarize(&mut self) {
        self.identifier_counts.clear();
        for sentence in &self.sentences {
            for identifier in &sentence.identifiers {
                *self.identifier_counts.entry(identifier.clone()).or_insert(0) += 1;
            }
        }
        self.max_sentence_length = self.sentences.iter().map(Sentence::len).max().unwrap_or(0);
    }
}

/// Run one page through the renderer, the tagger and the reconciler.
pub fn process_document(
    page: &Page,
    tagger: &dyn PosTagger,
    extractor: &dyn IdentifierExtractor,
    config: &PipelineConfig,
) -> DocumentOutput {
    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let mut document = render_page(page, &config.render);
        if !document.success {
            let reason = document.error.clone().unwrap_or_default();
            return DocumentOutput::empty(page.title.clone(), reason);
        }

        let reconciled = reconcile_document(&mut document, tagger, extractor, &config.reconcile);
        let mut warnings = document.warnings.clone();
        warnings.extend(reconciled.warnings);

        let mut output = DocumentOutput {
            title: page.title.clone(),
            document,
            sentences: reconciled.sentences,
            warnings,
            success: true,
            ..DocumentOutput::default()
        };
        output.summarize();
        output
    }));

    match outcome {
        Ok(output) => output,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!("{}: processing failed: {}", page.title, message);
            DocumentOutput::empty(page.title.clone(), message)
        }
    }
}

/// Process independent pages in parallel, preserving input order.
pub fn process_batch(
    pages: &[Page],
    tagger: &dyn PosTagger,
    extractor: &dyn IdentifierExtractor,
    config: &PipelineConfig,
) -> Vec<DocumentOutput> {
    let outputs: Vec<DocumentOutput> = pages
        .par_iter()
        .map(|page| process_document(page, tagger, extractor, config))
        .collect();
    let failed = outputs.iter().filter(|o| !o.success).count();
    info!("processed {} documents ({} failed)", outputs.len(), failed);
    outputs
}

/// Render independent pages in parallel, preserving input order.
pub fn render_batch(pages: &[Page], options: &RenderOptions) -> Vec<RenderedDocument> {
    pages.par_iter().map(|page| render_page(page, options)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reconcile::{TaggedSentence, TaggedToken};
    use crate::utils::error::{MlpError, MlpResult};
    use crate::utils::identifiers::SimpleIdentifierExtractor;
    use mlptext_tree::MarkupNode;

    /// Splits on whitespace and tags everything as a noun
    struct NounTagger;

    impl PosTagger for NounTagger {
        fn tag(&self, text: &str) -> MlpResult<Vec<TaggedSentence>> {
            let tokens = text.split_whitespace().map(|t| TaggedToken::new(t, "NN")).collect();
            Ok(vec![TaggedSentence::new(tokens)])
        }
    }

    struct FailingTagger;

    impl PosTagger for FailingTagger {
        fn tag(&self, _text: &str) -> MlpResult<Vec<TaggedSentence>> {
            Err(MlpError::tagger("model not loaded"))
        }
    }

    struct PanickingTagger;

    impl PosTagger for PanickingTagger {
        fn tag(&self, _text: &str) -> MlpResult<Vec<TaggedSentence>> {
            panic!("tagger crashed")
        }
    }

    fn page(title: &str) -> Page {
        Page::new(
            title,
            vec![
                MarkupNode::text("value "),
                MarkupNode::tag_extension("math", "x + y"),
            ],
        )
    }

    #[test]
    fn test_summary_counts_identifiers() {
        let output = process_document(
            &page("Sum"),
            &NounTagger,
            &SimpleIdentifierExtractor::new(),
            &PipelineConfig::default(),
        );
        assert!(output.success);
        assert_eq!(output.sentences.len(), 1);
        assert_eq!(output.identifier_counts.get("x"), Some(&1));
        assert_eq!(output.identifier_counts.get("y"), Some(&1));
        assert_eq!(output.max_sentence_length, 2);
    }

    #[test]
    fn test_tagger_error_keeps_document() {
        let output = process_document(
            &page("Sum"),
            &FailingTagger,
            &SimpleIdentifierExtractor::new(),
            &PipelineConfig::default(),
        );
        assert!(output.success);
        assert!(output.sentences.is_empty());
        assert!(!output.warnings.is_empty());
    }

    #[test]
    fn test_panic_is_contained_per_document() {
        let pages = vec![page("A"), page("B")];
        let outputs = process_batch(
            &pages,
            &PanickingTagger,
            &SimpleIdentifierExtractor::new(),
            &PipelineConfig::default(),
        );
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].title, "A");
        assert!(outputs.iter().all(|o| !o.success));
        assert_eq!(outputs[1].document.sections, vec![String::new()]);
    }
}
