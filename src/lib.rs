//! # mlptext
//!
//! Wikitext markup trees to plain prose with placeholder-encoded mathematics,
//! and tagged-token reconciliation for the resulting text.
//!
//! ## Stages
//!
//! - **Render**: walk a parsed page, pull out explicit and hidden math, links
//!   and citations into a [`PlaceholderRegistry`] and emit one placeholder
//!   string per section.
//! - **Reconcile**: take an external tagger's tokens for those sections,
//!   repair placeholder splits, merge noun phrases and resolve formulas into
//!   [`Sentence`]s.
//!
//! ## Example
//!
//! ```
//! use mlptext::{render_page, MarkupNode, Page, RenderOptions};
//!
//! let page = Page::new(
//!     "Mass–energy equivalence",
//!     vec![
//!         MarkupNode::text("It states that "),
//!         MarkupNode::tag_extension("math", "E = mc^2."),
//!     ],
//! );
//! let document = render_page(&page, &RenderOptions::default());
//! assert_eq!(document.registry.formula_count(), 1);
//! assert_eq!(document.full_text(), "It states that <math>E = mc^2</math>.");
//! ```

pub mod core;
pub mod data;
pub mod pipeline;
pub mod utils;

pub use mlptext_tree::{MarkupNode, Page, TemplateArgument, XmlAttribute};

pub use crate::core::external::{IdentifierExtractor, PosTagger};
pub use crate::core::reconcile::{
    reconcile_document, reconcile_pretagged, unwind_links, Dependency, ReconcileOptions,
    ReconciledDocument, Reconciler, Sentence, TaggedSentence, TaggedToken, TaggerInput, Word,
};
pub use crate::core::registry::{
    Citation, FormulaKind, MathTag, PlaceholderRegistry, Position, WikidataLink,
};
pub use crate::core::render::{render_page, render_sections, RenderOptions, RenderedDocument, Renderer};
pub use pipeline::{process_batch, process_document, render_batch, DocumentOutput, PipelineConfig};
pub use utils::error::{MlpError, MlpResult, ProcessingWarning, WarningKind};
pub use utils::identifiers::SimpleIdentifierExtractor;

/// Render a page with default options and restore every placeholder.
pub fn page_to_text(page: &Page) -> String {
    render_page(page, &RenderOptions::default()).full_text()
}
