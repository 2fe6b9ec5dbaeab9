//! Interfaces to the collaborators that live outside this crate
//!
//! The tokenizer/part-of-speech tagger and the per-formula identifier
//! extractor are supplied by the caller.

use std::collections::BTreeSet;

use crate::core::reconcile::TaggedSentence;
use crate::utils::error::MlpResult;

/// Tokenizes, sentence-splits and tags one section of placeholder text.
///
/// Implementations are expected to escape brackets the Penn Treebank way
/// (`-LRB-` ...), write quotes as `` `` `` / `''`, and treat two consecutive
/// newlines as a sentence break.
pub trait PosTagger: Send + Sync {
    fn tag(&self, text: &str) -> MlpResult<Vec<TaggedSentence>>;
}

/// Extracts the identifiers used in one TeX formula.
pub trait IdentifierExtractor: Send + Sync {
    fn identifiers(&self, tex: &str) -> MlpResult<BTreeSet<String>>;
}

impl<T: PosTagger + ?Sized> PosTagger for &T {
    fn tag(&self, text: &str) -> MlpResult<Vec<TaggedSentence>> {
        (**self).tag(text)
    }
}

impl<T: IdentifierExtractor + ?Sized> IdentifierExtractor for &T {
    fn identifiers(&self, tex: &str) -> MlpResult<BTreeSet<String>> {
        (**self).identifiers(tex)
    }
}
