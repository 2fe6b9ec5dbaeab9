//! Tagged token reconciliation
//!
//! This module takes the tagger's view of a rendered section, repairs
//! tokenizer artifacts around placeholders, classifies the tokens, merges
//! phrases and resolves formula placeholders into sentence structures.

pub mod matcher;
pub mod phrases;
mod sentence;
pub mod word;

use fxhash::FxHashMap;
use lazy_static::lazy_static;
use log::{debug, warn};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::core::external::{IdentifierExtractor, PosTagger};
use crate::core::registry::{PlaceholderKind, PlaceholderRegistry, Position};
use crate::core::render::RenderedDocument;
use crate::data::tags;
use crate::utils::error::{MlpResult, ProcessingWarning, WarningKind};

pub use phrases::{join_words, merge_phrases};
pub use sentence::formula_key;
pub use word::{Dependency, Sentence, TaggedSentence, TaggedToken, Word};

lazy_static! {
    static ref LINK_TOKEN: Regex = Regex::new(r"LINK_[0-9a-zA-Z]+").unwrap();
    static ref POLYNOMIAL: Regex = Regex::new(r"(?i)^polynomials?$").unwrap();
}

/// Options for reconciling tagged tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileOptions {
    /// Characters of a formula token used as the registry key
    /// Default: 40
    pub formula_key_cutoff: usize,

    /// Run the phrase-merge rules
    /// Default: true
    pub merge_phrases: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            formula_key_cutoff: 40,
            merge_phrases: true,
        }
    }
}

impl ReconcileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify and resolve tokens but keep them unmerged
    pub fn tokens_only() -> Self {
        Self {
            merge_phrases: false,
            ..Self::default()
        }
    }
}

/// Section text prepared for the tagger
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaggerInput {
    pub text: String,
    /// Words that stand in for a single-word link, mapped to its placeholder
    pub unwound: FxHashMap<String, String>,
}

/// Result of reconciling one document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconciledDocument {
    pub title: String,
    pub sentences: Vec<Sentence>,
    #[serde(default)]
    pub warnings: Vec<ProcessingWarning>,
}

/// Per-document reconciler. Borrows the document's registry, recording
/// token positions and caching formula identifiers in it.
pub struct Reconciler<'a> {
    title: String,
    registry: &'a mut PlaceholderRegistry,
    extractor: &'a dyn IdentifierExtractor,
    options: ReconcileOptions,
    warnings: Vec<ProcessingWarning>,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        title: impl Into<String>,
        registry: &'a mut PlaceholderRegistry,
        extractor: &'a dyn IdentifierExtractor,
        options: ReconcileOptions,
    ) -> Self {
        Self {
            title: title.into(),
            registry,
            extractor,
            options,
            warnings: Vec::new(),
        }
    }

    pub fn warnings(&self) -> &[ProcessingWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<ProcessingWarning> {
        self.warnings
    }

    pub(crate) fn warn(&mut self, kind: WarningKind, location: &str, message: impl Into<String>) {
        let warning = ProcessingWarning::new(kind, message).with_location(location);
        warn!("{}: {}", self.title, warning);
        self.warnings.push(warning);
    }

    /// Section text for the tagger, see [`unwind_links`].
    pub fn unwind_links(&self, text: &str) -> TaggerInput {
        unwind_links(&*self.registry, text)
    }

    /// Tag one section through `tagger` and reconcile the result.
    pub fn reconcile_section(
        &mut self,
        section: usize,
        text: &str,
        tagger: &dyn PosTagger,
    ) -> MlpResult<Vec<Sentence>> {
        let input = self.unwind_links(text);
        let tagged = tagger.tag(&input.text)?;
        Ok(self.annotate_section(section, tagged, &input.unwound))
    }

    /// Reconcile tagger output for one section.
    pub fn annotate_section(
        &mut self,
        section: usize,
        tagged: Vec<TaggedSentence>,
        unwound: &FxHashMap<String, String>,
    ) -> Vec<Sentence> {
        let mut sentences = Vec::with_capacity(tagged.len());
        for (index, tagged_sentence) in tagged.into_iter().enumerate() {
            let words = self.classify(section, index, &tagged_sentence.tokens, unwound);
            let words = if self.options.merge_phrases {
                merge_phrases(words)
            } else {
                words
            };
            sentences.push(self.assemble(section, words, tagged_sentence.dependencies));
        }
        sentences
    }

    /// Turn tagger tokens into words, recording placeholder positions.
    fn classify(
        &mut self,
        section: usize,
        sentence: usize,
        tokens: &[TaggedToken],
        unwound: &FxHashMap<String, String>,
    ) -> Vec<Word> {
        let tokens = repair_underscores(tokens);
        let mut words: Vec<Word> = Vec::with_capacity(tokens.len());

        for token in &tokens {
            let position = Position::new(section, sentence, words.len());
            let text = token.text.as_str();

            match PlaceholderKind::of(text) {
                Some(PlaceholderKind::Formula) => {
                    let (key, _) = formula_key(text, self.options.formula_key_cutoff);
                    self.registry.record_position(key, position);
                    words.push(
                        Word::new(position, text, token.lemma(), tags::MATH).with_original_tag(&token.tag),
                    );
                }
                Some(PlaceholderKind::Link) => {
                    if !self.registry.record_position(text, position) {
                        self.warn(WarningKind::UnknownPlaceholder, text, "link does not exist");
                    }
                    words.push(
                        Word::new(position, text, token.lemma(), tags::LINK).with_original_tag(&token.tag),
                    );
                }
                Some(PlaceholderKind::Citation) => {
                    // kept in the registry only
                    if !self.registry.record_position(text, position) {
                        self.warn(WarningKind::UnknownPlaceholder, text, "citation does not exist");
                    }
                }
                None if tags::is_symbol(text) => {
                    words.push(
                        Word::new(position, text, token.lemma(), tags::SYMBOL).with_original_tag(&token.tag),
                    );
                }
                None if tags::is_bracket_code(text) => {
                    words.push(Word::new(position, text, token.lemma(), token.tag.as_str()));
                }
                None if POLYNOMIAL.is_match(text) => {
                    words.push(Word::new(position, text, token.lemma(), tags::NOUN));
                }
                None => match unwound.get(text) {
                    Some(placeholder) => {
                        self.registry.record_position(placeholder, position);
                        words.push(
                            Word::new(position, placeholder.as_str(), token.lemma(), tags::LINK)
                                .with_original_tag(&token.tag),
                        );
                    }
                    None => words.push(Word::new(position, text, token.lemma(), token.tag.as_str())),
                },
            }
        }
        words
    }
}

/// Replace link placeholders whose display text is one word by that word.
/// Multi-word links stay placeholders.
pub fn unwind_links(registry: &PlaceholderRegistry, text: &str) -> TaggerInput {
    let mut unwound = FxHashMap::default();
    let replaced = LINK_TOKEN.replace_all(text, |caps: &Captures| {
        let token = &caps[0];
        match registry.link(token) {
            Some(link) => {
                let display = link.display_text();
                if display.is_empty() || display.contains(char::is_whitespace) {
                    token.to_string()
                } else {
                    unwound
                        .entry(display.to_string())
                        .or_insert_with(|| token.to_string());
                    display.to_string()
                }
            }
            None => token.to_string(),
        }
    });
    TaggerInput {
        text: replaced.into_owned(),
        unwound,
    }
}

/// Glue `PLACEHOLDER`, `_`, `suffix` token triples back into one token.
pub fn repair_underscores(tokens: &[TaggedToken]) -> Vec<TaggedToken> {
    let mut out: Vec<TaggedToken> = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        if PlaceholderKind::of(&token.text).is_some() && i + 2 < tokens.len() && tokens[i + 1].text == "_" {
            out.push(TaggedToken::new(
                format!("{}_{}", token.text, tokens[i + 2].text),
                token.tag.clone(),
            ));
            i += 3;
        } else {
            out.push(token.clone());
            i += 1;
        }
    }
    out
}

fn reconcile_with<F>(
    document: &mut RenderedDocument,
    extractor: &dyn IdentifierExtractor,
    options: &ReconcileOptions,
    mut tag_section: F,
) -> ReconciledDocument
where
    F: FnMut(usize, &str) -> MlpResult<Vec<TaggedSentence>>,
{
    let title = document.title.clone();
    let mut reconciler = Reconciler::new(title.clone(), &mut document.registry, extractor, options.clone());
    let mut sentences = Vec::new();

    for (index, text) in document.sections.iter().enumerate() {
        let input = reconciler.unwind_links(text);
        match tag_section(index, &input.text) {
            Ok(tagged) => sentences.extend(reconciler.annotate_section(index, tagged, &input.unwound)),
            Err(err) => reconciler.warn(
                WarningKind::MalformedNode,
                &format!("section {}", index),
                format!("tagging failed: {}", err),
            ),
        }
    }

    debug!("{}: {} sentences", title, sentences.len());
    ReconciledDocument {
        title,
        sentences,
        warnings: reconciler.into_warnings(),
    }
}

/// Tag every section of a rendered document and reconcile the tokens.
/// A section the tagger fails on contributes no sentences.
pub fn reconcile_document(
    document: &mut RenderedDocument,
    tagger: &dyn PosTagger,
    extractor: &dyn IdentifierExtractor,
    options: &ReconcileOptions,
) -> ReconciledDocument {
    reconcile_with(document, extractor, options, |_, text| tagger.tag(text))
}

/// Reconcile tagger output that was produced elsewhere, one entry per
/// section, tagged from [`Reconciler::unwind_links`] text.
pub fn reconcile_pretagged(
    document: &mut RenderedDocument,
    tagged: Vec<Vec<TaggedSentence>>,
    extractor: &dyn IdentifierExtractor,
    options: &ReconcileOptions,
) -> ReconciledDocument {
    let mut tagged = tagged.into_iter();
    reconcile_with(document, extractor, options, |_, _| Ok(tagged.next().unwrap_or_default()))
}
