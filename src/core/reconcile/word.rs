//! Token, word and sentence types

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::registry::Position;

/// One token as delivered by the tagger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedToken {
    pub text: String,
    pub tag: String,
    /// Falls back to the text when the tagger gives no lemma
    #[serde(default)]
    pub lemma: Option<String>,
}

impl TaggedToken {
    pub fn new(text: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tag: tag.into(),
            lemma: None,
        }
    }

    pub fn with_lemma(mut self, lemma: impl Into<String>) -> Self {
        self.lemma = Some(lemma.into());
        self
    }

    pub fn lemma(&self) -> &str {
        self.lemma.as_deref().unwrap_or(&self.text)
    }
}

/// Edge of the externally computed dependency structure, indexing tagger tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub governor: usize,
    pub dependent: usize,
    pub relation: String,
}

/// One sentence as delivered by the tagger
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedSentence {
    pub tokens: Vec<TaggedToken>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl TaggedSentence {
    pub fn new(tokens: Vec<TaggedToken>) -> Self {
        Self {
            tokens,
            dependencies: Vec::new(),
        }
    }
}

/// A classified, possibly merged token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    /// Index of the first tagger token the word covers. A `SUFFIX` word split
    /// off a formula token shares that token's position, so registry
    /// positions and word positions stay in the same coordinates.
    pub position: Position,
    pub text: String,
    pub lemma: String,
    pub tag: String,
    /// Tag assigned by the tagger, before reclassification
    pub original_tag: String,
}

impl Word {
    pub fn new(position: Position, text: impl Into<String>, lemma: impl Into<String>, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        Self {
            position,
            text: text.into(),
            lemma: lemma.into(),
            original_tag: tag.clone(),
            tag,
        }
    }

    /// A synthetic word whose lemma is its text
    pub fn synthetic(position: Position, text: impl Into<String>, tag: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(position, text.clone(), text, tag)
    }

    pub fn with_original_tag(mut self, tag: impl Into<String>) -> Self {
        self.original_tag = tag.into();
        self
    }
}

/// A reconciled sentence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    pub section: usize,
    pub words: Vec<Word>,
    /// Union of the identifiers of every referenced formula
    pub identifiers: BTreeSet<String>,
    /// Placeholders of the referenced formulas
    pub formulas: BTreeSet<String>,
    pub dependencies: Vec<Dependency>,
}

impl Sentence {
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Space-joined word texts.
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
