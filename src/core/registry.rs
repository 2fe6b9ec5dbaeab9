//! Placeholder registry
//!
//! Every formula, wiki link and citation found while rendering a page is
//! stored here under a deterministic placeholder token. The rendered text
//! carries only the tokens; the reconciler and the full-text reconstruction
//! resolve them back through the registry. One registry belongs to exactly
//! one document.

use std::collections::BTreeSet;
use std::fmt::Write;

use indexmap::IndexMap;
use lazy_static::lazy_static;
use log::warn;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::utils::error::RegistryError;

pub const FORMULA_PREFIX: &str = "FORMULA_";
pub const LINK_PREFIX: &str = "LINK_";
pub const CITE_PREFIX: &str = "CITE_";

/// Opening delimiter used when formulas are substituted back into text.
pub const MATH_OPEN: &str = "<math>";
/// Closing delimiter used when formulas are substituted back into text.
pub const MATH_CLOSE: &str = "</math>";

/// Hex digits kept from the content digest.
const HASH_LEN: usize = 32;

lazy_static! {
    /// Any placeholder token, including underscore-repaired suffixes.
    pub static ref PLACEHOLDER_PATTERN: Regex =
        Regex::new(r"(?:FORMULA|LINK|CITE)_[0-9A-Za-z]+").unwrap();
    static ref PLACEHOLDER_EXACT: Regex =
        Regex::new(r"^(?:FORMULA|LINK|CITE)_[0-9A-Za-z_]+$").unwrap();
}

/// How a formula was written in the source markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormulaKind {
    /// `{{math}}` template or emphasis-encoded math
    MathTemplate,
    /// `{{mvar}}` template
    MvarTemplate,
    /// `<math>` tag, inline math found in text, or a detached sub/sup
    Latex,
    /// `<chem>` / `<ce>`
    LatexChem,
    /// `<math>` whose body is MathML
    MathMl,
}

impl FormulaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormulaKind::MathTemplate => "math_template",
            FormulaKind::MvarTemplate => "mvar_template",
            FormulaKind::Latex => "latex",
            FormulaKind::LatexChem => "latex_chem",
            FormulaKind::MathMl => "mathml",
        }
    }
}

/// Word position inside a document: section, sentence, token index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub section: usize,
    pub sentence: usize,
    pub word: usize,
}

impl Position {
    pub fn new(section: usize, sentence: usize, word: usize) -> Self {
        Self {
            section,
            sentence,
            word,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathTag {
    /// Digest of the content the tag was created with.
    pub id: String,
    pub content: String,
    pub kind: FormulaKind,
    pub placeholder: String,
    extendable: bool,
    #[serde(default)]
    pub positions: Vec<Position>,
    /// Identifiers reported by the extractor, filled lazily.
    #[serde(default)]
    pub identifiers: Option<BTreeSet<String>>,
}

impl MathTag {
    pub fn is_extendable(&self) -> bool {
        self.extendable
    }

    /// Appends to the content while the tag is still open.
    pub fn extend(&mut self, more: &str) -> Result<(), RegistryError> {
        if !self.extendable {
            return Err(RegistryError::Closed {
                token: self.placeholder.clone(),
                rejected: more.to_string(),
            });
        }
        self.content.push_str(more);
        Ok(())
    }

    /// Closes the tag permanently.
    pub fn close(&mut self) {
        self.extendable = false;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikidataLink {
    pub target: String,
    #[serde(default)]
    pub title: Option<String>,
    pub placeholder: String,
    #[serde(default)]
    pub positions: Vec<Position>,
}

impl WikidataLink {
    /// Display title if one was given, otherwise the link target.
    pub fn display_text(&self) -> &str {
        match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title,
            _ => self.target.trim(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    #[serde(default)]
    pub name: Option<String>,
    pub body: String,
    pub placeholder: String,
    #[serde(default)]
    pub positions: Vec<Position>,
}

/// Which record family a placeholder token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderKind {
    Formula,
    Link,
    Citation,
}

impl PlaceholderKind {
    /// Classifies a token by its prefix.
    pub fn of(token: &str) -> Option<Self> {
        if token.starts_with(FORMULA_PREFIX) {
            Some(PlaceholderKind::Formula)
        } else if token.starts_with(LINK_PREFIX) {
            Some(PlaceholderKind::Link)
        } else if token.starts_with(CITE_PREFIX) {
            Some(PlaceholderKind::Citation)
        } else {
            None
        }
    }
}

/// True if the whole token has placeholder shape.
pub fn is_placeholder(token: &str) -> bool {
    PLACEHOLDER_EXACT.is_match(token)
}

/// A resolved registry record.
#[derive(Debug, Clone, Copy)]
pub enum Record<'a> {
    Formula(&'a MathTag),
    Link(&'a WikidataLink),
    Citation(&'a Citation),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderRegistry {
    formulas: IndexMap<String, MathTag>,
    links: IndexMap<String, WikidataLink>,
    citations: IndexMap<String, Citation>,
    /// Identical formulas share one record instead of minting a new one.
    #[serde(default)]
    reuse_formulas: bool,
}

impl PlaceholderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_formula_reuse(reuse: bool) -> Self {
        Self {
            reuse_formulas: reuse,
            ..Self::default()
        }
    }

    /// Registers a formula and returns its placeholder. The new tag is open
    /// for extension until [`close`](Self::close) is called.
    ///
    /// With formula reuse, a record whose current content and kind match is
    /// returned instead. A reused record is closed.
    pub fn add_formula(&mut self, content: impl Into<String>, kind: FormulaKind) -> String {
        let content = content.into();
        if self.reuse_formulas {
            if let Some(tag) = self
                .formulas
                .values_mut()
                .find(|tag| tag.kind == kind && tag.content == content)
            {
                tag.close();
                return tag.placeholder.clone();
            }
        }

        let mut id = content_hash(&[kind.as_str(), &content]);
        let mut token = format!("{}{}", FORMULA_PREFIX, id);
        // Repeated or since-extended content gets a fresh record; the
        // occurrence number keeps the token deterministic.
        let mut occurrence = 1usize;
        while self.formulas.contains_key(&token) {
            id = content_hash(&[kind.as_str(), &content, &occurrence.to_string()]);
            token = format!("{}{}", FORMULA_PREFIX, id);
            occurrence += 1;
        }

        self.formulas.insert(
            token.clone(),
            MathTag {
                id,
                content,
                kind,
                placeholder: token.clone(),
                extendable: true,
                positions: Vec::new(),
                identifiers: None,
            },
        );
        token
    }

    /// Registers a link target. A display title fills in a record that was
    /// first seen without one.
    pub fn add_link(&mut self, target: impl Into<String>, title: Option<String>) -> String {
        let target = target.into();
        let token = format!("{}{}", LINK_PREFIX, content_hash(&[&target]));
        let title = title.filter(|t| !t.trim().is_empty());
        match self.links.get_mut(&token) {
            Some(existing) => {
                if existing.title.is_none() {
                    existing.title = title;
                }
            }
            None => {
                self.links.insert(
                    token.clone(),
                    WikidataLink {
                        target,
                        title,
                        placeholder: token.clone(),
                        positions: Vec::new(),
                    },
                );
            }
        }
        token
    }

    pub fn add_citation(&mut self, name: Option<String>, body: impl Into<String>) -> String {
        let body = body.into();
        let name = name.filter(|n| !n.is_empty());
        let token = format!(
            "{}{}",
            CITE_PREFIX,
            content_hash(&[name.as_deref().unwrap_or(""), &body])
        );
        self.citations
            .entry(token.clone())
            .or_insert_with(|| Citation {
                name,
                body,
                placeholder: token.clone(),
                positions: Vec::new(),
            });
        token
    }

    pub fn lookup(&self, token: &str) -> Option<Record<'_>> {
        match PlaceholderKind::of(token)? {
            PlaceholderKind::Formula => self.formulas.get(token).map(Record::Formula),
            PlaceholderKind::Link => self.links.get(token).map(Record::Link),
            PlaceholderKind::Citation => self.citations.get(token).map(Record::Citation),
        }
    }

    pub fn formula(&self, token: &str) -> Option<&MathTag> {
        self.formulas.get(token)
    }

    pub fn formula_mut(&mut self, token: &str) -> Option<&mut MathTag> {
        self.formulas.get_mut(token)
    }

    pub fn link(&self, token: &str) -> Option<&WikidataLink> {
        self.links.get(token)
    }

    pub fn citation(&self, token: &str) -> Option<&Citation> {
        self.citations.get(token)
    }

    /// Appends to an open formula.
    pub fn extend(&mut self, token: &str, more: &str) -> Result<(), RegistryError> {
        match self.formulas.get_mut(token) {
            Some(tag) => tag.extend(more),
            None => Err(RegistryError::UnknownToken(token.to_string())),
        }
    }

    pub fn close(&mut self, token: &str) {
        if let Some(tag) = self.formulas.get_mut(token) {
            tag.close();
        }
    }

    /// Records where a placeholder ended up after tokenization.
    pub fn record_position(&mut self, token: &str, position: Position) -> bool {
        let positions = match PlaceholderKind::of(token) {
            Some(PlaceholderKind::Formula) => self.formulas.get_mut(token).map(|t| &mut t.positions),
            Some(PlaceholderKind::Link) => self.links.get_mut(token).map(|l| &mut l.positions),
            Some(PlaceholderKind::Citation) => {
                self.citations.get_mut(token).map(|c| &mut c.positions)
            }
            None => None,
        };
        match positions {
            Some(positions) => {
                positions.push(position);
                true
            }
            None => false,
        }
    }

    pub fn formulas(&self) -> impl Iterator<Item = &MathTag> {
        self.formulas.values()
    }

    pub fn links(&self) -> impl Iterator<Item = &WikidataLink> {
        self.links.values()
    }

    pub fn citations(&self) -> impl Iterator<Item = &Citation> {
        self.citations.values()
    }

    pub fn formula_count(&self) -> usize {
        self.formulas.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn citation_count(&self) -> usize {
        self.citations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formulas.is_empty() && self.links.is_empty() && self.citations.is_empty()
    }

    /// Substitutes every known placeholder in `text`: formulas become
    /// `<math>content</math>`, links their display text, citations vanish.
    /// Unknown tokens are kept literally.
    pub fn restore(&self, text: &str) -> String {
        let restored = PLACEHOLDER_PATTERN.replace_all(text, |caps: &Captures| {
            let token = &caps[0];
            match self.lookup(token) {
                Some(Record::Formula(tag)) => format!("{}{}{}", MATH_OPEN, tag.content, MATH_CLOSE),
                Some(Record::Link(link)) => link.display_text().to_string(),
                Some(Record::Citation(_)) => String::new(),
                None => {
                    warn!("placeholder {} has no registry record", token);
                    token.to_string()
                }
            }
        });
        restored.into_owned()
    }
}

/// Stable digest of the given parts, truncated to [`HASH_LEN`] hex digits.
fn content_hash(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            hasher.update([0x1fu8]);
        }
        hasher.update(part.as_bytes());
    }
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(HASH_LEN);
    for byte in digest.iter().take(HASH_LEN / 2) {
        let _ = write!(hex, "{:02x}", byte);
    }
    hex
}
