//! Sentence assembly: resolving formula placeholders through the registry

use std::collections::BTreeSet;

use crate::data::tags;
use crate::utils::error::WarningKind;

use super::word::{Dependency, Sentence, Word};
use super::Reconciler;

/// Split a formula token into its registry key and the trailing remainder
/// past `cutoff` characters.
pub fn formula_key(text: &str, cutoff: usize) -> (&str, Option<&str>) {
    match text.char_indices().nth(cutoff) {
        Some((idx, _)) => (&text[..idx], Some(&text[idx..])),
        None => (text, None),
    }
}

impl Reconciler<'_> {
    pub(crate) fn assemble(&mut self, section: usize, words: Vec<Word>, dependencies: Vec<Dependency>) -> Sentence {
        let mut sentence = Sentence {
            section,
            words: Vec::with_capacity(words.len()),
            identifiers: BTreeSet::new(),
            formulas: BTreeSet::new(),
            dependencies,
        };

        for mut word in words {
            if word.tag != tags::MATH {
                sentence.words.push(word);
                continue;
            }

            let (key, suffix) = formula_key(&word.text, self.options.formula_key_cutoff);
            let (key, suffix) = (key.to_string(), suffix.map(str::to_string));
            let identifiers = match self.formula_identifiers(&key) {
                Some(identifiers) => identifiers,
                None => {
                    self.warn(
                        WarningKind::UnknownPlaceholder,
                        &word.text,
                        "formula does not exist; kept literally",
                    );
                    sentence.words.push(word);
                    continue;
                }
            };

            sentence.identifiers.extend(identifiers);
            sentence.formulas.insert(key.clone());
            let position = word.position;
            if let Some(rest) = suffix {
                word.text = key;
                sentence.words.push(word);
                sentence.words.push(Word::synthetic(position, rest, tags::SUFFIX));
            } else {
                sentence.words.push(word);
            }
        }
        sentence
    }

    /// Identifiers of the formula behind `key`, extracted once and cached on
    /// the record. `None` if the registry has no such formula.
    fn formula_identifiers(&mut self, key: &str) -> Option<BTreeSet<String>> {
        let tag = self.registry.formula(key)?;
        if let Some(identifiers) = &tag.identifiers {
            return Some(identifiers.clone());
        }

        let content = tag.content.clone();
        let identifiers = match self.extractor.identifiers(&content) {
            Ok(identifiers) => identifiers,
            Err(err) => {
                self.warn(WarningKind::MalformedNode, key, err.to_string());
                BTreeSet::new()
            }
        };
        if let Some(tag) = self.registry.formula_mut(key) {
            tag.identifiers = Some(identifiers.clone());
        }
        Some(identifiers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formula_key_cutoff() {
        let token = format!("FORMULA_{}", "a".repeat(32));
        assert_eq!(formula_key(&token, 40), (token.as_str(), None));

        let long = format!("{}_3", token);
        assert_eq!(formula_key(&long, 40), (token.as_str(), Some("_3")));
    }
}
