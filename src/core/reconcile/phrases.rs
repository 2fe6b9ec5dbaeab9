//! Ordered phrase-merge rules
//!
//! Each stage runs over the output of the previous one: quoted spans, then
//! noun-possessive-noun, then adjective-noun, then the widest
//! noun-preposition-noun phrase.

use lazy_static::lazy_static;

use crate::core::registry::is_placeholder;
use crate::data::tags;

use super::matcher::{Pattern, Quantifier, Step};
use super::word::Word;

/// Bracket codes and placeholders never take part in a tag-based rule.
fn is_protected(text: &str) -> bool {
    (text.len() > 1 && text.starts_with('-') && text.ends_with('-')) || is_placeholder(text)
}

fn tagged(word: &Word, class: fn(&str) -> bool) -> bool {
    !is_protected(&word.text) && class(&word.original_tag)
}

fn determiner(w: &Word) -> bool {
    tagged(w, |t| t == tags::DETERMINER)
}

fn adjective(w: &Word) -> bool {
    tagged(w, tags::is_adjective)
}

fn noun(w: &Word) -> bool {
    tagged(w, tags::is_noun)
}

fn possessive(w: &Word) -> bool {
    tagged(w, |t| t == tags::POSSESSIVE_ENDING)
}

fn preposition(w: &Word) -> bool {
    tagged(w, |t| t == tags::PREPOSITION)
}

fn quote(w: &Word) -> bool {
    w.text == tags::QUOTE
}

fn unquote(w: &Word) -> bool {
    w.text == tags::UNQUOTE
}

fn any(_: &Word) -> bool {
    true
}

fn adjective_noun_steps() -> Vec<Step<Word>> {
    vec![
        Step::optional(determiner),
        Step::zero_or_more(adjective),
        Step::one_or_more(noun),
    ]
}

lazy_static! {
    static ref QUOTED: Pattern<Word> = Pattern::new(vec![
        Step::one(quote),
        Step::one_or_more(any),
        Step::one(unquote),
    ]);

    static ref POSSESSIVE_PHRASE: Pattern<Word> = {
        let mut steps = adjective_noun_steps();
        steps.push(Step::one(possessive));
        steps.push(Step::zero_or_more(adjective));
        steps.push(Step::one_or_more(noun));
        Pattern::new(steps)
    };

    static ref ADJECTIVE_NOUN: Pattern<Word> = Pattern::new(adjective_noun_steps());

    static ref WIDEST_PHRASE: Pattern<Word> = {
        let mut steps = adjective_noun_steps();
        steps.push(Step::group(
            vec![
                Step::one(preposition),
                Step::optional(determiner),
                Step::zero_or_more(adjective),
                Step::zero_or_more(noun),
            ],
            Quantifier::Optional,
        ));
        Pattern::new(steps)
    };
}

/// Texts of all words but the last, then the last word's lemma.
pub fn join_words(words: &[Word]) -> String {
    match words.split_last() {
        None => String::new(),
        Some((last, init)) => {
            let mut parts: Vec<&str> = init.iter().map(|w| w.text.as_str()).collect();
            parts.push(&last.lemma);
            parts.join(" ")
        }
    }
}

/// Merge `words` into one word tagged `tag`. A link inside the span takes
/// over the whole span.
pub fn merge_words(words: &[Word], tag: &str) -> Word {
    let position = words.first().map(|w| w.position).unwrap_or_default();
    match words.iter().find(|w| w.tag == tags::LINK) {
        Some(link) => Word::synthetic(position, link.text.clone(), tags::LINK),
        None => Word::synthetic(position, join_words(words), tag),
    }
}

fn last_tag(words: &[Word]) -> &str {
    words.last().map(|w| w.tag.as_str()).unwrap_or_default()
}

pub fn merge_quotes(words: Vec<Word>) -> Vec<Word> {
    QUOTED.replace_all(words, |matched| {
        let inner = &matched[1..matched.len() - 1];
        merge_words(inner, last_tag(inner))
    })
}

pub fn merge_possessive_phrases(words: Vec<Word>) -> Vec<Word> {
    POSSESSIVE_PHRASE.replace_all(words, |matched| merge_words(matched, tags::NOUN_PHRASE))
}

pub fn merge_adjective_nouns(words: Vec<Word>) -> Vec<Word> {
    ADJECTIVE_NOUN.replace_all(words, |matched| merge_words(matched, tags::NOUN_PHRASE))
}

pub fn merge_widest_phrases(words: Vec<Word>) -> Vec<Word> {
    WIDEST_PHRASE.replace_all(words, |matched| merge_words(matched, last_tag(matched)))
}

/// Run every stage in order.
pub fn merge_phrases(words: Vec<Word>) -> Vec<Word> {
    let words = merge_quotes(words);
    let words = merge_possessive_phrases(words);
    let words = merge_adjective_nouns(words);
    merge_widest_phrases(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::Position;
    use pretty_assertions::assert_eq;

    fn words(pairs: &[(&str, &str)]) -> Vec<Word> {
        pairs.iter()
            .enumerate()
            .map(|(i, (text, tag))| Word::new(Position::new(0, 0, i), *text, *text, *tag))
            .collect()
    }

    fn summary(words: &[Word]) -> Vec<(String, String)> {
        words.iter().map(|w| (w.text.clone(), w.tag.clone())).collect()
    }

    #[test]
    fn test_quick_brown_fox() {
        let mut input = words(&[("the", "DT"), ("quick", "JJ"), ("brown", "NN"), ("foxes", "NNS")]);
        input[3].lemma = "fox".to_string();
        let merged = merge_phrases(input);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].text, "the quick brown fox");
        assert_eq!(merged[0].tag, "NOUN_PHRASE");
        assert_eq!(merged[0].position, Position::new(0, 0, 0));
    }

    #[test]
    fn test_possessive_phrase() {
        let input = words(&[("Euler", "NNP"), ("'s", "POS"), ("number", "NN"), ("is", "VBZ")]);
        let merged = merge_possessive_phrases(input);
        assert_eq!(
            summary(&merged),
            vec![
                ("Euler 's number".to_string(), "NOUN_PHRASE".to_string()),
                ("is".to_string(), "VBZ".to_string()),
            ]
        );
    }

    #[test]
    fn test_widest_phrase_takes_last_tag() {
        let input = words(&[("set", "NN"), ("of", "IN"), ("integers", "NNS"), ("is", "VBZ")]);
        let merged = merge_widest_phrases(input);
        assert_eq!(merged[0].text, "set of integers");
        assert_eq!(merged[0].tag, "NNS");
        assert_eq!(merged[1].text, "is");
    }

    #[test]
    fn test_quoted_span() {
        let input = words(&[("``", "``"), ("golden", "JJ"), ("ratio", "NN"), ("''", "''")]);
        let merged = merge_quotes(input);
        assert_eq!(summary(&merged), vec![("golden ratio".to_string(), "NN".to_string())]);
    }

    #[test]
    fn test_quoted_span_extends_to_last_unquote() {
        let input = words(&[
            ("``", "``"),
            ("a", "DT"),
            ("''", "''"),
            ("b", "NN"),
            ("''", "''"),
            ("then", "RB"),
        ]);
        let merged = merge_quotes(input);
        assert_eq!(
            summary(&merged),
            vec![
                ("a '' b".to_string(), "NN".to_string()),
                ("then".to_string(), "RB".to_string()),
            ]
        );
    }

    #[test]
    fn test_link_dominates_merge() {
        let mut input = words(&[("``", "``"), ("see", "VB"), ("LINK_abc", "LINK"), ("''", "''")]);
        input[2].original_tag = "NNP".to_string();
        let merged = merge_quotes(input);
        assert_eq!(summary(&merged), vec![("LINK_abc".to_string(), "LINK".to_string())]);
    }

    #[test]
    fn test_placeholders_and_brackets_are_not_nouns() {
        let input = words(&[("FORMULA_abc", "NN"), ("-LRB-", "NN"), ("value", "NN")]);
        let merged = merge_adjective_nouns(input);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].text, "FORMULA_abc");
        assert_eq!(merged[1].text, "-LRB-");
        assert_eq!(merged[2].tag, "NOUN_PHRASE");
    }
}
