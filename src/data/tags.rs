//! Part-of-speech tag alphabet
//!
//! Penn Treebank tags as emitted by the external tagger, plus the synthetic
//! tags the reconciler assigns.

pub const DETERMINER: &str = "DT";
pub const ADJECTIVE: &str = "JJ";
pub const ADJECTIVE_COMPARATIVE: &str = "JJR";
pub const ADJECTIVE_SUPERLATIVE: &str = "JJS";
pub const NOUN: &str = "NN";
pub const NOUN_PLURAL: &str = "NNS";
pub const NOUN_PROPER: &str = "NNP";
pub const NOUN_PROPER_PLURAL: &str = "NNPS";
pub const FOREIGN_WORD: &str = "FW";
pub const POSSESSIVE_ENDING: &str = "POS";
pub const PREPOSITION: &str = "IN";

/// Opening quotes after PTB escaping.
pub const QUOTE: &str = "``";
/// Closing quotes after PTB escaping.
pub const UNQUOTE: &str = "''";

pub const MATH: &str = "MATH";
pub const LINK: &str = "LINK";
pub const SYMBOL: &str = "SYMBOL";
pub const SUFFIX: &str = "SUFFIX";
pub const NOUN_PHRASE: &str = "NOUN_PHRASE";

/// Tokens tagged [`SYMBOL`] regardless of the tagger's opinion.
pub const SYMBOLS: &[&str] = &["<", "=", ">", "≥", "≤", "|", "/", "\\", "[", "]", "*"];

/// PTB bracket escapes.
pub const BRACKET_CODES: &[(&str, &str)] = &[
    ("-LRB-", "("),
    ("-RRB-", ")"),
    ("-LCB-", "{"),
    ("-RCB-", "}"),
    ("-LSB-", "["),
    ("-RSB-", "]"),
];

pub fn is_adjective(tag: &str) -> bool {
    matches!(tag, ADJECTIVE | ADJECTIVE_COMPARATIVE | ADJECTIVE_SUPERLATIVE)
}

/// Nouns in the phrase rules: every NN* tag, foreign words and phrases that
/// an earlier merge already produced.
pub fn is_noun(tag: &str) -> bool {
    matches!(
        tag,
        NOUN | NOUN_PLURAL | NOUN_PROPER | NOUN_PROPER_PLURAL | FOREIGN_WORD | NOUN_PHRASE
    )
}

pub fn is_symbol(text: &str) -> bool {
    SYMBOLS.contains(&text)
}

pub fn is_bracket_code(text: &str) -> bool {
    BRACKET_CODES.iter().any(|(code, _)| *code == text)
}
