//! Built-in identifier extraction
//!
//! A lightweight stand-in for an external identifier service: collects
//! single Latin letters and Greek letter macros, with an attached subscript,
//! from a TeX formula. Upright text and function names are skipped.

use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::Regex;

use crate::core::external::IdentifierExtractor;
use crate::utils::error::MlpResult;

/// Greek letter macros that name variables
pub static GREEK_MACROS: phf::Set<&'static str> = phf::phf_set! {
    "alpha", "beta", "gamma", "delta", "epsilon", "varepsilon", "zeta", "eta",
    "theta", "vartheta", "iota", "kappa", "lambda", "mu", "nu", "xi", "pi",
    "varpi", "rho", "varrho", "sigma", "varsigma", "tau", "upsilon", "phi",
    "varphi", "chi", "psi", "omega",
    "Gamma", "Delta", "Theta", "Lambda", "Xi", "Pi", "Sigma", "Upsilon", "Phi",
    "Psi", "Omega",
};

lazy_static! {
    /// Groups whose content is text, not variables
    static ref UPRIGHT_GROUP: Regex =
        Regex::new(r"\\(?:text|textrm|textit|mathrm|operatorname|mbox|label)\s*\{[^{}]*\}").unwrap();
    static ref IDENTIFIER: Regex =
        Regex::new(r"(\\[a-zA-Z]+|[a-zA-Z])(_(?:\{[^{}]*\}|[a-zA-Z0-9]))?").unwrap();
    static ref MATHML_IDENTIFIER: Regex = Regex::new(r"<mi[^>]*>\s*([^<\s]+)\s*</mi>").unwrap();
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleIdentifierExtractor;

impl SimpleIdentifierExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, tex: &str) -> BTreeSet<String> {
        if tex.trim_start().starts_with('<') {
            return MATHML_IDENTIFIER
                .captures_iter(tex)
                .map(|caps| caps[1].to_string())
                .collect();
        }

        let stripped = UPRIGHT_GROUP.replace_all(tex, " ");
        let mut identifiers = BTreeSet::new();
        for caps in IDENTIFIER.captures_iter(&stripped) {
            let base = &caps[1];
            if let Some(name) = base.strip_prefix('\\') {
                if !GREEK_MACROS.contains(name) {
                    continue;
                }
            }
            let subscript = caps.get(2).map_or("", |m| m.as_str());
            identifiers.insert(format!("{}{}", base, subscript));
        }
        identifiers
    }
}

impl IdentifierExtractor for SimpleIdentifierExtractor {
    fn identifiers(&self, tex: &str) -> MlpResult<BTreeSet<String>> {
        Ok(self.extract(tex))
    }
}
