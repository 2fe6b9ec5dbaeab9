//! Unicode to TeX symbol table
//!
//! Maps non-ASCII code points that show up in running article text to the
//! TeX macro that typesets them. Macro replacements carry a trailing space so
//! adjacent symbols never fuse into a different control sequence.

use phf::phf_map;

/// Unicode symbol → TeX replacement.
pub static UNICODE_TO_TEX: phf::Map<char, &'static str> = phf_map! {
    // Greek lowercase
    'α' => "\\alpha ",
    'β' => "\\beta ",
    'γ' => "\\gamma ",
    'δ' => "\\delta ",
    'ε' => "\\varepsilon ",
    'ϵ' => "\\epsilon ",
    'ζ' => "\\zeta ",
    'η' => "\\eta ",
    'θ' => "\\theta ",
    'ϑ' => "\\vartheta ",
    'ι' => "\\iota ",
    'κ' => "\\kappa ",
    'ϰ' => "\\varkappa ",
    'λ' => "\\lambda ",
    'μ' => "\\mu ",
    'µ' => "\\mu ",
    'ν' => "\\nu ",
    'ξ' => "\\xi ",
    'ο' => "o",
    'π' => "\\pi ",
    'ϖ' => "\\varpi ",
    'ρ' => "\\rho ",
    'ϱ' => "\\varrho ",
    'σ' => "\\sigma ",
    'ς' => "\\varsigma ",
    'τ' => "\\tau ",
    'υ' => "\\upsilon ",
    'φ' => "\\varphi ",
    'ϕ' => "\\phi ",
    'χ' => "\\chi ",
    'ψ' => "\\psi ",
    'ω' => "\\omega ",
    // Greek uppercase
    'Α' => "A",
    'Β' => "B",
    'Γ' => "\\Gamma ",
    'Δ' => "\\Delta ",
    'Ε' => "E",
    'Ζ' => "Z",
    'Η' => "H",
    'Θ' => "\\Theta ",
    'Ι' => "I",
    'Κ' => "K",
    'Λ' => "\\Lambda ",
    'Μ' => "M",
    'Ν' => "N",
    'Ξ' => "\\Xi ",
    'Ο' => "O",
    'Π' => "\\Pi ",
    'Ρ' => "P",
    'Σ' => "\\Sigma ",
    'Τ' => "T",
    'Υ' => "\\Upsilon ",
    'Φ' => "\\Phi ",
    'Χ' => "X",
    'Ψ' => "\\Psi ",
    'Ω' => "\\Omega ",
    // Binary operators
    '±' => "\\pm ",
    '∓' => "\\mp ",
    '×' => "\\times ",
    '÷' => "\\div ",
    '·' => "\\cdot ",
    '⋅' => "\\cdot ",
    '∗' => "\\ast ",
    '∘' => "\\circ ",
    '∙' => "\\bullet ",
    '⊕' => "\\oplus ",
    '⊖' => "\\ominus ",
    '⊗' => "\\otimes ",
    '⊙' => "\\odot ",
    '∧' => "\\wedge ",
    '∨' => "\\vee ",
    '∩' => "\\cap ",
    '∪' => "\\cup ",
    '∖' => "\\setminus ",
    '⊓' => "\\sqcap ",
    '⊔' => "\\sqcup ",
    '−' => "-",
    '–' => "-",
    '⁄' => "/",
    '∕' => "/",
    // Relations
    '≤' => "\\leq ",
    '≥' => "\\geq ",
    '≠' => "\\neq ",
    '≈' => "\\approx ",
    '≡' => "\\equiv ",
    '≅' => "\\cong ",
    '∼' => "\\sim ",
    '≃' => "\\simeq ",
    '∝' => "\\propto ",
    '≪' => "\\ll ",
    '≫' => "\\gg ",
    '≺' => "\\prec ",
    '≻' => "\\succ ",
    '⊂' => "\\subset ",
    '⊃' => "\\supset ",
    '⊆' => "\\subseteq ",
    '⊇' => "\\supseteq ",
    '⊊' => "\\subsetneq ",
    '∈' => "\\in ",
    '∉' => "\\notin ",
    '∋' => "\\ni ",
    '⊥' => "\\perp ",
    '∥' => "\\parallel ",
    '∣' => "\\mid ",
    '⊢' => "\\vdash ",
    '⊨' => "\\models ",
    '≔' => ":=",
    '≝' => "\\stackrel{\\text{def}}{=} ",
    // Arrows
    '→' => "\\to ",
    '←' => "\\leftarrow ",
    '↔' => "\\leftrightarrow ",
    '⇒' => "\\Rightarrow ",
    '⇐' => "\\Leftarrow ",
    '⇔' => "\\Leftrightarrow ",
    '↦' => "\\mapsto ",
    '↑' => "\\uparrow ",
    '↓' => "\\downarrow ",
    '⟶' => "\\longrightarrow ",
    '⟹' => "\\Longrightarrow ",
    '⟺' => "\\Longleftrightarrow ",
    '↪' => "\\hookrightarrow ",
    // Big operators and calculus
    '∑' => "\\sum ",
    '∏' => "\\prod ",
    '∐' => "\\coprod ",
    '∫' => "\\int ",
    '∬' => "\\iint ",
    '∭' => "\\iiint ",
    '∮' => "\\oint ",
    '∂' => "\\partial ",
    '∇' => "\\nabla ",
    '√' => "\\sqrt ",
    '∛' => "\\sqrt[3] ",
    // Logic and sets
    '∀' => "\\forall ",
    '∃' => "\\exists ",
    '∄' => "\\nexists ",
    '¬' => "\\neg ",
    '∅' => "\\emptyset ",
    '∞' => "\\infty ",
    'ℵ' => "\\aleph ",
    'ℏ' => "\\hbar ",
    'ℓ' => "\\ell ",
    '℘' => "\\wp ",
    'ℜ' => "\\Re ",
    'ℑ' => "\\Im ",
    '∴' => "\\therefore ",
    '∵' => "\\because ",
    // Blackboard bold
    'ℕ' => "\\mathbb{N} ",
    'ℤ' => "\\mathbb{Z} ",
    'ℚ' => "\\mathbb{Q} ",
    'ℝ' => "\\mathbb{R} ",
    'ℂ' => "\\mathbb{C} ",
    'ℙ' => "\\mathbb{P} ",
    'ℍ' => "\\mathbb{H} ",
    '𝔼' => "\\mathbb{E} ",
    '𝔽' => "\\mathbb{F} ",
    // Delimiters and misc
    '⟨' => "\\langle ",
    '⟩' => "\\rangle ",
    '⌊' => "\\lfloor ",
    '⌋' => "\\rfloor ",
    '⌈' => "\\lceil ",
    '⌉' => "\\rceil ",
    '‖' => "\\| ",
    '′' => "'",
    '″' => "''",
    '‴' => "'''",
    '°' => "^{\\circ} ",
    '…' => "\\ldots ",
    '⋯' => "\\cdots ",
    '⋮' => "\\vdots ",
    '⋱' => "\\ddots ",
    '†' => "\\dagger ",
    '‡' => "\\ddagger ",
    '★' => "\\star ",
    '⋆' => "\\star ",
    '△' => "\\triangle ",
    '□' => "\\square ",
    '∠' => "\\angle ",
    '\u{a0}' => " ",
    '\u{2009}' => " ",
    '\u{200a}' => " ",
    // Superscripts
    '⁰' => "^{0}",
    '¹' => "^{1}",
    '²' => "^{2}",
    '³' => "^{3}",
    '⁴' => "^{4}",
    '⁵' => "^{5}",
    '⁶' => "^{6}",
    '⁷' => "^{7}",
    '⁸' => "^{8}",
    '⁹' => "^{9}",
    '⁺' => "^{+}",
    '⁻' => "^{-}",
    'ⁿ' => "^{n}",
    'ⁱ' => "^{i}",
    // Subscripts
    '₀' => "_{0}",
    '₁' => "_{1}",
    '₂' => "_{2}",
    '₃' => "_{3}",
    '₄' => "_{4}",
    '₅' => "_{5}",
    '₆' => "_{6}",
    '₇' => "_{7}",
    '₈' => "_{8}",
    '₉' => "_{9}",
    '₊' => "_{+}",
    '₋' => "_{-}",
    'ₙ' => "_{n}",
    'ᵢ' => "_{i}",
    'ⱼ' => "_{j}",
    'ₖ' => "_{k}",
    // Fractions
    '½' => "\\frac{1}{2} ",
    '⅓' => "\\frac{1}{3} ",
    '¼' => "\\frac{1}{4} ",
    '¾' => "\\frac{3}{4} ",
};

/// TeX replacement for a single code point, `None` if it has no mapping.
pub fn char_to_tex(c: char) -> Option<&'static str> {
    UNICODE_TO_TEX.get(&c).copied()
}

/// Replaces every non-ASCII code point that has a TeX mapping; unmapped code
/// points pass through unchanged.
pub fn string_to_tex(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if c.is_ascii() {
            out.push(c);
            continue;
        }
        match char_to_tex(c) {
            Some(tex) => out.push_str(tex),
            None => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greek_letters_map_to_macros() {
        assert_eq!(char_to_tex('α'), Some("\\alpha "));
        assert_eq!(char_to_tex('Ω'), Some("\\Omega "));
    }

    #[test]
    fn test_adjacent_symbols_stay_separate() {
        assert_eq!(string_to_tex("αβ"), "\\alpha \\beta ");
        assert_eq!(string_to_tex("x²"), "x^{2}");
    }

    #[test]
    fn test_unmapped_passes_through() {
        assert_eq!(string_to_tex("naïve"), "naïve");
        assert_eq!(string_to_tex("a+b"), "a+b");
    }
}
