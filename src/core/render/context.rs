//! Core state and write machinery for markup rendering
//!
//! This module contains the renderer struct, its options, and the output
//! buffer logic that decides where spaces, newlines and sentence endings go.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::core::registry::{FormulaKind, PlaceholderRegistry, FORMULA_PREFIX};
use crate::utils::error::{ProcessingWarning, WarningKind};

use super::math::split_ending;

// =============================================================================
// Render Options
// =============================================================================

/// Options for rendering a markup tree to placeholder text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Return the existing placeholder when identical formula content is
    /// registered twice
    /// Default: false
    pub reuse_formula_placeholders: bool,

    /// Do not look for math hidden in bold/italic runs and template arguments
    /// Default: false
    pub skip_hidden_math: bool,

    /// Populate the registry without producing prose
    /// Default: false
    pub suppress_output: bool,

    /// Write pending paragraph breaks as real newline characters
    /// Default: true
    pub emit_newlines: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            reuse_formula_placeholders: false,
            skip_hidden_math: false,
            suppress_output: false,
            emit_newlines: true,
        }
    }
}

impl RenderOptions {
    /// Create new options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect placeholders only; sections come back empty
    pub fn tags_only() -> Self {
        Self {
            suppress_output: true,
            ..Self::default()
        }
    }

    /// Only explicit math markup becomes a formula
    pub fn literal() -> Self {
        Self {
            skip_hidden_math: true,
            ..Self::default()
        }
    }

    /// Single-line sections for tools that split on whitespace only
    pub fn flat() -> Self {
        Self {
            emit_newlines: false,
            ..Self::default()
        }
    }
}

// =============================================================================
// Render State
// =============================================================================

/// Output state maintained during tree traversal
#[derive(Debug, Default)]
pub struct RenderState {
    /// Finished text of the current section
    pub out: String,
    /// Line being assembled
    pub line: String,
    /// Completed sections
    pub sections: Vec<String>,
    /// Newlines requested but not yet written
    pub need_newlines: usize,
    /// A separating space is owed before the next word
    pub need_space: bool,
    /// Something has been written in the current section
    pub past_start: bool,
    /// Placeholder of the formula that may still be extended
    pub open_formula: Option<String>,
    /// Sentence punctuation split off the open formula
    pub pending_ending: Option<String>,
    /// Counter for external link references
    pub ext_link_num: usize,
    /// Prose output is switched off
    pub suppressed: bool,
}

impl RenderState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// The tree-walking renderer. One instance renders one page.
pub struct Renderer {
    pub(crate) state: RenderState,
    pub(crate) registry: PlaceholderRegistry,
    pub(crate) options: RenderOptions,
    pub(crate) title: String,
    pub(crate) warnings: Vec<ProcessingWarning>,
}

impl Renderer {
    /// Create a renderer for the page with the given title
    pub fn new(title: impl Into<String>, options: RenderOptions) -> Self {
        let state = RenderState {
            suppressed: options.suppress_output,
            ..RenderState::new()
        };
        Self {
            state,
            registry: PlaceholderRegistry::with_formula_reuse(options.reuse_formula_placeholders),
            options,
            title: title.into(),
            warnings: Vec::new(),
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn registry(&self) -> &PlaceholderRegistry {
        &self.registry
    }

    pub(crate) fn warn(&mut self, kind: WarningKind, location: &str, message: impl Into<String>) {
        let warning = ProcessingWarning::new(kind, message).with_location(location);
        warn!("{}: {}", self.title, warning);
        self.warnings.push(warning);
    }

    // -------------------------------------------------------------------------
    // Spacing
    // -------------------------------------------------------------------------

    /// Request `num` line breaks before the next word. Ignored at the start
    /// of a section.
    pub(crate) fn newline(&mut self, num: usize) {
        if self.state.past_start && num > self.state.need_newlines {
            self.state.need_newlines = num;
        }
    }

    pub(crate) fn want_space(&mut self) {
        if self.state.past_start {
            self.state.need_space = true;
        }
    }

    /// Move the current line into the section buffer.
    pub(crate) fn finish_line(&mut self) {
        let line = std::mem::take(&mut self.state.line);
        self.state.out.push_str(&line);
    }

    fn write_newlines(&mut self, num: usize) {
        self.finish_line();
        if self.options.emit_newlines {
            for _ in 0..num {
                self.state.out.push('\n');
            }
        } else if num > 0 {
            self.state.out.push(' ');
        }
        self.state.need_newlines = 0;
        self.state.need_space = false;
    }

    // -------------------------------------------------------------------------
    // Writing
    // -------------------------------------------------------------------------

    /// Append a single word, honouring pending space and newline requests.
    pub(crate) fn write_word(&mut self, word: &str) {
        if word.is_empty() || self.state.suppressed {
            return;
        }
        if self.state.need_space && self.state.need_newlines == 0 {
            self.state.line.push(' ');
        }
        if self.state.need_newlines > 0 {
            self.write_newlines(self.state.need_newlines);
        }
        self.state.need_space = false;
        self.state.past_start = true;
        self.state.line.push_str(word);
    }

    /// Write running text. Anything but a formula placeholder closes the open
    /// formula first.
    pub(crate) fn write(&mut self, s: &str) {
        if !s.starts_with(FORMULA_PREFIX) {
            self.close_formula();
        }
        if s.is_empty() || self.state.suppressed {
            return;
        }
        if s.starts_with(char::is_whitespace) {
            self.want_space();
        }
        for (i, word) in s.split_whitespace().enumerate() {
            if i > 0 {
                self.want_space();
            }
            self.write_word(word);
        }
        if s.ends_with(char::is_whitespace) {
            self.want_space();
        }
    }

    /// Write a placeholder as a word of its own.
    pub(crate) fn write_placeholder(&mut self, token: &str) {
        self.want_space();
        self.write_word(token);
        self.want_space();
    }

    // -------------------------------------------------------------------------
    // Formulas
    // -------------------------------------------------------------------------

    /// Close the open formula, if any, and put back the punctuation that was
    /// split off it.
    pub(crate) fn close_formula(&mut self) {
        if let Some(token) = self.state.open_formula.take() {
            self.registry.close(&token);
        }
        if let Some(ending) = self.state.pending_ending.take() {
            if !self.state.suppressed {
                self.state.line.push_str(&ending);
            }
        }
    }

    /// Register a new formula and write its placeholder. Math that directly
    /// follows the open formula continues it instead, with the punctuation
    /// split off that formula in between. Otherwise the previous formula is
    /// closed and the new one stays open for extension.
    pub(crate) fn add_formula(&mut self, content: &str, kind: FormulaKind) -> String {
        if self.state.need_newlines == 0 {
            if let Some(token) = self.continue_formula(content) {
                return token;
            }
        }
        self.close_formula();
        let (content, ending) = split_ending(content);
        let token = self.registry.add_formula(content, kind);
        self.write_placeholder(&token);

        let extendable = self
            .registry
            .formula(&token)
            .map(|tag| tag.is_extendable())
            .unwrap_or(false);
        if extendable {
            self.state.open_formula = Some(token.clone());
            self.state.pending_ending = ending;
        } else if let Some(ending) = ending {
            // reused record, nothing to extend; punctuation goes straight out
            if !self.state.suppressed {
                self.state.line.push_str(&ending);
            }
        }
        token
    }

    /// Join `content` onto the open formula. Returns `None` when no formula
    /// is open or it no longer accepts content.
    fn continue_formula(&mut self, content: &str) -> Option<String> {
        let token = self.state.open_formula.clone()?;
        let (body, ending) = split_ending(content);
        let mut joined = self.state.pending_ending.clone().unwrap_or_default();
        joined.push(' ');
        joined.push_str(body);

        match self.registry.extend(&token, &joined) {
            Ok(()) => {
                self.state.pending_ending = ending;
                Some(token)
            }
            Err(err) => {
                self.state.open_formula = None;
                self.warn(WarningKind::ClosedFormula, &token, err.to_string());
                None
            }
        }
    }

    /// Append `fragment` to the open formula. The pending ending is replayed
    /// in front of it; with `split` a new ending is cut off the result.
    /// Returns false when no formula is open.
    pub(crate) fn extend_formula(&mut self, fragment: &str, split: bool) -> bool {
        let token = match self.state.open_formula.clone() {
            Some(token) => token,
            None => return false,
        };

        let mut combined = self.state.pending_ending.take().unwrap_or_default();
        combined.push_str(fragment);
        let (content, ending) = if split {
            let (content, ending) = split_ending(&combined);
            (content.to_string(), ending)
        } else {
            (combined, None)
        };

        match self.registry.extend(&token, &content) {
            Ok(()) => {
                self.state.pending_ending = ending;
            }
            Err(err) => {
                self.state.open_formula = None;
                self.warn(WarningKind::ClosedFormula, &token, err.to_string());
            }
        }
        true
    }

    /// Render into a scratch line and return what was written. Spacing state
    /// of the surrounding text is left untouched.
    pub(crate) fn capture<F>(&mut self, render: F) -> String
    where
        F: FnOnce(&mut Self),
    {
        let saved_line = std::mem::take(&mut self.state.line);
        let saved_space = std::mem::replace(&mut self.state.need_space, false);
        let saved_newlines = std::mem::replace(&mut self.state.need_newlines, 0);
        let saved_start = std::mem::replace(&mut self.state.past_start, false);
        let saved_suppressed = std::mem::replace(&mut self.state.suppressed, false);

        render(self);
        self.close_formula();

        let captured = std::mem::replace(&mut self.state.line, saved_line);
        self.state.need_space = saved_space;
        self.state.need_newlines = saved_newlines;
        self.state.past_start = saved_start;
        self.state.suppressed = saved_suppressed;
        captured
    }

    /// Close the current section. Whitespace-only sections are dropped.
    pub(crate) fn flush_section(&mut self) {
        self.close_formula();
        self.finish_line();
        let out = std::mem::take(&mut self.state.out);
        if !out.trim().is_empty() {
            self.state.sections.push(out);
        }
        self.state.need_newlines = 0;
        self.state.need_space = false;
        self.state.past_start = false;
    }

    /// Flush the final section and hand back everything collected.
    pub(crate) fn finish(mut self) -> (Vec<String>, PlaceholderRegistry, Vec<ProcessingWarning>) {
        self.close_formula();
        self.finish_line();
        let out = std::mem::take(&mut self.state.out);
        if !out.trim().is_empty() || self.state.sections.is_empty() {
            self.state.sections.push(out);
        }
        (self.state.sections, self.registry, self.warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> Renderer {
        Renderer::new("Test", RenderOptions::default())
    }

    #[test]
    fn test_write_joins_words_with_single_spaces() {
        let mut r = renderer();
        r.write("  the   quick ");
        r.write("fox");
        let (sections, _, _) = r.finish();
        assert_eq!(sections, vec!["the quick fox".to_string()]);
    }

    #[test]
    fn test_newlines_are_ignored_before_first_word() {
        let mut r = renderer();
        r.newline(2);
        r.write("a");
        r.newline(2);
        r.newline(1);
        r.write("b");
        let (sections, _, _) = r.finish();
        assert_eq!(sections, vec!["a\n\nb".to_string()]);
    }

    #[test]
    fn test_flat_option_replaces_newlines() {
        let mut r = Renderer::new("Test", RenderOptions::flat());
        r.write("a");
        r.newline(2);
        r.write("b");
        let (sections, _, _) = r.finish();
        assert_eq!(sections, vec!["a b".to_string()]);
    }

    #[test]
    fn test_formula_ending_is_replayed_on_close() {
        let mut r = renderer();
        r.write("so");
        let token = r.add_formula("x = 1.", FormulaKind::Latex);
        r.write("Next");
        let (sections, registry, _) = r.finish();
        assert_eq!(sections[0], format!("so {}. Next", token));
        assert_eq!(registry.formula(&token).unwrap().content, "x = 1");
    }

    #[test]
    fn test_extend_prepends_pending_ending() {
        let mut r = renderer();
        let token = r.add_formula("a,", FormulaKind::Latex);
        assert!(r.extend_formula("b.", true));
        let (sections, registry, _) = r.finish();
        assert_eq!(registry.formula(&token).unwrap().content, "a,b");
        assert_eq!(sections[0], format!("{}.", token));
    }

    #[test]
    fn test_adjacent_math_continues_open_formula() {
        let mut r = renderer();
        let first = r.add_formula("a,", FormulaKind::Latex);
        let second = r.add_formula("b.", FormulaKind::Latex);
        r.write("Then");
        let (sections, registry, _) = r.finish();
        assert_eq!(first, second);
        assert_eq!(registry.formula_count(), 1);
        assert_eq!(registry.formula(&first).unwrap().content, "a, b");
        assert_eq!(sections[0], format!("{}. Then", first));
    }

    #[test]
    fn test_math_after_text_opens_new_formula() {
        let mut r = renderer();
        let first = r.add_formula("a,", FormulaKind::Latex);
        r.write(" and ");
        let second = r.add_formula("b", FormulaKind::Latex);
        let (sections, registry, _) = r.finish();
        assert_ne!(first, second);
        assert_eq!(registry.formula(&first).unwrap().content, "a");
        assert_eq!(sections[0], format!("{}, and {}", first, second));
    }

    #[test]
    fn test_extend_without_open_formula() {
        let mut r = renderer();
        assert!(!r.extend_formula("^{2}", false));
    }

    #[test]
    fn test_capture_keeps_outer_spacing() {
        let mut r = renderer();
        r.write("see ");
        let captured = r.capture(|r| r.write(" inner text "));
        assert_eq!(captured, "inner text");
        r.write("after");
        let (sections, _, _) = r.finish();
        assert_eq!(sections[0], "see after");
    }

    #[test]
    fn test_suppressed_output_still_registers() {
        let mut r = Renderer::new("Test", RenderOptions::tags_only());
        r.write("hidden words");
        let token = r.add_formula("x", FormulaKind::Latex);
        let (sections, registry, _) = r.finish();
        assert_eq!(sections, vec![String::new()]);
        assert!(registry.formula(&token).is_some());
    }
}
