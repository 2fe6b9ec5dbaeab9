//! Markup tree to placeholder text
//!
//! This module walks a parsed wiki page and produces one plain-text string per
//! section. Formulas, links and citations are replaced by opaque placeholder
//! tokens whose records are kept in a [`PlaceholderRegistry`].

pub mod context;
mod markup;
pub mod math;
pub mod template;

use log::{debug, error};
use mlptext_tree::{MarkupNode, Page};
use serde::{Deserialize, Serialize};

use crate::core::registry::PlaceholderRegistry;
use crate::utils::error::ProcessingWarning;
use crate::utils::panic_message;

pub use context::{RenderOptions, RenderState, Renderer};
pub use math::{hidden_math, normalize, scan_text, split_ending, Segment};
pub use template::{math_tag_kind, IGNORED_TEMPLATES, MATHML_NAMESPACE};

/// Result of rendering one page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderedDocument {
    pub title: String,
    /// Placeholder text, one entry per section
    pub sections: Vec<String>,
    pub registry: PlaceholderRegistry,
    #[serde(default)]
    pub warnings: Vec<ProcessingWarning>,
    /// False when rendering aborted and the sections were discarded
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn default_success() -> bool {
    true
}

impl RenderedDocument {
    /// Document for a page whose rendering failed: a single empty section.
    pub fn failed(title: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sections: vec![String::new()],
            registry: PlaceholderRegistry::new(),
            warnings: Vec::new(),
            success: false,
            error: Some(error.into()),
        }
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Get warnings as formatted strings
    pub fn format_warnings(&self) -> Vec<String> {
        self.warnings.iter().map(|w| w.to_string()).collect()
    }

    /// The sections joined by blank lines with every placeholder restored.
    pub fn full_text(&self) -> String {
        self.registry.restore(&self.sections.join("\n\n"))
    }
}

impl Renderer {
    /// Render the given nodes and consume the renderer.
    pub fn render(mut self, nodes: &[MarkupNode]) -> RenderedDocument {
        self.visit_all(nodes);
        let title = self.title.clone();
        let (sections, registry, warnings) = self.finish();
        RenderedDocument {
            title,
            sections,
            registry,
            warnings,
            success: true,
            error: None,
        }
    }
}

/// Render a page. A panic anywhere in the walk yields a single empty section.
pub fn render_page(page: &Page, options: &RenderOptions) -> RenderedDocument {
    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        Renderer::new(page.title.clone(), options.clone()).render(&page.content)
    }));

    match outcome {
        Ok(document) => {
            debug!(
                "{}: {} sections, {} formulas, {} links, {} citations",
                document.title,
                document.sections.len(),
                document.registry.formula_count(),
                document.registry.link_count(),
                document.registry.citation_count()
            );
            document
        }
        Err(payload) => {
            let message = format!("Rendering failed: {}", panic_message(payload.as_ref()));
            error!("{}: {}", page.title, message);
            RenderedDocument::failed(page.title.clone(), message)
        }
    }
}

/// Render a page with default options and return only its sections.
pub fn render_sections(page: &Page) -> Vec<String> {
    render_page(page, &RenderOptions::default()).sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::FormulaKind;
    use crate::utils::error::WarningKind;
    use mlptext_tree::{TableCell, TableRow, TemplateArgument, XmlAttribute};
    use pretty_assertions::assert_eq;

    fn render(nodes: Vec<MarkupNode>) -> RenderedDocument {
        render_page(&Page::new("Test", nodes), &RenderOptions::default())
    }

    fn only_formula(doc: &RenderedDocument) -> (String, String, FormulaKind) {
        assert_eq!(doc.registry.formula_count(), 1, "{:?}", doc.registry);
        let tag = doc.registry.formulas().next().unwrap();
        (tag.placeholder.clone(), tag.content.clone(), tag.kind)
    }

    #[test]
    fn test_math_tag_with_trailing_period() {
        let doc = render(vec![
            MarkupNode::text("We have "),
            MarkupNode::tag_extension("math", "E = mc^2."),
            MarkupNode::text(" Then"),
        ]);
        let (token, content, kind) = only_formula(&doc);
        assert_eq!(content, "E = mc^2");
        assert_eq!(kind, FormulaKind::Latex);
        assert_eq!(doc.sections, vec![format!("We have {}. Then", token)]);
    }

    #[test]
    fn test_math_followed_by_superscript_merges() {
        let doc = render(vec![
            MarkupNode::tag_extension("math", "x"),
            MarkupNode::xml_element("sup", vec![MarkupNode::text("2")]),
        ]);
        let (token, content, _) = only_formula(&doc);
        assert_eq!(content, "x^{2}");
        assert_eq!(doc.sections, vec![token]);
        assert!(!doc.has_warnings());
    }

    #[test]
    fn test_detached_subscript_warns() {
        let doc = render(vec![
            MarkupNode::text("x "),
            MarkupNode::xml_element("sub", vec![MarkupNode::text("i")]),
        ]);
        let (_, content, _) = only_formula(&doc);
        assert_eq!(content, "_{i}");
        assert!(doc.has_warnings());
    }

    #[test]
    fn test_inline_greek_becomes_formula() {
        let doc = render(vec![MarkupNode::text("the angle θ is small")]);
        let (token, content, _) = only_formula(&doc);
        assert_eq!(content, r"\theta");
        assert_eq!(doc.sections, vec![format!("the angle {} is small", token)]);
    }

    #[test]
    fn test_plain_numbers_stay_prose() {
        let doc = render(vec![MarkupNode::text("In 1990, there were 3 cases.")]);
        assert_eq!(doc.registry.formula_count(), 0);
        assert_eq!(doc.sections, vec!["In 1990, there were 3 cases.".to_string()]);
    }

    #[test]
    fn test_italic_symbol_is_hidden_math() {
        let doc = render(vec![
            MarkupNode::text("let "),
            MarkupNode::italics(vec![MarkupNode::text("π")]),
            MarkupNode::text(" be"),
        ]);
        let (token, content, kind) = only_formula(&doc);
        assert_eq!(content, r"\pi");
        assert_eq!(kind, FormulaKind::MathTemplate);
        assert_eq!(doc.sections, vec![format!("let {} be", token)]);
    }

    #[test]
    fn test_bold_hidden_math_is_wrapped() {
        let doc = render(vec![MarkupNode::bold(vec![MarkupNode::text("∇")])]);
        let (token, content, kind) = only_formula(&doc);
        assert_eq!(content, r"\mathbf{\nabla}");
        assert_eq!(kind, FormulaKind::MathTemplate);
        assert_eq!(doc.sections, vec![token]);
    }

    #[test]
    fn test_emphasis_over_link_is_hidden_math() {
        let doc = render(vec![MarkupNode::italics(vec![MarkupNode::internal_link(
            "Pi",
            vec![MarkupNode::text("π")],
        )])]);
        let (_, content, kind) = only_formula(&doc);
        assert_eq!(content, r"\pi");
        assert_eq!(kind, FormulaKind::MathTemplate);
        assert_eq!(doc.registry.link_count(), 0);
    }

    #[test]
    fn test_emphasis_over_plain_link_keeps_link() {
        let doc = render(vec![MarkupNode::italics(vec![MarkupNode::internal_link(
            "Circle",
            vec![MarkupNode::text("circle")],
        )])]);
        assert_eq!(doc.registry.formula_count(), 0);
        assert_eq!(doc.registry.link_count(), 1);
    }

    #[test]
    fn test_hidden_subscript() {
        let doc = render(vec![MarkupNode::italics(vec![
            MarkupNode::text("x"),
            MarkupNode::xml_element("sub", vec![MarkupNode::text("i")]),
        ])]);
        let (_, content, _) = only_formula(&doc);
        assert_eq!(content, "x_{i}");
    }

    #[test]
    fn test_plain_italics_are_quoted() {
        let doc = render(vec![
            MarkupNode::text("a "),
            MarkupNode::italics(vec![MarkupNode::text("word")]),
            MarkupNode::text(" here"),
        ]);
        assert_eq!(doc.sections, vec!["a \"word\" here".to_string()]);
    }

    #[test]
    fn test_literal_option_skips_hidden_math() {
        let page = Page::new("Test", vec![MarkupNode::italics(vec![MarkupNode::text("π")])]);
        let doc = render_page(&page, &RenderOptions::literal());
        assert_eq!(doc.registry.formula_count(), 0);
    }

    #[test]
    fn test_internal_link_with_fragment_and_title() {
        let doc = render(vec![
            MarkupNode::text("see "),
            MarkupNode::internal_link("Gamma function#Properties", vec![MarkupNode::text("gamma")]),
        ]);
        assert_eq!(doc.registry.link_count(), 1);
        let link = doc.registry.links().next().unwrap();
        assert_eq!(link.target, "Gamma function");
        assert_eq!(link.title.as_deref(), Some("gamma"));
        assert_eq!(doc.sections, vec![format!("see {}", link.placeholder)]);
        assert_eq!(doc.full_text(), "see gamma");
    }

    #[test]
    fn test_external_links_are_numbered() {
        let doc = render(vec![
            MarkupNode::external_link("http://a.example", vec![]),
            MarkupNode::Whitespace,
            MarkupNode::external_link("http://b.example", vec![MarkupNode::text("b")]),
        ]);
        assert_eq!(doc.sections, vec!["[1] [2]".to_string()]);
    }

    #[test]
    fn test_sections_split_output() {
        let doc = render(vec![
            MarkupNode::paragraph(vec![MarkupNode::text("Intro text.")]),
            MarkupNode::section(2, vec![MarkupNode::text("History")], vec![
                MarkupNode::paragraph(vec![MarkupNode::text("Old text.")]),
            ]),
            MarkupNode::section(2, vec![MarkupNode::text("Empty")], vec![]),
        ]);
        assert_eq!(
            doc.sections,
            vec!["Intro text.".to_string(), "Old text.".to_string()]
        );
    }

    #[test]
    fn test_empty_page_has_one_empty_section() {
        let doc = render(vec![]);
        assert_eq!(doc.sections, vec![String::new()]);
        assert!(doc.success);
    }

    #[test]
    fn test_paragraph_break() {
        let doc = render(vec![
            MarkupNode::paragraph(vec![MarkupNode::text("One.")]),
            MarkupNode::paragraph(vec![MarkupNode::text("Two.")]),
        ]);
        assert_eq!(doc.sections, vec!["One.\n\nTwo.".to_string()]);
    }

    #[test]
    fn test_ref_becomes_citation() {
        let doc = render(vec![
            MarkupNode::text("known"),
            MarkupNode::tag_extension("ref", "Knuth 1984").with_attribute("name", "knuth"),
            MarkupNode::text("."),
        ]);
        let citation = doc.registry.citations().next().unwrap();
        assert_eq!(citation.name.as_deref(), Some("knuth"));
        assert_eq!(doc.sections, vec![format!("known {} .", citation.placeholder)]);
        assert_eq!(doc.full_text(), "known  .");
    }

    #[test]
    fn test_ref_placeholder_stands_alone() {
        let doc = render(vec![
            MarkupNode::text("x"),
            MarkupNode::tag_extension("ref", "Euler 1748"),
            MarkupNode::text("and"),
        ]);
        let citation = doc.registry.citations().next().unwrap();
        assert_eq!(citation.name, None);
        assert_eq!(doc.sections, vec![format!("x {} and", citation.placeholder)]);
    }

    #[test]
    fn test_mathml_tag() {
        let doc = render(vec![MarkupNode::TagExtension {
            name: "math".to_string(),
            attributes: vec![XmlAttribute::new("xmlns", MATHML_NAMESPACE)],
            body: "<mi>x</mi>".to_string(),
        }]);
        let (_, _, kind) = only_formula(&doc);
        assert_eq!(kind, FormulaKind::MathMl);
    }

    #[test]
    fn test_math_template_splices_helpers() {
        let doc = render(vec![MarkupNode::template(
            "math",
            vec![TemplateArgument::positional(vec![
                MarkupNode::text("a"),
                MarkupNode::template("sub", vec![TemplateArgument::positional(vec![MarkupNode::text("n")])]),
                MarkupNode::template("=", vec![]),
                MarkupNode::text("b"),
                MarkupNode::template("sup", vec![TemplateArgument::positional(vec![MarkupNode::text("2")])]),
            ])],
        )]);
        let (token, content, kind) = only_formula(&doc);
        assert_eq!(content, "a_{n} = b^{2}");
        assert_eq!(kind, FormulaKind::MathTemplate);
        assert_eq!(doc.sections, vec![token]);
    }

    #[test]
    fn test_math_template_su_helper() {
        let doc = render(vec![MarkupNode::template(
            "math",
            vec![TemplateArgument::positional(vec![
                MarkupNode::text("x"),
                MarkupNode::template(
                    "su",
                    vec![
                        TemplateArgument::named("b", vec![MarkupNode::text("i")]),
                        TemplateArgument::named("p", vec![MarkupNode::text("2")]),
                    ],
                ),
            ])],
        )]);
        let (_, content, _) = only_formula(&doc);
        assert_eq!(content, "x_{i}^{2}");
    }

    #[test]
    fn test_mvar_template_with_pi() {
        let doc = render(vec![MarkupNode::template(
            "mvar",
            vec![TemplateArgument::positional(vec![MarkupNode::template("pi", vec![])])],
        )]);
        let (_, content, kind) = only_formula(&doc);
        assert_eq!(content, r"\pi");
        assert_eq!(kind, FormulaKind::MvarTemplate);
    }

    #[test]
    fn test_top_level_pi_template() {
        let doc = render(vec![
            MarkupNode::text("area "),
            MarkupNode::template("pi", vec![]),
            MarkupNode::text(" r"),
        ]);
        let (token, content, kind) = only_formula(&doc);
        assert_eq!(content, r"\pi");
        assert_eq!(kind, FormulaKind::Latex);
        assert_eq!(doc.sections, vec![format!("area {} r", token)]);
    }

    #[test]
    fn test_numblk_renders_second_argument_only() {
        let doc = render(vec![MarkupNode::template(
            "NumBlk",
            vec![
                TemplateArgument::positional(vec![MarkupNode::text(":")]),
                TemplateArgument::positional(vec![MarkupNode::tag_extension("math", "E=mc^2")]),
                TemplateArgument::positional(vec![MarkupNode::text("(1)")]),
            ],
        )]);
        let (token, content, _) = only_formula(&doc);
        assert_eq!(content, "E=mc^2");
        assert_eq!(doc.sections, vec![token]);
    }

    #[test]
    fn test_equation_template_title_then_equation() {
        let doc = render(vec![MarkupNode::template(
            "Equation box 1",
            vec![
                TemplateArgument::named("title", vec![MarkupNode::text("Newton")]),
                TemplateArgument::named("equation", vec![MarkupNode::tag_extension("math", "F = ma")]),
                TemplateArgument::named("border colour", vec![MarkupNode::text("blue")]),
            ],
        )]);
        let (token, content, _) = only_formula(&doc);
        assert_eq!(content, "F = ma");
        assert_eq!(doc.sections, vec![format!("Newton: {}", token)]);
    }

    #[test]
    fn test_citation_templates_are_silent() {
        let doc = render(vec![
            MarkupNode::text("a "),
            MarkupNode::template(
                "citation",
                vec![TemplateArgument::named("title", vec![MarkupNode::text("Elements")])],
            ),
            MarkupNode::template("DLMF", vec![TemplateArgument::named("id", vec![MarkupNode::text("5.2")])]),
            MarkupNode::text(" b"),
        ]);
        assert_eq!(doc.sections, vec!["a b".to_string()]);
        let citations: Vec<_> = doc.registry.citations().collect();
        assert_eq!(citations.len(), 2);
        assert_eq!(citations[0].name.as_deref(), Some("citation"));
        assert_eq!(citations[0].body, "{{citation|title=Elements}}");
        assert_eq!(citations[1].name.as_deref(), Some("dlmf"));
    }

    #[test]
    fn test_ignored_template_is_skipped() {
        let doc = render(vec![MarkupNode::template(
            "Short description",
            vec![TemplateArgument::positional(vec![MarkupNode::text("Physics")])],
        )]);
        assert_eq!(doc.sections, vec![String::new()]);
        assert_eq!(doc.warnings.len(), 1);
        assert_eq!(doc.warnings[0].kind, WarningKind::Ignored);
    }

    #[test]
    fn test_unknown_template_arguments() {
        let doc = render(vec![MarkupNode::template(
            "nowrap",
            vec![
                TemplateArgument::positional(vec![MarkupNode::text("α")]),
                TemplateArgument::positional(vec![MarkupNode::text(" word")]),
            ],
        )]);
        let (token, content, kind) = only_formula(&doc);
        assert_eq!(content, r"\alpha");
        assert_eq!(kind, FormulaKind::MathTemplate);
        assert_eq!(doc.sections, vec![format!("{} word", token)]);
    }

    #[test]
    fn test_var_element() {
        let doc = render(vec![MarkupNode::xml_element("var", vec![MarkupNode::text("x")])]);
        let (_, content, kind) = only_formula(&doc);
        assert_eq!(content, "x");
        assert_eq!(kind, FormulaKind::MathTemplate);

        let doc = render(vec![MarkupNode::xml_element(
            "var",
            vec![MarkupNode::internal_link("Theta", vec![MarkupNode::text("θ")])],
        )]);
        let (_, content, _) = only_formula(&doc);
        assert_eq!(content, r"\theta");
    }

    #[test]
    fn test_chem_tags() {
        for name in ["chem", "ce"] {
            let doc = render(vec![MarkupNode::tag_extension(name, "H2O")]);
            let (_, content, kind) = only_formula(&doc);
            assert_eq!(content, "H2O");
            assert_eq!(kind, FormulaKind::LatexChem);
        }
    }

    #[test]
    fn test_table_skips_caption_and_header_cells() {
        let cell = |header: bool, text: &str| TableCell {
            header,
            content: vec![MarkupNode::text(text)],
        };
        let doc = render(vec![MarkupNode::Table {
            caption: vec![MarkupNode::text("Caption")],
            rows: vec![
                TableRow {
                    cells: vec![cell(true, "Name"), cell(true, "Value")],
                },
                TableRow {
                    cells: vec![cell(false, "a"), cell(false, "b")],
                },
                TableRow {
                    cells: vec![cell(false, "c"), cell(false, "d")],
                },
            ],
        }]);
        assert_eq!(doc.sections, vec!["a b\nc d".to_string()]);
    }

    #[test]
    fn test_list_items_and_rules_break_lines() {
        let doc = render(vec![
            MarkupNode::List {
                ordered: false,
                children: vec![
                    MarkupNode::list_item(vec![MarkupNode::text("one")]),
                    MarkupNode::list_item(vec![MarkupNode::text("two")]),
                ],
            },
            MarkupNode::HorizontalRule,
            MarkupNode::text("three"),
        ]);
        assert_eq!(doc.sections, vec!["one\ntwo\nthree".to_string()]);
    }

    #[test]
    fn test_adjacent_math_tags_join() {
        let doc = render(vec![
            MarkupNode::tag_extension("math", "a,"),
            MarkupNode::tag_extension("math", "b"),
        ]);
        let (token, content, _) = only_formula(&doc);
        assert_eq!(content, "a, b");
        assert_eq!(doc.sections, vec![token]);
    }

    #[test]
    fn test_reuse_does_not_return_extended_formula() {
        let options = RenderOptions {
            reuse_formula_placeholders: true,
            ..RenderOptions::default()
        };
        let page = Page::new(
            "Test",
            vec![
                MarkupNode::tag_extension("math", "x"),
                MarkupNode::xml_element("sup", vec![MarkupNode::text("2")]),
                MarkupNode::text(" and later "),
                MarkupNode::tag_extension("math", "x"),
            ],
        );
        let doc = render_page(&page, &options);
        assert_eq!(doc.registry.formula_count(), 2);
        assert_eq!(
            doc.full_text(),
            "<math>x^{2}</math> and later <math>x</math>"
        );
    }

    #[test]
    fn test_malformed_node_is_skipped() {
        let doc = render(vec![
            MarkupNode::text("before"),
            MarkupNode::template("mvar", vec![]),
            MarkupNode::text(" after"),
        ]);
        assert_eq!(doc.sections, vec!["before after".to_string()]);
        assert_eq!(doc.warnings.len(), 1);
    }
}
