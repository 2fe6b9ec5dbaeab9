//! Template and tag-extension handling
//!
//! Math templates and `<math>`-like tags become formulas, citations become
//! silent registry records, and everything else falls back to its arguments.

use lazy_static::lazy_static;
use mlptext_tree::{plain_text, MarkupNode, TemplateArgument, XmlAttribute};
use regex::Regex;

use crate::core::registry::FormulaKind;
use crate::utils::error::{MlpError, MlpResult, WarningKind};

use super::context::Renderer;
use super::math::{hidden_math, inner_math_template, normalize};

/// Namespace that marks a math tag body as MathML
pub const MATHML_NAMESPACE: &str = "http://www.w3.org/1998/Math/MathML";

/// Templates that carry no prose
pub static IGNORED_TEMPLATES: phf::Set<&'static str> = phf::phf_set! {
    "short description",
    "for",
    "use american english",
    "about",
    "redirect",
    "distinguish",
    "main",
    "see also",
    "reflist",
};

lazy_static! {
    /// Element names that only occur in MathML
    static ref MATHML_ELEMENT: Regex =
        Regex::new(r"<(?:m[a-z]+|apply|c[in]|csymbol|semantics)>").unwrap();
}

/// Pick the formula kind for a `<math>`, `<chem>` or `<ce>` tag.
pub fn math_tag_kind(name: &str, attributes: &[XmlAttribute], body: &str) -> FormulaKind {
    if name.eq_ignore_ascii_case("chem") || name.eq_ignore_ascii_case("ce") {
        return FormulaKind::LatexChem;
    }
    let namespaced = attributes
        .iter()
        .any(|a| a.name.eq_ignore_ascii_case("xmlns") && a.value.trim() == MATHML_NAMESPACE);
    if namespaced || MATHML_ELEMENT.is_match(body) {
        FormulaKind::MathMl
    } else {
        FormulaKind::Latex
    }
}

fn attribute<'a>(attributes: &'a [XmlAttribute], name: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|a| a.name.eq_ignore_ascii_case(name))
        .map(|a| a.value.as_str())
}

fn named_arg<'a>(args: &'a [TemplateArgument], name: &str) -> Option<&'a TemplateArgument> {
    args.iter()
        .find(|a| a.name.as_deref().map_or(false, |n| n.trim().eq_ignore_ascii_case(name)))
}

impl Renderer {
    pub(crate) fn visit_template(&mut self, name: &str, args: &[TemplateArgument]) -> MlpResult<()> {
        let key = name.trim().to_lowercase();

        if key.starts_with("equation") {
            return self.visit_equation_template(args);
        }

        match key.as_str() {
            "math" => {
                let tex = self.math_template_content("template math", args)?;
                self.add_formula(&tex, FormulaKind::MathTemplate);
            }
            "mvar" => {
                let tex = self.math_template_content("template mvar", args)?;
                self.add_formula(&tex, FormulaKind::MvarTemplate);
            }
            "numblk" => {
                let equation = args
                    .get(1)
                    .ok_or_else(|| MlpError::structure("template numblk", "missing equation argument"))?;
                self.visit_all(&equation.value);
            }
            "citation" | "dlmf" => {
                let source = MarkupNode::Template {
                    name: name.to_string(),
                    args: args.to_vec(),
                }
                .to_source();
                self.registry.add_citation(Some(key.clone()), source);
            }
            "pi" => {
                self.add_formula(r"\pi", FormulaKind::Latex);
            }
            _ if IGNORED_TEMPLATES.contains(key.as_str()) => {
                self.warn(WarningKind::Ignored, name, "template carries no prose");
            }
            _ => {
                for arg in args {
                    self.visit_template_argument(arg);
                }
            }
        }
        Ok(())
    }

    /// A lone text argument of an unknown template may still be math.
    fn visit_template_argument(&mut self, arg: &TemplateArgument) {
        if !self.options.skip_hidden_math {
            if let Some(text) = arg.single_text() {
                if let Some(tex) = hidden_math(text) {
                    self.add_formula(&tex, FormulaKind::MathTemplate);
                    return;
                }
            }
        }
        self.visit_all(&arg.value);
    }

    /// `{{equation box|title=...|equation=...}}` and friends
    fn visit_equation_template(&mut self, args: &[TemplateArgument]) -> MlpResult<()> {
        let equation = named_arg(args, "equation")
            .ok_or_else(|| MlpError::structure("template equation", "missing equation argument"))?;
        if let Some(title) = named_arg(args, "title") {
            self.visit_all(&title.value);
            self.write(": ");
        }
        self.visit_all(&equation.value);
        Ok(())
    }

    /// TeX of a `{{math}}`/`{{mvar}}` first argument, with nested helper
    /// templates spliced in.
    fn math_template_content(&mut self, node: &str, args: &[TemplateArgument]) -> MlpResult<String> {
        let first = args
            .iter()
            .find(|a| a.name.is_none())
            .or_else(|| args.first())
            .ok_or_else(|| MlpError::structure(node, "missing first argument"))?;

        let mut content = String::new();
        for part in &first.value {
            match part {
                MarkupNode::Text { content: text } => content.push_str(text),
                MarkupNode::Whitespace => content.push(' '),
                MarkupNode::Template { name, args } => match inner_math_template(name, args) {
                    Some(tex) => content.push_str(&tex),
                    None => self.warn(WarningKind::Ignored, name, "unknown template inside math"),
                },
                MarkupNode::Italics { children } | MarkupNode::Bold { children } => {
                    content.push_str(&plain_text(children));
                }
                MarkupNode::XmlElement { name, body, .. }
                    if name.eq_ignore_ascii_case("sub") || name.eq_ignore_ascii_case("sup") =>
                {
                    let marker = if name.eq_ignore_ascii_case("sup") { '^' } else { '_' };
                    content.push_str(&format!(
                        "{}{{{}}}",
                        marker,
                        plain_text(body).trim()
                    ));
                }
                other => self.warn(
                    WarningKind::Ignored,
                    other.kind_name(),
                    "node inside math template was dropped",
                ),
            }
        }

        let tex = normalize(&content);
        if tex.is_empty() {
            return Err(MlpError::structure(node, "empty formula"));
        }
        Ok(tex)
    }

    pub(crate) fn visit_tag_extension(
        &mut self,
        name: &str,
        attributes: &[XmlAttribute],
        body: &str,
    ) -> MlpResult<()> {
        match name.trim().to_lowercase().as_str() {
            "math" | "chem" | "ce" => {
                if body.trim().is_empty() {
                    return Err(MlpError::structure(format!("tag {}", name), "empty formula"));
                }
                let kind = math_tag_kind(name, attributes, body);
                self.add_formula(body, kind);
            }
            "ref" => {
                let ref_name = attribute(attributes, "name").map(str::to_string);
                let token = self.registry.add_citation(ref_name, body.trim());
                self.close_formula();
                self.write_placeholder(&token);
            }
            _ => {
                log::debug!("{}: skipping tag extension <{}>", self.title, name);
            }
        }
        Ok(())
    }
}
