//! Math detection and normalization
//!
//! Turns wiki-flavoured math fragments into TeX and finds math that was typed
//! as plain text, bold or italics.

use lazy_static::lazy_static;
use mlptext_tree::{plain_text, MarkupNode, TemplateArgument};
use regex::Regex;

use crate::core::registry::FormulaKind;
use crate::data::string_to_tex;
use crate::utils::error::{MlpError, MlpResult, WarningKind};

use super::context::Renderer;

lazy_static! {
    /// A run of Greek letters, digits, punctuation, math symbols and spaces
    static ref MATH_RUN: Regex = Regex::new(r"[\p{Greek}\p{N}\p{P}\p{Sm} ]+").unwrap();
    /// Trailing sentence punctuation after a formula
    static ref MATH_ENDING: Regex = Regex::new(r"(?s)^\s*(.*?)\s*([.,;!?]+)\s*$").unwrap();
    static ref SUB_PAIR: Regex = Regex::new(r"[{<]sub[}>](.+?)[{<]/sub[}>]").unwrap();
    static ref SUP_PAIR: Regex = Regex::new(r"[{<]sup[}>](.+?)[{<]/sup[}>]").unwrap();
    static ref TRIPLE_EMPHASIS: Regex = Regex::new(r"'''(.+?)'''").unwrap();
    static ref DOUBLE_EMPHASIS: Regex = Regex::new(r"''(.+?)''").unwrap();
}

/// Hidden math longer than this is treated as prose.
const HIDDEN_MATH_MAX_LEN: usize = 10;

/// Split trailing sentence punctuation off a formula.
///
/// Returns the trimmed content and the punctuation, if there was any.
pub fn split_ending(content: &str) -> (&str, Option<String>) {
    match MATH_ENDING.captures(content) {
        Some(caps) => match (caps.get(1), caps.get(2)) {
            (Some(body), Some(ending)) => (body.as_str(), Some(ending.as_str().to_string())),
            _ => (content.trim(), None),
        },
        None => (content.trim(), None),
    }
}

/// Rewrite wiki markup and non-ASCII symbols into TeX.
pub fn normalize(content: &str) -> String {
    let rewritten = SUB_PAIR.replace_all(content, "_{$1}");
    let rewritten = SUP_PAIR.replace_all(&rewritten, "^{$1}");
    let rewritten = TRIPLE_EMPHASIS.replace_all(&rewritten, r"\mathbf{$1}");
    let rewritten = DOUBLE_EMPHASIS.replace_all(&rewritten, "$1");
    string_to_tex(&rewritten).trim().to_string()
}

/// TeX for a short emphasised fragment, if it looks like math.
pub fn hidden_math(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let tex = normalize(raw);
    if tex.is_empty() || tex == raw {
        return None;
    }
    let raw_len = raw.chars().count();
    let tex_len = tex.chars().count();
    if raw_len == 1 || (raw_len < HIDDEN_MATH_MAX_LEN && tex_len > raw_len) {
        Some(tex)
    } else {
        None
    }
}

/// A piece of a text node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Prose(&'a str),
    /// A run that may be math
    Candidate(&'a str),
}

/// Split text into prose and math candidate runs. A run that runs straight
/// into a letter gives back its last character.
pub fn scan_text(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut last = 0;

    for m in MATH_RUN.find_iter(text) {
        let start = m.start();
        let mut end = m.end();
        let next_is_letter = text[end..]
            .chars()
            .next()
            .map_or(false, |c| c.is_ascii_alphabetic());
        if next_is_letter {
            if let Some(c) = text[start..end].chars().next_back() {
                end -= c.len_utf8();
            }
        }
        if end <= start {
            continue;
        }
        if start > last {
            segments.push(Segment::Prose(&text[last..start]));
        }
        segments.push(Segment::Candidate(&text[start..end]));
        last = end;
    }

    if last < text.len() {
        segments.push(Segment::Prose(&text[last..]));
    }
    segments
}

/// Inline replacement for templates nested in a math template.
pub(crate) fn inner_math_template(name: &str, args: &[TemplateArgument]) -> Option<String> {
    let arg_text = |idx: usize| {
        args.get(idx)
            .map(|a| plain_text(&a.value))
            .unwrap_or_default()
    };
    let named_text = |key: &str| {
        args.iter()
            .find(|a| a.name.as_deref() == Some(key))
            .map(|a| plain_text(&a.value))
    };

    match name.trim().to_lowercase().as_str() {
        "pi" => Some(r" \pi ".to_string()),
        "=" => Some(" = ".to_string()),
        "su" => {
            let mut out = String::new();
            if let Some(sub) = named_text("b") {
                out.push_str(&format!("_{{{}}}", sub.trim()));
            }
            if let Some(sup) = named_text("p") {
                out.push_str(&format!("^{{{}}}", sup.trim()));
            }
            Some(out)
        }
        "sub" => Some(format!("_{{{}}}", arg_text(0).trim())),
        "sup" => Some(format!("^{{{}}}", arg_text(0).trim())),
        _ => None,
    }
}

impl Renderer {
    /// Render a text node, turning math runs into formulas.
    pub(crate) fn visit_text(&mut self, text: &str) {
        for segment in scan_text(text) {
            match segment {
                Segment::Prose(prose) => self.write(prose),
                Segment::Candidate(raw) => {
                    let tex = normalize(raw);
                    if tex.is_empty() || tex == raw.trim() {
                        self.write(raw);
                    } else if !self.extend_formula(&tex, true) {
                        self.add_formula(&tex, FormulaKind::Latex);
                    }
                }
            }
        }
    }

    /// Register emphasised children as a formula when they look like math.
    /// Returns true if a formula was written.
    pub(crate) fn try_hidden_math(&mut self, children: &[MarkupNode], bold: bool) -> bool {
        if self.options.skip_hidden_math {
            return false;
        }

        // emphasis over a link: judge the link's display text
        if let Some(MarkupNode::InternalLink { target, title }) = children.first() {
            let text = if title.is_empty() {
                target.clone()
            } else {
                plain_text(title)
            };
            return self.emit_hidden(&text, None, bold);
        }

        match children {
            [MarkupNode::Text { content }] => self.emit_hidden(content, None, bold),
            [MarkupNode::Text { content }, MarkupNode::XmlElement { name, body, .. }]
                if name.eq_ignore_ascii_case("sub") =>
            {
                match body.as_slice() {
                    [MarkupNode::Text { content: sub }] => self.emit_hidden(content, Some(sub.as_str()), bold),
                    _ => false,
                }
            }
            _ => false,
        }
    }

    fn emit_hidden(&mut self, raw: &str, subscript: Option<&str>, bold: bool) -> bool {
        let tex = match subscript {
            Some(sub) => {
                let main = normalize(raw);
                let sub = normalize(sub);
                if main.is_empty() || sub.is_empty() {
                    return false;
                }
                format!("{}_{{{}}}", main, sub)
            }
            None => match hidden_math(raw) {
                Some(tex) => tex,
                None => return false,
            },
        };
        let tex = if bold {
            format!(r"\mathbf{{{}}}", tex)
        } else {
            tex
        };
        self.add_formula(&tex, FormulaKind::MathTemplate);
        true
    }

    /// Handle a `<sub>`/`<sup>` element: attach it to the open formula or
    /// start a new one.
    pub(crate) fn visit_script(&mut self, name: &str, body: &[MarkupNode]) -> MlpResult<()> {
        let mut content = String::new();
        self.flatten_script(body, &mut content);
        let content = content.trim();
        if content.is_empty() {
            return Err(MlpError::structure(name, "empty script"));
        }

        let marker = if name.eq_ignore_ascii_case("sup") { '^' } else { '_' };
        let fragment = format!("{}{{{}}}", marker, normalize(content));
        if !self.extend_formula(&fragment, false) {
            self.warn(
                WarningKind::DetachedScript,
                name,
                format!("no formula to attach '{}' to", fragment),
            );
            self.add_formula(&fragment, FormulaKind::Latex);
        }
        Ok(())
    }

    fn flatten_script(&mut self, nodes: &[MarkupNode], out: &mut String) {
        for node in nodes {
            match node {
                MarkupNode::Text { content } => out.push_str(content),
                MarkupNode::Whitespace => out.push(' '),
                MarkupNode::CharRef { code_point } => {
                    if let Some(c) = char::from_u32(*code_point) {
                        out.push(c);
                    }
                }
                MarkupNode::EntityRef { resolved: Some(s), .. } => out.push_str(s),
                MarkupNode::Template { name, args } => match inner_math_template(name, args) {
                    Some(tex) => out.push_str(&tex),
                    None => self.warn(
                        WarningKind::Ignored,
                        name,
                        "template inside a script was dropped",
                    ),
                },
                MarkupNode::Italics { children }
                | MarkupNode::Bold { children }
                | MarkupNode::XmlElement { body: children, .. }
                | MarkupNode::Group { children } => self.flatten_script(children, out),
                other => self.warn(
                    WarningKind::Ignored,
                    other.kind_name(),
                    "node inside a script was dropped",
                ),
            }
        }
    }
}
