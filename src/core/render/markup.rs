//! Node dispatch for the markup tree
//!
//! Each node kind is handled here or forwarded to the math and template
//! handlers. A failing node is logged and skipped; its siblings still render.

use mlptext_tree::{plain_text, MarkupNode, TableRow};

use crate::core::registry::FormulaKind;
use crate::utils::error::{MlpError, MlpResult, WarningKind};

use super::context::Renderer;
use super::math::normalize;

impl Renderer {
    /// Render a list of sibling nodes.
    pub(crate) fn visit_all(&mut self, nodes: &[MarkupNode]) {
        for node in nodes {
            self.dispatch(node);
        }
    }

    /// Render one node; errors stay local to it.
    pub(crate) fn dispatch(&mut self, node: &MarkupNode) {
        if let Err(err) = self.visit_node(node) {
            self.warn(WarningKind::MalformedNode, node.kind_name(), err.to_string());
        }
    }

    fn visit_node(&mut self, node: &MarkupNode) -> MlpResult<()> {
        match node {
            MarkupNode::Text { content } => self.visit_text(content),
            MarkupNode::Whitespace => self.write(" "),
            MarkupNode::Newline | MarkupNode::HorizontalRule => self.newline(1),

            MarkupNode::Bold { children } => self.visit_emphasis(children, true),
            MarkupNode::Italics { children } => self.visit_emphasis(children, false),

            MarkupNode::InternalLink { target, title } => self.visit_internal_link(target, title),
            MarkupNode::ExternalLink { .. } => {
                self.state.ext_link_num += 1;
                let reference = format!("[{}]", self.state.ext_link_num);
                self.write(&reference);
            }
            MarkupNode::Url { protocol, path } => {
                let url = if protocol.is_empty() {
                    path.clone()
                } else {
                    format!("{}:{}", protocol, path)
                };
                self.write(&url);
            }

            MarkupNode::Section { body, .. } => {
                self.flush_section();
                self.visit_all(body);
            }
            MarkupNode::Paragraph { children } => {
                self.visit_all(children);
                self.newline(2);
            }
            MarkupNode::List { children, .. } => self.visit_all(children),
            MarkupNode::ListItem { children } => {
                self.newline(1);
                self.visit_all(children);
            }
            MarkupNode::Table { rows, .. } => self.visit_table(rows),

            MarkupNode::Template { name, args } => return self.visit_template(name, args),
            MarkupNode::TagExtension {
                name,
                attributes,
                body,
            } => return self.visit_tag_extension(name, attributes, body),
            MarkupNode::XmlElement { name, body, .. } => return self.visit_element(name, body),

            MarkupNode::CharRef { code_point } => {
                let c = char::from_u32(*code_point).ok_or_else(|| {
                    MlpError::structure("char ref", format!("invalid code point {}", code_point))
                })?;
                self.write(&c.to_string());
            }
            MarkupNode::EntityRef { name, resolved } => match resolved {
                Some(text) => self.write(text),
                None => self.write(&format!("&{};", name)),
            },
            MarkupNode::ImageLink { title, .. } => self.visit_all(title),

            MarkupNode::Comment | MarkupNode::PageSwitch { .. } => {}
            MarkupNode::Group { children } | MarkupNode::Other { children, .. } => {
                self.visit_all(children)
            }
        }
        Ok(())
    }

    fn visit_emphasis(&mut self, children: &[MarkupNode], bold: bool) {
        if self.try_hidden_math(children, bold) {
            return;
        }
        self.write("\"");
        self.visit_all(children);
        self.write("\"");
    }

    fn visit_internal_link(&mut self, target: &str, title: &[MarkupNode]) {
        self.close_formula();
        let target = target.split('#').next().unwrap_or(target).trim();
        let display = if title.is_empty() {
            None
        } else {
            Some(self.capture(|r| r.visit_all(title)))
        };
        let token = self.registry.add_link(target, display);
        self.write_placeholder(&token);
    }

    fn visit_table(&mut self, rows: &[TableRow]) {
        for row in rows {
            for cell in row.cells.iter().filter(|c| !c.header) {
                self.visit_all(&cell.content);
                self.write(" ");
            }
            self.newline(1);
        }
    }

    fn visit_element(&mut self, name: &str, body: &[MarkupNode]) -> MlpResult<()> {
        let name = name.to_lowercase();
        match name.as_str() {
            "br" => self.newline(1),
            "var" => {
                let text = match body.first() {
                    Some(MarkupNode::Text { content }) => content.clone(),
                    Some(MarkupNode::InternalLink { target, title }) => {
                        if title.is_empty() {
                            target.clone()
                        } else {
                            plain_text(title)
                        }
                    }
                    _ => return Err(MlpError::structure("element var", "expected text or link")),
                };
                let tex = normalize(&text);
                if tex.is_empty() {
                    return Err(MlpError::structure("element var", "empty variable"));
                }
                self.add_formula(&tex, FormulaKind::MathTemplate);
            }
            "sub" | "sup" => return self.visit_script(&name, body),
            _ => self.visit_all(body),
        }
        Ok(())
    }
}
