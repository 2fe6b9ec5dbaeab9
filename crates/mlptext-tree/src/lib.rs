//! Markup tree representation for encyclopedia pages.
//!
//! The tree is produced by an external wikitext parser and consumed read-only
//! by the renderer. Every node kind the renderer knows about is a variant of
//! [`MarkupNode`]; anything else arrives as [`MarkupNode::Other`] so its
//! children can still be visited.

use serde::{Deserialize, Serialize};

/// A parsed page, keyed by its title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub title: String,
    #[serde(default)]
    pub content: Vec<MarkupNode>,
}

impl Page {
    pub fn new(title: impl Into<String>, content: Vec<MarkupNode>) -> Self {
        Self {
            title: title.into(),
            content,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MarkupNode {
    Text {
        content: String,
    },
    Whitespace,
    Newline,
    Bold {
        #[serde(default)]
        children: Vec<MarkupNode>,
    },
    Italics {
        #[serde(default)]
        children: Vec<MarkupNode>,
    },
    InternalLink {
        target: String,
        #[serde(default)]
        title: Vec<MarkupNode>,
    },
    ExternalLink {
        target: String,
        #[serde(default)]
        title: Vec<MarkupNode>,
    },
    Url {
        #[serde(default)]
        protocol: String,
        path: String,
    },
    Section {
        level: u8,
        #[serde(default)]
        heading: Vec<MarkupNode>,
        #[serde(default)]
        body: Vec<MarkupNode>,
    },
    Paragraph {
        #[serde(default)]
        children: Vec<MarkupNode>,
    },
    List {
        #[serde(default)]
        ordered: bool,
        #[serde(default)]
        children: Vec<MarkupNode>,
    },
    ListItem {
        #[serde(default)]
        children: Vec<MarkupNode>,
    },
    HorizontalRule,
    Table {
        #[serde(default)]
        caption: Vec<MarkupNode>,
        #[serde(default)]
        rows: Vec<TableRow>,
    },
    Template {
        name: String,
        #[serde(default)]
        args: Vec<TemplateArgument>,
    },
    /// Parser extension tags such as `<math>`, `<chem>` or `<ref>`; the body is
    /// kept verbatim.
    TagExtension {
        name: String,
        #[serde(default)]
        attributes: Vec<XmlAttribute>,
        #[serde(default)]
        body: String,
    },
    XmlElement {
        name: String,
        #[serde(default)]
        attributes: Vec<XmlAttribute>,
        #[serde(default)]
        body: Vec<MarkupNode>,
    },
    CharRef {
        code_point: u32,
    },
    EntityRef {
        name: String,
        #[serde(default)]
        resolved: Option<String>,
    },
    ImageLink {
        target: String,
        #[serde(default)]
        title: Vec<MarkupNode>,
    },
    Comment,
    PageSwitch {
        name: String,
    },
    /// A plain list of nodes without markup of its own.
    Group {
        #[serde(default)]
        children: Vec<MarkupNode>,
    },
    /// Any node kind the parser emits that has no dedicated variant.
    Other {
        name: String,
        #[serde(default)]
        children: Vec<MarkupNode>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TemplateArgument {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Vec<MarkupNode>,
}

impl TemplateArgument {
    pub fn positional(value: Vec<MarkupNode>) -> Self {
        Self { name: None, value }
    }

    pub fn named(name: impl Into<String>, value: Vec<MarkupNode>) -> Self {
        Self {
            name: Some(name.into()),
            value,
        }
    }

    /// The argument value if it consists of exactly one text node.
    pub fn single_text(&self) -> Option<&str> {
        match self.value.as_slice() {
            [node] => node.as_text(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlAttribute {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

impl XmlAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableRow {
    #[serde(default)]
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableCell {
    #[serde(default)]
    pub header: bool,
    #[serde(default)]
    pub content: Vec<MarkupNode>,
}

impl MarkupNode {
    pub fn text(s: impl Into<String>) -> Self {
        MarkupNode::Text { content: s.into() }
    }

    pub fn bold(children: Vec<MarkupNode>) -> Self {
        MarkupNode::Bold { children }
    }

    pub fn italics(children: Vec<MarkupNode>) -> Self {
        MarkupNode::Italics { children }
    }

    pub fn paragraph(children: Vec<MarkupNode>) -> Self {
        MarkupNode::Paragraph { children }
    }

    pub fn section(level: u8, heading: Vec<MarkupNode>, body: Vec<MarkupNode>) -> Self {
        MarkupNode::Section {
            level,
            heading,
            body,
        }
    }

    pub fn list_item(children: Vec<MarkupNode>) -> Self {
        MarkupNode::ListItem { children }
    }

    pub fn internal_link(target: impl Into<String>, title: Vec<MarkupNode>) -> Self {
        MarkupNode::InternalLink {
            target: target.into(),
            title,
        }
    }

    pub fn external_link(target: impl Into<String>, title: Vec<MarkupNode>) -> Self {
        MarkupNode::ExternalLink {
            target: target.into(),
            title,
        }
    }

    pub fn template(name: impl Into<String>, args: Vec<TemplateArgument>) -> Self {
        MarkupNode::Template {
            name: name.into(),
            args,
        }
    }

    pub fn tag_extension(name: impl Into<String>, body: impl Into<String>) -> Self {
        MarkupNode::TagExtension {
            name: name.into(),
            attributes: Vec::new(),
            body: body.into(),
        }
    }

    pub fn xml_element(name: impl Into<String>, body: Vec<MarkupNode>) -> Self {
        MarkupNode::XmlElement {
            name: name.into(),
            attributes: Vec::new(),
            body,
        }
    }

    /// Adds an attribute to a tag extension or XML element; other kinds are
    /// returned unchanged.
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        match &mut self {
            MarkupNode::TagExtension { attributes, .. } | MarkupNode::XmlElement { attributes, .. } => {
                attributes.push(XmlAttribute::new(name, value))
            }
            _ => {}
        }
        self
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            MarkupNode::Text { content } => Some(content),
            _ => None,
        }
    }

    /// Short kind name, matching the serde tag.
    pub fn kind_name(&self) -> &str {
        match self {
            MarkupNode::Text { .. } => "text",
            MarkupNode::Whitespace => "whitespace",
            MarkupNode::Newline => "newline",
            MarkupNode::Bold { .. } => "bold",
            MarkupNode::Italics { .. } => "italics",
            MarkupNode::InternalLink { .. } => "internal_link",
            MarkupNode::ExternalLink { .. } => "external_link",
            MarkupNode::Url { .. } => "url",
            MarkupNode::Section { .. } => "section",
            MarkupNode::Paragraph { .. } => "paragraph",
            MarkupNode::List { .. } => "list",
            MarkupNode::ListItem { .. } => "list_item",
            MarkupNode::HorizontalRule => "horizontal_rule",
            MarkupNode::Table { .. } => "table",
            MarkupNode::Template { .. } => "template",
            MarkupNode::TagExtension { .. } => "tag_extension",
            MarkupNode::XmlElement { .. } => "xml_element",
            MarkupNode::CharRef { .. } => "char_ref",
            MarkupNode::EntityRef { .. } => "entity_ref",
            MarkupNode::ImageLink { .. } => "image_link",
            MarkupNode::Comment => "comment",
            MarkupNode::PageSwitch { .. } => "page_switch",
            MarkupNode::Group { .. } => "group",
            MarkupNode::Other { name, .. } => name.as_str(),
        }
    }

    /// Direct children of nodes that simply wrap other nodes.
    pub fn children(&self) -> &[MarkupNode] {
        match self {
            MarkupNode::Bold { children }
            | MarkupNode::Italics { children }
            | MarkupNode::Paragraph { children }
            | MarkupNode::List { children, .. }
            | MarkupNode::ListItem { children }
            | MarkupNode::Group { children }
            | MarkupNode::Other { children, .. } => children,
            MarkupNode::Section { body, .. } => body,
            MarkupNode::XmlElement { body, .. } => body,
            MarkupNode::InternalLink { title, .. }
            | MarkupNode::ExternalLink { title, .. }
            | MarkupNode::ImageLink { title, .. } => title,
            _ => &[],
        }
    }

    /// Serialises the node back to wikitext-like source.
    pub fn write_source(&self, out: &mut String) {
        match self {
            MarkupNode::Text { content } => out.push_str(content),
            MarkupNode::Whitespace => out.push(' '),
            MarkupNode::Newline => out.push('\n'),
            MarkupNode::Bold { children } => {
                out.push_str("'''");
                write_source_all(children, out);
                out.push_str("'''");
            }
            MarkupNode::Italics { children } => {
                out.push_str("''");
                write_source_all(children, out);
                out.push_str("''");
            }
            MarkupNode::InternalLink { target, title } => {
                out.push_str("[[");
                out.push_str(target);
                if !title.is_empty() {
                    out.push('|');
                    write_source_all(title, out);
                }
                out.push_str("]]");
            }
            MarkupNode::ExternalLink { target, title } => {
                out.push('[');
                out.push_str(target);
                if !title.is_empty() {
                    out.push(' ');
                    write_source_all(title, out);
                }
                out.push(']');
            }
            MarkupNode::Url { protocol, path } => {
                if !protocol.is_empty() {
                    out.push_str(protocol);
                    out.push(':');
                }
                out.push_str(path);
            }
            MarkupNode::Section {
                level,
                heading,
                body,
            } => {
                let marks = "=".repeat(usize::from(*level).max(1));
                out.push_str(&marks);
                write_source_all(heading, out);
                out.push_str(&marks);
                out.push('\n');
                write_source_all(body, out);
            }
            MarkupNode::Paragraph { children } => {
                write_source_all(children, out);
                out.push_str("\n\n");
            }
            MarkupNode::List { children, .. } | MarkupNode::Group { children } => {
                write_source_all(children, out)
            }
            MarkupNode::ListItem { children } => {
                out.push_str("* ");
                write_source_all(children, out);
                out.push('\n');
            }
            MarkupNode::HorizontalRule => out.push_str("----\n"),
            MarkupNode::Table { caption, rows } => {
                out.push_str("{|\n");
                if !caption.is_empty() {
                    out.push_str("|+ ");
                    write_source_all(caption, out);
                    out.push('\n');
                }
                for row in rows {
                    out.push_str("|-\n");
                    for cell in &row.cells {
                        out.push_str(if cell.header { "! " } else { "| " });
                        write_source_all(&cell.content, out);
                        out.push('\n');
                    }
                }
                out.push_str("|}");
            }
            MarkupNode::Template { name, args } => {
                out.push_str("{{");
                out.push_str(name);
                for arg in args {
                    out.push('|');
                    if let Some(name) = &arg.name {
                        out.push_str(name);
                        out.push('=');
                    }
                    write_source_all(&arg.value, out);
                }
                out.push_str("}}");
            }
            MarkupNode::TagExtension {
                name,
                attributes,
                body,
            } => {
                write_open_tag(name, attributes, out);
                out.push_str(body);
                write_close_tag(name, out);
            }
            MarkupNode::XmlElement {
                name,
                attributes,
                body,
            } => {
                write_open_tag(name, attributes, out);
                write_source_all(body, out);
                write_close_tag(name, out);
            }
            MarkupNode::CharRef { code_point } => {
                out.push_str(&format!("&#{};", code_point));
            }
            MarkupNode::EntityRef { name, .. } => {
                out.push('&');
                out.push_str(name);
                out.push(';');
            }
            MarkupNode::ImageLink { target, title } => {
                out.push_str("[[");
                out.push_str(target);
                if !title.is_empty() {
                    out.push('|');
                    write_source_all(title, out);
                }
                out.push_str("]]");
            }
            MarkupNode::Comment => {}
            MarkupNode::PageSwitch { name } => {
                out.push_str("__");
                out.push_str(name);
                out.push_str("__");
            }
            MarkupNode::Other { children, .. } => write_source_all(children, out),
        }
    }

    pub fn to_source(&self) -> String {
        let mut out = String::new();
        self.write_source(&mut out);
        out
    }
}

fn write_source_all(nodes: &[MarkupNode], out: &mut String) {
    for node in nodes {
        node.write_source(out);
    }
}

fn write_open_tag(name: &str, attributes: &[XmlAttribute], out: &mut String) {
    out.push('<');
    out.push_str(name);
    for attr in attributes {
        out.push(' ');
        out.push_str(&attr.name);
        out.push_str("=\"");
        out.push_str(&attr.value);
        out.push('"');
    }
    out.push('>');
}

fn write_close_tag(name: &str, out: &mut String) {
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

/// Concatenated text content of a node list, ignoring markup.
pub fn plain_text(nodes: &[MarkupNode]) -> String {
    let mut out = String::new();
    collect_text(nodes, &mut out);
    out
}

fn collect_text(nodes: &[MarkupNode], out: &mut String) {
    for node in nodes {
        match node {
            MarkupNode::Text { content } => out.push_str(content),
            MarkupNode::Whitespace | MarkupNode::Newline => out.push(' '),
            MarkupNode::Template { args, .. } => {
                for arg in args {
                    collect_text(&arg.value, out);
                }
            }
            other => collect_text(other.children(), out),
        }
    }
}
