/*!
 * TEI rendering in DraCor house style.
 *
 * Rendering runs in two passes over a flat list of lines:
 * 1. `layout` turns the tree into one line per tag, comment or text run,
 *    each with its nesting depth.
 * 2. `apply_house_style` folds every element whose content is only text and
 *    inline stage directions onto a single line.
 *
 * The rendered document is parsed again before it is handed out.
 */

use log::debug;

use crate::errors::SerializeError;
use crate::tei::tree::{Child, DocumentTree, NodeId, NodeKind};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const INDENT: &str = "  ";

/// One rendered line before indentation
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    Open { name: String, attrs: Vec<(String, String)> },
    Close { name: String },
    Empty { name: String, attrs: Vec<(String, String)> },
    /// Unescaped text run
    Text(String),
    /// Unescaped comment body
    Comment(String),
    /// Complete element markup on one line
    Leaf(String),
    /// `<stage>…</stage>` to be merged into the surrounding text
    InlineStage(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub depth: usize,
    pub kind: LineKind,
}

impl Line {
    fn new(depth: usize, kind: LineKind) -> Self {
        Self { depth, kind }
    }

    fn is_inline(&self) -> bool {
        matches!(self.kind, LineKind::Text(_) | LineKind::InlineStage(_))
    }
}

/// One line per tag, comment and non-blank text run
pub fn layout(tree: &DocumentTree) -> Vec<Line> {
    let mut lines = Vec::new();
    layout_node(tree, tree.root(), 0, &mut lines);
    lines
}

fn layout_node(tree: &DocumentTree, node: NodeId, depth: usize, lines: &mut Vec<Line>) {
    let name = match tree.kind(node) {
        NodeKind::Comment => {
            lines.push(Line::new(depth, LineKind::Comment(tree.text(node).trim().to_string())));
            return;
        }
        NodeKind::Element(name) => name.clone(),
    };
    let attrs = tree.attrs(node).to_vec();

    let children = tree.children(node);
    if children.is_empty() {
        lines.push(Line::new(depth, LineKind::Empty { name, attrs }));
        return;
    }

    lines.push(Line::new(depth, LineKind::Open { name: name.clone(), attrs }));
    for child in children {
        match child {
            Child::Text(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    lines.push(Line::new(depth + 1, LineKind::Text(text.to_string())));
                }
            }
            Child::Node(id) => layout_node(tree, *id, depth + 1, lines),
        }
    }
    lines.push(Line::new(depth, LineKind::Close { name }));
}

/// Fold text-only elements onto one line and merge inline stages into their text
pub fn apply_house_style(lines: Vec<Line>) -> Vec<Line> {
    let mut out: Vec<Line> = Vec::with_capacity(lines.len());
    let mut open: Vec<usize> = Vec::new();

    for line in lines {
        match &line.kind {
            LineKind::Open { .. } => {
                open.push(out.len());
                out.push(line);
            }
            LineKind::Close { .. } => {
                let Some(start) = open.pop() else {
                    out.push(line);
                    continue;
                };
                if !out[start + 1..].iter().all(Line::is_inline) {
                    out.push(line);
                    continue;
                }

                let content = out.split_off(start + 1);
                let Some(opening) = out.pop() else {
                    continue;
                };
                if let LineKind::Open { name, attrs } = opening.kind {
                    out.push(fold_element(opening.depth, &name, &attrs, &content));
                }
            }
            _ => out.push(line),
        }
    }

    out
}

fn fold_element(depth: usize, name: &str, attrs: &[(String, String)], content: &[Line]) -> Line {
    let inner = join_inline(name, content);
    let is_inline_stage = name == "stage" && attrs.iter().any(|(k, v)| k == "type" && v == "inline");

    if is_inline_stage {
        return Line::new(depth, LineKind::InlineStage(format!("<stage>{}</stage>", inner)));
    }
    if content.is_empty() {
        return Line::new(depth, LineKind::Leaf(format!("<{}{}/>", name, render_attrs(attrs))));
    }
    Line::new(
        depth,
        LineKind::Leaf(format!("<{}{}>{}</{}>", name, render_attrs(attrs), inner, name)),
    )
}

/// Speaker text runs join without separator; everything else with one space,
/// except two stages in a row
fn join_inline(name: &str, content: &[Line]) -> String {
    let mut result = String::new();
    let mut previous: Option<&LineKind> = None;

    for line in content {
        let separator = match (previous, &line.kind) {
            (None, _) => "",
            (Some(LineKind::Text(_)), LineKind::Text(_)) if name == "speaker" => "",
            (Some(LineKind::InlineStage(_)), LineKind::InlineStage(_)) => "",
            _ => " ",
        };
        result.push_str(separator);

        match &line.kind {
            LineKind::Text(text) => result.push_str(&escape_text(text)),
            LineKind::InlineStage(markup) => result.push_str(markup),
            _ => {}
        }
        previous = Some(&line.kind);
    }

    result
}

/// Indented document with the XML declaration
pub fn render(lines: &[Line]) -> String {
    let mut output = String::from(XML_DECLARATION);
    output.push('\n');

    for line in lines {
        output.push_str(&INDENT.repeat(line.depth));
        match &line.kind {
            LineKind::Open { name, attrs } => {
                output.push_str(&format!("<{}{}>", name, render_attrs(attrs)));
            }
            LineKind::Close { name } => output.push_str(&format!("</{}>", name)),
            LineKind::Empty { name, attrs } => {
                output.push_str(&format!("<{}{}/>", name, render_attrs(attrs)));
            }
            LineKind::Text(text) => output.push_str(&escape_text(text)),
            LineKind::Comment(text) => output.push_str(&format!("<!-- {} -->", sanitize_comment(text))),
            LineKind::Leaf(markup) | LineKind::InlineStage(markup) => output.push_str(markup),
        }
        output.push('\n');
    }

    output
}

/// Render, apply house style and verify the tree
pub fn serialize(tree: &DocumentTree) -> Result<String, SerializeError> {
    let lines = apply_house_style(layout(tree));
    let output = render(&lines);
    verify(&output)?;
    debug!("Rendered TEI document: {} lines", lines.len() + 1);
    Ok(output)
}

/// Re-parse the rendering; failure carries the full text
pub fn verify(content: &str) -> Result<(), SerializeError> {
    roxmltree::Document::parse(content)
        .map(|_| ())
        .map_err(|e| SerializeError::MalformedOutput {
            reason: e.to_string(),
            content: content.to_string(),
        })
}

fn render_attrs(attrs: &[(String, String)]) -> String {
    attrs
        .iter()
        .map(|(k, v)| format!(" {}=\"{}\"", k, escape_attr(v)))
        .collect()
}

pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

/// Comments may not contain `--` or end with `-`
fn sanitize_comment(text: &str) -> String {
    let mut sanitized = text.to_string();
    while sanitized.contains("--") {
        sanitized = sanitized.replace("--", "- -");
    }
    if sanitized.ends_with('-') {
        sanitized.push(' ');
    }
    sanitized
}
