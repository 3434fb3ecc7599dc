//! Minimal XML reader producing a canonical, order-independent form
//!
//! Attributes and child elements are sorted and whitespace-only text is
//! dropped. Other text is kept verbatim, surrounding whitespace included.
//! Declarations, comments, processing instructions and doctypes are skipped.

use std::fmt::Write;
use thiserror::Error;

/// Raised for documents the reader cannot make sense of
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed XML at byte {offset}: {message}")]
pub struct XmlError {
    pub offset: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

/// Canonical text of a document; an empty document yields an empty string
pub fn canonicalize(input: &str) -> Result<String, XmlError> {
    let mut reader = Reader { src: input, pos: 0 };
    reader.skip_misc()?;
    if reader.at_end() {
        return Ok(String::new());
    }
    let root = reader.element()?;
    reader.skip_misc()?;
    if !reader.at_end() {
        return Err(reader.error("content after root element"));
    }
    let mut out = String::new();
    write_node(&mut out, &canonical(Node::Element(root)));
    Ok(out)
}

fn canonical(node: Node) -> Node {
    match node {
        Node::Text(text) => Node::Text(text),
        Node::Element(mut element) => {
            element.attributes.sort();
            let mut children: Vec<(String, Node)> = element
                .children
                .into_iter()
                .map(canonical)
                .map(|child| {
                    let mut key = String::new();
                    write_node(&mut key, &child);
                    (key, child)
                })
                .collect();
            children.sort_by(|a, b| a.0.cmp(&b.0));
            element.children = children.into_iter().map(|(_, child)| child).collect();
            Node::Element(element)
        }
    }
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Text(text) => out.push_str(&escape(text)),
        Node::Element(element) => {
            let _ = write!(out, "<{}", element.name);
            for (name, value) in &element.attributes {
                let _ = write!(out, " {}=\"{}\"", name, escape(value));
            }
            out.push('>');
            for child in &element.children {
                write_node(out, child);
            }
            let _ = write!(out, "</{}>", element.name);
        }
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

struct Reader<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Reader<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn error(&self, message: &str) -> XmlError {
        XmlError {
            offset: self.pos,
            message: message.to_string(),
        }
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    fn skip_past(&mut self, terminator: &str) -> Result<&'a str, XmlError> {
        match self.rest().find(terminator) {
            Some(idx) => {
                let skipped = &self.rest()[..idx];
                self.pos += idx + terminator.len();
                Ok(skipped)
            }
            None => Err(self.error(&format!("missing `{terminator}`"))),
        }
    }

    /// Skip whitespace, declarations, comments and doctypes
    fn skip_misc(&mut self) -> Result<(), XmlError> {
        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.starts_with("<?") {
                self.skip_past("?>")?;
            } else if rest.starts_with("<!--") {
                self.skip_past("-->")?;
            } else if rest.starts_with("<!DOCTYPE") || rest.starts_with("<!doctype") {
                self.skip_past(">")?;
            } else {
                return Ok(());
            }
        }
    }

    fn name(&mut self) -> Result<String, XmlError> {
        let rest = self.rest();
        let end = rest
            .find(|c: char| c.is_whitespace() || matches!(c, '>' | '/' | '='))
            .unwrap_or(rest.len());
        if end == 0 {
            return Err(self.error("expected a name"));
        }
        self.pos += end;
        Ok(rest[..end].to_string())
    }

    fn expect(&mut self, token: &str) -> Result<(), XmlError> {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            Ok(())
        } else {
            Err(self.error(&format!("expected `{token}`")))
        }
    }

    fn element(&mut self) -> Result<Element, XmlError> {
        self.expect("<")?;
        let name = self.name()?;
        let mut attributes = Vec::new();

        loop {
            self.skip_whitespace();
            if self.rest().starts_with("/>") {
                self.pos += 2;
                return Ok(Element {
                    name,
                    attributes,
                    children: Vec::new(),
                });
            }
            if self.rest().starts_with('>') {
                self.pos += 1;
                break;
            }
            let attr = self.name()?;
            self.skip_whitespace();
            self.expect("=")?;
            self.skip_whitespace();
            let quote = match self.rest().chars().next() {
                Some(q @ ('"' | '\'')) => q,
                _ => return Err(self.error("expected quoted attribute value")),
            };
            self.pos += 1;
            let raw = self.skip_past(&quote.to_string())?;
            attributes.push((attr, unescape(raw)));
        }

        let children = self.children(&name)?;
        Ok(Element {
            name,
            attributes,
            children,
        })
    }

    fn children(&mut self, parent: &str) -> Result<Vec<Node>, XmlError> {
        let mut children = Vec::new();
        let mut text = String::new();

        loop {
            let rest = self.rest();
            if rest.is_empty() {
                return Err(self.error(&format!("unclosed element `{parent}`")));
            }
            if rest.starts_with("</") {
                self.pos += 2;
                let closing = self.name()?;
                if closing != parent {
                    return Err(self.error(&format!(
                        "expected `</{parent}>`, found `</{closing}>`"
                    )));
                }
                self.skip_whitespace();
                self.expect(">")?;
                push_text(&mut children, &mut text);
                return Ok(children);
            }
            if rest.starts_with("<![CDATA[") {
                self.pos += "<![CDATA[".len();
                text.push_str(self.skip_past("]]>")?);
            } else if rest.starts_with("<!--") {
                self.skip_past("-->")?;
            } else if rest.starts_with("<?") {
                self.skip_past("?>")?;
            } else if rest.starts_with('<') {
                push_text(&mut children, &mut text);
                children.push(Node::Element(self.element()?));
            } else {
                let end = rest.find('<').unwrap_or(rest.len());
                text.push_str(&unescape(&rest[..end]));
                self.pos += end;
            }
        }
    }
}

fn push_text(children: &mut Vec<Node>, text: &mut String) {
    if !text.trim().is_empty() {
        children.push(Node::Text(std::mem::take(text)));
    }
    text.clear();
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(idx) = rest.find('&') {
        out.push_str(&rest[..idx]);
        rest = &rest[idx..];
        let Some(end) = rest.find(';') else {
            break;
        };
        let entity = &rest[1..end];
        let decoded = match entity {
            "lt" => Some('<'),
            "gt" => Some('>'),
            "amp" => Some('&'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix("#x")
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                .and_then(char::from_u32),
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
