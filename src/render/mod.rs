//! Turning service responses into HTML.
//!
//! Renderers build a [`Document`] (a flat list of optional sections) from a
//! response; [`html`] turns that into markup with all text escaped.

pub mod history;
pub mod html;
pub mod markdown;
pub mod portfolio;
pub mod stock;

use chrono::Local;

/// A rendered result, as an ordered list of blocks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub blocks: Vec<Block>,
}

/// One piece of rendered output.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading { level: u8, text: String },
    /// A bold label followed by a value
    Field { label: String, value: String },
    Paragraph(String),
    /// Inline PNG, carried as validated base64
    Image { alt: String, base64: String },
    Table(Table),
    /// Markdown source, converted when written
    Markdown(String),
    /// A `<div>` container with a layout class
    Group { class: String, blocks: Vec<Block> },
    Rule,
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    /// Opens in a new browsing context
    Link { href: String, label: String },
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// A document holding nothing but one error message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            blocks: vec![Block::Error(message.into())],
        }
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn heading(&mut self, level: u8, text: impl Into<String>) {
        self.push(Block::Heading {
            level,
            text: text.into(),
        });
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.blocks.as_slice(), [Block::Error(_)])
    }

    /// Render as an HTML fragment.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        html::write_document(&mut out, self);
        out
    }
}

impl Block {
    /// An inline PNG block, or `None` if the payload is not usable base64.
    pub fn png(alt: &str, payload: &str) -> Option<Block> {
        let base64: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let valid = !base64.is_empty()
            && base64
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='));

        if !valid {
            log::warn!("Dropping {} image: payload is not base64", alt);
            return None;
        }

        Some(Block::Image {
            alt: alt.to_string(),
            base64,
        })
    }
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }
}

/// Wrap a document into a standalone HTML page.
pub fn page(title: &str, document: &Document) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
.chart-breakdown {{ display: flex; gap: 24px; align-items: flex-start; }}
.chart-breakdown > div {{ flex: 1; }}
</style>
</head>
<body>
{body}<footer><p>Generated {generated}</p></footer>
</body>
</html>
"#,
        title = html::escape(title),
        body = document.to_html(),
        generated = Local::now().format("%Y-%m-%d %H:%M:%S"),
    )
}

#[cfg(test)]
impl Document {
    /// Headings in document order, including those inside groups.
    pub fn headings(&self) -> Vec<&str> {
        fn collect<'a>(blocks: &'a [Block], out: &mut Vec<&'a str>) {
            for block in blocks {
                match block {
                    Block::Heading { text, .. } => out.push(text),
                    Block::Group { blocks, .. } => collect(blocks, out),
                    _ => {}
                }
            }
        }
        let mut out = Vec::new();
        collect(&self.blocks, &mut out);
        out
    }
}
