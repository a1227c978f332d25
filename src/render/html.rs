//! HTML writer for rendered documents.
//!
//! Every piece of text and every attribute passes through [`escape`];
//! markdown blocks are the only place HTML markup is produced from input.

use super::markdown;
use super::{Block, Cell, Document, Table};

/// Escape text for use in element content or a quoted attribute.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Whether a link destination is safe to put in an href.
///
/// Relative URLs and http(s)/mailto are allowed; any other scheme
/// (`javascript:`, `data:`, ...) is not.
pub fn is_safe_url(url: &str) -> bool {
    let url = url.trim();
    match url.find([':', '/', '?', '#']) {
        Some(i) if url[i..].starts_with(':') => {
            let scheme = url[..i].to_ascii_lowercase();
            matches!(scheme.as_str(), "http" | "https" | "mailto")
        }
        _ => true,
    }
}

/// Write a whole document as an HTML fragment.
pub fn write_document(out: &mut String, document: &Document) {
    for block in &document.blocks {
        write_block(out, block);
    }
}

fn write_block(out: &mut String, block: &Block) {
    match block {
        Block::Heading { level, text } => {
            out.push_str(&format!("<h{level}>{}</h{level}>\n", escape(text)));
        }
        Block::Field { label, value } => {
            out.push_str(&format!(
                "<p><strong>{}:</strong> {}</p>\n",
                escape(label),
                escape(value)
            ));
        }
        Block::Paragraph(text) => {
            out.push_str(&format!("<p>{}</p>\n", escape(text)));
        }
        Block::Image { alt, base64 } => {
            out.push_str(&format!(
                "<img src=\"data:image/png;base64,{}\" alt=\"{}\" style=\"max-width:100%;\">\n",
                escape(base64),
                escape(alt)
            ));
        }
        Block::Table(table) => write_table(out, table),
        Block::Markdown(source) => {
            out.push_str("<div class=\"markdown\">");
            out.push_str(&markdown::to_html(source));
            out.push_str("</div>\n");
        }
        Block::Group { class, blocks } => {
            out.push_str(&format!("<div class=\"{}\">\n", escape(class)));
            for inner in blocks {
                write_block(out, inner);
            }
            out.push_str("</div>\n");
        }
        Block::Rule => out.push_str("<hr>\n"),
        Block::Error(message) => {
            out.push_str(&format!(
                "<p class=\"error\" style=\"color:red;\">Error: {}</p>\n",
                escape(message)
            ));
        }
    }
}

fn write_table(out: &mut String, table: &Table) {
    out.push_str("<table border=\"1\" cellpadding=\"8\" cellspacing=\"0\">\n<thead><tr>");
    for header in &table.headers {
        out.push_str(&format!("<th>{}</th>", escape(header)));
    }
    out.push_str("</tr></thead>\n<tbody>\n");

    for row in &table.rows {
        out.push_str("<tr>");
        for cell in row {
            out.push_str("<td>");
            write_cell(out, cell);
            out.push_str("</td>");
        }
        out.push_str("</tr>\n");
    }

    out.push_str("</tbody></table>\n");
}

fn write_cell(out: &mut String, cell: &Cell) {
    match cell {
        Cell::Text(text) => out.push_str(&escape(text)),
        Cell::Link { href, label } => {
            let href = if is_safe_url(href) { href.as_str() } else { "#" };
            out.push_str(&format!(
                "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
                escape(href),
                escape(label)
            ));
        }
    }
}
