//! Past stock queries.

use super::{Block, Document, stock};
use crate::models::HistoryResponse;

/// Render every remembered query, oldest first.
pub fn report(response: &HistoryResponse) -> Document {
    let mut document = Document::new();
    document.heading(3, "Query History");

    if response.history.is_empty() {
        document.push(Block::Paragraph("No queries yet.".to_string()));
        return document;
    }

    for (i, entry) in response.history.iter().enumerate() {
        if i > 0 {
            document.push(Block::Rule);
        }
        stock::append(&mut document, entry);
    }

    document
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history() {
        let response: HistoryResponse = serde_json::from_str(r#"{"history":[]}"#).unwrap();
        let html = report(&response).to_html();
        assert!(html.contains("<p>No queries yet.</p>"));
    }

    #[test]
    fn test_entries_in_order() {
        let response: HistoryResponse = serde_json::from_str(
            r#"{"history":[
                {"query":"first","stock_symbol":"AAPL"},
                {"query":"second","stock_symbol":"MSFT","insights":"ok"}]}"#,
        )
        .unwrap();

        let html = report(&response).to_html();
        let first = html.find("first").unwrap();
        let second = html.find("second").unwrap();
        assert!(first < second);
        assert_eq!(html.matches("<hr>").count(), 1);
        assert_eq!(html.matches("<h3>Results</h3>").count(), 2);
    }
}
