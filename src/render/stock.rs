//! Stock query results.

use super::{Block, Cell, Document, Table};
use crate::models::{QueryResponse, SentimentResult, StockDataPoint, non_empty};

/// Build the stock query report.
///
/// Sections appear in a fixed order (header, chart, daily data, news,
/// insights, sentiment) and each optional one only when its field has content.
pub fn report(response: &QueryResponse) -> Document {
    let mut document = Document::new();
    append(&mut document, response);
    document
}

/// Append the report sections for one response to `document`.
pub(super) fn append(document: &mut Document, response: &QueryResponse) {
    document.heading(3, "Results");
    document.push(Block::Field {
        label: "Query".to_string(),
        value: response.query.clone(),
    });
    document.push(Block::Field {
        label: "Stock Symbol".to_string(),
        value: response.stock_symbol.clone(),
    });

    let chart = non_empty(&response.chart_base64).and_then(|c| Block::png("Stock Chart", c));
    if let Some(chart) = chart {
        document.heading(4, "Stock Chart");
        document.push(chart);
    }

    if let Some(days) = response.stock_data.as_deref().filter(|d| !d.is_empty()) {
        document.heading(4, "Last 7 days Stock Data");
        document.push(Block::Table(daily_table(days)));
    }

    if let Some(summary) = non_empty(&response.news_summary) {
        document.heading(4, "News Summary");
        document.push(Block::Markdown(summary.to_string()));
    }

    if let Some(insights) = non_empty(&response.insights) {
        document.heading(4, "Insights");
        document.push(Block::Markdown(insights.to_string()));
    }

    if let Some(results) = response.sentiment_results.as_deref().filter(|r| !r.is_empty()) {
        document.heading(4, "Sentiment Results");
        document.push(Block::Table(sentiment_table(results)));
    }
}

fn daily_table(days: &[StockDataPoint]) -> Table {
    Table {
        headers: vec!["Open", "Close", "High", "Low", "Volume"],
        rows: days
            .iter()
            .map(|day| {
                vec![
                    Cell::text(format!("{:.2}", day.open)),
                    Cell::text(format!("{:.2}", day.close)),
                    Cell::text(format!("{:.2}", day.high)),
                    Cell::text(format!("{:.2}", day.low)),
                    Cell::text(day.volume.to_string()),
                ]
            })
            .collect(),
    }
}

fn sentiment_table(results: &[SentimentResult]) -> Table {
    Table {
        headers: vec!["Title", "Snippet", "URL", "Sentiment", "Score"],
        rows: results
            .iter()
            .map(|result| {
                vec![
                    Cell::text(result.title.as_str()),
                    Cell::text(result.snippet.as_str()),
                    Cell::Link {
                        href: result.url.clone(),
                        label: "Read Article".to_string(),
                    },
                    Cell::text(result.sentiment.as_str()),
                    Cell::text(result.score.to_string()),
                ]
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> QueryResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_single_day_scenario() {
        let response = parse(
            r#"{"query":"AAPL outlook","stock_symbol":"AAPL",
                "stock_data":[{"Open":150.1,"Close":151.25,"High":152,"Low":149.5,"Volume":1000000}]}"#,
        );

        let document = report(&response);
        assert_eq!(document.headings(), vec!["Results", "Last 7 days Stock Data"]);

        let html = document.to_html();
        assert!(html.contains("<p><strong>Query:</strong> AAPL outlook</p>"));
        assert!(html.contains("<p><strong>Stock Symbol:</strong> AAPL</p>"));
        assert!(html.contains(
            "<tr><td>150.10</td><td>151.25</td><td>152.00</td><td>149.50</td><td>1000000</td></tr>"
        ));
        assert_eq!(html.matches("<tr><td>").count(), 1);
        assert!(!html.contains("<img"));
        assert!(!html.contains("class=\"markdown\""));
    }

    #[test]
    fn test_rows_follow_array_order() {
        let response = parse(
            r#"{"query":"q","stock_symbol":"TCS.NS","stock_data":[
                {"Open":3.0,"Close":3.0,"High":3.0,"Low":3.0,"Volume":3},
                {"Open":1.0,"Close":1.0,"High":1.0,"Low":1.0,"Volume":1},
                {"Open":2.0,"Close":2.0,"High":2.0,"Low":2.0,"Volume":2}]}"#,
        );

        let html = report(&response).to_html();
        let first = html.find("<td>3.00</td>").unwrap();
        let second = html.find("<td>1.00</td>").unwrap();
        let third = html.find("<td>2.00</td>").unwrap();
        assert!(first < second && second < third);
        assert_eq!(html.matches("<tr><td>").count(), 3);
    }

    #[test]
    fn test_full_response_section_order() {
        let response = parse(
            r#"{"query":"Infosys news","stock_symbol":"INFY",
                "chart_base64":"iVBORw0KGgo=",
                "stock_data":[{"Open":1.0,"Close":2.0,"High":3.0,"Low":0.5,"Volume":10}],
                "news_summary":"Earnings **beat**",
                "insights":"- hold",
                "sentiment_results":[{"title":"Q3","snippet":"Strong","url":"https://news.example/q3",
                                      "sentiment":"positive","score":0.93}]}"#,
        );

        let document = report(&response);
        assert_eq!(
            document.headings(),
            vec![
                "Results",
                "Stock Chart",
                "Last 7 days Stock Data",
                "News Summary",
                "Insights",
                "Sentiment Results"
            ]
        );

        let html = document.to_html();
        assert!(html.contains("src=\"data:image/png;base64,iVBORw0KGgo=\""));
        assert!(html.contains("<strong>beat</strong>"));
        assert!(html.contains(
            "<a href=\"https://news.example/q3\" target=\"_blank\" rel=\"noopener noreferrer\">Read Article</a>"
        ));
        assert!(html.contains("<td>positive</td><td>0.93</td>"));
    }

    #[test]
    fn test_empty_fields_are_omitted() {
        let response = parse(
            r#"{"query":"q","stock_symbol":"N/A","chart_base64":"","stock_data":[],
                "news_summary":"","insights":null,"sentiment_results":[]}"#,
        );

        assert_eq!(report(&response).headings(), vec!["Results"]);
    }

    #[test]
    fn test_missing_chart_does_not_affect_other_sections() {
        let with_chart = parse(
            r#"{"query":"q","stock_symbol":"S","chart_base64":"AAAA","insights":"fine"}"#,
        );
        let without_chart = parse(r#"{"query":"q","stock_symbol":"S","insights":"fine"}"#);

        let chart_heading = Block::Heading {
            level: 4,
            text: "Stock Chart".to_string(),
        };
        let mut expected = report(&with_chart);
        expected
            .blocks
            .retain(|b| !matches!(b, Block::Image { .. }) && *b != chart_heading);
        assert_eq!(report(&without_chart), expected);
    }

    #[test]
    fn test_backend_text_is_escaped() {
        let response = parse(
            r#"{"query":"<img src=x onerror=alert(1)>","stock_symbol":"A&B",
                "sentiment_results":[{"title":"<b>t</b>","snippet":"s","url":"javascript:alert(1)",
                                      "sentiment":"neutral","score":0}]}"#,
        );

        let html = report(&response).to_html();
        assert!(html.contains("&lt;img src=x onerror=alert(1)&gt;"));
        assert!(html.contains("A&amp;B"));
        assert!(html.contains("<td>&lt;b&gt;t&lt;/b&gt;</td>"));
        assert!(!html.contains("javascript:"));
    }
}
