//! Portfolio analysis results.

use super::{Block, Cell, Document, Table};
use crate::models::{PortfolioAnalysisResponse, non_empty, weight_text};

/// Build the portfolio analysis report.
///
/// Chart and sector breakdown share a two-column container when either is
/// present. A breakdown map that was sent but is empty still gets its
/// header-only table. The insights and recommendations blocks are always
/// emitted, empty when the service sent nothing.
pub fn report(response: &PortfolioAnalysisResponse) -> Document {
    let mut document = Document::new();
    document.heading(3, "Portfolio Analysis Results");

    let mut columns = Vec::new();

    let chart =
        non_empty(&response.sector_chart_base64).and_then(|c| Block::png("Sector Chart", c));
    if let Some(chart) = chart {
        columns.push(Block::Group {
            class: "chart".to_string(),
            blocks: vec![heading("Sector Chart"), chart],
        });
    }

    if let Some(breakdown) = &response.sector_breakdown {
        let table = Table {
            headers: vec!["Sector", "Weight"],
            rows: breakdown
                .iter()
                .map(|(sector, weight)| {
                    vec![Cell::text(sector.as_str()), Cell::text(weight_text(weight))]
                })
                .collect(),
        };
        columns.push(Block::Group {
            class: "breakdown".to_string(),
            blocks: vec![heading("Sector Breakdown"), Block::Table(table)],
        });
    }

    if !columns.is_empty() {
        document.push(Block::Group {
            class: "chart-breakdown".to_string(),
            blocks: columns,
        });
    }

    document.heading(4, "AI Insights");
    document.push(Block::Markdown(response.ai_insights.clone().unwrap_or_default()));
    document.heading(4, "Recommendations");
    document.push(Block::Markdown(response.recommendations_text().to_string()));

    document
}

fn heading(text: &str) -> Block {
    Block::Heading {
        level: 4,
        text: text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> PortfolioAnalysisResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_breakdown_only_scenario() {
        let document = report(&parse(r#"{"sector_breakdown":{"Tech":"100%"}}"#));

        assert_eq!(
            document.headings(),
            vec![
                "Portfolio Analysis Results",
                "Sector Breakdown",
                "AI Insights",
                "Recommendations"
            ]
        );

        let html = document.to_html();
        assert!(html.contains("<div class=\"chart-breakdown\">"));
        assert!(html.contains("<tr><td>Tech</td><td>100%</td></tr>"));
        assert!(!html.contains("<img"));
        assert!(!html.contains("<div class=\"chart\">"));
        assert_eq!(html.matches("<div class=\"markdown\"></div>").count(), 2);
    }

    #[test]
    fn test_chart_and_breakdown_side_by_side() {
        let document = report(&parse(
            r#"{"sector_chart_base64":"iVBORw0KGgo=",
                "sector_breakdown":{"IT":15,"Banking":5},
                "ai_insights":"Too much **IT**",
                "recommendations":"Add pharma"}"#,
        ));

        let Block::Group { class, blocks } = &document.blocks[1] else {
            panic!("expected chart-breakdown container");
        };
        assert_eq!(class, "chart-breakdown");
        assert!(matches!(&blocks[0], Block::Group { class, .. } if class == "chart"));
        assert!(matches!(&blocks[1], Block::Group { class, .. } if class == "breakdown"));

        let html = document.to_html();
        assert!(html.contains("<td>IT</td><td>15</td>"));
        assert!(html.contains("<td>Banking</td><td>5</td>"));
        assert!(html.contains("Too much <strong>IT</strong>"));
        assert!(html.contains("Add pharma"));
    }

    #[test]
    fn test_chart_only() {
        let response = parse(r#"{"sector_chart_base64":"AAAA"}"#);
        let html = report(&response).to_html();
        assert!(html.contains("<div class=\"chart\">"));
        assert!(!html.contains("<div class=\"breakdown\">"));
    }

    #[test]
    fn test_empty_breakdown_still_renders_table() {
        let document = report(&parse(
            r#"{"sector_chart_base64":"","sector_breakdown":{},"ai_insights":"","recommendations":{}}"#,
        ));
        assert_eq!(
            document.headings(),
            vec![
                "Portfolio Analysis Results",
                "Sector Breakdown",
                "AI Insights",
                "Recommendations"
            ]
        );

        let html = document.to_html();
        assert!(html.contains("<div class=\"chart-breakdown\">"));
        assert!(html.contains("<div class=\"breakdown\">"));
        assert!(html.contains("<th>Sector</th><th>Weight</th>"));
        assert!(!html.contains("<tr><td>"));
        assert!(!html.contains("<div class=\"chart\">"));
    }

    #[test]
    fn test_empty_response_keeps_text_blocks() {
        let document = report(&parse(r#"{"recommendations":{}}"#));
        assert_eq!(
            document.headings(),
            vec!["Portfolio Analysis Results", "AI Insights", "Recommendations"]
        );
        let html = document.to_html();
        assert!(!html.contains("chart-breakdown"));
        assert_eq!(html.matches("<div class=\"markdown\"></div>").count(), 2);
    }

    #[test]
    fn test_sector_names_are_escaped() {
        let html = report(&parse(r#"{"sector_breakdown":{"<i>Energy</i>":"50%"}}"#)).to_html();
        assert!(html.contains("<td>&lt;i&gt;Energy&lt;/i&gt;</td>"));
    }
}
