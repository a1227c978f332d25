//! Command-line interface.

use crate::models::RiskPreference;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// Ask a stock insight service about a stock or a portfolio and get the
/// answer back as HTML.
///
/// Results (tables, charts, AI-written summaries) are written as an HTML
/// fragment or a standalone page, to stdout or a file.
#[derive(Parser, Debug, Clone)]
#[command(name = "stocklens")]
#[command(version)]
#[command(about = "Stock insight and portfolio analysis client with HTML reports", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file path
    #[arg(short = 'c', long, global = true, env = "STOCKLENS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URL of the insight service (overrides config)
    #[arg(short = 'u', long, global = true, env = "STOCKLENS_URL")]
    pub url: Option<String>,

    /// Request timeout in seconds (overrides config)
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Verbose output on stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Ask about a stock in free text
    Query {
        /// The question, e.g. "TCS outlook this week"
        query: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Analyze a portfolio's sector mix and get recommendations
    Portfolio {
        /// Holding as SYMBOL:QUANTITY (repeatable, replaces configured holdings)
        #[arg(short = 'p', long = "holding", value_name = "SYMBOL:QTY", value_parser = parse_holding)]
        holdings: Vec<(String, String)>,

        /// Risk appetite (defaults to the configured one)
        #[arg(short = 'r', long, value_enum)]
        risk: Option<RiskPreference>,

        /// Edit holdings in an interactive terminal form
        #[arg(short = 'i', long)]
        interactive: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show or clear the service's query history
    History {
        /// Clear the history instead of showing it
        #[arg(long)]
        clear: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Print a sample configuration file
    Config {
        /// Write the sample to the default config path instead
        #[arg(long)]
        write: bool,
    },
}

/// Where and how rendered HTML is written.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Write HTML to this file instead of stdout
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Emit only the result fragment, without the surrounding page
    #[arg(long)]
    pub fragment: bool,
}

/// Split `SYMBOL:QTY`. Values are validated later, with the same rules as
/// the interactive form.
fn parse_holding(s: &str) -> Result<(String, String), String> {
    s.rsplit_once(':')
        .map(|(symbol, quantity)| (symbol.to_string(), quantity.to_string()))
        .ok_or_else(|| format!("expected SYMBOL:QUANTITY, got '{}'", s))
}

impl Args {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Args::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_command() {
        let args = Args::parse_from(["stocklens", "query", "AAPL outlook"]);
        let Command::Query { query, output } = args.command else {
            panic!("expected query command");
        };
        assert_eq!(query, "AAPL outlook");
        assert!(output.output.is_none());
        assert!(!output.fragment);
        assert!(!args.verbose);
    }

    #[test]
    fn test_portfolio_holdings_parsing() {
        let args = Args::parse_from([
            "stocklens",
            "portfolio",
            "-p",
            "AAPL:10",
            "--holding",
            "MSFT:5",
            "--risk",
            "moderate",
            "-o",
            "report.html",
        ]);
        let Command::Portfolio {
            holdings,
            risk,
            interactive,
            output,
        } = args.command
        else {
            panic!("expected portfolio command");
        };
        assert_eq!(
            holdings,
            vec![
                ("AAPL".to_string(), "10".to_string()),
                ("MSFT".to_string(), "5".to_string())
            ]
        );
        assert_eq!(risk, Some(RiskPreference::Moderate));
        assert!(!interactive);
        assert_eq!(output.output, Some(PathBuf::from("report.html")));
    }

    #[test]
    fn test_holding_without_separator_rejected() {
        let result = Args::try_parse_from(["stocklens", "portfolio", "-p", "AAPL"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "stocklens",
            "history",
            "--clear",
            "--url",
            "http://localhost:9000",
            "--timeout",
            "5",
            "-v",
        ])
        .unwrap();
        assert!(matches!(args.command, Command::History { clear: true, .. }));
        assert_eq!(args.url.as_deref(), Some("http://localhost:9000"));
        assert_eq!(args.timeout, Some(5));
        assert!(args.verbose);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = Args::try_parse_from(["stocklens", "query", "q", "--timeout", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_risk_values() {
        let args = Args::parse_from(["stocklens", "portfolio", "-r", "high"]);
        assert!(matches!(
            args.command,
            Command::Portfolio {
                risk: Some(RiskPreference::High),
                ..
            }
        ));

        let result = Args::try_parse_from(["stocklens", "portfolio", "--risk", "yolo"]);
        assert!(result.is_err());
    }
}
