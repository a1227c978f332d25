//! Interactive portfolio editor state and logic.

use crate::api::AnalysisClient;
use crate::flow::{self, Flow, FlowKind, FlowState, Outcome, Submission};
use crate::holdings::{HoldingForm, HoldingsList};
use crate::models::RiskPreference;
use crate::render;
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Name of the report interactive mode writes.
pub const REPORT_FILE: &str = "portfolio-report.html";

/// Which form field receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Field {
    #[default]
    Symbol,
    Quantity,
}

impl Field {
    pub fn toggle(self) -> Self {
        match self {
            Field::Symbol => Field::Quantity,
            Field::Quantity => Field::Symbol,
        }
    }
}

/// A one-line message shown under the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Warning(String),
}

/// Application state.
pub struct App {
    /// Text typed into the symbol and quantity fields
    pub form: HoldingForm,
    /// Field with focus
    pub focus: Field,
    /// Holdings entered so far
    pub holdings: HoldingsList,
    /// Selected risk appetite
    pub risk: RiskPreference,
    /// Analysis lifecycle
    pub flow: Flow,
    /// Selected row in the holdings table
    pub selected: usize,
    /// Last warning or info message
    pub notice: Option<Notice>,
    /// Where the last rendered report was written
    pub report_path: PathBuf,
    /// Is the app running
    pub running: bool,
    client: AnalysisClient,
    outcome_tx: mpsc::UnboundedSender<Outcome>,
    outcome_rx: mpsc::UnboundedReceiver<Outcome>,
}

impl App {
    /// Create the editor, pre-filled with `holdings`.
    pub fn new(
        client: AnalysisClient,
        holdings: HoldingsList,
        risk: RiskPreference,
        report_dir: PathBuf,
    ) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

        Self {
            form: HoldingForm::default(),
            focus: Field::Symbol,
            holdings,
            risk,
            flow: Flow::new(FlowKind::PortfolioAnalysis),
            selected: 0,
            notice: None,
            report_path: report_dir.join(REPORT_FILE),
            running: true,
            client,
            outcome_tx,
            outcome_rx,
        }
    }

    /// Type a character into the focused field.
    pub fn input_char(&mut self, c: char) {
        match self.focus {
            Field::Symbol => self.form.symbol.push(c),
            Field::Quantity => self.form.quantity.push(c),
        }
    }

    /// Delete the last character of the focused field.
    pub fn backspace(&mut self) {
        match self.focus {
            Field::Symbol => self.form.symbol.pop(),
            Field::Quantity => self.form.quantity.pop(),
        };
    }

    pub fn next_field(&mut self) {
        self.focus = self.focus.toggle();
    }

    /// Add the holding typed into the form.
    pub fn add_holding(&mut self) {
        match self.holdings.add_from_form(&mut self.form) {
            Ok(()) => {
                self.focus = Field::Symbol;
                self.selected = self.holdings.len() - 1;
                self.notice = None;
            }
            Err(e) => self.notice = Some(Notice::Warning(e.to_string())),
        }
    }

    /// Remove the selected holding.
    pub fn remove_selected(&mut self) {
        if let Some(row) = self.holdings.remove(self.selected) {
            self.notice = Some(Notice::Info(format!("Removed {}", row.symbol)));
            if self.selected >= self.holdings.len() {
                self.selected = self.holdings.len().saturating_sub(1);
            }
        }
    }

    pub fn select_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_down(&mut self) {
        if self.selected < self.holdings.len().saturating_sub(1) {
            self.selected += 1;
        }
    }

    pub fn next_risk(&mut self) {
        self.risk = self.risk.next();
    }

    pub fn prev_risk(&mut self) {
        self.risk = self.risk.prev();
    }

    /// Submit the holdings for analysis on a background task.
    ///
    /// Does nothing but warn while a previous analysis is still running.
    pub fn analyze(&mut self) {
        let request = match self.holdings.to_request(self.risk) {
            Ok(request) => request,
            Err(e) => {
                self.notice = Some(Notice::Warning(e.to_string()));
                return;
            }
        };

        if let Err(e) = self.flow.begin() {
            self.notice = Some(Notice::Warning(e.to_string()));
            return;
        }
        self.notice = None;

        let client = self.client.clone();
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let outcome = flow::execute(&client, &Submission::Portfolio(request)).await;
            // The receiver only goes away when the app is shutting down.
            let _ = tx.send(outcome);
        });
    }

    /// Pick up a finished analysis, if any, and write its report.
    pub fn poll_outcome(&mut self) {
        let Ok(outcome) = self.outcome_rx.try_recv() else {
            return;
        };

        let page = render::page(self.flow.kind().title(), self.flow.complete(outcome));
        if let Err(e) = self.write_report(&page) {
            log::error!("{:#}", e);
            self.notice = Some(Notice::Warning(format!("{:#}", e)));
        }
    }

    fn write_report(&self, page: &str) -> Result<()> {
        if let Some(parent) = self.report_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&self.report_path, page)
            .with_context(|| format!("Failed to write report: {}", self.report_path.display()))?;
        log::info!("Report written to {}", self.report_path.display());
        Ok(())
    }

    /// Status line text for the current flow state.
    pub fn status(&self) -> String {
        match self.flow.state() {
            FlowState::Idle => "Ready".to_string(),
            FlowState::Loading => {
                let elapsed = self.flow.elapsed().unwrap_or_default();
                format!(
                    "Analyzing... {}",
                    humantime::format_duration(std::time::Duration::from_secs(elapsed.as_secs()))
                )
            }
            FlowState::Rendered => format!("Report written to {}", self.report_path.display()),
            FlowState::Failed => match self.flow.results().and_then(failure_message) {
                Some(message) => format!("Error: {}", message),
                None => "Error".to_string(),
            },
        }
    }

    /// Quit the application.
    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn should_quit(&self) -> bool {
        !self.running
    }
}

fn failure_message(document: &render::Document) -> Option<&str> {
    match document.blocks.as_slice() {
        [render::Block::Error(message)] => Some(message.as_str()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;

    fn app() -> App {
        let client = AnalysisClient::new(&ServerConfig::default()).unwrap();
        App::new(
            client,
            HoldingsList::new(),
            RiskPreference::Moderate,
            std::env::temp_dir(),
        )
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            app.input_char(c);
        }
    }

    #[test]
    fn test_typing_and_adding() {
        let mut app = app();
        type_str(&mut app, "AAPL");
        app.next_field();
        type_str(&mut app, "100");
        app.backspace();
        app.add_holding();

        assert_eq!(app.holdings.rows()[0].symbol, "AAPL");
        assert_eq!(app.holdings.rows()[0].quantity, "10");
        assert_eq!(app.form, HoldingForm::default());
        assert_eq!(app.focus, Field::Symbol);
        assert!(app.notice.is_none());
    }

    #[test]
    fn test_rejected_add_keeps_fields_and_warns() {
        let mut app = app();
        type_str(&mut app, "AAPL");
        app.add_holding();

        assert!(app.holdings.is_empty());
        assert_eq!(app.form.symbol, "AAPL");
        assert_eq!(
            app.notice,
            Some(Notice::Warning(
                "Please enter both symbol and quantity".to_string()
            ))
        );
    }

    #[test]
    fn test_analyze_empty_portfolio_warns() {
        let mut app = app();
        app.analyze();
        assert_eq!(app.flow.state(), FlowState::Idle);
        assert!(matches!(app.notice, Some(Notice::Warning(_))));
    }

    #[tokio::test]
    async fn test_analyze_is_guarded_while_loading() {
        let mut app = app();
        app.holdings.add("AAPL", "10").unwrap();

        app.flow.begin().unwrap();
        app.analyze();

        assert_eq!(
            app.notice,
            Some(Notice::Warning("A request is already in progress".to_string()))
        );
        assert!(app.status().starts_with("Analyzing..."));
    }

    #[test]
    fn test_poll_writes_failure_report() {
        let dir = std::env::temp_dir().join(format!("stocklens-app-{}", std::process::id()));
        let client = AnalysisClient::new(&ServerConfig::default()).unwrap();
        let mut app = App::new(client, HoldingsList::new(), RiskPreference::Low, dir.clone());

        app.flow.begin().unwrap();
        app.outcome_tx
            .send(Outcome::Failure("Request timed out after 120s".to_string()))
            .unwrap();
        app.poll_outcome();

        assert_eq!(app.flow.state(), FlowState::Failed);
        assert_eq!(app.status(), "Error: Request timed out after 120s");
        let page = fs::read_to_string(dir.join(REPORT_FILE)).unwrap();
        assert!(page.contains("Error: Request timed out after 120s"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_selection_and_removal() {
        let mut app = app();
        app.holdings.add("AAPL", "10").unwrap();
        app.holdings.add("MSFT", "5").unwrap();

        app.select_down();
        app.select_down();
        assert_eq!(app.selected, 1);
        app.remove_selected();
        assert_eq!(app.selected, 0);
        assert_eq!(app.holdings.rows()[0].symbol, "AAPL");
        app.select_up();
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_risk_cycling() {
        let mut app = app();
        app.next_risk();
        assert_eq!(app.risk, RiskPreference::High);
        app.prev_risk();
        app.prev_risk();
        assert_eq!(app.risk, RiskPreference::Low);
    }
}
