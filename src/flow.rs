//! Submission lifecycle shared by the stock query and portfolio flows.
//!
//! A flow moves `Idle -> Loading -> Rendered | Failed` and back through
//! `Loading` on the next submission. Only one request may be in flight.

use crate::api::Backend;
use crate::error::FlowError;
use crate::models::{PortfolioRequest, StockQueryRequest};
use crate::render::{self, Document};
use std::time::{Duration, Instant};

/// Which of the two flows this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    StockQuery,
    PortfolioAnalysis,
    History,
}

impl FlowKind {
    /// Title used for standalone pages.
    pub fn title(&self) -> &'static str {
        match self {
            FlowKind::StockQuery => "Stock Insights",
            FlowKind::PortfolioAnalysis => "Portfolio Analysis",
            FlowKind::History => "Query History",
        }
    }

    /// Shown while a request of this kind is in flight.
    pub fn loading_message(&self) -> &'static str {
        match self {
            FlowKind::StockQuery => "Loading stock insights...",
            FlowKind::PortfolioAnalysis => "Analyzing portfolio...",
            FlowKind::History => "Loading query history...",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowState {
    #[default]
    Idle,
    Loading,
    Rendered,
    Failed,
}

/// What to send.
#[derive(Debug, Clone)]
pub enum Submission {
    Query(StockQueryRequest),
    Portfolio(PortfolioRequest),
}

impl Submission {
    pub fn kind(&self) -> FlowKind {
        match self {
            Submission::Query(_) => FlowKind::StockQuery,
            Submission::Portfolio(_) => FlowKind::PortfolioAnalysis,
        }
    }
}

/// Result of one round-trip: a rendered document or the reason it failed.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Document),
    Failure(String),
}

/// One flow's state and its result area.
#[derive(Debug)]
pub struct Flow {
    kind: FlowKind,
    state: FlowState,
    results: Option<Document>,
    started: Option<Instant>,
}

impl Flow {
    pub fn new(kind: FlowKind) -> Self {
        Self {
            kind,
            state: FlowState::Idle,
            results: None,
            started: None,
        }
    }

    pub fn kind(&self) -> FlowKind {
        self.kind
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == FlowState::Loading
    }

    /// Start a submission: clear previous results and show loading.
    pub fn begin(&mut self) -> Result<(), FlowError> {
        if self.is_loading() {
            return Err(FlowError::Busy);
        }
        self.results = None;
        self.state = FlowState::Loading;
        self.started = Some(Instant::now());
        Ok(())
    }

    /// Finish the in-flight submission and store what should be shown.
    pub fn complete(&mut self, outcome: Outcome) -> &Document {
        if let Some(started) = self.started.take() {
            log::debug!(
                "{} finished in {}",
                self.kind.title(),
                humantime::format_duration(Duration::from_millis(
                    started.elapsed().as_millis() as u64
                ))
            );
        }

        let document = match outcome {
            Outcome::Success(document) => {
                self.state = FlowState::Rendered;
                document
            }
            Outcome::Failure(message) => {
                log::error!("{} failed: {}", self.kind.title(), message);
                self.state = FlowState::Failed;
                Document::failure(message)
            }
        };

        self.results.insert(document)
    }

    /// Time since the current submission started, if one is in flight.
    pub fn elapsed(&self) -> Option<Duration> {
        self.started.map(|started| started.elapsed())
    }

    pub fn results(&self) -> Option<&Document> {
        self.results.as_ref()
    }
}

/// Perform the network call for `submission` and render its response.
pub async fn execute<B: Backend>(backend: &B, submission: &Submission) -> Outcome {
    let rendered = match submission {
        Submission::Query(request) => backend
            .query_stock(request)
            .await
            .map(|response| render::stock::report(&response)),
        Submission::Portfolio(request) => backend
            .analyze_portfolio(request)
            .await
            .map(|response| render::portfolio::report(&response)),
    };

    match rendered {
        Ok(document) => Outcome::Success(document),
        Err(e) => Outcome::Failure(e.to_string()),
    }
}
