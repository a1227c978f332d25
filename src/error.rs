//! Error types for input validation, the HTTP round-trip, and flow control.

use reqwest::StatusCode;
use thiserror::Error;

/// Input rejected before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter both symbol and quantity")]
    MissingField,
    #[error("Quantity for {symbol} must be a whole number, got '{value}'")]
    InvalidQuantity { symbol: String, value: String },
    #[error("Portfolio is empty, add at least one holding")]
    EmptyPortfolio,
    #[error("Query must not be empty")]
    EmptyQuery,
}

/// Failure of the single network call or of decoding its body.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    #[error("Network error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("Server returned {status}: {detail}")]
    Status { status: StatusCode, detail: String },
    #[error("Invalid response: {0}")]
    Decode(String),
}

/// Misuse of a flow's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("A request is already in progress")]
    Busy,
}
