//! Portfolio input collection.
//!
//! The holdings list is the single source of truth for what gets analyzed;
//! tables in the terminal UI are views derived from it.

use crate::error::ValidationError;
use crate::models::{PortfolioHolding, PortfolioRequest, RiskPreference};

/// The two text fields used to enter a holding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HoldingForm {
    pub symbol: String,
    pub quantity: String,
}

impl HoldingForm {
    pub fn clear(&mut self) {
        self.symbol.clear();
        self.quantity.clear();
    }
}

/// One row of the holdings table, stored as entered (trimmed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoldingRow {
    pub symbol: String,
    pub quantity: String,
}

/// Ordered holdings entered by the user.
#[derive(Debug, Clone, Default)]
pub struct HoldingsList {
    rows: Vec<HoldingRow>,
}

impl HoldingsList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a holding. Both values are trimmed and must be non-empty.
    pub fn add(&mut self, symbol: &str, quantity: &str) -> Result<(), ValidationError> {
        let symbol = symbol.trim();
        let quantity = quantity.trim();

        if symbol.is_empty() || quantity.is_empty() {
            return Err(ValidationError::MissingField);
        }

        self.rows.push(HoldingRow {
            symbol: symbol.to_string(),
            quantity: quantity.to_string(),
        });
        Ok(())
    }

    /// Append the holding typed into `form`, clearing it only if accepted.
    pub fn add_from_form(&mut self, form: &mut HoldingForm) -> Result<(), ValidationError> {
        self.add(&form.symbol, &form.quantity)?;
        form.clear();
        Ok(())
    }

    /// Remove the row at `index`.
    pub fn remove(&mut self, index: usize) -> Option<HoldingRow> {
        (index < self.rows.len()).then(|| self.rows.remove(index))
    }

    pub fn rows(&self) -> &[HoldingRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Parse every row into a holding, in table order.
    pub fn holdings(&self) -> Result<Vec<PortfolioHolding>, ValidationError> {
        self.rows
            .iter()
            .map(|row| {
                let quantity = row.quantity.parse::<i64>().map_err(|_| {
                    ValidationError::InvalidQuantity {
                        symbol: row.symbol.clone(),
                        value: row.quantity.clone(),
                    }
                })?;
                Ok(PortfolioHolding {
                    symbol: row.symbol.clone(),
                    quantity,
                })
            })
            .collect()
    }

    /// Build the analysis request body from the current rows.
    pub fn to_request(&self, risk: RiskPreference) -> Result<PortfolioRequest, ValidationError> {
        if self.rows.is_empty() {
            return Err(ValidationError::EmptyPortfolio);
        }

        Ok(PortfolioRequest {
            portfolio: self.holdings()?,
            risk,
        })
    }
}
