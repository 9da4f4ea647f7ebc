//! Error types for invoice editing, rendering and history storage

use thiserror::Error;

use crate::model::ItemId;

/// Result type alias for invoice operations
pub type Result<T> = std::result::Result<T, Error>;

/// Why a draft cannot be turned into a document yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationGap {
    MissingClientName,
    NoItems,
}

impl std::fmt::Display for ValidationGap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationGap::MissingClientName => f.write_str("client name is required"),
            ValidationGap::NoItems => f.write_str("at least one line item is required"),
        }
    }
}

/// Errors that can occur while editing or generating an invoice
#[derive(Error, Debug)]
pub enum Error {
    /// The draft is missing data required for generation
    #[error("Invoice is incomplete: {0}")]
    Validation(ValidationGap),

    /// Removing the item would leave the invoice empty
    #[error("An invoice must keep at least one line item")]
    LastItem,

    /// No item with this id exists in the draft
    #[error("No line item with id {0}")]
    ItemNotFound(ItemId),

    /// Rates are currency amounts and cannot be negative
    #[error("Rate must not be negative (got {0})")]
    NegativeRate(rust_decimal::Decimal),

    /// An amount, subtotal or total does not fit in a `Decimal`
    #[error("Amount is too large to calculate")]
    AmountOverflow,

    /// Layout or serialization of the document failed
    #[error("Rendering failed: {0}")]
    Render(#[from] std::io::Error),

    /// Reading or writing the history store failed
    #[error("History store error: {0}")]
    Persistence(String),

    /// The history record carries no document (seeded sample data)
    #[error("Invoice {0} is a sample; its PDF is not available for download")]
    SampleUnavailable(String),
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Persistence(err.to_string())
    }
}
