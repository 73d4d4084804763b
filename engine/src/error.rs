//! Engine errors

use dividend_checkpoint::DividendCheckpointError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Failure talking to the ledger. Carried unchanged; never retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("ledger rejected the call: {0:?}")]
    Rejected(DividendCheckpointError),

    #[error("host failure: {0}")]
    Host(String),

    #[error("could not decode ledger value: {0}")]
    Conversion(String),
}

impl From<DividendCheckpointError> for LedgerError {
    fn from(code: DividendCheckpointError) -> Self {
        LedgerError::Rejected(code)
    }
}

impl From<soroban_sdk::Error> for LedgerError {
    fn from(err: soroban_sdk::Error) -> Self {
        LedgerError::Host(format!("{err:?}"))
    }
}

/// Terminal outcome of a rejected engine operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DividendError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invalid dividend index {0}")]
    InvalidDividend(u32),

    #[error("invalid checkpoint {0}")]
    InvalidCheckpoint(u32),

    #[error("already claimed: {0}")]
    AlreadyClaimed(String),

    #[error("address is excluded from dividend {0}")]
    AddressExcluded(u32),

    #[error("too late: {0}")]
    TooLate(String),

    #[error("too early: {0}")]
    TooEarly(String),

    #[error("insufficient allowance: have {have}, need {need}")]
    InsufficientAllowance { have: Decimal, need: Decimal },

    #[error("insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: Decimal, need: Decimal },

    #[error("precondition required: {0}")]
    PreconditionRequired(String),

    #[error("module is paused")]
    ContractPaused,

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, DividendError>;
