//! Dividend checkpoint accounting and validation engine.
//!
//! Sits in front of the `dividend-checkpoint` ledger and decides, before any
//! write reaches it, whether a dividend is well formed, who may claim, what
//! each investor is owed after withholding, and when residuals may be
//! reclaimed. All state lives in the ledger; the engine only reads it and
//! submits writes through [`DividendLedger`].

pub mod amount;
pub mod config;
pub mod decimals;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod lifecycle;
pub mod soroban;
pub mod supply;
pub mod validation;
pub mod views;

mod claims;
mod reclaim;
mod registry;
mod withholding;

pub use config::EngineConfig;
pub use decimals::NATIVE_DECIMALS;
pub use engine::DividendEngine;
pub use error::{DividendError, LedgerError, Result};
pub use ledger::{
    CheckpointHolding, Denomination, DividendLedger, DividendRecord, InvestorProgress,
    NewDividend, Permission,
};
pub use lifecycle::DividendState;
pub use soroban::SorobanLedger;
pub use supply::SupplyBreakdown;
pub use validation::{CreateDividendRequest, CreationPlan};
pub use views::{ClaimRecord, DividendSummary, HoldingRow, ProgressRow};
pub use withholding::ClaimSplit;
