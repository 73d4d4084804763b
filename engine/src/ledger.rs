//! Capability interface of the dividend checkpoint ledger.
//!
//! The accounting core depends only on [`DividendLedger`]. Each ledger
//! version ships its own adapter; [`crate::SorobanLedger`] drives the
//! `dividend-checkpoint` contract.
//!
//! Reads are side-effect free. Writes are separate calls whose outcome the
//! ledger alone decides; a rejection surfaces as a [`LedgerError`].

use async_trait::async_trait;
use soroban_sdk::Address;

use crate::error::LedgerError;

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

/// What a dividend pays out in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denomination {
    /// The ledger's native asset, with a fixed decimal context.
    Native,
    /// A token contract with its own declared precision.
    Token(Address),
}

/// Delegated roles. The owner holds all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Admin,
    Operator,
}

/// Ledger-side dividend record in raw units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DividendRecord {
    pub index: u32,
    pub checkpoint_id: u32,
    pub created: u64,
    pub maturity: u64,
    pub expiry: u64,
    pub amount: i128,
    pub claimed_amount: i128,
    /// Eligible supply recorded at creation (post-exclusion).
    pub total_supply: i128,
    pub reclaimed: bool,
    pub total_withheld: i128,
    pub total_withheld_withdrawn: i128,
    pub name: String,
    pub denomination: Denomination,
}

/// Ledger-side payment status of one holder for one dividend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvestorProgress {
    pub investor: Address,
    pub claimed: bool,
    pub excluded: bool,
    pub withheld: i128,
    pub claim: i128,
    pub balance: i128,
}

/// Holder balance and raw withholding rate at a checkpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointHolding {
    pub investor: Address,
    pub balance: i128,
    pub withholding: i128,
}

/// A validated creation request in raw units.
///
/// `checkpoint_id` and `excluded` select which of the four ledger creation
/// calls is made; `None` lets the ledger take a fresh checkpoint or apply
/// its default exclusions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDividend {
    pub denomination: Denomination,
    pub maturity: u64,
    pub expiry: u64,
    pub amount: i128,
    pub checkpoint_id: Option<u32>,
    pub excluded: Option<Vec<Address>>,
    pub name: String,
}

#[async_trait(?Send)]
pub trait DividendLedger {
    // ── context ──
    async fn ledger_time(&self) -> LedgerResult<u64>;
    /// Address that holds dividend funds and receives token allowances.
    async fn module_address(&self) -> LedgerResult<Address>;
    async fn native_asset(&self) -> LedgerResult<Address>;
    async fn owner(&self) -> LedgerResult<Address>;
    async fn has_permission(&self, who: &Address, permission: Permission) -> LedgerResult<bool>;
    async fn wallet(&self) -> LedgerResult<Address>;
    async fn paused(&self) -> LedgerResult<bool>;

    // ── share registry ──
    async fn total_supply(&self) -> LedgerResult<i128>;
    async fn total_supply_at(&self, checkpoint_id: u32) -> LedgerResult<i128>;
    async fn balance_of(&self, who: &Address) -> LedgerResult<i128>;
    async fn balance_of_at(&self, who: &Address, checkpoint_id: u32) -> LedgerResult<i128>;
    async fn current_checkpoint_id(&self) -> LedgerResult<u32>;

    // ── payment assets ──
    async fn token_decimals(&self, token: &Address) -> LedgerResult<u32>;
    async fn token_balance(&self, token: &Address, who: &Address) -> LedgerResult<i128>;
    async fn token_allowance(
        &self,
        token: &Address,
        from: &Address,
        spender: &Address,
    ) -> LedgerResult<i128>;

    // ── dividend module reads ──
    async fn dividend_count(&self) -> LedgerResult<u32>;
    async fn dividend(&self, index: u32) -> LedgerResult<DividendRecord>;
    async fn dividends(&self) -> LedgerResult<Vec<DividendRecord>>;
    async fn dividend_progress(&self, index: u32) -> LedgerResult<Vec<InvestorProgress>>;
    async fn checkpoint_data(&self, checkpoint_id: u32) -> LedgerResult<Vec<CheckpointHolding>>;
    async fn dividend_index(&self, checkpoint_id: u32) -> LedgerResult<Vec<u32>>;
    async fn excluded(&self, index: u32) -> LedgerResult<Vec<Address>>;
    async fn default_excluded(&self) -> LedgerResult<Vec<Address>>;
    async fn withholding_tax(&self, investor: &Address) -> LedgerResult<i128>;
    async fn is_claimed(&self, investor: &Address, index: u32) -> LedgerResult<bool>;
    async fn is_excluded(&self, investor: &Address, index: u32) -> LedgerResult<bool>;

    // ── writes ──
    async fn create_dividend(&self, caller: &Address, dividend: &NewDividend) -> LedgerResult<u32>;
    async fn create_checkpoint(&self, caller: &Address) -> LedgerResult<u32>;
    async fn set_default_excluded(&self, caller: &Address, excluded: &[Address])
        -> LedgerResult<()>;
    async fn set_withholding(
        &self,
        caller: &Address,
        investors: &[Address],
        rates: &[i128],
    ) -> LedgerResult<()>;
    async fn set_withholding_fixed(
        &self,
        caller: &Address,
        investors: &[Address],
        rate: i128,
    ) -> LedgerResult<()>;
    async fn pull_dividend_payment(&self, caller: &Address, index: u32) -> LedgerResult<i128>;
    async fn push_dividend_payment(
        &self,
        caller: &Address,
        index: u32,
        start: u32,
        iterations: u32,
    ) -> LedgerResult<u32>;
    async fn push_payment_to_addresses(
        &self,
        caller: &Address,
        index: u32,
        payees: &[Address],
    ) -> LedgerResult<u32>;
    async fn reclaim_dividend(&self, caller: &Address, index: u32) -> LedgerResult<i128>;
    async fn withdraw_withholding(&self, caller: &Address, index: u32) -> LedgerResult<i128>;
    async fn update_dividend_dates(
        &self,
        caller: &Address,
        index: u32,
        maturity: u64,
        expiry: u64,
    ) -> LedgerResult<()>;
    async fn change_wallet(&self, caller: &Address, wallet: &Address) -> LedgerResult<()>;
    async fn pause(&self, caller: &Address) -> LedgerResult<()>;
    async fn unpause(&self, caller: &Address) -> LedgerResult<()>;
}
