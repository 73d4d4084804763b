//! Read-only views in human-scale units.

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use soroban_sdk::Address;
use tracing::warn;

use crate::amount;
use crate::engine::DividendEngine;
use crate::error::{DividendError, Result};
use crate::ledger::{Denomination, DividendLedger, DividendRecord};
use crate::lifecycle::DividendState;

fn address_text<S: Serializer>(
    address: &Address,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(&format_args!("{address:?}"))
}

fn denomination_text<S: Serializer>(
    denomination: &Denomination,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match denomination {
        Denomination::Native => serializer.serialize_str("native"),
        Denomination::Token(token) => serializer.collect_str(&format_args!("{token:?}")),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DividendSummary {
    pub index: u32,
    pub name: String,
    pub checkpoint_id: u32,
    pub state: DividendState,
    pub created: u64,
    pub maturity: u64,
    pub expiry: u64,
    #[serde(serialize_with = "denomination_text")]
    pub denomination: Denomination,
    pub decimals: u32,
    pub amount: Decimal,
    pub claimed_amount: Decimal,
    /// `amount - claimed_amount`, or zero once reclaimed.
    pub unclaimed: Decimal,
    /// Eligible supply in share units.
    pub total_supply: i128,
    pub reclaimed: bool,
    pub total_withheld: Decimal,
    pub total_withheld_withdrawn: Decimal,
}

/// Payment status of one holder for one dividend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressRow {
    #[serde(serialize_with = "address_text")]
    pub investor: Address,
    pub claimed: bool,
    pub excluded: bool,
    pub gross: Decimal,
    pub withheld: Decimal,
    pub net: Decimal,
    /// Share balance at the dividend's checkpoint.
    pub balance: i128,
}

/// Holder balance and withholding rate at a checkpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingRow {
    #[serde(serialize_with = "address_text")]
    pub investor: Address,
    pub balance: i128,
    /// Percentage.
    pub withholding: Decimal,
}

/// Claim facts for one (investor, dividend) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClaimRecord {
    pub is_claimed: bool,
    pub is_excluded: bool,
}

impl<L: DividendLedger> DividendEngine<L> {
    async fn summarize(&self, record: DividendRecord, now: u64) -> Result<DividendSummary> {
        let decimals = self.resolve_decimals(&record.denomination).await?;
        let unclaimed = if record.reclaimed {
            0
        } else {
            record.amount - record.claimed_amount
        };
        Ok(DividendSummary {
            index: record.index,
            state: DividendState::of(&record, now),
            checkpoint_id: record.checkpoint_id,
            created: record.created,
            maturity: record.maturity,
            expiry: record.expiry,
            decimals,
            amount: Self::human(record.amount, decimals)?,
            claimed_amount: Self::human(record.claimed_amount, decimals)?,
            unclaimed: Self::human(unclaimed, decimals)?,
            total_supply: record.total_supply,
            reclaimed: record.reclaimed,
            total_withheld: Self::human(record.total_withheld, decimals)?,
            total_withheld_withdrawn: Self::human(record.total_withheld_withdrawn, decimals)?,
            name: record.name,
            denomination: record.denomination,
        })
    }

    pub async fn dividend_summary(&self, index: u32) -> Result<DividendSummary> {
        let record = self.get_record(index).await?;
        let now = self.ledger.ledger_time().await?;
        self.summarize(record, now).await
    }

    /// Every dividend in creation order.
    pub async fn dividend_summaries(&self) -> Result<Vec<DividendSummary>> {
        let now = self.ledger.ledger_time().await?;
        let mut summaries = Vec::new();
        for record in self.ledger.dividends().await? {
            summaries.push(self.summarize(record, now).await?);
        }
        Ok(summaries)
    }

    /// One row per holder of the dividend's share registry.
    pub async fn dividend_progress(&self, index: u32) -> Result<Vec<ProgressRow>> {
        let record = self.get_record(index).await?;
        let decimals = self.resolve_decimals(&record.denomination).await?;
        self.ledger
            .dividend_progress(index)
            .await?
            .into_iter()
            .map(|row| -> Result<ProgressRow> {
                Ok(ProgressRow {
                    gross: Self::human(row.claim, decimals)?,
                    withheld: Self::human(row.withheld, decimals)?,
                    net: Self::human(row.claim - row.withheld, decimals)?,
                    investor: row.investor,
                    claimed: row.claimed,
                    excluded: row.excluded,
                    balance: row.balance,
                })
            })
            .collect()
    }

    pub async fn checkpoint_data(&self, checkpoint_id: u32) -> Result<Vec<HoldingRow>> {
        let current = self.ledger.current_checkpoint_id().await?;
        if checkpoint_id > current {
            warn!(checkpoint_id, current, "checkpoint does not exist");
            return Err(DividendError::InvalidCheckpoint(checkpoint_id));
        }
        self.ledger
            .checkpoint_data(checkpoint_id)
            .await?
            .into_iter()
            .map(|row| -> Result<HoldingRow> {
                Ok(HoldingRow {
                    withholding: amount::raw_to_percent(row.withholding)?,
                    investor: row.investor,
                    balance: row.balance,
                })
            })
            .collect()
    }

    /// Indices of dividends created on `checkpoint_id`.
    pub async fn dividend_indices(&self, checkpoint_id: u32) -> Result<Vec<u32>> {
        Ok(self.ledger.dividend_index(checkpoint_id).await?)
    }

    pub async fn excluded(&self, index: u32) -> Result<Vec<Address>> {
        self.get_record(index).await?;
        Ok(self.ledger.excluded(index).await?)
    }

    /// Account receiving reclaimed residuals and withdrawn withholding.
    pub async fn wallet(&self) -> Result<Address> {
        Ok(self.ledger.wallet().await?)
    }

    pub async fn default_excluded(&self) -> Result<Vec<Address>> {
        Ok(self.ledger.default_excluded().await?)
    }

    pub async fn claim_record(&self, investor: &Address, index: u32) -> Result<ClaimRecord> {
        self.get_record(index).await?;
        Ok(ClaimRecord {
            is_claimed: self.ledger.is_claimed(investor, index).await?,
            is_excluded: self.ledger.is_excluded(investor, index).await?,
        })
    }
}
