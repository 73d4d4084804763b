//! Withholding tax: per-investor rates and the gross/net split of a claim.
//!
//! Rates are percentages (0 to 100) here and `10^18` fixed point on the ledger.

use rust_decimal::Decimal;
use soroban_sdk::Address;
use tracing::{debug, info, warn};

use crate::amount;
use crate::engine::DividendEngine;
use crate::error::{DividendError, Result};
use crate::ledger::{DividendLedger, DividendRecord, Permission};

/// A claim split into what the investor receives and what is withheld.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimSplit {
    /// Net payout.
    pub claim: Decimal,
    pub withheld: Decimal,
}

impl ClaimSplit {
    pub fn gross(&self) -> Decimal {
        self.claim + self.withheld
    }
}

impl<L: DividendLedger> DividendEngine<L> {
    fn check_investors(investors: &[Address]) -> Result<()> {
        for investor in investors {
            Self::require_non_zero(investor, "investor")?;
        }
        Ok(())
    }

    /// Set a rate per investor. Admin.
    pub async fn set_withholding(&self, investors: &[Address], rates: &[Decimal]) -> Result<()> {
        self.require_permission(&[Permission::Admin]).await?;
        if investors.len() != rates.len() {
            warn!(
                investors = investors.len(),
                rates = rates.len(),
                "withholding inputs differ in length"
            );
            return Err(DividendError::InvalidData(
                "mismatched input lengths".to_string(),
            ));
        }
        Self::check_investors(investors)?;
        let raw_rates = rates
            .iter()
            .map(|rate| amount::percent_to_raw(*rate))
            .collect::<Result<Vec<_>>>()?;

        self.ledger
            .set_withholding(&self.caller, investors, &raw_rates)
            .await?;
        info!(count = investors.len(), "withholding rates set");
        Ok(())
    }

    /// Apply one rate to every listed investor. Admin.
    pub async fn set_withholding_fixed(&self, investors: &[Address], rate: Decimal) -> Result<()> {
        self.require_permission(&[Permission::Admin]).await?;
        Self::check_investors(investors)?;
        let raw_rate = amount::percent_to_raw(rate)?;

        self.ledger
            .set_withholding_fixed(&self.caller, investors, raw_rate)
            .await?;
        info!(count = investors.len(), %rate, "fixed withholding rate set");
        Ok(())
    }

    /// Current withholding rate of `investor` as a percentage.
    pub async fn withholding_tax(&self, investor: &Address) -> Result<Decimal> {
        let raw = self.ledger.withholding_tax(investor).await?;
        amount::raw_to_percent(raw)
    }

    /// Raw (claim, withheld) owed to `investor` from `record`.
    /// Zero for excluded investors. Independent of whether a claim was made.
    pub(crate) async fn raw_entitlement(
        &self,
        record: &DividendRecord,
        investor: &Address,
    ) -> Result<(i128, i128)> {
        if self.ledger.is_excluded(investor, record.index).await? {
            debug!(index = record.index, "investor excluded; entitlement is zero");
            return Ok((0, 0));
        }
        let balance = self
            .ledger
            .balance_of_at(investor, record.checkpoint_id)
            .await?;
        let gross = amount::mul_div(balance, record.amount, record.total_supply)?;
        let rate = self.ledger.withholding_tax(investor).await?;
        amount::split_withholding(gross, rate)
    }

    /// What `investor` receives from the dividend at `index`, after withholding.
    pub async fn calculate_dividend(&self, index: u32, investor: &Address) -> Result<ClaimSplit> {
        let record = self.get_record(index).await?;
        let (claim, withheld) = self.raw_entitlement(&record, investor).await?;
        let decimals = self.resolve_decimals(&record.denomination).await?;
        Ok(ClaimSplit {
            claim: Self::human(claim, decimals)?,
            withheld: Self::human(withheld, decimals)?,
        })
    }
}
