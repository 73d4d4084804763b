//! Pull (investor) and push (issuer) payments.

use rust_decimal::Decimal;
use soroban_sdk::Address;
use tracing::{info, warn};

use crate::engine::DividendEngine;
use crate::error::{DividendError, Result};
use crate::ledger::{DividendLedger, Permission};

impl<L: DividendLedger> DividendEngine<L> {
    async fn require_not_paused(&self) -> Result<()> {
        if self.ledger.paused().await? {
            warn!("payment attempted while paused");
            return Err(DividendError::ContractPaused);
        }
        Ok(())
    }

    /// Claim the caller's own entitlement. Returns the net amount paid.
    pub async fn pull_dividend_payment(&self, index: u32) -> Result<Decimal> {
        self.require_not_paused().await?;
        let record = self.check_valid_dividend(index).await?;

        if self.ledger.is_claimed(&self.caller, index).await? {
            warn!(index, "dividend already claimed by caller");
            return Err(DividendError::AlreadyClaimed(format!(
                "dividend {index} already paid to caller"
            )));
        }
        if self.ledger.is_excluded(&self.caller, index).await? {
            warn!(index, "caller excluded");
            return Err(DividendError::AddressExcluded(index));
        }

        let decimals = self.resolve_decimals(&record.denomination).await?;
        let paid = self
            .ledger
            .pull_dividend_payment(&self.caller, index)
            .await?;
        info!(index, paid, "dividend pulled");
        Self::human(paid, decimals)
    }

    /// Pay up to `iterations` holders starting at position `start`. Operator.
    /// Returns how many holders were paid.
    pub async fn push_dividend_payment(
        &self,
        index: u32,
        start: u32,
        iterations: u32,
    ) -> Result<u32> {
        self.require_permission(&[Permission::Operator]).await?;
        self.require_not_paused().await?;
        self.check_valid_dividend(index).await?;
        if iterations == 0 || iterations > self.config.max_push_iterations {
            return Err(DividendError::InvalidData(format!(
                "iterations must be between 1 and {}",
                self.config.max_push_iterations
            )));
        }

        let paid = self
            .ledger
            .push_dividend_payment(&self.caller, index, start, iterations)
            .await?;
        info!(index, start, iterations, paid, "dividend pushed to holder range");
        Ok(paid)
    }

    /// Pay the listed payees. Operator. Returns how many were paid.
    pub async fn push_dividend_payment_to_addresses(
        &self,
        index: u32,
        payees: &[Address],
    ) -> Result<u32> {
        self.require_permission(&[Permission::Operator]).await?;
        self.require_not_paused().await?;
        self.check_valid_dividend(index).await?;
        if payees.is_empty() {
            return Err(DividendError::InvalidData("no payees given".to_string()));
        }
        for payee in payees {
            Self::require_non_zero(payee, "payee")?;
        }

        let paid = self
            .ledger
            .push_payment_to_addresses(&self.caller, index, payees)
            .await?;
        info!(index, payees = payees.len(), paid, "dividend pushed to addresses");
        Ok(paid)
    }
}
