//! Reclaim of expired residuals, withholding withdrawal and issuer settings.

use rust_decimal::Decimal;
use soroban_sdk::Address;
use tracing::{info, warn};

use crate::engine::DividendEngine;
use crate::error::{DividendError, Result};
use crate::ledger::{DividendLedger, Permission};

impl<L: DividendLedger> DividendEngine<L> {
    /// Send the unclaimed residual of an expired dividend to the wallet.
    /// Issuer or Operator. Returns the amount reclaimed.
    pub async fn reclaim_dividend(&self, index: u32) -> Result<Decimal> {
        self.require_permission(&[Permission::Operator]).await?;
        let record = self.get_record(index).await?;
        let now = self.ledger.ledger_time().await?;
        if let Err(err) = Self::ensure_reclaimable(&record, now) {
            warn!(index, %err, "reclaim rejected");
            return Err(err);
        }

        let decimals = self.resolve_decimals(&record.denomination).await?;
        let reclaimed = self.ledger.reclaim_dividend(&self.caller, index).await?;
        info!(index, reclaimed, "dividend reclaimed");
        Self::human(reclaimed, decimals)
    }

    /// Send withheld tax not yet withdrawn to the wallet. Operator.
    pub async fn withdraw_withholding(&self, index: u32) -> Result<Decimal> {
        self.require_permission(&[Permission::Operator]).await?;
        let record = self.get_record(index).await?;

        let decimals = self.resolve_decimals(&record.denomination).await?;
        let withdrawn = self
            .ledger
            .withdraw_withholding(&self.caller, index)
            .await?;
        info!(index, withdrawn, "withholding withdrawn");
        Self::human(withdrawn, decimals)
    }

    /// Move a dividend's maturity/expiry window. Issuer only.
    ///
    /// Moving maturity forward re-freezes claims and moving expiry back ends
    /// them; both are allowed.
    pub async fn update_dividend_dates(
        &self,
        index: u32,
        maturity: u64,
        expiry: u64,
    ) -> Result<()> {
        self.require_owner().await?;
        let record = self.get_record(index).await?;
        if record.reclaimed {
            return Err(DividendError::AlreadyClaimed(
                "dividend has been reclaimed".to_string(),
            ));
        }
        if expiry <= maturity {
            return Err(DividendError::TooLate(
                "expiry must be after maturity".to_string(),
            ));
        }

        self.ledger
            .update_dividend_dates(&self.caller, index, maturity, expiry)
            .await?;
        info!(index, maturity, expiry, "dividend dates updated");
        Ok(())
    }

    /// Change where reclaimed and withheld funds go. Issuer only.
    pub async fn change_wallet(&self, wallet: &Address) -> Result<()> {
        self.require_owner().await?;
        Self::require_non_zero(wallet, "wallet")?;
        self.ledger.change_wallet(&self.caller, wallet).await?;
        info!("wallet changed");
        Ok(())
    }
}
