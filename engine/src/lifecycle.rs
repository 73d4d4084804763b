//! Dividend lifecycle.
//!
//! Created -> Claimable -> Expired follows from the ledger clock and the
//! stored maturity/expiry; no call moves a dividend between them.
//! Reclaimed is terminal and set only by `reclaim_dividend`.
//! The module pause flag is independent of this state.

use serde::Serialize;
use tracing::{debug, warn};

use crate::engine::DividendEngine;
use crate::error::{DividendError, Result};
use crate::ledger::{DividendLedger, DividendRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DividendState {
    /// Before maturity.
    Created,
    /// `maturity <= now < expiry`
    Claimable,
    /// `now >= expiry`, residual not yet reclaimed.
    Expired,
    Reclaimed,
}

impl DividendState {
    pub fn of(record: &DividendRecord, now: u64) -> Self {
        if record.reclaimed {
            DividendState::Reclaimed
        } else if now >= record.expiry {
            DividendState::Expired
        } else if now >= record.maturity {
            DividendState::Claimable
        } else {
            DividendState::Created
        }
    }
}

impl<L: DividendLedger> DividendEngine<L> {
    pub async fn dividend_state(&self, index: u32) -> Result<DividendState> {
        let record = self.get_record(index).await?;
        let now = self.ledger.ledger_time().await?;
        Ok(DividendState::of(&record, now))
    }

    /// Shared precondition of payments: the dividend exists, has not been
    /// reclaimed, has matured and has not expired.
    pub async fn check_valid_dividend(&self, index: u32) -> Result<DividendRecord> {
        let record = self.get_record(index).await?;
        let now = self.ledger.ledger_time().await?;

        if record.reclaimed {
            warn!(index, "dividend already reclaimed");
            return Err(DividendError::AlreadyClaimed(
                "dividend has been reclaimed".to_string(),
            ));
        }
        if self.config.reject_partially_claimed && record.claimed_amount > 0 {
            warn!(index, claimed = record.claimed_amount, "dividend partially claimed");
            return Err(DividendError::AlreadyClaimed(
                "dividend has already paid out".to_string(),
            ));
        }
        if now < record.maturity {
            return Err(DividendError::TooEarly(format!(
                "dividend {index} matures at {}",
                record.maturity
            )));
        }
        if now >= record.expiry {
            return Err(DividendError::TooLate(format!(
                "dividend {index} expired at {}",
                record.expiry
            )));
        }
        debug!(index, "dividend claimable");
        Ok(record)
    }

    /// Reclaim precondition: not yet reclaimed and expiry has passed.
    pub(crate) fn ensure_reclaimable(record: &DividendRecord, now: u64) -> Result<()> {
        if record.reclaimed {
            return Err(DividendError::AlreadyClaimed(
                "dividend has already been reclaimed".to_string(),
            ));
        }
        if now < record.expiry {
            return Err(DividendError::AlreadyClaimed(
                "dividend expiry is in the future".to_string(),
            ));
        }
        Ok(())
    }
}
