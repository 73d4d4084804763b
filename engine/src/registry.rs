//! Dividend index bounds and record lookup.

use tracing::{debug, warn};

use crate::engine::DividendEngine;
use crate::error::{DividendError, Result};
use crate::ledger::{DividendLedger, DividendRecord};

impl<L: DividendLedger> DividendEngine<L> {
    /// True iff `index` refers to an existing dividend.
    pub async fn is_valid_index(&self, index: u32) -> Result<bool> {
        Ok(index < self.ledger.dividend_count().await?)
    }

    /// Stored record for `index`, or `InvalidDividend`.
    pub async fn get_record(&self, index: u32) -> Result<DividendRecord> {
        if !self.is_valid_index(index).await? {
            warn!(index, "unknown dividend");
            return Err(DividendError::InvalidDividend(index));
        }
        let record = self.ledger.dividend(index).await?;
        debug!(index, checkpoint = record.checkpoint_id, "dividend loaded");
        Ok(record)
    }
}
