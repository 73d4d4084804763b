//! Decimal context of a dividend's denomination.

use rust_decimal::Decimal;
use tracing::debug;

use crate::amount;
use crate::engine::DividendEngine;
use crate::error::Result;
use crate::ledger::{Denomination, DividendLedger};

/// Fixed precision of native-currency dividends.
pub const NATIVE_DECIMALS: u32 = 18;

impl<L: DividendLedger> DividendEngine<L> {
    /// Precision for `denomination`. Token precision is read on every call.
    pub async fn resolve_decimals(&self, denomination: &Denomination) -> Result<u32> {
        match denomination {
            Denomination::Native => Ok(NATIVE_DECIMALS),
            Denomination::Token(token) => {
                let decimals = self.ledger.token_decimals(token).await?;
                debug!(decimals, "token precision resolved");
                Ok(decimals)
            }
        }
    }

    /// Precision for the dividend at `index`.
    pub async fn dividend_decimals(&self, index: u32) -> Result<u32> {
        let record = self.get_record(index).await?;
        self.resolve_decimals(&record.denomination).await
    }

    pub(crate) fn human(raw: i128, decimals: u32) -> Result<Decimal> {
        amount::from_raw(raw, decimals)
    }
}
