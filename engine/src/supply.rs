//! Eligible supply: total supply minus excluded balances, at a checkpoint or live.

use serde::Serialize;
use soroban_sdk::Address;
use tracing::debug;

use crate::engine::DividendEngine;
use crate::error::{DividendError, Result};
use crate::ledger::DividendLedger;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SupplyBreakdown {
    pub total: i128,
    pub excluded: i128,
    /// `total - excluded`
    pub eligible: i128,
}

impl<L: DividendLedger> DividendEngine<L> {
    /// Supply eligible for a dividend. `checkpoint` of `None` reads live values.
    /// The total and every excluded balance are read at the same point.
    pub async fn eligible_supply(
        &self,
        checkpoint: Option<u32>,
        excluded: &[Address],
    ) -> Result<SupplyBreakdown> {
        let total = match checkpoint {
            Some(id) => self.ledger.total_supply_at(id).await?,
            None => self.ledger.total_supply().await?,
        };

        let mut excluded_sum: i128 = 0;
        for address in excluded {
            let balance = match checkpoint {
                Some(id) => self.ledger.balance_of_at(address, id).await?,
                None => self.ledger.balance_of(address).await?,
            };
            excluded_sum = excluded_sum.checked_add(balance).ok_or_else(|| {
                DividendError::InvalidData("excluded balances overflow".to_string())
            })?;
        }

        debug!(?checkpoint, total, excluded = excluded_sum, "eligible supply");
        Ok(SupplyBreakdown {
            total,
            excluded: excluded_sum,
            eligible: total - excluded_sum,
        })
    }
}
