//! Creation pre-checks and the four creation entry points.
//!
//! Validation only reads. Every check runs before the single creation write.

use rust_decimal::Decimal;
use soroban_sdk::Address;
use tracing::{debug, info, warn};

use crate::amount;
use crate::engine::DividendEngine;
use crate::error::{DividendError, Result};
use crate::ledger::{Denomination, DividendLedger, NewDividend, Permission};
use crate::supply::SupplyBreakdown;

/// A dividend creation request in human-scale units.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateDividendRequest {
    pub denomination: Denomination,
    pub maturity: u64,
    pub expiry: u64,
    pub amount: Decimal,
    pub name: String,
    /// Existing checkpoint; `None` takes a fresh one.
    pub checkpoint_id: Option<u32>,
    /// Explicit exclusions; `None` applies the default list.
    pub excluded: Option<Vec<Address>>,
}

impl CreateDividendRequest {
    pub fn new(
        denomination: Denomination,
        maturity: u64,
        expiry: u64,
        amount: Decimal,
        name: impl Into<String>,
    ) -> Self {
        Self {
            denomination,
            maturity,
            expiry,
            amount,
            name: name.into(),
            checkpoint_id: None,
            excluded: None,
        }
    }

    pub fn with_checkpoint(mut self, checkpoint_id: u32) -> Self {
        self.checkpoint_id = Some(checkpoint_id);
        self
    }

    pub fn with_exclusions(mut self, excluded: Vec<Address>) -> Self {
        self.excluded = Some(excluded);
        self
    }
}

/// Outcome of a successful pre-check.
#[derive(Debug, Clone, PartialEq)]
pub struct CreationPlan {
    pub decimals: u32,
    pub raw_amount: i128,
    /// Exclusions that will apply: the explicit list or the default one.
    pub effective_excluded: Vec<Address>,
    pub supply: SupplyBreakdown,
}

impl<L: DividendLedger> DividendEngine<L> {
    /// Exclusion list shape: bounded, no zero address, no duplicates.
    pub(crate) fn check_exclusions(&self, excluded: &[Address]) -> Result<()> {
        if excluded.len() > self.config.max_excluded_addresses {
            warn!(count = excluded.len(), "exclusion list too long");
            return Err(DividendError::InvalidData(
                "too many excluded addresses".to_string(),
            ));
        }
        for (i, address) in excluded.iter().enumerate() {
            Self::require_non_zero(address, "excluded address")?;
            if excluded[..i].contains(address) {
                warn!(position = i, "duplicate excluded address");
                return Err(DividendError::InvalidData(
                    "duplicate excluded address".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Run every creation check for `request` as the current caller.
    pub async fn validate_creation(&self, request: &CreateDividendRequest) -> Result<CreationPlan> {
        let effective_excluded = match &request.excluded {
            Some(list) => list.clone(),
            None => self.ledger.default_excluded().await?,
        };
        self.check_exclusions(&effective_excluded)?;

        if request.expiry <= request.maturity {
            warn!(
                maturity = request.maturity,
                expiry = request.expiry,
                "expiry not after maturity"
            );
            return Err(DividendError::TooLate(
                "expiry must be after maturity".to_string(),
            ));
        }
        let now = self.ledger.ledger_time().await?;
        if request.expiry <= now {
            warn!(expiry = request.expiry, now, "expiry in the past");
            return Err(DividendError::TooLate("expiry is in the past".to_string()));
        }

        if request.amount <= Decimal::ZERO {
            return Err(DividendError::InvalidData(
                "amount must be positive".to_string(),
            ));
        }

        if request.name.is_empty() {
            return Err(DividendError::InvalidData(
                "dividend name is empty".to_string(),
            ));
        }
        if request.name.len() > self.config.max_name_length {
            return Err(DividendError::InvalidData(format!(
                "dividend name exceeds {} bytes",
                self.config.max_name_length
            )));
        }

        if let Some(checkpoint_id) = request.checkpoint_id {
            let current = self.ledger.current_checkpoint_id().await?;
            if checkpoint_id > current {
                warn!(checkpoint_id, current, "checkpoint does not exist");
                return Err(DividendError::InvalidCheckpoint(checkpoint_id));
            }
        }

        let decimals = self.resolve_decimals(&request.denomination).await?;
        let raw_amount = amount::to_raw(request.amount, decimals)?;
        // Payouts, residuals and withholding never exceed the amount, so they
        // convert back as long as the amount does.
        if let Err(err) = amount::from_raw(raw_amount, decimals) {
            warn!(raw_amount, decimals, %err, "amount not representable at this precision");
            return Err(err);
        }
        self.check_funding(&request.denomination, raw_amount, decimals)
            .await?;

        let supply = self
            .eligible_supply(request.checkpoint_id, &effective_excluded)
            .await?;
        if supply.total == 0 {
            return Err(DividendError::InvalidData(
                "checkpoint supply is zero".to_string(),
            ));
        }
        if supply.total <= supply.excluded {
            return Err(DividendError::InvalidData(
                "excluded balances cover the whole supply".to_string(),
            ));
        }

        debug!(decimals, raw_amount, eligible = supply.eligible, "creation validated");
        Ok(CreationPlan {
            decimals,
            raw_amount,
            effective_excluded,
            supply,
        })
    }

    /// Caller must hold `raw_amount`; token dividends also need the allowance
    /// granted to the dividend module.
    async fn check_funding(
        &self,
        denomination: &Denomination,
        raw_amount: i128,
        decimals: u32,
    ) -> Result<()> {
        let (asset, needs_allowance) = match denomination {
            Denomination::Token(token) => (token.clone(), true),
            Denomination::Native => (self.ledger.native_asset().await?, false),
        };

        let balance = self.ledger.token_balance(&asset, &self.caller).await?;
        if balance < raw_amount {
            warn!(balance, raw_amount, "insufficient funds");
            return Err(DividendError::InsufficientBalance {
                have: Self::human(balance, decimals)?,
                need: Self::human(raw_amount, decimals)?,
            });
        }

        if needs_allowance {
            let spender = self.ledger.module_address().await?;
            let allowance = self
                .ledger
                .token_allowance(&asset, &self.caller, &spender)
                .await?;
            if allowance < raw_amount {
                warn!(allowance, raw_amount, "insufficient allowance");
                return Err(DividendError::InsufficientAllowance {
                    have: Self::human(allowance, decimals)?,
                    need: Self::human(raw_amount, decimals)?,
                });
            }
        }
        Ok(())
    }

    async fn submit_creation(&self, request: CreateDividendRequest) -> Result<u32> {
        self.require_permission(&[Permission::Admin, Permission::Operator])
            .await?;
        let plan = self.validate_creation(&request).await?;

        let new_dividend = NewDividend {
            denomination: request.denomination,
            maturity: request.maturity,
            expiry: request.expiry,
            amount: plan.raw_amount,
            checkpoint_id: request.checkpoint_id,
            excluded: request.excluded,
            name: request.name,
        };
        let index = self
            .ledger
            .create_dividend(&self.caller, &new_dividend)
            .await?;
        info!(
            index,
            amount = plan.raw_amount,
            eligible = plan.supply.eligible,
            "dividend created"
        );
        Ok(index)
    }

    /// Create on a fresh checkpoint with the default exclusions.
    pub async fn create_dividend(
        &self,
        denomination: Denomination,
        maturity: u64,
        expiry: u64,
        amount: Decimal,
        name: &str,
    ) -> Result<u32> {
        self.submit_creation(CreateDividendRequest::new(
            denomination,
            maturity,
            expiry,
            amount,
            name,
        ))
        .await
    }

    /// Create on an existing checkpoint with the default exclusions.
    pub async fn create_dividend_with_checkpoint(
        &self,
        denomination: Denomination,
        maturity: u64,
        expiry: u64,
        amount: Decimal,
        checkpoint_id: u32,
        name: &str,
    ) -> Result<u32> {
        self.submit_creation(
            CreateDividendRequest::new(denomination, maturity, expiry, amount, name)
                .with_checkpoint(checkpoint_id),
        )
        .await
    }

    /// Create on a fresh checkpoint with an explicit exclusion list.
    pub async fn create_dividend_with_exclusions(
        &self,
        denomination: Denomination,
        maturity: u64,
        expiry: u64,
        amount: Decimal,
        excluded: Vec<Address>,
        name: &str,
    ) -> Result<u32> {
        self.submit_creation(
            CreateDividendRequest::new(denomination, maturity, expiry, amount, name)
                .with_exclusions(excluded),
        )
        .await
    }

    /// Create on an existing checkpoint with an explicit exclusion list.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_dividend_with_checkpoint_and_exclusions(
        &self,
        denomination: Denomination,
        maturity: u64,
        expiry: u64,
        amount: Decimal,
        checkpoint_id: u32,
        excluded: Vec<Address>,
        name: &str,
    ) -> Result<u32> {
        self.submit_creation(
            CreateDividendRequest::new(denomination, maturity, expiry, amount, name)
                .with_checkpoint(checkpoint_id)
                .with_exclusions(excluded),
        )
        .await
    }
}
