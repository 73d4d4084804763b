//! The dividend engine: pre-validates every dividend operation against the
//! ledger's current state before submitting it.
//!
//! Each submitted write is a separate call from the reads that validated it,
//! so validation is optimistic. The ledger re-checks and its rejection is
//! returned unchanged as [`DividendError::Ledger`].
//!
//! Operations are spread over sibling modules by concern:
//! creation (`validation`), lifecycle, withholding, claims, reclaim, views.

use soroban_sdk::{Address, String as SorobanString};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{DividendError, Result};
use crate::ledger::{DividendLedger, Permission};

/// Accounting and validation front for one acting account.
pub struct DividendEngine<L: DividendLedger> {
    pub(crate) ledger: L,
    pub(crate) caller: Address,
    pub(crate) config: EngineConfig,
}

impl<L: DividendLedger> DividendEngine<L> {
    pub fn new(ledger: L, caller: Address, config: EngineConfig) -> Self {
        Self {
            ledger,
            caller,
            config,
        }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn caller(&self) -> &Address {
        &self.caller
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Same ledger and config, acting as `caller`.
    pub fn acting_as(&self, caller: Address) -> Self
    where
        L: Clone,
    {
        Self::new(self.ledger.clone(), caller, self.config.clone())
    }

    // ── authorization ──

    pub(crate) async fn require_owner(&self) -> Result<()> {
        let owner = self.ledger.owner().await?;
        if owner != self.caller {
            warn!("caller is not the issuer");
            return Err(DividendError::Unauthorized(
                "only the issuer may do this".to_string(),
            ));
        }
        Ok(())
    }

    /// Owner, or a delegate holding any of `permissions`.
    pub(crate) async fn require_permission(&self, permissions: &[Permission]) -> Result<()> {
        if self.ledger.owner().await? == self.caller {
            return Ok(());
        }
        for permission in permissions {
            if self.ledger.has_permission(&self.caller, *permission).await? {
                debug!(?permission, "delegate permission present");
                return Ok(());
            }
        }
        warn!(?permissions, "caller lacks permission");
        Err(DividendError::Unauthorized(format!(
            "requires one of {permissions:?}"
        )))
    }

    // ── address checks ──

    pub(crate) fn is_zero_address(address: &Address) -> bool {
        let zero = Address::from_string(&SorobanString::from_str(
            address.env(),
            dividend_checkpoint::ZERO_ACCOUNT,
        ));
        *address == zero
    }

    pub(crate) fn require_non_zero(address: &Address, what: &str) -> Result<()> {
        if Self::is_zero_address(address) {
            warn!(what, "zero address rejected");
            return Err(DividendError::InvalidData(format!(
                "{what} is the zero address"
            )));
        }
        Ok(())
    }

    // ── module configuration ──

    /// Pause claim-affecting operations. Issuer only.
    pub async fn pause(&self) -> Result<()> {
        self.require_owner().await?;
        if self.ledger.paused().await? {
            return Err(DividendError::PreconditionRequired(
                "module is already paused".to_string(),
            ));
        }
        self.ledger.pause(&self.caller).await?;
        info!("module paused");
        Ok(())
    }

    /// Resume claim-affecting operations. Issuer only.
    pub async fn unpause(&self) -> Result<()> {
        self.require_owner().await?;
        if !self.ledger.paused().await? {
            return Err(DividendError::PreconditionRequired(
                "module is not paused".to_string(),
            ));
        }
        self.ledger.unpause(&self.caller).await?;
        info!("module unpaused");
        Ok(())
    }

    /// Snapshot all balances. Issuer or Admin. Returns the new checkpoint id.
    pub async fn create_checkpoint(&self) -> Result<u32> {
        self.require_permission(&[Permission::Admin]).await?;
        let id = self.ledger.create_checkpoint(&self.caller).await?;
        info!(checkpoint = id, "checkpoint created");
        Ok(id)
    }

    /// Replace the default exclusion list. Admin.
    pub async fn set_default_excluded(&self, excluded: &[Address]) -> Result<()> {
        self.require_permission(&[Permission::Admin]).await?;
        self.check_exclusions(excluded)?;
        self.ledger
            .set_default_excluded(&self.caller, excluded)
            .await?;
        info!(count = excluded.len(), "default exclusions replaced");
        Ok(())
    }
}
