//! [`DividendLedger`] adapter for the `dividend-checkpoint` Soroban contract.

use std::fmt::Debug;

use async_trait::async_trait;
use dividend_checkpoint::{
    CheckpointHolding as LedgerHolding, Dividend, DividendCheckpointClient, DividendKind,
    DividendProgress, Permission as LedgerPermission,
};
use soroban_sdk::{token, Address, Env, String as SorobanString, Vec as SorobanVec};
use tracing::debug;

use crate::error::LedgerError;
use crate::ledger::{
    CheckpointHolding, Denomination, DividendLedger, DividendRecord, InvestorProgress,
    LedgerResult, NewDividend, Permission,
};

/// Drives a deployed `dividend-checkpoint` contract through its generated client.
#[derive(Clone)]
pub struct SorobanLedger {
    env: Env,
    contract: Address,
}

impl SorobanLedger {
    pub fn new(env: Env, contract: Address) -> Self {
        Self { env, contract }
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn contract(&self) -> &Address {
        &self.contract
    }

    fn client(&self) -> DividendCheckpointClient<'_> {
        DividendCheckpointClient::new(&self.env, &self.contract)
    }

    fn token(&self, token: &Address) -> token::Client<'_> {
        token::Client::new(&self.env, token)
    }

    fn addresses(&self, items: &[Address]) -> SorobanVec<Address> {
        SorobanVec::from_slice(&self.env, items)
    }
}

/// Flatten a `try_` client result into a ledger result.
fn settle<T, C, E, I>(result: Result<Result<T, C>, Result<E, I>>) -> LedgerResult<T>
where
    C: Debug,
    E: Into<LedgerError>,
    I: Debug,
{
    match result {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(LedgerError::Conversion(format!("{err:?}"))),
        Err(Ok(err)) => Err(err.into()),
        Err(Err(err)) => Err(LedgerError::Host(format!("{err:?}"))),
    }
}

fn to_std_string(value: &SorobanString) -> String {
    let mut buf = vec![0u8; value.len() as usize];
    value.copy_into_slice(&mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

fn to_record(index: u32, dividend: Dividend) -> DividendRecord {
    DividendRecord {
        index,
        checkpoint_id: dividend.checkpoint_id,
        created: dividend.created,
        maturity: dividend.maturity,
        expiry: dividend.expiry,
        amount: dividend.amount,
        claimed_amount: dividend.claimed_amount,
        total_supply: dividend.total_supply,
        reclaimed: dividend.reclaimed,
        total_withheld: dividend.total_withheld,
        total_withheld_withdrawn: dividend.total_withheld_withdrawn,
        name: to_std_string(&dividend.name),
        denomination: match dividend.kind {
            DividendKind::Native => Denomination::Native,
            DividendKind::Token(token) => Denomination::Token(token),
        },
    }
}

fn to_progress(row: DividendProgress) -> InvestorProgress {
    InvestorProgress {
        investor: row.investor,
        claimed: row.claimed,
        excluded: row.excluded,
        withheld: row.withheld,
        claim: row.claim,
        balance: row.balance,
    }
}

fn to_holding(row: LedgerHolding) -> CheckpointHolding {
    CheckpointHolding {
        investor: row.investor,
        balance: row.balance,
        withholding: row.withholding,
    }
}

fn ledger_permission(permission: Permission) -> LedgerPermission {
    match permission {
        Permission::Admin => LedgerPermission::Admin,
        Permission::Operator => LedgerPermission::Operator,
    }
}

#[async_trait(?Send)]
impl DividendLedger for SorobanLedger {
    async fn ledger_time(&self) -> LedgerResult<u64> {
        Ok(self.env.ledger().timestamp())
    }

    async fn module_address(&self) -> LedgerResult<Address> {
        Ok(self.contract.clone())
    }

    async fn native_asset(&self) -> LedgerResult<Address> {
        settle(self.client().try_native_asset())
    }

    async fn owner(&self) -> LedgerResult<Address> {
        settle(self.client().try_owner())
    }

    async fn has_permission(&self, who: &Address, permission: Permission) -> LedgerResult<bool> {
        settle(
            self.client()
                .try_has_permission(who, &ledger_permission(permission)),
        )
    }

    async fn wallet(&self) -> LedgerResult<Address> {
        settle(self.client().try_wallet())
    }

    async fn paused(&self) -> LedgerResult<bool> {
        settle(self.client().try_paused())
    }

    async fn total_supply(&self) -> LedgerResult<i128> {
        settle(self.client().try_total_supply())
    }

    async fn total_supply_at(&self, checkpoint_id: u32) -> LedgerResult<i128> {
        settle(self.client().try_total_supply_at(&checkpoint_id))
    }

    async fn balance_of(&self, who: &Address) -> LedgerResult<i128> {
        settle(self.client().try_balance(who))
    }

    async fn balance_of_at(&self, who: &Address, checkpoint_id: u32) -> LedgerResult<i128> {
        settle(self.client().try_balance_at(who, &checkpoint_id))
    }

    async fn current_checkpoint_id(&self) -> LedgerResult<u32> {
        settle(self.client().try_current_checkpoint_id())
    }

    async fn token_decimals(&self, token: &Address) -> LedgerResult<u32> {
        settle(self.token(token).try_decimals())
    }

    async fn token_balance(&self, token: &Address, who: &Address) -> LedgerResult<i128> {
        settle(self.token(token).try_balance(who))
    }

    async fn token_allowance(
        &self,
        token: &Address,
        from: &Address,
        spender: &Address,
    ) -> LedgerResult<i128> {
        settle(self.token(token).try_allowance(from, spender))
    }

    async fn dividend_count(&self) -> LedgerResult<u32> {
        settle(self.client().try_dividend_count())
    }

    async fn dividend(&self, index: u32) -> LedgerResult<DividendRecord> {
        settle(self.client().try_dividend(&index)).map(|dividend| to_record(index, dividend))
    }

    async fn dividends(&self) -> LedgerResult<Vec<DividendRecord>> {
        let all = settle(self.client().try_dividends())?;
        Ok(all
            .iter()
            .enumerate()
            .map(|(index, dividend)| to_record(index as u32, dividend))
            .collect())
    }

    async fn dividend_progress(&self, index: u32) -> LedgerResult<Vec<InvestorProgress>> {
        let rows = settle(self.client().try_dividend_progress(&index))?;
        Ok(rows.iter().map(to_progress).collect())
    }

    async fn checkpoint_data(&self, checkpoint_id: u32) -> LedgerResult<Vec<CheckpointHolding>> {
        let rows = settle(self.client().try_checkpoint_data(&checkpoint_id))?;
        Ok(rows.iter().map(to_holding).collect())
    }

    async fn dividend_index(&self, checkpoint_id: u32) -> LedgerResult<Vec<u32>> {
        let indices = settle(self.client().try_dividend_index(&checkpoint_id))?;
        Ok(indices.iter().collect())
    }

    async fn excluded(&self, index: u32) -> LedgerResult<Vec<Address>> {
        let list = settle(self.client().try_excluded(&index))?;
        Ok(list.iter().collect())
    }

    async fn default_excluded(&self) -> LedgerResult<Vec<Address>> {
        let list = settle(self.client().try_default_excluded())?;
        Ok(list.iter().collect())
    }

    async fn withholding_tax(&self, investor: &Address) -> LedgerResult<i128> {
        settle(self.client().try_withholding_tax(investor))
    }

    async fn is_claimed(&self, investor: &Address, index: u32) -> LedgerResult<bool> {
        settle(self.client().try_is_claimed(investor, &index))
    }

    async fn is_excluded(&self, investor: &Address, index: u32) -> LedgerResult<bool> {
        settle(self.client().try_is_excluded(investor, &index))
    }

    async fn create_dividend(&self, caller: &Address, dividend: &NewDividend) -> LedgerResult<u32> {
        let client = self.client();
        let kind = match &dividend.denomination {
            Denomination::Native => DividendKind::Native,
            Denomination::Token(token) => DividendKind::Token(token.clone()),
        };
        let name = SorobanString::from_str(&self.env, &dividend.name);
        debug!(
            checkpoint = ?dividend.checkpoint_id,
            explicit_exclusions = dividend.excluded.is_some(),
            "submitting dividend creation"
        );

        match (dividend.checkpoint_id, &dividend.excluded) {
            (None, None) => settle(client.try_create_dividend(
                caller,
                &kind,
                &dividend.maturity,
                &dividend.expiry,
                &dividend.amount,
                &name,
            )),
            (Some(checkpoint_id), None) => settle(client.try_create_with_checkpoint(
                caller,
                &kind,
                &dividend.maturity,
                &dividend.expiry,
                &dividend.amount,
                &checkpoint_id,
                &name,
            )),
            (None, Some(excluded)) => settle(client.try_create_with_exclusions(
                caller,
                &kind,
                &dividend.maturity,
                &dividend.expiry,
                &dividend.amount,
                &self.addresses(excluded),
                &name,
            )),
            (Some(checkpoint_id), Some(excluded)) => {
                settle(client.try_create_with_checkpoint_excl(
                    caller,
                    &kind,
                    &dividend.maturity,
                    &dividend.expiry,
                    &dividend.amount,
                    &checkpoint_id,
                    &self.addresses(excluded),
                    &name,
                ))
            }
        }
    }

    async fn create_checkpoint(&self, caller: &Address) -> LedgerResult<u32> {
        settle(self.client().try_create_checkpoint(caller))
    }

    async fn set_default_excluded(
        &self,
        caller: &Address,
        excluded: &[Address],
    ) -> LedgerResult<()> {
        settle(
            self.client()
                .try_set_default_excluded(caller, &self.addresses(excluded)),
        )
    }

    async fn set_withholding(
        &self,
        caller: &Address,
        investors: &[Address],
        rates: &[i128],
    ) -> LedgerResult<()> {
        let rates = SorobanVec::from_slice(&self.env, rates);
        settle(
            self.client()
                .try_set_withholding(caller, &self.addresses(investors), &rates),
        )
    }

    async fn set_withholding_fixed(
        &self,
        caller: &Address,
        investors: &[Address],
        rate: i128,
    ) -> LedgerResult<()> {
        settle(
            self.client()
                .try_set_withholding_fixed(caller, &self.addresses(investors), &rate),
        )
    }

    async fn pull_dividend_payment(&self, caller: &Address, index: u32) -> LedgerResult<i128> {
        settle(self.client().try_pull_dividend_payment(caller, &index))
    }

    async fn push_dividend_payment(
        &self,
        caller: &Address,
        index: u32,
        start: u32,
        iterations: u32,
    ) -> LedgerResult<u32> {
        settle(
            self.client()
                .try_push_dividend_payment(caller, &index, &start, &iterations),
        )
    }

    async fn push_payment_to_addresses(
        &self,
        caller: &Address,
        index: u32,
        payees: &[Address],
    ) -> LedgerResult<u32> {
        settle(
            self.client()
                .try_push_payment_to_addresses(caller, &index, &self.addresses(payees)),
        )
    }

    async fn reclaim_dividend(&self, caller: &Address, index: u32) -> LedgerResult<i128> {
        settle(self.client().try_reclaim_dividend(caller, &index))
    }

    async fn withdraw_withholding(&self, caller: &Address, index: u32) -> LedgerResult<i128> {
        settle(self.client().try_withdraw_withholding(caller, &index))
    }

    async fn update_dividend_dates(
        &self,
        caller: &Address,
        index: u32,
        maturity: u64,
        expiry: u64,
    ) -> LedgerResult<()> {
        settle(
            self.client()
                .try_update_dividend_dates(caller, &index, &maturity, &expiry),
        )
    }

    async fn change_wallet(&self, caller: &Address, wallet: &Address) -> LedgerResult<()> {
        settle(self.client().try_change_wallet(caller, wallet))
    }

    async fn pause(&self, caller: &Address) -> LedgerResult<()> {
        settle(self.client().try_pause(caller))
    }

    async fn unpause(&self, caller: &Address) -> LedgerResult<()> {
        settle(self.client().try_unpause(caller))
    }
}
