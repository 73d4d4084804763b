#![no_std]
#![deny(unsafe_code)]
#![deny(clippy::dbg_macro, clippy::todo, clippy::unimplemented)]
use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, token, Address, Env,
    String, Symbol, Vec, U256,
};

mod checkpoint;

pub use checkpoint::Checkpointed;

/// Centralized contract error codes. Auth failures are signaled by host panic (require_auth).
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
#[repr(u32)]
pub enum DividendCheckpointError {
    /// Contract is not initialized (owner not set).
    NotInitialized = 1,
    /// `initialize` was already called.
    AlreadyInitialized = 2,
    /// Caller is neither the owner nor holds the required permission.
    NotAuthorized = 3,
    /// Dividend index is out of range.
    InvalidDividend = 4,
    /// Checkpoint id is above the current checkpoint id.
    InvalidCheckpoint = 5,
    /// Exclusion list exceeds EXCLUDED_ADDRESS_LIMIT entries.
    TooManyExcluded = 6,
    /// The all-zero account was supplied where a real address is required.
    ZeroAddress = 7,
    /// An address appears twice in an exclusion list.
    DuplicateAddress = 8,
    /// expiry is not strictly after maturity.
    InvalidDates = 9,
    /// expiry is not in the future.
    ExpiryInPast = 10,
    /// Amount must be positive.
    InvalidAmount = 11,
    /// Dividend name is empty or longer than MAX_NAME_LENGTH bytes.
    InvalidName = 12,
    /// Investor and rate lists differ in length.
    MismatchedLengths = 13,
    /// Withholding rate above WITHHOLDING_PRECISION (100%) or negative.
    InvalidWithholding = 14,
    /// Payee already received this dividend.
    AlreadyClaimed = 15,
    /// Payee is on this dividend's exclusion list.
    AddressExcluded = 16,
    /// Dividend residual was already reclaimed by the issuer.
    DividendReclaimed = 17,
    /// Dividend maturity has not been reached.
    MaturityInFuture = 18,
    /// Dividend expiry has not been reached.
    ExpiryInFuture = 19,
    /// Dividend expiry has passed.
    DividendExpired = 20,
    /// Module is paused; claim-affecting operations are disabled.
    ContractPaused = 21,
    /// pause called while already paused.
    AlreadyPaused = 22,
    /// unpause called while not paused.
    NotPaused = 23,
    /// Holder balance is lower than the transfer amount.
    InsufficientBalance = 24,
    /// Checkpoint supply is zero or fully excluded.
    NoEligibleSupply = 25,
    /// Intermediate value does not fit in i128.
    Overflow = 26,
}

// ── Event symbols ────────────────────────────────────────────
const EVENT_INIT: Symbol = symbol_short!("init");
const EVENT_PERM_GRANT: Symbol = symbol_short!("perm_add");
const EVENT_PERM_REVOKE: Symbol = symbol_short!("perm_rem");
const EVENT_MINT: Symbol = symbol_short!("mint");
const EVENT_TRANSFER: Symbol = symbol_short!("transfer");
const EVENT_CHECKPOINT: Symbol = symbol_short!("chkpt");
const EVENT_DIVIDEND_CREATED: Symbol = symbol_short!("div_new");
const EVENT_DEFAULT_EXCLUDED: Symbol = symbol_short!("def_excl");
const EVENT_WITHHOLDING_SET: Symbol = symbol_short!("wh_set");
const EVENT_PAYMENT: Symbol = symbol_short!("div_pay");
const EVENT_RECLAIMED: Symbol = symbol_short!("reclaim");
const EVENT_WITHHOLDING_WITHDRAWN: Symbol = symbol_short!("wh_wdraw");
const EVENT_DATES_UPDATED: Symbol = symbol_short!("div_date");
const EVENT_WALLET_CHANGED: Symbol = symbol_short!("wallet");
const EVENT_PAUSED: Symbol = symbol_short!("paused");
const EVENT_UNPAUSED: Symbol = symbol_short!("unpaused");

/// Maximum number of addresses in a default or per-dividend exclusion list.
pub const EXCLUDED_ADDRESS_LIMIT: u32 = 150;

/// Maximum dividend name length in bytes.
pub const MAX_NAME_LENGTH: u32 = 32;

/// Fixed-point scale of withholding rates: WITHHOLDING_PRECISION == 100%.
pub const WITHHOLDING_PRECISION: i128 = 1_000_000_000_000_000_000;

/// Strkey of the all-zero ed25519 account, treated as the null address.
pub const ZERO_ACCOUNT: &str = "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF";

// ── Data structures ──────────────────────────────────────────

/// Denomination of a dividend's funds pool.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DividendKind {
    /// Paid in the native asset configured at `initialize`.
    Native,
    /// Paid in the referenced token contract.
    Token(Address),
}

/// Delegated roles. The owner implicitly holds every permission.
#[contracttype]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Permission {
    Admin = 0,
    Operator = 1,
}

/// One distribution event tied to a checkpoint.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Dividend {
    pub checkpoint_id: u32,
    pub created: u64,
    pub maturity: u64,
    pub expiry: u64,
    /// Gross amount deposited for distribution.
    pub amount: i128,
    /// Cumulative gross amount paid out (including withheld tax).
    pub claimed_amount: i128,
    /// Checkpoint supply minus excluded balances.
    pub total_supply: i128,
    pub reclaimed: bool,
    pub total_withheld: i128,
    pub total_withheld_withdrawn: i128,
    pub name: String,
    pub kind: DividendKind,
}

/// Per-holder payment status for one dividend.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DividendProgress {
    pub investor: Address,
    pub claimed: bool,
    pub excluded: bool,
    pub withheld: i128,
    /// Gross entitlement, before withholding.
    pub claim: i128,
    pub balance: i128,
}

/// Holder balance and withholding rate at a checkpoint.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CheckpointHolding {
    pub investor: Address,
    pub balance: i128,
    pub withholding: i128,
}

/// Storage keys. Share registry state uses Balance/TotalSupply with lazily
/// written *History entries per checkpoint; dividends are stored append-only
/// under Dividend(index) with DividendCount as the length.
#[contracttype]
pub enum DataKey {
    /// Issuer address; can do everything.
    Owner,
    /// Destination for reclaimed residuals and withdrawn withholding.
    Wallet,
    /// Asset contract used for `DividendKind::Native` dividends.
    NativeAsset,
    /// Module pause flag; when true, claim-affecting ops are disabled.
    Paused,
    /// Delegated permission grant for (delegate, permission).
    Permission(Address, Permission),
    /// Live share balance of a holder.
    Balance(Address),
    /// Checkpointed share balances of a holder.
    BalanceHistory(Address),
    /// Live share supply.
    TotalSupply,
    /// Checkpointed share supply.
    SupplyHistory,
    /// Every address that ever held shares, in first-receipt order.
    Holders,
    /// Whether an address is already in Holders.
    IsHolder(Address),
    /// Current checkpoint id.
    CheckpointId,
    /// Ledger timestamp at which a checkpoint was created.
    CheckpointTime(u32),
    /// Exclusion list applied when a creation call supplies none.
    DefaultExcluded,
    /// Withholding rate for an investor (WITHHOLDING_PRECISION == 100%).
    Withholding(Address),
    /// Number of dividends created.
    DividendCount,
    /// Dividend record by index.
    Dividend(u32),
    /// Exclusion list a dividend was created with.
    Excluded(u32),
    /// Whether (index, investor) is excluded.
    DividendExcluded(u32, Address),
    /// Whether (index, investor) has been paid.
    Claimed(u32, Address),
}

// ── Contract ─────────────────────────────────────────────────
#[contract]
pub struct DividendCheckpoint;

impl DividendCheckpoint {
    fn owner_of(env: &Env) -> Result<Address, DividendCheckpointError> {
        env.storage()
            .persistent()
            .get(&DataKey::Owner)
            .ok_or(DividendCheckpointError::NotInitialized)
    }

    fn zero_address(env: &Env) -> Address {
        Address::from_string(&String::from_str(env, ZERO_ACCOUNT))
    }

    /// Require `caller` to be the owner.
    fn require_owner(env: &Env, caller: &Address) -> Result<(), DividendCheckpointError> {
        let owner = Self::owner_of(env)?;
        caller.require_auth();
        if *caller != owner {
            return Err(DividendCheckpointError::NotAuthorized);
        }
        Ok(())
    }

    /// Require `caller` to be the owner or hold any of `permissions`.
    fn require_permission(
        env: &Env,
        caller: &Address,
        permissions: &[Permission],
    ) -> Result<(), DividendCheckpointError> {
        let owner = Self::owner_of(env)?;
        caller.require_auth();
        if *caller == owner {
            return Ok(());
        }
        let granted = permissions.iter().any(|permission| {
            env.storage()
                .persistent()
                .get::<DataKey, bool>(&DataKey::Permission(caller.clone(), *permission))
                .unwrap_or(false)
        });
        if !granted {
            return Err(DividendCheckpointError::NotAuthorized);
        }
        Ok(())
    }

    fn require_not_paused(env: &Env) -> Result<(), DividendCheckpointError> {
        if Self::paused(env.clone()) {
            return Err(DividendCheckpointError::ContractPaused);
        }
        Ok(())
    }

    fn require_positive_amount(amount: i128) -> Result<(), DividendCheckpointError> {
        if amount <= 0 {
            return Err(DividendCheckpointError::InvalidAmount);
        }
        Ok(())
    }

    fn validate_name(name: &String) -> Result<(), DividendCheckpointError> {
        if name.len() == 0 || name.len() > MAX_NAME_LENGTH {
            return Err(DividendCheckpointError::InvalidName);
        }
        Ok(())
    }

    /// Bounded, zero-free, duplicate-free.
    fn validate_exclusions(
        env: &Env,
        excluded: &Vec<Address>,
    ) -> Result<(), DividendCheckpointError> {
        if excluded.len() > EXCLUDED_ADDRESS_LIMIT {
            return Err(DividendCheckpointError::TooManyExcluded);
        }
        let zero = Self::zero_address(env);
        for i in 0..excluded.len() {
            let addr = excluded.get_unchecked(i);
            if addr == zero {
                return Err(DividendCheckpointError::ZeroAddress);
            }
            for j in (i + 1)..excluded.len() {
                if excluded.get_unchecked(j) == addr {
                    return Err(DividendCheckpointError::DuplicateAddress);
                }
            }
        }
        Ok(())
    }

    /// floor(a * b / c) with a 256-bit intermediate. Zero divisor yields zero.
    fn mul_div(env: &Env, a: i128, b: i128, c: i128) -> Result<i128, DividendCheckpointError> {
        if a < 0 || b < 0 || c < 0 {
            return Err(DividendCheckpointError::InvalidAmount);
        }
        if c == 0 {
            return Ok(0);
        }
        let product = U256::from_u128(env, a as u128).mul(&U256::from_u128(env, b as u128));
        let quotient = product.div(&U256::from_u128(env, c as u128));
        quotient
            .to_u128()
            .and_then(|v| i128::try_from(v).ok())
            .ok_or(DividendCheckpointError::Overflow)
    }

    fn set_balance(env: &Env, holder: &Address, value: i128) {
        let key = DataKey::Balance(holder.clone());
        let previous: i128 = env.storage().persistent().get(&key).unwrap_or(0);
        checkpoint::record(env, &DataKey::BalanceHistory(holder.clone()), previous);
        env.storage().persistent().set(&key, &value);

        if value > 0 {
            let holder_key = DataKey::IsHolder(holder.clone());
            if !env.storage().persistent().has(&holder_key) {
                let mut holders = Self::holders(env.clone());
                holders.push_back(holder.clone());
                env.storage().persistent().set(&DataKey::Holders, &holders);
                env.storage().persistent().set(&holder_key, &true);
            }
        }
    }

    fn set_total_supply(env: &Env, value: i128) {
        let previous = Self::total_supply(env.clone());
        checkpoint::record(env, &DataKey::SupplyHistory, previous);
        env.storage().persistent().set(&DataKey::TotalSupply, &value);
    }

    fn next_checkpoint(env: &Env) -> u32 {
        let id = checkpoint::current_id(env) + 1;
        let now = env.ledger().timestamp();
        env.storage().persistent().set(&DataKey::CheckpointId, &id);
        env.storage()
            .persistent()
            .set(&DataKey::CheckpointTime(id), &now);
        env.events().publish((EVENT_CHECKPOINT,), (id, now));
        id
    }

    fn load_dividend(env: &Env, index: u32) -> Result<Dividend, DividendCheckpointError> {
        env.storage()
            .persistent()
            .get(&DataKey::Dividend(index))
            .ok_or(DividendCheckpointError::InvalidDividend)
    }

    fn store_dividend(env: &Env, index: u32, dividend: &Dividend) {
        env.storage()
            .persistent()
            .set(&DataKey::Dividend(index), dividend);
    }

    /// Load a dividend that is payable right now: not reclaimed, mature, not expired.
    fn payable_dividend(env: &Env, index: u32) -> Result<Dividend, DividendCheckpointError> {
        let dividend = Self::load_dividend(env, index)?;
        let now = env.ledger().timestamp();
        if dividend.reclaimed {
            return Err(DividendCheckpointError::DividendReclaimed);
        }
        if now < dividend.maturity {
            return Err(DividendCheckpointError::MaturityInFuture);
        }
        if now >= dividend.expiry {
            return Err(DividendCheckpointError::DividendExpired);
        }
        Ok(dividend)
    }

    fn asset_of(env: &Env, kind: &DividendKind) -> Result<Address, DividendCheckpointError> {
        match kind {
            DividendKind::Token(asset) => Ok(asset.clone()),
            DividendKind::Native => env
                .storage()
                .persistent()
                .get(&DataKey::NativeAsset)
                .ok_or(DividendCheckpointError::NotInitialized),
        }
    }

    fn wallet_of(env: &Env) -> Result<Address, DividendCheckpointError> {
        env.storage()
            .persistent()
            .get(&DataKey::Wallet)
            .ok_or(DividendCheckpointError::NotInitialized)
    }

    /// (gross, withheld) owed to `payee`; zero for excluded payees.
    fn entitlement(
        env: &Env,
        index: u32,
        dividend: &Dividend,
        payee: &Address,
    ) -> Result<(i128, i128), DividendCheckpointError> {
        if Self::is_excluded(env.clone(), payee.clone(), index) {
            return Ok((0, 0));
        }
        let balance = Self::balance_at(env.clone(), payee.clone(), dividend.checkpoint_id)?;
        let gross = Self::mul_div(env, balance, dividend.amount, dividend.total_supply)?;
        let rate = Self::withholding_tax(env.clone(), payee.clone());
        let withheld = Self::mul_div(env, gross, rate, WITHHOLDING_PRECISION)?;
        Ok((gross, withheld))
    }

    /// Mark `payee` paid, update dividend totals, and transfer the net amount.
    fn pay(
        env: &Env,
        index: u32,
        dividend: &mut Dividend,
        payee: &Address,
    ) -> Result<i128, DividendCheckpointError> {
        let (gross, withheld) = Self::entitlement(env, index, dividend, payee)?;
        env.storage()
            .persistent()
            .set(&DataKey::Claimed(index, payee.clone()), &true);

        dividend.claimed_amount = dividend
            .claimed_amount
            .checked_add(gross)
            .ok_or(DividendCheckpointError::Overflow)?;
        dividend.total_withheld = dividend
            .total_withheld
            .checked_add(withheld)
            .ok_or(DividendCheckpointError::Overflow)?;

        let net = gross - withheld;
        if net > 0 {
            let asset = Self::asset_of(env, &dividend.kind)?;
            token::Client::new(env, &asset).transfer(
                &env.current_contract_address(),
                payee,
                &net,
            );
        }
        env.events()
            .publish((EVENT_PAYMENT, payee.clone(), index), (net, withheld));
        Ok(net)
    }

    /// Pay every unclaimed, non-excluded payee in order. Returns how many were paid.
    fn pay_all(
        env: &Env,
        index: u32,
        dividend: &mut Dividend,
        payees: &Vec<Address>,
    ) -> Result<u32, DividendCheckpointError> {
        let mut paid = 0u32;
        for payee in payees.iter() {
            if Self::is_claimed(env.clone(), payee.clone(), index)
                || Self::is_excluded(env.clone(), payee.clone(), index)
            {
                continue;
            }
            Self::pay(env, index, dividend, &payee)?;
            paid += 1;
        }
        Ok(paid)
    }

    #[allow(clippy::too_many_arguments)]
    fn create_dividend_internal(
        env: &Env,
        caller: &Address,
        kind: DividendKind,
        maturity: u64,
        expiry: u64,
        amount: i128,
        checkpoint_id: Option<u32>,
        excluded: Option<Vec<Address>>,
        name: String,
    ) -> Result<u32, DividendCheckpointError> {
        Self::require_permission(env, caller, &[Permission::Admin, Permission::Operator])?;

        // An explicit list replaces the default list, never merges with it.
        let excluded = match excluded {
            Some(list) => list,
            None => Self::default_excluded(env.clone()),
        };
        Self::validate_exclusions(env, &excluded)?;

        if expiry <= maturity {
            return Err(DividendCheckpointError::InvalidDates);
        }
        if expiry <= env.ledger().timestamp() {
            return Err(DividendCheckpointError::ExpiryInPast);
        }
        Self::require_positive_amount(amount)?;
        Self::validate_name(&name)?;

        let checkpoint_id = match checkpoint_id {
            Some(id) => {
                if id > checkpoint::current_id(env) {
                    return Err(DividendCheckpointError::InvalidCheckpoint);
                }
                id
            }
            None => Self::next_checkpoint(env),
        };

        let supply = Self::total_supply_at(env.clone(), checkpoint_id)?;
        let mut excluded_supply: i128 = 0;
        for addr in excluded.iter() {
            let balance = Self::balance_at(env.clone(), addr, checkpoint_id)?;
            excluded_supply = excluded_supply
                .checked_add(balance)
                .ok_or(DividendCheckpointError::Overflow)?;
        }
        if supply == 0 || excluded_supply >= supply {
            return Err(DividendCheckpointError::NoEligibleSupply);
        }

        let module = env.current_contract_address();
        match &kind {
            DividendKind::Token(asset) => {
                token::Client::new(env, asset).transfer_from(&module, caller, &module, &amount)
            }
            DividendKind::Native => {
                let native = Self::asset_of(env, &kind)?;
                token::Client::new(env, &native).transfer(caller, &module, &amount)
            }
        }

        let index = Self::dividend_count(env.clone());
        let dividend = Dividend {
            checkpoint_id,
            created: env.ledger().timestamp(),
            maturity,
            expiry,
            amount,
            claimed_amount: 0,
            total_supply: supply - excluded_supply,
            reclaimed: false,
            total_withheld: 0,
            total_withheld_withdrawn: 0,
            name: name.clone(),
            kind: kind.clone(),
        };
        Self::store_dividend(env, index, &dividend);
        for addr in excluded.iter() {
            env.storage()
                .persistent()
                .set(&DataKey::DividendExcluded(index, addr), &true);
        }
        env.storage()
            .persistent()
            .set(&DataKey::Excluded(index), &excluded);
        env.storage()
            .persistent()
            .set(&DataKey::DividendCount, &(index + 1));

        env.events().publish(
            (EVENT_DIVIDEND_CREATED, caller.clone(), index),
            (kind, checkpoint_id, amount, maturity, expiry, name),
        );
        Ok(index)
    }
}

#[contractimpl]
impl DividendCheckpoint {
    /// Initialize owner, wallet, and the asset used for native-currency dividends.
    /// Can only be called once.
    pub fn initialize(
        env: Env,
        owner: Address,
        wallet: Address,
        native_asset: Address,
    ) -> Result<(), DividendCheckpointError> {
        if env.storage().persistent().has(&DataKey::Owner) {
            return Err(DividendCheckpointError::AlreadyInitialized);
        }
        if wallet == Self::zero_address(&env) {
            return Err(DividendCheckpointError::ZeroAddress);
        }
        env.storage().persistent().set(&DataKey::Owner, &owner);
        env.storage().persistent().set(&DataKey::Wallet, &wallet);
        env.storage()
            .persistent()
            .set(&DataKey::NativeAsset, &native_asset);
        env.storage().persistent().set(&DataKey::Paused, &false);
        env.events()
            .publish((EVENT_INIT, owner), (wallet, native_asset));
        Ok(())
    }

    pub fn owner(env: Env) -> Result<Address, DividendCheckpointError> {
        Self::owner_of(&env)
    }

    pub fn wallet(env: Env) -> Result<Address, DividendCheckpointError> {
        Self::wallet_of(&env)
    }

    pub fn native_asset(env: Env) -> Result<Address, DividendCheckpointError> {
        Self::asset_of(&env, &DividendKind::Native)
    }

    /// Query the paused state of the module.
    pub fn paused(env: Env) -> bool {
        env.storage()
            .persistent()
            .get::<DataKey, bool>(&DataKey::Paused)
            .unwrap_or(false)
    }

    // ── Permissions ───────────────────────────────────────────

    /// Grant `permission` to `delegate`. Owner only. Idempotent.
    pub fn grant_permission(
        env: Env,
        caller: Address,
        delegate: Address,
        permission: Permission,
    ) -> Result<(), DividendCheckpointError> {
        Self::require_owner(&env, &caller)?;
        env.storage()
            .persistent()
            .set(&DataKey::Permission(delegate.clone(), permission), &true);
        env.events()
            .publish((EVENT_PERM_GRANT, delegate), permission as u32);
        Ok(())
    }

    /// Revoke `permission` from `delegate`. Owner only. Idempotent.
    pub fn revoke_permission(
        env: Env,
        caller: Address,
        delegate: Address,
        permission: Permission,
    ) -> Result<(), DividendCheckpointError> {
        Self::require_owner(&env, &caller)?;
        env.storage()
            .persistent()
            .remove(&DataKey::Permission(delegate.clone(), permission));
        env.events()
            .publish((EVENT_PERM_REVOKE, delegate), permission as u32);
        Ok(())
    }

    /// Returns `true` if `delegate` is the owner or holds `permission`.
    pub fn has_permission(env: Env, delegate: Address, permission: Permission) -> bool {
        if let Ok(owner) = Self::owner_of(&env) {
            if owner == delegate {
                return true;
            }
        }
        env.storage()
            .persistent()
            .get::<DataKey, bool>(&DataKey::Permission(delegate, permission))
            .unwrap_or(false)
    }

    // ── Checkpointed share registry ───────────────────────────

    /// Issue `amount` shares to `to`. Owner only.
    pub fn mint(
        env: Env,
        caller: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), DividendCheckpointError> {
        Self::require_owner(&env, &caller)?;
        Self::require_positive_amount(amount)?;

        let balance = Self::balance(env.clone(), to.clone());
        let new_balance = balance
            .checked_add(amount)
            .ok_or(DividendCheckpointError::Overflow)?;
        let new_supply = Self::total_supply(env.clone())
            .checked_add(amount)
            .ok_or(DividendCheckpointError::Overflow)?;
        Self::set_balance(&env, &to, new_balance);
        Self::set_total_supply(&env, new_supply);

        env.events().publish((EVENT_MINT, to), amount);
        Ok(())
    }

    /// Move `amount` shares from `from` to `to`.
    pub fn transfer(
        env: Env,
        from: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), DividendCheckpointError> {
        Self::owner_of(&env)?;
        from.require_auth();
        Self::require_positive_amount(amount)?;

        let from_balance = Self::balance(env.clone(), from.clone());
        if from_balance < amount {
            return Err(DividendCheckpointError::InsufficientBalance);
        }
        Self::set_balance(&env, &from, from_balance - amount);
        let to_balance = Self::balance(env.clone(), to.clone());
        let new_to_balance = to_balance
            .checked_add(amount)
            .ok_or(DividendCheckpointError::Overflow)?;
        Self::set_balance(&env, &to, new_to_balance);

        env.events()
            .publish((EVENT_TRANSFER, from, to), amount);
        Ok(())
    }

    pub fn balance(env: Env, id: Address) -> i128 {
        env.storage()
            .persistent()
            .get(&DataKey::Balance(id))
            .unwrap_or(0)
    }

    pub fn total_supply(env: Env) -> i128 {
        env.storage()
            .persistent()
            .get(&DataKey::TotalSupply)
            .unwrap_or(0)
    }

    /// Balance of `id` as of `checkpoint_id`.
    pub fn balance_at(
        env: Env,
        id: Address,
        checkpoint_id: u32,
    ) -> Result<i128, DividendCheckpointError> {
        if checkpoint_id > checkpoint::current_id(&env) {
            return Err(DividendCheckpointError::InvalidCheckpoint);
        }
        let live = Self::balance(env.clone(), id.clone());
        Ok(checkpoint::value_at(
            &env,
            &DataKey::BalanceHistory(id),
            checkpoint_id,
            live,
        ))
    }

    /// Share supply as of `checkpoint_id`.
    pub fn total_supply_at(env: Env, checkpoint_id: u32) -> Result<i128, DividendCheckpointError> {
        if checkpoint_id > checkpoint::current_id(&env) {
            return Err(DividendCheckpointError::InvalidCheckpoint);
        }
        let live = Self::total_supply(env.clone());
        Ok(checkpoint::value_at(
            &env,
            &DataKey::SupplyHistory,
            checkpoint_id,
            live,
        ))
    }

    /// Every address that ever held shares, in first-receipt order.
    pub fn holders(env: Env) -> Vec<Address> {
        env.storage()
            .persistent()
            .get(&DataKey::Holders)
            .unwrap_or_else(|| Vec::new(&env))
    }

    /// Snapshot all balances. Owner or Admin.
    pub fn create_checkpoint(env: Env, caller: Address) -> Result<u32, DividendCheckpointError> {
        Self::require_permission(&env, &caller, &[Permission::Admin])?;
        Ok(Self::next_checkpoint(&env))
    }

    pub fn current_checkpoint_id(env: Env) -> u32 {
        checkpoint::current_id(&env)
    }

    /// Creation timestamps of checkpoints 1..=current, in order.
    pub fn checkpoint_times(env: Env) -> Vec<u64> {
        let mut times = Vec::new(&env);
        for id in 1..=checkpoint::current_id(&env) {
            let time: u64 = env
                .storage()
                .persistent()
                .get(&DataKey::CheckpointTime(id))
                .unwrap_or(0);
            times.push_back(time);
        }
        times
    }

    // ── Exclusions and withholding ────────────────────────────

    /// Replace the default exclusion list. Admin only.
    pub fn set_default_excluded(
        env: Env,
        caller: Address,
        excluded: Vec<Address>,
    ) -> Result<(), DividendCheckpointError> {
        Self::require_permission(&env, &caller, &[Permission::Admin])?;
        Self::validate_exclusions(&env, &excluded)?;
        env.storage()
            .persistent()
            .set(&DataKey::DefaultExcluded, &excluded);
        env.events()
            .publish((EVENT_DEFAULT_EXCLUDED, caller), excluded);
        Ok(())
    }

    pub fn default_excluded(env: Env) -> Vec<Address> {
        env.storage()
            .persistent()
            .get(&DataKey::DefaultExcluded)
            .unwrap_or_else(|| Vec::new(&env))
    }

    /// Set per-investor withholding rates. Admin only.
    pub fn set_withholding(
        env: Env,
        caller: Address,
        investors: Vec<Address>,
        rates: Vec<i128>,
    ) -> Result<(), DividendCheckpointError> {
        Self::require_permission(&env, &caller, &[Permission::Admin])?;
        if investors.len() != rates.len() {
            return Err(DividendCheckpointError::MismatchedLengths);
        }
        for rate in rates.iter() {
            if !(0..=WITHHOLDING_PRECISION).contains(&rate) {
                return Err(DividendCheckpointError::InvalidWithholding);
            }
        }
        for i in 0..investors.len() {
            let investor = investors.get_unchecked(i);
            let rate = rates.get_unchecked(i);
            env.storage()
                .persistent()
                .set(&DataKey::Withholding(investor.clone()), &rate);
            env.events()
                .publish((EVENT_WITHHOLDING_SET, investor), rate);
        }
        Ok(())
    }

    /// Apply one withholding rate to every listed investor. Admin only.
    pub fn set_withholding_fixed(
        env: Env,
        caller: Address,
        investors: Vec<Address>,
        rate: i128,
    ) -> Result<(), DividendCheckpointError> {
        Self::require_permission(&env, &caller, &[Permission::Admin])?;
        if !(0..=WITHHOLDING_PRECISION).contains(&rate) {
            return Err(DividendCheckpointError::InvalidWithholding);
        }
        for investor in investors.iter() {
            env.storage()
                .persistent()
                .set(&DataKey::Withholding(investor.clone()), &rate);
            env.events()
                .publish((EVENT_WITHHOLDING_SET, investor), rate);
        }
        Ok(())
    }

    /// Withholding rate of `investor` (0 if unset).
    pub fn withholding_tax(env: Env, investor: Address) -> i128 {
        env.storage()
            .persistent()
            .get(&DataKey::Withholding(investor))
            .unwrap_or(0)
    }

    // ── Dividend creation ─────────────────────────────────────

    /// Create a dividend on a fresh checkpoint using the default exclusions.
    pub fn create_dividend(
        env: Env,
        caller: Address,
        kind: DividendKind,
        maturity: u64,
        expiry: u64,
        amount: i128,
        name: String,
    ) -> Result<u32, DividendCheckpointError> {
        Self::create_dividend_internal(
            &env, &caller, kind, maturity, expiry, amount, None, None, name,
        )
    }

    /// Create a dividend on an existing checkpoint using the default exclusions.
    #[allow(clippy::too_many_arguments)]
    pub fn create_with_checkpoint(
        env: Env,
        caller: Address,
        kind: DividendKind,
        maturity: u64,
        expiry: u64,
        amount: i128,
        checkpoint_id: u32,
        name: String,
    ) -> Result<u32, DividendCheckpointError> {
        Self::create_dividend_internal(
            &env,
            &caller,
            kind,
            maturity,
            expiry,
            amount,
            Some(checkpoint_id),
            None,
            name,
        )
    }

    /// Create a dividend on a fresh checkpoint with an explicit exclusion list.
    #[allow(clippy::too_many_arguments)]
    pub fn create_with_exclusions(
        env: Env,
        caller: Address,
        kind: DividendKind,
        maturity: u64,
        expiry: u64,
        amount: i128,
        excluded: Vec<Address>,
        name: String,
    ) -> Result<u32, DividendCheckpointError> {
        Self::create_dividend_internal(
            &env,
            &caller,
            kind,
            maturity,
            expiry,
            amount,
            None,
            Some(excluded),
            name,
        )
    }

    /// Create a dividend on an existing checkpoint with an explicit exclusion list.
    #[allow(clippy::too_many_arguments)]
    pub fn create_with_checkpoint_excl(
        env: Env,
        caller: Address,
        kind: DividendKind,
        maturity: u64,
        expiry: u64,
        amount: i128,
        checkpoint_id: u32,
        excluded: Vec<Address>,
        name: String,
    ) -> Result<u32, DividendCheckpointError> {
        Self::create_dividend_internal(
            &env,
            &caller,
            kind,
            maturity,
            expiry,
            amount,
            Some(checkpoint_id),
            Some(excluded),
            name,
        )
    }

    // ── Payments ──────────────────────────────────────────────

    /// Investor-initiated claim. Returns the net amount transferred.
    pub fn pull_dividend_payment(
        env: Env,
        caller: Address,
        index: u32,
    ) -> Result<i128, DividendCheckpointError> {
        caller.require_auth();
        Self::require_not_paused(&env)?;
        let mut dividend = Self::payable_dividend(&env, index)?;
        if Self::is_claimed(env.clone(), caller.clone(), index) {
            return Err(DividendCheckpointError::AlreadyClaimed);
        }
        if Self::is_excluded(env.clone(), caller.clone(), index) {
            return Err(DividendCheckpointError::AddressExcluded);
        }
        let net = Self::pay(&env, index, &mut dividend, &caller)?;
        Self::store_dividend(&env, index, &dividend);
        Ok(net)
    }

    /// Pay up to `iterations` holders starting at holder position `start`. Operator only.
    /// Claimed and excluded holders are skipped. Returns how many were paid.
    pub fn push_dividend_payment(
        env: Env,
        caller: Address,
        index: u32,
        start: u32,
        iterations: u32,
    ) -> Result<u32, DividendCheckpointError> {
        Self::require_permission(&env, &caller, &[Permission::Operator])?;
        Self::require_not_paused(&env)?;
        let mut dividend = Self::payable_dividend(&env, index)?;

        let holders = Self::holders(env.clone());
        let end = core::cmp::min(start.saturating_add(iterations), holders.len());
        let batch = if start >= end {
            Vec::new(&env)
        } else {
            holders.slice(start..end)
        };
        let paid = Self::pay_all(&env, index, &mut dividend, &batch)?;
        Self::store_dividend(&env, index, &dividend);
        Ok(paid)
    }

    /// Pay the listed payees. Operator only. Returns how many were paid.
    pub fn push_payment_to_addresses(
        env: Env,
        caller: Address,
        index: u32,
        payees: Vec<Address>,
    ) -> Result<u32, DividendCheckpointError> {
        Self::require_permission(&env, &caller, &[Permission::Operator])?;
        Self::require_not_paused(&env)?;
        let mut dividend = Self::payable_dividend(&env, index)?;
        let zero = Self::zero_address(&env);
        if payees.iter().any(|payee| payee == zero) {
            return Err(DividendCheckpointError::ZeroAddress);
        }
        let paid = Self::pay_all(&env, index, &mut dividend, &payees)?;
        Self::store_dividend(&env, index, &dividend);
        Ok(paid)
    }

    // ── Reclaim and withholding withdrawal ────────────────────

    /// Send the unclaimed residual of an expired dividend to the wallet.
    /// Owner or Operator. Returns the amount reclaimed.
    pub fn reclaim_dividend(
        env: Env,
        caller: Address,
        index: u32,
    ) -> Result<i128, DividendCheckpointError> {
        Self::require_permission(&env, &caller, &[Permission::Operator])?;
        let mut dividend = Self::load_dividend(&env, index)?;
        if env.ledger().timestamp() < dividend.expiry {
            return Err(DividendCheckpointError::ExpiryInFuture);
        }
        if dividend.reclaimed {
            return Err(DividendCheckpointError::DividendReclaimed);
        }
        dividend.reclaimed = true;
        let remaining = dividend.amount - dividend.claimed_amount;
        Self::store_dividend(&env, index, &dividend);

        let wallet = Self::wallet_of(&env)?;
        if remaining > 0 {
            let asset = Self::asset_of(&env, &dividend.kind)?;
            token::Client::new(&env, &asset).transfer(
                &env.current_contract_address(),
                &wallet,
                &remaining,
            );
        }
        env.events()
            .publish((EVENT_RECLAIMED, wallet, index), remaining);
        Ok(remaining)
    }

    /// Send withheld tax not yet withdrawn to the wallet. Operator only.
    pub fn withdraw_withholding(
        env: Env,
        caller: Address,
        index: u32,
    ) -> Result<i128, DividendCheckpointError> {
        Self::require_permission(&env, &caller, &[Permission::Operator])?;
        let mut dividend = Self::load_dividend(&env, index)?;
        let remaining = dividend.total_withheld - dividend.total_withheld_withdrawn;
        dividend.total_withheld_withdrawn = dividend.total_withheld;
        Self::store_dividend(&env, index, &dividend);

        let wallet = Self::wallet_of(&env)?;
        if remaining > 0 {
            let asset = Self::asset_of(&env, &dividend.kind)?;
            token::Client::new(&env, &asset).transfer(
                &env.current_contract_address(),
                &wallet,
                &remaining,
            );
        }
        env.events()
            .publish((EVENT_WITHHOLDING_WITHDRAWN, wallet, index), remaining);
        Ok(remaining)
    }

    // ── Issuer configuration ──────────────────────────────────

    /// Move a dividend's maturity/expiry window. Owner only; not after reclaim.
    pub fn update_dividend_dates(
        env: Env,
        caller: Address,
        index: u32,
        maturity: u64,
        expiry: u64,
    ) -> Result<(), DividendCheckpointError> {
        Self::require_owner(&env, &caller)?;
        let mut dividend = Self::load_dividend(&env, index)?;
        if dividend.reclaimed {
            return Err(DividendCheckpointError::DividendReclaimed);
        }
        if expiry <= maturity {
            return Err(DividendCheckpointError::InvalidDates);
        }
        dividend.maturity = maturity;
        dividend.expiry = expiry;
        Self::store_dividend(&env, index, &dividend);
        env.events()
            .publish((EVENT_DATES_UPDATED, index), (maturity, expiry));
        Ok(())
    }

    /// Change where reclaimed and withheld funds are sent. Owner only.
    pub fn change_wallet(
        env: Env,
        caller: Address,
        wallet: Address,
    ) -> Result<(), DividendCheckpointError> {
        Self::require_owner(&env, &caller)?;
        if wallet == Self::zero_address(&env) {
            return Err(DividendCheckpointError::ZeroAddress);
        }
        let previous = Self::wallet_of(&env)?;
        env.storage().persistent().set(&DataKey::Wallet, &wallet);
        env.events()
            .publish((EVENT_WALLET_CHANGED,), (previous, wallet));
        Ok(())
    }

    /// Pause claim-affecting operations. Owner only.
    pub fn pause(env: Env, caller: Address) -> Result<(), DividendCheckpointError> {
        Self::require_owner(&env, &caller)?;
        if Self::paused(env.clone()) {
            return Err(DividendCheckpointError::AlreadyPaused);
        }
        env.storage().persistent().set(&DataKey::Paused, &true);
        env.events().publish((EVENT_PAUSED, caller), ());
        Ok(())
    }

    /// Resume claim-affecting operations. Owner only.
    pub fn unpause(env: Env, caller: Address) -> Result<(), DividendCheckpointError> {
        Self::require_owner(&env, &caller)?;
        if !Self::paused(env.clone()) {
            return Err(DividendCheckpointError::NotPaused);
        }
        env.storage().persistent().set(&DataKey::Paused, &false);
        env.events().publish((EVENT_UNPAUSED, caller), ());
        Ok(())
    }

    // ── Views ─────────────────────────────────────────────────

    pub fn dividend(env: Env, index: u32) -> Result<Dividend, DividendCheckpointError> {
        Self::load_dividend(&env, index)
    }

    pub fn dividend_count(env: Env) -> u32 {
        env.storage()
            .persistent()
            .get(&DataKey::DividendCount)
            .unwrap_or(0)
    }

    /// All dividends in creation order.
    pub fn dividends(env: Env) -> Vec<Dividend> {
        let mut all = Vec::new(&env);
        for index in 0..Self::dividend_count(env.clone()) {
            if let Ok(dividend) = Self::load_dividend(&env, index) {
                all.push_back(dividend);
            }
        }
        all
    }

    /// Indices of dividends created on `checkpoint_id`.
    pub fn dividend_index(env: Env, checkpoint_id: u32) -> Vec<u32> {
        let mut indices = Vec::new(&env);
        for index in 0..Self::dividend_count(env.clone()) {
            if let Ok(dividend) = Self::load_dividend(&env, index) {
                if dividend.checkpoint_id == checkpoint_id {
                    indices.push_back(index);
                }
            }
        }
        indices
    }

    /// Exclusion list the dividend was created with.
    pub fn excluded(env: Env, index: u32) -> Result<Vec<Address>, DividendCheckpointError> {
        Self::load_dividend(&env, index)?;
        Ok(env
            .storage()
            .persistent()
            .get(&DataKey::Excluded(index))
            .unwrap_or_else(|| Vec::new(&env)))
    }

    pub fn is_claimed(env: Env, investor: Address, index: u32) -> bool {
        env.storage()
            .persistent()
            .get(&DataKey::Claimed(index, investor))
            .unwrap_or(false)
    }

    pub fn is_excluded(env: Env, investor: Address, index: u32) -> bool {
        env.storage()
            .persistent()
            .get(&DataKey::DividendExcluded(index, investor))
            .unwrap_or(false)
    }

    /// (gross, withheld) owed to `payee` for dividend `index`.
    pub fn calculate_dividend(
        env: Env,
        index: u32,
        payee: Address,
    ) -> Result<(i128, i128), DividendCheckpointError> {
        let dividend = Self::load_dividend(&env, index)?;
        Self::entitlement(&env, index, &dividend, &payee)
    }

    /// Payment status of every holder for dividend `index`.
    pub fn dividend_progress(
        env: Env,
        index: u32,
    ) -> Result<Vec<DividendProgress>, DividendCheckpointError> {
        let dividend = Self::load_dividend(&env, index)?;
        let mut rows = Vec::new(&env);
        for investor in Self::holders(env.clone()).iter() {
            let (claim, withheld) = Self::entitlement(&env, index, &dividend, &investor)?;
            let balance =
                Self::balance_at(env.clone(), investor.clone(), dividend.checkpoint_id)?;
            rows.push_back(DividendProgress {
                claimed: Self::is_claimed(env.clone(), investor.clone(), index),
                excluded: Self::is_excluded(env.clone(), investor.clone(), index),
                withheld,
                claim,
                balance,
                investor,
            });
        }
        Ok(rows)
    }

    /// Balance and withholding rate of every holder at `checkpoint_id`.
    pub fn checkpoint_data(
        env: Env,
        checkpoint_id: u32,
    ) -> Result<Vec<CheckpointHolding>, DividendCheckpointError> {
        if checkpoint_id > checkpoint::current_id(&env) {
            return Err(DividendCheckpointError::InvalidCheckpoint);
        }
        let mut rows = Vec::new(&env);
        for investor in Self::holders(env.clone()).iter() {
            rows.push_back(CheckpointHolding {
                balance: Self::balance_at(env.clone(), investor.clone(), checkpoint_id)?,
                withholding: Self::withholding_tax(env.clone(), investor.clone()),
                investor,
            });
        }
        Ok(rows)
    }
}

mod test;
mod test_auth;
