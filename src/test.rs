#![cfg(test)]
use soroban_sdk::{
    testutils::{Address as _, Events as _, Ledger as _},
    token, Address, Env, String, Vec,
};

use crate::{
    DividendCheckpoint, DividendCheckpointClient, DividendCheckpointError, DividendKind,
    Permission, EXCLUDED_ADDRESS_LIMIT, WITHHOLDING_PRECISION, ZERO_ACCOUNT,
};

// ── helpers ───────────────────────────────────────────────────

const TEN_PERCENT: i128 = WITHHOLDING_PRECISION / 10;

struct Fixture {
    env: Env,
    client: DividendCheckpointClient<'static>,
    contract: Address,
    owner: Address,
    wallet: Address,
    payment_token: Address,
    native_asset: Address,
}

/// Create a Stellar asset contract; returns its address.
fn create_payment_token(env: &Env) -> Address {
    let admin = Address::generate(env);
    env.register_stellar_asset_contract_v2(admin).address()
}

/// Mint `amount` of `asset` to `recipient`.
fn mint_tokens(env: &Env, asset: &Address, recipient: &Address, amount: i128) {
    token::StellarAssetClient::new(env, asset).mint(recipient, &amount);
}

/// Check balance of `who` for `asset`.
fn balance(env: &Env, asset: &Address, who: &Address) -> i128 {
    token::Client::new(env, asset).balance(who)
}

fn set_time(env: &Env, timestamp: u64) {
    env.ledger().with_mut(|li| li.timestamp = timestamp);
}

fn name(env: &Env, text: &str) -> String {
    String::from_str(env, text)
}

/// Initialized module at timestamp 1_000 with a funded, pre-approved owner.
fn setup() -> Fixture {
    let env = Env::default();
    env.mock_all_auths();
    env.budget().reset_unlimited();
    set_time(&env, 1_000);

    let contract = env.register_contract(None, DividendCheckpoint);
    let client = DividendCheckpointClient::new(&env, &contract);
    let owner = Address::generate(&env);
    let wallet = Address::generate(&env);
    let payment_token = create_payment_token(&env);
    let native_asset = create_payment_token(&env);

    client.initialize(&owner, &wallet, &native_asset);

    mint_tokens(&env, &payment_token, &owner, 1_000_000);
    mint_tokens(&env, &native_asset, &owner, 1_000_000);
    token::Client::new(&env, &payment_token).approve(&owner, &contract, &1_000_000, &10_000);

    Fixture {
        env,
        client,
        contract,
        owner,
        wallet,
        payment_token,
        native_asset,
    }
}

/// Mint `amount` shares to a fresh holder.
fn holder(f: &Fixture, amount: i128) -> Address {
    let addr = Address::generate(&f.env);
    f.client.mint(&f.owner, &addr, &amount);
    addr
}

/// Token dividend of `amount` maturing now and expiring at 2_000.
fn token_dividend(f: &Fixture, amount: i128) -> u32 {
    f.client.create_dividend(
        &f.owner,
        &DividendKind::Token(f.payment_token.clone()),
        &1_000,
        &2_000,
        &amount,
        &name(&f.env, "Q1"),
    )
}

// ── initialization ────────────────────────────────────────────

#[test]
fn initialize_twice_fails() {
    let f = setup();
    let result = f
        .client
        .try_initialize(&f.owner, &f.wallet, &f.native_asset);
    assert_eq!(result, Err(Ok(DividendCheckpointError::AlreadyInitialized)));
    assert_eq!(f.client.owner(), f.owner);
    assert_eq!(f.client.wallet(), f.wallet);
    assert_eq!(f.client.native_asset(), f.native_asset);
    assert!(!f.client.paused());
}

#[test]
fn initialize_rejects_zero_wallet() {
    let env = Env::default();
    env.mock_all_auths();
    let id = env.register_contract(None, DividendCheckpoint);
    let client = DividendCheckpointClient::new(&env, &id);
    let zero = Address::from_string(&String::from_str(&env, ZERO_ACCOUNT));

    let result = client.try_initialize(&Address::generate(&env), &zero, &Address::generate(&env));
    assert_eq!(result, Err(Ok(DividendCheckpointError::ZeroAddress)));
}

#[test]
fn uninitialized_owner_query_fails() {
    let env = Env::default();
    let id = env.register_contract(None, DividendCheckpoint);
    let client = DividendCheckpointClient::new(&env, &id);
    assert_eq!(client.try_owner(), Err(Ok(DividendCheckpointError::NotInitialized)));
}

// ── share registry and checkpoints ────────────────────────────

#[test]
fn mint_and_transfer_update_balances_and_holders() {
    let f = setup();
    let a = holder(&f, 100);
    let b = Address::generate(&f.env);

    f.client.transfer(&a, &b, &40);

    assert_eq!(f.client.balance(&a), 60);
    assert_eq!(f.client.balance(&b), 40);
    assert_eq!(f.client.total_supply(), 100);
    let holders = f.client.holders();
    assert_eq!(holders.len(), 2);
    assert_eq!(holders.get(0).unwrap(), a);
    assert_eq!(holders.get(1).unwrap(), b);
}

#[test]
fn transfer_more_than_balance_fails() {
    let f = setup();
    let a = holder(&f, 10);
    let b = Address::generate(&f.env);

    let result = f.client.try_transfer(&a, &b, &11);
    assert_eq!(result, Err(Ok(DividendCheckpointError::InsufficientBalance)));
    assert_eq!(f.client.balance(&a), 10);
    assert_eq!(f.client.balance(&b), 0);
}

#[test]
fn balance_at_reads_value_frozen_at_checkpoint() {
    let f = setup();
    let a = holder(&f, 100);
    let b = Address::generate(&f.env);

    assert_eq!(f.client.create_checkpoint(&f.owner), 1);
    f.client.transfer(&a, &b, &40);
    assert_eq!(f.client.create_checkpoint(&f.owner), 2);
    f.client.mint(&f.owner, &a, &10);

    assert_eq!(f.client.balance_at(&a, &1), 100);
    assert_eq!(f.client.balance_at(&b, &1), 0);
    assert_eq!(f.client.balance_at(&a, &2), 60);
    assert_eq!(f.client.balance_at(&b, &2), 40);
    assert_eq!(f.client.balance(&a), 70);

    assert_eq!(f.client.total_supply_at(&1), 100);
    assert_eq!(f.client.total_supply_at(&2), 100);
    assert_eq!(f.client.total_supply(), 110);
}

#[test]
fn checkpoint_zero_reads_zero() {
    let f = setup();
    let a = holder(&f, 100);
    assert_eq!(f.client.balance_at(&a, &0), 0);
    assert_eq!(f.client.total_supply_at(&0), 0);
}

#[test]
fn untouched_balance_reads_live_value() {
    let f = setup();
    let a = holder(&f, 100);
    f.client.create_checkpoint(&f.owner);
    f.client.create_checkpoint(&f.owner);
    assert_eq!(f.client.balance_at(&a, &1), 100);
    assert_eq!(f.client.balance_at(&a, &2), 100);
}

#[test]
fn balance_at_future_checkpoint_fails() {
    let f = setup();
    let a = holder(&f, 100);
    f.client.create_checkpoint(&f.owner);

    assert_eq!(
        f.client.try_balance_at(&a, &2),
        Err(Ok(DividendCheckpointError::InvalidCheckpoint))
    );
    assert_eq!(
        f.client.try_total_supply_at(&2),
        Err(Ok(DividendCheckpointError::InvalidCheckpoint))
    );
}

#[test]
fn checkpoint_times_follow_ledger() {
    let f = setup();
    f.client.create_checkpoint(&f.owner);
    set_time(&f.env, 1_500);
    f.client.create_checkpoint(&f.owner);

    let times = f.client.checkpoint_times();
    assert_eq!(times.len(), 2);
    assert_eq!(times.get(0).unwrap(), 1_000);
    assert_eq!(times.get(1).unwrap(), 1_500);
    assert_eq!(f.client.current_checkpoint_id(), 2);
}

#[test]
fn create_checkpoint_emits_event() {
    let f = setup();
    f.client.create_checkpoint(&f.owner);
    assert!(!f.env.events().all().is_empty());
}

// ── dividend creation ─────────────────────────────────────────

#[test]
fn create_dividend_takes_a_fresh_checkpoint_and_escrows_funds() {
    let f = setup();
    holder(&f, 100_000);

    let index = token_dividend(&f, 1_000);
    assert_eq!(index, 0);
    assert_eq!(f.client.dividend_count(), 1);
    assert_eq!(f.client.current_checkpoint_id(), 1);

    let dividend = f.client.dividend(&0);
    assert_eq!(dividend.checkpoint_id, 1);
    assert_eq!(dividend.amount, 1_000);
    assert_eq!(dividend.total_supply, 100_000);
    assert_eq!(dividend.claimed_amount, 0);
    assert!(!dividend.reclaimed);
    assert_eq!(dividend.created, 1_000);
    assert_eq!(dividend.name, name(&f.env, "Q1"));

    assert_eq!(balance(&f.env, &f.payment_token, &f.contract), 1_000);
    assert_eq!(balance(&f.env, &f.payment_token, &f.owner), 999_000);
}

#[test]
fn create_with_checkpoint_uses_checkpoint_balances() {
    let f = setup();
    let a = holder(&f, 600);
    let b = holder(&f, 400);
    f.client.create_checkpoint(&f.owner);
    f.client.transfer(&a, &b, &600);

    let index = f.client.create_with_checkpoint(
        &f.owner,
        &DividendKind::Token(f.payment_token.clone()),
        &1_000,
        &2_000,
        &1_000,
        &1,
        &name(&f.env, "snap"),
    );
    assert_eq!(f.client.current_checkpoint_id(), 1);
    assert_eq!(f.client.calculate_dividend(&index, &a), (600, 0));
    assert_eq!(f.client.calculate_dividend(&index, &b), (400, 0));
}

#[test]
fn create_with_checkpoint_rejects_future_checkpoint() {
    let f = setup();
    holder(&f, 100);
    let result = f.client.try_create_with_checkpoint(
        &f.owner,
        &DividendKind::Token(f.payment_token.clone()),
        &1_000,
        &2_000,
        &100,
        &1,
        &name(&f.env, "future"),
    );
    assert_eq!(result, Err(Ok(DividendCheckpointError::InvalidCheckpoint)));
    assert_eq!(f.client.dividend_count(), 0);
}

#[test]
fn create_rejects_bad_dates_amount_and_name() {
    let f = setup();
    holder(&f, 100);
    let kind = DividendKind::Token(f.payment_token.clone());

    let r = f
        .client
        .try_create_dividend(&f.owner, &kind, &2_000, &2_000, &100, &name(&f.env, "x"));
    assert_eq!(r, Err(Ok(DividendCheckpointError::InvalidDates)));

    let r = f
        .client
        .try_create_dividend(&f.owner, &kind, &0, &1_000, &100, &name(&f.env, "x"));
    assert_eq!(r, Err(Ok(DividendCheckpointError::ExpiryInPast)));

    let r = f
        .client
        .try_create_dividend(&f.owner, &kind, &1_000, &2_000, &0, &name(&f.env, "x"));
    assert_eq!(r, Err(Ok(DividendCheckpointError::InvalidAmount)));

    let r = f
        .client
        .try_create_dividend(&f.owner, &kind, &1_000, &2_000, &100, &name(&f.env, ""));
    assert_eq!(r, Err(Ok(DividendCheckpointError::InvalidName)));

    let long = name(&f.env, "abcdefghijklmnopqrstuvwxyz0123456");
    let r = f
        .client
        .try_create_dividend(&f.owner, &kind, &1_000, &2_000, &100, &long);
    assert_eq!(r, Err(Ok(DividendCheckpointError::InvalidName)));

    assert_eq!(f.client.dividend_count(), 0);
}

#[test]
fn create_without_supply_fails() {
    let f = setup();
    let r = f.client.try_create_dividend(
        &f.owner,
        &DividendKind::Token(f.payment_token.clone()),
        &1_000,
        &2_000,
        &100,
        &name(&f.env, "empty"),
    );
    assert_eq!(r, Err(Ok(DividendCheckpointError::NoEligibleSupply)));
}

#[test]
fn create_with_everyone_excluded_fails() {
    let f = setup();
    let a = holder(&f, 100);
    let r = f.client.try_create_with_exclusions(
        &f.owner,
        &DividendKind::Token(f.payment_token.clone()),
        &1_000,
        &2_000,
        &100,
        &Vec::from_array(&f.env, [a]),
        &name(&f.env, "none"),
    );
    assert_eq!(r, Err(Ok(DividendCheckpointError::NoEligibleSupply)));
}

#[test]
fn too_many_excluded_addresses_fails() {
    let f = setup();
    holder(&f, 100);
    let mut excluded = Vec::new(&f.env);
    for _ in 0..(EXCLUDED_ADDRESS_LIMIT + 1) {
        excluded.push_back(Address::generate(&f.env));
    }

    let r = f.client.try_create_with_exclusions(
        &f.owner,
        &DividendKind::Token(f.payment_token.clone()),
        &1_000,
        &2_000,
        &100,
        &excluded,
        &name(&f.env, "big"),
    );
    assert_eq!(r, Err(Ok(DividendCheckpointError::TooManyExcluded)));
    assert_eq!(
        f.client.try_set_default_excluded(&f.owner, &excluded),
        Err(Ok(DividendCheckpointError::TooManyExcluded))
    );
}

#[test]
fn exclusion_list_at_limit_is_accepted() {
    let f = setup();
    holder(&f, 100);
    let mut excluded = Vec::new(&f.env);
    for _ in 0..EXCLUDED_ADDRESS_LIMIT {
        excluded.push_back(Address::generate(&f.env));
    }
    f.client.set_default_excluded(&f.owner, &excluded);
    assert_eq!(f.client.default_excluded().len(), EXCLUDED_ADDRESS_LIMIT);
}

#[test]
fn duplicate_or_zero_exclusion_fails() {
    let f = setup();
    let a = holder(&f, 100);
    let zero = Address::from_string(&String::from_str(&f.env, ZERO_ACCOUNT));

    let dup = Vec::from_array(&f.env, [a.clone(), a.clone()]);
    assert_eq!(
        f.client.try_set_default_excluded(&f.owner, &dup),
        Err(Ok(DividendCheckpointError::DuplicateAddress))
    );
    let with_zero = Vec::from_array(&f.env, [zero]);
    assert_eq!(
        f.client.try_set_default_excluded(&f.owner, &with_zero),
        Err(Ok(DividendCheckpointError::ZeroAddress))
    );
    assert_eq!(f.client.default_excluded().len(), 0);
}

#[test]
fn default_exclusions_apply_unless_replaced() {
    let f = setup();
    let a = holder(&f, 500);
    let b = holder(&f, 500);
    f.client
        .set_default_excluded(&f.owner, &Vec::from_array(&f.env, [a.clone()]));

    let first = token_dividend(&f, 1_000);
    assert!(f.client.is_excluded(&a, &first));
    assert!(!f.client.is_excluded(&b, &first));
    assert_eq!(f.client.dividend(&first).total_supply, 500);
    assert_eq!(f.client.calculate_dividend(&first, &b), (1_000, 0));
    assert_eq!(f.client.calculate_dividend(&first, &a), (0, 0));

    // An explicit list replaces the default one.
    let second = f.client.create_with_exclusions(
        &f.owner,
        &DividendKind::Token(f.payment_token.clone()),
        &1_000,
        &2_000,
        &1_000,
        &Vec::from_array(&f.env, [b.clone()]),
        &name(&f.env, "explicit"),
    );
    assert!(!f.client.is_excluded(&a, &second));
    assert!(f.client.is_excluded(&b, &second));
    assert_eq!(f.client.excluded(&second).len(), 1);
}

#[test]
fn create_with_checkpoint_and_exclusions() {
    let f = setup();
    let a = holder(&f, 300);
    let b = holder(&f, 700);
    f.client.create_checkpoint(&f.owner);
    f.client.mint(&f.owner, &a, &1_000);

    let index = f.client.create_with_checkpoint_excl(
        &f.owner,
        &DividendKind::Token(f.payment_token.clone()),
        &1_000,
        &2_000,
        &700,
        &1,
        &Vec::from_array(&f.env, [a.clone()]),
        &name(&f.env, "both"),
    );
    let dividend = f.client.dividend(&index);
    assert_eq!(dividend.checkpoint_id, 1);
    assert_eq!(dividend.total_supply, 700);
    assert_eq!(f.client.calculate_dividend(&index, &b), (700, 0));
}

#[test]
fn native_dividend_transfers_native_asset() {
    let f = setup();
    let a = holder(&f, 1_000);

    let index = f.client.create_dividend(
        &f.owner,
        &DividendKind::Native,
        &1_000,
        &2_000,
        &500,
        &name(&f.env, "native"),
    );
    assert_eq!(balance(&f.env, &f.native_asset, &f.contract), 500);

    let paid = f.client.pull_dividend_payment(&a, &index);
    assert_eq!(paid, 500);
    assert_eq!(balance(&f.env, &f.native_asset, &a), 500);
}

// ── withholding ───────────────────────────────────────────────

#[test]
fn set_withholding_validates_inputs() {
    let f = setup();
    let a = Address::generate(&f.env);
    let b = Address::generate(&f.env);
    let c = Address::generate(&f.env);

    let investors = Vec::from_array(&f.env, [a.clone(), b.clone(), c.clone()]);
    let rates = Vec::from_array(&f.env, [TEN_PERCENT, TEN_PERCENT]);
    assert_eq!(
        f.client.try_set_withholding(&f.owner, &investors, &rates),
        Err(Ok(DividendCheckpointError::MismatchedLengths))
    );

    let rates = Vec::from_array(&f.env, [TEN_PERCENT, 0, WITHHOLDING_PRECISION + 1]);
    assert_eq!(
        f.client.try_set_withholding(&f.owner, &investors, &rates),
        Err(Ok(DividendCheckpointError::InvalidWithholding))
    );
    assert_eq!(f.client.withholding_tax(&a), 0);

    let rates = Vec::from_array(&f.env, [TEN_PERCENT, 0, WITHHOLDING_PRECISION]);
    f.client.set_withholding(&f.owner, &investors, &rates);
    assert_eq!(f.client.withholding_tax(&a), TEN_PERCENT);
    assert_eq!(f.client.withholding_tax(&b), 0);
    assert_eq!(f.client.withholding_tax(&c), WITHHOLDING_PRECISION);
}

#[test]
fn set_withholding_fixed_applies_one_rate() {
    let f = setup();
    let a = Address::generate(&f.env);
    let b = Address::generate(&f.env);
    let investors = Vec::from_array(&f.env, [a.clone(), b.clone()]);

    f.client
        .set_withholding_fixed(&f.owner, &investors, &(TEN_PERCENT * 2));
    assert_eq!(f.client.withholding_tax(&a), TEN_PERCENT * 2);
    assert_eq!(f.client.withholding_tax(&b), TEN_PERCENT * 2);

    assert_eq!(
        f.client.try_set_withholding_fixed(&f.owner, &investors, &-1),
        Err(Ok(DividendCheckpointError::InvalidWithholding))
    );
}

// ── claims ────────────────────────────────────────────────────

#[test]
fn pull_pays_pro_rata_net_of_withholding() {
    let f = setup();
    let investor = holder(&f, 10_000);
    holder(&f, 90_000);
    f.client.set_withholding_fixed(
        &f.owner,
        &Vec::from_array(&f.env, [investor.clone()]),
        &TEN_PERCENT,
    );
    let index = token_dividend(&f, 1_000);

    assert_eq!(f.client.calculate_dividend(&index, &investor), (100, 10));
    let paid = f.client.pull_dividend_payment(&investor, &index);
    assert_eq!(paid, 90);
    assert_eq!(balance(&f.env, &f.payment_token, &investor), 90);
    assert!(f.client.is_claimed(&investor, &index));

    let dividend = f.client.dividend(&index);
    assert_eq!(dividend.claimed_amount, 100);
    assert_eq!(dividend.total_withheld, 10);

    // The calculation does not depend on claim state.
    assert_eq!(f.client.calculate_dividend(&index, &investor), (100, 10));
}

#[test]
fn pull_twice_fails() {
    let f = setup();
    let investor = holder(&f, 100);
    let index = token_dividend(&f, 1_000);

    f.client.pull_dividend_payment(&investor, &index);
    assert_eq!(
        f.client.try_pull_dividend_payment(&investor, &index),
        Err(Ok(DividendCheckpointError::AlreadyClaimed))
    );
    assert_eq!(balance(&f.env, &f.payment_token, &investor), 1_000);
}

#[test]
fn excluded_investor_cannot_pull() {
    let f = setup();
    let a = holder(&f, 100);
    holder(&f, 100);
    f.client
        .set_default_excluded(&f.owner, &Vec::from_array(&f.env, [a.clone()]));
    let index = token_dividend(&f, 1_000);

    assert_eq!(
        f.client.try_pull_dividend_payment(&a, &index),
        Err(Ok(DividendCheckpointError::AddressExcluded))
    );
}

#[test]
fn pull_respects_maturity_and_expiry() {
    let f = setup();
    let investor = holder(&f, 100);
    let index = f.client.create_dividend(
        &f.owner,
        &DividendKind::Token(f.payment_token.clone()),
        &1_500,
        &2_000,
        &100,
        &name(&f.env, "later"),
    );

    assert_eq!(
        f.client.try_pull_dividend_payment(&investor, &index),
        Err(Ok(DividendCheckpointError::MaturityInFuture))
    );
    set_time(&f.env, 2_000);
    assert_eq!(
        f.client.try_pull_dividend_payment(&investor, &index),
        Err(Ok(DividendCheckpointError::DividendExpired))
    );
    set_time(&f.env, 1_999);
    assert_eq!(f.client.pull_dividend_payment(&investor, &index), 100);
}

#[test]
fn pull_unknown_dividend_fails() {
    let f = setup();
    let investor = holder(&f, 100);
    assert_eq!(
        f.client.try_pull_dividend_payment(&investor, &0),
        Err(Ok(DividendCheckpointError::InvalidDividend))
    );
}

#[test]
fn push_pays_holder_range_and_skips_claimed_and_excluded() {
    let f = setup();
    let a = holder(&f, 100);
    let b = holder(&f, 100);
    let c = holder(&f, 100);
    let d = holder(&f, 100);
    f.client
        .set_default_excluded(&f.owner, &Vec::from_array(&f.env, [c.clone()]));
    let index = token_dividend(&f, 300);
    f.client.pull_dividend_payment(&a, &index);

    let paid = f.client.push_dividend_payment(&f.owner, &index, &0, &3);
    assert_eq!(paid, 1);
    assert!(f.client.is_claimed(&b, &index));
    assert!(!f.client.is_claimed(&c, &index));
    assert!(!f.client.is_claimed(&d, &index));

    let paid = f.client.push_dividend_payment(&f.owner, &index, &3, &10);
    assert_eq!(paid, 1);
    assert!(f.client.is_claimed(&d, &index));

    // Past the end of the holder list nothing happens.
    assert_eq!(f.client.push_dividend_payment(&f.owner, &index, &10, &5), 0);

    for who in [a, b, d] {
        assert_eq!(balance(&f.env, &f.payment_token, &who), 100);
    }
    assert_eq!(f.client.dividend(&index).claimed_amount, 300);
}

#[test]
fn push_to_addresses_pays_listed_payees() {
    let f = setup();
    let a = holder(&f, 100);
    let b = holder(&f, 300);
    let index = token_dividend(&f, 400);

    let paid = f
        .client
        .push_payment_to_addresses(&f.owner, &index, &Vec::from_array(&f.env, [b.clone()]));
    assert_eq!(paid, 1);
    assert_eq!(balance(&f.env, &f.payment_token, &b), 300);
    assert!(!f.client.is_claimed(&a, &index));

    // Already-paid payees are skipped.
    let paid = f.client.push_payment_to_addresses(
        &f.owner,
        &index,
        &Vec::from_array(&f.env, [a.clone(), b.clone()]),
    );
    assert_eq!(paid, 1);
    assert_eq!(balance(&f.env, &f.payment_token, &a), 100);
    assert_eq!(balance(&f.env, &f.payment_token, &b), 300);
}

#[test]
fn push_to_zero_address_fails() {
    let f = setup();
    holder(&f, 100);
    let index = token_dividend(&f, 100);
    let zero = Address::from_string(&String::from_str(&f.env, ZERO_ACCOUNT));
    assert_eq!(
        f.client
            .try_push_payment_to_addresses(&f.owner, &index, &Vec::from_array(&f.env, [zero])),
        Err(Ok(DividendCheckpointError::ZeroAddress))
    );
}

// ── reclaim and withholding withdrawal ────────────────────────

#[test]
fn reclaim_after_expiry_sends_residual_to_wallet_once() {
    let f = setup();
    let investor = holder(&f, 10_000);
    holder(&f, 90_000);
    let index = token_dividend(&f, 1_000);
    f.client.pull_dividend_payment(&investor, &index);

    assert_eq!(
        f.client.try_reclaim_dividend(&f.owner, &index),
        Err(Ok(DividendCheckpointError::ExpiryInFuture))
    );

    set_time(&f.env, 2_000);
    assert_eq!(f.client.reclaim_dividend(&f.owner, &index), 900);
    assert_eq!(balance(&f.env, &f.payment_token, &f.wallet), 900);
    assert!(f.client.dividend(&index).reclaimed);

    assert_eq!(
        f.client.try_reclaim_dividend(&f.owner, &index),
        Err(Ok(DividendCheckpointError::DividendReclaimed))
    );
    assert_eq!(balance(&f.env, &f.payment_token, &f.wallet), 900);
}

#[test]
fn payments_after_reclaim_fail() {
    let f = setup();
    let investor = holder(&f, 100);
    let index = token_dividend(&f, 100);
    set_time(&f.env, 2_000);
    f.client.reclaim_dividend(&f.owner, &index);

    // Reopen the window; the reclaimed flag still blocks payment.
    set_time(&f.env, 1_500);
    assert_eq!(
        f.client.try_pull_dividend_payment(&investor, &index),
        Err(Ok(DividendCheckpointError::DividendReclaimed))
    );
}

#[test]
fn withdraw_withholding_moves_tax_to_wallet() {
    let f = setup();
    let investor = holder(&f, 100);
    f.client.set_withholding_fixed(
        &f.owner,
        &Vec::from_array(&f.env, [investor.clone()]),
        &(TEN_PERCENT * 3),
    );
    let index = token_dividend(&f, 1_000);
    assert_eq!(f.client.pull_dividend_payment(&investor, &index), 700);

    assert_eq!(f.client.withdraw_withholding(&f.owner, &index), 300);
    assert_eq!(balance(&f.env, &f.payment_token, &f.wallet), 300);
    assert_eq!(f.client.withdraw_withholding(&f.owner, &index), 0);
    assert_eq!(f.client.dividend(&index).total_withheld_withdrawn, 300);
}

#[test]
fn funds_are_conserved_across_claims_tax_and_reclaim() {
    let f = setup();
    let a = holder(&f, 333);
    let b = holder(&f, 333);
    let c = holder(&f, 334);
    f.client.set_withholding_fixed(
        &f.owner,
        &Vec::from_array(&f.env, [a.clone(), b.clone()]),
        &(TEN_PERCENT * 2 + 7),
    );
    let index = token_dividend(&f, 1_001);
    f.client.pull_dividend_payment(&a, &index);
    f.client.pull_dividend_payment(&b, &index);

    set_time(&f.env, 2_000);
    f.client.reclaim_dividend(&f.owner, &index);
    f.client.withdraw_withholding(&f.owner, &index);

    let paid = balance(&f.env, &f.payment_token, &a)
        + balance(&f.env, &f.payment_token, &b)
        + balance(&f.env, &f.payment_token, &c);
    let to_wallet = balance(&f.env, &f.payment_token, &f.wallet);
    assert_eq!(paid + to_wallet, 1_001);
    assert_eq!(balance(&f.env, &f.payment_token, &f.contract), 0);
}

// ── issuer configuration ──────────────────────────────────────

#[test]
fn update_dividend_dates_moves_window() {
    let f = setup();
    let investor = holder(&f, 100);
    let index = token_dividend(&f, 100);

    assert_eq!(
        f.client.try_update_dividend_dates(&f.owner, &index, &3_000, &3_000),
        Err(Ok(DividendCheckpointError::InvalidDates))
    );
    f.client
        .update_dividend_dates(&f.owner, &index, &1_500, &3_000);
    let dividend = f.client.dividend(&index);
    assert_eq!((dividend.maturity, dividend.expiry), (1_500, 3_000));

    assert_eq!(
        f.client.try_pull_dividend_payment(&investor, &index),
        Err(Ok(DividendCheckpointError::MaturityInFuture))
    );
}

#[test]
fn update_dates_after_reclaim_fails() {
    let f = setup();
    holder(&f, 100);
    let index = token_dividend(&f, 100);
    set_time(&f.env, 2_000);
    f.client.reclaim_dividend(&f.owner, &index);
    assert_eq!(
        f.client.try_update_dividend_dates(&f.owner, &index, &3_000, &4_000),
        Err(Ok(DividendCheckpointError::DividendReclaimed))
    );
}

#[test]
fn change_wallet_redirects_reclaim() {
    let f = setup();
    holder(&f, 100);
    let index = token_dividend(&f, 100);
    let new_wallet = Address::generate(&f.env);

    f.client.change_wallet(&f.owner, &new_wallet);
    assert_eq!(f.client.wallet(), new_wallet);

    set_time(&f.env, 2_000);
    f.client.reclaim_dividend(&f.owner, &index);
    assert_eq!(balance(&f.env, &f.payment_token, &new_wallet), 100);
    assert_eq!(balance(&f.env, &f.payment_token, &f.wallet), 0);

    let zero = Address::from_string(&String::from_str(&f.env, ZERO_ACCOUNT));
    assert_eq!(
        f.client.try_change_wallet(&f.owner, &zero),
        Err(Ok(DividendCheckpointError::ZeroAddress))
    );
}

#[test]
fn pause_blocks_payments_until_unpaused() {
    let f = setup();
    let investor = holder(&f, 100);
    let index = token_dividend(&f, 100);

    f.client.pause(&f.owner);
    assert!(f.client.paused());
    assert_eq!(f.client.try_pause(&f.owner), Err(Ok(DividendCheckpointError::AlreadyPaused)));
    assert_eq!(
        f.client.try_pull_dividend_payment(&investor, &index),
        Err(Ok(DividendCheckpointError::ContractPaused))
    );
    assert_eq!(
        f.client.try_push_dividend_payment(&f.owner, &index, &0, &10),
        Err(Ok(DividendCheckpointError::ContractPaused))
    );

    f.client.unpause(&f.owner);
    assert_eq!(f.client.try_unpause(&f.owner), Err(Ok(DividendCheckpointError::NotPaused)));
    assert_eq!(f.client.pull_dividend_payment(&investor, &index), 100);
}

// ── views ─────────────────────────────────────────────────────

#[test]
fn dividend_progress_reports_every_holder() {
    let f = setup();
    let a = holder(&f, 200);
    let b = holder(&f, 300);
    let c = holder(&f, 500);
    f.client
        .set_default_excluded(&f.owner, &Vec::from_array(&f.env, [c.clone()]));
    f.client.set_withholding_fixed(
        &f.owner,
        &Vec::from_array(&f.env, [b.clone()]),
        &TEN_PERCENT,
    );
    let index = token_dividend(&f, 1_000);
    f.client.pull_dividend_payment(&a, &index);

    let rows = f.client.dividend_progress(&index);
    assert_eq!(rows.len(), 3);

    let row_a = rows.get(0).unwrap();
    assert_eq!(row_a.investor, a);
    assert!(row_a.claimed);
    assert_eq!((row_a.claim, row_a.withheld, row_a.balance), (400, 0, 200));

    let row_b = rows.get(1).unwrap();
    assert!(!row_b.claimed);
    assert_eq!((row_b.claim, row_b.withheld), (600, 60));

    let row_c = rows.get(2).unwrap();
    assert!(row_c.excluded);
    assert_eq!((row_c.claim, row_c.withheld, row_c.balance), (0, 0, 500));
}

#[test]
fn checkpoint_data_lists_balances_and_rates() {
    let f = setup();
    let a = holder(&f, 200);
    let b = holder(&f, 300);
    f.client.set_withholding_fixed(
        &f.owner,
        &Vec::from_array(&f.env, [b.clone()]),
        &TEN_PERCENT,
    );
    f.client.create_checkpoint(&f.owner);
    f.client.transfer(&a, &b, &200);

    let rows = f.client.checkpoint_data(&1);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows.get(0).unwrap().balance, 200);
    assert_eq!(rows.get(1).unwrap().balance, 300);
    assert_eq!(rows.get(1).unwrap().withholding, TEN_PERCENT);

    assert_eq!(
        f.client.try_checkpoint_data(&2),
        Err(Ok(DividendCheckpointError::InvalidCheckpoint))
    );
}

#[test]
fn dividend_index_groups_by_checkpoint() {
    let f = setup();
    holder(&f, 100);
    f.client.create_checkpoint(&f.owner);
    let kind = DividendKind::Token(f.payment_token.clone());
    f.client
        .create_with_checkpoint(&f.owner, &kind, &1_000, &2_000, &10, &1, &name(&f.env, "a"));
    f.client
        .create_with_checkpoint(&f.owner, &kind, &1_000, &2_000, &10, &1, &name(&f.env, "b"));
    token_dividend(&f, 10);

    let on_first = f.client.dividend_index(&1);
    assert_eq!(on_first, Vec::from_array(&f.env, [0u32, 1u32]));
    assert_eq!(f.client.dividend_index(&2), Vec::from_array(&f.env, [2u32]));
    assert_eq!(f.client.dividends().len(), 3);
}

#[test]
fn permissions_are_granted_and_revoked() {
    let f = setup();
    let delegate = Address::generate(&f.env);
    assert!(f.client.has_permission(&f.owner, &Permission::Admin));
    assert!(!f.client.has_permission(&delegate, &Permission::Operator));

    f.client
        .grant_permission(&f.owner, &delegate, &Permission::Operator);
    assert!(f.client.has_permission(&delegate, &Permission::Operator));
    assert!(!f.client.has_permission(&delegate, &Permission::Admin));

    f.client
        .revoke_permission(&f.owner, &delegate, &Permission::Operator);
    assert!(!f.client.has_permission(&delegate, &Permission::Operator));
}
