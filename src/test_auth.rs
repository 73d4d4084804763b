#![cfg(test)]
use soroban_sdk::{testutils::Address as _, token, Address, Env, String as SdkString, Vec};

use crate::{
    DividendCheckpoint, DividendCheckpointClient, DividendCheckpointError, DividendKind,
    Permission,
};

fn make_client(env: &Env) -> DividendCheckpointClient<'_> {
    let id = env.register_contract(None, DividendCheckpoint);
    DividendCheckpointClient::new(env, &id)
}

/// Initialize with a fresh owner and wallet; returns (owner, payment token).
fn init_owner(env: &Env, client: &DividendCheckpointClient) -> (Address, Address) {
    let owner = Address::generate(env);
    let wallet = Address::generate(env);
    let asset_admin = Address::generate(env);
    let payment_token = env
        .register_stellar_asset_contract_v2(asset_admin)
        .address();
    client.initialize(&owner, &wallet, &payment_token);
    (owner, payment_token)
}

/// Mint shares, fund and approve the owner, and create one open dividend.
fn setup_dividend(env: &Env, client: &DividendCheckpointClient) -> (Address, Address, Address) {
    env.mock_all_auths();
    let (owner, payment_token) = init_owner(env, client);
    let investor = Address::generate(env);
    client.mint(&owner, &investor, &1_000);
    token::StellarAssetClient::new(env, &payment_token).mint(&owner, &10_000);
    token::Client::new(env, &payment_token).approve(&owner, &client.address, &10_000, &1_000);
    client.create_dividend(
        &owner,
        &DividendKind::Token(payment_token.clone()),
        &0,
        &100,
        &1_000,
        &SdkString::from_str(env, "auth"),
    );
    (owner, investor, payment_token)
}

fn delegate_with(
    env: &Env,
    client: &DividendCheckpointClient,
    owner: &Address,
    permission: Permission,
) -> Address {
    let delegate = Address::generate(env);
    client.grant_permission(owner, &delegate, &permission);
    delegate
}

#[test]
fn mint_missing_auth_no_mutation() {
    let env = Env::default();
    let client = make_client(&env);
    let (owner, _token) = init_owner(&env, &client);
    let holder = Address::generate(&env);
    assert!(client.try_mint(&owner, &holder, &100).is_err());
    assert_eq!(client.balance(&holder), 0);
    assert_eq!(client.total_supply(), 0);
}

#[test]
fn mint_wrong_caller_no_mutation() {
    let env = Env::default();
    env.mock_all_auths();
    let client = make_client(&env);
    let (_owner, _token) = init_owner(&env, &client);
    let attacker = Address::generate(&env);
    assert_eq!(
        client.try_mint(&attacker, &attacker, &100),
        Err(Ok(DividendCheckpointError::NotAuthorized))
    );
    assert_eq!(client.balance(&attacker), 0);
}

#[test]
fn transfer_missing_auth_no_mutation() {
    let env = Env::default();
    let client = make_client(&env);
    let (_owner, investor, _token) = setup_dividend(&env, &client);
    let other = Address::generate(&env);
    env.set_auths(&[]);
    assert!(client.try_transfer(&investor, &other, &10).is_err());
    assert_eq!(client.balance(&investor), 1_000);
}

#[test]
fn grant_permission_wrong_caller_no_mutation() {
    let env = Env::default();
    env.mock_all_auths();
    let client = make_client(&env);
    let (_owner, _token) = init_owner(&env, &client);
    let attacker = Address::generate(&env);
    assert_eq!(
        client.try_grant_permission(&attacker, &attacker, &Permission::Admin),
        Err(Ok(DividendCheckpointError::NotAuthorized))
    );
    assert!(!client.has_permission(&attacker, &Permission::Admin));
}

#[test]
fn create_checkpoint_requires_admin() {
    let env = Env::default();
    env.mock_all_auths();
    let client = make_client(&env);
    let (owner, _token) = init_owner(&env, &client);
    let operator = delegate_with(&env, &client, &owner, Permission::Operator);
    let admin = delegate_with(&env, &client, &owner, Permission::Admin);

    assert_eq!(
        client.try_create_checkpoint(&operator),
        Err(Ok(DividendCheckpointError::NotAuthorized))
    );
    assert_eq!(client.current_checkpoint_id(), 0);
    assert_eq!(client.create_checkpoint(&admin), 1);
}

#[test]
fn set_default_excluded_requires_admin() {
    let env = Env::default();
    env.mock_all_auths();
    let client = make_client(&env);
    let (owner, _token) = init_owner(&env, &client);
    let operator = delegate_with(&env, &client, &owner, Permission::Operator);
    let excluded = Vec::from_array(&env, [Address::generate(&env)]);

    assert!(client.try_set_default_excluded(&operator, &excluded).is_err());
    assert_eq!(client.default_excluded().len(), 0);

    let admin = delegate_with(&env, &client, &owner, Permission::Admin);
    client.set_default_excluded(&admin, &excluded);
    assert_eq!(client.default_excluded(), excluded);
}

#[test]
fn set_withholding_wrong_caller_no_mutation() {
    let env = Env::default();
    env.mock_all_auths();
    let client = make_client(&env);
    let (_owner, _token) = init_owner(&env, &client);
    let attacker = Address::generate(&env);
    let investors = Vec::from_array(&env, [attacker.clone()]);
    assert!(client
        .try_set_withholding_fixed(&attacker, &investors, &0)
        .is_err());
    assert!(client
        .try_set_withholding(&attacker, &investors, &Vec::from_array(&env, [1i128]))
        .is_err());
    assert_eq!(client.withholding_tax(&attacker), 0);
}

#[test]
fn create_dividend_wrong_caller_no_mutation() {
    let env = Env::default();
    env.mock_all_auths();
    let client = make_client(&env);
    let (_owner, _investor, payment_token) = setup_dividend(&env, &client);
    let attacker = Address::generate(&env);
    assert_eq!(
        client.try_create_dividend(
            &attacker,
            &DividendKind::Token(payment_token),
            &0,
            &100,
            &1,
            &SdkString::from_str(&env, "x"),
        ),
        Err(Ok(DividendCheckpointError::NotAuthorized))
    );
    assert_eq!(client.dividend_count(), 1);
}

#[test]
fn operator_can_create_and_push() {
    let env = Env::default();
    let client = make_client(&env);
    let (owner, investor, payment_token) = setup_dividend(&env, &client);
    let operator = delegate_with(&env, &client, &owner, Permission::Operator);
    token::StellarAssetClient::new(&env, &payment_token).mint(&operator, &500);
    token::Client::new(&env, &payment_token).approve(&operator, &client.address, &500, &1_000);

    let index = client.create_dividend(
        &operator,
        &DividendKind::Token(payment_token.clone()),
        &0,
        &100,
        &500,
        &SdkString::from_str(&env, "op"),
    );
    assert_eq!(client.push_dividend_payment(&operator, &index, &0, &10), 1);
    assert!(client.is_claimed(&investor, &index));
}

#[test]
fn push_requires_operator() {
    let env = Env::default();
    let client = make_client(&env);
    let (owner, investor, _token) = setup_dividend(&env, &client);
    let admin = delegate_with(&env, &client, &owner, Permission::Admin);

    assert_eq!(
        client.try_push_dividend_payment(&admin, &0, &0, &10),
        Err(Ok(DividendCheckpointError::NotAuthorized))
    );
    assert!(client
        .try_push_payment_to_addresses(&admin, &0, &Vec::from_array(&env, [investor.clone()]))
        .is_err());
    assert!(!client.is_claimed(&investor, &0));
}

#[test]
fn reclaim_and_withdraw_require_operator() {
    let env = Env::default();
    let client = make_client(&env);
    let (owner, _investor, _token) = setup_dividend(&env, &client);
    let admin = delegate_with(&env, &client, &owner, Permission::Admin);

    assert_eq!(
        client.try_withdraw_withholding(&admin, &0),
        Err(Ok(DividendCheckpointError::NotAuthorized))
    );
    assert_eq!(
        client.try_reclaim_dividend(&admin, &0),
        Err(Ok(DividendCheckpointError::NotAuthorized))
    );
    assert!(!client.dividend(&0).reclaimed);
}

#[test]
fn revoked_operator_loses_access() {
    let env = Env::default();
    let client = make_client(&env);
    let (owner, _investor, _token) = setup_dividend(&env, &client);
    let operator = delegate_with(&env, &client, &owner, Permission::Operator);
    client.revoke_permission(&owner, &operator, &Permission::Operator);

    assert_eq!(
        client.try_push_dividend_payment(&operator, &0, &0, &10),
        Err(Ok(DividendCheckpointError::NotAuthorized))
    );
}

#[test]
fn pause_wrong_caller_no_mutation() {
    let env = Env::default();
    let client = make_client(&env);
    let (owner, _investor, _token) = setup_dividend(&env, &client);
    let operator = delegate_with(&env, &client, &owner, Permission::Operator);
    assert!(client.try_pause(&operator).is_err());
    assert!(!client.paused());
    client.pause(&owner);
    assert!(client.try_unpause(&operator).is_err());
    assert!(client.paused());
}

#[test]
fn update_dates_and_wallet_wrong_caller_no_mutation() {
    let env = Env::default();
    let client = make_client(&env);
    let (owner, _investor, _token) = setup_dividend(&env, &client);
    let admin = delegate_with(&env, &client, &owner, Permission::Admin);
    let wallet = client.wallet();

    assert!(client
        .try_update_dividend_dates(&admin, &0, &10, &20)
        .is_err());
    assert_eq!(client.dividend(&0).expiry, 100);
    assert!(client.try_change_wallet(&admin, &admin).is_err());
    assert_eq!(client.wallet(), wallet);
}
