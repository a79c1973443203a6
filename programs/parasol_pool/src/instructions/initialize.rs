// programs/parasol_pool/src/instructions/initialize.rs
//
// Registrar-Only Surface
// ======================
// The registrar config PDA co-signs every instruction in this file: pool
// creation at deploy time, insurance registration when a purchase lands,
// and allowlist management for approvers and arbitrable proxies.

use crate::errors::PoolError;
use crate::events::{InsuranceRegistered, PoolInitialized, TrustedPartySet};
use crate::state::{InsurancePolicy, Pool, TrustedParty};
use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};
use parasol_core::{Node, BPS_DENOMINATOR};
use parasol_masterchef::state::Masterchef;

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct InitializePoolParams {
    pub node: Node,
    pub expiration: i64,
    pub withdrawal_fee_bps: u16,
    pub instant_reward_bps: u16,
}

#[derive(Accounts)]
#[instruction(params: InitializePoolParams)]
pub struct InitializePool<'info> {
    #[account(
        init,
        payer = payer,
        space = 8 + Pool::INIT_SPACE,
        seeds = [Pool::SEED_PREFIX, registrar.key().as_ref(), params.node.as_ref()],
        bump
    )]
    pub pool: Account<'info, Pool>,

    #[account(
        init,
        payer = payer,
        seeds = [Pool::VAULT_SEED, pool.key().as_ref()],
        bump,
        token::mint = asset_mint,
        token::authority = pool,
    )]
    pub vault: Account<'info, TokenAccount>,

    /// CHECK: node owner recorded on the pool
    pub owner: UncheckedAccount<'info>,

    /// Registrar config PDA signing the deploy CPI; baked into the pool
    /// address so nobody can squat a node's pool
    pub registrar: Signer<'info>,

    pub asset_mint: Account<'info, Mint>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn initialize_pool(ctx: Context<InitializePool>, params: InitializePoolParams) -> Result<()> {
    let clock = Clock::get()?;

    require!(
        params.expiration > clock.unix_timestamp,
        PoolError::ExpirationInPast
    );
    require!(
        (params.withdrawal_fee_bps as u64) < BPS_DENOMINATOR,
        PoolError::InvalidFeeConfiguration
    );
    require!(
        (params.instant_reward_bps as u64) <= BPS_DENOMINATOR,
        PoolError::InvalidFeeConfiguration
    );

    let pool_key = ctx.accounts.pool.key();
    let pool = &mut ctx.accounts.pool;
    pool.node = params.node;
    pool.owner = ctx.accounts.owner.key();
    pool.registrar = ctx.accounts.registrar.key();
    pool.asset_mint = ctx.accounts.asset_mint.key();
    pool.vault = ctx.accounts.vault.key();
    pool.masterchef =
        Pubkey::find_program_address(&[Masterchef::SEED_PREFIX, pool_key.as_ref()], &parasol_masterchef::ID).0;
    pool.total_shares = 0;
    pool.expiration = params.expiration;
    pool.withdrawal_fee_bps = params.withdrawal_fee_bps;
    pool.instant_reward_bps = params.instant_reward_bps;
    pool.total_deposited = 0;
    pool.total_claimed = 0;
    pool.next_dispute_id = 1;
    pool.bump = ctx.bumps.pool;

    emit!(PoolInitialized {
        node: pool.node,
        owner: pool.owner,
        asset_mint: pool.asset_mint,
        expiration: pool.expiration,
        withdrawal_fee_bps: pool.withdrawal_fee_bps,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct RegisterInsuranceParams {
    pub node: Node,
    pub buyer: Pubkey,
    pub price: u64,
    pub expiration: i64,
}

/// Record a purchased insurance against the pool so claims can be gated
/// on it. Re-registering a node replaces the previous policy (buying a
/// fresh insurance on an expired node).
#[derive(Accounts)]
#[instruction(params: RegisterInsuranceParams)]
pub struct RegisterInsurance<'info> {
    #[account(
        seeds = [Pool::SEED_PREFIX, pool.registrar.as_ref(), pool.node.as_ref()],
        bump = pool.bump,
    )]
    pub pool: Account<'info, Pool>,

    #[account(
        init_if_needed,
        payer = payer,
        space = 8 + InsurancePolicy::INIT_SPACE,
        seeds = [InsurancePolicy::SEED_PREFIX, pool.key().as_ref(), params.node.as_ref()],
        bump
    )]
    pub policy: Account<'info, InsurancePolicy>,

    #[account(
        constraint = registrar.key() == pool.registrar @ PoolError::Unauthorised
    )]
    pub registrar: Signer<'info>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn register_insurance(
    ctx: Context<RegisterInsurance>,
    params: RegisterInsuranceParams,
) -> Result<()> {
    let clock = Clock::get()?;
    require!(
        params.expiration > clock.unix_timestamp,
        PoolError::ExpirationInPast
    );

    let policy = &mut ctx.accounts.policy;
    policy.node = params.node;
    policy.buyer = params.buyer;
    policy.price = params.price;
    policy.expiration = params.expiration;
    policy.active = true;
    policy.bump = ctx.bumps.policy;

    emit!(InsuranceRegistered {
        node: params.node,
        buyer: params.buyer,
        price: params.price,
        expiration: params.expiration,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct SetTrustedPartyParams {
    pub party: Pubkey,
    pub enabled: bool,
}

/// Flip an approver / arbitrable proxy on the pool's allowlist.
#[derive(Accounts)]
#[instruction(params: SetTrustedPartyParams)]
pub struct SetTrustedParty<'info> {
    #[account(
        seeds = [Pool::SEED_PREFIX, pool.registrar.as_ref(), pool.node.as_ref()],
        bump = pool.bump,
    )]
    pub pool: Account<'info, Pool>,

    #[account(
        init_if_needed,
        payer = payer,
        space = 8 + TrustedParty::INIT_SPACE,
        seeds = [TrustedParty::SEED_PREFIX, pool.key().as_ref(), params.party.as_ref()],
        bump
    )]
    pub trusted: Account<'info, TrustedParty>,

    #[account(
        constraint = registrar.key() == pool.registrar @ PoolError::Unauthorised
    )]
    pub registrar: Signer<'info>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn set_trusted_party(ctx: Context<SetTrustedParty>, params: SetTrustedPartyParams) -> Result<()> {
    let clock = Clock::get()?;

    let trusted = &mut ctx.accounts.trusted;
    trusted.party = params.party;
    trusted.enabled = params.enabled;
    trusted.bump = ctx.bumps.trusted;

    emit!(TrustedPartySet {
        party: params.party,
        enabled: params.enabled,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
