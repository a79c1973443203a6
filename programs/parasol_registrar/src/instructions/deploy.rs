// programs/parasol_registrar/src/instructions/deploy.rs
//
// Pool Deployment
// ===============
// One transaction wires a node's whole underwriting stack: the pool
// vault, its masterchef mirror and the ownership ledger (full supply to
// the deployer). The registrar config PDA co-signs every CPI and its key
// is baked into the pool address, so only this registrar can deploy the
// canonical pool for a node, exactly once.

use crate::errors::RegistrarError;
use crate::events::{PoolDeployed, TrustedProxySet};
use crate::state::{PoolInfo, RegistrarConfig};
use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token};
use parasol_core::{Node, BPS_DENOMINATOR};

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct DeployPoolParams {
    pub node: Node,
    pub expiration: i64,
    pub owner_share_bps: u16,
    pub withdrawal_fee_bps: u16,
    pub instant_reward_bps: u16,
}

#[derive(Accounts)]
#[instruction(params: DeployPoolParams)]
pub struct DeployPool<'info> {
    #[account(
        mut,
        seeds = [RegistrarConfig::SEED_PREFIX],
        bump = registrar_config.bump,
    )]
    pub registrar_config: Account<'info, RegistrarConfig>,

    #[account(
        init,
        payer = deployer,
        space = 8 + PoolInfo::INIT_SPACE,
        seeds = [PoolInfo::SEED_PREFIX, params.node.as_ref()],
        bump
    )]
    pub pool_info: Account<'info, PoolInfo>,

    pub asset_mint: Account<'info, Mint>,

    /// CHECK: created by the pool program CPI
    #[account(mut)]
    pub pool: UncheckedAccount<'info>,

    /// CHECK: created by the pool program CPI
    #[account(mut)]
    pub pool_vault: UncheckedAccount<'info>,

    /// CHECK: created by the masterchef program CPI
    #[account(mut)]
    pub masterchef: UncheckedAccount<'info>,

    /// CHECK: created by the masterchef program CPI
    #[account(mut)]
    pub masterchef_reward_state: UncheckedAccount<'info>,

    /// CHECK: created by the masterchef program CPI
    #[account(mut)]
    pub masterchef_reward_vault: UncheckedAccount<'info>,

    /// CHECK: created by the ownership program CPI
    #[account(mut)]
    pub ownership: UncheckedAccount<'info>,

    /// CHECK: created by the ownership program CPI
    #[account(mut)]
    pub ownership_reward_state: UncheckedAccount<'info>,

    /// CHECK: created by the ownership program CPI
    #[account(mut)]
    pub ownership_holder: UncheckedAccount<'info>,

    /// CHECK: created by the ownership program CPI
    #[account(mut)]
    pub ownership_holder_debt: UncheckedAccount<'info>,

    /// CHECK: created by the ownership program CPI
    #[account(mut)]
    pub ownership_reward_vault: UncheckedAccount<'info>,

    #[account(mut)]
    pub deployer: Signer<'info>,

    pub pool_program: Program<'info, parasol_pool::program::ParasolPool>,
    pub masterchef_program: Program<'info, parasol_masterchef::program::ParasolMasterchef>,
    pub ownership_program: Program<'info, parasol_ownership::program::ParasolOwnership>,
    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn deploy_pool(ctx: Context<DeployPool>, params: DeployPoolParams) -> Result<()> {
    let clock = Clock::get()?;
    let config = &ctx.accounts.registrar_config;

    require!(
        params.expiration > clock.unix_timestamp,
        RegistrarError::ExpirationInPast
    );
    require!(
        (params.owner_share_bps as u64) + (config.factory_fee_bps as u64) < BPS_DENOMINATOR,
        RegistrarError::InvalidFeeConfiguration
    );
    require!(
        (params.withdrawal_fee_bps as u64) < BPS_DENOMINATOR,
        RegistrarError::InvalidFeeConfiguration
    );
    require!(
        (params.instant_reward_bps as u64) <= BPS_DENOMINATOR,
        RegistrarError::InvalidFeeConfiguration
    );

    let config_bump = config.bump;
    let signer_seeds: &[&[&[u8]]] = &[&[RegistrarConfig::SEED_PREFIX, &[config_bump]]];

    // Pool vault and share ledger
    parasol_pool::cpi::initialize_pool(
        CpiContext::new_with_signer(
            ctx.accounts.pool_program.to_account_info(),
            parasol_pool::cpi::accounts::InitializePool {
                pool: ctx.accounts.pool.to_account_info(),
                vault: ctx.accounts.pool_vault.to_account_info(),
                owner: ctx.accounts.deployer.to_account_info(),
                registrar: ctx.accounts.registrar_config.to_account_info(),
                asset_mint: ctx.accounts.asset_mint.to_account_info(),
                payer: ctx.accounts.deployer.to_account_info(),
                token_program: ctx.accounts.token_program.to_account_info(),
                system_program: ctx.accounts.system_program.to_account_info(),
            },
            signer_seeds,
        ),
        parasol_pool::instructions::InitializePoolParams {
            node: params.node,
            expiration: params.expiration,
            withdrawal_fee_bps: params.withdrawal_fee_bps,
            instant_reward_bps: params.instant_reward_bps,
        },
    )?;

    // Investor reward mirror
    parasol_masterchef::cpi::initialize_masterchef(CpiContext::new_with_signer(
        ctx.accounts.masterchef_program.to_account_info(),
        parasol_masterchef::cpi::accounts::InitializeMasterchef {
            masterchef: ctx.accounts.masterchef.to_account_info(),
            reward_state: ctx.accounts.masterchef_reward_state.to_account_info(),
            reward_vault: ctx.accounts.masterchef_reward_vault.to_account_info(),
            pool: ctx.accounts.pool.to_account_info(),
            registrar: ctx.accounts.registrar_config.to_account_info(),
            asset_mint: ctx.accounts.asset_mint.to_account_info(),
            payer: ctx.accounts.deployer.to_account_info(),
            token_program: ctx.accounts.token_program.to_account_info(),
            system_program: ctx.accounts.system_program.to_account_info(),
        },
        signer_seeds,
    ))?;

    // Owner revenue ledger; full supply to the deployer
    parasol_ownership::cpi::initialize_ownership(CpiContext::new_with_signer(
        ctx.accounts.ownership_program.to_account_info(),
        parasol_ownership::cpi::accounts::InitializeOwnership {
            ownership: ctx.accounts.ownership.to_account_info(),
            reward_state: ctx.accounts.ownership_reward_state.to_account_info(),
            holder_account: ctx.accounts.ownership_holder.to_account_info(),
            holder_debt: ctx.accounts.ownership_holder_debt.to_account_info(),
            reward_vault: ctx.accounts.ownership_reward_vault.to_account_info(),
            pool: ctx.accounts.pool.to_account_info(),
            initial_holder: ctx.accounts.deployer.to_account_info(),
            registrar: ctx.accounts.registrar_config.to_account_info(),
            asset_mint: ctx.accounts.asset_mint.to_account_info(),
            payer: ctx.accounts.deployer.to_account_info(),
            token_program: ctx.accounts.token_program.to_account_info(),
            system_program: ctx.accounts.system_program.to_account_info(),
        },
        signer_seeds,
    ))?;

    let pool_info = &mut ctx.accounts.pool_info;
    pool_info.node = params.node;
    pool_info.owner = ctx.accounts.deployer.key();
    pool_info.pool = ctx.accounts.pool.key();
    pool_info.masterchef = ctx.accounts.masterchef.key();
    pool_info.ownership = ctx.accounts.ownership.key();
    pool_info.asset_mint = ctx.accounts.asset_mint.key();
    pool_info.factory_fee_bps = ctx.accounts.registrar_config.factory_fee_bps;
    pool_info.owner_share_bps = params.owner_share_bps;
    pool_info.instant_reward_bps = params.instant_reward_bps;
    pool_info.expiration = params.expiration;
    pool_info.bump = ctx.bumps.pool_info;

    let config = &mut ctx.accounts.registrar_config;
    config.pools_deployed = config.pools_deployed.saturating_add(1);

    emit!(PoolDeployed {
        node: params.node,
        owner: ctx.accounts.deployer.key(),
        pool: ctx.accounts.pool.key(),
        masterchef: ctx.accounts.masterchef.key(),
        ownership: ctx.accounts.ownership.key(),
        asset_mint: ctx.accounts.asset_mint.key(),
        owner_share_bps: params.owner_share_bps,
        withdrawal_fee_bps: params.withdrawal_fee_bps,
        instant_reward_bps: params.instant_reward_bps,
        expiration: params.expiration,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct SetTrustedProxyParams {
    pub node: Node,
    pub party: Pubkey,
    pub enabled: bool,
}

/// Flip an approver / arbitrable proxy on a pool's allowlist. Only the
/// node owner recorded at deploy may do this.
#[derive(Accounts)]
#[instruction(params: SetTrustedProxyParams)]
pub struct SetTrustedArbitrableProxy<'info> {
    #[account(
        seeds = [RegistrarConfig::SEED_PREFIX],
        bump = registrar_config.bump,
    )]
    pub registrar_config: Account<'info, RegistrarConfig>,

    #[account(
        seeds = [PoolInfo::SEED_PREFIX, params.node.as_ref()],
        bump = pool_info.bump,
        constraint = pool_info.owner == owner.key() @ RegistrarError::Unauthorised
    )]
    pub pool_info: Account<'info, PoolInfo>,

    /// CHECK: the pool PDA, pinned to the deployment record and validated
    /// by the pool program
    #[account(
        constraint = pool.key() == pool_info.pool @ RegistrarError::AccountMismatch
    )]
    pub pool: UncheckedAccount<'info>,

    /// CHECK: allowlist entry, created/updated by the pool program CPI
    #[account(mut)]
    pub trusted: UncheckedAccount<'info>,

    #[account(mut)]
    pub owner: Signer<'info>,

    pub pool_program: Program<'info, parasol_pool::program::ParasolPool>,
    pub system_program: Program<'info, System>,
}

pub fn set_trusted_arbitrable_proxy(
    ctx: Context<SetTrustedArbitrableProxy>,
    params: SetTrustedProxyParams,
) -> Result<()> {
    let clock = Clock::get()?;
    let config_bump = ctx.accounts.registrar_config.bump;
    let signer_seeds: &[&[&[u8]]] = &[&[RegistrarConfig::SEED_PREFIX, &[config_bump]]];

    parasol_pool::cpi::set_trusted_party(
        CpiContext::new_with_signer(
            ctx.accounts.pool_program.to_account_info(),
            parasol_pool::cpi::accounts::SetTrustedParty {
                pool: ctx.accounts.pool.to_account_info(),
                trusted: ctx.accounts.trusted.to_account_info(),
                registrar: ctx.accounts.registrar_config.to_account_info(),
                payer: ctx.accounts.owner.to_account_info(),
                system_program: ctx.accounts.system_program.to_account_info(),
            },
            signer_seeds,
        ),
        parasol_pool::instructions::SetTrustedPartyParams {
            party: params.party,
            enabled: params.enabled,
        },
    )?;

    emit!(TrustedProxySet {
        node: params.node,
        party: params.party,
        enabled: params.enabled,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
