// programs/parasol_ownership/src/instructions/initialize.rs

use crate::events::OwnershipInitialized;
use crate::state::{HolderAccount, HolderDebt, OwnerRewardState, OwnershipConfig};
use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};
use parasol_core::OWNERSHIP_SUPPLY;

/// Create the ownership ledger for a pool and mint the fixed supply to
/// the deployer. Invoked by the registrar as part of pool deployment.
#[derive(Accounts)]
pub struct InitializeOwnership<'info> {
    #[account(
        init,
        payer = payer,
        space = 8 + OwnershipConfig::INIT_SPACE,
        seeds = [OwnershipConfig::SEED_PREFIX, pool.key().as_ref()],
        bump
    )]
    pub ownership: Account<'info, OwnershipConfig>,

    #[account(
        init,
        payer = payer,
        space = 8 + OwnerRewardState::INIT_SPACE,
        seeds = [
            OwnerRewardState::SEED_PREFIX,
            ownership.key().as_ref(),
            asset_mint.key().as_ref()
        ],
        bump
    )]
    pub reward_state: Account<'info, OwnerRewardState>,

    #[account(
        init,
        payer = payer,
        space = 8 + HolderAccount::INIT_SPACE,
        seeds = [HolderAccount::SEED_PREFIX, ownership.key().as_ref(), initial_holder.key().as_ref()],
        bump
    )]
    pub holder_account: Account<'info, HolderAccount>,

    #[account(
        init,
        payer = payer,
        space = 8 + HolderDebt::INIT_SPACE,
        seeds = [
            HolderDebt::SEED_PREFIX,
            ownership.key().as_ref(),
            asset_mint.key().as_ref(),
            initial_holder.key().as_ref()
        ],
        bump
    )]
    pub holder_debt: Account<'info, HolderDebt>,

    #[account(
        init,
        payer = payer,
        seeds = [OwnershipConfig::VAULT_SEED, ownership.key().as_ref()],
        bump,
        token::mint = asset_mint,
        token::authority = ownership,
    )]
    pub reward_vault: Account<'info, TokenAccount>,

    /// CHECK: the pool PDA this ledger belongs to; validated by the
    /// registrar at deploy time
    pub pool: UncheckedAccount<'info>,

    /// CHECK: wallet receiving the full initial supply
    pub initial_holder: UncheckedAccount<'info>,

    /// Registrar config PDA signing the deploy CPI
    pub registrar: Signer<'info>,

    pub asset_mint: Account<'info, Mint>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn initialize_ownership(ctx: Context<InitializeOwnership>) -> Result<()> {
    let clock = Clock::get()?;
    let ownership = &mut ctx.accounts.ownership;

    ownership.pool = ctx.accounts.pool.key();
    ownership.registrar = ctx.accounts.registrar.key();
    ownership.asset_mint = ctx.accounts.asset_mint.key();
    ownership.reward_vault = ctx.accounts.reward_vault.key();
    ownership.total_supply = OWNERSHIP_SUPPLY;
    ownership.bump = ctx.bumps.ownership;

    let reward_state = &mut ctx.accounts.reward_state;
    reward_state.mint = ctx.accounts.asset_mint.key();
    reward_state.acc_per_share = 0;
    reward_state.total_entitled = 0;
    reward_state.total_harvested = 0;
    reward_state.bump = ctx.bumps.reward_state;

    let holder = &mut ctx.accounts.holder_account;
    holder.owner = ctx.accounts.initial_holder.key();
    holder.balance = OWNERSHIP_SUPPLY;
    holder.bump = ctx.bumps.holder_account;

    let debt = &mut ctx.accounts.holder_debt;
    debt.owner = ctx.accounts.initial_holder.key();
    debt.mint = ctx.accounts.asset_mint.key();
    debt.debt = 0;
    debt.bump = ctx.bumps.holder_debt;

    emit!(OwnershipInitialized {
        pool: ownership.pool,
        initial_holder: holder.owner,
        total_supply: OWNERSHIP_SUPPLY,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
