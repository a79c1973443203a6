// programs/parasol_masterchef/src/instructions/initialize.rs

use crate::events::MasterchefInitialized;
use crate::state::{Masterchef, RewardState};
use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

/// Create the masterchef mirror for a pool. Invoked by the registrar as
/// part of pool deployment; the registrar config PDA co-signs and is
/// recorded as the only party allowed to notify rewards.
#[derive(Accounts)]
pub struct InitializeMasterchef<'info> {
    #[account(
        init,
        payer = payer,
        space = 8 + Masterchef::INIT_SPACE,
        seeds = [Masterchef::SEED_PREFIX, pool.key().as_ref()],
        bump
    )]
    pub masterchef: Account<'info, Masterchef>,

    #[account(
        init,
        payer = payer,
        space = 8 + RewardState::INIT_SPACE,
        seeds = [
            RewardState::SEED_PREFIX,
            masterchef.key().as_ref(),
            asset_mint.key().as_ref()
        ],
        bump
    )]
    pub reward_state: Account<'info, RewardState>,

    #[account(
        init,
        payer = payer,
        seeds = [Masterchef::VAULT_SEED, masterchef.key().as_ref()],
        bump,
        token::mint = asset_mint,
        token::authority = masterchef,
    )]
    pub reward_vault: Account<'info, TokenAccount>,

    /// CHECK: the pool PDA this masterchef mirrors; recorded as the share
    /// authority and validated by the registrar at deploy time
    pub pool: UncheckedAccount<'info>,

    /// Registrar config PDA signing the deploy CPI
    pub registrar: Signer<'info>,

    pub asset_mint: Account<'info, Mint>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn initialize_masterchef(ctx: Context<InitializeMasterchef>) -> Result<()> {
    let clock = Clock::get()?;
    let masterchef = &mut ctx.accounts.masterchef;

    masterchef.pool = ctx.accounts.pool.key();
    masterchef.registrar = ctx.accounts.registrar.key();
    masterchef.asset_mint = ctx.accounts.asset_mint.key();
    masterchef.reward_vault = ctx.accounts.reward_vault.key();
    masterchef.total_shares = 0;
    masterchef.bump = ctx.bumps.masterchef;

    let reward_state = &mut ctx.accounts.reward_state;
    reward_state.mint = ctx.accounts.asset_mint.key();
    reward_state.acc_per_share = 0;
    reward_state.total_entitled = 0;
    reward_state.total_harvested = 0;
    reward_state.bump = ctx.bumps.reward_state;

    emit!(MasterchefInitialized {
        pool: masterchef.pool,
        asset_mint: masterchef.asset_mint,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
