// programs/parasol_masterchef/src/instructions/rewards.rs

use crate::errors::MasterchefError;
use crate::events::{RewardHarvested, RewardNotified};
use crate::instructions::shares::transfer_from_vault;
use crate::state::{InvestorAccount, InvestorDebt, Masterchef, RewardState};
use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

/// Credit an instant-reward slice to the investor ledger. The registrar
/// has already moved the tokens into the reward vault; this only advances
/// the accumulator. Rejected when no shares exist (the registrar routes
/// the whole slice to the pool in that case).
#[derive(Accounts)]
pub struct NotifyReward<'info> {
    #[account(
        seeds = [Masterchef::SEED_PREFIX, masterchef.pool.as_ref()],
        bump = masterchef.bump,
    )]
    pub masterchef: Account<'info, Masterchef>,

    #[account(
        mut,
        seeds = [
            RewardState::SEED_PREFIX,
            masterchef.key().as_ref(),
            masterchef.asset_mint.as_ref()
        ],
        bump = reward_state.bump,
    )]
    pub reward_state: Account<'info, RewardState>,

    /// Registrar config PDA signing the CPI
    #[account(
        constraint = registrar_authority.key() == masterchef.registrar @ MasterchefError::Unauthorised
    )]
    pub registrar_authority: Signer<'info>,
}

pub fn notify_reward(ctx: Context<NotifyReward>, amount: u64) -> Result<()> {
    require!(amount > 0, MasterchefError::ZeroAmount);

    let clock = Clock::get()?;
    let masterchef = &ctx.accounts.masterchef;
    require!(
        masterchef.total_shares > 0,
        MasterchefError::NoSharesOutstanding
    );

    let reward_state = &mut ctx.accounts.reward_state;
    reward_state.notify(amount, masterchef.total_shares);

    emit!(RewardNotified {
        mint: masterchef.asset_mint,
        amount,
        total_shares: masterchef.total_shares,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}

/// Pay out an investor's accrued reward. Permissionless; funds always go
/// to the investor's own token account.
#[derive(Accounts)]
pub struct Harvest<'info> {
    #[account(
        seeds = [Masterchef::SEED_PREFIX, masterchef.pool.as_ref()],
        bump = masterchef.bump,
    )]
    pub masterchef: Account<'info, Masterchef>,

    #[account(
        mut,
        seeds = [
            RewardState::SEED_PREFIX,
            masterchef.key().as_ref(),
            masterchef.asset_mint.as_ref()
        ],
        bump = reward_state.bump,
    )]
    pub reward_state: Account<'info, RewardState>,

    #[account(
        seeds = [InvestorAccount::SEED_PREFIX, masterchef.key().as_ref(), investor.key().as_ref()],
        bump = investor_account.bump,
    )]
    pub investor_account: Account<'info, InvestorAccount>,

    #[account(
        mut,
        seeds = [
            InvestorDebt::SEED_PREFIX,
            masterchef.key().as_ref(),
            masterchef.asset_mint.as_ref(),
            investor.key().as_ref()
        ],
        bump = investor_debt.bump,
    )]
    pub investor_debt: Account<'info, InvestorDebt>,

    #[account(
        mut,
        constraint = reward_vault.key() == masterchef.reward_vault @ MasterchefError::InvalidVault
    )]
    pub reward_vault: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = investor_token_account.mint == masterchef.asset_mint @ MasterchefError::MintMismatch,
        constraint = investor_token_account.owner == investor.key() @ MasterchefError::OwnerMismatch
    )]
    pub investor_token_account: Account<'info, TokenAccount>,

    /// CHECK: the investor whose reward is being paid; payout destination
    /// is constrained to a token account they own
    pub investor: UncheckedAccount<'info>,

    pub token_program: Program<'info, Token>,
}

pub fn harvest(ctx: Context<Harvest>) -> Result<()> {
    let clock = Clock::get()?;
    let reward_state = &mut ctx.accounts.reward_state;
    let investor_debt = &mut ctx.accounts.investor_debt;

    let (payout, settled) =
        reward_state.settle(ctx.accounts.investor_account.shares, investor_debt.debt);
    investor_debt.debt = settled;

    if payout > 0 {
        transfer_from_vault(
            &ctx.accounts.masterchef,
            &ctx.accounts.reward_vault,
            &ctx.accounts.investor_token_account,
            &ctx.accounts.token_program,
            payout,
        )?;
    }

    emit!(RewardHarvested {
        investor: ctx.accounts.investor.key(),
        mint: ctx.accounts.masterchef.asset_mint,
        amount: payout,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
