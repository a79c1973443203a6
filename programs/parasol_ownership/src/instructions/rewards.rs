// programs/parasol_ownership/src/instructions/rewards.rs

use crate::errors::OwnershipError;
use crate::events::{OwnerRevenueHarvested, OwnerRevenueNotified};
use crate::state::{HolderAccount, HolderDebt, OwnerRewardState, OwnershipConfig};
use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount};

/// Credit the owner slice of a purchase to the ledger. The registrar has
/// already moved the tokens into the reward vault.
#[derive(Accounts)]
pub struct NotifyOwnerRevenue<'info> {
    #[account(
        seeds = [OwnershipConfig::SEED_PREFIX, ownership.pool.as_ref()],
        bump = ownership.bump,
    )]
    pub ownership: Account<'info, OwnershipConfig>,

    #[account(
        mut,
        seeds = [
            OwnerRewardState::SEED_PREFIX,
            ownership.key().as_ref(),
            ownership.asset_mint.as_ref()
        ],
        bump = reward_state.bump,
    )]
    pub reward_state: Account<'info, OwnerRewardState>,

    /// Registrar config PDA signing the CPI
    #[account(
        constraint = registrar_authority.key() == ownership.registrar @ OwnershipError::Unauthorised
    )]
    pub registrar_authority: Signer<'info>,
}

pub fn notify_owner_revenue(ctx: Context<NotifyOwnerRevenue>, amount: u64) -> Result<()> {
    require!(amount > 0, OwnershipError::ZeroAmount);

    let clock = Clock::get()?;
    let ownership = &ctx.accounts.ownership;
    let reward_state = &mut ctx.accounts.reward_state;
    reward_state.notify(amount, ownership.total_supply);

    emit!(OwnerRevenueNotified {
        mint: ownership.asset_mint,
        amount,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}

/// Pay out a holder's accrued revenue. Permissionless; funds always go to
/// a token account the holder owns.
#[derive(Accounts)]
pub struct HarvestOwnerRevenue<'info> {
    #[account(
        seeds = [OwnershipConfig::SEED_PREFIX, ownership.pool.as_ref()],
        bump = ownership.bump,
    )]
    pub ownership: Account<'info, OwnershipConfig>,

    #[account(
        mut,
        seeds = [
            OwnerRewardState::SEED_PREFIX,
            ownership.key().as_ref(),
            ownership.asset_mint.as_ref()
        ],
        bump = reward_state.bump,
    )]
    pub reward_state: Account<'info, OwnerRewardState>,

    #[account(
        seeds = [HolderAccount::SEED_PREFIX, ownership.key().as_ref(), holder.key().as_ref()],
        bump = holder_account.bump,
    )]
    pub holder_account: Account<'info, HolderAccount>,

    #[account(
        mut,
        seeds = [
            HolderDebt::SEED_PREFIX,
            ownership.key().as_ref(),
            ownership.asset_mint.as_ref(),
            holder.key().as_ref()
        ],
        bump = holder_debt.bump,
    )]
    pub holder_debt: Account<'info, HolderDebt>,

    #[account(
        mut,
        constraint = reward_vault.key() == ownership.reward_vault @ OwnershipError::InvalidVault
    )]
    pub reward_vault: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = holder_token_account.mint == ownership.asset_mint @ OwnershipError::MintMismatch,
        constraint = holder_token_account.owner == holder.key() @ OwnershipError::OwnerMismatch
    )]
    pub holder_token_account: Account<'info, TokenAccount>,

    /// CHECK: the holder whose revenue is being paid
    pub holder: UncheckedAccount<'info>,

    pub token_program: Program<'info, Token>,
}

pub fn harvest_owner_revenue(ctx: Context<HarvestOwnerRevenue>) -> Result<()> {
    let clock = Clock::get()?;
    let reward_state = &mut ctx.accounts.reward_state;
    let holder_debt = &mut ctx.accounts.holder_debt;

    let (payout, settled) =
        reward_state.settle(ctx.accounts.holder_account.balance, holder_debt.debt);
    holder_debt.debt = settled;

    if payout > 0 {
        let ownership = &ctx.accounts.ownership;
        let seeds = &[
            OwnershipConfig::SEED_PREFIX,
            ownership.pool.as_ref(),
            &[ownership.bump],
        ];
        let signer_seeds = &[&seeds[..]];

        token::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                token::Transfer {
                    from: ctx.accounts.reward_vault.to_account_info(),
                    to: ctx.accounts.holder_token_account.to_account_info(),
                    authority: ownership.to_account_info(),
                },
                signer_seeds,
            ),
            payout,
        )?;
    }

    emit!(OwnerRevenueHarvested {
        holder: ctx.accounts.holder.key(),
        mint: ctx.accounts.ownership.asset_mint,
        amount: payout,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
