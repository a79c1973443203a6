// programs/parasol_ownership/src/instructions/transfer.rs

use crate::errors::OwnershipError;
use crate::events::UnitsTransferred;
use crate::state::{HolderAccount, HolderDebt, OwnerRewardState, OwnershipConfig};
use anchor_lang::prelude::*;

/// Move ownership units between holders. The debt shift preserves the
/// pending revenue of both sides exactly; no harvest is forced.
#[derive(Accounts)]
pub struct TransferUnits<'info> {
    #[account(
        seeds = [OwnershipConfig::SEED_PREFIX, ownership.pool.as_ref()],
        bump = ownership.bump,
    )]
    pub ownership: Account<'info, OwnershipConfig>,

    #[account(
        seeds = [
            OwnerRewardState::SEED_PREFIX,
            ownership.key().as_ref(),
            ownership.asset_mint.as_ref()
        ],
        bump = reward_state.bump,
    )]
    pub reward_state: Account<'info, OwnerRewardState>,

    #[account(
        mut,
        seeds = [HolderAccount::SEED_PREFIX, ownership.key().as_ref(), sender.key().as_ref()],
        bump = sender_account.bump,
        constraint = sender_account.owner == sender.key() @ OwnershipError::OwnerMismatch
    )]
    pub sender_account: Account<'info, HolderAccount>,

    #[account(
        mut,
        seeds = [
            HolderDebt::SEED_PREFIX,
            ownership.key().as_ref(),
            ownership.asset_mint.as_ref(),
            sender.key().as_ref()
        ],
        bump = sender_debt.bump,
    )]
    pub sender_debt: Account<'info, HolderDebt>,

    #[account(
        init_if_needed,
        payer = sender,
        space = 8 + HolderAccount::INIT_SPACE,
        seeds = [HolderAccount::SEED_PREFIX, ownership.key().as_ref(), recipient.key().as_ref()],
        bump
    )]
    pub recipient_account: Account<'info, HolderAccount>,

    #[account(
        init_if_needed,
        payer = sender,
        space = 8 + HolderDebt::INIT_SPACE,
        seeds = [
            HolderDebt::SEED_PREFIX,
            ownership.key().as_ref(),
            ownership.asset_mint.as_ref(),
            recipient.key().as_ref()
        ],
        bump
    )]
    pub recipient_debt: Account<'info, HolderDebt>,

    /// CHECK: wallet receiving the units
    pub recipient: UncheckedAccount<'info>,

    #[account(mut)]
    pub sender: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn transfer_units(ctx: Context<TransferUnits>, amount: u64) -> Result<()> {
    require!(amount > 0, OwnershipError::ZeroAmount);
    require!(
        ctx.accounts.sender.key() != ctx.accounts.recipient.key(),
        OwnershipError::SelfTransfer
    );

    let clock = Clock::get()?;
    let sender_account = &mut ctx.accounts.sender_account;
    require!(
        sender_account.balance >= amount,
        OwnershipError::InsufficientBalance
    );

    let recipient_account = &mut ctx.accounts.recipient_account;
    if recipient_account.balance == 0 && recipient_account.owner == Pubkey::default() {
        recipient_account.owner = ctx.accounts.recipient.key();
        recipient_account.bump = ctx.bumps.recipient_account;

        let recipient_debt = &mut ctx.accounts.recipient_debt;
        recipient_debt.owner = ctx.accounts.recipient.key();
        recipient_debt.mint = ctx.accounts.ownership.asset_mint;
        recipient_debt.bump = ctx.bumps.recipient_debt;
    }

    // Shift debt with the units so neither side's pending changes
    let shift = ctx.accounts.reward_state.transfer_debt(amount);
    sender_account.balance = sender_account.balance.saturating_sub(amount);
    ctx.accounts.sender_debt.debt = ctx.accounts.sender_debt.debt.saturating_sub(shift);
    recipient_account.balance = recipient_account.balance.saturating_add(amount);
    ctx.accounts.recipient_debt.debt = ctx.accounts.recipient_debt.debt.saturating_add(shift);

    emit!(UnitsTransferred {
        from: ctx.accounts.sender.key(),
        to: ctx.accounts.recipient.key(),
        amount,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
